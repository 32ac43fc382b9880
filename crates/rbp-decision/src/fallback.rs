//! Bounded rule-based decision used when the LLM call fails or returns
//! unparseable content. Never calls the LLM; always terminates.

use crate::prompt::Analysis;
use crate::validation::Intent;
use rbp_gameplay::Legal;
use rbp_core::Probability;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Equity above which the fallback raises. Loosens from hard to easy so an
/// easy bot raises with weaker hands and plays looser overall.
fn raise_threshold(difficulty: Difficulty) -> Probability {
    match difficulty {
        Difficulty::Hard => 0.65,
        Difficulty::Medium => 0.55,
        Difficulty::Easy => 0.45,
    }
}

/// A simple equity/pot-odds-threshold table: raise when equity clears the
/// difficulty's threshold, call when `EV(call)` is non-negative, else fold.
pub fn decide(analysis: &Analysis, legal: &Legal, difficulty: Difficulty) -> Intent {
    if legal.may_raise && analysis.equity >= raise_threshold(difficulty) {
        return Intent::Raise(legal.min_raise);
    }
    if analysis.ev_call >= 0.0 {
        return Intent::Call;
    }
    Intent::Fold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(equity: Probability, ev_call: Probability) -> Analysis {
        Analysis {
            equity,
            pot_odds: 0.0,
            ev_call,
            spr: None,
            effective_stack_bb: 0.0,
            texture: None,
            made_hand: None,
            rng_value: 0,
        }
    }

    fn legal() -> Legal {
        Legal { may_fold: true, may_check: false, may_call: true, to_call: 50, may_raise: true, min_raise: 100, max_raise: 1000 }
    }

    #[test]
    fn raises_with_strong_equity() {
        let intent = decide(&analysis(0.8, 10.0), &legal(), Difficulty::Hard);
        assert_eq!(intent, Intent::Raise(100));
    }

    #[test]
    fn calls_with_non_negative_ev() {
        let intent = decide(&analysis(0.3, 5.0), &legal(), Difficulty::Hard);
        assert_eq!(intent, Intent::Call);
    }

    #[test]
    fn folds_otherwise() {
        let intent = decide(&analysis(0.2, -10.0), &legal(), Difficulty::Hard);
        assert_eq!(intent, Intent::Fold);
    }

    #[test]
    fn easy_difficulty_raises_with_weaker_equity_than_hard() {
        let weak = analysis(0.5, 1.0);
        assert_eq!(decide(&weak, &legal(), Difficulty::Hard), Intent::Call);
        assert_eq!(decide(&weak, &legal(), Difficulty::Easy), Intent::Raise(100));
    }
}
