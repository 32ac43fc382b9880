//! The critical safety layer: turns whatever the LLM (or the human) said it
//! wants to do into an [`Action`] the rules engine is guaranteed to accept.

use rbp_core::Chips;
use rbp_gameplay::{Action, Legal};

/// An unvalidated intent, parsed from free-form LLM text or a client payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Fold,
    Check,
    Call,
    Raise(Chips),
    AllIn,
}

/// Which validation rule, if any, rewrote the intent. Carried in the
/// Decision Kernel's debug log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Rule 1: fold remapped to check because the check was free.
    FoldWhenCheckIsFree,
    /// Rule 2: `check`/`all_in` normalized, or raise degraded for lack of room.
    Normalized,
    /// Rule 3: raise amount clamped into `[min_raise, max_raise]`.
    Clamped,
    /// Rule 4: the chosen action was not legal; fell back to check/call/fold.
    IllegalFallback,
}

/// Parses a JSON object `{"action": "...", "amount": N}` or, failing that,
/// a bare keyword, into an [`Intent`]. Returns `None` if nothing recognizable
/// is found — callers should treat that the same as an LLM/parse failure.
pub fn parse_intent(text: &str) -> Option<Intent> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text.trim()) {
        let action = value.get("action")?.as_str()?.to_lowercase();
        let amount = value.get("amount").and_then(|a| a.as_i64()).unwrap_or(0);
        return intent_from_keyword(&action, amount);
    }
    let lowered = text.to_lowercase();
    for keyword in ["all_in", "all-in", "allin", "raise", "call", "check", "fold"] {
        if lowered.contains(keyword) {
            return intent_from_keyword(keyword, 0);
        }
    }
    None
}

fn intent_from_keyword(action: &str, amount: Chips) -> Option<Intent> {
    match action {
        "fold" => Some(Intent::Fold),
        "check" => Some(Intent::Check),
        "call" => Some(Intent::Call),
        "raise" => Some(Intent::Raise(amount)),
        "all_in" | "all-in" | "allin" => Some(Intent::AllIn),
        _ => None,
    }
}

/// Applies the validation rules in order, returning the safe [`Action`] and
/// the rule that fired, if any.
///
/// `remap_free_fold` gates rule 1 — the Decision Kernel always sets this
/// `true`; the Human Seat sets it `false` so an explicit human fold with a
/// free check is honored rather than silently remapped.
pub fn validate(intent: Intent, legal: &Legal, remap_free_fold: bool) -> (Action, Option<Rule>) {
    // Rule 1.
    if remap_free_fold && intent == Intent::Fold && legal.may_check {
        return (Action::Call(0), Some(Rule::FoldWhenCheckIsFree));
    }

    // Rule 2: normalize check/all-in, degrade raise if there's no room.
    let (normalized, mut rule) = match intent {
        Intent::Check => (Action::Call(0), None),
        Intent::AllIn if legal.may_raise && legal.max_raise > 0 => (Action::Raise(legal.max_raise), Some(Rule::Normalized)),
        Intent::AllIn => (Action::Call(legal.to_call), Some(Rule::Normalized)),
        Intent::Fold => (Action::Fold, None),
        Intent::Call => (Action::Call(legal.to_call), None),
        Intent::Raise(amount) if legal.may_raise && legal.max_raise > 0 => (Action::Raise(amount), None),
        Intent::Raise(_) => (Action::Call(legal.to_call), Some(Rule::Normalized)),
    };

    // Rule 3: clamp raise amount.
    if let Action::Raise(amount) = normalized {
        let clamped = amount.clamp(legal.min_raise, legal.max_raise);
        if clamped != amount {
            rule = Some(Rule::Clamped);
        }
        return finish(Action::Raise(clamped), legal, rule);
    }

    finish(normalized, legal, rule)
}

/// Rule 4 + 5: fall back to a legal action if the normalized one still
/// isn't allowed, and use the engine-dictated amount for calls.
fn finish(action: Action, legal: &Legal, rule: Option<Rule>) -> (Action, Option<Rule>) {
    if legal.is_allowed(&action) {
        let action = match action {
            Action::Call(_) => Action::Call(legal.to_call),
            other => other,
        };
        return (action, rule);
    }

    if legal.may_check {
        (Action::Call(0), Some(Rule::IllegalFallback))
    } else if legal.may_call {
        (Action::Call(legal.to_call), Some(Rule::IllegalFallback))
    } else {
        (Action::Fold, Some(Rule::IllegalFallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legal_with_check() -> Legal {
        Legal { may_fold: true, may_check: true, may_call: false, to_call: 0, may_raise: true, min_raise: 40, max_raise: 1000 }
    }

    fn legal_facing_bet() -> Legal {
        Legal { may_fold: true, may_check: false, may_call: true, to_call: 50, may_raise: true, min_raise: 100, max_raise: 1000 }
    }

    #[test]
    fn fold_remaps_to_check_when_free() {
        let (action, rule) = validate(Intent::Fold, &legal_with_check(), true);
        assert_eq!(action, Action::Call(0));
        assert_eq!(rule, Some(Rule::FoldWhenCheckIsFree));
    }

    #[test]
    fn human_fold_is_honored_when_check_is_free() {
        let (action, rule) = validate(Intent::Fold, &legal_with_check(), false);
        assert_eq!(action, Action::Fold);
        assert_eq!(rule, None);
    }

    #[test]
    fn all_in_maps_to_max_raise() {
        let (action, _) = validate(Intent::AllIn, &legal_facing_bet(), true);
        assert_eq!(action, Action::Raise(1000));
    }

    #[test]
    fn raise_is_clamped_into_bounds() {
        let (action, rule) = validate(Intent::Raise(50), &legal_facing_bet(), true);
        assert_eq!(action, Action::Raise(100));
        assert_eq!(rule, Some(Rule::Clamped));
    }

    #[test]
    fn illegal_raise_when_no_room_degrades_to_call() {
        let legal = Legal { may_raise: false, ..legal_facing_bet() };
        let (action, rule) = validate(Intent::Raise(200), &legal, true);
        assert_eq!(action, Action::Call(50));
        assert_eq!(rule, Some(Rule::Normalized));
    }

    #[test]
    fn parses_json_intent() {
        assert_eq!(parse_intent(r#"{"action": "raise", "amount": 150}"#), Some(Intent::Raise(150)));
        assert_eq!(parse_intent("I think I'll just call here"), Some(Intent::Call));
        assert_eq!(parse_intent("gibberish"), None);
    }
}
