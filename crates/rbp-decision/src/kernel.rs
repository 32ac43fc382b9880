//! Pure-ish decision function: persona + legal actions + hole cards + public
//! state + an LLM client in, a validated [`Action`] out. Wraps the LLM call,
//! the math sub-contracts, and the validation safety layer.

use crate::fallback::{self, Difficulty};
use crate::llm::{LlmClient, Message};
use crate::persona::Persona;
use crate::prompt::{self, Analysis, Shape};
use crate::validation::{self, Rule};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rbp_core::Chips;
use rbp_gameplay::{Action, View};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything about one invocation, for the Bot Seat's debug tap.
#[derive(Debug, Clone)]
pub struct DebugLog {
    pub persona: String,
    pub shape: Shape,
    pub prompt: String,
    pub raw_response: Option<String>,
    pub action: Action,
    pub rule_fired: Option<Rule>,
}

pub struct Kernel {
    llm: Arc<dyn LlmClient>,
    difficulty: Difficulty,
    iterations: usize,
    timeout: Duration,
    rng: Mutex<SmallRng>,
}

impl Kernel {
    pub fn new(llm: Arc<dyn LlmClient>, difficulty: Difficulty, iterations: usize, timeout: Duration) -> Self {
        Self { llm, difficulty, iterations, timeout, rng: Mutex::new(SmallRng::from_os_rng()) }
    }

    pub async fn decide(&self, persona: &Persona, view: &View, big_blind: Chips) -> (Action, DebugLog) {
        let analysis = {
            let mut rng = self.rng.lock().expect("rng mutex poisoned");
            Analysis::compute(view, big_blind, self.iterations, &mut *rng)
        };
        let (shape, prompt_text) = prompt::render(persona, view, &analysis);

        let messages = [
            Message::system(
                "You are a poker-playing agent. Respond with exactly one JSON object and nothing else.",
            ),
            Message::user(prompt_text.clone()),
        ];

        let raw = self.llm.chat(&messages, Some(0.7), Some(200), self.timeout).await;

        let (action, raw_response, rule_fired) = match raw {
            Ok(text) => match validation::parse_intent(&text) {
                Some(intent) => {
                    let (action, rule) = validation::validate(intent, &view.legal, true);
                    (action, Some(text), rule)
                }
                None => {
                    log::warn!("unparseable LLM response for {}: {text}", persona.name);
                    self.fallback_decision(&analysis, view, Some(text))
                }
            },
            Err(e) => {
                log::warn!("LLM call failed for {}: {e}", persona.name);
                self.fallback_decision(&analysis, view, None)
            }
        };

        let debug = DebugLog {
            persona: persona.name.clone(),
            shape,
            prompt: prompt_text,
            raw_response,
            action,
            rule_fired,
        };
        (action, debug)
    }

    fn fallback_decision(
        &self,
        analysis: &Analysis,
        view: &View,
        raw_response: Option<String>,
    ) -> (Action, Option<String>, Option<Rule>) {
        let intent = fallback::decide(analysis, &view.legal, self.difficulty);
        let (action, rule) = validation::validate(intent, &view.legal, true);
        (action, raw_response, rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, Statistics};
    use rbp_cards::{Board, Hole};
    use rbp_gameplay::{Legal, Opponent};

    struct FailingLlm;

    #[async_trait::async_trait]
    impl LlmClient for FailingLlm {
        async fn chat(&self, _: &[Message], _: Option<f32>, _: Option<u32>, _: Duration) -> Result<String, LlmError> {
            Err(LlmError::NoKey)
        }
        fn statistics(&self) -> Statistics {
            Statistics::default()
        }
    }

    struct RespondingLlm(&'static str);

    #[async_trait::async_trait]
    impl LlmClient for RespondingLlm {
        async fn chat(&self, _: &[Message], _: Option<f32>, _: Option<u32>, _: Duration) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
        fn statistics(&self) -> Statistics {
            Statistics::default()
        }
    }

    fn sample_view() -> View {
        View {
            position: 0,
            hole: Hole::from((
                rbp_cards::Card::from((rbp_cards::Rank::Ace, rbp_cards::Suit::Spades)),
                rbp_cards::Card::from((rbp_cards::Rank::King, rbp_cards::Suit::Spades)),
            )),
            board: Board::empty(),
            street: rbp_cards::Street::Pre,
            pot: 60,
            stack: 980,
            to_call: 20,
            legal: Legal { may_fold: true, may_check: false, may_call: true, to_call: 20, may_raise: true, min_raise: 40, max_raise: 980 },
            opponents: vec![Opponent { position: 1, stack: 1000, stake: 20, state: rbp_gameplay::State::Betting }],
        }
    }

    #[tokio::test]
    async fn llm_failure_falls_through_to_rule_based_decision() {
        let kernel = Kernel::new(Arc::new(FailingLlm), Difficulty::Hard, 50, Duration::from_secs(1));
        let persona = Persona::new("AI_1", crate::persona::Style::Tag);
        let (_, debug) = kernel.decide(&persona, &sample_view(), 20).await;
        assert!(debug.raw_response.is_none());
    }

    #[tokio::test]
    async fn well_formed_llm_response_is_honored_after_validation() {
        let kernel = Kernel::new(Arc::new(RespondingLlm(r#"{"action":"call"}"#)), Difficulty::Hard, 50, Duration::from_secs(1));
        let persona = Persona::new("AI_1", crate::persona::Style::Lag);
        let (action, debug) = kernel.decide(&persona, &sample_view(), 20).await;
        assert_eq!(action, Action::Call(20));
        assert!(debug.raw_response.is_some());
    }
}
