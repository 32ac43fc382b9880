use crate::event::Event;
use crate::player::Player;
use rbp_cards::Hole;
use rbp_core::{Chips, Position};
use rbp_decision::{DebugLog, Kernel, Persona};
use rbp_gameplay::{Action, View};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

/// An LLM-driven opponent. Calls into the shared [`Kernel`] with its own
/// [`Persona`] for every decision; publishes its hole cards into the shared
/// map on [`Event::HoleCards`] so the Session Runtime can surface them for
/// AI Review without re-deriving them from `Replay`.
pub struct BotSeat {
    persona: Persona,
    position: Position,
    big_blind: Chips,
    kernel: Arc<Kernel>,
    hole_cards: Arc<Mutex<HashMap<Position, Hole>>>,
    debug_tap: Option<UnboundedSender<DebugLog>>,
}

impl BotSeat {
    pub fn new(
        persona: Persona,
        position: Position,
        big_blind: Chips,
        kernel: Arc<Kernel>,
        hole_cards: Arc<Mutex<HashMap<Position, Hole>>>,
        debug_tap: Option<UnboundedSender<DebugLog>>,
    ) -> Self {
        Self { persona, position, big_blind, kernel, hole_cards, debug_tap }
    }
}

#[async_trait::async_trait]
impl Player for BotSeat {
    async fn decide(&mut self, view: &View) -> Action {
        let (action, debug) = self.kernel.decide(&self.persona, view, self.big_blind).await;
        if let Some(tap) = &self.debug_tap {
            let _ = tap.send(debug);
        }
        action
    }

    async fn notify(&mut self, event: &Event) {
        if let Event::HoleCards { hole, .. } = event {
            self.hole_cards
                .lock()
                .expect("hole card map poisoned")
                .insert(self.position, *hole);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbp_cards::Card;
    use rbp_decision::fallback::Difficulty;
    use rbp_decision::llm::{LlmClient, LlmError, Message, Statistics};
    use rbp_decision::{Kernel, Style};

    struct DeadClient;

    #[async_trait::async_trait]
    impl LlmClient for DeadClient {
        async fn chat(
            &self,
            _messages: &[Message],
            _temperature: Option<f32>,
            _max_tokens: Option<u32>,
            _timeout: std::time::Duration,
        ) -> Result<String, LlmError> {
            Err(LlmError::NoKey)
        }
        fn statistics(&self) -> Statistics {
            Statistics::default()
        }
    }

    fn bot(position: Position, hole_cards: Arc<Mutex<HashMap<Position, Hole>>>) -> BotSeat {
        let kernel = Arc::new(Kernel::new(Arc::new(DeadClient), Difficulty::Medium, 100, std::time::Duration::from_secs(1)));
        BotSeat::new(Persona::new("bot", Style::Tag), position, 20, kernel, hole_cards, None)
    }

    #[tokio::test]
    async fn records_hole_cards_under_its_own_seat() {
        let hole_cards = Arc::new(Mutex::new(HashMap::new()));
        let mut seat = bot(2, hole_cards.clone());
        let hole = Hole::from((Card::from(0u8), Card::from(1u8)));
        seat.notify(&Event::HoleCards { hand: 1, hole }).await;
        assert_eq!(hole_cards.lock().unwrap().get(&2), Some(&hole));
    }

    #[tokio::test]
    async fn ignores_events_other_than_hole_cards() {
        let hole_cards = Arc::new(Mutex::new(HashMap::new()));
        let mut seat = bot(0, hole_cards.clone());
        seat.notify(&Event::Disconnect(0)).await;
        assert!(hole_cards.lock().unwrap().is_empty());
    }
}
