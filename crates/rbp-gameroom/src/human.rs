use crate::event::Event;
use crate::player::Player;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rbp_auth::Member;
use rbp_core::{Chips, ID, Position};
use rbp_decision::prompt::Analysis;
use rbp_decision::validation;
use rbp_gameplay::Action;
use rbp_gameplay::View;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::mpsc::UnboundedSender;

/// The human's seat. Bridges the hand loop to a WebSocket transport via a
/// pair of channels: `out` carries [`Event`]s to the Connection Hub for
/// forwarding, `inbox` carries raw action payloads back.
///
/// Validation here runs the same five rules the Decision Kernel uses, but
/// with `remap_free_fold` off — an explicit human fold with a free check is
/// honored, never silently turned into a check on their behalf.
pub struct HumanSeat {
    user: ID<Member>,
    name: String,
    position: Position,
    out: UnboundedSender<Event>,
    inbox: Arc<AsyncMutex<UnboundedReceiver<String>>>,
    alive: Arc<AtomicBool>,
    copilot_enabled: Arc<AtomicBool>,
    big_blind: Chips,
    equity_iterations: usize,
    current_hand: AtomicU32,
}

impl HumanSeat {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user: ID<Member>,
        name: String,
        position: Position,
        out: UnboundedSender<Event>,
        inbox: Arc<AsyncMutex<UnboundedReceiver<String>>>,
        alive: Arc<AtomicBool>,
        copilot_enabled: Arc<AtomicBool>,
        big_blind: Chips,
        equity_iterations: usize,
    ) -> Self {
        Self {
            user,
            name,
            position,
            out,
            inbox,
            alive,
            copilot_enabled,
            big_blind,
            equity_iterations,
            current_hand: AtomicU32::new(0),
        }
    }

    pub fn user(&self) -> ID<Member> {
        self.user
    }
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Never calls the LLM — reuses the same math sub-contracts the
    /// Decision Kernel runs, purely to surface them to the player.
    fn hint(&self, view: &View) -> Option<String> {
        if !self.copilot_enabled.load(Ordering::SeqCst) {
            return None;
        }
        let mut rng = SmallRng::from_os_rng();
        let analysis = Analysis::compute(view, self.big_blind, self.equity_iterations, &mut rng);
        Some(format!(
            "equity {:.0}% \u{b7} pot odds {:.0}% \u{b7} EV(call) {:+.1}",
            analysis.equity * 100.0,
            analysis.pot_odds * 100.0,
            analysis.ev_call,
        ))
    }
}

#[async_trait::async_trait]
impl Player for HumanSeat {
    fn alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn decide(&mut self, view: &View) -> Action {
        let hint = self.hint(view);
        let hand = self.current_hand.load(Ordering::SeqCst);
        let _ = self.out.send(Event::Decision { hand, view: view.clone(), hint });

        loop {
            let payload = self.inbox.lock().await.recv().await;
            let Some(payload) = payload else {
                self.alive.store(false, Ordering::SeqCst);
                return if view.legal.may_check { Action::Call(0) } else { Action::Fold };
            };
            let Some(intent) = validation::parse_intent(&payload) else {
                continue;
            };
            let (action, _rule) = validation::validate(intent, &view.legal, false);
            return action;
        }
    }

    async fn notify(&mut self, event: &Event) {
        if let Event::HandStart { hand, .. } = event {
            self.current_hand.store(*hand, Ordering::SeqCst);
        }
        let _ = self.out.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbp_gameplay::Game;
    use std::sync::atomic::AtomicBool;

    fn seat(
        inbox: UnboundedReceiver<String>,
    ) -> (HumanSeat, tokio::sync::mpsc::UnboundedReceiver<Event>, Arc<AtomicBool>) {
        let (out_tx, out_rx) = tokio::sync::mpsc::unbounded_channel();
        let alive = Arc::new(AtomicBool::new(true));
        let copilot = Arc::new(AtomicBool::new(false));
        let seat = HumanSeat::new(
            ID::default(),
            "alice".to_string(),
            0,
            out_tx,
            Arc::new(AsyncMutex::new(inbox)),
            alive.clone(),
            copilot,
            20,
            100,
        );
        (seat, out_rx, alive)
    }

    #[tokio::test]
    async fn validates_a_json_payload_into_an_action() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let (mut seat, mut out_rx, _alive) = seat(rx);
        let game = Game::deal(vec![1000, 1000], 0, 10, 20);
        let view = View::of(&game, 0);

        tx.send(r#"{"action":"call"}"#.to_string()).unwrap();
        let action = seat.decide(&view).await;
        assert!(matches!(action, Action::Call(_)));

        assert!(matches!(out_rx.recv().await, Some(Event::Decision { .. })));
    }

    #[tokio::test]
    async fn ignores_unparseable_payloads_and_waits_for_a_valid_one() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let (mut seat, _out_rx, _alive) = seat(rx);
        let game = Game::deal(vec![1000, 1000], 0, 10, 20);
        let view = View::of(&game, 0);

        tx.send("garbage".to_string()).unwrap();
        tx.send(r#"{"action":"call"}"#.to_string()).unwrap();
        let action = seat.decide(&view).await;
        assert!(matches!(action, Action::Call(_)));
    }

    #[tokio::test]
    async fn closed_inbox_marks_the_seat_dead_and_folds_or_checks() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let (mut seat, _out_rx, alive) = seat(rx);
        let game = Game::deal(vec![1000, 1000], 0, 10, 20);
        let view = View::of(&game, 0);

        drop(tx);
        let action = seat.decide(&view).await;
        assert!(!alive.load(Ordering::SeqCst));
        assert!(matches!(action, Action::Fold | Action::Call(0)));
    }
}
