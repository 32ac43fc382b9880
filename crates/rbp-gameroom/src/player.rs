use super::event::Event;
use rbp_gameplay::{Action, View};

/// A seat's decision-making strategy.
///
/// Implementations can be CPU/LLM-driven bots or humans bridged in over a
/// WebSocket — the Session Runtime doesn't care which. The async design
/// lets a bot await an LLM HTTP call and a human seat await a message from
/// its transport without blocking the other seats.
#[async_trait::async_trait]
pub trait Player: Send {
    /// Whether the seat is still connected. Bots are always alive; a human
    /// seat reports false once its transport channel has closed.
    fn alive(&self) -> bool {
        true
    }
    /// Decide an action given everything this seat can legally see.
    async fn decide(&mut self, view: &View) -> Action;
    /// Receive a broadcast event. Not required for decision-making (`View`
    /// is self-contained) but used to keep a human client's UI and a bot's
    /// running commentary in sync.
    async fn notify(&mut self, event: &Event);
}
