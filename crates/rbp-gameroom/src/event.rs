use rbp_cards::{Board, Hole, Street};
use rbp_core::{Chips, Position};
use rbp_decision::{Rule, Shape};
use rbp_gameplay::{Action, View};

/// Events broadcast to every seat as a hand plays out.
///
/// Every per-hand variant carries `hand` so a client (or a reconnecting
/// Seat Adapter) can ignore stale events left over from a previous hand.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new hand is starting.
    HandStart {
        hand: u32,
        dealer: Position,
        stacks: Vec<Chips>,
    },
    /// Private hole cards, sent only to their owner.
    HoleCards { hand: u32, hole: Hole },
    /// Community cards revealed for the given street (cumulative board).
    Board { hand: u32, street: Street, board: Board },
    /// A seat took an action.
    Action {
        hand: u32,
        seat: Position,
        action: Action,
        pot: Chips,
    },
    /// It is this seat's turn; carries everything it can legally see.
    ///
    /// `hint` is only ever set for a Human Seat with AI copilot enabled — a
    /// short equity/pot-odds/EV summary, never a decision made for them.
    Decision { hand: u32, view: View, hint: Option<String> },
    /// Showdown reveal for one seat (`None` if it mucked).
    Reveal {
        hand: u32,
        seat: Position,
        hole: Option<Hole>,
    },
    /// Hand is over; who won how much.
    HandEnd {
        hand: u32,
        winners: Vec<(Position, Chips)>,
    },
    /// A seat disconnected (human only; bots cannot disconnect).
    Disconnect(Position),
    /// One Decision Kernel invocation, surfaced only while debug mode is on
    /// and (if a filter is set) only for the named bots.
    DebugLog {
        persona: String,
        shape: Shape,
        prompt: String,
        raw_response: Option<String>,
        action: Action,
        rule_fired: Option<Rule>,
    },
}

impl Event {
    pub fn hand(&self) -> Option<u32> {
        match self {
            Event::HandStart { hand, .. }
            | Event::HoleCards { hand, .. }
            | Event::Board { hand, .. }
            | Event::Action { hand, .. }
            | Event::Decision { hand, .. }
            | Event::Reveal { hand, .. }
            | Event::HandEnd { hand, .. } => Some(*hand),
            Event::Disconnect(_) | Event::DebugLog { .. } => None,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::HandStart { hand, dealer, .. } => write!(f, "hand #{hand} (dealer P{dealer})"),
            Event::HoleCards { hole, .. } => write!(f, "hole: {hole}"),
            Event::Board { street, board, .. } => write!(f, "{street}: {board}"),
            Event::Action { seat, action, .. } => write!(f, "P{seat}: {action}"),
            Event::Decision { .. } => write!(f, "your turn"),
            Event::Reveal { seat, hole: Some(h), .. } => write!(f, "P{seat}: {h}"),
            Event::Reveal { seat, hole: None, .. } => write!(f, "P{seat}: mucks"),
            Event::HandEnd { winners, .. } => {
                let s = winners
                    .iter()
                    .map(|(p, c)| format!("P{p} wins {c}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "winners: {s}")
            }
            Event::Disconnect(pos) => write!(f, "P{pos}: disconnected"),
            Event::DebugLog { persona, action, rule_fired, .. } => {
                write!(f, "[debug] {persona} -> {action} ({rule_fired:?})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_hand_events_report_their_hand_number() {
        let event = Event::HandStart { hand: 7, dealer: 0, stacks: vec![1000, 1000] };
        assert_eq!(event.hand(), Some(7));
    }

    #[test]
    fn disconnect_has_no_hand_number() {
        assert_eq!(Event::Disconnect(2).hand(), None);
    }
}
