//! Heads-up-to-full-ring no-limit hold'em rules engine.
//!
//! [`game::Game`] owns one hand at a time: seats, board, deck, and the
//! betting round state machine. It knows nothing about networking,
//! persistence, or who (human or bot) is making the decisions — those
//! concerns live in `rbp-gameroom` and `rbp-decision`.

mod action;
mod game;
mod pnl;
mod seat;
mod settlement;
mod view;

pub use action::{Action, Legal};
pub use game::{Game, Showdown};
pub use pnl::PnL;
pub use seat::{Seat, State};
pub use settlement::Settlement;
pub use view::{Opponent, View};
