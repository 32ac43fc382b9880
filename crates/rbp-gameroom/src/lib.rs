//! Async runtime for live poker games.
//!
//! [`session::Runtime`] (the Session Runtime, C3) owns one worker thread per
//! connected human and drives a hand loop directly over [`rbp_gameplay::Game`]
//! and a vector of [`Player`] seats — one [`human::HumanSeat`] bridged to a
//! WebSocket transport, the rest [`bot::BotSeat`]s backed by the
//! `rbp-decision` Kernel. [`event::Event`] is what gets broadcast to seats
//! (and, serialized, to the client) as a hand plays out. [`repository`]
//! persists completed hands, sessions, and statistics.
mod bot;
mod event;
mod human;
mod player;
mod repository;
mod review;
mod session;

pub use bot::BotSeat;
pub use event::Event;
pub use human::HumanSeat;
pub use player::Player;
pub use repository::HistoryRepository;
pub use review::{review_hand, KeyTier, ReviewResult};
pub use session::{Lifecycle, Pending, Runtime, SessionConfig};
