//! Hand history recording, replay, and the persisted session/stats rows.
//!
//! Each completed hand is captured as a [`Hand`] plus its [`Participant`]
//! and [`Play`] rows; [`Replay`] accumulates that state while a hand is in
//! progress. [`Session`] is the persisted row backing a human's ongoing
//! poker session (the live orchestration itself lives in `rbp-gameroom`).
//! [`Statistics`] is the advisory account-wide stats cache, and [`Review`]
//! holds the AI-generated post-hand commentary.
mod hand;
mod participant;
mod play;
mod replay;
mod review;
mod session;
mod statistics;

pub use hand::*;
pub use participant::*;
pub use play::*;
pub use replay::*;
pub use review::*;
pub use session::*;
pub use statistics::*;
