//! The LLM Decision Kernel: persona-conditioned prompting, Monte Carlo
//! equity and the other math sub-contracts, validated action selection, and
//! a bounded rule-based fallback for when the LLM is unavailable.
//!
//! [`kernel::Kernel`] is the component bot seats in `rbp-gameroom` call into;
//! everything else here is a sub-contract it composes.

pub mod fallback;
pub mod kernel;
pub mod llm;
pub mod math;
pub mod persona;
pub mod prompt;
pub mod validation;

pub use fallback::Difficulty;
pub use kernel::{DebugLog, Kernel};
pub use persona::{Persona, Style};
pub use prompt::Shape;
pub use validation::{Intent, Rule};
