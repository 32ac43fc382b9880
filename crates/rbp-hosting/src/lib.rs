//! WebSocket game hosting infrastructure.
//!
//! This crate provides the server-side machinery for hosting a human's live
//! poker session against its bot opponents: the Connection Hub tracks which
//! transports belong to which user and owns the per-user Session Runtime,
//! and the HTTP surface exposes session/hand-history/statistics reads.
//!
//! ## Core Types
//!
//! - [`Hub`] — tracks live transports per user and the Session Runtime registry
//!
//! ## HTTP Handlers
//!
//! The [`handlers`] submodule exposes actix-web routes for the game session
//! surface (create/list/inspect sessions, fetch hand history, statistics,
//! request a review) and the WebSocket upgrade entry point.
mod hub;
mod ws;
pub mod handlers;

pub use hub::{ConnectAction, Hub};
pub use ws::bridge;
