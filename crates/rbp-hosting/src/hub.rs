//! The Connection Hub (C4): tracks `user_id -> set of live transport
//! handles` and the inverse map, routes events to the transports of their
//! owning user, and is the single owner of the per-user Session Runtime
//! registry — no other component holds process-wide mutable game state.
//!
//! Grounded on the old non-prefixed `crates/hosting/src/casino.rs`'s
//! `Casino` (room registry + `bridge()`'s `tokio::select!` transport loop)
//! and `handle.rs`'s channel-pair construction, generalized from "one room,
//! one client" to "one user, N transports, one long-lived Session Runtime".

use rbp_auth::Member;
use rbp_core::ID;
use rbp_gameroom::{Event, Lifecycle, Pending, Runtime, SessionConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tokio_postgres::Client;
use uuid::Uuid;

/// One user's long-lived game state: the Session Runtime plus the channel
/// its worker's event forwarder feeds, fanned out to every live transport.
struct UserState {
    runtime: AsyncMutex<Runtime>,
    events: UnboundedSender<Event>,
}

/// What the Hub decided to do with a newly opened transport, per §4.3's
/// state-decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectAction {
    Resume,
    ForceRestart,
    StartNew,
}

pub struct Hub {
    db: Arc<Client>,
    users: RwLock<HashMap<ID<Member>, Arc<UserState>>>,
    transports: RwLock<HashMap<ID<Member>, HashMap<Uuid, UnboundedSender<String>>>>,
}

impl Hub {
    pub fn new(db: Arc<Client>) -> Arc<Self> {
        Arc::new(Self {
            db,
            users: RwLock::new(HashMap::new()),
            transports: RwLock::new(HashMap::new()),
        })
    }

    /// Registers a new transport for `user`. Returns its id (for
    /// deregistration) and the receiver half the caller's transport loop
    /// should drain and write out over the wire.
    pub async fn register_transport(&self, user: ID<Member>) -> (Uuid, UnboundedReceiver<String>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        self.transports.write().await.entry(user).or_default().insert(id, tx);
        (id, rx)
    }

    /// Deregisters a transport. Per §8's testable property, after this
    /// returns no further event reaches it (its sender is dropped, so the
    /// receiver end the transport loop owns is closed on its next poll).
    pub async fn deregister_transport(&self, user: ID<Member>, id: Uuid) {
        if let Some(set) = self.transports.write().await.get_mut(&user) {
            set.remove(&id);
        }
    }

    pub async fn send_to_one(&self, user: ID<Member>, transport: Uuid, msg: &str) {
        if let Some(set) = self.transports.read().await.get(&user) {
            if let Some(tx) = set.get(&transport) {
                let _ = tx.send(msg.to_string());
            }
        }
    }

    /// Fans `msg` out to every live transport of `user`. Tolerant of
    /// per-transport errors — one dead transport never blocks delivery to
    /// its siblings.
    pub async fn send_to_user(&self, user: ID<Member>, msg: &str) {
        if let Some(set) = self.transports.read().await.get(&user) {
            for tx in set.values() {
                let _ = tx.send(msg.to_string());
            }
        }
    }

    /// Legacy-compatibility broadcast to every connected transport of every user.
    pub async fn broadcast(&self, msg: &str) {
        for set in self.transports.read().await.values() {
            for tx in set.values() {
                let _ = tx.send(msg.to_string());
            }
        }
    }

    async fn user_state(self: &Arc<Self>, user: ID<Member>, name: &str) -> Arc<UserState> {
        if let Some(state) = self.users.read().await.get(&user) {
            return state.clone();
        }
        let mut guard = self.users.write().await;
        if let Some(state) = guard.get(&user) {
            return state.clone();
        }
        let (events, mut out_rx) = mpsc::unbounded_channel::<Event>();
        let state = Arc::new(UserState {
            runtime: AsyncMutex::new(Runtime::new(user, name.to_string(), self.db.clone())),
            events,
        });
        let hub = self.clone();
        tokio::spawn(async move {
            while let Some(event) = out_rx.recv().await {
                if let Ok(json) = serde_json::to_string(&event) {
                    hub.send_to_user(user, &json).await;
                }
            }
        });
        guard.insert(user, state.clone());
        state
    }

    /// Implements §4.3's state-decision table and acts on it: starts,
    /// force-restarts, or leaves the existing worker running (a plain
    /// resume). Returns the lifecycle outcome plus whatever pending state
    /// should be replayed to the newly connected transport.
    pub async fn connect(
        self: &Arc<Self>,
        user: ID<Member>,
        name: &str,
        config: SessionConfig,
        session_llm_key: Option<String>,
        user_llm_key: Option<String>,
    ) -> (Lifecycle, Pending) {
        let state = self.user_state(user, name).await;
        let mut runtime = state.runtime.lock().await;
        runtime.set_user_llm_key(user_llm_key);

        let running = runtime.is_running();
        let alive = runtime.worker_alive();
        let action = match (running, alive) {
            (true, true) => ConnectAction::Resume,
            (true, false) => ConnectAction::ForceRestart,
            (false, _) => ConnectAction::StartNew,
        };

        let lifecycle = match action {
            ConnectAction::Resume => Lifecycle::Resumed,
            ConnectAction::ForceRestart => runtime.force_restart(state.events.clone()),
            ConnectAction::StartNew => runtime.start(state.events.clone(), config, session_llm_key),
        };
        (lifecycle, runtime.pending())
    }

    /// Unconditional force-restart, for the client's explicit `new_game`
    /// request — unlike [`Self::connect`], never resumes the existing hand.
    pub async fn new_game(&self, user: ID<Member>) -> Lifecycle {
        let Some(state) = self.user_state_if_exists(user).await else {
            return Lifecycle::Failed("no active session".to_string());
        };
        let mut runtime = state.runtime.lock().await;
        runtime.force_restart(state.events.clone())
    }

    pub async fn handle_player_action(&self, user: ID<Member>, name: &str, payload: String) {
        let state = self.user_state_if_exists(user).await;
        if let Some(state) = state {
            state.runtime.lock().await.handle_player_action(payload);
        } else {
            log::warn!("player_action for {user} ({name}) with no active runtime");
        }
    }

    pub async fn signal_next_round(&self, user: ID<Member>) {
        if let Some(state) = self.user_state_if_exists(user).await {
            state.runtime.lock().await.signal_next_round();
        }
    }

    pub async fn set_ai_copilot_enabled(&self, user: ID<Member>, enabled: bool) {
        if let Some(state) = self.user_state_if_exists(user).await {
            state.runtime.lock().await.set_ai_copilot_enabled(enabled);
        }
    }

    pub async fn set_debug_mode(&self, user: ID<Member>, enabled: bool, filter_bots: Option<Vec<String>>) {
        if let Some(state) = self.user_state_if_exists(user).await {
            state.runtime.lock().await.set_debug_mode(enabled, filter_bots);
        }
    }

    async fn user_state_if_exists(&self, user: ID<Member>) -> Option<Arc<UserState>> {
        self.users.read().await.get(&user).cloned()
    }
}
