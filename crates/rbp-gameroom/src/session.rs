//! The Session Runtime (C3): owns one worker thread per connected human,
//! driving a hand loop directly over [`Game`] and a vector of [`Player`]
//! seats. No typestate engine, no per-seat actor tasks — the worker builds
//! its own single-threaded tokio runtime and blocks on the whole hand loop,
//! the way `crates/gameroom`'s old `Room::run` blocked on `play_hand`, just
//! without the `Channel`/`Actor` multiplexer in between.

use crate::bot::BotSeat;
use crate::human::HumanSeat;
use crate::player::Player;
use crate::repository::HistoryRepository;
use crate::event::Event;
use rbp_auth::Member;
use rbp_cards::{Hole, Street};
use rbp_core::{Chips, ID, Position, Unique};
use rbp_decision::llm::{self, LlmClient};
use rbp_decision::{Difficulty, Kernel, Persona};
use rbp_gameplay::{Action, Game, View};
use rbp_records::{Replay, Session as SessionRecord, Statistics};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio_postgres::Client;

/// Per-user configuration a session's hand loop runs with. Set once at
/// `start()`; never silently refreshed on a bare reconnect (see
/// `Runtime::start`'s doc comment for why).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub starting_stack: Chips,
    pub opponents: u8,
    pub difficulty: Difficulty,
    pub equity_iterations: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            small_blind: rbp_core::DEFAULT_SMALL_BLIND,
            big_blind: rbp_core::DEFAULT_BIG_BLIND,
            starting_stack: rbp_core::DEFAULT_STACK,
            opponents: rbp_core::DEFAULT_NUM_OPPONENTS as u8,
            difficulty: Difficulty::Medium,
            equity_iterations: rbp_core::DEFAULT_EQUITY_ITERATIONS,
        }
    }
}

/// The last event of each kind, replayed to a reconnecting transport so it
/// can repaint the table without having missed anything mid-hand.
#[derive(Debug, Clone, Default)]
pub struct Pending {
    pub round_start: Option<Event>,
    pub action_request: Option<Event>,
    pub round_result: Option<Event>,
}

/// Outcome of a `start()`/`force_restart()` call, surfaced to the Connection
/// Hub so it can decide what (if anything) to tell the client.
#[derive(Debug, Clone)]
pub enum Lifecycle {
    Resumed,
    Restarted,
    Started,
    Failed(String),
}

/// One human's live poker session: worker thread, channels, and the pending
/// state a reconnect replays.
pub struct Runtime {
    user: ID<Member>,
    name: String,
    db: Arc<Client>,
    is_running: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
    in_tx: Option<UnboundedSender<String>>,
    pending: Arc<Mutex<Pending>>,
    session_config: Option<SessionConfig>,
    user_llm_key: Option<String>,
    session_llm_key: Option<String>,
    copilot_enabled: Arc<AtomicBool>,
    debug_mode: Arc<AtomicBool>,
    debug_filter_bots: Arc<Mutex<Option<Vec<String>>>>,
    round_gate: Arc<Notify>,
    current_session_id: Option<ID<SessionRecord>>,
}

impl Runtime {
    pub fn new(user: ID<Member>, name: String, db: Arc<Client>) -> Self {
        Self {
            user,
            name,
            db,
            is_running: Arc::new(AtomicBool::new(false)),
            worker: None,
            in_tx: None,
            pending: Arc::new(Mutex::new(Pending::default())),
            session_config: None,
            user_llm_key: None,
            session_llm_key: None,
            copilot_enabled: Arc::new(AtomicBool::new(true)),
            debug_mode: Arc::new(AtomicBool::new(false)),
            debug_filter_bots: Arc::new(Mutex::new(None)),
            round_gate: Arc::new(Notify::new()),
            current_session_id: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// `false` once the worker thread has actually exited — distinct from
    /// `is_running`, which the worker itself flips just before it does.
    /// Lets the Connection Hub detect `WorkerInconsistency` (flag still
    /// true but the thread is gone) and force a restart.
    pub fn worker_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn pending(&self) -> Pending {
        self.pending.lock().expect("pending mutex poisoned").clone()
    }

    pub fn set_ai_copilot_enabled(&self, enabled: bool) {
        self.copilot_enabled.store(enabled, Ordering::SeqCst);
    }

    /// `filter_bots` of `None` means "log every bot"; `Some(names)` restricts
    /// the `debug_log` stream to those persona names (e.g. `["AI_1"]`).
    pub fn set_debug_mode(&self, enabled: bool, filter_bots: Option<Vec<String>>) {
        self.debug_mode.store(enabled, Ordering::SeqCst);
        *self.debug_filter_bots.lock().expect("debug filter mutex poisoned") = filter_bots;
    }

    pub fn set_user_llm_key(&mut self, key: Option<String>) {
        self.user_llm_key = key;
    }

    /// Starts a fresh worker. `session_config` is only honored the first
    /// time a runtime is ever started for this user — a bare reconnect
    /// (runtime already built, worker just not running) never re-reads it
    /// from the persisted `Session` row, so mid-session config edits from
    /// another tab can't silently reshape a hand in flight.
    pub fn start(&mut self, to_client: UnboundedSender<Event>, config: SessionConfig, session_llm_key: Option<String>) -> Lifecycle {
        if self.is_running() {
            self.stop(true);
            if let Some(handle) = self.worker.take() {
                let _ = handle.join();
            }
        }
        let resumed = self.session_config.is_some();
        if self.session_config.is_none() {
            self.session_config = Some(config.clone());
        }
        self.session_llm_key = session_llm_key;
        let config = self.session_config.clone().unwrap();

        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();
        let (out_tx, out_rx) = mpsc::unbounded_channel::<Event>();
        self.in_tx = Some(in_tx.clone());

        self.is_running.store(true, Ordering::SeqCst);
        let alive = Arc::new(AtomicBool::new(true));
        let llm_key = self
            .session_llm_key
            .clone()
            .or_else(|| self.user_llm_key.clone())
            .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .unwrap_or_default();

        let worker_args = WorkerArgs {
            user: self.user,
            name: self.name.clone(),
            db: self.db.clone(),
            config,
            llm_key,
            in_rx: Arc::new(AsyncMutex::new(in_rx)),
            out_tx,
            alive: alive.clone(),
            copilot_enabled: self.copilot_enabled.clone(),
            debug_mode: self.debug_mode.clone(),
            debug_filter_bots: self.debug_filter_bots.clone(),
            round_gate: self.round_gate.clone(),
            is_running: self.is_running.clone(),
        };

        self.worker = Some(std::thread::spawn(move || run_worker(worker_args)));
        spawn_forwarder(out_rx, to_client, self.pending.clone());

        if resumed { Lifecycle::Resumed } else { Lifecycle::Started }
    }

    /// Stops the worker. `clear_seat` drops the pending-state snapshot too —
    /// used when the human is leaving for good, not just disconnecting.
    pub fn stop(&mut self, clear_seat: bool) {
        self.is_running.store(false, Ordering::SeqCst);
        self.round_gate.notify_waiters();
        self.in_tx = None;
        if clear_seat {
            *self.pending.lock().expect("pending mutex poisoned") = Pending::default();
        }
    }

    pub fn force_restart(&mut self, to_client: UnboundedSender<Event>) -> Lifecycle {
        let config = self.session_config.clone().unwrap_or_default();
        self.stop(true);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        // Force a brand new game rather than a resume: clear the cached
        // config so `start()` treats this as a first-ever start.
        self.session_config = None;
        self.start(to_client, config, self.session_llm_key.clone());
        Lifecycle::Restarted
    }

    pub fn handle_player_action(&self, payload: String) {
        if let Some(tx) = &self.in_tx {
            let _ = tx.send(payload);
        }
        self.pending.lock().expect("pending mutex poisoned").action_request = None;
    }

    pub fn signal_next_round(&self) {
        self.pending.lock().expect("pending mutex poisoned").round_result = None;
        self.round_gate.notify_waiters();
    }
}

struct WorkerArgs {
    user: ID<Member>,
    name: String,
    db: Arc<Client>,
    config: SessionConfig,
    llm_key: String,
    in_rx: Arc<AsyncMutex<UnboundedReceiver<String>>>,
    out_tx: UnboundedSender<Event>,
    alive: Arc<AtomicBool>,
    copilot_enabled: Arc<AtomicBool>,
    debug_mode: Arc<AtomicBool>,
    debug_filter_bots: Arc<Mutex<Option<Vec<String>>>>,
    round_gate: Arc<Notify>,
    is_running: Arc<AtomicBool>,
}

/// Non-blocking poll of the hand loop's event channel: forwards to the
/// transport and keeps `pending` current so a reconnect can replay it.
fn spawn_forwarder(mut out_rx: UnboundedReceiver<Event>, to_client: UnboundedSender<Event>, pending: Arc<Mutex<Pending>>) {
    tokio::spawn(async move {
        loop {
            match out_rx.recv().await {
                None => return,
                Some(event) => {
                    {
                        let mut pending = pending.lock().expect("pending mutex poisoned");
                        match &event {
                            Event::HandStart { .. } => pending.round_start = Some(event.clone()),
                            Event::Decision { .. } => pending.action_request = Some(event.clone()),
                            Event::HandEnd { .. } => pending.round_result = Some(event.clone()),
                            _ => {}
                        }
                    }
                    let _ = to_client.send(event);
                }
            }
        }
    });
}

fn run_worker(args: WorkerArgs) {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("session worker for {} failed to build its tokio runtime: {e}", args.user.inner());
            args.is_running.store(false, Ordering::SeqCst);
            return;
        }
    };
    runtime.block_on(hand_loop(args));
}

async fn hand_loop(args: WorkerArgs) {
    let WorkerArgs {
        user,
        name,
        db,
        config,
        llm_key,
        in_rx,
        out_tx,
        alive,
        copilot_enabled,
        debug_mode,
        debug_filter_bots,
        round_gate,
        is_running,
    } = args;

    let session = SessionRecord::new(ID::default(), user, config.small_blind, config.big_blind, config.starting_stack, config.opponents);
    let session_id = session.id();
    if let Err(e) = db.create_session(&session).await {
        log::error!("failed to persist session row for {}: {e}", user.inner());
        is_running.store(false, Ordering::SeqCst);
        return;
    }
    let mut session = session;

    let llm: Arc<dyn LlmClient> = llm::build(llm::Provider::resolve(None), llm_key, None, default_model());
    let kernel = Arc::new(Kernel::new(llm, config.difficulty, config.equity_iterations, Duration::from_secs(20)));
    let personas = Persona::distribute(config.opponents as usize);
    let hole_cards: Arc<Mutex<HashMap<Position, Hole>>> = Arc::new(Mutex::new(HashMap::new()));

    let debug_tap = if debug_mode.load(Ordering::SeqCst) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debug_out = out_tx.clone();
        let debug_filter_bots = debug_filter_bots.clone();
        tokio::spawn(async move {
            while let Some(log) = rx.recv().await {
                let allowed = match &*debug_filter_bots.lock().expect("debug filter mutex poisoned") {
                    Some(names) => names.iter().any(|n| n == &log.persona),
                    None => true,
                };
                if !allowed {
                    continue;
                }
                log::debug!("[{}] {} -> {} ({:?})", log.persona, log.prompt.len(), log.action, log.rule_fired);
                let _ = debug_out.send(Event::DebugLog {
                    persona: log.persona,
                    shape: log.shape,
                    prompt: log.prompt,
                    raw_response: log.raw_response,
                    action: log.action,
                    rule_fired: log.rule_fired,
                });
            }
        });
        Some(tx)
    } else {
        None
    };

    let seat_count = 1 + config.opponents as usize;
    let mut players: Vec<Box<dyn Player>> = Vec::with_capacity(seat_count);
    players.push(Box::new(HumanSeat::new(
        user,
        name,
        0,
        out_tx.clone(),
        in_rx,
        alive.clone(),
        copilot_enabled,
        config.big_blind,
        config.equity_iterations,
    )));
    for (i, persona) in personas.into_iter().enumerate() {
        players.push(Box::new(BotSeat::new(
            persona,
            i + 1,
            config.big_blind,
            kernel.clone(),
            hole_cards.clone(),
            debug_tap.clone(),
        )));
    }

    let mut stacks = vec![config.starting_stack; seat_count];
    let mut button: Position = 0;
    let mut number: u32 = 0;

    loop {
        if !is_running.load(Ordering::SeqCst) || !players[0].alive() {
            break;
        }
        number += 1;
        let mut game = Game::deal(stacks.clone(), button, config.small_blind, config.big_blind);
        let mut replay = Replay::new(number, &game);

        for seat in players.iter_mut() {
            seat.notify(&Event::HandStart { hand: number, dealer: game.button(), stacks: stacks.clone() }).await;
        }
        for (i, seat) in players.iter_mut().enumerate() {
            seat.notify(&Event::HoleCards { hand: number, hole: game.seat(i).cards() }).await;
        }

        let mut last_street = game.street();
        while !game.is_finished() {
            let acting = game.acting();
            let view = View::of(&game, acting);
            let street = game.street();
            let action = players[acting].decide(&view).await;
            replay.record(acting, street, action);
            if let Err(e) = game.apply(action) {
                log::error!("illegal action slipped past validation for seat {acting}: {e}");
                break;
            }
            let pot = game.pot();
            for seat in players.iter_mut() {
                seat.notify(&Event::Action { hand: number, seat: acting, action, pot }).await;
            }
            if game.street() != last_street {
                last_street = game.street();
                for seat in players.iter_mut() {
                    seat.notify(&Event::Board { hand: number, street: game.street(), board: game.board() }).await;
                }
            }
        }

        if game.seats().iter().filter(|s| s.state().is_active()).count() > 1 {
            game.showdown();
        }
        for (i, seat) in players.iter_mut().enumerate() {
            let hole = if game.seat(i).state().is_active() { Some(game.seat(i).cards()) } else { None };
            seat.notify(&Event::Reveal { hand: number, seat: i, hole }).await;
        }
        let winners: Vec<(Position, Chips)> = game
            .seats()
            .iter()
            .enumerate()
            .map(|(i, seat)| (i, seat.stack() - stacks[i]))
            .filter(|(_, profit)| *profit > 0)
            .collect();
        for seat in players.iter_mut() {
            seat.notify(&Event::HandEnd { hand: number, winners: winners.clone() }).await;
        }

        let pot = winners.iter().map(|(_, c)| c).sum::<Chips>();
        let hand = replay.to_hand(session_id, game.board(), pot);
        let user_of = |pos: Position| if pos == 0 { Some(user) } else { None };
        let participants = replay.to_participants(hand.id(), user_of);
        let plays = replay.to_plays(hand.id(), user_of);
        if let Err(e) = db.create_hand(&hand).await {
            log::error!("failed to persist hand {}: {e}", hand.id().inner());
        }
        for participant in &participants {
            if let Err(e) = db.create_participant(participant).await {
                log::error!("failed to persist participant: {e}");
            }
        }
        for play in &plays {
            if let Err(e) = db.create_play(play).await {
                log::error!("failed to persist play: {e}");
            }
        }

        let human_profit = winners.iter().find(|(pos, _)| *pos == 0).map(|(_, c)| *c).unwrap_or_else(|| {
            game.seat(0).stack() - stacks[0]
        });
        // VPIP counts only preflop money voluntarily put in, not calling a
        // later street's bet after checking it in for free preflop.
        let voluntarily_played = replay.plays().iter().any(|(pos, street, action)| {
            *pos == 0 && *street == Street::Pre && (action.is_raise() || matches!(action, Action::Call(c) if *c > 0))
        });
        session.record_hand(human_profit, voluntarily_played);
        if let Err(e) = db.update_session_stats(&session).await {
            log::error!("failed to update session stats: {e}");
        }
        if let Ok(sessions) = db.get_sessions(user).await {
            let stats = Statistics::recompute(user, sessions.iter());
            if let Err(e) = db.upsert_stats(&stats).await {
                log::error!("failed to upsert account statistics: {e}");
            }
        }

        stacks = game.seats().iter().map(|s| s.stack()).collect();
        button = (button + 1) % seat_count;

        if game.is_over() {
            break;
        }
        if !players[0].alive() || !is_running.load(Ordering::SeqCst) {
            break;
        }

        round_gate.notified().await;
        if !is_running.load(Ordering::SeqCst) {
            break;
        }
    }

    let ended_at = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0);
    if let Err(e) = db.end_session(session_id, ended_at).await {
        log::error!("failed to close out session row: {e}");
    }
    is_running.store(false, Ordering::SeqCst);
}

fn default_model() -> String {
    std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string())
}
