//! The per-connection transport loop (§4.4 steps 1-7): authenticates the
//! socket, registers it with the [`Hub`], replays any pending state, and
//! bridges inbound/outbound traffic until the socket closes.
//!
//! Grounded on the old non-prefixed `crates/hosting/src/casino.rs`'s
//! `bridge()` — the same `tokio::select! { biased; ... }` shape, generalized
//! from a raw room-id path param to token-based user resolution and a
//! structured client message dispatch.

use crate::hub::Hub;
use futures::StreamExt;
use rbp_auth::{AuthRepository, Crypto, Member};
use rbp_core::ID;
use rbp_decision::llm;
use rbp_gameroom::{HistoryRepository, Lifecycle, SessionConfig};
use std::sync::Arc;
use tokio_postgres::Client;

/// Every wire message carries its payload under a nested `data` key, e.g.
/// `{"type":"player_action","data":{"action":"fold","amount":0}}` — matching
/// `original_source/backend/main.py`'s `data.get("data", {})` convention for
/// every branch of its dispatch.
#[derive(serde::Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
enum ClientMessage {
    PlayerAction(serde_json::Value),
    StartNextRound,
    AiCopilotSetting { enabled: bool },
    ReviewRequest { hand: uuid::Uuid },
    NewGame,
    DebugMode { enabled: bool, filter_bots: Option<Vec<String>> },
    Ping,
}

/// Close code sent when the `token` query param is absent.
pub const CLOSE_MISSING_TOKEN: u16 = 4001;
/// Close code sent when the token fails to decode, is expired, or is revoked.
pub const CLOSE_INVALID_TOKEN: u16 = 4003;

async fn authenticate(
    db: &Arc<Client>,
    tokens: &Crypto,
    query: &std::collections::HashMap<String, String>,
) -> Result<ID<Member>, u16> {
    let token = query.get("token").ok_or(CLOSE_MISSING_TOKEN)?;
    let claims = tokens.decode(token).map_err(|_| CLOSE_INVALID_TOKEN)?;
    if claims.expired() {
        return Err(CLOSE_INVALID_TOKEN);
    }
    db.find(claims.user()).await.ok().flatten().ok_or(CLOSE_INVALID_TOKEN)?;
    Ok(claims.user())
}

/// Drives one WebSocket connection end to end. Spawned by the HTTP handler
/// once `actix_ws::handle` has upgraded the socket.
pub async fn bridge(
    hub: Arc<Hub>,
    db: Arc<Client>,
    tokens: Arc<Crypto>,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
    query: std::collections::HashMap<String, String>,
) {
    let user = match authenticate(&db, &tokens, &query).await {
        Ok(user) => user,
        Err(code) => {
            let _ = session
                .close(Some(actix_ws::CloseReason {
                    code: actix_ws::CloseCode::Other(code),
                    description: None,
                }))
                .await;
            return;
        }
    };
    let member = match db.find(user).await {
        Ok(Some(member)) => member,
        _ => return,
    };
    let is_admin = db.is_admin(user).await.unwrap_or(false);
    let user_llm_key = db.get_llm_key(user).await.ok().flatten();

    let (transport_id, mut out_rx) = hub.register_transport(user).await;

    let welcome = serde_json::json!({
        "type": "system",
        "message": "connected",
        "admin": is_admin,
    });
    if session.text(welcome.to_string()).await.is_err() {
        hub.deregister_transport(user, transport_id).await;
        return;
    }
    if user_llm_key.is_none() && std::env::var("DEEPSEEK_API_KEY").is_err() && std::env::var("OPENAI_API_KEY").is_err() && std::env::var("GEMINI_API_KEY").is_err() {
        let _ = session
            .text(serde_json::json!({"type": "needs_api_key"}).to_string())
            .await;
    }

    // Only preload session config from the most recent Session row on a
    // truly first connect (no runtime yet); a bare reconnect must not
    // silently change blinds/stack mid-game.
    let config = match db.get_sessions(user).await {
        Ok(sessions) if !sessions.is_empty() => {
            let last = &sessions[0];
            SessionConfig {
                small_blind: last.small_blind(),
                big_blind: last.big_blind(),
                starting_stack: last.starting_stack(),
                opponents: last.opponents(),
                ..SessionConfig::default()
            }
        }
        _ => SessionConfig::default(),
    };

    let (lifecycle, pending) = hub
        .connect(user, member.username(), config, None, user_llm_key)
        .await;
    log::info!("[ws] user {} connected: {:?}", user, lifecycle);
    if let Lifecycle::Failed(reason) = &lifecycle {
        let _ = session
            .text(serde_json::json!({"type": "error", "message": reason}).to_string())
            .await;
    }
    for event in [pending.round_start, pending.action_request, pending.round_result]
        .into_iter()
        .flatten()
    {
        if let Ok(json) = serde_json::to_string(&event) {
            let _ = session.text(json).await;
        }
    }

    loop {
        tokio::select! {
            biased;
            outbound = out_rx.recv() => match outbound {
                Some(json) => if session.text(json).await.is_err() { break },
                None => break,
            },
            inbound = stream.next() => match inbound {
                Some(Ok(actix_ws::Message::Text(text))) => {
                    handle_client_message(&hub, &db, user, &user_llm_key, is_admin, &mut session, text.to_string()).await;
                }
                Some(Ok(actix_ws::Message::Close(_))) => break,
                Some(Ok(actix_ws::Message::Ping(bytes))) => { let _ = session.pong(&bytes).await; }
                Some(Err(_)) => break,
                None => break,
                _ => continue,
            },
        }
    }
    hub.deregister_transport(user, transport_id).await;
    log::debug!("[ws] user {} transport {} disconnected", user, transport_id);
}

async fn llm_client(
    db: &Arc<Client>,
    user: ID<Member>,
    user_llm_key: &Option<String>,
) -> Option<Arc<dyn llm::LlmClient>> {
    let key = if let Some(key) = user_llm_key.clone() {
        Some(key)
    } else {
        db.get_llm_key(user).await.ok().flatten()
    };
    let key = key
        .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok())
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())?;
    let provider = llm::Provider::resolve(None);
    let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
    Some(llm::build(provider, key, None, model))
}

async fn handle_client_message(
    hub: &Arc<Hub>,
    db: &Arc<Client>,
    user: ID<Member>,
    user_llm_key: &Option<String>,
    is_admin: bool,
    session: &mut actix_ws::Session,
    text: String,
) {
    let Ok(msg) = serde_json::from_str::<ClientMessage>(&text) else {
        let _ = session
            .text(serde_json::json!({"type": "error", "message": "unrecognized message"}).to_string())
            .await;
        return;
    };
    match msg {
        ClientMessage::PlayerAction(data) => {
            hub.handle_player_action(user, "", data.to_string()).await
        }
        ClientMessage::StartNextRound => hub.signal_next_round(user).await,
        ClientMessage::AiCopilotSetting { enabled } => hub.set_ai_copilot_enabled(user, enabled).await,
        ClientMessage::ReviewRequest { hand } => {
            let hub = hub.clone();
            let db = db.clone();
            let user_llm_key = user_llm_key.clone();
            let user_copy = user;
            tokio::task::spawn(async move {
                let llm = llm_client(&db, user_copy, &user_llm_key).await;
                let tier = if llm.is_some() {
                    rbp_gameroom::KeyTier::User
                } else {
                    rbp_gameroom::KeyTier::Environment
                };
                let result = rbp_gameroom::review_hand(&db, llm, tier, ID::from(hand)).await;
                if let Ok(json) = serde_json::to_string(&serde_json::json!({
                    "type": "review_result",
                    "result": result,
                })) {
                    hub.send_to_user(user_copy, &json).await;
                }
            });
        }
        ClientMessage::NewGame => {
            hub.new_game(user).await;
        }
        ClientMessage::DebugMode { enabled, filter_bots } => {
            if is_admin {
                hub.set_debug_mode(user, enabled, filter_bots.clone()).await;
                let _ = session
                    .text(
                        serde_json::json!({
                            "type": "debug_mode_updated",
                            "data": { "enabled": enabled, "filter_bots": filter_bots },
                        })
                        .to_string(),
                    )
                    .await;
            } else {
                let _ = session
                    .text(serde_json::json!({"type": "error", "message": "admin only"}).to_string())
                    .await;
            }
        }
        ClientMessage::Ping => {
            let _ = session.text(serde_json::json!({"type": "pong"}).to_string()).await;
        }
    }
}
