//! HTTP surface for the game-session domain (§4.6): creating and listing
//! sessions, reading hand history and statistics, requesting a review, and
//! the WebSocket upgrade entry point.
use super::hub::Hub;
use super::ws;
use rbp_auth::Auth;
use rbp_core::ID;
use rbp_core::Unique;
use rbp_gameroom::HistoryRepository;
use rbp_records::Session;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

#[derive(serde::Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub small_blind: Option<rbp_core::Chips>,
    #[serde(default)]
    pub big_blind: Option<rbp_core::Chips>,
    #[serde(default)]
    pub starting_stack: Option<rbp_core::Chips>,
    #[serde(default)]
    pub opponents: Option<u8>,
}

pub async fn create_session(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    req: web::Json<CreateSessionRequest>,
) -> impl Responder {
    let session = Session::new(
        ID::default(),
        auth.user(),
        req.small_blind.unwrap_or(rbp_core::DEFAULT_SMALL_BLIND),
        req.big_blind.unwrap_or(rbp_core::DEFAULT_BIG_BLIND),
        req.starting_stack.unwrap_or(rbp_core::DEFAULT_STACK),
        req.opponents.unwrap_or(rbp_core::DEFAULT_NUM_OPPONENTS as u8),
    );
    match db.create_session(&session).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({"id": session.id().to_string()})),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

pub async fn list_sessions(db: web::Data<Arc<Client>>, auth: Auth) -> impl Responder {
    match db.get_sessions(auth.user()).await {
        Ok(sessions) => HttpResponse::Ok().json(
            sessions
                .iter()
                .map(session_json)
                .collect::<Vec<_>>(),
        ),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

pub async fn get_session(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    path: web::Path<uuid::Uuid>,
) -> impl Responder {
    let id = ID::from(path.into_inner());
    match db.get_session(id, auth.user()).await {
        Ok(Some(session)) => HttpResponse::Ok().json(session_json(&session)),
        Ok(None) => HttpResponse::NotFound().body("session not found"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

pub async fn get_hand(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    path: web::Path<(uuid::Uuid, uuid::Uuid)>,
) -> impl Responder {
    let (session_id, hand_id) = path.into_inner();
    let session_id = ID::from(session_id);
    let hand_id = ID::from(hand_id);
    match db.get_session(session_id, auth.user()).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().body("session not found"),
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    }
    let hand = match db.get_hand(hand_id).await {
        Ok(Some(hand)) if hand.session() == session_id => hand,
        Ok(_) => return HttpResponse::NotFound().body("hand not found"),
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    let participants = db.get_participants(hand_id).await.unwrap_or_default();
    let plays = db.get_plays(hand_id).await.unwrap_or_default();
    let review = db.get_review(hand_id).await.unwrap_or(None);
    HttpResponse::Ok().json(serde_json::json!({
        "number": hand.number(),
        "dealer": hand.dealer(),
        "pot": hand.pot(),
        "board": hand.board().to_string(),
        "participants": participants.iter().map(|p| serde_json::json!({
            "seat": p.seat(),
            "user": p.user().map(|u| u.to_string()),
            "stack": p.stack(),
            "showed": p.showed(),
            "mucked": p.mucked(),
        })).collect::<Vec<_>>(),
        "plays": plays.iter().map(|p| serde_json::json!({
            "seq": p.seq(),
            "seat": p.seat(),
            "action": p.action().to_string(),
        })).collect::<Vec<_>>(),
        "review": review.map(|r| r.commentary().to_string()),
    }))
}

pub async fn statistics(db: web::Data<Arc<Client>>, auth: Auth) -> impl Responder {
    match db.get_or_create_stats(auth.user()).await {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "hands_played": stats.hands_played(),
            "sessions_played": stats.sessions_played(),
            "total_profit": stats.total_profit(),
            "win_rate": stats.win_rate(),
            "vpip": stats.vpip(),
        })),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

pub async fn request_review(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    path: web::Path<(uuid::Uuid, uuid::Uuid)>,
) -> impl Responder {
    let (session_id, hand_id) = path.into_inner();
    let session_id = ID::from(session_id);
    let hand_id = ID::from(hand_id);
    match db.get_session(session_id, auth.user()).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().body("session not found"),
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    }
    let key = db.get_llm_key(auth.user()).await.ok().flatten();
    let (llm, tier) = match key {
        Some(k) => (
            Some(rbp_decision::llm::build(rbp_decision::llm::Provider::resolve(None), k, None, "gpt-4o-mini".to_string())),
            rbp_gameroom::KeyTier::User,
        ),
        None => (None, rbp_gameroom::KeyTier::Environment),
    };
    let result = rbp_gameroom::review_hand(&db, llm, tier, hand_id).await;
    HttpResponse::Ok().json(result)
}

fn session_json(session: &Session) -> serde_json::Value {
    serde_json::json!({
        "id": session.id().to_string(),
        "small_blind": session.small_blind(),
        "big_blind": session.big_blind(),
        "starting_stack": session.starting_stack(),
        "opponents": session.opponents(),
        "hands_played": session.hands_played(),
        "profit": session.profit(),
        "win_rate": session.win_rate(),
        "vpip": session.vpip(),
        "ended_at": session.ended_at(),
    })
}

/// WebSocket upgrade entry point. Token is supplied as a `?token=` query
/// param since a browser `WebSocket` constructor cannot set headers.
pub async fn connect(
    hub: web::Data<Arc<Hub>>,
    db: web::Data<Arc<Client>>,
    tokens: web::Data<rbp_auth::Crypto>,
    query: web::Query<std::collections::HashMap<String, String>>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            let hub = hub.get_ref().clone();
            let db = db.get_ref().clone();
            let tokens = tokens.into_inner();
            let query = query.into_inner();
            actix_web::rt::spawn(ws::bridge(hub, db, tokens, session, stream, query));
            response
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}
