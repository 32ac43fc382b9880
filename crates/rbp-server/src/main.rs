//! Poker server binary: wires authentication, hand-history persistence, and
//! the WebSocket Connection Hub into a single actix-web process.
//!
//! Grounded on the old non-prefixed `crates/server/src/lib.rs::run` — same
//! `App::new()` shape (`Logger`, `Cors`, shared `app_data`, a `/health`
//! route), generalized from "analysis API + room hosting" to "auth + game
//! session HTTP + WS hosting," with the now-renamed `/room` scope replaced
//! by `/api/game` and `/api/auth` per the new contract.

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use rbp_hosting::Hub;
use std::sync::Arc;
use tokio_postgres::Client;

async fn health(client: web::Data<Arc<Client>>) -> impl Responder {
    match client
        .execute("SELECT 1", &[])
        .await
        .inspect_err(|e| log::error!("health check failed: {e}"))
    {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

/// Runs each domain type's `Schema::creates()`/`indices()` against the
/// database. Idempotent (`CREATE TABLE IF NOT EXISTS` / `CREATE INDEX IF
/// NOT EXISTS`) — safe to run on every startup.
async fn migrate(db: &Client) -> anyhow::Result<()> {
    use rbp_pg::Schema;
    async fn apply<S: Schema>(db: &Client) -> anyhow::Result<()> {
        db.batch_execute(S::creates()).await?;
        db.batch_execute(S::indices()).await?;
        Ok(())
    }
    apply::<rbp_auth::Member>(db).await?;
    apply::<rbp_auth::Session>(db).await?;
    apply::<rbp_records::Session>(db).await?;
    apply::<rbp_records::Hand>(db).await?;
    apply::<rbp_records::Participant>(db).await?;
    apply::<rbp_records::Play>(db).await?;
    apply::<rbp_records::Statistics>(db).await?;
    apply::<rbp_records::Review>(db).await?;
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    rbp_core::log();
    rbp_core::kys();

    // `rbp_pg::db()` reads `DB_URL`; accept the spec's `DATABASE_URL` name
    // too so either convention works without touching the teacher's crate.
    if std::env::var("DB_URL").is_err() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            unsafe { std::env::set_var("DB_URL", url) };
        }
    }

    let client = rbp_pg::db().await;
    migrate(&client).await.expect("schema migration failed");

    let tokens = web::Data::new(rbp_auth::Crypto::from_env());
    let hub = web::Data::new(Hub::new(client.clone()));
    let db = web::Data::new(client);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    log::info!("starting poker server on {bind_addr}");

    HttpServer::new(move || {
        let cors = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(origins) => origins
                .split(',')
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin.trim()))
                .allow_any_method()
                .allow_any_header(),
            Err(_) => Cors::default().allow_any_origin().allow_any_method().allow_any_header(),
        };
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(cors)
            .app_data(tokens.clone())
            .app_data(hub.clone())
            .app_data(db.clone())
            .route("/health", web::get().to(health))
            .service(
                web::scope("/api/auth")
                    .route("/register", web::post().to(rbp_auth::register))
                    .route("/login", web::post().to(rbp_auth::login))
                    .route("/logout", web::post().to(rbp_auth::logout))
                    .route("/me", web::get().to(rbp_auth::me))
                    .route("/api-key", web::post().to(rbp_auth::set_api_key))
                    .route("/api-key", web::delete().to(rbp_auth::clear_api_key)),
            )
            .service(
                web::scope("/api/game")
                    .route("/ws", web::get().to(rbp_hosting::handlers::connect))
                    .route("/sessions", web::post().to(rbp_hosting::handlers::create_session))
                    .route("/sessions", web::get().to(rbp_hosting::handlers::list_sessions))
                    .route("/sessions/{id}", web::get().to(rbp_hosting::handlers::get_session))
                    .route(
                        "/sessions/{id}/rounds/{round_id}",
                        web::get().to(rbp_hosting::handlers::get_hand),
                    )
                    .route(
                        "/sessions/{id}/rounds/{round_id}/review",
                        web::post().to(rbp_hosting::handlers::request_review),
                    )
                    .route("/statistics", web::get().to(rbp_hosting::handlers::statistics)),
            )
    })
    .bind(&bind_addr)?
    .run()
    .await
}
