//! AI post-hand review (§2.2): replays a completed hand street by street,
//! asks the configured LLM for commentary, and overwrites any hallucinated
//! `community_cards` mention with the board actually dealt before storing.
//!
//! Invoked from the Connection Hub's `review_request` dispatch, off the
//! cooperative transport loop, in a worker pool — this module itself is
//! just an async function; where it runs is the caller's concern.

use crate::repository::HistoryRepository;
use rbp_core::ID;
use rbp_decision::llm::{LlmClient, Message};
use rbp_records::{Hand, Review};
use std::sync::Arc;
use std::time::Duration;
use tokio_postgres::Client;

/// Which LLM key tier (if any) was attempted, for `LLMUnavailable` reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTier {
    Session,
    User,
    Environment,
}

impl std::fmt::Display for KeyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::User => write!(f, "user"),
            Self::Environment => write!(f, "environment"),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ReviewResult {
    pub hand: u32,
    pub commentary: Option<String>,
    pub error: Option<String>,
}

/// Replays `hand_id` from its persisted rows and asks `llm` for commentary.
/// `llm` is `None` when no key was configured at any tier; `attempted` names
/// the tier that was tried last (for the `error` message), matching §7's
/// `LLMUnavailable` policy.
pub async fn review_hand(
    db: &Arc<Client>,
    llm: Option<Arc<dyn LlmClient>>,
    attempted: KeyTier,
    hand_id: ID<Hand>,
) -> ReviewResult {
    if let Ok(Some(existing)) = db.get_review(hand_id).await {
        let hand = db.get_hand(hand_id).await.ok().flatten().map(|h| h.number()).unwrap_or(0);
        return ReviewResult { hand, commentary: Some(existing.commentary().to_string()), error: None };
    }

    let hand = match db.get_hand(hand_id).await {
        Ok(Some(hand)) => hand,
        Ok(None) => return ReviewResult { hand: 0, commentary: None, error: Some("hand not found".into()) },
        Err(e) => return ReviewResult { hand: 0, commentary: None, error: Some(e.to_string()) },
    };
    let participants = db.get_participants(hand_id).await.unwrap_or_default();
    let plays = db.get_plays(hand_id).await.unwrap_or_default();

    let Some(llm) = llm else {
        return ReviewResult {
            hand: hand.number(),
            commentary: None,
            error: Some(format!("no LLM key configured (tried: {attempted})")),
        };
    };

    let transcript = transcript(&hand, &participants, &plays);
    let messages = [
        Message::system(
            "You are a poker coach. Given a hand transcript, give brief \
             street-by-street commentary and an overall verdict. Respond as \
             JSON: {\"streets\":[{\"street\":string,\"commentary\":string}],\
             \"verdict\":string,\"community_cards\":string}.",
        ),
        Message::user(transcript),
    ];

    let raw = match llm.chat(&messages, Some(0.4), Some(600), Duration::from_secs(20)).await {
        Ok(text) => text,
        Err(e) => {
            return ReviewResult {
                hand: hand.number(),
                commentary: None,
                error: Some(format!("LLM call failed (tried: {attempted}): {e}")),
            };
        }
    };

    let commentary = sanitize(&raw, &hand.board().to_string());
    let review = Review::new(hand_id, commentary.clone());
    if let Err(e) = db.create_review(&review).await {
        log::warn!("failed to persist review for hand {}: {e}", hand.number());
    }
    ReviewResult { hand: hand.number(), commentary: Some(commentary), error: None }
}

fn transcript(
    hand: &Hand,
    participants: &[rbp_records::Participant],
    plays: &[rbp_records::Play],
) -> String {
    let mut out = format!(
        "Hand #{} — dealer seat {}, board {}, pot {}\n",
        hand.number(),
        hand.dealer(),
        hand.board(),
        hand.pot()
    );
    for p in participants {
        out.push_str(&format!(
            "Seat {}: {} (stack after {}){}\n",
            p.seat(),
            p.hole(),
            p.stack(),
            if p.showed() { ", showed" } else if p.mucked() { ", mucked" } else { "" },
        ));
    }
    for play in plays {
        out.push_str(&format!("  seat {} -> {}\n", play.seat(), play.action()));
    }
    out
}

/// Replaces whatever `community_cards` value the LLM returned with the board
/// actually dealt — the LLM has no ground truth beyond the transcript we
/// sent it and is prone to inventing cards.
fn sanitize(raw: &str, actual_board: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(mut obj)) => {
            obj.insert("community_cards".to_string(), serde_json::Value::String(actual_board.to_string()));
            serde_json::to_string(&obj).unwrap_or_else(|_| raw.to_string())
        }
        _ => serde_json::json!({
            "streets": [],
            "verdict": raw,
            "community_cards": actual_board,
        })
        .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrites_hallucinated_board() {
        let raw = r#"{"streets":[],"verdict":"solid fold","community_cards":"made up cards"}"#;
        let out = sanitize(raw, "Ah Kd 2c");
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["community_cards"], "Ah Kd 2c");
        assert_eq!(parsed["verdict"], "solid fold");
    }

    #[test]
    fn wraps_non_json_response_as_verdict() {
        let out = sanitize("not json at all", "Ah Kd 2c");
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["verdict"], "not json at all");
        assert_eq!(parsed["community_cards"], "Ah Kd 2c");
        assert_eq!(parsed["streets"], serde_json::json!([]));
    }

    #[test]
    fn key_tier_display_matches_policy_wording() {
        assert_eq!(KeyTier::Session.to_string(), "session");
        assert_eq!(KeyTier::User.to_string(), "user");
        assert_eq!(KeyTier::Environment.to_string(), "environment");
    }
}

