use super::*;
use rbp_core::*;

/// Persisted AI commentary for a completed hand.
///
/// Produced by the Review service: replays the hand street by street, asks
/// the configured LLM for commentary, and overwrites any hallucinated
/// `community_cards` mention with the board actually dealt before storing.
#[derive(Debug, Clone)]
pub struct Review {
    hand: ID<Hand>,
    commentary: String,
}

impl Review {
    pub fn new(hand: ID<Hand>, commentary: String) -> Self {
        Self { hand, commentary }
    }
    pub fn hand(&self) -> ID<Hand> {
        self.hand
    }
    pub fn commentary(&self) -> &str {
        &self.commentary
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use rbp_pg::*;

    impl Schema for Review {
        fn name() -> &'static str {
            REVIEWS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                REVIEWS,
                " (
                    hand_id     UUID PRIMARY KEY REFERENCES ",
                HANDS,
                "(id) ON DELETE CASCADE,
                    commentary  TEXT NOT NULL,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            ""
        }
        fn truncates() -> &'static str {
            const_format::concatcp!("TRUNCATE TABLE ", REVIEWS, " CASCADE;")
        }
    }
}
