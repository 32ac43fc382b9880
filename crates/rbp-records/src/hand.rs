use super::*;
use rbp_cards::*;
use rbp_core::*;

/// Persistent hand record for a completed poker hand.
#[derive(Debug, Clone)]
pub struct Hand {
    id: ID<Self>,
    session: ID<Session>,
    number: u32,
    board: Board,
    pot: Chips,
    dealer: Position,
}

impl Hand {
    pub fn new(
        id: ID<Self>,
        session: ID<Session>,
        number: u32,
        board: Board,
        pot: Chips,
        dealer: Position,
    ) -> Self {
        Self {
            id,
            session,
            number,
            board,
            pot,
            dealer,
        }
    }
    pub fn session(&self) -> ID<Session> {
        self.session
    }
    pub fn number(&self) -> u32 {
        self.number
    }
    pub fn board(&self) -> Board {
        self.board
    }
    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn dealer(&self) -> Position {
        self.dealer
    }
}

impl Unique for Hand {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use rbp_pg::*;

    impl Schema for Hand {
        fn name() -> &'static str {
            HANDS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                HANDS,
                " (
                    id          UUID PRIMARY KEY,
                    session_id  UUID NOT NULL REFERENCES ",
                GAME_SESSIONS,
                "(id) ON DELETE CASCADE,
                    number      INTEGER NOT NULL,
                    board       BIGINT NOT NULL,
                    pot         BIGINT NOT NULL,
                    dealer      SMALLINT NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_hands_session ON ",
                HANDS,
                " (session_id);"
            )
        }
        fn truncates() -> &'static str {
            const_format::concatcp!("TRUNCATE TABLE ", HANDS, " CASCADE;")
        }
    }
}
