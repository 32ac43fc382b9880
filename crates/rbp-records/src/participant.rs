use super::*;
use rbp_auth::Member;
use rbp_cards::Hole;
use rbp_core::*;

/// A seat's participation in a single hand.
/// Composite key: (hand_id, seat)
#[derive(Debug, Clone)]
pub struct Participant {
    hand: ID<Hand>,
    user: Option<ID<Member>>,
    seat: Position,
    hole: Hole,
    stack: Chips,
    showed: bool,
    mucked: bool,
}

impl Participant {
    pub fn new(
        hand: ID<Hand>,
        user: Option<ID<Member>>,
        seat: Position,
        hole: Hole,
        stack: Chips,
    ) -> Self {
        Self {
            hand,
            user,
            seat,
            hole,
            stack,
            showed: false,
            mucked: false,
        }
    }
    pub fn hand(&self) -> ID<Hand> {
        self.hand
    }
    pub fn user(&self) -> Option<ID<Member>> {
        self.user
    }
    pub fn seat(&self) -> Position {
        self.seat
    }
    pub fn hole(&self) -> Hole {
        self.hole
    }
    pub fn stack(&self) -> Chips {
        self.stack
    }
    pub fn showed(&self) -> bool {
        self.showed
    }
    pub fn mucked(&self) -> bool {
        self.mucked
    }
    pub fn show(&mut self) {
        self.showed = true;
    }
    pub fn muck(&mut self) {
        self.mucked = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbp_cards::Card;

    fn hole() -> Hole {
        Hole::from((Card::from(0u8), Card::from(1u8)))
    }

    #[test]
    fn starts_unshowed_and_unmucked() {
        let p = Participant::new(ID::default(), None, 0, hole(), 1000);
        assert!(!p.showed());
        assert!(!p.mucked());
    }

    #[test]
    fn show_and_muck_are_independent_flags() {
        let mut p = Participant::new(ID::default(), None, 0, hole(), 1000);
        p.show();
        assert!(p.showed());
        assert!(!p.mucked());
        p.muck();
        assert!(p.mucked());
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use rbp_pg::*;

    impl Schema for Participant {
        fn name() -> &'static str {
            PARTICIPANTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                PARTICIPANTS,
                " (
                    hand_id     UUID NOT NULL REFERENCES ",
                HANDS,
                "(id) ON DELETE CASCADE,
                    user_id     UUID REFERENCES ",
                USERS,
                "(id),
                    seat        SMALLINT NOT NULL,
                    hole        BIGINT NOT NULL,
                    stack       BIGINT NOT NULL,
                    showed      BOOLEAN NOT NULL DEFAULT FALSE,
                    mucked      BOOLEAN NOT NULL DEFAULT FALSE,
                    PRIMARY KEY (hand_id, seat)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_participants_user ON ",
                PARTICIPANTS,
                " (user_id);"
            )
        }
        fn truncates() -> &'static str {
            const_format::concatcp!("TRUNCATE TABLE ", PARTICIPANTS, " CASCADE;")
        }
    }
}
