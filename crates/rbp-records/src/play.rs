use super::*;
use rbp_auth::Member;
use rbp_core::*;
use rbp_gameplay::Action;

/// A single recorded action within a hand.
/// Composite key: (hand_id, seq)
#[derive(Debug, Clone, Copy)]
pub struct Play {
    hand: ID<Hand>,
    seq: u16,
    seat: Position,
    player: Option<ID<Member>>,
    action: Action,
}

impl Play {
    pub fn new(hand: ID<Hand>, seq: u16, seat: Position, player: Option<ID<Member>>, action: Action) -> Self {
        Self {
            hand,
            seq,
            seat,
            player,
            action,
        }
    }
    pub fn hand(&self) -> ID<Hand> {
        self.hand
    }
    pub fn seq(&self) -> u16 {
        self.seq
    }
    pub fn seat(&self) -> Position {
        self.seat
    }
    pub fn player(&self) -> Option<ID<Member>> {
        self.player
    }
    pub fn action(&self) -> Action {
        self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbp_gameplay::Action;

    #[test]
    fn seat_is_independent_of_seq() {
        let hand = ID::default();
        let play = Play::new(hand, 3, 1, None, Action::Fold);
        assert_eq!(play.seq(), 3);
        assert_eq!(play.seat(), 1);
        assert_eq!(play.player(), None);
    }

    #[test]
    fn retains_the_acting_player() {
        let hand = ID::default();
        let player = ID::default();
        let play = Play::new(hand, 0, 2, Some(player), Action::Check);
        assert_eq!(play.player(), Some(player));
        assert_eq!(play.hand(), hand);
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use rbp_pg::*;

    impl Schema for Play {
        fn name() -> &'static str {
            PLAYS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                PLAYS,
                " (
                    hand_id     UUID NOT NULL REFERENCES ",
                HANDS,
                "(id) ON DELETE CASCADE,
                    seq         SMALLINT NOT NULL,
                    seat        SMALLINT NOT NULL,
                    player_id   UUID REFERENCES ",
                USERS,
                "(id),
                    kind        SMALLINT NOT NULL,
                    amount      BIGINT NOT NULL,
                    PRIMARY KEY (hand_id, seq)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_plays_player ON ",
                PLAYS,
                " (player_id);"
            )
        }
        fn truncates() -> &'static str {
            const_format::concatcp!("TRUNCATE TABLE ", PLAYS, " CASCADE;")
        }
    }
}
