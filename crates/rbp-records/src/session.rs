use super::*;
use rbp_auth::Member;
use rbp_core::*;

/// A human's ongoing poker session against its bot opponents.
///
/// The live orchestration (worker thread, channels, pending state) lives in
/// `rbp-gameroom`; this is the persisted row plus the advisory stats cache
/// served by read endpoints until `recompute_stats` overwrites it.
#[derive(Debug, Clone)]
pub struct Session {
    id: ID<Self>,
    user: ID<Member>,
    small_blind: Chips,
    big_blind: Chips,
    starting_stack: Chips,
    opponents: u8,
    hands_played: u32,
    profit: Chips,
    win_rate: Probability,
    vpip: Probability,
    ended_at: Option<i64>,
}

impl Session {
    pub fn new(
        id: ID<Self>,
        user: ID<Member>,
        small_blind: Chips,
        big_blind: Chips,
        starting_stack: Chips,
        opponents: u8,
    ) -> Self {
        Self {
            id,
            user,
            small_blind,
            big_blind,
            starting_stack,
            opponents,
            hands_played: 0,
            profit: 0,
            win_rate: 0.0,
            vpip: 0.0,
            ended_at: None,
        }
    }
    /// Rebuilds a session row exactly as persisted, bypassing `record_hand`'s
    /// running-average bookkeeping. For repository reads only.
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: ID<Self>,
        user: ID<Member>,
        small_blind: Chips,
        big_blind: Chips,
        starting_stack: Chips,
        opponents: u8,
        hands_played: u32,
        profit: Chips,
        win_rate: Probability,
        vpip: Probability,
        ended_at: Option<i64>,
    ) -> Self {
        Self {
            id,
            user,
            small_blind,
            big_blind,
            starting_stack,
            opponents,
            hands_played,
            profit,
            win_rate,
            vpip,
            ended_at,
        }
    }
    pub fn user(&self) -> ID<Member> {
        self.user
    }
    pub fn small_blind(&self) -> Chips {
        self.small_blind
    }
    pub fn big_blind(&self) -> Chips {
        self.big_blind
    }
    pub fn starting_stack(&self) -> Chips {
        self.starting_stack
    }
    pub fn opponents(&self) -> u8 {
        self.opponents
    }
    pub fn hands_played(&self) -> u32 {
        self.hands_played
    }
    pub fn profit(&self) -> Chips {
        self.profit
    }
    pub fn win_rate(&self) -> Probability {
        self.win_rate
    }
    pub fn vpip(&self) -> Probability {
        self.vpip
    }
    pub fn ended_at(&self) -> Option<i64> {
        self.ended_at
    }
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Updates the running per-session stats after a completed hand.
    ///
    /// `win_rate`/`vpip` are stored as percentages (0-100), matching the
    /// persisted `Numeric(5,2)` convention, not as 0-1 fractions.
    pub fn record_hand(&mut self, profit: Chips, voluntarily_played: bool) {
        self.hands_played += 1;
        self.profit += profit;
        let n = self.hands_played as f32;
        self.win_rate = ((self.win_rate * (n - 1.0)) + if profit > 0 { 100.0 } else { 0.0 }) / n;
        self.vpip = ((self.vpip * (n - 1.0)) + if voluntarily_played { 100.0 } else { 0.0 }) / n;
    }
    pub fn end(&mut self, ended_at: i64) {
        self.ended_at = Some(ended_at);
    }
}

impl Unique for Session {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use rbp_pg::*;

    impl Schema for Session {
        fn name() -> &'static str {
            GAME_SESSIONS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                GAME_SESSIONS,
                " (
                    id              UUID PRIMARY KEY,
                    user_id         UUID NOT NULL REFERENCES ",
                USERS,
                "(id),
                    small_blind     BIGINT NOT NULL,
                    big_blind       BIGINT NOT NULL,
                    starting_stack  BIGINT NOT NULL,
                    opponents       SMALLINT NOT NULL,
                    hands_played    INTEGER NOT NULL DEFAULT 0,
                    profit          BIGINT NOT NULL DEFAULT 0,
                    win_rate        REAL NOT NULL DEFAULT 0,
                    vpip            REAL NOT NULL DEFAULT 0,
                    created_at      BIGINT NOT NULL DEFAULT extract(epoch from now())::bigint,
                    ended_at        BIGINT
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_sessions_user ON ",
                GAME_SESSIONS,
                " (user_id);"
            )
        }
        fn truncates() -> &'static str {
            const_format::concatcp!("TRUNCATE TABLE ", GAME_SESSIONS, " CASCADE;")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_hand_updates_running_averages() {
        let mut session = Session::new(ID::default(), ID::default(), 10, 20, 1000, 5);
        session.record_hand(50, true);
        session.record_hand(-20, false);
        assert_eq!(session.hands_played(), 2);
        assert_eq!(session.profit(), 30);
        assert!((session.win_rate() - 50.0).abs() < 1e-4);
        assert!((session.vpip() - 50.0).abs() < 1e-4);
    }
}
