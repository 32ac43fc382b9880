use super::*;
use rbp_auth::Member;
use rbp_core::*;

/// Advisory, account-wide win/loss cache.
///
/// Updated opportunistically after each hand; `recompute_stats` (built from
/// a full scan of the user's sessions) is the ground truth read endpoints
/// fall back on, so staleness here is never user-visible for long.
#[derive(Debug, Clone, Copy, Default)]
pub struct Statistics {
    user: ID<Member>,
    hands_played: u32,
    sessions_played: u32,
    total_profit: Chips,
    win_rate: Probability,
    vpip: Probability,
}

impl Statistics {
    pub fn new(user: ID<Member>) -> Self {
        Self {
            user,
            ..Default::default()
        }
    }
    /// Rebuilds a stats row exactly as persisted. For repository reads only.
    pub fn hydrate(
        user: ID<Member>,
        hands_played: u32,
        sessions_played: u32,
        total_profit: Chips,
        win_rate: Probability,
        vpip: Probability,
    ) -> Self {
        Self {
            user,
            hands_played,
            sessions_played,
            total_profit,
            win_rate,
            vpip,
        }
    }
    pub fn user(&self) -> ID<Member> {
        self.user
    }
    pub fn hands_played(&self) -> u32 {
        self.hands_played
    }
    pub fn sessions_played(&self) -> u32 {
        self.sessions_played
    }
    pub fn total_profit(&self) -> Chips {
        self.total_profit
    }
    pub fn win_rate(&self) -> Probability {
        self.win_rate
    }
    pub fn vpip(&self) -> Probability {
        self.vpip
    }

    /// Recomputes this cache from a set of persisted sessions.
    pub fn recompute<'a>(user: ID<Member>, sessions: impl Iterator<Item = &'a Session>) -> Self {
        let mut hands_played = 0u32;
        let mut sessions_played = 0u32;
        let mut total_profit: Chips = 0;
        let mut win_rate_acc = 0.0f32;
        let mut vpip_acc = 0.0f32;
        for session in sessions {
            sessions_played += 1;
            hands_played += session.hands_played();
            total_profit += session.profit();
            win_rate_acc += session.win_rate() * session.hands_played() as f32;
            vpip_acc += session.vpip() * session.hands_played() as f32;
        }
        let (win_rate, vpip) = if hands_played > 0 {
            (win_rate_acc / hands_played as f32, vpip_acc / hands_played as f32)
        } else {
            (0.0, 0.0)
        };
        Self {
            user,
            hands_played,
            sessions_played,
            total_profit,
            win_rate,
            vpip,
        }
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use rbp_pg::*;

    impl Schema for Statistics {
        fn name() -> &'static str {
            STATISTICS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                STATISTICS,
                " (
                    user_id         UUID PRIMARY KEY REFERENCES ",
                USERS,
                "(id),
                    hands_played    INTEGER NOT NULL DEFAULT 0,
                    sessions_played INTEGER NOT NULL DEFAULT 0,
                    total_profit    BIGINT NOT NULL DEFAULT 0,
                    win_rate        REAL NOT NULL DEFAULT 0,
                    vpip            REAL NOT NULL DEFAULT 0
                );"
            )
        }
        fn indices() -> &'static str {
            ""
        }
        fn truncates() -> &'static str {
            const_format::concatcp!("TRUNCATE TABLE ", STATISTICS, " CASCADE;")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recompute_averages_across_sessions() {
        let user = ID::default();
        let mut a = Session::new(ID::default(), user, 10, 20, 1000, 5);
        a.record_hand(100, true);
        a.record_hand(100, true);
        let mut b = Session::new(ID::default(), user, 10, 20, 1000, 5);
        b.record_hand(-50, false);
        let stats = Statistics::recompute(user, [&a, &b].into_iter());
        assert_eq!(stats.hands_played(), 3);
        assert_eq!(stats.sessions_played(), 2);
        assert_eq!(stats.total_profit(), 150);
    }
}
