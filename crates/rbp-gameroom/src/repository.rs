use rbp_auth::Member;
use rbp_cards::{Board, Hole};
use rbp_core::*;
use rbp_gameplay::Action;
use rbp_pg::*;
use rbp_records::{Hand, Participant, Play, Review, Session, Statistics};
use std::sync::Arc;
use tokio_postgres::Client;

/// Encodes an [`Action`] into the `(kind, amount)` pair the `plays` table stores.
fn encode_action(action: Action) -> (i16, Chips) {
    match action {
        Action::Fold => (0, 0),
        Action::Call(amount) => (1, amount),
        Action::Raise(amount) => (2, amount),
    }
}

fn decode_action(kind: i16, amount: Chips) -> Action {
    match kind {
        0 => Action::Fold,
        2 => Action::Raise(amount),
        _ => Action::Call(amount),
    }
}

/// Repository trait for game session and hand history database operations.
#[allow(async_fn_in_trait)]
pub trait HistoryRepository {
    async fn create_session(&self, session: &Session) -> Result<(), PgErr>;
    async fn end_session(&self, session: ID<Session>, ended_at: i64) -> Result<(), PgErr>;
    async fn update_session_stats(&self, session: &Session) -> Result<(), PgErr>;
    async fn get_session(&self, session: ID<Session>, owner: ID<Member>) -> Result<Option<Session>, PgErr>;
    async fn get_sessions(&self, user: ID<Member>) -> Result<Vec<Session>, PgErr>;

    async fn create_hand(&self, hand: &Hand) -> Result<(), PgErr>;
    async fn get_hand(&self, hand: ID<Hand>) -> Result<Option<Hand>, PgErr>;
    async fn get_hands(&self, session: ID<Session>, limit: i64) -> Result<Vec<ID<Hand>>, PgErr>;

    async fn create_participant(&self, participant: &Participant) -> Result<(), PgErr>;
    async fn get_participants(&self, hand: ID<Hand>) -> Result<Vec<Participant>, PgErr>;
    async fn update_showed(&self, hand: ID<Hand>, seat: Position) -> Result<(), PgErr>;
    async fn update_mucked(&self, hand: ID<Hand>, seat: Position) -> Result<(), PgErr>;
    async fn get_visible(&self, hand: ID<Hand>, seat: Position, viewer: ID<Member>) -> Result<Option<Hole>, PgErr>;

    async fn create_play(&self, play: &Play) -> Result<(), PgErr>;
    async fn get_plays(&self, hand: ID<Hand>) -> Result<Vec<Play>, PgErr>;

    async fn get_or_create_stats(&self, user: ID<Member>) -> Result<Statistics, PgErr>;
    async fn upsert_stats(&self, stats: &Statistics) -> Result<(), PgErr>;

    async fn create_review(&self, review: &Review) -> Result<(), PgErr>;
    async fn get_review(&self, hand: ID<Hand>) -> Result<Option<Review>, PgErr>;
}

impl HistoryRepository for Arc<Client> {
    async fn create_session(&self, session: &Session) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                GAME_SESSIONS,
                " (id, user_id, small_blind, big_blind, starting_stack, opponents)
                 VALUES ($1, $2, $3, $4, $5, $6)"
            ),
            &[
                &session.id().inner(),
                &session.user().inner(),
                &session.small_blind(),
                &session.big_blind(),
                &session.starting_stack(),
                &(session.opponents() as i16),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn end_session(&self, session: ID<Session>, ended_at: i64) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!("UPDATE ", GAME_SESSIONS, " SET ended_at = $2 WHERE id = $1"),
            &[&session.inner(), &ended_at],
        )
        .await
        .map(|_| ())
    }

    async fn update_session_stats(&self, session: &Session) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                GAME_SESSIONS,
                " SET hands_played = $2, profit = $3, win_rate = $4, vpip = $5 WHERE id = $1"
            ),
            &[
                &session.id().inner(),
                &(session.hands_played() as i32),
                &session.profit(),
                &session.win_rate(),
                &session.vpip(),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn get_session(&self, session: ID<Session>, owner: ID<Member>) -> Result<Option<Session>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, user_id, small_blind, big_blind, starting_stack, opponents,
                        hands_played, profit, win_rate, vpip, ended_at
                 FROM ",
                GAME_SESSIONS,
                " WHERE id = $1 AND user_id = $2"
            ),
            &[&session.inner(), &owner.inner()],
        )
        .await
        .map(|opt| opt.map(row_to_session))
    }

    async fn get_sessions(&self, user: ID<Member>) -> Result<Vec<Session>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT id, user_id, small_blind, big_blind, starting_stack, opponents,
                        hands_played, profit, win_rate, vpip, ended_at
                 FROM ",
                GAME_SESSIONS,
                " WHERE user_id = $1 ORDER BY created_at DESC"
            ),
            &[&user.inner()],
        )
        .await
        .map(|rows| rows.iter().map(row_to_session).collect())
    }

    async fn create_hand(&self, hand: &Hand) -> Result<(), PgErr> {
        let board: rbp_cards::Hand = hand.board().into();
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                HANDS,
                " (id, session_id, number, board, pot, dealer) VALUES ($1, $2, $3, $4, $5, $6)"
            ),
            &[
                &hand.id().inner(),
                &hand.session().inner(),
                &(hand.number() as i32),
                &(u64::from(board) as i64),
                &hand.pot(),
                &(hand.dealer() as i16),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn get_hand(&self, hand: ID<Hand>) -> Result<Option<Hand>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, session_id, number, board, pot, dealer FROM ",
                HANDS,
                " WHERE id = $1"
            ),
            &[&hand.inner()],
        )
        .await
        .map(|opt| {
            opt.map(|row| {
                Hand::new(
                    ID::from(row.get::<_, uuid::Uuid>(0)),
                    ID::from(row.get::<_, uuid::Uuid>(1)),
                    row.get::<_, i32>(2) as u32,
                    Board::from(rbp_cards::Hand::from(row.get::<_, i64>(3) as u64)),
                    row.get::<_, Chips>(4),
                    row.get::<_, i16>(5) as Position,
                )
            })
        })
    }

    async fn get_hands(&self, session: ID<Session>, limit: i64) -> Result<Vec<ID<Hand>>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT id FROM ",
                HANDS,
                " WHERE session_id = $1 ORDER BY number DESC LIMIT $2"
            ),
            &[&session.inner(), &limit],
        )
        .await
        .map(|rows| rows.iter().map(|row| ID::from(row.get::<_, uuid::Uuid>(0))).collect())
    }

    async fn create_participant(&self, participant: &Participant) -> Result<(), PgErr> {
        let hole: rbp_cards::Hand = participant.hole().into();
        let user_id: Option<uuid::Uuid> = participant.user().map(|id| id.inner());
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                PARTICIPANTS,
                " (hand_id, user_id, seat, hole, stack, showed, mucked)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)"
            ),
            &[
                &participant.hand().inner(),
                &user_id,
                &(participant.seat() as i16),
                &(u64::from(hole) as i64),
                &participant.stack(),
                &participant.showed(),
                &participant.mucked(),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn get_participants(&self, hand: ID<Hand>) -> Result<Vec<Participant>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT hand_id, user_id, seat, hole, stack, showed, mucked FROM ",
                PARTICIPANTS,
                " WHERE hand_id = $1 ORDER BY seat"
            ),
            &[&hand.inner()],
        )
        .await
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    let user_id: Option<uuid::Uuid> = row.get(1);
                    let mut participant = Participant::new(
                        ID::from(row.get::<_, uuid::Uuid>(0)),
                        user_id.map(ID::from),
                        row.get::<_, i16>(2) as Position,
                        Hole::from(rbp_cards::Hand::from(row.get::<_, i64>(3) as u64)),
                        row.get::<_, Chips>(4),
                    );
                    if row.get::<_, bool>(5) {
                        participant.show();
                    }
                    if row.get::<_, bool>(6) {
                        participant.muck();
                    }
                    participant
                })
                .collect()
        })
    }

    async fn update_showed(&self, hand: ID<Hand>, seat: Position) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                PARTICIPANTS,
                " SET showed = TRUE WHERE hand_id = $1 AND seat = $2"
            ),
            &[&hand.inner(), &(seat as i16)],
        )
        .await
        .map(|_| ())
    }

    async fn update_mucked(&self, hand: ID<Hand>, seat: Position) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                PARTICIPANTS,
                " SET mucked = TRUE WHERE hand_id = $1 AND seat = $2"
            ),
            &[&hand.inner(), &(seat as i16)],
        )
        .await
        .map(|_| ())
    }

    async fn get_visible(&self, hand: ID<Hand>, seat: Position, viewer: ID<Member>) -> Result<Option<Hole>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT hole FROM ",
                PARTICIPANTS,
                " WHERE hand_id = $1 AND seat = $2 AND (user_id = $3 OR showed = TRUE)"
            ),
            &[&hand.inner(), &(seat as i16), &viewer.inner()],
        )
        .await
        .map(|opt| opt.map(|row| Hole::from(rbp_cards::Hand::from(row.get::<_, i64>(0) as u64))))
    }

    async fn create_play(&self, play: &Play) -> Result<(), PgErr> {
        let player_id: Option<uuid::Uuid> = play.player().map(|id| id.inner());
        let (kind, amount) = encode_action(play.action());
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                PLAYS,
                " (hand_id, seq, seat, player_id, kind, amount) VALUES ($1, $2, $3, $4, $5, $6)"
            ),
            &[
                &play.hand().inner(),
                &(play.seq() as i16),
                &(play.seat() as i16),
                &player_id,
                &kind,
                &amount,
            ],
        )
        .await
        .map(|_| ())
    }

    async fn get_plays(&self, hand: ID<Hand>) -> Result<Vec<Play>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT hand_id, seq, seat, player_id, kind, amount FROM ",
                PLAYS,
                " WHERE hand_id = $1 ORDER BY seq"
            ),
            &[&hand.inner()],
        )
        .await
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    let player_id: Option<uuid::Uuid> = row.get(3);
                    Play::new(
                        ID::from(row.get::<_, uuid::Uuid>(0)),
                        row.get::<_, i16>(1) as u16,
                        row.get::<_, i16>(2) as Position,
                        player_id.map(ID::from),
                        decode_action(row.get::<_, i16>(4), row.get::<_, Chips>(5)),
                    )
                })
                .collect()
        })
    }

    async fn get_or_create_stats(&self, user: ID<Member>) -> Result<Statistics, PgErr> {
        let row = self
            .query_opt(
                const_format::concatcp!(
                    "SELECT user_id, hands_played, sessions_played, total_profit, win_rate, vpip FROM ",
                    STATISTICS,
                    " WHERE user_id = $1"
                ),
                &[&user.inner()],
            )
            .await?;
        Ok(match row {
            Some(row) => row_to_statistics(&row),
            None => Statistics::new(user),
        })
    }

    async fn upsert_stats(&self, stats: &Statistics) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                STATISTICS,
                " (user_id, hands_played, sessions_played, total_profit, win_rate, vpip)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (user_id) DO UPDATE SET
                    hands_played = EXCLUDED.hands_played,
                    sessions_played = EXCLUDED.sessions_played,
                    total_profit = EXCLUDED.total_profit,
                    win_rate = EXCLUDED.win_rate,
                    vpip = EXCLUDED.vpip"
            ),
            &[
                &stats.user().inner(),
                &(stats.hands_played() as i32),
                &(stats.sessions_played() as i32),
                &stats.total_profit(),
                &stats.win_rate(),
                &stats.vpip(),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn create_review(&self, review: &Review) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                REVIEWS,
                " (hand_id, commentary) VALUES ($1, $2)
                 ON CONFLICT (hand_id) DO UPDATE SET commentary = EXCLUDED.commentary"
            ),
            &[&review.hand().inner(), &review.commentary()],
        )
        .await
        .map(|_| ())
    }

    async fn get_review(&self, hand: ID<Hand>) -> Result<Option<Review>, PgErr> {
        self.query_opt(
            const_format::concatcp!("SELECT hand_id, commentary FROM ", REVIEWS, " WHERE hand_id = $1"),
            &[&hand.inner()],
        )
        .await
        .map(|opt| opt.map(|row| Review::new(ID::from(row.get::<_, uuid::Uuid>(0)), row.get::<_, String>(1))))
    }
}

fn row_to_session(row: &tokio_postgres::Row) -> Session {
    Session::hydrate(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        ID::from(row.get::<_, uuid::Uuid>(1)),
        row.get::<_, Chips>(2),
        row.get::<_, Chips>(3),
        row.get::<_, Chips>(4),
        row.get::<_, i16>(5) as u8,
        row.get::<_, i32>(6) as u32,
        row.get::<_, Chips>(7),
        row.get::<_, f32>(8),
        row.get::<_, f32>(9),
        row.get::<_, Option<i64>>(10),
    )
}

fn row_to_statistics(row: &tokio_postgres::Row) -> Statistics {
    Statistics::hydrate(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        row.get::<_, i32>(1) as u32,
        row.get::<_, i32>(2) as u32,
        row.get::<_, Chips>(3),
        row.get::<_, f32>(4),
        row.get::<_, f32>(5),
    )
}
