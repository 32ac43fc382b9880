use super::*;
use rbp_auth::Member;
use rbp_cards::{Board, Hole, Street};
use rbp_core::*;
use rbp_gameplay::{Action, Game};

/// In-flight hand recording state.
///
/// Snapshots seats at hand start and accumulates actions as the hand is
/// played; consumed at hand end to produce the persisted [`Hand`],
/// [`Participant`], and [`Play`] rows.
#[derive(Debug, Clone)]
pub struct Replay {
    id: ID<Hand>,
    number: u32,
    dealer: Position,
    seats: Vec<(Hole, Chips)>,
    plays: Vec<(Position, Street, Action)>,
}

impl Replay {
    /// Starts a new replay from the state of a freshly dealt hand.
    pub fn new(number: u32, game: &Game) -> Self {
        Self {
            id: ID::default(),
            number,
            dealer: game.button(),
            seats: game.seats().iter().map(|s| (s.cards(), s.stack())).collect(),
            plays: Vec::new(),
        }
    }
    pub fn id(&self) -> ID<Hand> {
        self.id
    }
    pub fn number(&self) -> u32 {
        self.number
    }
    pub fn dealer(&self) -> Position {
        self.dealer
    }
    pub fn seats(&self) -> &[(Hole, Chips)] {
        &self.seats
    }
    pub fn plays(&self) -> &[(Position, Street, Action)] {
        &self.plays
    }
    /// `street` is the street the action was taken on, not the street it
    /// may have closed out — callers pass `game.street()` from before
    /// applying the action.
    pub fn record(&mut self, pos: Position, street: Street, action: Action) {
        self.plays.push((pos, street, action));
    }

    /// Converts to the persisted [`Hand`] record.
    pub fn to_hand(&self, session: ID<Session>, board: Board, pot: Chips) -> Hand {
        Hand::new(self.id, session, self.number, board, pot, self.dealer)
    }

    /// Builds the [`Participant`] rows, resolving each seat's owning user via `f`.
    pub fn to_participants<F>(&self, hand: ID<Hand>, f: F) -> Vec<Participant>
    where
        F: Fn(Position) -> Option<ID<Member>>,
    {
        self.seats
            .iter()
            .enumerate()
            .map(|(i, (hole, stack))| Participant::new(hand, f(i), i, *hole, *stack))
            .collect()
    }

    /// Builds the [`Play`] rows, resolving each seat's owning user via `f`.
    pub fn to_plays<F>(&self, hand: ID<Hand>, f: F) -> Vec<Play>
    where
        F: Fn(Position) -> Option<ID<Member>>,
    {
        self.plays
            .iter()
            .enumerate()
            .map(|(i, (pos, _, action))| Play::new(hand, i as u16, *pos, f(*pos), *action))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_actions_in_order() {
        let game = Game::deal(vec![1000, 1000], 0, 10, 20);
        let mut replay = Replay::new(1, &game);
        replay.record(0, Street::Pre, Action::Fold);
        assert_eq!(replay.plays().len(), 1);
        assert_eq!(replay.plays()[0], (0, Street::Pre, Action::Fold));
    }
}
