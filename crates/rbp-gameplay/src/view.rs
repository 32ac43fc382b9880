use crate::action::Legal;
use crate::game::Game;
use crate::seat::State;
use rbp_cards::{Board, Hole, Street};
use rbp_core::{Chips, Position};

/// What a single seat can see when it's asked to decide.
///
/// Carries only public state plus that seat's own hole cards — never an
/// opponent's cards before showdown.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct View {
    pub position: Position,
    pub hole: Hole,
    pub board: Board,
    pub street: Street,
    pub pot: Chips,
    pub stack: Chips,
    pub to_call: Chips,
    pub legal: Legal,
    pub opponents: Vec<Opponent>,
}

/// Public information about another seat, as seen from `View::position`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Opponent {
    pub position: Position,
    pub stack: Chips,
    pub stake: Chips,
    pub state: State,
}

impl View {
    pub fn of(game: &Game, position: Position) -> Self {
        let seat = game.seat(position);
        let opponents = (0..game.n())
            .filter(|&i| i != position)
            .map(|i| {
                let other = game.seat(i);
                Opponent {
                    position: i,
                    stack: other.stack(),
                    stake: other.stake(),
                    state: other.state(),
                }
            })
            .collect();
        Self {
            position,
            hole: seat.cards(),
            board: game.board(),
            street: game.street(),
            pot: game.pot(),
            stack: seat.stack(),
            to_call: game.to_call(position),
            legal: game.legal_for(position),
            opponents,
        }
    }
}
