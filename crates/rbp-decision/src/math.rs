//! Equity, pot odds, stack-depth, and board/hand classification used to
//! build the Decision Kernel's prompts (and the human copilot's hints).

use rand::seq::SliceRandom;
use rand::Rng;
use rbp_cards::{Board, Card, Evaluator, Hole, Rank, Ranking, Suit};
use rbp_core::{Chips, Probability};

/// Every card not already accounted for in `known`.
fn remaining_deck(known: &[Card]) -> Vec<Card> {
    Rank::all()
        .into_iter()
        .flat_map(|r| Suit::all().into_iter().map(move |s| Card::from((r, s))))
        .filter(|c| !known.contains(c))
        .collect()
}

/// Monte Carlo equity of `hole` against `opponents` random hands, given the
/// already-revealed `board`. Deterministic for a fixed `rng` and iteration count.
pub fn equity(
    hole: Hole,
    board: Board,
    opponents: usize,
    iterations: usize,
    rng: &mut impl Rng,
) -> Probability {
    if opponents == 0 {
        return 1.0;
    }
    let board_cards = board.cards();
    let hole_cards = hole.cards();
    let mut known: Vec<Card> = board_cards.clone();
    known.extend(hole_cards);

    let missing_board = 5 - board_cards.len();
    let mut wins = 0.0f64;

    for _ in 0..iterations.max(1) {
        let mut deck = remaining_deck(&known);
        deck.shuffle(rng);
        let mut draw = deck.into_iter();

        let mut full_board = board_cards.clone();
        full_board.extend((&mut draw).take(missing_board));

        let hero_seven: Vec<Card> = hole_cards.iter().chain(full_board.iter()).copied().collect();
        let hero_strength = Evaluator::evaluate(&hero_seven);

        let mut opponent_hands = Vec::with_capacity(opponents);
        for _ in 0..opponents {
            let opp_hole: Vec<Card> = (&mut draw).take(2).collect();
            let seven: Vec<Card> = opp_hole.iter().chain(full_board.iter()).copied().collect();
            opponent_hands.push(Evaluator::evaluate(&seven));
        }

        let best_opponent = opponent_hands.iter().max().copied();
        match best_opponent {
            Some(best) if best > hero_strength => {}
            Some(best) if best == hero_strength => {
                let tied = 1 + opponent_hands.iter().filter(|&&s| s == best).count();
                wins += 1.0 / tied as f64;
            }
            _ => wins += 1.0,
        }
    }

    (wins / iterations.max(1) as f64) as Probability
}

/// `to_call / (pot + to_call)`, zero if nothing to call.
pub fn pot_odds(pot: Chips, to_call: Chips) -> Probability {
    if to_call <= 0 {
        0.0
    } else {
        to_call as Probability / (pot + to_call) as Probability
    }
}

/// Expected value of calling: `equity * pot - (1 - equity) * to_call`.
pub fn ev_call(equity: Probability, pot: Chips, to_call: Chips) -> Probability {
    equity * pot as Probability - (1.0 - equity) * to_call as Probability
}

/// Stack-to-pot ratio, or `None` when the pot is empty ("N/A").
pub fn spr(effective_stack: Chips, pot: Chips) -> Option<Probability> {
    if pot <= 0 {
        None
    } else {
        Some(effective_stack as Probability / pot as Probability)
    }
}

/// Effective stack expressed in big blinds.
pub fn effective_stack_bb(effective_stack: Chips, big_blind: Chips) -> Probability {
    if big_blind <= 0 {
        0.0
    } else {
        effective_stack as Probability / big_blind as Probability
    }
}

/// Coarse classification of how dangerous the board texture is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Texture {
    Dry,
    SemiWet,
    Wet,
}

impl std::fmt::Display for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Texture::Dry => "dry",
            Texture::SemiWet => "semi_wet",
            Texture::Wet => "wet",
        };
        write!(f, "{s}")
    }
}

/// Board-texture flags plus the aggregated [`Texture`] bucket.
#[derive(Debug, Clone, Copy)]
pub struct BoardTexture {
    pub paired: bool,
    pub flush_possible: bool,
    pub flush_draw: bool,
    pub straight_possible: bool,
    pub straight_draw: bool,
    pub texture: Texture,
}

/// Classifies `board` by suit/rank clustering. Empty or single-card boards
/// (preflop, or right after the flop's first card conceptually) are always dry.
pub fn board_texture(board: &Board) -> BoardTexture {
    let cards = board.cards();
    let paired = {
        let mut ranks: Vec<Rank> = cards.iter().map(|c| c.rank()).collect();
        ranks.sort();
        ranks.windows(2).any(|w| w[0] == w[1])
    };

    let mut suit_counts = [0usize; 4];
    for c in &cards {
        suit_counts[u8::from(c.suit()) as usize] += 1;
    }
    let max_suit = suit_counts.into_iter().max().unwrap_or(0);
    let flush_possible = max_suit >= 3;
    let flush_draw = max_suit == 2;

    let mut rank_values: Vec<u8> = cards.iter().map(|c| u8::from(c.rank())).collect();
    rank_values.sort();
    rank_values.dedup();
    let (mut straight_possible, mut straight_draw) = (false, false);
    let window_size = rank_values.len().min(3);
    if window_size >= 2 {
        for window in rank_values.windows(window_size) {
            let span = window.last().unwrap() - window.first().unwrap();
            if span <= 4 {
                straight_possible = true;
            }
            if span <= 3 {
                straight_draw = true;
            }
        }
    }

    let wetness = [paired, flush_possible, flush_draw, straight_possible, straight_draw]
        .iter()
        .filter(|&&f| f)
        .count();
    let texture = match wetness {
        0 => Texture::Dry,
        1 | 2 => Texture::SemiWet,
        _ => Texture::Wet,
    };

    BoardTexture { paired, flush_possible, flush_draw, straight_possible, straight_draw, texture }
}

/// Human-readable description of the hero's made hand, distinguishing
/// hole-pair-derived hands (sets) from board-pair-derived ones (trips).
pub fn made_hand_description(hole: Hole, board: &Board) -> (Ranking, String) {
    let board_cards = board.cards();
    let seven: Vec<Card> = hole.cards().iter().chain(board_cards.iter()).copied().collect();
    let strength = Evaluator::evaluate(&seven);
    let category = strength.category();
    let hole_ranks: Vec<Rank> = hole.cards().iter().map(|c| c.rank()).collect();
    let board_ranks: Vec<Rank> = board_cards.iter().map(|c| c.rank()).collect();

    let description = match category {
        Ranking::ThreeOfAKind => {
            let rank = strength.primary();
            let hole_pair = hole_ranks.iter().filter(|&&r| r == rank).count() == 2;
            if hole_pair { "a set".to_string() } else { "trips".to_string() }
        }
        Ranking::OnePair => {
            let rank = strength.primary();
            let mut distinct_board: Vec<Rank> = board_ranks.clone();
            distinct_board.sort();
            distinct_board.dedup();
            if hole_ranks.contains(&rank) && !board_ranks.contains(&rank) {
                "a pocket pair".to_string()
            } else if let Some(pos) = distinct_board.iter().position(|&r| r == rank) {
                match pos {
                    p if p + 1 == distinct_board.len() => "top pair".to_string(),
                    0 => "bottom pair".to_string(),
                    _ => "middle pair".to_string(),
                }
            } else {
                "a pair".to_string()
            }
        }
        other => other.to_string(),
    };
    (category, description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::from((rank, suit))
    }

    #[test]
    fn equity_is_deterministic_given_a_seed() {
        let hole = Hole::from((card(Rank::Ace, Suit::Spades), card(Rank::King, Suit::Spades)));
        let board = Board::empty();
        let mut rng1 = SmallRng::seed_from_u64(42);
        let mut rng2 = SmallRng::seed_from_u64(42);
        let e1 = equity(hole, board, 1, 200, &mut rng1);
        let e2 = equity(hole, board, 1, 200, &mut rng2);
        assert_eq!(e1, e2);
    }

    #[test]
    fn pot_odds_zero_when_nothing_to_call() {
        assert_eq!(pot_odds(100, 0), 0.0);
    }

    #[test]
    fn spr_is_none_when_pot_is_empty() {
        assert_eq!(spr(500, 0), None);
    }

    #[test]
    fn set_is_distinguished_from_trips() {
        let hole = Hole::from((card(Rank::Nine, Suit::Clubs), card(Rank::Nine, Suit::Diamonds)));
        let mut board = Board::empty();
        board.reveal(
            rbp_cards::Street::Flop,
            &[card(Rank::Nine, Suit::Hearts), card(Rank::Two, Suit::Spades), card(Rank::Seven, Suit::Clubs)],
        );
        let (category, description) = made_hand_description(hole, &board);
        assert_eq!(category, Ranking::ThreeOfAKind);
        assert_eq!(description, "a set");
    }
}
