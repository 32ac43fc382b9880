use super::card::Card;
use super::street::Street;

/// The shared community cards, revealed progressively street by street.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    cards: [Option<Card>; 5],
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cards(&self) -> Vec<Card> {
        self.cards.iter().filter_map(|c| *c).collect()
    }

    /// Appends the cards dealt for `street`, assuming `street` is the one just reached.
    pub fn reveal(&mut self, street: Street, dealt: &[Card]) {
        debug_assert_eq!(dealt.len(), street.n_revealed());
        let mut i = self.len();
        for &card in dealt {
            self.cards[i] = Some(card);
            i += 1;
        }
    }

    /// The street implied by how many cards are currently visible.
    pub fn street(&self) -> Street {
        match self.len() {
            0 => Street::Pre,
            3 => Street::Flop,
            4 => Street::Turn,
            5 => Street::River,
            n => unreachable!("board has invalid card count {n}"),
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in self.cards() {
            write!(f, "{card} ")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Deck;

    #[test]
    fn reveal_advances_street() {
        let mut deck = Deck::new();
        let mut board = Board::empty();
        assert_eq!(board.street(), Street::Pre);
        let flop: Vec<Card> = (0..3).map(|_| deck.draw()).collect();
        board.reveal(Street::Flop, &flop);
        assert_eq!(board.street(), Street::Flop);
        assert_eq!(board.len(), 3);
    }
}
