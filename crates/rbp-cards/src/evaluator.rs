use crate::card::Card;
use crate::rank::Rank;
use crate::strength::Strength;

/// Evaluates the best five-card hand obtainable from a set of cards (5 to 7 of them).
pub struct Evaluator;

impl Evaluator {
    /// Best [`Strength`] over all 5-card subsets of `cards`.
    ///
    /// Panics if fewer than 5 cards are given.
    pub fn evaluate(cards: &[Card]) -> Strength {
        assert!(cards.len() >= 5, "evaluator needs at least 5 cards");
        combinations(cards, 5)
            .iter()
            .map(|five| classify(five))
            .max()
            .expect("at least one 5-card combination exists")
    }
}

fn combinations(cards: &[Card], k: usize) -> Vec<Vec<Card>> {
    if k == 0 {
        return vec![vec![]];
    }
    if cards.len() < k {
        return vec![];
    }
    let mut out = Vec::new();
    for i in 0..=cards.len() - k {
        for mut tail in combinations(&cards[i + 1..], k - 1) {
            let mut combo = vec![cards[i]];
            combo.append(&mut tail);
            out.push(combo);
        }
    }
    out
}

fn classify(five: &[Card]) -> Strength {
    let mut ranks: Vec<Rank> = five.iter().map(|c| c.rank()).collect();
    ranks.sort();
    let is_flush = five.iter().all(|c| c.suit() == five[0].suit());
    let straight_high = straight_high_rank(&ranks);

    if let Some(high) = straight_high {
        if is_flush {
            return Strength::StraightFlush(high);
        }
    }

    let mut groups: Vec<(Rank, usize)> = Vec::new();
    for &r in &ranks {
        if let Some(g) = groups.iter_mut().find(|(gr, _)| *gr == r) {
            g.1 += 1;
        } else {
            groups.push((r, 1));
        }
    }
    // Sort by count desc, then rank desc, so the most significant group leads.
    groups.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

    match groups.as_slice() {
        [(r, 4), ..] => Strength::FourOfAKind(*r),
        [(r1, 3), (r2, 2), ..] => Strength::FullHouse(*r1, *r2),
        _ if is_flush => Strength::Flush(*ranks.last().unwrap()),
        _ if straight_high.is_some() => Strength::Straight(straight_high.unwrap()),
        [(r, 3), ..] => Strength::ThreeOfAKind(*r),
        [(r1, 2), (r2, 2), ..] => {
            let (hi, lo) = if r1 > r2 { (*r1, *r2) } else { (*r2, *r1) };
            Strength::TwoPair(hi, lo)
        }
        [(r, 2), ..] => Strength::OnePair(*r),
        _ => Strength::HighCard(*ranks.last().unwrap()),
    }
}

/// Highest card of a straight among five sorted ranks, honoring the wheel (A-2-3-4-5).
fn straight_high_rank(sorted: &[Rank]) -> Option<Rank> {
    let mut distinct: Vec<Rank> = sorted.to_vec();
    distinct.dedup();
    if distinct.len() != 5 {
        return None;
    }
    let values: Vec<u8> = distinct.iter().map(|r| u8::from(*r)).collect();
    if values.windows(2).all(|w| w[1] == w[0] + 1) {
        return Some(distinct[4]);
    }
    // Wheel: A,2,3,4,5 — ranks are stored 0=Two..12=Ace, so the wheel is {12,0,1,2,3}.
    if values == [0, 1, 2, 3, 12] {
        return Some(Rank::Five);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::from((rank, suit))
    }

    #[test]
    fn recognizes_flush() {
        let hand = [
            card(Rank::Two, Suit::Spades),
            card(Rank::Five, Suit::Spades),
            card(Rank::Nine, Suit::Spades),
            card(Rank::Jack, Suit::Spades),
            card(Rank::King, Suit::Spades),
        ];
        assert_eq!(Evaluator::evaluate(&hand).category(), crate::ranking::Ranking::Flush);
    }

    #[test]
    fn recognizes_wheel_straight() {
        let hand = [
            card(Rank::Ace, Suit::Clubs),
            card(Rank::Two, Suit::Diamonds),
            card(Rank::Three, Suit::Hearts),
            card(Rank::Four, Suit::Spades),
            card(Rank::Five, Suit::Clubs),
        ];
        let strength = Evaluator::evaluate(&hand);
        assert_eq!(strength.category(), crate::ranking::Ranking::Straight);
        assert_eq!(strength.primary(), Rank::Five);
    }

    #[test]
    fn picks_best_of_seven() {
        let seven = [
            card(Rank::Two, Suit::Clubs),
            card(Rank::Seven, Suit::Diamonds),
            card(Rank::King, Suit::Hearts),
            card(Rank::King, Suit::Spades),
            card(Rank::King, Suit::Clubs),
            card(Rank::King, Suit::Diamonds),
            card(Rank::Nine, Suit::Hearts),
        ];
        assert_eq!(
            Evaluator::evaluate(&seven).category(),
            crate::ranking::Ranking::FourOfAKind
        );
    }
}
