use crate::rank::Rank;
use crate::ranking::Ranking;
use std::cmp::Ordering;
use std::fmt::Display;

/// A fully evaluated hand: category plus enough rank information to break ties.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Strength {
    HighCard(Rank),
    OnePair(Rank),
    TwoPair(Rank, Rank),
    ThreeOfAKind(Rank),
    Straight(Rank),
    Flush(Rank),
    FullHouse(Rank, Rank),
    FourOfAKind(Rank),
    StraightFlush(Rank),
}

impl Strength {
    pub fn category(&self) -> Ranking {
        match self {
            Strength::HighCard(_) => Ranking::HighCard,
            Strength::OnePair(_) => Ranking::OnePair,
            Strength::TwoPair(_, _) => Ranking::TwoPair,
            Strength::ThreeOfAKind(_) => Ranking::ThreeOfAKind,
            Strength::Straight(_) => Ranking::Straight,
            Strength::Flush(_) => Ranking::Flush,
            Strength::FullHouse(_, _) => Ranking::FullHouse,
            Strength::FourOfAKind(_) => Ranking::FourOfAKind,
            Strength::StraightFlush(_) => Ranking::StraightFlush,
        }
    }

    /// The rank that decides the hand (pair rank, trips rank, top card of a straight, etc).
    pub fn primary(&self) -> Rank {
        match self {
            Strength::HighCard(r)
            | Strength::OnePair(r)
            | Strength::ThreeOfAKind(r)
            | Strength::Straight(r)
            | Strength::Flush(r)
            | Strength::FourOfAKind(r)
            | Strength::StraightFlush(r) => *r,
            Strength::TwoPair(r, _) | Strength::FullHouse(r, _) => *r,
        }
    }
}

impl Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strength::HighCard(r) => write!(f, "HighCard      {}", r),
            Strength::OnePair(r) => write!(f, "OnePair       {}", r),
            Strength::TwoPair(r1, r2) => write!(f, "TwoPair       {}, {}", r1, r2),
            Strength::ThreeOfAKind(r) => write!(f, "ThreeOfAKind  {}", r),
            Strength::Straight(r) => write!(f, "Straight      {}", r),
            Strength::Flush(r) => write!(f, "Flush         {}", r),
            Strength::FullHouse(r1, r2) => write!(f, "FullHouse     {}, {}", r1, r2),
            Strength::FourOfAKind(r) => write!(f, "FourOfAKind   {}", r),
            Strength::StraightFlush(r) => write!(f, "StraightFlush {}", r),
        }
    }
}

impl Ord for Strength {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.category().cmp(&other.category()) {
            Ordering::Equal => match (self, other) {
                (Strength::StraightFlush(a), Strength::StraightFlush(b))
                | (Strength::FourOfAKind(a), Strength::FourOfAKind(b))
                | (Strength::Flush(a), Strength::Flush(b))
                | (Strength::Straight(a), Strength::Straight(b))
                | (Strength::ThreeOfAKind(a), Strength::ThreeOfAKind(b))
                | (Strength::OnePair(a), Strength::OnePair(b))
                | (Strength::HighCard(a), Strength::HighCard(b)) => a.cmp(b),
                (Strength::TwoPair(a1, a2), Strength::TwoPair(b1, b2))
                | (Strength::FullHouse(a1, a2), Strength::FullHouse(b1, b2)) => {
                    match a1.cmp(b1) {
                        Ordering::Equal => a2.cmp(b2),
                        primary => primary,
                    }
                }
                _ => unreachable!("same category implies same variant shape"),
            },
            category => category,
        }
    }
}

impl PartialOrd for Strength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_flush_beats_quads() {
        assert!(Strength::StraightFlush(Rank::Ace) > Strength::FourOfAKind(Rank::Ace));
    }

    #[test]
    fn higher_pair_wins_within_category() {
        assert!(Strength::OnePair(Rank::King) > Strength::OnePair(Rank::Two));
    }

    #[test]
    fn full_house_breaks_ties_on_trip_rank_first() {
        let a = Strength::FullHouse(Rank::King, Rank::Two);
        let b = Strength::FullHouse(Rank::Queen, Rank::Ace);
        assert!(a > b);
    }
}
