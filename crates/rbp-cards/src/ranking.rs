/// Hand category, independent of the ranks that make it up.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Ranking {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl std::fmt::Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Ranking::HighCard => "High Card",
            Ranking::OnePair => "One Pair",
            Ranking::TwoPair => "Two Pair",
            Ranking::ThreeOfAKind => "Three of a Kind",
            Ranking::Straight => "Straight",
            Ranking::Flush => "Flush",
            Ranking::FullHouse => "Full House",
            Ranking::FourOfAKind => "Four of a Kind",
            Ranking::StraightFlush => "Straight Flush",
        };
        write!(f, "{s}")
    }
}
