/// One of the four betting rounds.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "client", serde(rename_all = "lowercase"))]
pub enum Street {
    Pre,
    Flop,
    Turn,
    River,
}

impl Street {
    /// The street after this one, saturating at River.
    pub fn next(&self) -> Street {
        match self {
            Street::Pre => Street::Flop,
            Street::Flop => Street::Turn,
            Street::Turn => Street::River,
            Street::River => Street::River,
        }
    }

    /// How many new board cards are revealed when this street begins.
    pub fn n_revealed(&self) -> usize {
        match self {
            Street::Pre => 0,
            Street::Flop => 3,
            Street::Turn => 1,
            Street::River => 1,
        }
    }

    /// Total board cards visible once this street is reached.
    pub fn n_total(&self) -> usize {
        match self {
            Street::Pre => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }

    pub fn is_river(&self) -> bool {
        matches!(self, Street::River)
    }
}

impl std::fmt::Display for Street {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Street::Pre => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn river_is_terminal_street() {
        assert_eq!(Street::River.next(), Street::River);
    }

    #[test]
    fn reveals_sum_to_five() {
        let total: usize = [Street::Pre, Street::Flop, Street::Turn]
            .iter()
            .map(|s| s.next().n_revealed())
            .sum();
        assert_eq!(total, 5);
    }
}
