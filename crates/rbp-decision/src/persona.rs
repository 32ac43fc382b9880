/// A bot's playing style, grounded in "Harrington on Cash Games" archetypes.
///
/// Only two styles ship: a prompt-template flag, not a strategy implementation —
/// the style lives entirely in the natural-language instructions handed to the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// Tight-aggressive: narrow starting-hand range, bets for value and protection.
    Tag,
    /// Loose-aggressive: wide range, applies pressure, bluffs more often.
    Lag,
}

impl Style {
    pub fn code(&self) -> &'static str {
        match self {
            Style::Tag => "TAG",
            Style::Lag => "LAG",
        }
    }

    /// The strategic-instruction block injected into the Harrington prompt.
    pub fn strategy_blurb(&self) -> &'static str {
        match self {
            Style::Tag => {
                "You play a tight-aggressive style: you enter pots with a narrow range of \
                 strong starting hands, fold marginal spots readily, and bet aggressively for \
                 value and protection once you commit to a hand."
            }
            Style::Lag => {
                "You play a loose-aggressive style: you enter pots with a wide range of hands, \
                 apply constant pressure with bets and raises, and are willing to bluff and \
                 semi-bluff to keep opponents off balance."
            }
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Static description of one bot opponent.
#[derive(Debug, Clone)]
pub struct Persona {
    pub name: String,
    pub style: Style,
    pub description: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, style: Style) -> Self {
        let description = style.strategy_blurb().to_string();
        Self { name: name.into(), style, description }
    }
}

/// Assigns a persona to each of `n` bot seats, cycling TAG/LAG.
///
/// Grounded on the original source's bot table, which distributes the two
/// archetypes round-robin across however many opponents are seated.
pub fn distribute(n: usize) -> Vec<Persona> {
    (0..n)
        .map(|i| {
            let style = if i % 2 == 0 { Style::Tag } else { Style::Lag };
            Persona::new(format!("AI_{}", i + 1), style)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_alternates_styles() {
        let personas = distribute(4);
        assert_eq!(personas[0].style, Style::Tag);
        assert_eq!(personas[1].style, Style::Lag);
        assert_eq!(personas[2].style, Style::Tag);
        assert_eq!(personas[3].style, Style::Lag);
    }
}
