use crate::pnl::PnL;
use rbp_cards::Strength;
use rbp_core::Chips;

/// A player's final result including hand strength.
///
/// Combines the public [`PnL`] (chips risked/won) with the private [`Strength`]
/// (hand ranking). Used at showdown to determine pot distribution and to
/// describe the result to clients.
#[derive(Debug, Clone)]
pub struct Settlement {
    revealed: PnL,
    strength: Strength,
}

impl Settlement {
    pub fn new(revealed: PnL, strength: Strength) -> Self {
        Self { revealed, strength }
    }
    pub fn pnl(&self) -> &PnL {
        &self.revealed
    }
    pub fn strength(&self) -> &Strength {
        &self.strength
    }
    pub fn won(&self) -> Chips {
        self.pnl().won()
    }
    pub fn add(&mut self, amount: Chips) {
        self.revealed.add(amount);
    }
}

impl std::fmt::Display for Settlement {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let strength = self.strength();
        let pnl = self.pnl().reward();
        if pnl > 0 {
            write!(f, "{:<5}{}", format!("+{}", pnl), strength)
        } else {
            write!(f, "     {}", strength)
        }
    }
}
