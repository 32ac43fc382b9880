use crate::action::{Action, Legal};
use crate::pnl::PnL;
use crate::seat::{Seat, State};
use crate::settlement::Settlement;
use rbp_cards::*;
use rbp_core::{Chips, Position};
use std::collections::HashSet;

/// Outcome of a fully settled hand: per-seat settlement, keyed by seat index.
pub type Showdown = Vec<(Position, Settlement)>;

/// A single NLHE table.
///
/// Drives one hand at a time: posts blinds, tracks whose turn it is, applies
/// actions, deals streets, and settles the pot at showdown or when everyone
/// but one seat has folded.
///
/// No side pots: if a short stack is all-in for less than another caller, the
/// whole pot is still contested between all remaining hands. Sessions are
/// expected to end at the first elimination (`is_over`) rather than continue
/// with re-buys, so this simplification is never actually exercised across
/// multiple subsequent hands.
#[derive(Debug, Clone)]
pub struct Game {
    seats: Vec<Seat>,
    button: usize,
    acting: usize,
    board: Board,
    deck: Deck,
    street: Street,
    pot: Chips,
    small_blind: Chips,
    big_blind: Chips,
    current_max_stake: Chips,
    last_raise_size: Chips,
    acted: HashSet<Position>,
    finished: bool,
}

impl Game {
    /// Deals a fresh hand with the given persistent stacks, starting the button at `button`.
    pub fn deal(stacks: Vec<Chips>, button: Position, small_blind: Chips, big_blind: Chips) -> Self {
        let n = stacks.len();
        assert!(n >= 2, "a hand needs at least two seats");
        let mut deck = Deck::new();
        let seats: Vec<Seat> = stacks
            .into_iter()
            .map(|stack| Seat::from((deck.hole(), stack)))
            .collect();
        let mut game = Self {
            seats,
            button: button % n,
            acting: 0,
            board: Board::empty(),
            deck,
            street: Street::Pre,
            pot: 0,
            small_blind,
            big_blind,
            current_max_stake: 0,
            last_raise_size: big_blind,
            acted: HashSet::new(),
            finished: false,
        };
        game.post_blinds();
        game
    }

    fn post_blinds(&mut self) {
        let n = self.seats.len();
        let (sb, bb) = if n == 2 {
            (self.button, (self.button + 1) % n)
        } else {
            ((self.button + 1) % n, (self.button + 2) % n)
        };
        self.seats[sb].bet(self.small_blind);
        self.seats[bb].bet(self.big_blind);
        self.current_max_stake = self.big_blind;
        let first = if n == 2 { sb } else { (bb + 1) % n };
        self.acting = self
            .next_active_from(first)
            .expect("at least two seats are active at hand start");
    }

    // ------------------------------------------------------------------
    // Read-only accessors
    // ------------------------------------------------------------------

    pub fn n(&self) -> usize {
        self.seats.len()
    }
    /// Total chips in the middle: settled streets plus the current street's stakes.
    pub fn pot(&self) -> Chips {
        self.pot + self.seats.iter().map(|s| s.stake()).sum::<Chips>()
    }
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }
    pub fn seat(&self, position: Position) -> &Seat {
        &self.seats[position]
    }
    pub fn board(&self) -> Board {
        self.board
    }
    pub fn street(&self) -> Street {
        self.street
    }
    pub fn button(&self) -> Position {
        self.button
    }
    pub fn acting(&self) -> Position {
        self.acting
    }
    pub fn is_finished(&self) -> bool {
        self.finished
    }
    /// True once any seat has busted; sessions end rather than continue short-handed.
    pub fn is_over(&self) -> bool {
        self.seats.iter().any(|s| s.stack() <= 0)
    }
    pub fn big_blind(&self) -> Chips {
        self.big_blind
    }

    fn active_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.seats.len()).filter(|&i| self.seats[i].state().is_active())
    }

    /// The smaller of `position`'s total chips and the shortest active opponent's.
    pub fn effective_stack(&self, position: Position) -> Chips {
        let mine = self.seats[position].stack() + self.seats[position].stake();
        self.active_positions()
            .filter(|&i| i != position)
            .map(|i| self.seats[i].stack() + self.seats[i].stake())
            .min()
            .map(|other| mine.min(other))
            .unwrap_or(mine)
    }

    // ------------------------------------------------------------------
    // Legality
    // ------------------------------------------------------------------

    pub fn to_call(&self, position: Position) -> Chips {
        (self.current_max_stake - self.seats[position].stake()).max(0)
    }

    pub fn legal(&self) -> Legal {
        self.legal_for(self.acting)
    }

    pub fn legal_for(&self, position: Position) -> Legal {
        let seat = &self.seats[position];
        let to_call = self.to_call(position).min(seat.stack());
        let stack = seat.stack();
        let min_raise_to = self.current_max_stake + self.last_raise_size;
        let max_raise_to = seat.stake() + stack;
        Legal {
            may_fold: self.to_call(position) > 0,
            may_check: self.to_call(position) == 0,
            may_call: self.to_call(position) > 0 && stack > 0,
            to_call,
            may_raise: stack > self.to_call(position) && max_raise_to > self.current_max_stake,
            min_raise: min_raise_to.min(max_raise_to),
            max_raise: max_raise_to,
        }
    }

    // ------------------------------------------------------------------
    // Applying actions
    // ------------------------------------------------------------------

    pub fn apply(&mut self, action: Action) -> anyhow::Result<()> {
        if self.finished {
            anyhow::bail!("hand is already finished");
        }
        let legal = self.legal();
        if !legal.is_allowed(&action) {
            anyhow::bail!("action {action} is not legal here (to_call={})", legal.to_call);
        }
        let position = self.acting;
        match action {
            Action::Fold => self.seats[position].fold(),
            Action::Call(amount) => self.seats[position].bet(amount),
            Action::Raise(to) => {
                self.last_raise_size = (to - self.current_max_stake).max(self.last_raise_size);
                self.current_max_stake = to;
                self.seats[position].bet(to - self.seats[position].stake());
                self.acted.clear();
            }
        }
        self.acted.insert(position);

        if self.active_positions().count() <= 1 {
            self.end_by_fold();
            return Ok(());
        }
        self.advance();
        Ok(())
    }

    fn needs_to_act(&self, position: Position) -> bool {
        let seat = &self.seats[position];
        seat.state() == State::Betting
            && (!self.acted.contains(&position) || seat.stake() < self.current_max_stake)
    }

    fn next_active_from(&self, start: Position) -> Option<Position> {
        let n = self.seats.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&i| self.seats[i].state().is_active())
    }

    fn next_to_act_from(&self, start: Position) -> Option<Position> {
        let n = self.seats.len();
        (1..=n)
            .map(|offset| (start + offset) % n)
            .find(|&i| self.needs_to_act(i))
    }

    fn advance(&mut self) {
        if let Some(next) = self.next_to_act_from(self.acting) {
            self.acting = next;
            return;
        }
        self.advance_street();
    }

    fn advance_street(&mut self) {
        self.pot += self.seats.iter().map(|s| s.stake()).sum::<Chips>();
        for seat in self.seats.iter_mut() {
            seat.reset_stake();
        }
        self.acted.clear();
        self.last_raise_size = self.big_blind;
        self.current_max_stake = 0;

        if self.street.is_river() {
            self.finished = true;
            return;
        }
        self.street = self.street.next();
        let dealt = self.deck.deal(self.street);
        self.board.reveal(self.street, &dealt.cards());

        let able_to_act = self
            .active_positions()
            .filter(|&i| self.seats[i].state() == State::Betting)
            .count();
        if able_to_act <= 1 {
            // Everyone left is all-in; run the board out without further betting.
            self.advance_street();
            return;
        }
        let n = self.seats.len();
        let first = (self.button + 1) % n;
        self.acting = self
            .next_active_from(first)
            .unwrap_or(first);
    }

    fn end_by_fold(&mut self) {
        self.pot += self.seats.iter().map(|s| s.stake()).sum::<Chips>();
        for seat in self.seats.iter_mut() {
            seat.reset_stake();
        }
        let pot = self.pot;
        if let Some(winner) = self.active_positions().next() {
            self.seats[winner].win(pot);
        }
        self.finished = true;
    }

    /// Evaluates the showdown: best hand(s) among still-active seats split the pot.
    ///
    /// Only meaningful once `is_finished()` and the hand was not won by fold.
    pub fn showdown(&mut self) -> Showdown {
        let pot = self.pot;
        let contenders: Vec<Position> = self.active_positions().collect();
        let strengths: Vec<(Position, Strength)> = contenders
            .iter()
            .map(|&i| {
                let mut cards = self.board.cards();
                cards.extend(self.seats[i].cards().cards());
                (i, Evaluator::evaluate(&cards))
            })
            .collect();
        let best = strengths.iter().map(|(_, s)| *s).max().expect("at least one contender");
        let winners: Vec<Position> = strengths
            .iter()
            .filter(|(_, s)| *s == best)
            .map(|(i, _)| *i)
            .collect();
        let share = pot / winners.len() as Chips;
        let remainder = pot - share * winners.len() as Chips;
        let mut out = Vec::new();
        for (idx, &position) in winners.iter().enumerate() {
            let bonus = if idx == 0 { remainder } else { 0 };
            self.seats[position].win(share + bonus);
            let strength = strengths.iter().find(|(p, _)| *p == position).unwrap().1;
            out.push((
                position,
                Settlement::new(PnL::new(share + bonus, 0, State::Betting), strength),
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stacks(n: usize) -> Vec<Chips> {
        vec![1000; n]
    }

    #[test]
    fn blinds_are_posted_on_deal() {
        let game = Game::deal(stacks(6), 0, 10, 20);
        assert_eq!(game.pot(), 30);
        assert_eq!(game.street(), Street::Pre);
    }

    #[test]
    fn folding_to_one_seat_awards_the_pot_immediately() {
        let mut game = Game::deal(stacks(2), 0, 10, 20);
        // heads-up: seat 0 is SB/button and acts first preflop.
        game.apply(Action::Fold).unwrap();
        assert!(game.is_finished());
        assert_eq!(game.seats()[1].stack(), 1010);
    }

    #[test]
    fn check_is_legal_once_everyone_has_called() {
        let mut game = Game::deal(stacks(3), 0, 10, 20);
        let legal = game.legal();
        assert!(!legal.may_check); // UTG faces the big blind
        game.apply(Action::Call(legal.to_call)).unwrap();
        let legal = game.legal();
        game.apply(Action::Call(legal.to_call)).unwrap();
        let legal = game.legal();
        assert!(legal.may_check);
    }

    #[test]
    fn raise_must_respect_min_raise() {
        let game = Game::deal(stacks(6), 0, 10, 20);
        let legal = game.legal();
        assert!(legal.min_raise >= 40);
        assert!(!legal.is_allowed(&Action::Raise(legal.min_raise - 1)));
        assert!(legal.is_allowed(&Action::Raise(legal.min_raise)));
    }

    #[test]
    fn showdown_awards_best_hand() {
        let mut game = Game::deal(stacks(2), 0, 10, 20);
        while !game.is_finished() {
            let legal = game.legal();
            let action = if legal.may_check {
                Action::Call(0)
            } else {
                Action::Call(legal.to_call)
            };
            game.apply(action).unwrap();
        }
        if game.seats().iter().filter(|s| s.state().is_active()).count() > 1 {
            let pot_before = game.pot();
            let result = game.showdown();
            let total: Chips = result.iter().map(|(_, s)| s.pnl().reward()).sum();
            assert_eq!(total, pot_before);
        }
    }
}
