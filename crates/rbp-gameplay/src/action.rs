use rbp_core::Chips;

/// A betting action taken by a seat.
///
/// `Call(0)` is the semantic "check"; there is no separate check variant —
/// callers that want to express intent can use [`Action::is_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Fold,
    Call(Chips),
    Raise(Chips),
}

impl Action {
    pub fn is_check(&self) -> bool {
        matches!(self, Action::Call(0))
    }

    pub fn is_fold(&self) -> bool {
        matches!(self, Action::Fold)
    }

    pub fn is_raise(&self) -> bool {
        matches!(self, Action::Raise(_))
    }

    pub fn amount(&self) -> Chips {
        match self {
            Action::Fold => 0,
            Action::Call(c) | Action::Raise(c) => *c,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Fold => write!(f, "fold"),
            Action::Call(0) => write!(f, "check"),
            Action::Call(c) => write!(f, "call {c}"),
            Action::Raise(c) => write!(f, "raise {c}"),
        }
    }
}

/// The set of actions legal for the seat to act, with raise bounds if applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Legal {
    pub may_fold: bool,
    pub may_check: bool,
    pub may_call: bool,
    pub to_call: Chips,
    pub may_raise: bool,
    pub min_raise: Chips,
    pub max_raise: Chips,
}

impl Legal {
    pub fn is_allowed(&self, action: &Action) -> bool {
        match action {
            Action::Fold => self.may_fold,
            Action::Call(0) => self.may_check,
            Action::Call(c) => self.may_call && *c == self.to_call,
            Action::Raise(c) => self.may_raise && *c >= self.min_raise && *c <= self.max_raise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_is_call_zero() {
        assert!(Action::Call(0).is_check());
        assert!(!Action::Call(5).is_check());
    }
}
