//! Cluster identifier minting.

use serde::{Deserialize, Serialize};

use super::index::ClusterId;

/// Source of fresh cluster identifiers.
///
/// Implementations must not repeat an identifier within one correlation run.
pub trait IdMinter {
    /// Returns a fresh identifier.
    fn mint(&mut self) -> ClusterId;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomMinter;

impl IdMinter for RandomMinter {
    fn mint(&mut self) -> ClusterId {
        ClusterId::random()
    }
}

/// Per-run counter: 1, 2, 3, ...
///
/// Gives byte-for-byte reproducible indices, which is what tests and diffs
/// of successive runs want.
#[derive(Debug, Clone)]
pub struct SequentialMinter {
    next: u128,
}

impl SequentialMinter {
    /// A minter starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for SequentialMinter {
    fn default() -> Self {
        Self::new()
    }
}

impl IdMinter for SequentialMinter {
    fn mint(&mut self) -> ClusterId {
        let id = ClusterId::from_sequence(self.next);
        self.next += 1;
        id
    }
}

/// Which minter a correlation run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// [`RandomMinter`].
    #[default]
    Random,
    /// [`SequentialMinter`].
    Sequential,
}

impl IdStrategy {
    /// A fresh minter for one run.
    #[must_use]
    pub fn minter(self) -> Box<dyn IdMinter> {
        match self {
            Self::Random => Box::new(RandomMinter),
            Self::Sequential => Box::new(SequentialMinter::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_minter_counts_from_one() {
        let mut minter = SequentialMinter::new();
        assert_eq!(minter.mint(), ClusterId::from_sequence(1));
        assert_eq!(minter.mint(), ClusterId::from_sequence(2));
    }

    #[test]
    fn test_random_minter_is_unique() {
        let mut minter = RandomMinter;
        let a = minter.mint();
        let b = minter.mint();
        assert_ne!(a, b);
        assert!(!a.is_nil());
    }

    #[test]
    fn test_strategy_builds_fresh_minters() {
        let mut one = IdStrategy::Sequential.minter();
        let mut two = IdStrategy::Sequential.minter();
        assert_eq!(one.mint(), two.mint());
    }
}
