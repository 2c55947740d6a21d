//! Per-worker increment accounting

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Counts of write attempts made by a strategy
///
/// For the optimistic strategy `attempts == increments + conflicts` once
/// every increment has completed. The other strategies never conflict, so
/// their attempts equal their increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncrementStats {
    /// Logical increments completed
    pub increments: u64,
    /// Write attempts, successful or not
    pub attempts: u64,
    /// Compare-and-swap calls rejected on version mismatch
    pub conflicts: u64,
}

impl IncrementStats {
    /// Conflicts per attempt, 0.0 when nothing was attempted
    pub fn conflict_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.conflicts as f64 / self.attempts as f64
        }
    }
}

impl AddAssign for IncrementStats {
    fn add_assign(&mut self, rhs: Self) {
        self.increments += rhs.increments;
        self.attempts += rhs.attempts;
        self.conflicts += rhs.conflicts;
    }
}

impl std::iter::Sum for IncrementStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, s| {
            acc += s;
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_rate() {
        let stats = IncrementStats {
            increments: 3,
            attempts: 4,
            conflicts: 1,
        };
        assert!((stats.conflict_rate() - 0.25).abs() < f64::EPSILON);
        assert_eq!(IncrementStats::default().conflict_rate(), 0.0);
    }

    #[test]
    fn test_sum() {
        let total: IncrementStats = vec![
            IncrementStats {
                increments: 1,
                attempts: 2,
                conflicts: 1,
            },
            IncrementStats {
                increments: 5,
                attempts: 5,
                conflicts: 0,
            },
        ]
        .into_iter()
        .sum();
        assert_eq!(total.increments, 6);
        assert_eq!(total.attempts, 7);
        assert_eq!(total.conflicts, 1);
    }
}
