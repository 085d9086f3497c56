//! Data models for the interleaving scheduler

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a stream was rejected before scheduling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Declared count is below zero
    NegativeCount(i64),
    /// Declared count differs from the number of items supplied
    CountMismatch { count: i64, len: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NegativeCount(count) => write!(f, "negative count {}", count),
            Violation::CountMismatch { count, len } => {
                write!(f, "count is {} but {} items were supplied", count, len)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Precondition violated for stream '{stream}': {violation}")]
    PreconditionViolation { stream: String, violation: Violation },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

/// An ordered source of items, e.g. the new cards of one deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream<T> {
    pub name: String,
    /// Items in the stream's natural order
    pub items: Vec<T>,
    /// Declared number of items; must equal `items.len()`
    pub count: i64,
}

impl<T> Stream<T> {
    /// Build a stream whose count is taken from its items
    pub fn new(name: impl Into<String>, items: Vec<T>) -> Self {
        let count = items.len() as i64;
        Self {
            name: name.into(),
            items,
            count,
        }
    }

    /// Check the declared count against the supplied items
    pub fn validate(&self) -> Result<usize> {
        let violation = if self.count < 0 {
            Violation::NegativeCount(self.count)
        } else if self.count as u64 != self.items.len() as u64 {
            Violation::CountMismatch {
                count: self.count,
                len: self.items.len(),
            }
        } else {
            return Ok(self.items.len());
        };

        Err(ScheduleError::PreconditionViolation {
            stream: self.name.clone(),
            violation,
        })
    }
}

/// One item of the merged sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement<T> {
    pub item: T,
    /// 0-based position in the merged sequence
    pub rank: usize,
    /// Index of the owning stream in the scheduler input
    pub stream: usize,
}

/// How far a stream's consumed fraction trails global progress.
///
/// Held as an exact fraction `num / den` (with `den > 0`) so that equal
/// scores compare equal regardless of how they were reached.
#[derive(Debug, Clone, Copy)]
pub struct LagScore {
    num: i128,
    den: i128,
}

impl LagScore {
    /// `consumed / count - step / total`
    ///
    /// `count` and `total` must be non-zero. Both are item counts, so they
    /// stay below `2^63` and every product here fits in `i128`.
    pub fn new(consumed: usize, count: usize, step: usize, total: usize) -> Self {
        let (consumed, count) = (consumed as i128, count as i128);
        let (step, total) = (step as i128, total as i128);
        Self {
            num: consumed * total - step * count,
            den: count * total,
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl PartialEq for LagScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LagScore {}

impl Ord for LagScore {
    fn cmp(&self, other: &Self) -> Ordering {
        if let (Some(lhs), Some(rhs)) = (
            self.num.checked_mul(other.den),
            other.num.checked_mul(self.den),
        ) {
            return lhs.cmp(&rhs);
        }

        let sign = self.num.signum().cmp(&other.num.signum());
        if sign != Ordering::Equal {
            return sign;
        }
        let (a, b) = (self.den as u128, other.den as u128);
        match self.num.signum() {
            0 => Ordering::Equal,
            1 => cmp_fractions(self.num as u128, a, other.num as u128, b),
            _ => cmp_fractions(other.num.unsigned_abs(), b, self.num.unsigned_abs(), a),
        }
    }
}

/// Exact `an / ad` vs `bn / bd` without multiplying, by comparing integer
/// parts and then the reciprocals of the remainders. Denominators must be
/// non-zero.
fn cmp_fractions(mut an: u128, mut ad: u128, mut bn: u128, mut bd: u128) -> Ordering {
    loop {
        let (qa, ra) = (an / ad, an % ad);
        let (qb, rb) = (bn / bd, bn % bd);
        if qa != qb {
            return qa.cmp(&qb);
        }
        match (ra, rb) {
            (0, 0) => return Ordering::Equal,
            (0, _) => return Ordering::Less,
            (_, 0) => return Ordering::Greater,
            // ra/ad < rb/bd exactly when bd/rb < ad/ra
            _ => (an, ad, bn, bd) = (bd, rb, ad, ra),
        }
    }
}

impl PartialOrd for LagScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The merged sequence produced by a scheduling run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalOrder<T> {
    /// Placements in rank order
    pub placements: Vec<Placement<T>>,
    /// Item count of every input stream, by input index
    pub stream_counts: Vec<usize>,
}

impl<T> GlobalOrder<T> {
    pub fn empty(stream_counts: Vec<usize>) -> Self {
        Self {
            placements: Vec::new(),
            stream_counts,
        }
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Placement<T>> {
        self.placements.iter()
    }

    /// Items in merged order
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.placements.iter().map(|p| &p.item)
    }

    /// Placements belonging to one input stream, in rank order
    pub fn stream_placements(&self, stream: usize) -> impl Iterator<Item = &Placement<T>> {
        self.placements.iter().filter(move |p| p.stream == stream)
    }

    /// Item to rank lookup
    pub fn ranks(&self) -> HashMap<T, usize>
    where
        T: Eq + Hash + Clone,
    {
        self.placements
            .iter()
            .map(|p| (p.item.clone(), p.rank))
            .collect()
    }

    /// Largest absolute lag score seen at the moment each item was placed
    pub fn max_lag(&self) -> f64 {
        let total = self.placements.len();
        let mut consumed = vec![0usize; self.stream_counts.len()];
        let mut worst = 0.0f64;

        for placement in &self.placements {
            let count = self.stream_counts[placement.stream];
            let lag = LagScore::new(consumed[placement.stream], count, placement.rank, total);
            worst = worst.max(lag.as_f64().abs());
            consumed[placement.stream] += 1;
        }

        worst
    }
}

impl<T> IntoIterator for GlobalOrder<T> {
    type Item = Placement<T>;
    type IntoIter = std::vec::IntoIter<Placement<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_matching_count() {
        let stream = Stream::new("a", vec![1, 2, 3]);
        assert_eq!(stream.validate(), Ok(3));
    }

    #[test]
    fn test_validate_rejects_negative_count() {
        let stream = Stream {
            name: "a".to_string(),
            items: Vec::<u32>::new(),
            count: -1,
        };

        let err = stream.validate().unwrap_err();
        assert_eq!(
            err,
            ScheduleError::PreconditionViolation {
                stream: "a".to_string(),
                violation: Violation::NegativeCount(-1),
            }
        );
    }

    #[test]
    fn test_validate_rejects_mismatch() {
        let stream = Stream {
            name: "b".to_string(),
            items: vec![1, 2],
            count: 3,
        };

        let err = stream.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Precondition violated for stream 'b': count is 3 but 2 items were supplied"
        );
    }

    #[test]
    fn test_lag_score_exact_ties() {
        // 1/3 and 2/6 are the same fraction
        let a = LagScore::new(1, 3, 2, 9);
        let b = LagScore::new(2, 6, 2, 9);
        assert_eq!(a, b);

        let behind = LagScore::new(0, 4, 1, 6);
        let ahead = LagScore::new(1, 4, 1, 6);
        assert!(behind < ahead);
        assert!(behind.as_f64() < 0.0);
    }

    #[test]
    fn test_lag_score_huge_counts() {
        const BIG: usize = 1_000_000_000_000;

        // Both are exactly 1/12, but the cross products exceed i128
        let a = LagScore::new(BIG, 3 * BIG, BIG, 4 * BIG);
        let b = LagScore::new(2 * BIG, 6 * BIG, 2 * BIG, 8 * BIG);
        assert_eq!(a, b);

        let higher = LagScore::new(BIG + 1, 3 * BIG, BIG, 4 * BIG);
        assert!(a < higher);
        assert!(higher > b);

        // Negative side: -1/12 vs a slightly larger (less negative) score
        let neg = LagScore::new(BIG, 4 * BIG, BIG, 3 * BIG);
        let less_neg = LagScore::new(BIG + 1, 4 * BIG, BIG, 3 * BIG);
        assert!(neg < less_neg);
        assert!(neg < a);
        assert_eq!(neg, LagScore::new(2 * BIG, 8 * BIG, 2 * BIG, 6 * BIG));
    }

    #[test]
    fn test_cmp_fractions() {
        assert_eq!(cmp_fractions(1, 3, 2, 6), Ordering::Equal);
        assert_eq!(cmp_fractions(2, 7, 3, 10), Ordering::Less);
        assert_eq!(cmp_fractions(5, 4, 6, 5), Ordering::Greater);
        assert_eq!(cmp_fractions(0, 9, 1, u128::MAX), Ordering::Less);
    }
}
