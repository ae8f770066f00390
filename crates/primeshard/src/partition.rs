//! Splitting the integer domain into one contiguous slice per worker.
//!
//! Every slice has the same width, `domain_max / cores`, and slice `i` starts
//! where slice `i - 1` ends. Integer division leaves `domain_max % cores`
//! values over; [`RemainderPolicy`] decides what happens to them.

use crate::{Error, Result};
use core::fmt;
use core::ops::Range;

/// Upper bound of the domain searched when no smaller bound is configured.
pub const DOMAIN_MAX: usize = usize::MAX;

/// A half-open slice `[start, end)` of the domain owned by a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubRange {
    start: usize,
    end: usize,
}

impl SubRange {
    /// Creates `[start, end)`. An `end` below `start` yields an empty range.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn end(&self) -> usize {
        self.end
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub const fn contains(&self, n: usize) -> bool {
        self.start <= n && n < self.end
    }

    /// The values of this slice in increasing order.
    pub const fn iter(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for SubRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// What to do with the `domain_max % cores` values integer division leaves
/// behind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemainderPolicy {
    /// Leave them uncovered: the last slice ends at `stride * cores`.
    Drop,
    /// Grow the last slice so it ends at `domain_max`.
    #[default]
    ExtendLast,
}

/// Splits `[0, domain_max)` into `cores` contiguous, non-overlapping slices.
///
/// # Errors
///
/// Returns [`Error::NoCores`] if `cores == 0`.
///
/// # Example
///
/// ```
/// use primeshard::{RemainderPolicy, SubRange, partition};
///
/// let ranges = partition(100, 4, RemainderPolicy::Drop).unwrap();
/// assert_eq!(ranges[1], SubRange::new(25, 50));
/// assert_eq!(ranges[3].end(), 100);
/// ```
pub fn partition(
    domain_max: usize,
    cores: usize,
    policy: RemainderPolicy,
) -> Result<Vec<SubRange>> {
    if cores == 0 {
        return Err(Error::NoCores);
    }

    // `stride * cores <= domain_max`, so neither product below can overflow.
    let stride = domain_max / cores;
    let mut ranges: Vec<_> = (0..cores)
        .map(|i| {
            let start = stride * i;
            SubRange::new(start, start + stride)
        })
        .collect();

    if policy == RemainderPolicy::ExtendLast {
        if let Some(last) = ranges.last_mut() {
            last.end = domain_max;
        }
    }

    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(ranges: &[SubRange]) {
        assert_eq!(ranges[0].start(), 0);
        for pair in ranges.windows(2) {
            assert_eq!(pair[1].start(), pair[0].end());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn splits_evenly() {
        for policy in [RemainderPolicy::Drop, RemainderPolicy::ExtendLast] {
            let ranges = partition(100, 4, policy).unwrap();
            assert_eq!(
                ranges,
                vec![
                    SubRange::new(0, 25),
                    SubRange::new(25, 50),
                    SubRange::new(50, 75),
                    SubRange::new(75, 100),
                ]
            );
        }
    }

    #[test]
    fn single_core_covers_whole_domain() {
        for policy in [RemainderPolicy::Drop, RemainderPolicy::ExtendLast] {
            let ranges = partition(1_000, 1, policy).unwrap();
            assert_eq!(ranges, vec![SubRange::new(0, 1_000)]);
        }
    }

    #[test]
    fn zero_cores_is_an_error() {
        assert!(matches!(
            partition(100, 0, RemainderPolicy::default()),
            Err(Error::NoCores)
        ));
    }

    #[test]
    fn drop_leaves_remainder_uncovered() {
        let ranges = partition(103, 4, RemainderPolicy::Drop).unwrap();
        assert_contiguous(&ranges);
        assert_eq!(ranges.last().unwrap().end(), 100);
        assert!(ranges.iter().all(|r| r.len() == 25));
    }

    #[test]
    fn extend_last_absorbs_remainder() {
        let ranges = partition(103, 4, RemainderPolicy::ExtendLast).unwrap();
        assert_contiguous(&ranges);
        assert_eq!(ranges.last().unwrap(), &SubRange::new(75, 103));
    }

    #[test]
    fn full_word_domain() {
        for cores in [1, 2, 3, 7, 64, 1024] {
            let ranges = partition(DOMAIN_MAX, cores, RemainderPolicy::ExtendLast).unwrap();
            assert_eq!(ranges.len(), cores);
            assert_contiguous(&ranges);
            assert!(ranges.iter().all(|r| !r.is_empty()));
            assert_eq!(ranges.last().unwrap().end(), DOMAIN_MAX);

            let dropped = partition(DOMAIN_MAX, cores, RemainderPolicy::Drop).unwrap();
            assert_eq!(
                dropped.last().unwrap().end(),
                DOMAIN_MAX - DOMAIN_MAX % cores
            );
        }
    }

    #[test]
    fn ranges_are_non_empty_when_domain_covers_cores() {
        for domain_max in 1..64 {
            for cores in 1..=domain_max {
                let ranges = partition(domain_max, cores, RemainderPolicy::Drop).unwrap();
                assert_eq!(ranges.len(), cores);
                assert_contiguous(&ranges);
                assert!(ranges.iter().all(|r| !r.is_empty()));
            }
        }
    }

    #[test]
    fn sub_range_accessors() {
        let range = SubRange::new(10, 20);
        assert_eq!(range.len(), 10);
        assert!(range.contains(10));
        assert!(!range.contains(20));
        assert_eq!(range.iter().count(), 10);
        assert_eq!(range.to_string(), "[10, 20)");
        assert!(SubRange::new(5, 5).is_empty());
        assert_eq!(SubRange::new(6, 5).len(), 0);
    }
}
