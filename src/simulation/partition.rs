//! Static split of body indices across workers.
//!
//! A `Partition` is built once from the body count `n` and worker count `k`. The first `k - 1`
//! intervals hold `n / k` bodies each and the last one absorbs the remainder, so the intervals
//! are disjoint, contiguous and cover `[0, n)` exactly once.

use std::ops::Range;

use crate::error::{Error, Result};

/// Half-open range `[from, to)` of body indices owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub from: usize,
    pub to: usize,
}

impl Interval {
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.to == self.from
    }

    pub fn contains(&self, i: usize) -> bool {
        self.from <= i && i < self.to
    }

    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }
}

/// Validated, covering set of intervals for `n` bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    n: usize,
    intervals: Vec<Interval>,
}

impl Partition {
    /// Split `[0, n)` into `k` contiguous intervals.
    ///
    /// Fails when `n == 0`, `k == 0` or `k > n`.
    pub fn new(n: usize, k: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidConfig("body count must be > 0".into()));
        }
        if k == 0 || k > n {
            return Err(Error::InvalidConfig(format!(
                "worker count must be in [1, {n}], got {k}"
            )));
        }

        let chunk = n / k;
        let mut intervals: Vec<Interval> = (0..k)
            .map(|w| Interval {
                from: w * chunk,
                to: (w + 1) * chunk,
            })
            .collect();
        // rounding: the last worker takes the tail
        if let Some(last) = intervals.last_mut() {
            last.to = n;
        }

        Ok(Self { n, intervals })
    }

    /// Body count this partition covers
    pub fn body_count(&self) -> usize {
        self.n
    }

    pub fn workers(&self) -> usize {
        self.intervals.len()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Cut `slice` into one exclusive sub-slice per interval, in interval order.
    ///
    /// Returns `None` if `slice` is not exactly `n` long.
    pub fn split_mut<'a, T>(&self, slice: &'a mut [T]) -> Option<Vec<&'a mut [T]>> {
        if slice.len() != self.n {
            return None;
        }
        let mut parts = Vec::with_capacity(self.intervals.len());
        let mut rest = slice;
        for interval in &self.intervals {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(interval.len());
            parts.push(head);
            rest = tail;
        }
        Some(parts)
    }
}
