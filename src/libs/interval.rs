use std::fmt;

/// A closed, 1-based genomic interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    /// Builds an interval from a coordinate pair in either order.
    ///
    /// ```
    /// use mhg::libs::interval::Interval;
    /// let iv = Interval::from_pair(60, 20);
    /// assert_eq!(iv, Interval::new(20, 60));
    /// ```
    pub fn from_pair(a: u64, b: u64) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// `end - start`, the length the hit filters use
    pub fn span(&self) -> u64 {
        self.end - self.start
    }

    /// Number of bases covered
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Overlapping, or `other` starting right after `self` ends (and vice versa).
    pub fn touches(&self, other: &Interval) -> bool {
        self.start <= other.end.saturating_add(1) && other.start <= self.end.saturating_add(1)
    }

    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest interval covering both
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// `start + end`, i.e. twice the midpoint, kept integral
    pub fn mid2(&self) -> i64 {
        (self.start + self.end) as i64
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.start, self.end)
    }
}
