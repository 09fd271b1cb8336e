//! Half-open time interval used by every lane computation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A `[start, end)` span of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Build an interval from two instants in either order.
    pub fn ordered(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        if a <= b {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open intersection test: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// True when `instant` lies in `[start, end)`.
    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// True when `other` lies entirely inside this interval.
    pub fn encloses(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Intersect with `bounds`; `None` when nothing remains.
    pub fn clamp_to(&self, bounds: &Interval) -> Option<Interval> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start < end).then_some(Interval { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 14, h, m, 0).unwrap()
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = Interval::new(at(9, 0), at(10, 0));
        let b = Interval::new(at(10, 0), at(11, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_nested_intervals_overlap() {
        let outer = Interval::new(at(9, 0), at(12, 0));
        let inner = Interval::new(at(10, 0), at(11, 0));
        assert!(outer.overlaps(&inner));
        assert!(outer.encloses(&inner));
        assert!(!inner.encloses(&outer));
    }

    #[test]
    fn test_ordered_swaps_reversed_instants() {
        let interval = Interval::ordered(at(11, 0), at(9, 30));
        assert_eq!(interval.start, at(9, 30));
        assert_eq!(interval.end, at(11, 0));
    }

    #[test]
    fn test_contains_instant_is_half_open() {
        let interval = Interval::new(at(9, 0), at(10, 0));
        assert!(interval.contains_instant(at(9, 0)));
        assert!(interval.contains_instant(at(9, 59)));
        assert!(!interval.contains_instant(at(10, 0)));
    }

    #[test]
    fn test_clamp_to_bounds() {
        let bounds = Interval::new(at(9, 0), at(17, 0));
        let late = Interval::new(at(16, 30), at(18, 0));
        assert_eq!(
            late.clamp_to(&bounds),
            Some(Interval::new(at(16, 30), at(17, 0)))
        );

        let outside = Interval::new(at(18, 0), at(19, 0));
        assert_eq!(outside.clamp_to(&bounds), None);
    }
}
