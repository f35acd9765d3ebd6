use serde::{Deserialize, Serialize};

/// A closed interval over char offsets or audio seconds.
///
/// Containment includes both ends, so a value equal to `end` belongs to
/// this range even when the next range starts at the same value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub start: T,
    pub end: T,
}

pub type CharRange = Range<usize>;
pub type TimeRange = Range<f64>;

impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, x: T) -> bool {
        x >= self.start && x <= self.end
    }

    /// `x` lies past the end of the range.
    pub fn before(&self, x: T) -> bool {
        x > self.end
    }

    /// `x` lies ahead of the start of the range.
    pub fn after(&self, x: T) -> bool {
        x < self.start
    }
}

impl CharRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &CharRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl TimeRange {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}
