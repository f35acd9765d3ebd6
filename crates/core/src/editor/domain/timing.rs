use crate::shared::range::{CharRange, Range, TimeRange};

/// Alignment unit: the chars a word occupies in its block's text and the
/// audio span it was spoken in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub chars: CharRange,
    pub time: TimeRange,
}

impl Timing {
    pub fn new(chars: CharRange, time: TimeRange) -> Self {
        Self { chars, time }
    }
}

/// Three ordered, contiguous views over one timing slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingSplit<'a> {
    pub before: &'a [Timing],
    pub now: &'a [Timing],
    pub after: &'a [Timing],
}

impl TimingSplit<'_> {
    pub fn len(&self) -> usize {
        self.before.len() + self.now.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn split_timings_by_time(timings: &[Timing], time: f64) -> TimingSplit<'_> {
    split_by(timings, time, |t| t.time)
}

pub fn split_timings_by_offset(timings: &[Timing], offset: usize) -> TimingSplit<'_> {
    split_by(timings, offset, |t| t.chars)
}

/// Partitions around the first entry whose span ends at or after `x`.
///
/// That entry is `now` when it contains `x`; otherwise `x` sits in a gap
/// and the entry opens `after`.
fn split_by<T, F>(timings: &[Timing], x: T, span: F) -> TimingSplit<'_>
where
    T: PartialOrd + Copy,
    F: Fn(&Timing) -> Range<T>,
{
    match timings.iter().position(|t| span(t).end >= x) {
        None => TimingSplit {
            before: timings,
            now: &[],
            after: &[],
        },
        Some(i) if span(&timings[i]).contains(x) => TimingSplit {
            before: &timings[..i],
            now: &timings[i..=i],
            after: &timings[i + 1..],
        },
        Some(i) => TimingSplit {
            before: &timings[..i],
            now: &[],
            after: &timings[i..],
        },
    }
}

/// Char span from the first entry's start to the last entry's end.
pub fn char_span(timings: &[Timing]) -> Option<CharRange> {
    match (timings.first(), timings.last()) {
        (Some(first), Some(last)) => Some(CharRange::new(first.chars.start, last.chars.end)),
        _ => None,
    }
}

pub fn time_span(timings: &[Timing]) -> Option<TimeRange> {
    match (timings.first(), timings.last()) {
        (Some(first), Some(last)) => Some(TimeRange::new(first.time.start, last.time.end)),
        _ => None,
    }
}

/// Moves ordered, non-overlapping `spans` to account for `len` chars
/// inserted at `offset`.
///
/// Only the first span whose closed range contains `offset` grows; every
/// later span shifts, including one starting exactly at `offset`.
pub fn shift_for_insert<'a>(
    spans: impl IntoIterator<Item = &'a mut CharRange>,
    offset: usize,
    len: usize,
) {
    let mut extended = false;
    for span in spans {
        if offset < span.start || (extended && offset == span.start) {
            span.start += len;
            span.end += len;
        } else if offset <= span.end {
            span.end += len;
            extended = true;
        }
    }
}

/// Maps `range` through deleting `removed` (half-open).
///
/// Returns `None` when the range lay entirely inside the deleted chars.
pub fn map_for_delete(range: CharRange, removed: CharRange) -> Option<CharRange> {
    if removed.is_empty() {
        return Some(range);
    }
    if removed.start <= range.start && range.end <= removed.end {
        return None;
    }
    let map = |p: usize| {
        if p <= removed.start {
            p
        } else if p >= removed.end {
            p - removed.len()
        } else {
            removed.start
        }
    };
    Some(CharRange::new(map(range.start), map(range.end)))
}

pub fn apply_insert(timings: &mut [Timing], offset: usize, len: usize) {
    shift_for_insert(timings.iter_mut().map(|timing| &mut timing.chars), offset, len);
}

pub fn apply_delete(timings: &mut Vec<Timing>, removed: CharRange) {
    timings.retain_mut(|timing| match map_for_delete(timing.chars, removed) {
        Some(chars) => {
            timing.chars = chars;
            true
        }
        None => false,
    });
}

/// Re-bases char spans onto text that now starts `base` chars later,
/// clamping anything that falls before the new origin.
pub fn rebase(timings: &mut [Timing], base: usize) {
    for timing in timings.iter_mut() {
        timing.chars.start = timing.chars.start.saturating_sub(base);
        timing.chars.end = timing.chars.end.saturating_sub(base);
    }
}
