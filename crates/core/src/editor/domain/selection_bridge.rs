use crate::shared::constants::SEEK_EPSILON;
use crate::shared::range::CharRange;
use crate::shared::rect::Rect;

use super::document::{Document, Point};
use super::node::Block;
use super::text_layout::TextLayout;
use super::timing::split_timings_by_offset;

/// A selection spanning one word's rendered chars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaretSpan {
    pub block: usize,
    pub anchor: usize,
    pub focus: usize,
}

impl CaretSpan {
    pub fn range(&self) -> CharRange {
        CharRange::new(self.anchor, self.focus)
    }
}

/// Seek target for a click at char `offset` of `block`.
///
/// The word's start is nudged forward by [`SEEK_EPSILON`] so the closed
/// time lookup does not resolve to the previous word sharing the boundary.
/// A gap between words yields `None`.
pub fn caret_to_time(block: &Block, offset: usize) -> Option<f64> {
    let split = split_timings_by_offset(&block.timings, offset);
    if let Some(timing) = split.now.first() {
        return Some(timing.time.start + SEEK_EPSILON);
    }
    if split.after.is_empty() && !block.timings.is_empty() {
        log::error!(
            "No timing covers or follows offset {offset} ({} entries, text {:?})",
            block.timings.len(),
            block.text()
        );
    } else {
        log::debug!("Offset {offset} falls between words; not seeking");
    }
    None
}

/// [`caret_to_time`] for a document point. A point outside any Content is
/// a routine miss.
pub fn caret_to_time_at(document: &Document, point: Point) -> Option<f64> {
    let Some(block) = document.block(point.block) else {
        log::debug!("Click outside the transcript at block {}", point.block);
        return None;
    };
    if block.content().is_none() {
        log::debug!("Click on block {} without content", point.block);
        return None;
    }
    caret_to_time(block, point.offset)
}

/// The word being spoken at `time`, found by a linear scan over blocks.
pub fn time_to_caret(document: &Document, time: f64) -> Option<CaretSpan> {
    document.blocks().iter().enumerate().find_map(|(index, block)| {
        if !block.time_span()?.contains(time) {
            return None;
        }
        let timing = block.timings.iter().find(|t| t.time.contains(time))?;
        Some(CaretSpan {
            block: index,
            anchor: timing.chars.start,
            focus: timing.chars.end,
        })
    })
}

/// Screen box of the word at `time`, or [`Rect::EMPTY`] when none plays.
pub fn time_to_caret_rect(document: &Document, time: f64, layout: &dyn TextLayout) -> Rect {
    match time_to_caret(document, time) {
        Some(span) => layout.range_rect(document, span.block, span.range()),
        None => Rect::EMPTY,
    }
}
