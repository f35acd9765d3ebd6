use crate::shared::range::CharRange;

use super::document::Document;
use super::node::Block;
use super::timing::{char_span, split_timings_by_time};

/// Playback state of a stretch of text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Highlight {
    Before,
    Now,
    After,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    pub highlight: Highlight,
    pub range: CharRange,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockDecoration {
    pub block: usize,
    pub decoration: Decoration,
}

/// Labels the played, playing and unplayed spans of a block at `time`.
///
/// Empty buckets produce no decoration. Called once per frame while audio
/// plays, so the whole-block cases skip the split.
pub fn decorate(block: &Block, time: f64) -> Vec<Decoration> {
    let (Some(first), Some(last)) = (block.timings.first(), block.timings.last()) else {
        return Vec::new();
    };
    let whole = CharRange::new(first.chars.start, last.chars.end);
    if first.time.after(time) {
        return vec![Decoration {
            highlight: Highlight::After,
            range: whole,
        }];
    }
    if last.time.before(time) {
        return vec![Decoration {
            highlight: Highlight::Before,
            range: whole,
        }];
    }

    let split = split_timings_by_time(&block.timings, time);
    [
        (Highlight::Before, split.before),
        (Highlight::Now, split.now),
        (Highlight::After, split.after),
    ]
    .into_iter()
    .filter_map(|(highlight, bucket)| {
        char_span(bucket).map(|range| Decoration { highlight, range })
    })
    .collect()
}

pub fn decorate_document(document: &Document, time: f64) -> Vec<BlockDecoration> {
    document
        .blocks()
        .iter()
        .enumerate()
        .flat_map(|(block, b)| {
            decorate(b, time)
                .into_iter()
                .map(move |decoration| BlockDecoration { block, decoration })
        })
        .collect()
}

/// Highlight of the char at `offset`; chars outside every range count as
/// not yet played.
pub fn highlight_at(decorations: &[Decoration], offset: usize) -> Highlight {
    decorations
        .iter()
        .find(|d| d.range.start <= offset && offset < d.range.end)
        .map_or(Highlight::After, |d| d.highlight)
}
