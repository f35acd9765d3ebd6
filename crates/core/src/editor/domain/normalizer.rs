use crate::shared::range::CharRange;

use super::node::{Block, BlockChild, Content};
use super::timing::{rebase, Timing};

/// Restores one Content per Block after an edit.
///
/// A block holding several Contents is split after its first one: the first
/// Content keeps the timing entries that start inside it, and the rest move,
/// re-based, into a new block inserted right after with a copy of the
/// speaker label. Returns how many blocks were split off.
///
/// When the spans no longer line up with the text, the first Content keeps
/// as many entries as it has whitespace tokens instead. Kept spans are
/// clamped to the first Content's text.
pub fn normalize(blocks: &mut Vec<Block>) -> usize {
    let mut splits = 0;
    let mut i = 0;
    while i < blocks.len() {
        let block = &mut blocks[i];
        if block.content_count() == 0 {
            log::debug!("Block {i} lost its content; restoring an empty one");
            let editable = block.editable;
            block.children.push(BlockChild::Content(Content::new("", editable)));
        }
        if let Some(tail) = split_off_tail(block) {
            log::debug!("Splitting block {i} after a paragraph break");
            blocks.insert(i + 1, tail);
            splits += 1;
        }
        clamp_timings(&mut blocks[i]);
        i += 1;
    }
    splits
}

fn split_off_tail(block: &mut Block) -> Option<Block> {
    let second = block
        .children
        .iter()
        .enumerate()
        .filter(|(_, child)| matches!(child, BlockChild::Content(_)))
        .map(|(idx, _)| idx)
        .nth(1)?;

    let moved: Vec<BlockChild> = block
        .children
        .split_off(second)
        .into_iter()
        .filter(|child| matches!(child, BlockChild::Content(_)))
        .collect();

    let (tokens, base) = block
        .content()
        .map_or((0, 0), |first| (first.token_count(), first.char_len()));
    let total = base
        + moved
            .iter()
            .map(|child| match child {
                BlockChild::Content(content) => content.char_len(),
                BlockChild::SpeakerLabel(_) => 0,
            })
            .sum::<usize>();
    let keep = if spans_are_ordered(&block.timings, total) {
        block.timings.partition_point(|t| t.chars.start < base)
    } else {
        log::debug!("Timings out of step with the text; splitting by token count");
        tokens.min(block.timings.len())
    };
    let mut rest: Vec<Timing> = block.timings.split_off(keep);
    rebase(&mut rest, base);

    let mut children: Vec<BlockChild> = block
        .children
        .iter()
        .filter(|child| matches!(child, BlockChild::SpeakerLabel(_)))
        .cloned()
        .collect();
    children.extend(moved);

    let mut tail = Block {
        speaker: block.speaker.clone(),
        editable: block.editable,
        timings: rest,
        children,
    };
    block.refresh_label();
    tail.refresh_label();
    Some(tail)
}

/// Spans in order, disjoint and inside `len` chars of text.
fn spans_are_ordered(timings: &[Timing], len: usize) -> bool {
    timings.iter().all(|t| t.chars.start <= t.chars.end && t.chars.end <= len)
        && timings
            .windows(2)
            .all(|pair| pair[0].chars.end <= pair[1].chars.start)
}

fn clamp_timings(block: &mut Block) {
    let len = block.content().map_or(0, Content::char_len);
    for timing in block.timings.iter_mut() {
        let end = timing.chars.end.min(len);
        let start = timing.chars.start.min(end);
        timing.chars = CharRange::new(start, end);
    }
}
