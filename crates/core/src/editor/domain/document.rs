use thiserror::Error;

use crate::shared::range::CharRange;
use crate::shared::text::{byte_index, char_len};
use crate::transcript::domain::task::Task;

use super::content_builder::build_blocks;
use super::node::{Block, BlockChild, Content};
use super::normalizer::normalize;
use super::timing::{apply_delete, apply_insert, map_for_delete, shift_for_insert};

/// A caret position: a char offset inside one block's Content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub block: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    #[error("no block at index {0}")]
    BlockNotFound(usize),
    #[error("block {0} is read-only")]
    ReadOnly(usize),
    #[error("block {0} has no content")]
    MissingContent(usize),
    #[error("offset {offset} is past the end of block {block} ({len} chars)")]
    OffsetOutOfBounds { block: usize, offset: usize, len: usize },
    #[error("empty or inverted range {start}..{end}")]
    InvalidRange { start: usize, end: usize },
    #[error("no caret is placed")]
    NoCaret,
}

/// The editable transcript tree for one task.
///
/// Blocks built from the task's context segments are read-only; every
/// mutating call rejects them and runs [`Document::normalize`] before
/// returning.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    blocks: Vec<Block>,
    available_speakers: Vec<String>,
    caret: Option<Point>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut available_speakers: Vec<String> = Vec::new();
        for speaker in blocks.iter().filter_map(|b| b.speaker.as_ref()) {
            if !available_speakers.contains(speaker) {
                available_speakers.push(speaker.clone());
            }
        }
        Self {
            blocks,
            available_speakers,
            caret: None,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        let mut blocks = build_blocks(&task.text.before, false);
        blocks.extend(build_blocks(&task.text.editable, true));
        blocks.extend(build_blocks(&task.text.after, false));
        log::debug!("Built {} blocks for task {}", blocks.len(), task.id);
        Self::new(blocks)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn available_speakers(&self) -> &[String] {
        &self.available_speakers
    }

    pub fn caret(&self) -> Option<Point> {
        self.caret
    }

    pub fn set_caret(&mut self, point: Point) -> Result<(), EditError> {
        let len = self.content(point.block)?.char_len();
        if point.offset > len {
            return Err(EditError::OffsetOutOfBounds {
                block: point.block,
                offset: point.offset,
                len,
            });
        }
        self.caret = Some(point);
        Ok(())
    }

    pub fn clear_caret(&mut self) {
        self.caret = None;
    }

    /// Inserts `text` at `point` and returns the point just after it.
    ///
    /// Each `\n` becomes a paragraph break.
    pub fn insert_text(&mut self, point: Point, text: &str) -> Result<Point, EditError> {
        self.editable_content(point)?;
        let mut at = point;
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                at = self.break_at(at)?;
                self.normalize();
            }
            at = self.insert_chars(at, line)?;
        }
        self.normalize();
        Ok(at)
    }

    /// Splits the block at `point`; returns the start of the new block.
    pub fn insert_break(&mut self, point: Point) -> Result<Point, EditError> {
        self.editable_content(point)?;
        let at = self.break_at(point)?;
        self.normalize();
        Ok(at)
    }

    /// Deletes the half-open char range `range` from one block.
    pub fn delete_range(&mut self, block: usize, range: CharRange) -> Result<(), EditError> {
        if range.start >= range.end {
            return Err(EditError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        self.editable_content(Point::new(block, range.end))?;

        let target = &mut self.blocks[block];
        if let Some(content) = target.content_mut() {
            let from = byte_index(&content.text, range.start).unwrap_or(content.text.len());
            let to = byte_index(&content.text, range.end).unwrap_or(content.text.len());
            content.text.replace_range(from..to, "");
            content.unclear = content
                .unclear
                .iter()
                .filter_map(|mark| map_for_delete(*mark, range))
                .filter(|mark| !mark.is_empty())
                .collect();
        }
        apply_delete(&mut target.timings, range);

        if let Some(caret) = self.caret.as_mut() {
            if caret.block == block {
                caret.offset = map_for_delete(CharRange::new(caret.offset, caret.offset), range)
                    .map_or(range.start, |r| r.start);
            }
        }
        self.normalize();
        Ok(())
    }

    /// Replaces a block's whole text.
    ///
    /// When the new text has as many tokens as the block has timings, each
    /// entry is re-pointed at its token; otherwise entries are only clamped.
    pub fn replace_content(&mut self, block: usize, text: &str) -> Result<(), EditError> {
        self.editable_content(Point::new(block, 0))?;
        let target = &mut self.blocks[block];
        let spans = token_spans(text);
        if spans.len() == target.timings.len() {
            for (timing, span) in target.timings.iter_mut().zip(spans) {
                timing.chars = span;
            }
        } else {
            log::debug!(
                "Block {block}: {} tokens for {} timings; keeping clamped spans",
                spans.len(),
                target.timings.len()
            );
        }
        if let Some(content) = target.content_mut() {
            content.text = text.to_string();
            content.unclear.clear();
        }
        self.normalize();
        Ok(())
    }

    /// Inserts `text` at the caret and moves the caret past it.
    pub fn insert_at_caret(&mut self, text: &str) -> Result<Point, EditError> {
        let caret = self.caret.ok_or(EditError::NoCaret)?;
        let at = self.insert_text(caret, text)?;
        self.caret = Some(at);
        Ok(at)
    }

    pub fn set_speaker(&mut self, block: usize, speaker: Option<String>) -> Result<(), EditError> {
        self.editable_content(Point::new(block, 0))?;
        if let Some(name) = speaker.as_ref() {
            if !self.available_speakers.contains(name) {
                self.available_speakers.push(name.clone());
            }
        }
        let target = &mut self.blocks[block];
        target.speaker = speaker;
        target.refresh_label();
        self.normalize();
        Ok(())
    }

    /// Flags `range` as unclear, merging with overlapping marks.
    pub fn mark_unclear(&mut self, block: usize, range: CharRange) -> Result<(), EditError> {
        if range.start >= range.end {
            return Err(EditError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        self.editable_content(Point::new(block, range.end))?;
        if let Some(content) = self.blocks[block].content_mut() {
            let mut marks = std::mem::take(&mut content.unclear);
            marks.push(range);
            marks.sort_by_key(|m| m.start);
            let mut merged: Vec<CharRange> = Vec::with_capacity(marks.len());
            for mark in marks {
                match merged.last_mut() {
                    Some(last) if last.overlaps(&mark) => last.end = last.end.max(mark.end),
                    _ => merged.push(mark),
                }
            }
            content.unclear = merged;
        }
        self.normalize();
        Ok(())
    }

    /// Restores one Content per Block and keeps the caret inside the text.
    ///
    /// Returns how many blocks were split.
    pub fn normalize(&mut self) -> usize {
        let splits = normalize(&mut self.blocks);
        if let Some(caret) = self.caret {
            self.caret = match self.blocks.get(caret.block) {
                Some(block) => {
                    let len = block.content().map_or(0, Content::char_len);
                    Some(Point::new(caret.block, caret.offset.min(len)))
                }
                None => None,
            };
        }
        splits
    }

    /// Whitespace-split tokens of every editable block, in order.
    pub fn editable_tokens(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|b| b.editable)
            .flat_map(|b| b.text().split_whitespace().map(str::to_string))
            .collect()
    }

    fn content(&self, block: usize) -> Result<&Content, EditError> {
        self.blocks
            .get(block)
            .ok_or(EditError::BlockNotFound(block))?
            .content()
            .ok_or(EditError::MissingContent(block))
    }

    /// Checks `point` addresses editable text.
    fn editable_content(&self, point: Point) -> Result<(), EditError> {
        let content = self.content(point.block)?;
        if !content.editable {
            return Err(EditError::ReadOnly(point.block));
        }
        let len = content.char_len();
        if point.offset > len {
            return Err(EditError::OffsetOutOfBounds {
                block: point.block,
                offset: point.offset,
                len,
            });
        }
        Ok(())
    }

    fn insert_chars(&mut self, point: Point, text: &str) -> Result<Point, EditError> {
        let len = char_len(text);
        if len == 0 {
            return Ok(point);
        }
        let target = self
            .blocks
            .get_mut(point.block)
            .ok_or(EditError::BlockNotFound(point.block))?;
        let content = target
            .content_mut()
            .ok_or(EditError::MissingContent(point.block))?;
        let at = byte_index(&content.text, point.offset).ok_or_else(|| EditError::OffsetOutOfBounds {
            block: point.block,
            offset: point.offset,
            len: content.char_len(),
        })?;
        content.text.insert_str(at, text);
        shift_for_insert(content.unclear.iter_mut(), point.offset, len);
        apply_insert(&mut target.timings, point.offset, len);

        if let Some(caret) = self.caret.as_mut() {
            if caret.block == point.block && caret.offset >= point.offset {
                caret.offset += len;
            }
        }
        Ok(Point::new(point.block, point.offset + len))
    }

    /// Moves everything after `point` into a second Content of the same
    /// block, leaving the split to the normalizer.
    fn break_at(&mut self, point: Point) -> Result<Point, EditError> {
        let target = self
            .blocks
            .get_mut(point.block)
            .ok_or(EditError::BlockNotFound(point.block))?;
        let content = target
            .content_mut()
            .ok_or(EditError::MissingContent(point.block))?;
        let at = byte_index(&content.text, point.offset).ok_or_else(|| EditError::OffsetOutOfBounds {
            block: point.block,
            offset: point.offset,
            len: content.char_len(),
        })?;

        let mut tail = Content::new(content.text.split_off(at), content.editable);
        let mut head_marks = Vec::new();
        for mark in content.unclear.drain(..) {
            if mark.start < point.offset {
                head_marks.push(CharRange::new(mark.start, mark.end.min(point.offset)));
            }
            if mark.end > point.offset {
                tail.unclear.push(CharRange::new(
                    mark.start.saturating_sub(point.offset),
                    mark.end - point.offset,
                ));
            }
        }
        content.unclear = head_marks;

        let position = target
            .children
            .iter()
            .position(|child| matches!(child, BlockChild::Content(_)))
            .map_or(target.children.len(), |idx| idx + 1);
        target.children.insert(position, BlockChild::Content(tail));

        if let Some(caret) = self.caret.as_mut() {
            if caret.block > point.block {
                caret.block += 1;
            } else if caret.block == point.block && caret.offset >= point.offset {
                caret.block += 1;
                caret.offset -= point.offset;
            }
        }
        Ok(Point::new(point.block + 1, 0))
    }
}

/// Char span of every whitespace-separated token.
fn token_spans(text: &str) -> Vec<CharRange> {
    let mut spans = Vec::new();
    let mut start = None;
    let mut offset = 0;
    for c in text.chars() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push(CharRange::new(s, offset));
                start = None;
            }
            (false, None) => start = Some(offset),
            _ => {}
        }
        offset += 1;
    }
    if let Some(s) = start {
        spans.push(CharRange::new(s, offset));
    }
    spans
}
