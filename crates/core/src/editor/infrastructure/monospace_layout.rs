use crate::editor::domain::document::Document;
use crate::editor::domain::text_layout::TextLayout;
use crate::shared::range::CharRange;
use crate::shared::rect::Rect;

/// Fixed-width layout: every block starts on a fresh row and wraps hard
/// after `columns` chars.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceLayout {
    char_width: f64,
    line_height: f64,
    columns: usize,
}

impl MonospaceLayout {
    pub fn new(char_width: f64, line_height: f64, columns: usize) -> Self {
        Self {
            char_width,
            line_height,
            columns: columns.max(1),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Rows a block of `len` chars occupies; an empty block still takes one.
    pub fn rows_for(&self, len: usize) -> usize {
        len.div_ceil(self.columns).max(1)
    }

    /// First row of each block, in document order.
    fn first_row(&self, document: &Document, block: usize) -> usize {
        document
            .blocks()
            .iter()
            .take(block)
            .map(|b| self.rows_for(b.content().map_or(0, |c| c.char_len())))
            .sum()
    }

    fn cell(&self, row: usize, col: usize, cols: usize) -> Rect {
        Rect::new(
            col as f64 * self.char_width,
            row as f64 * self.line_height,
            cols as f64 * self.char_width,
            self.line_height,
        )
    }
}

impl TextLayout for MonospaceLayout {
    fn range_rect(&self, document: &Document, block: usize, range: CharRange) -> Rect {
        if document.block(block).is_none() {
            return Rect::EMPTY;
        }
        let top = self.first_row(document, block);
        if range.is_empty() {
            let row = top + range.start / self.columns;
            return self.cell(row, range.start % self.columns, 0);
        }

        let mut rect = Rect::EMPTY;
        let mut offset = range.start;
        while offset < range.end {
            let col = offset % self.columns;
            let run = (self.columns - col).min(range.end - offset);
            rect = rect.union(&self.cell(top + offset / self.columns, col, run));
            offset += run;
        }
        rect
    }
}
