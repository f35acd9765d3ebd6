use crate::shared::range::CharRange;
use crate::shared::rect::Rect;

use super::document::Document;

/// Domain interface for measuring where rendered text lands on screen.
pub trait TextLayout {
    /// Bounding box of `range` inside block `block` of `document`.
    ///
    /// Returns `Rect::EMPTY` when the block does not exist.
    fn range_rect(&self, document: &Document, block: usize, range: CharRange) -> Rect;
}
