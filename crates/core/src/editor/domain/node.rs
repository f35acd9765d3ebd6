use crate::shared::range::{CharRange, TimeRange};
use crate::shared::text::{char_len, token_count};

use super::timing::{time_span, Timing};

/// Every kind of node the document tree can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Block,
    SpeakerLabel,
    Content,
    Unclear,
}

impl NodeKind {
    /// Atomic nodes are rendered as a whole and never hold a caret.
    pub fn is_atomic(self) -> bool {
        matches!(self, NodeKind::SpeakerLabel)
    }

    pub fn is_inline(self) -> bool {
        matches!(self, NodeKind::Content | NodeKind::Unclear)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeakerLabel {
    pub speaker: Option<String>,
    /// Seconds spoken in the owning block.
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Content {
    pub editable: bool,
    pub text: String,
    /// Char ranges the worker flagged as unclear, sorted and disjoint.
    pub unclear: Vec<CharRange>,
}

impl Content {
    pub fn new(text: impl Into<String>, editable: bool) -> Self {
        Self {
            editable,
            text: text.into(),
            unclear: Vec::new(),
        }
    }

    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }

    pub fn token_count(&self) -> usize {
        token_count(&self.text)
    }

    /// Splits the text into consecutive runs of plain and unclear chars.
    pub fn runs(&self) -> Vec<(NodeKind, CharRange)> {
        let len = self.char_len();
        let mut runs = Vec::new();
        let mut cursor = 0;
        for mark in &self.unclear {
            let start = mark.start.min(len);
            let end = mark.end.min(len);
            if start > cursor {
                runs.push((NodeKind::Content, CharRange::new(cursor, start)));
            }
            if end > start {
                runs.push((NodeKind::Unclear, CharRange::new(start, end)));
            }
            cursor = cursor.max(end);
        }
        if cursor < len {
            runs.push((NodeKind::Content, CharRange::new(cursor, len)));
        }
        runs
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BlockChild {
    SpeakerLabel(SpeakerLabel),
    Content(Content),
}

impl BlockChild {
    pub fn kind(&self) -> NodeKind {
        match self {
            BlockChild::SpeakerLabel(_) => NodeKind::SpeakerLabel,
            BlockChild::Content(_) => NodeKind::Content,
        }
    }
}

/// One speaker turn: a label followed by its text.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub speaker: Option<String>,
    pub editable: bool,
    pub timings: Vec<Timing>,
    pub children: Vec<BlockChild>,
}

impl Block {
    pub fn new(speaker: Option<String>, content: Content, timings: Vec<Timing>) -> Self {
        let label = SpeakerLabel {
            speaker: speaker.clone(),
            duration: time_span(&timings).map_or(0.0, |span| span.duration()),
        };
        Self {
            speaker,
            editable: content.editable,
            timings,
            children: vec![BlockChild::SpeakerLabel(label), BlockChild::Content(content)],
        }
    }

    pub fn content(&self) -> Option<&Content> {
        self.children.iter().find_map(|child| match child {
            BlockChild::Content(content) => Some(content),
            BlockChild::SpeakerLabel(_) => None,
        })
    }

    pub fn content_mut(&mut self) -> Option<&mut Content> {
        self.children.iter_mut().find_map(|child| match child {
            BlockChild::Content(content) => Some(content),
            BlockChild::SpeakerLabel(_) => None,
        })
    }

    pub fn content_count(&self) -> usize {
        self.children
            .iter()
            .filter(|child| child.kind() == NodeKind::Content)
            .count()
    }

    pub fn speaker_label(&self) -> Option<&SpeakerLabel> {
        self.children.iter().find_map(|child| match child {
            BlockChild::SpeakerLabel(label) => Some(label),
            BlockChild::Content(_) => None,
        })
    }

    pub fn text(&self) -> &str {
        self.content().map_or("", |content| content.text.as_str())
    }

    pub fn time_span(&self) -> Option<TimeRange> {
        time_span(&self.timings)
    }

    pub fn duration(&self) -> f64 {
        self.time_span().map_or(0.0, |span| span.duration())
    }

    /// Copies the block's speaker and duration into its label node.
    pub fn refresh_label(&mut self) {
        let speaker = self.speaker.clone();
        let duration = self.duration();
        for child in self.children.iter_mut() {
            if let BlockChild::SpeakerLabel(label) = child {
                label.speaker = speaker.clone();
                label.duration = duration;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn block() -> Block {
        Block::new(
            Some("A".to_string()),
            Content::new("the cat", true),
            vec![
                Timing::new(CharRange::new(0, 3), TimeRange::new(1.0, 1.5)),
                Timing::new(CharRange::new(4, 7), TimeRange::new(1.5, 2.25)),
            ],
        )
    }

    #[test]
    fn test_node_kind_atomicity() {
        assert!(NodeKind::SpeakerLabel.is_atomic());
        assert!(!NodeKind::Content.is_atomic());
        assert!(!NodeKind::Unclear.is_atomic());
        assert!(!NodeKind::Block.is_atomic());
        assert!(NodeKind::Unclear.is_inline());
        assert!(!NodeKind::Block.is_inline());
    }

    #[test]
    fn test_new_block_has_label_then_content() {
        let b = block();
        assert_eq!(b.children.len(), 2);
        assert_eq!(b.children[0].kind(), NodeKind::SpeakerLabel);
        assert_eq!(b.children[1].kind(), NodeKind::Content);
        assert_eq!(b.content_count(), 1);
        assert!(b.editable);
        assert_eq!(b.text(), "the cat");
    }

    #[test]
    fn test_label_carries_speaker_and_duration() {
        let b = block();
        let label = b.speaker_label().unwrap();
        assert_eq!(label.speaker.as_deref(), Some("A"));
        assert_relative_eq!(label.duration, 1.25);
    }

    #[test]
    fn test_refresh_label_after_change() {
        let mut b = block();
        b.speaker = Some("B".to_string());
        b.timings.pop();
        b.refresh_label();
        let label = b.speaker_label().unwrap();
        assert_eq!(label.speaker.as_deref(), Some("B"));
        assert_relative_eq!(label.duration, 0.5);
    }

    #[test]
    fn test_block_without_timings_has_zero_duration() {
        let b = Block::new(None, Content::new("", false), Vec::new());
        assert_relative_eq!(b.duration(), 0.0);
        assert!(b.time_span().is_none());
    }

    #[test]
    fn test_runs_without_marks() {
        let c = Content::new("hello", true);
        assert_eq!(c.runs(), vec![(NodeKind::Content, CharRange::new(0, 5))]);
    }

    #[test]
    fn test_runs_with_unclear_mark() {
        let mut c = Content::new("the cat sat", true);
        c.unclear.push(CharRange::new(4, 7));
        assert_eq!(
            c.runs(),
            vec![
                (NodeKind::Content, CharRange::new(0, 4)),
                (NodeKind::Unclear, CharRange::new(4, 7)),
                (NodeKind::Content, CharRange::new(7, 11)),
            ]
        );
    }

    #[test]
    fn test_runs_mark_at_end_clamped() {
        let mut c = Content::new("abc", true);
        c.unclear.push(CharRange::new(1, 10));
        assert_eq!(
            c.runs(),
            vec![
                (NodeKind::Content, CharRange::new(0, 1)),
                (NodeKind::Unclear, CharRange::new(1, 3)),
            ]
        );
    }
}
