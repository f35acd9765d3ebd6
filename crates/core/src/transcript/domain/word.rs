use crate::shared::range::TimeRange;
use crate::shared::text::is_punctuation;

/// One recognized token with its audio span.
///
/// `speaker` is set only on the first word of a new speaker turn.
#[derive(Clone, Debug, PartialEq)]
pub struct Word {
    pub text: String,
    pub timing: TimeRange,
    pub speaker: Option<String>,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            timing: TimeRange::new(start, end),
            speaker: None,
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn is_punctuation(&self) -> bool {
        is_punctuation(&self.text)
    }
}

/// An ordered run of words sharing editability.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segment {
    pub words: Vec<Word>,
    pub timing: TimeRange,
}

impl Segment {
    pub fn new(words: Vec<Word>, timing: TimeRange) -> Self {
        Self { words, timing }
    }

    /// Segment whose timing spans its first and last word.
    pub fn from_words(words: Vec<Word>) -> Self {
        let timing = match (words.first(), words.last()) {
            (Some(first), Some(last)) => TimeRange::new(first.timing.start, last.timing.end),
            _ => TimeRange::default(),
        };
        Self { words, timing }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Speakers opening a turn in this segment, in order.
    pub fn speakers(&self) -> impl Iterator<Item = &str> {
        self.words.iter().filter_map(|w| w.speaker.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_word_punctuation() {
        assert!(Word::new(",", 1.0, 1.0).is_punctuation());
        assert!(!Word::new("hello", 1.0, 1.5).is_punctuation());
    }

    #[test]
    fn test_with_speaker() {
        let w = Word::new("hi", 0.0, 0.2).with_speaker("A");
        assert_eq!(w.speaker.as_deref(), Some("A"));
    }

    #[test]
    fn test_segment_from_words_timing() {
        let seg = Segment::from_words(vec![Word::new("a", 1.5, 2.0), Word::new("b", 2.0, 3.25)]);
        assert_relative_eq!(seg.timing.start, 1.5);
        assert_relative_eq!(seg.timing.end, 3.25);
    }

    #[test]
    fn test_segment_from_no_words() {
        let seg = Segment::from_words(Vec::new());
        assert!(seg.is_empty());
        assert_relative_eq!(seg.timing.duration(), 0.0);
    }

    #[test]
    fn test_segment_speakers() {
        let seg = Segment::from_words(vec![
            Word::new("a", 0.0, 1.0).with_speaker("A"),
            Word::new("b", 1.0, 2.0),
            Word::new("c", 2.0, 3.0).with_speaker("B"),
        ]);
        assert_eq!(seg.speakers().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
