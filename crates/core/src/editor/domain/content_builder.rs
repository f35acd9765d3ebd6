use crate::shared::range::CharRange;
use crate::shared::text::char_len;
use crate::transcript::domain::word::{Segment, Word};

use super::node::{Block, Content};
use super::timing::Timing;

/// Flattens words into one space-joined string with a timing entry per
/// spoken word.
///
/// Punctuation attaches to the preceding word: no space before it, no
/// entry of its own, and the preceding entry's char span absorbs it.
/// Punctuation opening the list has nothing to attach to and is kept as an
/// ordinary word.
pub fn build_content(words: &[Word], editable: bool) -> (Content, Vec<Timing>) {
    let mut text = String::new();
    let mut timings = Vec::with_capacity(words.len());
    let mut offset = 0;

    for (i, word) in words.iter().enumerate() {
        let next = words.get(i + 1);
        let attached = i > 0 && word.is_punctuation();
        let len = char_len(&word.text);

        if !attached {
            let mut chars = CharRange::new(offset, offset + len);
            if next.is_some_and(Word::is_punctuation) {
                chars.end += 1;
            }
            timings.push(Timing::new(chars, word.timing));
        }

        text.push_str(&word.text);
        offset += len;

        if next.is_some_and(|n| !n.is_punctuation()) {
            text.push(' ');
            offset += 1;
        }
    }

    (Content::new(text, editable), timings)
}

/// One block per speaker turn. A turn opens at the first word and at every
/// word carrying a speaker.
pub fn build_blocks(segment: &Segment, editable: bool) -> Vec<Block> {
    let words = &segment.words;
    let mut starts: Vec<usize> = words
        .iter()
        .enumerate()
        .filter(|(i, w)| *i == 0 || w.speaker.is_some())
        .map(|(i, _)| i)
        .collect();
    starts.push(words.len());

    starts
        .windows(2)
        .map(|bounds| {
            let group = &words[bounds[0]..bounds[1]];
            let (content, timings) = build_content(group, editable);
            let speaker = group.first().and_then(|w| w.speaker.clone());
            Block::new(speaker, content, timings)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::range::TimeRange;
    use approx::assert_relative_eq;

    fn words(tokens: &[&str]) -> Vec<Word> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, t)| Word::new(*t, i as f64, i as f64 + 1.0))
            .collect()
    }

    // ── build_content ────────────────────────────────────────────────

    #[test]
    fn test_plain_words_join_with_spaces() {
        let input = words(&["the", "cat", "sat"]);
        let (content, timings) = build_content(&input, true);
        assert_eq!(content.text, "the cat sat");
        assert!(content.editable);
        let spans: Vec<_> = timings.iter().map(|t| t.chars).collect();
        assert_eq!(
            spans,
            vec![CharRange::new(0, 3), CharRange::new(4, 7), CharRange::new(8, 11)]
        );
    }

    #[test]
    fn test_each_span_covers_its_word() {
        let input = words(&["alpha", "be", "gamma"]);
        let (content, timings) = build_content(&input, false);
        let chars: Vec<char> = content.text.chars().collect();
        for (word, timing) in input.iter().zip(&timings) {
            let covered: String = chars[timing.chars.start..timing.chars.end].iter().collect();
            assert_eq!(covered, word.text);
        }
    }

    #[test]
    fn test_punctuation_attaches_to_previous_word() {
        let input = words(&["hello", ",", "world", "."]);
        let (content, timings) = build_content(&input, true);
        assert_eq!(content.text, "hello, world.");
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].chars, CharRange::new(0, 6));
        assert_eq!(timings[1].chars, CharRange::new(7, 13));
        assert_relative_eq!(timings[1].time.start, 2.0);
    }

    #[test]
    fn test_leading_punctuation_is_ordinary_text() {
        let input = words(&[",", "so"]);
        let (content, timings) = build_content(&input, true);
        assert_eq!(content.text, ", so");
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].chars, CharRange::new(0, 1));
        assert_eq!(content.token_count(), timings.len());
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let input = words(&["café", "olé"]);
        let (content, timings) = build_content(&input, true);
        assert_eq!(content.text, "café olé");
        assert_eq!(timings[1].chars, CharRange::new(5, 8));
    }

    #[test]
    fn test_empty_words() {
        let (content, timings) = build_content(&[], true);
        assert!(content.text.is_empty());
        assert!(timings.is_empty());
    }

    // ── build_blocks ─────────────────────────────────────────────────

    #[test]
    fn test_blocks_split_on_speaker() {
        let mut input = words(&["hi", "there", "hello", "back"]);
        input[0].speaker = Some("A".to_string());
        input[2].speaker = Some("B".to_string());
        let blocks = build_blocks(&Segment::from_words(input), true);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].speaker.as_deref(), Some("A"));
        assert_eq!(blocks[0].text(), "hi there");
        assert_eq!(blocks[1].speaker.as_deref(), Some("B"));
        assert_eq!(blocks[1].text(), "hello back");
        assert_eq!(blocks[1].timings[0].chars, CharRange::new(0, 5));
    }

    #[test]
    fn test_first_group_without_speaker() {
        let mut input = words(&["a", "b", "c"]);
        input[1].speaker = Some("B".to_string());
        let blocks = build_blocks(&Segment::from_words(input), false);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].speaker, None);
        assert!(!blocks[0].editable);
    }

    #[test]
    fn test_no_words_no_blocks() {
        let blocks = build_blocks(&Segment::new(Vec::new(), TimeRange::new(0.0, 1.0)), true);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_block_duration_from_words() {
        let blocks = build_blocks(&Segment::from_words(words(&["a", "b"])), true);
        assert_relative_eq!(blocks[0].speaker_label().unwrap().duration, 2.0);
    }
}
