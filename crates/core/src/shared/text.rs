/// Single-character tokens that attach to the preceding word.
pub const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

pub fn is_punctuation(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => PUNCTUATION.contains(&c),
        _ => false,
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the `offset`-th char, or `None` past the end.
///
/// `offset == char_len(text)` maps to `text.len()`.
pub fn byte_index(text: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return Some(0);
    }
    match text.char_indices().nth(offset) {
        Some((idx, _)) => Some(idx),
        None if char_len(text) == offset => Some(text.len()),
        None => None,
    }
}

pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::period(".", true)]
    #[case::comma(",", true)]
    #[case::question("?", true)]
    #[case::colon(":", true)]
    #[case::word("hello", false)]
    #[case::double("..", false)]
    #[case::hyphen("-", false)]
    #[case::empty("", false)]
    fn test_is_punctuation(#[case] token: &str, #[case] expected: bool) {
        assert_eq!(is_punctuation(token), expected);
    }

    #[test]
    fn test_byte_index_multibyte() {
        let text = "café au lait";
        assert_eq!(byte_index(text, 0), Some(0));
        assert_eq!(byte_index(text, 4), Some(5));
        assert_eq!(byte_index(text, 12), Some(text.len()));
        assert_eq!(byte_index(text, 13), None);
    }

    #[test]
    fn test_byte_index_empty() {
        assert_eq!(byte_index("", 0), Some(0));
        assert_eq!(byte_index("", 1), None);
    }

    #[test]
    fn test_token_count() {
        assert_eq!(token_count("Hello, world."), 2);
        assert_eq!(token_count("  spaced   out "), 2);
        assert_eq!(token_count(""), 0);
    }
}
