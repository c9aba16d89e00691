//! Whitespace word tokenizer
//!
//! Offsets are byte offsets into the text. A word is a maximal run of
//! characters that are not word breaks (see [`is_word_break`]).

/// Whether `c` separates words
///
/// Unicode whitespace, except the no-break spaces (U+00A0, U+2007, U+202F)
/// and NEL, which keep "10\u{A0}km" together as one word. The ASCII
/// information separators U+001C..=U+001F do break words.
pub fn is_word_break(c: char) -> bool {
    match c {
        '\u{1C}'..='\u{1F}' => true,
        '\u{85}' | '\u{A0}' | '\u{2007}' | '\u{202F}' => false,
        c => c.is_whitespace(),
    }
}

/// A word within the text, as the half-open byte range `[start, end)`
///
/// `start` is always strictly less than `end`, and both sit on character
/// boundaries of the text the span was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordSpan {
    pub start: usize,
    pub end: usize,
}

impl WordSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the word in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Spans are never empty; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Slice the word out of the text it was found in
    pub fn word<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Find the next word at or after `from`
///
/// Returns `None` when only word breaks remain, when the text is empty, or
/// when `from` is at or past the end. An offset landing inside a multi-byte
/// character is moved forward to the next character boundary.
pub fn next_span(text: &str, from: usize) -> Option<WordSpan> {
    if from >= text.len() {
        return None;
    }

    let from = ceil_char_boundary(text, from);
    let start = from + text[from..].find(|c: char| !is_word_break(c))?;
    let end = text[start..]
        .find(is_word_break)
        .map_or(text.len(), |i| start + i);

    Some(WordSpan { start, end })
}

/// Offset where scanning resumes once `span` has been spoken
///
/// Skips the single break character that terminated the word. The last
/// word of the text has no delimiter, so the result is then the text length.
pub fn offset_after(text: &str, span: WordSpan) -> usize {
    let delimiter = text[span.end..].chars().next().map_or(0, char::len_utf8);
    span.end + delimiter
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Iterator over every word of a text, in order
pub struct Words<'a> {
    text: &'a str,
    offset: usize,
}

/// Iterate over the words of `text`
pub fn words(text: &str) -> Words<'_> {
    Words { text, offset: 0 }
}

impl<'a> Iterator for Words<'a> {
    type Item = WordSpan;

    fn next(&mut self) -> Option<WordSpan> {
        let span = next_span(self.text, self.offset)?;
        self.offset = offset_after(self.text, span);
        Some(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_words() {
        let text = "Hello world";
        assert_eq!(next_span(text, 0), Some(WordSpan::new(0, 5)));
        assert_eq!(next_span(text, 6), Some(WordSpan::new(6, 11)));
        assert_eq!(next_span(text, 12), None);
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(next_span("", 0), None);
        assert_eq!(next_span("   ", 0), None);
        assert_eq!(next_span("\t\n ", 1), None);
    }

    #[test]
    fn test_offset_past_end() {
        assert_eq!(next_span("One", 3), None);
        assert_eq!(next_span("One", 4), None);
        assert_eq!(next_span("One", usize::MAX), None);
    }

    #[test]
    fn test_leading_whitespace_skipped() {
        let text = "   spaced\tout";
        assert_eq!(next_span(text, 0), Some(WordSpan::new(3, 9)));
        assert_eq!(next_span(text, 9), Some(WordSpan::new(10, 13)));
    }

    #[test]
    fn test_mid_word_offset() {
        // Scanning from inside a word yields the rest of that word
        assert_eq!(next_span("Hello", 2), Some(WordSpan::new(2, 5)));
    }

    #[test]
    fn test_unicode_whitespace() {
        // U+3000 ideographic space is three bytes wide
        let text = "日本\u{3000}語";
        let first = next_span(text, 0).unwrap();
        assert_eq!(first.word(text), "日本");
        let resume = offset_after(text, first);
        assert_eq!(resume, first.end + 3);
        let second = next_span(text, resume).unwrap();
        assert_eq!(second.word(text), "語");
    }

    #[test]
    fn test_no_break_space_joins_words() {
        let text = "10\u{A0}km to\u{202F}go";
        let found: Vec<&str> = words(text).map(|s| s.word(text)).collect();
        assert_eq!(found, vec!["10\u{A0}km", "to\u{202F}go"]);
    }

    #[test]
    fn test_separator_controls_break_words() {
        let text = "a\u{1F}b\u{2003}c";
        let found: Vec<&str> = words(text).map(|s| s.word(text)).collect();
        assert_eq!(found, vec!["a", "b", "c"]);
        assert!(!is_word_break('x'));
        assert!(is_word_break('\t'));
    }

    #[test]
    fn test_offset_inside_multibyte_char() {
        let text = "é b";
        // Byte 1 is inside 'é'; scanning starts at the following space
        assert_eq!(next_span(text, 1), Some(WordSpan::new(3, 4)));
    }

    #[test]
    fn test_offset_after_last_word() {
        let text = "One";
        let span = next_span(text, 0).unwrap();
        assert_eq!(offset_after(text, span), 3);
    }

    #[test]
    fn test_span_bounds_hold_for_every_offset() {
        let texts = [
            "",
            " ",
            "a",
            "Hello world",
            "  two  spaces  ",
            "x\ny\tz",
            "ü ö ä",
            "1\u{A0}2 3",
        ];
        for text in texts {
            for from in 0..=text.len() {
                match next_span(text, from) {
                    None => {
                        let tail_blank = from >= text.len()
                            || text[ceil_char_boundary(text, from)..]
                                .chars()
                                .all(is_word_break);
                        assert!(tail_blank, "missed a word in {:?} from {}", text, from);
                    }
                    Some(span) => {
                        assert!(from <= span.start, "{:?} from {}", text, from);
                        assert!(span.start < span.end);
                        assert!(span.end <= text.len());
                        assert!(!span.word(text).contains(is_word_break));
                    }
                }
            }
        }
    }

    #[test]
    fn test_words_iterator() {
        let text = " The quick  brown\tfox ";
        let found: Vec<&str> = words(text).map(|s| s.word(text)).collect();
        assert_eq!(found, vec!["The", "quick", "brown", "fox"]);
        assert_eq!(words("").count(), 0);
    }
}
