//! The displayed text and its single highlighted word
//!
//! The base text never changes while a document is displayed. Highlighting
//! only records which word is being spoken; the decorated form is produced on
//! demand by [`Document::segments`].

use super::tokenizer::{next_span, words, WordSpan};
use log::warn;

/// Text owned by the view, plus the word currently highlighted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
    highlight: Option<WordSpan>,
}

/// A run of text that is either entirely spoken or entirely plain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub spoken: bool,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlight: None,
        }
    }

    /// The undecorated text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True when there is no word to speak at all
    pub fn is_blank(&self) -> bool {
        next_span(&self.text, 0).is_none()
    }

    /// Number of words in the text
    pub fn word_count(&self) -> usize {
        words(&self.text).count()
    }

    /// Number of words that start before `offset`
    pub fn words_before(&self, offset: usize) -> usize {
        words(&self.text)
            .take_while(|span| span.start < offset)
            .count()
    }

    /// The word covered by `span`
    pub fn word(&self, span: WordSpan) -> &str {
        span.word(&self.text)
    }

    /// Currently highlighted word, if any
    pub fn highlighted(&self) -> Option<WordSpan> {
        self.highlight
    }

    /// Highlight `span`, replacing any previous highlight
    ///
    /// Spans that do not fit the text are rejected and leave the document
    /// without a highlight.
    pub fn highlight(&mut self, span: WordSpan) {
        let fits = span.start < span.end
            && span.end <= self.text.len()
            && self.text.is_char_boundary(span.start)
            && self.text.is_char_boundary(span.end);

        if fits {
            self.highlight = Some(span);
        } else {
            warn!(
                "Ignoring highlight {}..{} outside text of {} bytes",
                span.start,
                span.end,
                self.text.len()
            );
            self.highlight = None;
        }
    }

    /// Remove the highlight
    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    /// Split the text into plain and spoken runs, in order
    ///
    /// Empty runs are omitted, so an unhighlighted document yields one plain
    /// segment and an empty document yields none.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut out = Vec::with_capacity(3);

        match self.highlight {
            Some(span) => {
                let before = &self.text[..span.start];
                let spoken = &self.text[span.start..span.end];
                let after = &self.text[span.end..];
                for (text, spoken) in [(before, false), (spoken, true), (after, false)] {
                    if !text.is_empty() {
                        out.push(Segment { text, spoken });
                    }
                }
            }
            None if !self.text.is_empty() => out.push(Segment {
                text: &self.text,
                spoken: false,
            }),
            None => {}
        }

        out
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Document::new(text)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Document::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_documents() {
        assert!(Document::new("").is_blank());
        assert!(Document::new(" \n\t").is_blank());
        assert!(!Document::new(" a ").is_blank());
    }

    #[test]
    fn test_word_counts() {
        let doc = Document::new(" one two  three ");
        assert_eq!(doc.word_count(), 3);
        assert_eq!(doc.words_before(0), 0);
        assert_eq!(doc.words_before(1), 0);
        assert_eq!(doc.words_before(2), 1);
        assert_eq!(doc.words_before(doc.len()), 3);
        assert_eq!(Document::new("  ").word_count(), 0);
    }

    #[test]
    fn test_highlight_replaces_previous() {
        let mut doc = Document::new("Hello world");
        doc.highlight(WordSpan::new(0, 5));
        doc.highlight(WordSpan::new(6, 11));
        assert_eq!(doc.highlighted(), Some(WordSpan::new(6, 11)));

        let spoken: Vec<_> = doc.segments().into_iter().filter(|s| s.spoken).collect();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].text, "world");
    }

    #[test]
    fn test_segments() {
        let mut doc = Document::new("one two three");
        assert_eq!(
            doc.segments(),
            vec![Segment {
                text: "one two three",
                spoken: false
            }]
        );

        doc.highlight(WordSpan::new(4, 7));
        let texts: Vec<_> = doc.segments().iter().map(|s| (s.text, s.spoken)).collect();
        assert_eq!(
            texts,
            vec![("one ", false), ("two", true), (" three", false)]
        );

        doc.highlight(WordSpan::new(0, 3));
        assert_eq!(doc.segments().len(), 2);
        assert!(doc.segments()[0].spoken);
    }

    #[test]
    fn test_base_text_unchanged_by_highlight() {
        let mut doc = Document::new("Hello world");
        doc.highlight(WordSpan::new(0, 5));
        doc.clear_highlight();
        assert_eq!(doc.text(), "Hello world");
        assert_eq!(doc.highlighted(), None);
        assert!(Document::new("").segments().is_empty());
    }

    #[test]
    fn test_out_of_range_highlight_rejected() {
        let mut doc = Document::new("One");
        doc.highlight(WordSpan::new(0, 3));
        doc.highlight(WordSpan::new(2, 9));
        assert_eq!(doc.highlighted(), None);

        let mut doc = Document::new("é");
        doc.highlight(WordSpan::new(1, 2));
        assert_eq!(doc.highlighted(), None);
    }
}
