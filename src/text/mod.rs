//! Displayed text: word tokenizing, highlight state and highlight styles

pub mod document;
pub mod style;
pub mod tokenizer;

pub use document::{Document, Segment};
pub use style::{Color, HighlightStyle};
pub use tokenizer::{is_word_break, next_span, offset_after, words, WordSpan, Words};
