//! Draw a document to an ANSI terminal
//!
//! The spoken word gets 24-bit SGR colours from the highlight style. Text is
//! wrapped by display width, so wide characters take two columns.

use crate::text::{Color, Document, HighlightStyle};
use unicode_width::UnicodeWidthChar;

const RESET: &str = "\x1b[0m";

/// SGR sequence switching on `style`, empty when it draws nothing
pub fn style_sequence(style: &HighlightStyle) -> String {
    let mut seq = String::new();
    if let Some(bg) = style.background.filter(|c| !c.is_transparent()) {
        seq.push_str(&sgr(48, bg));
    }
    if let Some(fg) = style.foreground.filter(|c| !c.is_transparent()) {
        seq.push_str(&sgr(38, fg));
    }
    seq
}

fn sgr(kind: u8, color: Color) -> String {
    format!("\x1b[{};2;{};{};{}m", kind, color.r, color.g, color.b)
}

/// Render `document` wrapped to `width` columns
///
/// Lines end in "\r\n" so output is correct on a raw-mode terminal.
pub fn render(document: &Document, style: &HighlightStyle, width: u16) -> String {
    let width = usize::from(width.max(1));
    let on = if style.is_visible() {
        style_sequence(style)
    } else {
        String::new()
    };
    let mut out = String::with_capacity(document.len() + 32);
    let mut column = 0;

    for segment in document.segments() {
        let styled = segment.spoken && !on.is_empty();
        if styled {
            out.push_str(&on);
        }

        for ch in segment.text.chars() {
            if ch == '\n' {
                out.push_str("\r\n");
                column = 0;
                continue;
            }
            if ch == '\r' {
                continue;
            }

            let w = ch.width().unwrap_or(0);
            if column + w > width && column > 0 {
                out.push_str("\r\n");
                column = 0;
            }
            out.push(ch);
            column += w;
        }

        if styled {
            out.push_str(RESET);
        }
    }

    out
}

/// Number of terminal rows `render` output occupies
pub fn rendered_rows(rendered: &str) -> usize {
    if rendered.is_empty() {
        0
    } else {
        rendered.matches("\r\n").count() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::WordSpan;

    fn yellow_on_black() -> HighlightStyle {
        HighlightStyle::new(Some(Color::rgb(255, 255, 0)), Some(Color::rgb(0, 0, 0)))
    }

    #[test]
    fn test_plain_render() {
        let doc = Document::new("Hello world");
        assert_eq!(render(&doc, &yellow_on_black(), 80), "Hello world");
    }

    #[test]
    fn test_highlight_render() {
        let mut doc = Document::new("Hello world");
        doc.highlight(WordSpan::new(6, 11));
        let out = render(&doc, &yellow_on_black(), 80);
        assert_eq!(
            out,
            "Hello \x1b[48;2;255;255;0m\x1b[38;2;0;0;0mworld\x1b[0m"
        );
    }

    #[test]
    fn test_absent_colours_draw_nothing() {
        let mut doc = Document::new("Hello world");
        doc.highlight(WordSpan::new(0, 5));
        assert_eq!(render(&doc, &HighlightStyle::default(), 80), "Hello world");

        let fg_only = HighlightStyle::new(None, Some(Color::rgb(1, 2, 3)));
        assert_eq!(
            render(&doc, &fg_only, 80),
            "\x1b[38;2;1;2;3mHello\x1b[0m world"
        );
    }

    #[test]
    fn test_transparent_style_draws_nothing() {
        let mut doc = Document::new("Hello");
        doc.highlight(WordSpan::new(0, 5));
        let clear = HighlightStyle::new(Some(Color::rgba(9, 9, 9, 0)), None);
        assert_eq!(render(&doc, &clear, 80), "Hello");
    }

    #[test]
    fn test_wrapping() {
        let doc = Document::new("abcdef\ngh");
        let out = render(&doc, &HighlightStyle::default(), 4);
        assert_eq!(out, "abcd\r\nef\r\ngh");
        assert_eq!(rendered_rows(&out), 3);
    }

    #[test]
    fn test_wide_chars_wrap_by_width() {
        let doc = Document::new("日本語");
        let out = render(&doc, &HighlightStyle::default(), 4);
        assert_eq!(out, "日本\r\n語");
    }
}
