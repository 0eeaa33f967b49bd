use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::segment::Segment;

static PARAGRAPH_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("paragraph break pattern is valid"));

const OPEN: Segment<'static> = Segment::Markup(Cow::Borrowed("<p>"));
const CLOSE: Segment<'static> = Segment::Markup(Cow::Borrowed("</p>"));
const LINE_BREAK: Segment<'static> = Segment::Markup(Cow::Borrowed("<br />"));

/// `\r\n` and lone `\r` become `\n`.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

pub(crate) fn wrap_paragraphs<'t>(segments: Vec<Segment<'t>>) -> Vec<Segment<'t>> {
    if segments.iter().all(is_blank) {
        return vec![OPEN, CLOSE];
    }

    let mut paragraphs: Vec<Vec<Segment<'t>>> = vec![Vec::new()];
    for segment in segments {
        match segment {
            Segment::Text(text) => {
                let mut pieces = PARAGRAPH_BREAK_RE.split(text);
                if let Some(first) = pieces.next() {
                    push_text(&mut paragraphs, first);
                }
                for piece in pieces {
                    paragraphs.push(Vec::new());
                    push_text(&mut paragraphs, piece);
                }
            }
            other => {
                if let Some(current) = paragraphs.last_mut() {
                    current.push(other);
                }
            }
        }
    }
    while paragraphs.len() > 1 && paragraphs.last().is_some_and(Vec::is_empty) {
        paragraphs.pop();
    }

    let mut out = Vec::new();
    for paragraph in paragraphs {
        out.push(OPEN);
        let last = paragraph.len().saturating_sub(1);
        for (index, segment) in paragraph.into_iter().enumerate() {
            match segment {
                Segment::Text(text) => break_lines(&mut out, text, index == 0, index == last),
                other => out.push(other),
            }
        }
        out.push(CLOSE);
    }
    out
}

fn is_blank(segment: &Segment<'_>) -> bool {
    matches!(segment, Segment::Text(text) if text.trim().is_empty())
}

fn push_text<'t>(paragraphs: &mut [Vec<Segment<'t>>], text: &'t str) {
    if text.is_empty() {
        return;
    }
    if let Some(current) = paragraphs.last_mut() {
        current.push(Segment::Text(text));
    }
}

fn break_lines<'t>(out: &mut Vec<Segment<'t>>, text: &'t str, first: bool, last: bool) {
    let lines: Vec<&'t str> = text.split('\n').collect();
    let final_line = lines.len() - 1;
    let mut at_start = first;
    for (index, &line) in lines.iter().enumerate() {
        if !line.is_empty() {
            out.push(Segment::Text(line));
        }
        if index == final_line {
            break;
        }
        let has_before = !(at_start && line.is_empty());
        let has_after = !(last && index + 1 == final_line && lines[final_line].is_empty());
        if has_before && has_after {
            out.push(LINE_BREAK);
        }
        at_start = at_start && line.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_newlines, wrap_paragraphs};
    use crate::emit::HtmlWriter;
    use crate::segment::Segment;

    fn wrap(text: &str) -> String {
        let mut writer = HtmlWriter::new();
        for segment in wrap_paragraphs(vec![Segment::Text(text)]) {
            match segment {
                Segment::Text(text) => writer.text(text),
                Segment::Markup(html) => writer.raw(&html),
                Segment::Shielded(_) => {}
            }
        }
        writer.finish()
    }

    #[test]
    fn double_newlines_separate_paragraphs() {
        assert_eq!(wrap("a\n\n\nb"), "<p>a</p><p>b</p>");
    }

    #[test]
    fn inner_newlines_become_breaks() {
        assert_eq!(wrap("a\nb\nc"), "<p>a<br />b<br />c</p>");
    }

    #[test]
    fn edge_newlines_are_dropped() {
        assert_eq!(wrap("\na\n"), "<p>a</p>");
        assert_eq!(wrap("a\n\n"), "<p>a</p>");
    }

    #[test]
    fn leading_separator_keeps_an_empty_paragraph() {
        assert_eq!(wrap("\n\na"), "<p></p><p>a</p>");
    }

    #[test]
    fn long_runs_of_single_newlines_keep_every_break() {
        let text = "a\n".repeat(50_000);
        let wrapped = wrap_paragraphs(vec![Segment::Text(&text)]);
        let breaks = wrapped
            .iter()
            .filter(|segment| matches!(segment, Segment::Markup(html) if html == "<br />"))
            .count();
        assert_eq!(breaks, 49_999);
    }

    #[test]
    fn blank_input_is_one_empty_paragraph() {
        assert_eq!(wrap(""), "<p></p>");
        assert_eq!(wrap(" \n "), "<p></p>");
    }

    #[test]
    fn markup_counts_as_content() {
        let segments = vec![
            Segment::Text("a\n"),
            Segment::Shielded(0),
            Segment::Text("\n"),
        ];
        let wrapped = wrap_paragraphs(segments);
        assert_eq!(wrapped.len(), 5);
        assert!(matches!(&wrapped[2], Segment::Markup(html) if html == "<br />"));
        assert_eq!(wrapped[3], Segment::Shielded(0));
    }

    #[test]
    fn carriage_returns_are_normalized() {
        assert_eq!(normalize_newlines("a\r\nb\rc"), "a\nb\nc");
    }
}
