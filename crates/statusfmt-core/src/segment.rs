use std::borrow::Cow;

use crate::span::Span;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Piece {
    Shielded(usize),
    Markup(String),
    Literal,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tagged {
    pub span: Span,
    pub piece: Piece,
}

impl Tagged {
    pub fn markup(span: Span, html: String) -> Self {
        Self {
            span,
            piece: Piece::Markup(html),
        }
    }

    pub fn literal(span: Span) -> Self {
        Self {
            span,
            piece: Piece::Literal,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Segment<'t> {
    Text(&'t str),
    Markup(Cow<'static, str>),
    Shielded(usize),
}

/// Sorted, non-overlapping claims over one scanned text.
#[derive(Clone, Debug, Default)]
pub(crate) struct Layout {
    claims: Vec<Tagged>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_claims(mut claims: Vec<Tagged>) -> Self {
        claims.sort_by_key(|claim| claim.span.start);
        Self { claims }
    }

    pub fn gaps(&self, len: usize) -> Vec<Span> {
        let mut gaps = Vec::with_capacity(self.claims.len() + 1);
        let mut cursor = 0;
        for claim in &self.claims {
            if claim.span.start > cursor {
                gaps.push(Span::at(cursor, claim.span.start - cursor));
            }
            cursor = claim.span.end;
        }
        if cursor < len {
            gaps.push(Span::at(cursor, len - cursor));
        }
        gaps
    }

    /// Runs `scan` over every gap and merges what it claims.
    pub fn claim_gaps<F>(&mut self, text: &str, mut scan: F) -> usize
    where
        F: FnMut(&str, Span) -> Vec<Tagged>,
    {
        let mut found = Vec::new();
        for gap in self.gaps(text.len()) {
            for tagged in scan(text, gap) {
                debug_assert!(tagged.span.start >= gap.start && tagged.span.end <= gap.end);
                found.push(tagged);
            }
        }
        let count = found.len();
        self.claims.extend(found);
        self.claims.sort_by_key(|claim| claim.span.start);
        count
    }

    pub fn segments<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut out = Vec::with_capacity(self.claims.len() * 2 + 1);
        // Start of the pending run of plain text (gaps and literals merge).
        let mut run_start = 0;
        for claim in &self.claims {
            match &claim.piece {
                Piece::Literal => continue,
                Piece::Markup(html) => {
                    push_text(&mut out, &text[run_start..claim.span.start]);
                    out.push(Segment::Markup(Cow::Owned(html.clone())));
                }
                Piece::Shielded(index) => {
                    push_text(&mut out, &text[run_start..claim.span.start]);
                    out.push(Segment::Shielded(*index));
                }
            }
            run_start = claim.span.end;
        }
        push_text(&mut out, &text[run_start..]);
        out
    }
}

fn push_text<'t>(out: &mut Vec<Segment<'t>>, text: &'t str) {
    if !text.is_empty() {
        out.push(Segment::Text(text));
    }
}

pub(crate) fn char_before(text: &str, at: usize) -> Option<char> {
    text[..at].chars().next_back()
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::{Layout, Segment, Tagged};
    use crate::span::Span;

    #[test]
    fn gaps_cover_unclaimed_text() {
        let layout = Layout::from_claims(vec![
            Tagged::literal(Span::at(2, 3)),
            Tagged::markup(Span::at(7, 1), "<b>".to_string()),
        ]);
        assert_eq!(
            layout.gaps(10),
            vec![Span::at(0, 2), Span::at(5, 2), Span::at(8, 2)]
        );
    }

    #[test]
    fn literals_merge_into_surrounding_text() {
        let text = "ab cd ef";
        let layout = Layout::from_claims(vec![
            Tagged::literal(Span::at(3, 2)),
            Tagged::markup(Span::at(6, 2), "<i>ef</i>".to_string()),
        ]);
        assert_eq!(
            layout.segments(text),
            vec![
                Segment::Text("ab cd "),
                Segment::Markup(Cow::Owned("<i>ef</i>".to_string())),
            ]
        );
    }

    #[test]
    fn later_scans_only_see_gaps() {
        let text = "one two three";
        let mut layout = Layout::from_claims(vec![Tagged::literal(Span::at(4, 3))]);
        let mut seen = Vec::new();
        layout.claim_gaps(text, |text, gap| {
            seen.push(gap.slice(text).to_string());
            Vec::new()
        });
        assert_eq!(seen, vec!["one ", " three"]);
    }
}
