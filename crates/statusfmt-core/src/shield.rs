use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::emit::{HtmlWriter, escape_html};
use crate::sanitize::{AllowlistConfig, Profile};
use crate::segment::{Layout, Piece, Segment, Tagged};
use crate::span::Span;

static FENCED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^```([^\n]*)\n(.*?)\n```$").expect("fenced code pattern is valid")
});

static INLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("inline code pattern is valid"));

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[\[codeblock(\d+)\]\]\]").expect("shield token pattern is valid")
});

/// A shielded code span and the markup it restores to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShieldMark {
    pub token: String,
    pub span: Span,
    pub html: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shielded {
    pub text: String,
    pub marks: Vec<ShieldMark>,
}

impl Shielded {
    pub(crate) fn layout(&self) -> Layout {
        Layout::from_claims(
            self.marks
                .iter()
                .enumerate()
                .map(|(index, mark)| Tagged {
                    span: mark.span,
                    piece: Piece::Shielded(index),
                })
                .collect(),
        )
    }
}

enum CodeKind<'a> {
    Fenced { language: &'a str, body: &'a str },
    Inline { body: &'a str },
}

/// Replaces fenced and inline code with tokens.
pub fn shield(text: &str, allowlist: &AllowlistConfig) -> Shielded {
    let highest = TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    let mut found: Vec<(Span, CodeKind<'_>)> = Vec::new();
    for caps in FENCED_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        found.push((
            Span::at(whole.start(), whole.len()),
            CodeKind::Fenced {
                language: caps.get(1).map_or("", |m| m.as_str()),
                body: caps.get(2).map_or("", |m| m.as_str()),
            },
        ));
    }

    let fenced = Layout::from_claims(
        found
            .iter()
            .map(|(span, _)| Tagged::literal(*span))
            .collect(),
    );
    for gap in fenced.gaps(text.len()) {
        for caps in INLINE_RE.captures_iter(gap.slice(text)) {
            let Some(whole) = caps.get(0) else { continue };
            let body = caps.get(1).map_or("", |m| m.as_str());
            found.push((
                Span::at(gap.start + whole.start(), whole.len()),
                CodeKind::Inline { body },
            ));
        }
    }

    let mut marks: Vec<ShieldMark> = found
        .iter()
        .enumerate()
        .map(|(index, (_, kind))| ShieldMark {
            token: format!("[[[codeblock{}]]]", highest.saturating_add(index as u64 + 1)),
            span: Span::at(0, 0),
            html: code_html(kind, allowlist),
        })
        .collect();

    let mut order: Vec<usize> = (0..found.len()).collect();
    order.sort_by_key(|&index| found[index].0.start);

    let mut shielded = String::with_capacity(text.len());
    let mut cursor = 0;
    for index in order {
        let source = found[index].0;
        shielded.push_str(&text[cursor..source.start]);
        let mark = &mut marks[index];
        mark.span = Span::at(shielded.len(), mark.token.len());
        shielded.push_str(&mark.token);
        cursor = source.end;
    }
    shielded.push_str(&text[cursor..]);

    debug!("shielded {} code span(s)", marks.len());
    Shielded {
        text: shielded,
        marks,
    }
}

/// Serializes processed segments, restoring every shielded span in place.
pub fn unshield(segments: &[Segment<'_>], marks: &[ShieldMark]) -> String {
    let mut writer = HtmlWriter::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => writer.text(text),
            Segment::Markup(html) => writer.raw(html),
            Segment::Shielded(index) => match marks.get(*index) {
                Some(mark) => writer.raw(&mark.html),
                None => debug!("no shield mark with index {}", index),
            },
        }
    }
    writer.finish()
}

fn code_html(kind: &CodeKind<'_>, allowlist: &AllowlistConfig) -> String {
    match kind {
        CodeKind::Fenced { language, body } => {
            let language = sanitize_language(language, allowlist);
            let body = allowlist.clean(Profile::Strict, &escape_html(body));
            if language.is_empty() {
                format!("<pre><code>{}</code></pre>", body)
            } else {
                format!(
                    "<pre><code data-language=\"{}\">{}</code></pre>",
                    language, body
                )
            }
        }
        CodeKind::Inline { body } => {
            let body = allowlist.clean(Profile::Strict, &escape_html(body));
            format!("<code class=\"singleline\">{}</code>", body)
        }
    }
}

fn sanitize_language(language: &str, allowlist: &AllowlistConfig) -> String {
    let stripped = strip_quotes(language.trim());
    let cleaned = allowlist.clean(Profile::Strict, &stripped);
    // Entities in the tag can decode back into quotes.
    strip_quotes(&cleaned)
        .trim()
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn strip_quotes(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '"' | '\'')).collect()
}
