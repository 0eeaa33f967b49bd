use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use url::{Host, Position, Url};

use crate::emit::{HtmlWriter, escape_attr, escape_html};
use crate::sanitize::LINK_REL;
use crate::segment::{Layout, Segment, Tagged, char_before};
use crate::span::Span;

/// Characters of the display form shown before the ellipsis.
pub const DISPLAY_LIMIT: usize = 30;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s<>"'`\x{3000}]+"#).expect("url pattern is valid")
});

static DISPLAY_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://(?:www\.)?").expect("display prefix pattern is valid"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlLink {
    normalized: Url,
    display: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayParts<'a> {
    pub prefix: &'a str,
    pub visible: &'a str,
    pub rest: &'a str,
}

impl DisplayParts<'_> {
    pub fn is_truncated(&self) -> bool {
        !self.rest.is_empty()
    }
}

impl UrlLink {
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let normalized = Url::parse(raw)?;
        let display = display_form(&normalized);
        Ok(Self {
            normalized,
            display,
        })
    }

    pub fn href(&self) -> &str {
        self.normalized.as_str()
    }

    /// The normalized URL with its host in Unicode form.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn parts(&self) -> DisplayParts<'_> {
        let prefix_len = DISPLAY_PREFIX_RE
            .find(&self.display)
            .map_or(0, |m| m.end());
        let (prefix, body) = self.display.split_at(prefix_len);
        let cut = body
            .char_indices()
            .nth(DISPLAY_LIMIT)
            .map_or(body.len(), |(index, _)| index);
        let (visible, rest) = body.split_at(cut);
        DisplayParts {
            prefix,
            visible,
            rest,
        }
    }

    pub fn to_html(&self) -> String {
        let parts = self.parts();
        let mut html = format!(
            "<a href=\"{}\" rel=\"{}\" target=\"_blank\"><span class=\"invisible\">{}</span>",
            escape_attr(self.href()),
            LINK_REL,
            escape_html(parts.prefix)
        );
        if parts.is_truncated() {
            html.push_str(&format!(
                "<span class=\"ellipsis\">{}</span><span class=\"invisible\">{}</span>",
                escape_html(parts.visible),
                escape_html(parts.rest)
            ));
        } else {
            html.push_str(&format!("<span>{}</span>", escape_html(parts.visible)));
        }
        html.push_str("</a>");
        html
    }
}

fn display_form(url: &Url) -> String {
    match url.host() {
        Some(Host::Domain(domain)) => {
            let (unicode, result) = idna::domain_to_unicode(domain);
            if result.is_err() {
                return url.as_str().to_string();
            }
            format!(
                "{}{}{}",
                &url[..Position::BeforeHost],
                unicode,
                &url[Position::AfterHost..]
            )
        }
        _ => url.as_str().to_string(),
    }
}

/// Claims every URL inside `gap`. URLs that fail to normalize are claimed as literal text.
pub(crate) fn link_urls(text: &str, gap: Span) -> Vec<Tagged> {
    let mut found = Vec::new();
    for candidate in URL_RE.find_iter(gap.slice(text)) {
        let start = gap.start + candidate.start();
        if !starts_url(char_before(text, start)) {
            continue;
        }
        let raw = trim_trailing(candidate.as_str());
        if !has_host_text(raw) {
            continue;
        }
        let span = Span::at(start, raw.len());
        match UrlLink::parse(raw) {
            Ok(link) => found.push(Tagged::markup(span, link.to_html())),
            Err(err) => {
                debug!("leaving {:?} unlinked: {}", raw, err);
                found.push(Tagged::literal(span));
            }
        }
    }
    found
}

pub fn autolink(text: &str) -> String {
    let mut layout = Layout::new();
    layout.claim_gaps(text, link_urls);
    let mut writer = HtmlWriter::new();
    for segment in layout.segments(text) {
        match segment {
            Segment::Text(text) => writer.text(text),
            Segment::Markup(html) => writer.raw(&html),
            Segment::Shielded(_) => {}
        }
    }
    writer.finish()
}

fn starts_url(before: Option<char>) -> bool {
    match before {
        None => true,
        Some(ch) => !(ch.is_alphanumeric() || matches!(ch, '@' | '$' | '#' | '＠' | '＃')),
    }
}

fn has_host_text(raw: &str) -> bool {
    raw.find("://").is_some_and(|index| raw.len() > index + 3)
}

fn trim_trailing(candidate: &str) -> &str {
    const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];
    let mut opens = [0usize; 3];
    let mut closes = [0usize; 3];
    for ch in candidate.chars() {
        for (index, (open, close)) in PAIRS.iter().enumerate() {
            if ch == *open {
                opens[index] += 1;
            } else if ch == *close {
                closes[index] += 1;
            }
        }
    }

    let mut end = candidate.len();
    while let Some(last) = candidate[..end].chars().next_back() {
        let trim = match PAIRS.iter().position(|(_, close)| *close == last) {
            Some(index) => {
                let unbalanced = opens[index] < closes[index];
                if unbalanced {
                    closes[index] -= 1;
                }
                unbalanced
            }
            None => matches!(last, '.' | ',' | ':' | ';' | '!' | '?' | '*'),
        };
        if !trim {
            break;
        }
        end -= last.len_utf8();
    }
    &candidate[..end]
}
