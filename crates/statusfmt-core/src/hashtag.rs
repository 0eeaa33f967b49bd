use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

use crate::emit::{escape_attr, escape_html};
use crate::segment::{Tagged, char_before};
use crate::span::Span;

static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#(\w*[\p{Alphabetic}_]\w*)").expect("hashtag pattern is valid")
});

const TAG_SLUG: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub(crate) struct HashtagLinker<'a> {
    web_domain: &'a str,
}

impl<'a> HashtagLinker<'a> {
    pub fn new(web_domain: &'a str) -> Self {
        Self { web_domain }
    }

    pub fn scan(&self, text: &str, gap: Span) -> Vec<Tagged> {
        let mut found = Vec::new();
        for caps in HASHTAG_RE.captures_iter(gap.slice(text)) {
            let Some(whole) = caps.get(0) else { continue };
            let start = gap.start + whole.start();
            if !starts_hashtag(char_before(text, start)) {
                continue;
            }
            let name = caps.get(1).map_or("", |m| m.as_str());
            found.push(Tagged::markup(
                Span::at(start, whole.len()),
                format!(
                    "<a href=\"{}\" class=\"mention hashtag\">#<span>{}</span></a>",
                    escape_attr(&self.tag_url(name)),
                    escape_html(name)
                ),
            ));
        }
        found
    }

    /// Absolute URL of the tag page; the slug is the lowercased name.
    pub fn tag_url(&self, name: &str) -> String {
        let slug = name.to_lowercase();
        format!(
            "https://{}/tags/{}",
            self.web_domain,
            utf8_percent_encode(&slug, TAG_SLUG)
        )
    }
}

fn starts_hashtag(before: Option<char>) -> bool {
    match before {
        None => true,
        Some(ch) => !(matches!(ch, '/' | ')' | '_') || ch.is_alphanumeric()),
    }
}
