use once_cell::sync::Lazy;
use regex::Regex;

use crate::directory::{Directory, Reference};
use crate::emit::{escape_attr, escape_html};
use crate::segment::{Tagged, char_before};
use crate::span::Span;

static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)@([a-z0-9_]+)(?:@([a-z0-9\.\-]+[a-z0-9]+))?")
        .expect("mention pattern is valid")
});

/// Where mention targets come from.
#[derive(Clone, Copy, Debug)]
pub(crate) enum MentionSource<'a> {
    /// Only the references attached to the content unit.
    Listed(&'a [Reference]),
    /// Any account the directory can resolve.
    Directory,
}

pub(crate) struct MentionLinker<'a> {
    directory: &'a dyn Directory,
    source: MentionSource<'a>,
}

impl<'a> MentionLinker<'a> {
    pub fn new(directory: &'a dyn Directory, source: MentionSource<'a>) -> Self {
        Self { directory, source }
    }

    pub fn scan(&self, text: &str, gap: Span) -> Vec<Tagged> {
        let mut found = Vec::new();
        for caps in MENTION_RE.captures_iter(gap.slice(text)) {
            let Some(whole) = caps.get(0) else { continue };
            let start = gap.start + whole.start();
            if !starts_mention(char_before(text, start)) {
                continue;
            }
            let username = caps.get(1).map_or("", |m| m.as_str());
            let domain = caps.get(2).map(|m| m.as_str());
            if let Some(reference) = self.lookup(username, domain) {
                found.push(Tagged::markup(
                    Span::at(start, whole.len()),
                    self.markup(username, domain, &reference),
                ));
            }
        }
        found
    }

    fn lookup(&self, username: &str, domain: Option<&str>) -> Option<Reference> {
        match self.source {
            MentionSource::Listed(references) => {
                let typed = match domain {
                    Some(domain) => format!("{}@{}", username, domain),
                    None => username.to_string(),
                };
                references
                    .iter()
                    .find(|reference| self.directory.same_handle(&reference.acct(), &typed))
                    .cloned()
            }
            MentionSource::Directory => {
                let domain = domain.filter(|domain| !self.directory.is_local_domain(domain));
                self.directory.resolve(username, domain)
            }
        }
    }

    fn markup(&self, username: &str, domain: Option<&str>, reference: &Reference) -> String {
        let suffix = domain
            .filter(|domain| !self.directory.is_local_domain(domain))
            .map(|domain| format!("@{}", escape_html(domain)))
            .unwrap_or_default();
        format!(
            "<span class=\"h-card\"><a href=\"{}\" class=\"u-url mention\">@<span>{}</span>{}</a></span>",
            escape_attr(&reference.url),
            escape_html(username),
            suffix
        )
    }
}

fn starts_mention(before: Option<char>) -> bool {
    match before {
        None => true,
        Some(ch) => !(ch == '/' || ch == '_' || ch.is_alphanumeric()),
    }
}
