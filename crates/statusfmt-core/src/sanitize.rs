use std::collections::{HashMap, HashSet};

use ammonia::{Builder, UrlRelative};
use once_cell::sync::Lazy;

/// `rel` forced onto every anchor that survives sanitization.
pub const LINK_REL: &str = "nofollow noopener noreferrer";

static ALLOWLIST: Lazy<AllowlistConfig> = Lazy::new(AllowlistConfig::build);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Profile {
    Strict,
    Fragment,
}

pub struct AllowlistConfig {
    strict: Builder<'static>,
    fragment: Builder<'static>,
    text_only: Builder<'static>,
}

impl AllowlistConfig {
    pub fn global() -> &'static AllowlistConfig {
        &ALLOWLIST
    }

    pub fn clean(&self, profile: Profile, html: &str) -> String {
        let builder = match profile {
            Profile::Strict => &self.strict,
            Profile::Fragment => &self.fragment,
        };
        builder.clean(html).to_string()
    }

    /// Removes every tag, keeping text content. Text stays entity-encoded.
    pub fn strip_tags(&self, html: &str) -> String {
        self.text_only.clean(html).to_string()
    }

    fn build() -> Self {
        Self {
            strict: strict_builder(),
            fragment: fragment_builder(),
            text_only: text_only_builder(),
        }
    }
}

fn strict_builder() -> Builder<'static> {
    let tags: HashSet<&'static str> = ["a", "br", "code", "p", "pre", "span"]
        .iter()
        .copied()
        .collect();

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href"].iter().copied().collect());
    tag_attributes.insert("code", ["data-language"].iter().copied().collect());

    // Only the vocabulary the local pipeline itself emits.
    let mut allowed_classes = HashMap::new();
    allowed_classes.insert(
        "span",
        ["h-card", "invisible", "ellipsis"]
            .iter()
            .copied()
            .collect(),
    );
    allowed_classes.insert(
        "a",
        ["u-url", "mention", "hashtag"].iter().copied().collect(),
    );
    allowed_classes.insert("code", ["singleline"].iter().copied().collect());

    let mut builder = Builder::empty();
    builder
        .tags(tags)
        .tag_attributes(tag_attributes)
        .allowed_classes(allowed_classes)
        .url_schemes(["http", "https"].iter().copied().collect())
        .url_relative(UrlRelative::Deny)
        .link_rel(Some(LINK_REL))
        .set_tag_attribute_value("a", "target", "_blank")
        .clean_content_tags(["script", "style"].iter().copied().collect())
        .strip_comments(true);
    builder
}

fn fragment_builder() -> Builder<'static> {
    let tags: HashSet<&'static str> = [
        "a",
        "abbr",
        "b",
        "blockquote",
        "br",
        "code",
        "dd",
        "del",
        "details",
        "div",
        "dl",
        "dt",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "kbd",
        "li",
        "ol",
        "p",
        "pre",
        "s",
        "span",
        "strong",
        "sub",
        "summary",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
    ]
    .iter()
    .copied()
    .collect();

    let mut generic_attributes: HashSet<&'static str> = HashSet::new();
    generic_attributes.insert("class");
    generic_attributes.insert("id");

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href", "title"].iter().copied().collect());
    tag_attributes.insert("abbr", ["title"].iter().copied().collect());
    tag_attributes.insert("img", ["alt", "src", "title"].iter().copied().collect());
    tag_attributes.insert("ol", ["start"].iter().copied().collect());
    tag_attributes.insert("th", ["align"].iter().copied().collect());
    tag_attributes.insert("td", ["align"].iter().copied().collect());

    let mut generic_attribute_prefixes = HashSet::new();
    generic_attribute_prefixes.insert("data-");

    let mut builder = Builder::default();
    builder
        .tags(tags)
        .generic_attributes(generic_attributes)
        .tag_attributes(tag_attributes)
        .generic_attribute_prefixes(generic_attribute_prefixes)
        .url_schemes(["http", "https", "mailto"].iter().copied().collect())
        .link_rel(Some(LINK_REL));
    builder
}

fn text_only_builder() -> Builder<'static> {
    let mut builder = Builder::empty();
    builder
        .clean_content_tags(["script", "style"].iter().copied().collect())
        .strip_comments(true);
    builder
}
