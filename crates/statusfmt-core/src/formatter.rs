use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::autolink::link_urls;
use crate::config::FormatterConfig;
use crate::content::{ContentUnit, Origin};
use crate::directory::Directory;
use crate::error::FormatError;
use crate::hashtag::HashtagLinker;
use crate::markdown::{CommonMarkDelegate, MarkdownDelegate, split_markdown_mode};
use crate::mention::{MentionLinker, MentionSource};
use crate::paragraph::{normalize_newlines, wrap_paragraphs};
use crate::plaintext::plaintext;
use crate::sanitize::{AllowlistConfig, Profile};
use crate::segment::Layout;
use crate::shield::{ShieldMark, shield, unshield};

/// HTML that is safe to insert into a page without further escaping.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SafeHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
pub struct Formatter {
    config: FormatterConfig,
    directory: Arc<dyn Directory>,
    markdown: Arc<dyn MarkdownDelegate>,
    allowlist: &'static AllowlistConfig,
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Formatter {
    pub fn new(config: FormatterConfig) -> Self {
        let directory = Arc::new(config.build_directory());
        Self {
            config,
            directory,
            markdown: Arc::new(CommonMarkDelegate::default()),
            allowlist: AllowlistConfig::global(),
        }
    }

    pub fn with_directory(mut self, directory: Arc<dyn Directory>) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_markdown(mut self, markdown: Arc<dyn MarkdownDelegate>) -> Self {
        self.markdown = markdown;
        self
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Renders a status.
    pub fn format(&self, unit: &ContentUnit) -> Result<SafeHtml, FormatError> {
        if unit.origin == Origin::Remote {
            return Ok(self.reformat(&unit.text));
        }
        if let Some(source) = split_markdown_mode(&unit.text) {
            debug!("markdown mode, {} bytes", source.len());
            let html = self.markdown.render(source, self.config.web_domain())?;
            return Ok(SafeHtml(html));
        }

        let text = normalize_newlines(&unit.text);
        let shielded = shield(&text, self.allowlist);
        let html = self.link(
            &shielded.text,
            shielded.layout(),
            &shielded.marks,
            MentionSource::Listed(&unit.references),
        );
        Ok(SafeHtml(html))
    }

    pub fn reformat(&self, html: &str) -> SafeHtml {
        SafeHtml(self.allowlist.clean(Profile::Strict, html))
    }

    pub fn plaintext(&self, unit: &ContentUnit) -> String {
        plaintext(unit, self.allowlist)
    }

    /// Renders a profile note. Mentions resolve through the directory; code is not shielded.
    pub fn format_note(&self, unit: &ContentUnit) -> SafeHtml {
        if unit.origin == Origin::Remote {
            return self.reformat(&unit.text);
        }
        let text = normalize_newlines(&unit.text);
        SafeHtml(self.link(&text, Layout::new(), &[], MentionSource::Directory))
    }

    pub fn sanitize(&self, html: &str, profile: Profile) -> SafeHtml {
        SafeHtml(self.allowlist.clean(profile, html))
    }

    fn link(
        &self,
        text: &str,
        mut layout: Layout,
        marks: &[ShieldMark],
        mentions: MentionSource<'_>,
    ) -> String {
        let urls = layout.claim_gaps(text, link_urls);
        let mentions = MentionLinker::new(self.directory.as_ref(), mentions);
        let mentioned = layout.claim_gaps(text, |text, gap| mentions.scan(text, gap));
        let hashtags = HashtagLinker::new(self.config.web_domain());
        let tagged = layout.claim_gaps(text, |text, gap| hashtags.scan(text, gap));
        debug!(
            "{} url(s), {} mention(s), {} hashtag(s), {} code span(s)",
            urls,
            mentioned,
            tagged,
            marks.len()
        );
        unshield(&wrap_paragraphs(layout.segments(text)), marks)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Formatter;
    use crate::config::FormatterConfig;
    use crate::content::ContentUnit;
    use crate::error::{FormatError, MarkdownError};
    use crate::markdown::MarkdownDelegate;

    struct Unavailable;

    impl MarkdownDelegate for Unavailable {
        fn render(&self, _text: &str, _hostname: &str) -> Result<String, MarkdownError> {
            Err(MarkdownError::Unavailable {
                reason: "offline".to_string(),
            })
        }
    }

    #[test]
    fn formatter_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Formatter>();
    }

    #[test]
    fn markdown_failure_is_surfaced() {
        let formatter =
            Formatter::new(FormatterConfig::new("social.example")).with_markdown(Arc::new(Unavailable));
        let err = formatter
            .format(&ContentUnit::local("!markdown\n# Title"))
            .expect_err("delegate failure propagates");
        assert!(matches!(err, FormatError::Markdown(MarkdownError::Unavailable { .. })));
    }

    #[test]
    fn plain_text_is_encoded_and_wrapped() {
        let formatter = Formatter::new(FormatterConfig::new("social.example"));
        let html = formatter
            .format(&ContentUnit::local("a < b\r\nc"))
            .expect("formats");
        assert_eq!(html.as_str(), "<p>a &lt; b<br />c</p>");
    }
}
