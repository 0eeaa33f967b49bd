use comrak::{Options, markdown_to_html};
use log::debug;

use crate::error::MarkdownError;
use crate::sanitize::{AllowlistConfig, Profile};

/// First line that switches a local status to markdown.
pub const MARKDOWN_SENTINEL: &str = "!markdown";

/// Renders markdown to final HTML. The returned markup is trusted as-is.
pub trait MarkdownDelegate: Send + Sync {
    fn render(&self, text: &str, hostname: &str) -> Result<String, MarkdownError>;
}

/// Returns the text after the sentinel line when `text` starts with it.
pub fn split_markdown_mode(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(MARKDOWN_SENTINEL)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

/// CommonMark with the GitHub extensions, cleaned with the fragment profile.
pub struct CommonMarkDelegate {
    allowlist: &'static AllowlistConfig,
}

impl CommonMarkDelegate {
    pub fn new(allowlist: &'static AllowlistConfig) -> Self {
        Self { allowlist }
    }
}

impl Default for CommonMarkDelegate {
    fn default() -> Self {
        Self::new(AllowlistConfig::global())
    }
}

impl MarkdownDelegate for CommonMarkDelegate {
    fn render(&self, text: &str, hostname: &str) -> Result<String, MarkdownError> {
        if hostname.is_empty() || hostname.contains(['/', '"', '<', '>', ' ']) {
            return Err(MarkdownError::Rejected {
                reason: format!("invalid hostname {:?}", hostname),
            });
        }
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        let html = markdown_to_html(text, &options);
        let absolute = format!("https://{}/", hostname);
        let html = html
            .replace("href=\"/", &format!("href=\"{}", absolute))
            .replace("src=\"/", &format!("src=\"{}", absolute));
        debug!("markdown delegate produced {} bytes", html.len());
        Ok(self.allowlist.clean(Profile::Fragment, &html))
    }
}
