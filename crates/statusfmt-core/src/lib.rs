mod autolink;
mod config;
mod content;
mod directory;
mod emit;
mod error;
mod formatter;
mod hashtag;
mod markdown;
mod mention;
mod paragraph;
mod plaintext;
mod sanitize;
mod segment;
mod shield;
mod span;

pub use autolink::{DISPLAY_LIMIT, DisplayParts, UrlLink, autolink};
pub use config::FormatterConfig;
pub use content::{ContentUnit, Origin};
pub use directory::{Directory, Reference, StaticDirectory};
pub use emit::escape_html;
pub use error::{ConfigError, FormatError, MarkdownError};
pub use formatter::{Formatter, SafeHtml};
pub use markdown::{CommonMarkDelegate, MARKDOWN_SENTINEL, MarkdownDelegate, split_markdown_mode};
pub use paragraph::normalize_newlines;
pub use plaintext::plaintext;
pub use sanitize::{AllowlistConfig, LINK_REL, Profile};
pub use segment::Segment;
pub use shield::{ShieldMark, Shielded, shield, unshield};
pub use span::Span;
