use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::directory::{Reference, StaticDirectory};
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FormatterConfig {
    pub local_domain: String,
    /// Host of tag pages and the markdown hostname. Defaults to `local_domain`.
    #[serde(default)]
    web_domain: Option<String>,
    #[serde(default)]
    pub directory: Vec<Reference>,
}

impl FormatterConfig {
    pub fn new(local_domain: impl Into<String>) -> Self {
        Self {
            local_domain: local_domain.into(),
            web_domain: None,
            directory: Vec::new(),
        }
    }

    pub fn with_web_domain(mut self, web_domain: impl Into<String>) -> Self {
        self.web_domain = Some(web_domain.into());
        self
    }

    pub fn web_domain(&self) -> &str {
        self.web_domain.as_deref().unwrap_or(&self.local_domain)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn build_directory(&self) -> StaticDirectory {
        StaticDirectory::with_references(self.local_domain.clone(), self.directory.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::FormatterConfig;
    use crate::directory::Directory;
    use crate::error::ConfigError;

    #[test]
    fn web_domain_defaults_to_local_domain() {
        let config = FormatterConfig::from_toml_str("local_domain = \"social.example\"")
            .expect("parses");
        assert_eq!(config.web_domain(), "social.example");
        assert!(config.directory.is_empty());
    }

    #[test]
    fn directory_entries_are_loaded() {
        let config = FormatterConfig::from_toml_str(
            r#"
local_domain = "social.example"
web_domain = "www.social.example"

[[directory]]
username = "alice"
url = "https://social.example/@alice"

[[directory]]
username = "bob"
domain = "remote.example"
url = "https://remote.example/@bob"
"#,
        )
        .expect("parses");
        assert_eq!(config.web_domain(), "www.social.example");
        let directory = config.build_directory();
        assert_eq!(directory.len(), 2);
        assert!(directory.resolve("bob", Some("remote.example")).is_some());
    }

    #[test]
    fn missing_local_domain_is_a_parse_error() {
        let err = FormatterConfig::from_toml_str("web_domain = \"x\"").expect_err("fails");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let err = FormatterConfig::load("/nonexistent/statusfmt.toml").expect_err("fails");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
