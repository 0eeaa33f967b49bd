use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};
use once_cell::sync::Lazy;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};

mod finalize;

pub use finalize::RenderError;

const BASE_CSS: &str = include_str!("../assets/statusfmt.css");

static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Auto,
    Light,
    Dark,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    custom_vars: BTreeMap<String, String>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Theme::Auto)
    }
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            custom_vars: BTreeMap::new(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_vars.insert(key.into(), value.into());
        self
    }

    /// Highlights language-tagged code and drops empty paragraphs.
    ///
    /// Never fails: if anything goes wrong the input is returned unchanged.
    pub fn finalize(&self, html: &str) -> String {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.try_finalize(html)));
        match result {
            Ok(Ok(out)) => out,
            Ok(Err(err)) => {
                warn!("leaving html unprocessed: {}", err);
                html.to_string()
            }
            Err(_) => {
                warn!("leaving html unprocessed: post-processor panicked");
                html.to_string()
            }
        }
    }

    /// Like [`Renderer::finalize`], but reports what went wrong.
    pub fn try_finalize(&self, html: &str) -> Result<String, RenderError> {
        let theme = pick_theme(self.theme, &THEME_SET)
            .ok_or_else(|| RenderError::Highlight("no syntax theme available".to_string()))?;
        let out = finalize::finalize_html(html, theme)?;
        debug!("finalized {} bytes into {}", html.len(), out.len());
        Ok(out)
    }

    pub fn stylesheet(&self) -> String {
        let mut out = String::new();
        let (light_vars, dark_vars) = default_theme_vars();

        match self.theme {
            Theme::Auto => {
                out.push_str(&root_block(&light_vars, true));
                out.push_str("@media (prefers-color-scheme: dark) {\n");
                out.push_str(&indent_root_block(&dark_vars));
                out.push_str("}\n");
            }
            Theme::Light => {
                out.push_str(&root_block(&light_vars, true));
            }
            Theme::Dark => {
                out.push_str(&root_block(&dark_vars, true));
            }
        }

        if !self.custom_vars.is_empty() {
            out.push_str(&root_block(&self.custom_vars, false));
        }

        out.push_str(BASE_CSS);
        out
    }

    /// Wraps a status fragment in a standalone preview page.
    pub fn embed_html(&self, html: &str, with_inline_css: bool) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html lang=\"en\">\n");
        out.push_str("<head>\n");
        out.push_str("  <meta charset=\"utf-8\" />\n");
        out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
        if with_inline_css {
            out.push_str("  <style>\n");
            out.push_str(&self.stylesheet());
            out.push_str("\n  </style>\n");
        }
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        out.push_str("<div class=\"status__content\">\n");
        out.push_str(html);
        if !html.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("</div>\n");
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }
}

fn default_theme_vars() -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let light = BTreeMap::from([
        ("--statusfmt-bg".to_string(), "#ffffff".to_string()),
        ("--statusfmt-fg".to_string(), "#282c37".to_string()),
        ("--statusfmt-link".to_string(), "#3a3bc7".to_string()),
        ("--statusfmt-mention".to_string(), "#2b90d9".to_string()),
        ("--statusfmt-code-bg".to_string(), "#eff1f5".to_string()),
        ("--statusfmt-code-fg".to_string(), "#282c37".to_string()),
    ]);

    let dark = BTreeMap::from([
        ("--statusfmt-bg".to_string(), "#282c37".to_string()),
        ("--statusfmt-fg".to_string(), "#d9e1e8".to_string()),
        ("--statusfmt-link".to_string(), "#8c8dff".to_string()),
        ("--statusfmt-mention".to_string(), "#d9e1e8".to_string()),
        ("--statusfmt-code-bg".to_string(), "#1f232b".to_string()),
        ("--statusfmt-code-fg".to_string(), "#d9e1e8".to_string()),
    ]);

    (light, dark)
}

fn format_vars(vars: &BTreeMap<String, String>, indent: &str) -> String {
    let mut out = String::new();
    for (key, value) in vars {
        out.push_str(indent);
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out
}

fn root_block(vars: &BTreeMap<String, String>, include_color_scheme: bool) -> String {
    let mut out = String::new();
    out.push_str(":root {\n");
    if include_color_scheme {
        out.push_str("  color-scheme: light dark;\n");
    }
    out.push_str(&format_vars(vars, "  "));
    out.push_str("}\n");
    out
}

fn indent_root_block(vars: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    out.push_str("  :root {\n");
    out.push_str("    color-scheme: light dark;\n");
    out.push_str(&format_vars(vars, "    "));
    out.push_str("  }\n");
    out
}

fn pick_theme(theme: Theme, theme_set: &ThemeSet) -> Option<&SyntectTheme> {
    let candidates = match theme {
        Theme::Dark => ["base16-ocean.dark", "base16-eighties.dark", "base16-mocha.dark"],
        Theme::Light | Theme::Auto => ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"],
    };
    candidates
        .iter()
        .find_map(|name| theme_set.themes.get(*name))
        .or_else(|| theme_set.themes.values().next())
}
