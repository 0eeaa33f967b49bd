use crate::content::{ContentUnit, Origin};
use crate::sanitize::AllowlistConfig;

/// Text of a content unit with no markup: local text as typed, remote HTML with tags stripped.
pub fn plaintext(unit: &ContentUnit, allowlist: &AllowlistConfig) -> String {
    match unit.origin {
        Origin::Local => unit.text.clone(),
        Origin::Remote => allowlist.strip_tags(&unit.text),
    }
}

#[cfg(test)]
mod tests {
    use super::plaintext;
    use crate::content::ContentUnit;
    use crate::sanitize::AllowlistConfig;

    #[test]
    fn local_text_is_returned_verbatim() {
        let unit = ContentUnit::local("<b>hi</b> & `x`");
        assert_eq!(plaintext(&unit, AllowlistConfig::global()), "<b>hi</b> & `x`");
    }

    #[test]
    fn remote_html_loses_its_tags() {
        let unit = ContentUnit::remote("<p>Hello <a href=\"https://x.example/\">world</a></p>");
        assert_eq!(plaintext(&unit, AllowlistConfig::global()), "Hello world");
    }
}
