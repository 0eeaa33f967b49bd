pub(crate) struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self { out: String::new() }
    }

    /// Author text; every markup-significant character is encoded.
    pub fn text(&mut self, text: &str) {
        push_escaped(&mut self.out, text);
    }

    pub fn raw(&mut self, html: &str) {
        self.out.push_str(html);
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Encodes `& < > " '` so the result is inert both as text and inside a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{HtmlWriter, escape_attr, escape_html};

    #[test]
    fn text_is_encoded_and_markup_is_not() {
        let mut writer = HtmlWriter::new();
        writer.raw("<p>");
        writer.text("a < b & 'c'");
        writer.raw("</p>");
        assert_eq!(writer.finish(), "<p>a &lt; b &amp; &#39;c&#39;</p>");
    }

    #[test]
    fn attribute_escaping_keeps_apostrophes() {
        assert_eq!(escape_attr("a\"b'c"), "a&quot;b'c");
        assert_eq!(escape_html("a\"b"), "a&quot;b");
    }
}
