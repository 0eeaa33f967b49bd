//! Presentation pass over rendered status HTML.
//!
//! Code elements that carry a `data-language` get highlighted and marked with
//! `data-highlighted="true"`; every `<code>` gets the `hljs` class; empty paragraphs are removed.

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::Theme as SyntectTheme;
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use thiserror::Error;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

const HIGHLIGHTED_ATTR: &str = "data-highlighted";
const CODE_CLASS: &str = "hljs";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("malformed html: {0}")]
    Malformed(&'static str),
    #[error("highlighting failed: {0}")]
    Highlight(String),
}

pub(crate) fn finalize_html(html: &str, theme: &SyntectTheme) -> Result<String, RenderError> {
    let highlighted = highlight_code_elements(html, theme)?;
    Ok(remove_empty_paragraphs(&highlighted))
}

fn highlight_code_elements(html: &str, theme: &SyntectTheme) -> Result<String, RenderError> {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    let close_tag = "</code>";

    while let Some(start) = find_open_tag(rest, "code") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let open_end = tail
            .find('>')
            .ok_or(RenderError::Malformed("unterminated <code> tag"))?;
        let open = &tail[..=open_end];
        let close = tail[open_end + 1..]
            .find(close_tag)
            .map(|index| open_end + 1 + index)
            .ok_or(RenderError::Malformed("missing </code>"))?;
        let inner = &tail[open_end + 1..close];

        let open = add_class(open, CODE_CLASS);
        match extract_attr(&open, "data-language") {
            Some(language) if !has_attr(&open, HIGHLIGHTED_ATTR) => {
                out.push_str(&insert_attr(&open, HIGHLIGHTED_ATTR, "true"));
                out.push_str(&highlight_code(&language, inner, theme)?);
            }
            _ => {
                out.push_str(&open);
                out.push_str(inner);
            }
        }
        out.push_str(close_tag);
        rest = &tail[close + close_tag.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

fn highlight_code(language: &str, code_html: &str, theme: &SyntectTheme) -> Result<String, RenderError> {
    let syntax = SYNTAX_SET
        .find_syntax_by_token(language)
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let code = unescape_html(code_html);
    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut out = String::with_capacity(code.len() * 2);
    for line in LinesWithEndings::from(&code) {
        let ranges = highlighter
            .highlight_line(line, &SYNTAX_SET)
            .map_err(|err| RenderError::Highlight(err.to_string()))?;
        let html = styled_line_to_highlighted_html(&ranges, IncludeBackground::No)
            .map_err(|err| RenderError::Highlight(err.to_string()))?;
        out.push_str(&strip_font_weight(&html));
    }
    Ok(out)
}

fn remove_empty_paragraphs(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = find_open_tag(rest, "p") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(open_end) = tail.find('>') else {
            break;
        };
        let after_open = &tail[open_end + 1..];
        match after_open.strip_prefix("</p>") {
            Some(after_close) => rest = after_close,
            None => {
                out.push_str(&tail[..=open_end]);
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Byte offset of the next `<name` that opens exactly that element.
fn find_open_tag(html: &str, name: &str) -> Option<usize> {
    let needle = format!("<{}", name);
    let mut from = 0;
    while let Some(pos) = html[from..].find(&needle) {
        let at = from + pos;
        match html[at + needle.len()..].chars().next() {
            Some(next) if next == '>' || next == '/' || next.is_ascii_whitespace() => return Some(at),
            None => return Some(at),
            Some(_) => from = at + needle.len(),
        }
    }
    None
}

fn extract_attr(tag: &str, name: &str) -> Option<String> {
    let needle = format!(" {}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')?;
    Some(tag[start..start + end].to_string())
}

fn has_attr(tag: &str, name: &str) -> bool {
    let needle = format!(" {}", name);
    tag.match_indices(&needle).any(|(at, _)| {
        matches!(
            tag[at + needle.len()..].chars().next(),
            Some('=' | ' ' | '>' | '/')
        )
    })
}

fn insert_attr(tag: &str, name: &str, value: &str) -> String {
    let end = tag.len() - 1;
    format!("{} {}=\"{}\">", tag[..end].trim_end(), name, value)
}

fn add_class(tag: &str, class: &str) -> String {
    let needle = " class=\"";
    let Some(index) = tag.find(needle) else {
        return insert_attr(tag, "class", class);
    };
    let value_start = index + needle.len();
    let Some(value_len) = tag[value_start..].find('"') else {
        return tag.to_string();
    };
    let value_end = value_start + value_len;
    if tag[value_start..value_end].split_whitespace().any(|name| name == class) {
        return tag.to_string();
    }
    let separator = if value_len == 0 { "" } else { " " };
    format!(
        "{}{}{}{}",
        &tag[..value_end],
        separator,
        class,
        &tag[value_end..]
    )
}

fn unescape_html(text: &str) -> String {
    const ENTITIES: [(&str, char); 6] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&#x27;", '\''),
    ];
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        for (entity, ch) in ENTITIES {
            if let Some(stripped) = tail.strip_prefix(entity) {
                out.push(ch);
                rest = stripped;
                continue 'scan;
            }
        }
        out.push('&');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

fn strip_font_weight(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(pos) = rest.find("font-weight:") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + "font-weight:".len()..];
        match tail.find(';') {
            Some(index) => rest = &tail[index + 1..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::{add_class, has_attr, remove_empty_paragraphs, unescape_html};

    #[test]
    fn empty_paragraphs_are_removed() {
        assert_eq!(
            remove_empty_paragraphs("<p></p><p>a</p><p class=\"x\"></p><pre>b</pre><p> </p>"),
            "<p>a</p><pre>b</pre><p> </p>"
        );
    }

    #[test]
    fn class_is_added_once() {
        assert_eq!(add_class("<code>", "hljs"), "<code class=\"hljs\">");
        assert_eq!(
            add_class("<code class=\"singleline\">", "hljs"),
            "<code class=\"singleline hljs\">"
        );
        assert_eq!(
            add_class("<code class=\"hljs\">", "hljs"),
            "<code class=\"hljs\">"
        );
    }

    #[test]
    fn attribute_presence_needs_a_full_name() {
        assert!(has_attr("<code data-highlighted=\"true\">", "data-highlighted"));
        assert!(!has_attr("<code data-highlighted-not=\"x\">", "data-highlighted"));
    }

    #[test]
    fn entities_are_decoded_once() {
        assert_eq!(unescape_html("a &amp;lt; b &lt; c &#39;d&#39; &x"), "a &lt; b < c 'd' &x");
    }
}
