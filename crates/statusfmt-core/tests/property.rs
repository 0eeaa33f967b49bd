use proptest::prelude::*;

use statusfmt_core::{ContentUnit, Formatter, FormatterConfig, Reference};

fn formatter() -> Formatter {
    let mut config = FormatterConfig::new("social.example");
    config.directory = vec![Reference::new(
        "alice",
        None,
        "https://social.example/@alice",
    )];
    Formatter::new(config)
}

fn unit(text: &str) -> ContentUnit {
    ContentUnit::local(text).with_references(vec![Reference::new(
        "alice",
        None,
        "https://social.example/@alice",
    )])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn formatting_never_fails_and_is_idempotent(text in "[a-zA-Z0-9 \n\t#@`:/.<>&\"'()\\[\\]_-]{0,200}") {
        let formatter = formatter();
        let first = formatter.format(&unit(&text));
        prop_assert!(first.is_ok());
        let second = formatter.format(&unit(&text));
        prop_assert_eq!(first.ok(), second.ok());
    }

    #[test]
    fn notes_never_panic(text in "\\PC{0,120}") {
        let html = formatter().format_note(&ContentUnit::local(text));
        prop_assert!(html.as_str().starts_with("<p>"));
    }

    #[test]
    fn inline_code_is_restored_verbatim(body in "[a-z@#/:. ]{1,20}") {
        let html = formatter()
            .format(&unit(&format!("`{}`", body)))
            .map(|html| html.into_string());
        prop_assert_eq!(
            html.ok(),
            Some(format!("<p><code class=\"singleline\">{}</code></p>", body))
        );
    }

    #[test]
    fn author_markup_is_always_encoded(text in "[a-z <>&]{0,80}") {
        let html = formatter()
            .format(&unit(&text))
            .map(|html| html.into_string())
            .unwrap_or_default();
        let inner = html
            .strip_prefix("<p>")
            .and_then(|rest| rest.strip_suffix("</p>"))
            .unwrap_or_default();
        prop_assert!(!inner.contains('<'));
        prop_assert!(!inner.contains('>'));
    }
}
