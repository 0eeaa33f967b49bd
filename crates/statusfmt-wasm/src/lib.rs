use serde::Deserialize;
use wasm_bindgen::prelude::*;

use statusfmt_core::{ContentUnit, Formatter, FormatterConfig, Reference};
use statusfmt_renderer::Renderer;

const DEFAULT_DOMAIN: &str = "localhost";

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderOptions {
    local_domain: Option<String>,
    web_domain: Option<String>,
    #[serde(default)]
    references: Vec<Reference>,
}

/// Renders a local status. `references` are both the mentioned accounts and the directory.
#[wasm_bindgen]
pub fn render_status(text: &str, options: JsValue) -> Result<String, JsValue> {
    let options = options_from_js(options)?;
    let references = options.references.clone();
    let formatter = formatter_for(options);
    let unit = ContentUnit::local(text).with_references(references);
    formatter
        .format(&unit)
        .map(|html| html.into_string())
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

#[wasm_bindgen]
pub fn render_note(text: &str, options: JsValue) -> Result<String, JsValue> {
    let formatter = formatter_for(options_from_js(options)?);
    Ok(formatter.format_note(&ContentUnit::local(text)).into_string())
}

#[wasm_bindgen]
pub fn sanitize_remote(html: &str) -> String {
    Formatter::new(FormatterConfig::new(DEFAULT_DOMAIN))
        .reformat(html)
        .into_string()
}

#[wasm_bindgen]
pub fn plaintext(text: &str, remote: bool) -> String {
    let unit = if remote {
        ContentUnit::remote(text)
    } else {
        ContentUnit::local(text)
    };
    Formatter::new(FormatterConfig::new(DEFAULT_DOMAIN)).plaintext(&unit)
}

/// Highlights code and removes empty paragraphs; returns the input on failure.
#[wasm_bindgen]
pub fn finalize_html(html: &str) -> String {
    Renderer::default().finalize(html)
}

fn formatter_for(options: RenderOptions) -> Formatter {
    let mut config =
        FormatterConfig::new(options.local_domain.unwrap_or_else(|| DEFAULT_DOMAIN.to_string()));
    if let Some(web_domain) = options.web_domain {
        config = config.with_web_domain(web_domain);
    }
    config.directory = options.references;
    Formatter::new(config)
}

fn options_from_js(value: JsValue) -> Result<RenderOptions, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(RenderOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}
