//! Node body rendering.
//!
//! Bodies arrive either as pre-rendered markup or as a Pandoc JSON AST.
//! The AST is flattened to plain text, escaped, and wrapped in a `<div>`;
//! pre-rendered markup is wrapped as-is. [`xhtml_namespace`] then prefixes
//! element names so the fragment can be embedded in the target document.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("<(/?)([A-Za-z][A-Za-z0-9]*)").expect("tag name pattern compiles"));

/// Flattens a Pandoc JSON AST node to plain text.
///
/// Inline wrappers dissolve into their children, block elements end in a
/// newline, lists render one `- item` or `1. item` line per entry, and
/// unrecognized nodes flatten whatever content they carry.
#[must_use]
pub fn ast_to_text(node: &Value) -> String {
    match node {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().map(ast_to_text).collect(),
        Value::Object(map) => {
            let content = map.get("c").unwrap_or(&Value::Null);
            match map.get("t").and_then(Value::as_str) {
                Some("Str") => content.as_str().unwrap_or_default().to_string(),
                Some("Space") => " ".to_string(),
                Some("SoftBreak" | "LineBreak") => "\n".to_string(),
                Some("Code") => attributed_text(content).unwrap_or_default(),
                Some(
                    "Emph" | "Strong" | "Span" | "Underline" | "Strikeout" | "SmallCaps"
                    | "Superscript" | "Subscript",
                ) => ast_to_text(content),
                Some("Link" | "Image") => content
                    .as_array()
                    .filter(|parts| parts.len() >= 2)
                    .map(|parts| ast_to_text(&parts[1]))
                    .unwrap_or_default(),
                Some("Para" | "Plain" | "BlockQuote") => ast_to_text(content) + "\n",
                Some("Header") => content
                    .as_array()
                    .filter(|parts| parts.len() == 3)
                    .map(|parts| ast_to_text(&parts[2]) + "\n")
                    .unwrap_or_default(),
                Some("BulletList") => content
                    .as_array()
                    .map(|items| bullet_list(items))
                    .unwrap_or_default(),
                Some("OrderedList") => content
                    .as_array()
                    .filter(|parts| parts.len() == 2)
                    .and_then(|parts| parts[1].as_array())
                    .map(|items| ordered_list(items))
                    .unwrap_or_default(),
                Some("CodeBlock") => attributed_text(content)
                    .map(|text| text + "\n")
                    .unwrap_or_default(),
                Some("Div") => content
                    .as_array()
                    .filter(|parts| parts.len() == 2)
                    .map(|parts| ast_to_text(&parts[1]) + "\n")
                    .unwrap_or_default(),
                // Unknown node, or a whole document object carrying blocks.
                _ => map
                    .get("blocks")
                    .map_or_else(|| ast_to_text(content), ast_to_text),
            }
        }
    }
}

/// Text payload of an `[attr, text]` pair.
fn attributed_text(content: &Value) -> Option<String> {
    let pair = content.as_array().filter(|parts| parts.len() == 2)?;
    Some(pair[1].as_str().unwrap_or_default().to_string())
}

fn bullet_list(items: &[Value]) -> String {
    let lines: Vec<String> = items
        .iter()
        .filter_map(|item| {
            let text = ast_to_text(item);
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| format!("- {trimmed}"))
        })
        .collect();
    lines.join("\n") + "\n"
}

fn ordered_list(items: &[Value]) -> String {
    let lines: Vec<String> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let text = ast_to_text(item);
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| format!("{}. {trimmed}", index + 1))
        })
        .collect();
    lines.join("\n") + "\n"
}

/// Escapes `text` and wraps it in a `<div>`, turning newlines into
/// `<br/>` elements. Empty input yields `<div></div>`.
#[must_use]
pub fn text_to_div(text: &str) -> String {
    let escaped = escape(text)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "<br/>");
    format!("<div>{escaped}</div>")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a node body from its stored representations.
///
/// Pre-rendered markup wins and is embedded untouched inside a `<div>`.
/// Otherwise the AST is parsed and flattened; text that fails to parse as
/// JSON is kept verbatim. A node with neither yields `<div></div>`.
#[must_use]
pub fn body_fragment(content_xhtml: Option<&str>, ast: Option<&str>) -> String {
    if let Some(markup) = content_xhtml.map(str::trim).filter(|s| !s.is_empty()) {
        return format!("<div>{markup}</div>");
    }
    if let Some(raw) = ast.filter(|s| !s.is_empty()) {
        let text = serde_json::from_str::<Value>(raw).map_or_else(
            |_| raw.to_string(),
            |value| ast_to_text(&value).trim().to_string(),
        );
        return text_to_div(&text);
    }
    text_to_div("")
}

/// Prefixes every element name in `fragment` with `xhtml:`.
#[must_use]
pub fn xhtml_namespace(fragment: &str) -> String {
    TAG_NAME.replace_all(fragment, "<${1}xhtml:${2}").into_owned()
}
