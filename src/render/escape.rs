//! Escaping of text embedded into generated pages.

use serde::Serialize;
use std::borrow::Cow;

/// Escapes `&`, `<`, `>`, `"` and `'` for use in HTML text and attribute
/// values.
///
/// # Example
/// ```
/// use rowtree::render::escape_html;
///
/// assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
/// assert_eq!(escape_html("plain"), "plain");
/// ```
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Serializes `value` to JSON that can be placed verbatim inside a
/// `<script>` element.
///
/// `</` is written as `<\/` so no string in the data can close the element,
/// and the line separators U+2028 and U+2029 are written as escapes.
///
/// # Errors
/// Whatever [serde_json::to_string] reports for `value`.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(json
        .replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}
