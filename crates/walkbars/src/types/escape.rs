use super::Value;

/// Escapes the characters `& < > " ' ` =` for safe inclusion in HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            _ => out.push(c),
        }
    }
    out
}

/// Coerces a value to a string and HTML-escapes it.
///
/// Safe strings pass through untouched, `null` and `undefined` become the
/// empty string.
pub fn escape_expression(value: &Value) -> String {
    match value {
        Value::SafeString(s) => s.clone(),
        Value::Undefined | Value::Null => String::new(),
        Value::String(s) => escape_html(s),
        other => escape_html(&other.to_string()),
    }
}
