//! HTML escaping for values that end up interpolated into markup.
//!
//! The escape set covers `& < > " ' / ` =`, which is enough to keep a value
//! inert inside element content and quoted or unquoted attributes.
//!
//! Escaping is **not** idempotent: `&` is itself escaped, so sanitizing an
//! already-sanitized string double-escapes it. Sanitize each raw value exactly
//! once, at the point where it leaves validation.

use std::borrow::Cow;

/// Entity for a character that needs escaping, if any.
fn entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#039;"),
        '/' => Some("&#x2F;"),
        '`' => Some("&#x60;"),
        '=' => Some("&#x3D;"),
        _ => None,
    }
}

/// Escape HTML-significant characters in `input`.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping.
///
/// # Example
/// ```
/// use form_gatekeeper::sanitize;
///
/// assert_eq!(sanitize("<script>"), "&lt;script&gt;");
/// assert_eq!(sanitize("plain text"), "plain text");
/// ```
pub fn sanitize(input: &str) -> Cow<'_, str> {
    let Some(first) = input.find(|c| entity(c).is_some()) else {
        return Cow::Borrowed(input);
    };

    let mut out = String::with_capacity(input.len() + 16);
    out.push_str(&input[..first]);
    for c in input[first..].chars() {
        match entity(c) {
            Some(escaped) => out.push_str(escaped),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape an optional value; a missing value yields an empty string.
pub fn sanitize_opt(input: Option<&str>) -> String {
    input.map(|s| sanitize(s).into_owned()).unwrap_or_default()
}
