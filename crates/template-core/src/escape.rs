//! Output escaping transforms.
use std::borrow::Cow;

/// Which escaping transform `Output` instructions apply when their escape flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeMode {
    #[default]
    Html,
    None,
}

impl EscapeMode {
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            EscapeMode::Html => escape_html(text),
            EscapeMode::None => Cow::Borrowed(text),
        }
    }
}

/// Escapes the five HTML-significant characters. Borrows when nothing needs escaping.
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
