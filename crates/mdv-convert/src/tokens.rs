//! Scoped template tokens.
//!
//! A token has the exact form `{{ <scope>.<name> }}`: two opening braces, one
//! space, a scope keyword, a dot, an identifier of ASCII letters, digits,
//! `_` or `-`, one space and two closing braces. Anything else is plain text.

use std::fmt::Write;

use crate::front_matter::FrontMatterAttributes;

/// Scope keywords tokens may refer to.
pub const SCOPES: &[&str] = &["post"];

const OPEN: &str = "{{ ";
const CLOSE: &str = " }}";

/// A token found by [`scan_tokens`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub scope: &'a str,
    pub name: &'a str,
    /// Byte range of the whole token in the scanned text.
    pub start: usize,
    pub end: usize,
}

/// Whether `name` is a valid token identifier.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Render the token text for `scope` and `name`.
#[must_use]
pub fn token(scope: &str, name: &str) -> String {
    format!("{OPEN}{scope}.{name}{CLOSE}")
}

/// Iterate over every token with a known scope, left to right.
pub fn scan_tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while let Some(found) = text[pos..].find(OPEN) {
            let start = pos + found;
            pos = start + 1;
            if let Some(token) = parse_token(text, start) {
                pos = token.end;
                return Some(token);
            }
        }
        pos = text.len();
        None
    })
}

/// Parse a token starting exactly at `start`.
fn parse_token(text: &str, start: usize) -> Option<Token<'_>> {
    let body_start = start + OPEN.len();
    let rest = &text[body_start..];
    let scope = SCOPES
        .iter()
        .find(|scope| rest.starts_with(*scope) && rest[scope.len()..].starts_with('.'))?;

    let name_start = body_start + scope.len() + 1;
    let name_len = text[name_start..]
        .bytes()
        .take_while(|&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        .count();
    if name_len == 0 {
        return None;
    }

    let name_end = name_start + name_len;
    if !text[name_end..].starts_with(CLOSE) {
        return None;
    }

    Some(Token {
        scope: &text[body_start..body_start + scope.len()],
        name: &text[name_start..name_end],
        start,
        end: name_end + CLOSE.len(),
    })
}

/// Whether `text` contains at least one scoped token.
#[must_use]
pub fn contains_scoped_token(text: &str) -> bool {
    scan_tokens(text).next().is_some()
}

/// Replace every token whose attribute is known with its rendered values.
///
/// Tokens naming unknown attributes are left as written. Rendered values
/// never contain token syntax, so the result is stable under repetition.
#[must_use]
pub fn substitute_tokens(text: &str, attributes: &FrontMatterAttributes) -> String {
    if attributes.is_empty() {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in scan_tokens(text) {
        let Some(values) = attributes.get(token.name) else {
            continue;
        };
        out.push_str(&text[last..token.start]);
        out.push_str(&render_attribute(token.scope, token.name, values));
        last = token.end;
    }
    out.push_str(&text[last..]);
    out
}

/// Render all values of one attribute as item spans joined by delimiters.
#[must_use]
pub fn render_attribute(scope: &str, name: &str, values: &[String]) -> String {
    let normalized;
    let values = if name == "tags" && values.len() == 1 {
        normalized = split_tag_list(&values[0]);
        normalized.as_slice()
    } else {
        values
    };

    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(
                out,
                "<span class='{scope}-delimiter-{name} delimiter'></span>"
            )
            .unwrap();
        }
        write!(
            out,
            "<span class='{scope}-item-{name}'>{}</span>",
            render_value(value)
        )
        .unwrap();
    }
    out
}

/// Split a single `[a, b, a]` tag string into distinct tags.
fn split_tag_list(raw: &str) -> Vec<String> {
    let inner = raw.strip_prefix('[').unwrap_or(raw);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    let mut tags: Vec<String> = Vec::new();
    for tag in inner.split(',').map(str::trim_start) {
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_owned());
        }
    }
    tags
}

/// Render one value: unquote, escape, typographic dashes, trim.
fn render_value(value: &str) -> String {
    let escaped = escape_value(strip_quotes(value));
    convert_dashes(&escaped).trim().to_owned()
}

/// Strip one layer of matching surrounding quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(quote)
                .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// HTML-escape a value and neutralize braces and line breaks.
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '\r' => {}
            '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Replace runs of exactly three dashes with an em dash and exactly two with
/// an en dash. Longer runs stay as they are.
fn convert_dashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('-') {
        out.push_str(&rest[..start]);
        let run = rest[start..].bytes().take_while(|&b| b == b'-').count();
        match run {
            3 => out.push_str("&mdash;"),
            2 => out.push_str("&ndash;"),
            _ => out.push_str(&rest[start..start + run]),
        }
        rest = &rest[start + run..];
    }
    out.push_str(rest);
    out
}
