//! Escaping for the filtergraph mini-language.
//!
//! The filtergraph text goes through two levels of parsing inside ffmpeg: first the graph
//! itself is split into filters (`[`, `]`, `,`, `;` are special), then each filter's option
//! string is split into key/value pairs (`=`, `:` are special). Values therefore get escaped
//! twice: once with [`FILTER_ARG_CHARS`] and once, as part of the assembled
//! `name=params` string, with [`FILTER_SPEC_CHARS`].

use crate::foundation::value::Value;

/// Characters escaped inside a single filter option value or name.
pub const FILTER_ARG_CHARS: &str = "\\'=:";

/// Characters escaped in an assembled `name=params` filter spec.
pub const FILTER_SPEC_CHARS: &str = "\\'[],;";

/// Extra characters escaped in `drawtext` text (the `%` expansion marker).
pub const DRAWTEXT_TEXT_CHARS: &str = "\\'%";

/// Prefix every occurrence of a character from `chars` with a backslash.
///
/// Each input character is visited once, so a backslash in the set never re-escapes the
/// backslashes inserted for other characters.
pub fn escape_chars(text: &str, chars: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if chars.contains(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Stringify `v` and escape it for use as a filter option value.
pub fn escape_value(v: &Value, chars: &str) -> String {
    escape_chars(&v.to_string(), chars)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/escape.rs"]
mod tests;
