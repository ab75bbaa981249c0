//! Flat key-value property storage.
//!
//! Personal bests persist into whatever key-value store the host
//! application already has for its settings. The store only needs two
//! operations, captured by [`PropertyStore`]. [`Properties`] is the
//! in-memory implementation, with load/save in the familiar
//! `key=value` text format.
//!
//! Keys embed player names, so the text form escapes the way Java
//! properties files do: `\\`, `\=`, `\:`, `\ `, `\n`, `\r`, `\t`, `\f`,
//! and `\#` / `\!` where they would start a comment.

use std::collections::BTreeMap;
use std::fmt;

/// A string-to-string property store.
pub trait PropertyStore {
    /// Returns the value stored under `key`, if any.
    fn property(&self, key: &str) -> Option<&str>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_property(&mut self, key: &str, value: String);

    /// Every key starting with `prefix`.
    fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a>;

    /// Reads an integer, falling back to `default` if the key is
    /// missing or its value doesn't parse.
    fn int_property(&self, key: &str, default: i32) -> i32 {
        self.property(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

/// In-memory [`PropertyStore`], ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `key=value` text.
    ///
    /// Blank lines and lines starting with `#` or `!` are skipped. The
    /// key ends at the first unescaped `=`, `:` or whitespace; whitespace
    /// around the separator is skipped. A line with no separator is a key
    /// with an empty value. Escapes are undone in keys and values.
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim_start_matches(is_blank);
            if line.is_empty() || line.starts_with(['#', '!']) {
                continue;
            }
            let (key, value) = split_entry(line);
            entries.insert(unescape(key), unescape(value));
        }
        Self { entries }
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl PropertyStore for Properties {
    fn property(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn set_property(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        Box::new(
            self.entries
                .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
                .map(|(k, _)| k.as_str())
                .take_while(move |k| k.starts_with(prefix)),
        )
    }
}

/// Renders the `key=value` text that [`Properties::parse`] reads.
impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{}={}", escape(key, true), escape(value, false))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Splits a line at its first unescaped separator. Both halves are
/// still escaped.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..i], line[i + 1..].trim_start_matches(is_blank)),
            c if is_blank(c) => {
                let rest = line[i..].trim_start_matches(is_blank);
                let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
                return (&line[..i], rest.trim_start_matches(is_blank));
            }
            _ => {}
        }
    }
    (line, "")
}

/// Escapes a key (every blank and separator) or a value (a leading blank
/// only).
fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0c' => out.push_str("\\f"),
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
