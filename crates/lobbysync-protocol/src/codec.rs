//! Field codec: line splitting, text escaping, and blob compression.
//!
//! Three small pieces live here, and every other layer builds on them:
//!
//! 1. **Fields**: a line is a sequence of fields separated by a single
//!    tab. [`split`] and [`join`] are exact inverses as long as no field
//!    contains a tab, which is what the next piece guarantees.
//! 2. **Text**: names, team names and other user text go through
//!    [`encode_text`] before they touch a line. The escaping is the
//!    classic form encoding (`%XX`, space as `+`), so tabs, newlines and
//!    `;` can never leak into field boundaries.
//! 3. **Blobs**: [`compress`] deflates a string and renders it in the
//!    URL-safe base64 alphabet. The result contains no delimiter of any
//!    kind, so it can sit in a line, a `;`-joined list, or a property file.

use std::io::{Read, Write};
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::ProtocolError;

/// Separates the top-level fields of one line.
pub const FIELD_DELIMITER: char = '\t';

/// Separates the fields of a record nested inside one top-level field.
pub const SUBFIELD_DELIMITER: char = ';';

/// Everything except ASCII alphanumerics and `-_.*` gets escaped.
const TEXT_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'*');

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Splits one line into its fields.
///
/// A trailing line terminator is ignored, and trailing empty fields are
/// dropped, so `"a\tb\t\t"` yields `["a", "b"]`. Empty fields in the
/// middle are kept.
///
/// # Errors
/// Returns [`ProtocolError::MalformedMessage`] if the line has no fields
/// at all (empty, or nothing but delimiters).
pub fn split(line: &str) -> Result<Vec<&str>, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    if fields.is_empty() {
        return Err(ProtocolError::MalformedMessage(
            "line has no fields".into(),
        ));
    }
    Ok(fields)
}

/// Joins fields into one line (without a terminator).
pub fn join<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(FIELD_DELIMITER);
        }
        line.push_str(field.as_ref());
    }
    line
}

/// Parses a numeric field, naming it in the error if it fails.
///
/// # Errors
/// Returns [`ProtocolError::InvalidInteger`] if `value` doesn't parse.
pub fn parse_int<T: FromStr>(
    field: &'static str,
    value: &str,
) -> Result<T, ProtocolError> {
    value.parse().map_err(|_| ProtocolError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Escapes arbitrary text so it is safe inside a field or subfield.
pub fn encode_text(s: &str) -> String {
    // `%` itself is always escaped to `%25`, so a literal "%20" in the
    // output can only have come from a space.
    utf8_percent_encode(s, TEXT_ESCAPE_SET)
        .to_string()
        .replace("%20", "+")
}

/// Reverses [`encode_text`].
///
/// Lenient on input it didn't produce: a stray `%` that doesn't start a
/// valid escape is kept as-is, and invalid UTF-8 is replaced with U+FFFD.
pub fn decode_text(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// Blobs
// ---------------------------------------------------------------------------

/// Deflates `s` and renders it as unpadded URL-safe base64.
///
/// # Errors
/// Returns [`ProtocolError::Compression`] if the encoder fails. Writing
/// into memory doesn't fail in practice, but the encoder's API is
/// fallible and we don't paper over it.
pub fn compress(s: &str) -> Result<String, ProtocolError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(s.as_bytes())
        .map_err(|e| ProtocolError::Compression(e.to_string()))?;
    let bytes = encoder
        .finish()
        .map_err(|e| ProtocolError::Compression(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Reverses [`compress`].
///
/// # Errors
/// Returns [`ProtocolError::Compression`] if `s` isn't valid base64, the
/// payload isn't a zlib stream, or the inflated bytes aren't UTF-8.
pub fn decompress(s: &str) -> Result<String, ProtocolError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| ProtocolError::Compression(e.to_string()))?;
    let mut decoder = ZlibDecoder::new(bytes.as_slice());
    let mut out = String::new();
    decoder
        .read_to_string(&mut out)
        .map_err(|e| ProtocolError::Compression(e.to_string()))?;
    Ok(out)
}
