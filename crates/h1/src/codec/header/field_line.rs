//! Header field-line grammar (RFC 9112 section 5).
//!
//! ```text
//! field-line   = field-name ":" OWS field-value OWS
//! ```

use bytes::Bytes;
use http::{HeaderName, HeaderValue};

use crate::ensure;
use crate::protocol::ParseError;

#[inline]
fn is_ows(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Parses one header line, CRLF already removed.
///
/// The name is normalized to lower case; the value keeps its bytes with the
/// surrounding optional whitespace trimmed.
pub fn parse_field_line(line: Bytes) -> Result<(HeaderName, HeaderValue), ParseError> {
    ensure!(!line.first().copied().is_some_and(is_ows), ParseError::invalid_header("obsolete line folding is not supported"));

    let colon = line.iter().position(|b| *b == b':').ok_or_else(|| ParseError::invalid_header("missing colon"))?;
    ensure!(colon > 0, ParseError::invalid_header("empty field name"));

    // whitespace before the colon is rejected here too, HeaderName only accepts tchar
    let name = HeaderName::from_bytes(&line[..colon])
        .map_err(|_| ParseError::invalid_header(format!("invalid field name {:?}", String::from_utf8_lossy(&line[..colon]))))?;

    let value = &line[colon + 1..];
    let start = value.iter().position(|b| !is_ows(*b)).unwrap_or(value.len());
    let end = value.iter().rposition(|b| !is_ows(*b)).map_or(start, |i| i + 1);

    let value = HeaderValue::from_maybe_shared(line.slice(colon + 1 + start..colon + 1 + end))
        .map_err(|_| ParseError::invalid_header(format!("invalid value for field {name}")))?;

    Ok((name, value))
}
