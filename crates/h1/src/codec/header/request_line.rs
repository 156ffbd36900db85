//! Request-line grammar (RFC 9112 section 3).
//!
//! ```text
//! request-line   = method SP request-target SP HTTP-version
//! ```
//!
//! The request-target is accepted in origin-form, absolute-form and (for
//! `OPTIONS` only) asterisk-form. Authority-form is rejected.

use bytes::Bytes;
use http::{Method, Uri, Version};

use crate::ensure;
use crate::protocol::{ParseError, TargetForm};

/// A parsed request line.
#[derive(Debug, Clone)]
pub struct RequestLine {
    pub method: Method,
    pub target: Uri,
    pub form: TargetForm,
    pub version: Version,
}

/// Returns true for `tchar` as defined by RFC 9110 section 5.6.2.
#[inline]
pub(crate) fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Parses one request line, CRLF already removed.
pub fn parse_request_line(line: Bytes) -> Result<RequestLine, ParseError> {
    let first_sp = line.iter().position(|b| *b == b' ').ok_or_else(|| ParseError::invalid_request_line("missing request target"))?;
    let last_sp = line.iter().rposition(|b| *b == b' ').unwrap_or(first_sp);
    ensure!(first_sp < last_sp, ParseError::invalid_request_line("missing http version"));

    let method = parse_method(&line[..first_sp])?;
    let version = parse_version(&line[last_sp + 1..])?;
    let (target, form) = parse_target(&method, line.slice(first_sp + 1..last_sp))?;

    Ok(RequestLine { method, target, form, version })
}

fn parse_method(bytes: &[u8]) -> Result<Method, ParseError> {
    ensure!(!bytes.is_empty() && bytes.iter().copied().all(is_tchar), ParseError::InvalidMethod);
    Method::from_bytes(bytes).map_err(|_| ParseError::InvalidMethod)
}

fn parse_version(bytes: &[u8]) -> Result<Version, ParseError> {
    match bytes {
        b"HTTP/1.1" => Ok(Version::HTTP_11),
        b"HTTP/1.0" => Ok(Version::HTTP_10),
        // HTTP/2 and HTTP/3 never arrive as a text request line
        _ => Err(ParseError::invalid_version(bytes)),
    }
}

fn parse_target(method: &Method, target: Bytes) -> Result<(Uri, TargetForm), ParseError> {
    ensure!(!target.is_empty(), ParseError::invalid_target("empty request target"));

    if &target[..] == b"*" {
        ensure!(*method == Method::OPTIONS, ParseError::unsupported_target("asterisk-form is only allowed for OPTIONS"));
        return Ok((Uri::from_static("*"), TargetForm::Asterisk));
    }

    if target[0] == b'/' {
        let uri = Uri::from_maybe_shared(target).map_err(ParseError::invalid_target)?;
        return Ok((uri, TargetForm::Origin));
    }

    if target.windows(3).any(|w| w == b"://") {
        let uri = Uri::from_maybe_shared(target).map_err(ParseError::invalid_target)?;
        ensure!(
            uri.scheme().is_some() && uri.authority().is_some(),
            ParseError::invalid_target("absolute-form requires a scheme and an authority")
        );
        return Ok((uri, TargetForm::Absolute));
    }

    Err(ParseError::unsupported_target("authority-form is not supported"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &'static str) -> Result<RequestLine, ParseError> {
        parse_request_line(Bytes::from_static(line.as_bytes()))
    }

    #[test]
    fn origin_form() {
        let line = parse("GET /index/?a=1&b=2 HTTP/1.1").unwrap();

        assert_eq!(line.method, Method::GET);
        assert_eq!(line.form, TargetForm::Origin);
        assert_eq!(line.target.path(), "/index/");
        assert_eq!(line.target.query(), Some("a=1&b=2"));
        assert_eq!(line.version, Version::HTTP_11);
    }

    #[test]
    fn absolute_form() {
        let line = parse("POST http://example.com:8080/upload HTTP/1.0").unwrap();

        assert_eq!(line.method, Method::POST);
        assert_eq!(line.form, TargetForm::Absolute);
        assert_eq!(line.target.host(), Some("example.com"));
        assert_eq!(line.target.port_u16(), Some(8080));
        assert_eq!(line.target.path(), "/upload");
        assert_eq!(line.version, Version::HTTP_10);
    }

    #[test]
    fn asterisk_form() {
        let line = parse("OPTIONS * HTTP/1.1").unwrap();
        assert_eq!(line.form, TargetForm::Asterisk);
        assert_eq!(line.target, "*");

        assert!(matches!(parse("GET * HTTP/1.1"), Err(ParseError::UnsupportedTarget { .. })));
    }

    #[test]
    fn authority_form_is_rejected() {
        let err = parse("CONNECT example.com:443 HTTP/1.1").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedTarget { .. }));
        assert_eq!(err.status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn extension_method() {
        let line = parse("PURGE /cache HTTP/1.1").unwrap();
        assert_eq!(line.method.as_str(), "PURGE");
    }

    #[test]
    fn invalid_version() {
        assert!(matches!(parse("GET / HTTP/2.0"), Err(ParseError::InvalidVersion { .. })));
        assert!(matches!(parse("GET / http/1.1"), Err(ParseError::InvalidVersion { .. })));
        assert!(matches!(parse("GET / HTTP/1.1 "), Err(ParseError::InvalidVersion { .. })));
    }

    #[test]
    fn invalid_method() {
        assert!(matches!(parse("G(T / HTTP/1.1"), Err(ParseError::InvalidMethod)));
        assert!(matches!(parse(" / HTTP/1.1"), Err(ParseError::InvalidMethod)));
    }

    #[test]
    fn malformed_lines() {
        assert!(matches!(parse("GET"), Err(ParseError::InvalidRequestLine { .. })));
        assert!(matches!(parse("GET /"), Err(ParseError::InvalidRequestLine { .. })));
        assert!(matches!(parse("GET /a b HTTP/1.1"), Err(ParseError::InvalidTarget { .. })));
        assert!(matches!(parse("GET  HTTP/1.1"), Err(ParseError::InvalidTarget { .. })));
    }
}
