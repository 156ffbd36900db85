//! HTTP request head handling.
//!
//! [`RequestHead`] is what the connection hands to the application after the
//! request line and header block have been parsed. Header fields are kept in
//! arrival order in a [`HeaderList`], with names lower-cased and values kept
//! byte for byte as they were received.

use http::header::{CONNECTION, EXPECT};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri, Version};

/// The form of the request-target on the request line (RFC 9112 section 3.2).
///
/// Authority-form is never produced: it is only used by `CONNECT`, which is
/// rejected while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    /// `/path?query`
    Origin,
    /// `scheme://host[:port]/path?query`
    Absolute,
    /// `*`, only valid for `OPTIONS`
    Asterisk,
}

/// Header fields in the order they arrived.
///
/// Unlike [`HeaderMap`], repeated and interleaved fields keep their exact
/// relative order, which matters when inspecting what a peer actually sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    fields: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, name: HeaderName, value: HeaderValue) {
        self.fields.push((name, value));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the first value of the field `name`, compared case-insensitively.
    pub fn get<K: AsRef<str>>(&self, name: K) -> Option<&HeaderValue> {
        self.get_all(name).next()
    }

    /// Returns every value of the field `name` in arrival order.
    pub fn get_all<K: AsRef<str>>(&self, name: K) -> impl Iterator<Item = &HeaderValue> {
        self.fields
            .iter()
            .filter(move |(field, _)| field.as_str().eq_ignore_ascii_case(name.as_ref()))
            .map(|(_, value)| value)
    }

    pub fn contains_key<K: AsRef<str>>(&self, name: K) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.fields.iter().map(|(name, value)| (name, value))
    }

    /// Copies the fields into an [`HeaderMap`], keeping repeated fields.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            map.append(name.clone(), value.clone());
        }
        map
    }
}

impl IntoIterator for HeaderList {
    type Item = (HeaderName, HeaderValue);
    type IntoIter = std::vec::IntoIter<(HeaderName, HeaderValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl FromIterator<(HeaderName, HeaderValue)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (HeaderName, HeaderValue)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

/// Represents a parsed HTTP request head: request line plus header block.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    target: Uri,
    form: TargetForm,
    version: Version,
    headers: HeaderList,
}

impl RequestHead {
    pub(crate) fn new(method: Method, target: Uri, form: TargetForm, version: Version, headers: HeaderList) -> Self {
        Self { method, target, form, version, headers }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request-target exactly as it appeared on the request line.
    pub fn target(&self) -> &Uri {
        &self.target
    }

    pub fn target_form(&self) -> TargetForm {
        self.form
    }

    /// Returns the request's HTTP version, either HTTP/1.0 or HTTP/1.1.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the header fields in arrival order.
    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    /// Whether the connection may be reused after this exchange.
    ///
    /// `close` wins over `keep-alive`; without either token HTTP/1.1 is
    /// persistent and HTTP/1.0 is not.
    pub fn is_keep_alive(&self) -> bool {
        let mut close = false;
        let mut keep_alive = false;

        for value in self.headers.get_all(CONNECTION) {
            for token in value.as_bytes().split(|b| *b == b',') {
                let token = token.trim_ascii();
                if token.eq_ignore_ascii_case(b"close") {
                    close = true;
                } else if token.eq_ignore_ascii_case(b"keep-alive") {
                    keep_alive = true;
                }
            }
        }

        if close {
            false
        } else if keep_alive {
            true
        } else {
            self.version == Version::HTTP_11
        }
    }

    /// Whether the client waits for a `100 Continue` before sending the body.
    ///
    /// HTTP/1.0 clients don't understand interim responses, so the
    /// expectation is ignored for them.
    pub fn expects_continue(&self) -> bool {
        self.version == Version::HTTP_11
            && self.headers.get_all(EXPECT).any(|value| value.as_bytes().trim_ascii().eq_ignore_ascii_case(b"100-continue"))
    }

    /// Attaches a body, converting the head into a full `http::Request<T>`.
    pub fn body<T>(self, body: T) -> Request<T> {
        let mut request = Request::new(body);
        *request.headers_mut() = self.headers.to_header_map();
        *request.method_mut() = self.method;
        *request.uri_mut() = self.target;
        *request.version_mut() = self.version;
        request
    }

    /// Converts into a bodyless `http::Request<()>`.
    pub fn into_request(self) -> Request<()> {
        self.body(())
    }
}
