//! Incoming HTTP request type.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use http::HeaderMap;
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;
use serde_json::Value;

/// Boxed error used for body transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The request body, in whatever state the pipeline has left it.
///
/// Requests arrive as [`Body::Stream`]. The [`body::parser`](crate::body::parser)
/// middleware buffers the stream and replaces it with one of the other
/// variants before the handler runs.
pub enum Body {
    /// Not yet read from the connection.
    Stream(UnsyncBoxBody<Bytes, BoxError>),
    /// Buffered bytes with no recognised content-type.
    Raw(Bytes),
    /// `application/json` and `application/*+json`.
    Json(Value),
    /// `application/x-www-form-urlencoded`. Repeated keys keep every value.
    Form(BTreeMap<String, Vec<String>>),
    /// `text/*`.
    Text(String),
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Raw(b)    => f.debug_tuple("Raw").field(b).finish(),
            Self::Json(v)   => f.debug_tuple("Json").field(v).finish(),
            Self::Form(m)   => f.debug_tuple("Form").field(m).finish(),
            Self::Text(s)   => f.debug_tuple("Text").field(s).finish(),
        }
    }
}

/// An incoming HTTP request.
///
/// Everything except the body is fixed when the request is created; the body
/// is replaced once, by the body parser.
pub struct Request {
    pub(crate) method: http::Method,
    pub(crate) uri: http::Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Body,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// Wraps any `http::Request` whose body yields [`Bytes`].
    ///
    /// The server uses this for `hyper::body::Incoming`; tests pass
    /// `http_body_util::Full<Bytes>`.
    pub fn from_http<B>(req: http::Request<B>) -> Self
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: Body::Stream(body.map_err(Into::into).boxed_unsync()),
            params: HashMap::new(),
        }
    }

    pub fn method(&self) -> &http::Method { &self.method }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn query(&self) -> Option<&str> { self.uri.query() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Body { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The parsed JSON body, if the body parser produced one.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(v) => Some(v),
            _ => None,
        }
    }

    /// The first value of a form field, if the body was form-encoded.
    pub fn form(&self, key: &str) -> Option<&str> {
        match &self.body {
            Body::Form(m) => m.get(key).and_then(|vs| vs.first()).map(String::as_str),
            _ => None,
        }
    }

    /// The text body, if the content-type was `text/*`.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn take_body(&mut self) -> Body {
        std::mem::replace(&mut self.body, Body::Raw(Bytes::new()))
    }
}

#[cfg(test)]
pub(crate) fn test_request(method: &str, uri: &str, content_type: Option<&str>, body: &'static [u8]) -> Request {
    test_request_with(method, uri, content_type, Bytes::from_static(body))
}

#[cfg(test)]
pub(crate) fn test_request_with(method: &str, uri: &str, content_type: Option<&str>, body: Bytes) -> Request {
    let mut builder = http::Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header(http::header::CONTENT_TYPE, ct);
    }
    Request::from_http(builder.body(http_body_util::Full::new(body)).unwrap())
}
