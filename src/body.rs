//! Request body parser middleware.
//!
//! [`parser`] buffers the whole request body and, for `POST`, `PUT` and
//! `PATCH`, decodes it according to the declared content-type:
//!
//! | Content-Type | Result | Default limit |
//! |---|---|---|
//! | `application/json`, `application/*+json`, `application/csp-report` | [`Body::Json`] | 1 MiB |
//! | `application/x-www-form-urlencoded` | [`Body::Form`] | 56 KiB |
//! | `text/*` | [`Body::Text`] | 56 KiB |
//! | anything else, or another method | [`Body::Raw`] | none |
//!
//! A body over its limit is answered with `413`; a body that does not decode
//! as its declared type is answered with `400`. Either way the rest of the
//! pipeline never runs.
//!
//! JSON is strict: the top-level value must be an object or an array. An
//! empty JSON body decodes to `{}`.

use std::collections::BTreeMap;

use bytes::{Bytes, BytesMut};
use http::header::CONTENT_TYPE;
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;
use serde_json::Value;
use tracing::debug;

use crate::middleware::{Middleware, Next};
use crate::request::{Body, BoxError, Request};
use crate::response::Response;
use crate::status::Status;

/// Per-encoding size limits, in bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Limits {
    pub json: usize,
    pub form: usize,
    pub text: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            json: 1024 * 1024,
            form: 56 * 1024,
            text: 56 * 1024,
        }
    }
}

/// Why a body was rejected.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("request body exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(#[source] BoxError),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON body must be an object or an array")]
    NotStrict,

    #[error("text body is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl BodyError {
    pub fn status(&self) -> Status {
        match self {
            Self::TooLarge { .. } => Status::ContentTooLarge,
            _ => Status::BadRequest,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Kind {
    Json,
    Form,
    Text,
    Raw,
}

impl Kind {
    fn of(req: &Request) -> Self {
        if !matches!(*req.method(), http::Method::POST | http::Method::PUT | http::Method::PATCH) {
            return Self::Raw;
        }
        req.header(CONTENT_TYPE.as_str()).map_or(Self::Raw, Self::from_content_type)
    }

    fn from_content_type(value: &str) -> Self {
        let mime = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match mime.as_str() {
            "application/json" | "application/csp-report" => Self::Json,
            "application/x-www-form-urlencoded" => Self::Form,
            m if m.starts_with("application/") && m.ends_with("+json") => Self::Json,
            m if m.starts_with("text/") => Self::Text,
            _ => Self::Raw,
        }
    }

    /// Bodies that are passed through undecoded are never capped.
    fn limit(self, limits: &Limits) -> Option<usize> {
        match self {
            Self::Json => Some(limits.json),
            Self::Form => Some(limits.form),
            Self::Text => Some(limits.text),
            Self::Raw  => None,
        }
    }
}

/// Builds the body parser stage.
pub fn parser(limits: Limits) -> impl Middleware {
    move |req: Request, next: Next| parse(req, next, limits)
}

async fn parse(mut req: Request, next: Next, limits: Limits) -> Response {
    let kind = Kind::of(&req);
    match req.take_body() {
        Body::Stream(stream) => {
            let decoded = buffer(stream, kind.limit(&limits)).await.and_then(|bytes| decode(kind, bytes));
            match decoded {
                Ok(body) => req.body = body,
                Err(e) => {
                    debug!(error = %e, path = req.path(), "rejecting request body");
                    return Response::builder().status(e.status()).text(e.to_string());
                }
            }
        }
        // Already buffered by an earlier stage.
        body => req.body = body,
    }
    next.run(req).await
}

async fn buffer(mut stream: UnsyncBoxBody<Bytes, BoxError>, limit: Option<usize>) -> Result<Bytes, BodyError> {
    let mut buf = BytesMut::new();
    while let Some(frame) = stream.frame().await {
        let Ok(data) = frame.map_err(BodyError::Read)?.into_data() else {
            // Trailers carry no body bytes.
            continue;
        };
        if let Some(limit) = limit.filter(|&limit| buf.len() + data.len() > limit) {
            return Err(BodyError::TooLarge { limit });
        }
        buf.extend_from_slice(&data);
    }
    Ok(buf.freeze())
}

fn decode(kind: Kind, bytes: Bytes) -> Result<Body, BodyError> {
    match kind {
        Kind::Json if bytes.is_empty() => Ok(Body::Json(Value::Object(Default::default()))),
        Kind::Json => {
            let value: Value = serde_json::from_slice(&bytes)?;
            if value.is_object() || value.is_array() {
                Ok(Body::Json(value))
            } else {
                Err(BodyError::NotStrict)
            }
        }
        Kind::Form => {
            let mut form: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for (k, v) in url::form_urlencoded::parse(&bytes) {
                form.entry(k.into_owned()).or_default().push(v.into_owned());
            }
            Ok(Body::Form(form))
        }
        Kind::Text => Ok(Body::Text(String::from_utf8(bytes.to_vec())?)),
        Kind::Raw => Ok(Body::Raw(bytes)),
    }
}
