//! Request Executor shared by the authenticator and every resource method.
//!
//! [`ApiRequest`] describes a call as plain data and [`parse_response`] turns a
//! body into a result; both are pure. [`Executor`] does the network round-trip
//! in between.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::API_VERSION;
use crate::error::{PingupError, Result};
use crate::query::Query;

pub const TOKEN_HEADER: &str = "Token";
pub const CONTENT_TYPE_HEADER: &str = "Content-type";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Key whose presence in a response body marks it as an error.
///
/// The service never sends it on success, so a successful payload that
/// happened to carry it would be reported as an error.
pub const ERROR_DISCRIMINATOR: &str = "httpStatus";

const MAX_REDIRECTS: usize = 10;

/// One HTTP call described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// A call under `auth/`: no version segment, no token.
    pub fn unauthenticated(method: Method, endpoint: &str, path: &str, query: &Query) -> Self {
        Self {
            method,
            url: format!("{endpoint}{path}?{}", query.encode()),
            headers: vec![(CONTENT_TYPE_HEADER.into(), JSON_CONTENT_TYPE.into())],
        }
    }

    /// A versioned call carrying the access token.
    pub fn authenticated(
        method: Method,
        endpoint: &str,
        token: &str,
        path: &str,
        query: &Query,
    ) -> Self {
        Self {
            method,
            url: format!("{endpoint}{API_VERSION}/{path}?{}", query.encode()),
            headers: vec![
                (TOKEN_HEADER.into(), token.into()),
                (CONTENT_TYPE_HEADER.into(), JSON_CONTENT_TYPE.into()),
            ],
        }
    }

    /// The URL without its query string, which may carry credentials.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Decode a response body, mapping an `httpStatus` body to [`PingupError::Api`].
///
/// An empty body decodes to `null`. Anything else is returned unchanged.
pub fn parse_response(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let value: Value = serde_json::from_str(body)?;

    match value.get(ERROR_DISCRIMINATOR) {
        Some(status) if !status.is_null() => Err(PingupError::Api {
            http_status: status
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .or_else(|| status.as_str().and_then(|s| s.parse().ok())),
            response_reference: text_field(&value, "responseReference"),
            message: text_field(&value, "message"),
            description: text_field(&value, "description"),
        }),
        _ => Ok(value),
    }
}

fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Performs [`ApiRequest`]s over a blocking HTTP client.
#[derive(Debug, Clone)]
pub(crate) struct Executor {
    http: Client,
}

impl Executor {
    /// `timeout: None` disables the HTTP client's default timeout.
    pub(crate) fn new(timeout: Option<Duration>) -> Result<Self> {
        let http = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }

    pub(crate) fn execute(&self, request: &ApiRequest) -> Result<Value> {
        debug!(method = %request.method, path = request.path(), "sending request");

        let mut builder = self.http.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!(status, bytes = body.len(), "received response");

        let result = parse_response(&body);
        if let Err(PingupError::Api {
            ref response_reference,
            ref message,
            ..
        }) = result
        {
            warn!(
                path = request.path(),
                reference = %response_reference,
                "Pingup API error: {message}"
            );
        }
        result
    }
}
