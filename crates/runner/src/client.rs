//! HTTP dispatch with request/response logging
//!
//! One call in, one response (or the "no response" sentinel) out. The client
//! never touches run state; callers pass the bearer token in and pull tokens
//! and ids out of the returned body.

use std::collections::BTreeMap;

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::RunnerConfig;
use crate::error::{SmokeError, SmokeResult};

/// Header mapping as logged and sent
pub type Headers = BTreeMap<String, String>;

/// A single call to the service under test
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,

    /// Path appended to the base URL, e.g. `/api/projects`
    pub path: String,

    pub body: Option<Value>,

    /// Caller-supplied headers (None = let the client decide)
    pub headers: Option<Headers>,

    /// Status the step expects back
    pub expected: StatusCode,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: None,
            expected: StatusCode::OK,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post<T: Serialize>(path: impl Into<String>, body: &T) -> SmokeResult<Self> {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put<T: Serialize>(path: impl Into<String>, body: &T) -> SmokeResult<Self> {
        Self::new(Method::PUT, path).with_body(body)
    }

    /// Attach a JSON body
    pub fn with_body<T: Serialize>(mut self, body: &T) -> SmokeResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn expect(mut self, status: StatusCode) -> Self {
        self.expected = status;
        self
    }
}

/// Work out the headers actually sent
///
/// A held bearer token always wins a slot in the map. Without one, a body
/// with no caller headers gets a JSON content type.
pub fn resolve_headers(supplied: Option<&Headers>, has_body: bool, bearer: Option<&str>) -> Headers {
    match (supplied, bearer) {
        (Some(headers), Some(token)) => {
            let mut headers = headers.clone();
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
            headers
        }
        (None, Some(token)) => {
            let mut headers = Headers::new();
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
            headers
        }
        (Some(headers), None) => headers.clone(),
        (None, None) if has_body => {
            let mut headers = Headers::new();
            headers.insert("Content-Type".to_string(), "application/json".to_string());
            headers
        }
        (None, None) => Headers::new(),
    }
}

/// Status and raw body of a received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body
    pub fn json<T: DeserializeOwned>(&self) -> SmokeResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Body pretty-printed when it is JSON, verbatim otherwise
    pub fn pretty_body(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| serde_json::to_string_pretty(&v).ok())
            .unwrap_or_else(|| self.body.clone())
    }
}

/// HTTP client bound to one base URL
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &RunnerConfig) -> SmokeResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path
    pub fn url(&self, path: &str) -> SmokeResult<Url> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| SmokeError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }

    /// Send one request
    ///
    /// `Ok(None)` means the transport failed (refused, DNS, timeout, body
    /// read); it has already been logged. `Err` is reserved for requests that
    /// could not be built at all.
    pub async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> SmokeResult<Option<ApiResponse>> {
        let url = self.url(&request.path)?;
        let headers = resolve_headers(request.headers.as_ref(), request.body.is_some(), bearer);

        log_request(&request.method, &url, &headers, request.body.as_ref());
        debug!("Expecting status {}", request.expected.as_u16());

        let mut builder = self.http.request(request.method.clone(), url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        match read_response(builder).await {
            Ok(response) => {
                log_response(&response);
                Ok(Some(response))
            }
            Err(e) => {
                error!("Request failed: {}", e);
                Ok(None)
            }
        }
    }
}

async fn read_response(builder: reqwest::RequestBuilder) -> Result<ApiResponse, reqwest::Error> {
    let response = builder.send().await?;
    let status = response.status();
    let body = response.text().await?;
    Ok(ApiResponse { status, body })
}

fn log_request(method: &Method, url: &Url, headers: &Headers, body: Option<&Value>) {
    info!("Request:");
    info!("Method: {}", method);
    info!("URL: {}", url);
    if !headers.is_empty() {
        info!("Headers: {}", pretty(headers));
    }
    if let Some(body) = body {
        info!("Data: {}", pretty(body));
    }
}

fn log_response(response: &ApiResponse) {
    info!("Response:");
    info!("Status Code: {}", response.status.as_u16());
    info!("Body: {}", response.pretty_body());
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
