use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{join_url, ApiConfig};
use crate::dto::candidate_dto::QueryParams;
use crate::error::{ApiError, Error, Result};

/// Marks a call as coming from the admin dashboard. This is a routing
/// convention understood by the backend, not authentication.
pub const ADMIN_HEADER: &str = "X-ADMIN";

#[derive(Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(JsonValue),
    Multipart(Form),
}

#[derive(Default)]
pub struct RequestOptions {
    pub params: Option<QueryParams>,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
    pub admin: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Extra header for this call only, sent after the configured defaults.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("Invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("Invalid header value for {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one request and decodes the body. Non-2xx answers become
    /// [`ApiError`]; transport failures (including the timeout) pass through
    /// as [`Error::Http`].
    #[instrument(skip(self, options), fields(admin = options.admin))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let url = join_url(&self.base_url, path);
        let mut builder = self.client.request(method.clone(), &url);

        if let Some(params) = &options.params {
            builder = builder.query(&query_pairs(params));
        }
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if options.admin {
            builder = builder.header(ADMIN_HEADER, "1");
        }
        builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        debug!(%method, %url, "Sending API request");
        let response = builder.send().await.map_err(|e| {
            warn!(%method, %url, error = %e, "API request failed in transport");
            e
        })?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let err = normalize_error(status, &body);
            warn!(
                %method,
                %url,
                status = status.as_u16(),
                field_errors = err.field_errors.len(),
                "API request returned an error"
            );
            return Err(err.into());
        }

        decode_body(&body)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T> {
        self.request(Method::GET, path, options).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T> {
        self.request(Method::POST, path, options).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T> {
        self.request(Method::PATCH, path, options).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T> {
        self.request(Method::DELETE, path, options).await
    }

    /// Resolves `location` against the API origin; absolute URLs are kept.
    pub fn resolve(&self, location: &str) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?.join(location)?)
    }

    /// Downloads raw bytes, typically a short-lived file URL handed out by
    /// the backend.
    #[instrument(skip(self))]
    pub async fn fetch_bytes(&self, location: &str) -> Result<Bytes> {
        let url = self.resolve(location)?;
        debug!(%url, "Downloading file");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(normalize_error(status, &body).into());
        }
        Ok(body)
    }
}

fn normalize_error(status: StatusCode, body: &[u8]) -> ApiError {
    let field_errors = if status == StatusCode::BAD_REQUEST {
        serde_json::from_slice::<JsonValue>(body)
            .map(|value| normalize_field_errors(&value))
            .unwrap_or_default()
    } else {
        Vec::new()
    };
    ApiError::new(status, field_errors)
}

/// Flattens a `{field: message | [message, ...]}` body into one ordered list:
/// fields in the order the server sent them, then each field's messages in
/// order. Any other shape yields nothing.
pub fn normalize_field_errors(body: &JsonValue) -> Vec<String> {
    let Some(fields) = body.as_object() else {
        return Vec::new();
    };

    let mut messages = Vec::new();
    for value in fields.values() {
        match value {
            JsonValue::String(msg) => messages.push(msg.clone()),
            JsonValue::Array(items) => messages.extend(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string)),
            ),
            _ => {}
        }
    }
    messages
}

/// Query string pairs for a parameter map. `null` is dropped and arrays
/// repeat the key.
pub(crate) fn query_pairs(params: &QueryParams) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            JsonValue::Null => {}
            JsonValue::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(JsonValue::Null)?);
    }
    Ok(serde_json::from_slice(body)?)
}
