//! HTTP transport used by `ApiClient`.
//!
//! The client builds fully-resolved `HttpRequest` values and hands them to a
//! `Transport`. Production code uses `ReqwestTransport`; tests swap in a
//! scripted implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode, Url};
use tracing::debug;

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

/// Multipart form description.
///
/// `reqwest::multipart::Form` is consumed on send, so the client keeps this
/// cloneable form around and rebuilds the real one for every attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    pub parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            bytes,
        });
        self
    }

    fn to_multipart(&self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                    if let Some(mime) = content_type {
                        file = file.mime_str(mime)?;
                    }
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

/// Encoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Serialized JSON text, sent with `Content-Type: application/json`
    Json(String),
    /// Multipart body; the transport picks the content type and boundary
    Form(FormData),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub payload: Option<Payload>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and read the whole response body.
    ///
    /// Non-success statuses are returned as responses, not errors; only
    /// failures to talk to the server are errors.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        Self::build(None)
    }

    /// Attach a fixed `Cookie` header to every request, for user sessions
    /// whose login cookie was obtained outside this process.
    pub fn with_cookie(cookie: &str) -> Result<Self, ApiError> {
        Self::build(Some(cookie))
    }

    fn build(cookie: Option<&str>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cookie) = cookie {
            headers.insert(header::COOKIE, HeaderValue::from_str(cookie)?);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        builder = match request.payload {
            Some(Payload::Json(json)) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(json),
            Some(Payload::Form(form)) => builder.multipart(form.to_multipart()?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_data_builder() {
        let form = FormData::new()
            .text("plugin-info", "{}")
            .file("plugin-file", "plugin.jar", Some("application/java-archive"), vec![1, 2, 3]);

        assert_eq!(form.parts.len(), 2);
        assert!(matches!(&form.parts[0], FormPart::Text { name, .. } if name == "plugin-info"));
        assert!(matches!(
            &form.parts[1],
            FormPart::File { file_name, bytes, .. } if file_name == "plugin.jar" && bytes == &vec![1, 2, 3]
        ));
        assert!(form.to_multipart().is_ok());
    }

    #[test]
    fn test_form_data_rejects_bad_mime() {
        let form = FormData::new().file("f", "a.bin", Some("not a mime"), vec![]);
        assert!(form.to_multipart().is_err());
    }
}
