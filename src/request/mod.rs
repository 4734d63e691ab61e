//! HTTP request client.
//!
//! `RequestClient` is the seam every command talks through: one `ApiRequest`
//! in, the decoded JSON body out. `HttpClient` is the reqwest-backed
//! implementation used by the binary; tests substitute a recording fake.
//!
//! Non-2xx responses are turned into `RequestError::Status` carrying the
//! message the service put in its (OData) error body.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

/// Body attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Bytes {
        content_type: &'static str,
        data: Vec<u8>,
    },
}

/// A single REST call: verb, absolute URL, headers, optional body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// `authorization: Bearer <token>` plus the given `accept` value.
    pub fn bearer(self, token: &str, accept: &str) -> Self {
        self.header("authorization", format!("Bearer {token}"))
            .header("accept", accept)
    }

    pub fn bytes(mut self, content_type: &'static str, data: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Bytes { content_type, data });
        self
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RequestError {
    /// The call never produced a response (DNS, TLS, connection reset...).
    #[error("{0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// A success response whose body was not JSON.
    #[error("{0}")]
    Decode(String),
}

#[async_trait]
pub trait RequestClient: Send + Sync {
    /// Perform exactly one round trip. Empty success bodies decode to `Value::Null`.
    async fn send(&self, request: ApiRequest) -> Result<Value, RequestError>;
}

/* ---- reqwest implementation ---- */

#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, RequestError> {
        let inner = reqwest::Client::builder()
            .user_agent(concat!("m365-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl RequestClient for HttpClient {
    async fn send(&self, request: ApiRequest) -> Result<Value, RequestError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self.inner.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(RequestBody::Bytes { content_type, data }) => {
                builder.header("content-type", content_type).body(data)
            }
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        trace!(status = status.as_u16(), body = %text, "response received");

        if !status.is_success() {
            return Err(RequestError::Status {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| RequestError::Decode(e.to_string()))
    }
}

/* ---- Error body interpretation ---- */

/// Pull the human message out of an error body. Shapes seen in the wild:
///   {"odata.error":{"message":{"value":"..."}}}      (Azure AD Graph)
///   {"error":{"message":{"value":"..."}}}            (SharePoint verbose)
///   {"error":{"message":"..."}}                      (Microsoft Graph)
///   {"error_description":"..."} / {"message":"..."}  (login / misc)
/// Falls back to the raw body, then to `HTTP <status>`.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(msg) = odata_error_message(&value)
    {
        return msg;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

fn odata_error_message(value: &Value) -> Option<String> {
    let candidates = [
        value.pointer("/odata.error/message/value"),
        value.pointer("/error/message/value"),
        value.pointer("/error/message"),
        value.get("error_description"),
        value.get("message"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn builder_sets_auth_headers() {
        let req = ApiRequest::get("https://example/x").bearer("ABC", "application/json");
        assert_eq!(req.header_value("Authorization"), Some("Bearer ABC"));
        assert_eq!(req.header_value("accept"), Some("application/json"));
        assert_eq!(req.method, Method::GET);
    }

    #[test]
    fn error_message_shapes() {
        assert_eq!(
            error_message(404, r#"{"odata.error":{"code":"x","message":{"lang":"en","value":"Grant not found"}}}"#),
            "Grant not found"
        );
        assert_eq!(
            error_message(400, r#"{"error":{"code":"-1","message":{"value":"List does not exist"}}}"#),
            "List does not exist"
        );
        assert_eq!(
            error_message(403, r#"{"error":{"code":"Forbidden","message":"Access denied"}}"#),
            "Access denied"
        );
        assert_eq!(error_message(500, "Invalid request"), "Invalid request");
        assert_eq!(error_message(502, "  "), "HTTP 502");
    }

    #[tokio::test]
    async fn http_client_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_api/web/lists"))
            .and(header("authorization", "Bearer ABC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [1, 2]})))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let req = ApiRequest::get(format!("{}/_api/web/lists", server.uri()))
            .bearer("ABC", "application/json;odata=nometadata");
        let value = client.send(req).await.unwrap();
        assert_eq!(value, json!({"value": [1, 2]}));
    }

    #[tokio::test]
    async fn http_client_empty_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/grants/abc"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let value = client
            .send(ApiRequest::delete(format!("{}/grants/abc", server.uri())))
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn http_client_sends_binary_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1.0/appCatalogs/teamsApps/1"))
            .and(header("content-type", "application/zip"))
            .and(body_bytes(b"123".to_vec()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let req = ApiRequest::put(format!("{}/v1.0/appCatalogs/teamsApps/1", server.uri()))
            .bytes("application/zip", b"123".to_vec());
        client.send(req).await.unwrap();
    }

    #[tokio::test]
    async fn http_client_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(
                json!({"error": {"code": "-2130575322", "message": {"value": "List 'Docs' does not exist"}}}),
            ))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client
            .send(ApiRequest::get(format!("{}/x", server.uri())))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RequestError::Status {
                status: 404,
                message: "List 'Docs' does not exist".into()
            }
        );
        assert_eq!(err.to_string(), "List 'Docs' does not exist");
    }
}
