//! # Selection Service Client
//!
//! The torque capacities, scores and material tables live behind an HTTP
//! service. This module defines the seam ([`ConnectionService`]) and the
//! reqwest-backed implementation ([`HttpConnectionService`]).
//!
//! Service error bodies come in three shapes under `detail`: a list of
//! validation issues, a structured object or a plain string. They are parsed
//! into [`ErrorDetail`] here and collapsed to one display string before they
//! leave this module.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SelectorConfig;
use crate::errors::{SelectorError, SelectorResult};
use crate::result::ComputationResult;
use crate::submission::SelectionRequest;

/// Last-resort failure text
pub const GENERIC_FAILURE: &str = "An error occurred";

/// Warning stored when the material list cannot be fetched
pub const MATERIALS_UNAVAILABLE: &str = "Could not load materials list.";

/// The two calls the form makes.
#[async_trait]
pub trait ConnectionService: Send + Sync {
    /// `GET /materials`
    async fn fetch_materials(&self) -> SelectorResult<Vec<String>>;

    /// `POST /select-connection`
    async fn select_connection(&self, request: &SelectionRequest) -> SelectorResult<ComputationResult>;
}

// ============================================================================
// Error payloads
// ============================================================================

/// One entry of a request-validation error list
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidationIssue {
    /// Path to the offending value, e.g. `["body", "shaft_diameter"]`
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    #[serde(default)]
    pub msg: String,
}

impl ValidationIssue {
    fn message(&self) -> String {
        let loc: Vec<String> = self
            .loc
            .iter()
            .map(|part| match part {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        if loc.is_empty() {
            self.msg.clone()
        } else {
            format!("{}: {}", loc.join("."), self.msg)
        }
    }
}

/// The `detail` member of a service error body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    List(Vec<ValidationIssue>),
    Object(serde_json::Map<String, serde_json::Value>),
    Text(String),
    Other(serde_json::Value),
}

impl ErrorDetail {
    /// Collapse into the single line shown in the banner
    pub fn message(&self) -> String {
        match self {
            ErrorDetail::List(issues) => issues
                .iter()
                .map(ValidationIssue::message)
                .collect::<Vec<_>>()
                .join("; "),
            ErrorDetail::Object(map) => serde_json::to_string(map).unwrap_or_default(),
            ErrorDetail::Text(text) => text.clone(),
            ErrorDetail::Other(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<ErrorDetail>,
}

/// Pull the `detail` out of an error response body, if there is one
pub fn parse_error_detail(body: &str) -> Option<ErrorDetail> {
    serde_json::from_str::<ErrorBody>(body).ok().and_then(|b| b.detail)
}

/// Best available failure text: structured detail, then the raw message,
/// then a generic fallback.
pub fn describe_failure(detail: Option<&ErrorDetail>, raw: Option<&str>) -> String {
    detail
        .map(ErrorDetail::message)
        .filter(|m| !m.is_empty())
        .or_else(|| raw.map(str::to_string).filter(|m| !m.is_empty()))
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

// ============================================================================
// HTTP implementation
// ============================================================================

#[derive(Debug, Deserialize)]
struct MaterialsResponse {
    #[serde(default)]
    materials: Vec<String>,
}

/// reqwest client for the selection service
#[derive(Debug, Clone)]
pub struct HttpConnectionService {
    client: reqwest::Client,
    config: SelectorConfig,
}

impl HttpConnectionService {
    pub fn new(config: SelectorConfig) -> SelectorResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SelectorError::transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(HttpConnectionService { client, config })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }
}

#[async_trait]
impl ConnectionService for HttpConnectionService {
    async fn fetch_materials(&self) -> SelectorResult<Vec<String>> {
        let url = self.config.endpoint("/materials");
        let unavailable = |reason: String| SelectorError::MaterialListUnavailable { reason };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("service returned {}", response.status())));
        }

        let body: MaterialsResponse = response
            .json()
            .await
            .map_err(|e| unavailable(format!("Failed to parse response: {}", e)))?;
        Ok(body.materials)
    }

    async fn select_connection(&self, request: &SelectionRequest) -> SelectorResult<ComputationResult> {
        let url = self.config.endpoint("/select-connection");

        let response = match self.client.post(&url).json(request).send().await {
            Ok(r) => r,
            Err(e) => {
                let raw = format!("Network error: {}", e);
                return Err(SelectorError::transport(describe_failure(None, Some(&raw))));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = parse_error_detail(&body);
            let raw = format!("Request failed with status code {}", status.as_u16());
            let message = describe_failure(detail.as_ref(), Some(&raw));
            return Err(if status.is_client_error() {
                SelectorError::rejected(status.as_u16(), message)
            } else {
                SelectorError::transport(message)
            });
        }

        response
            .json::<ComputationResult>()
            .await
            .map_err(|e| SelectorError::transport(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSet;
    use crate::submission::prepare;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_list_detail_joined() {
        let detail = parse_error_detail(
            r#"{"detail": [
                {"loc": ["body", "shaft_diameter"], "msg": "field required"},
                {"loc": ["body", "user_preferences", 0], "msg": "value is not a valid float"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            detail.message(),
            "body.shaft_diameter: field required; body.user_preferences.0: value is not a valid float"
        );
    }

    #[test]
    fn test_object_detail_serialized() {
        let detail = parse_error_detail(r#"{"detail": {"code": "E42"}}"#).unwrap();
        assert!(matches!(detail, ErrorDetail::Object(_)));
        assert_eq!(detail.message(), r#"{"code":"E42"}"#);
    }

    #[test]
    fn test_text_detail() {
        let detail = parse_error_detail(r#"{"detail": "Material not found: Unobtainium"}"#).unwrap();
        assert_eq!(detail, ErrorDetail::Text("Material not found: Unobtainium".to_string()));
    }

    #[test]
    fn test_failure_preference_order() {
        let detail = ErrorDetail::Text("bad torque".to_string());
        assert_eq!(describe_failure(Some(&detail), Some("HTTP 400")), "bad torque");

        let empty = ErrorDetail::Text(String::new());
        assert_eq!(describe_failure(Some(&empty), Some("HTTP 400")), "HTTP 400");
        assert_eq!(describe_failure(None, Some("timeout")), "timeout");
        assert_eq!(describe_failure(None, None), GENERIC_FAILURE);
    }

    #[test]
    fn test_unparseable_body_has_no_detail() {
        assert!(parse_error_detail("<html>502 Bad Gateway</html>").is_none());
        assert!(parse_error_detail(r#"{"detail": null}"#).is_none());
    }

    /// Serve a single canned HTTP response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| l.to_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });
        (url, handle)
    }

    fn service_for(url: &str) -> HttpConnectionService {
        HttpConnectionService::new(SelectorConfig::default().with_api_base_url(url)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_materials() {
        let (url, server) = serve_once("200 OK", r#"{"materials": ["Steel C45", "42CrMo4"]}"#).await;
        let materials = service_for(&url).fetch_materials().await.unwrap();
        assert_eq!(materials, vec!["Steel C45".to_string(), "42CrMo4".to_string()]);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /materials"));
    }

    #[tokio::test]
    async fn test_select_connection_sends_nulls() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"recommended_connection": "key", "required_torque_Nmm": 50000,
                "capacities_Nmm": {"key": 61000}, "feasible": true}"#,
        )
        .await;
        let prepared = prepare(&FieldSet::default()).unwrap();
        let result = service_for(&url).select_connection(&prepared.request).await.unwrap();
        assert_eq!(result.recommended_connection.as_deref(), Some("key"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /select-connection"));
        assert!(request.contains(r#""mu_override":null"#));
    }

    #[tokio::test]
    async fn test_select_connection_rejected() {
        let (url, _server) = serve_once(
            "422 Unprocessable Entity",
            r#"{"detail": [{"loc": ["body", "hub_length"], "msg": "field required"}]}"#,
        )
        .await;
        let prepared = prepare(&FieldSet::default()).unwrap();
        let err = service_for(&url).select_connection(&prepared.request).await.unwrap_err();
        assert_eq!(err, SelectorError::rejected(422, "body.hub_length: field required"));
    }

    #[tokio::test]
    async fn test_server_error_without_detail() {
        let (url, _server) = serve_once("500 Internal Server Error", "oops").await;
        let prepared = prepare(&FieldSet::default()).unwrap();
        let err = service_for(&url).select_connection(&prepared.request).await.unwrap_err();
        assert_eq!(err, SelectorError::transport("Request failed with status code 500"));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = service_for(&url).fetch_materials().await.unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_LIST_UNAVAILABLE");

        let prepared = prepare(&FieldSet::default()).unwrap();
        let err = service_for(&url).select_connection(&prepared.request).await.unwrap_err();
        assert_eq!(err.error_code(), "TRANSPORT_FAILURE");
    }
}
