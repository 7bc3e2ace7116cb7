//! API response data models.
//!
//! A response is created once per dispatch and is immutable afterwards,
//! except for `test_results` which the script engine attaches after the
//! test script has run.

use crate::models::{generate_id, now_millis};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Outcome of a single `pm.test(...)` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// The test callback returned a truthy value.
    Passed,
    /// The test callback returned a falsy value or threw.
    Failed,
}

/// Result of one `pm.test(name, fn)` call inside a test script.
///
/// Results are recorded in call order; duplicate names are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// The name passed to `pm.test`.
    pub name: String,

    /// Whether the test passed or failed.
    pub status: TestStatus,

    /// Human-readable outcome; for a failure this carries the assertion or
    /// error message.
    pub message: String,

    /// Expected value for a failed assertion, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,

    /// Actual value for a failed assertion, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

/// A normalized HTTP response as shown in the response panel.
///
/// Transport failures also produce this shape (status 0 and a classified
/// `status_text`) rather than an error, so a failed dispatch still populates
/// the response panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Unique identifier for the response.
    pub id: String,

    /// Id of the request that produced this response.
    pub request_id: String,

    /// HTTP status code; 0 when no server response was received.
    pub status: u16,

    /// Status text from the server, or a human-readable failure
    /// classification when no response exists.
    pub status_text: String,

    /// Response headers with lower-cased keys.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Parsed body: a JSON value when the body parses as JSON, otherwise the
    /// raw text as a JSON string; `null` when there is no body.
    #[serde(default)]
    pub data: Value,

    /// Body size in bytes; 0 when no response was received.
    pub size: usize,

    /// Elapsed time for the dispatch, in milliseconds.
    pub time: u64,

    /// Content type reported by the server (defaults to `application/json`).
    pub content_type: String,

    /// Creation time, epoch milliseconds.
    pub created_at: i64,

    /// Test script results, attached after the test script has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<Vec<TestResult>>,
}

impl ApiResponse {
    /// Creates a response shell for the given request with a fresh id.
    pub fn new(request_id: impl Into<String>, status: u16, status_text: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            request_id: request_id.into(),
            status,
            status_text: status_text.into(),
            headers: HashMap::new(),
            data: Value::Null,
            size: 0,
            time: 0,
            content_type: "application/json".to_string(),
            created_at: now_millis(),
            test_results: None,
        }
    }

    /// Checks if the response status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Formats the body for display: strings verbatim, anything else as
    /// pretty-printed JSON, and the empty string for a missing body.
    pub fn format_data(&self) -> String {
        format_response_data(&self.data)
    }
}

/// Formats a parsed response body for display.
///
/// Strings are returned verbatim; other JSON values are pretty-printed;
/// `null` becomes the empty string.
pub fn format_response_data(data: &Value) -> String {
    match data {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_response_new() {
        let response = ApiResponse::new("req-1", 200, "OK");
        assert_eq!(response.request_id, "req-1");
        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.data, Value::Null);
        assert_eq!(response.content_type, "application/json");
        assert!(response.test_results.is_none());
    }

    #[test]
    fn test_is_success() {
        assert!(ApiResponse::new("r", 200, "OK").is_success());
        assert!(ApiResponse::new("r", 299, "").is_success());
        assert!(!ApiResponse::new("r", 301, "Moved Permanently").is_success());
        assert!(!ApiResponse::new("r", 404, "Not Found").is_success());
        assert!(!ApiResponse::new("r", 0, "连接被拒绝").is_success());
    }

    #[test]
    fn test_format_response_data() {
        assert_eq!(format_response_data(&Value::Null), "");
        assert_eq!(format_response_data(&json!("plain text")), "plain text");

        let formatted = format_response_data(&json!({"id": 1}));
        assert!(formatted.contains("\"id\": 1"));
    }

    #[test]
    fn test_test_result_serialization() {
        let result = TestResult {
            name: "status is 200".to_string(),
            status: TestStatus::Failed,
            message: "expected 500 to equal 200".to_string(),
            expected: Some("200".to_string()),
            actual: Some("500".to_string()),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"failed\""));

        let parsed: TestResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_test_result_optional_fields_omitted() {
        let result = TestResult {
            name: "ok".to_string(),
            status: TestStatus::Passed,
            message: "Passed".to_string(),
            expected: None,
            actual: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("expected"));
        assert!(!json.contains("actual"));
    }

    #[test]
    fn test_response_serialization_round_trip() {
        let mut response = ApiResponse::new("req-9", 404, "Not Found");
        response.data = json!({"error": "missing"});
        response.headers.insert("content-type".to_string(), "application/json".to_string());
        response.size = 20;
        response.time = 123;

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"requestId\":\"req-9\""));
        assert!(json.contains("\"statusText\":\"Not Found\""));

        let parsed: ApiResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, 404);
        assert_eq!(parsed.data, response.data);
    }
}
