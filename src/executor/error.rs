//! Dispatch error types and transport-failure classification.

use crate::scripting::ScriptError;
use std::fmt;

/// Errors from request dispatch.
///
/// Transport-level failures (timeout, DNS, refused connection) are NOT
/// errors: they are classified into a failure-shaped [`ApiResponse`] by the
/// dispatcher so the response panel always has something to show. Only
/// failures that happen before anything is on the wire surface here.
///
/// [`ApiResponse`]: crate::models::ApiResponse
#[derive(Debug)]
pub enum DispatchError {
    /// The transport client could not be constructed.
    Client(reqwest::Error),
    /// The transport request could not be constructed (invalid header value,
    /// unusable URL).
    Build(reqwest::Error),
    /// The script engine could not be created.
    Script(ScriptError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Client(e) => write!(f, "failed to create HTTP client: {}", e),
            DispatchError::Build(e) => write!(f, "failed to build request: {}", e),
            DispatchError::Script(e) => write!(f, "script engine error: {}", e),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Client(e) | DispatchError::Build(e) => Some(e),
            DispatchError::Script(e) => Some(e),
        }
    }
}

impl From<ScriptError> for DispatchError {
    fn from(e: ScriptError) -> Self {
        DispatchError::Script(e)
    }
}

/// Classifies a transport failure into `(status, status_text)` for the
/// failure-shaped response.
///
/// The status is the received HTTP status when the failure happened after a
/// response arrived (body read errors), otherwise 0. The status text is a
/// user-facing classification: `请求超时` for timeouts, `无法解析域名` for
/// DNS failures, `连接被拒绝` for refused connections, the raw error message
/// otherwise, and `未知错误` when there is no message at all.
pub fn classify_transport_failure(error: &reqwest::Error) -> (u16, String) {
    let status = error.status().map(|s| s.as_u16()).unwrap_or(0);

    if error.is_timeout() {
        return (status, "请求超时".to_string());
    }

    // Walk the source chain; reqwest wraps hyper which wraps the io error.
    let mut messages = error.to_string().to_lowercase();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        messages.push(' ');
        messages.push_str(&inner.to_string().to_lowercase());
        source = inner.source();
    }

    let text = if messages.contains("dns")
        || messages.contains("lookup")
        || messages.contains("name resolution")
    {
        "无法解析域名".to_string()
    } else if messages.contains("connection refused") {
        "连接被拒绝".to_string()
    } else {
        let raw = error.to_string();
        if raw.is_empty() {
            "未知错误".to_string()
        } else {
            raw
        }
    };

    (status, text)
}
