//! Script execution context and result types.
//!
//! Rust and the QuickJS prelude communicate through JSON: a
//! [`SandboxContext`] is serialized into the JS global scope before the
//! prelude runs, and a [`Harvest`] is read back after the user script
//! finishes. Nothing else crosses the boundary.

use crate::models::TestResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Outcome of a script run.
///
/// `data` may be present even when `success` is false: a test script that
/// throws partway keeps the test results recorded before the throw.
#[derive(Debug, Clone)]
pub struct ScriptResult<T> {
    /// Whether the script ran to completion.
    pub success: bool,

    /// Phase-specific payload: the environment snapshot for a pre-request
    /// script, the test results for a test script.
    pub data: Option<T>,

    /// Error message when the script threw at top level.
    pub error: Option<String>,

    /// Console output, one line per console call, in order.
    pub logs: Vec<String>,
}

impl<T> ScriptResult<T> {
    /// A successful result with the given payload and no logs.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            logs: Vec::new(),
        }
    }
}

/// Outcome of a syntax-only validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxCheck {
    /// Whether the script compiled.
    pub valid: bool,

    /// The compile error, with a best-effort line number when the engine
    /// reported one.
    pub error: Option<String>,
}

impl SyntaxCheck {
    /// A passing check.
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    /// A failing check with the given error message.
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Request data visible to scripts through `pm.request`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestSnapshot {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Response data visible to scripts through `pm.response` (test phase only).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponseSnapshot {
    pub code: u16,
    pub status: String,
    pub headers: HashMap<String, String>,
    pub body: Value,
    pub time: u64,
    pub size: usize,
}

/// Script metadata visible through `pm.info`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestInfo {
    pub request_name: String,
    pub request_id: String,
}

/// Everything the prelude needs to build the `pm` surface, serialized into
/// the JS global scope before execution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SandboxContext {
    /// `"pre-request"` or `"test"`; gates `pm.response` and `pm.test`.
    pub phase: &'static str,
    pub request: RequestSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
    /// Active environment variables (mutable snapshot inside the script).
    pub environment: HashMap<String, String>,
    /// Built-in dynamic variables (mutable snapshot inside the script).
    pub globals: HashMap<String, String>,
    pub info: RequestInfo,
}

/// What the prelude hands back after the user script finished (or threw).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Harvest {
    pub logs: Vec<String>,
    pub tests: Vec<TestResult>,
    pub environment: HashMap<String, String>,
    pub globals: HashMap<String, String>,
}
