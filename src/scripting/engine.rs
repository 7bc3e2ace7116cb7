//! QuickJS-hosted script engine.
//!
//! Runs user pre-request and test scripts in an embedded QuickJS runtime.
//! Each execution gets a fresh context: a JS prelude (see `prelude.js`)
//! builds the `pm`/`console` surface from a serialized [`SandboxContext`],
//! the user script runs wrapped as `(function (pm, console) { ... })`, and
//! the prelude's accumulated state is harvested back as JSON. Scripts can
//! only reach what the context carries; there is no host I/O, though no
//! wall-clock limit is enforced either.

use crate::models::{ApiRequest, ApiResponse, TestResult};
use crate::scripting::context::{
    Harvest, RequestInfo, RequestSnapshot, ResponseSnapshot, SandboxContext, ScriptResult,
    SyntaxCheck,
};
use crate::store::StoreService;
use crate::variables::builtin_variables;
use once_cell::sync::Lazy;
use regex::Regex;
use rquickjs::{Context, Ctx, Runtime, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The fixed prelude evaluated before every user script.
const PRELUDE: &str = include_str!("prelude.js");

/// Matches a line number in an engine error message or stack trace.
static LINE_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:line\s+|eval_script:)(\d+)").expect("line regex is valid"));

/// Errors from script engine construction.
#[derive(Debug)]
pub enum ScriptError {
    /// The QuickJS runtime could not be created.
    Runtime(rquickjs::Error),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Runtime(e) => write!(f, "failed to create script runtime: {}", e),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScriptError::Runtime(e) => Some(e),
        }
    }
}

impl From<rquickjs::Error> for ScriptError {
    fn from(e: rquickjs::Error) -> Self {
        ScriptError::Runtime(e)
    }
}

/// Raw outcome of one sandbox execution, before phase-specific mapping.
struct Execution {
    success: bool,
    error: Option<String>,
    harvest: Harvest,
}

impl Execution {
    fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            harvest: Harvest {
                logs: vec![format!("Error: {}", message)],
                ..Harvest::default()
            },
            error: Some(message),
        }
    }
}

/// Executes pre-request and test scripts against the active environment.
pub struct ScriptEngine {
    runtime: Runtime,
    store: Arc<dyn StoreService>,
}

impl ScriptEngine {
    /// Creates an engine over the given store.
    ///
    /// The runtime is capped at 64 MB of memory and a 1 MB stack so a
    /// runaway script cannot take the host down with it.
    pub fn new(store: Arc<dyn StoreService>) -> Result<Self, ScriptError> {
        let runtime = Runtime::new()?;
        runtime.set_memory_limit(64 * 1024 * 1024);
        runtime.set_max_stack_size(1024 * 1024);
        Ok(Self { runtime, store })
    }

    /// Runs a request's pre-request script and returns the environment
    /// snapshot after the script's mutations.
    ///
    /// An absent or blank script succeeds with an empty map.
    pub fn run_pre_request(&self, request: &ApiRequest) -> ScriptResult<HashMap<String, String>> {
        let script = match script_text(&request.pre_request_script) {
            Some(script) => script,
            None => return ScriptResult::ok(HashMap::new()),
        };

        let sandbox = self.sandbox(request, None, "pre-request");
        let execution = self.execute(&sandbox, script);
        ScriptResult {
            success: execution.success,
            data: Some(execution.harvest.environment),
            error: execution.error,
            logs: execution.harvest.logs,
        }
    }

    /// Runs a request's test script against a response and returns the
    /// recorded test results.
    ///
    /// A top-level throw yields `success == false` but keeps the results
    /// recorded before the throw. An absent or blank script succeeds with no
    /// results.
    pub fn run_test(
        &self,
        request: &ApiRequest,
        response: &ApiResponse,
    ) -> ScriptResult<Vec<TestResult>> {
        let script = match script_text(&request.test_script) {
            Some(script) => script,
            None => return ScriptResult::ok(Vec::new()),
        };

        let sandbox = self.sandbox(request, Some(response), "test");
        let execution = self.execute(&sandbox, script);
        ScriptResult {
            success: execution.success,
            data: Some(execution.harvest.tests),
            error: execution.error,
            logs: execution.harvest.logs,
        }
    }

    /// Checks whether a script compiles, without running it.
    ///
    /// The script is compiled inside the same `(function (pm, console))`
    /// wrapper it would execute in. The error carries a best-effort line
    /// number (relative to the user script) when the engine reported one.
    pub fn validate_syntax(&self, script: &str) -> SyntaxCheck {
        let context = match Context::full(&self.runtime) {
            Ok(context) => context,
            Err(e) => return SyntaxCheck::invalid(e.to_string()),
        };

        context.with(|ctx| {
            let wrapped = format!("(function (pm, console) {{\n{}\n}})", script);
            match ctx.eval::<Value, _>(wrapped.as_bytes()) {
                Ok(_) => SyntaxCheck::valid(),
                Err(e) => SyntaxCheck::invalid(syntax_error_message(&ctx, e)),
            }
        })
    }

    fn sandbox(
        &self,
        request: &ApiRequest,
        response: Option<&ApiResponse>,
        phase: &'static str,
    ) -> SandboxContext {
        let mut headers = HashMap::new();
        for pair in request.enabled_headers() {
            headers.insert(pair.key.clone(), pair.value.clone());
        }

        SandboxContext {
            phase,
            request: RequestSnapshot {
                method: request.method.as_str().to_string(),
                url: request.url.clone(),
                headers,
                body: request.body.clone(),
            },
            response: response.map(|r| ResponseSnapshot {
                code: r.status,
                status: r.status_text.clone(),
                headers: r.headers.clone(),
                body: r.data.clone(),
                time: r.time,
                size: r.size,
            }),
            environment: self.store.environment_variables(),
            globals: builtin_variables(),
            info: RequestInfo {
                request_name: request.name.clone(),
                request_id: request.id.clone(),
            },
        }
    }

    fn execute(&self, sandbox: &SandboxContext, script: &str) -> Execution {
        let context_json = match serde_json::to_string(sandbox) {
            Ok(json) => json,
            Err(e) => return Execution::failed(e.to_string()),
        };
        let context = match Context::full(&self.runtime) {
            Ok(context) => context,
            Err(e) => return Execution::failed(e.to_string()),
        };

        context.with(|ctx| {
            if let Err(e) = ctx.globals().set("__airpost_context_json", context_json) {
                return Execution::failed(e.to_string());
            }
            if let Err(e) = ctx.eval::<Value, _>(PRELUDE.as_bytes()) {
                return Execution::failed(exception_message(&ctx, e));
            }

            let wrapped = format!(
                "(function (pm, console) {{\n{}\n}})(globalThis.__airpost.pm, globalThis.__airpost.console);",
                script
            );
            let error = ctx
                .eval::<Value, _>(wrapped.as_bytes())
                .err()
                .map(|e| exception_message(&ctx, e));

            let mut harvest = ctx
                .eval::<String, _>("JSON.stringify(globalThis.__airpost.harvest())".as_bytes())
                .ok()
                .and_then(|json| serde_json::from_str::<Harvest>(&json).ok())
                .unwrap_or_default();

            match error {
                Some(message) => {
                    harvest.logs.push(format!("Error: {}", message));
                    Execution {
                        success: false,
                        error: Some(message),
                        harvest,
                    }
                }
                None => Execution {
                    success: true,
                    error: None,
                    harvest,
                },
            }
        })
    }
}

fn script_text(script: &Option<String>) -> Option<&str> {
    script.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Extracts the thrown exception's message, falling back to the engine
/// error's own text.
fn exception_message(ctx: &Ctx<'_>, error: rquickjs::Error) -> String {
    if matches!(error, rquickjs::Error::Exception) {
        let caught = ctx.catch();
        if let Some(object) = caught.as_object() {
            if let Ok(message) = object.get::<_, String>("message") {
                return message;
            }
        }
        if let Some(text) = caught.as_string().and_then(|s| s.to_string().ok()) {
            return text;
        }
    }
    error.to_string()
}

/// Builds a syntax error message with a best-effort line number relative to
/// the user's script (the wrapper occupies the first line).
fn syntax_error_message(ctx: &Ctx<'_>, error: rquickjs::Error) -> String {
    let mut message = String::new();
    let mut stack = String::new();
    if matches!(error, rquickjs::Error::Exception) {
        let caught = ctx.catch();
        if let Some(object) = caught.as_object() {
            if let Ok(m) = object.get::<_, String>("message") {
                message = m;
            }
            if let Ok(s) = object.get::<_, String>("stack") {
                stack = s;
            }
        }
    }
    if message.is_empty() {
        message = error.to_string();
    }

    let line = LINE_NUMBER_REGEX
        .captures(&message)
        .or_else(|| LINE_NUMBER_REGEX.captures(&stack))
        .and_then(|caps| caps[1].parse::<usize>().ok())
        .map(|n| n.saturating_sub(1).max(1));

    match line {
        Some(n) => format!("line {}: {}", n, message),
        None => message,
    }
}
