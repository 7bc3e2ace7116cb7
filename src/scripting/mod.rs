//! Pre-request and test script execution.
//!
//! Scripts are JavaScript, run in an embedded QuickJS runtime against a
//! `pm`-style API: `pm.environment`/`pm.globals`/`pm.variables` scopes,
//! `pm.request`/`pm.response` accessors, `pm.test` for recording results,
//! and a chainable `pm.expect` assertion surface. Console output is
//! captured per run.

pub mod context;
pub mod engine;

pub use context::{ScriptResult, SyntaxCheck};
pub use engine::{ScriptEngine, ScriptError};
