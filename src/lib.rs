//! Airpost core: the request execution and scripting engine of an API
//! testing client.
//!
//! The crate takes a stored request description — URL, header and parameter
//! rows, body, auth, attached scripts, all of which may contain
//! `{{variable}}` placeholders — and turns it into a dispatched HTTP request
//! and a normalized response:
//!
//! 1. [`variables`] resolves placeholders against the active environment and
//!    built-in dynamic variables.
//! 2. [`executor`] builds the transport request (URL, headers, auth, body
//!    encoding), sends it, and normalizes the result; transport failures
//!    become failure-shaped responses instead of errors.
//! 3. [`scripting`] runs the request's test script in an embedded QuickJS
//!    runtime and attaches the recorded test results to the response.
//!
//! [`store`] provides the persistence layer (collections, environments,
//! history, settings) the pipeline reads from; a GUI shell owns the store
//! and calls [`Dispatcher::send`] per user action.
//!
//! # Examples
//!
//! ```no_run
//! use airpost::executor::Dispatcher;
//! use airpost::models::{ApiRequest, HttpMethod};
//! use airpost::store::InMemoryStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::new());
//! let dispatcher = Dispatcher::new(store)?;
//!
//! let request = ApiRequest::new("ping", HttpMethod::GET, "https://api.example.com/ping");
//! let response = dispatcher.send(&request).await?;
//! println!("{} {}", response.status, response.status_text);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod executor;
pub mod models;
pub mod scripting;
pub mod store;
pub mod variables;

pub use executor::{DispatchError, Dispatcher};
pub use models::{ApiRequest, ApiResponse, HttpMethod};
pub use scripting::{ScriptEngine, ScriptResult};
pub use store::{InMemoryStore, StoreService};
pub use variables::VariableResolver;
