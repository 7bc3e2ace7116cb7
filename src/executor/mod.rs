//! Request execution: transport request construction, dispatch, and
//! transport-failure classification.

pub mod builder;
pub mod dispatcher;
pub mod error;

pub use builder::{parse_url_params, RequestBody, RequestBuilder, TransportRequest};
pub use dispatcher::Dispatcher;
pub use error::{classify_transport_failure, DispatchError};
