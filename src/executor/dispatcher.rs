//! Request dispatch: variable resolution, transport, response normalization,
//! and script hooks.

use crate::executor::builder::{RequestBody, RequestBuilder, TransportRequest};
use crate::executor::error::{classify_transport_failure, DispatchError};
use crate::models::{ApiRequest, ApiResponse, HttpMethod};
use crate::scripting::ScriptEngine;
use crate::store::StoreService;
use crate::variables::VariableResolver;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Sends requests and normalizes whatever comes back into an
/// [`ApiResponse`].
///
/// A dispatch always produces a response when the request could be put on
/// the wire: transport failures are classified into a failure-shaped
/// response (status 0, human-readable status text) instead of erroring, so
/// the test script still runs and the response panel is never empty.
pub struct Dispatcher {
    client: reqwest::Client,
    store: Arc<dyn StoreService>,
    resolver: VariableResolver,
    engine: ScriptEngine,
}

impl Dispatcher {
    /// Creates a dispatcher over the given store.
    ///
    /// The transport client honors the store's `follow_redirects` setting at
    /// construction time; `request_timeout` is read per send.
    pub fn new(store: Arc<dyn StoreService>) -> Result<Self, DispatchError> {
        let settings = store.settings();
        let redirect = if settings.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        };
        let client = reqwest::Client::builder()
            .redirect(redirect)
            .build()
            .map_err(DispatchError::Client)?;
        let engine = ScriptEngine::new(store.clone())?;

        Ok(Self {
            client,
            resolver: VariableResolver::new(store.clone()),
            engine,
            store,
        })
    }

    /// Resolves, builds, sends, and normalizes one request.
    ///
    /// The pre-request script is syntax-checked before the send; an invalid
    /// script is logged and the send proceeds. The test script runs against
    /// the normalized response on both the success and failure paths, and
    /// its results are attached when the run produced any.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, DispatchError> {
        if let Some(script) = script_text(&request.pre_request_script) {
            let check = self.engine.validate_syntax(script);
            if !check.valid {
                log::warn!(
                    "pre-request script for '{}' has a syntax error: {}",
                    request.name,
                    check.error.unwrap_or_default()
                );
            }
        }

        let settings = self.store.settings();
        let resolved = self.resolver.resolve_request(request);
        let transport = RequestBuilder::build(request, &resolved, &settings);

        let started = Instant::now();
        let mut response = match self.execute(&transport).await {
            Ok(raw) => self.normalize(&request.id, raw, started).await,
            Err(e) if e.is_builder() => return Err(DispatchError::Build(e)),
            Err(e) => failure_response(&request.id, &e, started),
        };

        if let Some(_script) = script_text(&request.test_script) {
            let result = self.engine.run_test(request, &response);
            if let Some(tests) = result.data {
                if !tests.is_empty() {
                    response.test_results = Some(tests);
                }
            }
        }

        Ok(response)
    }

    async fn execute(&self, transport: &TransportRequest) -> Result<reqwest::Response, reqwest::Error> {
        let mut builder = self
            .client
            .request(to_reqwest_method(transport.method), &transport.url)
            .timeout(transport.timeout);

        for (key, value) in &transport.headers {
            builder = builder.header(key, value);
        }

        builder = match &transport.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => {
                let mut form = reqwest::multipart::Form::new();
                for (key, value) in fields {
                    form = form.text(key.clone(), value.clone());
                }
                builder.multipart(form)
            }
            Some(RequestBody::UrlEncoded(encoded)) => builder.body(encoded.clone()),
            Some(RequestBody::Raw(text)) => builder.body(text.clone()),
            None => builder,
        };

        builder.send().await
    }

    /// Converts a raw transport response into the normalized shape: lower-
    /// cased header keys, JSON-parsed-else-string body, byte size, elapsed
    /// time.
    async fn normalize(
        &self,
        request_id: &str,
        raw: reqwest::Response,
        started: Instant,
    ) -> ApiResponse {
        let status = raw.status().as_u16();
        let status_text = raw
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string();

        let mut headers = HashMap::new();
        for (key, value) in raw.headers() {
            headers.insert(
                key.as_str().to_lowercase(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        let content_type = headers
            .get("content-type")
            .cloned()
            .unwrap_or_else(|| "application/json".to_string());

        let mut response = ApiResponse::new(request_id, status, status_text);
        match raw.bytes().await {
            Ok(bytes) => {
                response.size = bytes.len();
                response.data = parse_body(&bytes);
            }
            Err(e) => {
                // Headers arrived but the body read failed mid-stream.
                let (_, text) = classify_transport_failure(&e);
                response.status_text = text;
            }
        }
        response.headers = headers;
        response.content_type = content_type;
        response.time = started.elapsed().as_millis() as u64;
        response
    }
}

/// Builds the failure-shaped response for a transport error.
fn failure_response(request_id: &str, error: &reqwest::Error, started: Instant) -> ApiResponse {
    let (status, status_text) = classify_transport_failure(error);
    let mut response = ApiResponse::new(request_id, status, status_text);
    response.time = started.elapsed().as_millis() as u64;
    response
}

/// Parses a response body: JSON when it parses, the raw text otherwise,
/// `null` when empty.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
        return value;
    }
    Value::String(String::from_utf8_lossy(bytes).into_owned())
}

fn script_text(script: &Option<String>) -> Option<&str> {
    script.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"{\"a\":1}"), serde_json::json!({"a": 1}));
        assert_eq!(parse_body(b"plain"), Value::String("plain".to_string()));
        // numbers are valid JSON on their own
        assert_eq!(parse_body(b"42"), serde_json::json!(42));
    }

    #[test]
    fn test_script_text_filters_blank() {
        assert_eq!(script_text(&None), None);
        assert_eq!(script_text(&Some(String::new())), None);
        assert_eq!(script_text(&Some("   \n".to_string())), None);
        assert_eq!(script_text(&Some(" x ".to_string())), Some("x"));
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(to_reqwest_method(HttpMethod::GET), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::PATCH), reqwest::Method::PATCH);
    }
}
