//! Transport request construction.
//!
//! Turns a resolved request into a concrete [`TransportRequest`]: the final
//! URL with query parameters appended, the effective header map with auth
//! applied, and the encoded body. Construction never fails; malformed input
//! degrades to the most literal interpretation (an unparseable URL is sent
//! as-is, invalid JSON is sent as raw text) so the user sees the server's
//! reaction instead of a client-side error.

use crate::auth::apply_auth;
use crate::models::{ApiRequest, AppSettings, BodyType, HttpMethod, KeyValuePair};
use crate::variables::ResolvedRequest;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use url::form_urlencoded;
use url::Url;

/// An encoded request body, ready for the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A JSON document, sent with `application/json`.
    Json(Value),
    /// Multipart form fields (text values only).
    Form(Vec<(String, String)>),
    /// A percent-encoded `k=v&...` string, sent with
    /// `application/x-www-form-urlencoded`.
    UrlEncoded(String),
    /// Verbatim text.
    Raw(String),
}

/// A fully constructed request: everything the transport needs to send.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,

    /// Final URL, scheme-prefixed with enabled query parameters appended.
    pub url: String,

    /// Effective headers after last-write-wins merging and auth application.
    pub headers: HashMap<String, String>,

    /// Encoded body, absent for bodyless requests.
    pub body: Option<RequestBody>,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// Builds transport requests from resolved request descriptions.
pub struct RequestBuilder;

impl RequestBuilder {
    /// Constructs a [`TransportRequest`] from a request and its resolved
    /// text parts.
    ///
    /// `request` supplies the method, body type, and auth configuration;
    /// `resolved` supplies the substituted URL, rows, and body text.
    pub fn build(
        request: &ApiRequest,
        resolved: &ResolvedRequest,
        settings: &AppSettings,
    ) -> TransportRequest {
        let url = build_url(&resolved.url, &resolved.params);

        let mut headers = HashMap::new();
        for pair in resolved
            .headers
            .iter()
            .filter(|h| h.enabled && !h.key.is_empty())
        {
            headers.insert(pair.key.clone(), pair.value.clone());
        }

        if let Some(auth) = &request.auth {
            headers = apply_auth(auth, &headers);
        }

        let body = encode_body(request.body_type, &resolved.body, &mut headers);

        TransportRequest {
            method: request.method,
            url,
            headers,
            body,
            timeout: Duration::from_millis(settings.request_timeout),
        }
    }
}

/// Builds the final URL: prefixes `https://` when the scheme is missing and
/// appends the enabled parameter rows in order.
///
/// When the base does not parse as a URL the base is returned unchanged (the
/// transport will surface the real error); without enabled parameters the
/// base is returned without a re-serialization pass.
fn build_url(base: &str, params: &[KeyValuePair]) -> String {
    let base = if base.starts_with("http") {
        base.to_string()
    } else {
        format!("https://{}", base)
    };

    let enabled: Vec<&KeyValuePair> = params
        .iter()
        .filter(|p| p.enabled && !p.key.is_empty())
        .collect();
    if enabled.is_empty() {
        return base;
    }

    match Url::parse(&base) {
        Ok(mut url) => {
            {
                let mut pairs = url.query_pairs_mut();
                for param in &enabled {
                    pairs.append_pair(&param.key, &param.value);
                }
            }
            url.to_string()
        }
        Err(_) => base,
    }
}

/// Encodes the body text according to the selected body type.
///
/// Urlencoded bodies set their Content-Type here, overriding any user row,
/// because the encoded payload is only valid under that type.
fn encode_body(
    body_type: BodyType,
    text: &str,
    headers: &mut HashMap<String, String>,
) -> Option<RequestBody> {
    if text.is_empty() || body_type == BodyType::None {
        return None;
    }

    match body_type {
        BodyType::None => None,
        BodyType::Json => Some(match serde_json::from_str::<Value>(text) {
            Ok(value) => RequestBody::Json(value),
            Err(_) => RequestBody::Raw(text.to_string()),
        }),
        BodyType::FormData => {
            let fields: Vec<(String, String)> = match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => map
                    .into_iter()
                    .map(|(key, value)| (key, form_field_value(&value)))
                    .collect(),
                _ => form_urlencoded::parse(text.as_bytes()).into_owned().collect(),
            };
            Some(RequestBody::Form(fields))
        }
        BodyType::XWwwFormUrlencoded => {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in form_urlencoded::parse(text.as_bytes()) {
                serializer.append_pair(&key, &value);
            }
            headers.insert(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            );
            Some(RequestBody::UrlEncoded(serializer.finish()))
        }
        BodyType::Raw => Some(RequestBody::Raw(text.to_string())),
    }
}

fn form_field_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extracts the query parameters of a URL as a map.
///
/// A missing scheme is tolerated the same way the builder tolerates it;
/// anything unparseable yields an empty map.
pub fn parse_url_params(url: &str) -> HashMap<String, String> {
    let candidate = if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };
    match Url::parse(&candidate) {
        Ok(parsed) => parsed.query_pairs().into_owned().collect(),
        Err(_) => HashMap::new(),
    }
}
