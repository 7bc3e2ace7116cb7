//! API request data models.
//!
//! This module defines the logical request description authored by the user:
//! the HTTP method, URL template, header/param rows, body, authentication
//! configuration, and attached scripts. Fields may contain `{{variable}}`
//! placeholders that are resolved at send time.

use crate::auth::AuthConfig;
use crate::models::{generate_id, now_millis};
use serde::{Deserialize, Serialize};

/// HTTP request method.
///
/// The subset of RFC 7231 / RFC 5789 methods the client exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    GET,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP PATCH method - partially modify a resource
    PATCH,
    /// HTTP HEAD method - retrieve headers only
    HEAD,
    /// HTTP OPTIONS method - describe communication options
    OPTIONS,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    /// Parses a string into an HttpMethod.
    ///
    /// # Arguments
    ///
    /// * `s` - A string slice representing the HTTP method (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(HttpMethod)` if the string is a supported method, `None` otherwise.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request body encoding selected in the body editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyType {
    /// No body is sent.
    None,
    /// Body text is parsed as JSON; falls back to the raw string when invalid.
    Json,
    /// Body text describes multipart form fields (JSON object or `k=v&...`).
    FormData,
    /// Body text is `k=v&...` pairs re-encoded as a urlencoded form.
    XWwwFormUrlencoded,
    /// Body text is sent verbatim.
    Raw,
}

impl Default for BodyType {
    fn default() -> Self {
        BodyType::None
    }
}

/// A single row in a key-value editor.
///
/// The same shape is used for request headers, query parameters, and
/// environment values, so one editor component and one substitution rule
/// cover all three. Rows with `enabled == false` or an empty `key` are
/// ignored during request construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValuePair {
    /// Unique identifier for the row (used by the editor UI).
    pub id: String,

    /// The key; may contain `{{variable}}` placeholders.
    pub key: String,

    /// The value; may contain `{{variable}}` placeholders.
    pub value: String,

    /// Whether this row participates in request construction.
    pub enabled: bool,

    /// Optional free-form description shown in the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl KeyValuePair {
    /// Creates an enabled pair with a fresh id.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            key: key.into(),
            value: value.into(),
            enabled: true,
            description: None,
        }
    }
}

/// A logical API request as authored in the client.
///
/// This is the stored description, not a transport request: the URL, header
/// and parameter rows, and the body are all template strings that may contain
/// `{{variable}}` placeholders. The executor resolves variables and encodes
/// the body into a concrete transport request at send time, operating on a
/// copy so the stored request is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    /// Unique identifier for the request.
    pub id: String,

    /// Display name shown in the collection tree.
    pub name: String,

    /// HTTP method.
    pub method: HttpMethod,

    /// Target URL template. A missing scheme defaults to `https://` at send
    /// time.
    pub url: String,

    /// Header rows, in editor order.
    #[serde(default)]
    pub headers: Vec<KeyValuePair>,

    /// Query parameter rows, in editor order. Appended to the URL at send
    /// time, preserving insertion order.
    #[serde(default)]
    pub params: Vec<KeyValuePair>,

    /// Raw body template text, interpreted according to `body_type`.
    #[serde(default)]
    pub body: String,

    /// How the body text is encoded for transport.
    #[serde(default)]
    pub body_type: BodyType,

    /// Authentication configuration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Id of the owning collection (back-reference, not ownership).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,

    /// Id of the owning folder (back-reference, not ownership).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,

    /// Script executed before the request is sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_request_script: Option<String>,

    /// Script executed after the response is received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_script: Option<String>,

    /// Creation time, epoch milliseconds.
    pub created_at: i64,

    /// Last modification time, epoch milliseconds.
    pub updated_at: i64,
}

impl ApiRequest {
    /// Creates a new request with a fresh id and current timestamps.
    pub fn new(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: generate_id(),
            name: name.into(),
            method,
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            body: String::new(),
            body_type: BodyType::None,
            auth: None,
            collection_id: None,
            folder_id: None,
            pre_request_script: None,
            test_script: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the header rows that participate in request construction
    /// (enabled with a non-empty key), in editor order.
    pub fn enabled_headers(&self) -> impl Iterator<Item = &KeyValuePair> {
        self.headers.iter().filter(|h| h.enabled && !h.key.is_empty())
    }

    /// Returns the parameter rows that participate in request construction
    /// (enabled with a non-empty key), in editor order.
    pub fn enabled_params(&self) -> impl Iterator<Item = &KeyValuePair> {
        self.params.iter().filter(|p| p.enabled && !p.key.is_empty())
    }

    /// Checks whether the request has a non-empty body to send.
    pub fn has_body(&self) -> bool {
        !self.body.is_empty() && self.body_type != BodyType::None
    }
}
