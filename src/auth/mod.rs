//! Authentication configuration and header application.
//!
//! This module models the `auth` block of a request as a tagged union over
//! the auth type, with a strongly-typed payload per variant, and applies the
//! automatic schemes (Basic, Bearer) to outgoing headers.
//!
//! OAuth2 and AWS Signature v4 configurations are stored but never applied
//! automatically: the OAuth2 token-acquisition flow is user-driven, and the
//! resulting access token must be wired into a Bearer auth or header by the
//! user. This asymmetry mirrors the client's documented behavior and is
//! intentional.

pub mod basic;
pub mod bearer;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Payload for Basic authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicAuthData {
    /// Username; the scheme is skipped entirely when empty.
    pub username: String,

    /// Password; an empty password is allowed.
    pub password: String,

    /// When `Some(false)`, the Authorization header is not injected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_headers: Option<bool>,
}

/// Payload for Bearer token authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BearerAuthData {
    /// The token; the scheme is skipped entirely when empty.
    pub token: String,

    /// When `Some(false)`, the Authorization header is not injected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_headers: Option<bool>,
}

/// Payload for OAuth2 configuration and token state.
///
/// The token exchange itself happens in the shell (user-interactive); the
/// core only stores the resulting state. Nothing here is applied to headers
/// automatically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OAuth2Data {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_pkce: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Payload for AWS Signature v4 configuration (stored only, never applied).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AwsSig4Data {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// Authentication configuration for a request, discriminated by type.
///
/// The wire format is `{ "type": "...", "data": { ... } }` with a loosely
/// typed `data` object; unknown or malformed payload fields fall back to the
/// variant's defaults rather than failing deserialization, so old or
/// hand-edited exports stay importable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AuthConfigWire", into = "AuthConfigWire")]
pub enum AuthConfig {
    /// No authentication.
    None,
    /// HTTP Basic authentication (RFC 7617), applied automatically.
    Basic(BasicAuthData),
    /// Bearer token authentication (RFC 6750), applied automatically.
    Bearer(BearerAuthData),
    /// OAuth2 configuration; never applied automatically.
    OAuth2(OAuth2Data),
    /// AWS Signature v4 configuration; never applied automatically.
    AwsSig4(AwsSig4Data),
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig::None
    }
}

impl AuthConfig {
    /// Returns the wire-format discriminant for this configuration.
    pub fn type_name(&self) -> &'static str {
        match self {
            AuthConfig::None => "none",
            AuthConfig::Basic(_) => "basic",
            AuthConfig::Bearer(_) => "bearer",
            AuthConfig::OAuth2(_) => "oauth2",
            AuthConfig::AwsSig4(_) => "aws-sig4",
        }
    }
}

/// Wire representation of [`AuthConfig`]: a `type` discriminant plus a
/// loosely typed `data` object.
#[derive(Serialize, Deserialize)]
struct AuthConfigWire {
    #[serde(rename = "type")]
    auth_type: String,
    #[serde(default)]
    data: Value,
}

impl From<AuthConfigWire> for AuthConfig {
    fn from(wire: AuthConfigWire) -> Self {
        fn payload<T: Default + serde::de::DeserializeOwned>(data: Value) -> T {
            serde_json::from_value(data).unwrap_or_default()
        }

        match wire.auth_type.as_str() {
            "basic" => AuthConfig::Basic(payload(wire.data)),
            "bearer" => AuthConfig::Bearer(payload(wire.data)),
            "oauth2" => AuthConfig::OAuth2(payload(wire.data)),
            "aws-sig4" => AuthConfig::AwsSig4(payload(wire.data)),
            _ => AuthConfig::None,
        }
    }
}

impl From<AuthConfig> for AuthConfigWire {
    fn from(config: AuthConfig) -> Self {
        fn wire<T: Serialize>(auth_type: &str, data: &T) -> AuthConfigWire {
            AuthConfigWire {
                auth_type: auth_type.to_string(),
                data: serde_json::to_value(data).unwrap_or(Value::Null),
            }
        }

        match &config {
            AuthConfig::None => AuthConfigWire {
                auth_type: "none".to_string(),
                data: Value::Object(serde_json::Map::new()),
            },
            AuthConfig::Basic(data) => wire("basic", data),
            AuthConfig::Bearer(data) => wire("bearer", data),
            AuthConfig::OAuth2(data) => wire("oauth2", data),
            AuthConfig::AwsSig4(data) => wire("aws-sig4", data),
        }
    }
}

/// Applies an authentication configuration to a header map.
///
/// Returns a new map; the input is never mutated. Only Basic and Bearer are
/// injected automatically, and either can be suppressed by setting
/// `addHeaders` to `false`. Basic is skipped when the username is empty,
/// Bearer when the token is empty. OAuth2 and AWS Signature v4 never inject
/// headers here.
///
/// # Examples
///
/// ```
/// use airpost::auth::{apply_auth, AuthConfig, BasicAuthData};
/// use std::collections::HashMap;
///
/// let auth = AuthConfig::Basic(BasicAuthData {
///     username: "u".to_string(),
///     password: "p".to_string(),
///     add_headers: None,
/// });
/// let headers = apply_auth(&auth, &HashMap::new());
/// assert_eq!(headers.get("Authorization").unwrap(), "Basic dTpw");
/// ```
pub fn apply_auth(
    auth: &AuthConfig,
    headers: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut new_headers = headers.clone();

    match auth {
        AuthConfig::Basic(data) if data.add_headers != Some(false) => {
            if !data.username.is_empty() {
                new_headers.insert(
                    "Authorization".to_string(),
                    basic::basic_auth(&data.username, &data.password),
                );
            }
        }
        AuthConfig::Bearer(data) if data.add_headers != Some(false) => {
            if !data.token.is_empty() {
                new_headers.insert("Authorization".to_string(), bearer::bearer_token(&data.token));
            }
        }
        // oauth2 / aws-sig4 / addHeaders=false: the caller is responsible for
        // wiring any token into headers manually.
        _ => {}
    }

    new_headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_basic_auth() {
        let auth = AuthConfig::Basic(BasicAuthData {
            username: "u".to_string(),
            password: "p".to_string(),
            add_headers: None,
        });
        let headers = apply_auth(&auth, &HashMap::new());
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Basic dTpw"));
    }

    #[test]
    fn test_apply_basic_auth_empty_password() {
        let auth = AuthConfig::Basic(BasicAuthData {
            username: "user".to_string(),
            password: String::new(),
            add_headers: None,
        });
        let headers = apply_auth(&auth, &HashMap::new());
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Basic dXNlcjo="));
    }

    #[test]
    fn test_apply_basic_auth_missing_username_skipped() {
        let auth = AuthConfig::Basic(BasicAuthData::default());
        let headers = apply_auth(&auth, &HashMap::new());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_apply_bearer_auth() {
        let auth = AuthConfig::Bearer(BearerAuthData {
            token: "T".to_string(),
            add_headers: None,
        });
        let headers = apply_auth(&auth, &HashMap::new());
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer T"));
    }

    #[test]
    fn test_add_headers_false_suppresses_injection() {
        let auth = AuthConfig::Bearer(BearerAuthData {
            token: "T".to_string(),
            add_headers: Some(false),
        });
        let headers = apply_auth(&auth, &HashMap::new());
        assert!(!headers.contains_key("Authorization"));
    }

    #[test]
    fn test_oauth2_never_auto_applied() {
        let auth = AuthConfig::OAuth2(OAuth2Data {
            access_token: Some("token".to_string()),
            ..Default::default()
        });
        let headers = apply_auth(&auth, &HashMap::new());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_apply_auth_does_not_mutate_input() {
        let mut base = HashMap::new();
        base.insert("Accept".to_string(), "application/json".to_string());
        let auth = AuthConfig::Bearer(BearerAuthData {
            token: "T".to_string(),
            add_headers: None,
        });

        let result = apply_auth(&auth, &base);
        assert_eq!(base.len(), 1);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_wire_format_round_trip() {
        let auth = AuthConfig::Basic(BasicAuthData {
            username: "u".to_string(),
            password: "p".to_string(),
            add_headers: Some(true),
        });
        let json = serde_json::to_string(&auth).unwrap();
        assert!(json.contains("\"type\":\"basic\""));
        assert!(json.contains("\"addHeaders\":true"));

        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, auth);
    }

    #[test]
    fn test_wire_format_none() {
        let json = serde_json::to_string(&AuthConfig::None).unwrap();
        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, AuthConfig::None);

        // type alone, no data object
        let parsed: AuthConfig = serde_json::from_str(r#"{"type":"none"}"#).unwrap();
        assert_eq!(parsed, AuthConfig::None);
    }

    #[test]
    fn test_wire_format_tolerates_malformed_data() {
        // data is a string instead of an object: fall back to defaults
        let parsed: AuthConfig = serde_json::from_str(r#"{"type":"bearer","data":"oops"}"#).unwrap();
        assert_eq!(parsed, AuthConfig::Bearer(BearerAuthData::default()));
    }

    #[test]
    fn test_wire_format_unknown_type_becomes_none() {
        let parsed: AuthConfig = serde_json::from_str(r#"{"type":"digest","data":{}}"#).unwrap();
        assert_eq!(parsed, AuthConfig::None);
    }

    #[test]
    fn test_oauth2_payload_round_trip() {
        let auth = AuthConfig::OAuth2(OAuth2Data {
            grant_type: Some("authorization_code".to_string()),
            client_id: Some("cid".to_string()),
            access_token: Some("at".to_string()),
            ..Default::default()
        });
        let json = serde_json::to_string(&auth).unwrap();
        assert!(json.contains("\"grantType\":\"authorization_code\""));

        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, auth);
    }
}
