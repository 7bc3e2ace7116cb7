//! Basic HTTP authentication encoding.
//!
//! Encodes username/password credentials into an Authorization header value
//! according to RFC 7617.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Encodes username and password into a Basic authentication header value.
///
/// The credentials are joined with a colon, base64-encoded, and prefixed
/// with `Basic `.
///
/// # Arguments
///
/// * `username` - The username for authentication
/// * `password` - The password for authentication (may be empty)
///
/// # Examples
///
/// ```
/// use airpost::auth::basic::basic_auth;
///
/// let auth_header = basic_auth("user", "pass123");
/// assert_eq!(auth_header, "Basic dXNlcjpwYXNzMTIz");
/// ```
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    let encoded = STANDARD.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_simple() {
        assert_eq!(basic_auth("user", "pass"), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_basic_auth_empty_password() {
        assert_eq!(basic_auth("user", ""), "Basic dXNlcjo=");
    }

    #[test]
    fn test_basic_auth_with_special_chars() {
        let result = basic_auth("admin@example.com", "p@ss:w0rd!");
        assert!(result.starts_with("Basic "));
        let encoded = result.strip_prefix("Basic ").unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "admin@example.com:p@ss:w0rd!");
    }

    #[test]
    fn test_basic_auth_unicode() {
        let result = basic_auth("用户", "密码🔒");
        let encoded = result.strip_prefix("Basic ").unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "用户:密码🔒");
    }
}
