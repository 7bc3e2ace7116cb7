//! Bearer token authentication encoding.
//!
//! Formats tokens into an Authorization header value according to RFC 6750.

/// Formats a token into a Bearer authentication header value.
///
/// # Examples
///
/// ```
/// use airpost::auth::bearer::bearer_token;
///
/// assert_eq!(bearer_token("abc123"), "Bearer abc123");
/// ```
pub fn bearer_token(token: &str) -> String {
    format!("Bearer {}", token)
}
