//! Variable substitution in request text.
//!
//! Replaces `{{name}}` placeholders in a single pass. Resolution order is
//! per-call overrides, then the active environment, then built-in dynamic
//! variables. Unknown placeholders are left verbatim so a missing variable
//! is visible in the outgoing request rather than silently erased.
//!
//! Substitution is deliberately non-recursive: a variable whose value itself
//! contains `{{...}}` is inserted as-is.

use crate::models::{ApiRequest, KeyValuePair};
use crate::store::StoreService;
use crate::variables::builtins::builtin_variables;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// Matches `{{name}}` placeholders. The name may contain surrounding
/// whitespace, which is trimmed before lookup.
static VARIABLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("variable regex is valid"));

/// Replaces `{{name}}` placeholders in `text` using the given variable maps.
///
/// Lookup order: `overrides`, then `environment`, then built-ins. Names are
/// trimmed before lookup. Unknown placeholders are preserved verbatim.
pub fn resolve_text(
    text: &str,
    environment: &HashMap<String, String>,
    overrides: &HashMap<String, String>,
) -> String {
    if !text.contains("{{") {
        return text.to_string();
    }

    let builtins = builtin_variables();
    VARIABLE_REGEX
        .replace_all(text, |caps: &regex::Captures| {
            let name = caps[1].trim();
            overrides
                .get(name)
                .or_else(|| environment.get(name))
                .or_else(|| builtins.get(name))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Checks whether `text` contains at least one `{{name}}` placeholder.
pub fn contains_variables(text: &str) -> bool {
    VARIABLE_REGEX.is_match(text)
}

/// Extracts the distinct placeholder names from `text`, trimmed, in order of
/// first occurrence.
pub fn extract_variable_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in VARIABLE_REGEX.captures_iter(text) {
        let name = caps[1].trim().to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// A request with all placeholders substituted, ready for the builder.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    /// The URL after substitution.
    pub url: String,

    /// All header rows (including disabled ones) after substitution.
    pub headers: Vec<KeyValuePair>,

    /// All query parameter rows (including disabled ones) after substitution.
    pub params: Vec<KeyValuePair>,

    /// The body after substitution.
    pub body: String,
}

/// Resolves request placeholders against the store's active environment.
pub struct VariableResolver {
    store: Arc<dyn StoreService>,
}

impl VariableResolver {
    /// Creates a resolver backed by the given store.
    pub fn new(store: Arc<dyn StoreService>) -> Self {
        Self { store }
    }

    /// Resolves placeholders in a single string against the active
    /// environment.
    pub fn resolve(&self, text: &str) -> String {
        self.resolve_with_overrides(text, &HashMap::new())
    }

    /// Resolves placeholders with per-call overrides taking precedence over
    /// the active environment.
    pub fn resolve_with_overrides(
        &self,
        text: &str,
        overrides: &HashMap<String, String>,
    ) -> String {
        let environment = self.store.environment_variables();
        resolve_text(text, &environment, overrides)
    }

    /// Resolves placeholders in every textual part of a request: the URL,
    /// all header and parameter rows, and the body.
    ///
    /// Disabled rows are substituted too; filtering them out is the
    /// builder's job, and keeping them substituted means toggling a row on
    /// in the editor shows the resolved value immediately.
    pub fn resolve_request(&self, request: &ApiRequest) -> ResolvedRequest {
        let environment = self.store.environment_variables();
        let overrides = HashMap::new();

        let substitute_pairs = |pairs: &[KeyValuePair]| {
            pairs
                .iter()
                .map(|pair| {
                    let mut resolved = pair.clone();
                    resolved.key = resolve_text(&pair.key, &environment, &overrides);
                    resolved.value = resolve_text(&pair.value, &environment, &overrides);
                    resolved
                })
                .collect()
        };

        ResolvedRequest {
            url: resolve_text(&request.url, &environment, &overrides),
            headers: substitute_pairs(&request.headers),
            params: substitute_pairs(&request.params),
            body: resolve_text(&request.body, &environment, &overrides),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpMethod;
    use crate::store::InMemoryStore;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_text_basic() {
        let environment = env(&[("baseUrl", "https://api.example.com")]);
        let result = resolve_text("{{baseUrl}}/users", &environment, &HashMap::new());
        assert_eq!(result, "https://api.example.com/users");
    }

    #[test]
    fn test_resolve_text_plain_string_unchanged() {
        let result = resolve_text("https://example.com", &HashMap::new(), &HashMap::new());
        assert_eq!(result, "https://example.com");
    }

    #[test]
    fn test_resolve_text_unknown_preserved() {
        let result = resolve_text("{{missing}}/path", &HashMap::new(), &HashMap::new());
        assert_eq!(result, "{{missing}}/path");
    }

    #[test]
    fn test_resolve_text_trims_names() {
        let environment = env(&[("token", "abc")]);
        let result = resolve_text("Bearer {{ token }}", &environment, &HashMap::new());
        assert_eq!(result, "Bearer abc");
    }

    #[test]
    fn test_resolve_text_overrides_win() {
        let environment = env(&[("host", "env")]);
        let overrides = env(&[("host", "override")]);
        let result = resolve_text("{{host}}", &environment, &overrides);
        assert_eq!(result, "override");
    }

    #[test]
    fn test_resolve_text_builtin() {
        let result = resolve_text("{{$timestamp}}", &HashMap::new(), &HashMap::new());
        assert!(result.parse::<i64>().is_ok());
    }

    #[test]
    fn test_resolve_text_environment_shadows_builtin() {
        let environment = env(&[("$timestamp", "fixed")]);
        let result = resolve_text("{{$timestamp}}", &environment, &HashMap::new());
        assert_eq!(result, "fixed");
    }

    #[test]
    fn test_resolve_text_not_recursive() {
        let environment = env(&[("a", "{{b}}"), ("b", "final")]);
        let result = resolve_text("{{a}}", &environment, &HashMap::new());
        assert_eq!(result, "{{b}}");
    }

    #[test]
    fn test_contains_variables() {
        assert!(contains_variables("{{x}}"));
        assert!(contains_variables("prefix {{ x }} suffix"));
        assert!(!contains_variables("no placeholders"));
        assert!(!contains_variables("{single}"));
        assert!(!contains_variables("{{unclosed"));
    }

    #[test]
    fn test_extract_variable_names_dedup_first_occurrence() {
        let names = extract_variable_names("{{a}}/{{b}}/{{ a }}");
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_extract_variable_names_empty() {
        assert!(extract_variable_names("nothing here").is_empty());
    }

    #[test]
    fn test_resolve_request_substitutes_all_parts() {
        let store = Arc::new(InMemoryStore::new());
        let mut environment = crate::models::Environment::new("dev");
        environment.set("baseUrl", "https://dev.example.com");
        environment.set("token", "t-123");
        let id = environment.id.clone();
        store.save_environment(environment).unwrap();
        store.set_active_environment(Some(&id)).unwrap();

        let mut request = ApiRequest::new("list", HttpMethod::GET, "{{baseUrl}}/items");
        request
            .headers
            .push(KeyValuePair::new("Authorization", "Bearer {{token}}"));
        let mut disabled = KeyValuePair::new("X-Debug", "{{token}}");
        disabled.enabled = false;
        request.headers.push(disabled);
        request.params.push(KeyValuePair::new("q", "{{missing}}"));
        request.body = r#"{"token": "{{token}}"}"#.to_string();

        let resolver = VariableResolver::new(store);
        let resolved = resolver.resolve_request(&request);

        assert_eq!(resolved.url, "https://dev.example.com/items");
        assert_eq!(resolved.headers[0].value, "Bearer t-123");
        // disabled rows are substituted too
        assert_eq!(resolved.headers[1].value, "t-123");
        assert!(!resolved.headers[1].enabled);
        assert_eq!(resolved.params[0].value, "{{missing}}");
        assert_eq!(resolved.body, r#"{"token": "t-123"}"#);
    }
}
