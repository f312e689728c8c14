//! The slice of the host's incoming request that the tools need.

use std::collections::HashMap;

/// Adapter over the host platform's request object.
pub trait HostRequest: Send + Sync {
    /// Header value by name. Lookup is case-insensitive.
    fn header(&self, name: &str) -> Option<String>;

    /// Base URL the request arrived on, e.g. `http://192.168.1.10:8080/`.
    fn base_url(&self) -> String;
}

/// Token from an `Authorization: Bearer <token>` header, if present and
/// non-empty.
pub fn bearer_token(request: Option<&dyn HostRequest>) -> Option<String> {
    let header = request?.header("Authorization")?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// In-memory request, used by the CLI and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRequest {
    headers: HashMap<String, String>,
    base_url: String,
}

impl StaticRequest {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            headers: HashMap::new(),
            base_url: base_url.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {token}"))
    }
}

impl HostRequest for StaticRequest {
    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn base_url(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extracted() {
        let req = StaticRequest::new("http://host/").with_bearer("abc123");
        assert_eq!(bearer_token(Some(&req)), Some("abc123".into()));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = StaticRequest::new("").with_header("authorization", "Bearer t");
        assert_eq!(req.header("Authorization"), Some("Bearer t".into()));
        assert_eq!(bearer_token(Some(&req)), Some("t".into()));
    }

    #[test]
    fn test_missing_or_malformed_token() {
        assert_eq!(bearer_token(None), None);

        let no_header = StaticRequest::new("http://host/");
        assert_eq!(bearer_token(Some(&no_header)), None);

        let basic = StaticRequest::new("").with_header("Authorization", "Basic dXNlcg==");
        assert_eq!(bearer_token(Some(&basic)), None);

        let empty = StaticRequest::new("").with_header("Authorization", "Bearer ");
        assert_eq!(bearer_token(Some(&empty)), None);
    }
}
