use serde::{Deserialize, Serialize};

/// The unit of isolation for concurrency control: one chat server's
/// music session.
#[derive(Eq, PartialEq, Clone, Hash, Debug, Serialize, Deserialize)]
pub(crate) struct GuildId(pub(crate) u64);

impl std::fmt::Display for GuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for GuildId {
    fn from(value: u64) -> Self {
        GuildId(value)
    }
}

/// Caller-supplied search text or URL. Immutable once created.
#[derive(Clone, Debug)]
pub(crate) struct Query(String);

impl Query {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_url(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod query_tests {
    use super::Query;

    #[test]
    fn recognizes_urls() {
        assert!(Query::new("https://vid.example/watch?v=abc").is_url());
        assert!(Query::new("http://vid.example/watch?v=abc").is_url());
    }

    #[test]
    fn free_text_is_not_a_url() {
        assert!(!Query::new("robert miles children").is_url());
        assert!(!Query::new("httpd configuration tutorial").is_url());
    }
}
