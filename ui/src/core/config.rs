//! Service endpoint configuration.
//!
//! Injected into the remote clients rather than read from ambient globals,
//! so tests can point them at a stub endpoint.

/// Default origin of the explanation service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Upper bound on a single explanation round-trip before it is treated as
/// unavailable.
pub const DEFAULT_EXPLAIN_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Origin the `/api/detect-language` and `/api/explain` routes hang off.
    pub base_url: String,
    /// Bounded wait for the explanation call, in milliseconds.
    pub explain_timeout_ms: u64,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            explain_timeout_ms: DEFAULT_EXPLAIN_TIMEOUT_MS,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
