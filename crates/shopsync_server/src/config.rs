//! Server configuration.

/// Configuration for the synchronization server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Page cap for change feed downloads. Clients may request less, never
    /// more.
    pub page_limit: usize,
    /// Page cap for audit log downloads. The audit table grows without
    /// bound, so its cap is tighter.
    pub audit_page_limit: usize,
    /// Maximum rows accepted in one upload batch.
    pub max_upload_batch: usize,
}

impl ServerConfig {
    /// Creates a configuration with the defaults.
    pub fn new() -> Self {
        Self {
            page_limit: 1000,
            audit_page_limit: 500,
            max_upload_batch: 500,
        }
    }

    /// Sets the change feed page cap.
    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit;
        self
    }

    /// Sets the audit log page cap.
    pub fn with_audit_page_limit(mut self, limit: usize) -> Self {
        self.audit_page_limit = limit;
        self
    }

    /// Sets the maximum upload batch size.
    pub fn with_max_upload_batch(mut self, max: usize) -> Self {
        self.max_upload_batch = max;
        self
    }

    /// Effective page size for a request: the client's ask clamped to the
    /// server cap.
    pub fn effective_limit(&self, requested: Option<usize>, cap: usize) -> usize {
        match requested {
            Some(limit) if limit > 0 => limit.min(cap),
            _ => cap,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.page_limit, 1000);
        assert_eq!(config.audit_page_limit, 500);
    }

    #[test]
    fn requested_limit_is_clamped() {
        let config = ServerConfig::default().with_page_limit(100);
        assert_eq!(config.effective_limit(Some(25), config.page_limit), 25);
        assert_eq!(config.effective_limit(Some(4000), config.page_limit), 100);
        assert_eq!(config.effective_limit(None, config.page_limit), 100);
        assert_eq!(config.effective_limit(Some(0), config.page_limit), 100);
    }
}
