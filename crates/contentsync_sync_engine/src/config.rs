//! Configuration for the management API client.

use std::time::Duration;

/// Default management API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.contentful.com";

/// Connection settings for [`ContentfulClient`](crate::ContentfulClient).
#[derive(Debug, Clone)]
pub struct ContentfulConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Space identifier.
    pub space_id: String,
    /// Environment items are read from.
    pub source_environment: String,
    /// Environment items are written to.
    pub target_environment: String,
    /// Management API token.
    pub access_token: String,
    /// Per-request timeout, passed on to the HTTP client.
    pub timeout: Duration,
}

impl ContentfulConfig {
    /// Creates a configuration for one space.
    pub fn new(space_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            space_id: space_id.into(),
            source_environment: "master".to_string(),
            target_environment: String::new(),
            access_token: access_token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the source environment.
    pub fn with_source_environment(mut self, environment: impl Into<String>) -> Self {
        self.source_environment = environment.into();
        self
    }

    /// Sets the target environment.
    pub fn with_target_environment(mut self, environment: impl Into<String>) -> Self {
        self.target_environment = environment.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the space.
    pub fn space_url(&self) -> String {
        format!("{}/spaces/{}", self.base_url, self.space_id)
    }

    /// URL of an environment in the space.
    pub fn environment_url(&self, environment: &str) -> String {
        format!("{}/environments/{}", self.space_url(), environment)
    }
}

impl Default for ContentfulConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contentful_config_builder() {
        let config = ContentfulConfig::new("space1", "token")
            .with_base_url("http://localhost:8080/")
            .with_source_environment("staging")
            .with_target_environment("production")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.source_environment, "staging");
        assert_eq!(config.target_environment, "production");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.environment_url("staging"),
            "http://localhost:8080/spaces/space1/environments/staging"
        );
    }

    #[test]
    fn contentful_config_defaults() {
        let config = ContentfulConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.source_environment, "master");
        assert!(config.target_environment.is_empty());
    }
}
