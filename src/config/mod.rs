//! Configuration module for the anonymization rules backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream rule service
    pub upstream_url: String,
    /// Serve the built-in fixture dataset instead of calling the upstream
    pub use_fixtures: bool,
    /// Fall back to the fixture dataset for reads when the upstream is unreachable
    pub fixture_fallback: bool,
    /// Per-request timeout for upstream calls
    pub upstream_timeout: Duration,
    /// Idle time after which an edit session is discarded
    pub session_ttl: Duration,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let upstream_url = env::var("ANON_UPSTREAM_URL")
            .unwrap_or_else(|_| "http://localhost:3001".to_string())
            .trim_end_matches('/')
            .to_string();

        let use_fixtures = env_flag("ANON_USE_FIXTURES", false);
        let fixture_fallback = env_flag("ANON_FIXTURE_FALLBACK", true);

        let timeout_secs: u64 = env::var("ANON_UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|e| format!("Invalid ANON_UPSTREAM_TIMEOUT_SECS: {}", e))?;

        let session_ttl_secs: u64 = env::var("ANON_SESSION_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|e| format!("Invalid ANON_SESSION_TTL_SECS: {}", e))?;

        let bind_addr: SocketAddr = env::var("ANON_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| format!("Invalid ANON_BIND_ADDR format: {}", e))?;

        let log_level = env::var("ANON_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            upstream_url,
            use_fixtures,
            fixture_fallback,
            upstream_timeout: Duration::from_secs(timeout_secs),
            session_ttl: Duration::from_secs(session_ttl_secs),
            bind_addr,
            log_level,
        })
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("ANON_UPSTREAM_URL");
        env::remove_var("ANON_USE_FIXTURES");
        env::remove_var("ANON_FIXTURE_FALLBACK");
        env::remove_var("ANON_UPSTREAM_TIMEOUT_SECS");
        env::remove_var("ANON_SESSION_TTL_SECS");
        env::remove_var("ANON_BIND_ADDR");
        env::remove_var("ANON_LOG_LEVEL");

        let config = Config::from_env().unwrap();

        assert_eq!(config.upstream_url, "http://localhost:3001");
        assert!(!config.use_fixtures);
        assert!(config.fixture_fallback);
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_env_flag_parsing() {
        env::set_var("ANON_TEST_FLAG_ON", "TRUE");
        env::set_var("ANON_TEST_FLAG_OFF", "no");
        assert!(env_flag("ANON_TEST_FLAG_ON", false));
        assert!(!env_flag("ANON_TEST_FLAG_OFF", true));
        assert!(env_flag("ANON_TEST_FLAG_MISSING", true));
    }
}
