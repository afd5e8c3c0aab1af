//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use agora_core::feed::DEFAULT_PAGE_SIZE;

const DEFAULT_VIEWER: &str = "kernel_panic";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Feed page size used when a request gives no `limit`.
    pub feed_page_size: usize,
    /// How often expired polls are closed.
    pub poll_sweep_interval: Duration,
    /// Load the bundled fixtures into the stores on startup.
    pub seed_fixtures: bool,
    /// Handle of the user the server acts for: the sender of their messages
    /// and the owner of their block list.
    pub viewer: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            feed_page_size: DEFAULT_PAGE_SIZE,
            poll_sweep_interval: Duration::from_secs(30),
            seed_fixtures: true,
            viewer: DEFAULT_VIEWER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            feed_page_size: parsed::<usize>("FEED_PAGE_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(defaults.feed_page_size),
            poll_sweep_interval: parsed("POLL_SWEEP_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_sweep_interval),
            seed_fixtures: env::var("SEED_FIXTURES")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.seed_fixtures),
            viewer: env::var("VIEWER")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.viewer),
        }
    }
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
