//! Configuration for the kubebot service.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default Slack Web API base URL.
pub const DEFAULT_SLACK_API_BASE_URL: &str = "https://slack.com/api";

/// Kubebot service configuration.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Slack bot token used for `chat.postMessage`.
    pub bot_token: Option<String>,
    /// Slack signing secret for request verification.
    pub signing_secret: Option<String>,
    /// Slack Web API base URL (overridable for tests and proxies).
    pub slack_api_base_url: String,
    /// Maximum age for request timestamps (default: 300 seconds).
    pub max_timestamp_age_secs: i64,
    /// Explicit kubeconfig file. `None` uses the kube-rs default resolution.
    pub kubeconfig_path: Option<PathBuf>,
    /// Upper bound for a single cluster API call.
    pub query_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("KUBEBOT_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            bot_token: env::var("SLACK_BOT_TOKEN").ok().filter(|s| !s.is_empty()),
            signing_secret: env::var("SLACK_SIGNING_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            slack_api_base_url: env::var("SLACK_API_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SLACK_API_BASE_URL.to_string()),
            max_timestamp_age_secs: env::var("SLACK_MAX_TIMESTAMP_AGE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            kubeconfig_path: env::var("KUBECONFIG_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            query_timeout: Duration::from_secs(
                env::var("KUBEBOT_QUERY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}

impl Config {
    /// Whether replies can be delivered at all.
    #[must_use]
    pub fn can_reply(&self) -> bool {
        self.bot_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "KUBEBOT_PORT",
        "SLACK_BOT_TOKEN",
        "SLACK_SIGNING_SECRET",
        "SLACK_API_BASE_URL",
        "SLACK_MAX_TIMESTAMP_AGE_SECS",
        "KUBECONFIG_PATH",
        "KUBEBOT_QUERY_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_default_config() {
        clear_env();

        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert!(config.bot_token.is_none());
        assert!(config.signing_secret.is_none());
        assert_eq!(config.slack_api_base_url, DEFAULT_SLACK_API_BASE_URL);
        assert_eq!(config.max_timestamp_age_secs, 300);
        assert!(config.kubeconfig_path.is_none());
        assert_eq!(config.query_timeout, Duration::from_secs(10));
        assert!(!config.can_reply());
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();

        env::set_var("KUBEBOT_PORT", "9000");
        env::set_var("SLACK_BOT_TOKEN", "xoxb-test");
        env::set_var("SLACK_SIGNING_SECRET", "shh");
        env::set_var("KUBECONFIG_PATH", "/etc/kube/config");
        env::set_var("KUBEBOT_QUERY_TIMEOUT_SECS", "3");

        let config = Config::default();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bot_token.as_deref(), Some("xoxb-test"));
        assert_eq!(config.signing_secret.as_deref(), Some("shh"));
        assert_eq!(
            config.kubeconfig_path,
            Some(PathBuf::from("/etc/kube/config"))
        );
        assert_eq!(config.query_timeout, Duration::from_secs(3));
        assert!(config.can_reply());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_secrets_are_ignored() {
        clear_env();

        env::set_var("SLACK_BOT_TOKEN", "");
        env::set_var("SLACK_SIGNING_SECRET", "");
        env::set_var("KUBEBOT_PORT", "not-a-port");

        let config = Config::default();
        assert!(config.bot_token.is_none());
        assert!(config.signing_secret.is_none());
        assert_eq!(config.port, 3000);

        clear_env();
    }
}
