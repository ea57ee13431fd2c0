//! Operator endpoints for the Connect flow.
//!
//! Values load with priority: env var > built-in default. The deep-link
//! base URLs and the catalog endpoint are operator-owned constants;
//! deployments point the SDK elsewhere (staging, self-hosted) via env.

use std::time::Duration;

use crate::types::Platform;

pub const DEFAULT_API_URL: &str = "https://watson.gandalf.network/public/gql";
pub const DEFAULT_IOS_BASE_URL: &str =
    "https://appclip.apple.com/id?p=network.gandalf.connect.Clip";
pub const DEFAULT_ANDROID_BASE_URL: &str = "https://auth.gandalf.network/connect";
pub const DEFAULT_UNIVERSAL_BASE_URL: &str = "https://auth.gandalf.network/connect";

const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;

/// Endpoint configuration for a [`crate::Connect`] builder and its catalog
/// client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectConfig {
    pub api_url: String,
    pub ios_base_url: String,
    pub android_base_url: String,
    pub universal_base_url: String,
    pub api_timeout: Duration,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ConnectConfig {
    /// Build a config from the environment, falling back to the production
    /// endpoints.
    pub fn from_env() -> Self {
        Self {
            api_url: optional_env("GANDALF_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            ios_base_url: optional_env("GANDALF_IOS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_IOS_BASE_URL.to_string()),
            android_base_url: optional_env("GANDALF_ANDROID_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ANDROID_BASE_URL.to_string()),
            universal_base_url: optional_env("GANDALF_UNIVERSAL_BASE_URL")
                .unwrap_or_else(|| DEFAULT_UNIVERSAL_BASE_URL.to_string()),
            api_timeout: optional_env("GANDALF_API_TIMEOUT_MS")
                .and_then(|raw| raw.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_millis(DEFAULT_API_TIMEOUT_MS)),
        }
    }

    /// Deep-link base URL for the given platform.
    pub fn base_url_for(&self, platform: Platform) -> &str {
        match platform {
            Platform::Ios => &self.ios_base_url,
            Platform::Android => &self.android_base_url,
            Platform::Universal => &self.universal_base_url,
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_dispatch_covers_every_platform() {
        let config = ConnectConfig {
            api_url: DEFAULT_API_URL.to_string(),
            ios_base_url: "https://ios.example".to_string(),
            android_base_url: "https://android.example".to_string(),
            universal_base_url: "https://universal.example".to_string(),
            api_timeout: Duration::from_secs(5),
        };

        assert_eq!(config.base_url_for(Platform::Ios), "https://ios.example");
        assert_eq!(config.base_url_for(Platform::Android), "https://android.example");
        assert_eq!(
            config.base_url_for(Platform::Universal),
            "https://universal.example"
        );
    }

    #[test]
    fn default_base_urls_parse() {
        for base in [
            DEFAULT_API_URL,
            DEFAULT_IOS_BASE_URL,
            DEFAULT_ANDROID_BASE_URL,
            DEFAULT_UNIVERSAL_BASE_URL,
        ] {
            assert!(url::Url::parse(base).is_ok(), "unparsable default: {base}");
        }
    }
}
