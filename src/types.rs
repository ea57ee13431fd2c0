//! Input and wire types for the Connect flow.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Service key reserved for Gandalf's own first-party data.
pub const GANDALF_SERVICE_KEY: &str = "gandalf";

/// Target platform for the generated deep link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Ios,
    Android,
    Universal,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Universal => "universal",
        }
    }
}

/// Per-service scope of a connect request: which traits and activities the
/// app is asking for, and whether the user must link this service for the
/// request to count as fulfilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl Default for Service {
    fn default() -> Self {
        Self {
            traits: Vec::new(),
            activities: Vec::new(),
            required: true,
        }
    }
}

impl Service {
    pub fn new(traits: Vec<String>, activities: Vec<String>) -> Self {
        Self {
            traits,
            activities,
            required: true,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// Requested services keyed by service name.
///
/// An ordered map keeps the encoded payload deterministic for identical
/// input.
pub type InputData = BTreeMap<String, Service>;

/// Styling hints forwarded verbatim into the encoded payload. Never
/// validated here; the companion app interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOptions {
    pub style: InputStyle,
}

/// Caller-supplied connect request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectInput {
    pub public_key: String,
    pub redirect_url: String,
    pub services: InputData,
    pub platform: Platform,
    pub options: Option<ConnectOptions>,
}

impl ConnectInput {
    pub fn new(
        public_key: impl Into<String>,
        redirect_url: impl Into<String>,
        services: InputData,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            redirect_url: redirect_url.into(),
            services,
            platform: Platform::default(),
            options: None,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_options(mut self, options: ConnectOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Current catalog snapshot: every supported service, trait, and activity
/// name, all lower-cased. Fetched fresh for each verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedServicesAndTraits {
    pub services: HashSet<String>,
    pub traits: HashSet<String>,
    pub activities: HashSet<String>,
}
