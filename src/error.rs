//! Error types for the Connect SDK.

use serde::Serialize;

/// Stable machine-checkable code for every error the SDK surfaces.
///
/// Callers branch on the code (or the [`ConnectError`] variant itself);
/// message text is pinned for compatibility but is not the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectErrorCode {
    DataKeyNotFound,
    InvalidPublicKey,
    InvalidService,
    InvalidRedirectUrl,
    InvalidBaseUrl,
    Api,
}

impl ConnectErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DataKeyNotFound => "data_key_not_found",
            Self::InvalidPublicKey => "invalid_public_key",
            Self::InvalidService => "invalid_service",
            Self::InvalidRedirectUrl => "invalid_redirect_url",
            Self::InvalidBaseUrl => "invalid_base_url",
            Self::Api => "api",
        }
    }
}

/// Top-level error type for the SDK.
///
/// Validation stops at the first failing check; no partial results are
/// returned and a failure never leaves a builder verified.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Public key does not exist")]
    InvalidPublicKey,

    #[error("Invalid redirectURL")]
    InvalidRedirectUrl,

    /// Unsupported service/trait/activity names, a service with neither
    /// traits nor activities, cardinality violations, or a request with no
    /// required service. The message names every offending value.
    #[error("{0}")]
    InvalidService(String),

    #[error("Invalid base URL")]
    InvalidBaseUrl,

    #[error("Datakey not found in the URL {0}")]
    DataKeyNotFound(String),

    /// Catalog transport failure surfaced from the snapshot fetch.
    #[error("Catalog API error: {0}")]
    Api(#[from] ApiError),
}

impl ConnectError {
    pub fn code(&self) -> ConnectErrorCode {
        match self {
            Self::InvalidPublicKey => ConnectErrorCode::InvalidPublicKey,
            Self::InvalidRedirectUrl => ConnectErrorCode::InvalidRedirectUrl,
            Self::InvalidService(_) => ConnectErrorCode::InvalidService,
            Self::InvalidBaseUrl => ConnectErrorCode::InvalidBaseUrl,
            Self::DataKeyNotFound(_) => ConnectErrorCode::DataKeyNotFound,
            Self::Api(_) => ConnectErrorCode::Api,
        }
    }
}

/// Failures talking to the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GraphQL error: {0}")]
    Graphql(String),

    #[error("Malformed response payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ConnectErrorCode::InvalidPublicKey.as_str(), "invalid_public_key");
        assert_eq!(ConnectErrorCode::DataKeyNotFound.as_str(), "data_key_not_found");
        assert_eq!(ConnectErrorCode::Api.as_str(), "api");
    }

    #[test]
    fn messages_match_pinned_wording() {
        assert_eq!(
            ConnectError::InvalidPublicKey.to_string(),
            "Public key does not exist"
        );
        assert_eq!(ConnectError::InvalidRedirectUrl.to_string(), "Invalid redirectURL");
        assert_eq!(ConnectError::InvalidBaseUrl.to_string(), "Invalid base URL");
        assert_eq!(
            ConnectError::DataKeyNotFound("https://example.com/callback".to_string()).to_string(),
            "Datakey not found in the URL https://example.com/callback"
        );
    }

    #[test]
    fn code_follows_variant() {
        let err = ConnectError::InvalidService("whatever".to_string());
        assert_eq!(err.code(), ConnectErrorCode::InvalidService);
        assert_eq!(
            ConnectError::InvalidPublicKey.code(),
            ConnectErrorCode::InvalidPublicKey
        );
    }
}
