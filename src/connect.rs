//! Connect deep-link builder.
//!
//! Owns the one-shot verification gate and the deterministic encoding of a
//! validated request into a platform deep link. Verification talks to the
//! catalog once; the normalized result is held by the builder so repeated
//! encodes skip the remote round trip.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use url::Url;

use crate::api::{ApiService, CatalogApi};
use crate::config::ConnectConfig;
use crate::error::ConnectError;
use crate::types::{ConnectInput, ConnectOptions, InputData, SupportedServicesAndTraits};
use crate::validate;

/// Verification progress for a single builder.
///
/// Only `Verified` short-circuits the remote round trip; `Failed` records
/// the last unsuccessful attempt and never blocks a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum VerificationState {
    Pending,
    Verified(InputData),
    Failed,
}

/// Builder for a single Connect deep link.
///
/// Intended for at most one in-flight [`generate_url`](Connect::generate_url)
/// call at a time; the verification state is not synchronized.
#[derive(Debug)]
pub struct Connect<A: CatalogApi = ApiService> {
    input: ConnectInput,
    config: ConnectConfig,
    api: A,
    state: VerificationState,
}

impl Connect<ApiService> {
    /// Build against the configured (or default production) endpoints.
    pub fn new(input: ConnectInput) -> Result<Self, ConnectError> {
        let config = ConnectConfig::from_env();
        let api = ApiService::new(&config)?;
        Ok(Self::with_api_and_config(input, api, config))
    }

    /// Fetch the current catalog snapshot from the configured endpoints.
    pub async fn get_supported_services_and_traits()
    -> Result<SupportedServicesAndTraits, ConnectError> {
        let config = ConnectConfig::from_env();
        let api = ApiService::new(&config)?;
        Ok(api.get_supported_services_and_traits().await?)
    }
}

impl<A: CatalogApi> Connect<A> {
    /// Build with a caller-supplied catalog client.
    pub fn with_api(input: ConnectInput, api: A) -> Self {
        Self::with_api_and_config(input, api, ConnectConfig::from_env())
    }

    pub fn with_api_and_config(mut input: ConnectInput, api: A, config: ConnectConfig) -> Self {
        input.redirect_url = strip_trailing_slash(input.redirect_url);
        Self {
            input,
            config,
            api,
            state: VerificationState::Pending,
        }
    }

    pub fn input(&self) -> &ConnectInput {
        &self.input
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.state, VerificationState::Verified(_))
    }

    /// Replace the requested services and drop any prior verification.
    pub fn set_services(&mut self, services: InputData) {
        self.input.services = services;
        self.state = VerificationState::Pending;
    }

    /// Replace the redirect URL (normalized the same way as construction)
    /// and drop any prior verification.
    pub fn set_redirect_url(&mut self, redirect_url: impl Into<String>) {
        self.input.redirect_url = strip_trailing_slash(redirect_url.into());
        self.state = VerificationState::Pending;
    }

    /// Replace the public key and drop any prior verification.
    pub fn set_public_key(&mut self, public_key: impl Into<String>) {
        self.input.public_key = public_key.into();
        self.state = VerificationState::Pending;
    }

    /// Verify the request against the catalog (once) and encode it into a
    /// platform deep link.
    ///
    /// The first successful call stores the normalized services map;
    /// subsequent calls re-encode from it without touching the network. A
    /// failed attempt leaves the builder retryable.
    pub async fn generate_url(&mut self) -> Result<String, ConnectError> {
        let services = match &self.state {
            VerificationState::Verified(services) => services.clone(),
            VerificationState::Pending | VerificationState::Failed => {
                match self.verify().await {
                    Ok(services) => {
                        self.state = VerificationState::Verified(services.clone());
                        services
                    }
                    Err(error) => {
                        self.state = VerificationState::Failed;
                        return Err(error);
                    }
                }
            }
        };

        encode_url(&self.config, &self.input, &services)
    }

    async fn verify(&self) -> Result<InputData, ConnectError> {
        tracing::debug!(
            platform = self.input.platform.as_str(),
            services = self.input.services.len(),
            "verifying connect request"
        );

        // The two lookups are independent; run them concurrently. The
        // snapshot error is only surfaced once the key and redirect URL
        // have passed, keeping the failure order stable.
        let (public_key_valid, snapshot) = tokio::join!(
            self.api.verify_public_key(&self.input.public_key),
            self.api.get_supported_services_and_traits(),
        );

        validate::validate_public_key(public_key_valid)?;
        validate::validate_redirect_url(&self.input.redirect_url)?;
        let snapshot = snapshot?;
        validate::validate_services(&self.input.services, &snapshot)
    }
}

/// Recover the `dataKey` correlation token appended to a redirect URL by
/// the connect flow.
///
/// The raw query is split on `&` then `=`; the value is returned as-is,
/// with no percent-decoding beyond what the URL parser already applies.
pub fn data_key_from_url(redirect_url: &str) -> Result<String, ConnectError> {
    let url = Url::parse(redirect_url).map_err(|_| ConnectError::InvalidRedirectUrl)?;
    url.query()
        .and_then(|query| {
            query
                .split('&')
                .map(|pair| pair.split('=').collect::<Vec<_>>())
                .find(|pair| pair.len() > 1 && pair[0] == "dataKey")
                .map(|pair| pair[1].to_string())
        })
        .ok_or_else(|| ConnectError::DataKeyNotFound(redirect_url.to_string()))
}

fn strip_trailing_slash(mut url: String) -> String {
    if url.ends_with('/') {
        url.pop();
    }
    url
}

/// Serialize the normalized services (plus optional styling) once, then
/// base64 the payload and attach it to the platform base URL.
fn encode_url(
    config: &ConnectConfig,
    input: &ConnectInput,
    services: &InputData,
) -> Result<String, ConnectError> {
    let payload = encode_payload(services, input.options.as_ref());

    let base = config.base_url_for(input.platform);
    let mut url = Url::parse(base).map_err(|_| ConnectError::InvalidBaseUrl)?;
    url.query_pairs_mut()
        .append_pair("publicKey", &input.public_key)
        .append_pair("redirectUrl", &input.redirect_url)
        .append_pair("data", &payload);

    Ok(url.into())
}

fn encode_payload(services: &InputData, options: Option<&ConnectOptions>) -> String {
    let mut payload = serde_json::Map::new();
    for (key, service) in services {
        payload.insert(key.clone(), serde_json::json!(service));
    }
    if let Some(options) = options {
        payload.insert("options".to_string(), serde_json::json!(options.style));
    }

    BASE64_STANDARD.encode(serde_json::Value::Object(payload).to_string())
}
