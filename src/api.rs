//! GraphQL catalog client.
//!
//! The directory service answers two questions: is a public key registered,
//! and which services, traits, and activities exist right now. Both lookups
//! go through one public GraphQL endpoint.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ConnectConfig;
use crate::error::ApiError;
use crate::types::SupportedServicesAndTraits;

const APP_BY_PUBLIC_KEY_QUERY: &str = r#"
query GetAppByPublicKey($publicKey: String!) {
  getAppByPublicKey(publicKey: $publicKey) {
    gandalfID
  }
}
"#;

// The catalog is modelled as three GraphQL enums; introspection of their
// variants is the snapshot.
const SUPPORTED_SERVICES_QUERY: &str = r#"
query GetSupportedServices {
  sourceType: __type(name: "Source") {
    enumValues {
      name
    }
  }
  traitType: __type(name: "TraitType") {
    enumValues {
      name
    }
  }
  activityType: __type(name: "ActivityType") {
    enumValues {
      name
    }
  }
}
"#;

/// Remote catalog lookups the verification pipeline depends on.
///
/// The production implementation is [`ApiService`]; tests substitute their
/// own catalogs through this seam.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// True iff the key is registered with the directory. Transport and
    /// parse failures map to `false`; callers never see the distinction.
    async fn verify_public_key(&self, public_key: &str) -> bool;

    /// Current catalog snapshot, all lower-cased. Transport failures
    /// propagate so an unreachable catalog is not mistaken for an empty one.
    async fn get_supported_services_and_traits(
        &self,
    ) -> Result<SupportedServicesAndTraits, ApiError>;
}

/// Production catalog client speaking GraphQL over HTTP.
#[derive(Debug, Clone)]
pub struct ApiService {
    client: reqwest::Client,
    api_url: String,
}

impl ApiService {
    pub fn new(config: &ConnectConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    async fn post_query(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?;

        let body: GraphqlResponse = response.json().await?;
        if let Some(errors) = body.errors
            && !errors.is_empty()
        {
            let joined = errors
                .iter()
                .map(|entry| entry.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError::Graphql(joined));
        }

        body.data
            .ok_or_else(|| ApiError::Graphql("response carried no data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

#[async_trait]
impl CatalogApi for ApiService {
    async fn verify_public_key(&self, public_key: &str) -> bool {
        match self
            .post_query(APP_BY_PUBLIC_KEY_QUERY, json!({ "publicKey": public_key }))
            .await
        {
            Ok(data) => gandalf_id_is_positive(data.pointer("/getAppByPublicKey/gandalfID")),
            Err(error) => {
                tracing::warn!(%error, "public key lookup failed, treating key as invalid");
                false
            }
        }
    }

    async fn get_supported_services_and_traits(
        &self,
    ) -> Result<SupportedServicesAndTraits, ApiError> {
        let data = self.post_query(SUPPORTED_SERVICES_QUERY, json!({})).await?;
        let snapshot = SupportedServicesAndTraits {
            services: enum_names(&data, "sourceType"),
            traits: enum_names(&data, "traitType"),
            activities: enum_names(&data, "activityType"),
        };
        tracing::debug!(
            services = snapshot.services.len(),
            traits = snapshot.traits.len(),
            activities = snapshot.activities.len(),
            "fetched catalog snapshot"
        );
        Ok(snapshot)
    }
}

/// The directory encodes registration as a positive `gandalfID`; the field
/// has shipped as both a number and a numeric string.
fn gandalf_id_is_positive(value: Option<&serde_json::Value>) -> bool {
    match value {
        Some(serde_json::Value::Number(id)) => id.as_i64().is_some_and(|id| id > 0),
        Some(serde_json::Value::String(id)) => id.parse::<i64>().is_ok_and(|id| id > 0),
        _ => false,
    }
}

fn enum_names(data: &serde_json::Value, field: &str) -> HashSet<String> {
    data.pointer(&format!("/{field}/enumValues"))
        .and_then(|values| values.as_array())
        .map(|values| {
            values
                .iter()
                .filter_map(|value| value.pointer("/name").and_then(|name| name.as_str()))
                .map(|name| name.to_lowercase())
                .collect()
        })
        .unwrap_or_default()
}
