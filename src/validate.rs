//! Request validation against a catalog snapshot.
//!
//! Checks run in a fixed order and stop at the first failure: public key,
//! redirect URL, service-key cardinality, catalog membership, per-service
//! content, then the required-service rule. On success the caller gets a
//! fresh map with lower-cased keys; the input is never mutated.

use url::Url;

use crate::error::ConnectError;
use crate::types::{GANDALF_SERVICE_KEY, InputData, SupportedServicesAndTraits};

/// Run the full validation sequence over an already-resolved public-key
/// verdict, a redirect URL, and a catalog snapshot.
pub fn validate(
    public_key_valid: bool,
    redirect_url: &str,
    services: &InputData,
    snapshot: &SupportedServicesAndTraits,
) -> Result<InputData, ConnectError> {
    validate_public_key(public_key_valid)?;
    validate_redirect_url(redirect_url)?;
    validate_services(services, snapshot)
}

pub fn validate_public_key(public_key_valid: bool) -> Result<(), ConnectError> {
    if public_key_valid {
        Ok(())
    } else {
        Err(ConnectError::InvalidPublicKey)
    }
}

pub fn validate_redirect_url(redirect_url: &str) -> Result<(), ConnectError> {
    Url::parse(redirect_url)
        .map(|_| ())
        .map_err(|_| ConnectError::InvalidRedirectUrl)
}

/// Normalize and cross-check the services map against the snapshot.
pub fn validate_services(
    services: &InputData,
    snapshot: &SupportedServicesAndTraits,
) -> Result<InputData, ConnectError> {
    validate_cardinality(services)?;
    validate_membership(services, snapshot)?;
    let normalized = validate_content(services, snapshot)?;
    validate_required(&normalized)?;
    Ok(normalized)
}

/// Policy: at most one non-Gandalf service per URL; the reserved
/// first-party key may ride along with it.
fn validate_cardinality(services: &InputData) -> Result<(), ConnectError> {
    let keys: Vec<String> = services.keys().map(|key| key.to_lowercase()).collect();
    if keys.len() > 2 || (keys.len() == 2 && !keys.iter().any(|key| key == GANDALF_SERVICE_KEY)) {
        return Err(ConnectError::InvalidService(
            "Only one non Gandalf service is supported per Connect URL".to_string(),
        ));
    }
    Ok(())
}

fn validate_membership(
    services: &InputData,
    snapshot: &SupportedServicesAndTraits,
) -> Result<(), ConnectError> {
    let unsupported: Vec<&str> = services
        .keys()
        .filter(|key| !snapshot.services.contains(&key.to_lowercase()))
        .map(String::as_str)
        .collect();

    if !unsupported.is_empty() {
        return Err(ConnectError::InvalidService(format!(
            "These services [ {} ] are unsupported",
            unsupported.join(", ")
        )));
    }
    Ok(())
}

/// Per-service scope check. Unsupported trait and activity names are
/// collected across every service; traits are reported first. Reported
/// names keep the caller's casing.
fn validate_content(
    services: &InputData,
    snapshot: &SupportedServicesAndTraits,
) -> Result<InputData, ConnectError> {
    let mut unsupported_traits: Vec<String> = Vec::new();
    let mut unsupported_activities: Vec<String> = Vec::new();
    let mut normalized = InputData::new();

    for (key, service) in services {
        if service.traits.is_empty() && service.activities.is_empty() {
            return Err(ConnectError::InvalidService(
                "At least one trait or activity is required".to_string(),
            ));
        }

        unsupported_traits.extend(
            service
                .traits
                .iter()
                .filter(|name| !snapshot.traits.contains(&name.to_lowercase()))
                .cloned(),
        );
        unsupported_activities.extend(
            service
                .activities
                .iter()
                .filter(|name| !snapshot.activities.contains(&name.to_lowercase()))
                .cloned(),
        );

        normalized.insert(key.to_lowercase(), service.clone());
    }

    if !unsupported_traits.is_empty() {
        return Err(ConnectError::InvalidService(format!(
            "These traits [ {} ] are unsupported",
            unsupported_traits.join(", ")
        )));
    }
    if !unsupported_activities.is_empty() {
        return Err(ConnectError::InvalidService(format!(
            "These activities [ {} ] are unsupported",
            unsupported_activities.join(", ")
        )));
    }

    Ok(normalized)
}

fn validate_required(services: &InputData) -> Result<(), ConnectError> {
    if services.values().any(|service| service.required) {
        Ok(())
    } else {
        Err(ConnectError::InvalidService(
            "At least one service must be marked as required".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Service;
    use pretty_assertions::assert_eq;

    fn snapshot() -> SupportedServicesAndTraits {
        SupportedServicesAndTraits {
            services: ["gandalf", "uber", "netflix"]
                .into_iter()
                .map(String::from)
                .collect(),
            traits: ["rating", "plan"].into_iter().map(String::from).collect(),
            activities: ["trip", "watch"].into_iter().map(String::from).collect(),
        }
    }

    fn uber() -> Service {
        Service::new(vec!["rating".to_string()], vec!["trip".to_string()])
    }

    #[test]
    fn valid_request_lower_cases_keys() {
        let services: InputData = [("Uber".to_string(), uber())].into();
        let normalized = validate(true, "https://example.com/callback", &services, &snapshot())
            .expect("request should validate");

        assert_eq!(normalized.len(), 1);
        assert!(normalized.contains_key("uber"));
        assert!(normalized["uber"].required);
    }

    #[test]
    fn invalid_public_key_short_circuits() {
        let services: InputData = [("uber".to_string(), uber())].into();
        let err = validate(false, "https://example.com/callback", &services, &snapshot())
            .unwrap_err();
        assert_eq!(err.to_string(), "Public key does not exist");
        assert!(matches!(err, ConnectError::InvalidPublicKey));
    }

    #[test]
    fn malformed_redirect_url_is_rejected() {
        let services: InputData = [("uber".to_string(), uber())].into();
        let err = validate(true, "not a valid URL", &services, &snapshot()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid redirectURL");
    }

    #[test]
    fn two_non_gandalf_services_violate_cardinality() {
        let services: InputData = [
            ("uber".to_string(), uber()),
            (
                "netflix".to_string(),
                Service::new(vec!["plan".to_string()], vec!["watch".to_string()]),
            ),
        ]
        .into();

        let err = validate_services(&services, &snapshot()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only one non Gandalf service is supported per Connect URL"
        );
    }

    #[test]
    fn gandalf_may_ride_along_with_one_service() {
        let services: InputData = [
            ("uber".to_string(), uber()),
            (
                "Gandalf".to_string(),
                Service::new(vec!["plan".to_string()], vec![]),
            ),
        ]
        .into();

        let normalized = validate_services(&services, &snapshot()).unwrap();
        assert!(normalized.contains_key("uber"));
        assert!(normalized.contains_key("gandalf"));
    }

    #[test]
    fn unknown_services_are_reported_together() {
        let services: InputData = [(
            "fake_service".to_string(),
            Service::new(vec!["rating".to_string()], vec!["trip".to_string()]),
        )]
        .into();

        let err = validate_services(&services, &snapshot()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "These services [ fake_service ] are unsupported"
        );
    }

    #[test]
    fn membership_failure_wins_over_content_failure() {
        // An unknown service with an empty scope reports the unknown key,
        // not the missing trait/activity.
        let services: InputData = [
            ("fake_service".to_string(), Service::default()),
        ]
        .into();

        let err = validate_services(&services, &snapshot()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "These services [ fake_service ] are unsupported"
        );
    }

    #[test]
    fn empty_scope_is_rejected() {
        let services: InputData = [("uber".to_string(), Service::default())].into();
        let err = validate_services(&services, &snapshot()).unwrap_err();
        assert_eq!(err.to_string(), "At least one trait or activity is required");
    }

    #[test]
    fn unsupported_traits_report_before_activities() {
        let services: InputData = [(
            "uber".to_string(),
            Service::new(
                vec!["fake_trait".to_string()],
                vec!["fake_activity".to_string()],
            ),
        )]
        .into();

        let err = validate_services(&services, &snapshot()).unwrap_err();
        assert_eq!(err.to_string(), "These traits [ fake_trait ] are unsupported");
    }

    #[test]
    fn unsupported_activities_are_reported() {
        let services: InputData = [(
            "uber".to_string(),
            Service::new(vec!["rating".to_string()], vec!["fake_activity".to_string()]),
        )]
        .into();

        let err = validate_services(&services, &snapshot()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "These activities [ fake_activity ] are unsupported"
        );
    }

    #[test]
    fn trait_and_activity_membership_is_case_insensitive() {
        let services: InputData = [(
            "uber".to_string(),
            Service::new(vec!["Rating".to_string()], vec!["TRIP".to_string()]),
        )]
        .into();

        let normalized = validate_services(&services, &snapshot()).unwrap();
        // Values keep caller casing; only keys are normalized.
        assert_eq!(normalized["uber"].traits, vec!["Rating".to_string()]);
    }

    #[test]
    fn at_least_one_service_must_be_required() {
        let services: InputData = [(
            "uber".to_string(),
            uber().with_required(false),
        )]
        .into();

        let err = validate_services(&services, &snapshot()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At least one service must be marked as required"
        );
    }

    #[test]
    fn one_required_service_satisfies_the_rule() {
        let services: InputData = [
            ("uber".to_string(), uber().with_required(false)),
            (
                "gandalf".to_string(),
                Service::new(vec!["plan".to_string()], vec![]),
            ),
        ]
        .into();

        assert!(validate_services(&services, &snapshot()).is_ok());
    }
}
