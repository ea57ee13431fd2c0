//! Gandalf Connect SDK.
//!
//! Builds verifiable deep links that ask the Gandalf companion app to
//! connect a user's third-party service accounts. A [`Connect`] builder
//! verifies the request against the live service catalog exactly once,
//! then deterministically encodes the validated payload into a
//! platform-specific URL.
//!
//! ```no_run
//! use gandalf_connect::{Connect, ConnectInput, Service};
//!
//! # async fn demo() -> Result<(), gandalf_connect::ConnectError> {
//! let input = ConnectInput::new(
//!     "my-public-key",
//!     "https://example.com/callback",
//!     [(
//!         "uber".to_string(),
//!         Service::new(vec!["rating".to_string()], vec!["trip".to_string()]),
//!     )]
//!     .into(),
//! );
//!
//! let mut connect = Connect::new(input)?;
//! let url = connect.generate_url().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod connect;
pub mod error;
pub mod types;
pub mod validate;

pub use api::{ApiService, CatalogApi};
pub use config::ConnectConfig;
pub use connect::{Connect, data_key_from_url};
pub use error::{ApiError, ConnectError, ConnectErrorCode};
pub use types::{
    ConnectInput, ConnectOptions, InputData, InputStyle, Platform, Service,
    SupportedServicesAndTraits,
};
