//! Process-level configuration.
//!
//! Provides [`CloudProofConfig`], loaded from `CLOUDPROOF_*` environment
//! variables, from which the per-operation option records are derived.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::TransportError;
use crate::proof::ProofOptions;
use crate::transport::ReqwestTransport;
use crate::variant::{ApiVariant, ResponseShape};
use crate::verify::VerifyOptions;

/// `User-Agent` sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("cloudproof-rs/", env!("CARGO_PKG_VERSION"));

/// Request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// cloudproof configuration.
///
/// # Examples
///
/// ```
/// use cloudproof_core::config::{CloudProofConfig, DEFAULT_USER_AGENT};
///
/// let config = CloudProofConfig::default();
/// assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
/// assert_eq!(config.request_timeout_secs, 30);
/// assert!(config.sts_endpoint.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct CloudProofConfig {
    /// `User-Agent` for both signed and replayed requests.
    #[builder(default = String::from(DEFAULT_USER_AGENT), setter(into))]
    pub user_agent: String,

    /// Override for the STS endpoint used on replay.
    #[builder(default, setter(strip_option, into))]
    pub sts_endpoint: Option<String>,

    /// Override for the Organizations endpoint used on replay.
    #[builder(default, setter(strip_option, into))]
    pub organizations_endpoint: Option<String>,

    /// Timeout of the replayed request, in seconds.
    #[builder(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

impl Default for CloudProofConfig {
    fn default() -> Self {
        Self {
            user_agent: String::from(DEFAULT_USER_AGENT),
            sts_endpoint: None,
            organizations_endpoint: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl CloudProofConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CLOUDPROOF_USER_AGENT` | `cloudproof-rs/<version>` |
    /// | `CLOUDPROOF_STS_ENDPOINT` | `https://sts.amazonaws.com/` |
    /// | `CLOUDPROOF_ORGANIZATIONS_ENDPOINT` | `https://organizations.us-east-1.amazonaws.com/` |
    /// | `CLOUDPROOF_REQUEST_TIMEOUT_SECS` | `30` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// Empty values and unparsable timeouts fall back to the defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(v) = get("CLOUDPROOF_USER_AGENT") {
            config.user_agent = v;
        }
        config.sts_endpoint = get("CLOUDPROOF_STS_ENDPOINT");
        config.organizations_endpoint = get("CLOUDPROOF_ORGANIZATIONS_ENDPOINT");
        if let Some(v) = get("CLOUDPROOF_REQUEST_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.request_timeout_secs = n;
            }
        }

        config
    }

    /// The configured endpoint override for `variant`, if any.
    #[must_use]
    pub fn endpoint_for(&self, variant: &ApiVariant) -> Option<&str> {
        match variant.response_shape {
            ResponseShape::CallerIdentityXml => self.sts_endpoint.as_deref(),
            ResponseShape::OrganizationJson => self.organizations_endpoint.as_deref(),
        }
    }

    /// Options for creating a proof with the default credential chain.
    #[must_use]
    pub fn proof_options(&self) -> ProofOptions {
        ProofOptions::builder()
            .user_agent(self.user_agent.clone())
            .build()
    }

    /// Options for verifying a `variant` proof over a timed reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn verify_options(&self, variant: &ApiVariant) -> Result<VerifyOptions, TransportError> {
        let transport =
            ReqwestTransport::with_timeout(Duration::from_secs(self.request_timeout_secs))?;
        Ok(VerifyOptions {
            transport: Some(Arc::new(transport)),
            user_agent: Some(self.user_agent.clone()),
            endpoint_url: self.endpoint_for(variant).map(str::to_owned),
        })
    }
}
