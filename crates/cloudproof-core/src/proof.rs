//! Proof creation.
//!
//! A claimant signs one of the fixed [`ApiVariant`] requests with its own
//! credentials and hands the resulting [`ProofArtifact`] to a verifier. The
//! request itself is never sent by the claimant.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cloudproof_auth::{
    CredentialSource, SignatureScope, SigningError, SigningParams, SigningRequest,
    default_credential_source, parse_authorization_header, sign,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use typed_builder::TypedBuilder;

use crate::config::DEFAULT_USER_AGENT;
use crate::error::ProofError;
use crate::variant::{ApiVariant, IDENTITY_LOOKUP, ORGANIZATION_LOOKUP, RequestStage, canonicalize};

/// A portable proof of control over a set of AWS credentials.
///
/// Serializes as `{"signature", "time", "securityToken"}`. The secret access
/// key is never part of it.
///
/// # Examples
///
/// ```
/// use cloudproof_core::ProofArtifact;
///
/// let json = r#"{"authHeader":"AWS4-HMAC-SHA256 ...","time":"1970-01-01T00:00:00Z","security_token":"T"}"#;
/// let artifact: ProofArtifact = serde_json::from_str(json).unwrap();
/// assert_eq!(artifact.session_token(), "T");
/// assert!(serde_json::to_string(&artifact).unwrap().contains(r#""securityToken":"T""#));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofArtifact {
    #[serde(alias = "authHeader")]
    signature: String,
    time: DateTime<Utc>,
    #[serde(
        rename = "securityToken",
        alias = "security_token",
        alias = "sessionToken",
        default
    )]
    session_token: String,
}

impl ProofArtifact {
    /// Assemble an artifact from its parts, e.g. when received over a custom channel.
    #[must_use]
    pub fn new(
        signature: impl Into<String>,
        time: DateTime<Utc>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            signature: signature.into(),
            time,
            session_token: session_token.into(),
        }
    }

    /// The full SigV4 `Authorization` value.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The instant the request was signed.
    #[must_use]
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// The session token the request was signed with; empty for long-term keys.
    #[must_use]
    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// Parse the non-secret parts of the signature for inspection.
    ///
    /// Verification never depends on this.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError`] if the signature is not a SigV4 `Authorization` value.
    pub fn scope(&self) -> Result<SignatureScope, SigningError> {
        parse_authorization_header(&self.signature)
    }
}

impl fmt::Debug for ProofArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofArtifact")
            .field("signature", &self.signature)
            .field("time", &self.time)
            .field(
                "session_token",
                &if self.session_token.is_empty() { "" } else { "<redacted>" },
            )
            .finish()
    }
}

/// Options for [`create_proof`].
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct ProofOptions {
    /// Where to get credentials. Defaults to [`default_credential_source`].
    #[builder(default, setter(strip_option))]
    pub credential_source: Option<Arc<dyn CredentialSource>>,

    /// Signing instant. Defaults to the current time.
    #[builder(default, setter(strip_option))]
    pub signing_time: Option<DateTime<Utc>>,

    /// `User-Agent` of the signed request. Defaults to [`DEFAULT_USER_AGENT`].
    #[builder(default, setter(strip_option, into))]
    pub user_agent: Option<String>,
}

/// Sign `variant` with the configured credentials.
///
/// # Errors
///
/// Returns [`ProofError::Credential`] if no credentials are available and
/// [`ProofError::Signing`] if they cannot sign the request.
pub async fn create_proof(
    variant: &ApiVariant,
    options: &ProofOptions,
) -> Result<ProofArtifact, ProofError> {
    let source = options
        .credential_source
        .clone()
        .unwrap_or_else(default_credential_source);
    let credentials = source.retrieve().await?;

    let time = options.signing_time.unwrap_or_else(Utc::now);
    let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    let request = canonicalize(variant, RequestStage::Signing, time, user_agent)?;
    let signed_headers = request.signed_header_pairs();

    let output = sign(
        &SigningRequest {
            method: request.method().as_str(),
            host: request.host(),
            path: request.path(),
            query: request.query(),
            headers: &signed_headers,
            payload_hash: request.payload_hash(),
        },
        &SigningParams {
            credentials: &credentials,
            region: variant.region,
            service: variant.service,
            time,
        },
    )?;

    info!(
        variant = variant.name,
        access_key_id = credentials.access_key_id(),
        amz_date = %output.amz_date,
        "Created proof"
    );

    Ok(ProofArtifact::new(
        output.authorization,
        time,
        credentials.session_token().unwrap_or_default(),
    ))
}

/// Create a proof over STS `GetCallerIdentity`.
///
/// # Errors
///
/// See [`create_proof`].
pub async fn create_identity_proof(options: &ProofOptions) -> Result<ProofArtifact, ProofError> {
    create_proof(&IDENTITY_LOOKUP, options).await
}

/// Create a proof over Organizations `DescribeOrganization`.
///
/// # Errors
///
/// See [`create_proof`].
pub async fn create_organization_proof(
    options: &ProofOptions,
) -> Result<ProofArtifact, ProofError> {
    create_proof(&ORGANIZATION_LOOKUP, options).await
}
