//! Proof verification by replay.
//!
//! The verifier never recomputes the signature. It rebuilds the exact request
//! the claimant signed, attaches the artifact's headers verbatim, and lets the
//! provider decide. A success response names the principal that signed it.

use std::sync::Arc;

use bytes::Bytes;
use cloudproof_auth::{SigningError, format_amz_date};
use http::header::{AUTHORIZATION, TRANSFER_ENCODING};
use http::{HeaderName, HeaderValue};
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

use crate::config::DEFAULT_USER_AGENT;
use crate::decode::decode_response;
use crate::error::{DecodeError, ProofError, TransportError};
use crate::model::{Attestation, Identity, Organization};
use crate::proof::ProofArtifact;
use crate::transport::{ReqwestTransport, Transport};
use crate::variant::{ApiVariant, IDENTITY_LOOKUP, ORGANIZATION_LOOKUP, RequestStage, canonicalize};

const X_AMZ_DATE: HeaderName = HeaderName::from_static("x-amz-date");
const X_AMZ_SECURITY_TOKEN: HeaderName = HeaderName::from_static("x-amz-security-token");

/// Options for [`verify_proof`].
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct VerifyOptions {
    /// How to send the replayed request. Defaults to a fresh [`ReqwestTransport`].
    #[builder(default, setter(strip_option))]
    pub transport: Option<Arc<dyn Transport>>,

    /// `User-Agent` of the replayed request. Defaults to [`DEFAULT_USER_AGENT`].
    #[builder(default, setter(strip_option, into))]
    pub user_agent: Option<String>,

    /// Where to send the replayed request. Defaults to [`ApiVariant::endpoint`].
    #[builder(default, setter(strip_option, into))]
    pub endpoint_url: Option<String>,
}

/// Rebuild the request described by `artifact` and aim it at `endpoint`.
///
/// # Errors
///
/// Returns [`ProofError::Signing`] if an artifact value is not a legal header
/// value and [`ProofError::Transport`] if `endpoint` is not a valid URI.
pub fn build_replay_request(
    variant: &ApiVariant,
    artifact: &ProofArtifact,
    user_agent: &str,
    endpoint: &str,
) -> Result<http::Request<Bytes>, ProofError> {
    let canonical = canonicalize(variant, RequestStage::Replay, artifact.time(), user_agent)?;
    let mut request = canonical
        .into_http_request(endpoint)
        .map_err(|e| TransportError::InvalidRequest(format!("{endpoint}: {e}")))?;

    let headers = request.headers_mut();
    headers.insert(
        X_AMZ_DATE,
        header_value(X_AMZ_DATE, &format_amz_date(&artifact.time()))?,
    );
    if !artifact.session_token().is_empty() {
        headers.insert(
            X_AMZ_SECURITY_TOKEN,
            header_value(X_AMZ_SECURITY_TOKEN, artifact.session_token())?,
        );
    }
    headers.insert(AUTHORIZATION, header_value(AUTHORIZATION, artifact.signature())?);
    headers.remove(TRANSFER_ENCODING);

    Ok(request)
}

fn header_value(name: HeaderName, value: &str) -> Result<HeaderValue, SigningError> {
    HeaderValue::from_str(value).map_err(|_| SigningError::InvalidHeaderValue(name.to_string()))
}

/// Verify `artifact` by replaying it against the provider of `variant`.
///
/// The request is sent exactly once.
///
/// # Errors
///
/// - [`ProofError::Signing`] if the artifact cannot be put on the wire.
/// - [`ProofError::Transport`] if no response was received.
/// - [`ProofError::Verification`] if the provider rejected the proof.
/// - [`ProofError::Decode`] if the success response is malformed.
pub async fn verify_proof(
    variant: &ApiVariant,
    artifact: &ProofArtifact,
    options: &VerifyOptions,
) -> Result<Attestation, ProofError> {
    let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    let endpoint = options
        .endpoint_url
        .clone()
        .unwrap_or_else(|| variant.endpoint());
    let request = build_replay_request(variant, artifact, user_agent, &endpoint)?;

    let transport: Arc<dyn Transport> = match &options.transport {
        Some(transport) => Arc::clone(transport),
        None => Arc::new(ReqwestTransport::try_default()?),
    };

    debug!(variant = variant.name, %endpoint, "Replaying proof");
    let response = transport.send(request).await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.into_body();
        warn!(variant = variant.name, %status, "Provider rejected proof");
        return Err(ProofError::Verification { status, body });
    }

    let attestation = decode_response(variant.response_shape, response.body())?;
    info!(variant = variant.name, "Verified proof");
    Ok(attestation)
}

/// Verify an identity proof and return the calling principal.
///
/// # Errors
///
/// See [`verify_proof`].
pub async fn verify_identity_proof(
    artifact: &ProofArtifact,
    options: &VerifyOptions,
) -> Result<Identity, ProofError> {
    match verify_proof(&IDENTITY_LOOKUP, artifact, options).await? {
        Attestation::Identity(identity) => Ok(identity),
        Attestation::Organization(_) => {
            Err(DecodeError::ShapeMismatch { expected: "identity" }.into())
        }
    }
}

/// Verify an organization proof and return the claimant's organization.
///
/// # Errors
///
/// See [`verify_proof`].
pub async fn verify_organization_proof(
    artifact: &ProofArtifact,
    options: &VerifyOptions,
) -> Result<Organization, ProofError> {
    match verify_proof(&ORGANIZATION_LOOKUP, artifact, options).await? {
        Attestation::Organization(organization) => Ok(organization),
        Attestation::Identity(_) => Err(DecodeError::ShapeMismatch {
            expected: "organization",
        }
        .into()),
    }
}
