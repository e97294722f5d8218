//! Error types for proof creation and verification.
//!
//! Every failure is terminal for the call that raised it. Nothing here is
//! retried internally; the caller decides whether a [`TransportError`] is
//! worth another attempt.

use bytes::Bytes;
use cloudproof_auth::{CredentialError, SigningError};
use http::StatusCode;

/// Failure to move a replayed request over the network.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client failed to send or to read the response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request could not be built (for example, a malformed endpoint URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// A provider response that does not have the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body is not well-formed XML.
    #[error("XML processing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A required XML element is absent.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// The root element is not the expected one.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// Element text could not be decoded.
    #[error("failed to decode text: {0}")]
    Text(String),

    /// The body is not the expected JSON document.
    #[error("JSON decoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The decoded attestation is not the kind the caller asked for.
    #[error("expected a {expected} attestation")]
    ShapeMismatch {
        /// The attestation kind the caller asked for.
        expected: &'static str,
    },
}

/// Top-level error of the proof pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// Credentials could not be retrieved.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The request could not be signed or its headers could not be encoded.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// The replayed request never got a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The provider answered with a non-success status: the proof is rejected.
    #[error("provider rejected the proof with status {status}: {}", String::from_utf8_lossy(.body))]
    Verification {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Raw response body, kept for diagnostics.
        body: Bytes,
    },

    /// The provider accepted the proof but its response could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Convenience result type for proof operations.
pub type ProofResult<T> = Result<T, ProofError>;
