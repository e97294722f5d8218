//! Cloud identity proofs over AWS SigV4.
//!
//! A claimant signs a fixed, read-only AWS request with its own credentials
//! ([`create_proof`]) and hands the resulting [`ProofArtifact`] to a verifier.
//! The verifier replays the signed request against AWS ([`verify_proof`]); if
//! AWS accepts it, the response names the principal or organization behind
//! the credentials. Secret keys never leave the claimant.
//!
//! Two API calls are supported, each described by an [`ApiVariant`]:
//!
//! - [`IDENTITY_LOOKUP`] - STS `GetCallerIdentity`, attesting an [`Identity`]
//! - [`ORGANIZATION_LOOKUP`] - Organizations `DescribeOrganization`, attesting
//!   an [`Organization`]
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`decode`] - Provider response decoding
//! - [`error`] - Error types
//! - [`model`] - Attested records
//! - [`proof`] - Proof creation
//! - [`transport`] - The HTTP seam used on replay
//! - [`variant`] - API descriptors and request canonicalization
//! - [`verify`] - Proof verification

pub mod config;
pub mod decode;
pub mod error;
pub mod model;
pub mod proof;
pub mod transport;
pub mod variant;
pub mod verify;


pub use config::{CloudProofConfig, DEFAULT_USER_AGENT};
pub use error::{DecodeError, ProofError, ProofResult, TransportError};
pub use model::{Attestation, Identity, Organization, PolicyTypeSummary};
pub use proof::{
    ProofArtifact, ProofOptions, create_identity_proof, create_organization_proof, create_proof,
};
pub use transport::{ReqwestTransport, Transport};
pub use variant::{
    ApiVariant, CanonicalRequest, IDENTITY_LOOKUP, ORGANIZATION_LOOKUP, RequestStage, canonicalize,
};
pub use verify::{
    VerifyOptions, build_replay_request, verify_identity_proof, verify_organization_proof,
    verify_proof,
};
