//! AWS Signature Version 4 request signing for cloudproof.
//!
//! This crate holds the signing half of a cloud identity proof: it turns a
//! request description plus credentials into a SigV4 `Authorization` value, and
//! it defines where those credentials come from. It knows nothing about which
//! AWS API is being signed; `cloudproof-core` supplies the request.
//!
//! # Usage
//!
//! ```rust
//! use chrono::DateTime;
//! use cloudproof_auth::credentials::Credentials;
//! use cloudproof_auth::sigv4::{SigningParams, SigningRequest, hash_payload, sign};
//!
//! let credentials = Credentials::new("AKID", "SECRET", Some("SESSION".to_owned()));
//! let payload_hash = hash_payload(b"Action=GetCallerIdentity&Version=2011-06-15");
//!
//! let output = sign(
//!     &SigningRequest {
//!         method: "POST",
//!         host: "sts.amazonaws.com",
//!         path: "/",
//!         query: "",
//!         headers: &[("content-length", "43")],
//!         payload_hash: &payload_hash,
//!     },
//!     &SigningParams {
//!         credentials: &credentials,
//!         region: "us-east-1",
//!         service: "sts",
//!         time: DateTime::from_timestamp(0, 0).unwrap(),
//!     },
//! )
//! .unwrap();
//!
//! assert!(output.authorization.ends_with(
//!     "Signature=d154575f065814e849ddedecca60086221043973e620076fd561fb70dd440320"
//! ));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical request construction
//! - [`credentials`] - Credentials and credential sources
//! - [`error`] - Signing and credential error types
//! - [`sigv4`] - Signing, key derivation and `Authorization` parsing

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod sigv4;

#[cfg(feature = "sdk-credentials")]
pub use credentials::SdkCredentialSource;
pub use credentials::{
    CredentialSource, Credentials, EnvCredentialSource, StaticCredentialSource,
    default_credential_source,
};
pub use error::{CredentialError, SigningError};
pub use sigv4::{
    SignatureScope, SigningOutput, SigningParams, SigningRequest, format_amz_date, hash_payload,
    parse_authorization_header, sign,
};
