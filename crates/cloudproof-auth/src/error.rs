//! Error types for credential retrieval and SigV4 signing.

/// Errors raised while producing or parsing a SigV4 signature.
///
/// Signing is a pure function of its inputs, so these errors point at bad
/// input (empty credentials, unencodable header values) rather than at a
/// transient condition. They are never retried.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The credentials carry an empty access key id.
    #[error("access key id is empty")]
    MissingAccessKey,

    /// The credentials carry an empty secret access key.
    #[error("secret access key is empty")]
    MissingSecretKey,

    /// A header value cannot be represented in a canonical request.
    #[error("invalid value for header: {0}")]
    InvalidHeaderValue(String),

    /// An `Authorization` value could not be parsed.
    #[error("invalid Authorization header format")]
    InvalidAuthHeader,

    /// The signing algorithm is not `AWS4-HMAC-SHA256`.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The `Credential` component is not `AKID/date/region/service/aws4_request`.
    #[error("invalid credential scope")]
    InvalidCredential,
}

/// Errors raised by a [`CredentialSource`](crate::credentials::CredentialSource).
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// A required environment variable is not set.
    #[error("missing credential variable: {0}")]
    Missing(String),

    /// The configured provider chain has no credentials provider at all.
    #[error("no credentials provider configured")]
    NoProvider,

    /// The underlying provider failed to produce credentials.
    #[error("credentials provider failed: {0}")]
    Provider(String),
}
