//! Credentials and the sources that supply them.
//!
//! Proof creation never loads credentials on its own; it asks a
//! [`CredentialSource`]. Three sources ship with the crate:
//!
//! - [`StaticCredentialSource`] returns fixed values (tests, pre-fetched keys).
//! - [`EnvCredentialSource`] reads the standard `AWS_*` environment variables.
//! - [`SdkCredentialSource`] runs the AWS SDK default provider chain
//!   (environment, shared config/profile files, SSO, web identity, IMDS).
//!   Requires the `sdk-credentials` feature.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CredentialError;

/// Environment variable holding the access key id.
pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
/// Environment variable holding the secret access key.
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
/// Environment variable holding the optional session token.
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";

/// A resolved set of AWS credentials.
///
/// Only the signer reads the secret; the `Debug` output redacts it together
/// with the session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl Credentials {
    /// Create credentials. An empty session token is treated as absent.
    #[must_use]
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.filter(|t| !t.is_empty()),
        }
    }

    /// The access key id.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The secret access key.
    #[must_use]
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// The session token, for temporary credentials.
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Something that can hand out credentials to sign a proof with.
///
/// Uses `#[async_trait]` so sources can be held as `Arc<dyn CredentialSource>`.
#[async_trait]
pub trait CredentialSource: Send + Sync + fmt::Debug {
    /// Retrieve the current credentials.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if no usable credentials are available.
    async fn retrieve(&self) -> Result<Credentials, CredentialError>;
}

/// A source that always returns the same credentials.
///
/// # Examples
///
/// ```
/// use cloudproof_auth::credentials::{CredentialSource, StaticCredentialSource};
///
/// # tokio_test::block_on(async {
/// let source = StaticCredentialSource::new("AKID", "SECRET", Some("SESSION".to_owned()));
/// let creds = source.retrieve().await.unwrap();
/// assert_eq!(creds.access_key_id(), "AKID");
/// assert_eq!(creds.session_token(), Some("SESSION"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct StaticCredentialSource {
    credentials: Credentials,
}

impl StaticCredentialSource {
    /// Create a source from explicit values.
    #[must_use]
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            credentials: Credentials::new(access_key_id, secret_access_key, session_token),
        }
    }
}

impl From<Credentials> for StaticCredentialSource {
    fn from(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl CredentialSource for StaticCredentialSource {
    async fn retrieve(&self) -> Result<Credentials, CredentialError> {
        Ok(self.credentials.clone())
    }
}

/// A source backed by `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the
/// optional `AWS_SESSION_TOKEN`.
///
/// The environment is read on every call; nothing is cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialSource;

impl EnvCredentialSource {
    /// Resolve credentials through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Missing`] naming the first required
    /// variable that is unset.
    pub fn resolve_with<F>(lookup: F) -> Result<Credentials, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let access_key_id = read(ACCESS_KEY_ID_VAR)
            .ok_or_else(|| CredentialError::Missing(ACCESS_KEY_ID_VAR.to_owned()))?;
        let secret_access_key = read(SECRET_ACCESS_KEY_VAR)
            .ok_or_else(|| CredentialError::Missing(SECRET_ACCESS_KEY_VAR.to_owned()))?;

        Ok(Credentials::new(
            access_key_id,
            secret_access_key,
            read(SESSION_TOKEN_VAR),
        ))
    }
}

#[async_trait]
impl CredentialSource for EnvCredentialSource {
    async fn retrieve(&self) -> Result<Credentials, CredentialError> {
        Self::resolve_with(|name| std::env::var(name).ok())
    }
}

/// A source that runs the AWS SDK default credential provider chain.
///
/// The chain is loaded afresh on every call, so rotated credentials are
/// picked up without restarting.
#[cfg(feature = "sdk-credentials")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SdkCredentialSource;

#[cfg(feature = "sdk-credentials")]
#[async_trait]
impl CredentialSource for SdkCredentialSource {
    async fn retrieve(&self) -> Result<Credentials, CredentialError> {
        use aws_credential_types::provider::ProvideCredentials;

        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let provider = config
            .credentials_provider()
            .ok_or(CredentialError::NoProvider)?;
        let creds = provider
            .provide_credentials()
            .await
            .map_err(|e| CredentialError::Provider(e.to_string()))?;

        tracing::debug!(
            access_key_id = %creds.access_key_id(),
            temporary = creds.session_token().is_some(),
            "resolved credentials from the SDK provider chain"
        );

        Ok(Credentials::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            creds.session_token().map(ToOwned::to_owned),
        ))
    }
}

/// The source used when the caller configures none.
///
/// This is the SDK provider chain when the `sdk-credentials` feature is on and
/// the plain environment otherwise.
#[must_use]
pub fn default_credential_source() -> Arc<dyn CredentialSource> {
    #[cfg(feature = "sdk-credentials")]
    {
        Arc::new(SdkCredentialSource)
    }
    #[cfg(not(feature = "sdk-credentials"))]
    {
        Arc::new(EnvCredentialSource)
    }
}
