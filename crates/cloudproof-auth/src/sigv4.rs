//! AWS Signature Version 4 signing.
//!
//! [`sign`] runs the whole SigV4 flow over a request description:
//!
//! 1. Add the synthetic `host`, `x-amz-date` and (for temporary credentials)
//!    `x-amz-security-token` headers to the caller's signed headers.
//! 2. Build the canonical request and hash it.
//! 3. Build the string to sign from the timestamp, credential scope and hash.
//! 4. Derive the signing key through the HMAC-SHA256 chain.
//! 5. HMAC the string to sign and assemble the `Authorization` value.
//!
//! Signing reads no clock and uses no randomness: the same request, credentials
//! and time always yield the same `Authorization` value.

use chrono::{DateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::canonical::{CanonicalHeaders, build_canonical_request};
use crate::credentials::Credentials;
use crate::error::SigningError;

/// The only algorithm this crate produces or parses.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// `strftime` pattern of the `X-Amz-Date` header.
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// `strftime` pattern of the date inside the credential scope.
const SCOPE_DATE_FORMAT: &str = "%Y%m%d";

/// Terminator of every SigV4 credential scope.
const SCOPE_TERMINATOR: &str = "aws4_request";

type HmacSha256 = Hmac<Sha256>;

/// The parts of an HTTP request that SigV4 covers.
///
/// `headers` lists only the caller's signed headers. `host`, `x-amz-date` and
/// `x-amz-security-token` are added by [`sign`] and must not be repeated here.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    /// HTTP method (any case).
    pub method: &'a str,
    /// Value of the `host` header.
    pub host: &'a str,
    /// URI path, unencoded or already percent-encoded.
    pub path: &'a str,
    /// Raw query string without the leading `?`.
    pub query: &'a str,
    /// Additional headers to sign, as `(name, value)` pairs.
    pub headers: &'a [(&'a str, &'a str)],
    /// Hex SHA-256 of the request body.
    pub payload_hash: &'a str,
}

/// Who signs, for which scope, and when.
#[derive(Debug, Clone, Copy)]
pub struct SigningParams<'a> {
    /// The credentials to sign with.
    pub credentials: &'a Credentials,
    /// Region of the credential scope.
    pub region: &'a str,
    /// Service of the credential scope.
    pub service: &'a str,
    /// Signing time; becomes `X-Amz-Date` and the scope date.
    pub time: DateTime<Utc>,
}

/// The result of signing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningOutput {
    /// The complete `Authorization` header value.
    pub authorization: String,
    /// The hex-encoded signature.
    pub signature: String,
    /// The `X-Amz-Date` value that was signed.
    pub amz_date: String,
    /// `YYYYMMDD/region/service/aws4_request`.
    pub credential_scope: String,
    /// The `SignedHeaders` list.
    pub signed_headers: String,
}

/// The non-secret contents of a SigV4 `Authorization` value.
///
/// Format:
/// ```text
/// AWS4-HMAC-SHA256 Credential=AKID/19700101/us-east-1/sts/aws4_request,
///   SignedHeaders=content-length;host;x-amz-date;x-amz-security-token,
///   Signature=<hex-signature>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureScope {
    /// The access key id that produced the signature.
    pub access_key_id: String,
    /// The date component of the credential scope (`YYYYMMDD`).
    pub date: String,
    /// The region of the credential scope.
    pub region: String,
    /// The service of the credential scope.
    pub service: String,
    /// The signed header names, lower-case, in the order given.
    pub signed_headers: Vec<String>,
    /// The hex-encoded signature.
    pub signature: String,
}

/// Format a timestamp as an `X-Amz-Date` value.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use cloudproof_auth::sigv4::format_amz_date;
///
/// let epoch = DateTime::from_timestamp(0, 0).unwrap();
/// assert_eq!(format_amz_date(&epoch), "19700101T000000Z");
/// ```
#[must_use]
pub fn format_amz_date(time: &DateTime<Utc>) -> String {
    time.format(AMZ_DATE_FORMAT).to_string()
}

/// Sign a request with SigV4.
///
/// # Errors
///
/// Returns [`SigningError::MissingAccessKey`] or
/// [`SigningError::MissingSecretKey`] for empty credentials, and
/// [`SigningError::InvalidHeaderValue`] if a header (including the session
/// token) cannot be placed in a canonical request.
pub fn sign(
    request: &SigningRequest<'_>,
    params: &SigningParams<'_>,
) -> Result<SigningOutput, SigningError> {
    let credentials = params.credentials;
    if credentials.access_key_id().is_empty() {
        return Err(SigningError::MissingAccessKey);
    }
    if credentials.secret_access_key().is_empty() {
        return Err(SigningError::MissingSecretKey);
    }

    let amz_date = format_amz_date(&params.time);
    let scope_date = params.time.format(SCOPE_DATE_FORMAT).to_string();

    let mut headers = CanonicalHeaders::new();
    for (name, value) in request.headers {
        headers.insert(name, value)?;
    }
    headers.insert("host", request.host)?;
    headers.insert("x-amz-date", &amz_date)?;
    if let Some(token) = credentials.session_token() {
        headers.insert("x-amz-security-token", token)?;
    }

    let canonical_request = build_canonical_request(
        request.method,
        request.path,
        request.query,
        &headers,
        request.payload_hash,
    );
    // The canonical request carries the session token; only its hash is logged.
    let canonical_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    debug!(canonical_request_hash = %canonical_hash, "Built canonical request");
    let credential_scope = format!(
        "{scope_date}/{}/{}/{SCOPE_TERMINATOR}",
        params.region, params.service
    );
    let string_to_sign = build_string_to_sign(&amz_date, &credential_scope, &canonical_hash);
    debug!(string_to_sign, "Built string to sign");

    let signing_key = derive_signing_key(
        credentials.secret_access_key(),
        &scope_date,
        params.region,
        params.service,
    );
    let signature = compute_signature(&signing_key, &string_to_sign);
    let signed_headers = headers.signed_headers_string();

    let authorization = format!(
        "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}",
        credentials.access_key_id()
    );

    debug!(
        access_key_id = %credentials.access_key_id(),
        %credential_scope,
        %signed_headers,
        "Signed request"
    );

    Ok(SigningOutput {
        authorization,
        signature,
        amz_date,
        credential_scope,
        signed_headers,
    })
}

/// Parse a SigV4 `Authorization` value into its components.
///
/// Accepts both `", "` and `","` between the components.
///
/// # Errors
///
/// Returns [`SigningError::InvalidAuthHeader`] if a component is missing,
/// [`SigningError::UnsupportedAlgorithm`] for anything but
/// `AWS4-HMAC-SHA256`, and [`SigningError::InvalidCredential`] if the
/// credential scope is malformed.
pub fn parse_authorization_header(header: &str) -> Result<SignatureScope, SigningError> {
    let (algorithm, rest) = header
        .split_once(' ')
        .ok_or(SigningError::InvalidAuthHeader)?;

    if algorithm != ALGORITHM {
        return Err(SigningError::UnsupportedAlgorithm(algorithm.to_owned()));
    }

    let mut credential = None;
    let mut signed_headers = None;
    let mut signature = None;

    for part in rest.split(',') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("Credential=") {
            credential = Some(value);
        } else if let Some(value) = part.strip_prefix("SignedHeaders=") {
            signed_headers = Some(value);
        } else if let Some(value) = part.strip_prefix("Signature=") {
            signature = Some(value);
        }
    }

    let credential = credential.ok_or(SigningError::InvalidAuthHeader)?;
    let signed_headers = signed_headers.ok_or(SigningError::InvalidAuthHeader)?;
    let signature = signature.ok_or(SigningError::InvalidAuthHeader)?;

    let cred_parts: Vec<&str> = credential.splitn(5, '/').collect();
    if cred_parts.len() != 5 || cred_parts[4] != SCOPE_TERMINATOR {
        return Err(SigningError::InvalidCredential);
    }

    Ok(SignatureScope {
        access_key_id: cred_parts[0].to_owned(),
        date: cred_parts[1].to_owned(),
        region: cred_parts[2].to_owned(),
        service: cred_parts[3].to_owned(),
        signed_headers: signed_headers.split(';').map(ToOwned::to_owned).collect(),
        signature: signature.to_owned(),
    })
}

/// Build the SigV4 string to sign.
///
/// ```text
/// AWS4-HMAC-SHA256\n
/// <YYYYMMDDTHHMMSSZ>\n
/// <credential_scope>\n
/// <hex(SHA256(canonical_request))>
/// ```
#[must_use]
pub fn build_string_to_sign(
    amz_date: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{ALGORITHM}\n{amz_date}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the SigV4 signing key.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, SCOPE_TERMINATOR.as_bytes())
}

/// Hex HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Hex SHA-256 of a request body.
///
/// # Examples
///
/// ```
/// use cloudproof_auth::sigv4::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
