//! API variants and the request canonicalizer.
//!
//! A proof signs one fixed, read-only AWS call. [`ApiVariant`] describes that
//! call as data (host, signing scope, body, headers, response shape) so both
//! supported calls share a single create/verify pipeline.
//!
//! [`canonicalize`] turns a variant into the concrete [`CanonicalRequest`].
//! The claimant calls it at [`RequestStage::Signing`] and the verifier at
//! [`RequestStage::Replay`]; for the same variant and timestamp the signed
//! surface (`host`, `x-amz-date`, `x-amz-security-token`, `content-length`)
//! comes out identical on both sides.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use cloudproof_auth::SigningError;
use cloudproof_auth::sigv4::hash_payload;
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// How a successful provider response is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseShape {
    /// STS `GetCallerIdentityResponse` XML envelope.
    CallerIdentityXml,
    /// Organizations `DescribeOrganization` JSON document.
    OrganizationJson,
}

/// The request body a variant signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedBody {
    /// `application/x-www-form-urlencoded` fields, encoded in the given order.
    FormUrlEncoded(&'static [(&'static str, &'static str)]),
    /// No body at all.
    Empty,
}

/// Which side of the protocol is building the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    /// The claimant, about to sign.
    Signing,
    /// The verifier, about to replay a proof.
    Replay,
}

/// Descriptor of a signable AWS API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVariant {
    /// Short name used in logs.
    pub name: &'static str,
    /// Provider host; also the signed `host` header.
    pub host: &'static str,
    /// URI path of the call.
    pub path: &'static str,
    /// SigV4 service name of the credential scope.
    pub service: &'static str,
    /// SigV4 region of the credential scope.
    pub region: &'static str,
    /// The body to send.
    pub body: SignedBody,
    /// Unsigned headers sent at both stages.
    pub headers: &'static [(&'static str, &'static str)],
    /// Unsigned headers sent only when replaying.
    pub replay_headers: &'static [(&'static str, &'static str)],
    /// How to decode a successful response.
    pub response_shape: ResponseShape,
}

/// STS `GetCallerIdentity`: proves the caller's ARN, user id and account.
pub const IDENTITY_LOOKUP: ApiVariant = ApiVariant {
    name: "GetCallerIdentity",
    host: "sts.amazonaws.com",
    path: "/",
    service: "sts",
    region: "us-east-1",
    body: SignedBody::FormUrlEncoded(&[
        ("Action", "GetCallerIdentity"),
        ("Version", "2011-06-15"),
    ]),
    headers: &[
        ("accept-encoding", "identity"),
        ("content-type", "application/x-www-form-urlencoded"),
    ],
    replay_headers: &[],
    response_shape: ResponseShape::CallerIdentityXml,
};

/// Organizations `DescribeOrganization`: proves membership of an AWS Organization.
///
/// `Content-Type` is attached only on replay, never on the signed request.
pub const ORGANIZATION_LOOKUP: ApiVariant = ApiVariant {
    name: "DescribeOrganization",
    host: "organizations.us-east-1.amazonaws.com",
    path: "/",
    service: "organizations",
    region: "us-east-1",
    body: SignedBody::Empty,
    headers: &[(
        "x-amz-target",
        "AWSOrganizationsV20161128.DescribeOrganization",
    )],
    replay_headers: &[("content-type", "application/x-amz-json-1.1")],
    response_shape: ResponseShape::OrganizationJson,
};

impl ApiVariant {
    /// The real provider URL, `https://<host><path>`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("https://{}{}", self.host, self.path)
    }

    /// The encoded request body.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudproof_core::variant::IDENTITY_LOOKUP;
    ///
    /// assert_eq!(
    ///     IDENTITY_LOOKUP.encoded_body().as_ref(),
    ///     b"Action=GetCallerIdentity&Version=2011-06-15"
    /// );
    /// ```
    #[must_use]
    pub fn encoded_body(&self) -> Bytes {
        match self.body {
            SignedBody::FormUrlEncoded(fields) => Bytes::from(
                form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields.iter())
                    .finish(),
            ),
            SignedBody::Empty => Bytes::new(),
        }
    }
}

/// A fully built, signable request.
///
/// Wire headers (`headers`) are everything that travels with the request.
/// Only the names in `signed_headers` enter the signature, together with the
/// `host`, `x-amz-date` and `x-amz-security-token` headers the signer adds.
#[derive(Debug, Clone)]
pub struct CanonicalRequest {
    method: Method,
    host: String,
    path: String,
    query: String,
    headers: HeaderMap,
    signed_headers: Vec<HeaderName>,
    body: Bytes,
    payload_hash: String,
    time: DateTime<Utc>,
}

impl CanonicalRequest {
    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Provider host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// URI path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Wire headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Hex SHA-256 of the body.
    #[must_use]
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }

    /// The instant this request is pinned to.
    #[must_use]
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Wire headers that enter the signature, as `(name, value)` pairs.
    #[must_use]
    pub fn signed_header_pairs(&self) -> Vec<(&str, &str)> {
        self.signed_headers
            .iter()
            .filter_map(|name| {
                let value = self.headers.get(name)?.to_str().ok()?;
                Some((name.as_str(), value))
            })
            .collect()
    }

    /// Convert into an HTTP request aimed at `endpoint`.
    ///
    /// `Transfer-Encoding` is stripped; it is never part of the signed surface.
    ///
    /// # Errors
    ///
    /// Returns the `http` builder error if `endpoint` is not a valid URI.
    pub fn into_http_request(self, endpoint: &str) -> Result<http::Request<Bytes>, http::Error> {
        let mut request = http::Request::builder()
            .method(self.method)
            .uri(endpoint)
            .body(self.body)?;
        *request.headers_mut() = self.headers;
        request.headers_mut().remove(TRANSFER_ENCODING);
        Ok(request)
    }
}

/// Build the canonical request for `variant` at `stage`, pinned to `time`.
///
/// # Errors
///
/// Returns [`SigningError::InvalidHeaderValue`] if `user_agent` is not a legal
/// header value.
pub fn canonicalize(
    variant: &ApiVariant,
    stage: RequestStage,
    time: DateTime<Utc>,
    user_agent: &str,
) -> Result<CanonicalRequest, SigningError> {
    let body = variant.encoded_body();
    let payload_hash = hash_payload(&body);

    let mut headers = HeaderMap::new();
    let user_agent = HeaderValue::from_str(user_agent)
        .map_err(|_| SigningError::InvalidHeaderValue(USER_AGENT.as_str().to_owned()))?;
    headers.insert(USER_AGENT, user_agent);

    let stage_headers = match stage {
        RequestStage::Signing => &[][..],
        RequestStage::Replay => variant.replay_headers,
    };
    for &(name, value) in variant.headers.iter().chain(stage_headers) {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    let mut signed_headers = Vec::new();
    if !body.is_empty() {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        signed_headers.push(CONTENT_LENGTH);
    }

    Ok(CanonicalRequest {
        method: Method::POST,
        host: variant.host.to_owned(),
        path: variant.path.to_owned(),
        query: String::new(),
        headers,
        signed_headers,
        body,
        payload_hash,
        time,
    })
}
