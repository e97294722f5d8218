//! A local stand-in for STS and Organizations.
//!
//! The stub knows the secret of one access key. It recomputes the SigV4
//! signature of every request from the headers it received, the host it
//! impersonates and that secret, and answers like AWS: the canned attestation
//! on a match, `403 SignatureDoesNotMatch` otherwise.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use bytes::Bytes;
use chrono::NaiveDateTime;
use cloudproof_auth::{
    Credentials, SigningParams, SigningRequest, hash_payload, parse_authorization_header, sign,
};
use cloudproof_core::ApiVariant;
use cloudproof_core::variant::ResponseShape;
use http::header::AUTHORIZATION;
use http::{HeaderMap, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, warn};

/// Headers the signer adds itself; everything else in `SignedHeaders` is
/// taken from the received request.
const SYNTHETIC_HEADERS: [&str; 3] = ["host", "x-amz-date", "x-amz-security-token"];

/// Canned `GetCallerIdentity` success body.
pub const IDENTITY_RESPONSE: &str = r#"<GetCallerIdentityResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <GetCallerIdentityResult>
    <Arn>arn:aws:sts::123456789012:assumed-role/ci/runner</Arn>
    <UserId>AROASTUB:runner</UserId>
    <Account>123456789012</Account>
  </GetCallerIdentityResult>
  <ResponseMetadata>
    <RequestId>c0ffee00-0000-0000-0000-000000000000</RequestId>
  </ResponseMetadata>
</GetCallerIdentityResponse>"#;

/// Canned `DescribeOrganization` success body.
pub const ORGANIZATION_RESPONSE: &str = r#"{"Organization":{"Arn":"arn:aws:organizations::123456789012:organization/o-stub","AvailablePolicyTypes":[],"FeatureSet":"ALL","Id":"o-stub","MasterAccountArn":"arn:aws:organizations::123456789012:account/o-stub/123456789012","MasterAccountEmail":"root@example.com","MasterAccountId":"123456789012"}}"#;

/// A provider that accepts requests signed by one known key.
#[derive(Debug, Clone)]
pub struct StubProvider {
    variant: ApiVariant,
    secret_access_key: String,
    success_body: &'static str,
}

impl StubProvider {
    /// Impersonate the provider of `variant`, trusting `secret_access_key`.
    #[must_use]
    pub fn new(variant: ApiVariant, secret_access_key: impl Into<String>) -> Self {
        let success_body = match variant.response_shape {
            ResponseShape::CallerIdentityXml => IDENTITY_RESPONSE,
            ResponseShape::OrganizationJson => ORGANIZATION_RESPONSE,
        };
        Self {
            variant,
            secret_access_key: secret_access_key.into(),
            success_body,
        }
    }

    /// Bind to an ephemeral local port and serve until the runtime shuts down.
    ///
    /// Returns the endpoint URL to verify against.
    pub async fn spawn(self) -> Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("cannot bind stub provider")?;
        let addr: SocketAddr = listener.local_addr()?;
        let provider = Arc::new(self);

        tokio::spawn(async move {
            let http = HttpConnBuilder::new(TokioExecutor::new());
            loop {
                let (stream, peer_addr) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "stub failed to accept connection");
                        continue;
                    }
                };

                let provider = Arc::clone(&provider);
                let svc = service_fn(move |req| {
                    let provider = Arc::clone(&provider);
                    async move { provider.handle(req).await }
                });
                let conn = http.serve_connection(TokioIo::new(stream), svc).into_owned();

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        warn!(peer_addr = %peer_addr, error = %e, "stub connection error");
                    }
                });
            }
        });

        Ok(format!("http://{addr}/"))
    }

    async fn handle(&self, req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => return Ok(respond(StatusCode::BAD_REQUEST, e.to_string())),
        };
        let request = Request::from_parts(parts, body);

        match self.check(&request) {
            Ok(()) => Ok(respond(StatusCode::OK, self.success_body)),
            Err(e) => {
                debug!(error = %e, "stub rejected request");
                Ok(respond(
                    StatusCode::FORBIDDEN,
                    format!("SignatureDoesNotMatch: {e}"),
                ))
            }
        }
    }

    fn check(&self, request: &Request<Bytes>) -> Result<()> {
        let headers = request.headers();
        for &(name, value) in self.variant.headers.iter().chain(self.variant.replay_headers) {
            if header(headers, name)? != value {
                bail!("unexpected value for {name}");
            }
        }

        let authorization = header(headers, AUTHORIZATION.as_str())?;
        let scope = parse_authorization_header(authorization)?;
        let time = NaiveDateTime::parse_from_str(header(headers, "x-amz-date")?, "%Y%m%dT%H%M%SZ")
            .context("malformed x-amz-date")?
            .and_utc();
        let token = headers
            .get("x-amz-security-token")
            .map(|v| v.to_str().map(str::to_owned))
            .transpose()?;

        let mut signed = Vec::new();
        for name in &scope.signed_headers {
            if !SYNTHETIC_HEADERS.contains(&name.as_str()) {
                signed.push((name.as_str(), header(headers, name)?));
            }
        }

        let credentials = Credentials::new(scope.access_key_id.clone(), &self.secret_access_key, token);
        let expected = sign(
            &SigningRequest {
                method: request.method().as_str(),
                host: self.variant.host,
                path: request.uri().path(),
                query: request.uri().query().unwrap_or_default(),
                headers: &signed,
                payload_hash: &hash_payload(request.body()),
            },
            &SigningParams {
                credentials: &credentials,
                region: &scope.region,
                service: &scope.service,
                time,
            },
        )?;

        if expected.authorization != authorization {
            bail!("signature mismatch");
        }
        Ok(())
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str> {
    headers
        .get(name)
        .ok_or_else(|| anyhow!("missing header {name}"))?
        .to_str()
        .with_context(|| format!("non-ASCII header {name}"))
}

fn respond(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
}
