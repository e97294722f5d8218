//! Decoding of successful provider responses into attestations.
//!
//! Each [`ResponseShape`] has its own decoder. Decoders only run on 2xx
//! responses and require every identifying field to be present; they never
//! fill in empty values for a field the provider did not send.

mod json;
mod xml;

pub use json::decode_organization;
pub use xml::decode_caller_identity;

use crate::error::DecodeError;
use crate::model::Attestation;
use crate::variant::ResponseShape;

/// Decode a success body according to `shape`.
///
/// # Errors
///
/// Returns [`DecodeError`] if the body is malformed or lacks a required field.
pub fn decode_response(shape: ResponseShape, body: &[u8]) -> Result<Attestation, DecodeError> {
    match shape {
        ResponseShape::CallerIdentityXml => decode_caller_identity(body).map(Attestation::Identity),
        ResponseShape::OrganizationJson => decode_organization(body).map(Attestation::Organization),
    }
}
