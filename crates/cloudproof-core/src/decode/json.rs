//! Organizations `DescribeOrganization` JSON decoding.

use serde::Deserialize;

use crate::error::DecodeError;
use crate::model::{Organization, PolicyTypeSummary};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeOrganizationOutput {
    organization: OrganizationBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OrganizationBody {
    arn: String,
    id: String,
    #[serde(default)]
    available_policy_types: Vec<PolicyTypeBody>,
    #[serde(default)]
    feature_set: String,
    #[serde(default)]
    master_account_arn: String,
    #[serde(default)]
    master_account_email: String,
    #[serde(default)]
    master_account_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PolicyTypeBody {
    #[serde(default)]
    status: String,
    #[serde(default, rename = "Type")]
    policy_type: String,
}

/// Decode a `DescribeOrganization` response into an [`Organization`].
///
/// The provider's `MasterAccount*` fields surface as `main_account_*`.
///
/// # Errors
///
/// Returns [`DecodeError::Json`] if the body is not JSON or lacks
/// `Organization.Arn` or `Organization.Id`.
pub fn decode_organization(body: &[u8]) -> Result<Organization, DecodeError> {
    let output: DescribeOrganizationOutput = serde_json::from_slice(body)?;
    let org = output.organization;

    Ok(Organization {
        arn: org.arn,
        id: org.id,
        available_policy_types: org
            .available_policy_types
            .into_iter()
            .map(|p| PolicyTypeSummary {
                status: p.status,
                policy_type: p.policy_type,
            })
            .collect(),
        feature_set: org.feature_set,
        main_account_arn: org.master_account_arn,
        main_account_email: org.master_account_email,
        main_account_id: org.master_account_id,
    })
}
