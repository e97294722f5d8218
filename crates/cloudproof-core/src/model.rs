//! Attested records returned by a successful verification.

use serde::{Deserialize, Serialize};

/// The AWS principal behind a verified identity proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// ARN of the calling principal, e.g. an assumed-role session ARN.
    pub arn: String,
    /// Unique id of the principal (`AROA...:session` for roles).
    pub user_id: String,
    /// 12-digit AWS account id.
    pub account: String,
}

/// A policy type and whether it is enabled in the organization root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyTypeSummary {
    /// `ENABLED`, `PENDING_ENABLE` or `PENDING_DISABLE`.
    pub status: String,
    /// Policy type, e.g. `SERVICE_CONTROL_POLICY`.
    #[serde(rename = "type")]
    pub policy_type: String,
}

/// The AWS Organization behind a verified organization proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Organization ARN.
    pub arn: String,
    /// Organization id (`o-...`).
    pub id: String,
    /// Policy types available in the organization.
    pub available_policy_types: Vec<PolicyTypeSummary>,
    /// `ALL` or `CONSOLIDATED_BILLING`.
    pub feature_set: String,
    /// ARN of the management account.
    pub main_account_arn: String,
    /// Email of the management account.
    pub main_account_email: String,
    /// Account id of the management account.
    pub main_account_id: String,
}

/// What a verified proof attests to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Attestation {
    /// Result of an identity lookup.
    Identity(Identity),
    /// Result of an organization lookup.
    Organization(Organization),
}
