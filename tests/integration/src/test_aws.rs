//! Tests against real AWS.
//!
//! They use the ambient AWS credential chain and compare the verified
//! attestation with what the AWS SDK reports for the same credentials.

#[cfg(test)]
mod tests {
    use aws_config::BehaviorVersion;
    use cloudproof_core::{
        ProofError, ProofOptions, VerifyOptions, create_identity_proof, create_organization_proof,
        verify_identity_proof, verify_organization_proof,
    };
    use http::StatusCode;

    use crate::init_tracing;

    #[tokio::test]
    #[ignore = "requires AWS credentials and network access"]
    async fn test_should_match_sdk_caller_identity() {
        init_tracing();

        let artifact = create_identity_proof(&ProofOptions::default()).await.unwrap();
        let identity = verify_identity_proof(&artifact, &VerifyOptions::default())
            .await
            .unwrap();

        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let client = aws_sdk_sts::Client::new(&config);
        let expected = client.get_caller_identity().send().await.unwrap();

        assert_eq!(Some(identity.arn.as_str()), expected.arn());
        assert_eq!(Some(identity.user_id.as_str()), expected.user_id());
        assert_eq!(Some(identity.account.as_str()), expected.account());
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials and network access"]
    async fn test_should_reject_tampered_proof_at_sts() {
        init_tracing();

        let artifact = create_identity_proof(&ProofOptions::default()).await.unwrap();
        let tampered = cloudproof_core::ProofArtifact::new(
            artifact.signature().replace("Signature=", "Signature=0"),
            artifact.time(),
            artifact.session_token(),
        );

        let err = verify_identity_proof(&tampered, &VerifyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProofError::Verification { status, .. } if status == StatusCode::FORBIDDEN
        ));
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials in an AWS Organization and network access"]
    async fn test_should_verify_organization_membership() {
        init_tracing();

        let artifact = create_organization_proof(&ProofOptions::default())
            .await
            .unwrap();
        let org = verify_organization_proof(&artifact, &VerifyOptions::default())
            .await
            .unwrap();

        assert!(org.id.starts_with("o-"));
        assert!(org.arn.contains(&org.id));
    }
}
