//! Integration tests for the deal lifecycle: brand response, signatures and
//! execution status.

use jiff::Timestamp;
use testresult::TestResult;
use uuid::Uuid;

use creator_deals::prelude::*;

const CREATOR_EMAIL: &str = "asha@example.in";
const BRAND_EMAIL: &str = "legal@glow.example.com";

fn signed(deal_id: Uuid, role: SignerRole, email: &str) -> Signature {
    Signature {
        id: Uuid::now_v7(),
        deal_id,
        signer_role: Some(role),
        signer_name: Some("Signer".to_string()),
        signer_email: Some(email.to_string()),
        signed: true,
        signed_at: Some("2025-03-10T11:59:00Z".to_string()),
        otp_verified: true,
        otp_verified_at: Some("2025-03-10T11:58:00Z".to_string()),
        ip_address: Some("203.0.113.7".to_string()),
        user_agent: Some("Mozilla/5.0".to_string()),
    }
}

#[test]
fn verified_acceptance_never_reads_as_details_submitted() -> TestResult {
    let mut deal = Deal::default();

    for next in [
        BrandResponseStatus::Accepted,
        BrandResponseStatus::AcceptedVerified,
    ] {
        deal.brand_response_status = deal.brand_response_status.transition(next)?;
    }

    for later in [
        BrandResponseStatus::Pending,
        BrandResponseStatus::Negotiating,
        BrandResponseStatus::Accepted,
        BrandResponseStatus::AcceptedVerified,
    ] {
        deal.brand_response_status = deal.brand_response_status.transition(later)?;

        assert_eq!(deal.brand_response_status, BrandResponseStatus::AcceptedVerified);
        assert_eq!(deal.contract_status(), ContractStatus::AcceptedVerified);
        assert_ne!(deal.contract_status().label(), "Details Submitted");
    }

    Ok(())
}

#[test]
fn every_signature_check_is_load_bearing() -> TestResult {
    let now: Timestamp = "2025-03-10T12:00:00Z".parse()?;
    let deal_id = Uuid::now_v7();
    let context = VerificationContext {
        deal_id,
        expected_email: Some(CREATOR_EMAIL),
        now,
    };

    let valid = signed(deal_id, SignerRole::Creator, CREATOR_EMAIL);

    assert!(verify_signature(&valid, &context).is_valid());

    let flipped = [
        Signature {
            signed_at: Some("2030-01-01T00:00:00Z".to_string()),
            ..valid.clone()
        },
        Signature {
            signer_email: Some("impostor@example.in".to_string()),
            ..valid.clone()
        },
        Signature {
            deal_id: Uuid::now_v7(),
            ..valid.clone()
        },
        Signature {
            otp_verified_at: None,
            ..valid.clone()
        },
        Signature {
            ip_address: None,
            ..valid.clone()
        },
    ];

    for signature in &flipped {
        assert!(
            !verify_signature(signature, &context).is_valid(),
            "{signature:?}"
        );
    }

    let no_session = VerificationContext {
        expected_email: None,
        ..context
    };

    assert!(!verify_signature(&valid, &no_session).is_valid());

    Ok(())
}

#[test]
fn deal_is_signed_only_after_both_valid_signatures() -> TestResult {
    let now: Timestamp = "2025-03-10T12:00:00Z".parse()?;
    let mut deal = Deal {
        id: Uuid::now_v7(),
        brand_response_status: BrandResponseStatus::AcceptedVerified,
        ..Deal::default()
    };

    let creator = signed(deal.id, SignerRole::Creator, CREATOR_EMAIL);
    let unverified_brand = Signature {
        otp_verified: false,
        ..signed(deal.id, SignerRole::Brand, BRAND_EMAIL)
    };

    let state = DualSignatureState::verify(
        deal.id,
        (Some(&creator), Some(CREATOR_EMAIL)),
        (Some(&unverified_brand), Some(BRAND_EMAIL)),
        now,
    );

    deal.deal_execution_status = advance_execution(deal.deal_execution_status, &state);

    assert_eq!(deal.deal_execution_status, None);
    assert_eq!(deal.contract_status(), ContractStatus::AcceptedVerified);
    assert!(deal.ensure_deletable(2).is_err());

    let brand = signed(deal.id, SignerRole::Brand, BRAND_EMAIL);
    let state = DualSignatureState::verify(
        deal.id,
        (Some(&creator), Some(CREATOR_EMAIL)),
        (Some(&brand), Some(BRAND_EMAIL)),
        now,
    );

    deal.deal_execution_status = advance_execution(deal.deal_execution_status, &state);

    assert_eq!(deal.contract_status(), ContractStatus::Signed);

    deal.deal_execution_status = Some(complete_execution(deal.deal_execution_status)?);

    assert_eq!(deal.contract_status(), ContractStatus::Completed);
    assert!(matches!(
        deal.ensure_deletable(0),
        Err(DeletionRefused::Executed(DealExecutionStatus::Completed))
    ));

    Ok(())
}

#[test]
fn consumed_code_reverifies_without_rearming() -> TestResult {
    let now: Timestamp = "2025-03-10T12:00:00Z".parse()?;
    let challenge = OtpChallenge::issue(
        Uuid::now_v7(),
        Uuid::now_v7(),
        SignerRole::Brand,
        "204816",
        now,
        DEFAULT_OTP_TTL,
    )?;

    assert_eq!(check_code(Some(&challenge), "204816", now)?, OtpOutcome::Verified);

    let consumed = OtpChallenge {
        consumed_at: Some(now),
        ..challenge
    };

    assert_eq!(
        check_code(Some(&consumed), "204816", now)?,
        OtpOutcome::AlreadyVerified
    );
    assert_eq!(
        check_code(Some(&consumed), "999999", now),
        Err(OtpError::NoActiveChallenge)
    );

    Ok(())
}
