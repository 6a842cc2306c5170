//! OTP service.
//!
//! Issues codes to the party registered for a signer role and turns a verified
//! code into that party's signature.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use creator_deals::{
    deals::{BrandResponseStatus, Deal, advance_execution},
    otp::{OtpChallenge, OtpError, OtpOutcome, check_code, normalize_code},
    signatures::{DualSignatureState, Signature, SignerRole, VerificationContext, may_sign},
};
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    database::{Db, within},
    domain::{
        deals::{
            DealsServiceError,
            records::{CreatorUuid, DealUuid},
            repository::{DealsRepository, PgDealsRepository},
        },
        notifications::{Notifier, mask_email},
        otp::{
            code::OtpCode,
            errors::OtpServiceError,
            records::{ChallengeUuid, SigningRecord},
            repository::{OtpChallengesRepository, PgOtpChallengesRepository},
        },
        signatures::repository::{PgSignaturesRepository, SignaturesRepository},
    },
};

/// A code that was stored and handed to the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IssuedChallenge {
    pub challenge: ChallengeUuid,
    pub expires_at: Timestamp,
}

/// Who is signing, as reported by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignerDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A code submitted for one deal and signer role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpVerification {
    pub deal: DealUuid,
    pub role: SignerRole,
    pub code: String,
    pub signer: SignerDetails,
}

#[derive(Clone)]
pub struct PgOtpService {
    challenges: Arc<dyn OtpChallengesRepository>,
    deals: Arc<dyn DealsRepository>,
    signatures: Arc<dyn SignaturesRepository>,
    notifier: Arc<dyn Notifier>,
    ttl: SignedDuration,
    timeout: Duration,
}

impl PgOtpService {
    #[must_use]
    pub fn new(
        db: Db,
        notifier: Arc<dyn Notifier>,
        ttl: SignedDuration,
        timeout: Duration,
    ) -> Self {
        Self::with_repositories(
            Arc::new(PgOtpChallengesRepository::new(db.clone())),
            Arc::new(PgDealsRepository::new(db.clone())),
            Arc::new(PgSignaturesRepository::new(db)),
            notifier,
            ttl,
            timeout,
        )
    }

    #[must_use]
    pub fn with_repositories(
        challenges: Arc<dyn OtpChallengesRepository>,
        deals: Arc<dyn DealsRepository>,
        signatures: Arc<dyn SignaturesRepository>,
        notifier: Arc<dyn Notifier>,
        ttl: SignedDuration,
        timeout: Duration,
    ) -> Self {
        Self {
            challenges,
            deals,
            signatures,
            notifier,
            ttl,
            timeout,
        }
    }

    /// Registered email of the party holding `role` on `deal`.
    async fn registered_email(
        &self,
        deal: &Deal,
        role: SignerRole,
    ) -> Result<String, OtpServiceError> {
        let email = match role {
            SignerRole::Brand => deal.brand_email.clone(),
            SignerRole::Creator => {
                within(
                    self.timeout,
                    self.deals.get_creator(CreatorUuid::from_uuid(deal.creator_id)),
                )
                .await??
                .email
            }
        };

        email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .ok_or(OtpServiceError::NoRecipient(role))
    }

    async fn load_signable_deal(&self, deal: DealUuid) -> Result<Deal, OtpServiceError> {
        let record = within(self.timeout, self.deals.get_deal(deal)).await??;

        record
            .ensure_contract_ready()
            .map_err(DealsServiceError::from)?;

        Ok(record)
    }

    async fn deliver(&self, role: SignerRole, recipient: &str, code: &OtpCode, deal: &Deal) {
        match within(self.timeout, self.notifier.send(role, recipient, code, deal)).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                warn!(deal = %deal.id, role = %role, error = %error, "OTP delivery failed");
            }
            Err(error) => {
                warn!(deal = %deal.id, role = %role, error = %error, "OTP delivery timed out");
            }
        }
    }
}

impl std::fmt::Debug for PgOtpService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgOtpService")
            .field("ttl", &self.ttl)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OtpService for PgOtpService {
    async fn issue(
        &self,
        deal: DealUuid,
        role: SignerRole,
        now: Timestamp,
    ) -> Result<IssuedChallenge, OtpServiceError> {
        let record = self.load_signable_deal(deal).await?;
        let recipient = self.registered_email(&record, role).await?;

        let code = OtpCode::generate();
        let challenge_uuid = ChallengeUuid::new();
        let challenge = OtpChallenge::issue(
            challenge_uuid.into_uuid(),
            record.id,
            role,
            code.expose(),
            now,
            self.ttl,
        )?;

        within(self.timeout, self.challenges.replace_active_challenge(&challenge)).await??;

        info!(
            deal = %deal,
            role = %role,
            recipient = %mask_email(&recipient),
            expires_at = %challenge.expires_at,
            "OTP issued"
        );

        self.deliver(role, &recipient, &code, &record).await;

        Ok(IssuedChallenge {
            challenge: challenge_uuid,
            expires_at: challenge.expires_at,
        })
    }

    async fn verify(
        &self,
        verification: OtpVerification,
        now: Timestamp,
    ) -> Result<OtpOutcome, OtpServiceError> {
        let OtpVerification {
            deal,
            role,
            code,
            signer,
        } = verification;

        let code = normalize_code(&code)?;
        let signer = CompleteSigner::try_from(signer)?;

        let record = self.load_signable_deal(deal).await?;
        let registered = self.registered_email(&record, role).await?;

        if !signer.email.eq_ignore_ascii_case(&registered) {
            return Err(OtpServiceError::SignerMismatch(role));
        }

        let latest = within(self.timeout, self.challenges.latest_challenge(deal, role)).await??;

        if check_code(latest.as_ref(), code, now)? == OtpOutcome::AlreadyVerified {
            info!(deal = %deal, role = %role, "OTP already verified");

            return Ok(OtpOutcome::AlreadyVerified);
        }

        let Some(challenge) = latest else {
            return Err(OtpError::NoActiveChallenge.into());
        };

        let brand_response = match role {
            SignerRole::Brand => {
                let current = record.brand_response_status;
                let next = current.transition(BrandResponseStatus::AcceptedVerified)?;

                (next != current).then_some(next)
            }
            SignerRole::Creator => None,
        };

        let rows = within(self.timeout, self.signatures.active_signatures(deal)).await??;
        let existing = rows.for_role(role);

        let context = VerificationContext {
            deal_id: record.id,
            expected_email: Some(&registered),
            now,
        };

        if !may_sign(existing, &context) {
            return Err(OtpServiceError::AlreadySigned);
        }

        let signature = signer.into_signature(record.id, role, now);

        let creator_email = match role {
            SignerRole::Creator => Some(registered.clone()),
            SignerRole::Brand => {
                within(
                    self.timeout,
                    self.deals.get_creator(CreatorUuid::from_uuid(record.creator_id)),
                )
                .await??
                .email
            }
        };

        let (creator, brand) = match role {
            SignerRole::Creator => (Some(&signature), rows.brand.as_ref()),
            SignerRole::Brand => (rows.creator.as_ref(), Some(&signature)),
        };

        let state = DualSignatureState::verify(
            record.id,
            (creator, creator_email.as_deref()),
            (brand, record.brand_email.as_deref()),
            now,
        );

        let execution = advance_execution(record.deal_execution_status, &state)
            .filter(|status| Some(*status) != record.deal_execution_status);

        let signing = SigningRecord {
            challenge: ChallengeUuid::from_uuid(challenge.id),
            consumed_at: now,
            signature,
            supersedes: existing.map(|row| row.id),
            brand_response,
            execution,
        };

        if !within(self.timeout, self.challenges.complete_signing(&signing)).await?? {
            info!(deal = %deal, role = %role, "OTP consumed concurrently");

            return Ok(OtpOutcome::AlreadyVerified);
        }

        info!(
            deal = %deal,
            role = %role,
            signature = %signing.signature.id,
            brand_response = ?signing.brand_response,
            execution = ?signing.execution,
            "deal signed"
        );

        Ok(OtpOutcome::Verified)
    }
}

/// Signer details with every field present.
struct CompleteSigner {
    name: String,
    email: String,
    ip_address: String,
    user_agent: String,
}

impl TryFrom<SignerDetails> for CompleteSigner {
    type Error = OtpServiceError;

    fn try_from(details: SignerDetails) -> Result<Self, Self::Error> {
        let field = |value: Option<String>| {
            value
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(OtpServiceError::IncompleteSigner)
        };

        Ok(Self {
            name: field(details.name)?,
            email: field(details.email)?,
            ip_address: field(details.ip_address)?,
            user_agent: field(details.user_agent)?,
        })
    }
}

impl CompleteSigner {
    fn into_signature(self, deal_id: Uuid, role: SignerRole, now: Timestamp) -> Signature {
        Signature {
            id: Uuid::now_v7(),
            deal_id,
            signer_role: Some(role),
            signer_name: Some(self.name),
            signer_email: Some(self.email),
            signed: true,
            signed_at: Some(now.to_string()),
            otp_verified: true,
            otp_verified_at: Some(now.to_string()),
            ip_address: Some(self.ip_address),
            user_agent: Some(self.user_agent),
        }
    }
}

#[automock]
#[async_trait]
/// OTP issuance and verification.
pub trait OtpService: Send + Sync {
    /// Replace any active code for the deal and role with a fresh one and send it
    /// to the party's registered email. Delivery failure does not fail issuance.
    async fn issue(
        &self,
        deal: DealUuid,
        role: SignerRole,
        now: Timestamp,
    ) -> Result<IssuedChallenge, OtpServiceError>;

    /// Verify a code and record the signature it authorises.
    ///
    /// A failed attempt writes nothing. Re-submitting a consumed code returns
    /// [`OtpOutcome::AlreadyVerified`] without further writes.
    async fn verify(
        &self,
        verification: OtpVerification,
        now: Timestamp,
    ) -> Result<OtpOutcome, OtpServiceError>;
}

#[cfg(test)]
mod tests {
    use std::future::pending;

    use creator_deals::{
        deals::DealExecutionStatus,
        otp::{DEFAULT_OTP_TTL, OtpError},
        parties::{CreatorInfo, PartyInfo},
        validation::ValidationError,
    };
    use testresult::TestResult;

    use crate::domain::{
        deals::repository::MockDealsRepository,
        notifications::{MockNotifier, NotifyError},
        otp::repository::MockOtpChallengesRepository,
        signatures::{records::DealSignatures, repository::MockSignaturesRepository},
    };

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);
    const CODE: &str = "482913";
    const CREATOR_EMAIL: &str = "asha@example.in";
    const BRAND_EMAIL: &str = "legal@glow.example.com";

    fn deal_uuid() -> DealUuid {
        DealUuid::from_uuid(Uuid::from_u128(0x0198_ab12_cd34_7000_8000_0000_0000_0002))
    }

    fn now() -> TestResult<Timestamp> {
        Ok("2025-03-10T12:00:00Z".parse()?)
    }

    fn deal(status: BrandResponseStatus) -> Deal {
        Deal {
            id: deal_uuid().into_uuid(),
            creator_id: Uuid::from_u128(42),
            brand_name: "Glow Cosmetics Pvt Ltd".to_string(),
            brand_email: Some(BRAND_EMAIL.to_string()),
            brand_response_status: status,
            ..Deal::default()
        }
    }

    fn creator() -> CreatorInfo {
        PartyInfo::new(Some("Asha Rao"), None, Some(CREATOR_EMAIL))
    }

    fn challenge(role: SignerRole, now: Timestamp) -> TestResult<OtpChallenge> {
        Ok(OtpChallenge::issue(
            Uuid::from_u128(5),
            deal_uuid().into_uuid(),
            role,
            CODE,
            now,
            DEFAULT_OTP_TTL,
        )?)
    }

    fn verification(role: SignerRole, email: &str, code: &str) -> OtpVerification {
        OtpVerification {
            deal: deal_uuid(),
            role,
            code: code.to_string(),
            signer: SignerDetails {
                name: Some("Priya Shah".to_string()),
                email: Some(email.to_string()),
                ip_address: Some("203.0.113.7".to_string()),
                user_agent: Some("Mozilla/5.0".to_string()),
            },
        }
    }

    fn valid_signature(role: SignerRole, email: &str) -> Signature {
        Signature {
            id: Uuid::from_u128(77),
            deal_id: deal_uuid().into_uuid(),
            signer_role: Some(role),
            signer_name: Some("Signer".to_string()),
            signer_email: Some(email.to_string()),
            signed: true,
            signed_at: Some("2025-03-09T10:00:00Z".to_string()),
            otp_verified: true,
            otp_verified_at: Some("2025-03-09T09:59:00Z".to_string()),
            ip_address: Some("198.51.100.4".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        }
    }

    struct Mocks {
        challenges: MockOtpChallengesRepository,
        deals: MockDealsRepository,
        signatures: MockSignaturesRepository,
        notifier: MockNotifier,
    }

    impl Mocks {
        fn new(status: BrandResponseStatus) -> Self {
            let mut deals = MockDealsRepository::new();

            deals.expect_get_deal().returning(move |_| Ok(deal(status)));
            deals.expect_get_creator().returning(|_| Ok(creator()));

            Self {
                challenges: MockOtpChallengesRepository::new(),
                deals,
                signatures: MockSignaturesRepository::new(),
                notifier: MockNotifier::new(),
            }
        }

        fn service(self) -> PgOtpService {
            PgOtpService::with_repositories(
                Arc::new(self.challenges),
                Arc::new(self.deals),
                Arc::new(self.signatures),
                Arc::new(self.notifier),
                DEFAULT_OTP_TTL,
                TIMEOUT,
            )
        }
    }

    #[tokio::test]
    async fn brand_verification_signs_and_verifies_acceptance() -> TestResult {
        let now = now()?;
        let mut mocks = Mocks::new(BrandResponseStatus::Accepted);
        let latest = challenge(SignerRole::Brand, now)?;

        mocks
            .challenges
            .expect_latest_challenge()
            .returning(move |_, _| Ok(Some(latest.clone())));

        mocks
            .signatures
            .expect_active_signatures()
            .returning(|_| Ok(DealSignatures::default()));

        mocks
            .challenges
            .expect_complete_signing()
            .withf(|record| {
                record.brand_response == Some(BrandResponseStatus::AcceptedVerified)
                    && record.execution.is_none()
                    && record.supersedes.is_none()
                    && record.signature.otp_verified
                    && record.signature.signer_email.as_deref() == Some(BRAND_EMAIL)
            })
            .times(1)
            .returning(|_| Ok(true));

        let outcome = mocks
            .service()
            .verify(verification(SignerRole::Brand, BRAND_EMAIL, CODE), now)
            .await?;

        assert_eq!(outcome, OtpOutcome::Verified);

        Ok(())
    }

    #[tokio::test]
    async fn reverifying_a_consumed_code_has_no_side_effects() -> TestResult {
        let now = now()?;
        let mut mocks = Mocks::new(BrandResponseStatus::AcceptedVerified);
        let consumed = OtpChallenge {
            consumed_at: Some(now),
            ..challenge(SignerRole::Brand, now)?
        };

        mocks
            .challenges
            .expect_latest_challenge()
            .returning(move |_, _| Ok(Some(consumed.clone())));

        mocks.signatures.expect_active_signatures().never();
        mocks.challenges.expect_complete_signing().never();

        let service = mocks.service();

        for _ in 0..2 {
            let outcome = service
                .verify(verification(SignerRole::Brand, BRAND_EMAIL, CODE), now)
                .await?;

            assert_eq!(outcome, OtpOutcome::AlreadyVerified);
        }

        Ok(())
    }

    #[tokio::test]
    async fn wrong_code_writes_nothing() -> TestResult {
        let now = now()?;
        let mut mocks = Mocks::new(BrandResponseStatus::Accepted);
        let latest = challenge(SignerRole::Brand, now)?;

        mocks
            .challenges
            .expect_latest_challenge()
            .returning(move |_, _| Ok(Some(latest.clone())));

        mocks.challenges.expect_complete_signing().never();

        let result = mocks
            .service()
            .verify(verification(SignerRole::Brand, BRAND_EMAIL, "000000"), now)
            .await;

        assert!(matches!(
            result,
            Err(OtpServiceError::Otp(OtpError::Mismatch))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn expired_code_writes_nothing() -> TestResult {
        let now = now()?;
        let mut mocks = Mocks::new(BrandResponseStatus::Accepted);
        let latest = challenge(SignerRole::Brand, now)?;
        let later = latest.expires_at;

        mocks
            .challenges
            .expect_latest_challenge()
            .returning(move |_, _| Ok(Some(latest.clone())));

        mocks.challenges.expect_complete_signing().never();

        let result = mocks
            .service()
            .verify(verification(SignerRole::Brand, BRAND_EMAIL, CODE), later)
            .await;

        assert!(matches!(result, Err(OtpServiceError::Otp(OtpError::Expired))));

        Ok(())
    }

    #[tokio::test]
    async fn second_signature_marks_deal_signed() -> TestResult {
        let now = now()?;
        let mut mocks = Mocks::new(BrandResponseStatus::AcceptedVerified);
        let latest = challenge(SignerRole::Creator, now)?;

        mocks
            .challenges
            .expect_latest_challenge()
            .returning(move |_, _| Ok(Some(latest.clone())));

        mocks.signatures.expect_active_signatures().returning(|_| {
            Ok(DealSignatures {
                brand: Some(valid_signature(SignerRole::Brand, BRAND_EMAIL)),
                ..DealSignatures::default()
            })
        });

        mocks
            .challenges
            .expect_complete_signing()
            .withf(|record| {
                record.execution == Some(DealExecutionStatus::Signed)
                    && record.brand_response.is_none()
            })
            .times(1)
            .returning(|_| Ok(true));

        let outcome = mocks
            .service()
            .verify(verification(SignerRole::Creator, CREATOR_EMAIL, CODE), now)
            .await?;

        assert_eq!(outcome, OtpOutcome::Verified);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_signature_is_superseded() -> TestResult {
        let now = now()?;
        let mut mocks = Mocks::new(BrandResponseStatus::AcceptedVerified);
        let latest = challenge(SignerRole::Creator, now)?;

        mocks
            .challenges
            .expect_latest_challenge()
            .returning(move |_, _| Ok(Some(latest.clone())));

        mocks.signatures.expect_active_signatures().returning(|_| {
            Ok(DealSignatures {
                creator: Some(Signature {
                    ip_address: None,
                    ..valid_signature(SignerRole::Creator, CREATOR_EMAIL)
                }),
                ..DealSignatures::default()
            })
        });

        mocks
            .challenges
            .expect_complete_signing()
            .withf(|record| record.supersedes == Some(Uuid::from_u128(77)))
            .times(1)
            .returning(|_| Ok(true));

        let outcome = mocks
            .service()
            .verify(verification(SignerRole::Creator, CREATOR_EMAIL, CODE), now)
            .await?;

        assert_eq!(outcome, OtpOutcome::Verified);

        Ok(())
    }

    #[tokio::test]
    async fn valid_signature_cannot_be_replaced() -> TestResult {
        let now = now()?;
        let mut mocks = Mocks::new(BrandResponseStatus::AcceptedVerified);
        let latest = challenge(SignerRole::Creator, now)?;

        mocks
            .challenges
            .expect_latest_challenge()
            .returning(move |_, _| Ok(Some(latest.clone())));

        mocks.signatures.expect_active_signatures().returning(|_| {
            Ok(DealSignatures {
                creator: Some(valid_signature(SignerRole::Creator, CREATOR_EMAIL)),
                ..DealSignatures::default()
            })
        });

        mocks.challenges.expect_complete_signing().never();

        let result = mocks
            .service()
            .verify(verification(SignerRole::Creator, CREATOR_EMAIL, CODE), now)
            .await;

        assert!(matches!(result, Err(OtpServiceError::AlreadySigned)));

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_consumption_is_already_verified() -> TestResult {
        let now = now()?;
        let mut mocks = Mocks::new(BrandResponseStatus::Accepted);
        let latest = challenge(SignerRole::Brand, now)?;

        mocks
            .challenges
            .expect_latest_challenge()
            .returning(move |_, _| Ok(Some(latest.clone())));

        mocks
            .signatures
            .expect_active_signatures()
            .returning(|_| Ok(DealSignatures::default()));

        mocks
            .challenges
            .expect_complete_signing()
            .returning(|_| Ok(false));

        let outcome = mocks
            .service()
            .verify(verification(SignerRole::Brand, BRAND_EMAIL, CODE), now)
            .await?;

        assert_eq!(outcome, OtpOutcome::AlreadyVerified);

        Ok(())
    }

    #[tokio::test]
    async fn signer_must_be_the_registered_party() -> TestResult {
        let mut mocks = Mocks::new(BrandResponseStatus::Accepted);

        mocks.challenges.expect_latest_challenge().never();

        let result = mocks
            .service()
            .verify(
                verification(SignerRole::Brand, "intern@glow.example.com", CODE),
                now()?,
            )
            .await;

        assert!(matches!(
            result,
            Err(OtpServiceError::SignerMismatch(SignerRole::Brand))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn incomplete_signer_is_rejected_before_any_lookup() -> TestResult {
        let mut mocks = Mocks::new(BrandResponseStatus::Accepted);

        mocks.challenges.expect_latest_challenge().never();

        let mut request = verification(SignerRole::Brand, BRAND_EMAIL, CODE);
        request.signer.user_agent = Some("  ".to_string());

        let result = mocks.service().verify(request, now()?).await;

        assert!(matches!(result, Err(OtpServiceError::IncompleteSigner)));

        Ok(())
    }

    #[tokio::test]
    async fn unaccepted_deal_cannot_be_signed() -> TestResult {
        let mut mocks = Mocks::new(BrandResponseStatus::Negotiating);

        mocks.challenges.expect_latest_challenge().never();

        let result = mocks
            .service()
            .verify(verification(SignerRole::Brand, BRAND_EMAIL, CODE), now()?)
            .await;

        assert!(matches!(
            result,
            Err(OtpServiceError::Deals(DealsServiceError::Validation(
                ValidationError::NotReadyForContract(BrandResponseStatus::Negotiating)
            )))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn issue_survives_delivery_failure() -> TestResult {
        let now = now()?;
        let mut mocks = Mocks::new(BrandResponseStatus::Accepted);

        mocks
            .challenges
            .expect_replace_active_challenge()
            .withf(|challenge| {
                challenge.signer_role == SignerRole::Brand && challenge.code_hash.len() == 64
            })
            .times(1)
            .returning(|_| Ok(()));

        mocks
            .notifier
            .expect_send()
            .withf(|role, recipient, _, _| {
                *role == SignerRole::Brand && recipient.eq_ignore_ascii_case(BRAND_EMAIL)
            })
            .times(1)
            .returning(|_, recipient, _, _| {
                Err(NotifyError::Delivery {
                    recipient: recipient.to_string(),
                    reason: "mailbox unavailable".to_string(),
                })
            });

        let issued = mocks.service().issue(deal_uuid(), SignerRole::Brand, now).await?;

        assert_eq!(issued.expires_at, "2025-03-10T12:10:00Z".parse()?);

        Ok(())
    }

    #[tokio::test]
    async fn issue_needs_a_registered_recipient() -> TestResult {
        let mut deals = MockDealsRepository::new();

        deals.expect_get_deal().returning(|_| {
            Ok(Deal {
                brand_email: Some(" ".to_string()),
                ..deal(BrandResponseStatus::Accepted)
            })
        });

        let mut challenges = MockOtpChallengesRepository::new();

        challenges.expect_replace_active_challenge().never();

        let service = PgOtpService::with_repositories(
            Arc::new(challenges),
            Arc::new(deals),
            Arc::new(MockSignaturesRepository::new()),
            Arc::new(MockNotifier::new()),
            DEFAULT_OTP_TTL,
            TIMEOUT,
        );

        let result = service.issue(deal_uuid(), SignerRole::Brand, now()?).await;

        assert!(matches!(
            result,
            Err(OtpServiceError::NoRecipient(SignerRole::Brand))
        ));

        Ok(())
    }

    struct StalledChallenges;

    #[async_trait]
    impl OtpChallengesRepository for StalledChallenges {
        async fn replace_active_challenge(
            &self,
            _challenge: &OtpChallenge,
        ) -> Result<(), sqlx::Error> {
            pending().await
        }

        async fn latest_challenge(
            &self,
            _deal: DealUuid,
            _role: SignerRole,
        ) -> Result<Option<OtpChallenge>, sqlx::Error> {
            pending().await
        }

        async fn complete_signing(&self, _record: &SigningRecord) -> Result<bool, sqlx::Error> {
            pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_store_never_verifies() -> TestResult {
        let mocks = Mocks::new(BrandResponseStatus::Accepted);

        let service = PgOtpService::with_repositories(
            Arc::new(StalledChallenges),
            Arc::new(mocks.deals),
            Arc::new(mocks.signatures),
            Arc::new(mocks.notifier),
            DEFAULT_OTP_TTL,
            TIMEOUT,
        );

        let result = service
            .verify(verification(SignerRole::Brand, BRAND_EMAIL, CODE), now()?)
            .await;

        assert!(matches!(result, Err(OtpServiceError::Unavailable(_))));

        Ok(())
    }
}
