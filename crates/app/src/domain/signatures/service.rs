//! Signatures service.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use creator_deals::signatures::{
    DualSignatureState, SessionContext, SignatureVerdict, SignerRole, VerificationContext,
    verify_optional,
};
use jiff::Timestamp;
use mockall::automock;
use tracing::warn;

use crate::{
    database::{Db, within},
    domain::{
        deals::{
            records::{CreatorUuid, DealUuid},
            repository::{DealsRepository, PgDealsRepository},
        },
        signatures::{
            errors::SignaturesServiceError,
            repository::{PgSignaturesRepository, SignaturesRepository},
        },
    },
};

#[derive(Clone)]
pub struct PgSignaturesService {
    deals: Arc<dyn DealsRepository>,
    signatures: Arc<dyn SignaturesRepository>,
    timeout: Duration,
}

impl PgSignaturesService {
    #[must_use]
    pub fn new(db: Db, timeout: Duration) -> Self {
        Self::with_repositories(
            Arc::new(PgDealsRepository::new(db.clone())),
            Arc::new(PgSignaturesRepository::new(db)),
            timeout,
        )
    }

    #[must_use]
    pub fn with_repositories(
        deals: Arc<dyn DealsRepository>,
        signatures: Arc<dyn SignaturesRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            deals,
            signatures,
            timeout,
        }
    }
}

impl std::fmt::Debug for PgSignaturesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSignaturesService")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SignaturesService for PgSignaturesService {
    async fn check_signature(
        &self,
        deal: DealUuid,
        role: SignerRole,
        session: SessionContext,
        now: Timestamp,
    ) -> Result<SignatureVerdict, SignaturesServiceError> {
        let rows = within(self.timeout, self.signatures.active_signatures(deal)).await??;
        let row = rows.for_role(role);

        let verdict = verify_optional(
            row,
            &VerificationContext::for_session(deal.into_uuid(), &session, now),
        );

        if row.is_some_and(|row| row.signed) && !verdict.is_valid() {
            warn!(
                deal = %deal,
                role = %role,
                reasons = ?verdict.reasons(),
                "stored signature does not verify",
            );
        }

        Ok(verdict)
    }

    async fn signature_state(
        &self,
        deal: DealUuid,
        now: Timestamp,
    ) -> Result<DualSignatureState, SignaturesServiceError> {
        let record = within(self.timeout, self.deals.get_deal(deal)).await??;
        let creator = within(
            self.timeout,
            self.deals.get_creator(CreatorUuid::from_uuid(record.creator_id)),
        )
        .await??;
        let rows = within(self.timeout, self.signatures.active_signatures(deal)).await??;

        Ok(DualSignatureState::verify(
            record.id,
            (rows.creator.as_ref(), creator.email.as_deref()),
            (rows.brand.as_ref(), record.brand_email.as_deref()),
            now,
        ))
    }
}

#[automock]
#[async_trait]
/// Signature verification against stored rows.
pub trait SignaturesService: Send + Sync {
    /// Verify the session's own signature for one role of a deal.
    ///
    /// A store failure is an error, never a valid verdict.
    async fn check_signature(
        &self,
        deal: DealUuid,
        role: SignerRole,
        session: SessionContext,
        now: Timestamp,
    ) -> Result<SignatureVerdict, SignaturesServiceError>;

    /// Verify both roles against each party's registered email.
    async fn signature_state(
        &self,
        deal: DealUuid,
        now: Timestamp,
    ) -> Result<DualSignatureState, SignaturesServiceError>;
}
