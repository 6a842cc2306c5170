//! Deals service.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use creator_deals::{
    deals::{
        BrandResponseStatus, ContractStatus, Deal, DealExecutionStatus, advance_execution,
        complete_execution,
    },
    parties::{BrandInfo, CreatorInfo},
    signatures::DualSignatureState,
    variables::{ContractVariables, derive_contract_variables},
};
use jiff::{Timestamp, civil::Date};
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::{Db, within},
    domain::{
        deals::{
            errors::DealsServiceError,
            records::{CreatorUuid, DealUuid},
            repository::{DealsRepository, PgDealsRepository},
        },
        signatures::repository::{PgSignaturesRepository, SignaturesRepository},
    },
};

#[derive(Clone)]
pub struct PgDealsService {
    deals: Arc<dyn DealsRepository>,
    signatures: Arc<dyn SignaturesRepository>,
    timeout: Duration,
}

impl PgDealsService {
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

    async fn fetch(&self, deal: DealUuid) -> Result<Deal, DealsServiceError> {
        Ok(within(self.timeout, self.deals.get_deal(deal)).await??)
    }
}

impl std::fmt::Debug for PgDealsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgDealsService")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DealsService for PgDealsService {
    async fn get_deal(&self, deal: DealUuid) -> Result<Deal, DealsServiceError> {
        self.fetch(deal).await
    }

    async fn contract_status(&self, deal: DealUuid) -> Result<ContractStatus, DealsServiceError> {
        Ok(self.fetch(deal).await?.contract_status())
    }

    async fn respond(
        &self,
        deal: DealUuid,
        status: BrandResponseStatus,
    ) -> Result<BrandResponseStatus, DealsServiceError> {
        let current = self.fetch(deal).await?.brand_response_status;

        if status == BrandResponseStatus::AcceptedVerified
            && current != BrandResponseStatus::AcceptedVerified
        {
            return Err(DealsServiceError::VerificationRequired);
        }

        let next = current.transition(status)?;

        if next == current {
            return Ok(current);
        }

        let rows_affected = within(self.timeout, self.deals.update_brand_response(deal, next)).await??;

        if rows_affected == 0 {
            return Err(DealsServiceError::ConcurrentUpdate);
        }

        info!(deal = %deal, from = %current, to = %next, "brand response updated");

        Ok(next)
    }

    async fn contract_variables(
        &self,
        deal: DealUuid,
        today: Date,
    ) -> Result<ContractVariables, DealsServiceError> {
        let record = self.fetch(deal).await?;

        record.ensure_contract_ready()?;

        let creator = within(
            self.timeout,
            self.deals.get_creator(CreatorUuid::from_uuid(record.creator_id)),
        )
        .await??;

        let brand = BrandInfo {
            name: Some(record.brand_name.clone()),
            address: record.brand_address.clone(),
            email: record.brand_email.clone(),
        };

        Ok(derive_contract_variables(&record, &brand, &creator, today)?)
    }

    async fn refresh_execution(
        &self,
        deal: DealUuid,
        now: Timestamp,
    ) -> Result<Option<DealExecutionStatus>, DealsServiceError> {
        refresh_execution_status(
            self.deals.as_ref(),
            self.signatures.as_ref(),
            deal,
            now,
            self.timeout,
        )
        .await
    }

    async fn complete_deal(&self, deal: DealUuid) -> Result<DealExecutionStatus, DealsServiceError> {
        let current = self.fetch(deal).await?.deal_execution_status;
        let completed = complete_execution(current)?;

        if current != Some(completed) {
            within(self.timeout, self.deals.update_execution_status(deal, completed)).await??;

            info!(deal = %deal, "deal completed");
        }

        Ok(completed)
    }

    async fn delete_deal(&self, deal: DealUuid) -> Result<(), DealsServiceError> {
        let record = self.fetch(deal).await?;
        let signatures = within(self.timeout, self.deals.count_signatures(deal)).await??;

        if let Err(refused) = record.ensure_deletable(signatures) {
            warn!(deal = %deal, reason = %refused, "deal deletion refused");

            return Err(refused.into());
        }

        let rows_affected = within(self.timeout, self.deals.delete_deal(deal)).await??;

        if rows_affected == 0 {
            return Err(DealsServiceError::ConcurrentUpdate);
        }

        info!(deal = %deal, "deal deleted");

        Ok(())
    }
}

/// Re-verify both signatures of a deal and advance its execution status.
///
/// Each role is checked against that party's registered email: the brand email on
/// the deal and the creator's profile email.
///
/// # Errors
///
/// Returns an error when the deal or creator cannot be loaded or the update fails.
async fn refresh_execution_status(
    deals: &dyn DealsRepository,
    signatures: &dyn SignaturesRepository,
    deal: DealUuid,
    now: Timestamp,
    timeout: Duration,
) -> Result<Option<DealExecutionStatus>, DealsServiceError> {
    let record = within(timeout, deals.get_deal(deal)).await??;

    if record.is_executed() {
        return Ok(record.deal_execution_status);
    }

    let creator: CreatorInfo =
        within(timeout, deals.get_creator(CreatorUuid::from_uuid(record.creator_id))).await??;
    let rows = within(timeout, signatures.active_signatures(deal)).await??;

    let state = DualSignatureState::verify(
        record.id,
        (rows.creator.as_ref(), creator.email.as_deref()),
        (rows.brand.as_ref(), record.brand_email.as_deref()),
        now,
    );

    let next = advance_execution(record.deal_execution_status, &state);

    if let Some(status) = next
        && next != record.deal_execution_status
    {
        within(timeout, deals.update_execution_status(deal, status)).await??;

        info!(deal = %deal, status = status.as_str(), "deal execution advanced");
    }

    Ok(next)
}

#[automock]
#[async_trait]
/// Deal lifecycle operations.
pub trait DealsService: Send + Sync {
    /// Retrieve a deal with its statuses normalised.
    async fn get_deal(&self, deal: DealUuid) -> Result<Deal, DealsServiceError>;

    /// Contract status badge derived from the stored fields.
    async fn contract_status(&self, deal: DealUuid) -> Result<ContractStatus, DealsServiceError>;

    /// Record a brand response. Returns the stored status, which stays
    /// `accepted_verified` once reached.
    async fn respond(
        &self,
        deal: DealUuid,
        status: BrandResponseStatus,
    ) -> Result<BrandResponseStatus, DealsServiceError>;

    /// Derive contract variables for an accepted deal.
    async fn contract_variables(
        &self,
        deal: DealUuid,
        today: Date,
    ) -> Result<ContractVariables, DealsServiceError>;

    /// Advance execution status if both signatures are now valid.
    async fn refresh_execution(
        &self,
        deal: DealUuid,
        now: Timestamp,
    ) -> Result<Option<DealExecutionStatus>, DealsServiceError>;

    /// Mark a signed deal completed.
    async fn complete_deal(&self, deal: DealUuid) -> Result<DealExecutionStatus, DealsServiceError>;

    /// Delete a deal that has no signatures and has not been executed.
    async fn delete_deal(&self, deal: DealUuid) -> Result<(), DealsServiceError>;
}
