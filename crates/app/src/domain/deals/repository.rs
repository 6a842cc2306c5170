//! Deals Repository

use async_trait::async_trait;
use creator_deals::{
    deals::{BrandResponseStatus, Deal, DealAmount, DealExecutionStatus, DealTerms},
    deliverables::Deliverables,
    parties::CreatorInfo,
};
use mockall::automock;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as, types::Json};

use crate::{
    database::Db,
    domain::deals::records::{CreatorUuid, DealUuid},
};

const GET_DEAL_SQL: &str = include_str!("sql/get_deal.sql");
const GET_CREATOR_SQL: &str = include_str!("sql/get_creator.sql");
const COUNT_SIGNATURES_SQL: &str = include_str!("sql/count_signatures.sql");
const UPDATE_BRAND_RESPONSE_SQL: &str = include_str!("sql/update_brand_response.sql");
const UPDATE_EXECUTION_STATUS_SQL: &str = include_str!("sql/update_execution_status.sql");
const DELETE_DEAL_SQL: &str = include_str!("sql/delete_deal.sql");

#[automock]
#[async_trait]
/// Deal and creator profile persistence.
pub trait DealsRepository: Send + Sync {
    async fn get_deal(&self, deal: DealUuid) -> Result<Deal, sqlx::Error>;

    async fn get_creator(&self, creator: CreatorUuid) -> Result<CreatorInfo, sqlx::Error>;

    /// Signature rows of any state recorded for the deal.
    async fn count_signatures(&self, deal: DealUuid) -> Result<u64, sqlx::Error>;

    /// Store a brand response. Rows already verified are left untouched.
    async fn update_brand_response(
        &self,
        deal: DealUuid,
        status: BrandResponseStatus,
    ) -> Result<u64, sqlx::Error>;

    async fn update_execution_status(
        &self,
        deal: DealUuid,
        status: DealExecutionStatus,
    ) -> Result<u64, sqlx::Error>;

    /// Delete a deal that is unexecuted and has no signatures.
    async fn delete_deal(&self, deal: DealUuid) -> Result<u64, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgDealsRepository {
    db: Db,
}

impl PgDealsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DealsRepository for PgDealsRepository {
    async fn get_deal(&self, deal: DealUuid) -> Result<Deal, sqlx::Error> {
        let row = query_as::<Postgres, DealRow>(GET_DEAL_SQL)
            .bind(deal.into_uuid())
            .fetch_one(self.db.pool())
            .await?;

        Ok(row.0)
    }

    async fn get_creator(&self, creator: CreatorUuid) -> Result<CreatorInfo, sqlx::Error> {
        let row = query(GET_CREATOR_SQL)
            .bind(creator.into_uuid())
            .fetch_one(self.db.pool())
            .await?;

        Ok(CreatorInfo {
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            email: row.try_get("email")?,
        })
    }

    async fn count_signatures(&self, deal: DealUuid) -> Result<u64, sqlx::Error> {
        let count: i64 = query(COUNT_SIGNATURES_SQL)
            .bind(deal.into_uuid())
            .fetch_one(self.db.pool())
            .await?
            .try_get("signatures")?;

        u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
            index: "signatures".to_string(),
            source: Box::new(e),
        })
    }

    async fn update_brand_response(
        &self,
        deal: DealUuid,
        status: BrandResponseStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_BRAND_RESPONSE_SQL)
            .bind(deal.into_uuid())
            .bind(status.as_str())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn update_execution_status(
        &self,
        deal: DealUuid,
        status: DealExecutionStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_EXECUTION_STATUS_SQL)
            .bind(deal.into_uuid())
            .bind(status.as_str())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn delete_deal(&self, deal: DealUuid) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_DEAL_SQL)
            .bind(deal.into_uuid())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

/// Row wrapper so the core `Deal` can be decoded here.
struct DealRow(Deal);

impl<'r> FromRow<'r, PgRow> for DealRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let brand_response: Option<String> = row.try_get("brand_response_status")?;
        let execution: Option<String> = row.try_get("deal_execution_status")?;
        let deliverables: Json<Deliverables> = row.try_get("deliverables")?;

        Ok(Self(Deal {
            id: row.try_get("uuid")?,
            creator_id: row.try_get("creator_uuid")?,
            brand_name: row.try_get("brand_name")?,
            brand_email: row.try_get("brand_email")?,
            brand_address: row.try_get("brand_address")?,
            deal_amount: DealAmount::Text(row.try_get("deal_amount")?),
            deliverables: deliverables.0,
            due_date: row.try_get("due_date")?,
            payment_expected_date: row.try_get("payment_expected_date")?,
            status: row.try_get("status")?,
            brand_response_status: BrandResponseStatus::normalize(brand_response.as_deref()),
            contract_file_url: row.try_get("contract_file_url")?,
            signed_contract_url: row.try_get("signed_contract_url")?,
            deal_execution_status: DealExecutionStatus::normalize(execution.as_deref()),
            terms: DealTerms {
                platforms: row.try_get("platforms")?,
                payment_method: row.try_get("payment_method")?,
                payment_timeline: row.try_get("payment_timeline")?,
                usage_type: row.try_get("usage_type")?,
                usage_duration: row.try_get("usage_duration")?,
                paid_ads_allowed: row.try_get("paid_ads_allowed")?,
                whitelisting_allowed: row.try_get("whitelisting_allowed")?,
                exclusivity_enabled: row.try_get("exclusivity_enabled")?,
                exclusivity_category: row.try_get("exclusivity_category")?,
                exclusivity_period_days: days(row, "exclusivity_period_days")?,
                termination_notice_days: days(row, "termination_notice_days")?,
                jurisdiction_city: row.try_get("jurisdiction_city")?,
            },
        }))
    }
}

fn days(row: &PgRow, column: &str) -> sqlx::Result<Option<u32>> {
    row.try_get::<Option<i32>, _>(column)?
        .map(u32::try_from)
        .transpose()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}
