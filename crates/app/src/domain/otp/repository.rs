//! OTP Challenges Repository

use async_trait::async_trait;
use creator_deals::{otp::OtpChallenge, signatures::SignerRole};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    database::Db,
    domain::{deals::records::DealUuid, otp::records::SigningRecord},
};

const INVALIDATE_ACTIVE_CHALLENGES_SQL: &str = include_str!("sql/invalidate_active_challenges.sql");
const CREATE_CHALLENGE_SQL: &str = include_str!("sql/create_challenge.sql");
const LATEST_CHALLENGE_SQL: &str = include_str!("sql/latest_challenge.sql");
const CONSUME_CHALLENGE_SQL: &str = include_str!("sql/consume_challenge.sql");
const SUPERSEDE_SIGNATURE_SQL: &str = include_str!("sql/supersede_signature.sql");
const CREATE_SIGNATURE_SQL: &str = include_str!("sql/create_signature.sql");
const VERIFY_BRAND_RESPONSE_SQL: &str = include_str!("sql/verify_brand_response.sql");
const UPDATE_EXECUTION_STATUS_SQL: &str =
    include_str!("../deals/sql/update_execution_status.sql");

#[automock]
#[async_trait]
/// OTP challenge persistence and the signing writes that consume a challenge.
pub trait OtpChallengesRepository: Send + Sync {
    /// Invalidate any active challenge for the deal and role, then store `challenge`.
    async fn replace_active_challenge(&self, challenge: &OtpChallenge) -> Result<(), sqlx::Error>;

    /// Most recent challenge for the deal and role that was not replaced.
    async fn latest_challenge(
        &self,
        deal: DealUuid,
        role: SignerRole,
    ) -> Result<Option<OtpChallenge>, sqlx::Error>;

    /// Apply a successful verification in one transaction.
    ///
    /// Returns `false`, writing nothing, when the challenge was consumed by a
    /// concurrent verification.
    async fn complete_signing(&self, record: &SigningRecord) -> Result<bool, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgOtpChallengesRepository {
    db: Db,
}

impl PgOtpChallengesRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OtpChallengesRepository for PgOtpChallengesRepository {
    async fn replace_active_challenge(&self, challenge: &OtpChallenge) -> Result<(), sqlx::Error> {
        let mut tx = self.db.begin().await?;

        query(INVALIDATE_ACTIVE_CHALLENGES_SQL)
            .bind(challenge.deal_id)
            .bind(challenge.signer_role.as_str())
            .bind(SqlxTimestamp::from(challenge.issued_at))
            .execute(&mut *tx)
            .await?;

        query(CREATE_CHALLENGE_SQL)
            .bind(challenge.id)
            .bind(challenge.deal_id)
            .bind(challenge.signer_role.as_str())
            .bind(&challenge.code_hash)
            .bind(SqlxTimestamp::from(challenge.issued_at))
            .bind(SqlxTimestamp::from(challenge.expires_at))
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }

    async fn latest_challenge(
        &self,
        deal: DealUuid,
        role: SignerRole,
    ) -> Result<Option<OtpChallenge>, sqlx::Error> {
        let row = query_as::<Postgres, ChallengeRow>(LATEST_CHALLENGE_SQL)
            .bind(deal.into_uuid())
            .bind(role.as_str())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|row| row.0))
    }

    async fn complete_signing(&self, record: &SigningRecord) -> Result<bool, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let consumed = query(CONSUME_CHALLENGE_SQL)
            .bind(record.challenge.into_uuid())
            .bind(SqlxTimestamp::from(record.consumed_at))
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if consumed == 0 {
            tx.rollback().await?;

            return Ok(false);
        }

        if let Some(previous) = record.supersedes {
            query(SUPERSEDE_SIGNATURE_SQL)
                .bind(previous)
                .bind(SqlxTimestamp::from(record.consumed_at))
                .execute(&mut *tx)
                .await?;
        }

        let signature = &record.signature;

        query(CREATE_SIGNATURE_SQL)
            .bind(signature.id)
            .bind(signature.deal_id)
            .bind(signature.signer_role.map(SignerRole::as_str))
            .bind(&signature.signer_name)
            .bind(&signature.signer_email)
            .bind(signature.signed)
            .bind(&signature.signed_at)
            .bind(signature.otp_verified)
            .bind(&signature.otp_verified_at)
            .bind(&signature.ip_address)
            .bind(&signature.user_agent)
            .execute(&mut *tx)
            .await?;

        if let Some(status) = record.brand_response {
            query(VERIFY_BRAND_RESPONSE_SQL)
                .bind(signature.deal_id)
                .bind(status.as_str())
                .execute(&mut *tx)
                .await?;
        }

        if let Some(status) = record.execution {
            query(UPDATE_EXECUTION_STATUS_SQL)
                .bind(signature.deal_id)
                .bind(status.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(true)
    }
}

struct ChallengeRow(OtpChallenge);

impl<'r> FromRow<'r, PgRow> for ChallengeRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("signer_role")?;
        let signer_role = role
            .parse::<SignerRole>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "signer_role".to_string(),
                source: Box::new(e),
            })?;

        let issued_at: SqlxTimestamp = row.try_get("issued_at")?;
        let expires_at: SqlxTimestamp = row.try_get("expires_at")?;
        let consumed_at: Option<SqlxTimestamp> = row.try_get("consumed_at")?;
        let invalidated_at: Option<SqlxTimestamp> = row.try_get("invalidated_at")?;

        Ok(Self(OtpChallenge {
            id: row.try_get("uuid")?,
            deal_id: row.try_get("deal_uuid")?,
            signer_role,
            code_hash: row.try_get("code_hash")?,
            issued_at: issued_at.to_jiff(),
            expires_at: expires_at.to_jiff(),
            consumed_at: consumed_at.map(SqlxTimestamp::to_jiff),
            invalidated_at: invalidated_at.map(SqlxTimestamp::to_jiff),
        }))
    }
}
