//! Signatures Repository

use async_trait::async_trait;
use creator_deals::signatures::{Signature, SignerRole};
use mockall::automock;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query_as};

use crate::{
    database::Db,
    domain::{deals::records::DealUuid, signatures::records::DealSignatures},
};

const LIST_ACTIVE_SIGNATURES_SQL: &str = include_str!("sql/list_active_signatures.sql");

#[automock]
#[async_trait]
/// Read access to signature rows. Rows are written only by OTP verification.
pub trait SignaturesRepository: Send + Sync {
    /// Signatures not superseded by a later signing.
    async fn active_signatures(&self, deal: DealUuid) -> Result<DealSignatures, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgSignaturesRepository {
    db: Db,
}

impl PgSignaturesRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SignaturesRepository for PgSignaturesRepository {
    async fn active_signatures(&self, deal: DealUuid) -> Result<DealSignatures, sqlx::Error> {
        let rows = query_as::<Postgres, SignatureRow>(LIST_ACTIVE_SIGNATURES_SQL)
            .bind(deal.into_uuid())
            .fetch_all(self.db.pool())
            .await?;

        Ok(DealSignatures::from_rows(
            rows.into_iter().map(|row| row.0).collect(),
        ))
    }
}

struct SignatureRow(Signature);

impl<'r> FromRow<'r, PgRow> for SignatureRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("signer_role")?;

        Ok(Self(Signature {
            id: row.try_get("uuid")?,
            deal_id: row.try_get("deal_uuid")?,
            signer_role: role.parse::<SignerRole>().ok(),
            signer_name: row.try_get("signer_name")?,
            signer_email: row.try_get("signer_email")?,
            signed: row.try_get("signed")?,
            signed_at: row.try_get("signed_at")?,
            otp_verified: row.try_get("otp_verified")?,
            otp_verified_at: row.try_get("otp_verified_at")?,
            ip_address: row.try_get("ip_address")?,
            user_agent: row.try_get("user_agent")?,
        }))
    }
}
