//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::AppConfig,
    database::{self, Db},
    domain::{
        deals::{DealsService, PgDealsService},
        notifications::{LogNotifier, Notifier},
        otp::{OtpService, PgOtpService},
        signatures::{PgSignaturesService, SignaturesService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub deals: Arc<dyn DealsService>,
    pub signatures: Arc<dyn SignaturesService>,
    pub otp: Arc<dyn OtpService>,
}

impl AppContext {
    /// Build application context from configuration, delivering codes to the log.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        Self::with_notifier(config, Arc::new(LogNotifier)).await
    }

    /// Build application context with a specific OTP delivery channel.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn with_notifier(
        config: &AppConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database.database_url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);
        let timeout = config.database.store_timeout();

        Ok(Self {
            deals: Arc::new(PgDealsService::new(db.clone(), timeout)),
            signatures: Arc::new(PgSignaturesService::new(db.clone(), timeout)),
            otp: Arc::new(PgOtpService::new(db, notifier, config.otp.ttl(), timeout)),
        })
    }
}
