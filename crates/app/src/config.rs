//! App Config

use std::time::Duration;

use clap::Args;
use jiff::SignedDuration;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Settings shared by every command.
#[derive(Debug, Args)]
pub struct AppConfig {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(flatten)]
    pub otp: OtpConfig,
}

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Per-call store timeout in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 5_000_u64)]
    pub store_timeout_ms: u64,
}

impl DatabaseConfig {
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// OTP settings.
#[derive(Debug, Args)]
pub struct OtpConfig {
    /// Lifetime of an issued code in seconds
    #[arg(long, env = "OTP_TTL_SECONDS", default_value_t = 600_u32)]
    pub otp_ttl_seconds: u32,
}

impl OtpConfig {
    #[must_use]
    pub fn ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(i64::from(self.otp_ttl_seconds))
    }
}
