use clap::{Parser, Subcommand};
use creator_deals_app::{config::AppConfig, context::AppContext, logging};

mod contract;
mod db;
mod deal;
mod otp;
mod signature;

#[derive(Debug, Parser)]
#[command(name = "creator-deals", about = "Creator deal lifecycle CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Deal(deal::DealCommand),
    Contract(contract::ContractCommand),
    Otp(otp::OtpCommand),
    Signature(signature::SignatureCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        logging::init(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Db(command) => db::run(&self.config, command).await,
            Commands::Deal(command) => deal::run(&connect(&self.config).await?, command).await,
            Commands::Contract(command) => {
                contract::run(&connect(&self.config).await?, command).await
            }
            Commands::Otp(command) => otp::run(&connect(&self.config).await?, command).await,
            Commands::Signature(command) => {
                signature::run(&connect(&self.config).await?, command).await
            }
        }
    }
}

async fn connect(config: &AppConfig) -> Result<AppContext, String> {
    AppContext::from_config(config).await.map_err(|error| {
        let source = std::error::Error::source(&error)
            .map_or_else(String::new, |source| format!(": {source}"));

        format!("{error}{source}")
    })
}
