use clap::{Args, Subcommand};
use creator_deals_app::config::AppConfig;

mod migrate;

#[derive(Debug, Args)]
pub(crate) struct DbCommand {
    #[command(subcommand)]
    command: DbSubcommand,
}

#[derive(Debug, Subcommand)]
enum DbSubcommand {
    /// Apply pending schema migrations
    Migrate,
}

pub(crate) async fn run(config: &AppConfig, command: DbCommand) -> Result<(), String> {
    match command.command {
        DbSubcommand::Migrate => migrate::run(config).await,
    }
}
