use clap::{Args, Subcommand};
use creator_deals_app::context::AppContext;

mod variables;

#[derive(Debug, Args)]
pub(crate) struct ContractCommand {
    #[command(subcommand)]
    command: ContractSubcommand,
}

#[derive(Debug, Subcommand)]
enum ContractSubcommand {
    /// Print the contract variables for an accepted deal as JSON
    Variables(variables::VariablesArgs),
}

pub(crate) async fn run(context: &AppContext, command: ContractCommand) -> Result<(), String> {
    match command.command {
        ContractSubcommand::Variables(args) => variables::run(context, args).await,
    }
}
