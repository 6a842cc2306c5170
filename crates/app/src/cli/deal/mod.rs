use clap::{Args, Subcommand};
use creator_deals_app::context::AppContext;

mod complete;
mod delete;
mod refresh;
mod respond;
mod status;

#[derive(Debug, Args)]
pub(crate) struct DealCommand {
    #[command(subcommand)]
    command: DealSubcommand,
}

#[derive(Debug, Subcommand)]
enum DealSubcommand {
    /// Show a deal's statuses
    Status(status::StatusArgs),

    /// Record the brand's response
    Respond(respond::RespondArgs),

    /// Re-check signatures and advance execution status
    Refresh(refresh::RefreshArgs),

    /// Mark a signed deal completed
    Complete(complete::CompleteArgs),

    /// Delete an unsigned deal
    Delete(delete::DeleteArgs),
}

pub(crate) async fn run(context: &AppContext, command: DealCommand) -> Result<(), String> {
    match command.command {
        DealSubcommand::Status(args) => status::run(context, args).await,
        DealSubcommand::Respond(args) => respond::run(context, args).await,
        DealSubcommand::Refresh(args) => refresh::run(context, args).await,
        DealSubcommand::Complete(args) => complete::run(context, args).await,
        DealSubcommand::Delete(args) => delete::run(context, args).await,
    }
}
