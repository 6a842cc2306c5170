use clap::{Args, Subcommand};
use creator_deals_app::context::AppContext;

mod issue;
mod verify;

#[derive(Debug, Args)]
pub(crate) struct OtpCommand {
    #[command(subcommand)]
    command: OtpSubcommand,
}

#[derive(Debug, Subcommand)]
enum OtpSubcommand {
    /// Send a fresh code to the party holding a signer role
    Issue(issue::IssueArgs),

    /// Verify a code and record the signature
    Verify(verify::VerifyArgs),
}

pub(crate) async fn run(context: &AppContext, command: OtpCommand) -> Result<(), String> {
    match command.command {
        OtpSubcommand::Issue(args) => issue::run(context, args).await,
        OtpSubcommand::Verify(args) => verify::run(context, args).await,
    }
}
