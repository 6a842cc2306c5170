use clap::{Args, Subcommand};
use creator_deals_app::context::AppContext;

mod check;
mod state;

#[derive(Debug, Args)]
pub(crate) struct SignatureCommand {
    #[command(subcommand)]
    command: SignatureSubcommand,
}

#[derive(Debug, Subcommand)]
enum SignatureSubcommand {
    /// Verify a session's own signature on a deal
    Check(check::CheckArgs),

    /// Verify both parties' signatures
    State(state::StateArgs),
}

pub(crate) async fn run(context: &AppContext, command: SignatureCommand) -> Result<(), String> {
    match command.command {
        SignatureSubcommand::Check(args) => check::run(context, args).await,
        SignatureSubcommand::State(args) => state::run(context, args).await,
    }
}

fn print_verdict(label: &str, verdict: &creator_deals::signatures::SignatureVerdict) {
    if verdict.is_valid() {
        println!("{label}: valid");
        return;
    }

    let reasons = verdict
        .reasons()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");

    println!("{label}: unsigned ({reasons})");
}
