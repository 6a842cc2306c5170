use clap::Args;
use creator_deals::signatures::{SessionContext, SignerRole};
use creator_deals_app::{context::AppContext, domain::deals::records::DealUuid};
use jiff::Timestamp;

use super::print_verdict;

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    /// Deal UUID
    deal: DealUuid,

    /// Signer role (creator, brand)
    role: SignerRole,

    /// Email of the signed-in session
    #[arg(long)]
    email: Option<String>,
}

pub(crate) async fn run(context: &AppContext, args: CheckArgs) -> Result<(), String> {
    let verdict = context
        .signatures
        .check_signature(
            args.deal,
            args.role,
            SessionContext::new(args.email.as_deref()),
            Timestamp::now(),
        )
        .await
        .map_err(|error| format!("failed to check signature: {error}"))?;

    print_verdict(args.role.as_str(), &verdict);

    Ok(())
}
