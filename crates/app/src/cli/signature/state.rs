use clap::Args;
use creator_deals::signatures::SignerRole;
use creator_deals_app::{context::AppContext, domain::deals::records::DealUuid};
use jiff::Timestamp;

use super::print_verdict;

#[derive(Debug, Args)]
pub(crate) struct StateArgs {
    /// Deal UUID
    deal: DealUuid,
}

pub(crate) async fn run(context: &AppContext, args: StateArgs) -> Result<(), String> {
    let state = context
        .signatures
        .signature_state(args.deal, Timestamp::now())
        .await
        .map_err(|error| format!("failed to load signatures: {error}"))?;

    for role in SignerRole::ALL {
        print_verdict(role.as_str(), state.for_role(role));
    }

    println!("fully_signed: {}", state.both_valid());

    Ok(())
}
