use clap::Args;
use creator_deals_app::{context::AppContext, domain::deals::records::DealUuid};

#[derive(Debug, Args)]
pub(crate) struct CompleteArgs {
    /// Deal UUID
    deal: DealUuid,
}

pub(crate) async fn run(context: &AppContext, args: CompleteArgs) -> Result<(), String> {
    let status = context
        .deals
        .complete_deal(args.deal)
        .await
        .map_err(|error| format!("failed to complete deal: {error}"))?;

    println!("deal_execution_status: {}", status.as_str());

    Ok(())
}
