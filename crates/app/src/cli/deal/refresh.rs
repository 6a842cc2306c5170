use clap::Args;
use creator_deals::deals::DealExecutionStatus;
use creator_deals_app::{context::AppContext, domain::deals::records::DealUuid};
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct RefreshArgs {
    /// Deal UUID
    deal: DealUuid,
}

pub(crate) async fn run(context: &AppContext, args: RefreshArgs) -> Result<(), String> {
    let status = context
        .deals
        .refresh_execution(args.deal, Timestamp::now())
        .await
        .map_err(|error| format!("failed to refresh deal: {error}"))?;

    println!(
        "deal_execution_status: {}",
        status.map_or("none", DealExecutionStatus::as_str)
    );

    Ok(())
}
