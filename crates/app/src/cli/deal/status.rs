use clap::Args;
use creator_deals::deals::DealExecutionStatus;
use creator_deals_app::{context::AppContext, domain::deals::records::DealUuid};

#[derive(Debug, Args)]
pub(crate) struct StatusArgs {
    /// Deal UUID
    deal: DealUuid,
}

pub(crate) async fn run(context: &AppContext, args: StatusArgs) -> Result<(), String> {
    let deal = context
        .deals
        .get_deal(args.deal)
        .await
        .map_err(|error| format!("failed to load deal: {error}"))?;

    println!("deal_uuid: {}", deal.id);
    println!("brand_name: {}", deal.brand_name);
    println!("brand_response_status: {}", deal.brand_response_status);
    println!(
        "deal_execution_status: {}",
        deal.deal_execution_status
            .map_or("none", DealExecutionStatus::as_str)
    );
    println!("contract_status: {}", deal.contract_status());

    Ok(())
}
