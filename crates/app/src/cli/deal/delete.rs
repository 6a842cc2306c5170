use clap::Args;
use creator_deals_app::{context::AppContext, domain::deals::records::DealUuid};

#[derive(Debug, Args)]
pub(crate) struct DeleteArgs {
    /// Deal UUID
    deal: DealUuid,
}

pub(crate) async fn run(context: &AppContext, args: DeleteArgs) -> Result<(), String> {
    context
        .deals
        .delete_deal(args.deal)
        .await
        .map_err(|error| format!("failed to delete deal: {error}"))?;

    println!("deleted deal {}", args.deal);

    Ok(())
}
