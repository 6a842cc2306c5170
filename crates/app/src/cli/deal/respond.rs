use clap::Args;
use creator_deals::deals::BrandResponseStatus;
use creator_deals_app::{context::AppContext, domain::deals::records::DealUuid};

#[derive(Debug, Args)]
pub(crate) struct RespondArgs {
    /// Deal UUID
    deal: DealUuid,

    /// New brand response (pending, negotiating, accepted, rejected)
    status: BrandResponseStatus,
}

pub(crate) async fn run(context: &AppContext, args: RespondArgs) -> Result<(), String> {
    let stored = context
        .deals
        .respond(args.deal, args.status)
        .await
        .map_err(|error| format!("failed to record response: {error}"))?;

    if stored != args.status {
        println!("brand response stays {stored}");
    }

    println!("brand_response_status: {stored}");

    Ok(())
}
