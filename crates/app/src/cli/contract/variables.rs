use clap::Args;
use creator_deals_app::{context::AppContext, domain::deals::records::DealUuid};
use jiff::{Zoned, civil::Date};

#[derive(Debug, Args)]
pub(crate) struct VariablesArgs {
    /// Deal UUID
    deal: DealUuid,

    /// Effective date of the contract; today when omitted
    #[arg(long)]
    date: Option<Date>,
}

pub(crate) async fn run(context: &AppContext, args: VariablesArgs) -> Result<(), String> {
    let today = args.date.unwrap_or_else(|| Zoned::now().date());

    let variables = context
        .deals
        .contract_variables(args.deal, today)
        .await
        .map_err(|error| format!("failed to derive contract variables: {error}"))?;

    let json = serde_json::to_string_pretty(&variables)
        .map_err(|error| format!("failed to encode contract variables: {error}"))?;

    println!("{json}");

    Ok(())
}
