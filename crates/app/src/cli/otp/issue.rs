use clap::Args;
use creator_deals::signatures::SignerRole;
use creator_deals_app::{context::AppContext, domain::deals::records::DealUuid};
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct IssueArgs {
    /// Deal UUID
    deal: DealUuid,

    /// Signer role (creator, brand)
    role: SignerRole,
}

pub(crate) async fn run(context: &AppContext, args: IssueArgs) -> Result<(), String> {
    let issued = context
        .otp
        .issue(args.deal, args.role, Timestamp::now())
        .await
        .map_err(|error| format!("failed to issue code: {error}"))?;

    println!("challenge_uuid: {}", issued.challenge);
    println!("expires_at: {}", issued.expires_at);

    Ok(())
}
