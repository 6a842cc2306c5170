use clap::Args;
use creator_deals::{otp::OtpOutcome, signatures::SignerRole};
use creator_deals_app::{
    context::AppContext,
    domain::{
        deals::records::DealUuid,
        otp::{OtpVerification, SignerDetails},
    },
};
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct VerifyArgs {
    /// Deal UUID
    deal: DealUuid,

    /// Signer role (creator, brand)
    role: SignerRole,

    /// Six-digit code
    code: String,

    /// Signer's full name
    #[arg(long)]
    name: String,

    /// Signer's email; must be the party's registered email
    #[arg(long)]
    email: String,

    /// Signer's IP address
    #[arg(long)]
    ip: String,

    /// Signer's user agent
    #[arg(long)]
    user_agent: String,
}

pub(crate) async fn run(context: &AppContext, args: VerifyArgs) -> Result<(), String> {
    let outcome = context
        .otp
        .verify(
            OtpVerification {
                deal: args.deal,
                role: args.role,
                code: args.code,
                signer: SignerDetails {
                    name: Some(args.name),
                    email: Some(args.email),
                    ip_address: Some(args.ip),
                    user_agent: Some(args.user_agent),
                },
            },
            Timestamp::now(),
        )
        .await
        .map_err(|error| format!("failed to verify code: {error}"))?;

    match outcome {
        OtpOutcome::Verified => println!("signed deal {} as {}", args.deal, args.role),
        OtpOutcome::AlreadyVerified => println!("code already verified"),
    }

    Ok(())
}
