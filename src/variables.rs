//! Contract variables
//!
//! The immutable field set a contract template is rendered from. Derivation is
//! deterministic given the deal, both parties and the effective date; anything that
//! cannot be derived safely is an error, never a default that would end up in a
//! signed agreement.

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::{
    currency::{FormattingError, format_inr_decimal},
    deals::Deal,
    deliverables::{delivery_window_days, render_deliverables},
    jurisdiction::resolve_jurisdiction,
    parties::{BrandInfo, CreatorInfo, check_completeness},
    platforms::{Platforms, normalize_platforms, platforms_sentence},
    timestamps::parse_date,
    validation::{MissingFields, RequiredField, ValidationError},
};

pub const DEFAULT_PAYMENT_METHOD: &str = "Bank Transfer";
pub const DEFAULT_PAYMENT_TIMELINE: &str = "within 7 days of content publication";
pub const DEFAULT_USAGE_TYPE: &str = "Non-exclusive";
pub const DEFAULT_USAGE_DURATION: &str = "6 months";
pub const DEFAULT_EXCLUSIVITY_DAYS: u32 = 30;

/// Notice periods a contract may state, longest first.
pub const TERMINATION_NOTICE_OPTIONS: [u32; 3] = [30, 15, MIN_TERMINATION_NOTICE_DAYS];

pub const MIN_TERMINATION_NOTICE_DAYS: u32 = 7;

const DATE_FORMAT: &str = "%d %B %Y";

/// Failure to derive contract variables.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum DerivationError {
    /// The deal is not ready, or its fields are incomplete.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The amount could not be rendered.
    #[error("could not format deal amount")]
    Formatting(#[from] FormattingError),
}

/// Everything a contract template needs, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractVariables {
    /// Deal id prefix plus the effective date.
    pub contract_reference: String,
    /// Long form, such as `19 October 2026`.
    pub effective_date: String,

    pub brand_name: String,
    pub brand_address: String,
    pub brand_email: String,
    pub creator_name: String,
    pub creator_address: String,
    pub creator_email: String,

    pub deal_amount: Decimal,
    /// Amount with the rupee sign and the amount in words.
    pub formatted_amount: String,

    /// One sentence per deliverable.
    pub deliverables: Vec<String>,
    pub deliverables_text: String,
    /// Days until the due date, or the default window.
    pub delivery_window_days: i64,

    pub platforms: Platforms,
    pub platforms_text: String,

    pub payment_method: String,
    pub payment_timeline: String,

    pub usage_type: String,
    pub usage_duration: String,
    pub paid_ads: &'static str,
    pub whitelisting: &'static str,
    pub exclusivity_clause: String,
    /// One of 30, 15 or 7.
    pub termination_notice_days: u32,

    /// Governing-law city.
    pub jurisdiction: String,
}

/// Derive the variables for a contract effective on `today`.
///
/// # Errors
///
/// Returns [`DerivationError::Validation`] for a negative, non-finite or non-numeric
/// amount, or listing every missing party field, missing deliverables, and an
/// unresolvable jurisdiction. Returns [`DerivationError::Formatting`] when the
/// amount cannot be rendered with its symbol and words intact.
pub fn derive_contract_variables(
    deal: &Deal,
    brand: &BrandInfo,
    creator: &CreatorInfo,
    today: Date,
) -> Result<ContractVariables, DerivationError> {
    let amount = deal.deal_amount.to_decimal()?;

    let mut missing = match check_completeness(brand, creator) {
        Ok(()) => MissingFields::new(),
        Err(ValidationError::MissingFields(fields)) => fields,
        Err(error) => return Err(error.into()),
    };

    let deliverables = render_deliverables(&deal.deliverables, deal.due_date.as_deref(), today);

    if deliverables.is_empty() {
        missing.push(RequiredField::Deliverables);
    }

    let jurisdiction = resolve_jurisdiction(
        deal.terms.jurisdiction_city.as_deref(),
        creator.address.as_deref(),
        brand.address.as_deref().or(deal.brand_address.as_deref()),
    );

    if jurisdiction.is_empty() {
        missing.push(RequiredField::Jurisdiction);
    }

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing).into());
    }

    let formatted_amount = format_inr_decimal(amount)?;
    let platforms = normalize_platforms(&deal.terms.platforms);
    let terms = &deal.terms;

    Ok(ContractVariables {
        contract_reference: contract_reference(deal, today),
        effective_date: today.strftime(DATE_FORMAT).to_string(),

        brand_name: field(brand.name.as_deref()),
        brand_address: field(brand.address.as_deref()),
        brand_email: field(brand.email.as_deref()),
        creator_name: field(creator.name.as_deref()),
        creator_address: field(creator.address.as_deref()),
        creator_email: field(creator.email.as_deref()),

        deal_amount: amount,
        formatted_amount,

        deliverables_text: numbered(&deliverables),
        deliverables,
        delivery_window_days: delivery_window_days(deal.due_date.as_deref(), today),

        platforms_text: platforms_sentence(&platforms),
        platforms,

        payment_method: or_default(terms.payment_method.as_deref(), DEFAULT_PAYMENT_METHOD),
        payment_timeline: payment_timeline(deal),

        usage_type: or_default(terms.usage_type.as_deref(), DEFAULT_USAGE_TYPE),
        usage_duration: or_default(terms.usage_duration.as_deref(), DEFAULT_USAGE_DURATION),
        paid_ads: allowed(terms.paid_ads_allowed),
        whitelisting: allowed(terms.whitelisting_allowed),
        exclusivity_clause: exclusivity_clause(
            terms.exclusivity_enabled.unwrap_or(false),
            terms.exclusivity_category.as_deref(),
            terms.exclusivity_period_days,
        ),
        termination_notice_days: clamp_notice_days(terms.termination_notice_days),

        jurisdiction,
    })
}

/// Reference printed on the contract: `CD-<first 8 hex of deal id>-<YYYYMMDD>`.
pub fn contract_reference(deal: &Deal, today: Date) -> String {
    let simple = deal.id.simple().to_string().to_uppercase();
    let prefix = simple.get(..8).unwrap_or(&simple);

    format!("CD-{prefix}-{}", today.strftime("%Y%m%d"))
}

/// Snap a requested notice period to the longest allowed option that does not
/// exceed it, defaulting to seven days.
pub fn clamp_notice_days(requested: Option<u32>) -> u32 {
    requested
        .and_then(|days| {
            TERMINATION_NOTICE_OPTIONS
                .into_iter()
                .find(|option| days >= *option)
        })
        .unwrap_or(MIN_TERMINATION_NOTICE_DAYS)
}

/// Exclusivity clause text.
pub fn exclusivity_clause(enabled: bool, category: Option<&str>, period_days: Option<u32>) -> String {
    if !enabled {
        return "No exclusivity applies. The Creator may work with other brands, including competitors, during and after the term of this Agreement.".to_string();
    }

    let days = period_days
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_EXCLUSIVITY_DAYS);

    match category.map(str::trim).filter(|category| !category.is_empty()) {
        Some(category) => format!(
            "The Creator shall not create sponsored content for any competing brand in the {category} category for {days} days from the date of publication."
        ),
        None => format!(
            "The Creator shall not create sponsored content for any directly competing brand for {days} days from the date of publication."
        ),
    }
}

fn payment_timeline(deal: &Deal) -> String {
    if let Some(timeline) = non_blank(deal.terms.payment_timeline.as_deref()) {
        return timeline.to_string();
    }

    deal.payment_expected_date
        .as_deref()
        .and_then(parse_date)
        .map_or_else(
            || DEFAULT_PAYMENT_TIMELINE.to_string(),
            |date| format!("on or before {}", date.strftime(DATE_FORMAT)),
        )
}

const fn allowed(flag: Option<bool>) -> &'static str {
    if matches!(flag, Some(true)) {
        "Allowed"
    } else {
        "Not Allowed"
    }
}

fn numbered(lines: &[String]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| format!("{}. {line}", index + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn field(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn or_default(value: Option<&str>, default: &str) -> String {
    non_blank(value).unwrap_or(default).to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
