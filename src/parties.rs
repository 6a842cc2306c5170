//! Parties
//!
//! Contact details for the two sides of an agreement, and the completeness checks
//! that gate contract generation. Placeholder values are rejected strictly; address
//! format is checked permissively so short but genuine addresses still pass.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    jurisdiction::MAJOR_CITIES,
    validation::{MissingFields, RequiredField, ValidationError},
};

/// Values that stand in for missing data.
const PLACEHOLDERS: &[&str] = &[
    "brand",
    "creator",
    "influencer",
    "company",
    "name",
    "address",
    "email",
    "not specified",
    "not provided",
    "n/a",
    "na",
    "nil",
    "none",
    "null",
    "undefined",
    "unknown",
    "tbd",
    "tba",
    "test",
    "-",
    "--",
    ".",
];

/// Words that indicate an address names a real location.
const LOCATION_KEYWORDS: &[&str] = &[
    "road",
    "rd",
    "street",
    "st",
    "lane",
    "nagar",
    "colony",
    "sector",
    "block",
    "phase",
    "market",
    "marg",
    "chowk",
    "floor",
    "tower",
    "apartment",
    "society",
    "village",
    "district",
    "india",
    "maharashtra",
    "karnataka",
    "gujarat",
    "rajasthan",
    "kerala",
    "punjab",
    "haryana",
    "bengal",
    "bihar",
    "telangana",
    "tamil",
    "odisha",
    "assam",
    "goa",
];

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static HOUSE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\b(?:flat|house|h\.?\s*no|plot|shop|unit|room|no)\.?\s*#?\s*\d+|#\s*\d+|\b\d+[a-z]?\s*/\s*\d+|\b\d{6}\b)")
        .expect("house marker pattern should compile")
});

/// Name, address and email for one party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyInfo {
    /// Legal or full name.
    pub name: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

/// Brand side of an agreement.
pub type BrandInfo = PartyInfo;

/// Creator side of an agreement.
pub type CreatorInfo = PartyInfo;

impl PartyInfo {
    /// Build party details from borrowed values.
    pub fn new(name: Option<&str>, address: Option<&str>, email: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            address: address.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    fn missing_fields(
        &self,
        name: RequiredField,
        address: RequiredField,
        email: RequiredField,
    ) -> MissingFields {
        let mut missing = MissingFields::new();

        if !self.name.as_deref().is_some_and(is_plausible_name) {
            missing.push(name);
        }

        if !self.address.as_deref().is_some_and(is_plausible_address) {
            missing.push(address);
        }

        if !self.email.as_deref().is_some_and(is_plausible_email) {
            missing.push(email);
        }

        missing
    }
}

/// Whether a value is a placeholder rather than real data.
pub fn is_placeholder(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();

    normalized.is_empty() || PLACEHOLDERS.contains(&normalized.as_str())
}

/// A name must be non-placeholder text of at least two characters.
pub fn is_plausible_name(name: &str) -> bool {
    !is_placeholder(name) && name.trim().chars().count() >= 2
}

/// An address passes when it is not a placeholder and has a comma, at least five
/// characters, a location keyword, or a numeric house/flat marker.
pub fn is_plausible_address(address: &str) -> bool {
    let address = address.trim();

    if is_placeholder(address) {
        return false;
    }

    address.contains(',')
        || address.chars().count() >= 5
        || has_location_keyword(address)
        || HOUSE_MARKER.is_match(address)
}

fn has_location_keyword(address: &str) -> bool {
    let lower = address.to_lowercase();

    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| {
            LOCATION_KEYWORDS.contains(&word)
                || MAJOR_CITIES
                    .iter()
                    .any(|city| city.eq_ignore_ascii_case(word))
        })
}

/// An email must contain `@` with text before it and a dot somewhere after it.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();

    if is_placeholder(email) || email.chars().any(char::is_whitespace) {
        return false;
    }

    email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains('@')
    })
}

/// Check that both parties have a real name, address and email.
///
/// # Errors
///
/// Returns [`ValidationError::MissingFields`] listing every failing field.
pub fn check_completeness(brand: &BrandInfo, creator: &CreatorInfo) -> Result<(), ValidationError> {
    let mut missing = brand.missing_fields(
        RequiredField::BrandName,
        RequiredField::BrandAddress,
        RequiredField::BrandEmail,
    );

    missing.extend(creator.missing_fields(
        RequiredField::CreatorName,
        RequiredField::CreatorAddress,
        RequiredField::CreatorEmail,
    ));

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}
