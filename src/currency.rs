//! Currency formatting for contract amounts.
//!
//! Every formatted amount carries the canonical rupee glyph exactly once and a
//! `(Rupees ... Only)` words suffix. Upstream encoding bugs are repaired before the
//! result is checked; anything still ambiguous after repair is an error rather than
//! a partial string.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use thiserror::Error;

use crate::words::indian_number_words;

/// Canonical Indian rupee sign (U+20B9).
pub const RUPEE_SIGN: char = '\u{20B9}';

/// Known corruption of the rupee sign produced by lossy re-encoding (U+00B9).
pub const CORRUPTED_RUPEE_SIGN: char = '\u{00B9}';

const SUPERSCRIPT_DIGITS: [char; 9] = [
    '\u{2070}', '\u{00B2}', '\u{00B3}', '\u{2074}', '\u{2075}', '\u{2076}', '\u{2077}',
    '\u{2078}', '\u{2079}',
];

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static CURRENCY_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:INR|Rs)\b\.?\s*").expect("currency alias pattern should compile")
});

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static REPEATED_SIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{20B9}(?:\\s*\u{20B9})+").expect("sign pattern should compile"));

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static WORDS_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(Rupees [A-Za-z ]+ Only\)").expect("words suffix pattern should compile")
});

/// Errors raised while formatting a monetary amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormattingError {
    /// The amount was NaN or infinite.
    #[error("amount must be a finite number")]
    NonFinite,

    /// The amount was below zero.
    #[error("amount must not be negative")]
    Negative,

    /// The amount does not fit the supported range.
    #[error("amount is out of range")]
    OutOfRange,

    /// The formatted output failed its integrity checks.
    #[error(transparent)]
    Invariant(#[from] FormattingInvariantError),
}

/// A formatted amount that is still unverifiable after every repair step.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormattingInvariantError {
    /// The rupee sign is absent.
    #[error("formatted amount {0:?} is missing the rupee sign")]
    MissingSign(String),

    /// The rupee sign appears more than once.
    #[error("formatted amount {formatted:?} contains the rupee sign {count} times")]
    RepeatedSign {
        /// The offending output
        formatted: String,

        /// Number of rupee signs found
        count: usize,
    },

    /// The `(Rupees ... Only)` suffix is absent.
    #[error("formatted amount {0:?} is missing the words suffix")]
    MissingWords(String),
}

/// Format an amount in rupees, e.g. `₹15,000 (Rupees Fifteen Thousand Only)`.
///
/// # Errors
///
/// Returns a [`FormattingError`] when the amount is negative, not finite, or the
/// formatted output fails verification.
pub fn format_inr(amount: f64) -> Result<String, FormattingError> {
    if !amount.is_finite() {
        return Err(FormattingError::NonFinite);
    }

    if amount < 0.0 {
        return Err(FormattingError::Negative);
    }

    let amount = Decimal::try_from(amount).map_err(|_error| FormattingError::OutOfRange)?;

    format_inr_decimal(amount)
}

/// Format a decimal amount in rupees. Sub-paise precision is rounded away.
///
/// # Errors
///
/// Returns a [`FormattingError`] when the amount is negative, too large, or the
/// formatted output fails verification.
pub fn format_inr_decimal(amount: Decimal) -> Result<String, FormattingError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(FormattingError::Negative);
    }

    let minor = amount
        .round_dp(2)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.to_i64())
        .ok_or(FormattingError::OutOfRange)?;

    let money = Money::from_minor(minor, iso::INR);

    let formatted = repair_currency_text(&render(&money)?);

    verify_formatted_amount(&formatted)?;

    Ok(formatted)
}

fn render(money: &Money<'_, iso::Currency>) -> Result<String, FormattingError> {
    let minor = u64::try_from(money.to_minor_units()).map_err(|_error| FormattingError::Negative)?;

    let rupees = minor / 100;
    let paise = minor % 100;

    let figure = if paise == 0 {
        group_indian(rupees)
    } else {
        format!("{}.{paise:02}", group_indian(rupees))
    };

    let words = if paise == 0 {
        indian_number_words(rupees)
    } else {
        format!(
            "{} and {} Paise",
            indian_number_words(rupees),
            indian_number_words(paise)
        )
    };

    Ok(format!(
        "{}{figure} (Rupees {words} Only)",
        money.currency().symbol
    ))
}

/// Repair currency text damaged upstream.
///
/// Rewrites the corrupted superscript-one sign and textual aliases (`Rs.`, `INR`) to
/// the canonical rupee sign, drops stray superscript digits, and collapses repeated
/// signs.
pub fn repair_currency_text(text: &str) -> String {
    let rewritten: String = text
        .chars()
        .map(|c| if c == CORRUPTED_RUPEE_SIGN { RUPEE_SIGN } else { c })
        .filter(|c| !SUPERSCRIPT_DIGITS.contains(c))
        .collect();

    let aliased = CURRENCY_ALIAS.replace_all(&rewritten, RUPEE_SIGN.to_string().as_str());

    REPEATED_SIGN
        .replace_all(&aliased, RUPEE_SIGN.to_string().as_str())
        .into_owned()
}

/// Check a formatted amount: exactly one rupee sign and a words suffix.
///
/// # Errors
///
/// Returns the first [`FormattingInvariantError`] the text violates.
pub fn verify_formatted_amount(formatted: &str) -> Result<(), FormattingInvariantError> {
    match formatted.chars().filter(|c| *c == RUPEE_SIGN).count() {
        0 => return Err(FormattingInvariantError::MissingSign(formatted.to_string())),
        1 => {}
        count => {
            return Err(FormattingInvariantError::RepeatedSign {
                formatted: formatted.to_string(),
                count,
            });
        }
    }

    if formatted.contains(CORRUPTED_RUPEE_SIGN) {
        return Err(FormattingInvariantError::MissingSign(formatted.to_string()));
    }

    if !WORDS_SUFFIX.is_match(formatted) {
        return Err(FormattingInvariantError::MissingWords(formatted.to_string()));
    }

    Ok(())
}

/// Group digits the Indian way: the last three, then pairs (`1,50,000`).
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped: Vec<char> = Vec::with_capacity(digits.len() + digits.len() / 2);

    for (position, digit) in digits.chars().rev().enumerate() {
        if position == 3 || (position > 3 && (position - 3) % 2 == 0) {
            grouped.push(',');
        }

        grouped.push(digit);
    }

    grouped.into_iter().rev().collect()
}
