//! Deliverables
//!
//! Deals arrive with deliverables either as structured items or as free text typed
//! by a creator. Both are normalised into the same contract sentence.

use std::sync::LazyLock;

use jiff::civil::Date;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{platforms::Platform, timestamps::parse_date, words::quantity_word};

/// Delivery window used when no usable deadline is known.
pub const DEFAULT_DELIVERY_DAYS: i64 = 7;

/// Minimum duration attached to short-form video deliverables classified from text.
pub const DEFAULT_REEL_DURATION_SECS: u32 = 15;

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static LEADING_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:x\s*)?(\d{1,3})\b").expect("count pattern should compile")
});

/// A deliverable entered through the structured form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDeliverable {
    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub content_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_count")]
    pub quantity: Option<u32>,

    /// Minimum duration in seconds.
    #[serde(default, deserialize_with = "lenient_count")]
    pub duration: Option<u32>,
}

/// One deliverable entry as stored on a deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeliverableItem {
    /// A free-text line such as `"2 reels"`.
    Text(String),
    /// Platform, content type and counts as separate fields.
    Structured(StructuredDeliverable),
}

/// Deliverables as stored on a deal: a list of entries or a single free-text blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Deliverables {
    /// A list of entries.
    Items(Vec<DeliverableItem>),
    /// Free text split on lines and commas. A JSON array held as text is decoded.
    Text(String),
}

impl Default for Deliverables {
    fn default() -> Self {
        Self::Items(Vec::new())
    }
}

/// A deliverable in canonical form, ready to be rendered into contract prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedDeliverable {
    /// At least one.
    pub quantity: u32,
    /// A label from the closed platform set.
    pub platform: String,
    pub content_type: String,
    /// Minimum video length, when one was given.
    pub min_duration_secs: Option<u32>,
}

impl NormalizedDeliverable {
    /// Render the contract sentence for this deliverable.
    pub fn render(&self, delivery_days: i64) -> String {
        let duration = self
            .min_duration_secs
            .map(|secs| format!(" of minimum {secs}s"))
            .unwrap_or_default();

        format!(
            "{} {} {}{duration}, published on the Creator's {} account, within {delivery_days} days of agreement execution.",
            quantity_word(self.quantity),
            self.platform,
            self.content_type,
            self.platform,
        )
    }
}

impl From<&StructuredDeliverable> for NormalizedDeliverable {
    fn from(item: &StructuredDeliverable) -> Self {
        let platform = item
            .platform
            .as_deref()
            .and_then(Platform::parse)
            .unwrap_or(Platform::Instagram)
            .as_str()
            .to_string();

        let content_type = item
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|content_type| !content_type.is_empty())
            .unwrap_or("Content")
            .to_string();

        Self {
            quantity: item.quantity.filter(|quantity| *quantity > 0).unwrap_or(1),
            platform,
            content_type,
            min_duration_secs: item.duration.filter(|duration| *duration > 0),
        }
    }
}

/// Classify a free-text deliverable by keyword.
pub fn classify_text(text: &str) -> NormalizedDeliverable {
    let lower = text.to_lowercase();

    let quantity = LEADING_COUNT
        .captures(&lower)
        .and_then(|captures| captures.get(1))
        .and_then(|count| count.as_str().parse::<u32>().ok())
        .filter(|count| *count > 0)
        .unwrap_or(1);

    let (platform, content_type, min_duration_secs) = if lower.contains("youtube") {
        (Platform::YouTube, "Video", None)
    } else if lower.contains("reel") || lower.contains("video") {
        (
            Platform::Instagram,
            "Reel",
            Some(DEFAULT_REEL_DURATION_SECS),
        )
    } else if lower.contains("story") || lower.contains("stories") {
        (Platform::Instagram, "Story", None)
    } else if lower.contains("post") || lower.contains("carousel") {
        (Platform::Instagram, "Post", None)
    } else {
        (Platform::Instagram, "Content", None)
    };

    NormalizedDeliverable {
        quantity,
        platform: platform.as_str().to_string(),
        content_type: content_type.to_string(),
        min_duration_secs,
    }
}

impl Deliverables {
    /// Interpret a raw text column: a JSON array of entries, or free text with one
    /// deliverable per line, comma or semicolon.
    pub fn from_raw(raw: &str) -> Self {
        decode_items(raw).map_or_else(|| Self::Text(raw.trim().to_string()), Self::Items)
    }

    /// Normalise every entry.
    pub fn normalize(&self) -> Vec<NormalizedDeliverable> {
        match self {
            Self::Items(items) => items
                .iter()
                .flat_map(|item| match item {
                    DeliverableItem::Structured(structured) => {
                        vec![NormalizedDeliverable::from(structured)]
                    }
                    DeliverableItem::Text(text) => normalize_text(text),
                })
                .collect(),
            Self::Text(text) => normalize_text(text),
        }
    }

    /// Whether there is nothing to deliver.
    pub fn is_empty(&self) -> bool {
        self.normalize().is_empty()
    }
}

/// A JSON array of entries stored inside a text value.
fn decode_items(text: &str) -> Option<Vec<DeliverableItem>> {
    let trimmed = text.trim();

    if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).ok()
    } else {
        None
    }
}

fn normalize_text(text: &str) -> Vec<NormalizedDeliverable> {
    match decode_items(text) {
        Some(items) => Deliverables::Items(items).normalize(),
        None => split_text(text).map(classify_text).collect(),
    }
}

fn split_text(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\n', ',', ';'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// Days from `today` until `deadline`, rounded up.
///
/// Falls back to [`DEFAULT_DELIVERY_DAYS`] when the deadline is missing, unparsable,
/// or not in the future.
pub fn delivery_window_days(deadline: Option<&str>, today: Date) -> i64 {
    deadline
        .and_then(parse_date)
        .and_then(|deadline| today.until(deadline).ok())
        .map(|span| i64::from(span.get_days()))
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_DELIVERY_DAYS)
}

/// Render every deliverable into contract sentences.
pub fn render_deliverables(
    deliverables: &Deliverables,
    deadline: Option<&str>,
    today: Date,
) -> Vec<String> {
    let days = delivery_window_days(deadline, today);

    deliverables
        .normalize()
        .iter()
        .map(|deliverable| deliverable.render(days))
        .collect()
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "float counts are checked to be finite and non-negative before rounding"
)]
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.is_finite() && *float >= 0.0)
                    .map(|float| float.round() as u64)
            })
            .and_then(|count| u32::try_from(count).ok()),
        Some(Value::String(text)) => text.trim().parse::<u32>().ok(),
        _ => None,
    })
}
