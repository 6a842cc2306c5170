//! Platforms
//!
//! Usage rights in a generated agreement may only name platforms from a closed set.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

/// A platform a creator may publish on or grant usage rights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Instagram
    Instagram,

    /// `YouTube`
    #[serde(rename = "YouTube")]
    YouTube,

    /// Brand website
    Website,

    /// Paid advertising placements
    #[serde(rename = "Paid Ads")]
    PaidAds,
}

/// Normalised platform list. Never empty once produced by [`normalize_platforms`].
pub type Platforms = SmallVec<[Platform; 4]>;

impl Platform {
    /// Display name used in contract text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::YouTube => "YouTube",
            Self::Website => "Website",
            Self::PaidAds => "Paid Ads",
        }
    }

    /// Fuzzy-map a loosely written platform name onto the closed set.
    ///
    /// Returns `None` for "Other" and anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "" | "other" | "others" => None,
            "ig" | "insta" | "instagram" | "reels" => Some(Self::Instagram),
            "yt" | "youtube" | "shorts" => Some(Self::YouTube),
            "web" | "site" | "website" | "blog" => Some(Self::Website),
            "ads" | "paid" | "paidads" | "metaads" | "googleads" | "facebookads" => {
                Some(Self::PaidAds)
            }
            key if key.starts_with("insta") => Some(Self::Instagram),
            key if key.contains("youtube") => Some(Self::YouTube),
            key if key.contains("website") => Some(Self::Website),
            key if key.starts_with("paid") || key.ends_with("ads") => Some(Self::PaidAds),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalise a platform list against the closed set.
///
/// Unknown values and "Other" are dropped, duplicates are removed keeping the first
/// occurrence, and an empty result falls back to Instagram.
pub fn normalize_platforms<I, S>(raw: I) -> Platforms
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut platforms = Platforms::new();

    for platform in raw.into_iter().filter_map(|value| Platform::parse(value.as_ref())) {
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }

    if platforms.is_empty() {
        return smallvec![Platform::Instagram];
    }

    platforms
}

/// Join platform names for contract prose: `Instagram, YouTube and Website`.
pub fn platforms_sentence(platforms: &[Platform]) -> String {
    match platforms {
        [] => String::new(),
        [only] => only.as_str().to_string(),
        [init @ .., last] => format!(
            "{} and {}",
            init.iter()
                .map(|platform| platform.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            last.as_str()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_maps_common_aliases() {
        assert_eq!(Platform::parse("insta"), Some(Platform::Instagram));
        assert_eq!(Platform::parse("IG"), Some(Platform::Instagram));
        assert_eq!(Platform::parse("yt"), Some(Platform::YouTube));
        assert_eq!(Platform::parse("YouTube Shorts"), Some(Platform::YouTube));
        assert_eq!(Platform::parse("blog"), Some(Platform::Website));
        assert_eq!(Platform::parse("Meta Ads"), Some(Platform::PaidAds));
        assert_eq!(Platform::parse("Paid Ads"), Some(Platform::PaidAds));
    }

    #[test]
    fn parse_rejects_other_and_unknown() {
        assert_eq!(Platform::parse("Other"), None);
        assert_eq!(Platform::parse("TikTok"), None);
        assert_eq!(Platform::parse("   "), None);
    }

    #[test]
    fn normalize_drops_other_and_keeps_valid_entries() {
        let platforms = normalize_platforms(["Other", "yt", "Instagram"]);

        assert_eq!(platforms.as_slice(), [Platform::YouTube, Platform::Instagram]);
    }

    #[test]
    fn normalize_removes_duplicates() {
        let platforms = normalize_platforms(["insta", "Instagram", "IG", "website"]);

        assert_eq!(platforms.as_slice(), [Platform::Instagram, Platform::Website]);
    }

    #[test]
    fn normalize_falls_back_to_instagram() {
        assert_eq!(
            normalize_platforms(["Other", "Snapchat"]).as_slice(),
            [Platform::Instagram]
        );
        assert_eq!(
            normalize_platforms(Vec::<String>::new()).as_slice(),
            [Platform::Instagram]
        );
    }

    #[test]
    fn other_never_survives_normalisation() {
        let inputs: [&[&str]; 3] = [
            &["Other", "Instagram"],
            &["Other", "Other", "Paid Ads"],
            &["YouTube", "Other", "Website"],
        ];

        for input in inputs {
            let platforms = normalize_platforms(input);

            assert!(!platforms.is_empty(), "{input:?} produced no platforms");
            assert!(
                platforms.iter().all(|platform| platform.as_str() != "Other"),
                "{input:?} leaked Other"
            );
        }
    }

    #[test]
    fn sentence_joins_platform_names() {
        assert_eq!(platforms_sentence(&[Platform::Instagram]), "Instagram");
        assert_eq!(
            platforms_sentence(&[Platform::Instagram, Platform::YouTube, Platform::PaidAds]),
            "Instagram, YouTube and Paid Ads"
        );
    }

    #[test]
    fn serializes_with_contract_names() -> testresult::TestResult {
        let json = serde_json::to_string(&[Platform::YouTube, Platform::PaidAds])?;

        assert_eq!(json, r#"["YouTube","Paid Ads"]"#);

        Ok(())
    }
}
