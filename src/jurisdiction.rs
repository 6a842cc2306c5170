//! Jurisdiction
//!
//! The governing-law city is taken from an explicit value when one is meaningful,
//! otherwise inferred from the parties' addresses. There is no silent default: when
//! nothing can be inferred the result is empty and contract validation fails.

use std::sync::LazyLock;

use regex::Regex;

/// Explicit value that means "nobody chose a jurisdiction".
pub const NOT_SPECIFIED: &str = "Not specified";

/// Historical default that is only honoured when no address yields a city.
pub const LEGACY_DEFAULT_CITY: &str = "Delhi";

/// Major Indian cities matched directly in addresses, multi-word names first.
pub const MAJOR_CITIES: &[&str] = &[
    "New Delhi",
    "Navi Mumbai",
    "Mumbai",
    "Delhi",
    "Bengaluru",
    "Bangalore",
    "Hyderabad",
    "Chennai",
    "Kolkata",
    "Pune",
    "Ahmedabad",
    "Jaipur",
    "Surat",
    "Lucknow",
    "Kanpur",
    "Nagpur",
    "Indore",
    "Thane",
    "Bhopal",
    "Visakhapatnam",
    "Patna",
    "Vadodara",
    "Ghaziabad",
    "Ludhiana",
    "Agra",
    "Nashik",
    "Faridabad",
    "Meerut",
    "Rajkot",
    "Varanasi",
    "Srinagar",
    "Amritsar",
    "Noida",
    "Gurugram",
    "Gurgaon",
    "Chandigarh",
    "Coimbatore",
    "Kochi",
    "Guwahati",
    "Bhubaneswar",
    "Dehradun",
    "Mysuru",
    "Mysore",
    "Goa",
];

#[expect(clippy::expect_used, reason = "patterns are built from constants")]
static CITY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    MAJOR_CITIES
        .iter()
        .map(|city| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(city).replace(' ', r"\s+"));

            (*city, Regex::new(&pattern).expect("city pattern should compile"))
        })
        .collect()
});

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static CITY_STATE_PIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s*([A-Za-z][A-Za-z .]*?)\s*,\s*[A-Za-z][A-Za-z .]*?\s*[,-]?\s*\d{6}\b")
        .expect("city/state/PIN pattern should compile")
});

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static CITY_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z][A-Za-z ]*[A-Za-z])\s*,\s*[A-Za-z][A-Za-z ]*[A-Za-z]\s*\.?\s*$")
        .expect("city/state pattern should compile")
});

/// Extract a city from a free-form address.
///
/// Tries, in order: a known major city anywhere in the text, the city in a
/// `", <city>, <state>, <PIN>"` tail, then a trailing `"<city>, <state>"` pair
/// whose city has more than two characters.
pub fn extract_city(address: &str) -> Option<String> {
    let address = address.trim();

    if address.is_empty() {
        return None;
    }

    if let Some((city, _)) = CITY_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(address))
    {
        return Some((*city).to_string());
    }

    if let Some(city) = CITY_STATE_PIN
        .captures(address)
        .and_then(|captures| captures.get(1))
        .map(|city| city.as_str().trim())
        .filter(|city| !city.is_empty())
    {
        return Some(city.to_string());
    }

    CITY_STATE
        .captures(address)
        .and_then(|captures| captures.get(1))
        .map(|city| city.as_str().trim())
        .filter(|city| city.chars().count() > 2)
        .map(str::to_string)
}

/// Resolve the governing-law city.
///
/// First match wins:
/// 1. an explicit value that is neither blank, "Delhi", nor "Not specified";
/// 2. the city in the creator's address;
/// 3. the city in the brand's address;
/// 4. an explicit "Delhi";
/// 5. otherwise an empty string.
pub fn resolve_jurisdiction(
    explicit: Option<&str>,
    creator_address: Option<&str>,
    brand_address: Option<&str>,
) -> String {
    let explicit = explicit.map(str::trim).filter(|value| !value.is_empty());

    if let Some(value) = explicit
        && !value.eq_ignore_ascii_case(LEGACY_DEFAULT_CITY)
        && !value.eq_ignore_ascii_case(NOT_SPECIFIED)
    {
        return value.to_string();
    }

    if let Some(city) = creator_address.and_then(extract_city) {
        return city;
    }

    if let Some(city) = brand_address.and_then(extract_city) {
        return city;
    }

    if explicit.is_some_and(|value| value.eq_ignore_ascii_case(LEGACY_DEFAULT_CITY)) {
        return LEGACY_DEFAULT_CITY.to_string();
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_major_city_case_insensitively() {
        assert_eq!(
            extract_city("12 MG Road, pune, Maharashtra 411001"),
            Some("Pune".to_string())
        );
    }

    #[test]
    fn major_city_match_respects_word_boundaries() {
        assert_eq!(extract_city("Punewala Street"), None);
    }

    #[test]
    fn prefers_multi_word_city_names() {
        assert_eq!(
            extract_city("Sector 17, Vashi, Navi Mumbai"),
            Some("Navi Mumbai".to_string())
        );
        assert_eq!(
            extract_city("Connaught Place, New Delhi 110001"),
            Some("New Delhi".to_string())
        );
    }

    #[test]
    fn extracts_city_from_city_state_pin_tail() {
        assert_eq!(
            extract_city("Plot 4, Civil Lines, Alwar, Rajasthan, 301001"),
            Some("Alwar".to_string())
        );
    }

    #[test]
    fn extracts_city_from_trailing_city_state_pair() {
        assert_eq!(
            extract_city("House 9, Siliguri, West Bengal"),
            Some("Siliguri".to_string())
        );
    }

    #[test]
    fn city_state_pair_requires_city_longer_than_two_chars() {
        assert_eq!(extract_city("AB, Kerala"), None);
    }

    #[test]
    fn no_city_in_unstructured_address() {
        assert_eq!(extract_city("somewhere"), None);
        assert_eq!(extract_city(""), None);
    }

    #[test]
    fn explicit_non_delhi_jurisdiction_wins() {
        assert_eq!(
            resolve_jurisdiction(
                Some("Mumbai"),
                Some("12 MG Road, Pune, Maharashtra 411001"),
                None
            ),
            "Mumbai"
        );
    }

    #[test]
    fn creator_address_beats_brand_address() {
        assert_eq!(
            resolve_jurisdiction(
                None,
                Some("12 MG Road, Pune, Maharashtra 411001"),
                Some("Indiranagar, Bengaluru 560038")
            ),
            "Pune"
        );
    }

    #[test]
    fn brand_address_used_when_creator_has_no_city() {
        assert_eq!(
            resolve_jurisdiction(
                Some("Not specified"),
                Some("somewhere"),
                Some("Indiranagar, Bengaluru 560038")
            ),
            "Bengaluru"
        );
    }

    #[test]
    fn explicit_delhi_only_applies_after_addresses() {
        assert_eq!(
            resolve_jurisdiction(Some("Delhi"), Some("12 MG Road, Pune"), None),
            "Pune"
        );
        assert_eq!(resolve_jurisdiction(Some("Delhi"), None, None), "Delhi");
    }

    #[test]
    fn unresolvable_jurisdiction_is_empty() {
        assert_eq!(resolve_jurisdiction(None, None, None), "");
        assert_eq!(resolve_jurisdiction(Some("  "), Some("somewhere"), None), "");
        assert_eq!(resolve_jurisdiction(Some("Not specified"), None, None), "");
    }
}
