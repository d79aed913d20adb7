//! Phone number extraction
//!
//! Six pattern families run in a fixed order. A number matched by several
//! families is kept once, as its first occurrence, and text already
//! claimed by an earlier family is not re-read by a later one.
//! Every match is normalized to `+<country code><national number>`, with
//! the country code inferred from an explicit `+`, well-known prefixes,
//! or the regional default of the conversation language.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::context::context_window;
use crate::{EntityExtractor, LanguageDetector};
use scamintel_core::{Entity, EntityDetails, EntityType, Language, PhoneDetails, PhoneFormat};

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

/// 2-digit country codes trusted without a leading `+` on 12-digit numbers
const KNOWN_PREFIXES: &[&str] = &["44", "91", "86"];

/// Pattern families, applied in this order
static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // E.164 with explicit plus, optional single separators and a
        // parenthesized area code: +1 (555) 123-4567
        r"\+\d{1,3}[ .-]?(?:\(\d{1,4}\)[ .-]?)?\d(?:[ .-]?\d){5,13}\b",
        // Parenthesized country code: +(44) or (+44)
        r"(?:\+\(\d{1,3}\)|\(\+\d{1,3}\))[ .-]?\d{2,5}(?:[ .-]?\d{2,5}){1,3}\b",
        // Parenthesized area code: (555) 123-4567
        r"\(\d{2,4}\)[ .-]?\d{3,4}[ .-]?\d{3,4}\b",
        // Separator-delimited with a leading country code, no plus
        r"\b\d{1,3}[ .-]\d{2,5}[ .-]\d{2,5}[ .-]\d{2,5}\b",
        // US style 3-3-4
        r"\b\d{3}[ .-]\d{3}[ .-]\d{4}\b",
        // Bare digit runs
        r"\b\d{10,15}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid phone pattern"))
    .collect()
});

static E164_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+\d{1,3}\d{4,14}$").expect("valid E.164 pattern"));

/// Default country code and region name for a conversation language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionalDefault {
    pub country_code: &'static str,
    pub region: &'static str,
}

const REGIONAL_DEFAULTS: &[(Language, RegionalDefault)] = &[
    (Language::En, RegionalDefault { country_code: "1", region: "United States" }),
    (Language::Es, RegionalDefault { country_code: "34", region: "Spain" }),
    (Language::Fr, RegionalDefault { country_code: "33", region: "France" }),
    (Language::De, RegionalDefault { country_code: "49", region: "Germany" }),
    (Language::Hi, RegionalDefault { country_code: "91", region: "India" }),
    (Language::Zh, RegionalDefault { country_code: "86", region: "China" }),
    (Language::Ar, RegionalDefault { country_code: "966", region: "Saudi Arabia" }),
    (Language::Ru, RegionalDefault { country_code: "7", region: "Russia" }),
    (Language::Pt, RegionalDefault { country_code: "55", region: "Brazil" }),
    (Language::It, RegionalDefault { country_code: "39", region: "Italy" }),
];

const UNKNOWN_REGION: RegionalDefault = RegionalDefault {
    country_code: "1",
    region: "Unknown",
};

/// Regional default for `language`, and whether the table knew it
pub fn regional_default(language: Language) -> (RegionalDefault, bool) {
    REGIONAL_DEFAULTS
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, default)| (*default, true))
        .unwrap_or((UNKNOWN_REGION, false))
}

/// A phone number after country-code inference
#[derive(Debug, Clone, PartialEq)]
struct NormalizedPhone {
    country_code: String,
    national_number: String,
    confidence: f32,
    format: PhoneFormat,
    region: Option<String>,
}

impl NormalizedPhone {
    fn value(&self) -> String {
        format!("+{}{}", self.country_code, self.national_number)
    }
}

fn normalize(raw: &str, language: Language) -> Option<NormalizedPhone> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let len = digits.len();
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&len) {
        return None;
    }

    let explicit = raw.trim_start_matches('(').starts_with('+');

    let (cc_len, confidence, format) = if explicit {
        let cc_len = if len == 11 && digits.starts_with('1') {
            1
        } else if (11..=13).contains(&len) {
            2
        } else if len >= 12 {
            3
        } else {
            1
        };
        (cc_len, 0.9, PhoneFormat::Explicit)
    } else if len == 11 && digits.starts_with('1') {
        (1, 0.8, PhoneFormat::NorthAmerican)
    } else if len == 12 && KNOWN_PREFIXES.contains(&&digits[..2]) {
        (2, 0.7, PhoneFormat::KnownPrefix)
    } else if len == 10 {
        let (default, known) = regional_default(language);
        return Some(NormalizedPhone {
            country_code: default.country_code.to_string(),
            national_number: digits,
            confidence: if known { 0.7 } else { 0.6 },
            format: PhoneFormat::RegionalDefault,
            region: Some(default.region.to_string()),
        });
    } else if (11..=13).contains(&len) {
        (len - 10, 0.5, PhoneFormat::InferredSplit)
    } else {
        (1, 0.4, PhoneFormat::Fallback)
    };

    let (country_code, national_number) = digits.split_at(cc_len);
    Some(NormalizedPhone {
        country_code: country_code.to_string(),
        national_number: national_number.to_string(),
        confidence,
        format,
        region: None,
    })
}

/// Extracts phone numbers in E.164 form
#[derive(Debug, Clone, Default)]
pub struct PhoneNumberExtractor {
    detector: LanguageDetector,
}

impl PhoneNumberExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntityExtractor for PhoneNumberExtractor {
    fn entity_type(&self) -> EntityType {
        EntityType::PhoneNumber
    }

    fn extract(&self, text: &str, language: Option<Language>) -> Vec<Entity> {
        let language = language.unwrap_or_else(|| self.detector.detect(text).language);
        let mut seen: HashSet<String> = HashSet::new();
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut entities = Vec::new();

        for regex in PATTERNS.iter() {
            for mat in regex.find_iter(text) {
                let (start, end) = (mat.start(), mat.end());
                if claimed.iter().any(|&(s, e)| start < e && s < end) {
                    continue;
                }
                let Some(phone) = normalize(mat.as_str(), language) else {
                    continue;
                };
                claimed.push((start, end));

                let value = phone.value();
                if !seen.insert(value.clone()) {
                    continue;
                }

                let validated = E164_SHAPE.is_match(&value);
                let details = PhoneDetails {
                    country_code: phone.country_code,
                    national_number: phone.national_number,
                    format: phone.format,
                    region: phone.region,
                    raw: mat.as_str().to_string(),
                };

                entities.push(
                    Entity::new(value, phone.confidence, EntityDetails::PhoneNumber(details))
                        .with_context(context_window(text, mat.start(), mat.end()))
                        .with_validated(validated),
                );
            }
        }

        debug!(count = entities.len(), %language, "Phone number extraction finished");
        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phones(text: &str, language: Option<Language>) -> Vec<Entity> {
        PhoneNumberExtractor::new().extract(text, language)
    }

    fn details(entity: &Entity) -> &PhoneDetails {
        match &entity.details {
            EntityDetails::PhoneNumber(d) => d,
            other => panic!("expected phone details, got {:?}", other),
        }
    }

    #[test]
    fn test_us_style_single_match() {
        let found = phones("Call 555-123-4567", Some(Language::En));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "+15551234567");
        assert_eq!(details(&found[0]).country_code, "1");
        assert!(found[0].validated);
    }

    #[test]
    fn test_regional_default() {
        let en = phones("5551234567", Some(Language::En));
        let hi = phones("5551234567", Some(Language::Hi));

        assert_eq!(details(&en[0]).country_code, "1");
        assert_eq!(details(&hi[0]).country_code, "91");
        assert_eq!(hi[0].value, "+915551234567");
        assert_eq!(hi[0].confidence, 0.7);
        assert_eq!(details(&hi[0]).region.as_deref(), Some("India"));
    }

    #[test]
    fn test_unknown_language_lowers_confidence() {
        let found = phones("5551234567", None);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].confidence, 0.6);
        assert_eq!(details(&found[0]).country_code, "1");
        assert_eq!(details(&found[0]).region.as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_explicit_plus_with_separators() {
        let found = phones("whatsapp me on +44 20 7946 0958 today", Some(Language::En));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "+442079460958");
        assert_eq!(found[0].confidence, 0.9);
        assert_eq!(details(&found[0]).country_code, "44");
        assert_eq!(details(&found[0]).format, PhoneFormat::Explicit);
        assert_eq!(details(&found[0]).raw, "+44 20 7946 0958");
    }

    #[test]
    fn test_parenthesized_country_code() {
        let found = phones("contact (+91) 98765 43210", Some(Language::En));

        assert_eq!(found[0].value, "+919876543210");
        assert_eq!(found[0].confidence, 0.9);
        assert_eq!(details(&found[0]).country_code, "91");
    }

    #[test]
    fn test_plus_with_parenthesized_area_code() {
        let found = phones("call +1 (555) 123-4567 now", Some(Language::Hi));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "+15551234567");
        assert_eq!(found[0].confidence, 0.9);
        assert_eq!(details(&found[0]).format, PhoneFormat::Explicit);
        assert_eq!(details(&found[0]).raw, "+1 (555) 123-4567");
    }

    #[test]
    fn test_parenthesized_area_code() {
        let found = phones("office (555) 123-4567", Some(Language::En));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "+15551234567");
    }

    #[test]
    fn test_country_code_inference_without_plus() {
        let na = normalize("15551234567", Language::En).unwrap();
        assert_eq!((na.country_code.as_str(), na.confidence), ("1", 0.8));

        let known = normalize("919876543210", Language::En).unwrap();
        assert_eq!(known.country_code, "91");
        assert_eq!(known.format, PhoneFormat::KnownPrefix);

        let split = normalize("4930123456789", Language::En).unwrap();
        assert_eq!(split.country_code, "493");
        assert_eq!(split.national_number, "0123456789");
        assert_eq!(split.confidence, 0.5);

        let fallback = normalize("12345678901234", Language::En).unwrap();
        assert_eq!(fallback.country_code, "1");
        assert_eq!(fallback.confidence, 0.4);
    }

    #[test]
    fn test_explicit_country_code_lengths() {
        assert_eq!(normalize("+15551234567", Language::En).unwrap().country_code, "1");
        assert_eq!(normalize("+919876543210", Language::En).unwrap().country_code, "91");
        assert_eq!(normalize("+97150123456789", Language::En).unwrap().country_code, "971");
        assert_eq!(normalize("+3312345678", Language::En).unwrap().country_code, "3");
    }

    #[test]
    fn test_digit_bounds() {
        assert!(normalize("123456", Language::En).is_none());
        assert!(normalize("1234567890123456", Language::En).is_none());
        assert!(phones("order 12345 or 1234567890123456", Some(Language::En)).is_empty());
    }

    #[test]
    fn test_explicit_never_below_inferred() {
        let explicit = phones("+15551234567", Some(Language::En));
        let bare = phones("15551234567", Some(Language::En));

        assert_eq!(explicit[0].value, bare[0].value);
        assert!(explicit[0].confidence >= bare[0].confidence);
    }

    #[test]
    fn test_duplicates_collapse() {
        let found = phones(
            "call 555-123-4567 or 555.123.4567 or 5551234567",
            Some(Language::En),
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_regional_table() {
        assert_eq!(regional_default(Language::Pt).0.country_code, "55");
        assert_eq!(regional_default(Language::Zh).0.country_code, "86");
        assert_eq!(regional_default(Language::Unknown), (UNKNOWN_REGION, false));
    }
}
