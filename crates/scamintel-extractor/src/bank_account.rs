//! Bank account extraction
//!
//! IBANs are recognized on shape alone (registered country code and total
//! length). Domestic account numbers are bare digit runs and only count
//! when banking vocabulary appears nearby; Indian payment rails take
//! precedence over the general banking keywords.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::checksum::mod97_valid;
use crate::context::context_window;
use crate::EntityExtractor;
use scamintel_core::{AccountType, BankAccountDetails, Entity, EntityDetails, EntityType, Language};

/// Countries that issue IBANs
const IBAN_COUNTRIES: &[&str] = &[
    "AD", "AE", "AL", "AT", "AZ", "BA", "BE", "BG", "BH", "BI", "BR", "BY", "CH", "CR", "CY",
    "CZ", "DE", "DJ", "DK", "DO", "EE", "EG", "ES", "FI", "FK", "FO", "FR", "GB", "GE", "GI",
    "GL", "GR", "GT", "HR", "HU", "IE", "IL", "IQ", "IS", "IT", "JO", "KW", "KZ", "LB", "LC",
    "LI", "LT", "LU", "LV", "LY", "MC", "MD", "ME", "MK", "MN", "MR", "MT", "MU", "NI", "NL",
    "NO", "OM", "PK", "PL", "PS", "PT", "QA", "RO", "RS", "RU", "SA", "SC", "SD", "SE", "SI",
    "SK", "SM", "SO", "ST", "SV", "TL", "TN", "TR", "UA", "VA", "VG", "XK", "YE",
];

const IBAN_MIN_LEN: usize = 15;
const IBAN_MAX_LEN: usize = 34;

/// Printed form: groups of four separated by single spaces
static IBAN_GROUPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z]{2}\d{2}(?: [A-Z0-9]{4}){2,7}(?: [A-Z0-9]{1,3})?\b")
        .expect("valid grouped IBAN pattern")
});

static IBAN_COMPACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z]{2}\d{2}[A-Z0-9]{1,30}\b").expect("valid compact IBAN pattern")
});

static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{8,18}\b").expect("valid account digit pattern"));

static INDIAN_BANKING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:ifsc|neft|rtgs|imps|upi)\b").expect("valid Indian banking pattern")
});

static GENERAL_BANKING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:accounts?|acct|a/c|routing|bank|banking|wire|ach|aba|swift|deposit|checking|savings|beneficiary)\b",
    )
    .expect("valid banking keyword pattern")
});

/// Registered country and length bounds; the checksum is reported separately
pub fn is_valid_iban(iban: &str) -> bool {
    let compact: String = iban.chars().filter(|c| !c.is_whitespace()).collect();
    if !(IBAN_MIN_LEN..=IBAN_MAX_LEN).contains(&compact.len()) {
        return false;
    }
    compact
        .get(..2)
        .map(|country| IBAN_COUNTRIES.contains(&country))
        .unwrap_or(false)
}

/// Extracts IBANs and context-confirmed domestic account numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct BankAccountExtractor;

impl BankAccountExtractor {
    pub fn new() -> Self {
        Self
    }

    fn ibans(&self, text: &str, seen: &mut HashSet<String>, entities: &mut Vec<Entity>) {
        for regex in [&*IBAN_GROUPED, &*IBAN_COMPACT] {
            for mat in regex.find_iter(text) {
                let compact: String = mat.as_str().chars().filter(|c| *c != ' ').collect();
                if !is_valid_iban(&compact) || !seen.insert(compact.clone()) {
                    continue;
                }

                let details = BankAccountDetails {
                    account_type: AccountType::Iban,
                    country_code: Some(compact[..2].to_string()),
                    checksum_valid: Some(mod97_valid(&compact)),
                };
                entities.push(
                    Entity::new(compact, 0.9, EntityDetails::BankAccount(details))
                        .with_context(context_window(text, mat.start(), mat.end()))
                        .with_validated(true),
                );
            }
        }
    }

    fn domestic(&self, text: &str, seen: &mut HashSet<String>, entities: &mut Vec<Entity>) {
        for mat in DIGIT_RUN.find_iter(text) {
            let digits = mat.as_str();
            let len = digits.len();
            let context = context_window(text, mat.start(), mat.end());

            let (account_type, country, confidence, validated) =
                if INDIAN_BANKING.is_match(&context) {
                    (AccountType::IndianAccount, "IN", 0.75, (9..=18).contains(&len))
                } else if GENERAL_BANKING.is_match(&context) && (8..=17).contains(&len) {
                    (AccountType::UsAccount, "US", 0.7, true)
                } else {
                    continue;
                };

            if !seen.insert(digits.to_string()) {
                continue;
            }

            let details = BankAccountDetails {
                account_type,
                country_code: Some(country.to_string()),
                checksum_valid: None,
            };
            entities.push(
                Entity::new(digits, confidence, EntityDetails::BankAccount(details))
                    .with_context(context)
                    .with_validated(validated),
            );
        }
    }
}

impl EntityExtractor for BankAccountExtractor {
    fn entity_type(&self) -> EntityType {
        EntityType::BankAccount
    }

    fn extract(&self, text: &str, _language: Option<Language>) -> Vec<Entity> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entities = Vec::new();

        self.ibans(text, &mut seen, &mut entities);
        self.domestic(text, &mut seen, &mut entities);

        debug!(count = entities.len(), "Bank account extraction finished");
        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts(text: &str) -> Vec<Entity> {
        BankAccountExtractor::new().extract(text, None)
    }

    fn details(entity: &Entity) -> &BankAccountDetails {
        match &entity.details {
            EntityDetails::BankAccount(d) => d,
            other => panic!("expected bank account details, got {:?}", other),
        }
    }

    #[test]
    fn test_iban_accepted() {
        let found = accounts("Send the deposit to DE89370400440532013000 now");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "DE89370400440532013000");
        assert_eq!(found[0].confidence, 0.9);
        assert!(found[0].validated);
        assert_eq!(details(&found[0]).account_type, AccountType::Iban);
        assert_eq!(details(&found[0]).country_code.as_deref(), Some("DE"));
        assert_eq!(details(&found[0]).checksum_valid, Some(true));
    }

    #[test]
    fn test_unregistered_country_rejected() {
        assert!(accounts("Send to XX89370400440532013000 now").is_empty());
        assert!(!is_valid_iban("XX89370400440532013000"));
    }

    #[test]
    fn test_length_bounds() {
        assert!(!is_valid_iban("DE8937040044"));
        assert!(!is_valid_iban(&format!("DE89{}", "1".repeat(31))));
    }

    #[test]
    fn test_grouped_iban_is_compacted() {
        let found = accounts("IBAN: GB82 WEST 1234 5698 7654 32.");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "GB82WEST12345698765432");
        assert_eq!(details(&found[0]).checksum_valid, Some(true));
    }

    #[test]
    fn test_bad_checksum_still_reported() {
        let found = accounts("DE89370400440532013001");

        assert_eq!(found.len(), 1);
        assert!(found[0].validated);
        assert_eq!(details(&found[0]).checksum_valid, Some(false));
    }

    #[test]
    fn test_indian_account() {
        let found = accounts("Account 123456789012 IFSC SBIN0001234");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "123456789012");
        assert_eq!(found[0].confidence, 0.75);
        assert!(found[0].validated);
        assert_eq!(details(&found[0]).account_type, AccountType::IndianAccount);
    }

    #[test]
    fn test_short_indian_account_not_validated() {
        let found = accounts("pay by neft to 12345678");

        assert_eq!(found.len(), 1);
        assert!(!found[0].validated);
    }

    #[test]
    fn test_us_accounts() {
        let found = accounts("wire to routing 021000021 account 12345678901");

        assert_eq!(found.len(), 2);
        assert!(found
            .iter()
            .all(|e| details(e).account_type == AccountType::UsAccount && e.confidence == 0.7));
    }

    #[test]
    fn test_us_length_limit() {
        assert!(accounts("account 123456789012345678").is_empty());
    }

    #[test]
    fn test_no_banking_context() {
        assert!(accounts("order number 12345678901 shipped").is_empty());
    }
}
