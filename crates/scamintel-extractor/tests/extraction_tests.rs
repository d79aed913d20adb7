//! Extraction integration tests
//!
//! Exercises the public library surface end to end: the free functions,
//! the per-type extractors with and without a language hint, and the
//! coordinator.

use scamintel_core::{
    AccountType, Entity, EntityDetails, EntityType, Language, LanguageDetection, PaymentSystem,
};
use scamintel_extractor::organization::impersonation_risk;
use scamintel_extractor::{
    detect_language, extract_bank_accounts, extract_emails, extract_entities,
    extract_organizations, extract_payment_ids, extract_phone_numbers, extract_urls,
    ExtractionCoordinator,
};

/// Everything but the timestamp
fn fingerprint(entities: &[Entity]) -> Vec<(String, f32, String, bool, EntityDetails)> {
    entities
        .iter()
        .map(|e| {
            (
                e.value.clone(),
                e.confidence,
                e.context.clone(),
                e.validated,
                e.details.clone(),
            )
        })
        .collect()
}

const SCAM_MESSAGE: &str = "URGENT: your PayPal account is suspended. Verify at \
    https://paypa1-secure.example/login or call +1 (555) 123-4567. \
    Pay the fee to scammer@paytm or wire to DE89370400440532013000. \
    Questions? mail support@paypa1-secure.example";

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_extraction_is_idempotent() {
    let first = extract_entities(SCAM_MESSAGE);
    let second = extract_entities(SCAM_MESSAGE);

    assert!(!first.is_empty());
    assert_eq!(fingerprint(&first), fingerprint(&second));
}

// =============================================================================
// Phone numbers
// =============================================================================

#[test]
fn test_us_number_matched_once() {
    let found = extract_phone_numbers("Call 555-123-4567", Some(Language::En));

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value, "+15551234567");
    match &found[0].details {
        EntityDetails::PhoneNumber(d) => assert_eq!(d.country_code, "1"),
        other => panic!("expected phone details, got {:?}", other),
    }
}

#[test]
fn test_regional_default_follows_language() {
    let country = |language| {
        let found = extract_phone_numbers("5551234567", Some(language));
        match &found[0].details {
            EntityDetails::PhoneNumber(d) => d.country_code.clone(),
            other => panic!("expected phone details, got {:?}", other),
        }
    };

    assert_eq!(country(Language::En), "1");
    assert_eq!(country(Language::Hi), "91");
}

#[test]
fn test_explicit_plus_confidence_ordering() {
    let explicit = extract_phone_numbers("+919876543210", Some(Language::En));
    let bare = extract_phone_numbers("919876543210", Some(Language::En));

    assert_eq!(explicit[0].value, bare[0].value);
    assert!(explicit[0].confidence >= bare[0].confidence);
}

// =============================================================================
// Payment identifiers
// =============================================================================

#[test]
fn test_upi_provider_whitelist() {
    let found = extract_payment_ids("pay user@paytm", Some(Language::En));
    assert_eq!(found.len(), 1);
    match &found[0].details {
        EntityDetails::PaymentId(d) => assert_eq!(d.payment_system, PaymentSystem::Upi),
        other => panic!("expected payment details, got {:?}", other),
    }

    assert!(extract_payment_ids("pay user@unknownprovider", Some(Language::En)).is_empty());
}

// =============================================================================
// URLs
// =============================================================================

#[test]
fn test_url_overlap_resolution() {
    let found = extract_urls("visit https://example.com/path today");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value, "https://example.com/path");
}

// =============================================================================
// Organizations
// =============================================================================

#[test]
fn test_impersonation_risk_monotonic() {
    let calm = "Message from PayPal: please verify your details";
    let pressured = "URGENT message from PayPal: verify immediately, details suspended";

    assert!(impersonation_risk("PayPal", pressured) >= impersonation_risk("PayPal", calm));

    let calm_org = &extract_organizations(calm)[0];
    let pressured_org = &extract_organizations(pressured)[0];
    let risk = |e: &Entity| match &e.details {
        EntityDetails::Organization(d) => d.impersonation_risk,
        other => panic!("expected organization details, got {:?}", other),
    };

    assert!(risk(pressured_org) >= risk(calm_org));
}

// =============================================================================
// Bank accounts
// =============================================================================

#[test]
fn test_iban_validation() {
    let accepted = extract_bank_accounts("DE89370400440532013000");
    assert_eq!(accepted.len(), 1);
    assert!(accepted[0].validated);
    match &accepted[0].details {
        EntityDetails::BankAccount(d) => assert_eq!(d.account_type, AccountType::Iban),
        other => panic!("expected bank account details, got {:?}", other),
    }

    assert!(extract_bank_accounts("QQ89370400440532013000").is_empty());
}

// =============================================================================
// Emails
// =============================================================================

#[test]
fn test_email_lowercased() {
    let found = extract_emails("Reach us at Help@Example.org");
    assert_eq!(found[0].value, "help@example.org");
}

// =============================================================================
// Language detection
// =============================================================================

#[test]
fn test_language_detection_edges() {
    assert_eq!(detect_language(""), LanguageDetection::unknown());
    assert_eq!(detect_language("0123456789"), LanguageDetection::unknown());
    assert_eq!(detect_language("请立即转账").language, Language::Zh);
}

// =============================================================================
// Coordinator
// =============================================================================

#[test]
fn test_coordinator_covers_every_type() {
    let report = ExtractionCoordinator::new().extract_report(SCAM_MESSAGE);

    for entity_type in [
        EntityType::PhoneNumber,
        EntityType::PaymentId,
        EntityType::Url,
        EntityType::Organization,
        EntityType::BankAccount,
        EntityType::Email,
    ] {
        assert!(
            report.of_type(entity_type).next().is_some(),
            "missing {entity_type}"
        );
    }

    // The country code survives a parenthesized area code
    assert!(report
        .of_type(EntityType::PhoneNumber)
        .any(|e| e.value == "+15551234567" && e.confidence == 0.9));

    let json = report.to_json(false).expect("report serializes");
    assert!(json.contains(r#""type":"phone_number""#));
}

#[test]
fn test_cross_type_collisions_are_kept() {
    // The same digits surface as a phone number and as a bank account
    let entities = extract_entities("bank account 5551234567");
    let types: Vec<EntityType> = entities.iter().map(|e| e.entity_type()).collect();

    assert!(types.contains(&EntityType::PhoneNumber));
    assert!(types.contains(&EntityType::BankAccount));
}
