//! scamintel Extractor - Entity extraction engine
//!
//! Pulls phone numbers, payment identifiers, URLs, organization names,
//! bank accounts and email addresses out of free-form conversation text
//! using deterministic patterns, dictionaries and scoring heuristics.
//! A lightweight language detector steers the region-specific rules.
//!
//! Every extractor is stateless: calls share nothing and can run
//! concurrently without locking.

use scamintel_core::{Entity, EntityType, Language, LanguageDetection};

/// Trait for per-type entity extractors
pub trait EntityExtractor: Send + Sync {
    /// The entity type this extractor produces
    fn entity_type(&self) -> EntityType;

    /// Extract entities from `text`.
    ///
    /// `language` is a pre-computed hint; extractors that use regional
    /// rules detect the language themselves when it is `None`.
    fn extract(&self, text: &str, language: Option<Language>) -> Vec<Entity>;
}

pub mod bank_account;
pub mod checksum;
pub mod context;
pub mod coordinator;
pub mod email;
pub mod language;
pub mod observer;
pub mod organization;
pub mod payment;
pub mod phone;
pub mod url;

pub use bank_account::BankAccountExtractor;
pub use coordinator::ExtractionCoordinator;
pub use email::EmailExtractor;
pub use language::LanguageDetector;
pub use observer::{
    ExtractionObserver, ExtractionSummary, NoopObserver, PrometheusObserver, TracingObserver,
};
pub use organization::OrganizationExtractor;
pub use payment::PaymentIdExtractor;
pub use phone::PhoneNumberExtractor;
pub use url::UrlExtractor;

/// Extract every supported entity type from `text`
pub fn extract_entities(text: &str) -> Vec<Entity> {
    ExtractionCoordinator::new().extract_all(text)
}

/// Identify the language of `text`
pub fn detect_language(text: &str) -> LanguageDetection {
    LanguageDetector::new().detect(text)
}

pub fn extract_phone_numbers(text: &str, language: Option<Language>) -> Vec<Entity> {
    PhoneNumberExtractor::new().extract(text, language)
}

pub fn extract_payment_ids(text: &str, language: Option<Language>) -> Vec<Entity> {
    PaymentIdExtractor::new().extract(text, language)
}

pub fn extract_urls(text: &str) -> Vec<Entity> {
    UrlExtractor::new().extract(text, None)
}

pub fn extract_organizations(text: &str) -> Vec<Entity> {
    OrganizationExtractor::new().extract(text, None)
}

pub fn extract_bank_accounts(text: &str) -> Vec<Entity> {
    BankAccountExtractor::new().extract(text, None)
}

pub fn extract_emails(text: &str) -> Vec<Entity> {
    EmailExtractor::new().extract(text, None)
}
