//! scamintel Core - Entity model, errors, and shared types
//!
//! This crate defines the types shared by every scamintel component:
//! - Extracted entity model (a shared base plus one tagged variant per type)
//! - Language tags and language detection results
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, ExtractionConfig, LoggingConfig};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for scamintel operations
///
/// The extraction engine itself never fails; these cover the edges around
/// it (parsing tags, loading configuration, reading input, serializing).
#[derive(Error, Debug)]
pub enum IntelError {
    #[error("Unsupported language tag: {0}")]
    InvalidLanguage(String),

    #[error("Unknown entity type: {0}")]
    InvalidEntityType(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IntelError>;

// ============================================================================
// Languages
// ============================================================================

/// Languages the detector can identify, tagged with ISO-639-1 codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Fr,
    De,
    Hi,
    Zh,
    Ar,
    Ru,
    Pt,
    It,
    #[default]
    Unknown,
}

impl Language {
    /// Every identifiable language, in detector evaluation order
    pub const SUPPORTED: [Language; 10] = [
        Self::En,
        Self::Es,
        Self::Fr,
        Self::De,
        Self::Hi,
        Self::Zh,
        Self::Ar,
        Self::Ru,
        Self::Pt,
        Self::It,
    ];

    /// ISO-639-1 code, or "unknown"
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Hi => "hi",
            Self::Zh => "zh",
            Self::Ar => "ar",
            Self::Ru => "ru",
            Self::Pt => "pt",
            Self::It => "it",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = IntelError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_lowercase();
        if tag == "unknown" {
            return Ok(Self::Unknown);
        }
        Self::SUPPORTED
            .iter()
            .copied()
            .find(|lang| lang.as_str() == tag)
            .ok_or_else(|| IntelError::InvalidLanguage(s.to_string()))
    }
}

/// Result of language identification on one input string
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanguageDetection {
    pub language: Language,
    /// Detection confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl LanguageDetection {
    pub fn new(language: Language, confidence: f32) -> Self {
        Self {
            language,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The "could not tell" result: unknown language, zero confidence
    pub fn unknown() -> Self {
        Self {
            language: Language::Unknown,
            confidence: 0.0,
        }
    }
}

// ============================================================================
// Entity Types
// ============================================================================

/// Closed set of entity kinds the engine extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    PhoneNumber,
    PaymentId,
    Url,
    Organization,
    BankAccount,
    Email,
}

impl EntityType {
    /// All entity types, in coordinator execution order
    pub const ALL: [EntityType; 6] = [
        Self::PhoneNumber,
        Self::PaymentId,
        Self::Url,
        Self::Organization,
        Self::BankAccount,
        Self::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhoneNumber => "phone_number",
            Self::PaymentId => "payment_id",
            Self::Url => "url",
            Self::Organization => "organization",
            Self::BankAccount => "bank_account",
            Self::Email => "email",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = IntelError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase().replace('-', "_");
        match name.as_str() {
            "phone_number" | "phone" => Ok(Self::PhoneNumber),
            "payment_id" | "payment" => Ok(Self::PaymentId),
            "url" => Ok(Self::Url),
            "organization" | "org" => Ok(Self::Organization),
            "bank_account" | "bank" => Ok(Self::BankAccount),
            "email" => Ok(Self::Email),
            _ => Err(IntelError::InvalidEntityType(s.to_string())),
        }
    }
}

// ============================================================================
// Per-type Details
// ============================================================================

/// How a phone number's country code was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhoneFormat {
    /// Leading `+` in the source text
    Explicit,
    /// 11 digits starting with 1
    NorthAmerican,
    /// 12 digits with a well-known 2-digit prefix
    KnownPrefix,
    /// 10 digits, country code taken from the regional default
    RegionalDefault,
    /// Last 10 digits national, the rest country code
    InferredSplit,
    /// First digit as country code
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneDetails {
    pub country_code: String,
    pub national_number: String,
    pub format: PhoneFormat,
    /// Region name for the country code when it came from the regional table
    pub region: Option<String>,
    /// Text as it appeared in the source
    pub raw: String,
}

/// Payment rails recognized by the payment-id extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentSystem {
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "BITCOIN")]
    Bitcoin,
    #[serde(rename = "ETHEREUM")]
    Ethereum,
    #[serde(rename = "PAYPAL")]
    PayPal,
    #[serde(rename = "ALIPAY")]
    Alipay,
    #[serde(rename = "WECHAT_PAY")]
    WeChatPay,
    #[serde(rename = "PIX")]
    Pix,
    #[serde(rename = "SEPA")]
    Sepa,
}

impl PaymentSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::Bitcoin => "BITCOIN",
            Self::Ethereum => "ETHEREUM",
            Self::PayPal => "PAYPAL",
            Self::Alipay => "ALIPAY",
            Self::WeChatPay => "WECHAT_PAY",
            Self::Pix => "PIX",
            Self::Sepa => "SEPA",
        }
    }
}

impl std::fmt::Display for PaymentSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub payment_system: PaymentSystem,
    /// UPI provider handle (the part after `@`)
    pub provider: Option<String>,
    /// Address or key kind, e.g. "P2PKH", "BECH32", "EMAIL", "CPF", "UUID"
    pub key_type: Option<String>,
    /// ISO 7064 mod-97 result, for references that carry check digits
    pub checksum_valid: Option<bool>,
}

impl PaymentDetails {
    pub fn new(payment_system: PaymentSystem) -> Self {
        Self {
            payment_system,
            provider: None,
            key_type: None,
            checksum_valid: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_key_type(mut self, key_type: impl Into<String>) -> Self {
        self.key_type = Some(key_type.into());
        self
    }

    pub fn with_checksum(mut self, valid: bool) -> Self {
        self.checksum_valid = Some(valid);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlDetails {
    /// Lower-cased host without protocol, port, userinfo or `www.`
    pub domain: String,
    pub protocol: String,
    /// Whether the protocol was written in the source text
    pub explicit_protocol: bool,
}

/// Which organization pass produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationKind {
    KnownBrand,
    LegalEntity,
    Institution,
    SupportName,
    Quoted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationDetails {
    pub kind: OrganizationKind,
    /// Heuristic estimate (0.0 - 1.0) that the name is used to impersonate
    pub impersonation_risk: f32,
    /// `impersonation_risk > 0.5`
    pub potentially_fake: bool,
    /// Legal suffix, institutional keyword or support word that matched
    pub matched_keyword: Option<String>,
    /// Sector of a curated brand, e.g. "bank", "government"
    pub sector: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Iban,
    IndianAccount,
    UsAccount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccountDetails {
    pub account_type: AccountType,
    /// IBAN country prefix
    pub country_code: Option<String>,
    /// IBAN mod-97 result
    pub checksum_valid: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailDetails {
    pub domain: String,
}

/// Type-specific payload of an entity; the variant fixes the entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "metadata", rename_all = "snake_case")]
pub enum EntityDetails {
    PhoneNumber(PhoneDetails),
    PaymentId(PaymentDetails),
    Url(UrlDetails),
    Organization(OrganizationDetails),
    BankAccount(BankAccountDetails),
    Email(EmailDetails),
}

impl EntityDetails {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::PhoneNumber(_) => EntityType::PhoneNumber,
            Self::PaymentId(_) => EntityType::PaymentId,
            Self::Url(_) => EntityType::Url,
            Self::Organization(_) => EntityType::Organization,
            Self::BankAccount(_) => EntityType::BankAccount,
            Self::Email(_) => EntityType::Email,
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A single piece of intelligence extracted from conversational text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical, normalized value
    pub value: String,

    /// Extraction confidence (0.0 - 1.0)
    pub confidence: f32,

    /// Trimmed source text surrounding the match
    pub context: String,

    /// When this entity was extracted
    pub timestamp: DateTime<Utc>,

    /// Whether the value passed its type's structural check
    pub validated: bool,

    #[serde(flatten)]
    pub details: EntityDetails,
}

impl Entity {
    /// Create a new entity
    pub fn new(value: impl Into<String>, confidence: f32, details: EntityDetails) -> Self {
        Self {
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
            context: String::new(),
            timestamp: Utc::now(),
            validated: false,
            details,
        }
    }

    /// Set the context snippet
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Set the structural validation flag
    pub fn with_validated(mut self, validated: bool) -> Self {
        self.validated = validated;
        self
    }

    pub fn entity_type(&self) -> EntityType {
        self.details.entity_type()
    }
}

/// Count entities per type
pub fn count_by_type(entities: &[Entity]) -> BTreeMap<EntityType, usize> {
    let mut counts = BTreeMap::new();
    for entity in entities {
        *counts.entry(entity.entity_type()).or_insert(0) += 1;
    }
    counts
}

/// Everything extracted from one input, with the detected language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub language: LanguageDetection,
    pub entities: Vec<Entity>,
    pub counts: BTreeMap<EntityType, usize>,
}

impl ExtractionReport {
    pub fn new(language: LanguageDetection, entities: Vec<Entity>) -> Self {
        let counts = count_by_type(&entities);
        Self {
            language,
            entities,
            counts,
        }
    }

    /// Entities of one type, in extraction order
    pub fn of_type(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |e| e.entity_type() == entity_type)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
