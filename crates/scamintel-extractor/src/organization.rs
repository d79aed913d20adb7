//! Organization extraction
//!
//! Five independent passes, sharing one case-insensitive dedup set:
//! 1. Curated brands and institutions scammers commonly impersonate
//! 2. Capitalized phrase + legal suffix ("Apex Global Inc")
//! 3. Capitalized phrase + institutional keyword ("First Federal Bank")
//! 4. Capitalized word + Support/Service/Team/Help/Desk ("Amaz0n Support")
//! 5. Quoted capitalized phrases
//!
//! Every match carries an impersonation-risk score built from the
//! surrounding urgency, authority and financial language and from
//! suspicious characters in the name itself.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::context::context_window;
use crate::EntityExtractor;
use scamintel_core::{
    Entity, EntityDetails, EntityType, Language, OrganizationDetails, OrganizationKind,
};

struct Brand {
    name: &'static str,
    sector: &'static str,
}

const BRANDS: &[Brand] = &[
    Brand { name: "PayPal", sector: "payments" },
    Brand { name: "Paytm", sector: "payments" },
    Brand { name: "PhonePe", sector: "payments" },
    Brand { name: "Google Pay", sector: "payments" },
    Brand { name: "Western Union", sector: "payments" },
    Brand { name: "MoneyGram", sector: "payments" },
    Brand { name: "Venmo", sector: "payments" },
    Brand { name: "Cash App", sector: "payments" },
    Brand { name: "Zelle", sector: "payments" },
    Brand { name: "Amazon", sector: "technology" },
    Brand { name: "Apple", sector: "technology" },
    Brand { name: "Microsoft", sector: "technology" },
    Brand { name: "Google", sector: "technology" },
    Brand { name: "Netflix", sector: "technology" },
    Brand { name: "Facebook", sector: "technology" },
    Brand { name: "Instagram", sector: "technology" },
    Brand { name: "WhatsApp", sector: "technology" },
    Brand { name: "Bank of America", sector: "bank" },
    Brand { name: "Chase", sector: "bank" },
    Brand { name: "Wells Fargo", sector: "bank" },
    Brand { name: "Citibank", sector: "bank" },
    Brand { name: "HSBC", sector: "bank" },
    Brand { name: "Barclays", sector: "bank" },
    Brand { name: "State Bank of India", sector: "bank" },
    Brand { name: "SBI", sector: "bank" },
    Brand { name: "HDFC Bank", sector: "bank" },
    Brand { name: "ICICI Bank", sector: "bank" },
    Brand { name: "IRS", sector: "government" },
    Brand { name: "FBI", sector: "government" },
    Brand { name: "Social Security Administration", sector: "government" },
    Brand { name: "HMRC", sector: "government" },
    Brand { name: "Interpol", sector: "government" },
    Brand { name: "DHL", sector: "delivery" },
    Brand { name: "FedEx", sector: "delivery" },
    Brand { name: "USPS", sector: "delivery" },
    Brand { name: "Coinbase", sector: "crypto" },
    Brand { name: "Binance", sector: "crypto" },
];

/// Urgency, verification and threat phrasing; 0.25 each, capped at 0.7
const PRESSURE_INDICATORS: &[&str] = &[
    "urgent",
    "immediately",
    "verify",
    "verification",
    "suspended",
    "locked",
    "blocked",
    "confirm your",
    "act now",
    "within 24 hours",
    "expire",
    "legal action",
    "arrest",
    "penalty",
    "unauthorized",
    "security alert",
    "final notice",
    "warrant",
];

const AUTHORITY_KEYWORDS: &[&str] = &[
    "official",
    "government",
    "department",
    "police",
    "federal",
    "tax",
    "customs",
    "court",
    "authority",
    "agent",
    "officer",
    "compliance",
];

const FINANCIAL_KEYWORDS: &[&str] = &[
    "bank",
    "account",
    "payment",
    "transfer",
    "refund",
    "card",
    "wallet",
    "transaction",
    "money",
    "fund",
];

/// Leading words that make a "<Word> Support" match generic, not a name
const GENERIC_SUPPORT_WORDS: &[&str] = &[
    "customer", "technical", "tech", "our", "the", "your", "this", "online", "security",
    "account", "billing", "fraud", "help", "support", "service", "team",
];

static BRAND_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // Longest names first so "Bank of America" wins over shorter overlaps
    let mut names: Vec<&str> = BRANDS.iter().map(|b| b.name).collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid brand pattern")
});

static BRAND_LOOKUP: Lazy<HashMap<String, &'static Brand>> = Lazy::new(|| {
    BRANDS
        .iter()
        .map(|brand| (brand.name.to_lowercase(), brand))
        .collect()
});

static LEGAL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([A-Z][\w&'-]*(?:\s+[A-Z][\w&'-]*){0,4}),?\s+(Inc|LLC|Ltd|Limited|Corp|Corporation|GmbH|PLC|LLP|Pvt\.?\s+Ltd|Co)\b",
    )
    .expect("valid legal suffix pattern")
});

static INSTITUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([A-Z][\w&'-]*(?:\s+[A-Z][\w&'-]*){0,3})\s+(Bank|Trust|Services|Financial|Insurance|Securities|Credit\s+Union|Investments|Capital|Holdings|Group|Agency|Department|Authority|Bureau|Commission|Foundation|Institute|Ministry)\b",
    )
    .expect("valid institution pattern")
});

static SUPPORT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][A-Za-z0-9]+)\s+(Support|Service|Team|Help|Desk)\b")
        .expect("valid support name pattern")
});

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["“]([^"”\n]{2,60})["”]"#).expect("valid quoted pattern"));

/// Patterns that make a name look forged; 0.2 each
static SUSPICIOUS_NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Digits standing in for letters ("Amaz0n")
        r"\d",
        // Anything outside plain letters, digits, space and &'-
        r"[^A-Za-z0-9 &'\-]",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid suspicious name pattern"))
    .collect()
});

/// Heuristic [0, 1] estimate that `organization` is being impersonated,
/// given the text around it
pub fn impersonation_risk(organization: &str, context: &str) -> f32 {
    let context = context.to_lowercase();

    let indicators = PRESSURE_INDICATORS
        .iter()
        .filter(|indicator| context.contains(*indicator))
        .count();
    let mut risk = (indicators as f32 * 0.25).min(0.7);

    if AUTHORITY_KEYWORDS.iter().any(|k| context.contains(k)) {
        risk += 0.2;
    }
    if FINANCIAL_KEYWORDS.iter().any(|k| context.contains(k)) {
        risk += 0.15;
    }
    for pattern in SUSPICIOUS_NAME_PATTERNS.iter() {
        if pattern.is_match(organization) {
            risk += 0.2;
        }
    }

    risk.min(1.0)
}

fn is_well_formed(name: &str) -> bool {
    let len = name.chars().count();
    (2..=80).contains(&len)
        && name.chars().any(char::is_alphabetic)
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '&' | '\'' | '-'))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A candidate organization before scoring
struct Candidate {
    name: String,
    kind: OrganizationKind,
    confidence: f32,
    matched_keyword: Option<String>,
    sector: Option<String>,
    span: (usize, usize),
}

/// Extracts organization names
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationExtractor;

impl OrganizationExtractor {
    pub fn new() -> Self {
        Self
    }

    fn brands(&self, text: &str) -> Vec<Candidate> {
        BRAND_PATTERN
            .find_iter(text)
            .filter_map(|mat| {
                let brand = BRAND_LOOKUP.get(&mat.as_str().to_lowercase())?;
                Some(Candidate {
                    name: brand.name.to_string(),
                    kind: OrganizationKind::KnownBrand,
                    confidence: 0.95,
                    matched_keyword: None,
                    sector: Some(brand.sector.to_string()),
                    span: (mat.start(), mat.end()),
                })
            })
            .collect()
    }

    fn keyword_phrases(
        &self,
        text: &str,
        regex: &Regex,
        kind: OrganizationKind,
        confidence: f32,
    ) -> Vec<Candidate> {
        regex
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let name = collapse_whitespace(caps.get(1)?.as_str());
                let keyword = collapse_whitespace(&caps.get(2)?.as_str().replace('.', ""));

                if kind == OrganizationKind::SupportName
                    && GENERIC_SUPPORT_WORDS.contains(&name.to_lowercase().as_str())
                {
                    return None;
                }

                Some(Candidate {
                    name: format!("{name} {keyword}"),
                    kind,
                    confidence,
                    matched_keyword: Some(keyword),
                    sector: None,
                    span: (full.start(), full.end()),
                })
            })
            .collect()
    }

    fn quoted(&self, text: &str) -> Vec<Candidate> {
        QUOTED
            .captures_iter(text)
            .filter_map(|caps| {
                let inner = caps.get(1)?;
                let name = collapse_whitespace(inner.as_str());

                let starts_upper = name.chars().next().map(char::is_uppercase)?;
                let words = name.split(' ').count();
                let capitals = name.chars().filter(|c| c.is_uppercase()).count();
                if !starts_upper || (words < 2 && capitals < 2) {
                    return None;
                }

                Some(Candidate {
                    name,
                    kind: OrganizationKind::Quoted,
                    confidence: 0.7,
                    matched_keyword: None,
                    sector: None,
                    span: (inner.start(), inner.end()),
                })
            })
            .collect()
    }
}

impl EntityExtractor for OrganizationExtractor {
    fn entity_type(&self) -> EntityType {
        EntityType::Organization
    }

    fn extract(&self, text: &str, _language: Option<Language>) -> Vec<Entity> {
        let passes = [
            self.brands(text),
            self.keyword_phrases(text, &LEGAL_SUFFIX, OrganizationKind::LegalEntity, 0.85),
            self.keyword_phrases(text, &INSTITUTION, OrganizationKind::Institution, 0.75),
            self.keyword_phrases(text, &SUPPORT_NAME, OrganizationKind::SupportName, 0.7),
            self.quoted(text),
        ];

        let mut seen: HashSet<String> = HashSet::new();
        let mut entities = Vec::new();

        for candidate in passes.into_iter().flatten() {
            if !seen.insert(candidate.name.to_lowercase()) {
                continue;
            }

            let context = context_window(text, candidate.span.0, candidate.span.1);
            let risk = impersonation_risk(&candidate.name, &context);
            let validated = is_well_formed(&candidate.name);
            let details = OrganizationDetails {
                kind: candidate.kind,
                impersonation_risk: risk,
                potentially_fake: risk > 0.5,
                matched_keyword: candidate.matched_keyword,
                sector: candidate.sector,
            };

            entities.push(
                Entity::new(
                    candidate.name,
                    candidate.confidence,
                    EntityDetails::Organization(details),
                )
                .with_context(context)
                .with_validated(validated),
            );
        }

        debug!(count = entities.len(), "Organization extraction finished");
        entities
    }
}
