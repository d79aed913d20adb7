//! Payment identifier extraction
//!
//! Global rails (UPI, Bitcoin, Ethereum, PayPal) are matched in every
//! conversation. Regional rails whose identifiers are too ambiguous to
//! match everywhere (bare digit strings, short handles) only run when the
//! conversation language matches their home locale:
//! - zh: Alipay, WeChat Pay
//! - pt: PIX
//! - fr, de, es, it: SEPA RF creditor references

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::checksum::mod97_valid;
use crate::context::context_window;
use crate::{EntityExtractor, LanguageDetector};
use scamintel_core::{Entity, EntityDetails, EntityType, Language, PaymentDetails, PaymentSystem};

/// Provider handles accepted after the `@` of a UPI id (substring match)
const UPI_PROVIDERS: &[&str] = &[
    "paytm", "ybl", "okaxis", "okhdfcbank", "okicici", "oksbi", "upi", "apl", "ibl", "axl",
    "sbi", "icici", "hdfcbank", "axisbank", "kotak", "phonepe", "gpay", "amazonpay", "airtel",
    "jio", "freecharge", "mobikwik", "yesbank", "idfcbank", "pnb", "barodampay", "unionbank",
    "indus", "federal",
];

static UPI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9][A-Za-z0-9._-]{0,255}@([A-Za-z][A-Za-z0-9]{1,63})\b")
        .expect("valid UPI pattern")
});

static BITCOIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:bc1[a-z0-9]{39,59}|[13][a-km-zA-HJ-NP-Z1-9]{25,34})\b")
        .expect("valid Bitcoin pattern")
});

static ETHEREUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b0x[a-fA-F0-9]{40}\b").expect("valid Ethereum pattern"));

static PAYPAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z0-9]{17}\b").expect("valid PayPal pattern"));

static ALIPAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:支付宝|alipay)(?:\s*(?:账号|账户|account|id))?\s*[:：]?\s*([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}|1\d{10})",
    )
    .expect("valid Alipay pattern")
});

static WECHAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:微信支付|微信号|微信|wechat\s*pay|wechat\s*id|wechat|weixin)\s*[:：]?\s*([A-Za-z][A-Za-z0-9_-]{5,19})",
    )
    .expect("valid WeChat pattern")
});

static PIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:chave\s+pix|pix)\b\s*[:：]?\s*([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}|[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}|\d{14}|\d{11})",
    )
    .expect("valid PIX pattern")
});

static SEPA_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bRF\d{2}[A-Z0-9]{1,21}\b").expect("valid RF pattern"));

/// Accumulates one call's payment ids; first value wins
struct Collector<'a> {
    text: &'a str,
    seen: HashSet<String>,
    entities: Vec<Entity>,
}

impl<'a> Collector<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            seen: HashSet::new(),
            entities: Vec::new(),
        }
    }

    fn push(
        &mut self,
        value: String,
        confidence: f32,
        details: PaymentDetails,
        span: (usize, usize),
        validated: bool,
    ) {
        if !self.seen.insert(value.clone()) {
            return;
        }
        self.entities.push(
            Entity::new(value, confidence, EntityDetails::PaymentId(details))
                .with_context(context_window(self.text, span.0, span.1))
                .with_validated(validated),
        );
    }
}

/// Whether the character right after byte offset `end` continues the token
fn continues_with(text: &str, end: usize, pred: impl Fn(char) -> bool) -> bool {
    text[end..].chars().next().map(pred).unwrap_or(false)
}

/// Bitcoin address kind and whether its length fits that kind
fn bitcoin_shape(address: &str) -> (&'static str, bool) {
    let len = address.len();
    if address.starts_with("bc1") {
        ("BECH32", len == 42 || len == 62)
    } else if address.starts_with('3') {
        ("P2SH", len == 34)
    } else {
        ("P2PKH", (26..=34).contains(&len))
    }
}

/// Extracts payment identifiers
#[derive(Debug, Clone, Default)]
pub struct PaymentIdExtractor {
    detector: LanguageDetector,
}

impl PaymentIdExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    fn extract_upi(&self, out: &mut Collector) {
        for caps in UPI.captures_iter(out.text) {
            let (Some(full), Some(provider)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // `name@bank.com` is an email address, not a UPI handle
            if out.text[full.end()..].starts_with('.')
                && continues_with(out.text, full.end() + 1, |c| c.is_ascii_alphanumeric())
            {
                continue;
            }

            let provider = provider.as_str().to_lowercase();
            if !UPI_PROVIDERS.iter().any(|p| provider.contains(p)) {
                continue;
            }

            let details = PaymentDetails::new(PaymentSystem::Upi).with_provider(provider);
            out.push(
                full.as_str().to_lowercase(),
                0.85,
                details,
                (full.start(), full.end()),
                true,
            );
        }
    }

    fn extract_crypto(&self, out: &mut Collector) {
        for mat in BITCOIN.find_iter(out.text) {
            let address = mat.as_str();
            // Long digit-only runs are order numbers, not addresses
            if address.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let (key_type, validated) = bitcoin_shape(address);
            let details = PaymentDetails::new(PaymentSystem::Bitcoin).with_key_type(key_type);
            out.push(
                address.to_string(),
                0.8,
                details,
                (mat.start(), mat.end()),
                validated,
            );
        }

        for mat in ETHEREUM.find_iter(out.text) {
            let details = PaymentDetails::new(PaymentSystem::Ethereum).with_key_type("ADDRESS");
            out.push(
                mat.as_str().to_string(),
                0.8,
                details,
                (mat.start(), mat.end()),
                mat.as_str().len() == 42,
            );
        }
    }

    fn extract_paypal(&self, out: &mut Collector) {
        for mat in PAYPAL.find_iter(out.text) {
            let context = context_window(out.text, mat.start(), mat.end()).to_lowercase();
            if !context.contains("paypal") && !context.contains("transaction") {
                continue;
            }

            let id = mat.as_str();
            let validated = id.chars().any(|c| c.is_ascii_digit())
                && id.chars().any(|c| c.is_ascii_uppercase());
            let details = PaymentDetails::new(PaymentSystem::PayPal).with_key_type("TRANSACTION_ID");
            out.push(id.to_string(), 0.7, details, (mat.start(), mat.end()), validated);
        }
    }

    fn extract_chinese(&self, out: &mut Collector) {
        for caps in ALIPAY.captures_iter(out.text) {
            let Some((key, span)) = keyed_capture(&caps) else {
                continue;
            };
            let key_type = if key.contains('@') { "EMAIL" } else { "PHONE" };
            if key_type == "PHONE" && continues_with(out.text, span.1, |c| c.is_ascii_digit()) {
                continue;
            }
            let details = PaymentDetails::new(PaymentSystem::Alipay).with_key_type(key_type);
            out.push(key.to_lowercase(), 0.85, details, span, true);
        }

        for caps in WECHAT.captures_iter(out.text) {
            let Some((handle, span)) = keyed_capture(&caps) else {
                continue;
            };
            // Handles are capped at 20 characters
            if continues_with(out.text, span.1, |c| {
                c.is_ascii_alphanumeric() || c == '_' || c == '-'
            }) {
                continue;
            }
            let details = PaymentDetails::new(PaymentSystem::WeChatPay).with_key_type("HANDLE");
            out.push(handle.to_string(), 0.85, details, span, true);
        }
    }

    fn extract_pix(&self, out: &mut Collector) {
        for caps in PIX.captures_iter(out.text) {
            let Some((key, span)) = keyed_capture(&caps) else {
                continue;
            };
            let key_type = if key.contains('@') {
                "EMAIL"
            } else if key.contains('-') {
                "RANDOM_KEY"
            } else if key.len() == 14 {
                "CNPJ"
            } else {
                "CPF_OR_PHONE"
            };
            let numeric = key_type == "CNPJ" || key_type == "CPF_OR_PHONE";
            if numeric && continues_with(out.text, span.1, |c| c.is_ascii_digit()) {
                continue;
            }
            let details = PaymentDetails::new(PaymentSystem::Pix).with_key_type(key_type);
            out.push(key.to_lowercase(), 0.85, details, span, true);
        }
    }

    fn extract_sepa(&self, out: &mut Collector) {
        for mat in SEPA_REFERENCE.find_iter(out.text) {
            let reference = mat.as_str().to_uppercase();
            let validated = (5..=25).contains(&reference.len());
            let details = PaymentDetails::new(PaymentSystem::Sepa)
                .with_key_type("RF_REFERENCE")
                .with_checksum(mod97_valid(&reference));
            out.push(reference, 0.8, details, (mat.start(), mat.end()), validated);
        }
    }
}

/// The identifier captured after a keyword, with its byte span
fn keyed_capture<'t>(caps: &Captures<'t>) -> Option<(&'t str, (usize, usize))> {
    caps.get(1).map(|m| (m.as_str(), (m.start(), m.end())))
}

impl EntityExtractor for PaymentIdExtractor {
    fn entity_type(&self) -> EntityType {
        EntityType::PaymentId
    }

    fn extract(&self, text: &str, language: Option<Language>) -> Vec<Entity> {
        let language = language.unwrap_or_else(|| self.detector.detect(text).language);
        let mut out = Collector::new(text);

        self.extract_upi(&mut out);
        self.extract_crypto(&mut out);
        self.extract_paypal(&mut out);

        match language {
            Language::Zh => self.extract_chinese(&mut out),
            Language::Pt => self.extract_pix(&mut out),
            Language::Fr | Language::De | Language::Es | Language::It => {
                self.extract_sepa(&mut out)
            }
            _ => {}
        }

        debug!(count = out.entities.len(), %language, "Payment id extraction finished");
        out.entities
    }
}
