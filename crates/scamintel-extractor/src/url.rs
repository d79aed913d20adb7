//! URL extraction
//!
//! Three passes, most specific first: explicit protocol, `www.` prefix,
//! then bare domains carrying a path, query or fragment. A match that
//! overlaps a span accepted by an earlier match is dropped, so the same
//! link is never captured twice at different specificity levels.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::context::context_window;
use crate::EntityExtractor;
use scamintel_core::{Entity, EntityDetails, EntityType, Language, UrlDetails};

static WITH_PROTOCOL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhttps?://[^\s<>"'()\[\]{}]+"#).expect("valid protocol URL pattern")
});

static WWW_PREFIXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bwww\.[a-z0-9-]+(?:\.[a-z0-9-]+)+(?:[/?#][^\s<>"'()\[\]{}]*)?"#)
        .expect("valid www URL pattern")
});

static BARE_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,}[/?#][^\s<>"'()\[\]{}]*"#,
    )
    .expect("valid bare domain pattern")
});

static DOMAIN_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9.-]+$").expect("valid domain charset pattern"));

/// Sentence punctuation that trails a link in prose
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Which pass produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlForm {
    Protocol,
    Www,
    Bare,
}

impl UrlForm {
    fn confidence(self) -> f32 {
        match self {
            Self::Protocol => 0.95,
            Self::Www => 0.85,
            Self::Bare => 0.75,
        }
    }
}

/// Add `https://` when missing and drop one trailing slash off a non-root path
pub fn normalize_url(raw: &str) -> String {
    let mut url = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    if url.ends_with('/') {
        let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
        let is_root = url[after_scheme..].find('/') == Some(url.len() - after_scheme - 1);
        if !is_root {
            url.pop();
        }
    }

    url
}

/// Lower-cased host of `url` without protocol, userinfo, port, path or `www.`
pub fn extract_domain(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let host = rest.split(|c: char| matches!(c, '/' | '?' | '#')).next().unwrap_or_default();
    let host = host.rsplit_once('@').map(|(_, h)| h).unwrap_or(host);
    let host = host.split(':').next().unwrap_or_default().to_lowercase();

    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Structural check: protocol, dotted domain, domain charset, TLD length
pub fn is_valid_url(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }

    let domain = extract_domain(url);
    if !domain.contains('.') || !DOMAIN_CHARSET.is_match(&domain) {
        return false;
    }
    if domain.split('.').any(|label| label.is_empty()) {
        return false;
    }

    domain.rsplit('.').next().map(|tld| tld.len() >= 2).unwrap_or(false)
}

/// Extracts URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlExtractor;

impl UrlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl EntityExtractor for UrlExtractor {
    fn entity_type(&self) -> EntityType {
        EntityType::Url
    }

    fn extract(&self, text: &str, _language: Option<Language>) -> Vec<Entity> {
        let passes: [(&Regex, UrlForm); 3] = [
            (&WITH_PROTOCOL, UrlForm::Protocol),
            (&WWW_PREFIXED, UrlForm::Www),
            (&BARE_DOMAIN, UrlForm::Bare),
        ];

        let mut accepted: Vec<(usize, usize)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut entities = Vec::new();

        for (regex, form) in passes {
            for mat in regex.find_iter(text) {
                let raw = mat.as_str().trim_end_matches(TRAILING_PUNCTUATION);
                if raw.is_empty() {
                    continue;
                }
                let (start, end) = (mat.start(), mat.start() + raw.len());

                let overlaps = accepted.iter().any(|&(s, e)| start < e && s < end);
                if overlaps {
                    continue;
                }
                accepted.push((start, end));

                let value = normalize_url(raw);
                if !seen.insert(value.clone()) {
                    continue;
                }

                let protocol = value
                    .split_once("://")
                    .map(|(scheme, _)| scheme.to_lowercase())
                    .unwrap_or_else(|| "https".to_string());
                let details = UrlDetails {
                    domain: extract_domain(&value),
                    protocol,
                    explicit_protocol: form == UrlForm::Protocol,
                };
                let validated = is_valid_url(&value);

                entities.push(
                    Entity::new(value, form.confidence(), EntityDetails::Url(details))
                        .with_context(context_window(text, start, end))
                        .with_validated(validated),
                );
            }
        }

        debug!(count = entities.len(), "URL extraction finished");
        entities
    }
}
