//! Email address extraction

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::context::context_window;
use crate::EntityExtractor;
use scamintel_core::{EmailDetails, Entity, EntityDetails, EntityType, Language};

/// The address is group 1; the leading class stands in for a lookbehind so
/// that a local part starting with `.` is captured whole
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9._%+-])([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})\b")
        .expect("valid email pattern")
});

/// Structural check on a lower-cased address
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..");

    let domain_ok = domain.contains('.')
        && !domain.contains("..")
        && !domain.starts_with(['.', '-'])
        && !domain.ends_with(['.', '-']);

    local_ok && domain_ok
}

/// Extracts email addresses, lower-cased
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailExtractor;

impl EmailExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl EntityExtractor for EmailExtractor {
    fn entity_type(&self) -> EntityType {
        EntityType::Email
    }

    fn extract(&self, text: &str, _language: Option<Language>) -> Vec<Entity> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entities = Vec::new();

        for mat in EMAIL.captures_iter(text).filter_map(|caps| caps.get(1)) {
            let value = mat.as_str().to_lowercase();
            if !seen.insert(value.clone()) {
                continue;
            }

            let valid = is_valid_email(&value);
            let domain = value
                .rsplit_once('@')
                .map(|(_, d)| d.to_string())
                .unwrap_or_default();
            let confidence = if valid { 0.95 } else { 0.7 };

            entities.push(
                Entity::new(value, confidence, EntityDetails::Email(EmailDetails { domain }))
                    .with_context(context_window(text, mat.start(), mat.end()))
                    .with_validated(valid),
            );
        }

        debug!(count = entities.len(), "Email extraction finished");
        entities
    }
}
