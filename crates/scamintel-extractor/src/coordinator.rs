//! Extraction coordinator
//!
//! Detects the language once, then runs every per-type extractor in a
//! fixed order: phone, payment, URL, organization, bank account, email.
//! Outputs are concatenated as-is; the same text may legitimately surface
//! as entities of different types.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::observer::{ExtractionObserver, ExtractionSummary, TracingObserver};
use crate::{
    BankAccountExtractor, EmailExtractor, EntityExtractor, LanguageDetector,
    OrganizationExtractor, PaymentIdExtractor, PhoneNumberExtractor, UrlExtractor,
};
use scamintel_core::{
    Entity, EntityType, ExtractionConfig, ExtractionReport, Language, LanguageDetection,
};

/// Runs the full extraction pipeline over one input at a time
pub struct ExtractionCoordinator {
    config: ExtractionConfig,
    detector: LanguageDetector,
    extractors: Vec<Box<dyn EntityExtractor>>,
    observer: Arc<dyn ExtractionObserver>,
    types: Option<Vec<EntityType>>,
    language: Option<Language>,
}

impl ExtractionCoordinator {
    pub fn new() -> Self {
        Self::with_config(ExtractionConfig::default())
    }

    pub fn with_config(config: ExtractionConfig) -> Self {
        let extractors: Vec<Box<dyn EntityExtractor>> = vec![
            Box::new(PhoneNumberExtractor::new()),
            Box::new(PaymentIdExtractor::new()),
            Box::new(UrlExtractor::new()),
            Box::new(OrganizationExtractor::new()),
            Box::new(BankAccountExtractor::new()),
            Box::new(EmailExtractor::new()),
        ];

        Self {
            config,
            detector: LanguageDetector::new(),
            extractors,
            observer: Arc::new(TracingObserver),
            types: None,
            language: None,
        }
    }

    /// Replace the default tracing observer
    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Only run extractors for `types`; the fixed order is kept
    pub fn with_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.types = Some(types.into_iter().collect());
        self
    }

    /// Skip detection and treat every input as `language`
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Extract every enabled entity type from `text`
    pub fn extract_all(&self, text: &str) -> Vec<Entity> {
        self.run(text).1
    }

    /// Like [`extract_all`](Self::extract_all), bundled with the detected
    /// language and per-type counts
    pub fn extract_report(&self, text: &str) -> ExtractionReport {
        let (language, entities) = self.run(text);
        ExtractionReport::new(language, entities)
    }

    fn run(&self, text: &str) -> (LanguageDetection, Vec<Entity>) {
        let text = self.bounded(text);
        let detection = match self.language {
            Some(language) => LanguageDetection::new(language, 1.0),
            None => self.detector.detect(text),
        };
        let language = detection.language;

        let mut entities = Vec::new();
        for extractor in &self.extractors {
            if !self.is_enabled(extractor.entity_type()) {
                continue;
            }
            entities.extend(extractor.extract(text, Some(language)));
        }

        debug!(
            language = %language,
            total = entities.len(),
            "Coordinated extraction finished"
        );

        if self.config.record_metrics {
            self.observer
                .record(&ExtractionSummary::new(language, &entities));
        }

        (detection, entities)
    }

    fn is_enabled(&self, entity_type: EntityType) -> bool {
        self.types
            .as_ref()
            .map(|types| types.contains(&entity_type))
            .unwrap_or(true)
    }

    /// Truncate at a char boundary once the input exceeds the configured bound
    fn bounded<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.config.max_input_chars) {
            Some((cut, _)) => {
                warn!(
                    max_chars = self.config.max_input_chars,
                    input_bytes = text.len(),
                    "Input exceeds extraction limit, truncating"
                );
                &text[..cut]
            }
            None => text,
        }
    }
}

impl Default for ExtractionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::PrometheusObserver;

    #[test]
    fn test_fixed_type_order() {
        let text = "Contact john@example.com, call +1 555 123 4567, \
                    visit https://paypa1.example/login or pay user@paytm";
        let entities = ExtractionCoordinator::new().extract_all(text);
        let types: Vec<EntityType> = entities.iter().map(|e| e.entity_type()).collect();

        let mut sorted = types.clone();
        sorted.sort();
        assert_eq!(types, sorted);
        assert!(types.contains(&EntityType::PhoneNumber));
        assert!(types.contains(&EntityType::PaymentId));
        assert!(types.contains(&EntityType::Url));
        assert!(types.contains(&EntityType::Email));
    }

    #[test]
    fn test_type_filter() {
        let text = "email john@example.com or call 555-123-4567";
        let entities = ExtractionCoordinator::new()
            .with_types([EntityType::Email])
            .extract_all(text);

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].value, "john@example.com");
    }

    #[test]
    fn test_report_language_and_counts() {
        let report = ExtractionCoordinator::new()
            .extract_report("please send the money to your account at https://pay.example/x");

        assert_eq!(report.language.language, Language::En);
        assert_eq!(report.counts.get(&EntityType::Url), Some(&1));
    }

    #[test]
    fn test_input_truncation() {
        let config = ExtractionConfig {
            max_input_chars: 20,
            record_metrics: false,
        };
        let text = format!("{} john@example.com", "x".repeat(30));
        let entities = ExtractionCoordinator::with_config(config).extract_all(&text);

        assert!(entities.is_empty());
    }

    #[test]
    fn test_observer_receives_summary() {
        let observer = Arc::new(PrometheusObserver::new());
        let coordinator = ExtractionCoordinator::new().with_observer(observer.clone());

        coordinator.extract_all("mail a@example.com and b@example.com");

        assert_eq!(observer.extractions_total.get(), 1);
        assert_eq!(
            observer
                .entities_extracted_total
                .with_label_values(&["email"])
                .get(),
            2
        );
    }

    #[test]
    fn test_metrics_disabled() {
        let observer = Arc::new(PrometheusObserver::new());
        let config = ExtractionConfig {
            record_metrics: false,
            ..ExtractionConfig::default()
        };
        ExtractionCoordinator::with_config(config)
            .with_observer(observer.clone())
            .extract_all("a@example.com");

        assert_eq!(observer.extractions_total.get(), 0);
    }

    #[test]
    fn test_language_override() {
        let coordinator = ExtractionCoordinator::new().with_language(Language::Hi);
        let report = coordinator.extract_report("call 5551234567");

        assert_eq!(report.language.language, Language::Hi);
        assert_eq!(report.entities[0].value, "+915551234567");
    }

    #[test]
    fn test_empty_input() {
        let report = ExtractionCoordinator::new().extract_report("");
        assert!(report.entities.is_empty());
        assert_eq!(report.language, LanguageDetection::unknown());
    }
}
