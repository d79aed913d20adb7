//! Extraction observers
//!
//! The coordinator reports a per-type count summary after every call.
//! Where that summary goes is up to the caller: the tracing log, a
//! Prometheus registry, or nowhere.

use std::collections::BTreeMap;

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;
use tracing::info;

use scamintel_core::{count_by_type, Entity, EntityType, Language};

/// Per-call summary handed to an [`ExtractionObserver`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionSummary {
    pub language: Language,
    pub total: usize,
    pub counts: BTreeMap<EntityType, usize>,
}

impl ExtractionSummary {
    pub fn new(language: Language, entities: &[Entity]) -> Self {
        Self {
            language,
            total: entities.len(),
            counts: count_by_type(entities),
        }
    }
}

/// Receives one summary per coordinated extraction
pub trait ExtractionObserver: Send + Sync {
    fn record(&self, summary: &ExtractionSummary);
}

/// Logs each summary at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ExtractionObserver for TracingObserver {
    fn record(&self, summary: &ExtractionSummary) {
        let counts = summary
            .counts
            .iter()
            .map(|(entity_type, count)| format!("{entity_type}={count}"))
            .collect::<Vec<_>>()
            .join(",");

        info!(
            language = %summary.language,
            total = summary.total,
            counts = %counts,
            "Entity extraction complete"
        );
    }
}

/// Discards summaries
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExtractionObserver for NoopObserver {
    fn record(&self, _summary: &ExtractionSummary) {}
}

/// Counts extractions and entities on a dedicated Prometheus registry
pub struct PrometheusObserver {
    pub registry: Registry,
    /// Entities extracted, by entity type
    pub entities_extracted_total: IntCounterVec,
    /// Coordinated extraction calls
    pub extractions_total: IntCounter,
}

impl PrometheusObserver {
    pub fn new() -> Self {
        let registry = Registry::new();

        let entities_extracted_total = IntCounterVec::new(
            Opts::new(
                "scamintel_entities_extracted_total",
                "Total entities extracted",
            ),
            &["entity_type"],
        )
        .expect("metric creation should not fail");

        let extractions_total = IntCounter::with_opts(Opts::new(
            "scamintel_extractions_total",
            "Total extraction calls",
        ))
        .expect("metric creation should not fail");

        registry
            .register(Box::new(entities_extracted_total.clone()))
            .expect("registration should not fail");
        registry
            .register(Box::new(extractions_total.clone()))
            .expect("registration should not fail");

        Self {
            registry,
            entities_extracted_total,
            extractions_total,
        }
    }

    /// Encode the registry in the Prometheus text exposition format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for PrometheusObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PrometheusObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusObserver")
            .field("extractions_total", &self.extractions_total.get())
            .finish_non_exhaustive()
    }
}

impl ExtractionObserver for PrometheusObserver {
    fn record(&self, summary: &ExtractionSummary) {
        self.extractions_total.inc();
        for (entity_type, count) in &summary.counts {
            self.entities_extracted_total
                .with_label_values(&[entity_type.as_str()])
                .inc_by(*count as u64);
        }
    }
}
