//! Workspace umbrella crate for the Fluxboard dashboard core.
//!
//! The pipeline turns a raw backend payload into chart-ready analytics in
//! three stages: envelope resolution and record adaptation
//! (`fxb_adapter`, using the field mappings in `fxb_fields` and the
//! lenient normalizers in `fxb_normalize`), KPI aggregation
//! (`fxb_metrics`), and assistant-context composition (`fxb_context`).
//! [`Dashboard`] stitches the stages together behind a single entry point;
//! everything is recomputed from scratch per payload, with no state kept
//! between calls.

pub mod config;

pub use fxb_adapter::{
    adapt, ApiResponse, CanonicalItem, DictionaryEntry, RawBatch, RuleSet, DEFAULT_CATEGORY,
    DICTIONARY_KEY, PROCESS_KEY,
};
pub use fxb_context::{
    build_summary, dictionary_context, persona_for, system_instruction, DataSummary,
    HeadlineMetrics, Persona, SampleTransaction, SAMPLE_LIMIT,
};
pub use fxb_fields::{FieldMapping, ModuleConfig, ModuleId, ModuleRegistry};
#[cfg(feature = "fetch")]
pub use fxb_fetch::{fetch_process_data, request_plan, FetchError, RequestBody, RequestPlan};
pub use fxb_metrics::{
    aggregate, palette_color, CategorySlice, KpiMetrics, StatusSlice, TimelinePoint, PALETTE,
};
pub use fxb_normalize::{
    canonical_status_label, normalize_amount, normalize_date, normalize_status_code,
    parse_amount_text, parse_date_text, FormatOrder, Parsed, NA_TEXT, STATUS_UNKNOWN,
};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors the pipeline front can produce. Field-level problems never reach
/// here; the normalizers absorb them with deterministic defaults.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no field mapping registered for module '{0}'")]
    UnknownModule(String),
}

/// Everything a render pass or assistant session needs for one module.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub module: ModuleId,
    /// Human-readable module label, from the module configuration.
    pub title: String,
    /// The glossary, untouched, for the assistant context.
    pub dictionary: Vec<DictionaryEntry>,
    pub items: Vec<CanonicalItem>,
    pub metrics: KpiMetrics,
}

/// Configured pipeline front: module registry plus inclusion rules.
#[derive(Debug, Clone)]
pub struct Dashboard {
    registry: ModuleRegistry,
    rules: RuleSet,
}

impl Dashboard {
    pub fn new(registry: ModuleRegistry, rules: RuleSet) -> Self {
        Self { registry, rules }
    }

    /// Dashboard with the four production modules and their rules.
    pub fn builtin() -> Self {
        Self::new(ModuleRegistry::builtin(), RuleSet::builtin())
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    /// Runs the pipeline over an already-resolved backend response.
    pub fn adapt_response(
        &self,
        response: ApiResponse,
        module: &ModuleId,
    ) -> Result<DashboardData, PipelineError> {
        let config = self
            .registry
            .get(module)
            .ok_or_else(|| PipelineError::UnknownModule(module.to_string()))?;

        let items = adapt(response.process_data, config, module, &self.rules);
        let metrics = aggregate(&items);
        tracing::debug!(
            module = %module,
            items = items.len(),
            total_value = metrics.total_value,
            "dashboard_adapted"
        );

        Ok(DashboardData {
            module: module.clone(),
            title: config.title.clone(),
            dictionary: response.dictionary,
            items,
            metrics,
        })
    }

    /// Runs the pipeline over a raw backend value, resolving the envelope
    /// first.
    pub fn adapt_value(
        &self,
        payload: Value,
        module: &ModuleId,
    ) -> Result<DashboardData, PipelineError> {
        self.adapt_response(ApiResponse::from_value(payload), module)
    }

    /// Renders the assistant system instruction for an adapted batch.
    pub fn assistant_context(&self, data: &DashboardData) -> String {
        let summary = build_summary(&data.items, &data.metrics, &data.title);
        system_instruction(&data.module, &data.title, &data.dictionary, &summary)
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::builtin()
    }
}
