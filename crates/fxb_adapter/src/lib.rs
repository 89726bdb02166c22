//! Record adaptation for the Fluxboard pipeline.
//! Takes a raw process payload, applies the module's field mapping and the
//! lenient normalizers, and produces the canonical item sequence the
//! aggregator and the renderer consume.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, Level};

use fxb_fields::{FieldMapping, ModuleConfig, ModuleId};
use fxb_normalize::{normalize_amount, normalize_date, normalize_status_code, NA_TEXT};

mod payload;
mod rules;

pub use payload::{ApiResponse, DictionaryEntry, RawBatch, DICTIONARY_KEY, PROCESS_KEY};
pub use rules::{InclusionRule, RuleSet};

/// Default category label when the mapped field is absent.
pub const DEFAULT_CATEGORY: &str = "Geral";

/// The normalized unit of analysis. Every item is traceable to exactly one
/// raw record, retained verbatim in `raw` for audit display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalItem {
    /// Raw payload key, or the array index for list payloads.
    pub id: String,
    /// `dd/mm/yyyy`, `"N/A"` when absent, or the original unparsed text.
    pub date: String,
    /// Numeric amount; 0 when absent or unparseable.
    pub value: f64,
    /// Stage-A normalized status label.
    pub status: String,
    pub requester: String,
    pub category: String,
    pub description: String,
    pub raw: Value,
}

/// Adapts a raw process payload into canonical items.
///
/// The payload may be keyed (key = id) or a list (index = id); source order
/// is preserved. Each record is normalized independently, then the module's
/// inclusion rule decides whether it stays. Pure aside from tracing.
pub fn adapt(
    payload: Value,
    config: &ModuleConfig,
    module: &ModuleId,
    rules: &RuleSet,
) -> Vec<CanonicalItem> {
    let span = tracing::span!(Level::INFO, "fxb_adapter.adapt", module = %module);
    let _guard = span.enter();

    let batch = RawBatch::from_value(payload);
    let total = batch.len();

    let mut items = Vec::with_capacity(total);
    for (id, record) in batch.into_entries() {
        let item = adapt_record(id, record, &config.field_mapping);
        if rules.admits(module, &item) {
            items.push(item);
        }
    }

    info!(
        total,
        kept = items.len(),
        dropped = total - items.len(),
        "records_adapted"
    );
    items
}

/// Normalizes one raw record. No validation happens here; the inclusion
/// rules run on the already-normalized item.
fn adapt_record(id: String, record: Value, mapping: &FieldMapping) -> CanonicalItem {
    let date = normalize_date(field(&record, &mapping.date));
    let value = normalize_amount(field(&record, &mapping.value));
    let status = normalize_status_code(field(&record, &mapping.status));
    let requester = text_or(field(&record, &mapping.requester), NA_TEXT);
    let category = text_or(field(&record, &mapping.category), DEFAULT_CATEGORY);
    let description = match mapping.description.as_deref() {
        Some(name) => text_or(field(&record, name), ""),
        None => String::new(),
    };

    CanonicalItem {
        id,
        date,
        value,
        status,
        requester,
        category,
        description,
        raw: record,
    }
}

fn field<'a>(record: &'a Value, name: &str) -> &'a Value {
    record.get(name).unwrap_or(&Value::Null)
}

/// Coerces a field to text; absent, null, or empty values take `fallback`.
fn text_or(raw: &Value, fallback: &str) -> String {
    match raw {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => fallback.to_string(),
    }
}
