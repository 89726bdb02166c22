//! Two-stage status normalization.
//!
//! Stage A runs once per record at adaptation time: single-character
//! workflow codes are expanded, absent values become [`STATUS_UNKNOWN`],
//! and everything else passes through untouched. Stage B runs at
//! aggregation time and re-buckets free-text labels into the canonical set
//! via ordered substring rules, so the chart groups "Aprovar" and
//! "Aprovado" together while each item keeps its original label.

use std::borrow::Cow;

use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical label for absent or empty status values.
pub const STATUS_UNKNOWN: &str = "Desconhecido";

/// Stage A: expands exact single-character workflow codes.
///
/// Unmapped non-empty values pass through unchanged; absent or empty values
/// become [`STATUS_UNKNOWN`]. Never fails.
pub fn normalize_status_code(raw: &Value) -> String {
    let text = match raw {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => return STATUS_UNKNOWN.to_string(),
    };
    let expanded = match text.as_str() {
        "R" => "Rejeitado",
        "C" => "Cancelado",
        "A" => "Em Andamento",
        "P" => "Aprovado",
        _ => return text,
    };
    expanded.to_string()
}

/// Stage B: re-buckets a status label into the canonical set.
///
/// Matching is case-insensitive and diacritic-insensitive ("em Análise"
/// lands on the `analise` rule). Rules are evaluated top to bottom; the
/// first match wins; unmatched labels pass through unchanged.
pub fn canonical_status_label(original: &str) -> Cow<'_, str> {
    let folded = fold(original);
    let label = if folded.contains("aprov")
        || folded.contains("conclu")
        || folded == "ativa"
        || folded == "ok"
    {
        "Aprovado"
    } else if folded.contains("andamento")
        || folded.contains("analise")
        || folded.contains("aberto")
    {
        "Em Andamento"
    } else if folded.contains("pendente") || folded.contains("aguardando") {
        "Pendente"
    } else if folded.contains("rejeit") {
        "Rejeitado"
    } else if folded.contains("cancel") || folded.contains("baixada") || folded.contains("inapta") {
        "Cancelado"
    } else {
        return Cow::Borrowed(original);
    };
    Cow::Borrowed(label)
}

/// Lowercases and strips combining marks so rule needles stay plain ASCII.
fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
