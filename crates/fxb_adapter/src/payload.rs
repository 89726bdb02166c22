//! Payload envelope resolution.
//!
//! The backend answers with `{DICTIONARY_DATA, PROCESS_DATA}`; older
//! deployments return the process payload bare. The shape ambiguity is
//! resolved exactly once here, into [`ApiResponse`] and [`RawBatch`], so
//! the rest of the pipeline never branches on JSON shape again.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope key holding the field-name glossary.
pub const DICTIONARY_KEY: &str = "DICTIONARY_DATA";
/// Envelope key holding the raw process records.
pub const PROCESS_KEY: &str = "PROCESS_DATA";

/// One glossary entry documenting a raw field. All fields are lenient:
/// whatever the backend omits defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    #[serde(rename = "DESC_TABELA", default)]
    pub table: String,
    #[serde(rename = "TIPO_CAMPO", default)]
    pub field_type: String,
    #[serde(rename = "CAMPO_TABELA", default)]
    pub field: String,
    #[serde(rename = "CAMPO_LABEL", default)]
    pub label: String,
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "CRIADO_EM", default)]
    pub created_at: String,
    #[serde(rename = "DESCRICAO_IA", default)]
    pub description: String,
    #[serde(rename = "TAMANHO_CAMPO", default)]
    pub length: String,
}

/// Resolved backend response: glossary plus the untouched process payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    #[serde(rename = "DICTIONARY_DATA")]
    pub dictionary: Vec<DictionaryEntry>,
    #[serde(rename = "PROCESS_DATA")]
    pub process_data: Value,
}

impl ApiResponse {
    /// Resolves an arbitrary backend value into the envelope.
    ///
    /// Only an object carrying both envelope keys is treated as the new
    /// format; anything else is the process payload itself with an empty
    /// dictionary.
    pub fn from_value(value: Value) -> Self {
        if let Value::Object(mut map) = value {
            if map.contains_key(DICTIONARY_KEY) && map.contains_key(PROCESS_KEY) {
                let dictionary = map
                    .remove(DICTIONARY_KEY)
                    .map(parse_dictionary)
                    .unwrap_or_default();
                let process_data = map.remove(PROCESS_KEY).unwrap_or(Value::Null);
                return Self {
                    dictionary,
                    process_data,
                };
            }
            return Self {
                dictionary: Vec::new(),
                process_data: Value::Object(map),
            };
        }
        Self {
            dictionary: Vec::new(),
            process_data: value,
        }
    }

    /// Empty-but-valid response, used when a module has no upstream query.
    pub fn empty() -> Self {
        Self {
            dictionary: Vec::new(),
            process_data: Value::Object(Map::new()),
        }
    }
}

/// Entries that do not deserialize are skipped rather than failing the
/// whole glossary.
fn parse_dictionary(value: Value) -> Vec<DictionaryEntry> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// A raw process payload with its object-or-array ambiguity resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBatch {
    /// Keyed mapping: the key is the process id.
    Keyed(Map<String, Value>),
    /// Plain list: the index becomes the id.
    Listed(Vec<Value>),
}

impl RawBatch {
    /// Resolves any JSON value. Scalars and null become an empty batch.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => RawBatch::Keyed(map),
            Value::Array(list) => RawBatch::Listed(list),
            _ => RawBatch::Keyed(Map::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RawBatch::Keyed(map) => map.len(),
            RawBatch::Listed(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the batch into `(id, record)` pairs in source order.
    pub fn into_entries(self) -> Vec<(String, Value)> {
        match self {
            RawBatch::Keyed(map) => map.into_iter().collect(),
            RawBatch::Listed(list) => list
                .into_iter()
                .enumerate()
                .map(|(index, record)| (index.to_string(), record))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_with_both_keys_resolves() {
        let response = ApiResponse::from_value(json!({
            "DICTIONARY_DATA": [
                {"CAMPO_TABELA": "VALOR_PEDIDO", "CAMPO_LABEL": "Montante da Nota",
                 "DESCRICAO_IA": "Valor total da nota fiscal."}
            ],
            "PROCESS_DATA": {"1": {"VALOR_PEDIDO": 10}}
        }));

        assert_eq!(response.dictionary.len(), 1);
        assert_eq!(response.dictionary[0].field, "VALOR_PEDIDO");
        assert_eq!(response.dictionary[0].label, "Montante da Nota");
        assert_eq!(response.process_data["1"]["VALOR_PEDIDO"], json!(10));
    }

    #[test]
    fn bare_payload_becomes_process_data() {
        let response = ApiResponse::from_value(json!({"1": {"X": 1}, "2": {"X": 2}}));
        assert!(response.dictionary.is_empty());
        assert_eq!(response.process_data["2"]["X"], json!(2));
    }

    #[test]
    fn object_with_only_one_envelope_key_is_bare_payload() {
        let response = ApiResponse::from_value(json!({"PROCESS_DATA": {"1": {}}}));
        assert!(response.dictionary.is_empty());
        assert!(response.process_data.get("PROCESS_DATA").is_some());
    }

    #[test]
    fn array_payload_is_process_data() {
        let response = ApiResponse::from_value(json!([{"X": 1}]));
        assert!(response.dictionary.is_empty());
        assert!(response.process_data.is_array());
    }

    #[test]
    fn malformed_dictionary_entries_are_skipped() {
        let response = ApiResponse::from_value(json!({
            "DICTIONARY_DATA": [{"CAMPO_TABELA": "OK"}, "not-an-entry", 42],
            "PROCESS_DATA": {}
        }));
        assert_eq!(response.dictionary.len(), 1);
        assert_eq!(response.dictionary[0].field, "OK");
    }

    #[test]
    fn batch_preserves_keyed_order() {
        let batch = RawBatch::from_value(json!({"b": 1, "a": 2, "c": 3}));
        let ids: Vec<String> = batch.into_entries().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn batch_indexes_lists() {
        let batch = RawBatch::from_value(json!(["x", "y"]));
        assert_eq!(batch.len(), 2);
        let entries = batch.into_entries();
        assert_eq!(entries[0], ("0".to_string(), json!("x")));
        assert_eq!(entries[1], ("1".to_string(), json!("y")));
    }

    #[test]
    fn scalar_payloads_resolve_empty() {
        assert!(RawBatch::from_value(json!(null)).is_empty());
        assert!(RawBatch::from_value(json!("text")).is_empty());
        assert!(RawBatch::from_value(json!(5)).is_empty());
    }
}
