//! Module registry and field mappings for the Fluxboard pipeline.
//!
//! Raw process records arrive with per-module field names (`DT_INICIO`,
//! `VALOR_TOTAL_DESPESA`, ...). This crate binds the six semantic roles the
//! adapter understands (date, value, status, requester, category, and an
//! optional description) to those raw names, per module, at configuration
//! time. Nothing here is derived from data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Identifier for a dashboard module.
///
/// The four built-in modules carry their own adaptation rules and field
/// mappings; anything else is carried verbatim as [`ModuleId::Other`] and
/// falls back to the default inclusion rule. Parsing never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleId {
    Reimbursement,
    Trip,
    VendorRegistration,
    Invoice,
    Other(String),
}

impl ModuleId {
    pub fn as_str(&self) -> &str {
        match self {
            ModuleId::Reimbursement => "reimbursement",
            ModuleId::Trip => "trip",
            ModuleId::VendorRegistration => "vendor-registration",
            ModuleId::Invoice => "invoice",
            ModuleId::Other(id) => id.as_str(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ModuleId {
    fn from(value: String) -> Self {
        match value.as_str() {
            "reimbursement" => ModuleId::Reimbursement,
            "trip" => ModuleId::Trip,
            "vendor-registration" => ModuleId::VendorRegistration,
            "invoice" => ModuleId::Invoice,
            _ => ModuleId::Other(value),
        }
    }
}

impl From<ModuleId> for String {
    fn from(value: ModuleId) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for ModuleId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ModuleId::from(s.to_string()))
    }
}

/// Binds the semantic roles to raw field names for one module. Immutable
/// configuration data; the adapter never guesses field names from payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub date: String,
    pub value: String,
    pub status: String,
    pub requester: String,
    pub category: String,
    /// Modules without a free-text description leave this unset; the
    /// canonical item then carries an empty description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Presentation and adaptation configuration for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Human-readable module label, also handed to the assistant context.
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub field_mapping: FieldMapping,
    /// Whether the module's value field is monetary.
    #[serde(default = "default_currency")]
    pub currency: bool,
}

fn default_currency() -> bool {
    true
}

/// Configuration-time lookup from module id to its [`ModuleConfig`].
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<ModuleId, ModuleConfig>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the four production modules and their
    /// upstream field names.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            ModuleId::Reimbursement,
            ModuleConfig {
                title: "Solic. Reembolso".into(),
                description:
                    "Visão geral das solicitações de despesas e reembolsos corporativos.".into(),
                field_mapping: FieldMapping {
                    date: "DT_INICIO".into(),
                    value: "VALOR_TOTAL_DESPESA".into(),
                    status: "IDE_FINALIZADO".into(),
                    requester: "COLABORADOR".into(),
                    category: "LT_CENTRO_CUSTO".into(),
                    description: Some("CX_MOTIVO_REEMBOLSO".into()),
                },
                currency: true,
            },
        );
        registry.register(
            ModuleId::Trip,
            ModuleConfig {
                title: "Solic. Viagens".into(),
                description:
                    "Gestão de deslocamentos, hospedagens e custos de viagens corporativas.".into(),
                field_mapping: FieldMapping {
                    date: "DT_INICIO_VIAGEM".into(),
                    value: "TOTAL_DESPESA".into(),
                    status: "IDE_FINALIZADO".into(),
                    requester: "NOME".into(),
                    category: "CENTRO_CUSTO".into(),
                    description: Some("MOTIVO_VIAGEM".into()),
                },
                currency: true,
            },
        );
        registry.register(
            ModuleId::VendorRegistration,
            ModuleConfig {
                title: "Cadastro Cliente/Fornecedor".into(),
                description: "Monitoramento de novos cadastros e status de homologação.".into(),
                field_mapping: FieldMapping {
                    date: "AUX_DATA".into(),
                    value: "CAPITAL_SOCIAL".into(),
                    status: "IDE_FINALIZADO".into(),
                    requester: "RAZAO_SOCIAL".into(),
                    category: "TIPO_CADASTRO".into(),
                    description: Some("CIDADE".into()),
                },
                currency: true,
            },
        );
        registry.register(
            ModuleId::Invoice,
            ModuleConfig {
                title: "Recebimento de NF".into(),
                description: "Controle de notas fiscais de serviço e pedidos de compra.".into(),
                field_mapping: FieldMapping {
                    date: "DT_INICIO".into(),
                    value: "VALOR_PEDIDO".into(),
                    status: "IDE_FINALIZADO".into(),
                    requester: "FORN_NOME".into(),
                    category: "TIPO_SERVICO".into(),
                    description: Some("OBS".into()),
                },
                currency: true,
            },
        );
        registry
    }

    /// Registers or replaces a module configuration.
    pub fn register(&mut self, module: ModuleId, config: ModuleConfig) {
        self.modules.insert(module, config);
    }

    pub fn get(&self, module: &ModuleId) -> Option<&ModuleConfig> {
        self.modules.get(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &ModuleConfig)> {
        self.modules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_id_round_trips_through_strings() {
        let cases = [
            ("reimbursement", ModuleId::Reimbursement),
            ("trip", ModuleId::Trip),
            ("vendor-registration", ModuleId::VendorRegistration),
            ("invoice", ModuleId::Invoice),
        ];
        for (text, id) in cases {
            let parsed: ModuleId = text.parse().expect("module ids always parse");
            assert_eq!(parsed, id);
            assert_eq!(parsed.as_str(), text);
        }
    }

    #[test]
    fn unknown_module_id_is_preserved() {
        let parsed: ModuleId = "purchasing".parse().expect("module ids always parse");
        assert_eq!(parsed, ModuleId::Other("purchasing".into()));
        assert_eq!(parsed.as_str(), "purchasing");
    }

    #[test]
    fn module_id_serde_uses_kebab_strings() {
        let json = serde_json::to_string(&ModuleId::VendorRegistration).unwrap();
        assert_eq!(json, "\"vendor-registration\"");
        let back: ModuleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ModuleId::VendorRegistration);
    }

    #[test]
    fn builtin_registry_has_the_four_modules() {
        let registry = ModuleRegistry::builtin();
        assert_eq!(registry.len(), 4);

        let reimbursement = registry
            .get(&ModuleId::Reimbursement)
            .expect("reimbursement is built in");
        assert_eq!(reimbursement.field_mapping.date, "DT_INICIO");
        assert_eq!(reimbursement.field_mapping.value, "VALOR_TOTAL_DESPESA");
        assert_eq!(
            reimbursement.field_mapping.description.as_deref(),
            Some("CX_MOTIVO_REEMBOLSO")
        );
        assert!(reimbursement.currency);

        let invoice = registry.get(&ModuleId::Invoice).expect("invoice is built in");
        assert_eq!(invoice.field_mapping.value, "VALOR_PEDIDO");
    }

    #[test]
    fn register_overrides_existing_mapping() {
        let mut registry = ModuleRegistry::builtin();
        let mut custom = registry
            .get(&ModuleId::Trip)
            .expect("trip is built in")
            .clone();
        custom.field_mapping.date = "DT_PARTIDA".into();
        registry.register(ModuleId::Trip, custom);

        assert_eq!(
            registry
                .get(&ModuleId::Trip)
                .expect("trip still registered")
                .field_mapping
                .date,
            "DT_PARTIDA"
        );
        assert_eq!(registry.len(), 4);
    }
}
