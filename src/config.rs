//! YAML configuration file support for Fluxboard.
//!
//! Deployments describe their modules (labels, field mappings, currency
//! flags) and the upstream endpoint in a single YAML file loaded at
//! startup. Modules defined here extend or override the built-in four.
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//! name: "production"
//!
//! fetch:
//!   base_url: "https://bpm.example.com/api/v1/getdados"
//!
//! modules:
//!   reimbursement:
//!     title: "Solic. Reembolso"
//!     description: "Despesas e reembolsos corporativos."
//!     currency: true
//!     fields:
//!       date: DT_INICIO
//!       value: VALOR_TOTAL_DESPESA
//!       status: IDE_FINALIZADO
//!       requester: COLABORADOR
//!       category: LT_CENTRO_CUSTO
//!       description: CX_MOTIVO_REEMBOLSO
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fxb_fields::{FieldMapping, ModuleConfig, ModuleId, ModuleRegistry};

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the dashboard pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluxboardConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Upstream endpoint configuration.
    #[serde(default)]
    pub fetch: FetchYamlConfig,

    /// Module blocks keyed by module id. Missing blocks fall back to the
    /// built-in registry.
    #[serde(default)]
    pub modules: HashMap<String, ModuleYamlConfig>,
}

impl FluxboardConfig {
    /// Loads a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parses YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: FluxboardConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }
        for (id, module) in &self.modules {
            module.validate(id)?;
        }
        Ok(())
    }

    /// Builds the module registry: the built-in four, overridden or
    /// extended by the configured blocks.
    pub fn build_registry(&self) -> ModuleRegistry {
        let mut registry = ModuleRegistry::builtin();
        for (id, module) in &self.modules {
            registry.register(ModuleId::from(id.clone()), module.to_module_config());
        }
        registry
    }
}

impl Default for FluxboardConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            fetch: FetchYamlConfig::default(),
            modules: HashMap::new(),
        }
    }
}

/// Upstream endpoint block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchYamlConfig {
    /// Base URL of the process-data endpoint. Absent in library-only
    /// deployments that feed payloads in directly.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// One module block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleYamlConfig {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "true_value")]
    pub currency: bool,

    pub fields: FieldsYamlConfig,
}

impl ModuleYamlConfig {
    fn validate(&self, id: &str) -> Result<(), ConfigLoadError> {
        if self.title.trim().is_empty() {
            return Err(ConfigLoadError::Validation(format!(
                "modules.{id}.title must not be empty"
            )));
        }
        self.fields.validate(id)
    }

    fn to_module_config(&self) -> ModuleConfig {
        ModuleConfig {
            title: self.title.clone(),
            description: self.description.clone(),
            field_mapping: FieldMapping {
                date: self.fields.date.clone(),
                value: self.fields.value.clone(),
                status: self.fields.status.clone(),
                requester: self.fields.requester.clone(),
                category: self.fields.category.clone(),
                description: self.fields.description.clone(),
            },
            currency: self.currency,
        }
    }
}

/// Raw field names for the six semantic roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldsYamlConfig {
    pub date: String,
    pub value: String,
    pub status: String,
    pub requester: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl FieldsYamlConfig {
    fn validate(&self, id: &str) -> Result<(), ConfigLoadError> {
        let roles = [
            ("date", &self.date),
            ("value", &self.value),
            ("status", &self.status),
            ("requester", &self.requester),
            ("category", &self.category),
        ];
        for (role, name) in roles {
            if name.trim().is_empty() {
                return Err(ConfigLoadError::Validation(format!(
                    "modules.{id}.fields.{role} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

fn true_value() -> bool {
    true
}
