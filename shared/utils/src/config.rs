use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use validator::{Validate, ValidationError};

use cadbom_models::QUANTITY_FIELD;

use crate::error::BomResult;
use crate::validation::validate_model;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    #[validate]
    pub aggregation: AggregationConfig,
    #[validate]
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AggregationConfig {
    /// Fields whose values partition objects into BOM rows
    #[validate(length(min = 1), custom = "validate_field_names")]
    pub key_fields: Vec<String>,
    /// Fields collapsed into one display value per row
    #[validate(custom = "validate_field_names")]
    pub extra_fields: Vec<String>,
    /// Candidate tiers per logical field, replacing or extending the built-in table
    pub candidates: BTreeMap<String, Vec<Vec<String>>>,
}

/// `quantity` names the row count and cannot be a grouping or extra field
fn validate_field_names(fields: &[String]) -> Result<(), ValidationError> {
    if fields.iter().any(|field| field == QUANTITY_FIELD) {
        return Err(ValidationError::new("reserved_field_name"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ExportConfig {
    /// Worksheet title; spreadsheet applications cap it at 31 characters
    #[validate(length(min = 1, max = 31))]
    pub sheet_name: String,
    #[validate(length(min = 1))]
    pub name_header: String,
    #[validate(length(min = 1))]
    pub quantity_header: String,
    #[validate(length(min = 1))]
    pub properties_header: String,
    /// Blank columns left for manual entry
    pub extra_headers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    /// Layered load: optional files under `config/`, then `CADBOM__*` variables
    pub fn load() -> BomResult<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Start with default values
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("CADBOM").separator("__"));

        let loaded: Self = config.build()?.try_deserialize()?;
        validate_model(&loaded)?;
        Ok(loaded)
    }

    /// Load an explicit configuration file, still honouring `CADBOM__*` overrides
    pub fn load_from(path: &Path) -> BomResult<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("CADBOM").separator("__"));

        let loaded: Self = config.build()?.try_deserialize()?;
        validate_model(&loaded)?;
        Ok(loaded)
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            key_fields: vec!["name".to_string(), "type".to_string()],
            extra_fields: Vec::new(),
            candidates: BTreeMap::new(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Itens".to_string(),
            name_header: "Nome".to_string(),
            quantity_header: "Quantidade".to_string(),
            properties_header: "Propriedades".to_string(),
            extra_headers: vec!["Observações".to_string(), "Preço Unitário".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}
