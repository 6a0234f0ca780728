//! Table-level configuration shared by every entity type registered on one
//! database handle.

use crate::{DEFAULT_DISCRIMINATOR_ATTRIBUTE, error::ErrorClass};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid table configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("table name must not be empty")]
    EmptyTableName,

    #[error("discriminator attribute name must not be empty")]
    EmptyDiscriminator,

    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

impl ConfigError {
    pub(crate) const fn class(&self) -> ErrorClass {
        ErrorClass::Configuration
    }
}

///
/// BillingMode
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingMode {
    Provisioned,
    PayPerRequest,
}

///
/// TableConfig
///
/// Physical table settings. `region` and `billing_mode` are carried for the
/// store collaborator; the core only reads `discriminator_attribute` and
/// `page_size`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub table_name: String,

    #[serde(default = "default_discriminator_attribute")]
    pub discriminator_attribute: String,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub billing_mode: Option<BillingMode>,

    /// Default page size forwarded to the store on queries.
    #[serde(default)]
    pub page_size: Option<usize>,
}

fn default_discriminator_attribute() -> String {
    DEFAULT_DISCRIMINATOR_ATTRIBUTE.to_string()
}

impl TableConfig {
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            discriminator_attribute: default_discriminator_attribute(),
            region: None,
            billing_mode: None,
            page_size: None,
        }
    }

    /// Parse and validate a TOML table configuration.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    #[must_use]
    pub fn with_discriminator_attribute(mut self, name: impl Into<String>) -> Self {
        self.discriminator_attribute = name.into();
        self
    }

    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_name.trim().is_empty() {
            return Err(ConfigError::EmptyTableName);
        }
        if self.discriminator_attribute.is_empty() {
            return Err(ConfigError::EmptyDiscriminator);
        }
        if self.page_size == Some(0) {
            return Err(ConfigError::ZeroPageSize);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_config_fills_defaults() {
        let config = TableConfig::from_toml_str(r#"table_name = "forum""#)
            .expect("minimal config should parse");

        assert_eq!(config.table_name, "forum");
        assert_eq!(
            config.discriminator_attribute, DEFAULT_DISCRIMINATOR_ATTRIBUTE,
            "discriminator attribute should default"
        );
        assert_eq!(config.page_size, None);
    }

    #[test]
    fn toml_config_reads_all_fields() {
        let config = TableConfig::from_toml_str(
            r#"
            table_name = "forum"
            discriminator_attribute = "kind"
            region = "eu-west-1"
            billing_mode = "PAY_PER_REQUEST"
            page_size = 25
            "#,
        )
        .expect("full config should parse");

        assert_eq!(config.discriminator_attribute, "kind");
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.billing_mode, Some(BillingMode::PayPerRequest));
        assert_eq!(config.page_size, Some(25));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = TableConfig::from_toml_str(r#"table_name = """#)
            .expect_err("empty table name should fail validation");
        assert!(matches!(err, ConfigError::EmptyTableName));

        let err = TableConfig::from_toml_str(r#"table = "forum""#)
            .expect_err("unknown keys should fail to parse");
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = TableConfig::from_toml_str("table_name = \"forum\"\npage_size = 0")
            .expect_err("zero page size should fail validation");
        assert!(matches!(err, ConfigError::ZeroPageSize));
    }
}
