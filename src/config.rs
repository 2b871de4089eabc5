//! Well-known PBL column names, overridable from a JSON file.
use crate::aggregate::CO2_INDICATOR;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Neighborhood code columns, tried in order.
    pub code_fields: Vec<String>,
    pub name_field: String,
    pub indicator_field: String,
    pub indicator_label_field: String,
    pub baseline_column: String,
    pub co2_indicator: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            code_fields: vec![
                "I01_buurtcode".to_string(),
                "buurtcode".to_string(),
                "statcode".to_string(),
            ],
            name_field: "I02_buurtnaam".to_string(),
            indicator_field: "Code_Indicator".to_string(),
            indicator_label_field: "Indicator_Label".to_string(),
            baseline_column: "Referentie_2023".to_string(),
            co2_indicator: CO2_INDICATOR.to_string(),
        }
    }
}

impl IngestConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Columns that describe a strategy row rather than a scenario.
    pub fn is_structural(&self, column: &str) -> bool {
        column.is_empty()
            || column == self.indicator_field
            || column == self.indicator_label_field
            || column == self.name_field
            || self.code_fields.iter().any(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = IngestConfig::from_json_str(r#"{"baseline_column": "Referentie_2030"}"#).unwrap();
        assert_eq!(cfg.baseline_column, "Referentie_2030");
        assert_eq!(cfg.indicator_field, "Code_Indicator");
        assert_eq!(cfg.code_fields[0], "I01_buurtcode");
        assert_eq!(cfg.co2_indicator, CO2_INDICATOR);
    }

    #[test]
    fn structural_columns() {
        let cfg = IngestConfig::default();
        assert!(cfg.is_structural("I01_buurtcode"));
        assert!(cfg.is_structural("Indicator_Label"));
        assert!(cfg.is_structural(""));
        assert!(!cfg.is_structural("Strategie_1"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(IngestConfig::from_json_str("{not json").is_err());
    }
}
