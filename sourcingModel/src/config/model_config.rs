use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::constants::*;
use crate::core::cost_model::{CostBreakdown, RampScenario};
use crate::core::risk::RiskInputs;
use crate::core::scoring::{from_columns, validate_countries, CountryMetrics, Weights};
use crate::core::weight_search::WeightSearchConfig;
use crate::error::ModelResult;
use crate::utils::logging::{self, FileIOType, OperationCategory};

/// All model inputs. `Default` carries the reference sourcing data, and a
/// JSON file may override any subset of the sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub countries: Vec<CountryMetrics>,
    pub weights: Weights,
    pub threshold_months: u32,
    pub risk: RiskInputs,
    pub weight_search: WeightSearchConfig,
    pub cost_breakdown: CostBreakdown,
    pub ramp_scenario: RampScenario,
    pub step_scenario: RampScenario,
}

impl Default for ModelConfig {
    fn default() -> Self {
        // The reference columns are equal length, so this cannot fail
        let countries = from_columns(
            &DEFAULT_COUNTRIES,
            &DEFAULT_LOGISTICS,
            &DEFAULT_RISK,
            &DEFAULT_COST_BEFORE,
            &DEFAULT_COST_AFTER,
        )
        .unwrap_or_default();

        Self {
            countries,
            weights: Weights::default(),
            threshold_months: DEFAULT_THRESHOLD_MONTHS,
            risk: RiskInputs::default(),
            weight_search: WeightSearchConfig::default(),
            cost_breakdown: CostBreakdown::default(),
            ramp_scenario: RampScenario::smooth_ramp(),
            step_scenario: RampScenario::sudden_step(),
        }
    }
}

impl ModelConfig {
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        let config: ModelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let _timing = logging::start_timing("load_config",
            OperationCategory::FileIO { subcategory: FileIOType::ConfigLoad });

        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        info!("Loaded model configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ModelResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Checks the sections that are not validated again where they are used.
    pub fn validate(&self) -> ModelResult<()> {
        validate_countries(&self.countries)?;
        self.weights.validate()?;
        self.risk.validate()?;
        self.cost_breakdown.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    #[test]
    fn default_config_is_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.countries.len(), 3);
        assert_eq!(config.countries[1].name, USA);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ModelConfig::from_json_str(
            r#"{ "weights": { "cost": 0.5, "risk": 0.25, "logistics": 0.25 } }"#,
        )
        .unwrap();
        assert_eq!(config.weights, Weights::new(0.5, 0.25, 0.25));
        assert_eq!(config.countries, ModelConfig::default().countries);
        assert_eq!(config.threshold_months, DEFAULT_THRESHOLD_MONTHS);
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let config = ModelConfig::default();
        config.save(&path).unwrap();
        assert_eq!(ModelConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn invalid_json_values_are_rejected() {
        let err = ModelConfig::from_json_str(
            r#"{ "weights": { "cost": -1.0, "risk": 0.5, "logistics": 0.5 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidWeight { name: "cost", .. }));

        let err = ModelConfig::from_json_str(r#"{ "countries": [] }"#).unwrap_err();
        assert!(matches!(err, ModelError::EmptyInput(_)));

        assert!(matches!(
            ModelConfig::from_json_str("{ not json").unwrap_err(),
            ModelError::JsonError(_)
        ));
    }
}
