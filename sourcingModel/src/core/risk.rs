//! Logistic risk normalization.
//!
//! Raw risk metrics are z-scored against their column and pushed through a
//! sigmoid, giving a relative 0-100 score. Lower raw values map to lower
//! scores, so every column is treated as lower-is-better.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::constants::*;
use crate::core::scoring::{rank, CountryScore};
use crate::error::{ModelError, ModelResult};
use crate::utils::logging::{self, OperationCategory, ScoringType};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return ZERO_F64;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (one delta degree of freedom).
///
/// Fewer than two values have no spread and return zero.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return ZERO_F64;
    }
    let mu = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - mu).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Maps raw values onto 0-100 with `100 / (1 + exp(-(x - center) / temperature))`.
///
/// `center` defaults to the column mean and `temperature` to the sample
/// standard deviation. A zero temperature is replaced by a tiny epsilon, so a
/// constant column scores 50 everywhere.
pub fn logistic_scores(values: &[f64], center: Option<f64>, temperature: Option<f64>) -> Vec<f64> {
    let _timing = logging::start_timing("logistic_scores",
        OperationCategory::Scoring { subcategory: ScoringType::Normalization });

    let mu = center.unwrap_or_else(|| mean(values));
    let mut s = temperature.unwrap_or_else(|| sample_std_dev(values));
    if s == ZERO_F64 {
        s = ZERO_STDDEV_EPSILON;
    }

    values
        .iter()
        .map(|x| {
            let z = (x - mu) / s;
            LOGISTIC_SCALE / (ONE_F64 + (-z).exp())
        })
        .collect()
}

/// Inputs to the composite risk score: product damage rate and currency
/// volatility against USD, both in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    pub countries: Vec<String>,
    pub damage_pct: Vec<f64>,
    pub fx_vol_pct: Vec<f64>,
    pub w_damage: f64,
    pub w_fx: f64,
}

impl Default for RiskInputs {
    fn default() -> Self {
        Self {
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            damage_pct: DEFAULT_DAMAGE_PCT.to_vec(),
            fx_vol_pct: DEFAULT_FX_VOL_PCT.to_vec(),
            w_damage: DEFAULT_DAMAGE_WEIGHT,
            w_fx: DEFAULT_FX_WEIGHT,
        }
    }
}

impl RiskInputs {
    pub fn validate(&self) -> ModelResult<()> {
        let expected = self.countries.len();
        if expected == 0 {
            return Err(ModelError::EmptyInput("risk countries"));
        }
        for (field, column) in [("damage_pct", &self.damage_pct), ("fx_vol_pct", &self.fx_vol_pct)] {
            if column.len() != expected {
                return Err(ModelError::LengthMismatch { field, expected, found: column.len() });
            }
            if let Some(&value) = column.iter().find(|v| !v.is_finite()) {
                return Err(ModelError::NonFiniteValue { field: field.to_string(), value });
            }
        }
        for (name, value) in [("damage", self.w_damage), ("fx", self.w_fx)] {
            if !value.is_finite() || value < ZERO_F64 {
                return Err(ModelError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRow {
    pub name: String,
    pub damage_pct: f64,
    pub damage_score: f64,
    pub fx_vol_pct: f64,
    pub fx_score: f64,
    pub final_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub rows: Vec<RiskRow>,
}

impl RiskAssessment {
    pub fn scores(&self) -> Vec<CountryScore> {
        self.rows
            .iter()
            .map(|row| CountryScore { name: row.name.clone(), score: row.final_score })
            .collect()
    }

    /// Countries from lowest (best) to highest final risk.
    pub fn ranking(&self) -> Vec<String> {
        rank(&self.scores())
    }

    pub fn row(&self, name: &str) -> Option<&RiskRow> {
        self.rows.iter().find(|row| row.name == name)
    }
}

/// Weighted sum of the normalized damage and FX columns.
///
/// `temperature_factor` scales each column's own sample deviation; values
/// above one flatten the sigmoid, values below one push scores toward 0/100.
pub fn composite_risk(inputs: &RiskInputs, temperature_factor: Option<f64>) -> ModelResult<RiskAssessment> {
    inputs.validate()?;

    let temperature = |column: &[f64]| temperature_factor.map(|f| sample_std_dev(column) * f);
    let damage_scores = logistic_scores(&inputs.damage_pct, None, temperature(&inputs.damage_pct));
    let fx_scores = logistic_scores(&inputs.fx_vol_pct, None, temperature(&inputs.fx_vol_pct));

    let rows: Vec<RiskRow> = inputs
        .countries
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let final_score = inputs.w_damage * damage_scores[i] + inputs.w_fx * fx_scores[i];
            debug!(country = %name, damage = damage_scores[i], fx = fx_scores[i], final_score, "risk score");
            RiskRow {
                name: name.clone(),
                damage_pct: inputs.damage_pct[i],
                damage_score: damage_scores[i],
                fx_vol_pct: inputs.fx_vol_pct[i],
                fx_score: fx_scores[i],
                final_score,
            }
        })
        .collect();

    Ok(RiskAssessment { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_column_scores_fifty() {
        for column in [vec![3.0, 3.0, 3.0], vec![0.0; 5], vec![-2.5]] {
            let scores = logistic_scores(&column, None, None);
            assert!(scores.iter().all(|s| (s - 50.0).abs() < 1e-12), "{:?}", scores);
        }
    }

    #[test]
    fn empty_column_gives_no_scores() {
        assert!(logistic_scores(&[], None, None).is_empty());
    }

    #[test]
    fn scores_are_monotonic_and_bounded() {
        let column = [7.6609, 1.4970, 0.4561, 3.2, -1.0];
        let scores = logistic_scores(&column, None, None);
        for i in 0..column.len() {
            assert!(scores[i] > 0.0 && scores[i] < 100.0);
            for j in 0..column.len() {
                if column[i] < column[j] {
                    assert!(scores[i] < scores[j]);
                }
            }
        }
    }

    #[test]
    fn value_at_center_scores_fifty() {
        let scores = logistic_scores(&[1.0, 2.0, 3.0], None, None);
        assert!((scores[1] - 50.0).abs() < 1e-12);
        // one deviation above the mean
        assert!((scores[2] - 100.0 / (1.0 + (-1.0f64).exp())).abs() < 1e-9);
    }

    #[test]
    fn explicit_center_and_temperature_are_used() {
        let scores = logistic_scores(&[10.0, 12.0], Some(10.0), Some(2.0));
        assert!((scores[0] - 50.0).abs() < 1e-12);
        assert!((scores[1] - 100.0 / (1.0 + (-1.0f64).exp())).abs() < 1e-9);
    }

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        assert!((sample_std_dev(&[1.0, 2.0, 3.0, 4.0]) - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std_dev(&[4.0]), 0.0);
    }

    #[test]
    fn reference_risk_scores() {
        let assessment = composite_risk(&RiskInputs::default(), None).unwrap();
        assert_eq!(assessment.ranking(), vec![USA, MEXICO, CHINA]);

        let expected = [(CHINA, 69.672), (USA, 37.216), (MEXICO, 41.393)];
        for (name, want) in expected {
            let row = assessment.row(name).unwrap();
            assert!((row.final_score - want).abs() < 0.01, "{}: {}", name, row.final_score);
        }
    }

    #[test]
    fn larger_temperature_flattens_scores() {
        let inputs = RiskInputs::default();
        let sharp = composite_risk(&inputs, None).unwrap();
        let flat = composite_risk(&inputs, Some(3.0)).unwrap();
        for (s, f) in sharp.rows.iter().zip(flat.rows.iter()) {
            assert!((f.damage_score - 50.0).abs() <= (s.damage_score - 50.0).abs());
        }
    }

    #[test]
    fn mismatched_risk_columns_are_rejected() {
        let inputs = RiskInputs { fx_vol_pct: vec![1.0], ..RiskInputs::default() };
        assert!(matches!(
            composite_risk(&inputs, None).unwrap_err(),
            ModelError::LengthMismatch { field: "fx_vol_pct", .. }
        ));
    }
}
