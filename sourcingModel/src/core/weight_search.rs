//! Brute-force weight search.
//!
//! Enumerates `(w_cost, w_risk)` on a grid, derives `w_logistics` so the
//! three weights sum to one, and keeps every point where the requested
//! countries win the before and after periods.

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::constants::*;
use crate::core::scoring::{argmin, validate_countries, CountryMetrics, Period, Weights};
use crate::error::{ModelError, ModelResult};
use crate::utils::logging::{self, OperationCategory};

/// Inclusive range of weight values visited in fixed steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightAxis {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl WeightAxis {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    fn validate(&self, name: &'static str) -> ModelResult<()> {
        for value in [self.min, self.max] {
            if !value.is_finite() || !(ZERO_F64..=ONE_F64).contains(&value) {
                return Err(ModelError::InvalidWeight { name, value });
            }
        }
        if !self.step.is_finite() || self.step <= ZERO_F64 {
            return Err(ModelError::InvalidWeight { name, value: self.step });
        }
        if self.max < self.min {
            return Err(ModelError::InvalidWeight { name, value: self.max });
        }
        Ok(())
    }

    /// Number of grid points, before any size limit is applied.
    pub fn point_count(&self) -> f64 {
        ((self.max - self.min) / self.step + WEIGHT_TOLERANCE).floor() + ONE_F64
    }

    /// Grid values, generated by index so repeated steps do not drift.
    pub fn values(&self, name: &'static str) -> ModelResult<Vec<f64>> {
        self.validate(name)?;
        let points = self.point_count();
        if points > MAX_WEIGHT_AXIS_POINTS as f64 {
            return Err(ModelError::GridTooLarge { axis: name, points, limit: MAX_WEIGHT_AXIS_POINTS });
        }
        Ok((0..points as usize).map(|i| self.min + i as f64 * self.step).collect())
    }
}

/// The outcome a weight combination must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub before_winner: String,
    pub after_winner: String,
}

impl Default for TargetOutcome {
    fn default() -> Self {
        Self {
            before_winner: MEXICO.to_string(),
            after_winner: USA.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSearchConfig {
    pub cost_axis: WeightAxis,
    pub risk_axis: WeightAxis,
    pub target: TargetOutcome,
}

impl Default for WeightSearchConfig {
    fn default() -> Self {
        Self {
            cost_axis: WeightAxis::new(WEIGHT_SEARCH_COST_MIN, WEIGHT_SEARCH_COST_MAX, WEIGHT_SEARCH_STEP),
            risk_axis: WeightAxis::new(WEIGHT_SEARCH_RISK_MIN, WEIGHT_SEARCH_RISK_MAX, WEIGHT_SEARCH_STEP),
            target: TargetOutcome::default(),
        }
    }
}

impl WeightSearchConfig {
    /// Covers the whole simplex at the given resolution.
    pub fn full_simplex(step: f64, target: TargetOutcome) -> Self {
        Self {
            cost_axis: WeightAxis::new(ZERO_F64, ONE_F64, step),
            risk_axis: WeightAxis::new(ZERO_F64, ONE_F64, step),
            target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightHit {
    pub weights: Weights,
    pub scores_before: Vec<f64>,
    pub scores_after: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSearchResult {
    pub countries: Vec<String>,
    pub points_evaluated: usize,
    pub hits: Vec<WeightHit>,
}

fn weighted_scores(countries: &[CountryMetrics], weights: &Weights, period: Period) -> Vec<f64> {
    countries.iter().map(|c| weights.composite(c, period)).collect()
}

fn country_index(countries: &[CountryMetrics], name: &str) -> ModelResult<usize> {
    countries
        .iter()
        .position(|c| c.name == name)
        .ok_or_else(|| ModelError::UnknownCountry(name.to_string()))
}

/// Derives the logistics weight for a grid point, or `None` when the point
/// falls outside the simplex. Rounding residues below zero count as outside.
pub fn complete_weights(w_cost: f64, w_risk: f64) -> Option<Weights> {
    let w_log = ONE_F64 - w_cost - w_risk;
    if w_log < ZERO_F64 || w_log > ONE_F64 {
        return None;
    }
    Some(Weights::new(w_cost, w_risk, w_log))
}

/// Checks whether `weights` produce the target winners.
pub fn satisfies_target(countries: &[CountryMetrics], weights: &Weights, target: &TargetOutcome) -> ModelResult<bool> {
    let before_idx = country_index(countries, &target.before_winner)?;
    let after_idx = country_index(countries, &target.after_winner)?;
    let before = weighted_scores(countries, weights, Period::Before);
    let after = weighted_scores(countries, weights, Period::After);
    Ok(argmin(&before) == Some(before_idx) && argmin(&after) == Some(after_idx))
}

pub fn search_weights(countries: &[CountryMetrics], config: &WeightSearchConfig) -> ModelResult<WeightSearchResult> {
    let _timing = logging::start_timing("search_weights", OperationCategory::WeightSearch);

    validate_countries(countries)?;
    let before_idx = country_index(countries, &config.target.before_winner)?;
    let after_idx = country_index(countries, &config.target.after_winner)?;

    let cost_values = config.cost_axis.values("cost")?;
    let risk_values = config.risk_axis.values("risk")?;
    let total_points = cost_values
        .len()
        .checked_mul(risk_values.len())
        .filter(|&points| points <= MAX_WEIGHT_GRID_POINTS)
        .ok_or(ModelError::GridTooLarge {
            axis: "cost x risk",
            points: cost_values.len() as f64 * risk_values.len() as f64,
            limit: MAX_WEIGHT_GRID_POINTS,
        })?;

    info!(
        "Searching {} weight combinations for {} winning {} and {} winning {}",
        total_points,
        config.target.before_winner,
        Period::Before,
        config.target.after_winner,
        Period::After
    );

    let progress = if total_points >= PROGRESS_BAR_MIN_POINTS {
        let bar = ProgressBar::new(total_points as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} weight points")
        {
            bar.set_style(style);
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut hits = Vec::new();
    let mut points_evaluated = 0;

    for &w_cost in &cost_values {
        for &w_risk in &risk_values {
            progress.inc(1);
            let weights = match complete_weights(w_cost, w_risk) {
                Some(weights) => weights,
                None => continue,
            };
            points_evaluated += 1;

            let scores_before = weighted_scores(countries, &weights, Period::Before);
            let scores_after = weighted_scores(countries, &weights, Period::After);

            if argmin(&scores_before) == Some(before_idx) && argmin(&scores_after) == Some(after_idx) {
                debug!(
                    cost = weights.cost,
                    risk = weights.risk,
                    logistics = weights.logistics,
                    "weight combination satisfies target"
                );
                hits.push(WeightHit { weights, scores_before, scores_after });
            }
        }
    }

    progress.finish_and_clear();
    info!("Found {} matching combinations out of {} valid points", hits.len(), points_evaluated);

    Ok(WeightSearchResult {
        countries: countries.iter().map(|c| c.name.clone()).collect(),
        points_evaluated,
        hits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::from_columns;

    fn reference_countries() -> Vec<CountryMetrics> {
        from_columns(
            &DEFAULT_COUNTRIES,
            &DEFAULT_LOGISTICS,
            &DEFAULT_RISK,
            &DEFAULT_COST_BEFORE,
            &DEFAULT_COST_AFTER,
        )
        .unwrap()
    }

    #[test]
    fn axis_values_include_both_ends() {
        let values = WeightAxis::new(0.40, 0.65, 0.05).values("cost").unwrap();
        assert_eq!(values.len(), 6);
        assert!((values[0] - 0.40).abs() < 1e-12);
        assert!((values[5] - 0.65).abs() < 1e-12);

        let risk = WeightAxis::new(0.05, 0.35, 0.05).values("risk").unwrap();
        assert_eq!(risk.len(), 7);
    }

    #[test]
    fn complete_weights_rejects_points_outside_simplex() {
        assert!(complete_weights(0.7, 0.35).is_none());
        let w = complete_weights(0.7, 0.1).unwrap();
        assert!((w.logistics - 0.2).abs() < 1e-12);
        assert_eq!(complete_weights(0.65, 0.35).unwrap().logistics, 0.0);

        // index-generated 0.65 and 0.35 leave a tiny negative residue
        let w_cost = 0.40 + 5.0 * 0.05;
        let w_risk = 0.05 + 6.0 * 0.05;
        assert!(ONE_F64 - w_cost - w_risk < 0.0);
        assert!(complete_weights(w_cost, w_risk).is_none());
    }

    #[test]
    fn default_search_matches_reference_grid() {
        let countries = reference_countries();
        let result = search_weights(&countries, &WeightSearchConfig::default()).unwrap();

        assert_eq!(result.points_evaluated, 41);
        assert_eq!(result.hits.len(), 6);
        for (i, hit) in result.hits.iter().enumerate() {
            assert!((hit.weights.cost - (0.40 + i as f64 * 0.05)).abs() < 1e-9);
            assert!((hit.weights.risk - 0.1).abs() < 1e-9);
        }
        assert!(result.hits.iter().all(|hit| hit.weights.cost < 0.7 - 1e-9));
    }

    #[test]
    fn full_simplex_contains_reference_weights() {
        let countries = reference_countries();
        let config = WeightSearchConfig::full_simplex(0.05, TargetOutcome::default());
        let result = search_weights(&countries, &config).unwrap();

        assert!(result.hits.iter().any(|hit| {
            (hit.weights.cost - 0.7).abs() < 1e-9 && (hit.weights.risk - 0.1).abs() < 1e-9
        }));
    }

    #[test]
    fn every_hit_is_valid_and_revalidates() {
        let countries = reference_countries();
        let config = WeightSearchConfig::full_simplex(0.02, TargetOutcome::default());
        let result = search_weights(&countries, &config).unwrap();

        assert!(!result.hits.is_empty());
        for hit in &result.hits {
            let w = hit.weights;
            assert!((0.0..=1.0).contains(&w.cost));
            assert!((0.0..=1.0).contains(&w.risk));
            assert!(w.cost + w.risk <= 1.0 + 1e-9);
            assert!(w.logistics >= 0.0);
            assert!(satisfies_target(&countries, &w, &config.target).unwrap());
        }
    }

    #[test]
    fn unreachable_target_reports_nothing() {
        let countries = reference_countries();
        // China has the worst logistics and never wins with a zero-risk weight
        let config = WeightSearchConfig {
            cost_axis: WeightAxis::new(0.0, 0.3, 0.1),
            risk_axis: WeightAxis::new(0.0, 0.0, 0.1),
            target: TargetOutcome { before_winner: CHINA.to_string(), after_winner: CHINA.to_string() },
        };
        let result = search_weights(&countries, &config).unwrap();
        assert!(result.hits.is_empty());
        assert_eq!(result.points_evaluated, 4);
    }

    #[test]
    fn unknown_target_country_is_an_error() {
        let countries = reference_countries();
        let config = WeightSearchConfig {
            target: TargetOutcome { before_winner: "Canada".to_string(), after_winner: USA.to_string() },
            ..WeightSearchConfig::default()
        };
        assert!(matches!(
            search_weights(&countries, &config).unwrap_err(),
            ModelError::UnknownCountry(_)
        ));
    }

    #[test]
    fn tiny_steps_are_rejected_before_allocating() {
        let countries = reference_countries();

        let config = WeightSearchConfig::full_simplex(1e-12, TargetOutcome::default());
        assert!(matches!(
            search_weights(&countries, &config).unwrap_err(),
            ModelError::GridTooLarge { axis: "cost", .. }
        ));

        // each axis fits but the combined grid does not
        let config = WeightSearchConfig::full_simplex(1e-4, TargetOutcome::default());
        assert!(matches!(
            search_weights(&countries, &config).unwrap_err(),
            ModelError::GridTooLarge { axis: "cost x risk", .. }
        ));
    }

    #[test]
    fn axis_outside_unit_interval_is_rejected() {
        let countries = reference_countries();
        let config = WeightSearchConfig {
            cost_axis: WeightAxis::new(0.5, 1.5, 0.1),
            ..WeightSearchConfig::default()
        };
        assert!(search_weights(&countries, &config).is_err());
    }
}
