// Yield-ramp cost model - per-good-unit cost while production yield improves
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::constants::*;
use crate::error::{ModelError, ModelResult};
use crate::utils::logging::{self, OperationCategory};

/// Per-unit cost line items for each country, before yield losses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub line_items: Vec<String>,
    pub countries: Vec<CountryCosts>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryCosts {
    pub name: String,
    pub items: Vec<f64>,
}

impl CountryCosts {
    pub fn total(&self) -> f64 {
        self.items.iter().sum()
    }
}

impl Default for CostBreakdown {
    fn default() -> Self {
        let country = |name: &str, items: [f64; 7]| CountryCosts {
            name: name.to_string(),
            items: items.to_vec(),
        };
        Self {
            line_items: COST_LINE_ITEMS.iter().map(|s| s.to_string()).collect(),
            countries: vec![
                country("US", US_COST_ITEMS),
                country(MEXICO, MEXICO_COST_ITEMS),
                country(CHINA, CHINA_COST_ITEMS),
            ],
        }
    }
}

impl CostBreakdown {
    pub fn validate(&self) -> ModelResult<()> {
        if self.countries.is_empty() {
            return Err(ModelError::EmptyInput("cost breakdown countries"));
        }
        let expected = self.line_items.len();
        for country in &self.countries {
            if country.items.len() != expected {
                return Err(ModelError::LengthMismatch {
                    field: "cost line items",
                    expected,
                    found: country.items.len(),
                });
            }
            if let Some(&value) = country.items.iter().find(|v| !v.is_finite()) {
                return Err(ModelError::NonFiniteValue { field: country.name.clone(), value });
            }
        }
        Ok(())
    }

    pub fn total(&self, name: &str) -> ModelResult<f64> {
        self.countries
            .iter()
            .find(|c| c.name == name)
            .map(CountryCosts::total)
            .ok_or_else(|| ModelError::UnknownCountry(name.to_string()))
    }

    pub fn totals(&self) -> Vec<(String, f64)> {
        self.countries.iter().map(|c| (c.name.clone(), c.total())).collect()
    }
}

/// Share of good units produced at time `t` (months).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YieldCurve {
    /// Quadratic ease-out from `y0` reaching 1.0 at `t_end`.
    EaseOut { y0: f64, t_end: f64 },
    /// Exponential approach toward 1.0 that reaches `target` at `t_target`.
    Exponential { y0: f64, target: f64, t_target: f64 },
    /// Constant `y0`, jumping to 1.0 at `threshold`.
    Step { y0: f64, threshold: f64 },
}

impl YieldCurve {
    pub fn validate(&self) -> ModelResult<()> {
        let check_initial = |y0: f64| {
            if !y0.is_finite() || y0 <= ZERO_F64 || y0 > ONE_F64 {
                Err(ModelError::InvalidYield(format!("initial yield {} must be in (0, 1]", y0)))
            } else {
                Ok(())
            }
        };
        match *self {
            YieldCurve::EaseOut { y0, t_end } => {
                check_initial(y0)?;
                if !t_end.is_finite() || t_end <= ZERO_F64 {
                    return Err(ModelError::InvalidYield(format!("ramp end {} must be positive", t_end)));
                }
            }
            YieldCurve::Exponential { y0, target, t_target } => {
                check_initial(y0)?;
                if !target.is_finite() || target <= y0 || target >= ONE_F64 {
                    return Err(ModelError::InvalidYield(format!(
                        "target yield {} must lie between {} and 1",
                        target, y0
                    )));
                }
                if !t_target.is_finite() || t_target <= ZERO_F64 {
                    return Err(ModelError::InvalidYield(format!("target time {} must be positive", t_target)));
                }
            }
            YieldCurve::Step { y0, threshold } => {
                check_initial(y0)?;
                if !threshold.is_finite() {
                    return Err(ModelError::InvalidYield(format!("threshold {} must be finite", threshold)));
                }
            }
        }
        Ok(())
    }

    pub fn yield_at(&self, t: f64) -> f64 {
        match *self {
            YieldCurve::EaseOut { y0, t_end } => ease_to_one(t, t_end, y0),
            YieldCurve::Exponential { y0, target, t_target } => {
                let k = -((ONE_F64 - target) / (ONE_F64 - y0)).ln() / t_target;
                ONE_F64 - (ONE_F64 - y0) * (-k * t).exp()
            }
            YieldCurve::Step { y0, threshold } => {
                if t < threshold { y0 } else { ONE_F64 }
            }
        }
    }
}

pub fn ease_to_one(t: f64, t_end: f64, y0: f64) -> f64 {
    let x = (t / t_end).clamp(ZERO_F64, ONE_F64);
    y0 + (ONE_F64 - y0) * (ONE_F64 - (ONE_F64 - x).powi(2))
}

/// `points` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points).map(|i| start + i as f64 * step).collect()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthAxis {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl MonthAxis {
    pub fn values(&self) -> Vec<f64> {
        linspace(self.start, self.end, self.points)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveAssignment {
    pub country: String,
    pub curve: YieldCurve,
}

impl CurveAssignment {
    fn new(country: &str, curve: YieldCurve) -> Self {
        Self { country: country.to_string(), curve }
    }
}

/// A set of yield curves evaluated over one month axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampScenario {
    pub title: String,
    pub months: MonthAxis,
    pub curves: Vec<CurveAssignment>,
}

impl RampScenario {
    pub fn smooth_ramp() -> Self {
        Self {
            title: "Per-Lamp Cost During 6-Month Production Ramp".to_string(),
            months: MonthAxis { start: ZERO_F64, end: RAMP_MONTHS, points: RAMP_POINTS },
            curves: vec![
                CurveAssignment::new("US", YieldCurve::EaseOut { y0: US_INITIAL_YIELD, t_end: RAMP_MONTHS }),
                CurveAssignment::new(MEXICO, YieldCurve::EaseOut { y0: MEXICO_INITIAL_YIELD, t_end: RAMP_MONTHS }),
                CurveAssignment::new(CHINA, YieldCurve::Exponential {
                    y0: CHINA_INITIAL_YIELD,
                    target: CHINA_TARGET_YIELD,
                    t_target: RAMP_MONTHS,
                }),
            ],
        }
    }

    pub fn sudden_step() -> Self {
        let step = |y0| YieldCurve::Step { y0, threshold: RAMP_MONTHS };
        Self {
            title: "Per-lamp cost: piecewise constant with sudden drop at month 6".to_string(),
            months: MonthAxis { start: ZERO_F64, end: STEP_END_MONTHS, points: STEP_POINTS },
            curves: vec![
                CurveAssignment::new("US", step(US_INITIAL_YIELD)),
                CurveAssignment::new(MEXICO, step(MEXICO_INITIAL_YIELD)),
                CurveAssignment::new(CHINA, step(CHINA_INITIAL_YIELD)),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSeries {
    pub name: String,
    pub baseline: f64,
    pub yields: Vec<f64>,
    pub prices: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostProjection {
    pub title: String,
    pub months: Vec<f64>,
    pub series: Vec<CostSeries>,
}

impl CostProjection {
    pub fn price_range(&self) -> (f64, f64) {
        self.series
            .iter()
            .flat_map(|s| s.prices.iter().copied())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p), hi.max(p)))
    }
}

/// Price per good unit (`baseline / yield`) for every curve in the scenario.
pub fn project_costs(breakdown: &CostBreakdown, scenario: &RampScenario) -> ModelResult<CostProjection> {
    let _timing = logging::start_timing("project_costs", OperationCategory::CostModel);

    breakdown.validate()?;
    if scenario.curves.is_empty() {
        return Err(ModelError::EmptyInput("yield curves"));
    }

    let months = scenario.months.values();
    let mut series = Vec::with_capacity(scenario.curves.len());

    for assignment in &scenario.curves {
        assignment.curve.validate()?;
        let baseline = breakdown.total(&assignment.country)?;
        let yields: Vec<f64> = months.iter().map(|&t| assignment.curve.yield_at(t)).collect();
        let prices: Vec<f64> = yields.iter().map(|y| baseline / y).collect();

        debug!(
            country = %assignment.country,
            baseline,
            first = prices.first().copied().unwrap_or(baseline),
            last = prices.last().copied().unwrap_or(baseline),
            "projected per-unit cost"
        );

        series.push(CostSeries {
            name: assignment.country.clone(),
            baseline,
            yields,
            prices,
        });
    }

    Ok(CostProjection {
        title: scenario.title.clone(),
        months,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_totals_match_line_items() {
        let breakdown = CostBreakdown::default();
        assert_eq!(breakdown.total("US").unwrap(), 80.0);
        assert_eq!(breakdown.total(MEXICO).unwrap(), 77.5);
        assert_eq!(breakdown.total(CHINA).unwrap(), 74.0);
        assert!(matches!(breakdown.total("Canada"), Err(ModelError::UnknownCountry(_))));
    }

    #[test]
    fn ease_out_starts_at_initial_and_reaches_one() {
        assert!((ease_to_one(0.0, 6.0, 0.8) - 0.8).abs() < 1e-12);
        assert!((ease_to_one(6.0, 6.0, 0.8) - 1.0).abs() < 1e-12);
        assert!((ease_to_one(9.0, 6.0, 0.8) - 1.0).abs() < 1e-12);
        // halfway through the ramp three quarters of the gap is closed
        assert!((ease_to_one(3.0, 6.0, 0.8) - 0.95).abs() < 1e-12);
    }

    #[test]
    fn exponential_curve_hits_target_at_target_time() {
        let curve = YieldCurve::Exponential { y0: 0.95, target: 0.99, t_target: 6.0 };
        assert!((curve.yield_at(0.0) - 0.95).abs() < 1e-12);
        assert!((curve.yield_at(6.0) - 0.99).abs() < 1e-12);
        assert!(curve.yield_at(60.0) < 1.0);
    }

    #[test]
    fn step_curve_drops_at_threshold() {
        let curve = YieldCurve::Step { y0: 0.9, threshold: 6.0 };
        assert_eq!(curve.yield_at(5.9), 0.9);
        assert_eq!(curve.yield_at(6.0), 1.0);
    }

    #[test]
    fn invalid_curves_are_rejected() {
        assert!(YieldCurve::EaseOut { y0: 0.0, t_end: 6.0 }.validate().is_err());
        assert!(YieldCurve::EaseOut { y0: 0.8, t_end: 0.0 }.validate().is_err());
        assert!(YieldCurve::Exponential { y0: 0.95, target: 0.9, t_target: 6.0 }.validate().is_err());
        assert!(YieldCurve::Step { y0: 1.2, threshold: 6.0 }.validate().is_err());
    }

    #[test]
    fn linspace_includes_endpoints() {
        let months = linspace(0.0, 6.0, 61);
        assert_eq!(months.len(), 61);
        assert_eq!(months[0], 0.0);
        assert!((months[60] - 6.0).abs() < 1e-12);
        assert!((months[10] - 1.0).abs() < 1e-12);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn smooth_ramp_prices_fall_to_baseline() {
        let projection = project_costs(&CostBreakdown::default(), &RampScenario::smooth_ramp()).unwrap();
        assert_eq!(projection.months.len(), RAMP_POINTS);

        let us = &projection.series[0];
        assert!((us.prices[0] - 100.0).abs() < 1e-9);
        assert!((us.prices.last().copied().unwrap() - 80.0).abs() < 1e-9);
        assert!(us.prices.windows(2).all(|w| w[1] <= w[0]));

        let china = &projection.series[2];
        assert!((china.prices.last().copied().unwrap() - 74.0 / 0.99).abs() < 1e-9);
    }

    #[test]
    fn step_scenario_is_flat_until_threshold() {
        let projection = project_costs(&CostBreakdown::default(), &RampScenario::sudden_step()).unwrap();
        let mexico = &projection.series[1];
        // month 5.9 sits at index 59 and month 6.0 at index 60
        assert!((mexico.prices[59] - 77.5 / 0.9).abs() < 1e-9);
        assert!((mexico.prices[60] - 77.5).abs() < 1e-9);
        let (lo, hi) = projection.price_range();
        assert!((lo - 74.0).abs() < 1e-9);
        assert!((hi - 100.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_breakdown_is_rejected() {
        let mut breakdown = CostBreakdown::default();
        breakdown.countries[0].items.pop();
        assert!(matches!(
            project_costs(&breakdown, &RampScenario::smooth_ramp()).unwrap_err(),
            ModelError::LengthMismatch { .. }
        ));
    }
}
