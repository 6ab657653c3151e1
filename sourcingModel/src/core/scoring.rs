// Scoring module - composite weighted scores and per-period rankings
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::constants::*;
use crate::error::{ModelError, ModelResult};
use crate::utils::logging::{self, OperationCategory, ScoringType};

/// Sourcing metrics for one country. Every field is lower-is-better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMetrics {
    pub name: String,
    pub logistics: f64,
    pub risk: f64,
    pub cost_before: f64,
    pub cost_after: f64,
}

impl CountryMetrics {
    pub fn new(name: &str, logistics: f64, risk: f64, cost_before: f64, cost_after: f64) -> Self {
        Self {
            name: name.to_string(),
            logistics,
            risk,
            cost_before,
            cost_after,
        }
    }

    pub fn cost(&self, period: Period) -> f64 {
        match period {
            Period::Before => self.cost_before,
            Period::After => self.cost_after,
        }
    }

    fn validate(&self) -> ModelResult<()> {
        let fields = [
            ("logistics", self.logistics),
            ("risk", self.risk),
            ("cost_before", self.cost_before),
            ("cost_after", self.cost_after),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ModelError::NonFiniteValue {
                    field: format!("{}.{}", self.name, field),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Coefficients for the cost, risk and logistics components.
///
/// The weights are used as given; nothing rescales them to sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub cost: f64,
    pub risk: f64,
    pub logistics: f64,
}

impl Weights {
    pub fn new(cost: f64, risk: f64, logistics: f64) -> Self {
        Self { cost, risk, logistics }
    }

    pub fn validate(&self) -> ModelResult<()> {
        for (name, value) in [("cost", self.cost), ("risk", self.risk), ("logistics", self.logistics)] {
            if !value.is_finite() || value < ZERO_F64 {
                return Err(ModelError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }

    /// Weighted sum of one country's metrics for `period`.
    pub fn composite(&self, country: &CountryMetrics, period: Period) -> f64 {
        self.cost * country.cost(period) + self.risk * country.risk + self.logistics * country.logistics
    }

    pub fn sum(&self) -> f64 {
        self.cost + self.risk + self.logistics
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.cost * factor, self.risk * factor, self.logistics * factor)
    }

    pub fn describe(&self) -> String {
        format!(
            "Cost {:.0}% | Risk {:.0}% | Logistics {:.0}%",
            self.cost * 100.0,
            self.risk * 100.0,
            self.logistics * 100.0
        )
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::new(DEFAULT_COST_WEIGHT, DEFAULT_RISK_WEIGHT, DEFAULT_LOGISTICS_WEIGHT)
    }
}

/// One of the two cost windows. Risk and logistics are shared by both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Before,
    After,
}

impl Period {
    pub const ALL: [Period; 2] = [Period::Before, Period::After];

    pub fn label(&self, threshold_months: u32) -> String {
        match self {
            Period::Before => format!("Before {} months", threshold_months),
            Period::After => format!("After {} months", threshold_months),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Before => write!(f, "before threshold"),
            Period::After => write!(f, "after threshold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryScore {
    pub name: String,
    pub score: f64,
}

/// Builds country records from index-aligned columns.
pub fn from_columns<S: AsRef<str>>(
    names: &[S],
    logistics: &[f64],
    risk: &[f64],
    cost_before: &[f64],
    cost_after: &[f64],
) -> ModelResult<Vec<CountryMetrics>> {
    let expected = names.len();
    for (field, found) in [
        ("logistics", logistics.len()),
        ("risk", risk.len()),
        ("cost_before", cost_before.len()),
        ("cost_after", cost_after.len()),
    ] {
        if found != expected {
            return Err(ModelError::LengthMismatch { field, expected, found });
        }
    }

    Ok(names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            CountryMetrics::new(name.as_ref(), logistics[i], risk[i], cost_before[i], cost_after[i])
        })
        .collect())
}

/// Checks a country list before it is scored.
pub fn validate_countries(countries: &[CountryMetrics]) -> ModelResult<()> {
    if countries.is_empty() {
        return Err(ModelError::EmptyInput("countries"));
    }
    let mut seen = HashSet::new();
    for country in countries {
        if !seen.insert(country.name.as_str()) {
            return Err(ModelError::DuplicateCountry(country.name.clone()));
        }
        country.validate()?;
    }
    Ok(())
}

/// Weighted-sum scorer over a fixed set of countries.
#[derive(Debug, Clone)]
pub struct CompositeScorer<'a> {
    countries: &'a [CountryMetrics],
    weights: Weights,
}

impl<'a> CompositeScorer<'a> {
    pub fn new(countries: &'a [CountryMetrics], weights: Weights) -> ModelResult<Self> {
        validate_countries(countries)?;
        weights.validate()?;
        Ok(Self { countries, weights })
    }

    pub fn weights(&self) -> Weights {
        self.weights
    }

    pub fn countries(&self) -> &'a [CountryMetrics] {
        self.countries
    }

    pub fn score_country(&self, country: &CountryMetrics, period: Period) -> f64 {
        self.weights.composite(country, period)
    }

    /// Composite score of every country for one period, in input order.
    pub fn score(&self, period: Period) -> Vec<CountryScore> {
        let _timing = logging::start_timing("score",
            OperationCategory::Scoring { subcategory: ScoringType::Composite });

        self.countries
            .iter()
            .map(|country| CountryScore {
                name: country.name.clone(),
                score: self.score_country(country, period),
            })
            .collect()
    }

    /// Lowest-scoring country for the period.
    pub fn winner(&self, period: Period) -> Option<String> {
        rank(&self.score(period)).into_iter().next()
    }
}

/// Orders countries ascending by score. Ties keep their input order.
pub fn rank(scores: &[CountryScore]) -> Vec<String> {
    let _timing = logging::start_timing("rank",
        OperationCategory::Scoring { subcategory: ScoringType::Ranking });

    let mut ordered: Vec<&CountryScore> = scores.iter().collect();
    // sort_by is stable; -0.0 and 0.0 compare equal
    ordered.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
    ordered.into_iter().map(|s| s.name.clone()).collect()
}

/// Index of the lowest score; the first one wins a tie.
pub fn argmin(scores: &[f64]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &value)| match best {
            Some((_, current)) if current <= value => best,
            _ => Some((i, value)),
        })
        .map(|(i, _)| i)
}

/// One row of the score table: metrics joined with both period scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub name: String,
    pub logistics: f64,
    pub risk: f64,
    pub cost_before: f64,
    pub cost_after: f64,
    pub score_before: f64,
    pub score_after: f64,
}

impl ScoreRow {
    pub fn score(&self, period: Period) -> f64 {
        match period {
            Period::Before => self.score_before,
            Period::After => self.score_after,
        }
    }
}

/// Everything the presentation layer needs from the scoring core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub weights: Weights,
    pub threshold_months: u32,
    pub rows: Vec<ScoreRow>,
}

impl ScoreTable {
    pub fn build(scorer: &CompositeScorer<'_>, threshold_months: u32) -> Self {
        let before = scorer.score(Period::Before);
        let after = scorer.score(Period::After);

        let rows: Vec<ScoreRow> = scorer
            .countries()
            .iter()
            .zip(before.iter().zip(after.iter()))
            .map(|(country, (b, a))| ScoreRow {
                name: country.name.clone(),
                logistics: country.logistics,
                risk: country.risk,
                cost_before: country.cost_before,
                cost_after: country.cost_after,
                score_before: b.score,
                score_after: a.score,
            })
            .collect();

        for row in &rows {
            debug!(country = %row.name, before = row.score_before, after = row.score_after, "composite scores");
        }

        Self {
            weights: scorer.weights(),
            threshold_months,
            rows,
        }
    }

    pub fn scores(&self, period: Period) -> Vec<CountryScore> {
        self.rows
            .iter()
            .map(|row| CountryScore { name: row.name.clone(), score: row.score(period) })
            .collect()
    }

    pub fn ranking(&self, period: Period) -> Vec<String> {
        rank(&self.scores(period))
    }

    pub fn max_score(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|row| [row.score_before, row.score_after])
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn values(scores: &[CountryScore]) -> Vec<f64> {
        scores.iter().map(|s| s.score).collect()
    }

    #[test]
    fn reference_scores_match_weighted_sum() {
        let countries = reference_countries();
        let scorer = CompositeScorer::new(&countries, Weights::default()).unwrap();

        let before = values(&scorer.score(Period::Before));
        let after = values(&scorer.score(Period::After));

        let expected_before = [36.19558, 35.00786, 33.62458];
        let expected_after = [37.92458, 32.68386, 34.22658];
        for (got, want) in before.iter().zip(expected_before) {
            assert!((got - want).abs() < 1e-6, "before: {} vs {}", got, want);
        }
        for (got, want) in after.iter().zip(expected_after) {
            assert!((got - want).abs() < 1e-6, "after: {} vs {}", got, want);
        }
    }

    #[test]
    fn reference_rankings_differ_by_period() {
        let countries = reference_countries();
        let scorer = CompositeScorer::new(&countries, Weights::default()).unwrap();

        assert_eq!(rank(&scorer.score(Period::Before)), vec![MEXICO, USA, CHINA]);
        assert_eq!(rank(&scorer.score(Period::After)), vec![USA, MEXICO, CHINA]);
        assert_eq!(scorer.winner(Period::Before).as_deref(), Some(MEXICO));
        assert_eq!(scorer.winner(Period::After).as_deref(), Some(USA));
    }

    #[test]
    fn doubling_weights_doubles_scores() {
        let countries = reference_countries();
        let base = CompositeScorer::new(&countries, Weights::default()).unwrap();
        let doubled = CompositeScorer::new(&countries, Weights::default().scaled(2.0)).unwrap();

        for period in Period::ALL {
            for (a, b) in base.score(period).iter().zip(doubled.score(period).iter()) {
                assert!((2.0 * a.score - b.score).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn score_is_linear_in_each_weight() {
        let countries = reference_countries();
        let only_risk = CompositeScorer::new(&countries, Weights::new(0.0, 1.0, 0.0)).unwrap();
        let scores = values(&only_risk.score(Period::After));
        assert_eq!(scores, DEFAULT_RISK.to_vec());

        let only_cost = CompositeScorer::new(&countries, Weights::new(3.0, 0.0, 0.0)).unwrap();
        let scores = values(&only_cost.score(Period::Before));
        for (got, cost) in scores.iter().zip(DEFAULT_COST_BEFORE) {
            assert!((got - 3.0 * cost).abs() < 1e-9);
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let scores = vec![
            CountryScore { name: "B".to_string(), score: 1.0 },
            CountryScore { name: "A".to_string(), score: 0.5 },
            CountryScore { name: "C".to_string(), score: 1.0 },
            CountryScore { name: "D".to_string(), score: 0.5 },
        ];
        assert_eq!(rank(&scores), vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn signed_zero_scores_are_a_tie() {
        let scores = vec![
            CountryScore { name: "B".to_string(), score: 0.0 },
            CountryScore { name: "A".to_string(), score: -0.0 },
        ];
        assert_eq!(rank(&scores), vec!["B", "A"]);

        // zero weights on negative metrics produce exactly this pair
        let countries = vec![
            CountryMetrics::new("B", 2.0, 1.0, 1.0, 1.0),
            CountryMetrics::new("A", -3.0, -1.0, -1.0, -1.0),
        ];
        let scorer = CompositeScorer::new(&countries, Weights::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(scorer.winner(Period::Before).as_deref(), Some("B"));
    }

    #[test]
    fn scorer_and_weights_agree() {
        let countries = reference_countries();
        let weights = Weights::new(0.45, 0.25, 0.3);
        let scorer = CompositeScorer::new(&countries, weights).unwrap();
        for period in Period::ALL {
            for (country, scored) in countries.iter().zip(scorer.score(period)) {
                assert_eq!(weights.composite(country, period), scored.score);
            }
        }
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let err = from_columns(&["China", "USA"], &[1.0, 2.0], &[1.0], &[1.0, 2.0], &[1.0, 2.0])
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::LengthMismatch { field: "risk", expected: 2, found: 1 }
        ));
    }

    #[test]
    fn non_finite_metrics_are_rejected() {
        let countries = vec![CountryMetrics::new("China", f64::NAN, 1.0, 1.0, 1.0)];
        let err = CompositeScorer::new(&countries, Weights::default()).unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteValue { .. }));
    }

    #[test]
    fn negative_weights_are_rejected() {
        let countries = reference_countries();
        let err = CompositeScorer::new(&countries, Weights::new(0.5, -0.1, 0.6)).unwrap_err();
        assert!(matches!(err, ModelError::InvalidWeight { name: "risk", .. }));
    }

    #[test]
    fn empty_and_duplicate_countries_are_rejected() {
        assert!(matches!(
            CompositeScorer::new(&[], Weights::default()).unwrap_err(),
            ModelError::EmptyInput(_)
        ));

        let countries = vec![
            CountryMetrics::new("USA", 1.0, 1.0, 1.0, 1.0),
            CountryMetrics::new("USA", 2.0, 2.0, 2.0, 2.0),
        ];
        assert!(matches!(
            CompositeScorer::new(&countries, Weights::default()).unwrap_err(),
            ModelError::DuplicateCountry(_)
        ));
    }

    #[test]
    fn argmin_prefers_first_on_tie() {
        assert_eq!(argmin(&[3.0, 1.0, 1.0]), Some(1));
        assert_eq!(argmin(&[]), None);
    }

    #[test]
    fn table_rows_follow_input_order() {
        let countries = reference_countries();
        let scorer = CompositeScorer::new(&countries, Weights::default()).unwrap();
        let table = ScoreTable::build(&scorer, DEFAULT_THRESHOLD_MONTHS);

        let names: Vec<&str> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, DEFAULT_COUNTRIES.to_vec());
        assert_eq!(table.ranking(Period::Before), vec![MEXICO, USA, CHINA]);
        assert!((table.max_score() - 37.92458).abs() < 1e-6);
    }

    #[test]
    fn period_labels_use_threshold() {
        assert_eq!(Period::Before.label(6), "Before 6 months");
        assert_eq!(Period::After.label(6), "After 6 months");
    }
}
