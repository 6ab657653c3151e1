use crate::core::cost_model::{CostBreakdown, CostProjection};
use crate::core::risk::RiskAssessment;
use crate::core::scoring::{Period, ScoreTable};
use crate::core::weight_search::WeightSearchResult;
use crate::utils::csv_export::round_to;
use crate::config::constants::SCORE_DECIMALS;

pub fn print_score_table(table: &ScoreTable) {
    println!("\nSourcing Decision Model");
    println!("Weighted Score: {}", table.weights.describe());
    println!("----------------------------------------------------------------------------------------");
    println!(
        "{:<10} {:>10} {:>8} {:>16} {:>15} {:>20} {:>19}",
        "Country", "Logistics", "Risk", "Cost 0-6 months", "Cost 6+ months", "Composite Score 0-6", "Composite Score 6+"
    );
    for row in &table.rows {
        println!(
            "{:<10} {:>10.4} {:>8.2} {:>16.2} {:>15.2} {:>20.4} {:>19.4}",
            row.name,
            row.logistics,
            row.risk,
            row.cost_before,
            row.cost_after,
            round_to(row.score_before, SCORE_DECIMALS),
            round_to(row.score_after, SCORE_DECIMALS),
        );
    }
    println!("----------------------------------------------------------------------------------------");
}

pub fn print_rankings(table: &ScoreTable) {
    for period in Period::ALL {
        println!("\nRanking {} (lower is better):", period.label(table.threshold_months));
        let scores = table.scores(period);
        for (position, name) in table.ranking(period).iter().enumerate() {
            let score = scores.iter().find(|s| &s.name == name).map(|s| s.score).unwrap_or(f64::NAN);
            println!("  {}. {}  score={:.2}", position + 1, name, score);
        }
    }
}

pub fn print_weight_hits(result: &WeightSearchResult) {
    println!(
        "\nEvaluated {} valid weight combinations, {} matched",
        result.points_evaluated,
        result.hits.len()
    );
    for hit in &result.hits {
        println!(
            "FOUND: Cost={:.2}, Risk={:.2}, Logistics={:.2}",
            hit.weights.cost, hit.weights.risk, hit.weights.logistics
        );
        let format_scores = |scores: &[f64]| {
            result
                .countries
                .iter()
                .zip(scores)
                .map(|(name, score)| format!("{}={:.2}", name, score))
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("  {}: {}", Period::Before, format_scores(&hit.scores_before));
        println!("  {}:  {}", Period::After, format_scores(&hit.scores_after));
    }
}

pub fn print_risk_assessment(assessment: &RiskAssessment) {
    println!("\n=== Logistic normalized scores (0-100, lower is better) ===");
    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Country", "Damage%", "D_Score", "FX%", "F_Score", "Final"
    );
    for row in &assessment.rows {
        println!(
            "{:<10} {:>10.4} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            row.name, row.damage_pct, row.damage_score, row.fx_vol_pct, row.fx_score, row.final_score
        );
    }

    println!("\n=== Ranking (lower is better) ===");
    for (position, name) in assessment.ranking().iter().enumerate() {
        if let Some(row) = assessment.row(name) {
            println!(
                "{}. {}  Final={:.2}  (Damage={:.2}, FX={:.2})",
                position + 1,
                name,
                row.final_score,
                row.damage_score,
                row.fx_score
            );
        }
    }
}

pub fn print_baseline_totals(breakdown: &CostBreakdown) {
    println!("\nBaseline total costs (before yield adjustment):");
    let totals = breakdown
        .totals()
        .iter()
        .map(|(name, total)| format!("{}: ${:.2}", name, total))
        .collect::<Vec<_>>()
        .join(", ");
    println!("{}", totals);
}

pub fn print_projection_summary(projection: &CostProjection) {
    println!("\n{}", projection.title);
    println!("----------------------------------------");
    for series in &projection.series {
        let start = series.prices.first().copied().unwrap_or(series.baseline);
        let end = series.prices.last().copied().unwrap_or(series.baseline);
        println!("  {:<8} start=${:.2}  end=${:.2}  baseline=${:.2}", series.name, start, end, series.baseline);
    }
}
