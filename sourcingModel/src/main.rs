use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use sourcing_model::analysis::reporting;
use sourcing_model::cli::cli::{Args, Command};
use sourcing_model::config::constants::*;
use sourcing_model::core::cost_model::{project_costs, YieldCurve};
use sourcing_model::core::risk::composite_risk;
use sourcing_model::core::scoring::{CompositeScorer, Period, ScoreTable};
use sourcing_model::core::weight_search::{search_weights, TargetOutcome, WeightSearchConfig};
use sourcing_model::utils::csv_export::CsvExporter;
use sourcing_model::utils::logging;
use sourcing_model::utils::plotting;
use sourcing_model::ModelConfig;

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.enable_timing(), args.debug_logging())
        .context("failed to initialise logging")?;

    let config = match args.config() {
        Some(path) => ModelConfig::load(path)
            .with_context(|| format!("failed to load model configuration from {}", path))?,
        None => ModelConfig::default(),
    };

    match args.command() {
        Command::Score => run_scoring(&args, &config)?,
        Command::Weights { full_step, before_winner, after_winner } => {
            run_weight_search(&config, full_step, before_winner, after_winner)?
        }
        Command::Risk { temperature_factor } => run_risk(&config, temperature_factor)?,
        Command::CostRamp => run_cost_ramp(&args, &config)?,
    }

    logging::print_timing_report();
    Ok(())
}

fn run_scoring(args: &Args, config: &ModelConfig) -> Result<()> {
    let scorer = CompositeScorer::new(&config.countries, config.weights)
        .context("invalid scoring inputs")?;
    let table = ScoreTable::build(&scorer, config.threshold_months);

    reporting::print_score_table(&table);
    reporting::print_rankings(&table);

    let exporter = CsvExporter::new(args.output_dir(), args.timestamped())
        .with_context(|| format!("failed to create output directory {}", args.output_dir()))?;
    let csv_path = exporter.export_scores(&table).context("failed to export scores")?;
    println!("\n[SAVED] Scores saved as: {}", csv_path.display());

    if !args.no_plots() {
        let (full, zoomed) = plotting::render(&table, exporter.output_dir())
            .context("failed to render score charts")?;
        println!("[SAVED] Graph saved as: {}", full.display());
        println!("[SAVED] Zoomed graph saved as: {}", zoomed.display());
    }

    Ok(())
}

fn run_weight_search(
    config: &ModelConfig,
    full_step: Option<f64>,
    before_winner: Option<String>,
    after_winner: Option<String>,
) -> Result<()> {
    let target = TargetOutcome {
        before_winner: before_winner.unwrap_or_else(|| config.weight_search.target.before_winner.clone()),
        after_winner: after_winner.unwrap_or_else(|| config.weight_search.target.after_winner.clone()),
    };
    let search = match full_step {
        Some(step) => WeightSearchConfig::full_simplex(step, target),
        None => WeightSearchConfig { target, ..config.weight_search.clone() },
    };

    println!(
        "Finding weights where {} wins {} and {} wins {}",
        search.target.before_winner,
        Period::Before.label(config.threshold_months),
        search.target.after_winner,
        Period::After.label(config.threshold_months)
    );

    let result = search_weights(&config.countries, &search).context("weight search failed")?;
    reporting::print_weight_hits(&result);
    Ok(())
}

fn run_risk(config: &ModelConfig, temperature_factor: Option<f64>) -> Result<()> {
    let assessment = composite_risk(&config.risk, temperature_factor).context("invalid risk inputs")?;
    reporting::print_risk_assessment(&assessment);
    Ok(())
}

fn run_cost_ramp(args: &Args, config: &ModelConfig) -> Result<()> {
    let exporter = CsvExporter::new(args.output_dir(), args.timestamped())
        .with_context(|| format!("failed to create output directory {}", args.output_dir()))?;

    let outputs = [
        (&config.ramp_scenario, RAMP_CSV_FILE, RAMP_PNG_FILE),
        (&config.step_scenario, STEP_CSV_FILE, STEP_PNG_FILE),
    ];

    for (scenario, csv_name, png_name) in outputs {
        let projection = project_costs(&config.cost_breakdown, scenario)
            .with_context(|| format!("failed to project costs for '{}'", scenario.title))?;
        reporting::print_projection_summary(&projection);

        let csv_path = exporter.export_cost_projection(&projection, csv_name)?;
        println!("[SAVED] {}", csv_path.display());

        if !args.no_plots() {
            // Step curves are drawn as steps with a marker at their threshold
            let marker = scenario.curves.iter().find_map(|c| match c.curve {
                YieldCurve::Step { threshold, .. } => Some(threshold),
                _ => None,
            });
            let png_path = exporter.output_dir().join(png_name);
            plotting::render_cost_projection(&projection, &png_path, marker.is_some(), marker)
                .context("failed to render cost chart")?;
            println!("[SAVED] {}", png_path.display());
        }
    }

    reporting::print_baseline_totals(&config.cost_breakdown);
    info!("Cost ramp outputs written to {}", exporter.output_dir().display());
    Ok(())
}
