use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "Weighted cost/risk/logistics sourcing comparison", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(short, long, global = true, help = "JSON file overriding the built-in model inputs")]
    config: Option<String>,

    #[arg(short, long, global = true, default_value = ".")]
    output_dir: String,

    #[arg(long, global = true, help = "Write outputs into a per-run timestamped subdirectory", default_value_t = false)]
    timestamped: bool,

    #[arg(long, global = true, help = "Skip writing PNG charts", default_value_t = false)]
    no_plots: bool,

    #[arg(long, global = true, default_value_t = false)]
    enable_timing: bool,

    #[arg(long, global = true, default_value_t = false)]
    debug_logging: bool,
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum Command {
    /// Composite scores, rankings, CSV export and bar charts
    Score,
    /// Grid search for weights that produce the target winners
    Weights {
        #[arg(long, help = "Search the whole simplex at this step instead of the configured grid")]
        full_step: Option<f64>,

        #[arg(long, help = "Country that must win before the threshold")]
        before_winner: Option<String>,

        #[arg(long, help = "Country that must win after the threshold")]
        after_winner: Option<String>,
    },
    /// Logistic-normalized damage and FX risk scores
    Risk {
        #[arg(long, help = "Multiply each column's standard deviation by this factor")]
        temperature_factor: Option<f64>,
    },
    /// Per-unit cost projections while production yield ramps up
    CostRamp,
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Score)
    }

    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    pub fn timestamped(&self) -> bool {
        self.timestamped
    }

    pub fn no_plots(&self) -> bool {
        self.no_plots
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_score_command() {
        let args = Args::parse_from(["sourcing-model"]);
        assert_eq!(args.command(), Command::Score);
        assert_eq!(args.output_dir(), ".");
        assert!(!args.no_plots());
    }

    #[test]
    fn parses_weights_subcommand_with_global_flags() {
        let args = Args::parse_from([
            "sourcing-model",
            "weights",
            "--full-step",
            "0.01",
            "--before-winner",
            "USA",
            "--no-plots",
        ]);
        assert_eq!(
            args.command(),
            Command::Weights {
                full_step: Some(0.01),
                before_winner: Some("USA".to_string()),
                after_winner: None,
            }
        );
        assert!(args.no_plots());
    }
}
