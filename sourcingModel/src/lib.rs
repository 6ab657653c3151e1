// Main module declarations for the sourcing model

// Pure scoring, ranking and search
pub mod core {
    pub mod scoring;
    pub mod risk;
    pub mod weight_search;
    pub mod cost_model;
}

// Configuration modules
pub mod config {
    pub mod constants;
    pub mod model_config;
}

// Presentation and export
pub mod analysis {
    pub mod reporting;
}

// Utility functions
pub mod utils {
    pub mod logging;
    pub mod csv_export;
    pub mod plotting;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

pub mod error;

// Re-export commonly used items
pub use crate::config::model_config::ModelConfig;
pub use crate::core::scoring::{CountryMetrics, Period, ScoreTable, Weights};
pub use crate::error::ModelError;
