use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::constants::*;
use crate::core::cost_model::CostProjection;
use crate::core::scoring::{rank, CountryScore, Period, ScoreTable};
use crate::error::{ModelError, ModelResult};
use crate::utils::logging::{self, FileIOType, OperationCategory};

/// One exported row of the score table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Logistics")]
    pub logistics: f64,
    #[serde(rename = "Risk")]
    pub risk: f64,
    #[serde(rename = "Cost 0-6 months")]
    pub cost_before: f64,
    #[serde(rename = "Cost 6+ months")]
    pub cost_after: f64,
    #[serde(rename = "Composite Score 0-6")]
    pub score_before: f64,
    #[serde(rename = "Composite Score 6+")]
    pub score_after: f64,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Writes model results as CSV files under one output directory
pub struct CsvExporter {
    output_dir: PathBuf,
    timestamp: String,
}

impl CsvExporter {
    /// Creates the output directory. With `timestamped` the files go into a
    /// per-run subdirectory named after the current local time.
    pub fn new(output_dir: impl AsRef<Path>, timestamped: bool) -> ModelResult<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        let full_path = if timestamped {
            output_dir.as_ref().join(&timestamp)
        } else {
            output_dir.as_ref().to_path_buf()
        };
        fs::create_dir_all(&full_path)?;

        Ok(Self {
            output_dir: full_path,
            timestamp,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Row-per-country score export; score columns are rounded to four decimals.
    pub fn export_scores(&self, table: &ScoreTable) -> ModelResult<PathBuf> {
        let _timing = logging::start_timing("export_scores",
            OperationCategory::FileIO { subcategory: FileIOType::CsvExport });

        let path = self.output_dir.join(SCORES_CSV_FILE);
        let mut writer = csv::Writer::from_path(&path)?;

        for row in &table.rows {
            writer.serialize(ScoreRecord {
                country: row.name.clone(),
                logistics: row.logistics,
                risk: row.risk,
                cost_before: row.cost_before,
                cost_after: row.cost_after,
                score_before: round_to(row.score_before, SCORE_DECIMALS),
                score_after: round_to(row.score_after, SCORE_DECIMALS),
            })?;
        }
        writer.flush()?;

        info!("Exported {} score rows to: {}", table.rows.len(), path.display());
        Ok(path)
    }

    /// Month-by-month yield and price for every country in the projection.
    pub fn export_cost_projection(&self, projection: &CostProjection, file_name: &str) -> ModelResult<PathBuf> {
        let _timing = logging::start_timing("export_cost_projection",
            OperationCategory::FileIO { subcategory: FileIOType::CsvExport });

        let path = self.output_dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = vec!["Month".to_string()];
        for series in &projection.series {
            header.push(format!("{} Yield", series.name));
            header.push(format!("{} Price (USD)", series.name));
        }
        writer.write_record(&header)?;

        for (i, month) in projection.months.iter().enumerate() {
            let mut record = vec![format!("{:.2}", month)];
            for series in &projection.series {
                record.push(format!("{:.6}", series.yields[i]));
                record.push(format!("{:.4}", series.prices[i]));
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;

        info!("Exported {} cost points to: {}", projection.months.len(), path.display());
        Ok(path)
    }
}

/// Reads a score export back in.
pub fn read_scores(path: impl AsRef<Path>) -> ModelResult<Vec<ScoreRecord>> {
    let _timing = logging::start_timing("read_scores",
        OperationCategory::FileIO { subcategory: FileIOType::CsvImport });

    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<ScoreRecord>, csv::Error>>()?;
    if records.is_empty() {
        return Err(ModelError::EmptyInput("score rows"));
    }
    Ok(records)
}

/// Ranking recomputed from the score columns of exported records.
///
/// Scores are read at export precision, so two countries closer than
/// half a unit in the fourth decimal tie here and keep file order.
pub fn rank_records(records: &[ScoreRecord], period: Period) -> Vec<String> {
    let scores: Vec<CountryScore> = records
        .iter()
        .map(|r| CountryScore {
            name: r.country.clone(),
            score: match period {
                Period::Before => r.score_before,
                Period::After => r.score_after,
            },
        })
        .collect();
    rank(&scores)
}
