// Error type shared by the scoring core and the export layer

#[derive(Debug)]
pub enum ModelError {
    IoError(std::io::Error),
    CsvError(csv::Error),
    JsonError(serde_json::Error),
    PlotError(String),
    LengthMismatch { field: &'static str, expected: usize, found: usize },
    EmptyInput(&'static str),
    NonFiniteValue { field: String, value: f64 },
    InvalidWeight { name: &'static str, value: f64 },
    InvalidYield(String),
    UnknownCountry(String),
    DuplicateCountry(String),
    GridTooLarge { axis: &'static str, points: f64, limit: usize },
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::IoError(err)
    }
}

impl From<csv::Error> for ModelError {
    fn from(err: csv::Error) -> Self {
        ModelError::CsvError(err)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::JsonError(err)
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::IoError(e) => write!(f, "IO error: {}", e),
            ModelError::CsvError(e) => write!(f, "CSV error: {}", e),
            ModelError::JsonError(e) => write!(f, "JSON error: {}", e),
            ModelError::PlotError(s) => write!(f, "Plot error: {}", s),
            ModelError::LengthMismatch { field, expected, found } => write!(
                f,
                "Length mismatch for '{}': expected {} values, found {}",
                field, expected, found
            ),
            ModelError::EmptyInput(what) => write!(f, "No {} supplied", what),
            ModelError::NonFiniteValue { field, value } => {
                write!(f, "Non-finite value {} in '{}'", value, field)
            }
            ModelError::InvalidWeight { name, value } => {
                write!(f, "Invalid {} weight: {} (must be finite and non-negative)", name, value)
            }
            ModelError::InvalidYield(s) => write!(f, "Invalid yield curve: {}", s),
            ModelError::UnknownCountry(name) => write!(f, "Unknown country: {}", name),
            ModelError::DuplicateCountry(name) => write!(f, "Country listed more than once: {}", name),
            ModelError::GridTooLarge { axis, points, limit } => write!(
                f,
                "Weight grid '{}' would have {:.0} points (limit {})",
                axis, points, limit
            ),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::IoError(e) => Some(e),
            ModelError::CsvError(e) => Some(e),
            ModelError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
