// Constants for the sourcing model
// Reference inputs, weights and output names used when no config file is given

//---------------------------------------------------------------------
// Common Numeric Constants
//---------------------------------------------------------------------
pub const ZERO_F64: f64 = 0.0;
pub const ONE_F64: f64 = 1.0;

//---------------------------------------------------------------------
// Countries (order matters across the reference arrays)
//---------------------------------------------------------------------
pub const CHINA: &str = "China";
pub const USA: &str = "USA";
pub const MEXICO: &str = "Mexico";
pub const DEFAULT_COUNTRIES: [&str; 3] = [CHINA, USA, MEXICO];

//---------------------------------------------------------------------
// Composite Score Inputs
//---------------------------------------------------------------------
pub const DEFAULT_LOGISTICS: [f64; 3] = [59.1179, 21.7643, 19.1179];
pub const DEFAULT_RISK: [f64; 3] = [37.22, 41.39, 69.67];
pub const DEFAULT_COST_BEFORE: [f64; 3] = [29.50, 37.88, 32.62];
pub const DEFAULT_COST_AFTER: [f64; 3] = [31.97, 34.56, 33.48];

pub const DEFAULT_COST_WEIGHT: f64 = 0.7;
pub const DEFAULT_RISK_WEIGHT: f64 = 0.1;
pub const DEFAULT_LOGISTICS_WEIGHT: f64 = 0.2;

pub const DEFAULT_THRESHOLD_MONTHS: u32 = 6;

//---------------------------------------------------------------------
// Logistic Risk Normalization
//---------------------------------------------------------------------
pub const LOGISTIC_SCALE: f64 = 100.0;
pub const ZERO_STDDEV_EPSILON: f64 = 1e-9;
pub const DEFAULT_DAMAGE_PCT: [f64; 3] = [7.6609, 1.4970, 0.4561];
pub const DEFAULT_FX_VOL_PCT: [f64; 3] = [4.48, 0.0, 12.94];
pub const DEFAULT_DAMAGE_WEIGHT: f64 = 0.8;
pub const DEFAULT_FX_WEIGHT: f64 = 0.2;

//---------------------------------------------------------------------
// Weight Search
//---------------------------------------------------------------------
pub const WEIGHT_SEARCH_COST_MIN: f64 = 0.40;
pub const WEIGHT_SEARCH_COST_MAX: f64 = 0.65;
pub const WEIGHT_SEARCH_RISK_MIN: f64 = 0.05;
pub const WEIGHT_SEARCH_RISK_MAX: f64 = 0.35;
pub const WEIGHT_SEARCH_STEP: f64 = 0.05;
pub const WEIGHT_TOLERANCE: f64 = 1e-9;
pub const PROGRESS_BAR_MIN_POINTS: usize = 10_000;
pub const MAX_WEIGHT_AXIS_POINTS: usize = 100_001;
pub const MAX_WEIGHT_GRID_POINTS: usize = 25_000_000;

//---------------------------------------------------------------------
// Yield Ramp Cost Model
//---------------------------------------------------------------------
pub const COST_LINE_ITEMS: [&str; 7] = [
    "Raw material",
    "Labor",
    "Indirect costs",
    "Packaging/transport/inventory",
    "Electricity",
    "Depreciation",
    "Tariff costs",
];
pub const US_COST_ITEMS: [f64; 7] = [40.0, 12.0, 10.0, 9.0, 4.0, 5.0, 0.0];
pub const MEXICO_COST_ITEMS: [f64; 7] = [35.0, 8.0, 8.0, 7.0, 3.0, 1.0, 15.5];
pub const CHINA_COST_ITEMS: [f64; 7] = [30.0, 4.0, 4.0, 12.0, 4.0, 5.0, 15.0];

pub const US_INITIAL_YIELD: f64 = 0.80;
pub const MEXICO_INITIAL_YIELD: f64 = 0.90;
pub const CHINA_INITIAL_YIELD: f64 = 0.95;
pub const CHINA_TARGET_YIELD: f64 = 0.99;
pub const RAMP_MONTHS: f64 = 6.0;
pub const RAMP_POINTS: usize = 61;
pub const STEP_END_MONTHS: f64 = 7.0;
pub const STEP_POINTS: usize = 71;

//---------------------------------------------------------------------
// Output
//---------------------------------------------------------------------
pub const SCORES_CSV_FILE: &str = "tesla_ahp_scores.csv";
pub const SCORES_PNG_FILE: &str = "tesla_sourcing_scores.png";
pub const SCORES_ZOOMED_PNG_FILE: &str = "tesla_sourcing_scores_zoomed.png";
pub const RAMP_CSV_FILE: &str = "yield_ramp_costs.csv";
pub const RAMP_PNG_FILE: &str = "yield_ramp_costs.png";
pub const STEP_CSV_FILE: &str = "yield_step_costs.csv";
pub const STEP_PNG_FILE: &str = "yield_step_costs.png";
pub const SCORE_DECIMALS: i32 = 4;

//---------------------------------------------------------------------
// Chart Geometry
//---------------------------------------------------------------------
pub const CHART_DPI: u32 = 300;
pub const CHART_WIDTH_INCHES: u32 = 10;
pub const CHART_HEIGHT_INCHES: u32 = 6;
pub const LINE_CHART_WIDTH_INCHES: u32 = 8;
pub const LINE_CHART_HEIGHT_INCHES: u32 = 5;
pub const BAR_WIDTH: f64 = 0.25;
pub const ZOOM_Y_FLOOR: f64 = 25.0;
pub const ZOOM_Y_HEADROOM: f64 = 2.0;
