//! PNG charts for the score table and the cost projections.
//!
//! Text is rendered with a bundled DejaVu Sans face registered under the
//! `sans-serif` family on first use.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use plotters::prelude::*;
use plotters::style::register_font;
use tracing::info;

use crate::config::constants::*;
use crate::core::cost_model::CostProjection;
use crate::core::scoring::{Period, ScoreTable};
use crate::error::{ModelError, ModelResult};
use crate::utils::logging::{self, FileIOType, OperationCategory};

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

const SCORE_CHART_TITLE: &str = "Sourcing Decision Model";
const ZOOMED_CHART_TITLE: &str = "Sourcing Decision Model (Zoomed View)";

const CAPTION_SIZE: u32 = 64;
const LABEL_SIZE: u32 = 40;
const AXIS_DESC_SIZE: u32 = 46;
const CHART_MARGIN: u32 = 60;
const X_LABEL_AREA: u32 = 120;
const Y_LABEL_AREA: u32 = 170;
const BAR_ALPHA: f64 = 0.85;
const GRID_ALPHA: f64 = 0.3;
const LEGEND_ALPHA: f64 = 0.95;
const EDGE_WIDTH: u32 = 4;
const LINE_WIDTH: u32 = 6;
const SWATCH: i32 = 18;

const FALLBACK_COLORS: [RGBColor; 4] = [
    RGBColor(0xF4, 0xA2, 0x61),
    RGBColor(0x26, 0x46, 0x53),
    RGBColor(0xE9, 0xC4, 0x6A),
    RGBColor(0x8D, 0x99, 0xAE),
];

lazy_static! {
    static ref FONT_READY: bool = register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok();
}

fn ensure_font() -> ModelResult<()> {
    if *FONT_READY {
        Ok(())
    } else {
        Err(ModelError::PlotError("bundled chart font could not be loaded".to_string()))
    }
}

fn plot_err<E: std::fmt::Display>(err: E) -> ModelError {
    ModelError::PlotError(err.to_string())
}

/// Colour for a country, stable across both periods and both charts.
pub fn country_color(name: &str, index: usize) -> RGBColor {
    match name {
        CHINA => RGBColor(0xE6, 0x39, 0x46),
        USA | "US" => RGBColor(0x45, 0x7B, 0x9D),
        MEXICO => RGBColor(0x2A, 0x9D, 0x8F),
        _ => FALLBACK_COLORS[index % FALLBACK_COLORS.len()],
    }
}

fn line_color(name: &str, index: usize) -> RGBColor {
    match name {
        "US" | USA => RGBColor(65, 105, 225),
        MEXICO => RGBColor(0, 128, 0),
        CHINA => RGBColor(255, 0, 0),
        _ => FALLBACK_COLORS[index % FALLBACK_COLORS.len()],
    }
}

/// Where one bar sits on the data axes.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPlacement {
    pub country: String,
    pub country_index: usize,
    pub period: Period,
    pub x_center: f64,
    pub value: f64,
}

/// Bars grouped by period. Inside each group the bars follow that period's
/// own ranking, lowest score on the left.
pub fn bar_layout(table: &ScoreTable) -> Vec<BarPlacement> {
    let n = table.rows.len();
    let mid = (n as f64 - 1.0) / 2.0;
    let mut bars = Vec::with_capacity(n * Period::ALL.len());

    for (group, period) in Period::ALL.iter().enumerate() {
        for (position, name) in table.ranking(*period).iter().enumerate() {
            if let Some((country_index, row)) = table.rows.iter().enumerate().find(|(_, r)| &r.name == name) {
                bars.push(BarPlacement {
                    country: name.clone(),
                    country_index,
                    period: *period,
                    x_center: group as f64 + (position as f64 - mid) * BAR_WIDTH,
                    value: row.score(*period),
                });
            }
        }
    }
    bars
}

/// Tick label for the period axis: the period name at each group centre,
/// blank elsewhere.
pub fn period_tick_label(x: f64, threshold_months: u32) -> String {
    let group = x.round();
    if (x - group).abs() > 1e-6 || group < 0.0 {
        return String::new();
    }
    Period::ALL
        .get(group as usize)
        .map(|period| period.label(threshold_months))
        .unwrap_or_default()
}

/// Post-step outline of a series: each price holds until the next month.
pub fn step_points(months: &[f64], prices: &[f64]) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(months.len() * 2);
    for (j, (&month, &price)) in months.iter().zip(prices).enumerate() {
        if j > 0 {
            points.push((month, prices[j - 1]));
        }
        points.push((month, price));
    }
    points
}

/// Grouped bar chart of both periods. `y_range` of `None` starts the axis at zero.
pub fn render_score_chart(
    table: &ScoreTable,
    path: &Path,
    title: &str,
    y_range: Option<(f64, f64)>,
) -> ModelResult<()> {
    let _timing = logging::start_timing("render_score_chart",
        OperationCategory::FileIO { subcategory: FileIOType::ChartRender });

    if table.rows.is_empty() {
        return Err(ModelError::EmptyInput("score rows"));
    }
    ensure_font()?;

    let max_score = table.max_score();
    let (y_lo, y_hi) = match y_range {
        Some((lo, hi)) if hi > lo => (lo, hi),
        _ => (ZERO_F64.min(max_score), max_score.max(ONE_F64) * 1.05),
    };
    let x_hi = Period::ALL.len() as f64 - 0.5;

    let size = (CHART_WIDTH_INCHES * CHART_DPI, CHART_HEIGHT_INCHES * CHART_DPI);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{}  |  Weighted Score: {}", title, table.weights.describe()),
            (FONT_FAMILY, CAPTION_SIZE),
        )
        .margin(CHART_MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(-0.5..x_hi, y_lo..y_hi)
        .map_err(plot_err)?;

    let threshold = table.threshold_months;
    let x_formatter = |x: &f64| period_tick_label(*x, threshold);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .max_light_lines(0)
        .bold_line_style(BLACK.mix(GRID_ALPHA))
        .x_label_formatter(&x_formatter)
        .y_desc("Composite Score")
        .label_style((FONT_FAMILY, LABEL_SIZE))
        .axis_desc_style((FONT_FAMILY, AXIS_DESC_SIZE))
        .draw()
        .map_err(plot_err)?;

    let bars = bar_layout(table);
    for (index, row) in table.rows.iter().enumerate() {
        let color = country_color(&row.name, index);
        // bars ending below the floor of a zoomed axis are left out
        let corners: Vec<[(f64, f64); 2]> = bars
            .iter()
            .filter(|bar| bar.country_index == index && bar.value > y_lo)
            .map(|bar| [(bar.x_center - BAR_WIDTH / 2.0, y_lo), (bar.x_center + BAR_WIDTH / 2.0, bar.value)])
            .collect();

        chart
            .draw_series(corners.iter().map(|c| Rectangle::new(*c, color.mix(BAR_ALPHA).filled())))
            .map_err(plot_err)?
            .label(row.name.as_str())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - SWATCH), (x + 2 * SWATCH, y + SWATCH)], color.mix(BAR_ALPHA).filled())
            });
        chart
            .draw_series(corners.iter().map(|c| Rectangle::new(*c, BLACK.stroke_width(EDGE_WIDTH))))
            .map_err(plot_err)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font((FONT_FAMILY, LABEL_SIZE))
        .background_style(WHITE.mix(LEGEND_ALPHA))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    info!("Chart saved as: {}", path.display());
    Ok(())
}

/// Writes the full-range and the zoomed score charts.
pub fn render(table: &ScoreTable, output_dir: &Path) -> ModelResult<(PathBuf, PathBuf)> {
    let full = output_dir.join(SCORES_PNG_FILE);
    render_score_chart(table, &full, SCORE_CHART_TITLE, None)?;

    let zoomed = output_dir.join(SCORES_ZOOMED_PNG_FILE);
    render_score_chart(
        table,
        &zoomed,
        ZOOMED_CHART_TITLE,
        Some((ZOOM_Y_FLOOR, table.max_score() + ZOOM_Y_HEADROOM)),
    )?;

    Ok((full, zoomed))
}

/// Line chart of per-unit price over time. With `steps` the series are drawn
/// as post-steps and `marker` adds a dashed vertical line at that month.
pub fn render_cost_projection(
    projection: &CostProjection,
    path: &Path,
    steps: bool,
    marker: Option<f64>,
) -> ModelResult<()> {
    let _timing = logging::start_timing("render_cost_projection",
        OperationCategory::FileIO { subcategory: FileIOType::ChartRender });

    let (first, last) = match (projection.months.first(), projection.months.last()) {
        (Some(&f), Some(&l)) if l > f => (f, l),
        _ => return Err(ModelError::EmptyInput("projection months")),
    };
    ensure_font()?;

    let (lo, hi) = projection.price_range();
    let pad = ((hi - lo) * 0.05).max(ONE_F64);
    let (y_lo, y_hi) = (lo - pad, hi + pad);

    let size = (LINE_CHART_WIDTH_INCHES * CHART_DPI, LINE_CHART_HEIGHT_INCHES * CHART_DPI);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(projection.title.as_str(), (FONT_FAMILY, CAPTION_SIZE))
        .margin(CHART_MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(first..last, y_lo..y_hi)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .max_light_lines(0)
        .bold_line_style(BLACK.mix(GRID_ALPHA))
        .x_desc("Time (months)")
        .y_desc("Price per unit (USD)")
        .label_style((FONT_FAMILY, LABEL_SIZE))
        .axis_desc_style((FONT_FAMILY, AXIS_DESC_SIZE))
        .draw()
        .map_err(plot_err)?;

    if let Some(month) = marker {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(month, y_lo), (month, y_hi)],
                30,
                20,
                BLACK.stroke_width(3),
            ))
            .map_err(plot_err)?;
    }

    for (i, series) in projection.series.iter().enumerate() {
        let color = line_color(&series.name, i);
        let points = if steps {
            step_points(&projection.months, &series.prices)
        } else {
            projection.months.iter().copied().zip(series.prices.iter().copied()).collect()
        };

        chart
            .draw_series(LineSeries::new(points, color.stroke_width(LINE_WIDTH)))
            .map_err(plot_err)?
            .label(series.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 3 * SWATCH, y)], color.stroke_width(LINE_WIDTH)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT_FAMILY, LABEL_SIZE))
        .background_style(WHITE.mix(LEGEND_ALPHA))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    info!("Chart saved as: {}", path.display());
    Ok(())
}
