use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};
use tracing_timing::{Builder, Histogram};
use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use std::time::{Duration, Instant};
use std::cell::RefCell;

const HISTOGRAM_LOW_NS: u64 = 1;
const HISTOGRAM_HIGH_NS: u64 = 60_000_000_000;
const HISTOGRAM_SIGFIG: u8 = 3;

// Categories for the different kinds of work the model does
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum OperationCategory {
    Scoring {
        subcategory: ScoringType,
    },
    WeightSearch,
    CostModel,
    FileIO {
        subcategory: FileIOType,
    },
    Other,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum ScoringType {
    Composite,
    Ranking,
    Normalization,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum FileIOType {
    ConfigLoad,
    CsvExport,
    CsvImport,
    ChartRender,
}

impl OperationCategory {
    pub fn as_str(&self) -> String {
        match self {
            OperationCategory::Scoring { subcategory } => {
                format!("Scoring - {}", match subcategory {
                    ScoringType::Composite => "Composite",
                    ScoringType::Ranking => "Ranking",
                    ScoringType::Normalization => "Normalization",
                })
            },
            OperationCategory::WeightSearch => "Weight Search".to_string(),
            OperationCategory::CostModel => "Cost Model".to_string(),
            OperationCategory::FileIO { subcategory } => {
                format!("File I/O - {}", match subcategory {
                    FileIOType::ConfigLoad => "Config Load",
                    FileIOType::CsvExport => "CSV Export",
                    FileIOType::CsvImport => "CSV Import",
                    FileIOType::ChartRender => "Chart Render",
                })
            },
            OperationCategory::Other => "Other Operations".to_string(),
        }
    }
}

thread_local! {
    static TIMING_STACK: RefCell<Vec<(String, OperationCategory, Instant)>> = RefCell::new(Vec::new());
}

lazy_static! {
    static ref TIMING_ENABLED: AtomicBool = AtomicBool::new(false);
    static ref FUNCTION_TIMINGS: Arc<RwLock<HashMap<String, Histogram<u64>>>> = Arc::new(RwLock::new(HashMap::new()));
    static ref CATEGORY_TIMINGS: Arc<RwLock<HashMap<OperationCategory, Histogram<u64>>>> = Arc::new(RwLock::new(HashMap::new()));
    static ref HIERARCHICAL_TIMINGS: Arc<RwLock<HashMap<String, (Duration, usize, Vec<String>)>>> = Arc::new(RwLock::new(HashMap::new()));
}

/// Records the elapsed time of a scope when dropped.
pub struct TimingGuard {
    function_name: String,
    category: OperationCategory,
    start: Instant,
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        record_timing_end(&self.function_name, duration, &self.category);
    }
}

pub fn start_timing(function_name: &str, category: OperationCategory) -> TimingGuard {
    let guard = TimingGuard {
        function_name: function_name.to_string(),
        category: category.clone(),
        start: Instant::now(),
    };

    TIMING_STACK.with(|stack| {
        stack.borrow_mut().push((function_name.to_string(), category, Instant::now()));
    });

    guard
}

fn new_histogram() -> Option<Histogram<u64>> {
    Histogram::<u64>::new_with_bounds(HISTOGRAM_LOW_NS, HISTOGRAM_HIGH_NS, HISTOGRAM_SIGFIG).ok()
}

fn record_timing_end(function_name: &str, duration: Duration, category: &OperationCategory) {
    // The stack is popped even when timing is off so nested guards stay balanced
    let parent = TIMING_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.pop();
        stack.last().map(|(name, _, _)| name.clone())
    });

    if !is_timing_enabled() {
        return;
    }

    let duration_ns = duration.as_nanos().min(u128::from(HISTOGRAM_HIGH_NS)) as u64;

    {
        let mut hierarchical = HIERARCHICAL_TIMINGS.write();
        let entry = hierarchical
            .entry(function_name.to_string())
            .or_insert((Duration::from_nanos(0), 0, Vec::new()));

        entry.0 += duration;
        entry.1 += 1;

        if let Some(parent_name) = parent {
            if !entry.2.contains(&parent_name) {
                entry.2.push(parent_name);
            }
        }
    }

    {
        let mut timings = FUNCTION_TIMINGS.write();
        if !timings.contains_key(function_name) {
            if let Some(histogram) = new_histogram() {
                timings.insert(function_name.to_string(), histogram);
            }
        }
        if let Some(histogram) = timings.get_mut(function_name) {
            let _ = histogram.record(duration_ns.max(HISTOGRAM_LOW_NS));
        }
    }

    {
        let mut category_timings = CATEGORY_TIMINGS.write();
        if !category_timings.contains_key(category) {
            if let Some(histogram) = new_histogram() {
                category_timings.insert(category.clone(), histogram);
            }
        }
        if let Some(histogram) = category_timings.get_mut(category) {
            let _ = histogram.record(duration_ns.max(HISTOGRAM_LOW_NS));
        }
    }
}

/// Installs the global tracing subscriber.
///
/// Log lines go to stderr so the tables printed on stdout stay clean.
pub fn init_logging(enable_timing: bool, debug_logging: bool) -> anyhow::Result<()> {
    TIMING_ENABLED.store(enable_timing, Ordering::SeqCst);

    let crate_level = if debug_logging { "sourcing_model=debug" } else { "sourcing_model=info" };
    let env_filter = EnvFilter::from_default_env()
        .add_directive(Level::INFO.into())
        .add_directive(crate_level.parse()?);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(debug_logging)
        .with_writer(std::io::stderr);

    if enable_timing {
        let timing_layer = Builder::default().layer(|| {
            Histogram::<u64>::new_with_bounds(HISTOGRAM_LOW_NS, HISTOGRAM_HIGH_NS, HISTOGRAM_SIGFIG)
                .expect("histogram bounds are constant and valid")
        });

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(timing_layer.boxed());

        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer);

        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

pub fn is_timing_enabled() -> bool {
    TIMING_ENABLED.load(Ordering::SeqCst)
}

pub fn print_timing_report() {
    if !is_timing_enabled() {
        return;
    }

    println!("\nDetailed Performance Report");
    println!("==========================");

    println!("\nHierarchical Timing Analysis:");
    println!("---------------------------");
    let hierarchical = HIERARCHICAL_TIMINGS.read();
    let mut entries: Vec<_> = hierarchical.iter().collect();
    entries.sort_by(|a, b| b.1.0.cmp(&a.1.0));

    for (function_name, (total_duration, count, parents)) in entries {
        let avg_duration = total_duration.div_f64((*count).max(1) as f64);
        println!(
            "{}: total={:.4}s, count={}, avg={:.3}ms{}",
            function_name,
            total_duration.as_secs_f64(),
            count,
            avg_duration.as_secs_f64() * 1000.0,
            if !parents.is_empty() {
                format!("\n  Called by: {}", parents.join(", "))
            } else {
                String::new()
            }
        );
    }

    println!("\nPerformance by Category:");
    println!("------------------------");
    let category_timings = CATEGORY_TIMINGS.read();
    let mut category_vec: Vec<_> = category_timings.iter().collect();
    category_vec.sort_by(|a, b| b.1.mean().total_cmp(&a.1.mean()));

    let total_time: f64 = category_vec.iter()
        .map(|(_, hist)| hist.mean() * (hist.len() as f64))
        .sum();

    for (category, histogram) in category_vec {
        let category_total = histogram.mean() * (histogram.len() as f64);
        let percentage = if total_time > 0.0 { (category_total / total_time) * 100.0 } else { 0.0 };
        println!(
            "{}: {:.1}% of total time\n  mean={:.3}ms, p95={:.3}ms, p99={:.3}ms, count={}",
            category.as_str(),
            percentage,
            histogram.mean() / 1_000_000.0,
            histogram.value_at_quantile(0.95) as f64 / 1_000_000.0,
            histogram.value_at_quantile(0.99) as f64 / 1_000_000.0,
            histogram.len(),
        );
    }

    println!("==========================\n");
}
