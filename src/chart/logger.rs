//! Tracing setup and per-chart progress logging

use super::reconcile::Join;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber (`RUST_LOG`, default `info`)
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Logger for tick progress of one chart
#[derive(Debug, Clone)]
pub struct ChartLogger {
    chart: &'static str,
}

impl ChartLogger {
    pub fn new(chart: &'static str) -> Self {
        Self { chart }
    }

    pub fn log(&self, message: impl AsRef<str>) {
        tracing::info!(chart = self.chart, "{}", message.as_ref());
    }

    /// One reconciliation cycle
    pub fn tick<K>(&self, index: u64, label: &str, join: &Join<K>) {
        let (enter, update, exit) = join.counts();
        tracing::debug!(
            chart = self.chart,
            tick = index,
            label,
            enter,
            update,
            exit,
            "tick"
        );
    }

    /// Progress through a bounded run
    pub fn progress(&self, done: u64, total: u64) {
        let percent = if total == 0 {
            100.0
        } else {
            done as f64 * 100.0 / total as f64
        };
        tracing::info!(
            chart = self.chart,
            done,
            total,
            "progress {:.0}%",
            percent
        );
    }
}
