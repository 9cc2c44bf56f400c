//! Query dispatch against the fixed corpus.
//!
//! run(config):
//!   1. keep hypotheses sharing at least one domain with the selection
//!   2. truncate to max(1, ceil(depth / 25)) items
//!   3. shape by output format
//!
//! ranked   → confidence descending (stable)
//! detailed → corpus order, every field
//! compact  → confidence descending, sources dropped

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crup_common::{Hypothesis, OutputFormat, QueryConfig, Result};

use crate::corpus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuerySettings {
    /// Artificial delay before results come back.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

fn default_latency_ms() -> u64 { 700 }

impl Default for QuerySettings {
    fn default() -> Self {
        Self { latency_ms: default_latency_ms() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub query: String,
    pub format: OutputFormat,
    pub results: Vec<Hypothesis>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct QueryDispatcher {
    settings: QuerySettings,
}

impl QueryDispatcher {
    pub fn new(settings: QuerySettings) -> Self {
        Self { settings }
    }

    /// Validate, wait out the simulated latency, then select.
    #[instrument(skip(self, config), fields(depth = config.depth, format = config.format.as_str()))]
    pub async fn run(&self, config: &QueryConfig) -> Result<QueryOutcome> {
        config.validate()?;
        let t0 = Instant::now();

        if self.settings.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.settings.latency_ms)).await;
        }

        let results = select(config, Utc::now().timestamp_millis());
        let duration_ms = t0.elapsed().as_millis() as u64;
        info!(
            query = %config.text,
            domains = config.selected_domain_ids.len(),
            n = results.len(),
            duration_ms,
            "Correlation query complete"
        );

        Ok(QueryOutcome {
            query: config.text.clone(),
            format: config.format,
            results,
            duration_ms,
        })
    }
}

/// The synchronous core of [`QueryDispatcher::run`]. `stamp` suffixes result ids.
pub fn select(config: &QueryConfig, stamp: i64) -> Vec<Hypothesis> {
    let mut matched: Vec<Hypothesis> = corpus::hypotheses(stamp)
        .into_iter()
        .filter(|h| h.touches_any(&config.selected_domain_ids))
        .collect();

    let limit = config.result_limit().min(matched.len());
    matched.truncate(limit);
    debug!(limit, "Corpus filtered");

    apply_format(matched, config.format)
}

fn apply_format(mut results: Vec<Hypothesis>, format: OutputFormat) -> Vec<Hypothesis> {
    match format {
        OutputFormat::Detailed => {}
        OutputFormat::Ranked => sort_by_confidence(&mut results),
        OutputFormat::Compact => {
            sort_by_confidence(&mut results);
            for h in &mut results {
                h.sources.clear();
            }
        }
    }
    results
}

/// Highest confidence first. Ties keep their relative order.
pub fn sort_by_confidence(results: &mut [Hypothesis]) {
    results.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal));
}
