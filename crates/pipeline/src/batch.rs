//! Batch driver
//!
//! Maps [`process_scene`] over every bundle, either sequentially or on a
//! rayon pool, then merges the outcomes into a single [`TimeSeries`] in one
//! place. Scenes share nothing but the read-only configuration.

use crate::scene::{process_scene, SceneOutcome, SceneResult, SkipReason};
use crate::series::{TimeSeries, TimeSeriesBuilder, TimeSeriesRecord};
use crate::summary::{summarize, SeriesSummary};
use lakewatch_algorithms::LakeConfig;
use lakewatch_core::scene::{locate_scenes, SceneBundle, SceneKey};
use lakewatch_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{error, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How scenes are distributed over threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// One scene after another on the calling thread
    Sequential,
    /// All available cores
    #[default]
    Parallel,
    /// A dedicated pool with the given number of threads
    ParallelWith(usize),
}

impl ProcessingMode {
    /// Map `f` over `items`, preserving order.
    ///
    /// Without the `parallel` feature every mode runs sequentially.
    pub fn map<T, U, F>(&self, items: &[T], f: F) -> Result<Vec<U>>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        match self {
            ProcessingMode::Sequential => Ok(items.iter().map(f).collect()),
            #[cfg(feature = "parallel")]
            ProcessingMode::Parallel => Ok(items.par_iter().map(f).collect()),
            #[cfg(feature = "parallel")]
            ProcessingMode::ParallelWith(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*threads)
                    .build()
                    .map_err(|e| Error::Other(format!("Cannot build thread pool: {}", e)))?;
                Ok(pool.install(|| items.par_iter().map(f).collect()))
            }
            #[cfg(not(feature = "parallel"))]
            ProcessingMode::Parallel | ProcessingMode::ParallelWith(_) => {
                Ok(items.iter().map(f).collect())
            }
        }
    }
}

/// Everything one batch run produced
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Chronological lake history
    pub series: TimeSeries,
    /// Per-scene results in (date, sensor) order
    pub scenes: Vec<SceneResult>,
    /// Scenes that produced no record
    pub skipped: Vec<(SceneKey, SkipReason)>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.scenes.len()
    }

    pub fn summary(&self) -> SeriesSummary {
        summarize(&self.series, &self.scenes)
    }
}

/// Process every bundle and assemble the time series.
///
/// `on_scene` is called once per finished scene, from worker threads in
/// parallel mode.
pub fn run_batch<F>(
    bundles: &BTreeMap<SceneKey, SceneBundle>,
    config: &LakeConfig,
    mode: ProcessingMode,
    on_scene: F,
) -> Result<BatchReport>
where
    F: Fn(&SceneOutcome) + Sync + Send,
{
    let bundles: Vec<&SceneBundle> = bundles.values().collect();
    info!(scenes = bundles.len(), ?mode, "starting batch");

    let outcomes = mode.map(&bundles, |bundle| {
        let outcome = process_scene(bundle, config);
        on_scene(&outcome);
        outcome
    })?;

    let mut report = BatchReport::default();
    let mut builder = TimeSeriesBuilder::new();

    for outcome in outcomes {
        match outcome {
            SceneOutcome::Processed(result) => {
                builder.push(TimeSeriesRecord::from_scene(&result));
                report.scenes.push(*result);
            }
            SceneOutcome::Skipped { key, reason } => {
                if reason.is_expected() {
                    warn!(scene = %key, "skipped: {}", reason);
                } else {
                    error!(scene = %key, "skipped: {}", reason);
                }
                report.skipped.push((key, reason));
            }
        }
    }

    report.series = builder.finish();

    if report.series.is_empty() {
        warn!("no scene could be processed; the series is empty");
    } else {
        info!(
            processed = report.processed(),
            skipped = report.skipped.len(),
            "batch complete"
        );
    }
    Ok(report)
}

/// Discover, group and process every scene under `root`.
///
/// Only an empty or missing corpus is an error.
pub fn run(root: &Path, config: &LakeConfig, mode: ProcessingMode) -> Result<BatchReport> {
    let bundles = locate_scenes(root)?;
    run_batch(&bundles, config, mode, |_| {})
}
