//! # LakeWatch Pipeline
//!
//! Turns a directory of clipped Landsat band rasters into the lake's
//! surface-water history.
//!
//! ```text
//! locate_scenes ─► process_scene (per bundle) ─► TimeSeriesBuilder ─► TimeSeries
//!                    indices → masks → depth         merge, sort        tables, summaries
//! ```
//!
//! - **scene**: per-bundle processing with typed skip reasons
//! - **batch**: sequential or parallel driver over all bundles
//! - **series**: chronological, immutable record sequence
//! - **summary**: yearly, per-model and distribution views
//! - **table**: CSV writers

pub mod batch;
pub mod scene;
pub mod series;
pub mod summary;
pub mod table;

pub use batch::{run, run_batch, BatchReport, ProcessingMode};
pub use scene::{process_scene, read_scene_bands, scene_indices, SceneOutcome, SceneResult, SkipReason};
pub use series::{Season, TimeSeries, TimeSeriesBuilder, TimeSeriesRecord};
pub use summary::{summarize, yearly_summary, IndexRange, SeriesSummary, YearSummary};
