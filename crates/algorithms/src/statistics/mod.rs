//! Statistical analysis of index rasters
//!
//! - **zonal**: Statistics of the water and vegetation indices over the
//!   water, non-vegetation and combined masks

pub mod zonal;

pub use zonal::{
    mask_statistics, IndexStats, MaskStatistics, MaskSummary, SceneMasks, ZonalAggregator,
    ZonalParams, ZonalStats,
};
