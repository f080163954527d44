//! # LakeWatch Algorithms
//!
//! Per-scene analysis stages of the LakeWatch pipeline.
//!
//! ## Modules
//!
//! - **imagery**: NDWI / NDVI and the scene index pair
//! - **statistics**: Index statistics over water, non-vegetation and combined masks
//! - **depth**: Five-model depth ensemble, volume and water-level state
//! - **config**: TOML configuration holding every calibration constant

pub mod config;
pub mod depth;
pub mod imagery;
pub mod statistics;

mod maybe_rayon;

pub use config::LakeConfig;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::LakeConfig;
    pub use crate::depth::{
        estimate, estimate_depth, volume_million_m3, DepthCategory, DepthEnsemble,
        DepthEstimate, DepthParams, EstimateInput, EstimatorParams, LakeEstimate,
        LevelThresholds, SubModel, WaterLevel,
    };
    pub use crate::imagery::{
        compute_indices, ndvi, ndwi, normalized_difference, IndexPair, IndexParams,
        SceneBands, SpectralIndex, WaterIndices,
    };
    pub use crate::statistics::{
        mask_statistics, MaskStatistics, MaskSummary, ZonalAggregator, ZonalParams, ZonalStats,
    };
    pub use lakewatch_core::prelude::*;
}
