//! Depth, volume and water-level estimation
//!
//! Five heuristic sub-models each turn one scene signal into a mean depth:
//!
//! | Sub-model | Signal | Basin assumption |
//! |---|---|---|
//! | area-linear | surface area | depth proportional to area |
//! | area-sqrt | surface area | bowl-shaped basin |
//! | area-log | surface area | accelerated shrinkage near desiccation |
//! | index-water | mean NDWI | water index rises with water column |
//! | index-vegetation | mean NDVI | negative NDVI marks open water |
//!
//! A weighted ensemble reconciles them into the composite depth; volume and
//! the discrete water level follow from area and composite depth.

mod ensemble;
mod level;
mod models;

pub use ensemble::{
    estimate, estimate_depth, volume_million_m3, DepthEnsemble, DepthEstimate, EstimateInput,
    EstimatorParams, LakeEstimate,
};
pub use level::{DepthCategory, LevelThresholds, WaterLevel};
pub use models::{
    area_linear_depth, area_log_depth, area_sqrt_depth, index_vegetation_depth,
    index_water_depth, DepthParams, EnsembleWeights, SubModel, SubModelScales,
};
