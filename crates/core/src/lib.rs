//! # LakeWatch Core
//!
//! Core types and I/O for the LakeWatch lake-history pipeline.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type with a nodata sentinel
//! - `GeoTransform`: Affine transformation for georeferencing
//! - Native GeoTIFF reading/writing
//! - Scene discovery: sensor/band identification and per-date grouping

pub mod error;
pub mod io;
pub mod raster;
pub mod scene;

pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use scene::{BandId, BandRole, BandRoleTable, BandRoles, SceneBundle, SceneKey, Sensor};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::scene::{BandId, BandRoleTable, BandRoles, SceneBundle, SceneKey, Sensor};
    pub use crate::Algorithm;
}

/// Common interface of the per-scene processing stages.
///
/// Each stage is a pure transformation of its input under a parameter set;
/// the free functions in `lakewatch-algorithms` are the implementations, this
/// trait names them uniformly.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
