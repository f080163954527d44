//! Imagery analysis algorithms
//!
//! Spectral indices used to separate open water from its surroundings:
//! - Normalized difference with the zero-denominator convention
//! - NDWI (green/NIR) and NDVI (NIR/red)
//! - Scene index pair with the green-band nodata mask

mod indices;

pub use indices::{
    compute_indices, ndvi, ndwi, normalized_difference, normalized_pair, IndexPair,
    IndexParams, SceneBands, SpectralIndex, WaterIndices,
};
