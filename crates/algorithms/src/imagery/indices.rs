//! Water and vegetation indices
//!
//! Both indices are normalized differences of two single-band rasters.
//! Unlike a general-purpose index, a zero denominator (both bands zero)
//! yields exactly `0.0`: padding outside the clipped lake boundary is zero in
//! every band, and those pixels must stay finite so that masks built from the
//! indices behave predictably. Nodata is not applied here; it travels
//! alongside the grids as a boolean mask.

use crate::maybe_rayon::*;
use lakewatch_core::raster::Raster;
use lakewatch_core::{Algorithm, Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Enumeration of the computed spectral indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralIndex {
    /// Normalized Difference Water Index (McFeeters): (Green - NIR) / (Green + NIR)
    Ndwi,
    /// Normalized Difference Vegetation Index: (NIR - Red) / (NIR + Red)
    Ndvi,
}

impl SpectralIndex {
    pub fn short_name(self) -> &'static str {
        match self {
            SpectralIndex::Ndwi => "ndwi",
            SpectralIndex::Ndvi => "ndvi",
        }
    }
}

// ---------------------------------------------------------------------------
// Normalized difference
// ---------------------------------------------------------------------------

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// The result lies in [-1, 1] for non-negative reflectances. Where the
/// denominator is exactly zero the result is `0.0`, never NaN or infinity.
///
/// # Arguments
/// * `band_a` - Numerator positive band
/// * `band_b` - Numerator negative band
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    band_a.ensure_same_shape(band_b)?;

    let (rows, cols) = band_a.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                // SAFETY: row < rows and col < cols, shapes checked above
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };
                *out = normalized_pair(a, b);
            }
            row_data
        })
        .collect();

    build_output(band_a, rows, cols, data)
}

/// Per-pixel normalized difference with the zero-denominator convention
#[inline]
pub fn normalized_pair(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum == 0.0 {
        0.0
    } else {
        (a - b) / sum
    }
}

/// Normalized Difference Water Index (McFeeters, 1996)
///
/// `NDWI = (Green - NIR) / (Green + NIR)`
///
/// Positive values indicate open water.
pub fn ndwi(green: &Raster<f64>, nir: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(green, nir)
}

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// Negative values indicate water or bare, non-vegetated surfaces.
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, red)
}

// ---------------------------------------------------------------------------
// Scene index pair
// ---------------------------------------------------------------------------

/// Parameters for the scene index computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexParams {
    /// Sentinel used when the green band declares no nodata value
    pub nodata_default: f64,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self { nodata_default: 0.0 }
    }
}

/// The three co-registered bands of one scene
#[derive(Debug, Clone)]
pub struct SceneBands {
    pub green: Raster<f64>,
    pub red: Raster<f64>,
    pub nir: Raster<f64>,
}

/// Water and vegetation index grids of one scene plus its nodata mask
#[derive(Debug, Clone)]
pub struct IndexPair {
    /// NDWI over the full raster
    pub water: Raster<f64>,
    /// NDVI over the full raster
    pub vegetation: Raster<f64>,
    /// `true` where the green band holds the nodata sentinel
    pub nodata: Array2<bool>,
    /// Sentinel the mask was derived from
    pub sentinel: f64,
}

impl IndexPair {
    /// Number of pixels not flagged as nodata
    pub fn valid_pixels(&self) -> usize {
        self.nodata.iter().filter(|&&n| !n).count()
    }

    /// Copy of one index grid with nodata pixels set to NaN, for export
    pub fn masked(&self, index: SpectralIndex) -> Raster<f64> {
        let source = match index {
            SpectralIndex::Ndwi => &self.water,
            SpectralIndex::Ndvi => &self.vegetation,
        };
        let mut out = source.clone();
        out.data_mut()
            .zip_mut_with(&self.nodata, |v, &nd| {
                if nd {
                    *v = f64::NAN;
                }
            });
        out.set_nodata(Some(f64::NAN));
        out
    }
}

/// Compute NDWI, NDVI and the nodata mask for one scene.
///
/// The sentinel comes from the green band's declared nodata, falling back to
/// `params.nodata_default`. All three bands must share the same shape.
pub fn compute_indices(bands: &SceneBands, params: &IndexParams) -> Result<IndexPair> {
    let SceneBands { green, red, nir } = bands;
    green.ensure_same_shape(red)?;
    green.ensure_same_shape(nir)?;

    let sentinel = green.nodata().unwrap_or(params.nodata_default);
    let nodata = green.mask_equal(sentinel);

    Ok(IndexPair {
        water: ndwi(green, nir)?,
        vegetation: ndvi(nir, red)?,
        nodata,
        sentinel,
    })
}

/// [`compute_indices`] as an [`Algorithm`]
pub struct WaterIndices;

impl Algorithm for WaterIndices {
    type Input = SceneBands;
    type Output = IndexPair;
    type Params = IndexParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "WaterIndices"
    }

    fn description(&self) -> &'static str {
        "Compute NDWI and NDVI with a green-band nodata mask"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        compute_indices(&input, &params)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_output(
    template: &Raster<f64>,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
) -> Result<Raster<f64>> {
    let mut output = template.with_same_meta::<f64>(rows, cols);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
