//! Mask statistics
//!
//! Reduces the index pair of one scene to summary statistics over three
//! boolean masks:
//!
//! - **water**: water index above its threshold
//! - **non-vegetation**: vegetation index below its threshold
//! - **combined**: both at once
//!
//! Nodata pixels belong to no mask. An empty mask is not an error; its
//! statistics are simply absent.

use crate::imagery::IndexPair;
use lakewatch_core::raster::Raster;
use lakewatch_core::{Algorithm, Error, Result};
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

/// Thresholds defining the water and non-vegetation masks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonalParams {
    /// A pixel is water when its water index is strictly above this value
    pub water_threshold: f64,
    /// A pixel is non-vegetated when its vegetation index is strictly below this value
    pub vegetation_threshold: f64,
}

impl Default for ZonalParams {
    fn default() -> Self {
        Self {
            water_threshold: 0.0,
            vegetation_threshold: 0.0,
        }
    }
}

/// Min / max / mean of one index over one mask
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Statistics of one mask
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MaskSummary {
    pub pixel_count: usize,
    /// Water index over the mask, `None` when the mask is empty
    pub water_index: Option<IndexStats>,
    /// Vegetation index over the mask, `None` when the mask is empty
    pub vegetation_index: Option<IndexStats>,
}

impl MaskSummary {
    pub fn is_present(&self) -> bool {
        self.pixel_count > 0
    }
}

/// Statistics of the three masks of one scene
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZonalStats {
    pub water: MaskSummary,
    pub non_vegetation: MaskSummary,
    pub combined: MaskSummary,
    /// Pixels outside the nodata mask
    pub valid_pixels: usize,
}

impl ZonalStats {
    /// Representative water index of the scene.
    ///
    /// Combined-mask mean, else water-mask mean, else `0.0`.
    pub fn mean_water_index(&self) -> f64 {
        self.combined
            .water_index
            .or(self.water.water_index)
            .map_or(0.0, |s| s.mean)
    }

    /// Representative vegetation index of the scene.
    ///
    /// Combined-mask mean, else non-vegetation-mask mean, else `0.0`.
    pub fn mean_vegetation_index(&self) -> f64 {
        self.combined
            .vegetation_index
            .or(self.non_vegetation.vegetation_index)
            .map_or(0.0, |s| s.mean)
    }
}

/// The three boolean masks of one scene
#[derive(Debug, Clone)]
pub struct SceneMasks {
    pub water: Array2<bool>,
    pub non_vegetation: Array2<bool>,
    pub combined: Array2<bool>,
}

/// Statistics together with the masks they were computed over
#[derive(Debug, Clone)]
pub struct MaskStatistics {
    pub stats: ZonalStats,
    pub masks: SceneMasks,
}

/// Build the water, non-vegetation and combined masks and summarize both
/// indices over each of them.
///
/// # Arguments
/// * `water_index` - NDWI grid
/// * `vegetation_index` - NDVI grid
/// * `nodata` - `true` where the pixel carries no data
/// * `params` - Mask thresholds
///
/// # Errors
/// [`Error::SizeMismatch`] when the three inputs do not share a shape.
pub fn mask_statistics(
    water_index: &Raster<f64>,
    vegetation_index: &Raster<f64>,
    nodata: &Array2<bool>,
    params: &ZonalParams,
) -> Result<MaskStatistics> {
    water_index.ensure_same_shape(vegetation_index)?;

    let (rows, cols) = water_index.shape();
    if nodata.dim() != (rows, cols) {
        let (ar, ac) = nodata.dim();
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar,
            ac,
        });
    }

    let mut water = Array2::from_elem((rows, cols), false);
    let mut non_vegetation = Array2::from_elem((rows, cols), false);

    Zip::from(&mut water)
        .and(&mut non_vegetation)
        .and(water_index.data())
        .and(vegetation_index.data())
        .and(nodata)
        .for_each(|w, nv, &wi, &vi, &nd| {
            *w = !nd && wi > params.water_threshold;
            *nv = !nd && vi < params.vegetation_threshold;
        });

    let combined = Zip::from(&water)
        .and(&non_vegetation)
        .map_collect(|&w, &nv| w && nv);

    let stats = ZonalStats {
        water: summarize(water_index, vegetation_index, &water),
        non_vegetation: summarize(water_index, vegetation_index, &non_vegetation),
        combined: summarize(water_index, vegetation_index, &combined),
        valid_pixels: nodata.iter().filter(|&&n| !n).count(),
    };

    Ok(MaskStatistics {
        stats,
        masks: SceneMasks {
            water,
            non_vegetation,
            combined,
        },
    })
}

/// [`mask_statistics`] over an [`IndexPair`]
pub struct ZonalAggregator;

impl Algorithm for ZonalAggregator {
    type Input = IndexPair;
    type Output = MaskStatistics;
    type Params = ZonalParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ZonalAggregator"
    }

    fn description(&self) -> &'static str {
        "Summarize water and vegetation indices over water, non-vegetation and combined masks"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        mask_statistics(&input.water, &input.vegetation, &input.nodata, &params)
    }
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    #[inline]
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(self) -> Option<IndexStats> {
        (self.count > 0).then(|| IndexStats {
            min: self.min,
            max: self.max,
            mean: self.sum / self.count as f64,
        })
    }
}

fn summarize(
    water_index: &Raster<f64>,
    vegetation_index: &Raster<f64>,
    mask: &Array2<bool>,
) -> MaskSummary {
    let mut water = Accumulator::new();
    let mut vegetation = Accumulator::new();

    Zip::from(mask)
        .and(water_index.data())
        .and(vegetation_index.data())
        .for_each(|&m, &wi, &vi| {
            if m {
                water.push(wi);
                vegetation.push(vi);
            }
        });

    MaskSummary {
        pixel_count: water.count,
        water_index: water.finish(),
        vegetation_index: vegetation.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakewatch_core::GeoTransform;

    fn grid(rows: usize, cols: usize, values: &[f64]) -> Raster<f64> {
        let mut r = Raster::from_vec(values.to_vec(), rows, cols).unwrap();
        r.set_transform(GeoTransform::new(0.0, rows as f64 * 30.0, 30.0, -30.0));
        r
    }

    fn no_nodata(rows: usize, cols: usize) -> Array2<bool> {
        Array2::from_elem((rows, cols), false)
    }

    #[test]
    fn test_masks_and_counts() {
        // water: wi > 0 ; non-veg: vi < 0
        let wi = grid(2, 3, &[0.3, 0.2, -0.1, 0.4, -0.2, 0.1]);
        let vi = grid(2, 3, &[-0.2, 0.1, -0.3, -0.1, 0.2, 0.05]);

        let out = mask_statistics(&wi, &vi, &no_nodata(2, 3), &ZonalParams::default()).unwrap();
        let s = out.stats;

        assert_eq!(s.water.pixel_count, 4);
        assert_eq!(s.non_vegetation.pixel_count, 3);
        assert_eq!(s.combined.pixel_count, 2);
        assert_eq!(s.valid_pixels, 6);

        let combined_wi = s.combined.water_index.unwrap();
        assert!((combined_wi.mean - 0.35).abs() < 1e-10);
        assert!((combined_wi.min - 0.3).abs() < 1e-10);
        assert!((combined_wi.max - 0.4).abs() < 1e-10);

        let combined_vi = s.combined.vegetation_index.unwrap();
        assert!((combined_vi.mean - (-0.15)).abs() < 1e-10);

        assert!(out.masks.combined[(0, 0)]);
        assert!(!out.masks.combined[(0, 1)]);
    }

    #[test]
    fn test_combined_is_subset() {
        let wi = grid(3, 3, &[0.5, -0.5, 0.1, 0.0, 0.2, -0.1, 0.3, 0.3, 0.9]);
        let vi = grid(3, 3, &[-0.1, -0.2, 0.4, -0.3, 0.0, -0.1, 0.2, -0.4, -0.6]);

        let out = mask_statistics(&wi, &vi, &no_nodata(3, 3), &ZonalParams::default()).unwrap();
        let s = out.stats;
        assert!(s.combined.pixel_count <= s.water.pixel_count.min(s.non_vegetation.pixel_count));

        Zip::from(&out.masks.combined)
            .and(&out.masks.water)
            .and(&out.masks.non_vegetation)
            .for_each(|&c, &w, &nv| {
                if c {
                    assert!(w && nv);
                }
            });
    }

    #[test]
    fn test_nodata_excluded() {
        let wi = grid(2, 2, &[0.5, 0.5, 0.5, 0.5]);
        let vi = grid(2, 2, &[-0.5, -0.5, -0.5, -0.5]);
        let mut nodata = no_nodata(2, 2);
        nodata[(0, 0)] = true;
        nodata[(1, 1)] = true;

        let s = mask_statistics(&wi, &vi, &nodata, &ZonalParams::default())
            .unwrap()
            .stats;
        assert_eq!(s.water.pixel_count, 2);
        assert_eq!(s.non_vegetation.pixel_count, 2);
        assert_eq!(s.combined.pixel_count, 2);
        assert_eq!(s.valid_pixels, 2);
    }

    #[test]
    fn test_all_nodata_scene() {
        let wi = grid(2, 2, &[0.5, 0.5, 0.5, 0.5]);
        let vi = grid(2, 2, &[-0.5, -0.5, -0.5, -0.5]);
        let nodata = Array2::from_elem((2, 2), true);

        let s = mask_statistics(&wi, &vi, &nodata, &ZonalParams::default())
            .unwrap()
            .stats;
        assert_eq!(s.combined.pixel_count, 0);
        assert!(s.combined.water_index.is_none());
        assert!(s.water.vegetation_index.is_none());
        assert_eq!(s.mean_water_index(), 0.0);
        assert_eq!(s.mean_vegetation_index(), 0.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        // zero-denominator pixels have index exactly 0 and belong to neither mask
        let wi = grid(1, 2, &[0.0, 0.0]);
        let vi = grid(1, 2, &[0.0, 0.0]);

        let s = mask_statistics(&wi, &vi, &no_nodata(1, 2), &ZonalParams::default())
            .unwrap()
            .stats;
        assert!(!s.water.is_present());
        assert!(!s.non_vegetation.is_present());
    }

    #[test]
    fn test_mean_fallback_chain() {
        // water pixels exist but none are non-vegetated
        let wi = grid(1, 3, &[0.2, 0.4, -0.3]);
        let vi = grid(1, 3, &[0.1, 0.3, -0.5]);

        let s = mask_statistics(&wi, &vi, &no_nodata(1, 3), &ZonalParams::default())
            .unwrap()
            .stats;
        assert_eq!(s.combined.pixel_count, 0);
        assert!((s.mean_water_index() - 0.3).abs() < 1e-10);
        assert!((s.mean_vegetation_index() - (-0.5)).abs() < 1e-10);
    }

    #[test]
    fn test_shape_mismatch() {
        let wi = grid(2, 2, &[0.0; 4]);
        let vi = grid(2, 2, &[0.0; 4]);
        let nodata = no_nodata(3, 2);
        assert!(matches!(
            mask_statistics(&wi, &vi, &nodata, &ZonalParams::default()),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_custom_thresholds() {
        let wi = grid(1, 3, &[0.05, 0.15, 0.25]);
        let vi = grid(1, 3, &[-0.05, -0.15, -0.25]);
        let params = ZonalParams {
            water_threshold: 0.1,
            vegetation_threshold: -0.1,
        };

        let s = mask_statistics(&wi, &vi, &no_nodata(1, 3), &params)
            .unwrap()
            .stats;
        assert_eq!(s.water.pixel_count, 2);
        assert_eq!(s.non_vegetation.pixel_count, 2);
        assert_eq!(s.combined.pixel_count, 2);
    }
}
