//! The five depth sub-models and their calibration

use lakewatch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one depth sub-model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubModel {
    AreaLinear,
    AreaSqrt,
    AreaLog,
    IndexWater,
    IndexVegetation,
}

impl SubModel {
    pub const ALL: [SubModel; 5] = [
        SubModel::AreaLinear,
        SubModel::AreaSqrt,
        SubModel::AreaLog,
        SubModel::IndexWater,
        SubModel::IndexVegetation,
    ];

    /// Output column name of this sub-model's depth
    pub fn column(self) -> &'static str {
        match self {
            SubModel::AreaLinear => "depth_area_linear_m",
            SubModel::AreaSqrt => "depth_area_sqrt_m",
            SubModel::AreaLog => "depth_area_log_m",
            SubModel::IndexWater => "depth_index_water_m",
            SubModel::IndexVegetation => "depth_index_vegetation_m",
        }
    }
}

impl fmt::Display for SubModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubModel::AreaLinear => "area-linear",
            SubModel::AreaSqrt => "area-sqrt",
            SubModel::AreaLog => "area-log",
            SubModel::IndexWater => "index-water",
            SubModel::IndexVegetation => "index-vegetation",
        };
        f.write_str(name)
    }
}

/// Ensemble weight of each sub-model; must sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    pub area_linear: f64,
    pub area_sqrt: f64,
    pub area_log: f64,
    pub index_water: f64,
    pub index_vegetation: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            area_linear: 0.15,
            area_sqrt: 0.30,
            area_log: 0.10,
            index_water: 0.35,
            index_vegetation: 0.10,
        }
    }
}

impl EnsembleWeights {
    pub fn get(&self, model: SubModel) -> f64 {
        match model {
            SubModel::AreaLinear => self.area_linear,
            SubModel::AreaSqrt => self.area_sqrt,
            SubModel::AreaLog => self.area_log,
            SubModel::IndexWater => self.index_water,
            SubModel::IndexVegetation => self.index_vegetation,
        }
    }

    pub fn sum(&self) -> f64 {
        SubModel::ALL.iter().map(|&m| self.get(m)).sum()
    }
}

/// Output scale factor of each sub-model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubModelScales {
    pub area_linear: f64,
    pub area_sqrt: f64,
    pub area_log: f64,
    pub index_water: f64,
    pub index_vegetation: f64,
}

impl Default for SubModelScales {
    fn default() -> Self {
        Self {
            area_linear: 0.8,
            area_sqrt: 0.7,
            area_log: 0.6,
            index_water: 0.9,
            index_vegetation: 0.4,
        }
    }
}

impl SubModelScales {
    pub fn get(&self, model: SubModel) -> f64 {
        match model {
            SubModel::AreaLinear => self.area_linear,
            SubModel::AreaSqrt => self.area_sqrt,
            SubModel::AreaLog => self.area_log,
            SubModel::IndexWater => self.index_water,
            SubModel::IndexVegetation => self.index_vegetation,
        }
    }
}

/// Calibration of the depth sub-models for one lake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthParams {
    /// Surface area at full capacity (km²)
    pub max_area_km2: f64,
    /// Mean depth at full capacity (m)
    pub max_depth_m: f64,
    /// Area at or below which the area sub-models report no depth (km²)
    pub min_area_km2: f64,
    /// Floor applied to the area before the logarithm (km²)
    pub area_epsilon_km2: f64,
    /// Lower end of the calibrated water-index range
    pub ndwi_min: f64,
    /// Upper end of the calibrated water-index range
    pub ndwi_max: f64,
    /// Most negative vegetation index considered; must be below zero
    pub ndvi_floor: f64,
    pub weights: EnsembleWeights,
    pub scales: SubModelScales,
}

impl Default for DepthParams {
    fn default() -> Self {
        Self {
            max_area_km2: 0.55,
            max_depth_m: 12.0,
            min_area_km2: 0.0,
            area_epsilon_km2: 0.001,
            ndwi_min: 0.01,
            ndwi_max: 0.15,
            ndvi_floor: -0.20,
            weights: EnsembleWeights::default(),
            scales: SubModelScales::default(),
        }
    }
}

/// Tolerance on the sum of the ensemble weights
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

impl DepthParams {
    /// Check that the calibration describes a usable model
    pub fn validate(&self) -> Result<()> {
        if !(self.max_area_km2 > 0.0) {
            return Err(invalid("depth.max_area_km2", self.max_area_km2, "must be positive"));
        }
        if !(self.max_depth_m > 0.0) {
            return Err(invalid("depth.max_depth_m", self.max_depth_m, "must be positive"));
        }
        if !(self.min_area_km2 >= 0.0) {
            return Err(invalid("depth.min_area_km2", self.min_area_km2, "must not be negative"));
        }
        if !(self.area_epsilon_km2 > 0.0) {
            return Err(invalid(
                "depth.area_epsilon_km2",
                self.area_epsilon_km2,
                "must be positive",
            ));
        }
        if !(self.ndwi_max > self.ndwi_min) {
            return Err(invalid(
                "depth.ndwi_max",
                self.ndwi_max,
                &format!("must be greater than ndwi_min ({})", self.ndwi_min),
            ));
        }
        if !(self.ndvi_floor < 0.0) {
            return Err(invalid("depth.ndvi_floor", self.ndvi_floor, "must be negative"));
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(invalid("depth.weights", sum, "weights must sum to 1"));
        }
        for model in SubModel::ALL {
            if self.weights.get(model) < 0.0 {
                return Err(invalid(
                    "depth.weights",
                    self.weights.get(model),
                    &format!("{} weight must not be negative", model),
                ));
            }
            if self.scales.get(model) < 0.0 {
                return Err(invalid(
                    "depth.scales",
                    self.scales.get(model),
                    &format!("{} scale must not be negative", model),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: f64, reason: &str) -> Error {
    Error::InvalidParameter {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Sub-models
// ---------------------------------------------------------------------------

#[inline]
fn clamp_depth(depth: f64, params: &DepthParams) -> f64 {
    if depth.is_nan() {
        0.0
    } else {
        depth.clamp(0.0, params.max_depth_m)
    }
}

#[inline]
fn has_surface(area_km2: f64, params: &DepthParams) -> bool {
    // NaN compares false and counts as no surface
    area_km2 > params.min_area_km2
}

/// `max_depth × (area / max_area) × scale`
pub fn area_linear_depth(area_km2: f64, params: &DepthParams) -> f64 {
    if !has_surface(area_km2, params) {
        return 0.0;
    }
    let ratio = area_km2 / params.max_area_km2;
    clamp_depth(params.max_depth_m * ratio * params.scales.area_linear, params)
}

/// `max_depth × sqrt(area / max_area) × scale`
pub fn area_sqrt_depth(area_km2: f64, params: &DepthParams) -> f64 {
    if !has_surface(area_km2, params) {
        return 0.0;
    }
    let ratio = area_km2 / params.max_area_km2;
    clamp_depth(params.max_depth_m * ratio.sqrt() * params.scales.area_sqrt, params)
}

/// `max_depth × log10(1 + 9 × max(area, ε) / max_area) × scale`
///
/// The log argument runs from 1 to 10 over [0, max_area], so the shape term
/// is itself normalized to [0, 1].
pub fn area_log_depth(area_km2: f64, params: &DepthParams) -> f64 {
    if !has_surface(area_km2, params) {
        return 0.0;
    }
    let ratio = area_km2.max(params.area_epsilon_km2) / params.max_area_km2;
    let shape = (1.0 + 9.0 * ratio).log10().max(0.0);
    clamp_depth(params.max_depth_m * shape * params.scales.area_log, params)
}

/// Depth from the mean water index.
///
/// Values below `ndwi_min` (or NaN) give 0. The index is capped at
/// `ndwi_max`, normalized over the calibrated range and square-rooted.
pub fn index_water_depth(mean_water_index: f64, params: &DepthParams) -> f64 {
    if mean_water_index.is_nan() || mean_water_index < params.ndwi_min {
        return 0.0;
    }
    let capped = mean_water_index.min(params.ndwi_max);
    let normalized = (capped - params.ndwi_min) / (params.ndwi_max - params.ndwi_min);
    clamp_depth(
        params.max_depth_m * normalized.sqrt() * params.scales.index_water,
        params,
    )
}

/// Depth from the mean vegetation index.
///
/// Only negative values carry signal; zero, positive or NaN give 0. The
/// index is floored at `ndvi_floor` and normalized by its magnitude.
pub fn index_vegetation_depth(mean_vegetation_index: f64, params: &DepthParams) -> f64 {
    if mean_vegetation_index.is_nan() || mean_vegetation_index >= 0.0 {
        return 0.0;
    }
    let floored = mean_vegetation_index.max(params.ndvi_floor);
    let normalized = floored.abs() / params.ndvi_floor.abs();
    clamp_depth(
        params.max_depth_m * normalized * params.scales.index_vegetation,
        params,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> DepthParams {
        DepthParams::default()
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let sum = EnsembleWeights::default().sum();
        assert!((sum - 1.0).abs() <= WEIGHT_TOLERANCE, "sum = {}", sum);
    }

    #[test]
    fn test_area_models_at_reference() {
        let ratio: f64 = 0.30 / 0.55;
        assert!((area_linear_depth(0.30, &p()) - 12.0 * ratio * 0.8).abs() < 1e-10);
        assert!((area_sqrt_depth(0.30, &p()) - 12.0 * ratio.sqrt() * 0.7).abs() < 1e-10);
        let log = 12.0 * (1.0 + 9.0 * ratio).log10() * 0.6;
        assert!((area_log_depth(0.30, &p()) - log).abs() < 1e-10);
    }

    #[test]
    fn test_area_models_zero_area() {
        assert_eq!(area_linear_depth(0.0, &p()), 0.0);
        assert_eq!(area_sqrt_depth(0.0, &p()), 0.0);
        assert_eq!(area_log_depth(0.0, &p()), 0.0);
        assert_eq!(area_sqrt_depth(-1.0, &p()), 0.0);
        assert_eq!(area_linear_depth(f64::NAN, &p()), 0.0);
    }

    #[test]
    fn test_area_log_epsilon_floor() {
        // below epsilon the model evaluates at epsilon
        let tiny = area_log_depth(1e-6, &p());
        let at_eps = area_log_depth(0.001, &p());
        assert!((tiny - at_eps).abs() < 1e-12);
        assert!(tiny > 0.0);
    }

    #[test]
    fn test_area_models_clamped_to_max_depth() {
        let params = p();
        for area in [0.55, 1.0, 5.0, 100.0] {
            for d in [
                area_linear_depth(area, &params),
                area_sqrt_depth(area, &params),
                area_log_depth(area, &params),
            ] {
                assert!((0.0..=params.max_depth_m).contains(&d), "depth {} at area {}", d, area);
            }
        }
        // linear exceeds max depth unclamped beyond max_area / 0.8
        assert_eq!(area_linear_depth(5.0, &params), params.max_depth_m);
    }

    #[test]
    fn test_area_models_monotonic() {
        let params = p();
        let mut prev = [0.0; 3];
        for i in 0..=200 {
            let area = i as f64 * 0.005;
            let cur = [
                area_linear_depth(area, &params),
                area_sqrt_depth(area, &params),
                area_log_depth(area, &params),
            ];
            for k in 0..3 {
                assert!(cur[k] >= prev[k], "model {} decreased at area {}", k, area);
            }
            prev = cur;
        }
    }

    #[test]
    fn test_index_water_model() {
        let params = p();
        assert_eq!(index_water_depth(0.005, &params), 0.0);
        assert_eq!(index_water_depth(f64::NAN, &params), 0.0);
        assert_eq!(index_water_depth(0.01, &params), 0.0);

        let expected = 12.0 * ((0.10_f64 - 0.01) / 0.14).sqrt() * 0.9;
        assert!((index_water_depth(0.10, &params) - expected).abs() < 1e-10);

        // capped at ndwi_max
        let top = 12.0 * 0.9;
        assert!((index_water_depth(0.15, &params) - top).abs() < 1e-10);
        assert!((index_water_depth(0.8, &params) - top).abs() < 1e-10);
    }

    #[test]
    fn test_index_vegetation_model() {
        let params = p();
        assert_eq!(index_vegetation_depth(0.0, &params), 0.0);
        assert_eq!(index_vegetation_depth(0.3, &params), 0.0);
        assert_eq!(index_vegetation_depth(f64::NAN, &params), 0.0);

        assert!((index_vegetation_depth(-0.05, &params) - 1.2).abs() < 1e-10);
        // floored at -0.20
        assert!((index_vegetation_depth(-0.9, &params) - 4.8).abs() < 1e-10);
    }

    #[test]
    fn test_validate() {
        assert!(p().validate().is_ok());

        let mut bad = p();
        bad.weights.index_water = 0.5;
        assert!(matches!(bad.validate(), Err(Error::InvalidParameter { name: "depth.weights", .. })));

        let mut bad = p();
        bad.ndwi_max = 0.005;
        assert!(bad.validate().is_err());

        let mut bad = p();
        bad.ndvi_floor = 0.1;
        assert!(bad.validate().is_err());

        let mut bad = p();
        bad.max_area_km2 = 0.0;
        assert!(bad.validate().is_err());
    }
}
