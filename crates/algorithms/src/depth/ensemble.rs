//! Weighted ensemble of the depth sub-models

use super::level::{LevelThresholds, WaterLevel};
use super::models::{
    area_linear_depth, area_log_depth, area_sqrt_depth, index_vegetation_depth,
    index_water_depth, DepthParams, SubModel,
};
use lakewatch_core::Algorithm;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Sub-model depths of one date and their combinations (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DepthEstimate {
    pub area_linear: f64,
    pub area_sqrt: f64,
    pub area_log: f64,
    pub index_water: f64,
    pub index_vegetation: f64,
    /// Weighted sum of the five sub-models
    pub composite: f64,
    /// Unweighted mean of the five sub-models, kept for comparison only
    pub simple_mean: f64,
}

impl DepthEstimate {
    pub fn get(&self, model: SubModel) -> f64 {
        match model {
            SubModel::AreaLinear => self.area_linear,
            SubModel::AreaSqrt => self.area_sqrt,
            SubModel::AreaLog => self.area_log,
            SubModel::IndexWater => self.index_water,
            SubModel::IndexVegetation => self.index_vegetation,
        }
    }

    pub fn sub_models(&self) -> [(SubModel, f64); 5] {
        SubModel::ALL.map(|m| (m, self.get(m)))
    }
}

/// Evaluate the five sub-models and combine them.
///
/// Without a water surface (`area <= min_area`, or NaN) there is nothing to
/// hold a water column and the whole estimate is zero, whatever the indices
/// say. Never fails.
pub fn estimate_depth(
    area_km2: f64,
    mean_water_index: f64,
    mean_vegetation_index: f64,
    params: &DepthParams,
) -> DepthEstimate {
    if !(area_km2 > params.min_area_km2) {
        return DepthEstimate::default();
    }

    let mut est = DepthEstimate {
        area_linear: area_linear_depth(area_km2, params),
        area_sqrt: area_sqrt_depth(area_km2, params),
        area_log: area_log_depth(area_km2, params),
        index_water: index_water_depth(mean_water_index, params),
        index_vegetation: index_vegetation_depth(mean_vegetation_index, params),
        composite: 0.0,
        simple_mean: 0.0,
    };

    let subs = est.sub_models();
    est.composite = subs
        .iter()
        .map(|&(m, d)| params.weights.get(m) * d)
        .sum();
    est.simple_mean = subs.iter().map(|&(_, d)| d).sum::<f64>() / subs.len() as f64;
    est
}

/// Stored volume in million m³: `area_km2 × 1e6 m² × depth_m × 1e-6`
#[inline]
pub fn volume_million_m3(area_km2: f64, depth_m: f64) -> f64 {
    area_km2 * depth_m
}

/// Scene-level inputs of the estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateInput {
    pub area_km2: f64,
    pub mean_water_index: f64,
    pub mean_vegetation_index: f64,
}

/// Depth calibration plus level thresholds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimatorParams {
    pub depth: DepthParams,
    pub levels: LevelThresholds,
}

/// Full estimate for one date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LakeEstimate {
    pub depth: DepthEstimate,
    pub volume_million_m3: f64,
    pub level: WaterLevel,
}

/// Depth ensemble, volume and water level for one date
pub fn estimate(input: &EstimateInput, params: &EstimatorParams) -> LakeEstimate {
    let depth = estimate_depth(
        input.area_km2,
        input.mean_water_index,
        input.mean_vegetation_index,
        &params.depth,
    );
    LakeEstimate {
        volume_million_m3: volume_million_m3(input.area_km2, depth.composite),
        level: params.levels.classify(input.area_km2, depth.composite),
        depth,
    }
}

/// [`estimate`] as an [`Algorithm`]
pub struct DepthEnsemble;

impl Algorithm for DepthEnsemble {
    type Input = EstimateInput;
    type Output = LakeEstimate;
    type Params = EstimatorParams;
    type Error = Infallible;

    fn name(&self) -> &'static str {
        "DepthEnsemble"
    }

    fn description(&self) -> &'static str {
        "Weighted five-model depth estimate with volume and water-level state"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output, Infallible> {
        Ok(estimate(&input, &params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn input(area_km2: f64, ndwi: f64, ndvi: f64) -> EstimateInput {
        EstimateInput {
            area_km2,
            mean_water_index: ndwi,
            mean_vegetation_index: ndvi,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let out = estimate(&input(0.30, 0.10, -0.05), &EstimatorParams::default());

        assert_abs_diff_eq!(out.depth.area_linear, 5.2364, epsilon = 1e-3);
        assert_abs_diff_eq!(out.depth.area_sqrt, 6.2038, epsilon = 1e-3);
        assert_abs_diff_eq!(out.depth.area_log, 5.5550, epsilon = 1e-3);
        assert_abs_diff_eq!(out.depth.index_water, 8.6593, epsilon = 1e-3);
        assert_abs_diff_eq!(out.depth.index_vegetation, 1.2, epsilon = 1e-10);

        assert_abs_diff_eq!(out.depth.composite, 6.3528, epsilon = 1e-3);
        assert_abs_diff_eq!(out.volume_million_m3, 1.9059, epsilon = 1e-3);
        assert_eq!(out.level, WaterLevel::Moderate);

        // index-water is the largest weighted term
        let weights = EstimatorParams::default().depth.weights;
        let dominant = out
            .depth
            .sub_models()
            .into_iter()
            .max_by(|a, b| (weights.get(a.0) * a.1).total_cmp(&(weights.get(b.0) * b.1)))
            .map(|(m, _)| m);
        assert_eq!(dominant, Some(SubModel::IndexWater));
    }

    #[test]
    fn test_composite_is_weighted_sum() {
        let params = EstimatorParams::default();
        let out = estimate(&input(0.42, 0.07, -0.12), &params);
        let manual: f64 = out
            .depth
            .sub_models()
            .iter()
            .map(|&(m, d)| params.depth.weights.get(m) * d)
            .sum();
        assert!((out.depth.composite - manual).abs() < 1e-12);

        let mean = out.depth.sub_models().iter().map(|&(_, d)| d).sum::<f64>() / 5.0;
        assert!((out.depth.simple_mean - mean).abs() < 1e-12);
    }

    #[test]
    fn test_zero_area_is_dried() {
        let params = EstimatorParams::default();
        for (ndwi, ndvi) in [(0.0, 0.0), (0.12, -0.15), (0.9, -0.9), (f64::NAN, f64::NAN)] {
            let out = estimate(&input(0.0, ndwi, ndvi), &params);
            assert_eq!(out.depth.composite, 0.0);
            assert_eq!(out.volume_million_m3, 0.0);
            assert_eq!(out.level, WaterLevel::Dried);
        }
    }

    #[test]
    fn test_nan_indices_contribute_zero() {
        let out = estimate(&input(0.30, f64::NAN, f64::NAN), &EstimatorParams::default());
        assert_eq!(out.depth.index_water, 0.0);
        assert_eq!(out.depth.index_vegetation, 0.0);
        assert!(out.depth.composite > 0.0);
        assert!(out.depth.composite.is_finite());
    }

    #[test]
    fn test_monotonic_in_area_with_index_models_off() {
        let params = EstimatorParams::default();
        let mut prev = 0.0;
        for i in 0..=150 {
            let area = i as f64 * 0.01;
            let d = estimate(&input(area, 0.0, 0.0), &params).depth.composite;
            assert!(d >= prev, "composite decreased at area {}: {} < {}", area, d, prev);
            prev = d;
        }
    }

    #[test]
    fn test_volume_identity() {
        let params = EstimatorParams::default();
        for &(a, w, v) in &[(0.05, 0.02, -0.01), (0.21, 0.06, -0.08), (0.55, 0.2, -0.3)] {
            let out = estimate(&input(a, w, v), &params);
            assert!((out.volume_million_m3 - a * out.depth.composite).abs() < 1e-12);
        }
    }

    #[test]
    fn test_depths_bounded() {
        let params = EstimatorParams::default();
        let max = params.depth.max_depth_m;
        for &a in &[0.001, 0.1, 0.55, 3.0] {
            for &w in &[-1.0, 0.0, 0.05, 1.0] {
                for &v in &[-1.0, -0.1, 0.0, 1.0] {
                    let e = estimate(&input(a, w, v), &params).depth;
                    for (_, d) in e.sub_models() {
                        assert!((0.0..=max).contains(&d));
                    }
                    assert!((0.0..=max).contains(&e.composite));
                }
            }
        }
    }

    #[test]
    fn test_algorithm_interface() {
        let out = DepthEnsemble.execute_default(input(0.5, 0.1, -0.1)).unwrap();
        assert_eq!(out.level, WaterLevel::High);
    }
}
