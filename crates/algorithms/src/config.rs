//! Pipeline configuration
//!
//! Every calibration constant of the pipeline lives in one immutable
//! [`LakeConfig`], loaded from TOML. Each section falls back to its defaults
//! when omitted, so an empty file is a valid configuration:
//!
//! ```toml
//! nodata_default = 0.0
//!
//! [zonal]
//! water_threshold = 0.0
//! vegetation_threshold = 0.0
//!
//! [depth]
//! max_area_km2 = 0.55
//! max_depth_m = 12.0
//!
//! [depth.weights]
//! index_water = 0.35
//!
//! [levels]
//! critical_km2 = 0.05
//!
//! [bands.Landsat-8]
//! green = "B3"
//! red = "B4"
//! nir = "B5"
//! ```

use crate::depth::{DepthParams, EstimatorParams, LevelThresholds};
use crate::imagery::IndexParams;
use crate::statistics::ZonalParams;
use lakewatch_core::scene::{BandRoleTable, Sensor};
use lakewatch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeConfig {
    /// Nodata sentinel used when the green band declares none
    pub nodata_default: f64,
    /// Ground pixel size override in meters; defaults to the sensor's nominal size
    pub pixel_size_m: Option<f64>,
    pub zonal: ZonalParams,
    pub depth: DepthParams,
    pub levels: LevelThresholds,
    /// Replaces the built-in sensor table entirely when present
    pub bands: BandRoleTable,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            nodata_default: 0.0,
            pixel_size_m: None,
            zonal: ZonalParams::default(),
            depth: DepthParams::default(),
            levels: LevelThresholds::default(),
            bands: BandRoleTable::default(),
        }
    }
}

impl LakeConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: LakeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Other(format!("Cannot serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.pixel_size_m {
            if !(size > 0.0) {
                return Err(Error::InvalidParameter {
                    name: "pixel_size_m",
                    value: size.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        }
        for (name, value) in [
            ("zonal.water_threshold", self.zonal.water_threshold),
            ("zonal.vegetation_threshold", self.zonal.vegetation_threshold),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: "must be finite".to_string(),
                });
            }
        }
        if self.bands.sensors().next().is_none() {
            return Err(Error::InvalidParameter {
                name: "bands",
                value: "{}".to_string(),
                reason: "at least one sensor must be mapped".to_string(),
            });
        }
        self.depth.validate()?;
        self.levels.validate()
    }

    /// Area of one pixel in m² for a scene from `sensor`
    pub fn pixel_area_m2(&self, sensor: Sensor) -> f64 {
        let size = self.pixel_size_m.unwrap_or_else(|| sensor.pixel_size_m());
        size * size
    }

    pub fn index_params(&self) -> IndexParams {
        IndexParams {
            nodata_default: self.nodata_default,
        }
    }

    pub fn estimator_params(&self) -> EstimatorParams {
        EstimatorParams {
            depth: self.depth.clone(),
            levels: self.levels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakewatch_core::scene::BandRoles;

    #[test]
    fn test_empty_document_is_default() {
        let config = LakeConfig::from_toml_str("").unwrap();
        assert_eq!(config, LakeConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let text = r#"
            nodata_default = -9999.0

            [depth]
            max_depth_m = 15.0

            [depth.weights]
            area_linear = 0.10
            area_sqrt = 0.35

            [levels]
            moderate_km2 = 0.40
        "#;
        let config = LakeConfig::from_toml_str(text).unwrap();
        assert_eq!(config.nodata_default, -9999.0);
        assert_eq!(config.depth.max_depth_m, 15.0);
        assert_eq!(config.depth.max_area_km2, 0.55);
        assert_eq!(config.depth.weights.index_water, 0.35);
        assert_eq!(config.levels.moderate_km2, 0.40);
        assert_eq!(config.levels.critical_km2, 0.05);
        assert_eq!(config.index_params().nodata_default, -9999.0);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let text = r#"
            [depth.weights]
            index_water = 0.90
        "#;
        assert!(matches!(
            LakeConfig::from_toml_str(text),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            LakeConfig::from_toml_str("nodata_default = [oops"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_band_table_replaced() {
        let text = r#"
            [bands.Landsat-9]
            green = "B3"
            red = "B4"
            nir = "B5"
        "#;
        let config = LakeConfig::from_toml_str(text).unwrap();
        assert!(config.bands.resolve(Sensor::Landsat9).is_ok());
        assert!(config.bands.resolve(Sensor::Landsat5).is_err());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut config = LakeConfig::default();
        config.pixel_size_m = Some(15.0);
        config.bands = BandRoleTable::empty().with(Sensor::Landsat8, BandRoles::new("B3", "B4", "B5"));

        let text = config.to_toml_string().unwrap();
        let back = LakeConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_pixel_area() {
        let mut config = LakeConfig::default();
        assert_eq!(config.pixel_area_m2(Sensor::Landsat8), 900.0);
        config.pixel_size_m = Some(10.0);
        assert_eq!(config.pixel_area_m2(Sensor::Landsat5), 100.0);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lake.toml");
        std::fs::write(&path, "[zonal]\nwater_threshold = 0.05\n").unwrap();

        let config = LakeConfig::from_file(&path).unwrap();
        assert_eq!(config.zonal.water_threshold, 0.05);
        assert!(matches!(
            LakeConfig::from_file(dir.path().join("missing.toml")),
            Err(Error::Io(_))
        ));
    }
}
