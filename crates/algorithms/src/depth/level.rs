//! Discrete water-level states and depth categories

use lakewatch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Water-level state of the lake on one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WaterLevel {
    Dried,
    Critical,
    Low,
    Moderate,
    High,
}

impl WaterLevel {
    pub const ALL: [WaterLevel; 5] = [
        WaterLevel::Dried,
        WaterLevel::Critical,
        WaterLevel::Low,
        WaterLevel::Moderate,
        WaterLevel::High,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WaterLevel::Dried => "Dried",
            WaterLevel::Critical => "Critical",
            WaterLevel::Low => "Low",
            WaterLevel::Moderate => "Moderate",
            WaterLevel::High => "High",
        }
    }
}

impl fmt::Display for WaterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upper area bounds (km², exclusive) of the Critical, Low and Moderate states
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelThresholds {
    pub critical_km2: f64,
    pub low_km2: f64,
    pub moderate_km2: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            critical_km2: 0.05,
            low_km2: 0.20,
            moderate_km2: 0.35,
        }
    }
}

impl LevelThresholds {
    /// Classify a date by area and composite depth; first match wins.
    ///
    /// Zero area or zero depth is `Dried`; otherwise each threshold is an
    /// exclusive upper bound, so an area exactly on a threshold falls into
    /// the next state up.
    pub fn classify(&self, area_km2: f64, depth_m: f64) -> WaterLevel {
        if area_km2 == 0.0 || depth_m == 0.0 {
            WaterLevel::Dried
        } else if area_km2 < self.critical_km2 {
            WaterLevel::Critical
        } else if area_km2 < self.low_km2 {
            WaterLevel::Low
        } else if area_km2 < self.moderate_km2 {
            WaterLevel::Moderate
        } else {
            WaterLevel::High
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 < self.critical_km2
            && self.critical_km2 < self.low_km2
            && self.low_km2 < self.moderate_km2;
        if !ordered {
            return Err(Error::InvalidParameter {
                name: "levels",
                value: format!(
                    "{} / {} / {}",
                    self.critical_km2, self.low_km2, self.moderate_km2
                ),
                reason: "thresholds must be positive and strictly ascending".to_string(),
            });
        }
        Ok(())
    }
}

/// Coarse bucket of the composite depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DepthCategory {
    /// 0 – 2 m
    Shallow,
    /// 2 – 5 m
    Medium,
    /// 5 – 10 m
    Deep,
    /// over 10 m
    VeryDeep,
}

impl DepthCategory {
    pub const ALL: [DepthCategory; 4] = [
        DepthCategory::Shallow,
        DepthCategory::Medium,
        DepthCategory::Deep,
        DepthCategory::VeryDeep,
    ];

    /// Bucket a depth; upper bounds are inclusive
    pub fn from_depth(depth_m: f64) -> Self {
        if depth_m <= 2.0 {
            DepthCategory::Shallow
        } else if depth_m <= 5.0 {
            DepthCategory::Medium
        } else if depth_m <= 10.0 {
            DepthCategory::Deep
        } else {
            DepthCategory::VeryDeep
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DepthCategory::Shallow => "Shallow (0-2 m)",
            DepthCategory::Medium => "Medium (2-5 m)",
            DepthCategory::Deep => "Deep (5-10 m)",
            DepthCategory::VeryDeep => "Very deep (>10 m)",
        }
    }
}

impl fmt::Display for DepthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
