//! Processing of one scene bundle
//!
//! A scene either yields a [`SceneResult`] or a [`SkipReason`]; no error
//! crosses the scene boundary, so one bad acquisition never stops a batch.

use lakewatch_algorithms::depth::{estimate, EstimateInput, LakeEstimate};
use lakewatch_algorithms::imagery::{compute_indices, IndexPair, SceneBands};
use lakewatch_algorithms::statistics::{mask_statistics, ZonalStats};
use lakewatch_algorithms::LakeConfig;
use lakewatch_core::io::read_geotiff;
use lakewatch_core::raster::Raster;
use lakewatch_core::scene::{BandId, BandRole, BandRoles, SceneBundle, SceneKey, Sensor};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Why a scene produced no record
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The band role table has no entry for the sensor
    UnsupportedSensor(Sensor),
    /// The bundle lacks one of the three required bands
    MissingBand { role: BandRole, band: BandId },
    /// Reading or combining the rasters failed
    Failed(String),
}

impl SkipReason {
    /// Expected gaps in the corpus, as opposed to broken inputs
    pub fn is_expected(&self) -> bool {
        !matches!(self, SkipReason::Failed(_))
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedSensor(sensor) => write!(f, "unsupported sensor {}", sensor),
            SkipReason::MissingBand { role, band } => write!(f, "missing {} band {}", role, band),
            SkipReason::Failed(msg) => write!(f, "processing failed: {}", msg),
        }
    }
}

/// Everything derived from one processed scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneResult {
    pub key: SceneKey,
    pub stats: ZonalStats,
    /// Combined-mask area (km²)
    pub area_km2: f64,
    pub mean_water_index: f64,
    pub mean_vegetation_index: f64,
    pub estimate: LakeEstimate,
}

/// Tagged outcome of processing one bundle
#[derive(Debug, Clone)]
pub enum SceneOutcome {
    Processed(Box<SceneResult>),
    Skipped { key: SceneKey, reason: SkipReason },
}

impl SceneOutcome {
    pub fn key(&self) -> SceneKey {
        match self {
            SceneOutcome::Processed(result) => result.key,
            SceneOutcome::Skipped { key, .. } => *key,
        }
    }
}

/// Band files of a bundle in green, red, NIR order, checked before any read
fn resolve_band_paths<'a>(bundle: &'a SceneBundle, roles: &BandRoles) -> Result<[&'a Path; 3], SkipReason> {
    let path = |role: BandRole| {
        let band = roles.get(role);
        bundle.band_path(band).ok_or_else(|| SkipReason::MissingBand {
            role,
            band: band.clone(),
        })
    };
    Ok([path(BandRole::Green)?, path(BandRole::Red)?, path(BandRole::Nir)?])
}

fn read_band(path: &Path) -> Result<Raster<f64>, SkipReason> {
    read_geotiff::<f64, _>(path)
        .map_err(|e| SkipReason::Failed(format!("{}: {}", path.display(), e)))
}

/// Read the green, red and NIR rasters of a bundle, green first.
pub fn read_scene_bands(bundle: &SceneBundle, config: &LakeConfig) -> Result<SceneBands, SkipReason> {
    let roles = config
        .bands
        .resolve(bundle.sensor)
        .map_err(|e| SkipReason::UnsupportedSensor(e.0))?;
    let [green, red, nir] = resolve_band_paths(bundle, roles)?;

    Ok(SceneBands {
        green: read_band(green)?,
        red: read_band(red)?,
        nir: read_band(nir)?,
    })
}

/// Water and vegetation indices of a bundle
pub fn scene_indices(bundle: &SceneBundle, config: &LakeConfig) -> Result<IndexPair, SkipReason> {
    let bands = read_scene_bands(bundle, config)?;
    compute_indices(&bands, &config.index_params()).map_err(|e| SkipReason::Failed(e.to_string()))
}

/// Run indices, mask statistics and the depth estimator on one bundle.
pub fn process_scene(bundle: &SceneBundle, config: &LakeConfig) -> SceneOutcome {
    let key = bundle.key();
    match try_process(bundle, config) {
        Ok(result) => SceneOutcome::Processed(Box::new(result)),
        Err(reason) => SceneOutcome::Skipped { key, reason },
    }
}

fn try_process(bundle: &SceneBundle, config: &LakeConfig) -> Result<SceneResult, SkipReason> {
    let key = bundle.key();
    debug!(scene = %key, bands = bundle.band_count(), "processing scene");

    let indices = scene_indices(bundle, config)?;
    let stats = mask_statistics(
        &indices.water,
        &indices.vegetation,
        &indices.nodata,
        &config.zonal,
    )
    .map_err(|e| SkipReason::Failed(e.to_string()))?
    .stats;

    let area_km2 = stats.combined.pixel_count as f64 * config.pixel_area_m2(key.sensor) / 1e6;
    let input = EstimateInput {
        area_km2,
        mean_water_index: stats.mean_water_index(),
        mean_vegetation_index: stats.mean_vegetation_index(),
    };
    let estimate = estimate(&input, &config.estimator_params());

    debug!(
        scene = %key,
        combined_pixels = stats.combined.pixel_count,
        area_km2,
        depth_m = estimate.depth.composite,
        "scene estimated"
    );

    Ok(SceneResult {
        key,
        stats,
        area_km2,
        mean_water_index: input.mean_water_index,
        mean_vegetation_index: input.mean_vegetation_index,
        estimate,
    })
}
