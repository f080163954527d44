//! Scene discovery and grouping
//!
//! Clipped single-band rasters follow the Landsat Collection 2 naming
//! convention with a `_clipped` suffix appended by the clipping step:
//!
//! ```text
//! LC08_L2SP_176034_20210712_20210720_02_T1_SR_B5_clipped.TIF
//! ^^^^                ^^^^^^^^                   ^^
//! sensor              acquisition date           band
//! ```
//!
//! Files are grouped into one [`SceneBundle`] per (date, sensor). No pixel
//! data is touched here.

use crate::error::{Error, Result};
use crate::scene::{BandId, Sensor};
use chrono::{Datelike, NaiveDate};
use glob::MatchOptions;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Underscore-separated field holding the acquisition date
const DATE_FIELD: usize = 3;
const CLIPPED_SUFFIX: &str = "_clipped";

/// Identity of one acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneKey {
    pub date: NaiveDate,
    pub sensor: Sensor,
}

impl SceneKey {
    pub fn new(date: NaiveDate, sensor: Sensor) -> Self {
        Self { date, sensor }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.sensor)
    }
}

/// Band files discovered for one acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBundle {
    pub date: NaiveDate,
    pub sensor: Sensor,
    bands: BTreeMap<BandId, PathBuf>,
}

impl SceneBundle {
    pub fn new(date: NaiveDate, sensor: Sensor) -> Self {
        Self {
            date,
            sensor,
            bands: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> SceneKey {
        SceneKey::new(self.date, self.sensor)
    }

    /// Register a band file; a later file for the same band replaces the earlier one
    pub fn insert_band(&mut self, band: BandId, path: PathBuf) {
        self.bands.insert(band, path);
    }

    pub fn band_path(&self, band: &BandId) -> Option<&Path> {
        self.bands.get(band).map(PathBuf::as_path)
    }

    pub fn bands(&self) -> impl Iterator<Item = (&BandId, &Path)> {
        self.bands.iter().map(|(b, p)| (b, p.as_path()))
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }
}

/// Extract sensor and acquisition date from a file name.
///
/// Returns `None` for unknown sensor prefixes and for names whose date field
/// is not a valid `YYYYMMDD` calendar date.
pub fn parse_scene_name(file_name: &str) -> Option<(Sensor, NaiveDate)> {
    let sensor = Sensor::from_file_prefix(file_name)?;
    let field = file_name.split('_').nth(DATE_FIELD)?;

    if field.len() != 8 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::parse_from_str(field, "%Y%m%d").ok()?;
    Some((sensor, date))
}

fn band_marker() -> Option<&'static Regex> {
    static MARKER: OnceLock<Option<Regex>> = OnceLock::new();
    MARKER
        .get_or_init(|| Regex::new(r"(?i)_B(\w+)_clipped").ok())
        .as_ref()
}

/// Extract the band id from a `_B<token>_clipped` marker (case-insensitive).
///
/// `\w` is Unicode-aware and includes underscores, so the token is the
/// longest run that still leaves a `_clipped` after it.
pub fn parse_band_id(file_name: &str) -> Option<BandId> {
    let caps = band_marker()?.captures(file_name)?;
    Some(BandId::new(&caps[1]))
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
}

/// Recursively find clipped band rasters under `root`.
///
/// Matches `**/*_clipped.tif` and `.tiff` in any letter case. An absent root
/// or an empty result is [`Error::EmptyCorpus`].
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::EmptyCorpus {
            root: root.to_path_buf(),
        });
    }

    let escaped = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{}/**/*{}.*", escaped.trim_end_matches('/'), CLIPPED_SUFFIX);
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut files: Vec<PathBuf> = glob::glob_with(&pattern, options)?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file() && is_tiff(p))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(Error::EmptyCorpus {
            root: root.to_path_buf(),
        });
    }
    Ok(files)
}

/// Group band files into per-(date, sensor) bundles.
///
/// Files whose name carries no recognizable sensor or date are dropped. A
/// file with a valid scene name but no band marker still opens its bundle
/// without contributing a band.
pub fn group<I, P>(paths: I) -> BTreeMap<SceneKey, SceneBundle>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut bundles: BTreeMap<SceneKey, SceneBundle> = BTreeMap::new();

    for path in paths {
        let path = path.as_ref();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((sensor, date)) = parse_scene_name(name) else {
            continue;
        };

        let bundle = bundles
            .entry(SceneKey::new(date, sensor))
            .or_insert_with(|| SceneBundle::new(date, sensor));

        if let Some(band) = parse_band_id(name) {
            bundle.insert_band(band, path.to_path_buf());
        }
    }

    bundles
}

/// [`discover`] then [`group`]
pub fn locate_scenes(root: &Path) -> Result<BTreeMap<SceneKey, SceneBundle>> {
    let files = discover(root)?;
    Ok(group(files))
}
