//! Time-series assembly
//!
//! Records are appended in any order while scenes complete and frozen into a
//! [`TimeSeries`] sorted by (year, date). Records sharing a date but coming
//! from different sensors stay separate rows.

use crate::scene::SceneResult;
use chrono::{Datelike, NaiveDate};
use lakewatch_algorithms::depth::{DepthEstimate, WaterLevel};
use lakewatch_core::scene::Sensor;
use serde::Serialize;
use std::fmt;

/// Meteorological season of the acquisition month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Dec–Feb Winter, Mar–May Spring, Jun–Aug Summer, Sep–Nov Autumn
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the lake history
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRecord {
    pub year: i32,
    pub date: NaiveDate,
    pub month: u32,
    pub season: Season,
    pub sensor: Sensor,
    pub area_km2: f64,
    pub mean_vegetation_index: f64,
    pub mean_water_index: f64,
    pub depth: DepthEstimate,
    pub volume_million_m3: f64,
    pub water_pixels: usize,
    pub non_vegetation_pixels: usize,
    pub combined_pixels: usize,
    pub level: WaterLevel,
}

impl TimeSeriesRecord {
    pub fn from_scene(scene: &SceneResult) -> Self {
        let date = scene.key.date;
        Self {
            year: date.year(),
            date,
            month: date.month(),
            season: Season::from_month(date.month()),
            sensor: scene.key.sensor,
            area_km2: scene.area_km2,
            mean_vegetation_index: scene.mean_vegetation_index,
            mean_water_index: scene.mean_water_index,
            depth: scene.estimate.depth,
            volume_million_m3: scene.estimate.volume_million_m3,
            water_pixels: scene.stats.water.pixel_count,
            non_vegetation_pixels: scene.stats.non_vegetation.pixel_count,
            combined_pixels: scene.stats.combined.pixel_count,
            level: scene.estimate.level,
        }
    }

    /// Composite depth (m)
    pub fn depth_m(&self) -> f64 {
        self.depth.composite
    }

    pub fn water_present(&self) -> bool {
        self.water_pixels > 0
    }

    pub fn combined_present(&self) -> bool {
        self.combined_pixels > 0
    }
}

/// Append-only collector of records
#[derive(Debug, Default)]
pub struct TimeSeriesBuilder {
    records: Vec<TimeSeriesRecord>,
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TimeSeriesRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Freeze into a series ordered by (year, date); ties keep insertion order
    pub fn finish(self) -> TimeSeries {
        let mut records = self.records;
        records.sort_by_key(|r| (r.year, r.date));
        TimeSeries { records }
    }
}

impl Extend<TimeSeriesRecord> for TimeSeriesBuilder {
    fn extend<I: IntoIterator<Item = TimeSeriesRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

/// Immutable, chronologically ordered lake history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    records: Vec<TimeSeriesRecord>,
}

impl TimeSeries {
    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSeriesRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years, ascending
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.dedup();
        years
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a TimeSeriesRecord;
    type IntoIter = std::slice::Iter<'a, TimeSeriesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
