//! CSV output tables
//!
//! Values are kept at full precision in memory and rounded only here:
//! depths to 2 decimals, volumes to 3, everything else to 5. Absent
//! statistics are written as empty fields.

use crate::scene::SceneResult;
use crate::series::TimeSeries;
use crate::summary::{IndexRange, YearSummary};
use lakewatch_algorithms::depth::SubModel;
use lakewatch_algorithms::statistics::{IndexStats, MaskSummary};
use lakewatch_core::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column order of the series table
pub const SERIES_COLUMNS: [&str; 21] = [
    "year",
    "date",
    "sensor",
    "area_km2",
    "mean_vegetation_index",
    "mean_water_index",
    "depth_area_linear_m",
    "depth_area_sqrt_m",
    "depth_area_log_m",
    "depth_index_water_m",
    "depth_index_vegetation_m",
    "depth_m",
    "volume_million_m3",
    "water_pixels",
    "non_vegetation_pixels",
    "combined_pixels",
    "water_level",
    "month",
    "season",
    "water_present",
    "combined_present",
];

fn fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

fn depth(value: f64) -> String {
    fixed(value, 2)
}

fn volume(value: f64) -> String {
    fixed(value, 3)
}

fn ratio(value: f64) -> String {
    fixed(value, 5)
}

fn optional(stats: Option<IndexStats>, pick: fn(&IndexStats) -> f64) -> String {
    stats.as_ref().map(pick).map(ratio).unwrap_or_default()
}

fn range_fields(range: Option<IndexRange>) -> [String; 2] {
    match range {
        Some(r) => [ratio(r.min), ratio(r.max)],
        None => [String::new(), String::new()],
    }
}

/// Write the lake history with a header row
pub fn write_series<W: Write>(series: &TimeSeries, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(SERIES_COLUMNS)?;

    for r in series {
        let mut row: Vec<String> = vec![
            r.year.to_string(),
            r.date.format("%Y-%m-%d").to_string(),
            r.sensor.to_string(),
            ratio(r.area_km2),
            ratio(r.mean_vegetation_index),
            ratio(r.mean_water_index),
        ];
        row.extend(SubModel::ALL.iter().map(|&m| depth(r.depth.get(m))));
        row.extend([
            depth(r.depth.composite),
            volume(r.volume_million_m3),
            r.water_pixels.to_string(),
            r.non_vegetation_pixels.to_string(),
            r.combined_pixels.to_string(),
            r.level.to_string(),
            r.month.to_string(),
            r.season.to_string(),
            r.water_present().to_string(),
            r.combined_present().to_string(),
        ]);
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_series_file<P: AsRef<Path>>(series: &TimeSeries, path: P) -> Result<()> {
    write_series(series, File::create(path.as_ref())?)
}

const MASK_FIELDS: [&str; 7] = [
    "pixels",
    "ndwi_min",
    "ndwi_max",
    "ndwi_mean",
    "ndvi_min",
    "ndvi_max",
    "ndvi_mean",
];

fn mask_fields(mask: &MaskSummary) -> [String; 7] {
    [
        mask.pixel_count.to_string(),
        optional(mask.water_index, |s| s.min),
        optional(mask.water_index, |s| s.max),
        optional(mask.water_index, |s| s.mean),
        optional(mask.vegetation_index, |s| s.min),
        optional(mask.vegetation_index, |s| s.max),
        optional(mask.vegetation_index, |s| s.mean),
    ]
}

/// Write the per-scene mask statistics: one row per scene, seven columns per mask
pub fn write_scene_stats<W: Write>(scenes: &[SceneResult], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = ["date", "sensor", "valid_pixels"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for mask in ["water", "non_vegetation", "combined"] {
        header.extend(MASK_FIELDS.iter().map(|f| format!("{}_{}", mask, f)));
    }
    header.extend(["water_present", "combined_present"].map(String::from));
    csv.write_record(&header)?;

    for scene in scenes {
        let s = &scene.stats;
        let mut row = vec![
            scene.key.date.format("%Y-%m-%d").to_string(),
            scene.key.sensor.to_string(),
            s.valid_pixels.to_string(),
        ];
        for mask in [&s.water, &s.non_vegetation, &s.combined] {
            row.extend(mask_fields(mask));
        }
        row.push(s.water.is_present().to_string());
        row.push(s.combined.is_present().to_string());
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_scene_stats_file<P: AsRef<Path>>(scenes: &[SceneResult], path: P) -> Result<()> {
    write_scene_stats(scenes, File::create(path.as_ref())?)
}

/// Column order of the yearly summary table
pub const YEARLY_COLUMNS: [&str; 22] = [
    "year",
    "records",
    "water_present",
    "non_vegetation_present",
    "combined_present",
    "mean_area_km2",
    "max_area_km2",
    "min_area_km2",
    "mean_vegetation_index",
    "mean_water_index",
    "mean_depth_m",
    "max_depth_m",
    "mean_volume_million_m3",
    "max_volume_million_m3",
    "water_ndwi_min",
    "water_ndwi_max",
    "non_vegetation_ndvi_min",
    "non_vegetation_ndvi_max",
    "combined_ndwi_min",
    "combined_ndwi_max",
    "combined_ndvi_min",
    "combined_ndvi_max",
];

/// Write the per-year summary; a range over an empty mask is left blank
pub fn write_yearly_summary<W: Write>(years: &[YearSummary], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(YEARLY_COLUMNS)?;

    for y in years {
        let mut row = vec![
            y.year.to_string(),
            y.records.to_string(),
            y.water_present.to_string(),
            y.non_vegetation_present.to_string(),
            y.combined_present.to_string(),
            ratio(y.mean_area_km2),
            ratio(y.max_area_km2),
            ratio(y.min_area_km2),
            ratio(y.mean_vegetation_index),
            ratio(y.mean_water_index),
            depth(y.mean_depth_m),
            depth(y.max_depth_m),
            volume(y.mean_volume_million_m3),
            volume(y.max_volume_million_m3),
        ];
        for range in [y.water_ndwi, y.non_vegetation_ndvi, y.combined_ndwi, y.combined_ndvi] {
            row.extend(range_fields(range));
        }
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_yearly_summary_file<P: AsRef<Path>>(years: &[YearSummary], path: P) -> Result<()> {
    write_yearly_summary(years, File::create(path.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Season, TimeSeriesBuilder, TimeSeriesRecord};
    use chrono::NaiveDate;
    use lakewatch_algorithms::depth::{DepthEstimate, WaterLevel};
    use lakewatch_core::scene::Sensor;

    fn sample_series() -> TimeSeries {
        let mut b = TimeSeriesBuilder::new();
        b.push(TimeSeriesRecord {
            year: 1999,
            date: NaiveDate::from_ymd_opt(1999, 7, 4).unwrap(),
            month: 7,
            season: Season::Summer,
            sensor: Sensor::Landsat5,
            area_km2: 0.3,
            mean_vegetation_index: -0.05,
            mean_water_index: 0.1,
            depth: DepthEstimate {
                area_linear: 5.23636,
                area_sqrt: 6.20381,
                area_log: 5.55495,
                index_water: 8.65927,
                index_vegetation: 1.2,
                composite: 6.352837,
                simple_mean: 5.37,
            },
            volume_million_m3: 1.9058511,
            water_pixels: 400,
            non_vegetation_pixels: 380,
            combined_pixels: 333,
            level: WaterLevel::Moderate,
        });
        b.finish()
    }

    #[test]
    fn test_series_header_and_rounding() {
        let mut buf = Vec::new();
        write_series(&sample_series(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), SERIES_COLUMNS.join(","));
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(row.len(), SERIES_COLUMNS.len());
        assert_eq!(row[0], "1999");
        assert_eq!(row[1], "1999-07-04");
        assert_eq!(row[2], "Landsat-5");
        assert_eq!(row[6], "5.24");
        assert_eq!(row[11], "6.35");
        assert_eq!(row[12], "1.906");
        assert_eq!(row[16], "Moderate");
        assert_eq!(row[18], "Summer");
        assert_eq!(row[19], "true");
    }

    #[test]
    fn test_empty_series_writes_header_only() {
        let mut buf = Vec::new();
        write_series(&TimeSeries::default(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_yearly_blank_range_for_empty_mask() {
        let year = YearSummary {
            year: 2021,
            records: 2,
            water_present: 0,
            non_vegetation_present: 2,
            combined_present: 0,
            mean_area_km2: 0.0,
            max_area_km2: 0.0,
            min_area_km2: 0.0,
            mean_vegetation_index: -0.2,
            mean_water_index: 0.0,
            mean_depth_m: 0.0,
            max_depth_m: 0.0,
            mean_volume_million_m3: 0.0,
            max_volume_million_m3: 0.0,
            water_ndwi: None,
            non_vegetation_ndvi: Some(IndexRange { min: -0.41, max: -0.02 }),
            combined_ndwi: None,
            combined_ndvi: None,
        };
        let mut buf = Vec::new();
        write_yearly_summary(&[year], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), YEARLY_COLUMNS.join(","));
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(row.len(), YEARLY_COLUMNS.len());
        assert_eq!(&row[2..5], ["0", "2", "0"]);
        assert_eq!(&row[14..16], ["", ""]);
        assert_eq!(&row[16..18], ["-0.41000", "-0.02000"]);
        assert!(row[18..].iter().all(|f| f.is_empty()));
    }

    #[test]
    fn test_optional_stat_is_empty_field() {
        assert_eq!(optional(None, |s| s.mean), "");
        let stats = IndexStats {
            min: -0.1,
            max: 0.3,
            mean: 0.123456789,
        };
        assert_eq!(optional(Some(stats), |s| s.mean), "0.12346");
    }
}
