//! Aggregate views of a finished batch

use crate::scene::SceneResult;
use crate::series::{TimeSeries, TimeSeriesRecord};
use chrono::NaiveDate;
use lakewatch_algorithms::depth::{DepthCategory, SubModel, WaterLevel};
use lakewatch_algorithms::statistics::IndexStats;
use serde::Serialize;
use std::collections::BTreeMap;

/// Lowest per-scene minimum and highest per-scene maximum of one index
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexRange {
    pub min: f64,
    pub max: f64,
}

impl IndexRange {
    /// `None` when no scene contributed statistics
    fn spanning<'a>(stats: impl Iterator<Item = Option<&'a IndexStats>>) -> Option<Self> {
        stats.flatten().fold(None, |range, s| {
            Some(match range {
                None => IndexRange { min: s.min, max: s.max },
                Some(r) => IndexRange {
                    min: r.min.min(s.min),
                    max: r.max.max(s.max),
                },
            })
        })
    }
}

/// Statistics of all scenes of one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub records: usize,
    /// Scenes with at least one pixel in each mask
    pub water_present: usize,
    pub non_vegetation_present: usize,
    pub combined_present: usize,
    pub mean_area_km2: f64,
    pub max_area_km2: f64,
    pub min_area_km2: f64,
    pub mean_vegetation_index: f64,
    pub mean_water_index: f64,
    pub mean_depth_m: f64,
    pub max_depth_m: f64,
    pub mean_volume_million_m3: f64,
    pub max_volume_million_m3: f64,
    /// NDWI over the water mask
    pub water_ndwi: Option<IndexRange>,
    /// NDVI over the non-vegetation mask
    pub non_vegetation_ndvi: Option<IndexRange>,
    pub combined_ndwi: Option<IndexRange>,
    pub combined_ndvi: Option<IndexRange>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

fn min(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::INFINITY, f64::min)
}

fn summarize_year(year: i32, scenes: &[&SceneResult]) -> YearSummary {
    let it = || scenes.iter().copied();
    let depth = |s: &SceneResult| s.estimate.depth.composite;
    let volume = |s: &SceneResult| s.estimate.volume_million_m3;

    YearSummary {
        year,
        records: scenes.len(),
        water_present: it().filter(|s| s.stats.water.is_present()).count(),
        non_vegetation_present: it().filter(|s| s.stats.non_vegetation.is_present()).count(),
        combined_present: it().filter(|s| s.stats.combined.is_present()).count(),
        mean_area_km2: mean(it().map(|s| s.area_km2)),
        max_area_km2: max(it().map(|s| s.area_km2)),
        min_area_km2: min(it().map(|s| s.area_km2)),
        mean_vegetation_index: mean(it().map(|s| s.mean_vegetation_index)),
        mean_water_index: mean(it().map(|s| s.mean_water_index)),
        mean_depth_m: mean(it().map(depth)),
        max_depth_m: max(it().map(depth)),
        mean_volume_million_m3: mean(it().map(volume)),
        max_volume_million_m3: max(it().map(volume)),
        water_ndwi: IndexRange::spanning(it().map(|s| s.stats.water.water_index.as_ref())),
        non_vegetation_ndvi: IndexRange::spanning(
            it().map(|s| s.stats.non_vegetation.vegetation_index.as_ref()),
        ),
        combined_ndwi: IndexRange::spanning(it().map(|s| s.stats.combined.water_index.as_ref())),
        combined_ndvi: IndexRange::spanning(
            it().map(|s| s.stats.combined.vegetation_index.as_ref()),
        ),
    }
}

/// One summary per year present among the processed scenes, ascending
pub fn yearly_summary(scenes: &[SceneResult]) -> Vec<YearSummary> {
    let mut by_year: BTreeMap<i32, Vec<&SceneResult>> = BTreeMap::new();
    for scene in scenes {
        by_year.entry(scene.key.year()).or_default().push(scene);
    }
    by_year
        .into_iter()
        .map(|(year, scenes)| summarize_year(year, &scenes))
        .collect()
}

/// Series-wide mean depth of every sub-model and of both combinations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelComparison {
    pub sub_models: Vec<(String, f64)>,
    pub composite: f64,
    pub simple_mean: f64,
}

pub fn model_comparison(series: &TimeSeries) -> Option<ModelComparison> {
    if series.is_empty() {
        return None;
    }
    Some(ModelComparison {
        sub_models: SubModel::ALL
            .iter()
            .map(|&m| (m.to_string(), mean(series.iter().map(|r| r.depth.get(m)))))
            .collect(),
        composite: mean(series.iter().map(|r| r.depth.composite)),
        simple_mean: mean(series.iter().map(|r| r.depth.simple_mean)),
    })
}

/// Record count per depth category, every category listed
pub fn depth_distribution(series: &TimeSeries) -> Vec<(DepthCategory, usize)> {
    DepthCategory::ALL
        .iter()
        .map(|&c| {
            let n = series
                .iter()
                .filter(|r| DepthCategory::from_depth(r.depth_m()) == c)
                .count();
            (c, n)
        })
        .collect()
}

/// Record count per water level, every level listed
pub fn level_distribution(series: &TimeSeries) -> Vec<(WaterLevel, usize)> {
    WaterLevel::ALL
        .iter()
        .map(|&l| (l, series.iter().filter(|r| r.level == l).count()))
        .collect()
}

/// A value and the date it was observed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extreme {
    pub date: NaiveDate,
    pub value: f64,
}

/// Record-setting dates of the series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extremes {
    pub largest_area: Extreme,
    pub smallest_area: Extreme,
    pub deepest: Extreme,
    pub largest_volume: Extreme,
}

/// Earliest record holding the maximum (or minimum) of `value`
fn extreme_by(series: &TimeSeries, value: fn(&TimeSeriesRecord) -> f64, largest: bool) -> Option<Extreme> {
    let mut best: Option<&TimeSeriesRecord> = None;
    for r in series {
        let better = match best {
            None => true,
            Some(b) if largest => value(r) > value(b),
            Some(b) => value(r) < value(b),
        };
        if better {
            best = Some(r);
        }
    }
    best.map(|r| Extreme {
        date: r.date,
        value: value(r),
    })
}

pub fn extremes(series: &TimeSeries) -> Option<Extremes> {
    Some(Extremes {
        largest_area: extreme_by(series, |r| r.area_km2, true)?,
        smallest_area: extreme_by(series, |r| r.area_km2, false)?,
        deepest: extreme_by(series, |r| r.depth_m(), true)?,
        largest_volume: extreme_by(series, |r| r.volume_million_m3, true)?,
    })
}

/// All aggregate views of one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub records: usize,
    pub water_present: usize,
    pub years: Vec<YearSummary>,
    pub models: Option<ModelComparison>,
    pub depth_categories: Vec<(DepthCategory, usize)>,
    pub levels: Vec<(WaterLevel, usize)>,
    pub extremes: Option<Extremes>,
}

/// Summarize a series together with the scene results it was built from
pub fn summarize(series: &TimeSeries, scenes: &[SceneResult]) -> SeriesSummary {
    SeriesSummary {
        records: series.len(),
        water_present: series.iter().filter(|r| r.water_present()).count(),
        years: yearly_summary(scenes),
        models: model_comparison(series),
        depth_categories: depth_distribution(series),
        levels: level_distribution(series),
        extremes: extremes(series),
    }
}
