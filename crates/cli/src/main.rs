//! LakeWatch CLI - Lake surface-water history from Landsat scenes

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lakewatch_algorithms::depth::{estimate, EstimateInput, SubModel};
use lakewatch_algorithms::imagery::SpectralIndex;
use lakewatch_algorithms::LakeConfig;
use lakewatch_core::io::{read_geotiff, write_geotiff};
use lakewatch_core::scene::{locate_scenes, SceneBundle, Sensor};
use lakewatch_core::Raster;
use lakewatch_pipeline::summary::SeriesSummary;
use lakewatch_pipeline::table::{
    write_scene_stats_file, write_series_file, write_yearly_summary_file,
};
use lakewatch_pipeline::{run_batch, scene_indices, ProcessingMode};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "lakewatch")]
#[command(author, version, about = "Lake surface-water history from Landsat scenes", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the scene bundles found under a directory
    Scan {
        /// Root directory of the clipped band rasters
        root: PathBuf,
    },
    /// Process every scene and write the time series
    Run {
        /// Root directory of the clipped band rasters
        root: PathBuf,
        /// Output series CSV
        #[arg(short, long, default_value = "lake_series.csv")]
        output: PathBuf,
        /// Also write per-scene mask statistics to this CSV
        #[arg(long)]
        stats: Option<PathBuf>,
        /// Also write the per-year summary to this CSV
        #[arg(long)]
        yearly: Option<PathBuf>,
        /// Print the series summary after processing
        #[arg(long)]
        summary: bool,
        /// Number of worker threads (all cores when omitted)
        #[arg(short, long)]
        threads: Option<usize>,
        /// Process scenes one at a time
        #[arg(long, conflicts_with = "threads")]
        sequential: bool,
    },
    /// Estimate depth, volume and water level for one set of inputs
    Estimate {
        /// Water surface area in km²
        #[arg(short, long)]
        area: f64,
        /// Mean water index (NDWI)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        ndwi: f64,
        /// Mean vegetation index (NDVI)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        ndvi: f64,
    },
    /// Write the NDWI and NDVI rasters of one scene
    Indices {
        /// Root directory of the clipped band rasters
        root: PathBuf,
        /// Acquisition date (YYYYMMDD or YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Sensor, required when several sensors share the date
        #[arg(short, long)]
        sensor: Option<Sensor>,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Print the effective configuration as TOML
    Config,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn scene_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} scenes {msg}")
    {
        pb.set_style(style);
    }
    pb
}

fn load_config(path: Option<&Path>) -> Result<LakeConfig> {
    match path {
        Some(path) => {
            let config = LakeConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            info!("Config: {}", path.display());
            Ok(config)
        }
        None => Ok(LakeConfig::default()),
    }
}

fn processing_mode(threads: Option<usize>, sequential: bool) -> ProcessingMode {
    match (sequential, threads) {
        (true, _) => ProcessingMode::Sequential,
        (false, Some(n)) => ProcessingMode::ParallelWith(n),
        (false, None) => ProcessingMode::Parallel,
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .with_context(|| format!("Invalid date: {} (expected YYYYMMDD or YYYY-MM-DD)", s))
}

fn read_raster(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(path).context("Failed to read raster")?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

fn write_result(raster: &Raster<f64>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn percent(n: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * n as f64 / total as f64
    }
}

fn print_summary(summary: &SeriesSummary) {
    println!("\nSummary:");
    println!("  Records: {}", summary.records);
    println!("  With water: {}", summary.water_present);

    println!("\nYearly:");
    for y in &summary.years {
        println!(
            "  {}: area mean {:.4} / max {:.4} / min {:.4} km², depth mean {:.2} / max {:.2} m, volume mean {:.3} / max {:.3} million m³ ({} records, {} with water, {} combined)",
            y.year,
            y.mean_area_km2,
            y.max_area_km2,
            y.min_area_km2,
            y.mean_depth_m,
            y.max_depth_m,
            y.mean_volume_million_m3,
            y.max_volume_million_m3,
            y.records,
            y.water_present,
            y.combined_present,
        );
        if let Some(r) = y.water_ndwi {
            println!("        water NDWI {:.4} .. {:.4}", r.min, r.max);
        }
        if let Some(r) = y.non_vegetation_ndvi {
            println!("        non-vegetation NDVI {:.4} .. {:.4}", r.min, r.max);
        }
    }

    if let Some(e) = &summary.extremes {
        println!("\nExtremes:");
        println!("  Largest area: {:.4} km² ({})", e.largest_area.value, e.largest_area.date);
        println!("  Smallest area: {:.4} km² ({})", e.smallest_area.value, e.smallest_area.date);
        println!("  Deepest: {:.2} m ({})", e.deepest.value, e.deepest.date);
        println!(
            "  Largest volume: {:.3} million m³ ({})",
            e.largest_volume.value, e.largest_volume.date
        );
    }

    if let Some(models) = &summary.models {
        println!("\nDepth models (series mean):");
        for (name, mean) in &models.sub_models {
            println!("  {:<17} {:.2} m", name, mean);
        }
        println!("  {:<17} {:.2} m", "composite", models.composite);
        println!("  {:<17} {:.2} m", "unweighted mean", models.simple_mean);
    }

    println!("\nDepth categories:");
    for (category, n) in &summary.depth_categories {
        println!("  {}: {} ({:.1}%)", category, n, percent(*n, summary.records));
    }

    println!("\nWater levels:");
    for (level, n) in &summary.levels {
        println!("  {}: {} ({:.1}%)", level, n, percent(*n, summary.records));
    }
}

fn select_bundle(
    bundles: impl Iterator<Item = SceneBundle>,
    date: NaiveDate,
    sensor: Option<Sensor>,
) -> Result<SceneBundle> {
    let mut matches: Vec<SceneBundle> = bundles
        .filter(|b| b.date == date && sensor.map_or(true, |s| b.sensor == s))
        .collect();

    match matches.len() {
        0 => bail!("No scene found for {}", date),
        1 => Ok(matches.remove(0)),
        _ => {
            let sensors: Vec<String> = matches.iter().map(|b| b.sensor.to_string()).collect();
            bail!(
                "Several scenes on {}: {}. Choose one with --sensor.",
                date,
                sensors.join(", ")
            )
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        // ── Scan ─────────────────────────────────────────────────────
        Commands::Scan { root } => {
            let bundles = locate_scenes(&root).context("Failed to scan scenes")?;
            println!("{} scene(s) under {}", bundles.len(), root.display());
            for (key, bundle) in &bundles {
                let bands: Vec<String> = bundle.bands().map(|(b, _)| b.to_string()).collect();
                let status = match config.bands.resolve(key.sensor) {
                    Err(e) => e.to_string(),
                    Ok(roles) => {
                        let missing: Vec<String> = roles
                            .iter()
                            .filter(|(_, band)| bundle.band_path(band).is_none())
                            .map(|(role, band)| format!("{} {}", role, band))
                            .collect();
                        if missing.is_empty() {
                            "complete".to_string()
                        } else {
                            format!("missing {}", missing.join(", "))
                        }
                    }
                };
                println!("  {}  [{}]  {}", key, bands.join(" "), status);
            }
        }

        // ── Run ──────────────────────────────────────────────────────
        Commands::Run {
            root,
            output,
            stats,
            yearly,
            summary,
            threads,
            sequential,
        } => {
            let start = Instant::now();
            let bundles = locate_scenes(&root).context("Failed to scan scenes")?;
            info!("Found {} scene(s) under {}", bundles.len(), root.display());

            let pb = scene_bar(bundles.len());
            let report = run_batch(
                &bundles,
                &config,
                processing_mode(threads, sequential),
                |outcome| {
                    pb.set_message(outcome.key().to_string());
                    pb.inc(1);
                },
            )
            .context("Batch processing failed")?;
            pb.finish_and_clear();

            println!(
                "Processed {} scene(s), skipped {}",
                report.processed(),
                report.skipped.len()
            );

            write_series_file(&report.series, &output).context("Failed to write series")?;
            if let Some(path) = &stats {
                write_scene_stats_file(&report.scenes, path)
                    .context("Failed to write scene statistics")?;
                println!("Scene statistics saved to: {}", path.display());
            }

            let series_summary = report.summary();
            if let Some(path) = &yearly {
                write_yearly_summary_file(&series_summary.years, path)
                    .context("Failed to write yearly summary")?;
                println!("Yearly summary saved to: {}", path.display());
            }
            if summary {
                print_summary(&series_summary);
            }
            done("Series", &output, start.elapsed());
        }

        // ── Estimate ─────────────────────────────────────────────────
        Commands::Estimate { area, ndwi, ndvi } => {
            let input = EstimateInput {
                area_km2: area,
                mean_water_index: ndwi,
                mean_vegetation_index: ndvi,
            };
            let out = estimate(&input, &config.estimator_params());

            println!("Area: {:.4} km², NDWI: {:.4}, NDVI: {:.4}", area, ndwi, ndvi);
            println!("\nDepth models:");
            for model in SubModel::ALL {
                println!(
                    "  {:<17} {:>6.2} m  (weight {:.2})",
                    model.to_string(),
                    out.depth.get(model),
                    config.depth.weights.get(model)
                );
            }
            println!("  {:<17} {:>6.2} m", "composite", out.depth.composite);
            println!("  {:<17} {:>6.2} m", "unweighted mean", out.depth.simple_mean);
            println!("\nVolume: {:.3} million m³", out.volume_million_m3);
            println!("Water level: {}", out.level);
        }

        // ── Indices ──────────────────────────────────────────────────
        Commands::Indices {
            root,
            date,
            sensor,
            out_dir,
        } => {
            let start = Instant::now();
            let date = parse_date(&date)?;
            let bundles = locate_scenes(&root).context("Failed to scan scenes")?;
            let bundle = select_bundle(bundles.into_values(), date, sensor)?;

            let pb = spinner("Computing indices...");
            let pair = scene_indices(&bundle, &config)
                .map_err(|reason| anyhow!("Scene {}: {}", bundle.key(), reason))?;
            pb.finish_and_clear();

            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;

            for index in [SpectralIndex::Ndwi, SpectralIndex::Ndvi] {
                let path = out_dir.join(format!(
                    "{}_{}_{}.tif",
                    bundle.sensor.prefix(),
                    bundle.date.format("%Y%m%d"),
                    index.short_name()
                ));
                write_result(&pair.masked(index), &path)?;
                done(&index.short_name().to_uppercase(), &path, start.elapsed());
            }
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let raster = read_raster(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!("Pixel area: {} m2", raster.transform().pixel_area());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                percent(stats.valid_count, raster.len())
            );
        }

        // ── Config ───────────────────────────────────────────────────
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
