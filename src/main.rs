//! India Crime Dashboard - NCRB IPC statistics by state, year and category.

use anyhow::{anyhow, Context};
use clap::Parser;
use crime_dashboard::charts::StaticChartRenderer;
use crime_dashboard::config::AppConfig;
use crime_dashboard::data::{
    Aggregator, CrimeType, DatasetLoader, FilterSelection, StateFilter, UnifiedTable,
};
use crime_dashboard::geo::{ChoroplethLayer, NameMatcher, StateBoundaries};
use crime_dashboard::gui::DashboardApp;
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(version, about = "Interactive crime analysis across India")]
struct Args {
    /// TOML config file (defaults to ./crime_dashboard.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the NCRB CSV files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// State boundaries GeoJSON file
    #[arg(long)]
    boundaries: Option<PathBuf>,

    /// Initial year (defaults to the latest year in the data)
    #[arg(short, long)]
    year: Option<i32>,

    /// Initial state, or "All"
    #[arg(short, long)]
    state: Option<String>,

    /// Initial crime type, e.g. "Murder" or "kidnapping-abduction"
    #[arg(long)]
    crime: Option<CrimeType>,

    /// Write the charts and aggregates to this directory instead of opening a window
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = args.data_dir {
        config.data.data_dir = dir;
    }
    if let Some(path) = args.boundaries {
        config.boundaries.path = Some(path);
    }

    let loader = DatasetLoader::new(config.data.source_paths());
    let table = Arc::new(loader.load().context("Failed to load crime data")?);

    let boundaries = config.boundary_path().and_then(|path| {
        match StateBoundaries::load(&path, &config.boundaries.name_property) {
            Ok(boundaries) => Some(boundaries),
            Err(e) => {
                log::warn!("Map disabled, {}: {}", path.display(), e);
                None
            }
        }
    });
    let matcher = NameMatcher::new(&config.boundaries.aliases);

    let selection = initial_selection(args.year, args.state, args.crime, &config, &table)?;

    if let Some(dir) = args.export {
        let (result, errors) = Aggregator::compute(&table, &selection).into_partial();
        for error in &errors {
            log::warn!("Skipping a table in the export: {}", error);
        }
        let layer = boundaries
            .as_ref()
            .map(|b| ChoroplethLayer::join(b, &result.state_totals, &matcher));
        let files =
            StaticChartRenderer::export_dashboard(&dir, &selection, &result, layer.as_ref())
                .with_context(|| format!("Failed to export to {}", dir.display()))?;
        for file in files {
            println!("{}", file.display());
        }
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("India Crime Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "India Crime Dashboard",
        options,
        Box::new(|cc| {
            Ok(Box::new(DashboardApp::new(
                cc, table, boundaries, matcher, selection,
            )))
        }),
    )
    .map_err(|e| anyhow!("{e}"))
}

/// Command line first, then config, then the latest year with all states.
fn initial_selection(
    year: Option<i32>,
    state: Option<String>,
    crime: Option<CrimeType>,
    config: &AppConfig,
    table: &UnifiedTable,
) -> anyhow::Result<FilterSelection> {
    let crime = crime.unwrap_or(config.defaults.crime_type);
    let latest = FilterSelection::latest(table, crime)
        .ok_or_else(|| anyhow!("Crime data has no years"))?;

    let year = year.or(config.defaults.year).unwrap_or(latest.year);
    let state = StateFilter::from_name(state.as_deref().unwrap_or(&config.defaults.state));
    Ok(FilterSelection::new(year, state, crime))
}
