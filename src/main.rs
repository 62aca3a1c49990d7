use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use egui::Vec2;
use log::{error, info, warn};

use trackdelta::{
    ComparisonMap, ComparisonMapRenderer, TrackDeltaError, build_comparison_map,
    comparison::compare_drivers, config::AppConfig, load_session_jsonl, ui::ComparisonViewerApp,
    writer,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the drivers of a session with their team and lap count
    Drivers {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Write an SVG circuit map of where each driver is faster
    Compare {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short = 'a', long)]
        driver_a: String,

        #[arg(short = 'b', long)]
        driver_b: String,

        /// Number of points on the shared distance grid
        #[arg(short, long)]
        points: Option<usize>,

        /// Speed delta in km/h below which neither driver counts as faster
        #[arg(short, long)]
        threshold: Option<f64>,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write both drivers' aligned telemetry as JSON Lines
    Export {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short = 'a', long)]
        driver_a: String,

        #[arg(short = 'b', long)]
        driver_b: String,

        #[arg(short, long)]
        points: Option<usize>,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Open the interactive comparison map
    View {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short = 'a', long)]
        driver_a: String,

        #[arg(short = 'b', long)]
        driver_b: String,

        #[arg(short, long)]
        points: Option<usize>,

        #[arg(short, long)]
        threshold: Option<f64>,
    },
    /// Store default comparison settings in the user config file
    Config {
        #[arg(short, long)]
        points: Option<usize>,

        #[arg(short, long)]
        threshold: Option<f64>,

        #[arg(long)]
        canvas_width: Option<u32>,

        #[arg(long)]
        canvas_height: Option<u32>,
    },
}

fn app_config(points: Option<usize>, threshold: Option<f64>) -> AppConfig {
    let mut app_config = AppConfig::from_local_file().unwrap_or_default();
    if let Some(points) = points {
        app_config.comparison.n_points = points;
    }
    if let Some(threshold) = threshold {
        app_config.comparison.threshold_kmh = threshold;
    }
    app_config
}

fn drivers(input: &Path) -> Result<(), TrackDeltaError> {
    let session = load_session_jsonl(input)?;
    let year = session
        .info
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{} {} ({})",
        year, session.info.event_name, session.info.session_type
    );
    for driver in &session.drivers {
        println!(
            "{:<4} {:<24} {} laps",
            driver.code,
            driver.team_name,
            session.laps_for(&driver.code).len()
        );
    }
    Ok(())
}

fn compare(
    input: &Path,
    driver_a: &str,
    driver_b: &str,
    app_config: &AppConfig,
    output: &Path,
) -> Result<(), TrackDeltaError> {
    let session = load_session_jsonl(input)?;
    let map = build_comparison_map(&session, driver_a, driver_b, &app_config.comparison);
    if let ComparisonMap::Unavailable { reason } = &map {
        println!("Telemetry unavailable: {}", reason);
    }

    let renderer = ComparisonMapRenderer::with_config(app_config.render.clone());
    let svg = match renderer.render(&map) {
        Ok(svg) => svg,
        Err(e) => {
            warn!("Could not draw comparison map: {}", e);
            println!("Telemetry unavailable: {}", e);
            renderer.render_unavailable(&e.to_string())?
        }
    };
    std::fs::write(output, svg).map_err(|e| TrackDeltaError::ExportError { source: e })?;
    info!("Comparison map written to {:?}", output);
    Ok(())
}

fn export(
    input: &Path,
    driver_a: &str,
    driver_b: &str,
    app_config: &AppConfig,
    output: &Path,
) -> Result<(), TrackDeltaError> {
    let session = load_session_jsonl(input)?;
    let comparison = compare_drivers(&session, driver_a, driver_b, &app_config.comparison)?;
    writer::write_aligned_lap(output, &comparison.aligned)
}

fn view(
    input: &Path,
    driver_a: &str,
    driver_b: &str,
    app_config: &AppConfig,
) -> Result<(), TrackDeltaError> {
    let session = load_session_jsonl(input)?;
    let map = build_comparison_map(&session, driver_a, driver_b, &app_config.comparison);
    let title = format!(
        "{} {}: {} vs {}",
        session.info.event_name, session.info.session_type, driver_a, driver_b
    );

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(1100., 700.));

    eframe::run_native(
        "trackdelta",
        native_options,
        Box::new(|_cc| Ok(Box::new(ComparisonViewerApp::new(map, title)))),
    )
    .expect("could not start app");
    Ok(())
}

fn save_config(
    points: Option<usize>,
    threshold: Option<f64>,
    canvas_width: Option<u32>,
    canvas_height: Option<u32>,
) -> Result<(), TrackDeltaError> {
    let mut app_config = app_config(points, threshold);
    app_config.comparison.validate()?;
    if let Some(width) = canvas_width {
        app_config.render.canvas_size.0 = width;
    }
    if let Some(height) = canvas_height {
        app_config.render.canvas_size.1 = height;
    }
    app_config.render.validate()?;
    app_config.save()?;
    if let Some(path) = AppConfig::local_path() {
        println!("Saved config to {:?}", path);
    }
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .expect("Could not set Ctrl-C handler");

    let result = match &cli.command {
        Commands::Drivers { input } => drivers(input),
        Commands::Compare {
            input,
            driver_a,
            driver_b,
            points,
            threshold,
            output,
        } => compare(
            input,
            driver_a,
            driver_b,
            &app_config(*points, *threshold),
            output,
        ),
        Commands::Export {
            input,
            driver_a,
            driver_b,
            points,
            output,
        } => export(input, driver_a, driver_b, &app_config(*points, None), output),
        Commands::View {
            input,
            driver_a,
            driver_b,
            points,
            threshold,
        } => view(input, driver_a, driver_b, &app_config(*points, *threshold)),
        Commands::Config {
            points,
            threshold,
            canvas_width,
            canvas_height,
        } => save_config(*points, *threshold, *canvas_width, *canvas_height),
    };

    if let Err(e) = result {
        error!("{:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
