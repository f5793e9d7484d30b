use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use stone_sieve::detect::{MissingCalibrationPolicy, ReferenceStrategy, ScaleModel};
use stone_sieve::{load_calibration_json, SieveRun, SieveRunConfig, SieveRunError};

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

const DEFAULT_REFERENCE_TOLERANCE: f64 = 0.15;

/// Sieve-style size distribution of stones photographed next to a reference object.
#[derive(Parser, Debug)]
#[command(name = "stone-sieve", version, long_about = None)]
struct Args {
    /// Photos to analyze, appended to the images of `--config`
    images: Vec<PathBuf>,

    /// JSON run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON calibration table, replaces the configured one
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Behaviour for photos no calibration entry matches
    #[arg(long, value_enum)]
    on_missing_calibration: Option<MissingArg>,

    /// Pick the reference by rectangle aspect ratio (long / short) instead of largest area
    #[arg(long)]
    reference_ratio: Option<f64>,

    /// Allowed deviation from `--reference-ratio` [default: 0.15]
    #[arg(long, requires = "reference_ratio")]
    reference_tolerance: Option<f64>,

    /// Multiplier applied to the side / reference ratio
    #[arg(long, conflicts_with = "dpi")]
    side_scale: Option<f64>,

    /// Convert pixels at a fixed resolution instead of against the reference
    #[arg(long)]
    dpi: Option<f64>,

    /// Contours with an enclosed area at or below this many pixels are noise
    #[arg(long)]
    min_area: Option<f64>,

    /// Do not write annotated images
    #[arg(long)]
    no_annotate: bool,

    /// Suffix inserted before the extension of annotated images
    #[arg(long)]
    output_suffix: Option<String>,

    /// TrueType/OpenType font for stone labels instead of the bundled one
    #[arg(long)]
    font: Option<PathBuf>,

    /// Write a JSON report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Stop at the first photo that fails
    #[arg(long)]
    fail_fast: bool,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit JSON log lines
    #[cfg(feature = "tracing")]
    #[arg(long)]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MissingArg {
    Uncalibrated,
    Reject,
}

impl From<MissingArg> for MissingCalibrationPolicy {
    fn from(arg: MissingArg) -> Self {
        match arg {
            MissingArg::Uncalibrated => MissingCalibrationPolicy::Uncalibrated,
            MissingArg::Reject => MissingCalibrationPolicy::Reject,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when at least one photo failed.
fn run(args: Args) -> Result<bool, SieveRunError> {
    let config = build_config(args)?;
    let run = SieveRun::new(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = run.run(&mut out)?;
    out.flush()?;

    let all_ok = report.failed().next().is_none();
    Ok(all_ok)
}

fn build_config(args: Args) -> Result<SieveRunConfig, SieveRunError> {
    let mut config = match &args.config {
        Some(path) => SieveRunConfig::load_json(path)?,
        None => SieveRunConfig::default(),
    };

    config
        .images
        .extend(args.images.iter().map(|p| p.to_string_lossy().into_owned()));

    if let Some(path) = &args.calibration {
        config.calibration = load_calibration_json(path)?;
    }
    if let Some(policy) = args.on_missing_calibration {
        config.calibration.on_missing = policy.into();
    }
    if let Some(ratio) = args.reference_ratio {
        config.detector.reference = ReferenceStrategy::AspectRatio {
            ratio,
            tolerance: args
                .reference_tolerance
                .unwrap_or(DEFAULT_REFERENCE_TOLERANCE),
        };
    }
    if let Some(side_scale) = args.side_scale {
        config.detector.scale = ScaleModel::ReferenceRatio { side_scale };
    }
    if let Some(dpi) = args.dpi {
        config.detector.scale = ScaleModel::Dpi { dpi };
    }
    if let Some(min_area) = args.min_area {
        config.detector.min_contour_area = min_area;
    }
    if args.no_annotate {
        config.annotate = false;
    }
    if let Some(suffix) = args.output_suffix {
        config.output_suffix = suffix;
    }
    if let Some(font) = &args.font {
        config.font_path = Some(font.to_string_lossy().into_owned());
    }
    if let Some(report) = &args.report {
        config.report_path = Some(report.to_string_lossy().into_owned());
    }
    if args.fail_fast {
        config.fail_fast = true;
    }

    log::debug!("run config: {config:?}");
    Ok(config)
}

fn init_logging(args: &Args) {
    let level = stone_sieve::core::level_from_verbosity(args.verbose);

    #[cfg(not(feature = "tracing"))]
    {
        let _ = stone_sieve::core::init_with_level(level);
    }

    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        stone_sieve::core::init_tracing(args.log_json, level);
    }
}
