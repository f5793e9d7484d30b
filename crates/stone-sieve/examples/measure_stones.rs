use std::{env, path::Path, path::PathBuf};

use stone_sieve::{derive_output_path, SieveRunConfig, StoneReport};

#[cfg(not(feature = "tracing"))]
use log::{info, warn, LevelFilter};
#[cfg(feature = "tracing")]
use tracing::{info, warn};

#[cfg(not(feature = "tracing"))]
use stone_sieve::core::init_with_level;
#[cfg(feature = "tracing")]
use stone_sieve::core::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tracing"))]
    init_with_level(LevelFilter::Info)?;
    #[cfg(feature = "tracing")]
    init_tracing(false, log::LevelFilter::Info);

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("testdata/sample1_run.json"));
    let cfg = SieveRunConfig::load_json(&config_path)?;
    let detector = cfg.build_detector()?;

    let mut reports: Vec<StoneReport> = Vec::new();
    for image in &cfg.images {
        let path = Path::new(image);
        let reference = match detector.find_reference_dimensions(path) {
            Ok(r) => r,
            Err(err) => {
                warn!("{image}: {err}");
                continue;
            }
        };
        info!(
            "{image}: reference {:.1} x {:.1} px",
            reference.dimensions.width_px, reference.dimensions.height_px
        );

        let output = cfg
            .annotate
            .then(|| derive_output_path(path, &cfg.output_suffix));
        let report = detector.measure_stones(path, &reference, output.as_deref())?;
        for stone in &report.stones {
            info!(
                "  {} {:.2} mm ({})",
                stone.label(),
                stone.shortest_width_mm,
                stone.class
            );
        }
        reports.push(report);
    }

    let tally = stone_sieve::aggregate(&reports);
    print!("{}", stone_sieve::report::summary(&tally));
    Ok(())
}
