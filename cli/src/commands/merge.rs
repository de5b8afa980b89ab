use std::path::PathBuf;

use anyhow::Result;
use dissolve::io::geojson;
use dissolve::Dissolver;
use tracing::{info, warn};

use super::{load_config, read_input, write_diagnostics};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::MergeArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or_else(|| PathBuf::from("./dissolved.geojson"));

    let mut config = load_config(&args.input)?;
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(tolerance) = args.snap_tolerance {
        config.snap_tolerance = tolerance;
    }
    if args.keep_collinear {
        config.simplify_collinear = false;
    }
    if args.sequential {
        config.parallel = false;
    }
    config.validate()?;

    let read = read_input(&args.input, &config)?;
    info!(
        records = read.records.len(),
        skipped = read.diagnostics.len(),
        strategy = %config.strategy,
        parallel = config.parallel,
        "dissolving"
    );

    let output = Dissolver::new(config).run(read.records);
    for failure in &output.failures {
        warn!("{failure}");
    }

    info!(path = %out_path.display(), groups = output.results.len(), "writing results");
    geojson::write_results(&out_path, &output.results)?;

    let mut diagnostics = read.diagnostics;
    diagnostics.extend(output.diagnostics);
    write_diagnostics(&args.input, &diagnostics)?;

    info!(
        groups = output.results.len(),
        failed = output.failures.len(),
        diagnostics = diagnostics.len(),
        "done"
    );
    Ok(())
}
