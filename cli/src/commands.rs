pub mod check;
pub mod merge;

use anyhow::Result;
use dissolve::io::geojson::{self, Properties, ReadOutput};
use dissolve::{Diagnostic, DissolveConfig};
use tracing::info;

use crate::cli::InputArgs;

/// Config file (if any) with the shared input flags applied on top.
pub(crate) fn load_config(args: &InputArgs) -> Result<DissolveConfig> {
    let mut config = match &args.config {
        Some(path) => DissolveConfig::from_json_file(path)?,
        None => DissolveConfig::default(),
    };
    if let Some(key) = &args.key_property {
        config.key_property = key.clone();
    }
    if let Some(name) = &args.name_property {
        config.name_property = name.clone();
    }
    Ok(config)
}

pub(crate) fn read_input(args: &InputArgs, config: &DissolveConfig) -> Result<ReadOutput> {
    info!(path = %args.input.display(), key = %config.key_property, "reading features");
    let properties = Properties { key: &config.key_property, name: &config.name_property };
    geojson::read_records_from_file(&args.input, properties)
}

pub(crate) fn write_diagnostics(args: &InputArgs, diagnostics: &[Diagnostic]) -> Result<()> {
    if let Some(path) = &args.diagnostics {
        info!(path = %path.display(), count = diagnostics.len(), "writing diagnostics");
        geojson::write_diagnostics(path, diagnostics)?;
    }
    Ok(())
}
