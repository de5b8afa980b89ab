use anyhow::Result;
use dissolve::group_records;
use tracing::info;

use super::{load_config, read_input, write_diagnostics};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::CheckArgs) -> Result<()> {
    let config = load_config(&args.input)?;
    let read = read_input(&args.input, &config)?;

    let mut diagnostics = read.diagnostics;
    let groups = group_records(read.records);
    for group in &groups {
        let (valid, found) = group.check();
        info!(group = %group.key, members = group.len(), valid, "checked group");
        diagnostics.extend(found);
    }

    write_diagnostics(&args.input, &diagnostics)?;
    info!(groups = groups.len(), diagnostics = diagnostics.len(), "done");
    Ok(())
}
