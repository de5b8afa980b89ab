use std::path::PathBuf;

use dissolve::Strategy;

/// Dissolve department polygons into province boundaries
#[derive(clap::Parser, Debug)]
#[command(name = "dissolve", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Merge every group of the input into one geometry
    Merge(MergeArgs),

    /// Validate members without merging, reporting what would be excluded
    Check(CheckArgs),
}

/// Where to read records from and which properties to use.
#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// Input GeoJSON FeatureCollection
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Feature property holding the group key [default: provincia]
    #[arg(long)]
    pub key_property: Option<String>,

    /// Feature property holding the member name [default: departamento]
    #[arg(long)]
    pub name_property: Option<String>,

    /// Write diagnostics to this JSON file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub diagnostics: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output GeoJSON file, defaults to "./dissolved.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Reduction strategy: balanced-tree or left-fold
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Merge vertices closer than this distance
    #[arg(long)]
    pub snap_tolerance: Option<f64>,

    /// Keep collinear pass-through vertices in output rings
    #[arg(long)]
    pub keep_collinear: bool,

    /// Process groups one at a time on the current thread
    #[arg(long)]
    pub sequential: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputArgs,
}
