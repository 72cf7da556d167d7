use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The mdcontacts Developers",
    version,
    about = "mdcontacts CLI - Detects atomic contacts and hydrogen bonds in molecular dynamics trajectories, then filters, reweights and ranks them.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of detection workers.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect contacts between two selections over a trajectory and write a contact table.
    Detect(DetectArgs),
    /// Evaluate an atom selection on one frame of a trajectory.
    Select(SelectArgs),
}

/// Arguments for the `detect` subcommand.
#[derive(Args, Debug)]
pub struct DetectArgs {
    // --- Core Arguments ---
    /// Path to the input trajectory (multi-model PDB).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output contact table (CSV). Writes to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Detection Overrides ---
    /// First atom selection (e.g., "segid A and protein").
    #[arg(long = "sel1", value_name = "EXPR")]
    pub selection_1: Option<String>,

    /// Second atom selection, or "self" to analyze the first selection against itself.
    #[arg(long = "sel2", value_name = "EXPR")]
    pub selection_2: Option<String>,

    /// Heavy-atom contact cutoff in Å.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Hydrogen-acceptor distance cutoff in Å.
    #[arg(long, value_name = "FLOAT")]
    pub hbond_cutoff: Option<f64>,

    /// Minimum donor-hydrogen-acceptor angle in degrees.
    #[arg(long, value_name = "DEGREES")]
    pub hbond_angle: Option<f64>,

    /// Attach hydrogens without CONECT records to the nearest heavy atom of their residue.
    #[arg(long)]
    pub guess_bonds: bool,

    // --- Time Parameters ---
    /// Simulated time covered by one frame, in nanoseconds.
    #[arg(long, value_name = "FLOAT")]
    pub ns_per_frame: Option<f64>,

    /// Score above which a frame counts as "in contact".
    #[arg(long, value_name = "FLOAT")]
    pub threshold: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S detection.cutoff=4.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `select` subcommand.
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Path to the input trajectory (multi-model PDB).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// The selection expression to evaluate.
    #[arg(required = true, value_name = "EXPR")]
    pub expression: String,

    /// Frame to evaluate position-dependent selections on.
    #[arg(short, long, default_value_t = 0, value_name = "INT")]
    pub frame: usize,

    /// Print every matched atom instead of only the count.
    #[arg(short, long)]
    pub list: bool,
}
