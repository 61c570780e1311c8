//! grade - color grading pipeline CLI
//!
//! Dumps and validates parameter files, probes single pixels and grades raw
//! float buffers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "grade")]
#[command(author, version, about = "Scene-linear color grading pipeline")]
#[command(long_about = "
Runs the two-phase grading pipeline on scene-linear RGBA data.

Examples:
  grade defaults > look.yaml                 # Write the default parameters
  grade validate look.yaml                   # Check a parameter file
  grade probe 0.8 0.2 0.1 --params look.yaml # Grade one pixel, show band masks
  grade apply in.raw out.raw -W 1920 -H 1080 --params look.yaml
  grade apply in.raw out.raw -W 64 -H 64 --factor 0.5 --glare glare.raw
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default parameters as YAML
    Defaults(DefaultsArgs),

    /// Load and validate a parameter file
    #[command(visible_alias = "v")]
    Validate(ValidateArgs),

    /// Grade a single pixel and print its hue band masks
    #[command(visible_alias = "p")]
    Probe(ProbeArgs),

    /// Grade a raw little-endian RGBA float buffer
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),
}

#[derive(Args)]
struct DefaultsArgs {
    /// Enable every stage, including the ones off by default
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct ValidateArgs {
    /// Parameter file(s)
    #[arg(required = true)]
    params: Vec<PathBuf>,
}

#[derive(Args)]
struct ProbeArgs {
    /// Red
    #[arg(allow_negative_numbers = true)]
    r: f32,
    /// Green
    #[arg(allow_negative_numbers = true)]
    g: f32,
    /// Blue
    #[arg(allow_negative_numbers = true)]
    b: f32,
    /// Alpha
    #[arg(default_value = "1.0")]
    a: f32,

    /// Parameter file (defaults when omitted)
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Overall grade amount
    #[arg(short, long, default_value = "1.0")]
    factor: f32,
}

#[derive(Args)]
struct ApplyArgs {
    /// Input buffer
    input: PathBuf,

    /// Output buffer
    output: PathBuf,

    /// Width in pixels
    #[arg(short = 'W', long)]
    width: u32,

    /// Height in pixels
    #[arg(short = 'H', long)]
    height: u32,

    /// Parameter file (defaults when omitted)
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Overall grade amount
    #[arg(short, long, default_value = "1.0")]
    factor: f32,

    /// Also write the glare contribution to this file
    #[arg(long)]
    glare: Option<PathBuf>,

    /// Input is premultiplied (output stays premultiplied)
    #[arg(long)]
    premultiplied: bool,

    /// Buffers hold half floats instead of 32-bit floats
    #[arg(long)]
    half: bool,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "grade_ops=debug,grade=debug,info",
        _ => "grade_ops=trace,grade=trace,debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Defaults(args) => commands::defaults::run(args),
        Commands::Validate(args) => commands::validate::run(args, cli.verbose),
        Commands::Probe(args) => commands::probe::run(args, cli.verbose),
        Commands::Apply(args) => commands::apply::run(args, cli.verbose),
    }
}
