mod check;
mod document;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

use declarg::{Record, Registry};

use crate::document::{DEFAULT_SHAPE_FILE, load_shape};

#[derive(Parser)]
#[command(name = "declarg")]
#[command(
    version,
    about = "Inspect and exercise declarative command-line shapes",
    long_about = None
)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample declarg.json shape document
    Init(InitArgs),

    /// Validate a shape document and report its registry
    Check(CheckArgs),

    /// Print rendered help for a shape
    Help(HelpArgs),

    /// Parse tokens against a shape and print the record as JSON
    Parse(ParseArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Overwrite an existing declarg.json
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the shape document (default: ./declarg.json)
    #[arg(short, long, value_name = "FILE")]
    shape: Option<PathBuf>,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct HelpArgs {
    /// Path to the shape document (default: ./declarg.json)
    #[arg(short, long, value_name = "FILE")]
    shape: Option<PathBuf>,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the shape document (default: ./declarg.json)
    #[arg(short, long, value_name = "FILE")]
    shape: Option<PathBuf>,

    /// Number of leading tokens to skip
    #[arg(long, default_value_t = 0, value_name = "N")]
    offset: usize,

    /// Tokens to parse (put them after `--` when they start with '-')
    #[arg(
        value_name = "TOKENS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    tokens: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Check(args) => check_command(args),
        Commands::Help(args) => help_command(args),
        Commands::Parse(args) => parse_command(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let path = document::write_default_document(&dir, args.force)?;

    eprintln!("Created: {}", path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {DEFAULT_SHAPE_FILE} to describe your command line");
    eprintln!("  2. Run: declarg check");
    eprintln!("  3. Run: declarg parse -- --name world");

    Ok(())
}

fn check_command(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let loaded = load_shape(args.shape.as_deref())?;
    let report = check::check_shape(&loaded.shape, &loaded.path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    eprintln!("=== Shape Check Results ===");
    eprintln!("Source: {}", report.source);
    let mut lines = Vec::new();
    check::describe(&report.shape, 0, &mut lines);
    for line in lines {
        eprintln!("{line}");
    }
    eprintln!("OK: shape is valid");

    Ok(())
}

fn help_command(args: HelpArgs) -> Result<()> {
    let loaded = load_shape(args.shape.as_deref())?;
    let registry = Registry::build(&loaded.shape)
        .with_context(|| format!("invalid shape in {}", loaded.path.display()))?;

    print!("{}", declarg::help(&registry));
    Ok(())
}

fn parse_command(args: ParseArgs) -> Result<()> {
    tracing::debug!(
        tokens = args.tokens.len(),
        offset = args.offset,
        "executing parse command"
    );

    let loaded = load_shape(args.shape.as_deref())?;
    let registry = Registry::build(&loaded.shape)
        .with_context(|| format!("invalid shape in {}", loaded.path.display()))?;

    let mut record = Record::new(loaded.shape);
    if let Err(err) = registry.parse(&args.tokens, args.offset, &mut record) {
        bail!("{:?}: {err}", err.kind());
    }

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
