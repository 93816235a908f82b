//! Command-line front end: diff two registry snapshots into a document, or
//! flatten documents into delimited rows.

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use reg_differ::{
    classify, header_row, read_document, write_document, write_records, Action, DiffDocument,
    DiffMetadata, FlattenConfig, Snapshot,
};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

#[derive(Parser)]
#[command(name = "reg-differ", version, about)]
struct Cli {
    /// Enable verbose diagnostics.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two registry snapshots and write a diff document.
    Diff(DiffArgs),

    /// Flatten diff documents into delimited rows.
    Flatten(FlattenArgs),
}

#[derive(Args)]
struct DiffArgs {
    /// Baseline snapshot file.
    #[arg(long)]
    baseline: PathBuf,

    /// Delta snapshot file.
    #[arg(long)]
    delta: PathBuf,

    /// Name of the application that produced the delta.
    #[arg(long)]
    app: String,

    /// NSRL application identifier.
    #[arg(long)]
    nsrl: Option<String>,

    /// Action that produced the delta: I, D, E, or O.
    #[arg(long, value_parser = parse_action)]
    action: Action,

    /// Output document file.
    #[arg(short, long)]
    output: PathBuf,

    /// Host CPU architecture recorded in the document.
    #[arg(long, default_value = std::env::consts::ARCH)]
    arch: String,

    /// Host system name recorded in the document.
    #[arg(long, default_value = "")]
    sys: String,

    /// Operating system name recorded in the document.
    #[arg(long, default_value = std::env::consts::OS)]
    os: String,

    /// Operating system version recorded in the document.
    #[arg(long, default_value = "")]
    osver: String,

    /// User recorded in the document.
    #[arg(long)]
    user: Option<String>,
}

#[derive(Args)]
struct FlattenArgs {
    /// Diff document files to flatten, in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (stdout when omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include provenance/host columns in every row.
    #[arg(long)]
    debug: bool,

    /// Column delimiter.
    #[arg(long, default_value = "\t")]
    delimiter: char,

    /// Suppress the header row.
    #[arg(long)]
    no_header: bool,

    /// Open the output in append mode instead of truncating.
    #[arg(long)]
    append: bool,
}

fn parse_action(s: &str) -> Result<Action, String> {
    Action::from_str(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Diff(args) => run_diff(args),
        Command::Flatten(args) => run_flatten(args),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let snapshot = Snapshot::open(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    for line in &snapshot.malformed_lines {
        warn!(file = %path.display(), line, "Skipped malformed line");
    }
    Ok(snapshot)
}

fn run_diff(args: DiffArgs) -> anyhow::Result<()> {
    let baseline = load_snapshot(&args.baseline)?;
    let delta = load_snapshot(&args.delta)?;

    let metadata = DiffMetadata {
        baseline_file: display_name(&args.baseline),
        baseline_hash: reg_differ::utils::file_digest_hex(&args.baseline)
            .with_context(|| format!("failed to digest {}", args.baseline.display()))?,
        delta_file: display_name(&args.delta),
        delta_hash: reg_differ::utils::file_digest_hex(&args.delta)
            .with_context(|| format!("failed to digest {}", args.delta.display()))?,
        app_name: args.app,
        nsrl_id: args.nsrl,
        action: args.action,
        host_arch: args.arch,
        host_system_name: args.sys,
        host_os_name: args.os,
        host_os_version: args.osver,
        user: args
            .user
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_default(),
        timestamp: Utc::now().to_rfc3339(),
    };

    let document = DiffDocument::new(metadata, classify(&baseline, &delta));
    fs::write(&args.output, write_document(&document))
        .with_context(|| format!("failed to write document {}", args.output.display()))?;

    Ok(())
}

fn run_flatten(args: FlattenArgs) -> anyhow::Result<()> {
    let config = FlattenConfig {
        debug: args.debug,
        delimiter: args.delimiter,
    };

    let mut out: BufWriter<Box<dyn Write>> = BufWriter::new(match &args.output {
        Some(path) => {
            let file = if args.append {
                OpenOptions::new().create(true).append(true).open(path)
            } else {
                File::create(path)
            }
            .with_context(|| format!("failed to open output {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    });

    // Any failure on the shared output stream is fatal for the whole run;
    // a document that cannot be read is skipped and the batch continues.
    if !args.no_header {
        writeln!(out, "{}", header_row(&config)).context("failed to write output")?;
    }

    for input in &args.inputs {
        let document = match read_input_document(input) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(file = %input.display(), error = %err, "Skipping unreadable document");
                continue;
            }
        };
        write_records(&document, &mut out, &config).context("failed to write output")?;
    }

    out.flush().context("failed to write output")?;
    Ok(())
}

fn read_input_document(path: &Path) -> anyhow::Result<DiffDocument> {
    let text = fs::read_to_string(path)?;
    Ok(read_document(&text)?)
}
