use clap::Parser;
use schedgen_rs::ScheduleError;
use schedgen_rs::config::CollectiveSpec;
use schedgen_rs::trace::TraceFormat;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "schedgen",
    about = "Compile a collective into per-rank send/recv schedules"
)]
struct Args {
    /// Read the collective description from a JSON file; other flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// binomialtree, dissemination, allreduce, alltoall, multi_allreduce, multi_alltoall
    #[arg(long)]
    collective: Option<String>,

    /// Allreduce: ring, recdoub, datasize_based. Alltoall: windowed, balanced, unbalanced
    #[arg(long)]
    algorithm: Option<String>,

    /// Ranks per communicator
    #[arg(long)]
    comm_size: Option<usize>,

    /// Payload size in bytes
    #[arg(long)]
    datasize: Option<u64>,

    /// Base tag
    #[arg(long)]
    tag: Option<u32>,

    /// Binomial tree direction: reduce or bcast
    #[arg(long)]
    direction: Option<String>,

    /// Concurrent exchanges per rank for windowed alltoall
    #[arg(long)]
    window_size: Option<usize>,

    /// Number of independent groups for multi_* collectives
    #[arg(long)]
    num_comm_groups: Option<usize>,

    /// Calc cost inserted after each allreduce receive
    #[arg(long)]
    compute_time: Option<u64>,

    /// Seed for unbalanced alltoall payload sizes
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: goal or json
    #[arg(long, default_value = "goal")]
    format: String,

    /// Output file; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("missing --{0} (and no --config given)")]
    MissingArg(&'static str),
    #[error("read {path}: {source}")]
    ReadConfig { path: PathBuf, source: io::Error },
    #[error("parse {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("write output: {0}")]
    Write(#[from] io::Error),
}

fn load_spec(args: &Args) -> Result<CollectiveSpec, CliError> {
    let mut spec = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| CliError::ParseConfig {
                path: path.clone(),
                source,
            })?
        }
        None => CollectiveSpec::new(
            args.collective
                .as_deref()
                .ok_or(CliError::MissingArg("collective"))?,
            args.comm_size.ok_or(CliError::MissingArg("comm-size"))?,
            args.datasize.ok_or(CliError::MissingArg("datasize"))?,
        ),
    };

    if let Some(collective) = &args.collective {
        spec.collective = collective.clone();
    }
    if let Some(comm_size) = args.comm_size {
        spec.comm_size = comm_size;
    }
    if let Some(datasize) = args.datasize {
        spec.datasize = datasize;
    }
    if args.algorithm.is_some() {
        spec.algorithm = args.algorithm.clone();
    }
    if args.direction.is_some() {
        spec.direction = args.direction.clone();
    }
    if let Some(tag) = args.tag {
        spec.tag = tag;
    }
    if let Some(window_size) = args.window_size {
        spec.window_size = window_size;
    }
    if let Some(num_comm_groups) = args.num_comm_groups {
        spec.num_comm_groups = num_comm_groups;
    }
    if let Some(compute_time) = args.compute_time {
        spec.compute_time = compute_time;
    }
    if args.seed.is_some() {
        spec.seed = args.seed;
    }
    Ok(spec)
}

fn run(args: Args) -> Result<(), CliError> {
    let format = TraceFormat::parse(&args.format)?;
    let spec = load_spec(&args)?;
    let schedule = spec.build()?;

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(fs::File::create(path)?);
            format.write(&schedule, &mut out)?;
            out.flush()?;
            info!(path = %path.display(), "schedule written");
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            format.write(&schedule, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}
