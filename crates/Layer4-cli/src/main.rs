//! Vector CLI - Main entry point

mod cli;

use clap::Parser;
use cli::Command;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vector_foundation::VectorConfig;
use vector_task::TaskManager;

/// Vector - launch and poll per-session diagnostic tasks
#[derive(Parser, Debug)]
#[command(name = "vector")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file to load on top of the global one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding status records
    #[arg(long, global = true)]
    working_dir: Option<PathBuf>,

    /// Directory holding worker scripts
    #[arg(long, global = true)]
    script_dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Load configuration
    let mut config = VectorConfig::load(args.config.as_deref())?;
    if let Some(dir) = &args.working_dir {
        config.working_dir = dir.clone();
    }
    if let Some(dir) = &args.script_dir {
        config.script_dir = dir.clone();
    }
    config.validate()?;

    init_logging(&args, &config)?;
    tracing::debug!(
        "Working dir: {}, script dir: {}",
        config.working_dir.display(),
        config.script_dir.display()
    );

    // 요청마다 새 프로세스 - 기록 정리는 reset에서만
    let manager = TaskManager::new(&config);
    cli::run(&manager, args.command)
}

fn init_logging(args: &Args, config: &VectorConfig) -> anyhow::Result<()> {
    let log_level = if args.debug {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // stdout은 상태 문자열 전용
    let (stderr_layer, file_layer) = match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            (Some(layer), None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
