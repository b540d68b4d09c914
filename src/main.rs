// PlayWise - playlist engine in the terminal
// Loads config, sets up logging, then hands stdin (or a script) to the shell

use anyhow::{Context, Result};
use clap::Parser;
use playwise::{run_shell, Config, Session};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "playwise")]
#[command(about = "In-memory playlist manager: linked list, history stack, rating tree and title lookup")]
struct Args {
    /// Enable developer logging (stderr + file)
    #[arg(long)]
    dev: bool,

    /// Config file to use instead of the one in the user config dir
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start with an empty playlist even if the config asks for demo songs
    #[arg(long)]
    no_demo: bool,

    /// Read commands from a file instead of stdin
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,
}

fn init_logging(log_dir: &Path, default_filter: &str, dev: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(log_dir, "playwise.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter);

    let installed = if dev {
        builder.with_writer(file_writer.and(io::stderr)).try_init()
    } else {
        builder.with_writer(file_writer).try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    Ok(guard)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Keep the guard alive so buffered log lines get flushed on exit
    let _guard = init_logging(&config.logging.directory, &config.logging.filter, args.dev)?;
    info!("PlayWise starting up");

    let load_demo = config.load_demo_songs && !args.no_demo;
    let mut session = Session::new(config);
    if load_demo {
        session.load_demo_songs()?;
    }

    println!("Welcome to the PlayWise Smart Music Engine - type 'help' for commands");

    let stdout = io::stdout();
    match &args.script {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open script {}", path.display()))?;
            run_shell(&mut session, BufReader::new(file), stdout.lock())?;
        }
        None => run_shell(&mut session, io::stdin().lock(), stdout.lock())?,
    }

    info!("PlayWise shutting down");
    Ok(())
}
