//! `shelf`: run the library aggregation pipeline over a snapshot file.

mod error;
mod render;
mod snapshot;

use crate::error::{ErrorKind, Result};
use crate::snapshot::{Snapshot, SnapshotSource};
use clap::{ArgAction, Parser, Subcommand};
use exn::ResultExt;
use futures::StreamExt;
use shelf_asyncutils::Observable;
use shelf_library::Context;
use shelf_library::pipeline::{Triggers, library_stream};
use std::io::Write;
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Preferences file (TOML, YAML or JSON). Defaults to `shelf.toml` in
    /// the platform's configuration directory, if present.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the library built from a snapshot file.
    Show {
        /// JSON snapshot of the library and its lookups.
        snapshot: PathBuf,
        /// Keep running, printing the library again whenever the snapshot
        /// file changes.
        #[arg(short, long)]
        watch: bool,
        /// How often to check the snapshot for changes, in milliseconds.
        #[arg(long, default_value_t = 500, requires = "watch")]
        interval: u64,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli).await.map_err(|err| miette::miette!("{err:?}"))
}

async fn run(cli: Cli) -> Result<()> {
    let prefs = shelf_config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Show { snapshot, watch, interval } => {
            let source = SnapshotSource::new(Snapshot::read(&snapshot).await?);
            let display = prefs.display;
            let triggers = Triggers::default();
            let ctx = Context::new(Arc::new(source.clone()));
            let mut libraries = pin!(library_stream(&source, ctx, Observable::new(prefs), &triggers));

            let watcher = watch.then(|| {
                tokio::spawn(snapshot::watch(snapshot.clone(), source.clone(), Duration::from_millis(interval)))
            });
            let mut stdout = std::io::stdout().lock();
            while let Some(library) = libraries.next().await {
                let library = library.or_raise(|| ErrorKind::Pipeline)?;
                render::write_library(&mut stdout, &library, &display).or_raise(|| ErrorKind::Output)?;
                if !watch {
                    break;
                }
                writeln!(stdout).or_raise(|| ErrorKind::Output)?;
                stdout.flush().or_raise(|| ErrorKind::Output)?;
            }
            if let Some(watcher) = watcher {
                watcher.abort();
            }
            Ok(())
        },
    }
}
