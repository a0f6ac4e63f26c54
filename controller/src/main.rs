//! gesture-keys - full-body gestures to fighting-game key events
//!
//! Classifies skeleton frames from a tracking source into moves, jumps,
//! punches, kicks, and combos, and plays each as a timed key sequence.

mod commands;
mod config;
mod controller;
pub mod dispatch;
pub mod gesture;
pub mod keys;
mod replay;
mod run;
mod sexp;
pub mod skeleton;
mod stats;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail};
use clap::Parser;
use tracing::info;

use crate::config::Settings;
use crate::controller::Controller;
use crate::dispatch::{Clock, KeySink, SexpSink, SystemClock, TraceSink, VirtualClock};
use crate::gesture::{GestureClassifier, Mode};
use crate::replay::ReplaySource;

#[derive(Parser, Debug)]
#[command(name = "gesture-keys", about = "Skeleton gestures to fighting-game key events")]
struct Cli {
    /// Recorded skeleton stream to replay, one frame per line
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Config file (s-expression plist of thresholds and key codes)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Key output: trace (log only) or sexp (event lines on stdout)
    #[arg(long, default_value = "trace")]
    output: String,

    /// Initial facing: right or left
    #[arg(long)]
    mode: Option<String>,

    /// Replay on a virtual clock, as fast as possible
    #[arg(long)]
    virtual_time: bool,

    /// Only fire detectors whose joints are fully tracked
    #[arg(long)]
    require_tracked: bool,

    /// Debug logging by default
    #[arg(long)]
    verbose: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

/// Interval between status lines during long replays.
const STATUS_INTERVAL: Duration = Duration::from_secs(60);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gesture-keys {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Logs go to stderr; stdout may carry key events.
    let default_filter = if cli.verbose {
        "gesture_keys=debug"
    } else {
        "gesture_keys=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    info!("gesture-keys v{} starting", env!("CARGO_PKG_VERSION"));

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if cli.require_tracked {
        settings.gesture.require_tracked = true;
    }
    let mode = match cli.mode.as_deref() {
        Some(name) => Mode::from_name(name)
            .ok_or_else(|| anyhow!("Unknown mode: {}. Use: right or left", name))?,
        None => settings.mode.unwrap_or_default(),
    };

    let replay = cli
        .replay
        .clone()
        .ok_or_else(|| anyhow!("--replay <FILE> is required"))?;
    let mut source = ReplaySource::open(&replay)?;
    info!("replaying {}", replay.display());
    info!("config: {}", settings.gesture.config_sexp());
    info!("bindings: {}", settings.bindings.bindings_sexp());
    info!("initial mode: {}", mode.as_str());

    crate::run::install_signal_handlers();

    match (cli.output.as_str(), cli.virtual_time) {
        ("trace", false) => start(&settings, mode, TraceSink, SystemClock::new(), &mut source),
        ("trace", true) => start(&settings, mode, TraceSink, VirtualClock::new(), &mut source),
        ("sexp", false) => start(
            &settings,
            mode,
            SexpSink::new(std::io::stdout()),
            SystemClock::new(),
            &mut source,
        ),
        ("sexp", true) => start(
            &settings,
            mode,
            SexpSink::new(std::io::stdout()),
            VirtualClock::new(),
            &mut source,
        ),
        (other, _) => bail!("Unknown output: {}. Use: trace or sexp", other),
    }?;

    if source.malformed > 0 {
        info!("{} malformed recording lines skipped", source.malformed);
    }
    Ok(())
}

fn start<S: KeySink, C: Clock, R: std::io::BufRead>(
    settings: &Settings,
    mode: Mode,
    sink: S,
    clock: C,
    source: &mut ReplaySource<R>,
) -> anyhow::Result<()> {
    let classifier = GestureClassifier::new(settings.gesture.clone());
    let mut controller = Controller::new(classifier, settings.bindings.clone(), mode, sink, clock);
    let reason = crate::run::run(&mut controller, source, STATUS_INTERVAL)?;
    info!(
        "stopped ({:?}), facing {}",
        reason,
        controller.state().mode.as_str()
    );
    Ok(())
}
