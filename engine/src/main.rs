//! gesture-engine: stream landmark frames in on stdin, gesture events out
//! on stdout, one s-expression per line.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use gesture_engine::gesture::GestureConfig;
use gesture_engine::ipc::handle_message;
use gesture_engine::state::EngineState;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "gesture-engine", about = "Hand gesture event engine")]
struct Cli {
    /// Use the permissive wave preset (small, quick waves)
    #[arg(long)]
    permissive: bool,

    /// Seconds a fired wave stays on display
    #[arg(long)]
    hold_s: Option<f64>,

    /// Camera frame width in pixels, enables label anchors
    #[arg(long, requires = "frame_height")]
    frame_width: Option<u32>,

    /// Camera frame height in pixels
    #[arg(long, requires = "frame_width")]
    frame_height: Option<u32>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gesture-engine {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_engine=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    info!("gesture-engine v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = if cli.permissive {
        info!("using permissive wave preset");
        GestureConfig::permissive()
    } else {
        GestureConfig::default()
    };
    if let Some(hold) = cli.hold_s {
        anyhow::ensure!(
            hold.is_finite() && hold >= 0.0,
            "--hold-s must be finite and non-negative, got {hold}"
        );
        config.display_hold_s = hold;
    }
    let frame_size = cli.frame_width.zip(cli.frame_height);

    let mut state = EngineState::new(config, frame_size);

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        for response in handle_message(&mut state, line) {
            writeln!(out, "{}", response).context("writing stdout")?;
        }
        out.flush().context("flushing stdout")?;
    }

    debug!(frames = state.frames_in, errors = state.errors, "input closed");
    info!("gesture-engine exiting");
    Ok(())
}
