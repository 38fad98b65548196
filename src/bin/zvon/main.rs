//! zvon - terminal player for the box synthesizer
//!
//! Run with: cargo run -- --volume 0.8 --tone

mod app;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::Player;

/// Play the box synthesizer through the default output device
#[derive(Debug, Clone, Parser)]
#[command(name = "zvon", version)]
pub struct Args {
    /// Master volume (0.0 - 1.0)
    #[arg(long, default_value_t = 0.8)]
    pub volume: f32,

    /// PCM buffer between the mixer and the device, in milliseconds
    #[arg(long, default_value_t = 60)]
    pub latency_ms: u32,

    /// Start with the test tone on channel 0
    #[arg(long)]
    pub tone: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    Player::new(Args::parse()).run()
}
