//! partials - Terminal front end for the additive synth engine
//!
//! Run with: cargo run -- --base-frequency 55

mod app;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use partials::EngineConfig;
use tracing_subscriber::EnvFilter;

use app::Partials;

#[derive(Parser)]
#[command(name = "partials")]
#[command(about = "32-partial additive synthesizer", long_about = None)]
struct Cli {
    /// TOML file with engine settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fundamental in Hz before the pitch ratio
    #[arg(short = 'f', long)]
    base_frequency: Option<f64>,

    /// Samples per control block
    #[arg(short, long)]
    block_size: Option<usize>,

    /// Seed for the random modulators
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn engine_config(&self) -> color_eyre::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)
                .wrap_err_with(|| format!("failed to load {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(hz) = self.base_frequency {
            config.base_frequency = hz;
        }
        if let Some(size) = self.block_size {
            config.block_size = size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate().wrap_err("invalid engine settings")?;
        Ok(config)
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // The TUI owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.engine_config()?;

    Partials::new(config).run()
}
