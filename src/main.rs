use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use appshelf::app::controller::ModuleKind;
use appshelf::config::HostConfig;
use appshelf::platform::{HeadlessHost, HostError};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "appshelf", about = "Run Arkanoid or the prime calculator")]
struct Cli {
    /// Application to launch: arkanoid or prime-calculator
    #[arg(short, long, default_value = "arkanoid")]
    module: ModuleKind,

    /// Template loaded into the target as app/<TEMPLATE>.html
    #[arg(short, long)]
    template: Option<String>,

    /// Directory the app/ templates are read from
    #[arg(long, default_value = ".")]
    template_root: PathBuf,

    #[arg(long, default_value_t = HostConfig::DEFAULT_WIDTH)]
    width: u32,

    #[arg(long, default_value_t = HostConfig::DEFAULT_HEIGHT)]
    height: u32,

    /// Host frame period in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Arkanoid update period in milliseconds
    #[arg(long, default_value_t = 16)]
    update_ms: u64,

    /// How many primes the calculator produces
    #[arg(long, default_value_t = 2000)]
    primes: usize,

    /// Font used for canvas text
    #[arg(long)]
    font: Option<PathBuf>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Run with simulated time and no window
    Headless {
        /// Simulated run time in milliseconds
        #[arg(long, default_value_t = 2000)]
        duration_ms: u64,

        /// Keys typed one per frame, e.g. "aaadd"
        #[arg(long, default_value = "")]
        keys: String,

        /// Write the final canvas to this PNG file
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Open a window (Windows only)
    Window,
}

impl Cli {
    fn host_config(&self) -> HostConfig {
        let mut config = HostConfig {
            module: self.module,
            template: self.template.clone(),
            width: self.width,
            height: self.height,
            frame_period: Duration::from_millis(self.frame_ms),
            update_period: Duration::from_millis(self.update_ms),
            prime_count: self.primes,
            template_root: self.template_root.clone(),
            font_path: self.font.clone(),
            ..HostConfig::default()
        };
        if let Mode::Headless {
            duration_ms,
            keys,
            snapshot,
        } = &self.mode
        {
            config.duration = Duration::from_millis(*duration_ms);
            config.keys = keys.clone();
            config.snapshot = snapshot.clone();
        }
        config
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.host_config();

    let result = match cli.mode {
        Mode::Headless { .. } => run_headless(&config),
        Mode::Window => run_window(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "appshelf failed");
            ExitCode::FAILURE
        }
    }
}

fn run_headless(config: &HostConfig) -> Result<(), HostError> {
    let mut host = HeadlessHost::launch(config)?;
    info!(status = %host.status_text(), "launched");

    host.advance(config.duration)?;

    for text in host.target_text() {
        println!("{text}");
    }
    if let Some(path) = &config.snapshot {
        host.snapshot_png(path)?;
    }
    println!("{}", host.status_text());

    host.shutdown();
    Ok(())
}

#[cfg(windows)]
fn run_window(config: &HostConfig) -> Result<(), HostError> {
    appshelf::platform::windows::run(config)
}

#[cfg(not(windows))]
fn run_window(_config: &HostConfig) -> Result<(), HostError> {
    Err(HostError::WindowUnavailable)
}
