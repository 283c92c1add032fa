//! raildash binary: CLI parsing, logging, settings, then the GUI loop.

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use log::info;

use raildash::app::DashApp;
use raildash::config::{Backend, Settings};
use raildash::gui::Gui;
use raildash::log_capture;

/// Live dashboard over the RailDriver controller interface library.
#[derive(Parser, Debug)]
#[command(name = "raildash", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<String>,

    /// Run against the built-in simulated driver.
    #[arg(long, conflicts_with = "hardware")]
    simulated: bool,

    /// Run against the vendor library configured under `driver.dll_path`.
    #[arg(long)]
    hardware: bool,

    /// Log level filter (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::new(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }
    if cli.simulated {
        settings.driver.backend = Backend::Simulated;
    }
    if cli.hardware {
        settings.driver.backend = Backend::Hardware;
    }

    let log_buffer = log_capture::init(&settings.log_level).context("installing logger")?;
    info!(
        "Starting raildash ({} backend, {} ms poll interval)",
        settings.driver.backend, settings.driver.poll_interval_ms
    );

    let app = DashApp::new(settings).context("assembling driver session")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("RailDriver Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "RailDriver Dashboard",
        native_options,
        Box::new(move |cc| Ok(Box::new(Gui::new(cc, app, log_buffer)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}
