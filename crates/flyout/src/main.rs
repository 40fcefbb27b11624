//! flyout
//!
//! A popup panel that docks itself next to its notification-area icon, the
//! way the OS flyouts for volume or network do.
//!
//! Responsibilities:
//! - Load configuration and set up logging
//! - Create the popup window and the notify icon
//! - Wire both to the visibility controller through the event dispatcher
//! - Run the Win32 message loop

mod config;
mod tray;

use anyhow::Result;
use clap::Parser;
use config::Config;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "flyout", version, about = "Popup panel docked to a notification-area icon")]
struct Args {
    /// Configuration file to use instead of the standard locations.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Open the popup pinned.
    #[arg(long)]
    pinned: bool,
}

/// Pick the log filter directive: `RUST_LOG`, then the command line, then
/// the config file.
fn filter_directive(env: Option<String>, cli: Option<&str>, config: &str) -> String {
    env.filter(|directive| !directive.trim().is_empty())
        .or_else(|| cli.map(str::to_string))
        .unwrap_or_else(|| config.to_string())
}

fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let directive = filter_directive(
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        args.log_level.as_deref(),
        &config.behavior.log_level,
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("[flyout] Invalid log filter '{}': {}. Using 'info'.", directive, e);
        EnvFilter::new("info")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (needed for log level)
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) if args.config.is_some() => return Err(e),
        Err(e) => {
            // Can't use tracing yet, fall back to eprintln
            eprintln!("Failed to load configuration: {:#}. Using defaults.", e);
            Config::default()
        }
    };

    init_logging(&args, &config)?;

    for w in config.validate() {
        warn!("Config: {} - {}", w.field, w.message);
    }

    info!("flyout starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: window={}x{}, gap={}, log_level={}",
        config.window.width, config.window.height, config.window.gap, config.behavior.log_level
    );

    let pinned = args.pinned || config.behavior.start_pinned;
    run(&config, pinned)
}

#[cfg(windows)]
fn run(config: &Config, pinned: bool) -> Result<()> {
    use anyhow::Context;
    use flyout_dock_layout::{Dispatcher, MessageSink, PopupEvent, WindowVisibilityController};
    use flyout_platform_win32::{set_dpi_awareness, PopupWindow};
    use std::rc::{Rc, Weak};
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, TranslateMessage, MSG,
    };

    // Set DPI awareness before any window/GDI operations
    if set_dpi_awareness() {
        info!("DPI awareness set to Per-Monitor Aware V2");
    } else {
        warn!("Failed to set DPI awareness (may already be set)");
    }

    let window =
        PopupWindow::create(&config.tray.tooltip).context("Failed to create popup window")?;
    let icon = tray::TrayManager::new(&config.tray.tooltip, false)
        .context("Failed to create notify icon")?;

    let controller = WindowVisibilityController::new(
        window.shell(),
        icon,
        config.window.size(),
        config.window.gap,
    );
    let dispatcher = Rc::new(Dispatcher::new(controller));
    let sink: Weak<dyn MessageSink> = Rc::downgrade(&dispatcher) as Weak<dyn MessageSink>;
    window.install_interceptor(sink);

    dispatcher.post(PopupEvent::Loaded);
    if pinned {
        dispatcher.post(PopupEvent::PinButton);
    }

    info!("flyout running");

    let mut msg = MSG::default();
    loop {
        // 0 means WM_QUIT, -1 an error
        let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if result.0 <= 0 {
            if result.0 < 0 {
                warn!("GetMessageW failed, leaving the message loop");
            }
            break;
        }

        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        for event in tray::TrayManager::poll_events() {
            dispatcher.post(event);
        }
    }

    info!("flyout shutting down");

    // Destroy the window while the dispatcher is alive so Closing reaches
    // the controller and the notify icon is disposed
    drop(window);
    drop(dispatcher);

    Ok(())
}

#[cfg(not(windows))]
fn run(_config: &Config, _pinned: bool) -> Result<()> {
    anyhow::bail!("flyout needs the Windows notification area and only runs on Windows")
}
