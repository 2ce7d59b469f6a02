#![forbid(unsafe_code)]

mod animation;
mod color;
mod config;
mod constants;
mod desktop;
mod proc_cache;
mod rules;
mod service;
mod x11_desktop;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use constants::timing;
use desktop::Desktop;
use proc_cache::ProcessNameCache;
use service::BorderService;
use x11_desktop::X11Desktop;

/// Recolor visible window borders according to configured rules.
#[derive(Parser)]
#[command(name = "borderglow", version, about)]
struct Cli {
    /// Path to the config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single full update pass and exit
    #[arg(long)]
    once: bool,

    /// Print visible candidate windows and exit
    #[arg(long)]
    list_windows: bool,

    /// Run even if the config has the service disabled
    #[arg(long)]
    force: bool,

    /// Log level: trace, debug, info, warn, error (LOG_LEVEL env also works)
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(cli_level: Option<&str>) -> Result<()> {
    let level = cli_level
        .map(str::to_string)
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());
    let log_level = match level.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(unix)]
fn install_shutdown_flag() -> Result<Arc<AtomicBool>> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, flag.clone())?;
    signal_hook::flag::register(SIGTERM, flag.clone())?;
    Ok(flag)
}

#[cfg(not(unix))]
fn install_shutdown_flag() -> Result<Arc<AtomicBool>> {
    Ok(Arc::new(AtomicBool::new(false)))
}

fn print_windows(desktop: &mut X11Desktop) -> Result<()> {
    let mut names = ProcessNameCache::default();
    let windows = desktop.list_windows()?;
    for win in &windows {
        let process = names.resolve(win.pid, |pid| desktop.process_name(pid));
        println!(
            "{}  |  {}  |  {}  | window={}",
            win.title, win.class_name, process, win.id
        );
    }
    info!(count = windows.len(), "listed visible windows");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path);
    info!(path = %config_path.display(), rules = config.window_rules.len(), "loaded config");

    let desktop = X11Desktop::connect()?;
    let mut service = BorderService::new(desktop);

    if cli.list_windows {
        return print_windows(service.desktop_mut());
    }
    if cli.once {
        service.run_pass(&config, false);
        return Ok(());
    }
    if !config.service_enabled && !cli.force {
        info!("service is disabled in the config; enable it or pass --force");
        return Ok(());
    }

    let shutdown = install_shutdown_flag()?;
    let full_interval = Duration::from_millis(timing::FULL_PASS_INTERVAL_MS);
    let anim_interval = Duration::from_millis(timing::ANIM_PASS_INTERVAL_MS);

    info!(
        animated = config.animations_configured(),
        "service running"
    );
    service.run_pass(&config, false);
    let mut last_full = Instant::now();
    loop {
        // The animation cadence is only worth paying for when something
        // can actually animate
        let tick = if config.animations_configured() {
            anim_interval
        } else {
            full_interval
        };
        std::thread::sleep(tick);
        if shutdown.load(Ordering::Relaxed) {
            info!("shutting down");
            break;
        }
        if last_full.elapsed() >= full_interval {
            service.run_pass(&config, false);
            last_full = Instant::now();
        } else {
            service.run_pass(&config, true);
        }
    }
    Ok(())
}
