use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use snoozr_core::{FreezeEngine, NativeProcessControl, SafetyFilter, VERSION};
use snoozr_daemon::{
    logging, setup, spawn_signal_listener, whitelist, Config, FocusMonitor, Notifier,
    SessionReport,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};

/// snoozr - freezes idle desktop applications
///
/// Suspends applications that have been out of focus for too long and
/// use enough memory to matter, and resumes them the moment you return
#[derive(Parser, Debug)]
#[command(name = "snoozr")]
#[command(version = VERSION)]
#[command(about = "snoozr - Idle application freezer", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "snoozr.toml")]
    config: PathBuf,

    /// Path to the VIP whitelist (overrides the config file)
    #[arg(short, long)]
    whitelist: Option<PathBuf>,

    /// Report freeze candidates without suspending anything
    #[arg(long)]
    dry_run: bool,

    /// Run the interactive setup even if a configuration exists
    #[arg(long)]
    setup: bool,

    /// Detach from the terminal and log to file only
    #[arg(short, long)]
    daemon: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Collected before logging exists, replayed once it does
    let mut notes: Vec<(Level, String)> = Vec::new();

    let config_exists = cli.config.exists();
    let mut config = load_config(&cli.config, &mut notes);

    if !cli.daemon {
        print_banner();
    }

    if cli.setup || !config_exists {
        setup::run_interactive(&mut config.engine, cli.setup)
            .context("Interactive setup failed")?;
        match config.save_to_file(&cli.config) {
            Ok(()) => notes.push((Level::INFO, format!("Configuration saved to {:?}", cli.config))),
            Err(e) => notes.push((
                Level::WARN,
                format!("Could not save configuration {:?}: {:#}", cli.config, e),
            )),
        }
    }

    if cli.daemon {
        detach()?;
    }

    // Dropped when `run` returns, flushing the final restore lines
    let _log_guard = logging::init(&config.logging, !cli.daemon)?;
    info!("snoozr v{} starting...", VERSION);
    for (level, note) in &notes {
        if *level == Level::WARN {
            warn!("{}", note);
        } else {
            info!("{}", note);
        }
    }

    let whitelist_path = cli.whitelist.clone().unwrap_or_else(|| config.whitelist_path.clone());
    let vip = whitelist::load_or_create(&whitelist_path);

    if !cli.daemon {
        print_settings(&config, cli.dry_run, vip.len());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(watch(config, vip, cli.dry_run, cli.daemon))
}

/// Build the engine and run the monitor until interrupted
async fn watch(config: Config, vip: Vec<String>, dry_run: bool, daemon: bool) -> Result<()> {
    let platform = NativeProcessControl::new().context("Failed to initialize platform layer")?;

    let engine = FreezeEngine::new(
        platform,
        SafetyFilter::new(vip),
        config.engine_settings(dry_run),
        config.sentinel.clone(),
    );

    if dry_run {
        warn!("[DRY-RUN] No process will be suspended");
    }

    let mut monitor = FocusMonitor::new(
        engine,
        Notifier::new(config.notifications.enabled),
        Duration::from_millis(config.monitoring.poll_interval_ms),
    );

    let shutdown = CancellationToken::new();
    let listener = spawn_signal_listener(shutdown.clone());

    let started = Instant::now();
    let stats = monitor.run(shutdown).await;
    listener.abort();

    let report = SessionReport::new(&stats, started.elapsed(), dry_run);
    report.log();
    match report.export(&config.logging.log_dir) {
        Ok(path) => info!("Session report written to {:?}", path),
        Err(e) => warn!("Could not write session report: {:#}", e),
    }

    if !daemon {
        println!();
        println!("{}", report.render());
    }

    info!("snoozr stopped");
    Ok(())
}

/// Load configuration, falling back to defaults on any problem
fn load_config(path: &Path, notes: &mut Vec<(Level, String)>) -> Config {
    let config = match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            notes.push((
                Level::WARN,
                format!("Failed to load configuration {:?}: {:#}, using defaults", path, e),
            ));
            return Config::default();
        }
    };

    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            notes.push((Level::WARN, format!("Invalid configuration: {}, using defaults", e)));
            Config::default()
        }
    }
}

#[cfg(unix)]
fn detach() -> Result<()> {
    snoozr_daemon::daemonize::daemonize()
}

#[cfg(not(unix))]
fn detach() -> Result<()> {
    anyhow::bail!("Daemon mode is not supported on this platform")
}

fn print_banner() {
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║                 snoozr v{:<10}                        ║", VERSION);
    println!("╚═══════════════════════════════════════════════════════════╝");
}

fn print_settings(config: &Config, dry_run: bool, vip_count: usize) {
    println!("   > Freeze after:   {}s idle", config.engine.idle_timeout_secs);
    println!("   > Minimum RAM:    {} MB", config.engine.min_memory_mb);
    println!("   > VIP apps:       {}", vip_count);
    if dry_run {
        println!("   > Mode:           {}", "DRY-RUN".yellow().bold());
    }
    println!("   Press Ctrl+C to stop and restore all apps");
    println!();
}
