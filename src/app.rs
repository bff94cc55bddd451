//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! and either runs the monitoring service until interrupted or performs a
//! single sweep (--once).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::cli::Args;
use crate::config::{self, Config, CONFIG_ENV};
use crate::logging::init_tracing;
use crate::output as out;
use crate::reconcile;
use crate::service::{SorterControl, SorterService};
use crate::shutdown;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
            out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {cfg_env}\n"));
            out::print_info(&format!(
                "To override, unset {CONFIG_ENV} or set it to another file."
            ));
            return Ok(());
        }
        match config::default_config_path() {
            Ok(p) => {
                out::print_info(&format!("Default sortd config path:\n  {}\n", p.display()));
                if p.exists() {
                    out::print_info("A config file already exists at that location.");
                } else {
                    out::print_info(
                        "No config file exists there yet. Run without --print-config to create a template.",
                    );
                }
            }
            Err(e) => {
                out::print_error(&format!("Could not determine a default config path: {e}"));
            }
        }
        return Ok(());
    }

    // Create template config if none exists (before logging init)
    if let Some(path) = config::ensure_default_config_exists() {
        out::print_success(&format!(
            "A template sortd config was written to: {}",
            path.display()
        ));
        out::print_info(
            "Edit the file to set `source_dir` and `target_dir`, then re-run this command. To use a different location set SORTD_CONFIG.",
        );
        return Ok(());
    }

    // Build config: XML file values, then CLI overrides (CLI wins).
    let mut cfg = config::load_config()?.unwrap_or_else(Config::default);
    args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json)
        .map_err(|e| {
            out::print_error(&format!("Failed to initialize logging: {}", e));
            e
        })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; shutting down gracefully...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })
        .expect("failed to install signal handler");
    }

    if shutdown::is_requested() {
        return Ok(());
    }

    debug!("Starting sortd: {:?}", args);

    let result = if args.once {
        run_once(&cfg)
    } else {
        run_service(cfg)
    };

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

/// Single sweep mode: sort whatever is in the source directory now, report,
/// and exit.
fn run_once(cfg: &Config) -> Result<()> {
    cfg.validate()?;
    let summary = reconcile::sweep_once(cfg);
    out::print_info(&format!(
        "Sorted {} file(s), skipped {}, failed {}",
        summary.moved, summary.skipped, summary.failed
    ));
    if summary.failed > 0 {
        out::print_warn("Some files could not be moved; they remain in the source directory.");
    }
    Ok(())
}

/// Monitoring mode: run the service until Ctrl-C.
fn run_service(cfg: Config) -> Result<()> {
    let source = cfg.source_dir.display().to_string();
    let mut service = SorterService::new(cfg);
    service.start().inspect_err(|e| {
        out::print_error(&format!("Could not start monitoring: {e:#}"));
    })?;
    out::print_info(&format!("Monitoring {source} — press Ctrl-C to stop."));

    while !shutdown::is_requested() {
        std::thread::sleep(Duration::from_millis(200));
    }

    service.stop();
    Ok(())
}
