//! ssh-mounter - mount a remote path over sshfs and keep it mounted.
//!
//! Validates the connection parameters (prompting for anything missing),
//! mounts the remote path with sshfs when it is not already mounted, and can
//! register a systemd unit that re-runs the mount periodically in quiet mode.
//!
//!   ssh-mounter -u bob -s nas.local -r /home/bob -m /mnt/nas
//!   ssh-mounter -u bob -s nas.local -r /home/bob -m /mnt/nas -k -i
//!   ssh-mounter -u bob -s nas.local -r /home/bob -m /mnt/nas -q -p 60

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    cancel_on_signal, install_service, remove_service, resolve_request, service_status,
    shutdown_channel, unit_spec, MountOutcome, Mounter, PeriodicTask,
};
use cli::Cli;
use domain::validate::validate_path;
use domain::{AppConfig, AppError, MountRequest, Result};
use infrastructure::ssh::ensure_tools_installed;
use infrastructure::systemd::UnitState;
use infrastructure::{
    ensure_config_exists, load_config, CommandCheck, InstallOutcome, MountResolver,
    RemoveOutcome, ServiceInstaller, SystemRunner, TerminalPrompt,
};

fn main() {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref());
    let default_log_path = config.as_ref().map_or_else(
        |_| AppConfig::default().logging.default_log_path,
        |config| config.logging.default_log_path.clone(),
    );

    // Logging is installed once; a rejected log path leaves console only.
    let log_path = cli
        .log_path_or(&default_log_path)
        .map(|path| validate_path("log path", &path).map(|()| PathBuf::from(path)))
        .transpose();
    let log_file = log_path.as_ref().ok().and_then(Option::as_deref);
    let file_error = setup_logging(cli.verbose, log_file).err();

    if let Some(e) = file_error {
        tracing::warn!("File logging disabled: {e}");
    }

    let result = config.and_then(|config| {
        let log_path = log_path?;
        run(&cli, &config, log_path)
    });

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: &Cli, config: &AppConfig, log_path: Option<PathBuf>) -> Result<()> {
    if cli.init_config {
        return cmd_init_config(cli.config.as_deref());
    }

    let runner = SystemRunner;
    let prompt = TerminalPrompt;

    ensure_tools_installed(&runner)?;

    let mut request = resolve_request(cli.request_input(), config, log_path, &prompt)?;
    tracing::debug!(device = %request.remote_device(), local = %request.local_path, "Request resolved");

    let installer = ServiceInstaller::new(&runner, config.service.unit_dir.clone());

    if cli.print_service {
        let spec = unit_spec(&request, config, &current_exe()?);
        print!("{}", installer.prepare(&spec, CommandCheck::Skip)?);
        return Ok(());
    }

    if cli.service_status {
        let (service_name, state) = service_status(&installer, &request)?;
        let status = match state {
            UnitState::Running { .. } => state.short_status().green(),
            UnitState::Installed { .. } => state.short_status().yellow(),
            UnitState::Absent => state.short_status().dimmed(),
        };
        println!("{}: {status}", service_name.bold());
        return Ok(());
    }

    if cli.install_service {
        let spec = unit_spec(&request, config, &current_exe()?);
        let check = if request.quiet {
            CommandCheck::Strict
        } else {
            CommandCheck::Interactive(&prompt)
        };
        match install_service(&installer, &spec, check)? {
            InstallOutcome::Installed { path } => {
                println!("{} {}", "Installed".green().bold(), path.display());
            }
            InstallOutcome::AlreadyExists { path } => {
                println!("{} {}", "Already installed:".yellow(), path.display());
            }
        }
        return Ok(());
    }

    if cli.delete_service {
        match remove_service(&installer, &request)? {
            RemoveOutcome::Removed { path } => {
                println!("{} {}", "Removed".green().bold(), path.display());
            }
            RemoveOutcome::NotInstalled { path } => {
                println!("{} {}", "Not installed:".yellow(), path.display());
            }
        }
        return Ok(());
    }

    let resolver = MountResolver::new(config.mount.table_path.clone());
    let mounter = Mounter::new(&runner, &prompt, &resolver, config);

    if let Some(period_secs) = request.period_secs {
        return cmd_automount(&mounter, &request, period_secs);
    }

    match mounter.run(&mut request)? {
        MountOutcome::Mounted => println!(
            "{} {} on {}",
            "Mounted".green().bold(),
            request.remote_device(),
            request.local_path
        ),
        MountOutcome::AlreadyMounted => println!(
            "{} {} on {}",
            "Already mounted:".cyan(),
            request.remote_device(),
            request.local_path
        ),
    }

    Ok(())
}

/// Write the default config file.
fn cmd_init_config(path: Option<&Path>) -> Result<()> {
    let (path, created) = ensure_config_exists(path)?;
    if created {
        println!("{} {}", "Created".green().bold(), path.display());
    } else {
        println!("Config already exists: {}", path.display());
    }
    Ok(())
}

/// Run mount ticks every `period_secs` until SIGINT or SIGTERM.
fn cmd_automount(mounter: &Mounter<'_>, request: &MountRequest, period_secs: u64) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::io("Failed to start async runtime", e))?;

    runtime.block_on(async {
        let (handle, token) = shutdown_channel();
        tokio::spawn(async move {
            if let Err(e) = cancel_on_signal(handle).await {
                tracing::warn!("Signal handling unavailable: {e}");
            }
        });

        PeriodicTask::new(Duration::from_secs(period_secs))
            .run(token, || mounter.tick(request))
            .await
    })?;

    Ok(())
}

fn current_exe() -> Result<PathBuf> {
    std::env::current_exe().map_err(|e| AppError::io("Failed to locate the running executable", e))
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::io(format!("Failed to open log file {}", path.display()), e))
}

/// Setup tracing: console output plus an optional append-only log file.
///
/// The subscriber is installed even when the log file cannot be opened.
fn setup_logging(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let (file, error) = match log_file.map(open_log_file) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    let file_layer = file.map(|file| {
        fmt::layer()
            .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(file_layer)
        .with(filter)
        .init();

    error.map_or(Ok(()), Err)
}
