//! # Squeeze Pack Command
//!
//! File: cli/src/commands/pack.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! This module implements the one thing Squeeze does: pack a directory into a
//! single archive. It handles:
//! - Merging command-line flags with the config file into a `RunConfig`
//! - Discovering files and grouping them by extension
//! - Driving an `ArchiveSession` on a blocking worker while listening for Ctrl+C / SIGTERM
//!   (handlers are registered before the temporary archive is created)
//! - Presenting the result
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────── async main task ────────────────┐
//!  scan ─▶ group ─▶ run_pipeline: select! { shutdown | worker done } │
//!                 └──────┬──────────────────────────────────────────┘
//!                        │ spawn_blocking
//!                        ▼
//!               write_groups: for key, path ─▶ session.write_with_cancel
//! ```
//!
//! - The worker is the only code that writes to the archive. Entries land in
//!   the order they are issued: group keys ascending, discovery order within a
//!   group.
//! - The main task only waits. Whichever of the shutdown signal and the worker
//!   completes first decides the outcome, with the signal checked first.
//! - On a signal the `CancellationToken` is cancelled, the worker finishes the
//!   entry it is copying and stops at the next file boundary, and the session
//!   is discarded.
//! - On a worker error the session is discarded and the error returned.
//! - Otherwise the session is saved and the `SaveResult` returned.
//!
//! ## Examples
//!
//! ```bash
//! # Zip the current directory into the current directory
//! squeeze
//!
//! # Gzipped tarball of ~/photos without subdirectories, skipping raw files
//! squeeze -m tar.gz -i ~/photos -o ~/archives --recursion=false -e cr2,nef
//! ```
//!
use crate::common::archive::{ArchiveSession, SaveResult};
use crate::common::fs::{group, scan};
use crate::common::ui;
use crate::core::config::{self, Overrides};
use crate::core::error::{kind_of, Result, SqueezeError};
use anyhow::{anyhow, Context};
use clap::Args;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Message shown when a run is interrupted.
pub const INTERRUPTED_MESSAGE: &str =
    "Operation stopped by the user. The created archive file has been deleted.";

/// # Pack Arguments (`PackArgs`)
///
/// The flags that shape a single run. Every value is optional here; anything
/// left unset falls back to the config file and then to the built-in defaults
/// (see `core::config`).
#[derive(Args, Debug, Clone, Default)]
pub struct PackArgs {
    /// Archive format: `zip` or `tar.gz` [default: zip].
    #[arg(short = 'm', long = "mode", value_name = "MODE")]
    pub mode: Option<String>,

    /// Directory to archive [default: current directory].
    #[arg(short = 'i', long = "ipath", value_name = "PATH")]
    pub ipath: Option<PathBuf>,

    /// Directory the archive is written to, created if missing [default: current directory].
    #[arg(short = 'o', long = "opath", value_name = "PATH")]
    pub opath: Option<PathBuf>,

    /// Descend into subdirectories [default: true].
    #[arg(long = "recursion", value_name = "BOOL", action = clap::ArgAction::Set)]
    pub recursion: Option<bool>,

    /// Extensions to skip, with or without the leading dot (comma separated or repeated).
    #[arg(short = 'e', long = "exclude", value_name = "EXT", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Wait for Enter before exiting after a successful run.
    #[arg(long)]
    pub pause: bool,

    /// Config file to use instead of the one in the user config directory.
    #[arg(long, value_name = "FILE", env = "SQUEEZE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl PackArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            mode: self.mode.clone(),
            input: self.ipath.clone(),
            output: self.opath.clone(),
            recursive: self.recursion,
            exclude: self.exclude.clone(),
        }
    }
}

/// How a pipeline run ended, when it did not fail.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The archive was renamed into place.
    Saved(SaveResult),
    /// A stop signal arrived; the temporary archive was removed.
    Interrupted,
}

/// # Handle Pack Command (`handle_pack`)
///
/// Runs a complete pack: configuration, discovery, grouping, archiving, and
/// the summary table.
///
/// ## Returns
///
/// * `Ok(PipelineOutcome::Saved(_))` after the summary has been printed.
/// * `Ok(PipelineOutcome::Interrupted)` if the user stopped the run; nothing is left on disk.
/// * `Err(_)` for any configuration, discovery or archiving failure; nothing is left on disk.
pub async fn handle_pack(args: PackArgs) -> Result<PipelineOutcome> {
    info!("Handling pack command...");

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let file_config = config::load_file_config(args.config.as_deref())?;
    let run = config::resolve(args.overrides(), file_config, &cwd)?;
    info!(
        "Packing {} into {} as {}",
        run.input.display(),
        run.output.display(),
        run.format
    );

    let paths = scan::scan(&run.input, run.recursive, &run.exclude)?;
    let groups = group::by_extension(paths);
    info!(
        "Discovered {} files in {} groups",
        group::total_paths(&groups),
        groups.len()
    );

    // Handlers must be in place before the temporary archive exists.
    let mut signals = StopSignals::install()?;
    let session = ArchiveSession::open(run.format, &run.output)?;
    let outcome = run_pipeline(session, groups, &run.output, signals.recv()).await?;

    if let PipelineOutcome::Saved(result) = &outcome {
        ui::print_report(result);
        if args.pause {
            pause_until_stopped(ui::pause_for_enter, signals.recv()).await;
        }
    }
    Ok(outcome)
}

/// # Run Pipeline (`run_pipeline`)
///
/// Writes every path of `groups` into `session` on a blocking worker and saves
/// the archive into `destination`, unless `shutdown` completes first.
///
/// The session is discarded on every path that does not return `Saved`.
pub async fn run_pipeline<F>(
    session: ArchiveSession,
    groups: group::PathGroups,
    destination: &Path,
    shutdown: F,
) -> Result<PipelineOutcome>
where
    F: Future<Output = ()>,
{
    let cancel = CancellationToken::new();
    let worker_cancel = cancel.clone();
    let mut worker = tokio::task::spawn_blocking(move || {
        let mut session = session;
        let result = write_groups(&mut session, &groups, &worker_cancel);
        (session, result)
    });
    tokio::pin!(shutdown);

    tokio::select! {
        biased;
        _ = &mut shutdown => {
            info!("Stop requested, cancelling archive worker");
            cancel.cancel();
            // Let the in-flight entry finish so the writer stack is in a known state.
            let (mut session, result) = worker
                .await
                .map_err(|e| anyhow!("Archive worker failed: {}", e))?;
            if let Err(e) = &result {
                if !matches!(kind_of(e), Some(SqueezeError::Cancelled)) {
                    debug!("Worker error superseded by stop request: {:#}", e);
                }
            }
            session.close(true)?;
            Ok(PipelineOutcome::Interrupted)
        }
        joined = &mut worker => {
            let (mut session, result) =
                joined.map_err(|e| anyhow!("Archive worker failed: {}", e))?;
            match result {
                Ok(()) => {
                    debug!(
                        "All {} entries written, saving {} archive",
                        session.archived_count(),
                        session.format()
                    );
                    Ok(PipelineOutcome::Saved(session.save(destination)?))
                }
                Err(e) => {
                    // Reported to the user once, by the caller.
                    debug!("Archiving failed after {} entries: {:#}", session.archived_count(), e);
                    if let Err(close_err) = session.close(true) {
                        warn!("Could not discard archive session: {:#}", close_err);
                    }
                    Err(e)
                }
            }
        }
    }
}

/// Issues every path to the session, key by key, stopping at the first error
/// or at cancellation.
fn write_groups(
    session: &mut ArchiveSession,
    groups: &group::PathGroups,
    cancel: &CancellationToken,
) -> Result<()> {
    for (key, paths) in groups {
        debug!("Writing group '{}' ({} files)", key, paths.len());
        for path in paths {
            session.write_with_cancel(cancel, key, path)?;
        }
    }
    Ok(())
}

/// # Stop Signals (`StopSignals`)
///
/// Ctrl+C and (on Unix) SIGTERM listeners, registered when the value is
/// created rather than when first awaited. Once registered, the process no
/// longer dies on these signals; a signal that arrives while nobody awaits
/// `recv` is buffered and delivered by the next call.
pub struct StopSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl StopSignals {
    /// Registers the signal handlers.
    ///
    /// # Errors
    ///
    /// Returns `SqueezeError::Resource` if a handler cannot be installed.
    pub fn install() -> Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let install = |kind: SignalKind, name: &str| {
                signal(kind).map_err(|e| {
                    anyhow!(SqueezeError::Resource(format!(
                        "cannot install {} handler: {}",
                        name, e
                    )))
                })
            };
            Ok(Self {
                interrupt: install(SignalKind::interrupt(), "Ctrl+C")?,
                terminate: install(SignalKind::terminate(), "SIGTERM")?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Resolves on the next Ctrl+C or SIGTERM.
    pub async fn recv(&mut self) {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.interrupt.recv() => info!("Received Ctrl+C, stopping..."),
                _ = self.terminate.recv() => info!("Received SIGTERM, stopping..."),
            }
        }
        #[cfg(not(unix))]
        {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C, stopping..."),
                Err(e) => {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

/// Runs the blocking prompt `read` until it returns or `stop` completes.
///
/// Returns `true` if `stop` ended the wait. The prompt runs on a plain thread,
/// not the blocking pool, so a prompt still waiting on stdin never holds up
/// runtime shutdown.
pub async fn pause_until_stopped<R, F>(read: R, stop: F) -> bool
where
    R: FnOnce() -> std::io::Result<()> + Send + 'static,
    F: Future<Output = ()>,
{
    let (answered, answer) = tokio::sync::oneshot::channel();
    std::thread::spawn(move || {
        let _ = answered.send(read());
    });

    tokio::select! {
        result = answer => {
            if let Ok(Err(e)) = result {
                warn!("Could not read from stdin: {}", e);
            }
            false
        }
        _ = stop => {
            debug!("Stop requested while paused");
            true
        }
    }
}
