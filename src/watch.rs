//! File watching and rebuild coordination for `codewalk serve`.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  WatchMsg::Fs   ┌──────────────────┐  spawn   ┌──────────────┐
//! │  notify    │────────────────▶│   Event Loop     │─────────▶│ Build Thread │
//! │  watcher   │                 │ (RebuildMachine) │◀─────────│ (full build) │
//! └────────────┘                 └────────┬─────────┘ BuildDone└──────────────┘
//!                                         │ success
//!                                         ▼
//!                                 LiveReload::bump()
//! ```
//!
//! # Rebuild States
//!
//! ```text
//!            change                 quiet period over
//!   Idle ───────────▶ Pending ─────────────────────────▶ Rebuilding
//!    ▲                 │  ▲ change (restarts quiet period)   │  │
//!    │                 └──┘                                  │  │ change: dirty
//!    │                                                       │  ▼
//!    └──────────── finished, clean ◀─────────────────────────┘ finished, dirty
//!                                                               └──▶ Pending
//! ```
//!
//! At most one build runs at a time, and a change that lands during a build
//! is never lost: it schedules exactly one follow-up build.

use crate::config::{self, CONFIG_FILE, SiteConfig};
use crate::site::{self, BuildError, BuildReport};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long the loop sleeps when nothing is pending.
const IDLE_WAIT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),
}

// =============================================================================
// Live reload
// =============================================================================

/// Build generation counter shared between the watcher and the HTTP server.
///
/// Browsers poll it and reload when it changes.
#[derive(Debug, Clone, Default)]
pub struct LiveReload {
    generation: Arc<AtomicU64>,
}

impl LiveReload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Record a successful rebuild; returns the new generation.
    pub fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

// =============================================================================
// Rebuild state machine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildState {
    Idle,
    /// Waiting for the quiet period after the last change to elapse.
    PendingRebuild { last_event: Instant },
    /// A build is running; `dirty` holds the time of the latest change seen
    /// while it ran.
    Rebuilding { dirty: Option<Instant> },
}

/// Decides when to rebuild. Pure: callers pass the current time in.
#[derive(Debug, Clone)]
pub struct RebuildMachine {
    state: RebuildState,
    debounce: Duration,
}

impl RebuildMachine {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: RebuildState::Idle,
            debounce,
        }
    }

    pub fn state(&self) -> RebuildState {
        self.state
    }

    /// A relevant file changed at `now`.
    pub fn on_change(&mut self, now: Instant) {
        self.state = match self.state {
            RebuildState::Idle | RebuildState::PendingRebuild { .. } => {
                RebuildState::PendingRebuild { last_event: now }
            }
            RebuildState::Rebuilding { .. } => RebuildState::Rebuilding { dirty: Some(now) },
        };
    }

    /// Returns `true` when a rebuild should start now; the machine is then
    /// in [`RebuildState::Rebuilding`] until [`finish`](Self::finish).
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            RebuildState::PendingRebuild { last_event }
                if now.saturating_duration_since(last_event) >= self.debounce =>
            {
                self.state = RebuildState::Rebuilding { dirty: None };
                true
            }
            _ => false,
        }
    }

    /// The running build finished, successfully or not.
    pub fn finish(&mut self) {
        self.state = match self.state {
            RebuildState::Rebuilding {
                dirty: Some(last_event),
            } => RebuildState::PendingRebuild { last_event },
            RebuildState::Rebuilding { dirty: None } => RebuildState::Idle,
            other => {
                tracing::debug!(state = ?other, "Build finished while no build was running");
                other
            }
        };
    }

    /// How long the event loop may block before it needs to poll again.
    pub fn timeout(&self, now: Instant) -> Duration {
        match self.state {
            RebuildState::PendingRebuild { last_event } => self
                .debounce
                .saturating_sub(now.saturating_duration_since(last_event)),
            _ => IDLE_WAIT,
        }
    }
}

// =============================================================================
// Path filtering
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

fn is_relevant_kind(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

/// The files and directories a build reads, resolved against the canonical
/// project root so they compare equal to the absolute paths notify reports.
#[derive(Debug, Clone)]
struct Inputs {
    /// Watched recursively once they exist.
    dirs: Vec<PathBuf>,
    /// Matched by name through a watch on their parent directory, which
    /// survives editors that save by renaming a new file over the old one.
    files: Vec<PathBuf>,
    output: PathBuf,
}

impl Inputs {
    fn new(config: &SiteConfig) -> Self {
        let root = config
            .root
            .canonicalize()
            .unwrap_or_else(|_| config.root.clone());
        let config = SiteConfig {
            root: root.clone(),
            ..config.clone()
        };
        Self {
            dirs: vec![config.examples_dir(), config.assets_dir()],
            files: vec![config.catalog_path(), root.join(CONFIG_FILE)],
            output: config.output_dir(),
        }
    }

    fn contains(&self, path: &Path) -> bool {
        !is_temp_file(path)
            && !path.starts_with(&self.output)
            && (self.dirs.iter().any(|d| path.starts_with(d))
                || self.files.iter().any(|f| path == f))
    }

    /// What to hand to the watcher right now. Parents of every input are
    /// watched non-recursively so inputs created later still report; input
    /// directories are watched recursively once they exist.
    fn targets(&self) -> Vec<(PathBuf, RecursiveMode)> {
        let mut targets: Vec<(PathBuf, RecursiveMode)> = Vec::new();
        let parents = self
            .files
            .iter()
            .chain(&self.dirs)
            .filter_map(|p| p.parent());
        for parent in parents {
            if parent.is_dir() && !targets.iter().any(|(p, _)| p == parent) {
                targets.push((parent.to_path_buf(), RecursiveMode::NonRecursive));
            }
        }
        for dir in &self.dirs {
            if dir.is_dir() && !targets.iter().any(|(p, _)| p == dir) {
                targets.push((dir.clone(), RecursiveMode::Recursive));
            }
        }
        targets
    }
}

/// An event triggers a rebuild if it touches one of the build's inputs.
fn triggers_rebuild(event: &Event, inputs: &Inputs) -> bool {
    is_relevant_kind(event) && event.paths.iter().any(|p| inputs.contains(p))
}

/// Bring the watcher in line with [`Inputs::targets`]: drop watches whose
/// directory vanished and add ones that appeared since the last call.
fn sync_watches(
    watcher: &mut impl Watcher,
    inputs: &Inputs,
    active: &mut Vec<PathBuf>,
) -> Result<(), WatchError> {
    active.retain(|path| {
        let alive = path.is_dir();
        if !alive {
            // The backend usually dropped it already.
            let _ = watcher.unwatch(path);
            tracing::debug!(path = %path.display(), "Stopped watching");
        }
        alive
    });
    for (path, mode) in inputs.targets() {
        if !active.contains(&path) {
            watcher.watch(&path, mode)?;
            tracing::info!(path = %path.display(), "Watching");
            active.push(path);
        }
    }
    Ok(())
}

// =============================================================================
// Event loop
// =============================================================================

enum WatchMsg {
    Fs(notify::Result<Event>),
    BuildDone(Result<BuildReport, BuildError>),
}

/// Reload the config and run a full HTML build on a worker thread.
fn spawn_rebuild(root: PathBuf, tx: Sender<WatchMsg>) {
    std::thread::spawn(move || {
        let result = config::load_config(&root)
            .map_err(BuildError::from)
            .and_then(|config| site::build_html(&config));
        // The loop only goes away when the process exits.
        let _ = tx.send(WatchMsg::BuildDone(result));
    });
}

/// Watch the project's inputs and rebuild on change. Blocks forever.
pub fn watch_blocking(config: &SiteConfig, reload: LiveReload) -> Result<(), WatchError> {
    let (tx, rx) = mpsc::channel();
    let fs_tx = tx.clone();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = fs_tx.send(WatchMsg::Fs(res));
    })?;
    let inputs = Inputs::new(config);
    let mut active = Vec::new();
    sync_watches(&mut watcher, &inputs, &mut active)?;

    let mut machine = RebuildMachine::new(Duration::from_millis(config.serve.debounce_ms));

    loop {
        match rx.recv_timeout(machine.timeout(Instant::now())) {
            Ok(WatchMsg::Fs(Ok(event))) => {
                if triggers_rebuild(&event, &inputs) {
                    tracing::debug!(paths = ?event.paths, "Change detected");
                    machine.on_change(Instant::now());
                    if let Err(e) = sync_watches(&mut watcher, &inputs, &mut active) {
                        tracing::warn!(error = %e, "Cannot update watched paths");
                    }
                }
            }
            Ok(WatchMsg::Fs(Err(e))) => tracing::warn!(error = %e, "Watch error"),
            Ok(WatchMsg::BuildDone(result)) => {
                match result {
                    Ok(report) => {
                        let generation = reload.bump();
                        tracing::info!(
                            pages = report.pages.len(),
                            generation,
                            "Rebuilt site"
                        );
                    }
                    Err(e) => tracing::error!(error = %e, "Rebuild failed, keeping previous output"),
                }
                machine.finish();
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if machine.poll(Instant::now()) {
            tracing::info!("Rebuilding");
            spawn_rebuild(config.root.clone(), tx.clone());
        }
    }

    Ok(())
}
