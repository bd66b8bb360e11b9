use crate::pets::monitor::DisplaySource;
use crate::pets::{LoopEvent, PetObserver, PetRuntime, Platform};
use crate::settings::{PetSettings, SharedSettings};
use crate::settings_store;
use anyhow::{Context, Result};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const DISPLAY_POLL_INTERVAL: Duration = Duration::from_secs(2);

const WATCH_SLICE: Duration = Duration::from_millis(50);

/// Background thread that polls the display topology.
struct DisplayWatcher {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DisplayWatcher {
    fn spawn<F>(interval: Duration, mut poll: F) -> Result<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("pet-display-watcher".to_string())
                .spawn(move || {
                    while sleep_unless_stopped(&stop, interval) {
                        if !poll() {
                            break;
                        }
                    }
                })
                .context("failed to spawn display watcher thread")?
        };
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("display watcher thread panicked");
            }
        }
    }
}

impl Drop for DisplayWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sleeps in short slices; false once `stop` is raised.
fn sleep_unless_stopped(stop: &AtomicBool, total: Duration) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        let slice = remaining.min(WATCH_SLICE);
        thread::sleep(slice);
        remaining -= slice;
    }
    !stop.load(Ordering::Acquire)
}

/// Watches `path`, or its parent directory when the file does not exist
/// yet, and calls `on_change` for every event that touches the file.
fn watch_file<F>(path: &Path, mut on_change: F) -> notify::Result<RecommendedWatcher>
where
    F: FnMut() + Send + 'static,
{
    let file_name = path.file_name().map(|name| name.to_os_string());
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(ev) => {
                let relevant = matches!(
                    ev.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );
                let touches_file = ev.paths.is_empty()
                    || ev
                        .paths
                        .iter()
                        .any(|changed| changed.file_name() == file_name.as_deref());
                if relevant && touches_file {
                    on_change();
                }
            }
            Err(e) => tracing::error!("settings watch error: {:?}", e),
        },
        Config::default(),
    )?;
    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .or_else(|_| {
            let parent = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            watcher.watch(parent, RecursiveMode::NonRecursive)
        })?;
    Ok(watcher)
}

fn reload_settings(path: &Path, settings: &SharedSettings) {
    // Writers truncate before writing; wait for the write that follows.
    if std::fs::metadata(path).map(|meta| meta.len() == 0).unwrap_or(false) {
        return;
    }
    match settings_store::load_from_path(path) {
        Ok(Some(loaded)) => {
            let changes = settings.publish(loaded);
            if !changes.is_empty() {
                tracing::info!(
                    path = %path.display(),
                    changes = changes.len(),
                    "settings file reloaded"
                );
            }
        }
        Ok(None) => tracing::debug!(path = %path.display(), "settings file removed"),
        Err(err) => tracing::warn!(?err, "ignoring unreadable settings file"),
    }
}

/// Owns everything the process runs. Construction order: settings, event
/// channel, runtime, watchers. Teardown runs in reverse.
pub struct AppContext {
    settings_path: PathBuf,
    settings: SharedSettings,
    events_tx: Sender<LoopEvent>,
    events_rx: Receiver<LoopEvent>,
    runtime: PetRuntime,
    settings_watcher: Option<RecommendedWatcher>,
    display_watcher: Option<DisplayWatcher>,
}

impl AppContext {
    pub fn new(settings_path: PathBuf, settings: PetSettings, platform: Platform) -> Self {
        let settings = SharedSettings::new(settings);
        let (events_tx, events_rx) = channel();

        let forward = events_tx.clone();
        settings.subscribe(move |change| {
            let _ = forward.send(LoopEvent::Settings(change));
        });

        let runtime = PetRuntime::new(settings.clone(), platform, events_tx.clone());
        Self {
            settings_path,
            settings,
            events_tx,
            events_rx,
            runtime,
            settings_watcher: None,
            display_watcher: None,
        }
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn sender(&self) -> Sender<LoopEvent> {
        self.events_tx.clone()
    }

    pub fn observer(&self) -> PetObserver {
        self.runtime.observer()
    }

    pub fn runtime(&self) -> &PetRuntime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut PetRuntime {
        &mut self.runtime
    }

    pub fn watcher_count(&self) -> usize {
        usize::from(self.settings_watcher.is_some()) + usize::from(self.display_watcher.is_some())
    }

    /// Posts `DisplaysChanged` whenever the topology differs from the last
    /// poll.
    pub fn watch_displays(
        &mut self,
        source: Box<dyn DisplaySource>,
        interval: Duration,
    ) -> Result<()> {
        let sink = self.events_tx.clone();
        let mut last = source.displays();
        let watcher = DisplayWatcher::spawn(interval, move || {
            let current = source.displays();
            if current == last {
                return true;
            }
            tracing::info!(
                before = last.len(),
                after = current.len(),
                "display topology changed"
            );
            last = current;
            sink.send(LoopEvent::DisplaysChanged).is_ok()
        })?;
        self.display_watcher = Some(watcher);
        Ok(())
    }

    /// Reloads and republishes the settings file when it changes on disk.
    pub fn watch_settings_file(&mut self) -> Result<()> {
        let path = self.settings_path.clone();
        let settings = self.settings.clone();
        let watcher = watch_file(&self.settings_path, move || reload_settings(&path, &settings))
            .with_context(|| {
                format!(
                    "failed to watch settings file {}",
                    self.settings_path.display()
                )
            })?;
        self.settings_watcher = Some(watcher);
        Ok(())
    }

    pub fn spawn_watchers(
        &mut self,
        displays: Box<dyn DisplaySource>,
        display_interval: Duration,
    ) -> Result<()> {
        self.watch_displays(displays, display_interval)?;
        self.watch_settings_file()
    }

    pub fn start_if_enabled(&mut self) -> Result<()> {
        if self.settings.snapshot().enabled {
            self.runtime.start()?;
        } else {
            tracing::info!("screen pet disabled in settings");
        }
        Ok(())
    }

    /// Blocks on the event loop until a `Shutdown` event arrives.
    pub fn run(&mut self) {
        self.runtime.run(&self.events_rx);
    }

    pub fn shutdown(&mut self) {
        self.runtime.stop();
        self.settings_watcher = None;
        if let Some(mut watcher) = self.display_watcher.take() {
            watcher.stop();
        }
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
