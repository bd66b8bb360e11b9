use crate::pets::messages::LoopEvent;
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{SendError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const FALLBACK_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Source of per-frame wake-ups. A subscription posts `LoopEvent::Tick`
/// stamped with its `generation` into the loop channel until it is stopped.
pub trait FrameClock {
    fn subscribe(&mut self, sink: Sender<LoopEvent>, generation: u64)
        -> Result<ClockSubscription>;
}

/// Live clock subscription. At most one tick is pending at a time; the loop
/// calls [`ClockSubscription::acknowledge`] after handling it.
#[derive(Debug)]
pub struct ClockSubscription {
    started_at: Instant,
    generation: u64,
    pending: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ClockSubscription {
    /// Subscription with no worker thread, for clocks driven by the caller.
    pub fn detached(started_at: Instant, generation: u64) -> Self {
        Self {
            started_at,
            generation,
            pending: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn acknowledge(&self) {
        self.pending.store(false, Ordering::Release);
    }

    pub fn is_tick_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Stops the worker and waits for it to exit.
    pub fn unsubscribe(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::error!("display clock thread panicked");
            }
        }
    }
}

impl Drop for ClockSubscription {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

/// Paced by the compositor's vertical blank where available.
#[derive(Debug, Clone, Copy)]
pub struct DisplayLinkClock {
    fallback_interval: Duration,
}

impl Default for DisplayLinkClock {
    fn default() -> Self {
        Self {
            fallback_interval: FALLBACK_FRAME_INTERVAL,
        }
    }
}

impl DisplayLinkClock {
    pub fn with_fallback_interval(fallback_interval: Duration) -> Self {
        Self { fallback_interval }
    }
}

impl FrameClock for DisplayLinkClock {
    fn subscribe(
        &mut self,
        sink: Sender<LoopEvent>,
        generation: u64,
    ) -> Result<ClockSubscription> {
        let pending = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        let interval = self.fallback_interval;
        let worker = {
            let pending = Arc::clone(&pending);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("pet-display-clock".to_string())
                .spawn(move || {
                    while !stop.load(Ordering::Acquire) {
                        wait_for_frame(interval);
                        if stop.load(Ordering::Acquire) {
                            break;
                        }
                        if post_tick(&pending, &sink, generation).is_err() {
                            tracing::debug!("display clock sink closed");
                            break;
                        }
                    }
                })
                .context("failed to spawn display clock thread")?
        };
        tracing::debug!(?interval, generation, "display clock subscribed");
        Ok(ClockSubscription {
            started_at: Instant::now(),
            generation,
            pending,
            stop,
            worker: Some(worker),
        })
    }
}

/// Enqueues a tick unless one is already waiting.
pub(crate) fn post_tick(
    pending: &AtomicBool,
    sink: &Sender<LoopEvent>,
    generation: u64,
) -> std::result::Result<bool, SendError<LoopEvent>> {
    if pending.swap(true, Ordering::AcqRel) {
        return Ok(false);
    }
    sink.send(LoopEvent::Tick {
        at: Instant::now(),
        generation,
    })?;
    Ok(true)
}

#[cfg(windows)]
fn wait_for_frame(fallback: Duration) {
    use windows::Win32::Graphics::Dwm::DwmFlush;

    if unsafe { DwmFlush() }.is_err() {
        thread::sleep(fallback);
    }
}

#[cfg(not(windows))]
fn wait_for_frame(fallback: Duration) {
    thread::sleep(fallback);
}
