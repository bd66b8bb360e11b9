use crate::settings::SettingsChange;
use std::time::Instant;

/// Everything the event loop reacts to. Producers on other threads only send
/// these; the loop thread owns all mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    /// `generation` names the clock subscription that posted the tick.
    Tick { at: Instant, generation: u64 },
    Settings(SettingsChange),
    DisplaysChanged,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced,
    Idle,
}
