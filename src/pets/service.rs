use crate::pets::bounds::calculate_bounds;
use crate::pets::clock::{ClockSubscription, DisplayLinkClock, FrameClock};
use crate::pets::geometry::Rect;
use crate::pets::messages::{LoopEvent, TickOutcome};
use crate::pets::model::{Motion, Pet};
use crate::pets::monitor::{DisplayList, DisplaySource, SystemDisplays};
use crate::pets::overlay::pump_overlay_messages;
use crate::pets::state::{can_transition, PetLifecycle};
use crate::pets::surface::{Compositor, OverlaySurfaceFactory, SurfaceFactory};
use crate::settings::{PetType, SettingsChange, SharedSettings};
use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ops::ControlFlow;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const LOOP_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Collaborators the runtime talks to. Swapped for fakes in tests.
pub struct Platform {
    pub displays: Box<dyn DisplaySource>,
    pub surfaces: Box<dyn SurfaceFactory>,
    pub clock: Box<dyn FrameClock>,
}

impl Platform {
    pub fn system() -> Self {
        Self {
            displays: Box::new(SystemDisplays),
            surfaces: Box::new(OverlaySurfaceFactory),
            clock: Box::new(DisplayLinkClock::default()),
        }
    }
}

/// Read side for UI collaborators: the pet as of the latest tick.
#[derive(Debug, Clone, Default)]
pub struct PetObserver {
    current: Arc<Mutex<Option<Pet>>>,
}

impl PetObserver {
    pub fn current(&self) -> Option<Pet> {
        self.current.lock().ok().and_then(|pet| pet.clone())
    }

    fn publish(&self, pet: Option<&Pet>) {
        if let Ok(mut current) = self.current.lock() {
            *current = pet.cloned();
        }
    }
}

/// Owns the pet, its surfaces and the clock subscription. Lives on the
/// event-loop thread; everything else reaches it through [`LoopEvent`]s.
pub struct PetRuntime {
    lifecycle: PetLifecycle,
    settings: SharedSettings,
    platform: Platform,
    sink: Sender<LoopEvent>,
    rng: StdRng,
    topology: DisplayList,
    pet: Option<Pet>,
    compositor: Compositor,
    subscription: Option<ClockSubscription>,
    generation: u64,
    last_tick: Option<Instant>,
    observer: PetObserver,
}

impl PetRuntime {
    pub fn new(settings: SharedSettings, platform: Platform, sink: Sender<LoopEvent>) -> Self {
        Self {
            lifecycle: PetLifecycle::Stopped,
            settings,
            platform,
            sink,
            rng: StdRng::from_entropy(),
            topology: DisplayList::default(),
            pet: None,
            compositor: Compositor::default(),
            subscription: None,
            generation: 0,
            last_tick: None,
            observer: PetObserver::default(),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn lifecycle(&self) -> PetLifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    pub fn pet(&self) -> Option<&Pet> {
        self.pet.as_ref()
    }

    pub fn observer(&self) -> PetObserver {
        self.observer.clone()
    }

    pub fn surface_count(&self) -> usize {
        self.compositor.len()
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Generation stamped on ticks from the live clock subscription.
    pub fn clock_generation(&self) -> Option<u64> {
        self.subscription.as_ref().map(ClockSubscription::generation)
    }

    /// Movement bounds for the current topology and mode.
    pub fn current_bounds(&self) -> Rect {
        calculate_bounds(&self.topology, self.settings.snapshot().mode)
    }

    fn transition(&mut self, to: PetLifecycle) -> Result<()> {
        if !can_transition(self.lifecycle, to) {
            return Err(anyhow!(
                "invalid pet lifecycle transition from {:?} to {:?}",
                self.lifecycle,
                to
            ));
        }
        self.lifecycle = to;
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let settings = self.settings.snapshot();
        self.topology = self.platform.displays.displays();
        self.pet = Some(Pet::new(settings.pet_type));
        self.compositor = Compositor::build(&self.topology, self.platform.surfaces.as_mut());
        self.reset_position();

        self.generation += 1;
        let subscription = match self
            .platform
            .clock
            .subscribe(self.sink.clone(), self.generation)
            .context("failed to subscribe to display clock")
        {
            Ok(subscription) => subscription,
            Err(err) => {
                self.compositor.close_all();
                self.pet = None;
                self.observer.publish(None);
                return Err(err);
            }
        };
        self.last_tick = Some(subscription.started_at());
        self.subscription = Some(subscription);
        self.compositor.show_all();
        self.transition(PetLifecycle::Running)?;
        tracing::info!(
            pet = ?settings.pet_type,
            mode = ?settings.mode,
            displays = self.topology.len(),
            surfaces = self.compositor.len(),
            "screen pet started"
        );
        Ok(())
    }

    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.compositor.close_all();
        self.pet = None;
        self.last_tick = None;
        self.observer.publish(None);
        if let Err(err) = self.transition(PetLifecycle::Stopped) {
            tracing::error!(?err, "failed to stop screen pet");
            return;
        }
        tracing::info!("screen pet stopped");
    }

    /// Back to the top-left of the current bounds, heading right.
    pub fn reset_position(&mut self) {
        let mode = self.settings.snapshot().mode;
        let bounds = calculate_bounds(&self.topology, mode);
        if let Some(pet) = self.pet.as_mut() {
            pet.place_at_start(bounds, mode, &mut self.rng);
            tracing::debug!(?bounds, ?mode, "pet position reset");
        }
        self.observer.publish(self.pet.as_ref());
    }

    pub fn apply_settings_change(&mut self, change: SettingsChange) -> Result<()> {
        tracing::debug!(?change, "pet settings changed");
        match change {
            SettingsChange::Enabled(true) => self.start(),
            SettingsChange::Enabled(false) => {
                self.stop();
                Ok(())
            }
            SettingsChange::PetType(kind) => self.change_pet(kind),
            SettingsChange::Mode(_) => {
                if self.is_running() {
                    self.reset_position();
                    Ok(())
                } else {
                    self.start_if_enabled()
                }
            }
            // Read from the snapshot on the next tick.
            SettingsChange::Speed(_) | SettingsChange::Scale(_) => Ok(()),
        }
    }

    fn change_pet(&mut self, kind: PetType) -> Result<()> {
        if !self.is_running() {
            return self.start_if_enabled();
        }
        self.pet = Some(Pet::new(kind));
        self.reset_position();
        tracing::info!(pet = ?kind, "screen pet replaced");
        Ok(())
    }

    fn start_if_enabled(&mut self) -> Result<()> {
        if self.settings.snapshot().enabled {
            self.start()
        } else {
            Ok(())
        }
    }

    /// Rebuilds every surface against the new topology.
    pub fn handle_display_change(&mut self) {
        if !self.is_running() {
            return;
        }
        self.topology = self.platform.displays.displays();
        self.compositor.close_all();
        self.compositor = Compositor::build(&self.topology, self.platform.surfaces.as_mut());
        self.compositor.show_all();
        self.reset_position();
        tracing::info!(
            displays = self.topology.len(),
            surfaces = self.compositor.len(),
            "pet surfaces rebuilt after display change"
        );
    }

    pub fn tick(&mut self, at: Instant) -> TickOutcome {
        if let Some(subscription) = &self.subscription {
            subscription.acknowledge();
        }
        if !self.is_running() {
            return TickOutcome::Idle;
        }
        let Some(pet) = self.pet.as_mut() else {
            return TickOutcome::Idle;
        };

        let previous = self.last_tick.unwrap_or(at);
        let delta = at.saturating_duration_since(previous).as_secs_f64();
        self.last_tick = Some(previous.max(at));

        let settings = self.settings.snapshot();
        let motion = Motion::from(&settings);
        let bounds = calculate_bounds(&self.topology, settings.mode);
        pet.update(delta, bounds, settings.mode, motion, &mut self.rng);
        tracing::trace!(
            delta,
            x = pet.position.x,
            y = pet.position.y,
            "pet advanced"
        );

        self.observer.publish(Some(&*pet));
        self.compositor.redraw_all(pet, motion.scale);
        TickOutcome::Advanced
    }

    pub fn handle_event(&mut self, event: LoopEvent) -> Result<ControlFlow<()>> {
        match event {
            LoopEvent::Tick { at, generation } => {
                if self.clock_generation() == Some(generation) {
                    self.tick(at);
                } else {
                    tracing::trace!(generation, "dropping tick from a stale clock subscription");
                }
            }
            LoopEvent::Settings(change) => self.apply_settings_change(change)?,
            LoopEvent::DisplaysChanged => self.handle_display_change(),
            LoopEvent::Shutdown => {
                self.stop();
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Runs until `Shutdown` arrives or every sender is gone.
    pub fn run(&mut self, events: &Receiver<LoopEvent>) {
        loop {
            pump_overlay_messages();
            match events.recv_timeout(LOOP_POLL_INTERVAL) {
                Ok(event) => match self.handle_event(event) {
                    Ok(ControlFlow::Continue(())) => {}
                    Ok(ControlFlow::Break(())) => break,
                    Err(err) => tracing::error!(?err, "pet event handling failed"),
                },
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.stop();
    }
}

impl Drop for PetRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::{Platform, PetRuntime};
    use crate::pets::clock::{ClockSubscription, FrameClock};
    use crate::pets::geometry::{Point, Rect};
    use crate::pets::messages::{LoopEvent, TickOutcome};
    use crate::pets::monitor::{DisplayFrame, DisplayList};
    use crate::pets::state::PetLifecycle;
    use crate::pets::render::{DirtyRect, FrameBuffer};
    use crate::pets::surface::{SurfaceBackend, SurfaceFactory};
    use crate::settings::{PetMode, PetSettings, SettingsChange, SharedSettings};
    use anyhow::{anyhow, Result};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::mpsc::{channel, Sender};
    use std::time::{Duration, Instant};

    struct NullBackend;

    impl SurfaceBackend for NullBackend {
        fn show(&mut self) {}

        fn present(&mut self, _frame: &FrameBuffer, _dirty: DirtyRect) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) {}
    }

    struct NullFactory;

    impl SurfaceFactory for NullFactory {
        fn create(
            &mut self,
            _display: &DisplayFrame,
            _offset: Point,
        ) -> Result<Box<dyn SurfaceBackend>> {
            Ok(Box::new(NullBackend))
        }
    }

    struct FixedClock(Instant);

    impl FrameClock for FixedClock {
        fn subscribe(
            &mut self,
            _sink: Sender<LoopEvent>,
            generation: u64,
        ) -> Result<ClockSubscription> {
            Ok(ClockSubscription::detached(self.0, generation))
        }
    }

    struct BrokenClock;

    impl FrameClock for BrokenClock {
        fn subscribe(
            &mut self,
            _sink: Sender<LoopEvent>,
            _generation: u64,
        ) -> Result<ClockSubscription> {
            Err(anyhow!("no display link"))
        }
    }

    fn runtime(settings: PetSettings, clock: Box<dyn FrameClock>) -> PetRuntime {
        let (tx, _rx) = channel();
        let platform = Platform {
            displays: Box::new(DisplayList::new(vec![DisplayFrame::new(
                0.0, 0.0, 1920.0, 1080.0, true,
            )])),
            surfaces: Box::new(NullFactory),
            clock,
        };
        PetRuntime::new(SharedSettings::new(settings), platform, tx)
            .with_rng(StdRng::seed_from_u64(3))
    }

    #[test]
    fn first_tick_is_measured_from_subscription() {
        let base = Instant::now();
        let mut runtime = runtime(PetSettings::default(), Box::new(FixedClock(base)));
        runtime.start().expect("start");

        assert_eq!(
            runtime.tick(base + Duration::from_millis(500)),
            TickOutcome::Advanced
        );
        let pet = runtime.pet().expect("pet");
        assert_eq!(pet.animation_phase, 5.0);
        assert_eq!(pet.position, Point::new(3.0, 0.0));
    }

    #[test]
    fn tick_before_previous_tick_has_zero_delta() {
        let base = Instant::now() + Duration::from_secs(10);
        let mut runtime = runtime(PetSettings::default(), Box::new(FixedClock(base)));
        runtime.start().expect("start");

        runtime.tick(base - Duration::from_secs(5));
        assert_eq!(runtime.pet().expect("pet").animation_phase, 0.0);
    }

    #[test]
    fn ticks_while_stopped_do_nothing() {
        let base = Instant::now();
        let mut runtime = runtime(PetSettings::default(), Box::new(FixedClock(base)));
        assert_eq!(runtime.tick(base), TickOutcome::Idle);
        assert!(runtime.pet().is_none());
    }

    #[test]
    fn clock_failure_rolls_back_start() {
        let mut runtime = runtime(PetSettings::default(), Box::new(BrokenClock));
        let err = runtime.start().expect_err("start should fail");
        assert!(format!("{err:#}").contains("subscribe to display clock"));
        assert!(!runtime.is_running());
        assert!(runtime.pet().is_none());
        assert_eq!(runtime.surface_count(), 0);
    }

    #[test]
    fn mode_change_while_stopped_starts_only_when_enabled() {
        let disabled = PetSettings {
            enabled: false,
            ..PetSettings::default()
        };
        let mut runtime = runtime(disabled, Box::new(FixedClock(Instant::now())));
        runtime
            .apply_settings_change(SettingsChange::Mode(PetMode::FreeRoam))
            .expect("mode change");
        assert!(!runtime.is_running());

        runtime.settings.update(|s| {
            s.enabled = true;
            s.mode = PetMode::FreeRoam;
        });
        runtime
            .apply_settings_change(SettingsChange::Mode(PetMode::FreeRoam))
            .expect("mode change");
        assert!(runtime.is_running());
        assert_eq!(runtime.current_bounds(), Rect::new(0.0, 0.0, 1920.0, 1080.0));
    }

    #[test]
    fn restart_moves_to_a_new_clock_generation() {
        let mut runtime = runtime(PetSettings::default(), Box::new(FixedClock(Instant::now())));
        runtime.start().expect("start");
        let first = runtime.clock_generation().expect("subscribed");
        runtime.stop();
        assert_eq!(runtime.clock_generation(), None);
        assert_eq!(runtime.lifecycle(), PetLifecycle::Stopped);

        runtime.start().expect("restart");
        let second = runtime.clock_generation().expect("subscribed");
        assert_ne!(first, second);
    }

    #[test]
    fn tick_left_over_from_previous_subscription_is_dropped() {
        let base = Instant::now();
        let mut runtime = runtime(PetSettings::default(), Box::new(FixedClock(base)));
        runtime.start().expect("start");
        let stale = runtime.clock_generation().expect("subscribed");
        runtime.stop();
        runtime.start().expect("restart");
        let start = runtime.pet().expect("pet").position;

        let flow = runtime
            .handle_event(LoopEvent::Tick {
                at: base + Duration::from_secs(1),
                generation: stale,
            })
            .expect("stale tick")
            .is_continue();
        assert!(flow);
        assert_eq!(runtime.pet().expect("pet").position, start);
        assert_eq!(runtime.pet().expect("pet").animation_phase, 0.0);

        let live = runtime.clock_generation().expect("subscribed");
        let flow = runtime
            .handle_event(LoopEvent::Tick {
                at: base + Duration::from_secs(1),
                generation: live,
            })
            .expect("live tick")
            .is_continue();
        assert!(flow);
        assert_eq!(runtime.pet().expect("pet").position, Point::new(3.0, 0.0));
    }

    #[test]
    fn shutdown_event_stops_and_breaks() {
        let mut runtime = runtime(PetSettings::default(), Box::new(FixedClock(Instant::now())));
        runtime.start().expect("start");
        let flow = runtime.handle_event(LoopEvent::Shutdown).expect("event");
        assert!(flow.is_break());
        assert!(!runtime.is_running());
        assert!(runtime.observer().current().is_none());
    }

    #[test]
    fn run_exits_when_senders_are_gone() {
        let (tx, rx) = channel();
        let mut runtime = runtime(PetSettings::default(), Box::new(FixedClock(Instant::now())));
        runtime.start().expect("start");
        tx.send(LoopEvent::Tick {
            at: Instant::now(),
            generation: 1,
        })
        .expect("send");
        drop(tx);
        runtime.run(&rx);
        assert!(!runtime.is_running());
    }
}
