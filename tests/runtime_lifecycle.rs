use rand::rngs::StdRng;
use rand::SeedableRng;
use screen_pets::pets::geometry::{Point, Rect, Vector};
use screen_pets::pets::monitor::{DisplayFrame, DisplayList};
use screen_pets::pets::state::PetLifecycle;
use screen_pets::pets::PetRuntime;
use screen_pets::settings::{PetMode, PetSettings, PetType, SettingsChange, SharedSettings};
use std::sync::mpsc::channel;
use std::time::Duration;


use mock_platform::{platform, side_by_side, ManualClock, MockSurfaces, MockTopology};

struct Harness {
    settings: SharedSettings,
    topology: MockTopology,
    surfaces: MockSurfaces,
    clock: ManualClock,
    runtime: PetRuntime,
}

fn harness(settings: PetSettings, displays: DisplayList) -> Harness {
    harness_with(settings, displays, MockSurfaces::default())
}

fn harness_with(settings: PetSettings, displays: DisplayList, surfaces: MockSurfaces) -> Harness {
    let settings = SharedSettings::new(settings);
    let topology = MockTopology::new(displays);
    let clock = ManualClock::default();
    let (tx, _rx) = channel();
    let runtime = PetRuntime::new(
        settings.clone(),
        platform(&topology, &surfaces, &clock),
        tx,
    )
    .with_rng(StdRng::seed_from_u64(42));
    Harness {
        settings,
        topology,
        surfaces,
        clock,
        runtime,
    }
}

impl Harness {
    /// Publishes an edit and feeds the resulting changes to the runtime, the
    /// way the event loop does.
    fn edit(&mut self, edit: impl FnOnce(&mut PetSettings)) {
        for change in self.settings.update(edit) {
            self.runtime.apply_settings_change(change).unwrap();
        }
    }

    fn tick_seconds(&mut self, seconds: u64) {
        let at = self.clock.started_at() + Duration::from_secs(seconds);
        self.runtime.tick(at);
    }

    fn position(&self) -> Point {
        self.runtime.pet().unwrap().position
    }
}

#[test]
fn enabling_builds_surfaces_places_pet_and_subscribes() {
    let mut h = harness(
        PetSettings {
            enabled: false,
            ..PetSettings::default()
        },
        side_by_side(),
    );
    assert_eq!(h.runtime.lifecycle(), PetLifecycle::Stopped);

    h.edit(|s| s.enabled = true);

    assert_eq!(h.runtime.lifecycle(), PetLifecycle::Running);
    assert!(h.runtime.is_subscribed());
    assert_eq!(h.clock.subscriptions(), 1);
    assert_eq!(h.runtime.surface_count(), 2);
    h.surfaces.snapshot(|log| {
        assert_eq!(log.created, vec![Point::new(0.0, 0.0), Point::new(1920.0, 0.0)]);
        assert_eq!(log.shown, 2);
    });

    let pet = h.runtime.pet().unwrap();
    assert_eq!(pet.kind(), PetType::Dragon);
    assert_eq!(pet.position, Point::new(0.0, 0.0));
    assert_eq!(pet.direction, Vector::new(1.0, 0.0));
    assert_eq!(h.runtime.observer().current().unwrap().position, Point::ZERO);
}

#[test]
fn disabling_unsubscribes_closes_surfaces_and_drops_pet() {
    let mut h = harness(PetSettings::default(), side_by_side());
    h.runtime.start().unwrap();

    h.edit(|s| s.enabled = false);

    assert_eq!(h.runtime.lifecycle(), PetLifecycle::Stopped);
    assert!(!h.runtime.is_subscribed());
    assert!(h.runtime.pet().is_none());
    assert!(h.runtime.observer().current().is_none());
    assert_eq!(h.runtime.surface_count(), 0);
    h.surfaces.snapshot(|log| {
        assert_eq!(log.closed, 2);
        assert_eq!(log.open(), 0);
    });
}

#[test]
fn ticks_after_disable_are_ignored() {
    let mut h = harness(PetSettings::default(), side_by_side());
    h.runtime.start().unwrap();
    h.edit(|s| s.enabled = false);
    let presents = h.surfaces.snapshot(|log| log.presents);

    h.tick_seconds(1);

    assert!(h.runtime.pet().is_none());
    assert_eq!(h.surfaces.snapshot(|log| log.presents), presents);
}

#[test]
fn pet_type_change_while_running_replaces_and_resets() {
    let mut h = harness(PetSettings::default(), side_by_side());
    h.runtime.start().unwrap();
    h.tick_seconds(1);
    h.tick_seconds(2);
    assert_eq!(h.position().x, 6.0);

    h.edit(|s| s.pet_type = PetType::Ghost);

    let pet = h.runtime.pet().unwrap();
    assert_eq!(pet.kind(), PetType::Ghost);
    assert_eq!(pet.position, Point::ZERO);
    assert_eq!(pet.animation_phase, 0.0);
    assert_eq!(h.clock.subscriptions(), 1);
}

#[test]
fn pet_type_change_while_stopped_starts_only_when_enabled() {
    let mut h = harness(
        PetSettings {
            enabled: false,
            ..PetSettings::default()
        },
        side_by_side(),
    );
    h.edit(|s| s.pet_type = PetType::NyanCat);
    assert!(!h.runtime.is_running());

    // Enabled flipped without the loop having seen the event yet.
    h.settings.update(|s| s.enabled = true);
    h.runtime
        .apply_settings_change(SettingsChange::PetType(PetType::NyanCat))
        .unwrap();
    assert!(h.runtime.is_running());
    assert_eq!(h.runtime.pet().unwrap().kind(), PetType::NyanCat);
}

#[test]
fn mode_change_rederives_bounds_and_resets_position() {
    let mut h = harness(
        PetSettings::default(),
        DisplayList::new(vec![
            DisplayFrame::new(0.0, 0.0, 1920.0, 1080.0, true),
            DisplayFrame::new(1920.0, 0.0, 1920.0, 1080.0, false),
        ]),
    );
    h.runtime.start().unwrap();
    h.tick_seconds(1);

    h.edit(|s| s.mode = PetMode::SecondaryOnly);

    assert_eq!(h.runtime.current_bounds(), Rect::new(1920.0, 0.0, 1920.0, 100.0));
    assert_eq!(h.position(), Point::new(1920.0, 0.0));
    assert_eq!(h.runtime.pet().unwrap().direction.dy, 0.0);
}

#[test]
fn free_roam_to_cross_screen_lands_on_band_top() {
    let mut h = harness(
        PetSettings {
            mode: PetMode::FreeRoam,
            speed: 10.0,
            ..PetSettings::default()
        },
        side_by_side(),
    );
    h.runtime.start().unwrap();

    let mut second = 0;
    while h.position().y <= 100.0 {
        second += 1;
        assert!(second < 20_000, "pet never left the band area");
        h.tick_seconds(second);
    }

    // The loop may see the new mode on a tick before the change event.
    h.settings.update(|s| s.mode = PetMode::CrossScreen);
    for _ in 0..200 {
        second += 1;
        h.tick_seconds(second);
        assert_eq!(h.position().y, 0.0);
        assert!(h.position().x <= 3840.0 - 120.0);
    }
}

#[test]
fn speed_change_applies_on_next_tick() {
    let mut h = harness(PetSettings::default(), side_by_side());
    h.runtime.start().unwrap();
    h.tick_seconds(1);
    assert_eq!(h.position().x, 3.0);

    h.edit(|s| s.speed = 5.0);
    h.tick_seconds(2);
    assert_eq!(h.position().x, 8.0);
}

#[test]
fn display_change_rebuilds_surfaces_and_resets_position() {
    let mut h = harness(PetSettings::default(), side_by_side());
    h.runtime.start().unwrap();
    h.tick_seconds(1);

    h.topology.set(DisplayList::new(vec![
        DisplayFrame::new(-2560.0, 0.0, 2560.0, 1440.0, false),
        DisplayFrame::new(0.0, 0.0, 1920.0, 1080.0, true),
        DisplayFrame::new(1920.0, 0.0, 1920.0, 1080.0, false),
    ]));
    h.runtime.handle_display_change();

    assert!(h.runtime.is_running());
    assert_eq!(h.runtime.surface_count(), 3);
    assert_eq!(h.position(), Point::ZERO);
    assert_eq!(h.runtime.current_bounds(), Rect::new(0.0, 0.0, 6400.0, 100.0));
    h.surfaces.snapshot(|log| {
        assert_eq!(log.closed, 2);
        assert_eq!(log.open(), 3);
        assert_eq!(log.shown, 5);
        assert_eq!(
            &log.created[2..],
            &[
                Point::new(0.0, 0.0),
                Point::new(2560.0, 360.0),
                Point::new(4480.0, 360.0)
            ]
        );
    });
}

#[test]
fn display_change_while_stopped_is_ignored() {
    let mut h = harness(
        PetSettings {
            enabled: false,
            ..PetSettings::default()
        },
        side_by_side(),
    );
    h.runtime.handle_display_change();
    assert!(!h.runtime.is_running());
    assert!(h.surfaces.snapshot(|log| log.created.is_empty()));
}

#[test]
fn failed_surface_is_skipped_and_runtime_keeps_running() {
    let surfaces = MockSurfaces::default();
    surfaces.fail_display_at_x(1920.0);
    let mut h = harness_with(PetSettings::default(), side_by_side(), surfaces);

    h.runtime.start().unwrap();

    assert!(h.runtime.is_running());
    assert_eq!(h.runtime.surface_count(), 1);
    h.surfaces.snapshot(|log| assert_eq!(log.failed, 1));
    h.tick_seconds(1);
    assert_eq!(h.position().x, 3.0);
}

#[test]
fn no_displays_runs_inside_fallback_band() {
    let mut h = harness(PetSettings::default(), DisplayList::default());
    h.runtime.start().unwrap();
    assert_eq!(h.runtime.surface_count(), 0);
    for second in 1..=1_000 {
        h.tick_seconds(second);
        let pet = h.runtime.pet().unwrap();
        assert!(pet.position.x >= 0.0 && pet.position.x + 120.0 <= 1920.0);
    }
}

#[test]
fn two_side_by_side_displays_reflect_at_the_far_edge() {
    let mut h = harness(
        PetSettings {
            mode: PetMode::CrossScreen,
            speed: 3.0,
            scale: 1.0,
            pet_type: PetType::Dragon,
            ..PetSettings::default()
        },
        side_by_side(),
    );
    h.runtime.start().unwrap();
    assert_eq!(h.runtime.current_bounds(), Rect::new(0.0, 0.0, 3840.0, 100.0));
    assert_eq!(h.runtime.pet().unwrap().size().width, 120.0);

    let ticks = (3840.0_f64 / 3.0).ceil() as u64;
    let mut reflected = false;
    for second in 1..=ticks {
        h.tick_seconds(second);
        let pet = h.runtime.pet().unwrap();
        assert!(pet.position.x <= 3720.0, "x {} at tick {second}", pet.position.x);
        assert!(pet.position.x >= 0.0);
        assert_eq!(pet.direction.dx.abs(), 1.0);
        reflected |= pet.direction.dx < 0.0;
    }
    assert!(reflected);
    assert!(h.surfaces.snapshot(|log| log.presents) > 0);
}
