use crate::pets::geometry::Rect;
use crate::pets::monitor::{union_of, DisplayList};
use crate::settings::PetMode;

/// Height of the strip used by the band modes.
pub const BAND_HEIGHT: f64 = 100.0;

/// Used when no display is attached.
pub const FALLBACK_BOUNDS: Rect = Rect::new(0.0, 0.0, 1920.0, BAND_HEIGHT);

/// Movement rectangle in global canvas space for the given topology and mode.
pub fn calculate_bounds(displays: &DisplayList, mode: PetMode) -> Rect {
    let Some(union) = displays.native_union() else {
        return FALLBACK_BOUNDS;
    };

    let full_band = Rect::new(0.0, 0.0, union.width, BAND_HEIGHT);
    match mode {
        PetMode::CrossScreen => full_band,
        PetMode::FreeRoam => Rect::new(0.0, 0.0, union.width, union.height),
        PetMode::SecondaryOnly => match union_of(displays.secondaries()) {
            Some(secondary) => Rect::new(
                secondary.min_x() - union.min_x(),
                0.0,
                secondary.width,
                BAND_HEIGHT,
            ),
            None => full_band,
        },
    }
}
