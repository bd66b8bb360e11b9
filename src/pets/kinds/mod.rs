//! Per-variant constants and draw routines. The variant set is closed; each
//! function matches on [`PetType`].

pub mod dragon;
pub mod ghost;
pub mod nyan_cat;

use crate::pets::geometry::Size;
use crate::pets::shapes::{Facing, SpriteCanvas};
use crate::settings::PetType;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub size: Size,
    /// Animation phase advance per second.
    pub phase_rate: f64,
}

pub fn info(kind: PetType) -> &'static KindInfo {
    match kind {
        PetType::Dragon => &dragon::INFO,
        PetType::NyanCat => &nyan_cat::INFO,
        PetType::Ghost => &ghost::INFO,
    }
}

/// Vertical displacement a variant adds on top of the shared motion law.
/// Variants that drift re-clamp Y into bounds afterwards.
pub fn vertical_drift(kind: PetType, phase: f64) -> Option<f64> {
    match kind {
        PetType::Ghost => Some(ghost::float_offset(phase)),
        PetType::Dragon | PetType::NyanCat => None,
    }
}

pub fn draw(kind: PetType, canvas: &mut SpriteCanvas, phase: f64, facing: Facing) {
    match kind {
        PetType::Dragon => dragon::draw(canvas, phase, facing),
        PetType::NyanCat => nyan_cat::draw(canvas, phase, facing),
        PetType::Ghost => ghost::draw(canvas, phase, facing),
    }
}
