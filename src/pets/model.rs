use crate::pets::geometry::{Point, Rect, Size, Vector};
use crate::pets::kinds::{self, KindInfo};
use crate::pets::shapes::{Facing, Shape, SpriteCanvas};
use crate::settings::{PetMode, PetSettings, PetType};
use rand::Rng;

/// Per-tick inputs taken from one settings snapshot, so speed and scale are
/// always a consistent pair within a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub speed: f64,
    pub scale: f64,
}

impl From<&PetSettings> for Motion {
    fn from(settings: &PetSettings) -> Self {
        Self {
            speed: settings.speed,
            scale: settings.scale,
        }
    }
}

/// The one live pet. Replaced wholesale when the type changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    kind: PetType,
    pub position: Point,
    pub direction: Vector,
    pub animation_phase: f64,
}

impl Pet {
    pub fn new(kind: PetType) -> Self {
        Self {
            kind,
            position: Point::ZERO,
            direction: Vector::new(1.0, 0.0),
            animation_phase: 0.0,
        }
    }

    pub fn kind(&self) -> PetType {
        self.kind
    }

    pub fn info(&self) -> &'static KindInfo {
        kinds::info(self.kind)
    }

    pub fn id(&self) -> &'static str {
        self.info().id
    }

    pub fn name(&self) -> &'static str {
        self.info().name
    }

    pub fn icon(&self) -> &'static str {
        self.info().icon
    }

    pub fn size(&self) -> Size {
        self.info().size
    }

    pub fn scaled_size(&self, scale: f64) -> Size {
        self.size().scaled(scale)
    }

    pub fn bounding_box(&self, scale: f64) -> Rect {
        Rect::from_origin_size(self.position, self.scaled_size(scale))
    }

    pub fn facing(&self) -> Facing {
        Facing::from_dx(self.direction.dx)
    }

    /// Start rule shared by enable, type change, mode change and display
    /// change: top-left of the bounds, heading right.
    pub fn place_at_start<R: Rng + ?Sized>(&mut self, bounds: Rect, mode: PetMode, rng: &mut R) {
        self.position = bounds.origin();
        let dy = match mode {
            PetMode::FreeRoam => rng.gen_range(-1.0..=1.0),
            PetMode::CrossScreen | PetMode::SecondaryOnly => 0.0,
        };
        self.direction = Vector::new(1.0, dy);
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        delta_time: f64,
        bounds: Rect,
        mode: PetMode,
        motion: Motion,
        rng: &mut R,
    ) {
        self.animation_phase += delta_time.max(0.0) * self.info().phase_rate;

        self.position.x += motion.speed * self.direction.dx;
        self.position.y += motion.speed * self.direction.dy;

        let drift = kinds::vertical_drift(self.kind, self.animation_phase);
        if let Some(offset) = drift {
            self.position.y += offset;
        }

        let size = self.scaled_size(motion.scale);
        self.handle_boundary(bounds, mode, size, rng);

        if drift.is_some() {
            self.clamp_y(bounds, size);
        }
    }

    fn handle_boundary<R: Rng + ?Sized>(
        &mut self,
        bounds: Rect,
        mode: PetMode,
        size: Size,
        rng: &mut R,
    ) {
        let mut reflected = false;
        if self.direction.dx > 0.0 && self.position.x + size.width > bounds.max_x() {
            self.direction.dx = -self.direction.dx.abs();
            self.position.x = bounds.max_x() - size.width;
            reflected = true;
        } else if self.direction.dx < 0.0 && self.position.x < bounds.min_x() {
            self.direction.dx = self.direction.dx.abs();
            self.position.x = bounds.min_x();
            reflected = true;
        }
        // Bounds can shrink under a pet between resets.
        let rightmost = (bounds.max_x() - size.width).max(bounds.min_x());
        self.position.x = self.position.x.clamp(bounds.min_x(), rightmost);

        let lowest_y = lowest_y(bounds, size);
        match mode {
            PetMode::FreeRoam => {
                if reflected {
                    self.direction.dy = rng.gen_range(-1.0..=1.0);
                }
                if self.position.y < bounds.min_y() {
                    self.position.y = bounds.min_y();
                    self.direction.dy = self.direction.dy.abs();
                } else if self.position.y > lowest_y {
                    self.position.y = lowest_y;
                    self.direction.dy = -self.direction.dy.abs();
                }
            }
            PetMode::CrossScreen | PetMode::SecondaryOnly => {
                // Band modes never steer vertically; a pet left outside the
                // band re-enters at its top edge.
                self.direction.dy = 0.0;
                if self.position.y < bounds.min_y() || self.position.y > lowest_y {
                    self.position.y = bounds.min_y();
                }
            }
        }
    }

    fn clamp_y(&mut self, bounds: Rect, size: Size) {
        self.position.y = self.position.y.clamp(bounds.min_y(), lowest_y(bounds, size));
    }

    /// Draw into surface space; `local_origin` is the pet's position relative
    /// to the surface offset.
    pub fn draw(&self, local_origin: Point, scale: f64) -> Vec<Shape> {
        let mut canvas = SpriteCanvas::new(local_origin, scale);
        kinds::draw(self.kind, &mut canvas, self.animation_phase, self.facing());
        canvas.into_shapes()
    }
}

/// Largest Y that keeps the scaled box inside `bounds`, never above the top.
fn lowest_y(bounds: Rect, size: Size) -> f64 {
    (bounds.max_y() - size.height).max(bounds.min_y())
}
