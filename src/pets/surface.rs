use crate::pets::geometry::{Point, Rect};
use crate::pets::model::Pet;
use crate::pets::monitor::{DisplayFrame, DisplayList};
use crate::pets::overlay::OverlayWindow;
use crate::pets::render::{DirtyRect, FrameBuffer};
use crate::pets::shapes::shapes_bounds;
use anyhow::{anyhow, Result};

/// Platform window behind one screen surface.
pub trait SurfaceBackend {
    fn show(&mut self);
    /// `dirty` is the region that changed since the previous present.
    fn present(&mut self, frame: &FrameBuffer, dirty: DirtyRect) -> Result<()>;
    fn close(&mut self);
}

pub trait SurfaceFactory {
    fn create(&mut self, display: &DisplayFrame, offset: Point)
        -> Result<Box<dyn SurfaceBackend>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawOutcome {
    Drawn,
    Cleared,
    Skipped,
}

/// One transparent overlay covering one display.
pub struct ScreenSurface {
    display: DisplayFrame,
    offset: Point,
    frame: FrameBuffer,
    last_drawn: Option<DirtyRect>,
    backend: Box<dyn SurfaceBackend>,
}

impl ScreenSurface {
    pub fn new(display: DisplayFrame, offset: Point, backend: Box<dyn SurfaceBackend>) -> Self {
        let width = display.frame.width.round().max(0.0) as u32;
        let height = display.frame.height.round().max(0.0) as u32;
        Self {
            display,
            offset,
            frame: FrameBuffer::new(width, height),
            last_drawn: None,
            backend,
        }
    }

    pub fn display(&self) -> &DisplayFrame {
        &self.display
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Pixel rectangle of this surface in global canvas space.
    pub fn canvas_rect(&self) -> Rect {
        let (width, height) = self.frame.size();
        Rect::new(self.offset.x, self.offset.y, width as f64, height as f64)
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn has_drawing(&self) -> bool {
        self.last_drawn.is_some()
    }

    pub fn show(&mut self) {
        self.backend.show();
    }

    pub fn close(&mut self) {
        self.backend.close();
    }

    pub fn redraw(&mut self, pet: &Pet, scale: f64) -> Result<RedrawOutcome> {
        let (width, height) = self.frame.size();
        if !pet.bounding_box(scale).intersects(&self.canvas_rect()) {
            let Some(previous) = self.last_drawn.take() else {
                return Ok(RedrawOutcome::Skipped);
            };
            self.frame.clear_rect(previous);
            self.backend.present(&self.frame, previous)?;
            return Ok(RedrawOutcome::Cleared);
        }

        let local = pet.position.offset_by(self.offset);
        let shapes = pet.draw(local, scale);
        let target = shapes_bounds(&shapes)
            .and_then(|bounds| DirtyRect::from_rect(&bounds, 1).clamp(width, height));

        if let Some(previous) = self.last_drawn {
            self.frame.clear_rect(previous);
        }
        if let Some(target) = target {
            self.frame.draw_shapes(&shapes, Some(target));
        }

        let dirty = match (self.last_drawn, target) {
            (Some(previous), Some(target)) => Some(previous.union(target)),
            (previous, target) => previous.or(target),
        };
        self.last_drawn = target;
        if let Some(dirty) = dirty {
            self.backend.present(&self.frame, dirty)?;
        }
        tracing::trace!(x = local.x, y = local.y, "pet drawn on surface");
        Ok(RedrawOutcome::Drawn)
    }
}

/// Every live surface, one per display, in display order.
#[derive(Default)]
pub struct Compositor {
    surfaces: Vec<ScreenSurface>,
}

impl Compositor {
    /// Builds one surface per display. A display whose surface cannot be
    /// created is left uncovered.
    pub fn build(displays: &DisplayList, factory: &mut dyn SurfaceFactory) -> Self {
        let mut surfaces = Vec::with_capacity(displays.len());
        for (index, screen) in displays.iter().enumerate() {
            let offset = displays.surface_offset(screen);
            match factory.create(screen, offset) {
                Ok(backend) => surfaces.push(ScreenSurface::new(*screen, offset, backend)),
                Err(err) => {
                    let frame = screen.frame;
                    tracing::warn!(?err, index, ?frame, "skipping pet surface");
                }
            }
        }
        tracing::debug!(surfaces = surfaces.len(), "pet surfaces built");
        Self { surfaces }
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn surfaces(&self) -> &[ScreenSurface] {
        &self.surfaces
    }

    pub fn show_all(&mut self) {
        for surface in &mut self.surfaces {
            surface.show();
        }
    }

    /// Notifies every surface, including the ones the pet is not over.
    pub fn redraw_all(&mut self, pet: &Pet, scale: f64) -> Vec<RedrawOutcome> {
        self.surfaces
            .iter_mut()
            .map(|surface| match surface.redraw(pet, scale) {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(?err, "pet surface redraw failed");
                    RedrawOutcome::Skipped
                }
            })
            .collect()
    }

    pub fn close_all(&mut self) {
        for mut surface in self.surfaces.drain(..) {
            surface.close();
        }
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        self.close_all();
    }
}

/// Layered-window surface for real displays.
pub struct OverlaySurface {
    window: OverlayWindow,
}

impl SurfaceBackend for OverlaySurface {
    fn show(&mut self) {
        self.window.show();
    }

    fn present(&mut self, frame: &FrameBuffer, dirty: DirtyRect) -> Result<()> {
        self.window.with_bitmap_mut(|bgra, _, _| {
            frame.copy_rect_premultiplied_bgra(bgra, dirty);
        });
        self.window
            .present()
            .map_err(|err| anyhow!("failed to present pet overlay: {err}"))
    }

    fn close(&mut self) {
        self.window.shutdown();
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OverlaySurfaceFactory;

impl SurfaceFactory for OverlaySurfaceFactory {
    fn create(
        &mut self,
        display: &DisplayFrame,
        _offset: Point,
    ) -> Result<Box<dyn SurfaceBackend>> {
        let rect = display.monitor_rect();
        let window = OverlayWindow::create_for_monitor(rect)
            .ok_or_else(|| anyhow!("unable to create pet overlay window for {rect:?}"))?;
        Ok(Box::new(OverlaySurface { window }))
    }
}
