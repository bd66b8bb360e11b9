use crate::pets::geometry::{Point, Rect};
use crate::pets::shapes::{Color, Paint, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    /// Smallest pixel rectangle covering `rect`, grown by `pad` pixels.
    pub fn from_rect(rect: &Rect, pad: i32) -> Self {
        let min_x = rect.min_x().floor() as i32 - pad;
        let min_y = rect.min_y().floor() as i32 - pad;
        let max_x = rect.max_x().ceil() as i32 + pad;
        let max_y = rect.max_y().ceil() as i32 + pad;
        Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x).max(1),
            height: (max_y - min_y).max(1),
        }
    }

    pub fn union(self, other: DirtyRect) -> DirtyRect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        DirtyRect {
            x: min_x,
            y: min_y,
            width: (max_x - min_x).max(1),
            height: (max_y - min_y).max(1),
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        let max_w = width as i32;
        let max_h = height as i32;
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = (self.x + self.width).clamp(0, max_w);
        let y1 = (self.y + self.height).clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn intersect(self, other: DirtyRect) -> Option<DirtyRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    fn rows(&self) -> std::ops::Range<i32> {
        self.y..(self.y + self.height)
    }

    fn cols(&self) -> std::ops::Range<i32> {
        self.x..(self.x + self.width)
    }
}

/// Straight-alpha RGBA pixels for one surface, transparent when cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        Self {
            width,
            height,
            rgba: vec![0; len],
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn rgba_pixels(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = self.index(x as i32, y as i32);
        Color::rgba(
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        )
    }

    pub fn full_rect(&self) -> DirtyRect {
        DirtyRect {
            x: 0,
            y: 0,
            width: self.width as i32,
            height: self.height as i32,
        }
    }

    fn index(&self, x: i32, y: i32) -> usize {
        ((y as u32 * self.width + x as u32) * 4) as usize
    }

    pub fn clear_rect(&mut self, rect: DirtyRect) {
        let Some(rect) = rect.clamp(self.width, self.height) else {
            return;
        };
        for y in rect.rows() {
            let start = self.index(rect.x, y);
            let end = start + rect.width as usize * 4;
            self.rgba[start..end].fill(0);
        }
    }

    pub fn draw_shapes(&mut self, shapes: &[Shape], clip: Option<DirtyRect>) {
        for shape in shapes {
            self.draw_shape(shape, clip);
        }
    }

    pub fn draw_shape(&mut self, shape: &Shape, clip: Option<DirtyRect>) {
        let Some(region) = self.region_for(&shape.bounds(), clip) else {
            return;
        };
        match shape {
            Shape::Stroke {
                points,
                width,
                color,
            } => self.stroke_polyline(points, *width, *color, region),
            Shape::Ellipse { rect, color } => self.fill_ellipse(rect, *color, region),
            Shape::RoundedRect {
                rect,
                radius,
                color,
            } => self.fill_rounded_rect(rect, *radius, *color, region),
            Shape::Polygon { points, paint } => self.fill_polygon(points, paint, region),
        }
    }

    fn region_for(&self, bounds: &Rect, clip: Option<DirtyRect>) -> Option<DirtyRect> {
        let region = DirtyRect::from_rect(bounds, 1).clamp(self.width, self.height)?;
        match clip {
            Some(clip) => region.intersect(clip),
            None => Some(region),
        }
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f64, color: Color, region: DirtyRect) {
        if points.is_empty() {
            return;
        }
        let half = (width * 0.5).max(0.5);
        let limit = half * half;
        for y in region.rows() {
            for x in region.cols() {
                let p = pixel_center(x, y);
                let hit = if points.len() == 1 {
                    distance_sq(p, points[0]) <= limit
                } else {
                    points
                        .windows(2)
                        .any(|seg| point_segment_distance_sq(p, seg[0], seg[1]) <= limit)
                };
                if hit {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn fill_ellipse(&mut self, rect: &Rect, color: Color, region: DirtyRect) {
        let rx = rect.width * 0.5;
        let ry = rect.height * 0.5;
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let cx = rect.x + rx;
        let cy = rect.y + ry;
        for y in region.rows() {
            for x in region.cols() {
                let p = pixel_center(x, y);
                let nx = (p.x - cx) / rx;
                let ny = (p.y - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn fill_rounded_rect(&mut self, rect: &Rect, radius: f64, color: Color, region: DirtyRect) {
        if rect.is_empty() {
            return;
        }
        let r = radius.clamp(0.0, rect.width.min(rect.height) * 0.5);
        for y in region.rows() {
            for x in region.cols() {
                let p = pixel_center(x, y);
                if p.x < rect.min_x()
                    || p.x > rect.max_x()
                    || p.y < rect.min_y()
                    || p.y > rect.max_y()
                {
                    continue;
                }
                let nearest = Point::new(
                    p.x.clamp(rect.min_x() + r, rect.max_x() - r),
                    p.y.clamp(rect.min_y() + r, rect.max_y() - r),
                );
                if distance_sq(p, nearest) <= r * r {
                    self.blend(x, y, color);
                }
            }
        }
    }

    /// Even-odd scanline fill sampled at pixel centers.
    fn fill_polygon(&mut self, points: &[Point], paint: &Paint, region: DirtyRect) {
        if points.len() < 3 {
            return;
        }
        let mut crossings = Vec::with_capacity(points.len());
        for y in region.rows() {
            let py = y as f64 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= py && b.y > py) || (b.y <= py && a.y > py) {
                    let t = (py - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(|l, r| l.total_cmp(r));
            let color = paint.color_at(py);
            for span in crossings.chunks_exact(2) {
                for x in region.cols() {
                    let px = x as f64 + 0.5;
                    if px >= span[0] && px < span[1] {
                        self.blend(x, y, color);
                    }
                }
            }
        }
    }

    /// Source-over onto straight alpha.
    fn blend(&mut self, x: i32, y: i32, src: Color) {
        if src.a == 0 || x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = self.index(x, y);
        let dst = &mut self.rgba[idx..idx + 4];
        if src.a == 255 || dst[3] == 0 {
            dst.copy_from_slice(&[src.r, src.g, src.b, src.a]);
            return;
        }
        let sa = src.a as f32 / 255.0;
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| {
            ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        dst[0] = mix(src.r, dst[0]);
        dst[1] = mix(src.g, dst[1]);
        dst[2] = mix(src.b, dst[2]);
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Copies `rect` into a same-sized BGRA buffer with premultiplied alpha,
    /// the layout layered windows expect.
    pub fn copy_rect_premultiplied_bgra(&self, bgra: &mut [u8], rect: DirtyRect) {
        let Some(rect) = rect.clamp(self.width, self.height) else {
            return;
        };
        if bgra.len() != self.rgba.len() {
            return;
        }
        for y in rect.rows() {
            let start = self.index(rect.x, y);
            let end = start + rect.width as usize * 4;
            convert_rgba_to_premultiplied_bgra(&self.rgba[start..end], &mut bgra[start..end]);
        }
    }
}

pub fn convert_rgba_to_premultiplied_bgra(rgba: &[u8], bgra: &mut [u8]) {
    assert_eq!(rgba.len(), bgra.len());
    for (src, dst) in rgba.chunks_exact(4).zip(bgra.chunks_exact_mut(4)) {
        let a = src[3];
        dst[0] = premultiply(src[2], a);
        dst[1] = premultiply(src[1], a);
        dst[2] = premultiply(src[0], a);
        dst[3] = a;
    }
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((channel as u32 * alpha as u32 + 127) / 255) as u8
}

fn pixel_center(x: i32, y: i32) -> Point {
    Point::new(x as f64 + 0.5, y as f64 + 0.5)
}

fn distance_sq(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f64 {
    let vx = end.x - start.x;
    let vy = end.y - start.y;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f64::EPSILON {
        return distance_sq(point, start);
    }
    let t = (((point.x - start.x) * vx + (point.y - start.y) * vy) / len_sq).clamp(0.0, 1.0);
    distance_sq(point, Point::new(start.x + vx * t, start.y + vy * t))
}
