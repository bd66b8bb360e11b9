use crate::pets::geometry::{Point, Rect};

/// Straight (non-premultiplied) RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const YELLOW: Self = Self::rgba(255, 255, 0, 255);
    pub const PINK: Self = Self::rgba(255, 192, 203, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels in `0.0..=1.0`.
    pub fn unit(r: f64, g: f64, b: f64, opacity: f64) -> Self {
        Self::rgba(
            unit_to_u8(r),
            unit_to_u8(g),
            unit_to_u8(b),
            unit_to_u8(opacity),
        )
    }

    pub fn gray(white: f64) -> Self {
        Self::unit(white, white, white, 1.0)
    }

    /// Multiplies the existing alpha by `opacity`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self {
            a: unit_to_u8(self.a as f64 / 255.0 * opacity),
            ..self
        }
    }

    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

fn unit_to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Linear gradient from `top` at `y0` to `bottom` at `y1`, surface-local.
    VerticalGradient {
        top: Color,
        bottom: Color,
        y0: f64,
        y1: f64,
    },
}

impl Paint {
    pub fn color_at(&self, y: f64) -> Color {
        match *self {
            Paint::Solid(color) => color,
            Paint::VerticalGradient {
                top,
                bottom,
                y0,
                y1,
            } => {
                let span = y1 - y0;
                let t = if span.abs() < f64::EPSILON {
                    0.0
                } else {
                    (y - y0) / span
                };
                top.lerp(bottom, t)
            }
        }
    }
}

/// One draw primitive in surface-local pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Stroke {
        points: Vec<Point>,
        width: f64,
        color: Color,
    },
    Ellipse {
        rect: Rect,
        color: Color,
    },
    RoundedRect {
        rect: Rect,
        radius: f64,
        color: Color,
    },
    Polygon {
        points: Vec<Point>,
        paint: Paint,
    },
}

impl Shape {
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Stroke { points, width, .. } => {
                points_bounds(points).inflate((width * 0.5).max(0.5))
            }
            Shape::Ellipse { rect, .. } | Shape::RoundedRect { rect, .. } => *rect,
            Shape::Polygon { points, .. } => points_bounds(points),
        }
    }
}

fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::default();
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

pub fn shapes_bounds(shapes: &[Shape]) -> Option<Rect> {
    shapes
        .iter()
        .map(Shape::bounds)
        .reduce(|acc, rect| acc.union(&rect))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Right,
    Left,
}

impl Facing {
    pub fn from_dx(dx: f64) -> Self {
        if dx >= 0.0 {
            Self::Right
        } else {
            Self::Left
        }
    }

    pub fn is_right(self) -> bool {
        matches!(self, Self::Right)
    }
}

/// Collects shapes drawn in sprite space (origin at the pet's top-left,
/// nominal size) and maps them to surface space: scale first, then translate
/// to `origin`.
#[derive(Debug)]
pub struct SpriteCanvas {
    origin: Point,
    scale: f64,
    shapes: Vec<Shape>,
}

impl SpriteCanvas {
    pub fn new(origin: Point, scale: f64) -> Self {
        Self {
            origin,
            scale,
            shapes: Vec::new(),
        }
    }

    fn map(&self, x: f64, y: f64) -> Point {
        Point::new(self.origin.x + x * self.scale, self.origin.y + y * self.scale)
    }

    fn map_rect(&self, x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect::from_origin_size(
            self.map(x, y),
            crate::pets::geometry::Size::new(width * self.scale, height * self.scale),
        )
    }

    pub fn stroke(&mut self, points: &[(f64, f64)], width: f64, color: Color) {
        let points = points.iter().map(|&(x, y)| self.map(x, y)).collect();
        self.shapes.push(Shape::Stroke {
            points,
            width: width * self.scale,
            color,
        });
    }

    pub fn fill_ellipse(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let rect = self.map_rect(x, y, width, height);
        self.shapes.push(Shape::Ellipse { rect, color });
    }

    pub fn fill_rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        color: Color,
    ) {
        let rect = self.map_rect(x, y, width, height);
        self.shapes.push(Shape::RoundedRect {
            rect,
            radius: radius * self.scale,
            color,
        });
    }

    pub fn fill_polygon(&mut self, points: &[(f64, f64)], color: Color) {
        self.fill_path(points, Paint::Solid(color));
    }

    /// `paint` gradients are given in sprite space and mapped here.
    pub fn fill_path(&mut self, points: &[(f64, f64)], paint: Paint) {
        let points = points.iter().map(|&(x, y)| self.map(x, y)).collect();
        let paint = match paint {
            Paint::Solid(_) => paint,
            Paint::VerticalGradient {
                top,
                bottom,
                y0,
                y1,
            } => Paint::VerticalGradient {
                top,
                bottom,
                y0: self.origin.y + y0 * self.scale,
                y1: self.origin.y + y1 * self.scale,
            },
        };
        self.shapes.push(Shape::Polygon { points, paint });
    }

    pub fn into_shapes(self) -> Vec<Shape> {
        self.shapes
    }
}

const CURVE_STEPS: usize = 8;

/// Flattens line, quadratic curve and arc segments into a point list.
#[derive(Debug, Default, Clone)]
pub struct PathBuilder {
    points: Vec<(f64, f64)>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> (f64, f64) {
        self.points.last().copied().unwrap_or((0.0, 0.0))
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.points.push((x, y));
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.points.push((x, y));
        self
    }

    pub fn quad_to(&mut self, control: (f64, f64), to: (f64, f64)) -> &mut Self {
        let from = self.current();
        for step in 1..=CURVE_STEPS {
            let t = step as f64 / CURVE_STEPS as f64;
            let u = 1.0 - t;
            self.points.push((
                u * u * from.0 + 2.0 * u * t * control.0 + t * t * to.0,
                u * u * from.1 + 2.0 * u * t * control.1 + t * t * to.1,
            ));
        }
        self
    }

    /// Arc around `center`, angles in degrees, Y down, sweeping from `start`
    /// to `end` through increasing angles.
    pub fn arc(&mut self, center: (f64, f64), radius: f64, start: f64, end: f64) -> &mut Self {
        let sweep = if end >= start {
            end - start
        } else {
            end + 360.0 - start
        };
        let steps = (CURVE_STEPS * 2).max((sweep / 10.0).ceil() as usize);
        for step in 0..=steps {
            let angle = (start + sweep * step as f64 / steps as f64).to_radians();
            self.points.push((
                center.0 + radius * angle.cos(),
                center.1 + radius * angle.sin(),
            ));
        }
        self
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}
