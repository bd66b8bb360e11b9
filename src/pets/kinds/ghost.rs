use super::KindInfo;
use crate::pets::geometry::Size;
use crate::pets::shapes::{Color, Facing, Paint, PathBuilder, SpriteCanvas};

pub const INFO: KindInfo = KindInfo {
    id: "ghost",
    name: "Ghost",
    icon: "👻",
    size: Size::new(60.0, 70.0),
    phase_rate: 5.0,
};

const CENTER_X: f64 = 30.0;
const TOP_Y: f64 = 5.0;

const SPARKLES: [(f64, f64, f64); 5] = [
    (-30.0, 10.0, 0.0),
    (30.0, 15.0, 1.0),
    (-25.0, 45.0, 2.0),
    (28.0, 50.0, 3.0),
    (0.0, -5.0, 4.0),
];

/// Extra vertical bob applied on top of the shared motion law.
pub fn float_offset(phase: f64) -> f64 {
    phase.sin() * 0.5
}

pub fn draw(canvas: &mut SpriteCanvas, phase: f64, facing: Facing) {
    let opacity = 0.85 + (phase * 0.3).sin() * 0.15;
    let (cx, ty) = (CENTER_X, TOP_Y);
    let wave = phase * 2.0;

    let mut body = PathBuilder::new();
    body.arc((cx, ty + 25.0), 25.0, 180.0, 0.0)
        .line_to(cx + 25.0, ty + 55.0)
        .quad_to(
            (cx + 20.0, ty + 60.0 + wave.sin() * 3.0),
            (cx + 15.0, ty + 50.0 + wave.sin() * 5.0),
        )
        .quad_to(
            (cx + 10.0, ty + 45.0 + (wave + 0.5).sin() * 3.0),
            (cx + 5.0, ty + 55.0 + (wave + 1.0).sin() * 5.0),
        )
        .quad_to(
            (cx, ty + 60.0 + (wave + 1.5).sin() * 3.0),
            (cx - 5.0, ty + 50.0 + (wave + 2.0).sin() * 5.0),
        )
        .quad_to(
            (cx - 10.0, ty + 45.0 + (wave + 2.5).sin() * 3.0),
            (cx - 15.0, ty + 55.0 + (wave + 3.0).sin() * 5.0),
        )
        .quad_to(
            (cx - 20.0, ty + 60.0 + (wave + 3.0).sin() * 3.0),
            (cx - 25.0, ty + 50.0),
        )
        .line_to(cx - 25.0, ty + 25.0);
    canvas.fill_path(
        body.points(),
        Paint::VerticalGradient {
            top: Color::WHITE.with_opacity(opacity),
            bottom: Color::gray(0.9).with_opacity(opacity * 0.9),
            y0: ty,
            y1: ty + 60.0,
        },
    );

    let eye_dx = if facing.is_right() { 3.0 } else { -3.0 };
    for eye_x in [cx - 12.0, cx + 2.0] {
        canvas.fill_ellipse(
            eye_x + eye_dx,
            ty + 18.0,
            10.0,
            14.0,
            Color::BLACK.with_opacity(opacity),
        );
        canvas.fill_ellipse(
            eye_x + 2.0 + eye_dx,
            ty + 20.0,
            4.0,
            4.0,
            Color::WHITE.with_opacity(opacity * 0.8),
        );
    }

    let mouth_open = ((phase * 0.8).sin() + 1.0) / 2.0 * 4.0 + 2.0;
    canvas.fill_ellipse(
        cx - 4.0 + eye_dx,
        ty + 35.0,
        8.0,
        mouth_open,
        Color::BLACK.with_opacity(opacity * 0.6),
    );

    let blush = Color::PINK.with_opacity(opacity * 0.4);
    canvas.fill_ellipse(cx - 20.0, ty + 30.0, 8.0, 5.0, blush);
    canvas.fill_ellipse(cx + 12.0, ty + 30.0, 8.0, 5.0, blush);

    let sparkle_phase = phase * 1.5;
    for (sx, sy, offset) in SPARKLES {
        let s = (sparkle_phase + offset).sin();
        let sparkle_opacity = (s + 1.0) / 2.0 * 0.6;
        let size = 3.0 + s;
        canvas.fill_ellipse(
            cx + sx - size / 2.0,
            ty + sy - size / 2.0,
            size,
            size,
            Color::WHITE.with_opacity(sparkle_opacity),
        );
    }
}
