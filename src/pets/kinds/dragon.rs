use super::KindInfo;
use crate::pets::geometry::Size;
use crate::pets::shapes::{Color, Facing, SpriteCanvas};

pub const INFO: KindInfo = KindInfo {
    id: "dragon",
    name: "Dragon",
    icon: "🐉",
    size: Size::new(120.0, 30.0),
    phase_rate: 10.0,
};

const BASE_X: f64 = 25.0;
const CENTER_Y: f64 = 15.0;

pub fn draw(canvas: &mut SpriteCanvas, phase: f64, facing: Facing) {
    let wave = |offset: f64| (phase + offset).sin() * 4.0;
    let (w1, w2, w3, w4) = (wave(0.0), wave(1.0), wave(2.0), wave(3.0));

    let tail = Color::unit(0.8, 0.2, 0.0, 0.9);
    let body = Color::unit(1.0, 0.3, 0.0, 0.9);
    let head = Color::unit(1.0, 0.2, 0.0, 0.9);
    let horn = Color::unit(1.0, 0.5, 0.0, 0.9);
    let fire = Color::unit(1.0, 0.8, 0.0, 0.8);

    // Left-facing mirrors around BASE_X + 30.
    let (bx, cy) = (BASE_X, CENTER_Y);
    let x = |dx: f64| {
        if facing.is_right() {
            bx + dx
        } else {
            bx + 60.0 - dx
        }
    };

    canvas.stroke(
        &[
            (x(0.0), cy + w1),
            (x(-12.0), cy - 6.0 + w1),
            (x(-20.0), cy + 4.0 + w1),
        ],
        2.0,
        tail,
    );

    canvas.stroke(
        &[
            (x(0.0), cy + w1),
            (x(12.0), cy - 6.0 + w2),
            (x(24.0), cy + 4.0 + w3),
            (x(36.0), cy - 6.0 + w4),
            (x(48.0), cy + w1),
        ],
        4.0,
        body,
    );

    let head_x = if facing.is_right() { bx + 48.0 } else { bx - 4.0 };
    canvas.fill_ellipse(head_x, cy - 8.0, 16.0, 16.0, head);
    let eye_x = if facing.is_right() { bx + 58.0 } else { bx - 2.0 };
    canvas.fill_ellipse(eye_x, cy - 4.0, 4.0, 4.0, Color::YELLOW);

    canvas.stroke(&[(x(52.0), cy - 4.0), (x(50.0), cy - 12.0)], 2.0, horn);
    canvas.stroke(&[(x(56.0), cy - 6.0), (x(55.0), cy - 13.0)], 2.0, horn);

    canvas.stroke(
        &[
            (x(64.0), cy),
            (x(74.0 + w2), cy - 2.0),
            (x(70.0 + w3), cy + 2.0),
            (x(82.0 + w4), cy),
        ],
        3.0,
        fire,
    );
}
