use super::KindInfo;
use crate::pets::geometry::Size;
use crate::pets::shapes::{Color, Facing, SpriteCanvas};
use std::f64::consts::PI;

pub const INFO: KindInfo = KindInfo {
    id: "nyancat",
    name: "Nyan Cat",
    icon: "🌈",
    size: Size::new(150.0, 40.0),
    phase_rate: 8.0,
};

const RAINBOW: [Color; 6] = [
    Color::rgba(255, 0, 0, 255),
    Color::rgba(255, 128, 0, 255),
    Color::rgba(255, 255, 0, 255),
    Color::rgba(0, 255, 0, 255),
    Color::rgba(0, 128, 255, 255),
    Color::rgba(128, 0, 255, 255),
];

const BODY_DOTS: [(f64, f64); 5] = [(8.0, 6.0), (18.0, 4.0), (28.0, 8.0), (12.0, 14.0), (22.0, 16.0)];

pub fn draw(canvas: &mut SpriteCanvas, phase: f64, facing: Facing) {
    let right = facing.is_right();
    let cat_x = if right { 80.0 } else { 30.0 };
    let cat_y = 12.0;
    let fur = Color::unit(0.6, 0.6, 0.6, 1.0);

    let (rainbow_start, rainbow_end) = if right {
        (0.0, cat_x - 5.0)
    } else {
        (cat_x + 40.0, 150.0)
    };
    for (index, color) in RAINBOW.iter().enumerate() {
        let y = index as f64 * 5.0 + 5.0 + (phase + index as f64 * 0.5).sin() * 2.0;
        canvas.stroke(
            &[(rainbow_start, y), (rainbow_end, y)],
            4.0,
            color.with_opacity(0.9),
        );
    }

    canvas.fill_rounded_rect(cat_x, cat_y, 35.0, 22.0, 4.0, Color::unit(1.0, 0.7, 0.8, 1.0));
    for (dx, dy) in BODY_DOTS {
        canvas.fill_ellipse(
            cat_x + dx,
            cat_y + dy,
            3.0,
            3.0,
            Color::unit(1.0, 0.3, 0.5, 1.0),
        );
    }

    let head_x = if right { cat_x + 28.0 } else { cat_x - 5.0 };
    canvas.fill_ellipse(head_x, cat_y - 2.0, 18.0, 16.0, fur);

    let ear_offset = if right { 0.0 } else { 10.0 };
    canvas.fill_polygon(
        &[
            (head_x + 2.0 + ear_offset, cat_y),
            (head_x + ear_offset, cat_y - 8.0),
            (head_x + 6.0 + ear_offset, cat_y),
        ],
        fur,
    );
    canvas.fill_polygon(
        &[
            (head_x + 10.0 - ear_offset, cat_y),
            (head_x + 14.0 - ear_offset, cat_y - 8.0),
            (head_x + 16.0 - ear_offset, cat_y),
        ],
        fur,
    );

    // Blink near the top of the slow wave.
    let eye_height = if (phase * 0.5).sin() > 0.9 { 1.0 } else { 4.0 };
    canvas.fill_ellipse(head_x + 4.0, cat_y + 4.0, 4.0, eye_height, Color::BLACK);
    canvas.fill_ellipse(head_x + 10.0, cat_y + 4.0, 4.0, eye_height, Color::BLACK);
    canvas.fill_ellipse(
        head_x + 6.0,
        cat_y + 9.0,
        6.0,
        4.0,
        Color::unit(1.0, 0.5, 0.6, 1.0),
    );

    let leg = (phase * 2.0).sin() * 3.0;
    let leg_y = cat_y + 20.0;
    let (front_x, back_x) = if right {
        (cat_x + 25.0, cat_x + 5.0)
    } else {
        (cat_x + 5.0, cat_x + 25.0)
    };
    canvas.fill_rounded_rect(front_x, leg_y + leg, 4.0, 8.0, 1.0, fur);
    canvas.fill_rounded_rect(front_x + 6.0, leg_y - leg, 4.0, 8.0, 1.0, fur);
    canvas.fill_rounded_rect(back_x, leg_y - leg, 4.0, 8.0, 1.0, fur);
    canvas.fill_rounded_rect(back_x + 6.0, leg_y + leg, 4.0, 8.0, 1.0, fur);

    let stars = [
        (if right { -10.0 } else { 140.0 }, 10.0 + phase.sin() * 5.0),
        (if right { -20.0 } else { 155.0 }, 25.0 + (phase * 1.3).cos() * 5.0),
        (if right { -5.0 } else { 145.0 }, 35.0 + (phase * 0.8).sin() * 5.0),
    ];
    for center in stars {
        draw_star(canvas, center, 6.0, phase);
    }
}

fn draw_star(canvas: &mut SpriteCanvas, center: (f64, f64), size: f64, phase: f64) {
    let opacity = ((phase * 2.0).sin() + 1.0) / 2.0 * 0.5 + 0.5;
    let mut points = Vec::with_capacity(10);
    for i in 0..5 {
        let angle = i as f64 * PI * 2.0 / 5.0 - PI / 2.0;
        points.push((center.0 + angle.cos() * size, center.1 + angle.sin() * size));
        let inner = angle + PI / 5.0;
        points.push((
            center.0 + inner.cos() * size * 0.4,
            center.1 + inner.sin() * size * 0.4,
        ));
    }
    canvas.fill_polygon(&points, Color::YELLOW.with_opacity(opacity));
}
