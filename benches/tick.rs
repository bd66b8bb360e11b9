use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use screen_pets::pets::geometry::Point;
use screen_pets::pets::model::{Motion, Pet};
use screen_pets::pets::monitor::{DisplayFrame, DisplayList};
use screen_pets::pets::render::FrameBuffer;
use screen_pets::pets::calculate_bounds;
use screen_pets::settings::{PetMode, PetType};

fn bench_update(c: &mut Criterion) {
    let displays = DisplayList::new(vec![
        DisplayFrame::new(0.0, 0.0, 1920.0, 1080.0, true),
        DisplayFrame::new(1920.0, 0.0, 1920.0, 1080.0, false),
    ]);
    let bounds = calculate_bounds(&displays, PetMode::FreeRoam);
    let motion = Motion {
        speed: 3.0,
        scale: 1.0,
    };
    let mut rng = StdRng::seed_from_u64(1);
    let mut pet = Pet::new(PetType::Ghost);
    c.bench_function("pet_update", |b| {
        b.iter(|| pet.update(1.0 / 60.0, bounds, PetMode::FreeRoam, motion, &mut rng))
    });
}

fn bench_rasterize(c: &mut Criterion) {
    let mut frame = FrameBuffer::new(400, 200);
    for kind in PetType::ALL {
        let mut pet = Pet::new(kind);
        pet.animation_phase = 1.3;
        let shapes = pet.draw(Point::new(100.0, 50.0), 1.5);
        c.bench_function(&format!("rasterize_{}", pet.id()), |b| {
            b.iter(|| {
                frame.clear_rect(frame.full_rect());
                frame.draw_shapes(&shapes, None);
            })
        });
    }
}

criterion_group!(benches, bench_update, bench_rasterize);
criterion_main!(benches);
