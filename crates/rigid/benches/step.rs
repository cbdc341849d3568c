use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use rigid::collision::collide_box_box;
use rigid::{Body, ContactBuffer, Physics, Shape};

fn grid(side: u8) -> Vec<Body> {
    let mut bodies = vec![Body::new(0, Shape::cuboid(20.0, 0.5, 20.0), 0.0).expect("ground")];
    let mut id = 1;
    for i in 0..side {
        for j in 0..side {
            let shape = if (i + j) % 2 == 0 {
                Shape::sphere(0.4)
            } else {
                Shape::cuboid(0.4, 0.4, 0.4)
            };
            let position = Vec3::new(f32::from(i) * 1.1, 1.0, f32::from(j) * 1.1);
            bodies.push(Body::new(id, shape, 1.0).expect("body").with_position(position));
            id += 1;
        }
    }
    bodies
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    for side in [4_u8, 8, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(u32::from(side) * u32::from(side)), &side, |b, &side| {
            let mut physics = Physics::new();
            let mut bodies = grid(side);
            // Settle first so the pair table and manifolds are warm.
            for _ in 0..60 {
                physics.step(&mut bodies, 1.0 / 60.0);
            }
            b.iter(|| physics.step(black_box(&mut bodies), 1.0 / 60.0));
        });
    }
    group.finish();
}

fn bench_box_box(c: &mut Criterion) {
    let ground = Body::new(0, Shape::cuboid(5.0, 0.5, 5.0), 0.0).expect("ground");
    let block = Body::new(1, Shape::cuboid(0.5, 0.5, 0.5), 1.0)
        .expect("block")
        .with_position(Vec3::new(0.0, 0.99, 0.0));
    let mut out = ContactBuffer::new();
    c.bench_function("box_box_face", |b| {
        b.iter(|| {
            out.reset(0.04);
            collide_box_box(black_box(&block), black_box(&ground), &mut out)
        });
    });
}

criterion_group!(benches, bench_step, bench_box_box);
criterion_main!(benches);
