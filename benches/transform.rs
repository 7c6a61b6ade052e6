use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use spincube::params::{CameraParams, DemoParams};
use spincube::{Camera, OrbitControls, Scene};

fn bench_scene_advance(c: &mut Criterion) {
    c.bench_function("scene_advance_1000_frames", |b| {
        b.iter(|| {
            let mut scene = Scene::new(&DemoParams::default());
            for _ in 0..1000 {
                scene.advance();
            }
            black_box(scene.cube.rotation)
        })
    });
}

fn bench_camera_matrices(c: &mut Criterion) {
    let camera = Camera::new(&CameraParams::default(), 1920, 1080);
    c.bench_function("camera_view_projection", |b| {
        b.iter(|| black_box(camera.view_projection()))
    });
}

fn bench_orbit_apply(c: &mut Criterion) {
    let mut camera = Camera::new(&CameraParams::default(), 1920, 1080);
    let mut orbit = OrbitControls::from_camera(&camera, Vec3::ZERO);
    c.bench_function("orbit_rotate_and_apply", |b| {
        b.iter(|| {
            orbit.rotate(0.01, 0.005);
            orbit.apply_to(&mut camera);
            black_box(camera.position)
        })
    });
}

criterion_group!(
    benches,
    bench_scene_advance,
    bench_camera_matrices,
    bench_orbit_apply
);
criterion_main!(benches);
