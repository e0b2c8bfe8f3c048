//! End-to-end scenarios driven through the public engine API with literal
//! timestamps.

use std::f32::consts::TAU;
use std::path::PathBuf;
use std::time::Duration;

use glyphmorph::prelude::*;
use glyphmorph::raster::{Selection, FALLBACK_MESSAGE};
use glyphmorph::shapes::{self, CUBE_SIZE};
use image::{Rgba, RgbaImage};

fn config(scene: SceneKind) -> SceneConfig {
    SceneConfig {
        scene,
        star_count: 50,
        field_count: 500,
        seed: Some(42),
        ..SceneConfig::default()
    }
}

/// Feed `steps` pointer samples around a circle, 10 degrees and 20 ms apart.
/// Returns how many of them completed the gesture.
fn draw_circle(engine: &mut Engine, center: Vec2, radius: f32, steps: usize, start_ms: f64) -> usize {
    let mut triggers = 0;
    let mut last = center + Vec2::new(radius, 0.0);
    for i in 0..steps {
        let angle = i as f32 * TAU / 36.0;
        let position = center + Vec2::new(angle.cos(), angle.sin()) * radius;
        let report = engine.on_pointer_move(position, position - last, start_ms + i as f64 * 20.0);
        last = position;
        if report.is_some_and(|r| r.triggered) {
            triggers += 1;
        }
    }
    triggers
}

#[test]
fn cube_fills_leading_slots_and_pads_the_rest() {
    let mut engine = Engine::new(config(SceneKind::Morph));
    engine.request(
        ShapeRequest::Family {
            family: ShapeFamily::Cube,
            count: 6000,
        },
        0.0,
    );

    let particles = engine.particles();
    assert_eq!(particles.capacity(), 100_000);
    assert_eq!(particles.active_count(), 6000);
    let half = CUBE_SIZE / 2.0;
    for t in &particles.targets()[..6000] {
        assert!((t.abs().max_element() - half).abs() < 1e-3, "{:?} is off the cube surface", t);
    }
    assert!(particles.targets()[6000..].iter().all(|t| *t == Vec3::ZERO));
    assert_eq!(engine.selection(), &Selection::Family(ShapeFamily::Cube));
}

#[test]
fn shape_switch_collapses_then_blooms() {
    let mut engine = Engine::new(config(SceneKind::Morph));
    assert_eq!(engine.frame(2000.0).uniforms.expansion, 1.0);

    engine.show_shape(ShapeFamily::Galaxy, 2000.0);
    let state = engine.frame(2000.0);
    assert_eq!(state.uniforms.expansion, 0.0);
    assert!(state.particles_dirty);
    assert_eq!(engine.particles().active_count(), 20_000);

    assert_eq!(engine.frame(3500.0).uniforms.expansion, 1.0);
    assert!(!engine.frame(3516.0).particles_dirty);
}

#[test]
fn oversized_request_truncates_to_capacity() {
    let mut engine = Engine::new(SceneConfig {
        capacity: 1000,
        ..config(SceneKind::Morph)
    });
    engine.request(
        ShapeRequest::Family {
            family: ShapeFamily::Sphere,
            count: 5000,
        },
        0.0,
    );
    assert_eq!(engine.particles().capacity(), 1000);
    assert_eq!(engine.particles().active_count(), 1000);
}

#[test]
fn pointer_circle_advances_the_rotation_once() {
    let mut engine = Engine::new(config(SceneKind::Morph));
    engine.resize(800, 600);
    assert_eq!(engine.rotation().current(), ShapeFamily::Sphere);

    let triggers = draw_circle(&mut engine, Vec2::new(400.0, 300.0), 100.0, 40, 0.0);
    assert_eq!(triggers, 1);
    assert_eq!(engine.rotation().current(), ShapeFamily::Cube);
    assert_eq!(engine.selection(), &Selection::Family(ShapeFamily::Cube));
    assert_eq!(engine.circle_progress(), 0.0);
}

#[test]
fn small_circle_never_triggers() {
    let mut engine = Engine::new(config(SceneKind::Morph));
    engine.resize(800, 600);
    let triggers = draw_circle(&mut engine, Vec2::new(400.0, 300.0), 10.0, 72, 0.0);
    assert_eq!(triggers, 0);
    assert_eq!(engine.rotation().current(), ShapeFamily::Sphere);
}

#[test]
fn rune_lives_for_ten_seconds() {
    let mut engine = Engine::new(config(SceneKind::Runes));
    engine.resize(800, 600);

    let triggers = draw_circle(&mut engine, Vec2::new(400.0, 300.0), 100.0, 40, 0.0);
    assert_eq!(triggers, 1);
    assert_eq!(engine.runes().len(), 1);
    let birth = engine.runes().iter().next().unwrap().birth_ms;
    assert!(birth > 0.0 && birth < 800.0);

    engine.frame(birth);
    let rune = engine.runes().iter().next().unwrap();
    assert_eq!(rune.opacity, 0.0);
    assert!(rune.sigil.is_sigil());

    engine.frame(birth + 1000.0);
    assert_eq!(engine.runes().iter().next().unwrap().opacity, 1.0);

    engine.frame(birth + 7999.0);
    assert_eq!(engine.runes().iter().next().unwrap().opacity, 1.0);

    engine.frame(birth + 10_001.0);
    assert!(engine.runes().is_empty());
}

#[test]
fn runes_scene_trail_follows_fingertip() {
    let mut engine = Engine::new(config(SceneKind::Runes));
    let mut landmarks = [Vec3::splat(0.5); 21];
    landmarks[HandFrame::INDEX_TIP] = Vec3::new(0.25, 0.75, 0.0);
    engine.on_hand_frame(Some(HandFrame::new(landmarks)), 0.0);

    assert_eq!(engine.trail().positions()[0], Vec3::new(-50.0, -50.0, 0.0));
    assert!(engine.frame(16.0).trail_dirty);
    assert!(!engine.frame(32.0).trail_dirty);
}

#[test]
fn missing_image_falls_back_to_sphere() {
    let mut engine = Engine::new(SceneConfig {
        images: vec![PathBuf::from("/no/such/dir/heart.png")],
        ..config(SceneKind::Morph)
    });
    engine.show_shape(ShapeFamily::Torus, 0.0);

    engine.on_key(KeyCode::I, 10.0);
    assert!(engine.wait_for_image(Duration::from_secs(5), 20.0));
    assert_eq!(engine.selection(), &Selection::Family(ShapeFamily::Sphere));
    assert_eq!(engine.status(), FALLBACK_MESSAGE);
}

#[test]
fn image_replaces_shape_when_it_arrives() {
    let path = std::env::temp_dir().join("glyphmorph_engine_square.png");
    let mut image = RgbaImage::from_pixel(300, 300, Rgba([0, 0, 0, 0]));
    for y in 100..200 {
        for x in 100..200 {
            image.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    image.save(&path).unwrap();

    let mut engine = Engine::new(SceneConfig {
        images: vec![path.clone()],
        ..config(SceneKind::Morph)
    });
    engine.on_key(KeyCode::I, 0.0);
    assert!(engine.wait_for_image(Duration::from_secs(5), 10.0));

    assert_eq!(engine.selection(), &Selection::Image(path.clone()));
    assert_eq!(engine.particles().active_count(), 100 * 100);
    assert!(engine.particles().targets()[..10_000]
        .iter()
        .all(|t| t.x >= -50.0 && t.x < 50.0 && t.y > -50.0 && t.y <= 50.0 && t.z == 0.0));
    let _ = std::fs::remove_file(path);
}

#[test]
fn stale_image_never_overwrites_newer_shape() {
    let path = std::env::temp_dir().join("glyphmorph_engine_stale.png");
    RgbaImage::from_pixel(32, 32, Rgba([255, 255, 255, 255]))
        .save(&path)
        .unwrap();

    let mut engine = Engine::new(SceneConfig {
        images: vec![path.clone()],
        ..config(SceneKind::Morph)
    });
    engine.on_key(KeyCode::I, 0.0);
    engine.on_key(KeyCode::G, 5.0);

    assert!(!engine.wait_for_image(Duration::from_secs(5), 10.0));
    assert_eq!(engine.selection(), &Selection::Family(ShapeFamily::Sphere));
    assert_eq!(engine.particles().active_count(), ShapeFamily::Sphere.default_count());
    let _ = std::fs::remove_file(path);
}

#[test]
fn seeded_engines_generate_identical_targets() {
    let a = Engine::new(config(SceneKind::Morph));
    let b = Engine::new(config(SceneKind::Morph));
    assert_eq!(a.particles().targets(), b.particles().targets());

    let mut sampler = Sampler::seeded(9);
    let wave = shapes::generate(ShapeFamily::Wave, 1000, &mut sampler);
    assert_eq!(wave.len(), 31 * 31);
}
