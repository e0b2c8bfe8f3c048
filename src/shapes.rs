//! Procedural point-cloud shapes.
//!
//! Two kinds of shape share one enum:
//!
//! | Kind | Families |
//! |------|----------|
//! | Geometric | [`ShapeFamily::Sphere`], [`ShapeFamily::Cube`], [`ShapeFamily::Helix`], [`ShapeFamily::Wave`], [`ShapeFamily::Galaxy`], [`ShapeFamily::Torus`] |
//! | Sigils | [`ShapeFamily::Mandala`], [`ShapeFamily::Pentagram`], [`ShapeFamily::Hexagram`], [`ShapeFamily::Celtic`], [`ShapeFamily::Glyph`], [`ShapeFamily::Alchemy`], [`ShapeFamily::Zodiac`], [`ShapeFamily::Runic`] |
//!
//! Geometric families are centered 3D volumes and surfaces. Sigils are flat
//! closed symbols in the XY plane with a small z ripple, bounded by
//! [`SIGIL_RADIUS`].
//!
//! ```ignore
//! let mut sampler = Sampler::seeded(1);
//! let cube = generate(ShapeFamily::Cube, 6000, &mut sampler);
//! assert_eq!(cube.len(), 6000);
//! ```

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::UnknownShape;
use crate::particles::SpriteCloud;
use crate::sampling::Sampler;
use crate::Vec3;

/// Radius of the sphere family.
pub const SPHERE_RADIUS: f32 = 80.0;
/// Edge length of the cube family.
pub const CUBE_SIZE: f32 = 100.0;
/// Helix radius and total height.
pub const HELIX_RADIUS: f32 = 50.0;
pub const HELIX_HEIGHT: f32 = 150.0;
/// Side length of the wave grid.
pub const WAVE_EXTENT: f32 = 150.0;
/// Outer radius of the galaxy disk.
pub const GALAXY_RADIUS: f32 = 120.0;
/// Number of galaxy spiral arms.
pub const GALAXY_ARMS: u32 = 4;
/// Torus radii.
pub const TORUS_MAJOR: f32 = 60.0;
pub const TORUS_MINOR: f32 = 25.0;
/// Characteristic radius of every sigil.
pub const SIGIL_RADIUS: f32 = 80.0;

/// A named point-cloud generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeFamily {
    Sphere,
    Cube,
    Helix,
    Wave,
    Galaxy,
    Torus,
    Mandala,
    Pentagram,
    Hexagram,
    Celtic,
    Glyph,
    Alchemy,
    Zodiac,
    Runic,
}

impl ShapeFamily {
    /// Every family, geometric first.
    pub const ALL: [ShapeFamily; 14] = [
        ShapeFamily::Sphere,
        ShapeFamily::Cube,
        ShapeFamily::Helix,
        ShapeFamily::Wave,
        ShapeFamily::Galaxy,
        ShapeFamily::Torus,
        ShapeFamily::Mandala,
        ShapeFamily::Pentagram,
        ShapeFamily::Hexagram,
        ShapeFamily::Celtic,
        ShapeFamily::Glyph,
        ShapeFamily::Alchemy,
        ShapeFamily::Zodiac,
        ShapeFamily::Runic,
    ];

    pub const GEOMETRIC: [ShapeFamily; 6] = [
        ShapeFamily::Sphere,
        ShapeFamily::Cube,
        ShapeFamily::Helix,
        ShapeFamily::Wave,
        ShapeFamily::Galaxy,
        ShapeFamily::Torus,
    ];

    pub const SIGILS: [ShapeFamily; 8] = [
        ShapeFamily::Mandala,
        ShapeFamily::Pentagram,
        ShapeFamily::Hexagram,
        ShapeFamily::Celtic,
        ShapeFamily::Glyph,
        ShapeFamily::Alchemy,
        ShapeFamily::Zodiac,
        ShapeFamily::Runic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeFamily::Sphere => "sphere",
            ShapeFamily::Cube => "cube",
            ShapeFamily::Helix => "helix",
            ShapeFamily::Wave => "wave",
            ShapeFamily::Galaxy => "galaxy",
            ShapeFamily::Torus => "torus",
            ShapeFamily::Mandala => "mandala",
            ShapeFamily::Pentagram => "pentagram",
            ShapeFamily::Hexagram => "hexagram",
            ShapeFamily::Celtic => "celtic",
            ShapeFamily::Glyph => "glyph",
            ShapeFamily::Alchemy => "alchemy",
            ShapeFamily::Zodiac => "zodiac",
            ShapeFamily::Runic => "runic",
        }
    }

    pub fn is_sigil(&self) -> bool {
        Self::SIGILS.contains(self)
    }

    /// Point count used when a caller does not ask for a specific one.
    pub fn default_count(&self) -> usize {
        match self {
            ShapeFamily::Galaxy => 20_000,
            f if f.is_sigil() => 500,
            _ => 15_000,
        }
    }
}

impl fmt::Display for ShapeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeFamily {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| UnknownShape(s.to_string()))
    }
}

/// Generate the point cloud for `family`.
///
/// Returns exactly `count` points for every family except [`ShapeFamily::Wave`],
/// which lays out a square grid of `floor(sqrt(count))²` points.
pub fn generate(family: ShapeFamily, count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
    match family {
        ShapeFamily::Sphere => sphere(count, sampler),
        ShapeFamily::Cube => cube(count, sampler),
        ShapeFamily::Helix => helix(count),
        ShapeFamily::Wave => wave(count),
        ShapeFamily::Galaxy => galaxy(count, sampler),
        ShapeFamily::Torus => torus(count, sampler),
        ShapeFamily::Mandala => mandala(count, SIGIL_RADIUS),
        ShapeFamily::Pentagram => pentagram(count, SIGIL_RADIUS),
        ShapeFamily::Hexagram => hexagram(count, SIGIL_RADIUS),
        ShapeFamily::Celtic => celtic(count, SIGIL_RADIUS),
        ShapeFamily::Glyph => glyph(count, SIGIL_RADIUS),
        ShapeFamily::Alchemy => alchemy(count, SIGIL_RADIUS),
        ShapeFamily::Zodiac => zodiac(count, SIGIL_RADIUS),
        ShapeFamily::Runic => runic(count, SIGIL_RADIUS),
    }
}

// ========== Geometric families ==========

fn sphere(count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
    (0..count).map(|_| sampler.on_sphere(SPHERE_RADIUS)).collect()
}

fn cube(count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
    let half = CUBE_SIZE / 2.0;
    (0..count)
        .map(|_| {
            let face = sampler.random_index(6);
            let u = sampler.random_range(-half, half);
            let v = sampler.random_range(-half, half);
            match face {
                0 => Vec3::new(half, u, v),
                1 => Vec3::new(-half, u, v),
                2 => Vec3::new(u, half, v),
                3 => Vec3::new(u, -half, v),
                4 => Vec3::new(u, v, half),
                _ => Vec3::new(u, v, -half),
            }
        })
        .collect()
}

fn helix(count: usize) -> Vec<Vec3> {
    let n = count.max(1) as f32;
    (0..count)
        .map(|i| {
            let progress = i as f32 / n;
            let t = progress * PI * 8.0;
            Vec3::new(
                t.cos() * HELIX_RADIUS,
                progress * HELIX_HEIGHT - HELIX_HEIGHT / 2.0,
                t.sin() * HELIX_RADIUS,
            )
        })
        .collect()
}

fn wave(count: usize) -> Vec<Vec3> {
    let grid = (count as f64).sqrt().floor() as usize;
    if grid == 0 {
        return Vec::new();
    }
    let spacing = WAVE_EXTENT / grid as f32;
    let offset = WAVE_EXTENT / 2.0;

    let mut points = Vec::with_capacity(grid * grid);
    for i in 0..grid {
        for j in 0..grid {
            let x = i as f32 * spacing - offset;
            let z = j as f32 * spacing - offset;
            let y = (x * 0.1).sin() * (z * 0.1).cos() * 20.0;
            points.push(Vec3::new(x, y, z));
        }
    }
    points
}

fn galaxy(count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
    let n = count.max(1) as f32;
    (0..count)
        .map(|i| {
            let progress = i as f32 / n;
            let angle = progress * TAU * GALAXY_ARMS as f32;
            let radius = progress * GALAXY_RADIUS;
            let spread = sampler.random() * 15.0;
            let arm_offset = sampler.random() * 0.5;
            Vec3::new(
                (angle + arm_offset).cos() * radius + (sampler.random() - 0.5) * spread,
                (sampler.random() - 0.5) * 10.0 * (1.0 - radius / GALAXY_RADIUS),
                (angle + arm_offset).sin() * radius + (sampler.random() - 0.5) * spread,
            )
        })
        .collect()
}

fn torus(count: usize, sampler: &mut Sampler) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let u = sampler.random_angle();
            let v = sampler.random_angle();
            let ring = TORUS_MAJOR + TORUS_MINOR * v.cos();
            Vec3::new(ring * u.cos(), TORUS_MINOR * v.sin(), ring * u.sin())
        })
        .collect()
}

// ========== Sigil building blocks ==========

/// Split `count` into parts proportional to `weights`.
///
/// Integer division per part, remainder folded into the last part, so the
/// parts always sum to `count`.
fn split_budget(count: usize, weights: &[usize]) -> Vec<usize> {
    let total: usize = weights.iter().sum::<usize>().max(1);
    let mut parts: Vec<usize> = weights.iter().map(|w| count * w / total).collect();
    let assigned: usize = parts.iter().sum();
    if let Some(last) = parts.last_mut() {
        *last += count - assigned;
    }
    parts
}

/// `n` points evenly spaced around a circle.
fn ring(out: &mut Vec<Vec3>, n: usize, center: Vec2, radius: f32, ripple: f32) {
    for i in 0..n {
        let a = i as f32 / n as f32 * TAU;
        out.push(Vec3::new(
            center.x + a.cos() * radius,
            center.y + a.sin() * radius,
            (a * 2.0).sin() * ripple,
        ));
    }
}

/// `n` points spread along a closed polyline through `corners`.
fn closed_path(out: &mut Vec<Vec3>, n: usize, corners: &[Vec2], ripple: f32) {
    if corners.is_empty() {
        return;
    }
    let segments = corners.len();
    for i in 0..n {
        let t = i as f32 / n as f32 * segments as f32;
        let seg = (t as usize).min(segments - 1);
        let local = t - seg as f32;
        let a = corners[seg];
        let b = corners[(seg + 1) % segments];
        let p = a.lerp(b, local);
        out.push(Vec3::new(p.x, p.y, (local * PI).sin() * ripple));
    }
}

/// `n` points on an open straight stroke from `a` to `b`.
fn stroke(out: &mut Vec<Vec3>, n: usize, a: Vec2, b: Vec2, ripple: f32) {
    for i in 0..n {
        let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.5 };
        let p = a.lerp(b, t);
        out.push(Vec3::new(p.x, p.y, (t * PI).sin() * ripple));
    }
}

/// Corners of a regular polygon, first corner at `start` radians.
fn polygon(sides: usize, center: Vec2, radius: f32, start: f32) -> Vec<Vec2> {
    (0..sides)
        .map(|k| {
            let a = start + k as f32 / sides as f32 * TAU;
            center + Vec2::new(a.cos(), a.sin()) * radius
        })
        .collect()
}

// ========== Sigils ==========

fn mandala(count: usize, radius: f32) -> Vec<Vec3> {
    const LAYERS: usize = 5;
    let n = count.max(1) as f32;
    (0..count)
        .map(|i| {
            let layer = ((i as f32 / n * LAYERS as f32) as usize).min(LAYERS - 1);
            let r = radius * (0.2 + layer as f32 * 0.2);
            let segments = 12 + layer * 6;
            let angle = (i % segments) as f32 / segments as f32 * TAU;
            let wobble = (angle * (layer as f32 + 3.0)).sin() * radius * 0.0625;
            Vec3::new(
                angle.cos() * (r + wobble),
                angle.sin() * (r + wobble),
                (angle * 3.0).sin() * radius * 0.0625,
            )
        })
        .collect()
}

fn pentagram(count: usize, radius: f32) -> Vec<Vec3> {
    let parts = split_budget(count, &[2, 1]);
    let mut points = Vec::with_capacity(count);

    // Star polygon {5/2}: visit every second corner of a pentagon.
    let pentagon = polygon(5, Vec2::ZERO, radius * 0.95, FRAC_PI_2);
    let star: Vec<Vec2> = (0..5).map(|k| pentagon[(k * 2) % 5]).collect();
    closed_path(&mut points, parts[0], &star, radius * 0.04);
    ring(&mut points, parts[1], Vec2::ZERO, radius, 0.0);
    points
}

fn hexagram(count: usize, radius: f32) -> Vec<Vec3> {
    let parts = split_budget(count, &[2, 2, 1]);
    let mut points = Vec::with_capacity(count);

    let up = polygon(3, Vec2::ZERO, radius * 0.8, FRAC_PI_2);
    let down = polygon(3, Vec2::ZERO, radius * 0.8, -FRAC_PI_2);
    closed_path(&mut points, parts[0], &up, radius * 0.04);
    closed_path(&mut points, parts[1], &down, radius * 0.04);
    ring(&mut points, parts[2], Vec2::ZERO, radius, radius * 0.02);
    points
}

fn celtic(count: usize, radius: f32) -> Vec<Vec3> {
    let n = count.max(1) as f32;
    (0..count)
        .map(|i| {
            let t = i as f32 / n * TAU * 2.0;
            let r = radius * 0.6 * (1.0 + 0.3 * (t * 3.0).sin());
            Vec3::new(
                t.cos() * r + (t * 3.0).cos() * radius * 0.2,
                t.sin() * r + (t * 3.0).sin() * radius * 0.2,
                (t * 2.0).sin() * radius * 0.125,
            )
        })
        .collect()
}

/// Stylised Om: main bowl, upper arc, right tail and the dot above.
fn glyph(count: usize, radius: f32) -> Vec<Vec3> {
    let n = count.max(1) as f32;
    (0..count)
        .map(|i| {
            let t = i as f32 / n;
            let segment = ((t * 4.0) as usize).min(3);
            let local = t * 4.0 - segment as f32;
            let (x, y, z) = match segment {
                0 => {
                    let a = local * PI * 1.5;
                    (a.cos() * radius * 0.5 - radius * 0.3, a.sin() * radius * 0.5, 0.0)
                }
                1 => (
                    -radius * 0.3 + local * radius * 0.8,
                    radius * 0.5 + (local * PI).sin() * radius * 0.3,
                    0.0,
                ),
                2 => {
                    let a = local * PI;
                    (radius * 0.3 + a.cos() * radius * 0.3, a.sin() * radius * 0.4, 0.0)
                }
                _ => (
                    radius * 0.2 + (local * TAU).sin() * radius * 0.1,
                    radius * 0.7 + local * radius * 0.2,
                    (local * PI).sin() * radius * 0.0625,
                ),
            };
            Vec3::new(x, y, z)
        })
        .collect()
}

/// Four elemental triangles around a small centre ring.
///
/// Fire and air point up, water and earth point down; air and earth carry
/// the horizontal bar.
fn alchemy(count: usize, radius: f32) -> Vec<Vec3> {
    let parts = split_budget(count, &[4, 4, 4, 4, 3]);
    let mut points = Vec::with_capacity(count);
    let tri_radius = radius * 0.25;

    for (element, &budget) in parts.iter().take(4).enumerate() {
        let offset = element as f32 * FRAC_PI_2;
        let center = Vec2::new(offset.cos(), offset.sin()) * radius * 0.3;
        let points_up = element % 2 == 0;
        let start = if points_up { FRAC_PI_2 } else { -FRAC_PI_2 };
        let corners = polygon(3, center, tri_radius, start);

        let barred = element >= 2;
        if barred {
            let split = split_budget(budget, &[3, 1]);
            closed_path(&mut points, split[0], &corners, radius * 0.0375);
            let half = tri_radius * 0.6;
            stroke(
                &mut points,
                split[1],
                center + Vec2::new(-half, 0.0),
                center + Vec2::new(half, 0.0),
                0.0,
            );
        } else {
            closed_path(&mut points, budget, &corners, radius * 0.0375);
        }
    }
    ring(&mut points, parts[4], Vec2::ZERO, radius * 0.15, 0.0);
    points
}

/// Twelve station rings on a wheel inside an outer ring.
fn zodiac(count: usize, radius: f32) -> Vec<Vec3> {
    let mut weights = [1usize; 13];
    weights[12] = 4;
    let parts = split_budget(count, &weights);
    let mut points = Vec::with_capacity(count);

    for (station, &budget) in parts.iter().take(12).enumerate() {
        let a = station as f32 / 12.0 * TAU;
        let center = Vec2::new(a.cos(), a.sin()) * radius * 0.7;
        ring(&mut points, budget, center, radius * 0.1, radius * 0.025);
    }
    ring(&mut points, parts[12], Vec2::ZERO, radius, 0.0);
    points
}

/// Eight three-stroke staves standing on a ring.
fn runic(count: usize, radius: f32) -> Vec<Vec3> {
    const STAVES: usize = 8;
    let parts = split_budget(count, &[1; STAVES]);
    let mut points = Vec::with_capacity(count);

    for (stave, &budget) in parts.iter().enumerate() {
        let a = stave as f32 / STAVES as f32 * TAU;
        let center = Vec2::new(a.cos(), a.sin()) * radius * 0.6;
        let strokes = split_budget(budget, &[1, 1, 1]);
        let h = radius * 0.1;
        let w = radius * 0.05;
        let d = radius * 0.075;
        stroke(&mut points, strokes[0], center + Vec2::new(0.0, -h), center + Vec2::new(0.0, h), radius * 0.025);
        stroke(&mut points, strokes[1], center + Vec2::new(-w, -d), center + Vec2::new(w, d), radius * 0.025);
        stroke(&mut points, strokes[2], center + Vec2::new(w, -d), center + Vec2::new(-w, d), radius * 0.025);
    }
    points
}

// ========== Background ==========

/// Twinkling background stars on a thick spherical shell.
pub fn star_field(count: usize, inner_radius: f32, outer_radius: f32, sampler: &mut Sampler) -> SpriteCloud {
    let mut cloud = SpriteCloud::with_capacity(count);
    for _ in 0..count {
        let r = sampler.random_range(inner_radius, outer_radius);
        let position = sampler.on_sphere(r);
        let roll = sampler.random();
        let color = if roll < 0.3 {
            Vec3::new(0.5 + sampler.random() * 0.5, 0.7 + sampler.random() * 0.3, 1.0)
        } else if roll < 0.6 {
            Vec3::ONE
        } else {
            Vec3::new(1.0, 0.8 + sampler.random() * 0.2, 0.5 + sampler.random() * 0.3)
        };
        let size = sampler.random() * 2.0 + 0.5;
        let phase = sampler.random_angle();
        cloud.push(position, color, size, phase);
    }
    cloud
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_sphere_points_on_radius() {
        let mut sampler = Sampler::seeded(1);
        let points = generate(ShapeFamily::Sphere, 2000, &mut sampler);
        assert_eq!(points.len(), 2000);
        for p in points {
            assert!((p.length() - SPHERE_RADIUS).abs() < EPS);
        }
    }

    #[test]
    fn test_cube_points_on_faces() {
        let mut sampler = Sampler::seeded(2);
        let points = generate(ShapeFamily::Cube, 6000, &mut sampler);
        assert_eq!(points.len(), 6000);
        for p in points {
            assert!((p.abs().max_element() - CUBE_SIZE / 2.0).abs() < EPS);
        }
    }

    #[test]
    fn test_helix_is_linear_in_index() {
        let points = helix(100);
        assert_eq!(points.len(), 100);
        assert!((points[0].y + HELIX_HEIGHT / 2.0).abs() < EPS);
        let step = points[1].y - points[0].y;
        for w in points.windows(2) {
            assert!((w[1].y - w[0].y - step).abs() < EPS);
        }
        for p in &points {
            assert!((Vec2::new(p.x, p.z).length() - HELIX_RADIUS).abs() < EPS);
        }
    }

    #[test]
    fn test_wave_grid_size() {
        assert_eq!(wave(15_000).len(), 122 * 122);
        assert_eq!(wave(100).len(), 100);
        assert!(wave(0).is_empty());
        for p in wave(400) {
            assert!(p.y.abs() <= 20.0 + EPS);
        }
    }

    #[test]
    fn test_galaxy_bounds() {
        let mut sampler = Sampler::seeded(3);
        let points = generate(ShapeFamily::Galaxy, 5000, &mut sampler);
        assert_eq!(points.len(), 5000);
        for p in points {
            assert!(Vec2::new(p.x, p.z).length() <= GALAXY_RADIUS + 15.0);
            assert!(p.y.abs() <= 5.0 + EPS);
        }
    }

    #[test]
    fn test_torus_distance_from_tube_center() {
        let mut sampler = Sampler::seeded(4);
        for p in generate(ShapeFamily::Torus, 1000, &mut sampler) {
            let ring = Vec2::new(p.x, p.z).length() - TORUS_MAJOR;
            assert!((Vec2::new(ring, p.y).length() - TORUS_MINOR).abs() < EPS);
        }
    }

    #[test]
    fn test_sigils_exact_count_and_bounded() {
        let mut sampler = Sampler::seeded(5);
        for family in ShapeFamily::SIGILS {
            for count in [0usize, 1, 7, 499, 500, 1001] {
                let points = generate(family, count, &mut sampler);
                assert_eq!(points.len(), count, "{family} with {count}");
                for p in points {
                    assert!(Vec2::new(p.x, p.y).length() <= SIGIL_RADIUS * 1.5, "{family} out of bounds");
                    assert!(p.z.abs() <= SIGIL_RADIUS * 0.2, "{family} z ripple too deep");
                }
            }
        }
    }

    #[test]
    fn test_split_budget_sums() {
        for count in [0usize, 1, 5, 13, 1000] {
            let parts = split_budget(count, &[4, 4, 4, 4, 3]);
            assert_eq!(parts.iter().sum::<usize>(), count);
        }
    }

    #[test]
    fn test_parse_names() {
        for family in ShapeFamily::ALL {
            assert_eq!(family.name().parse::<ShapeFamily>().unwrap(), family);
        }
        assert_eq!(" Cube ".parse::<ShapeFamily>().unwrap(), ShapeFamily::Cube);
        assert!("dodecahedron".parse::<ShapeFamily>().is_err());
    }

    #[test]
    fn test_star_field() {
        let mut sampler = Sampler::seeded(6);
        let stars = star_field(500, 300.0, 700.0, &mut sampler);
        assert_eq!(stars.len(), 500);
        for p in &stars.positions {
            let r = p.length();
            assert!(r >= 300.0 - EPS && r <= 700.0 + EPS);
        }
    }
}
