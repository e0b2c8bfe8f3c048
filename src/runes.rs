//! Transient sigils summoned by completed gestures.
//!
//! A rune is a coloured sigil cloud with its own clock: it fades in, holds,
//! fades out and is then dropped from the set. Nothing else keeps a handle
//! to a rune, the renderer only reads the set each frame.

use std::f32::consts::{PI, TAU};

use crate::morph::Easing;
use crate::particles::SpriteCloud;
use crate::sampling::Sampler;
use crate::shapes::{self, ShapeFamily};
use crate::Vec3;

/// Fade-in duration.
pub const FADE_IN_MS: f64 = 1000.0;
/// Age at which the fade-out starts.
pub const HOLD_UNTIL_MS: f64 = 8000.0;
/// Fade-out duration.
pub const FADE_OUT_MS: f64 = 2000.0;
/// Total lifetime; older runes are removed.
pub const LIFETIME_MS: f64 = HOLD_UNTIL_MS + FADE_OUT_MS;
/// One full turn takes this long.
pub const ROTATION_PERIOD_MS: f64 = 20_000.0;
/// Points per summoned sigil.
pub const RUNE_POINTS: usize = 500;

/// Opacity of a rune `age_ms` after birth.
pub fn opacity_at(age_ms: f64) -> f32 {
    if age_ms <= 0.0 {
        0.0
    } else if age_ms < FADE_IN_MS {
        Easing::QuadOut.apply((age_ms / FADE_IN_MS) as f32)
    } else if age_ms < HOLD_UNTIL_MS {
        1.0
    } else if age_ms < LIFETIME_MS {
        1.0 - Easing::QuadIn.apply(((age_ms - HOLD_UNTIL_MS) / FADE_OUT_MS) as f32)
    } else {
        0.0
    }
}

/// Rotation about z, `[0, 2π)`.
pub fn rotation_at(age_ms: f64) -> f32 {
    let turns = (age_ms.max(0.0) / ROTATION_PERIOD_MS).fract();
    (turns * std::f64::consts::TAU) as f32 % TAU
}

/// Gold-to-orange colour for point `i` of `len`.
pub fn gradient(i: usize, len: usize) -> Vec3 {
    let t = i as f32 / len.max(1) as f32;
    Vec3::new(1.0, 0.5 + (t * PI).sin() * 0.5, (t * TAU).sin() * 0.3)
}

/// One summoned sigil.
#[derive(Debug, Clone)]
pub struct Rune {
    pub sigil: ShapeFamily,
    pub cloud: SpriteCloud,
    pub birth_ms: f64,
    pub opacity: f32,
    pub rotation: f32,
    /// Shader time in seconds.
    pub time: f32,
}

impl Rune {
    /// Build the cloud for `sigil` centred at `center`.
    pub fn new(sigil: ShapeFamily, center: Vec3, points: usize, birth_ms: f64, sampler: &mut Sampler) -> Self {
        let outline = shapes::generate(sigil, points, sampler);
        let len = outline.len();
        let mut cloud = SpriteCloud::with_capacity(len);
        for (i, p) in outline.into_iter().enumerate() {
            let size = sampler.random_range(2.0, 4.0);
            let phase = sampler.random_angle();
            cloud.push(p + center, gradient(i, len), size, phase);
        }

        Self {
            sigil,
            cloud,
            birth_ms,
            opacity: 0.0,
            rotation: 0.0,
            time: 0.0,
        }
    }

    pub fn age(&self, now_ms: f64) -> f64 {
        now_ms - self.birth_ms
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        self.age(now_ms) >= LIFETIME_MS
    }

    fn advance(&mut self, now_ms: f64, time_secs: f32) {
        let age = self.age(now_ms);
        self.opacity = opacity_at(age);
        self.rotation = rotation_at(age);
        self.time = time_secs;
    }
}

/// All live runes.
#[derive(Debug, Clone, Default)]
pub struct RuneSet {
    runes: Vec<Rune>,
}

impl RuneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.runes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rune> {
        self.runes.iter()
    }

    /// Add a rune born at `now_ms`.
    pub fn summon(&mut self, sigil: ShapeFamily, center: Vec3, now_ms: f64, sampler: &mut Sampler) -> &Rune {
        log::info!("summoning {} rune", sigil);
        let rune = Rune::new(sigil, center, RUNE_POINTS, now_ms, sampler);
        self.runes.push(rune);
        &self.runes[self.runes.len() - 1]
    }

    /// Update every rune's uniforms and drop the expired ones.
    ///
    /// Returns how many were removed.
    pub fn advance(&mut self, now_ms: f64, time_secs: f32) -> usize {
        let before = self.runes.len();
        self.runes.retain(|r| !r.is_expired(now_ms));
        for rune in &mut self.runes {
            rune.advance(now_ms, time_secs);
        }
        before - self.runes.len()
    }

    pub fn clear(&mut self) {
        self.runes.clear();
    }
}
