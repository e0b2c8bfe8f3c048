//! # glyphmorph
//!
//! Particle morphing, procedural sigils and circle-gesture recognition for
//! point-sprite demos.
//!
//! A fixed pool of particles collapses to the origin and blooms out into a
//! new shape whenever one is requested. Shapes come from closed-form
//! generators (spheres, helices, galaxies, pentagrams, zodiac wheels...) or
//! from the opaque pixels of an image. Drawing a circle with the pointer or
//! a tracked fingertip cycles through a configured list of shapes.
//!
//! ## Quick Start
//!
//! ```ignore
//! use glyphmorph::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = SceneConfig::from_json(r#"{ "scene": "morph" }"#)?;
//!     glyphmorph::run(config)
//! }
//! ```
//!
//! ## Driving the engine yourself
//!
//! [`Engine`] never reads a clock or touches the GPU. Push input in with a
//! timestamp, call [`Engine::frame`], and draw the returned [`FrameState`]:
//!
//! ```ignore
//! let mut engine = Engine::new(SceneConfig::default());
//! engine.request(ShapeRequest::Family { family: ShapeFamily::Galaxy, count: 20_000 }, 0.0);
//! let state = engine.frame(1500.0);
//! assert_eq!(state.uniforms.expansion, 1.0);
//! ```
//!
//! ## Scenes
//!
//! - **Morph** ([`SceneKind::Morph`]): geometric shapes and images in the
//!   main particle buffer. Pinch, swipe, drag, flick and wheel control
//!   expansion, selection and scale.
//! - **Runes** ([`SceneKind::Runes`]): each completed circle summons a
//!   sigil that fades in, rotates and fades out over ten seconds, with a
//!   glowing trail following the pointer. A warm ambient field swirls
//!   around the origin and is pulled toward the pointer or fingertip.

pub mod ambient;
mod app;
pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod gesture;
mod gpu;
pub mod input;
pub mod morph;
pub mod particles;
pub mod raster;
pub mod runes;
pub mod sampling;
pub mod shapes;
pub mod time;
pub mod trail;
pub mod uniforms;

pub use ambient::{AmbientField, Attraction, Marquee};
pub use app::run;
pub use config::{SceneConfig, SceneKind};
pub use engine::{Engine, FrameState, Response, ShapeRequest};
pub use error::{AppError, ConfigError, GpuError, RasterError, UnknownShape};
pub use gesture::{CircleDetector, GestureConfig, GestureReport, GestureSample, ShapeRotation, Step};
pub use glam::{Mat4, Vec2, Vec3, Vec4};
pub use input::{HandFrame, InputEvent, KeyCode, MouseButton};
pub use morph::{Easing, MorphController, Tween};
pub use particles::{ParticleBuffer, SpriteCloud};
pub use sampling::Sampler;
pub use shapes::ShapeFamily;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use glyphmorph::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{SceneConfig, SceneKind};
    pub use crate::engine::{Engine, FrameState, Response, ShapeRequest};
    pub use crate::error::AppError;
    pub use crate::gesture::{GestureSample, Step};
    pub use crate::input::{HandFrame, InputEvent, KeyCode, MouseButton};
    pub use crate::sampling::Sampler;
    pub use crate::shapes::ShapeFamily;
    pub use crate::{Vec2, Vec3, Vec4};
}
