//! The per-scene context object.
//!
//! [`Engine`] owns every piece of mutable scene state: the particle buffer
//! or ambient field, the animated scalars, the gesture detectors, the trail,
//! the runes and the camera. Input is pushed in through one ingestion method per source and
//! [`Engine::frame`] advances everything to a timestamp and hands the
//! renderer a read-only [`FrameState`].
//!
//! The engine never reads a clock itself. Callers pass `now_ms`, which keeps
//! it deterministic under test:
//!
//! ```ignore
//! let mut engine = Engine::new(SceneConfig::default());
//! engine.on_pointer_move(Vec2::new(400.0, 300.0), Vec2::ZERO, 16.0);
//! let state = engine.frame(16.0);
//! renderer.draw(&state);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::ambient::{AmbientField, Attraction, Marquee};
use crate::camera::CameraRig;
use crate::config::{SceneConfig, SceneKind};
use crate::gesture::{CircleDetector, FlickDetector, GestureReport, GestureSample, ShapeRotation, Step, SwipeDetector};
use crate::input::{to_ndc, HandFrame, InputEvent, KeyCode, MouseButton};
use crate::morph::{MorphController, ScaleController};
use crate::particles::{ParticleBuffer, SpriteCloud};
use crate::raster::{ImageLoader, ImageOutcome, Selection, ShapeSelector};
use crate::runes::RuneSet;
use crate::sampling::Sampler;
use crate::shapes::{self, ShapeFamily};
use crate::trail::TrailBuffer;
use crate::uniforms::{FieldUniforms, FrameUniforms};

/// Radians of system rotation per dragged pixel in the morph scene.
pub const SYSTEM_DRAG_SPEED: f32 = 0.01;
/// Fraction of the remaining system rotation covered per frame.
pub const SYSTEM_SMOOTHING: f32 = 0.05;
/// Pointer NDC to world units for the rune-scene trail.
pub const POINTER_TRAIL_EXTENT: f32 = 100.0;
/// Eye distance of the morph scene, which has a parked camera.
pub const MORPH_CAMERA_DISTANCE: f32 = 150.0;
/// Two presses closer than this, in time and pixels, form a double click.
pub const DOUBLE_CLICK_MS: f64 = 400.0;
pub const DOUBLE_CLICK_SLOP_PX: f32 = 5.0;

/// A request for new particle targets.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeRequest {
    Family { family: ShapeFamily, count: usize },
    Image { path: PathBuf },
}

/// What the host should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Continue,
    Exit,
}

/// Euler rotation of the particle system, smoothed toward a target.
#[derive(Debug, Clone, Default)]
pub struct SystemRotation {
    pub current: Vec3,
    /// Target pitch (x) and yaw (y).
    pub target: Vec2,
}

impl SystemRotation {
    fn follow(&mut self) {
        self.current.x += (self.target.x - self.current.x) * SYSTEM_SMOOTHING;
        self.current.y += (self.target.y - self.current.y) * SYSTEM_SMOOTHING;
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.current.x, self.current.y, self.current.z)
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug)]
pub struct FrameState<'a> {
    pub time: f32,
    pub uniforms: FrameUniforms,
    pub view_proj: Mat4,
    pub star_model: Mat4,
    pub particles: &'a ParticleBuffer,
    /// Targets changed since the last frame and must be re-uploaded.
    pub particles_dirty: bool,
    /// Ambient field uniforms; `None` outside the rune scene.
    pub field: Option<FieldUniforms>,
    pub trail: &'a TrailBuffer,
    pub trail_dirty: bool,
    pub runes: &'a RuneSet,
    pub stars: &'a SpriteCloud,
    pub background: [f32; 3],
    pub circle_progress: f32,
    pub status: &'a str,
}

/// Scene state and behaviour for one window.
#[derive(Debug)]
pub struct Engine {
    config: SceneConfig,
    sampler: Sampler,
    particles: ParticleBuffer,
    field: Option<AmbientField>,
    attraction: Attraction,
    marquee: Marquee,
    morph: MorphController,
    scale: ScaleController,
    detector: CircleDetector,
    rotation: ShapeRotation,
    selector: ShapeSelector,
    image_index: Option<usize>,
    swipe: SwipeDetector,
    flick: FlickDetector,
    trail: TrailBuffer,
    runes: RuneSet,
    stars: SpriteCloud,
    camera: CameraRig,
    system: SystemRotation,
    viewport: (u32, u32),
    dragging: bool,
    last_click: Option<(f64, Vec2)>,
    hand_present: bool,
    status: String,
    time_secs: f32,
}

impl Engine {
    /// Build a scene from a validated config and show the first shape.
    pub fn new(config: SceneConfig) -> Self {
        let mut sampler = match config.seed {
            Some(seed) => Sampler::seeded(seed),
            None => Sampler::from_clock(),
        };

        // The rune scene draws the ambient field in place of morph particles.
        let (particles, field) = match config.scene {
            SceneKind::Morph => (ParticleBuffer::new(config.capacity, &mut sampler), None),
            SceneKind::Runes => (
                ParticleBuffer::new(0, &mut sampler),
                Some(AmbientField::new(config.field_count, &mut sampler)),
            ),
        };
        let (inner, outer) = match config.scene {
            SceneKind::Morph => (300.0, 700.0),
            SceneKind::Runes => (500.0, 1000.0),
        };
        let stars = shapes::star_field(config.star_count, inner, outer, &mut sampler);

        let mut camera = CameraRig::new();
        if config.scene == SceneKind::Morph {
            camera.distance = MORPH_CAMERA_DISTANCE;
        }
        camera.snap();

        let rotation = ShapeRotation::new(config.effective_rotation());
        let loader = ImageLoader::new(config.raster_size, config.raster_size);
        let selector = ShapeSelector::new(loader, rotation.current());

        let mut engine = Self {
            detector: CircleDetector::new(config.gesture.clone()),
            viewport: (config.window.width, config.window.height),
            sampler,
            particles,
            field,
            attraction: Attraction::default(),
            marquee: Marquee::new(),
            morph: MorphController::new(0.0),
            scale: ScaleController::new(),
            rotation,
            selector,
            image_index: None,
            swipe: SwipeDetector::new(),
            flick: FlickDetector::default(),
            trail: TrailBuffer::default(),
            runes: RuneSet::new(),
            stars,
            camera,
            system: SystemRotation::default(),
            dragging: false,
            last_click: None,
            hand_present: false,
            status: String::new(),
            time_secs: 0.0,
            config,
        };

        let particle_count = match engine.field.as_ref().map(AmbientField::len) {
            Some(len) => len,
            None => {
                let first = engine.rotation.current();
                engine.show_shape(first, 0.0);
                engine.particles.capacity()
            }
        };
        log::info!(
            "{:?} scene ready: {} particles, rotation {:?}",
            engine.config.scene,
            particle_count,
            engine.rotation.shapes()
        );
        engine
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn particles(&self) -> &ParticleBuffer {
        &self.particles
    }

    /// The rune scene's ambient field.
    pub fn ambient_field(&self) -> Option<&AmbientField> {
        self.field.as_ref()
    }

    pub fn attraction(&self) -> &Attraction {
        &self.attraction
    }

    pub fn marquee(&self) -> &Marquee {
        &self.marquee
    }

    pub fn expansion(&self) -> f32 {
        self.morph.expansion()
    }

    pub fn scale(&self) -> f32 {
        self.scale.scale()
    }

    pub fn rotation(&self) -> &ShapeRotation {
        &self.rotation
    }

    pub fn selection(&self) -> &Selection {
        self.selector.current()
    }

    pub fn runes(&self) -> &RuneSet {
        &self.runes
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn system_rotation(&self) -> &SystemRotation {
        &self.system
    }

    pub fn circle_progress(&self) -> f32 {
        self.detector.progress()
    }

    pub fn hand_present(&self) -> bool {
        self.hand_present
    }

    /// Latest human-readable status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        log::debug!("status: {}", self.status);
    }

    // ========== Shape changes ==========

    /// Generate `family` at its default size and morph into it.
    pub fn show_shape(&mut self, family: ShapeFamily, now_ms: f64) {
        self.request(
            ShapeRequest::Family {
                family,
                count: family.default_count(),
            },
            now_ms,
        );
    }

    /// Apply a shape request. Images resolve later, in [`Engine::frame`].
    pub fn request(&mut self, request: ShapeRequest, now_ms: f64) {
        match request {
            ShapeRequest::Family { family, count } => {
                self.selector.select_family(family);
                self.rotation.select(family);
                let points = shapes::generate(family, count, &mut self.sampler);
                self.apply_points(&points, now_ms);
                self.set_status(format!("shape: {} ({} points)", family, points.len()));
            }
            ShapeRequest::Image { path } => {
                self.set_status(format!("loading {}", path.display()));
                self.selector.request_image(path);
            }
        }
    }

    fn apply_points(&mut self, points: &[Vec3], now_ms: f64) {
        self.particles.set_target(points);
        self.morph.collapse_and_reform(now_ms);
    }

    /// Load the next configured image, wrapping.
    pub fn next_image(&mut self, now_ms: f64) {
        self.step_image(1, now_ms);
    }

    fn step_image(&mut self, direction: isize, now_ms: f64) {
        let count = self.config.images.len();
        if count == 0 {
            self.set_status("no images configured");
            return;
        }
        let next = match self.image_index {
            Some(i) => (i as isize + direction).rem_euclid(count as isize) as usize,
            None => 0,
        };
        self.image_index = Some(next);
        let path = self.config.images[next].clone();
        self.request(ShapeRequest::Image { path }, now_ms);
    }

    /// Step forward or back: through images while one is shown, otherwise
    /// through the shape rotation.
    pub fn step(&mut self, step: Step, now_ms: f64) {
        let direction = match step {
            Step::Next => 1,
            Step::Previous => -1,
        };
        if matches!(self.selector.current(), Selection::Image(_)) {
            self.step_image(direction, now_ms);
            return;
        }
        let family = match step {
            Step::Next => self.rotation.advance(),
            Step::Previous => self.rotation.retreat(),
        };
        match self.config.scene {
            SceneKind::Morph => self.show_shape(family, now_ms),
            SceneKind::Runes => self.summon(family, now_ms),
        }
    }

    fn summon(&mut self, family: ShapeFamily, now_ms: f64) {
        self.runes.summon(family, Vec3::ZERO, now_ms, &mut self.sampler);
        self.set_status(format!("summoned {}", family));
    }

    fn apply_image(&mut self, outcome: ImageOutcome, now_ms: f64) {
        match outcome {
            ImageOutcome::Loaded { path, points } => {
                self.apply_points(&points, now_ms);
                self.set_status(format!("image {} ({} points)", path.display(), points.len()));
            }
            ImageOutcome::Fallback { family, message } => {
                self.image_index = None;
                self.show_shape(family, now_ms);
                self.set_status(message);
            }
        }
    }

    /// Block until the pending image resolves or `timeout` passes, then
    /// apply it. Returns whether anything was applied.
    pub fn wait_for_image(&mut self, timeout: Duration, now_ms: f64) -> bool {
        match self.selector.wait(timeout) {
            Some(outcome) => {
                self.apply_image(outcome, now_ms);
                true
            }
            None => false,
        }
    }

    // ========== Gestures ==========

    fn feed_circle(&mut self, position: Vec2, now_ms: f64) -> GestureReport {
        let report = self.detector.push(GestureSample::new(position, now_ms));
        if report.triggered {
            let family = self.rotation.advance();
            log::info!("circle gesture: switching to {}", family);
            match self.config.scene {
                SceneKind::Morph => self.show_shape(family, now_ms),
                SceneKind::Runes => self.summon(family, now_ms),
            }
        }
        report
    }

    // ========== Input ingestion ==========

    /// Dispatch a translated window event.
    pub fn handle_input(&mut self, event: InputEvent, now_ms: f64) -> Response {
        match event {
            InputEvent::PointerMoved { position, delta } => {
                self.on_pointer_move(position, delta, now_ms);
            }
            InputEvent::PointerDown { button, position } => self.on_pointer_down(button, position, now_ms),
            InputEvent::PointerUp { button, position } => self.on_pointer_up(button, position, now_ms),
            InputEvent::Wheel { delta } => self.on_wheel(delta, now_ms),
            InputEvent::PointerLeft => self.on_pointer_leave(),
            InputEvent::KeyDown(key) => return self.on_key(key, now_ms),
        }
        Response::Continue
    }

    /// The morph scene hands control to a tracked hand.
    fn pointer_blocked(&self) -> bool {
        self.hand_present && self.config.scene == SceneKind::Morph
    }

    /// Pointer moved to `position` (window pixels) by `delta`.
    ///
    /// Returns the circle detector's report when the sample was fed to it.
    pub fn on_pointer_move(&mut self, position: Vec2, delta: Vec2, now_ms: f64) -> Option<GestureReport> {
        if self.pointer_blocked() {
            return None;
        }
        let ndc = to_ndc(position, self.viewport);

        match self.config.scene {
            SceneKind::Morph => {
                if self.dragging {
                    self.system.target.y += delta.x * SYSTEM_DRAG_SPEED;
                    self.system.target.x += delta.y * SYSTEM_DRAG_SPEED;
                    self.flick.moved(delta);
                } else {
                    self.system.target = Vec2::new(ndc.y, ndc.x) * crate::camera::PARALLAX;
                }
            }
            SceneKind::Runes => {
                if self.dragging {
                    self.camera.drag(delta);
                }
                self.attraction = Attraction::pointer(ndc);
                self.trail.push((ndc * POINTER_TRAIL_EXTENT).extend(0.0));
            }
        }

        if self.dragging {
            None
        } else {
            Some(self.feed_circle(position, now_ms))
        }
    }

    /// Left starts a drag (a double click also shows the next shape),
    /// right resets the view.
    pub fn on_pointer_down(&mut self, button: MouseButton, position: Vec2, now_ms: f64) {
        if self.pointer_blocked() {
            return;
        }
        match button {
            MouseButton::Left => {}
            MouseButton::Right => {
                self.reset_view(now_ms);
                return;
            }
            MouseButton::Middle => return,
        }
        self.dragging = true;
        if self.config.scene == SceneKind::Morph {
            if self.is_double_click(position, now_ms) {
                let family = self.rotation.advance();
                self.show_shape(family, now_ms);
            }
            self.flick.press(position);
            self.scale.press(now_ms);
        }
    }

    fn is_double_click(&mut self, position: Vec2, now_ms: f64) -> bool {
        let double = self.last_click.is_some_and(|(at, pos)| {
            now_ms - at <= DOUBLE_CLICK_MS && pos.distance(position) <= DOUBLE_CLICK_SLOP_PX
        });
        self.last_click = if double { None } else { Some((now_ms, position)) };
        double
    }

    fn reset_view(&mut self, now_ms: f64) {
        match self.config.scene {
            SceneKind::Morph => {
                self.system.target = Vec2::ZERO;
                self.scale.reset(now_ms);
            }
            SceneKind::Runes => self.camera.reset(),
        }
        self.set_status("view reset");
    }

    pub fn on_pointer_up(&mut self, button: MouseButton, position: Vec2, now_ms: f64) {
        if self.pointer_blocked() || button != MouseButton::Left {
            return;
        }
        self.dragging = false;
        if self.config.scene == SceneKind::Morph {
            if let Some(step) = self.flick.release(position) {
                self.step(step, now_ms);
            }
            self.scale.release(now_ms);
        }
    }

    pub fn on_pointer_leave(&mut self) {
        self.dragging = false;
        self.attraction.release();
    }

    /// Wheel travel in pixels, positive toward the user.
    pub fn on_wheel(&mut self, delta: f32, now_ms: f64) {
        if self.pointer_blocked() {
            return;
        }
        match self.config.scene {
            SceneKind::Morph => self.scale.wheel(delta, now_ms),
            SceneKind::Runes => self.camera.zoom(delta),
        }
    }

    pub fn on_key(&mut self, key: KeyCode, now_ms: f64) -> Response {
        if key == KeyCode::Escape {
            return Response::Exit;
        }
        if self.pointer_blocked() {
            return Response::Continue;
        }
        match (self.config.scene, key) {
            (_, KeyCode::Left) => self.step(Step::Previous, now_ms),
            (_, KeyCode::Right) => self.step(Step::Next, now_ms),
            (SceneKind::Morph, KeyCode::Space) => self.morph.toggle(now_ms),
            (SceneKind::Runes, KeyCode::Space) => {
                let family = self.rotation.advance();
                self.set_status(format!("next rune: {}", family));
            }
            (_, KeyCode::R) => self.reset_view(now_ms),
            (SceneKind::Runes, KeyCode::M) => {
                let on = self.marquee.toggle();
                self.set_status(if on { "marquee on" } else { "marquee off" });
            }
            (SceneKind::Morph, KeyCode::G) => {
                self.image_index = None;
                self.show_shape(ShapeFamily::Sphere, now_ms);
            }
            (SceneKind::Morph, KeyCode::I) => self.next_image(now_ms),
            (_, KeyCode::Digit(n)) => {
                let entry = (n as usize)
                    .checked_sub(1)
                    .and_then(|i| self.rotation.shapes().get(i).copied());
                if let Some(family) = entry {
                    self.rotation.select(family);
                    match self.config.scene {
                        SceneKind::Morph => self.show_shape(family, now_ms),
                        SceneKind::Runes => self.summon(family, now_ms),
                    }
                }
            }
            _ => {}
        }
        Response::Continue
    }

    /// Latest tracker result; `None` when no hand is visible.
    ///
    /// May be called at any rate relative to [`Engine::frame`].
    pub fn on_hand_frame(&mut self, hand: Option<HandFrame>, now_ms: f64) -> Option<GestureReport> {
        let Some(hand) = hand else {
            if self.hand_present {
                self.hand_present = false;
                self.swipe.lose_track();
                self.attraction.release();
                if self.config.scene == SceneKind::Morph && !self.dragging {
                    self.scale.reset(now_ms);
                }
                self.set_status("hand lost, pointer control restored");
            }
            return None;
        };

        if !self.hand_present {
            self.hand_present = true;
            self.dragging = false;
            self.set_status("hand tracked");
        }

        if self.config.scene == SceneKind::Morph {
            self.morph.follow_pinch(hand.pinch_distance(), now_ms);
            if let Some(step) = self.swipe.push(hand.wrist().x, now_ms) {
                self.step(step, now_ms);
            }
        } else {
            self.attraction = Attraction::pinch(hand.fingertip_ndc(), hand.pinch_distance());
            self.trail.push(hand.fingertip_world());
        }

        let tip = hand.fingertip_px(self.viewport);
        Some(self.feed_circle(tip, now_ms))
    }

    // ========== Frame ==========

    /// Advance everything to `now_ms` and describe the frame.
    pub fn frame(&mut self, now_ms: f64) -> FrameState<'_> {
        let time = (now_ms / 1000.0) as f32;
        self.time_secs = time;

        for outcome in self.selector.poll() {
            self.apply_image(outcome, now_ms);
        }

        let expansion = self.morph.advance(now_ms);
        let scale = self.scale.advance(now_ms);
        self.camera.update();
        self.runes.advance(now_ms, time);
        self.marquee.advance(now_ms);

        let star_spin = match self.config.scene {
            SceneKind::Morph => {
                if !self.hand_present {
                    self.system.follow();
                    if !self.dragging {
                        self.system.current.z = (time * 0.2).sin() * 0.1;
                    }
                }
                0.01
            }
            SceneKind::Runes => {
                self.system.current = Vec3::new((time * 0.2).sin() * 0.1, time * 0.1, 0.0);
                0.02
            }
        };

        let (w, h) = self.viewport;
        let aspect = w.max(1) as f32 / h.max(1) as f32;
        let view_proj = self.camera.view_proj(aspect);
        let model = Mat4::from_scale_rotation_translation(Vec3::splat(scale), self.system.quat(), Vec3::ZERO);

        let visuals = &self.config.visuals;
        let mut uniforms = FrameUniforms::new(view_proj, model).with_color(Vec3::from_array(visuals.color));
        uniforms.time = time;
        uniforms.expansion = expansion;
        uniforms.point_size = visuals.point_size;
        uniforms.color_variation = visuals.color_variation;
        uniforms.viewport = [w.max(1) as f32, h.max(1) as f32];

        let field = self.field.as_ref().map(|_| {
            let mut field = FieldUniforms::new(view_proj, model);
            field.time = time;
            field.strength = self.attraction.strength;
            field.pointer = self.attraction.point.to_array();
            field.marquee = self.marquee.amount();
            field.marquee_phase = self.marquee.phase();
            field.viewport = uniforms.viewport;
            field
        });

        let particles_dirty = self.particles.take_dirty();
        let trail_dirty = self.trail.take_dirty();

        FrameState {
            time,
            uniforms,
            view_proj,
            star_model: Mat4::from_rotation_y(time * star_spin),
            particles: &self.particles,
            particles_dirty,
            field,
            trail: &self.trail,
            trail_dirty,
            runes: &self.runes,
            stars: &self.stars,
            background: visuals.background,
            circle_progress: self.detector.progress(),
            status: &self.status,
        }
    }

    /// Shader time of the last frame, in seconds.
    pub fn time(&self) -> f32 {
        self.time_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(scene: SceneKind) -> SceneConfig {
        SceneConfig {
            scene,
            capacity: 30_000,
            star_count: 100,
            field_count: 500,
            seed: Some(3),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn test_new_shows_first_shape() {
        let mut engine = Engine::new(config(SceneKind::Morph));
        assert_eq!(engine.selection(), &Selection::Family(ShapeFamily::Sphere));
        assert_eq!(engine.particles().active_count(), 15_000);
        assert_eq!(engine.expansion(), 0.0);
        let state = engine.frame(1500.0);
        assert!(state.particles_dirty);
        assert_eq!(state.uniforms.expansion, 1.0);
        assert!(!engine.frame(1516.0).particles_dirty);
    }

    #[test]
    fn test_arrow_keys_cycle_rotation() {
        let mut engine = Engine::new(config(SceneKind::Morph));
        engine.on_key(KeyCode::Right, 0.0);
        assert_eq!(engine.rotation().current(), ShapeFamily::Cube);
        engine.on_key(KeyCode::Left, 10.0);
        engine.on_key(KeyCode::Left, 20.0);
        assert_eq!(engine.rotation().current(), ShapeFamily::Torus);
        assert_eq!(engine.on_key(KeyCode::Escape, 30.0), Response::Exit);
    }

    #[test]
    fn test_space_toggles_expansion() {
        let mut engine = Engine::new(config(SceneKind::Morph));
        engine.frame(2000.0);
        engine.on_key(KeyCode::Space, 2000.0);
        assert_eq!(engine.frame(3000.0).uniforms.expansion, 0.0);
    }

    #[test]
    fn test_wheel_scales_morph_and_zooms_runes() {
        let mut morph = Engine::new(config(SceneKind::Morph));
        morph.on_wheel(-250.0, 0.0);
        assert!((morph.frame(300.0).uniforms.model[0][0] - 1.5).abs() < 0.2);

        let mut runes = Engine::new(config(SceneKind::Runes));
        runes.on_wheel(100.0, 0.0);
        assert_eq!(runes.camera().distance, 250.0);
    }

    fn pinch(distance: f32) -> HandFrame {
        let mut landmarks = [Vec3::splat(0.5); HandFrame::LANDMARKS];
        landmarks[HandFrame::THUMB_TIP] = Vec3::new(0.5, 0.5, 0.0);
        landmarks[HandFrame::INDEX_TIP] = Vec3::new(0.5 + distance, 0.5, 0.0);
        HandFrame::new(landmarks)
    }

    #[test]
    fn test_hand_pinch_drives_expansion() {
        let mut engine = Engine::new(config(SceneKind::Morph));
        engine.frame(2000.0);

        engine.on_hand_frame(Some(pinch(0.03)), 2000.0);
        assert!(engine.hand_present());
        assert_eq!(engine.frame(2200.0).uniforms.expansion, 0.0);

        engine.on_hand_frame(Some(pinch(0.2)), 2200.0);
        let expansion = engine.frame(2400.0).uniforms.expansion;
        assert!((expansion - 0.6).abs() < 1e-4, "expansion {}", expansion);

        // Pointer input is ignored while the hand is tracked.
        engine.on_key(KeyCode::Right, 2500.0);
        assert_eq!(engine.rotation().current(), ShapeFamily::Sphere);

        engine.on_hand_frame(None, 2600.0);
        assert!(!engine.hand_present());
    }

    #[test]
    fn test_pointer_events_feed_circle_detector() {
        let mut engine = Engine::new(config(SceneKind::Morph));
        engine.resize(800, 600);
        let center = Vec2::new(400.0, 300.0);
        let mut last = center + Vec2::new(100.0, 0.0);
        for i in 0..40 {
            let angle = i as f32 * std::f32::consts::TAU / 36.0;
            let position = center + Vec2::new(angle.cos(), angle.sin()) * 100.0;
            let event = InputEvent::PointerMoved {
                position,
                delta: position - last,
            };
            assert_eq!(engine.handle_input(event, i as f64 * 20.0), Response::Continue);
            last = position;
        }
        assert_eq!(engine.rotation().current(), ShapeFamily::Cube);
        assert_eq!(engine.selection(), &Selection::Family(ShapeFamily::Cube));
    }

    #[test]
    fn test_right_click_resets_and_double_click_cycles() {
        let mut engine = Engine::new(config(SceneKind::Morph));
        engine.resize(800, 600);
        engine.on_pointer_move(Vec2::new(600.0, 150.0), Vec2::ZERO, 0.0);
        assert_ne!(engine.system_rotation().target, Vec2::ZERO);

        let at = Vec2::new(100.0, 100.0);
        engine.on_pointer_down(MouseButton::Right, at, 10.0);
        assert_eq!(engine.system_rotation().target, Vec2::ZERO);
        assert_eq!(engine.status(), "view reset");

        engine.on_pointer_down(MouseButton::Left, at, 100.0);
        engine.on_pointer_up(MouseButton::Left, at, 150.0);
        assert_eq!(engine.rotation().current(), ShapeFamily::Sphere);
        engine.on_pointer_down(MouseButton::Left, at, 300.0);
        engine.on_pointer_up(MouseButton::Left, at, 350.0);
        assert_eq!(engine.rotation().current(), ShapeFamily::Cube);

        // The pair is consumed; a third press starts over.
        engine.on_pointer_down(MouseButton::Left, at, 500.0);
        engine.on_pointer_up(MouseButton::Left, at, 550.0);
        assert_eq!(engine.rotation().current(), ShapeFamily::Cube);

        // Too slow.
        engine.on_pointer_down(MouseButton::Left, at, 1500.0);
        assert_eq!(engine.rotation().current(), ShapeFamily::Cube);
    }

    #[test]
    fn test_runes_field_follows_pointer_and_pinch() {
        let mut engine = Engine::new(config(SceneKind::Runes));
        engine.resize(800, 600);
        assert_eq!(engine.ambient_field().map(AmbientField::len), Some(500));
        assert_eq!(engine.particles().capacity(), 0);

        engine.on_pointer_move(Vec2::new(600.0, 150.0), Vec2::ZERO, 0.0);
        let field = engine.frame(16.0).field.expect("field uniforms");
        assert_eq!(field.strength, 1.0);
        assert_eq!(field.pointer, [0.5, 0.5]);

        engine.on_pointer_leave();
        assert_eq!(engine.frame(32.0).field.unwrap().strength, 0.0);

        let mut landmarks = [Vec3::splat(0.5); HandFrame::LANDMARKS];
        landmarks[HandFrame::THUMB_TIP] = Vec3::new(0.65, 0.25, 0.0);
        landmarks[HandFrame::INDEX_TIP] = Vec3::new(0.75, 0.25, 0.0);
        engine.on_hand_frame(Some(HandFrame::new(landmarks)), 48.0);
        assert!((engine.attraction().strength - 0.5).abs() < 1e-5);
        assert_eq!(engine.attraction().point, Vec2::new(0.5, 0.5));

        engine.on_hand_frame(None, 64.0);
        assert_eq!(engine.attraction().strength, 0.0);
    }

    #[test]
    fn test_m_toggles_marquee_in_runes_scene() {
        let mut engine = Engine::new(config(SceneKind::Runes));
        engine.frame(0.0);
        engine.on_key(KeyCode::M, 0.0);
        assert!(engine.marquee().is_enabled());
        let field = engine.frame(500.0).field.unwrap();
        assert!((field.marquee - 0.6).abs() < 1e-5);
        assert_eq!(field.marquee_phase, 1.0);

        engine.on_key(KeyCode::M, 600.0);
        assert_eq!(engine.status(), "marquee off");
        assert_eq!(engine.frame(700.0).field.unwrap().marquee, 0.0);

        let mut morph = Engine::new(config(SceneKind::Morph));
        morph.on_key(KeyCode::M, 0.0);
        assert!(!morph.marquee().is_enabled());
        assert!(morph.frame(16.0).field.is_none());
    }

    #[test]
    fn test_runes_scene_trail_follows_pointer() {
        let mut engine = Engine::new(config(SceneKind::Runes));
        engine.resize(800, 600);
        engine.on_pointer_move(Vec2::new(800.0, 0.0), Vec2::ZERO, 0.0);
        assert_eq!(engine.trail().positions()[0], Vec3::new(100.0, 100.0, 0.0));
    }

    #[test]
    fn test_digit_selects_rotation_entry() {
        let mut engine = Engine::new(config(SceneKind::Runes));
        engine.on_key(KeyCode::Digit(2), 0.0);
        assert_eq!(engine.rotation().current(), ShapeFamily::Pentagram);
        assert_eq!(engine.runes().len(), 1);
        engine.on_key(KeyCode::Digit(9), 0.0);
        assert_eq!(engine.runes().len(), 1);
    }
}
