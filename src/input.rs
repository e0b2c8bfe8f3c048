//! Input ingestion.
//!
//! Raw window events are turned into typed [`InputEvent`]s by [`Input`],
//! which remembers what a single winit event does not carry (cursor
//! position for button events, held keys for repeat suppression, viewport
//! size for NDC). Hand landmarks arrive separately as [`HandFrame`]s from
//! whatever tracker the host wires in.
//!
//! ```ignore
//! if let Some(event) = input.translate(&window_event) {
//!     engine.handle_input(event, clock.instant_ms());
//! }
//! ```

use glam::{Vec2, Vec3};
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn from_winit(btn: WinitMouseButton) -> Option<Self> {
        match btn {
            WinitMouseButton::Left => Some(MouseButton::Left),
            WinitMouseButton::Right => Some(MouseButton::Right),
            WinitMouseButton::Middle => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

/// Keys the demos react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    Left,
    Right,
    /// Reset view.
    R,
    /// Back to the default geometric shape.
    G,
    /// Load the next configured image.
    I,
    /// Toggle the marquee swirl of the ambient field.
    M,
    Escape,
    /// Select entry `n` (1-based) of the rotation.
    Digit(u8),
    Other,
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::ArrowLeft => KeyCode::Left,
            WinitKeyCode::ArrowRight => KeyCode::Right,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::KeyG => KeyCode::G,
            WinitKeyCode::KeyI => KeyCode::I,
            WinitKeyCode::KeyM => KeyCode::M,
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::Digit1 => KeyCode::Digit(1),
            WinitKeyCode::Digit2 => KeyCode::Digit(2),
            WinitKeyCode::Digit3 => KeyCode::Digit(3),
            WinitKeyCode::Digit4 => KeyCode::Digit(4),
            WinitKeyCode::Digit5 => KeyCode::Digit(5),
            WinitKeyCode::Digit6 => KeyCode::Digit(6),
            WinitKeyCode::Digit7 => KeyCode::Digit(7),
            WinitKeyCode::Digit8 => KeyCode::Digit(8),
            WinitKeyCode::Digit9 => KeyCode::Digit(9),
            _ => KeyCode::Other,
        }
    }
}

/// A pointer or keyboard event in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved { position: Vec2, delta: Vec2 },
    PointerDown { button: MouseButton, position: Vec2 },
    PointerUp { button: MouseButton, position: Vec2 },
    /// Wheel travel in pixels, positive when scrolling toward the user.
    Wheel { delta: f32 },
    PointerLeft,
    KeyDown(KeyCode),
}

/// Pixels one wheel line counts for.
pub const LINE_HEIGHT_PX: f32 = 100.0;

/// Translates window events and tracks pointer state.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    buttons_held: HashSet<MouseButton>,
    mouse_position: Vec2,
    window_size: (u32, u32),
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Cursor in normalized device coordinates.
    pub fn mouse_ndc(&self) -> Vec2 {
        to_ndc(self.mouse_position, self.window_size)
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    pub fn button_held(&self, button: MouseButton) -> bool {
        self.buttons_held.contains(&button)
    }

    pub fn any_button_held(&self) -> bool {
        !self.buttons_held.is_empty()
    }

    /// Convert a winit event. Returns `None` for events the engine ignores,
    /// including key repeats.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                let key = KeyCode::from(code);
                match event.state {
                    ElementState::Pressed => self.keys_held.insert(key).then_some(InputEvent::KeyDown(key)),
                    ElementState::Released => {
                        self.keys_held.remove(&key);
                        None
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = MouseButton::from_winit(*button)?;
                let position = self.mouse_position;
                match state {
                    ElementState::Pressed => {
                        self.buttons_held.insert(button);
                        Some(InputEvent::PointerDown { button, position })
                    }
                    ElementState::Released => {
                        self.buttons_held.remove(&button);
                        Some(InputEvent::PointerUp { button, position })
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                let delta = new_pos - self.mouse_position;
                self.mouse_position = new_pos;
                Some(InputEvent::PointerMoved { position: new_pos, delta })
            }

            WindowEvent::CursorLeft { .. } => {
                self.buttons_held.clear();
                Some(InputEvent::PointerLeft)
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y * LINE_HEIGHT_PX,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                Some(InputEvent::Wheel { delta })
            }

            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
                None
            }

            _ => None,
        }
    }
}

/// Window pixels to NDC, y up. A zero-sized viewport maps to the centre.
pub fn to_ndc(position: Vec2, (width, height): (u32, u32)) -> Vec2 {
    if width == 0 || height == 0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        (position.x / width as f32) * 2.0 - 1.0,
        1.0 - (position.y / height as f32) * 2.0,
    )
}

/// One tracked hand: 21 landmarks normalized to the camera image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFrame {
    pub landmarks: [Vec3; HandFrame::LANDMARKS],
}

impl HandFrame {
    pub const LANDMARKS: usize = 21;
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_TIP: usize = 8;
    /// Half-extent of the world square the fingertip is mapped onto.
    pub const WORLD_EXTENT: f32 = 200.0;

    pub fn new(landmarks: [Vec3; Self::LANDMARKS]) -> Self {
        Self { landmarks }
    }

    /// Build from a tracker's landmark list. `None` unless there are exactly 21.
    pub fn from_slice(points: &[Vec3]) -> Option<Self> {
        let landmarks: [Vec3; Self::LANDMARKS] = points.try_into().ok()?;
        Some(Self { landmarks })
    }

    pub fn fingertip(&self) -> Vec3 {
        self.landmarks[Self::INDEX_TIP]
    }

    pub fn thumb(&self) -> Vec3 {
        self.landmarks[Self::THUMB_TIP]
    }

    pub fn wrist(&self) -> Vec3 {
        self.landmarks[Self::WRIST]
    }

    /// Thumb-to-index distance in the image plane.
    pub fn pinch_distance(&self) -> f32 {
        self.thumb().truncate().distance(self.fingertip().truncate())
    }

    /// Fingertip in viewport pixels, the unit the circle detector expects.
    pub fn fingertip_px(&self, (width, height): (u32, u32)) -> Vec2 {
        let tip = self.fingertip();
        Vec2::new(tip.x * width as f32, tip.y * height as f32)
    }

    /// Fingertip in normalized device coordinates, y up.
    pub fn fingertip_ndc(&self) -> Vec2 {
        let tip = self.fingertip();
        Vec2::new((tip.x - 0.5) * 2.0, (0.5 - tip.y) * 2.0)
    }

    /// Fingertip on the world-space z = 0 plane, y up.
    pub fn fingertip_world(&self) -> Vec3 {
        let tip = self.fingertip();
        Vec3::new(
            (tip.x - 0.5) * Self::WORLD_EXTENT,
            (0.5 - tip.y) * Self::WORLD_EXTENT,
            0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand() -> HandFrame {
        let mut landmarks = [Vec3::splat(0.5); HandFrame::LANDMARKS];
        landmarks[HandFrame::INDEX_TIP] = Vec3::new(0.75, 0.25, 0.0);
        landmarks[HandFrame::THUMB_TIP] = Vec3::new(0.45, 0.65, 0.0);
        landmarks[HandFrame::WRIST] = Vec3::new(0.5, 0.9, 0.0);
        HandFrame::new(landmarks)
    }

    #[test]
    fn test_mouse_ndc() {
        assert_eq!(to_ndc(Vec2::new(400.0, 300.0), (800, 600)), Vec2::ZERO);
        assert_eq!(to_ndc(Vec2::new(0.0, 0.0), (800, 600)), Vec2::new(-1.0, 1.0));
        assert_eq!(to_ndc(Vec2::new(800.0, 600.0), (800, 600)), Vec2::new(1.0, -1.0));
        assert_eq!(to_ndc(Vec2::new(5.0, 5.0), (0, 0)), Vec2::ZERO);
    }

    #[test]
    fn test_input_tracks_window() {
        let mut input = Input::new();
        input.set_window_size(800, 600);
        assert_eq!(input.window_size(), (800, 600));
        assert_eq!(input.mouse_ndc(), Vec2::new(-1.0, 1.0));
        assert!(!input.any_button_held());
    }

    #[test]
    fn test_hand_mappings() {
        let hand = hand();
        assert_eq!(hand.fingertip_px((800, 600)), Vec2::new(600.0, 150.0));
        assert_eq!(hand.fingertip_world(), Vec3::new(50.0, 50.0, 0.0));
        assert_eq!(hand.fingertip_ndc(), Vec2::new(0.5, 0.5));
        assert!((hand.pinch_distance() - 0.5).abs() < 1e-5);
        assert_eq!(hand.wrist().y, 0.9);
    }

    #[test]
    fn test_hand_from_slice() {
        assert!(HandFrame::from_slice(&[Vec3::ZERO; 20]).is_none());
        let frame = HandFrame::from_slice(&[Vec3::ONE; 21]).unwrap();
        assert_eq!(frame.fingertip(), Vec3::ONE);
    }
}
