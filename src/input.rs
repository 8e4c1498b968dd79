use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::picking::screen_to_ndc;

/// Input the scene samples once per frame to drive keyframe picking.
///
/// Any event source can fill this in; [`Input`] builds it from `winit` events.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PickInput {
    /// Cursor position in normalized device coordinates (+Y up).
    pub cursor_ndc: Vec2,
    /// Left button went down this frame.
    pub mouse_pressed: bool,
    /// Left button is held.
    pub mouse_down: bool,
    /// Either shift key is held.
    pub shift: bool,
}

/// Tracks the window events relevant to picking.
pub struct Input {
    window_size: Vec2,
    mouse_position: Vec2,
    left_down: bool,
    left_pressed: bool,
    shift_left: bool,
    shift_right: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            window_size: Vec2::ONE,
            mouse_position: Vec2::ZERO,
            left_down: false,
            left_pressed: false,
            shift_left: false,
            shift_right: false,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.left_pressed = false;
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.window_size = Vec2::new(size.width.max(1) as f32, size.height.max(1) as f32);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::ShiftLeft) => self.shift_left = pressed,
                    PhysicalKey::Code(KeyCode::ShiftRight) => self.shift_right = pressed,
                    _ => {}
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.press_left(),
                ElementState::Released => self.left_down = false,
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Vec2::new(position.x as f32, position.y as f32);
            }
            _ => {}
        }
    }

    fn press_left(&mut self) {
        if !self.left_down {
            self.left_pressed = true;
        }
        self.left_down = true;
    }

    /// Current cursor position in window pixels.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Snapshot of the picking-relevant state for this frame.
    pub fn sample(&self) -> PickInput {
        PickInput {
            cursor_ndc: screen_to_ndc(self.mouse_position, self.window_size),
            mouse_pressed: self.left_pressed,
            mouse_down: self.left_down,
            shift: self.shift_left || self.shift_right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_reports_press_once() {
        let mut input = Input::new();
        input.press_left();
        assert!(input.sample().mouse_pressed);
        assert!(input.sample().mouse_down);

        input.begin_frame();
        input.press_left();
        let sample = input.sample();
        assert!(!sample.mouse_pressed);
        assert!(sample.mouse_down);
    }

    #[test]
    fn cursor_is_reported_in_ndc() {
        let mut input = Input::new();
        input.window_size = Vec2::new(800.0, 600.0);
        input.mouse_position = Vec2::new(400.0, 150.0);
        let ndc = input.sample().cursor_ndc;
        assert_eq!(ndc, Vec2::new(0.0, 0.5));
    }
}
