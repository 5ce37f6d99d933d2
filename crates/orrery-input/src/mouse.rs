//! Mouse state: cursor position, look delta, buttons and wheel.
//!
//! While the cursor is captured the look delta comes from raw device motion;
//! otherwise it is the difference between successive cursor positions.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::window::{CursorGrabMode, Window};

/// Pixels of a touchpad scroll counted as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Debug, Clone, Copy, Default)]
struct ButtonState {
    held: bool,
    pressed_this_frame: bool,
    released_this_frame: bool,
}

fn slot(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        _ => None,
    }
}

/// Per-frame mouse input, fed from winit events and cleared by `end_frame`.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    /// Last cursor position in physical pixels.
    position: Vec2,
    /// False until the first `CursorMoved`, and again after the cursor leaves.
    has_position: bool,
    /// Look motion accumulated this frame.
    delta: Vec2,
    /// Left, right, middle.
    buttons: [ButtonState; 3],
    /// Wheel lines this frame; positive is away from the user.
    scroll: f32,
    captured: bool,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        // The first sample has nothing to diff against.
        if !self.captured && self.has_position {
            self.delta += position - self.position;
        }
        self.position = position;
        self.has_position = true;
    }

    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.captured {
            self.delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    /// Back/forward and extra buttons are ignored.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let Some(i) = slot(button) else {
            return;
        };
        let b = &mut self.buttons[i];
        match state {
            ElementState::Pressed => {
                b.held = true;
                b.pressed_this_frame = true;
            }
            ElementState::Released => {
                b.held = false;
                b.released_this_frame = true;
            }
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
        };
    }

    pub fn on_cursor_left(&mut self) {
        self.has_position = false;
    }

    /// Grab and hide the cursor (or release it) and switch the delta source.
    pub fn set_captured(&mut self, window: &Window, captured: bool) {
        if captured {
            // Raw motion still arrives without a grab on most platforms.
            if window.set_cursor_grab(CursorGrabMode::Locked).is_err() {
                let _ = window.set_cursor_grab(CursorGrabMode::Confined);
            }
            window.set_cursor_visible(false);
        } else {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        self.set_captured_flag(captured);
    }

    pub fn set_captured_flag(&mut self, captured: bool) {
        self.captured = captured;
        self.delta = Vec2::ZERO;
    }

    /// Forget the per-frame delta, wheel and button edges.
    pub fn end_frame(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
        for b in &mut self.buttons {
            b.pressed_this_frame = false;
            b.released_this_frame = false;
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    #[must_use]
    pub fn is_held(&self, button: MouseButton) -> bool {
        slot(button).is_some_and(|i| self.buttons[i].held)
    }

    #[must_use]
    pub fn just_pressed(&self, button: MouseButton) -> bool {
        slot(button).is_some_and(|i| self.buttons[i].pressed_this_frame)
    }

    #[must_use]
    pub fn just_released(&self, button: MouseButton) -> bool {
        slot(button).is_some_and(|i| self.buttons[i].released_this_frame)
    }

    /// Wheel lines this frame, positive away from the user.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_first_cursor_sample_has_no_delta() {
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(300.0, 200.0);
        assert_eq!(mouse.position(), Vec2::new(300.0, 200.0));
        assert_eq!(mouse.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_cursor_delta_accumulates_within_frame() {
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(100.0, 100.0);
        mouse.on_cursor_moved(104.0, 99.0);
        mouse.on_cursor_moved(110.0, 95.0);
        assert_eq!(mouse.delta(), Vec2::new(10.0, -5.0));
        mouse.end_frame();
        assert_eq!(mouse.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_raw_motion_only_counts_when_captured() {
        let mut mouse = MouseState::new();
        mouse.on_raw_motion(5.0, 5.0);
        assert_eq!(mouse.delta(), Vec2::ZERO);

        mouse.set_captured_flag(true);
        mouse.on_raw_motion(3.0, -2.0);
        mouse.on_cursor_moved(500.0, 500.0);
        mouse.on_cursor_moved(600.0, 600.0);
        assert_eq!(mouse.delta(), Vec2::new(3.0, -2.0));
    }

    #[test]
    fn test_button_edges() {
        let mut mouse = MouseState::new();
        mouse.on_button(MouseButton::Right, ElementState::Pressed);
        assert!(mouse.is_held(MouseButton::Right));
        assert!(mouse.just_pressed(MouseButton::Right));
        mouse.end_frame();
        assert!(!mouse.just_pressed(MouseButton::Right));

        mouse.on_button(MouseButton::Right, ElementState::Released);
        assert!(!mouse.is_held(MouseButton::Right));
        assert!(mouse.just_released(MouseButton::Right));
    }

    #[test]
    fn test_extra_buttons_ignored() {
        let mut mouse = MouseState::new();
        mouse.on_button(MouseButton::Back, ElementState::Pressed);
        assert!(!mouse.is_held(MouseButton::Back));
    }

    #[test]
    fn test_scroll_lines_and_pixels() {
        let mut mouse = MouseState::new();
        mouse.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        mouse.on_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 20.0)));
        assert!((mouse.scroll() - 1.5).abs() < 1e-6);
        mouse.end_frame();
        assert_eq!(mouse.scroll(), 0.0);
    }

    #[test]
    fn test_leaving_window_resets_delta_origin() {
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(10.0, 10.0);
        mouse.on_cursor_left();
        mouse.on_cursor_moved(900.0, 900.0);
        assert_eq!(mouse.delta(), Vec2::ZERO);
    }
}
