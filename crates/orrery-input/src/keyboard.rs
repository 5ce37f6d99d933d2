//! Keyboard state keyed by physical key, so WASD lands on the same keys on any layout.

use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// The parts of a key event the tracker cares about.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    /// Layout-independent key.
    pub key: PhysicalKey,
    /// Pressed or released.
    pub state: ElementState,
    /// OS auto-repeat; ignored for edge detection.
    pub repeat: bool,
}

impl RawKeyEvent {
    pub fn code(code: KeyCode, state: ElementState) -> Self {
        Self {
            key: PhysicalKey::Code(code),
            state,
            repeat: false,
        }
    }
}

/// Held keys plus the edges seen since the last [`end_frame`](Self::end_frame).
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    pressed_this_frame: HashSet<KeyCode>,
    released_this_frame: HashSet<KeyCode>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Auto-repeat and unidentified keys are dropped.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        let PhysicalKey::Code(code) = event.key else {
            return;
        };
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                if self.held.insert(code) {
                    self.pressed_this_frame.insert(code);
                }
            }
            ElementState::Released => {
                if self.held.remove(&code) {
                    self.released_this_frame.insert(code);
                }
            }
        }
    }

    #[must_use]
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    #[must_use]
    pub fn just_pressed(&self, code: KeyCode) -> bool {
        self.pressed_this_frame.contains(&code)
    }

    #[must_use]
    pub fn just_released(&self, code: KeyCode) -> bool {
        self.released_this_frame.contains(&code)
    }

    /// True if any of `codes` went down this frame.
    #[must_use]
    pub fn any_just_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.just_pressed(*c))
    }

    /// `+1` when only `positive` is held, `-1` when only `negative` is, else 0.
    #[must_use]
    pub fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        match (self.is_held(negative), self.is_held(positive)) {
            (false, true) => 1.0,
            (true, false) => -1.0,
            _ => 0.0,
        }
    }

    /// Forget the per-frame edges; held keys stay.
    pub fn end_frame(&mut self) {
        self.pressed_this_frame.clear();
        self.released_this_frame.clear();
    }

    /// Drop everything, e.g. when the window loses focus and releases go missing.
    pub fn reset(&mut self) {
        self.held.clear();
        self.end_frame();
    }
}
