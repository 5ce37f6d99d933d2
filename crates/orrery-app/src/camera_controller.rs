//! Free-flying camera: WASD to move, Space/Ctrl for up and down, mouse to look.

use glam::{Quat, Vec3};
use orrery_config::InputConfig;
use orrery_input::{KeyboardState, MouseState};
use orrery_render::Camera;
use winit::keyboard::KeyCode;

const PITCH_LIMIT_DEG: f32 = 89.0;
const SPEED_MIN: f32 = 1.0;
const SPEED_MAX: f32 = 2000.0;
const SPEED_SCROLL_FACTOR: f32 = 1.2;

/// Above the orbital plane, looking down at the sun.
pub const START_POSITION: Vec3 = Vec3::new(0.0, 40.0, 160.0);
pub const START_PITCH_DEG: f32 = -14.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FreeCamera {
    /// World position.
    pub position: Vec3,
    /// Degrees around world Y; 0 looks down -Z.
    pub yaw: f32,
    /// Degrees, clamped to ±89.
    pub pitch: f32,
    /// Units per second.
    pub speed: f32,
    /// Degrees per pixel.
    pub sensitivity: f32,
    /// Moving the mouse up looks down.
    pub invert_y: bool,
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self::from_config(&InputConfig::default())
    }
}

impl FreeCamera {
    pub fn from_config(input: &InputConfig) -> Self {
        let mut camera = Self {
            position: START_POSITION,
            yaw: 0.0,
            pitch: START_PITCH_DEG,
            speed: SPEED_MIN,
            sensitivity: 0.0,
            invert_y: false,
        };
        camera.apply_input_config(input);
        camera
    }

    /// Take speed, sensitivity and Y inversion from `input`; the pose is kept.
    pub fn apply_input_config(&mut self, input: &InputConfig) {
        self.speed = input.camera_speed.clamp(SPEED_MIN, SPEED_MAX);
        self.sensitivity = input.mouse_sensitivity;
        self.invert_y = input.invert_y;
    }

    /// Back to the starting viewpoint, keeping speed and sensitivity.
    pub fn reset(&mut self) {
        self.position = START_POSITION;
        self.yaw = 0.0;
        self.pitch = START_PITCH_DEG;
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw.to_radians()) * Quat::from_rotation_x(self.pitch.to_radians())
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Rotate by a mouse delta in pixels.
    pub fn look(&mut self, dx: f32, dy: f32) {
        let dy = if self.invert_y { -dy } else { dy };
        self.yaw = (self.yaw - dx * self.sensitivity).rem_euclid(360.0);
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    /// Positive wheel lines speed up.
    pub fn adjust_speed(&mut self, scroll: f32) {
        if scroll == 0.0 {
            return;
        }
        self.speed = (self.speed * SPEED_SCROLL_FACTOR.powf(scroll)).clamp(SPEED_MIN, SPEED_MAX);
    }

    /// Once per frame: look while the cursor is captured, and let the wheel set speed.
    pub fn handle_mouse(&mut self, mouse: &MouseState) {
        if mouse.is_captured() {
            let delta = mouse.delta();
            self.look(delta.x, delta.y);
        }
        self.adjust_speed(mouse.scroll());
    }

    /// One fixed step of keyboard movement. Up and down follow world Y.
    pub fn move_step(&mut self, dt: f32, keyboard: &KeyboardState) {
        let forward = keyboard.axis(KeyCode::KeyS, KeyCode::KeyW);
        let strafe = keyboard.axis(KeyCode::KeyA, KeyCode::KeyD);
        let lift = match (
            keyboard.is_held(KeyCode::Space),
            keyboard.is_held(KeyCode::ControlLeft) || keyboard.is_held(KeyCode::ControlRight),
        ) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };

        let direction = self.forward() * forward + self.right() * strafe + Vec3::Y * lift;
        if direction.length_squared() > 1e-6 {
            self.position += direction.normalize() * self.speed * dt;
        }
    }

    /// Copy position and orientation into the render camera; projection is untouched.
    pub fn apply_to(&self, camera: &mut Camera) {
        camera.position = self.position;
        camera.rotation = self.rotation();
    }
}
