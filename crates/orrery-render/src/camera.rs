//! Render camera: a pose plus a reverse-Z perspective.

use glam::{Mat4, Quat, Vec3};

pub const FOV_Y_DEG: f32 = 45.0;
pub const NEAR: f32 = 0.1;
/// World units.
pub const FAR: f32 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World position.
    pub position: Vec3,
    /// Orientation; identity looks down -Z with +Y up.
    pub rotation: Quat,
    /// Vertical, in radians.
    pub fov_y: f32,
    /// Width over height.
    pub aspect_ratio: f32,
    /// Near plane; maps to depth 1 under reverse-Z.
    pub near: f32,
    /// Far plane; maps to depth 0.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1200.0 / 800.0)
    }
}

impl Camera {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: FOV_Y_DEG.to_radians(),
            aspect_ratio,
            near: NEAR,
            far: FAR,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), self.up())
    }

    /// Near plane → depth 1, far plane → depth 0 (near and far swapped).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Follow the window size; a minimised window (zero extent) keeps the old ratio.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(camera: &Camera, point: Vec3) -> Vec3 {
        camera.view_projection_matrix().project_point3(point)
    }

    #[test]
    fn test_default_lens() {
        let camera = Camera::default();
        assert!((camera.fov_y - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert_eq!((camera.near, camera.far), (0.1, 10_000.0));
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_point_ahead_lands_mid_screen() {
        let camera = Camera {
            position: Vec3::new(0.0, 40.0, 160.0),
            ..Camera::default()
        };
        let p = clip(&camera, Vec3::new(0.0, 40.0, 0.0));
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn test_depth_is_reversed() {
        let camera = Camera::default();
        let at_near = clip(&camera, Vec3::new(0.0, 0.0, -camera.near));
        let at_far = clip(&camera, Vec3::new(0.0, 0.0, -camera.far));
        let close = clip(&camera, Vec3::new(0.0, 0.0, -5.0));
        let distant = clip(&camera, Vec3::new(0.0, 0.0, -500.0));

        assert!((at_near.z - 1.0).abs() < 1e-4);
        assert!(at_far.z.abs() < 1e-4);
        assert!(close.z > distant.z);
    }

    #[test]
    fn test_view_follows_rotation() {
        let camera = Camera {
            position: Vec3::new(3.0, 0.0, 0.0),
            rotation: Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2),
            ..Camera::default()
        };
        // Turned to look down +X.
        assert!((camera.forward() - Vec3::X).length() < 1e-5);
        let view_space = camera.view_matrix().transform_point3(Vec3::new(13.0, 0.0, 0.0));
        assert!((view_space - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-4);
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let camera = Camera {
            rotation: Quat::from_euler(glam::EulerRot::YXZ, 0.7, -0.3, 0.0),
            ..Camera::default()
        };
        let (f, u, r) = (camera.forward(), camera.up(), camera.right());
        assert!((f.length() - 1.0).abs() < 1e-5);
        assert!(f.dot(u).abs() < 1e-5 && f.dot(r).abs() < 1e-5 && u.dot(r).abs() < 1e-5);
    }

    #[test]
    fn test_minimised_window_keeps_aspect() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1920.0, 1080.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect_ratio(0.0, 0.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }
}
