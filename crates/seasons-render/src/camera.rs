//! First-person camera with yaw/pitch look and wheel zoom

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Vertical field of view in radians
pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
/// Near clipping plane
pub const NEAR: f32 = 1.0;
/// Far clipping plane at a zoom factor of 1
pub const FAR: f32 = 5000.0;

const ZOOM_STEP: f32 = 0.1;
const ZOOM_MAX: f32 = 2.0;
const ZOOM_MIN: f32 = 0.1;

/// A free-flying camera. Angles are absolute; movement is relative to the
/// current heading.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position
    pub position: Vec3,
    /// Horizontal angle in radians
    pub yaw: f32,
    /// Vertical angle in radians
    pub pitch: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    zoom_factor: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            aspect: 16.0 / 9.0,
            zoom_factor: 1.0,
        }
    }
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            aspect,
            ..Self::default()
        }
    }

    /// Set the absolute look angles
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
    }

    /// Move `dx` along the right vector and `dz` along the view direction
    pub fn translate(&mut self, dx: f32, dz: f32) {
        self.position += self.right() * dx + self.front() * dz;
    }

    /// Step the zoom factor from a wheel delta. Scrolling back pushes the
    /// far plane out, scrolling forward pulls it in.
    pub fn zoom(&mut self, wheel: f32) {
        if wheel < 0.0 {
            self.zoom_factor = (self.zoom_factor + ZOOM_STEP).min(ZOOM_MAX);
        } else if wheel > 0.0 {
            self.zoom_factor = (self.zoom_factor - ZOOM_STEP).max(ZOOM_MIN);
        }
    }

    pub fn zoom_factor(&self) -> f32 {
        self.zoom_factor
    }

    fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// View direction (unit length)
    pub fn front(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }

    /// Horizontal right vector; ignores pitch so strafing stays level
    pub fn right(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::X
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.position, self.position + self.front(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(FOV_Y, self.aspect, NEAR, FAR * self.zoom_factor)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_looks_down_positive_z() {
        let camera = Camera::default();
        assert!(close(camera.front(), Vec3::Z));
        assert!(close(camera.right(), Vec3::X));
    }

    #[test]
    fn yaw_turns_heading() {
        let mut camera = Camera::default();
        camera.rotate(FRAC_PI_2, 0.0);
        assert!(close(camera.front(), Vec3::X));
        assert!(close(camera.right(), -Vec3::Z));
    }

    #[test]
    fn pitch_does_not_tilt_right_vector() {
        let mut camera = Camera::default();
        camera.rotate(0.0, 0.5);
        assert!(close(camera.right(), Vec3::X));
        assert!(camera.front().y < 0.0);
        assert!((camera.front().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn translate_follows_heading() {
        let mut camera = Camera::default();
        camera.translate(2.0, 3.0);
        assert!(close(camera.position, Vec3::new(2.0, 0.0, 3.0)));

        camera.rotate(FRAC_PI_2, 0.0);
        camera.translate(0.0, 1.0);
        assert!(close(camera.position, Vec3::new(3.0, 0.0, 3.0)));
    }

    #[test]
    fn zoom_is_bounded() {
        let mut camera = Camera::default();
        for _ in 0..50 {
            camera.zoom(-1.0);
        }
        assert_eq!(camera.zoom_factor(), ZOOM_MAX);

        for _ in 0..50 {
            camera.zoom(1.0);
        }
        assert_eq!(camera.zoom_factor(), ZOOM_MIN);

        let before = camera.zoom_factor();
        camera.zoom(0.0);
        assert_eq!(camera.zoom_factor(), before);
    }

    #[test]
    fn point_ahead_lands_in_clip_volume() {
        let camera = Camera::new(1.0);
        let clip = camera.view_projection_matrix() * Vec3::new(0.0, 0.0, 100.0).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
