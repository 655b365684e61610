//! Spatial and common types

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Scale, yaw/pitch/roll rotation and translation of a scene object.
///
/// The world matrix applies scale first, then rotation, then translation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation in radians (x = pitch, y = yaw, z = roll)
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Rotation as a quaternion, yaw about Y then pitch about X then roll about Z
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        )
    }

    /// World matrix (column-major)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_scale_then_translate() {
        let t = Transform::from_position(Vec3::new(-600.0, -150.0, -600.0)).with_uniform_scale(5.0);
        let p = t.to_matrix().transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert!((p - Vec3::new(-595.0, -140.0, -585.0)).length() < 1e-4);
    }

    #[test]
    fn test_yaw_rotates_forward_to_right() {
        let t = Transform::IDENTITY.with_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let v = t.to_matrix().transform_vector3(Vec3::Z);
        assert!((v - Vec3::X).length() < 1e-5);
    }
}
