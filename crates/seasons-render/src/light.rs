//! Scene light and the light-space projection used for shadows

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Light parameters shared by the model and terrain shaders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: Vec3,
    pub spot_factor: f32,
    pub range: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::new(0.0, -1.0, 0.0),
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [1.0; 4],
            specular: [1.0; 4],
            attenuation: Vec3::ZERO,
            spot_factor: 1.0,
            range: 0.0,
        }
    }
}

fn grey(level: f32) -> [f32; 4] {
    [level, level, level, 1.0]
}

impl Light {
    /// White directional light with grey ambient and specular levels
    pub fn directional(position: Vec3, direction: Vec3, ambient: f32, specular: f32) -> Self {
        Self {
            position,
            direction,
            ambient: grey(ambient),
            specular: grey(specular),
            ..Self::default()
        }
    }

    pub fn to_uniform(&self) -> LightUniform {
        LightUniform {
            position: self.position.to_array(),
            spot_factor: self.spot_factor,
            direction: self.direction.to_array(),
            range: self.range,
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            attenuation: self.attenuation.to_array(),
            _pad: 0.0,
        }
    }
}

/// GPU layout of [`Light`]; matches `struct Light` in the WGSL shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub spot_factor: f32,
    pub direction: [f32; 3],
    pub range: f32,
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 3],
    pub _pad: f32,
}

/// Left-handed view from `position` towards the origin, projected through
/// an orthographic volume of `width` x `height` between `near` and `far`.
pub fn light_view_projection(position: Vec3, width: f32, height: f32, near: f32, far: f32) -> Mat4 {
    let view = Mat4::look_at_lh(position, Vec3::ZERO, Vec3::Y);
    let volume = Mat4::orthographic_lh(
        -width * 0.5,
        width * 0.5,
        -height * 0.5,
        height * 0.5,
        near,
        far,
    );
    volume * view
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_is_vec4_aligned() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 96);
    }

    #[test]
    fn directional_light_defaults() {
        let light = Light::directional(Vec3::new(10.0, 100.0, 350.0), Vec3::NEG_Y, 0.4, 1.0);
        let u = light.to_uniform();
        assert_eq!(u.ambient, [0.4, 0.4, 0.4, 1.0]);
        assert_eq!(u.diffuse, [1.0; 4]);
        assert_eq!(u.spot_factor, 1.0);
        assert_eq!(u.range, 0.0);
        assert_eq!(u.attenuation, [0.0; 3]);
    }

    #[test]
    fn tree_lands_in_light_volume() {
        let position = Vec3::new(10.0, 100.0, 350.0);
        let vp = light_view_projection(position, 200.0, 200.0, -35.0, 100.0);
        let clip = vp * Vec3::new(0.0, 0.0, 350.0).extend(1.0);
        assert!(clip.x.abs() <= 1.0 && clip.y.abs() <= 1.0);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }
}
