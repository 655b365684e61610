//! Keyboard and mouse camera controls

use seasons_core::CameraConfig;
use seasons_render::Camera;
use seasons_runtime::InputState;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Mouse drag turns this many times faster than the arrow keys
const DRAG_MULTIPLIER: f32 = 10.0;

/// Accumulates look angles and applies movement to a [`Camera`]
#[derive(Debug, Clone, Copy)]
pub struct CameraRig {
    pub yaw: f32,
    pub pitch: f32,
    move_speed: f32,
    rotate_speed: f32,
}

impl CameraRig {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            move_speed: config.move_speed,
            rotate_speed: config.rotate_speed,
        }
    }

    /// Apply this frame's look and movement input to `camera`
    pub fn update(&mut self, input: &InputState, dt: f32, camera: &mut Camera) {
        let turn = self.rotate_speed * dt;
        if input.held(KeyCode::ArrowLeft) {
            self.yaw -= turn;
        }
        if input.held(KeyCode::ArrowRight) {
            self.yaw += turn;
        }
        if input.held(KeyCode::ArrowUp) {
            self.pitch += turn;
        }
        if input.held(KeyCode::ArrowDown) {
            self.pitch -= turn;
        }

        // Dragging only follows the sign of the motion
        if input.button_held(MouseButton::Left) {
            let (dx, dy) = input.motion();
            let drag = turn * DRAG_MULTIPLIER;
            self.yaw += drag * sign(dx);
            self.pitch += drag * sign(dy);
        }

        camera.rotate(self.yaw, self.pitch);

        let step = self.move_speed * dt;
        let mut dx = 0.0;
        let mut dz = 0.0;
        if input.held(KeyCode::KeyD) {
            dx = step;
        }
        if input.held(KeyCode::KeyA) {
            dx = -step;
        }
        if input.held(KeyCode::KeyW) {
            dz = step;
        }
        if input.held(KeyCode::KeyS) {
            dz = -step;
        }
        camera.translate(dx, dz);
    }
}

fn sign(v: f64) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use winit::event::ElementState;

    fn rig() -> CameraRig {
        CameraRig::new(&CameraConfig::default())
    }

    #[test]
    fn arrows_turn_at_rotate_speed() {
        let mut rig = rig();
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.on_key(KeyCode::ArrowRight, ElementState::Pressed);
        input.on_key(KeyCode::ArrowUp, ElementState::Pressed);

        rig.update(&input, 1.0, &mut camera);
        assert!((rig.yaw - 1.5).abs() < 1e-6);
        assert!((rig.pitch - 1.5).abs() < 1e-6);
        assert_eq!(camera.yaw, rig.yaw);
        assert_eq!(camera.pitch, rig.pitch);
    }

    #[test]
    fn drag_follows_sign_not_magnitude() {
        let mut rig = rig();
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.on_button(MouseButton::Left, ElementState::Pressed);
        input.on_motion(-250.0, 0.5);

        rig.update(&input, 0.1, &mut camera);
        assert!((rig.yaw + 1.5).abs() < 1e-5);
        assert!((rig.pitch - 1.5).abs() < 1e-5);
    }

    #[test]
    fn motion_without_button_is_ignored() {
        let mut rig = rig();
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.on_motion(40.0, 40.0);

        rig.update(&input, 0.1, &mut camera);
        assert_eq!(rig.yaw, 0.0);
        assert_eq!(rig.pitch, 0.0);
    }

    #[test]
    fn wasd_moves_at_move_speed() {
        let mut rig = rig();
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.on_key(KeyCode::KeyW, ElementState::Pressed);

        rig.update(&input, 0.5, &mut camera);
        assert!((camera.position - Vec3::new(0.0, 0.0, 25.0)).length() < 1e-4);

        input.on_key(KeyCode::KeyW, ElementState::Released);
        input.on_key(KeyCode::KeyA, ElementState::Pressed);
        rig.update(&input, 0.5, &mut camera);
        assert!((camera.position - Vec3::new(-25.0, 0.0, 25.0)).length() < 1e-4);
    }
}
