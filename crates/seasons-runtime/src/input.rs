//! Keyboard and mouse state, gathered from window events and read once per
//! frame by the camera rig and the season controls.

use std::collections::HashSet;

use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

#[derive(Default)]
pub struct InputState {
    held_keys: HashSet<KeyCode>,
    /// Keys that went down since the last `end_frame`
    pressed_keys: HashSet<KeyCode>,
    held_buttons: HashSet<MouseButton>,
    /// Raw device motion since the last `end_frame`
    motion: (f64, f64),
    /// Wheel lines since the last `end_frame`, positive away from the user
    wheel: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // OS key repeat arrives as further presses
                if self.held_keys.insert(key) {
                    self.pressed_keys.insert(key);
                }
            }
            ElementState::Released => {
                self.held_keys.remove(&key);
            }
        }
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => self.held_buttons.insert(button),
            ElementState::Released => self.held_buttons.remove(&button),
        };
    }

    pub fn on_motion(&mut self, dx: f64, dy: f64) {
        self.motion.0 += dx;
        self.motion.1 += dy;
    }

    pub fn on_wheel(&mut self, lines: f32) {
        self.wheel += lines;
    }

    /// Forget everything held. Used when the window loses focus.
    pub fn release_all(&mut self) {
        self.held_keys.clear();
        self.held_buttons.clear();
    }

    /// Clear the per-frame edges and deltas
    pub fn end_frame(&mut self) {
        self.pressed_keys.clear();
        self.motion = (0.0, 0.0);
        self.wheel = 0.0;
    }

    pub fn held(&self, key: KeyCode) -> bool {
        self.held_keys.contains(&key)
    }

    pub fn pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn button_held(&self, button: MouseButton) -> bool {
        self.held_buttons.contains(&button)
    }

    pub fn motion(&self) -> (f64, f64) {
        self.motion
    }

    pub fn wheel(&self) -> f32 {
        self.wheel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_does_not_press_again() {
        let mut input = InputState::new();

        input.on_key(KeyCode::Digit1, ElementState::Pressed);
        assert!(input.held(KeyCode::Digit1));
        assert!(input.pressed(KeyCode::Digit1));

        input.end_frame();
        input.on_key(KeyCode::Digit1, ElementState::Pressed);
        assert!(input.held(KeyCode::Digit1));
        assert!(!input.pressed(KeyCode::Digit1));

        input.on_key(KeyCode::Digit1, ElementState::Released);
        assert!(!input.held(KeyCode::Digit1));
    }

    #[test]
    fn deltas_accumulate_until_end_frame() {
        let mut input = InputState::new();

        input.on_motion(3.0, -2.0);
        input.on_motion(1.0, 1.0);
        input.on_wheel(-1.0);
        input.on_wheel(0.5);

        assert_eq!(input.motion(), (4.0, -1.0));
        assert_eq!(input.wheel(), -0.5);

        input.end_frame();
        assert_eq!(input.motion(), (0.0, 0.0));
        assert_eq!(input.wheel(), 0.0);
    }

    #[test]
    fn focus_loss_releases_keys_and_buttons() {
        let mut input = InputState::new();
        input.on_key(KeyCode::KeyA, ElementState::Pressed);
        input.on_button(MouseButton::Left, ElementState::Pressed);
        assert!(input.button_held(MouseButton::Left));

        input.release_all();
        assert!(!input.held(KeyCode::KeyA));
        assert!(!input.button_held(MouseButton::Left));
    }
}
