//! Keyboard and mouse state collected between frames

use std::collections::HashSet;

use glam::Vec2;
use winit::keyboard::KeyCode;

/// Input gathered since the previous frame
///
/// `held` is level state and survives across frames. Everything else is
/// cleared by [`InputState::end_frame`].
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
    /// Raw pointer motion in device units, unaffected by cursor locking
    pub mouse_motion: Vec2,
    /// Vertical wheel movement in lines, positive away from the user
    pub scroll_lines: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// The key went down this frame; auto-repeat does not count
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Apply a key transition
    ///
    /// A press is dropped when `blocked` (an overlay widget owns the
    /// keyboard). Releases always apply, so a key held while focus moves to
    /// the overlay cannot stay down.
    pub fn key(&mut self, key: KeyCode, down: bool, blocked: bool) {
        if !down {
            self.held.remove(&key);
        } else if !blocked && self.held.insert(key) {
            self.pressed.insert(key);
        }
    }

    /// Forget every held key, used when the window loses focus
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn add_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_motion += Vec2::new(dx as f32, dy as f32);
    }

    pub fn add_scroll(&mut self, lines: f32) {
        self.scroll_lines += lines;
    }

    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.mouse_motion = Vec2::ZERO;
        self.scroll_lines = 0.0;
    }
}

/// Whether a key press should be withheld from the app
///
/// `ui_consumed` is egui's verdict for the event; `hotkeys` are the app's
/// keys that must work regardless of focus.
pub fn press_blocked(key: KeyCode, ui_consumed: bool, hotkeys: &[KeyCode]) -> bool {
    ui_consumed && !hotkeys.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut input = InputState::new();
        input.key(KeyCode::KeyW, true, false);
        assert!(input.is_held(KeyCode::KeyW));
        assert!(input.was_pressed(KeyCode::KeyW));

        input.key(KeyCode::KeyW, false, false);
        assert!(!input.is_held(KeyCode::KeyW));
    }

    #[test]
    fn test_repeat_is_not_a_new_press() {
        let mut input = InputState::new();
        input.key(KeyCode::Space, true, false);
        input.end_frame();

        input.key(KeyCode::Space, true, false);
        assert!(input.is_held(KeyCode::Space));
        assert!(!input.was_pressed(KeyCode::Space));
    }

    #[test]
    fn test_release_applies_while_blocked() {
        let mut input = InputState::new();
        input.key(KeyCode::KeyW, true, false);

        // User clicks a slider, then lets go of W
        input.key(KeyCode::KeyW, false, true);
        assert!(!input.is_held(KeyCode::KeyW));
    }

    #[test]
    fn test_blocked_press_is_dropped() {
        let mut input = InputState::new();
        input.key(KeyCode::KeyA, true, true);
        assert!(!input.is_held(KeyCode::KeyA));
        assert!(!input.was_pressed(KeyCode::KeyA));
    }

    #[test]
    fn test_hotkeys_pass_focused_overlay() {
        let hotkeys = [KeyCode::Space, KeyCode::Escape];
        assert!(!press_blocked(KeyCode::Space, true, &hotkeys));
        assert!(!press_blocked(KeyCode::Escape, true, &hotkeys));
        assert!(press_blocked(KeyCode::KeyW, true, &hotkeys));
        assert!(!press_blocked(KeyCode::KeyW, false, &hotkeys));
    }

    #[test]
    fn test_end_frame_keeps_held_keys() {
        let mut input = InputState::new();
        input.key(KeyCode::KeyD, true, false);
        input.add_motion(3.0, -2.0);
        input.add_motion(1.0, 1.0);
        input.add_scroll(1.0);
        input.add_scroll(0.5);
        assert_eq!(input.mouse_motion, Vec2::new(4.0, -1.0));
        assert_eq!(input.scroll_lines, 1.5);

        input.end_frame();
        assert!(input.is_held(KeyCode::KeyD));
        assert!(!input.was_pressed(KeyCode::KeyD));
        assert_eq!(input.mouse_motion, Vec2::ZERO);
        assert_eq!(input.scroll_lines, 0.0);
    }

    #[test]
    fn test_release_all_on_focus_loss() {
        let mut input = InputState::new();
        input.key(KeyCode::KeyW, true, false);
        input.key(KeyCode::KeyA, true, false);
        input.release_all();
        assert!(!input.is_held(KeyCode::KeyW));
        assert!(!input.is_held(KeyCode::KeyA));
    }
}
