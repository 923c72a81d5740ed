use crate::world::{RenderList, Vec2};

use super::input::ActionStates;
use super::InputAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Input state for a single fixed tick. Press edges are true for exactly one
/// tick; held state mirrors the device. The cursor is already converted to
/// display (low-resolution) pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    jump_pressed: bool,
    grid_toggle_pressed: bool,
    save_pressed: bool,
    cursor_position_px: Option<Vec2>,
    left_mouse_down: bool,
    right_mouse_down: bool,
    left_click_pressed: bool,
    right_click_pressed: bool,
    wheel_steps: i32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    pub fn grid_toggle_pressed(&self) -> bool {
        self.grid_toggle_pressed
    }

    pub fn save_pressed(&self) -> bool {
        self.save_pressed
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_mouse_down(&self) -> bool {
        self.left_mouse_down
    }

    pub fn right_mouse_down(&self) -> bool {
        self.right_mouse_down
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn right_click_pressed(&self) -> bool {
        self.right_click_pressed
    }

    /// Positive is wheel-up.
    pub fn wheel_steps(&self) -> i32 {
        self.wheel_steps
    }

    /// Horizontal intent in `-1.0..=1.0` from the left/right actions.
    pub fn horizontal_intent(&self) -> f32 {
        let right = self.is_down(InputAction::MoveRight) as i32;
        let left = self.is_down(InputAction::MoveLeft) as i32;
        (right - left) as f32
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_jump_pressed(mut self, jump_pressed: bool) -> Self {
        self.jump_pressed = jump_pressed;
        self
    }

    pub fn with_grid_toggle_pressed(mut self, grid_toggle_pressed: bool) -> Self {
        self.grid_toggle_pressed = grid_toggle_pressed;
        self
    }

    pub fn with_save_pressed(mut self, save_pressed: bool) -> Self {
        self.save_pressed = save_pressed;
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_mouse(mut self, is_down: bool, pressed: bool) -> Self {
        self.left_mouse_down = is_down;
        self.left_click_pressed = pressed;
        self
    }

    pub fn with_right_mouse(mut self, is_down: bool, pressed: bool) -> Self {
        self.right_mouse_down = is_down;
        self.right_click_pressed = pressed;
        self
    }

    pub fn with_wheel_steps(mut self, wheel_steps: i32) -> Self {
        self.wheel_steps = wheel_steps;
        self
    }
}

/// One running screen (the game or the editor). The loop calls `update` once
/// per fixed tick and `render` once per presented frame.
pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, out: &mut RenderList);
    fn unload(&mut self) {}
    fn debug_title(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_input() {
        let snapshot = InputSnapshot::empty();
        assert!(!snapshot.quit_requested());
        assert!(!snapshot.jump_pressed());
        assert!(snapshot.cursor_position_px().is_none());
        assert_eq!(snapshot.wheel_steps(), 0);
        assert_eq!(snapshot.horizontal_intent(), 0.0);
    }

    #[test]
    fn horizontal_intent_cancels_opposing_keys() {
        let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        assert_eq!(right.horizontal_intent(), 1.0);

        let left = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
        assert_eq!(left.horizontal_intent(), -1.0);

        let both = right.with_action_down(InputAction::MoveLeft, true);
        assert_eq!(both.horizontal_intent(), 0.0);
    }
}
