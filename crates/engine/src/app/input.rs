/// Held-key actions. Edge-triggered presses (jump, save, grid toggle) live on
/// the snapshot instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Shift,
    Quit,
}

const ACTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Shift => 4,
            InputAction::Quit => 5,
        }
    }
}

/// Press edge bookkeeping for one key or button: reports a press once until
/// the key is released again.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PressEdge {
    is_down: bool,
    pressed: bool,
}

impl PressEdge {
    pub(crate) fn update(&mut self, is_pressed: bool) {
        if is_pressed && !self.is_down {
            self.pressed = true;
        }
        self.is_down = is_pressed;
    }

    pub(crate) fn is_down(&self) -> bool {
        self.is_down
    }

    pub(crate) fn take(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_edge_fires_once_per_press() {
        let mut edge = PressEdge::default();

        edge.update(true);
        assert!(edge.take());
        edge.update(true);
        assert!(!edge.take());
        assert!(edge.is_down());

        edge.update(false);
        edge.update(true);
        assert!(edge.take());
    }

    #[test]
    fn press_and_release_within_one_tick_still_counts() {
        let mut edge = PressEdge::default();
        edge.update(true);
        edge.update(false);

        assert!(!edge.is_down());
        assert!(edge.take());
    }
}
