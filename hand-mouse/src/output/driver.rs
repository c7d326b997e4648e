//! Pointer-control collaborator
//!
//! The OS pointer is reached only through `PointerDriver`. Besides the real
//! back end (feature `enigo`), two drivers ship for replay and tests.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Mouse buttons the emitter can press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Platform pointer control
pub trait PointerDriver {
    fn move_cursor_to(&mut self, x: i32, y: i32) -> crate::Result<()>;
    fn press_button(&mut self, button: MouseButton) -> crate::Result<()>;
    fn release_button(&mut self, button: MouseButton) -> crate::Result<()>;
}

impl<D: PointerDriver + ?Sized> PointerDriver for Box<D> {
    fn move_cursor_to(&mut self, x: i32, y: i32) -> crate::Result<()> {
        (**self).move_cursor_to(x, y)
    }

    fn press_button(&mut self, button: MouseButton) -> crate::Result<()> {
        (**self).press_button(button)
    }

    fn release_button(&mut self, button: MouseButton) -> crate::Result<()> {
        (**self).release_button(button)
    }
}

/// One call made on a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerAction {
    MoveTo { x: i32, y: i32 },
    Press(MouseButton),
    Release(MouseButton),
}

/// Records every call in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    pub actions: Vec<PointerAction>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presses(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, PointerAction::Press(_)))
            .count()
    }

    pub fn releases(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, PointerAction::Release(_)))
            .count()
    }

    pub fn moves(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, PointerAction::MoveTo { .. }))
            .count()
    }

    pub fn last_position(&self) -> Option<(i32, i32)> {
        self.actions.iter().rev().find_map(|a| match a {
            PointerAction::MoveTo { x, y } => Some((*x, *y)),
            _ => None,
        })
    }
}

impl PointerDriver for RecordingDriver {
    fn move_cursor_to(&mut self, x: i32, y: i32) -> crate::Result<()> {
        self.actions.push(PointerAction::MoveTo { x, y });
        Ok(())
    }

    fn press_button(&mut self, button: MouseButton) -> crate::Result<()> {
        self.actions.push(PointerAction::Press(button));
        Ok(())
    }

    fn release_button(&mut self, button: MouseButton) -> crate::Result<()> {
        self.actions.push(PointerAction::Release(button));
        Ok(())
    }
}

/// Dry-run driver: logs clicks, counts moves
#[derive(Debug, Clone, Default)]
pub struct LogDriver {
    moves: u64,
}

impl LogDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }
}

impl PointerDriver for LogDriver {
    fn move_cursor_to(&mut self, x: i32, y: i32) -> crate::Result<()> {
        self.moves += 1;
        tracing::trace!(x, y, "move");
        Ok(())
    }

    fn press_button(&mut self, button: MouseButton) -> crate::Result<()> {
        info!(?button, "press");
        Ok(())
    }

    fn release_button(&mut self, button: MouseButton) -> crate::Result<()> {
        info!(?button, "release");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_driver_counts() {
        let mut d = RecordingDriver::new();
        d.move_cursor_to(1, 2).unwrap();
        d.press_button(MouseButton::Left).unwrap();
        d.move_cursor_to(3, 4).unwrap();
        d.release_button(MouseButton::Left).unwrap();

        assert_eq!(d.moves(), 2);
        assert_eq!(d.presses(), 1);
        assert_eq!(d.releases(), 1);
        assert_eq!(d.last_position(), Some((3, 4)));
    }

    #[test]
    fn test_boxed_driver_forwards() {
        let mut boxed: Box<dyn PointerDriver> = Box::new(LogDriver::new());
        boxed.move_cursor_to(5, 5).unwrap();
        boxed.press_button(MouseButton::Right).unwrap();
        boxed.release_button(MouseButton::Right).unwrap();
    }

    #[test]
    fn test_log_driver_counts_moves() {
        let mut d = LogDriver::new();
        d.move_cursor_to(0, 0).unwrap();
        d.move_cursor_to(1, 1).unwrap();
        assert_eq!(d.moves(), 2);
    }
}
