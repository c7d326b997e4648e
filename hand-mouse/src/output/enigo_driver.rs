//! OS pointer back end built on `enigo`

use super::driver::{MouseButton, PointerDriver};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};

/// Moves and clicks the real system pointer
pub struct EnigoDriver {
    enigo: Enigo,
}

impl EnigoDriver {
    pub fn new() -> crate::Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| crate::Error::Pointer(format!("failed to open input backend: {:?}", e)))?;
        Ok(Self { enigo })
    }

    /// Size of the main display in pixels
    pub fn screen_size(&self) -> crate::Result<(i32, i32)> {
        self.enigo
            .main_display()
            .map_err(|e| crate::Error::Pointer(format!("{:?}", e)))
    }

    fn button(&mut self, button: MouseButton, direction: Direction) -> crate::Result<()> {
        let button = match button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
            MouseButton::Middle => Button::Middle,
        };
        self.enigo
            .button(button, direction)
            .map_err(|e| crate::Error::Pointer(format!("{:?}", e)))
    }
}

impl PointerDriver for EnigoDriver {
    fn move_cursor_to(&mut self, x: i32, y: i32) -> crate::Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| crate::Error::Pointer(format!("{:?}", e)))
    }

    fn press_button(&mut self, button: MouseButton) -> crate::Result<()> {
        self.button(button, Direction::Press)
    }

    fn release_button(&mut self, button: MouseButton) -> crate::Result<()> {
        self.button(button, Direction::Release)
    }
}
