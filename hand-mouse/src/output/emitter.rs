//! Action Emitter
//!
//! The only place pointer side effects happen. It owns the click state, so a
//! press is never issued while the button is already down and a release is
//! never issued for a button that is up.

use super::driver::{MouseButton, PointerDriver};
use crate::analysis::gesture::GestureIntent;
use crate::motion::mapper::ScreenPoint;
use serde::Serialize;
use tracing::{debug, warn};

/// Counts of driver calls issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmitterStats {
    pub moves: u64,
    pub presses: u64,
    pub releases: u64,
    /// `Move` intents dropped because the fingertip was outside the active area
    pub suppressed_moves: u64,
}

/// Turns gesture intents into pointer calls
#[derive(Debug, Clone)]
pub struct ActionEmitter {
    button: MouseButton,
    button_down: bool,
    stats: EmitterStats,
}

impl ActionEmitter {
    pub fn new(button: MouseButton) -> Self {
        Self {
            button,
            button_down: false,
            stats: EmitterStats::default(),
        }
    }

    /// Whether the synthetic button is currently held
    pub fn is_button_down(&self) -> bool {
        self.button_down
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats
    }

    /// Emit one frame. `position` is the smoothed cursor if it was updated
    /// this frame, `None` if the fingertip was out of range or absent.
    pub fn emit<D: PointerDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        intent: GestureIntent,
        position: Option<ScreenPoint>,
    ) -> crate::Result<()> {
        match intent {
            GestureIntent::Move => match position {
                Some(p) => {
                    let (x, y) = p.to_pixels();
                    driver.move_cursor_to(x, y)?;
                    self.stats.moves += 1;
                }
                None => self.stats.suppressed_moves += 1,
            },
            GestureIntent::ClickDown => {
                if self.button_down {
                    warn!("Press requested while button already down; ignoring");
                    return Ok(());
                }
                driver.press_button(self.button)?;
                self.button_down = true;
                self.stats.presses += 1;
                debug!(button = ?self.button, "Button pressed");
            }
            GestureIntent::ClickUp => {
                self.release_if_held(driver)?;
            }
            GestureIntent::ClickHeld | GestureIntent::Idle => {}
        }
        Ok(())
    }

    /// Release the button if it is down. Called on shutdown; the OS must never
    /// be left with a stuck button.
    pub fn release_if_held<D: PointerDriver + ?Sized>(&mut self, driver: &mut D) -> crate::Result<()> {
        if !self.button_down {
            return Ok(());
        }
        driver.release_button(self.button)?;
        self.button_down = false;
        self.stats.releases += 1;
        debug!(button = ?self.button, "Button released");
        Ok(())
    }
}

impl Default for ActionEmitter {
    fn default() -> Self {
        Self::new(MouseButton::Left)
    }
}
