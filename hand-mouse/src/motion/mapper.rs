//! Camera-to-screen coordinate mapping
//!
//! Only an inner rectangle of the camera frame is tracked: the frame edges
//! are hard to reach with a fingertip, so the margin-trimmed rectangle is
//! stretched over the whole screen.

use crate::capture::types::LandmarkPoint;
use serde::{Deserialize, Serialize};

/// A position in target-screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &ScreenPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Rounded integer pixel position, as pointer APIs want it
    pub fn to_pixels(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// Affine map from the active camera rectangle onto the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    frame_width: f64,
    frame_height: f64,
    margin: f64,
    screen_width: f64,
    screen_height: f64,
    mirror_x: bool,
}

impl CoordinateMapper {
    /// Fails if the margin leaves no active rectangle or any size is not positive.
    pub fn new(
        frame_width: u32,
        frame_height: u32,
        margin: f64,
        screen_width: u32,
        screen_height: u32,
    ) -> crate::Result<Self> {
        if frame_width == 0 || frame_height == 0 {
            return Err(crate::Error::Config(format!(
                "source frame size must be positive, got {}x{}",
                frame_width, frame_height
            )));
        }
        if screen_width == 0 || screen_height == 0 {
            return Err(crate::Error::Config(format!(
                "screen size must be positive, got {}x{}",
                screen_width, screen_height
            )));
        }
        if !(margin >= 0.0)
            || 2.0 * margin >= frame_width as f64
            || 2.0 * margin >= frame_height as f64
        {
            return Err(crate::Error::Config(format!(
                "frame margin {} leaves no active area in a {}x{} frame",
                margin, frame_width, frame_height
            )));
        }

        Ok(Self {
            frame_width: frame_width as f64,
            frame_height: frame_height as f64,
            margin,
            screen_width: screen_width as f64,
            screen_height: screen_height as f64,
            mirror_x: false,
        })
    }

    /// Flip horizontally so a mirrored camera image tracks naturally
    pub fn with_mirror_x(mut self, mirror_x: bool) -> Self {
        self.mirror_x = mirror_x;
        self
    }

    /// Active rectangle `(x0, y0, x1, y1)` in frame pixels, inclusive
    pub fn active_rect(&self) -> (f64, f64, f64, f64) {
        (
            self.margin,
            self.margin,
            self.frame_width - self.margin,
            self.frame_height - self.margin,
        )
    }

    pub fn screen_size(&self) -> (f64, f64) {
        (self.screen_width, self.screen_height)
    }

    pub fn screen_center(&self) -> ScreenPoint {
        ScreenPoint::new(self.screen_width / 2.0, self.screen_height / 2.0)
    }

    /// Map a frame point to the screen, or `None` if it lies outside the
    /// active rectangle. Points on the rectangle edge map to 0 or the
    /// screen size exactly.
    pub fn map(&self, point: LandmarkPoint) -> Option<ScreenPoint> {
        let (x0, y0, x1, y1) = self.active_rect();
        if !(point.x >= x0 && point.x <= x1 && point.y >= y0 && point.y <= y1) {
            return None;
        }

        let x = (point.x - x0) / (x1 - x0) * self.screen_width;
        let y = (point.y - y0) / (y1 - y0) * self.screen_height;
        let x = if self.mirror_x { self.screen_width - x } else { x };
        Some(ScreenPoint::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(640, 480, 100.0, 1920, 1080).unwrap()
    }

    fn close(a: ScreenPoint, b: ScreenPoint) -> bool {
        a.distance_to(&b) < 1e-9
    }

    #[test]
    fn test_frame_center_maps_to_screen_center() {
        let p = mapper().map(LandmarkPoint::new(320.0, 240.0)).unwrap();
        assert!(close(p, ScreenPoint::new(960.0, 540.0)), "{:?}", p);
    }

    #[test]
    fn test_mirrored_center_is_still_center() {
        let p = mapper()
            .with_mirror_x(true)
            .map(LandmarkPoint::new(320.0, 240.0))
            .unwrap();
        assert!(close(p, ScreenPoint::new(960.0, 540.0)));
    }

    #[test]
    fn test_off_center_point_is_affine() {
        // 270 of 440 active pixels across
        let p = mapper().map(LandmarkPoint::new(370.0, 240.0)).unwrap();
        assert!((p.x - 270.0 / 440.0 * 1920.0).abs() < 1e-9);
        assert!((p.y - 540.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let m = mapper();
        assert_eq!(m.map(LandmarkPoint::new(100.0, 100.0)), Some(ScreenPoint::new(0.0, 0.0)));
        assert_eq!(
            m.map(LandmarkPoint::new(540.0, 380.0)),
            Some(ScreenPoint::new(1920.0, 1080.0))
        );
        assert_eq!(m.map(LandmarkPoint::new(100.0, 380.0)), Some(ScreenPoint::new(0.0, 1080.0)));
    }

    #[test]
    fn test_mirrored_boundary() {
        let m = mapper().with_mirror_x(true);
        assert_eq!(m.map(LandmarkPoint::new(100.0, 100.0)), Some(ScreenPoint::new(1920.0, 0.0)));
        assert_eq!(m.map(LandmarkPoint::new(540.0, 380.0)), Some(ScreenPoint::new(0.0, 1080.0)));
    }

    #[test]
    fn test_outside_active_rect_is_none() {
        let m = mapper();
        assert!(m.map(LandmarkPoint::new(99.9, 240.0)).is_none());
        assert!(m.map(LandmarkPoint::new(540.1, 240.0)).is_none());
        assert!(m.map(LandmarkPoint::new(320.0, 50.0)).is_none());
        assert!(m.map(LandmarkPoint::new(320.0, 400.0)).is_none());
        assert!(m.map(LandmarkPoint::new(f64::NAN, 240.0)).is_none());
    }

    #[test]
    fn test_zero_margin_uses_full_frame() {
        let m = CoordinateMapper::new(640, 480, 0.0, 1280, 960).unwrap();
        assert_eq!(m.map(LandmarkPoint::new(640.0, 480.0)), Some(ScreenPoint::new(1280.0, 960.0)));
        assert_eq!(m.map(LandmarkPoint::new(0.0, 0.0)), Some(ScreenPoint::new(0.0, 0.0)));
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        assert!(CoordinateMapper::new(640, 480, 240.0, 1920, 1080).is_err());
        assert!(CoordinateMapper::new(640, 480, 320.0, 1920, 1080).is_err());
        assert!(CoordinateMapper::new(640, 480, -1.0, 1920, 1080).is_err());
        assert!(CoordinateMapper::new(640, 480, f64::NAN, 1920, 1080).is_err());
        assert!(CoordinateMapper::new(0, 480, 10.0, 1920, 1080).is_err());
        assert!(CoordinateMapper::new(640, 480, 10.0, 1920, 0).is_err());
    }

    #[test]
    fn test_screen_center_and_rect() {
        let m = mapper();
        assert_eq!(m.screen_center(), ScreenPoint::new(960.0, 540.0));
        assert_eq!(m.active_rect(), (100.0, 100.0, 540.0, 380.0));
    }

    #[test]
    fn test_to_pixels_rounds() {
        assert_eq!(ScreenPoint::new(10.4, 10.6).to_pixels(), (10, 11));
    }
}
