//! # Camera State Management
//!
//! First-person view orientation. The camera has no position of its own: the eye sits
//! at the viewer body's position, and the camera only tracks where it looks.
//!
//! ## Conventions
//! - `yaw` turns around the Y axis; at zero the camera looks along −Z
//! - `pitch` tilts above (positive) or below (negative) the horizon
//! - Moving the mouse right turns right, moving it down looks down

use cgmath::{Angle, Point3, Rad, Vector3};
use std::f32::consts::FRAC_PI_2;

use super::physics::ViewerBody;

/// Safe limit for pitch to prevent gimbal lock
pub const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Where the viewer is looking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation in radians, within ±[`SAFE_FRAC_PI_2`]
    pub pitch: Rad<f32>,
    /// Radians of rotation per unit of mouse delta
    pub sensitivity: f32,
}

impl Camera {
    /// Creates a level camera looking along −Z.
    ///
    /// # Arguments
    /// * `sensitivity` - Radians of rotation per unit of mouse delta
    pub fn new(sensitivity: f32) -> Self {
        Self {
            yaw: Rad(0.0),
            pitch: Rad(0.0),
            sensitivity,
        }
    }

    /// Rotates the camera by a mouse movement.
    ///
    /// # Arguments
    /// * `dx` - Horizontal mouse delta, positive to the right
    /// * `dy` - Vertical mouse delta, positive downwards
    pub fn apply_mouse_delta(&mut self, dx: f64, dy: f64) {
        self.yaw -= Rad(dx as f32 * self.sensitivity);
        self.pitch -= Rad(dy as f32 * self.sensitivity);

        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }

    /// Unit vector through the centre of the view.
    pub fn view_direction(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();
        Vector3::new(-yaw_sin * pitch_cos, pitch_sin, -yaw_cos * pitch_cos)
    }

    /// The eye position for `body`.
    pub fn eye(&self, body: &ViewerBody) -> Point3<f32> {
        body.position
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    #[test]
    fn default_view_looks_down_negative_z() {
        let camera = Camera::new(0.002);
        let direction = camera.view_direction();
        assert!((direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-6);
    }

    #[test]
    fn mouse_right_turns_right() {
        let mut camera = Camera::new(0.01);
        camera.apply_mouse_delta(100.0, 0.0);
        let direction = camera.view_direction();
        assert!(direction.x > 0.5);
        assert!((direction.magnitude() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(0.01);
        camera.apply_mouse_delta(0.0, -10_000.0);
        assert_eq!(camera.pitch, Rad(SAFE_FRAC_PI_2));
        assert!(camera.view_direction().y > 0.999);

        camera.apply_mouse_delta(0.0, 20_000.0);
        assert_eq!(camera.pitch, -Rad(SAFE_FRAC_PI_2));
    }
}
