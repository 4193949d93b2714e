//! Orbit camera controller
//!
//! Orbits a fixed target from accumulated pointer input, with exponential
//! damping so released drags coast to a stop.

use glam::Vec3;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::scene::Transform;

const MIN_RADIUS: f32 = 0.5;
const MAX_PITCH: f32 = 1.5;

pub struct OrbitController {
    target: Vec3,
    radius: f32,
    yaw: f32,
    pitch: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
    damping: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl OrbitController {
    pub fn new(radius: f32) -> OrbitController {
        OrbitController {
            target: Vec3::ZERO,
            radius: radius.max(MIN_RADIUS),
            yaw: 0.0,
            pitch: 0.0,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
            damping: 0.88,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            dragging: false,
            last_cursor: None,
        }
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent<'_>) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                if !self.dragging {
                    self.last_cursor = None;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                if self.dragging {
                    if let Some((lx, ly)) = self.last_cursor {
                        self.yaw_velocity -= (current.0 - lx) as f32 * self.rotate_speed;
                        self.pitch_velocity += (current.1 - ly) as f32 * self.rotate_speed;
                    }
                }
                self.last_cursor = Some(current);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 60.0,
                };
                self.zoom_velocity -= amount * self.zoom_speed;
            }
            _ => (),
        }
    }

    /// Advances the damped motion one frame. Safe to call with no
    /// accumulated input; the pose then stays put.
    pub fn update(&mut self) {
        self.yaw += self.yaw_velocity;
        self.pitch = (self.pitch + self.pitch_velocity).clamp(-MAX_PITCH, MAX_PITCH);
        self.radius = (self.radius * (1.0 + self.zoom_velocity)).max(MIN_RADIUS);

        self.yaw_velocity *= self.damping;
        self.pitch_velocity *= self.damping;
        self.zoom_velocity *= self.damping;
    }

    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        ) * self.radius;
        self.target + offset
    }

    pub fn view(&self) -> Transform {
        Transform::lookat(self.eye(), self.target, Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn idle_controller_holds_its_pose() {
        let mut orbit = OrbitController::new(10.0);
        let before = orbit.eye();
        for _ in 0..120 {
            orbit.update();
        }
        assert!(orbit.eye().abs_diff_eq(before, 1e-6));
        assert!(before.abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-6));
    }

    #[test]
    fn drag_velocity_damps_out() {
        let mut orbit = OrbitController::new(10.0);
        orbit.yaw_velocity = 0.3;
        for _ in 0..500 {
            orbit.update();
        }
        assert_relative_eq!(orbit.yaw_velocity, 0.0, epsilon = 1e-6);
        // The yaw moved and then settled.
        assert!(orbit.yaw.abs() > 0.0);
        let settled = orbit.eye();
        orbit.update();
        assert!(orbit.eye().abs_diff_eq(settled, 1e-4));
    }

    #[test]
    fn pitch_stays_off_the_poles_and_radius_positive() {
        let mut orbit = OrbitController::new(1.0);
        orbit.pitch_velocity = 1.0;
        orbit.zoom_velocity = -0.9;
        for _ in 0..100 {
            orbit.update();
            orbit.pitch_velocity = 1.0;
            orbit.zoom_velocity = -0.9;
        }
        assert!(orbit.pitch <= MAX_PITCH);
        assert!(orbit.radius >= MIN_RADIUS);
    }
}
