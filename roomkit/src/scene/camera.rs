//! Camera

use glam::Mat4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    fov_y: f32,
    aspect: f32,
    near_clip: f32,
    far_clip: f32,
}

impl Camera {
    pub fn perspective(aspect: f32, fov_y: f32, near_clip: f32, far_clip: f32) -> Camera {
        assert!(aspect > 0.0);
        assert!((fov_y > 0.0) && (fov_y < std::f32::consts::PI));
        assert!(near_clip > 0.0);
        assert!(far_clip > near_clip);
        Camera {
            fov_y,
            aspect,
            near_clip,
            far_clip,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Recomputed on viewport resize; zero or negative aspects are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near_clip, self.far_clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn resize_updates_aspect() {
        let mut camera = Camera::perspective(800.0 / 600.0, 45_f32.to_radians(), 0.1, 1000.0);
        camera.set_aspect(1920.0 / 1080.0);
        assert_relative_eq!(camera.aspect(), 1920.0 / 1080.0);
        assert_ne!(
            Camera::perspective(800.0 / 600.0, 45_f32.to_radians(), 0.1, 1000.0).projection(),
            camera.projection()
        );
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let mut camera = Camera::perspective(1.0, 45_f32.to_radians(), 0.1, 1000.0);
        camera.set_aspect(0.0);
        assert_relative_eq!(camera.aspect(), 1.0);
    }
}
