//! Transform

use glam::{Mat3, Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub(crate) translation: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) scale: Vec3,
}

impl Transform {
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Transform {
        Transform {
            translation,
            rotation,
            scale,
        }
    }

    pub const fn identity() -> Transform {
        Self::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }

    /// Pose at `eye` facing `dst`, -Z forward.
    pub fn lookat(eye: Vec3, dst: Vec3, up: Vec3) -> Transform {
        let back = (eye - dst).normalize();
        let right = up.cross(back).normalize();
        let true_up = back.cross(right);
        Transform {
            translation: eye,
            rotation: Quat::from_mat3(&Mat3::from_cols(right, true_up, back)),
            scale: Vec3::ONE,
        }
    }

    pub fn local_to_parent(&self, position: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * position)
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Into<Mat4> for Transform {
    fn into(self) -> Mat4 {
        self.matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn local_to_parent_applies_trs_order() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(FRAC_PI_2),
            Vec3::splat(2.0),
        );
        // (1, 0, 0) scaled to (2, 0, 0), yawed a quarter turn to (0, 0, -2).
        let p = t.local_to_parent(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 1.0), 1e-6));
    }

    #[test]
    fn matrix_matches_manual_composition() {
        let t = Transform::new(Vec3::new(0.0, 1.4, -4.3), Quat::IDENTITY, Vec3::ONE);
        let p = t.matrix().transform_point3(Vec3::new(1.0, -0.75, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(1.0, 0.65, -4.3), 1e-6));
    }

    #[test]
    fn lookat_faces_target() {
        let t = Transform::lookat(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        // Forward is -Z in local space; pointing from eye to origin.
        let forward = t.rotation() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(t.translation().abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-6));
    }
}
