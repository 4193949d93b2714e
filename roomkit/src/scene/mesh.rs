//! Box meshes

use glam::Vec3;
use thiserror::Error;

use super::material::Material;

/// Box extents in scene units. Plain data; validation happens when the
/// geometry is turned into a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxGeometry {
    pub const fn new(width: f32, height: f32, depth: f32) -> BoxGeometry {
        BoxGeometry {
            width,
            height,
            depth,
        }
    }

    pub const fn cube(size: f32) -> BoxGeometry {
        Self::new(size, size, size)
    }

    pub fn extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }

    pub fn is_valid(&self) -> bool {
        let e = [self.width, self.height, self.depth];
        e.iter().all(|v| v.is_finite() && *v > 0.0)
    }
}

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("degenerate box geometry {0}x{1}x{2}: every extent must be finite and positive")]
    DegenerateGeometry(f32, f32, f32),
}

pub struct Mesh {
    pub(crate) geometry: BoxGeometry,
    pub(crate) material: Material,
}

impl Mesh {
    /// The one guarded construction path: rejects malformed geometry
    /// instead of handing the renderer a box it cannot draw.
    pub fn new(geometry: BoxGeometry, material: Material) -> Result<Mesh, MeshError> {
        if !geometry.is_valid() {
            return Err(MeshError::DegenerateGeometry(
                geometry.width,
                geometry.height,
                geometry.depth,
            ));
        }
        Ok(Mesh { geometry, material })
    }

    pub fn geometry(&self) -> &BoxGeometry {
        &self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_box_builds() {
        let mesh = Mesh::new(BoxGeometry::new(3.0, 0.25, 1.45), Material::default());
        assert!(mesh.is_ok());
    }

    #[test]
    fn zero_extent_is_rejected() {
        assert!(Mesh::new(BoxGeometry::new(0.0, 1.0, 1.0), Material::default()).is_err());
    }

    #[test]
    fn negative_and_nan_extents_are_rejected() {
        assert!(Mesh::new(BoxGeometry::new(1.0, -2.0, 1.0), Material::default()).is_err());
        assert!(Mesh::new(BoxGeometry::new(1.0, f32::NAN, 1.0), Material::default()).is_err());
    }
}
