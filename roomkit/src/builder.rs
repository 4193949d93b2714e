//! Scene assembly
//!
//! One parameterized builder fed by declarative layout data. Furniture
//! variants are tables of constants, not copy-pasted assembly code.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use glam::Vec3;
use thiserror::Error;

use crate::{
    scene::{
        BoxGeometry, Camera, Light, Material, Mesh, MeshError, Scene, SceneNode, SceneParams,
        Side, Texture,
    },
    Color,
};

/// Luminous power forced onto the light under physically-correct
/// lighting, together with inverse-square decay and unbounded range.
const PHYSICAL_LIGHT_POWER: f32 = 800.0;
const PHYSICAL_LIGHT_DECAY: f32 = 2.0;

/// One box of a furniture piece: extents, color and offset relative to
/// the piece's group origin.
#[derive(Debug, Clone, Copy)]
pub struct PartLayout {
    pub dims: [f32; 3],
    pub color: Color,
    pub offset: Vec3,
}

/// One furniture piece. Multi-part pieces are grouped under an
/// intermediate node so they move as a rigid unit; single-part pieces
/// stay bare meshes.
#[derive(Debug, Clone, Copy)]
pub struct FurnitureLayout {
    pub name: &'static str,
    pub position: Vec3,
    /// Rotation about Y in radians, expressed as multiples of PI.
    pub yaw: f32,
    pub parts: &'static [PartLayout],
}

/// The background cube enclosing the camera, drawn inside-out.
#[derive(Debug, Clone, Copy)]
pub struct SkyLayout {
    pub size: f32,
    pub offset: Vec3,
    pub texture_path: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct LightLayout {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy)]
pub struct RoomLayout {
    pub background: Color,
    pub ambient: f32,
    pub light: LightLayout,
    pub sky: SkyLayout,
    pub furniture: &'static [FurnitureLayout],
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("mesh construction failed: {0}")]
    Construction(#[from] MeshError),
}

/// Populates a scene graph once at startup. Building the same layout
/// twice duplicates the furniture; callers own that restraint.
pub struct SceneBuilder {
    root: Rc<RefCell<SceneNode>>,
    camera: Rc<RefCell<SceneNode>>,
    params: SceneParams,
    room_objects: Vec<Rc<RefCell<SceneNode>>>,
    physically_correct_lights: bool,
}

impl SceneBuilder {
    pub fn new(physically_correct_lights: bool) -> SceneBuilder {
        let root = SceneNode::new_group();
        let camera = SceneNode::new_group();
        SceneNode::attach(&root, camera.clone());
        SceneBuilder {
            root,
            camera,
            params: SceneParams::default(),
            room_objects: vec![],
            physically_correct_lights,
        }
    }

    /// Builds one mesh node and attaches it directly under the scene
    /// root. Defaults: white, untextured, front faces. A malformed
    /// geometry is logged and surfaces as a typed error; callers decide
    /// whether that is fatal.
    pub fn make_instance(
        &mut self,
        geometry: BoxGeometry,
        color: Option<Color>,
        texture: Option<Arc<Texture>>,
        side: Option<Side>,
    ) -> Result<Rc<RefCell<SceneNode>>, BuildError> {
        let material = Material {
            color: color.unwrap_or(Color::white()),
            texture,
            side: side.unwrap_or(Side::Front),
        };
        let mesh = match Mesh::new(geometry, material) {
            Ok(mesh) => mesh,
            Err(e) => {
                log::error!("Error when making instance: {}", e);
                return Err(e.into());
            }
        };
        let node = SceneNode::new_mesh(mesh);
        SceneNode::attach(&self.root, node.clone());
        Ok(node)
    }

    /// Creates one positioned spot light under the root. Under
    /// physically-correct lighting the power, decay and range are fixed
    /// constants no matter what was passed in.
    pub fn add_light(
        &mut self,
        color: Color,
        intensity: f32,
        x: f32,
        y: f32,
        z: f32,
    ) -> Rc<RefCell<SceneNode>> {
        let mut light = Light::spot(color, intensity);
        if self.physically_correct_lights {
            light.power = Some(PHYSICAL_LIGHT_POWER);
            light.decay = PHYSICAL_LIGHT_DECAY;
            light.range = None;
        }
        let node = SceneNode::new_light(light);
        node.borrow_mut().set_translation(Vec3::new(x, y, z));
        SceneNode::attach(&self.root, node.clone());
        node
    }

    /// Assembles the whole room: background, light, sky cube, furniture.
    pub fn build(&mut self, layout: &RoomLayout) -> Result<(), BuildError> {
        self.params = SceneParams {
            background: layout.background,
            ambient: layout.ambient,
        };
        let light = layout.light;
        self.add_light(
            light.color,
            light.intensity,
            light.position.x,
            light.position.y,
            light.position.z,
        );
        self.add_sky(&layout.sky)?;
        for furniture in layout.furniture {
            self.add_furniture(furniture)?;
        }
        log::info!(
            "room assembled: {} objects, {} nodes under root",
            self.room_objects.len(),
            self.root.borrow().children().len()
        );
        Ok(())
    }

    /// The sky texture is fire-and-forget: a missing or unreadable image
    /// leaves the cube untextured rather than failing assembly.
    fn add_sky(&mut self, sky: &SkyLayout) -> Result<Rc<RefCell<SceneNode>>, BuildError> {
        let texture = match Texture::load(sky.texture_path) {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!("sky texture unavailable: {}", e);
                None
            }
        };
        let node = self.make_instance(
            BoxGeometry::cube(sky.size),
            Some(Color::white()),
            texture,
            Some(Side::Back),
        )?;
        node.borrow_mut().set_translation(sky.offset);
        node.borrow_mut().set_name("sky");
        Ok(node)
    }

    fn add_furniture(
        &mut self,
        furniture: &FurnitureLayout,
    ) -> Result<Rc<RefCell<SceneNode>>, BuildError> {
        let top_level = if let [part] = furniture.parts {
            let node = self.make_instance(
                BoxGeometry::new(part.dims[0], part.dims[1], part.dims[2]),
                Some(part.color),
                None,
                None,
            )?;
            node.borrow_mut().set_translation(furniture.position);
            node
        } else {
            let group = SceneNode::new_group();
            SceneNode::attach(&self.root, group.clone());
            for part in furniture.parts {
                let node = self.make_instance(
                    BoxGeometry::new(part.dims[0], part.dims[1], part.dims[2]),
                    Some(part.color),
                    None,
                    None,
                )?;
                node.borrow_mut().set_translation(part.offset);
                SceneNode::attach(&group, node);
            }
            group.borrow_mut().set_translation(furniture.position);
            group
        };
        if furniture.yaw != 0.0 {
            top_level.borrow_mut().set_yaw(furniture.yaw);
        }
        top_level.borrow_mut().set_name(furniture.name);
        self.room_objects.push(top_level.clone());
        Ok(top_level)
    }

    /// Insertion-ordered registry of the top-level nodes added by
    /// `build`. Read-only; the binary logs it and a picking feature can
    /// grow out of it.
    pub fn room_objects(&self) -> &[Rc<RefCell<SceneNode>>] {
        &self.room_objects
    }

    pub fn camera(&self) -> Rc<RefCell<SceneNode>> {
        self.camera.clone()
    }

    pub fn set_camera(&self, camera: Camera) {
        self.camera.borrow_mut().set_camera(camera);
    }

    pub fn into_scene(self) -> Scene {
        Scene {
            root: self.root,
            camera: self.camera,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_instance_defaults_to_white_front_untextured() {
        let mut builder = SceneBuilder::new(true);
        let node = builder
            .make_instance(BoxGeometry::cube(1.0), None, None, None)
            .unwrap();
        let node = node.borrow();
        let material = node.mesh().unwrap().material();
        assert_eq!(material.color, Color::white());
        assert!(material.texture.is_none());
        assert_eq!(material.side, Side::Front);
    }

    #[test]
    fn make_instance_rejects_degenerate_geometry() {
        let mut builder = SceneBuilder::new(true);
        let result = builder.make_instance(BoxGeometry::new(0.0, -1.0, 2.0), None, None, None);
        assert!(matches!(result, Err(BuildError::Construction(_))));
    }

    #[test]
    fn physically_correct_light_overrides_arguments() {
        let mut builder = SceneBuilder::new(true);
        let node = builder.add_light(Color::red(), 123.0, 1.0, 2.0, 3.0);
        let node = node.borrow();
        let light = node.light().unwrap();
        assert_eq!(light.power, Some(800.0));
        assert_eq!(light.decay, 2.0);
        assert_eq!(light.range, None);
        assert_eq!(light.intensity, 123.0);
    }

    #[test]
    fn flat_light_keeps_arguments() {
        let mut builder = SceneBuilder::new(false);
        let node = builder.add_light(Color::white(), 1.0, 0.0, 10.0, 0.0);
        let node = node.borrow();
        let light = node.light().unwrap();
        assert_eq!(light.power, None);
        assert_eq!(light.decay, 1.0);
        assert!(node
            .transform()
            .translation()
            .abs_diff_eq(Vec3::new(0.0, 10.0, 0.0), 1e-6));
    }
}
