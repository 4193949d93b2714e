//! Scene graph module

mod camera;
mod light;
pub mod material;
pub mod mesh;
mod node;
mod trs;

use std::{cell::RefCell, rc::Rc};

use crate::Color;

pub use camera::Camera;
pub use light::{Light, LightMode};
pub use material::{Material, Side, Texture, TextureError};
pub use mesh::{BoxGeometry, Mesh, MeshError};
pub use node::SceneNode;
pub use trs::Transform;

#[derive(Debug, Clone, Copy)]
pub struct SceneParams {
    pub background: Color,
    pub ambient: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        SceneParams {
            background: Color::black(),
            ambient: 0.0,
        }
    }
}

/// A populated scene graph: one root owning every node, plus the camera
/// node the render loop reads its view from.
#[derive(Clone)]
pub struct Scene {
    pub root: Rc<RefCell<SceneNode>>,
    pub camera: Rc<RefCell<SceneNode>>,
    pub params: SceneParams,
}
