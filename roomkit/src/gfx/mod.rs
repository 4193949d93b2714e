//! Renderer surface
//!
//! The GPU side is an external collaborator: this module owns the small
//! seam the render loop talks through. `RenderingData::parse_scene` is a
//! pure walk of the graph into flat draw data so the geometry math stays
//! testable without a device.

mod forward;

pub use forward::Renderer;

use std::{cell::RefCell, rc::Rc, sync::Arc};

use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::{
    scene::{Scene, SceneNode, Side, Texture},
    Color,
};

#[derive(Debug, Clone)]
pub struct GraphicsParams {
    pub physically_correct_lights: bool,
}

impl Default for GraphicsParams {
    fn default() -> Self {
        GraphicsParams {
            physically_correct_lights: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererCreateInfo {
    pub width: u32,
    pub height: u32,
}

impl RendererCreateInfo {
    pub fn new(width: u32, height: u32) -> RendererCreateInfo {
        RendererCreateInfo { width, height }
    }
}

#[derive(Debug, Error)]
pub enum GfxError {
    #[error("Surface creation error: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter")]
    NoAdapter,
    #[error("Device request error: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

pub struct DrawCall {
    /// World transform including the box extents scale.
    pub model: Mat4,
    pub color: [f32; 4],
    pub side: Side,
    pub texture: Option<Arc<Texture>>,
}

#[derive(Debug, Clone)]
pub struct LightData {
    pub position: Vec3,
    pub color: [f32; 4],
    pub intensity: f32,
    pub power: Option<f32>,
    pub decay: f32,
    pub range: Option<f32>,
}

pub struct RenderingData {
    pub view: Mat4,
    pub proj: Mat4,
    pub eye: Vec3,
    pub background: Color,
    pub ambient: f32,
    pub light: Option<LightData>,
    pub draws: Vec<DrawCall>,
}

impl RenderingData {
    pub fn parse_scene(scene: &Scene) -> RenderingData {
        let camera_world = SceneNode::world_transform(&scene.camera);
        let proj = scene
            .camera
            .borrow()
            .camera()
            .map(|c| c.projection())
            .unwrap_or(Mat4::IDENTITY);

        let mut data = RenderingData {
            view: camera_world.inverse(),
            proj,
            eye: camera_world.w_axis.truncate(),
            background: scene.params.background,
            ambient: scene.params.ambient,
            light: None,
            draws: vec![],
        };
        Self::visit(&scene.root, Mat4::IDENTITY, &mut data);
        data
    }

    fn visit(node: &Rc<RefCell<SceneNode>>, parent: Mat4, data: &mut RenderingData) {
        let node = node.borrow();
        let world = parent * node.transform().matrix();
        if let Some(mesh) = node.mesh() {
            let material = mesh.material();
            data.draws.push(DrawCall {
                model: world * Mat4::from_scale(mesh.geometry().extents()),
                color: material.color.to_array(),
                side: material.side,
                texture: material.texture.clone(),
            });
        }
        if let Some(light) = node.light() {
            data.light = Some(LightData {
                position: world.w_axis.truncate(),
                color: light.color.to_array(),
                intensity: light.intensity,
                power: light.power,
                decay: light.decay,
                range: light.range,
            });
        }
        for child in node.children() {
            Self::visit(child, world, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::SceneBuilder, room::DEFAULT_ROOM};

    fn build_default() -> Scene {
        let mut builder = SceneBuilder::new(true);
        builder.build(&DEFAULT_ROOM).unwrap();
        builder.into_scene()
    }

    #[test]
    fn parse_is_deterministic_across_rebuilds() {
        let a = RenderingData::parse_scene(&build_default());
        let b = RenderingData::parse_scene(&build_default());
        assert_eq!(a.draws.len(), b.draws.len());
        for (x, y) in a.draws.iter().zip(b.draws.iter()) {
            assert_eq!(x.model, y.model);
            assert_eq!(x.color, y.color);
            assert_eq!(x.side, y.side);
        }
    }

    #[test]
    fn draw_count_covers_sky_and_every_part() {
        let data = RenderingData::parse_scene(&build_default());
        let parts: usize = DEFAULT_ROOM.furniture.iter().map(|f| f.parts.len()).sum();
        assert_eq!(data.draws.len(), parts + 1);
    }

    #[test]
    fn light_carries_physical_overrides() {
        let data = RenderingData::parse_scene(&build_default());
        let light = data.light.expect("room has one light");
        assert_eq!(light.power, Some(800.0));
        assert_eq!(light.decay, 2.0);
        assert_eq!(light.range, None);
        assert!(light.position.abs_diff_eq(Vec3::new(0.0, 10.0, 0.0), 1e-6));
    }

    #[test]
    fn create_info_matches_viewport_exactly() {
        let info = RendererCreateInfo::new(1920, 1080);
        assert_eq!((info.width, info.height), (1920, 1080));
    }
}
