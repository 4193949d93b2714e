//! End-to-end assembly checks: the default room layout must always land
//! every box at the same absolute coordinates.

use approx::assert_relative_eq;
use glam::Vec3;
use roomkit::{
    builder::SceneBuilder,
    gfx::{RendererCreateInfo, RenderingData},
    room::DEFAULT_ROOM,
    scene::{Camera, Scene, SceneNode},
};

fn build_room() -> SceneBuilder {
    let mut builder = SceneBuilder::new(true);
    builder.build(&DEFAULT_ROOM).unwrap();
    builder
}

#[test]
fn registry_has_the_eight_room_objects_in_order() {
    let builder = build_room();
    assert_eq!(builder.room_objects().len(), 8);
    let names: Vec<String> = builder
        .room_objects()
        .iter()
        .map(|n| n.borrow().name().cloned().unwrap())
        .collect();
    assert_eq!(names[0], "main table");
    assert_eq!(names[1], "side table");
    assert_eq!(names[7], "side chair");
}

#[test]
fn main_table_leg_lands_at_its_absolute_offset() {
    let builder = build_room();
    let table = builder.room_objects()[0].clone();
    // Parts keep their layout order: top, then the two legs.
    let leg = table.borrow().children()[1].clone();
    let p = SceneNode::world_position(&leg);
    // group (0, 1.4, -4.3) + leg offset (4/2.85, -0.75, 0)
    assert!(
        p.abs_diff_eq(Vec3::new(4.0 / 2.85, 0.65, -4.3), 1e-5),
        "leg at {:?}",
        p
    );
}

#[test]
fn side_table_leg_is_rotated_with_its_group() {
    let builder = build_room();
    let table = builder.room_objects()[1].clone();
    let leg = table.borrow().children()[1].clone();
    let p = SceneNode::world_position(&leg);
    // A -PI/2 yaw carries the +X leg offset onto +Z:
    // (-2.25, 1.4, -4.3) + (0, -0.75, 2/1.85)
    assert!(
        p.abs_diff_eq(Vec3::new(-2.25, 0.65, -4.3 + 2.0 / 1.85), 1e-5),
        "leg at {:?}",
        p
    );
}

#[test]
fn rebuilding_the_room_is_deterministic() {
    let scene_a: Scene = {
        let builder = build_room();
        builder.into_scene()
    };
    let scene_b: Scene = {
        let builder = build_room();
        builder.into_scene()
    };
    let a = RenderingData::parse_scene(&scene_a);
    let b = RenderingData::parse_scene(&scene_b);
    assert_eq!(a.draws.len(), b.draws.len());
    for (x, y) in a.draws.iter().zip(b.draws.iter()) {
        assert_eq!(x.model, y.model);
    }
}

#[test]
fn sky_cube_encloses_the_camera() {
    let builder = build_room();
    let scene = builder.into_scene();
    let data = RenderingData::parse_scene(&scene);
    // The sky is the first draw; its center must sit above the origin by
    // half its edge, so the origin-orbiting camera stays inside.
    let sky = &data.draws[0];
    let center = sky.model.w_axis.truncate();
    assert!(center.abs_diff_eq(Vec3::new(0.0, 5.01, 0.0), 1e-5));
    assert_eq!(sky.side, roomkit::scene::Side::Back);
}

#[test]
fn resize_updates_camera_aspect_and_surface_extent() {
    let mut camera = Camera::perspective(800.0 / 600.0, 45_f32.to_radians(), 0.1, 1000.0);
    camera.set_aspect(1920.0 / 1080.0);
    assert_relative_eq!(camera.aspect(), 1920.0 / 1080.0);

    let info = RendererCreateInfo::new(1920, 1080);
    assert_eq!(info.width, 1920);
    assert_eq!(info.height, 1080);
}
