//! Default room layout
//!
//! The furniture is literal constants: box extents as ratios of a local
//! `SIZE`, offsets in scene units, yaws in multiples of PI. Swapping the
//! room means swapping this data, not the builder.

use std::f32::consts::PI;

use glam::Vec3;

use crate::{
    builder::{FurnitureLayout, LightLayout, PartLayout, RoomLayout, SkyLayout},
    Color,
};

const SIZE: f32 = 4.0;
const BLACK: Color = Color::black();
const GREY: Color = Color::grey();

const MAIN_TABLE_PARTS: [PartLayout; 3] = [
    PartLayout {
        dims: [SIZE - 1.0, SIZE / 16.0, SIZE / 2.75],
        color: BLACK,
        offset: Vec3::ZERO,
    },
    PartLayout {
        dims: [SIZE / 20.0, 1.3, SIZE / 2.75],
        color: BLACK,
        offset: Vec3::new(SIZE / 2.85, -0.75, 0.0),
    },
    PartLayout {
        dims: [SIZE / 20.0, 1.3, SIZE / 2.75],
        color: BLACK,
        offset: Vec3::new(-SIZE / 2.85, -0.75, 0.0),
    },
];

const SIDE_TABLE_PARTS: [PartLayout; 3] = [
    PartLayout {
        dims: [SIZE / 3.0 + 0.5, SIZE / 20.0, SIZE / 2.85],
        color: GREY,
        offset: Vec3::ZERO,
    },
    PartLayout {
        dims: [SIZE / 50.0, 1.25, SIZE / 3.0],
        color: GREY,
        offset: Vec3::new(2.0 / 1.85, -0.75, 0.0),
    },
    PartLayout {
        dims: [SIZE / 50.0, 1.25, SIZE / 3.0],
        color: GREY,
        offset: Vec3::new(-2.0 / 1.85, -0.75, 0.0),
    },
];

const DRAWER_PARTS: [PartLayout; 1] = [PartLayout {
    dims: [SIZE / 4.0, 0.9, SIZE / 3.2],
    color: GREY,
    offset: Vec3::ZERO,
}];

const COMPUTER_PARTS: [PartLayout; 1] = [PartLayout {
    dims: [SIZE / 8.0, SIZE / 4.0, SIZE / 4.0],
    color: BLACK,
    offset: Vec3::ZERO,
}];

const MONITOR_PARTS: [PartLayout; 3] = [
    PartLayout {
        dims: [0.5, 0.04, 0.35],
        color: BLACK,
        offset: Vec3::new(0.0, 0.02, 0.0),
    },
    PartLayout {
        dims: [0.08, 0.35, 0.08],
        color: BLACK,
        offset: Vec3::new(0.0, 0.2, 0.0),
    },
    PartLayout {
        dims: [SIZE / 4.5, SIZE / 8.0, 0.05],
        color: BLACK,
        offset: Vec3::new(0.0, 0.62, 0.0),
    },
];

const CHAIR_PARTS: [PartLayout; 4] = [
    PartLayout {
        dims: [SIZE / 4.0, SIZE / 40.0, SIZE / 4.0],
        color: BLACK,
        offset: Vec3::ZERO,
    },
    PartLayout {
        dims: [SIZE / 4.0, 1.1, SIZE / 40.0],
        color: BLACK,
        offset: Vec3::new(0.0, 0.6, 0.45),
    },
    PartLayout {
        dims: [SIZE / 40.0, 0.75, SIZE / 4.0],
        color: BLACK,
        offset: Vec3::new(0.42, -0.425, 0.0),
    },
    PartLayout {
        dims: [SIZE / 40.0, 0.75, SIZE / 4.0],
        color: BLACK,
        offset: Vec3::new(-0.42, -0.425, 0.0),
    },
];

const FURNITURE: [FurnitureLayout; 8] = [
    FurnitureLayout {
        name: "main table",
        position: Vec3::new(0.0, 1.4, -4.3),
        yaw: 0.0,
        parts: &MAIN_TABLE_PARTS,
    },
    FurnitureLayout {
        name: "side table",
        position: Vec3::new(-SIZE + 1.75, 1.4, -4.3),
        yaw: PI * -0.5,
        parts: &SIDE_TABLE_PARTS,
    },
    FurnitureLayout {
        name: "drawer",
        position: Vec3::new(1.45, 0.55, -4.3),
        yaw: 0.0,
        parts: &DRAWER_PARTS,
    },
    FurnitureLayout {
        name: "computer",
        position: Vec3::new(2.35, 0.5, -4.3),
        yaw: 0.0,
        parts: &COMPUTER_PARTS,
    },
    FurnitureLayout {
        name: "left monitor",
        position: Vec3::new(-0.55, 1.525, -4.55),
        yaw: PI * 0.08,
        parts: &MONITOR_PARTS,
    },
    FurnitureLayout {
        name: "right monitor",
        position: Vec3::new(0.55, 1.525, -4.55),
        yaw: PI * -0.08,
        parts: &MONITOR_PARTS,
    },
    FurnitureLayout {
        name: "desk chair",
        position: Vec3::new(0.0, 0.85, -3.2),
        yaw: PI,
        parts: &CHAIR_PARTS,
    },
    FurnitureLayout {
        name: "side chair",
        position: Vec3::new(-SIZE + 1.75, 0.85, -3.0),
        yaw: PI * 0.5,
        parts: &CHAIR_PARTS,
    },
];

pub const DEFAULT_ROOM: RoomLayout = RoomLayout {
    background: GREY,
    ambient: 0.15,
    light: LightLayout {
        color: Color::white(),
        intensity: 1.0,
        position: Vec3::new(0.0, 10.0, 0.0),
    },
    sky: SkyLayout {
        size: 10.0,
        // Half the cube edge plus a hair, so the floor plane sits inside.
        offset: Vec3::new(0.0, 10.0 / 2.0 + 0.01, 0.0),
        texture_path: "assets/textures/stars.jpg",
    },
    furniture: &FURNITURE,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SceneBuilder;

    #[test]
    fn registry_lists_every_piece_in_insertion_order() {
        let mut builder = SceneBuilder::new(true);
        builder.build(&DEFAULT_ROOM).unwrap();
        let names: Vec<String> = builder
            .room_objects()
            .iter()
            .map(|n| n.borrow().name().cloned().unwrap_or_default())
            .collect();
        assert_eq!(
            names,
            [
                "main table",
                "side table",
                "drawer",
                "computer",
                "left monitor",
                "right monitor",
                "desk chair",
                "side chair",
            ]
        );
    }

    #[test]
    fn every_part_has_positive_extents() {
        for furniture in DEFAULT_ROOM.furniture {
            for part in furniture.parts {
                assert!(
                    part.dims.iter().all(|d| *d > 0.0),
                    "{} has a degenerate part",
                    furniture.name
                );
            }
        }
    }
}
