//! Lights

use crate::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightMode {
    Directional,
    Point,
    Spot,
}

/// A single positioned light. `power`/`decay`/`range` only take effect
/// under physically-correct lighting; `power: None` means the renderer
/// falls back to the flat `intensity`.
#[derive(Debug, Clone)]
pub struct Light {
    pub mode: LightMode,
    pub color: Color,
    pub intensity: f32,
    pub power: Option<f32>,
    pub decay: f32,
    /// Maximum range in scene units; `None` is unbounded.
    pub range: Option<f32>,
}

impl Light {
    pub fn spot(color: Color, intensity: f32) -> Light {
        Light {
            mode: LightMode::Spot,
            color,
            intensity,
            power: None,
            decay: 1.0,
            range: None,
        }
    }
}
