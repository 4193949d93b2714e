//! Material definitions

use std::{
    fs::File,
    io::Read,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use image::{self, RgbaImage};
use thiserror::Error;

use crate::Color;

/// Which faces of a mesh get rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

impl Default for Side {
    fn default() -> Self {
        Side::Front
    }
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Texture loading error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Texture image parse error: {0}")]
    Image(#[from] image::ImageError),
}

static NEXT_TEXTURE_UID: AtomicUsize = AtomicUsize::new(0);

/// A decoded RGBA image. Uploaded to the GPU lazily by the renderer and
/// cached by `uid`.
pub struct Texture {
    uid: usize,
    image: RgbaImage,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Arc<Texture>, TextureError> {
        let mut f = File::open(filepath.as_ref())?;
        let mut buffer = vec![];
        f.read_to_end(&mut buffer)?;
        let image = image::load_from_memory(&buffer)?.to_rgba8();
        log::info!(
            "\"{}\" loaded",
            filepath.as_ref().to_str().unwrap_or("?file?")
        );
        Ok(Arc::new(Texture {
            uid: NEXT_TEXTURE_UID.fetch_add(1, Ordering::SeqCst),
            image,
        }))
    }

    pub fn uid(&self) -> usize {
        self.uid
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub(crate) fn rgba(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Immutable once created; every mesh owns its own material so recoloring
/// one object can never bleed into another.
pub struct Material {
    pub color: Color,
    pub texture: Option<Arc<Texture>>,
    pub side: Side,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            color: Color::white(),
            texture: None,
            side: Side::Front,
        }
    }
}
