//! Color

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }

    pub const fn black() -> Color {
        Color::rgb(0.0, 0.0, 0.0)
    }

    pub const fn white() -> Color {
        Color::rgb(1.0, 1.0, 1.0)
    }

    pub const fn grey() -> Color {
        Color::rgb(0.5, 0.5, 0.5)
    }

    pub const fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    pub const fn green() -> Color {
        Color::rgb(0.0, 1.0, 0.0)
    }

    pub const fn blue() -> Color {
        Color::rgb(0.0, 0.0, 1.0)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}

impl From<[f32; 4]> for Color {
    fn from(a: [f32; 4]) -> Self {
        Color::rgba(a[0], a[1], a[2], a[3])
    }
}

impl Into<[f32; 4]> for Color {
    fn into(self) -> [f32; 4] {
        self.to_array()
    }
}
