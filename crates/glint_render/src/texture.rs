//! Procedural textures sampled by materials.

use glint_math::{Color, Point3};

/// A color source queried at a surface point.
///
/// The set of textures is closed, so this is an enum rather than a trait
/// object. A checker owns both of its children.
#[derive(Debug, Clone, PartialEq)]
pub enum Texture {
    /// Constant color.
    Solid(Color),
    /// 3D checker pattern alternating between two child textures.
    Checker {
        even: Box<Texture>,
        odd: Box<Texture>,
        /// Spatial frequency of the pattern; larger means smaller cells.
        frequency: f32,
    },
}

impl Texture {
    /// Solid color texture.
    pub fn solid(color: Color) -> Self {
        Texture::Solid(color)
    }

    /// Checker texture from two child textures.
    pub fn checker(even: Texture, odd: Texture, frequency: f32) -> Self {
        Texture::Checker {
            even: Box::new(even),
            odd: Box::new(odd),
            frequency,
        }
    }

    /// Checker of two solid colors.
    pub fn checker_colors(even: Color, odd: Color, frequency: f32) -> Self {
        Self::checker(Texture::Solid(even), Texture::Solid(odd), frequency)
    }

    /// Color at surface coordinates `(u, v)` and world point `p`.
    pub fn value(&self, u: f32, v: f32, p: Point3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker {
                even,
                odd,
                frequency,
            } => {
                // Sign of the product of three sines flips on every cell face.
                let sines =
                    (frequency * p.x).sin() * (frequency * p.y).sin() * (frequency * p.z).sin();
                if sines < 0.0 {
                    odd.value(u, v, p)
                } else {
                    even.value(u, v, p)
                }
            }
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Solid(color)
    }
}
