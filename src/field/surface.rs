//! Drawing-surface abstraction consumed by the particle field renderer.
//!
//! The field never talks to a browser API directly. The web front-end
//! implements [`Surface`] on top of `CanvasRenderingContext2d`; tests use a
//! recording implementation to inspect what a frame would paint.

use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba(..)` string understood by canvas fill styles.
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Radial gradient fading a single colour from `inner` at the centre to
/// fully transparent at `radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialGlow {
    pub center: Vec2,
    pub radius: f32,
    pub inner: Rgba,
}

pub trait Surface {
    /// Clear the rectangle `(0, 0, width, height)`.
    fn clear(&mut self, width: f32, height: f32) -> anyhow::Result<()>;
    /// Fill `(0, 0, width, height)` with a radial gradient.
    fn fill_glow(&mut self, glow: &RadialGlow, width: f32, height: f32) -> anyhow::Result<()>;
    fn fill_rect(&mut self, origin: Vec2, size: f32, color: Rgba) -> anyhow::Result<()>;
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) -> anyhow::Result<()>;
    fn fill_glyph(&mut self, glyph: char, at: Vec2, font_px: f32, color: Rgba)
        -> anyhow::Result<()>;
}

/// Draw call captured by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Clear { width: f32, height: f32 },
    Glow(RadialGlow),
    Rect { origin: Vec2, size: f32, color: Rgba },
    Circle { center: Vec2, radius: f32, color: Rgba },
    Glyph { glyph: char, at: Vec2, font_px: f32, color: Rgba },
}

/// Surface that records every call instead of painting.
#[derive(Default, Debug)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn glyph_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Glyph { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, width: f32, height: f32) -> anyhow::Result<()> {
        self.calls.push(DrawCall::Clear { width, height });
        Ok(())
    }

    fn fill_glow(&mut self, glow: &RadialGlow, _width: f32, _height: f32) -> anyhow::Result<()> {
        self.calls.push(DrawCall::Glow(*glow));
        Ok(())
    }

    fn fill_rect(&mut self, origin: Vec2, size: f32, color: Rgba) -> anyhow::Result<()> {
        self.calls.push(DrawCall::Rect {
            origin,
            size,
            color,
        });
        Ok(())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) -> anyhow::Result<()> {
        self.calls.push(DrawCall::Circle {
            center,
            radius,
            color,
        });
        Ok(())
    }

    fn fill_glyph(
        &mut self,
        glyph: char,
        at: Vec2,
        font_px: f32,
        color: Rgba,
    ) -> anyhow::Result<()> {
        self.calls.push(DrawCall::Glyph {
            glyph,
            at,
            font_px,
            color,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_formats_alpha_as_float() {
        assert_eq!(Rgba::new(255, 85, 0, 0.15).css(), "rgba(255, 85, 0, 0.15)");
    }
}
