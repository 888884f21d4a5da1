use crate::dom::js_err;
use crate::field::{RadialGlow, Rgba, Surface};
use glam::Vec2;
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys as web;

/// [`Surface`] backed by a 2D canvas context.
pub struct CanvasSurface {
    ctx: web::CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn from_canvas(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(Self { ctx })
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f32, height: f32) -> anyhow::Result<()> {
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
        Ok(())
    }

    fn fill_glow(&mut self, glow: &RadialGlow, width: f32, height: f32) -> anyhow::Result<()> {
        let (x, y) = (glow.center.x as f64, glow.center.y as f64);
        let gradient = self
            .ctx
            .create_radial_gradient(x, y, 0.0, x, y, glow.radius.max(0.0) as f64)
            .map_err(js_err)?;
        let edge = Rgba { a: 0.0, ..glow.inner };
        gradient
            .add_color_stop(0.0, &glow.inner.css())
            .map_err(js_err)?;
        gradient.add_color_stop(1.0, &edge.css()).map_err(js_err)?;
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
        Ok(())
    }

    fn fill_rect(&mut self, origin: Vec2, size: f32, color: Rgba) -> anyhow::Result<()> {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size as f64, size as f64);
        Ok(())
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) -> anyhow::Result<()> {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .map_err(js_err)?;
        self.ctx.fill();
        Ok(())
    }

    fn fill_glyph(
        &mut self,
        glyph: char,
        at: Vec2,
        font_px: f32,
        color: Rgba,
    ) -> anyhow::Result<()> {
        self.ctx.set_font(&format!("{}px monospace", font_px));
        self.ctx.set_fill_style_str(&color.css());
        let mut buf = [0u8; 4];
        self.ctx
            .fill_text(glyph.encode_utf8(&mut buf), at.x as f64, at.y as f64)
            .map_err(js_err)?;
        Ok(())
    }
}
