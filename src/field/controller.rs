use super::beat::{BeatSource, SimulatedBeatSource};
use super::constants::*;
use super::particle::{Particle, ParticleStyle, StepInputs};
use super::state::FieldState;
use super::surface::{RadialGlow, Rgba, Surface};
use glam::Vec2;
use rand::prelude::*;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldParams {
    /// Square pixels of canvas per particle.
    pub density: f32,
    pub style: ParticleStyle,
    pub glyph_probability: f64,
}

impl FieldParams {
    /// Dense field of squares with code glyphs, used on the landing page.
    pub fn primary() -> Self {
        Self {
            density: DENSITY_PRIMARY,
            style: ParticleStyle::Square,
            glyph_probability: GLYPH_PROBABILITY,
        }
    }

    /// Sparse round dots for the lighter pages.
    pub fn light() -> Self {
        Self {
            density: DENSITY_LIGHT,
            style: ParticleStyle::Dot,
            glyph_probability: 0.0,
        }
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        Self::primary()
    }
}

/// Number of particles for a canvas: `floor(width * height / density)`,
/// with `density` floored at [`DENSITY_MIN`].
pub fn particle_count(width: f32, height: f32, density: f32) -> usize {
    if density <= 0.0 || width <= 0.0 || height <= 0.0 {
        return 0;
    }
    (width * height / density.max(DENSITY_MIN)).floor() as usize
}

#[derive(Clone, Copy, Debug)]
struct PendingResize {
    bounds: Vec2,
    due_ms: f64,
}

/// Owns the particle batch, the field state and the beat source.
///
/// One controller drives one canvas; the host calls the `on_*` handlers
/// from its input events and [`FieldController::frame`] once per display
/// refresh.
pub struct FieldController {
    params: FieldParams,
    bounds: Vec2,
    particles: Vec<Particle>,
    state: FieldState,
    beat: Box<dyn BeatSource>,
    rng: StdRng,
    pending_resize: Option<PendingResize>,
    playing: bool,
}

impl FieldController {
    pub fn new(width: f32, height: f32, params: FieldParams, seed: u64) -> Self {
        Self::with_beat_source(
            width,
            height,
            params,
            Box::new(SimulatedBeatSource::default()),
            seed,
        )
    }

    pub fn with_beat_source(
        width: f32,
        height: f32,
        params: FieldParams,
        beat: Box<dyn BeatSource>,
        seed: u64,
    ) -> Self {
        let bounds = Vec2::new(width.max(0.0), height.max(0.0));
        if params.density.is_nan() || params.density < DENSITY_MIN {
            log::warn!(
                "[field] density {} below {}, clamping",
                params.density,
                DENSITY_MIN
            );
        }
        let mut controller = Self {
            params,
            bounds,
            particles: Vec::new(),
            state: FieldState::new(bounds),
            beat,
            rng: StdRng::seed_from_u64(seed),
            pending_resize: None,
            playing: false,
        };
        controller.rebuild();
        controller
    }

    fn rebuild(&mut self) {
        let count = particle_count(self.bounds.x, self.bounds.y, self.params.density);
        let bounds = self.bounds;
        let glyph_probability = self.params.glyph_probability;
        let rng = &mut self.rng;
        self.particles = (0..count)
            .map(|_| Particle::spawn(rng, bounds, glyph_probability))
            .collect();
        log::info!(
            "[field] created {} particles for {}x{}",
            count,
            bounds.x,
            bounds.y
        );
    }

    pub fn set_beat_source(&mut self, beat: Box<dyn BeatSource>) {
        self.beat = beat;
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.state.on_pointer_move(Vec2::new(x, y));
    }

    pub fn on_scroll(&mut self, position: f32, now_ms: f64) {
        let bounds = self.bounds;
        self.state
            .on_scroll(position, now_ms, bounds, &mut self.rng);
    }

    /// Debounced resize: only the last size reported within
    /// [`RESIZE_DEBOUNCE_MS`] is applied, on the first frame after it settles.
    pub fn on_resize(&mut self, width: f32, height: f32, now_ms: f64) {
        self.pending_resize = Some(PendingResize {
            bounds: Vec2::new(width.max(0.0), height.max(0.0)),
            due_ms: now_ms + RESIZE_DEBOUNCE_MS,
        });
    }

    /// Apply a new canvas size immediately. Returns true when the width moved
    /// far enough to rebuild the batch.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let old_width = self.bounds.x;
        self.bounds = Vec2::new(width.max(0.0), height.max(0.0));
        self.state.fit_to(self.bounds);
        if (self.bounds.x - old_width).abs() > RESIZE_THRESHOLD_PX {
            self.rebuild();
            true
        } else {
            false
        }
    }

    fn apply_pending_resize(&mut self, now_ms: f64) {
        if let Some(pending) = self.pending_resize {
            if now_ms >= pending.due_ms {
                self.pending_resize = None;
                self.resize(pending.bounds.x, pending.bounds.y);
            }
        }
    }

    /// Advance the simulation by one frame.
    pub fn step(&mut self, now_ms: f64, playing: bool) {
        self.playing = playing;
        self.state.run_timers(now_ms);
        self.apply_pending_resize(now_ms);

        self.beat.advance(now_ms, playing);
        self.state
            .advance_frame(playing, self.beat.current_envelope());

        let inputs = StepInputs {
            bounds: self.bounds,
            pointer: self.state.pointer,
            vortex: self.state.vortex,
            scroll_delta: self.state.scroll.delta,
            playing,
            envelope: self.state.beat,
        };
        let rng = &mut self.rng;
        for p in self.particles.iter_mut() {
            p.update(&inputs, rng);
        }
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> anyhow::Result<()> {
        surface.clear(self.bounds.x, self.bounds.y)?;
        let [r, g, b] = GLOW_RGB;
        let glow = RadialGlow {
            center: self.state.glow.pos,
            radius: self.bounds.max_element() * GLOW_RADIUS_FACTOR,
            inner: Rgba::new(r, g, b, GLOW_ALPHA),
        };
        surface.fill_glow(&glow, self.bounds.x, self.bounds.y)?;
        for p in &self.particles {
            p.draw(surface, self.params.style, self.playing)?;
        }
        Ok(())
    }

    pub fn frame<S: Surface + ?Sized>(
        &mut self,
        now_ms: f64,
        playing: bool,
        surface: &mut S,
    ) -> anyhow::Result<()> {
        self.step(now_ms, playing);
        self.render(surface)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn beat_envelope(&self) -> f32 {
        self.beat.current_envelope()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::surface::{DrawCall, RecordingSurface};

    #[test]
    fn count_follows_area_over_density() {
        assert_eq!(particle_count(1920.0, 1080.0, DENSITY_PRIMARY), 518);
        assert_eq!(particle_count(1920.0, 1080.0, DENSITY_LIGHT), 138);
        assert_eq!(particle_count(0.0, 1080.0, DENSITY_PRIMARY), 0);
    }

    #[test]
    fn tiny_density_is_floored() {
        let floored = particle_count(1920.0, 1080.0, DENSITY_MIN);
        assert_eq!(particle_count(1920.0, 1080.0, 1e-6), floored);
        assert_eq!(particle_count(1920.0, 1080.0, f32::NAN), floored);
        let params = FieldParams {
            density: 1e-6,
            ..FieldParams::primary()
        };
        let field = FieldController::new(1920.0, 1080.0, params, 8);
        assert_eq!(field.particles().len(), floored);
    }

    #[test]
    fn debounced_resize_waits_for_quiet_period() {
        let mut field = FieldController::new(800.0, 600.0, FieldParams::primary(), 1);
        field.on_resize(1200.0, 600.0, 0.0);
        field.step(50.0, false);
        assert_eq!(field.bounds().x, 800.0);
        field.on_resize(1400.0, 600.0, 60.0);
        field.step(120.0, false);
        assert_eq!(field.bounds().x, 800.0);
        field.step(160.0, false);
        assert_eq!(field.bounds().x, 1400.0);
        assert_eq!(field.particles().len(), particle_count(1400.0, 600.0, DENSITY_PRIMARY));
    }

    #[test]
    fn render_paints_glow_before_particles() {
        let mut field = FieldController::new(400.0, 400.0, FieldParams::light(), 5);
        let mut surface = RecordingSurface::default();
        field.frame(0.0, false, &mut surface).unwrap();
        assert!(matches!(surface.calls[0], DrawCall::Clear { .. }));
        assert!(matches!(surface.calls[1], DrawCall::Glow(_)));
        assert_eq!(surface.calls.len(), 2 + field.particles().len());
        assert!(surface.calls[2..]
            .iter()
            .all(|c| matches!(c, DrawCall::Circle { .. })));
    }

    #[test]
    fn glyphs_show_while_playing() {
        let mut field = FieldController::new(800.0, 800.0, FieldParams::primary(), 6);
        let glyphs = field.particles().iter().filter(|p| p.glyph.is_some()).count();
        assert!(glyphs > 0);
        let mut surface = RecordingSurface::default();
        field.frame(0.0, true, &mut surface).unwrap();
        assert_eq!(surface.glyph_count(), glyphs);
    }
}
