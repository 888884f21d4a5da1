use super::constants::*;
use super::surface::{Rgba, Surface};
use glam::Vec2;
use rand::prelude::*;
use serde::Deserialize;

/// How a particle is painted when it is not showing a glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleStyle {
    Square,
    Dot,
}

/// Read-only per-frame inputs shared by every particle update.
#[derive(Clone, Copy, Debug)]
pub struct StepInputs {
    pub bounds: Vec2,
    pub pointer: Vec2,
    pub vortex: f32,
    pub scroll_delta: f32,
    pub playing: bool,
    pub envelope: f32,
}

impl StepInputs {
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.bounds * 0.5
    }
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub base_size: f32,
    pub size: f32,
    pub drift: Vec2,
    pub energy: f32,
    pub glyph: Option<char>,
}

impl Particle {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, bounds: Vec2, glyph_probability: f64) -> Self {
        let pos = Vec2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y);
        let base_size = rng.gen::<f32>() * BASE_SIZE_SPAN + BASE_SIZE_MIN;
        let drift = Vec2::new(
            (rng.gen::<f32>() - 0.5) * DRIFT_SPAN,
            (rng.gen::<f32>() - 0.5) * DRIFT_SPAN,
        );
        let glyph = if rng.gen_bool(glyph_probability.clamp(0.0, 1.0)) {
            GLYPHS.choose(rng).copied()
        } else {
            None
        };
        Self {
            pos,
            base_size,
            size: base_size,
            drift,
            energy: 0.0,
            glyph,
        }
    }

    /// Advance one frame. Particles never read each other, so the batch can
    /// be updated in any order.
    pub fn update<R: Rng + ?Sized>(&mut self, input: &StepInputs, rng: &mut R) {
        self.repel_from_pointer(input.pointer);

        if input.vortex > VORTEX_THRESHOLD {
            self.swirl(input.center(), input.vortex);
        } else {
            self.pos += self.drift;
            self.pos.y += input.scroll_delta * SCROLL_DRIFT_GAIN;
        }

        if input.playing && input.envelope > KICK_THRESHOLD {
            self.energy = 1.0;
            let jitter = input.envelope * KICK_JITTER;
            self.pos.x += (rng.gen::<f32>() - 0.5) * jitter;
            self.pos.y += (rng.gen::<f32>() - 0.5) * jitter;
        }

        self.wrap(input.bounds);
        self.energy = self.energy.clamp(0.0, 1.0);
        self.size = self.base_size * (1.0 + self.energy);
    }

    fn repel_from_pointer(&mut self, pointer: Vec2) {
        let away = self.pos - pointer;
        let dist = away.length();
        if dist < POINTER_RANGE {
            let force = (POINTER_RANGE - dist) / POINTER_RANGE;
            // a particle sitting exactly under the pointer has no direction to flee
            if dist > f32::EPSILON {
                self.pos += away / dist * force * POINTER_PUSH;
            }
            self.energy = (self.energy + POINTER_ENERGY_RISE).min(1.0);
        } else {
            self.energy = (self.energy - ENERGY_DECAY).max(0.0);
        }
    }

    fn swirl(&mut self, center: Vec2, vortex: f32) {
        let to_center = center - self.pos;
        let dist = to_center.length();
        let angle = to_center.y.atan2(to_center.x) + VORTEX_SPIRAL_BIAS;
        let dir = Vec2::new(angle.cos(), angle.sin());
        if dist < VORTEX_INNER_RADIUS {
            self.pos -= dir * VORTEX_ORBIT_STEP;
            self.energy = 1.0;
        } else {
            self.pos += dir * (vortex * VORTEX_PULL) * (dist / VORTEX_DIST_DIVISOR);
        }
        self.energy = (self.energy + VORTEX_ENERGY_GAIN).min(1.0);
    }

    fn wrap(&mut self, bounds: Vec2) {
        let m = WRAP_MARGIN;
        if self.pos.x > bounds.x + m {
            self.pos.x = -m;
        }
        if self.pos.x < -m {
            self.pos.x = bounds.x + m;
        }
        if self.pos.y > bounds.y + m {
            self.pos.y = -m;
        }
        if self.pos.y < -m {
            self.pos.y = bounds.y + m;
        }
    }

    pub fn color(&self) -> Rgba {
        let e = self.energy;
        let lerp = |i: usize| IDLE_RGBA[i] + (HOT_RGBA[i] - IDLE_RGBA[i]) * e;
        Rgba::new(
            lerp(0).floor() as u8,
            lerp(1).floor() as u8,
            lerp(2).floor() as u8,
            lerp(3),
        )
    }

    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        style: ParticleStyle,
        playing: bool,
    ) -> anyhow::Result<()> {
        let color = self.color();
        match (self.glyph, style) {
            (Some(glyph), _) if self.energy > GLYPH_ENERGY_THRESHOLD || playing => {
                surface.fill_glyph(glyph, self.pos, self.base_size * GLYPH_FONT_SCALE, color)
            }
            (_, ParticleStyle::Square) => surface.fill_rect(self.pos, self.size, color),
            (_, ParticleStyle::Dot) => surface.fill_circle(self.pos, self.size, color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> StepInputs {
        StepInputs {
            bounds: Vec2::new(800.0, 600.0),
            pointer: Vec2::splat(POINTER_PARKED),
            vortex: 0.0,
            scroll_delta: 0.0,
            playing: false,
            envelope: 0.0,
        }
    }

    fn still(pos: Vec2) -> Particle {
        Particle {
            pos,
            base_size: 1.0,
            size: 1.0,
            drift: Vec2::ZERO,
            energy: 0.0,
            glyph: None,
        }
    }

    #[test]
    fn pointer_pushes_particle_away_and_energizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = still(Vec2::new(110.0, 100.0));
        let input = StepInputs {
            pointer: Vec2::new(100.0, 100.0),
            ..inputs()
        };
        p.update(&input, &mut rng);
        assert!(p.pos.x > 110.0);
        assert!((p.energy - POINTER_ENERGY_RISE).abs() < 1e-6);
    }

    #[test]
    fn idle_drift_follows_scroll_delta() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut p = still(Vec2::new(400.0, 300.0));
        p.drift = Vec2::new(0.05, -0.05);
        let input = StepInputs {
            vortex: VORTEX_THRESHOLD * 0.5,
            scroll_delta: 40.0,
            ..inputs()
        };
        p.update(&input, &mut rng);
        assert!((p.pos.x - 400.05).abs() < 1e-4);
        let expected_y = 300.0 - 0.05 + 40.0 * SCROLL_DRIFT_GAIN;
        assert!((p.pos.y - expected_y).abs() < 1e-4, "y {}", p.pos.y);

        let mut up = still(Vec2::new(400.0, 300.0));
        up.update(
            &StepInputs {
                scroll_delta: -40.0,
                ..inputs()
            },
            &mut rng,
        );
        assert!(up.pos.y < 300.0);
    }

    #[test]
    fn particle_under_pointer_stays_finite() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = still(Vec2::new(100.0, 100.0));
        let input = StepInputs {
            pointer: Vec2::new(100.0, 100.0),
            ..inputs()
        };
        p.update(&input, &mut rng);
        assert!(p.pos.is_finite());
    }

    #[test]
    fn inner_radius_forces_full_energy() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut p = still(Vec2::new(405.0, 300.0));
        let input = StepInputs {
            vortex: 1.0,
            ..inputs()
        };
        p.update(&input, &mut rng);
        assert_eq!(p.energy, 1.0);
    }

    #[test]
    fn vortex_overrides_drift() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = still(Vec2::new(100.0, 100.0));
        p.drift = Vec2::new(0.1, 0.1);
        let input = StepInputs {
            vortex: VORTEX_MAX,
            ..inputs()
        };
        let before = p.pos;
        p.update(&input, &mut rng);
        let moved = (p.pos - before).length();
        // pull at this distance dwarfs the drift
        assert!(moved > 1.0, "moved only {moved}");
    }

    #[test]
    fn wrap_moves_to_opposite_edge() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut p = still(Vec2::new(800.0 + WRAP_MARGIN + 1.0, -WRAP_MARGIN - 1.0));
        p.update(&inputs(), &mut rng);
        assert_eq!(p.pos.x, -WRAP_MARGIN);
        assert_eq!(p.pos.y, 600.0 + WRAP_MARGIN);
    }

    #[test]
    fn color_ramps_from_grey_to_orange() {
        let mut p = still(Vec2::ZERO);
        let idle = p.color();
        assert_eq!((idle.r, idle.g, idle.b), (60, 60, 60));
        p.energy = 1.0;
        let hot = p.color();
        assert_eq!((hot.r, hot.g, hot.b), (255, 85, 0));
        assert!((hot.a - 1.0).abs() < 1e-6);
    }
}
