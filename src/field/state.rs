use super::constants::*;
use glam::Vec2;
use rand::Rng;

/// Scroll delta from the latest scroll event, with its one-shot timed decay.
#[derive(Clone, Debug, Default)]
pub struct ScrollState {
    pub delta: f32,
    last_position: Option<f32>,
    decay_due_ms: Option<f64>,
}

/// Ambient light position, eased toward a target every frame.
#[derive(Clone, Copy, Debug)]
pub struct Glow {
    pub pos: Vec2,
    pub target: Vec2,
}

/// Everything the field reads besides the particles themselves.
///
/// Mutated by input events and decayed once per frame; it is owned by a
/// single controller and never shared across threads.
#[derive(Clone, Debug)]
pub struct FieldState {
    pub vortex: f32,
    pub beat: f32,
    pub pointer: Vec2,
    pub scroll: ScrollState,
    pub glow: Glow,
}

impl FieldState {
    pub fn new(bounds: Vec2) -> Self {
        let center = bounds * 0.5;
        Self {
            vortex: 0.0,
            beat: 0.0,
            pointer: Vec2::splat(POINTER_PARKED),
            scroll: ScrollState::default(),
            glow: Glow {
                pos: center,
                target: center,
            },
        }
    }

    pub fn on_pointer_move(&mut self, pointer: Vec2) {
        self.pointer = pointer;
    }

    /// Feed a reported scroll position. The first report only establishes
    /// the baseline.
    pub fn on_scroll<R: Rng + ?Sized>(
        &mut self,
        position: f32,
        now_ms: f64,
        bounds: Vec2,
        rng: &mut R,
    ) {
        let delta = match self.scroll.last_position {
            Some(last) => position - last,
            None => 0.0,
        };
        self.scroll.last_position = Some(position);
        let speed = delta.abs();
        if speed > 0.0 {
            self.vortex = (self.vortex + speed * SCROLL_VORTEX_GAIN).min(VORTEX_MAX);
        }

        let target = &mut self.glow.target;
        target.y += delta * GLOW_SCROLL_GAIN;
        if speed > GLOW_JITTER_SPEED {
            target.x += (rng.gen::<f32>() - 0.5) * GLOW_JITTER_X;
            target.y += (rng.gen::<f32>() - 0.5) * GLOW_JITTER_Y;
        }
        target.x = target.x.clamp(-GLOW_BOUND_X, bounds.x + GLOW_BOUND_X);
        target.y = target.y.clamp(-GLOW_BOUND_Y, bounds.y + GLOW_BOUND_Y);

        self.scroll.delta = delta;
        self.scroll.decay_due_ms = Some(now_ms + SCROLL_DELTA_DECAY_DELAY_MS);
    }

    /// Run the scroll delta's pending timed decay, if it has come due.
    pub fn run_timers(&mut self, now_ms: f64) {
        if let Some(due) = self.scroll.decay_due_ms {
            if now_ms >= due {
                self.scroll.delta *= SCROLL_DELTA_DECAY;
                self.scroll.decay_due_ms = None;
            }
        }
    }

    /// Per-frame decay and easing. While playing, the vortex is held just
    /// above the threshold and pulses with the beat.
    pub fn advance_frame(&mut self, playing: bool, envelope: f32) {
        self.beat = envelope.clamp(0.0, 1.0);
        if playing {
            self.vortex = VORTEX_PLAYING_BASE + self.beat * VORTEX_PLAYING_KICK;
        } else {
            self.vortex *= VORTEX_DECAY;
        }
        self.vortex = self.vortex.clamp(0.0, VORTEX_MAX);
        self.glow.pos += (self.glow.target - self.glow.pos) * GLOW_SMOOTHING;
    }

    /// Keep the glow inside its bounds after the canvas changed size.
    pub fn fit_to(&mut self, bounds: Vec2) {
        let t = &mut self.glow.target;
        t.x = t.x.clamp(-GLOW_BOUND_X, bounds.x + GLOW_BOUND_X);
        t.y = t.y.clamp(-GLOW_BOUND_Y, bounds.y + GLOW_BOUND_Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const BOUNDS: Vec2 = Vec2::new(1000.0, 800.0);

    #[test]
    fn scroll_accumulates_vortex_up_to_max() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = FieldState::new(BOUNDS);
        state.on_scroll(0.0, 0.0, BOUNDS, &mut rng);
        assert_eq!(state.vortex, 0.0);
        state.on_scroll(20.0, 16.0, BOUNDS, &mut rng);
        assert!((state.vortex - 1.0).abs() < 1e-6);
        state.on_scroll(2000.0, 32.0, BOUNDS, &mut rng);
        assert_eq!(state.vortex, VORTEX_MAX);
    }

    #[test]
    fn scroll_delta_decays_once_after_delay() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = FieldState::new(BOUNDS);
        state.on_scroll(0.0, 0.0, BOUNDS, &mut rng);
        state.on_scroll(10.0, 100.0, BOUNDS, &mut rng);
        state.run_timers(120.0);
        assert_eq!(state.scroll.delta, 10.0);
        state.run_timers(150.0);
        assert!((state.scroll.delta - 9.0).abs() < 1e-5);
        state.run_timers(400.0);
        assert!((state.scroll.delta - 9.0).abs() < 1e-5);
    }

    #[test]
    fn glow_target_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = FieldState::new(BOUNDS);
        state.on_scroll(0.0, 0.0, BOUNDS, &mut rng);
        state.on_scroll(100_000.0, 1.0, BOUNDS, &mut rng);
        assert_eq!(state.glow.target.y, BOUNDS.y + GLOW_BOUND_Y);
        assert!(state.glow.target.x >= -GLOW_BOUND_X);
        assert!(state.glow.target.x <= BOUNDS.x + GLOW_BOUND_X);
    }

    #[test]
    fn glow_eases_toward_target() {
        let mut state = FieldState::new(BOUNDS);
        state.glow.target = Vec2::new(600.0, 400.0);
        state.advance_frame(false, 0.0);
        assert!((state.glow.pos.x - 505.0).abs() < 1e-3);
    }

    #[test]
    fn playing_holds_vortex_above_threshold() {
        let mut state = FieldState::new(BOUNDS);
        state.advance_frame(true, 0.0);
        assert!((state.vortex - VORTEX_PLAYING_BASE).abs() < 1e-6);
        state.advance_frame(true, 1.0);
        assert!((state.vortex - 1.0).abs() < 1e-6);
    }
}
