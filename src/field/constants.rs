// Particle field tuning constants.
// Values are per animation frame unless stated otherwise.

// Density: one particle per this many square pixels of canvas
pub const DENSITY_PRIMARY: f32 = 4000.0;
pub const DENSITY_LIGHT: f32 = 15000.0;
pub const DENSITY_MIN: f32 = DENSITY_PRIMARY / 4.0; // caller-supplied densities are floored here

// Particle creation
pub const BASE_SIZE_MIN: f32 = 0.5;
pub const BASE_SIZE_SPAN: f32 = 2.0;
pub const DRIFT_SPAN: f32 = 0.2; // drift per axis in [-0.1, 0.1]
pub const GLYPH_PROBABILITY: f64 = 0.1;
pub const GLYPHS: [char; 10] = ['0', '1', '{', '}', '<', '>', '/', ';', '*', '+'];

// Pointer repulsion
pub const POINTER_RANGE: f32 = 150.0;
pub const POINTER_PUSH: f32 = 2.0;
pub const POINTER_ENERGY_RISE: f32 = 0.1;
pub const ENERGY_DECAY: f32 = 0.02;
pub const POINTER_PARKED: f32 = -1000.0; // pointer position before the first move

// Vortex
pub const VORTEX_THRESHOLD: f32 = 0.1;
pub const VORTEX_INNER_RADIUS: f32 = 50.0;
pub const VORTEX_SPIRAL_BIAS: f32 = 1.5; // radians added to the centre angle
pub const VORTEX_PULL: f32 = 0.02;
pub const VORTEX_DIST_DIVISOR: f32 = 20.0;
pub const VORTEX_ORBIT_STEP: f32 = 2.0;
pub const VORTEX_ENERGY_GAIN: f32 = 0.02;
pub const VORTEX_MAX: f32 = 4.0;
pub const VORTEX_DECAY: f32 = 0.95;
pub const VORTEX_PLAYING_BASE: f32 = 0.6;
pub const VORTEX_PLAYING_KICK: f32 = 0.4;

// Beat
pub const BEAT_INTERVAL_MS: f64 = 468.0; // ~128 BPM
pub const KICK_THRESHOLD: f32 = 0.2;
pub const KICK_JITTER: f32 = 5.0;
pub const KICK_DECAY_PLAYING: f32 = 0.85;
pub const KICK_DECAY_IDLE: f32 = 0.9;
pub const ANALYSER_FFT_SIZE: u32 = 256;
pub const ANALYSER_BASS_BINS: usize = 20;

// Boundary
pub const WRAP_MARGIN: f32 = 50.0;

// Resize
pub const RESIZE_THRESHOLD_PX: f32 = 50.0;
pub const RESIZE_DEBOUNCE_MS: f64 = 100.0;

// Scroll coupling
pub const SCROLL_VORTEX_GAIN: f32 = 0.05;
pub const SCROLL_DELTA_DECAY: f32 = 0.9;
pub const SCROLL_DELTA_DECAY_DELAY_MS: f64 = 50.0;
pub const SCROLL_DRIFT_GAIN: f32 = 0.02;

// Glow
pub const GLOW_SMOOTHING: f32 = 0.05;
pub const GLOW_SCROLL_GAIN: f32 = 1.5;
pub const GLOW_JITTER_SPEED: f32 = 2.0;
pub const GLOW_JITTER_X: f32 = 150.0;
pub const GLOW_JITTER_Y: f32 = 100.0;
pub const GLOW_BOUND_X: f32 = 200.0;
pub const GLOW_BOUND_Y: f32 = 400.0;
pub const GLOW_RADIUS_FACTOR: f32 = 0.6;
pub const GLOW_RGB: [u8; 3] = [255, 85, 0];
pub const GLOW_ALPHA: f32 = 0.15;

// Particle colour ramp (energy 0 -> 1)
pub const IDLE_RGBA: [f32; 4] = [60.0, 60.0, 60.0, 0.3];
pub const HOT_RGBA: [f32; 4] = [255.0, 85.0, 0.0, 1.0];
pub const GLYPH_ENERGY_THRESHOLD: f32 = 0.5;
pub const GLYPH_FONT_SCALE: f32 = 4.0;
