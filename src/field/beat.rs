//! Beat envelope sources.
//!
//! The field only ever asks for a decaying envelope in \[0, 1\]. Whether that
//! comes from a metronome or from a live frequency analysis is up to the
//! [`BeatSource`] implementation.

use super::constants::*;

pub trait BeatSource {
    /// Advance the envelope by one animation frame.
    fn advance(&mut self, now_ms: f64, playing: bool);
    /// Current envelope, always in \[0, 1\].
    fn current_envelope(&self) -> f32;
}

/// Fixed-interval kick (~128 BPM) that fires only while playback is active.
#[derive(Clone, Debug)]
pub struct SimulatedBeatSource {
    interval_ms: f64,
    last_beat_ms: Option<f64>,
    envelope: f32,
}

impl SimulatedBeatSource {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_beat_ms: None,
            envelope: 0.0,
        }
    }
}

impl Default for SimulatedBeatSource {
    fn default() -> Self {
        Self::new(BEAT_INTERVAL_MS)
    }
}

impl BeatSource for SimulatedBeatSource {
    fn advance(&mut self, now_ms: f64, playing: bool) {
        if playing {
            let due = match self.last_beat_ms {
                Some(last) => now_ms - last > self.interval_ms,
                None => true,
            };
            if due {
                self.last_beat_ms = Some(now_ms);
                self.envelope = 1.0;
            }
            self.envelope *= KICK_DECAY_PLAYING;
        } else {
            self.envelope *= KICK_DECAY_IDLE;
        }
    }

    fn current_envelope(&self) -> f32 {
        self.envelope
    }
}

/// Envelope derived from byte frequency magnitudes of an analyser node.
///
/// Bass energy is the mean of the lowest [`ANALYSER_BASS_BINS`] bins scaled
/// to \[0, 1\]. The envelope jumps up to new peaks and otherwise decays like
/// the simulated kick.
#[derive(Clone, Debug, Default)]
pub struct AnalyserBeatSource {
    bass: f32,
    envelope: f32,
}

impl AnalyserBeatSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest spectrum; call once per frame before `advance`.
    pub fn feed(&mut self, magnitudes: &[u8]) {
        self.bass = bass_energy(magnitudes);
    }

    pub fn bass(&self) -> f32 {
        self.bass
    }
}

impl BeatSource for AnalyserBeatSource {
    fn advance(&mut self, _now_ms: f64, playing: bool) {
        if playing {
            self.envelope = (self.envelope * KICK_DECAY_PLAYING).max(self.bass);
        } else {
            self.envelope *= KICK_DECAY_IDLE;
        }
        self.envelope = self.envelope.clamp(0.0, 1.0);
    }

    fn current_envelope(&self) -> f32 {
        self.envelope
    }
}

pub fn bass_energy(magnitudes: &[u8]) -> f32 {
    let take = magnitudes.len().min(ANALYSER_BASS_BINS);
    if take == 0 {
        return 0.0;
    }
    let sum: u32 = magnitudes[..take].iter().map(|&m| m as u32).sum();
    (sum as f32 / take as f32 / 255.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_kick_fires_once_per_interval() {
        let mut beat = SimulatedBeatSource::default();
        beat.advance(0.0, true);
        assert!((beat.current_envelope() - KICK_DECAY_PLAYING).abs() < 1e-6);
        beat.advance(16.0, true);
        assert!(beat.current_envelope() < KICK_DECAY_PLAYING);
        beat.advance(BEAT_INTERVAL_MS + 1.0, true);
        assert!((beat.current_envelope() - KICK_DECAY_PLAYING).abs() < 1e-6);
    }

    #[test]
    fn simulated_kick_stays_silent_when_idle() {
        let mut beat = SimulatedBeatSource::default();
        for frame in 0..100 {
            beat.advance(frame as f64 * 16.0, false);
        }
        assert_eq!(beat.current_envelope(), 0.0);
    }

    #[test]
    fn bass_energy_averages_low_bins() {
        let mut bins = vec![0u8; 128];
        bins[..ANALYSER_BASS_BINS].fill(255);
        assert!((bass_energy(&bins) - 1.0).abs() < 1e-6);
        assert_eq!(bass_energy(&[]), 0.0);
        assert!((bass_energy(&[51, 51]) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn analyser_envelope_holds_peaks_then_decays() {
        let mut beat = AnalyserBeatSource::new();
        beat.feed(&[255; 32]);
        beat.advance(0.0, true);
        assert_eq!(beat.current_envelope(), 1.0);
        beat.feed(&[0; 32]);
        beat.advance(16.0, true);
        assert!((beat.current_envelope() - KICK_DECAY_PLAYING).abs() < 1e-6);
    }
}
