//! Tuning static played while a station switch is in flight
//!
//! Purely cosmetic feedback: a short looping static sound that fades in
//! when a switch starts and fades out when the new station becomes
//! audible (or the switch fails). Playback correctness never depends on
//! it. The effect is attenuated to a fixed fraction of the master volume
//! so the static never overwhelms actual content.

use std::time::Duration;
use tokio::time::Instant;

/// Fraction of master volume the static is allowed to reach
pub const TUNING_ATTENUATION: f32 = 0.3;

/// Fade-in/fade-out ramp length
const FADE: Duration = Duration::from_millis(250);

/// Gain ramp phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Silent,
    FadingIn { since_ms: u64 },
    Audible,
    FadingOut { since_ms: u64 },
}

/// Callback applying the effect gain to whatever renders the static loop
pub type GainSink = Box<dyn Fn(f32) + Send + Sync>;

/// Cosmetic tuning-static effect
///
/// Models the fade as a gain ramp sampled on demand, so there is no timer
/// task to race with the controller. `gain()` is monotone within a phase
/// and lands exactly on the phase target once the ramp elapses.
pub struct TuningEffect {
    master_volume: f32,
    phase: Phase,
    epoch: Instant,
    sink: Option<GainSink>,
}

impl TuningEffect {
    pub fn new() -> Self {
        Self {
            master_volume: 1.0,
            phase: Phase::Silent,
            epoch: Instant::now(),
            sink: None,
        }
    }

    /// Attach a render sink; called with the target gain on every change
    pub fn with_sink(mut self, sink: GainSink) -> Self {
        self.sink = Some(sink);
        self
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Begin fading the static in (no-op when already audible)
    pub fn start(&mut self) {
        match self.phase {
            Phase::Audible | Phase::FadingIn { .. } => {}
            Phase::Silent | Phase::FadingOut { .. } => {
                self.phase = Phase::FadingIn {
                    since_ms: self.now_ms(),
                };
            }
        }
        self.apply();
    }

    /// Begin fading the static out (no-op when already silent)
    pub fn stop(&mut self) {
        match self.phase {
            Phase::Silent | Phase::FadingOut { .. } => {}
            Phase::Audible | Phase::FadingIn { .. } => {
                self.phase = Phase::FadingOut {
                    since_ms: self.now_ms(),
                };
            }
        }
        self.apply();
    }

    /// Track the master volume; the static plays at a fixed attenuation
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
        self.apply();
    }

    /// Current effect gain, 0.0 ..= TUNING_ATTENUATION * master
    pub fn gain(&mut self) -> f32 {
        self.settle();
        let ceiling = TUNING_ATTENUATION * self.master_volume;
        match self.phase {
            Phase::Silent => 0.0,
            Phase::Audible => ceiling,
            Phase::FadingIn { since_ms } => ceiling * self.ramp_progress(since_ms),
            Phase::FadingOut { since_ms } => ceiling * (1.0 - self.ramp_progress(since_ms)),
        }
    }

    /// Whether the static is audible or ramping
    pub fn is_active(&mut self) -> bool {
        self.settle();
        !matches!(self.phase, Phase::Silent)
    }

    /// Promote a completed ramp to its terminal phase
    fn settle(&mut self) {
        let fade_ms = FADE.as_millis() as u64;
        match self.phase {
            Phase::FadingIn { since_ms } if self.now_ms() >= since_ms + fade_ms => {
                self.phase = Phase::Audible;
            }
            Phase::FadingOut { since_ms } if self.now_ms() >= since_ms + fade_ms => {
                self.phase = Phase::Silent;
            }
            _ => {}
        }
    }

    fn ramp_progress(&self, since_ms: u64) -> f32 {
        let elapsed = self.now_ms().saturating_sub(since_ms) as f32;
        (elapsed / FADE.as_millis() as f32).clamp(0.0, 1.0)
    }

    fn apply(&mut self) {
        if self.sink.is_some() {
            let gain = self.gain();
            if let Some(sink) = &self.sink {
                sink(gain);
            }
        }
    }
}

impl Default for TuningEffect {
    fn default() -> Self {
        Self::new()
    }
}
