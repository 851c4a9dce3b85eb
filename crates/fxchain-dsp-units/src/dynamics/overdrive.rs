// SPDX-License-Identifier: LGPL-3.0-or-later

//! Peak-hold overdrive family.
//!
//! Every variant follows the same outline:
//!
//! 1. A forward peak hold tracks `|x|`, holding each new peak for
//!    `hold_seconds` (some variants add a spike on the first sample)
//! 2. The held peak becomes a gain through a shape function
//! 3. An SVF lowpass smooths that gain
//! 4. The smoothed gain multiplies the input, or a delayed copy of it
//!    plus `erf(x)`
//!
//! The character amount plays a different role per variant: spike height,
//! hard-clip threshold, cutoff modulation depth or polynomial drive.
//!
//! # Examples
//! ```
//! use fxchain_dsp_lib::smoother::EmaFilter;
//! use fxchain_dsp_units::dynamics::overdrive::{BadLimiter, BadLimiterParams, OverDriveType};
//!
//! let params = BadLimiterParams {
//!     sample_rate: 48000.0,
//!     hold_seconds: 0.001,
//!     q: std::f64::consts::FRAC_1_SQRT_2,
//!     character_amp: 1.0,
//! };
//! let mut od = BadLimiter::new();
//! od.resize(4800);
//! od.reset(&params);
//!
//! let kp = EmaFilter::second_to_p(48000.0, 0.1);
//! let y = od.process(0.5, OverDriveType::Matched, kp);
//! assert!(y.is_finite());
//! ```

use fxchain_dsp_lib::delay::Delay;
use fxchain_dsp_lib::interpolation::cubic_interp;
use fxchain_dsp_lib::smoother::{ExpSmoother, SmoothingMode};
use fxchain_dsp_lib::svf::SvfLowpass;

/// Overdrive variant, in parameter index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverDriveType {
    /// Sigmoid gain from the held peak, spike added on new peaks.
    #[default]
    Immediate,
    /// As `Immediate`, applied to `delayed + erf(x)`.
    Matched,
    /// Hard-clip gain applied to `delayed + erf(x)`.
    BadLimiter,
    /// Smoothed peak drives a polynomial soft clip.
    PolyDrive,
    /// New peaks are pulled down hard, gating the gain.
    HardGate,
    /// Spike added on top of the held peak.
    Spike,
    /// Spike placed between samples with cubic interpolation.
    SpikeCubic,
    /// Input modulates the SVF cutoff.
    CutoffMod,
}

impl OverDriveType {
    pub const ALL: [OverDriveType; 8] = [
        OverDriveType::Immediate,
        OverDriveType::Matched,
        OverDriveType::BadLimiter,
        OverDriveType::PolyDrive,
        OverDriveType::HardGate,
        OverDriveType::Spike,
        OverDriveType::SpikeCubic,
        OverDriveType::CutoffMod,
    ];

    /// Indices past the last variant fall back to `Immediate`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Whether the variant reads the hold delay line.
    pub fn uses_delay(self) -> bool {
        matches!(
            self,
            OverDriveType::Matched | OverDriveType::BadLimiter | OverDriveType::PolyDrive
        )
    }
}

// ─── Shapes ────────────────────────────────────────────────────────────────

/// `1 + erf(peak) * (1/peak - 1)`. Close to 1 for small peaks, close to
/// `1/peak` for large ones. Zero below machine epsilon.
#[inline]
pub fn gain_sigmoid(peak: f64) -> f64 {
    if peak < f64::EPSILON {
        return 0.0;
    }
    1.0 + libm::erf(peak) * (1.0 / peak - 1.0)
}

/// `threshold / peak` above `threshold`, else 1.
#[inline]
pub fn gain_hard_clip(peak: f64, threshold: f64) -> f64 {
    if peak > threshold {
        threshold / peak
    } else {
        1.0
    }
}

/// Odd polynomial soft clip. `ratio` in `[0, 1]` blends from the
/// saturating curve (0) to identity (1).
#[inline]
pub fn poly_drive(x0: f64, ratio: f64) -> f64 {
    const A1: f64 = 0.761468168789663;
    const A2: f64 = 0.4497752742394532;
    const A3: f64 = -0.520876400831698;
    const A4: f64 = 0.11531086075727837;

    let p1 = A1 + ratio * (1.0 - A1);
    let p2 = A2 - ratio * A2;
    let p3 = A3 - ratio * A3;
    let p4 = A4 - ratio * A4;

    let x = x0.abs();
    (x * (p1 + x * (p2 + x * (p3 + x * p4)))).copysign(x0)
}

// ─── Peak hold ─────────────────────────────────────────────────────────────

/// Forward peak hold with the spike variants used by [`BadLimiter`].
///
/// A new peak is taken when the input exceeds the held value or the hold
/// time runs out. The sample count since the last new peak is `counter`;
/// it is 0 on the sample where a peak was taken.
#[derive(Debug, Clone, Copy)]
pub struct PeakHold {
    hold_value: f64,
    counter: usize,
    hold_samples: usize,
    previous_peak: f64,
    fractional_delay: f64,
    cubic_buffer: [f64; 4],
}

impl Default for PeakHold {
    fn default() -> Self {
        Self {
            hold_value: 0.0,
            counter: 0,
            hold_samples: 1024,
            previous_peak: 0.0,
            fractional_delay: 0.0,
            cubic_buffer: [0.0; 4],
        }
    }
}

impl PeakHold {
    pub fn reset(&mut self, hold_samples: usize) {
        *self = Self {
            hold_samples,
            ..Self::default()
        };
    }

    #[inline]
    fn retrigger(&mut self, absed: f64) -> bool {
        self.counter += 1;
        if self.counter > self.hold_samples || self.hold_value < absed {
            self.counter = 0;
            return true;
        }
        false
    }

    /// Holds `absed - spike`; the spike is added back on the trigger sample.
    #[inline]
    pub fn forward(&mut self, absed: f64, spike: f64) -> f64 {
        if self.retrigger(absed) {
            self.hold_value = absed - spike;
        }
        if self.counter == 0 {
            self.hold_value + spike
        } else {
            self.hold_value
        }
    }

    /// Holds `absed`; the spike is added on the trigger sample only.
    #[inline]
    pub fn forward_spike(&mut self, absed: f64, spike: f64) -> f64 {
        if self.retrigger(absed) {
            self.hold_value = absed;
        }
        if self.counter == 0 {
            self.hold_value + spike
        } else {
            self.hold_value
        }
    }

    /// As [`forward_spike`](Self::forward_spike), with the spike
    /// interpolated at a fractional position derived from the rise of the
    /// peak.
    #[inline]
    pub fn forward_spike_cubic(&mut self, absed: f64, spike: f64) -> f64 {
        if self.retrigger(absed) {
            self.hold_value = absed;
            self.fractional_delay = if absed > f64::EPSILON {
                ((self.hold_value - self.previous_peak) / absed).clamp(0.0, 1.0)
            } else {
                1.0
            };
        }
        self.previous_peak = absed;

        self.cubic_buffer.rotate_right(1);
        self.cubic_buffer[0] = if self.counter == 0 { spike } else { 0.0 };

        self.hold_value + cubic_interp(&self.cubic_buffer, self.fractional_delay)
    }

    /// Holds `absed - 1000 * spike`, which drives the sigmoid gain to its
    /// closed state for loud spikes.
    #[inline]
    pub fn forward_hard_gate(&mut self, absed: f64, spike: f64) -> f64 {
        if self.retrigger(absed) {
            self.hold_value = absed - 1000.0 * spike;
        }
        self.hold_value
    }
}

// ─── Overdrive ─────────────────────────────────────────────────────────────

/// Settings shared by every [`BadLimiter`] variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadLimiterParams {
    pub sample_rate: f64,
    pub hold_seconds: f64,
    pub q: f64,
    /// Spike height, clip threshold or drive depending on the variant.
    pub character_amp: f64,
}

/// Peak-hold overdrive. The variant is chosen per call.
#[derive(Debug, Clone, Default)]
pub struct BadLimiter {
    hold: PeakHold,
    amp: ExpSmoother,
    delay_time: ExpSmoother,
    svf: SvfLowpass,
    delay: Delay,
}

impl BadLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the hold delay line. Call before processing.
    pub fn resize(&mut self, max_delay_samples: usize) {
        self.delay.resize(max_delay_samples);
    }

    pub fn apply(&mut self, mode: SmoothingMode, params: &BadLimiterParams) {
        let hold_frames = params.sample_rate * params.hold_seconds;
        if mode == SmoothingMode::Reset {
            self.hold.reset(hold_frames as usize);
            self.delay.reset();
        }
        self.amp.apply(mode, params.character_amp);
        self.delay_time.apply(mode, hold_frames);
        self.svf
            .apply(mode, params.sample_rate, params.hold_seconds, params.q);
    }

    /// Clear state and snap all parameters.
    pub fn reset(&mut self, params: &BadLimiterParams) {
        self.apply(SmoothingMode::Reset, params);
    }

    /// Glide toward new parameters. The hold length stays as set by the
    /// last [`reset`](Self::reset).
    pub fn push(&mut self, params: &BadLimiterParams) {
        self.apply(SmoothingMode::Push, params);
    }

    #[inline]
    pub fn process(&mut self, x0: f64, kind: OverDriveType, kp: f64) -> f64 {
        let absed = x0.abs();
        match kind {
            OverDriveType::Immediate => {
                let peak = self.hold.forward(absed, self.amp.process(kp));
                self.svf.process(gain_sigmoid(peak), kp).abs() * x0
            }
            OverDriveType::HardGate => {
                let peak = self.hold.forward_hard_gate(absed, self.amp.process(kp));
                self.svf.process(gain_sigmoid(peak), kp).abs() * x0
            }
            OverDriveType::Spike => {
                let peak = self.hold.forward_spike(absed, self.amp.process(kp));
                self.svf.process(gain_sigmoid(peak), kp).abs() * x0
            }
            OverDriveType::SpikeCubic => {
                let peak = self.hold.forward_spike_cubic(absed, self.amp.process(kp));
                self.svf.process(gain_sigmoid(peak), kp).abs() * x0
            }
            OverDriveType::CutoffMod => {
                let peak = self.hold.forward_spike(absed, 0.0);
                let depth = x0 * self.amp.process(kp);
                self.svf
                    .process_mod(gain_sigmoid(peak), depth, 1.0, kp)
                    .abs()
                    * x0
            }
            OverDriveType::Matched => {
                let peak = self.hold.forward(absed, self.amp.process(kp));
                let smoothed = self.svf.process(gain_sigmoid(peak), kp).abs();
                smoothed * (self.delayed(x0, kp) + libm::erf(x0))
            }
            OverDriveType::BadLimiter => {
                let peak = self.hold.forward(absed, 0.0);
                let gain = gain_hard_clip(peak, self.amp.process(kp));
                let smoothed = self.svf.process(gain, kp).abs();
                smoothed * (self.delayed(x0, kp) + libm::erf(x0))
            }
            OverDriveType::PolyDrive => {
                let peak = self.hold.forward(absed, 0.0);
                let smoothed = self.svf.process(peak, kp).abs();
                let delayed = self.delayed(x0, kp);
                let ratio = (smoothed - 1.0).clamp(0.0, 1.0);
                poly_drive(self.amp.process(kp) * (delayed + libm::erf(x0)), ratio)
            }
        }
    }

    #[inline]
    fn delayed(&mut self, x0: f64, kp: f64) -> f64 {
        let time = self.delay_time.process(kp);
        self.delay.process(x0, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    fn params(character_amp: f64) -> BadLimiterParams {
        BadLimiterParams {
            sample_rate: 48000.0,
            hold_seconds: 0.001,
            q: FRAC_1_SQRT_2,
            character_amp,
        }
    }

    fn limiter(character_amp: f64) -> BadLimiter {
        let mut od = BadLimiter::new();
        od.resize(4800);
        od.reset(&params(character_amp));
        od
    }

    #[test]
    fn test_type_from_index() {
        for (i, t) in OverDriveType::ALL.iter().enumerate() {
            assert_eq!(OverDriveType::from_index(i), *t);
        }
        assert_eq!(OverDriveType::from_index(8), OverDriveType::Immediate);
        assert!(OverDriveType::Matched.uses_delay());
        assert!(!OverDriveType::Spike.uses_delay());
    }

    #[test]
    fn test_gain_sigmoid_limits() {
        assert_eq!(gain_sigmoid(0.0), 0.0);
        // Slope of erf at 0 is 2/sqrt(pi).
        assert_approx_eq!(f64, gain_sigmoid(1e-9), 1.0 + 2.0 / PI.sqrt(), epsilon = 1e-6);
        assert_approx_eq!(f64, gain_sigmoid(10.0), 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_gain_hard_clip() {
        assert_eq!(gain_hard_clip(0.5, 1.0), 1.0);
        assert_eq!(gain_hard_clip(4.0, 1.0), 0.25);
    }

    #[test]
    fn test_poly_drive_is_odd_and_identity_at_full_ratio() {
        for &x in &[0.1, 0.5, 0.9] {
            assert_eq!(poly_drive(-x, 0.3), -poly_drive(x, 0.3));
            assert_approx_eq!(f64, poly_drive(x, 1.0), x, epsilon = 1e-15);
        }
        assert_approx_eq!(f64, poly_drive(1.0, 0.0), 0.805, epsilon = 0.01);
    }

    #[test]
    fn test_peak_hold_holds_then_releases() {
        let mut hold = PeakHold::default();
        hold.reset(4);
        assert_eq!(hold.forward(1.0, 0.0), 1.0);
        for _ in 0..4 {
            assert_eq!(hold.forward(0.1, 0.0), 1.0);
        }
        // Hold time exceeded, new peak taken from the current input.
        assert_eq!(hold.forward(0.1, 0.0), 0.1);
    }

    #[test]
    fn test_peak_hold_spike_on_trigger_sample_only() {
        let mut hold = PeakHold::default();
        hold.reset(100);
        assert_eq!(hold.forward_spike(0.5, 0.25), 0.75);
        assert_eq!(hold.forward_spike(0.2, 0.25), 0.5);
    }

    #[test]
    fn test_hard_gate_pulls_hold_down() {
        let mut hold = PeakHold::default();
        hold.reset(100);
        assert_eq!(hold.forward_hard_gate(0.5, 0.001), -0.5);
    }

    #[test]
    fn test_every_type_silent_for_silence() {
        for kind in OverDriveType::ALL {
            let mut od = limiter(1.0);
            for _ in 0..512 {
                assert_eq!(od.process(0.0, kind, 0.01), 0.0, "{kind:?}");
            }
        }
    }

    #[test]
    fn test_every_type_finite_for_loud_input() {
        for kind in OverDriveType::ALL {
            let mut od = limiter(2.0);
            for n in 0..4096 {
                let x = 100.0 * ((n as f64) * 0.05).sin();
                assert!(od.process(x, kind, 0.01).is_finite(), "{kind:?}");
            }
        }
    }

    #[test]
    fn test_immediate_compresses_loud_sine() {
        let mut od = limiter(0.0);
        let mut peak: f64 = 0.0;
        for n in 0..48000 {
            let x = 10.0 * (std::f64::consts::TAU * 100.0 / 48000.0 * n as f64).sin();
            let y = od.process(x, OverDriveType::Immediate, 0.01);
            if n > 24000 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 2.0, "peak {peak}");
        assert!(peak > 0.5, "peak {peak}");
    }

    #[test]
    fn test_push_keeps_hold_state() {
        let mut od = limiter(1.0);
        for _ in 0..16 {
            od.process(0.5, OverDriveType::Spike, 0.01);
        }
        let mut other = od.clone();
        other.push(&params(0.5));
        od.process(0.5, OverDriveType::Spike, 0.0);
        other.process(0.5, OverDriveType::Spike, 0.0);
        // kp = 0 freezes every smoother, so a push changes nothing yet.
        assert_eq!(
            od.process(0.5, OverDriveType::Spike, 0.0),
            other.process(0.5, OverDriveType::Spike, 0.0)
        );
    }
}
