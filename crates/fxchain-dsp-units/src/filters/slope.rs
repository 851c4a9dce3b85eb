// SPDX-License-Identifier: LGPL-3.0-or-later

//! Spectral tilt from a cascade of first-order matched high shelves.
//!
//! Each stage is a one-pole shelf whose magnitude is matched to the
//! analog prototype up to Nyquist (M. Vicanek, "Matched One-Pole Digital
//! Shelving Filters"). Stage `i` starts at `start_hz * 2^i` for a high
//! shelf or `start_hz / 2^i` for a low shelf, and every stage adds the
//! same gain. The sum is a tilt of `slope_db` per octave over the span of
//! the cascade.
//!
//! The low-shelf configuration is built from high shelves with inverted
//! gain, then normalized by the product of their Nyquist gains so the top
//! of the spectrum stays at 0 dB.
//!
//! # Examples
//! ```
//! use fxchain_dsp_units::filters::slope::{SlopeFilter, SlopeFilterParams};
//!
//! let mut tilt = SlopeFilter::<12>::new();
//! tilt.reset(&SlopeFilterParams {
//!     sample_rate: 48000.0,
//!     start_hz: 100.0,
//!     slope_db: 0.0,
//!     output_gain: 1.0,
//!     highshelf: true,
//! });
//! assert!((tilt.process(0.5) - 0.5).abs() < 1e-12);
//! ```

use fxchain_dsp_lib::float::db_to_amp;
use fxchain_dsp_lib::smoother::SmoothingMode;

/// Per-sample smoothing coefficient for shelf coefficients and output
/// gain. Independent of the sample rate.
pub const COEFFICIENT_KP: f64 = 0.0013081403895582485;

const MIN_CUTOFF: f64 = 10.0 / 48000.0;
const MAX_CUTOFF: f64 = 20000.0 / 44100.0;

// 1 - cos(0.9 π).
const PHI_M: f64 = 1.9510565162951536;

/// First-order matched high shelf with smoothed coefficients.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchedHighShelf1 {
    /// Target `[b0, b1, -a1]`.
    target: [f64; 3],
    /// Current `[b0, b1, -a1]`.
    current: [f64; 3],
    x1: f64,
    y1: f64,
}

impl MatchedHighShelf1 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gain at Nyquist of the target response.
    pub fn nyquist_gain(&self) -> f64 {
        (self.target[0] - self.target[1]) / (1.0 + self.target[2])
    }

    /// Set target coefficients. Cutoffs outside the usable range are
    /// clamped and the stage becomes flat.
    pub fn push(&mut self, cutoff_normalized: f64, gain_amp: f64) {
        let (cutoff, gain) = if cutoff_normalized < MIN_CUTOFF {
            (MIN_CUTOFF, 1.0)
        } else if cutoff_normalized > MAX_CUTOFF {
            (MAX_CUTOFF, 1.0)
        } else {
            (cutoff_normalized, gain_amp)
        };

        let pp = 2.0 / (std::f64::consts::PI * std::f64::consts::PI);
        let xi = pp / (PHI_M * PHI_M) - 1.0 / PHI_M;

        let fc2 = cutoff * cutoff / 4.0;
        let alpha = xi + pp / (gain * fc2);
        let beta = xi + pp * gain / fc2;

        let neg_a1 = alpha / (1.0 + alpha + (1.0 + 2.0 * alpha).sqrt());
        let b = -beta / (1.0 + beta + (1.0 + 2.0 * beta).sqrt());
        let b0 = (1.0 - neg_a1) / (1.0 + b);
        self.target = [b0, b * b0, neg_a1];
    }

    /// Snap coefficients to the new target and clear state.
    pub fn reset(&mut self, cutoff_normalized: f64, gain_amp: f64) {
        self.push(cutoff_normalized, gain_amp);
        self.current = self.target;
        self.x1 = 0.0;
        self.y1 = 0.0;
    }

    #[inline]
    pub fn process(&mut self, x0: f64) -> f64 {
        for (v, t) in self.current.iter_mut().zip(self.target.iter()) {
            *v += COEFFICIENT_KP * (t - *v);
        }
        let [b0, b1, neg_a1] = self.current;
        let y0 = b0 * x0 + b1 * self.x1 + neg_a1 * self.y1;
        self.x1 = x0;
        self.y1 = y0;
        y0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeFilterParams {
    pub sample_rate: f64,
    pub start_hz: f64,
    /// Gain per octave in dB.
    pub slope_db: f64,
    /// Linear output gain.
    pub output_gain: f64,
    /// `true` tilts upward from `start_hz`, `false` tilts the range below
    /// it.
    pub highshelf: bool,
}

/// `N` matched shelves one octave apart.
#[derive(Debug, Clone, Copy)]
pub struct SlopeFilter<const N: usize> {
    filters: [MatchedHighShelf1; N],
    gain_target: f64,
    gain: f64,
}

impl<const N: usize> Default for SlopeFilter<N> {
    fn default() -> Self {
        Self {
            filters: [MatchedHighShelf1::default(); N],
            gain_target: 1.0,
            gain: 1.0,
        }
    }
}

impl<const N: usize> SlopeFilter<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inverse of the product of stage Nyquist gains.
    fn lowshelf_gain(&self) -> f64 {
        let gain: f64 = self.filters.iter().map(MatchedHighShelf1::nyquist_gain).product();
        1.0 / gain.max(f64::EPSILON)
    }

    pub fn apply(&mut self, mode: SmoothingMode, params: &SlopeFilterParams) {
        let (gain_amp, step) = if params.highshelf {
            (db_to_amp(params.slope_db), 2.0)
        } else {
            (db_to_amp(-params.slope_db), 0.5)
        };

        let mut cutoff = params.start_hz / params.sample_rate;
        for filter in self.filters.iter_mut() {
            match mode {
                SmoothingMode::Reset => filter.reset(cutoff, gain_amp),
                SmoothingMode::Push => filter.push(cutoff, gain_amp),
            }
            cutoff *= step;
        }

        self.gain_target = if params.highshelf {
            params.output_gain
        } else {
            params.output_gain * self.lowshelf_gain()
        };
        if mode == SmoothingMode::Reset {
            self.gain = self.gain_target;
        }
    }

    pub fn reset(&mut self, params: &SlopeFilterParams) {
        self.apply(SmoothingMode::Reset, params);
    }

    pub fn push(&mut self, params: &SlopeFilterParams) {
        self.apply(SmoothingMode::Push, params);
    }

    #[inline]
    pub fn process(&mut self, mut x0: f64) -> f64 {
        for filter in self.filters.iter_mut() {
            x0 = filter.process(x0);
        }
        self.gain += COEFFICIENT_KP * (self.gain_target - self.gain);
        self.gain * x0
    }
}
