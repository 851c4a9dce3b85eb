// SPDX-License-Identifier: LGPL-3.0-or-later

//! First-order allpass cascades and the polyphase half-band IIR.
//!
//! The half-band filter is two allpass paths running at the base rate. As
//! a decimator it takes two consecutive high-rate samples and averages
//! the path outputs. As an interpolator it feeds one sample through both
//! paths and emits the pair.
//!
//! ```text
//!   section i:  y[i] = a[i] * (in - y[i]) + x[i]
//!               x[i] = in
//! ```
//!
//! # Examples
//! ```
//! use fxchain_dsp_lib::allpass::HalfBandIir;
//!
//! let mut up = HalfBandIir::new();
//! let mut down = HalfBandIir::new();
//! let mut y = 0.0;
//! for _ in 0..4096 {
//!     let pair = up.process_up(1.0);
//!     y = down.process(pair);
//! }
//! assert!((y - 1.0).abs() < 1e-6);
//! ```

use crate::coeffs::{HALF_BAND_PATH0, HALF_BAND_PATH1};

/// Cascade of `N` first-order allpass sections.
#[derive(Debug, Clone, Copy)]
pub struct FirstOrderAllpassSections<const N: usize> {
    x: [f64; N],
    y: [f64; N],
}

impl<const N: usize> Default for FirstOrderAllpassSections<N> {
    fn default() -> Self {
        Self {
            x: [0.0; N],
            y: [0.0; N],
        }
    }
}

impl<const N: usize> FirstOrderAllpassSections<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.x.fill(0.0);
        self.y.fill(0.0);
    }

    #[inline]
    pub fn process(&mut self, mut input: f64, a: &[f64; N]) -> f64 {
        for i in 0..N {
            self.y[i] = a[i] * (input - self.y[i]) + self.x[i];
            self.x[i] = input;
            input = self.y[i];
        }
        input
    }
}

/// Two-path half-band IIR for 2x rate conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfBandIir {
    ap0: FirstOrderAllpassSections<8>,
    ap1: FirstOrderAllpassSections<8>,
}

impl HalfBandIir {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.ap0.reset();
        self.ap1.reset();
    }

    /// Decimate two high-rate samples into one. `input[0]` is the earlier
    /// sample.
    #[inline]
    pub fn process(&mut self, input: [f64; 2]) -> f64 {
        let s0 = self.ap0.process(input[0], &HALF_BAND_PATH0);
        let s1 = self.ap1.process(input[1], &HALF_BAND_PATH1);
        0.5 * (s0 + s1)
    }

    /// Interpolate one sample into two high-rate samples, earlier first.
    #[inline]
    pub fn process_up(&mut self, input: f64) -> [f64; 2] {
        [
            self.ap1.process(input, &HALF_BAND_PATH1),
            self.ap0.process(input, &HALF_BAND_PATH0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_allpass_preserves_energy() {
        let a = [0.3, -0.5, 0.8];
        let mut ap = FirstOrderAllpassSections::<3>::new();
        let mut energy = 0.0;
        for n in 0..8192 {
            let y = ap.process(if n == 0 { 1.0 } else { 0.0 }, &a);
            energy += y * y;
        }
        assert_approx_eq!(f64, energy, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_allpass_zero_coefficients_delay_by_section_count() {
        let a = [0.0; 4];
        let mut ap = FirstOrderAllpassSections::<4>::new();
        let out: Vec<f64> = (0..6)
            .map(|n| ap.process(if n == 0 { 1.0 } else { 0.0 }, &a))
            .collect();
        assert_eq!(out, vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_half_band_decimator_passes_dc() {
        let mut hb = HalfBandIir::new();
        let mut y = 0.0;
        for _ in 0..4096 {
            y = hb.process([1.0, 1.0]);
        }
        assert_approx_eq!(f64, y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_half_band_decimator_rejects_nyquist() {
        let mut hb = HalfBandIir::new();
        let mut peak: f64 = 0.0;
        for n in 0..8192 {
            let y = hb.process([1.0, -1.0]);
            if n > 4096 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 1e-4, "peak {peak}");
    }

    #[test]
    fn test_reset_clears_both_paths() {
        let mut hb = HalfBandIir::new();
        for _ in 0..32 {
            hb.process_up(1.0);
        }
        hb.reset();
        assert_eq!(hb.process_up(0.0), [0.0, 0.0]);
    }
}
