// SPDX-License-Identifier: LGPL-3.0-or-later

//! Cascade of second-order sections over a fixed coefficient table.
//!
//! Each section computes
//! ```text
//!   y0 = b0*x0 + b1*x1 + b2*x2 - a1*y1 - a2*y2
//! ```
//! and feeds `y0` to the next section. Section 0 runs first.
//!
//! # Examples
//! ```
//! use fxchain_dsp_lib::coeffs::SOS_HALF_HIGHPASS;
//! use fxchain_dsp_lib::sos::SosFilter;
//!
//! let mut hp = SosFilter::new(&SOS_HALF_HIGHPASS);
//! let y = hp.process(1.0);
//! assert!(y.is_finite());
//! ```

/// Biquad cascade with `N` sections.
#[derive(Debug, Clone)]
pub struct SosFilter<const N: usize> {
    co: &'static [[f64; 5]; N],
    x1: [f64; N],
    x2: [f64; N],
    y1: [f64; N],
    y2: [f64; N],
}

impl<const N: usize> SosFilter<N> {
    /// Create a cascade over `co`, rows ordered `[b0, b1, b2, a1, a2]`.
    pub fn new(co: &'static [[f64; 5]; N]) -> Self {
        Self {
            co,
            x1: [0.0; N],
            x2: [0.0; N],
            y1: [0.0; N],
            y2: [0.0; N],
        }
    }

    /// Zero all section history.
    pub fn reset(&mut self) {
        self.x1.fill(0.0);
        self.x2.fill(0.0);
        self.y1.fill(0.0);
        self.y2.fill(0.0);
    }

    #[inline]
    pub fn process(&mut self, mut input: f64) -> f64 {
        for (i, &[b0, b1, b2, a1, a2]) in self.co.iter().enumerate() {
            let y0 = b0 * input + b1 * self.x1[i] + b2 * self.x2[i] - a1 * self.y1[i] - a2 * self.y2[i];

            self.x2[i] = self.x1[i];
            self.x1[i] = input;
            self.y2[i] = self.y1[i];
            self.y1[i] = y0;

            input = y0;
        }
        input
    }

    pub fn sections(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coeffs::{
        SOS_DECIMATION_16, SOS_HALF_HIGHPASS, SOS_ONE_THIRD_BANDPASS, SOS_ONE_THIRD_LOWPASS,
    };

    /// Energy of the impulse response in `[from, to)`.
    fn impulse_energy<const N: usize>(filter: &mut SosFilter<N>, from: usize, to: usize) -> f64 {
        filter.reset();
        let mut energy = 0.0;
        for n in 0..to {
            let y = filter.process(if n == 0 { 1.0 } else { 0.0 });
            assert!(y.is_finite());
            if n >= from {
                energy += y * y;
            }
        }
        energy
    }

    fn assert_decays<const N: usize>(table: &'static [[f64; 5]; N]) {
        let mut filter = SosFilter::new(table);
        let head = impulse_energy(&mut filter, 0, 4096);
        let tail = impulse_energy(&mut filter, 16384, 32768);
        assert!(head > 0.0);
        assert!(tail < head * 1e-12, "tail {tail} head {head}");
    }

    #[test]
    fn test_impulse_response_decays_for_all_tables() {
        assert_decays(&SOS_ONE_THIRD_LOWPASS);
        assert_decays(&SOS_ONE_THIRD_BANDPASS);
        assert_decays(&SOS_HALF_HIGHPASS);
        assert_decays(&SOS_DECIMATION_16);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut filter = SosFilter::new(&SOS_ONE_THIRD_LOWPASS);
        for _ in 0..100 {
            filter.process(1.0);
        }
        filter.reset();
        assert_eq!(filter.process(0.0), 0.0);
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = SosFilter::new(&SOS_DECIMATION_16);
        let mut y = 0.0;
        for _ in 0..4096 {
            y = filter.process(1.0);
        }
        assert!((y - 1.0).abs() < 1e-9);
        assert_eq!(filter.sections(), 6);
    }
}
