// SPDX-License-Identifier: LGPL-3.0-or-later

//! Linear-phase Linkwitz-Riley crossover built from truncated IIR filters.
//!
//! A complex one-pole `1 / (1 - p z^-1)` is approximated by the product
//! `Π (1 + p^(2^i) z^-(2^i))` for `i` in `0..stage`, which is an FIR of
//! length `2^stage`. Running the time-reversed form of the same product
//! in front of the causal one yields a symmetric impulse response. Taking
//! `re + (re p / im p) im` of the complex output turns a conjugate pole
//! pair into a real two-pole section.
//!
//! Each section of the lowpass is one reversed and one forward two-pole
//! pass, each followed by the `(1 + z^-1)^2` numerator of the bilinear
//! transform. An order `4n` crossover uses `n` sections of a Butterworth
//! prototype of order `2n`; squaring it through the forward and reversed
//! passes gives the Linkwitz-Riley magnitude.
//!
//! The highpass band is the delayed input minus the lowpass output, so the
//! two bands always sum to the delayed input.
//!
//! # Examples
//! ```
//! use fxchain_dsp_units::filters::crossover::LinkwitzRileyFir2Band;
//!
//! let mut xover = LinkwitzRileyFir2Band::new();
//! xover.prepare(200.0 / 48000.0);
//! assert_eq!(xover.latency(), 257);
//!
//! let mut input = Vec::new();
//! for n in 0..1024 {
//!     let x = (n as f64 * 0.1).sin();
//!     input.push(x);
//!     let [low, high] = xover.process(x);
//!     let delayed = if n >= 257 { input[n - 257] } else { 0.0 };
//!     assert!((low + high - delayed).abs() < 1e-12);
//! }
//! ```

use std::f64::consts::PI;

use fxchain_dsp_lib::delay::FixedIntDelay;
use num_complex::Complex64;

/// Number of squaring stages. The truncated impulse response of each pole
/// is `2^DEFAULT_STAGE` samples long.
pub const DEFAULT_STAGE: usize = 8;

/// Default crossover order.
pub const DEFAULT_ORDER: usize = 4;

// ─── Truncated complex one-pole ────────────────────────────────────────────

/// Complex one-pole recursion truncated to `2^stage` taps, in causal and
/// time-reversed form.
#[derive(Debug, Clone)]
pub struct ComplexIir {
    /// `re p / im p`, used to fold the complex output into a real two-pole.
    re_per_im: f64,
    /// `p^(2^i)` for each stage.
    poles: Vec<Complex64>,
    /// Delay `i` holds `2^(i + 1)` samples.
    delays: Vec<FixedIntDelay<Complex64>>,
    x1: f64,
}

impl ComplexIir {
    /// `stage` of 0 is treated as 1.
    pub fn new(stage: usize) -> Self {
        let stage = stage.max(1);
        Self {
            re_per_im: 0.0,
            poles: vec![Complex64::new(0.0, 0.0); stage],
            delays: (1..stage).map(|i| FixedIntDelay::new(1 << i)).collect(),
            x1: 0.0,
        }
    }

    pub fn stage(&self) -> usize {
        self.poles.len()
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.delays.iter_mut().for_each(FixedIntDelay::reset);
    }

    pub fn prepare(&mut self, mut pole: Complex64) {
        self.re_per_im = pole.re / pole.im;
        for value in self.poles.iter_mut() {
            *value = pole;
            pole *= pole;
        }
    }

    #[inline]
    pub fn process_1pole_forward(&mut self, x0: f64) -> Complex64 {
        let mut sig = x0 + self.poles[0] * self.x1;
        self.x1 = x0;
        for (pole, delay) in self.poles[1..].iter().zip(self.delays.iter_mut()) {
            sig += pole * delay.process(sig);
        }
        sig
    }

    #[inline]
    pub fn process_1pole_reversed(&mut self, x0: f64) -> Complex64 {
        let mut sig = self.poles[0] * x0 + self.x1;
        self.x1 = x0;
        for (pole, delay) in self.poles[1..].iter().zip(self.delays.iter_mut()) {
            sig = pole * sig + delay.process(sig);
        }
        sig
    }

    #[inline]
    pub fn process_2pole_forward(&mut self, x0: f64) -> f64 {
        let sig = self.process_1pole_forward(x0);
        sig.re + self.re_per_im * sig.im
    }

    #[inline]
    pub fn process_2pole_reversed(&mut self, x0: f64) -> f64 {
        let sig = self.process_1pole_reversed(x0);
        sig.re + self.re_per_im * sig.im
    }
}

// ─── Lowpass ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Section {
    reverse: ComplexIir,
    forward: ComplexIir,
    u: [f64; 2],
    v: [f64; 2],
}

impl Section {
    fn new(stage: usize) -> Self {
        Self {
            reverse: ComplexIir::new(stage),
            forward: ComplexIir::new(stage),
            u: [0.0; 2],
            v: [0.0; 2],
        }
    }

    fn reset(&mut self) {
        self.reverse.reset();
        self.forward.reset();
        self.u = [0.0; 2];
        self.v = [0.0; 2];
    }
}

/// Linear-phase Linkwitz-Riley lowpass.
#[derive(Debug, Clone)]
pub struct LinkwitzRileyFir {
    sections: Vec<Section>,
    stage: usize,
    gain: f64,
}

impl Default for LinkwitzRileyFir {
    fn default() -> Self {
        Self::with_order(DEFAULT_ORDER, DEFAULT_STAGE)
    }
}

impl LinkwitzRileyFir {
    pub fn new() -> Self {
        Self::default()
    }

    /// `order` is rounded down to a multiple of 4, minimum 4.
    pub fn with_order(order: usize, stage: usize) -> Self {
        let n_section = (order / 4).max(1);
        let stage = stage.max(1);
        Self {
            sections: (0..n_section).map(|_| Section::new(stage)).collect(),
            stage,
            gain: 1.0,
        }
    }

    pub fn order(&self) -> usize {
        4 * self.sections.len()
    }

    /// Group delay in samples.
    pub fn latency(&self) -> usize {
        self.sections.len() * ((1 << self.stage) + 1)
    }

    pub fn reset(&mut self) {
        self.sections.iter_mut().for_each(Section::reset);
    }

    /// Set the -6 dB frequency. `normalized_crossover` is in cycles per
    /// sample. Does not allocate.
    pub fn prepare(&mut self, normalized_crossover: f64) {
        let n_section = self.sections.len();
        let butterworth_order = 2 * n_section;
        let cutoff_radian = 2.0 * PI * normalized_crossover;

        let mut gain = 1.0;
        for (idx, section) in self.sections.iter_mut().enumerate() {
            let m = (2 * idx) as f64 - butterworth_order as f64 + 1.0;
            let analog =
                cutoff_radian * Complex64::from_polar(-1.0, PI * m / (2 * butterworth_order) as f64);
            let pole = (2.0 + analog) / (2.0 - analog);
            section.reverse.prepare(pole);
            section.forward.prepare(pole);
            gain *= (1.0 - 2.0 * pole.re + pole.norm_sqr()) / 4.0;
        }
        self.gain = gain.powf(1.0 / n_section as f64);
    }

    #[inline]
    pub fn process(&mut self, mut x0: f64) -> f64 {
        for s in self.sections.iter_mut() {
            let u0 = s.reverse.process_2pole_reversed(x0 * self.gain);
            x0 = u0 + 2.0 * s.u[0] + s.u[1];
            s.u = [u0, s.u[0]];

            let v0 = s.forward.process_2pole_forward(x0 * self.gain);
            x0 = v0 + 2.0 * s.v[0] + s.v[1];
            s.v = [v0, s.v[0]];
        }
        x0
    }
}

// ─── Two-band split ────────────────────────────────────────────────────────

/// Splits a signal into `[low, high]` bands that sum to the input delayed
/// by [`latency`](Self::latency) samples.
#[derive(Debug, Clone)]
pub struct LinkwitzRileyFir2Band {
    lowpass: LinkwitzRileyFir,
    highpass_delay: FixedIntDelay<f64>,
}

impl Default for LinkwitzRileyFir2Band {
    fn default() -> Self {
        Self::with_order(DEFAULT_ORDER, DEFAULT_STAGE)
    }
}

impl LinkwitzRileyFir2Band {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: usize, stage: usize) -> Self {
        let lowpass = LinkwitzRileyFir::with_order(order, stage);
        let highpass_delay = FixedIntDelay::new(lowpass.latency());
        Self {
            lowpass,
            highpass_delay,
        }
    }

    pub fn latency(&self) -> usize {
        self.lowpass.latency()
    }

    pub fn reset(&mut self) {
        self.lowpass.reset();
        self.highpass_delay.reset();
    }

    pub fn prepare(&mut self, normalized_crossover: f64) {
        self.lowpass.prepare(normalized_crossover);
    }

    #[inline]
    pub fn process(&mut self, x0: f64) -> [f64; 2] {
        let low = self.lowpass.process(x0);
        let high = self.highpass_delay.process(x0) - low;
        [low, high]
    }
}
