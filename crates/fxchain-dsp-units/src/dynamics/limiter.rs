// SPDX-License-Identifier: LGPL-3.0-or-later

//! Lookahead brickwall limiter.
//!
//! # Algorithm
//!
//! 1. A sliding maximum over the last `attack + 1` samples of `|x|` gives
//!    the peak that the gain has to respect
//! 2. The candidate gain is `threshold / peak` above threshold, else 1
//! 3. Gain drops to the candidate immediately and recovers toward it with
//!    a one-pole release
//! 4. Two boxcar averages of lengths `attack/2` and `attack/2 + 1` smooth
//!    the gain over exactly `attack` samples
//! 5. The smoothed gain multiplies the input delayed by `attack` samples
//!
//! Every gain value inside the smoothing span was computed from a window
//! containing the delayed sample, so the output stays at or below the
//! threshold.
//!
//! # Example
//!
//! ```
//! use fxchain_dsp_units::dynamics::limiter::BasicLimiter;
//!
//! let mut limiter = BasicLimiter::new();
//! limiter.resize(480);
//! limiter.prepare(48000.0, 0.001, 0.05, 1.0);
//! assert_eq!(limiter.latency(1), 48);
//!
//! for n in 0..4800 {
//!     let y = limiter.process(if n % 100 == 0 { 8.0 } else { 0.5 });
//!     assert!(y.abs() <= 1.0 + 1e-9);
//! }
//! ```

use fxchain_dsp_lib::delay::Delay;
use fxchain_dsp_lib::smoother::EmaFilter;

// ─── Building blocks ───────────────────────────────────────────────────────

/// Maximum over a sliding window, kept as a monotonic queue in a fixed
/// ring buffer.
#[derive(Debug, Clone, Default)]
struct SlidingMax {
    /// `(timestamp, value)` pairs with strictly decreasing values.
    queue: Vec<(usize, f64)>,
    head: usize,
    len: usize,
    window: usize,
    time: usize,
}

impl SlidingMax {
    fn resize(&mut self, max_window: usize) {
        self.queue = vec![(0, 0.0); max_window.max(1)];
        self.window = self.window.clamp(1, self.queue.len());
        self.reset();
    }

    fn set_window(&mut self, window: usize) {
        self.window = window.clamp(1, self.queue.len().max(1));
    }

    fn reset(&mut self) {
        self.head = 0;
        self.len = 0;
        self.time = 0;
    }

    #[inline]
    fn slot(&self, offset: usize) -> usize {
        (self.head + offset) % self.queue.len()
    }

    #[inline]
    fn process(&mut self, x: f64) -> f64 {
        let cap = self.queue.len();
        if cap == 0 {
            return x;
        }

        while self.len > 0 && self.queue[self.head].0 + self.window <= self.time {
            self.head = (self.head + 1) % cap;
            self.len -= 1;
        }
        while self.len > 0 && self.queue[self.slot(self.len - 1)].1 <= x {
            self.len -= 1;
        }
        let tail = self.slot(self.len);
        self.queue[tail] = (self.time, x);
        self.len += 1;

        self.time += 1;
        self.queue[self.head].1
    }
}

/// Moving average of fixed length.
#[derive(Debug, Clone, Default)]
struct Boxcar {
    buf: Vec<f64>,
    length: usize,
    ptr: usize,
    sum: f64,
}

impl Boxcar {
    fn resize(&mut self, max_length: usize) {
        self.buf = vec![0.0; max_length.max(1)];
        self.length = self.length.clamp(1, self.buf.len());
        self.reset(0.0);
    }

    /// Set the length and fill the history with `value`.
    fn set_length(&mut self, length: usize, value: f64) {
        self.length = length.clamp(1, self.buf.len().max(1));
        self.reset(value);
    }

    fn reset(&mut self, value: f64) {
        self.buf.fill(value);
        self.ptr = 0;
        self.sum = value * self.length as f64;
    }

    #[inline]
    fn process(&mut self, x: f64) -> f64 {
        if self.buf.is_empty() {
            return x;
        }
        self.sum += x - self.buf[self.ptr];
        self.buf[self.ptr] = x;
        self.ptr += 1;
        if self.ptr >= self.length {
            self.ptr = 0;
        }
        self.sum / self.length as f64
    }
}

// ─── Limiter ───────────────────────────────────────────────────────────────

/// Brickwall limiter with `attack` samples of lookahead.
#[derive(Debug, Clone)]
pub struct BasicLimiter {
    attack_frames: usize,
    max_attack_frames: usize,
    threshold: f64,
    release_p: f64,
    release_gain: f64,
    peak: SlidingMax,
    average1: Boxcar,
    average2: Boxcar,
    lookahead: Delay,
}

impl Default for BasicLimiter {
    fn default() -> Self {
        Self {
            attack_frames: 0,
            max_attack_frames: 0,
            threshold: 1.0,
            release_p: 1.0,
            release_gain: 1.0,
            peak: SlidingMax::default(),
            average1: Boxcar::default(),
            average2: Boxcar::default(),
            lookahead: Delay::new(),
        }
    }
}

impl BasicLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate for attack times up to `max_attack_frames` samples.
    pub fn resize(&mut self, max_attack_frames: usize) {
        self.max_attack_frames = max_attack_frames.max(2);
        self.peak.resize(self.max_attack_frames + 1);
        self.average1.resize(self.max_attack_frames / 2 + 1);
        self.average2.resize(self.max_attack_frames / 2 + 1);
        self.lookahead.resize(self.max_attack_frames);
        self.attack_frames = 0;
    }

    /// Set timing and threshold. State is cleared only when the attack
    /// length changes.
    pub fn prepare(&mut self, sample_rate: f64, attack_seconds: f64, release_seconds: f64, threshold: f64) {
        let mut frames = (sample_rate * attack_seconds).max(0.0) as usize;
        frames += frames & 1;
        let frames = frames.clamp(2, self.max_attack_frames.max(2) & !1);

        self.release_p = EmaFilter::second_to_p(sample_rate, release_seconds);
        self.threshold = threshold;

        if frames != self.attack_frames {
            self.attack_frames = frames;
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        let half = self.attack_frames / 2;
        self.peak.set_window(self.attack_frames + 1);
        self.peak.reset();
        self.average1.set_length(half, 1.0);
        self.average2.set_length(half + 1, 1.0);
        self.lookahead.reset();
        self.release_gain = 1.0;
    }

    /// Lookahead in base-rate samples when running at `fold` times the
    /// base rate.
    pub fn latency(&self, fold: usize) -> usize {
        self.attack_frames / fold.max(1)
    }

    pub fn attack_frames(&self) -> usize {
        self.attack_frames
    }

    #[inline]
    pub fn process(&mut self, x0: f64) -> f64 {
        let peak = self.peak.process(x0.abs());
        let candidate = if peak > self.threshold {
            self.threshold / peak
        } else {
            1.0
        };

        if self.release_gain > candidate {
            self.release_gain = candidate;
        } else {
            self.release_gain += self.release_p * (candidate - self.release_gain);
        }

        let smoothed = self.average2.process(self.average1.process(self.release_gain));
        smoothed * self.lookahead.process(x0, self.attack_frames as f64)
    }
}
