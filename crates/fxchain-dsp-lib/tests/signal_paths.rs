// SPDX-License-Identifier: LGPL-3.0-or-later
//
// End-to-end checks of the rate converters and the frequency shifter,
// measured on sine inputs with whole cycles in the analysis window.

use std::f64::consts::{FRAC_1_SQRT_2, TAU};

use float_cmp::assert_approx_eq;
use fxchain_dsp_lib::allpass::HalfBandIir;
use fxchain_dsp_lib::hilbert::FrequencyShifter;
use fxchain_dsp_lib::multirate::{FirUpSampler, OverSampler16};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

const FS: f64 = 48000.0;

// ─── Helpers ───────────────────────────────────────────────────────────

fn sine(freq: f64, sample_rate: f64, n: usize) -> f64 {
    (TAU * freq / sample_rate * n as f64).sin()
}

/// Peak amplitude of `freq` in `signal`, in dB. `freq` must fall on a bin.
fn tone_db(signal: &[f64], freq: f64, sample_rate: f64) -> f64 {
    let len = signal.len();
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    FftPlanner::<f64>::new()
        .plan_fft_forward(len)
        .process(&mut buffer);
    let bin = (freq * len as f64 / sample_rate).round() as usize;
    let amplitude = buffer[bin].norm() * 2.0 / len as f64;
    20.0 * (amplitude + 1e-300).log10()
}

fn rms(signal: &[f64]) -> f64 {
    (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
}

// ─── Tests ─────────────────────────────────────────────────────────────

#[test]
fn test_fir_round_trip_keeps_low_sine_level() {
    let mut os = OverSampler16::<FirUpSampler>::new();
    let out: Vec<f64> = (0..9600)
        .map(|n| {
            os.push(sine(1000.0, FS, n));
            for i in 0..16 {
                os.input_buffer[i] = os.at(i);
            }
            os.process()
        })
        .collect();
    assert_approx_eq!(f64, rms(&out[4800..]), FRAC_1_SQRT_2, epsilon = 1e-3);
}

#[test]
fn test_half_band_decimator_stopband() {
    let mut hb = HalfBandIir::new();
    let rate_2x = 2.0 * FS;
    let out: Vec<f64> = (0..9600)
        .map(|n| {
            hb.process([
                sine(30000.0, rate_2x, 2 * n),
                sine(30000.0, rate_2x, 2 * n + 1),
            ])
        })
        .collect();
    // 30 kHz folds to 18 kHz at the base rate.
    let alias = tone_db(&out[4800..], 18000.0, FS);
    assert!(alias < -120.0, "alias {alias} dB");
}

#[test]
fn test_half_band_decimator_passband() {
    let mut hb = HalfBandIir::new();
    let rate_2x = 2.0 * FS;
    let out: Vec<f64> = (0..9600)
        .map(|n| {
            hb.process([
                sine(10000.0, rate_2x, 2 * n),
                sine(10000.0, rate_2x, 2 * n + 1),
            ])
        })
        .collect();
    let level = tone_db(&out[4800..], 10000.0, FS);
    assert!(level.abs() < 0.01, "level {level} dB");
}

#[test]
fn test_frequency_shifter_moves_tone_up() {
    let mut shifter = FrequencyShifter::new();
    let shift = 500.0 / FS;
    let out: Vec<f64> = (0..9600)
        .map(|n| shifter.process(sine(1000.0, FS, n), shift))
        .collect();
    let tail = &out[4800..];

    let wanted = tone_db(tail, 1500.0, FS);
    let image = tone_db(tail, 500.0, FS);
    let shifted_away = tone_db(tail, 1000.0, FS);
    assert!(wanted.abs() < 0.1, "wanted {wanted} dB");
    assert!(image < -40.0, "image {image} dB");
    assert!(shifted_away < -100.0, "carrier left at {shifted_away} dB");
}
