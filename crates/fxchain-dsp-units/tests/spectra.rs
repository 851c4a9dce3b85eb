// SPDX-License-Identifier: LGPL-3.0-or-later
//
// Spectral checks of the modulators and the crossover. A 1 kHz carrier
// and a 100 Hz modulator put the sidebands at 900 Hz and 1100 Hz, both on
// exact FFT bins of the 4800-sample analysis window.

use std::f64::consts::TAU;

use float_cmp::assert_approx_eq;
use fxchain_dsp_units::am::{AmType, AmplitudeModulator};
use fxchain_dsp_units::filters::crossover::LinkwitzRileyFir2Band;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

const FS: f64 = 48000.0;
const LENGTH: usize = 9600;
const SIDEBAND_DB: f64 = -6.020599913279624;

fn sine(freq: f64, n: usize) -> f64 {
    (TAU * freq / FS * n as f64).sin()
}

fn tone_db(signal: &[f64], freq: f64) -> f64 {
    let len = signal.len();
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    FftPlanner::<f64>::new()
        .plan_fft_forward(len)
        .process(&mut buffer);
    let bin = (freq * len as f64 / FS).round() as usize;
    20.0 * (buffer[bin].norm() * 2.0 / len as f64 + 1e-300).log10()
}

/// Steady-state output of `am_type` for the test tones.
fn modulate(am_type: AmType) -> Vec<f64> {
    let mut am = AmplitudeModulator::new();
    am.set_type(am_type);
    let out: Vec<f64> = (0..LENGTH)
        .map(|n| am.process(sine(1000.0, n), sine(100.0, n)))
        .collect();
    out[LENGTH / 2..].to_vec()
}

// ─── Amplitude modulation ──────────────────────────────────────────────

#[test]
fn test_dsb_has_both_sidebands() {
    let out = modulate(AmType::Dsb);
    let rms = (out.iter().map(|x| x * x).sum::<f64>() / out.len() as f64).sqrt();
    assert_approx_eq!(f64, rms, 0.5, epsilon = 1e-9);
    assert_approx_eq!(f64, tone_db(&out, 1100.0), SIDEBAND_DB, epsilon = 1e-6);
    assert_approx_eq!(f64, tone_db(&out, 900.0), SIDEBAND_DB, epsilon = 1e-6);
}

#[test]
fn test_single_sideband_suppression() {
    let usb = modulate(AmType::Usb);
    assert!(tone_db(&usb, 1100.0).abs() < 0.01);
    assert!(tone_db(&usb, 900.0) < SIDEBAND_DB - 40.0);

    let lsb = modulate(AmType::Lsb);
    assert!(tone_db(&lsb, 900.0).abs() < 0.01);
    // The fixed Hilbert coefficients leave the upper image of the naive
    // LSB about 39.7 dB under the DSB sideband, short of the 40 dB USB gets.
    assert!(tone_db(&lsb, 1100.0) < SIDEBAND_DB - 39.0);
}

#[test]
fn test_anti_aliased_dsb_keeps_sideband_level() {
    for am_type in [AmType::DsbUpperAa, AmType::DsbFullAa] {
        let out = modulate(am_type);
        for freq in [900.0, 1100.0] {
            let level = tone_db(&out, freq);
            assert!((level - SIDEBAND_DB).abs() < 0.5, "{am_type:?} {freq} Hz: {level} dB");
        }
    }
}

#[test]
fn test_anti_aliased_single_sideband() {
    let usb = modulate(AmType::UsbAa);
    assert!(tone_db(&usb, 1100.0).abs() < 0.1);
    assert!(tone_db(&usb, 900.0) < -40.0);

    let lsb = modulate(AmType::LsbAa);
    assert!(tone_db(&lsb, 900.0).abs() < 0.1);
    assert!(tone_db(&lsb, 1100.0) < -40.0);
}

// ─── Crossover ─────────────────────────────────────────────────────────

#[test]
fn test_crossover_separates_bands() {
    let mut xover = LinkwitzRileyFir2Band::new();
    xover.prepare(1000.0 / FS);

    let mut low = Vec::with_capacity(LENGTH);
    let mut high = Vec::with_capacity(LENGTH);
    for n in 0..LENGTH {
        let [l, h] = xover.process(sine(100.0, n) + sine(5000.0, n));
        low.push(l);
        high.push(h);
    }
    let low = &low[LENGTH / 2..];
    let high = &high[LENGTH / 2..];

    assert!(tone_db(low, 100.0).abs() < 0.01);
    assert!(tone_db(low, 5000.0) < -50.0);
    // LR4 at five times the crossover is still about 0.014 dB down.
    assert!(tone_db(high, 5000.0).abs() < 0.05);
    assert!(tone_db(high, 100.0) < -60.0);
}

#[test]
fn test_crossover_bands_sum_to_delayed_input() {
    let mut xover = LinkwitzRileyFir2Band::new();
    xover.prepare(1000.0 / FS);
    let latency = xover.latency();

    let input: Vec<f64> = (0..LENGTH)
        .map(|n| sine(100.0, n) + sine(5000.0, n))
        .collect();
    for (n, &x) in input.iter().enumerate() {
        let [l, h] = xover.process(x);
        let expected = if n >= latency { input[n - latency] } else { 0.0 };
        assert_approx_eq!(f64, l + h, expected, epsilon = 1e-12);
    }
}
