// SPDX-License-Identifier: LGPL-3.0-or-later

//! Criterion benchmarks for whole cores at a typical host block size.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fxchain_plugins::amplitude_modulator::{self, AmplitudeModulatorCore};
use fxchain_plugins::easy_overdrive::{self, EasyOverdriveCore};
use fxchain_plugins::params::ParameterStore;
use fxchain_plugins::slope_filter::{self, SlopeFilterCore};
use fxchain_plugins::two_band_stereo::TwoBandStereoCore;
use fxchain_plugins::DspCore;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const BLOCK: usize = 512;
const SAMPLE_RATE: f64 = 48000.0;

fn noise(seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..BLOCK).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect()
}

fn run<C: DspCore>(core: &mut C, params: &ParameterStore, inputs: &[Vec<f32>], outputs: &mut [Vec<f32>]) {
    let ins: Vec<&[f32]> = inputs.iter().map(Vec::as_slice).collect();
    let mut outs: Vec<&mut [f32]> = outputs.iter_mut().map(Vec::as_mut_slice).collect();
    core.set_parameters(params);
    // Channel counts are fixed by the caller.
    let _ = core.process(BLOCK, black_box(&ins), &mut outs);
}

fn bench_amplitude_modulator(c: &mut Criterion) {
    let inputs: Vec<Vec<f32>> = (0..4).map(noise).collect();
    let mut outputs = vec![vec![0.0f32; BLOCK]; 2];
    let mut group = c.benchmark_group("amplitude_modulator_core");

    for am_type in [0.0, 1.0, 4.0] {
        group.bench_with_input(BenchmarkId::from_parameter(am_type), &am_type, |b, &am_type| {
            let params = ParameterStore::new(AmplitudeModulatorCore::parameters());
            params.set_raw(amplitude_modulator::param::AM_TYPE, am_type);
            let mut core = AmplitudeModulatorCore::new();
            let _ = core.setup(SAMPLE_RATE, &params);
            b.iter(|| run(&mut core, &params, &inputs, &mut outputs));
        });
    }
    group.finish();
}

fn bench_easy_overdrive(c: &mut Criterion) {
    let inputs: Vec<Vec<f32>> = (0..2).map(noise).collect();
    let mut outputs = vec![vec![0.0f32; BLOCK]; 2];
    let mut group = c.benchmark_group("easy_overdrive_core");

    for oversampling in [0.0, 1.0, 2.0] {
        group.bench_with_input(
            BenchmarkId::new("oversampling", oversampling),
            &oversampling,
            |b, &oversampling| {
                let params = ParameterStore::new(EasyOverdriveCore::parameters());
                params.set_raw(easy_overdrive::param::OVERSAMPLING, oversampling);
                params.set_raw(easy_overdrive::param::ASYM_DRIVE_ENABLED, 1.0);
                let mut core = EasyOverdriveCore::new();
                let _ = core.setup(SAMPLE_RATE, &params);
                b.iter(|| run(&mut core, &params, &inputs, &mut outputs));
            },
        );
    }
    group.finish();
}

fn bench_filters(c: &mut Criterion) {
    let inputs: Vec<Vec<f32>> = (0..2).map(noise).collect();
    let mut outputs = vec![vec![0.0f32; BLOCK]; 2];

    c.bench_function("slope_filter_core", |b| {
        let params = ParameterStore::new(SlopeFilterCore::parameters());
        params.set_raw(slope_filter::param::SLOPE_DECIBEL, -3.0);
        let mut core = SlopeFilterCore::new();
        let _ = core.setup(SAMPLE_RATE, &params);
        b.iter(|| run(&mut core, &params, &inputs, &mut outputs));
    });

    c.bench_function("two_band_stereo_core", |b| {
        let params = ParameterStore::new(TwoBandStereoCore::parameters());
        let mut core = TwoBandStereoCore::new();
        let _ = core.setup(SAMPLE_RATE, &params);
        b.iter(|| run(&mut core, &params, &inputs, &mut outputs));
    });
}

criterion_group!(
    benches,
    bench_amplitude_modulator,
    bench_easy_overdrive,
    bench_filters
);
criterion_main!(benches);
