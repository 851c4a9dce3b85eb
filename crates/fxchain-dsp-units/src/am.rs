// SPDX-License-Identifier: LGPL-3.0-or-later

//! Amplitude modulation: ring modulation, single sideband and their
//! anti-aliased forms.
//!
//! | Variant | Sidebands | Aliasing control |
//! |---|---|---|
//! | [`Dsb`] | both | none |
//! | [`Usb`] | upper | none |
//! | [`Lsb`] | lower | none |
//! | [`DsbUpperAa`] | both | 2x half-band |
//! | [`DsbFullAa`] | both | 3x with frequency shifted band limiting |
//! | [`UsbAa`] | upper | 2x half-band |
//! | [`LsbAa`] | lower | 2x half-band, shifted highpass |
//!
//! Single sideband products come from analytic signals:
//! ```text
//!   usb = Re(c) * Re(m) - Im(c) * Im(m)
//!   lsb = Re(c) * Re(m) + Im(c) * Im(m)
//! ```
//!
//! # Examples
//! ```
//! use fxchain_dsp_units::am::{AmType, AmplitudeModulator};
//!
//! let mut am = AmplitudeModulator::new();
//! am.set_type(AmType::from_index(5));
//! assert_eq!(am.am_type(), AmType::UsbAa);
//! let y = am.process(0.5, 0.5);
//! assert!(y.is_finite());
//! ```

use fxchain_dsp_lib::allpass::HalfBandIir;
use fxchain_dsp_lib::coeffs::{SOS_HALF_HIGHPASS, SOS_ONE_THIRD_BANDPASS, SOS_ONE_THIRD_LOWPASS};
use fxchain_dsp_lib::hilbert::{AnalyticSignalFilter, FrequencyShifter};
use fxchain_dsp_lib::sos::SosFilter;

/// Modulation variant, in parameter index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmType {
    #[default]
    Dsb,
    Usb,
    Lsb,
    DsbUpperAa,
    DsbFullAa,
    UsbAa,
    LsbAa,
}

impl AmType {
    pub const ALL: [AmType; 7] = [
        AmType::Dsb,
        AmType::Usb,
        AmType::Lsb,
        AmType::DsbUpperAa,
        AmType::DsbFullAa,
        AmType::UsbAa,
        AmType::LsbAa,
    ];

    /// Indices past the last variant fall back to [`AmType::Dsb`].
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

// ─── Naive variants ────────────────────────────────────────────────────────

/// Plain product of carrier and modulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dsb;

impl Dsb {
    pub fn reset(&mut self) {}

    #[inline]
    pub fn process(&mut self, carrier: f64, modulator: f64) -> f64 {
        carrier * modulator
    }
}

/// Upper sideband through a pair of analytic signal filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usb {
    car: AnalyticSignalFilter,
    modu: AnalyticSignalFilter,
}

impl Usb {
    pub fn reset(&mut self) {
        self.car.reset();
        self.modu.reset();
    }

    #[inline]
    pub fn process(&mut self, carrier: f64, modulator: f64) -> f64 {
        let c = self.car.process(carrier);
        let m = self.modu.process(modulator);
        c.re * m.re - c.im * m.im
    }
}

/// Lower sideband through a pair of analytic signal filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lsb {
    car: AnalyticSignalFilter,
    modu: AnalyticSignalFilter,
}

impl Lsb {
    pub fn reset(&mut self) {
        self.car.reset();
        self.modu.reset();
    }

    #[inline]
    pub fn process(&mut self, carrier: f64, modulator: f64) -> f64 {
        let c = self.car.process(carrier);
        let m = self.modu.process(modulator);
        c.re * m.re + c.im * m.im
    }
}

// ─── Anti-aliased variants ─────────────────────────────────────────────────

/// Ring modulation at 2x. Removes the aliases of the upper sideband.
#[derive(Debug, Clone, Copy, Default)]
pub struct DsbUpperAa {
    hb_car: HalfBandIir,
    hb_mod: HalfBandIir,
    hb_down: HalfBandIir,
}

impl DsbUpperAa {
    pub fn reset(&mut self) {
        self.hb_car.reset();
        self.hb_mod.reset();
        self.hb_down.reset();
    }

    #[inline]
    pub fn process(&mut self, carrier: f64, modulator: f64) -> f64 {
        let c = self.hb_car.process_up(carrier);
        let m = self.hb_mod.process_up(modulator);
        self.hb_down.process([c[0] * m[0], c[1] * m[1]])
    }
}

/// Ring modulation at 3x with both sidebands band limited.
///
/// Each input is zero-stuffed to three samples. The carrier is shifted up
/// by a sixth of the 3x rate before multiplication so that the product
/// sits inside a fixed bandpass, and shifted back afterwards. The factor
/// 9 restores the level lost to stuffing both inputs.
#[derive(Debug, Clone)]
pub struct DsbFullAa {
    lp_car: SosFilter<8>,
    lp_mod: SosFilter<8>,
    lp_down: SosFilter<8>,
    bp_am: SosFilter<16>,
    forward: FrequencyShifter,
    backward: FrequencyShifter,
}

impl Default for DsbFullAa {
    fn default() -> Self {
        Self {
            lp_car: SosFilter::new(&SOS_ONE_THIRD_LOWPASS),
            lp_mod: SosFilter::new(&SOS_ONE_THIRD_LOWPASS),
            lp_down: SosFilter::new(&SOS_ONE_THIRD_LOWPASS),
            bp_am: SosFilter::new(&SOS_ONE_THIRD_BANDPASS),
            forward: FrequencyShifter::new(),
            backward: FrequencyShifter::new(),
        }
    }
}

impl DsbFullAa {
    const FOLD: usize = 3;
    const SHIFT: f64 = 1.0 / 6.0;

    pub fn reset(&mut self) {
        self.lp_car.reset();
        self.lp_mod.reset();
        self.lp_down.reset();
        self.bp_am.reset();
        self.forward.reset();
        self.backward.reset();
    }

    #[inline]
    pub fn process(&mut self, mut carrier: f64, mut modulator: f64) -> f64 {
        let mut output = 0.0;
        for _ in 0..Self::FOLD {
            let c = self.lp_car.process(carrier);
            let m = self.lp_mod.process(modulator);
            let am = m * self.forward.process(c, Self::SHIFT);
            let band = self.bp_am.process(am);
            output = self.lp_down.process(self.backward.process(band, -Self::SHIFT));
            carrier = 0.0;
            modulator = 0.0;
        }
        (Self::FOLD * Self::FOLD) as f64 * output
    }
}

/// Upper sideband at 2x.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsbAa {
    hb_car: HalfBandIir,
    hb_mod: HalfBandIir,
    usb: Usb,
    hb_down: HalfBandIir,
}

impl UsbAa {
    pub fn reset(&mut self) {
        self.hb_car.reset();
        self.hb_mod.reset();
        self.usb.reset();
        self.hb_down.reset();
    }

    #[inline]
    pub fn process(&mut self, carrier: f64, modulator: f64) -> f64 {
        let c = self.hb_car.process_up(carrier);
        let m = self.hb_mod.process_up(modulator);
        let s0 = self.usb.process(c[0], m[0]);
        let s1 = self.usb.process(c[1], m[1]);
        self.hb_down.process([s0, s1])
    }
}

/// Lower sideband at 2x.
///
/// The carrier is shifted up by a quarter of the 2x rate, the lower
/// sideband is taken against the modulator, a highpass at the 2x
/// half-band edge removes what folded below it, and the result is
/// shifted back down.
#[derive(Debug, Clone)]
pub struct LsbAa {
    hb_car: HalfBandIir,
    hb_mod: HalfBandIir,
    hb_down: HalfBandIir,
    forward: FrequencyShifter,
    lsb: Lsb,
    highpass: SosFilter<8>,
    backward: FrequencyShifter,
}

impl Default for LsbAa {
    fn default() -> Self {
        Self {
            hb_car: HalfBandIir::new(),
            hb_mod: HalfBandIir::new(),
            hb_down: HalfBandIir::new(),
            forward: FrequencyShifter::new(),
            lsb: Lsb::default(),
            highpass: SosFilter::new(&SOS_HALF_HIGHPASS),
            backward: FrequencyShifter::new(),
        }
    }
}

impl LsbAa {
    const SHIFT: f64 = 0.25;

    pub fn reset(&mut self) {
        self.hb_car.reset();
        self.hb_mod.reset();
        self.hb_down.reset();
        self.forward.reset();
        self.lsb.reset();
        self.highpass.reset();
        self.backward.reset();
    }

    #[inline]
    pub fn process(&mut self, carrier: f64, modulator: f64) -> f64 {
        let c = self.hb_car.process_up(carrier);
        let m = self.hb_mod.process_up(modulator);
        let mut frame = [0.0; 2];
        for (out, (&c, &m)) in frame.iter_mut().zip(c.iter().zip(m.iter())) {
            let shifted = self.forward.process(c, Self::SHIFT);
            let am = self.lsb.process(shifted, m);
            let filtered = self.highpass.process(am);
            *out = self.backward.process(filtered, -Self::SHIFT);
        }
        self.hb_down.process(frame)
    }
}

// ─── Dispatcher ────────────────────────────────────────────────────────────

/// All seven variants behind one selector.
///
/// Only the selected variant runs. Selecting a different variant resets
/// it, so it starts from silence instead of stale state.
#[derive(Debug, Clone, Default)]
pub struct AmplitudeModulator {
    am_type: AmType,
    dsb: Dsb,
    usb: Usb,
    lsb: Lsb,
    dsb_upper_aa: DsbUpperAa,
    dsb_full_aa: DsbFullAa,
    usb_aa: UsbAa,
    lsb_aa: LsbAa,
}

impl AmplitudeModulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn am_type(&self) -> AmType {
        self.am_type
    }

    /// Switch variant. A no-op when `am_type` is already active.
    pub fn set_type(&mut self, am_type: AmType) {
        if am_type == self.am_type {
            return;
        }
        self.am_type = am_type;
        self.reset_active();
    }

    /// Reset every variant.
    pub fn reset(&mut self) {
        self.dsb.reset();
        self.usb.reset();
        self.lsb.reset();
        self.dsb_upper_aa.reset();
        self.dsb_full_aa.reset();
        self.usb_aa.reset();
        self.lsb_aa.reset();
    }

    fn reset_active(&mut self) {
        match self.am_type {
            AmType::Dsb => self.dsb.reset(),
            AmType::Usb => self.usb.reset(),
            AmType::Lsb => self.lsb.reset(),
            AmType::DsbUpperAa => self.dsb_upper_aa.reset(),
            AmType::DsbFullAa => self.dsb_full_aa.reset(),
            AmType::UsbAa => self.usb_aa.reset(),
            AmType::LsbAa => self.lsb_aa.reset(),
        }
    }

    #[inline]
    pub fn process(&mut self, carrier: f64, modulator: f64) -> f64 {
        match self.am_type {
            AmType::Dsb => self.dsb.process(carrier, modulator),
            AmType::Usb => self.usb.process(carrier, modulator),
            AmType::Lsb => self.lsb.process(carrier, modulator),
            AmType::DsbUpperAa => self.dsb_upper_aa.process(carrier, modulator),
            AmType::DsbFullAa => self.dsb_full_aa.process(carrier, modulator),
            AmType::UsbAa => self.usb_aa.process(carrier, modulator),
            AmType::LsbAa => self.lsb_aa.process(carrier, modulator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_index_round_trip_and_fallback() {
        for (i, t) in AmType::ALL.iter().enumerate() {
            assert_eq!(AmType::from_index(i), *t);
            assert_eq!(t.index(), i);
        }
        assert_eq!(AmType::from_index(7), AmType::Dsb);
        assert_eq!(AmType::from_index(31), AmType::Dsb);
    }

    #[test]
    fn test_dsb_is_product() {
        let mut dsb = Dsb;
        assert_eq!(dsb.process(0.5, -0.25), -0.125);
    }

    #[test]
    fn test_silence_in_silence_out_for_every_variant() {
        let mut am = AmplitudeModulator::new();
        for t in AmType::ALL {
            am.set_type(t);
            for _ in 0..256 {
                assert_eq!(am.process(0.0, 0.0), 0.0, "{t:?}");
            }
        }
    }

    #[test]
    fn test_switching_type_resets_new_variant() {
        let mut am = AmplitudeModulator::new();
        am.set_type(AmType::Usb);
        let first = am.process(1.0, 1.0);
        for _ in 0..64 {
            am.process(1.0, 1.0);
        }
        am.set_type(AmType::Dsb);
        am.set_type(AmType::Usb);
        assert_eq!(am.process(1.0, 1.0), first);
    }

    #[test]
    fn test_same_type_does_not_reset() {
        let mut am = AmplitudeModulator::new();
        am.set_type(AmType::UsbAa);
        let first = am.process(1.0, 1.0);
        am.set_type(AmType::UsbAa);
        let second = am.process(1.0, 1.0);
        assert_ne!(first, second);
    }
}
