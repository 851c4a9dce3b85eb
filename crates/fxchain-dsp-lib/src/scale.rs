// SPDX-License-Identifier: LGPL-3.0-or-later

//! Parameter value mapping between the normalized range `[0, 1]` and the
//! raw values the DSP code consumes.
//!
//! Hosts automate parameters in normalized form. Each parameter owns a
//! [`Scale`] which maps that value to its raw unit (linear amount, integer
//! selector, amplitude from decibels, ...) and back.
//!
//! # Examples
//! ```
//! use fxchain_dsp_lib::scale::Scale;
//!
//! let gain = Scale::decibel(-60.0, 60.0, true);
//! assert_eq!(gain.map(0.0), 0.0); // min-to-zero
//! assert!((gain.map(0.5) - 1.0).abs() < 1e-12); // 0 dB
//! assert!((gain.invmap_db(0.0) - 0.5).abs() < 1e-12);
//! ```

use crate::float::{amp_to_db, db_to_amp};

const BIPOLAR_CENTER: f64 = 0.5;
const BIPOLAR_UPPER_START: f64 = BIPOLAR_CENTER * (1.0 + f64::EPSILON);
const BIPOLAR_LOWER_END: f64 = BIPOLAR_CENTER * (1.0 - f64::EPSILON);

/// Mapping between a normalized value in `[0, 1]` and a raw value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Unsigned integer in `[0, max]`. Each integer owns an equal slice of
    /// the normalized range.
    UInt { max: u32 },
    /// Signed integer in `[min, max]`.
    Int { min: i32, max: i32 },
    /// Linear mapping to `[min, max]`.
    Linear { min: f64, max: f64 },
    /// S-shaped power curve, symmetric around 0.5.
    SPoly { min: f64, max: f64, power: f64 },
    /// Power curve with `map(in_value) == out_value`.
    Log { min: f64, max: f64, expo: f64 },
    /// Normalized → decibel → amplitude. With `min_to_zero`, 0 maps to
    /// silence instead of `min_db`.
    Decibel {
        min_db: f64,
        max_db: f64,
        min_to_zero: bool,
    },
    /// Decibel amplitude subtracted from `offset`. Raising the normalized
    /// value moves the raw value toward `offset`.
    NegativeDecibel {
        min_db: f64,
        max_db: f64,
        offset: f64,
        min_to_zero: bool,
    },
    /// Decibel scale mirrored around the normalized center, which maps to 0.
    BipolarDecibel { min_db: f64, max_db: f64 },
}

impl Scale {
    pub const BOOLEAN: Scale = Scale::UInt { max: 1 };
    pub const UNIPOLAR: Scale = Scale::Linear { min: 0.0, max: 1.0 };
    pub const BIPOLAR: Scale = Scale::Linear { min: -1.0, max: 1.0 };

    pub const fn uint(max: u32) -> Self {
        Scale::UInt { max }
    }

    pub const fn int(min: i32, max: i32) -> Self {
        Scale::Int { min, max }
    }

    pub const fn linear(min: f64, max: f64) -> Self {
        Scale::Linear { min, max }
    }

    pub const fn spoly(min: f64, max: f64, power: f64) -> Self {
        Scale::SPoly { min, max, power }
    }

    /// Power-curve scale passing through `(in_value, out_value)`.
    ///
    /// Requires `min < max`, `0 < in_value < 1` and `out_value > min`.
    pub fn log(min: f64, max: f64, in_value: f64, out_value: f64) -> Self {
        let expo = ((out_value - min) / (max - min)).ln() / in_value.ln();
        Scale::Log { min, max, expo }
    }

    pub const fn decibel(min_db: f64, max_db: f64, min_to_zero: bool) -> Self {
        Scale::Decibel {
            min_db,
            max_db,
            min_to_zero,
        }
    }

    pub const fn negative_decibel(min_db: f64, max_db: f64, offset: f64, min_to_zero: bool) -> Self {
        Scale::NegativeDecibel {
            min_db,
            max_db,
            offset,
            min_to_zero,
        }
    }

    pub const fn bipolar_decibel(min_db: f64, max_db: f64) -> Self {
        Scale::BipolarDecibel { min_db, max_db }
    }

    /// Map a normalized value to its raw value.
    pub fn map(&self, normalized: f64) -> f64 {
        match *self {
            Scale::UInt { max } => {
                let n = normalized.clamp(0.0, 1.0);
                ((n * (max as f64 + 1.0)) as u32).min(max) as f64
            }
            Scale::Int { min, max } => {
                let diff = (max - min) as f64;
                ((normalized * diff) as i32 + min).clamp(min, max) as f64
            }
            Scale::Linear { min, max } => (normalized * (max - min) + min).clamp(min, max),
            Scale::SPoly { min, max, power } => {
                if normalized < 0.0 {
                    return min;
                }
                if normalized > 1.0 {
                    return max;
                }
                spoly_curve(normalized, power) * (max - min) + min
            }
            Scale::Log { min, max, expo } => {
                if normalized < 0.0 {
                    return min;
                }
                if normalized > 1.0 {
                    return max;
                }
                normalized.powf(expo) * (max - min) + min
            }
            Scale::Decibel { .. } => db_to_amp(self.to_display(normalized)),
            Scale::NegativeDecibel {
                min_db,
                max_db,
                offset,
                min_to_zero,
            } => offset - Scale::decibel(min_db, max_db, min_to_zero).map(1.0 - normalized),
            Scale::BipolarDecibel { min_db, max_db } => {
                let inner = Scale::decibel(min_db, max_db, false);
                if normalized >= BIPOLAR_UPPER_START {
                    inner.map((normalized - BIPOLAR_UPPER_START) / (1.0 - BIPOLAR_UPPER_START))
                } else if normalized <= BIPOLAR_LOWER_END {
                    -inner.map(1.0 - normalized / BIPOLAR_LOWER_END)
                } else {
                    0.0
                }
            }
        }
    }

    /// Map `1 - normalized`.
    pub fn reverse_map(&self, normalized: f64) -> f64 {
        self.map(1.0 - normalized)
    }

    /// Map a raw value back to `[0, 1]`.
    pub fn invmap(&self, raw: f64) -> f64 {
        match *self {
            Scale::UInt { max } => {
                if max == 0 {
                    0.0
                } else {
                    (raw / max as f64).clamp(0.0, 1.0)
                }
            }
            Scale::Int { min, max } => ((raw - min as f64) / (max - min) as f64).clamp(0.0, 1.0),
            Scale::Linear { min, max } => ((raw - min) / (max - min)).clamp(0.0, 1.0),
            Scale::SPoly { min, max, power } => {
                if raw < min {
                    return 0.0;
                }
                if raw > max {
                    return 1.0;
                }
                spoly_curve((raw - min) / (max - min), 1.0 / power)
            }
            Scale::Log { min, max, expo } => {
                if raw < min {
                    return 0.0;
                }
                if raw > max {
                    return 1.0;
                }
                ((raw - min) / (max - min)).powf(1.0 / expo)
            }
            Scale::Decibel { .. } => {
                if raw <= 0.0 {
                    0.0
                } else {
                    self.invmap_db(amp_to_db(raw))
                }
            }
            Scale::NegativeDecibel {
                min_db,
                max_db,
                offset,
                min_to_zero,
            } => 1.0 - Scale::decibel(min_db, max_db, min_to_zero).invmap(offset - raw),
            Scale::BipolarDecibel { min_db, max_db } => {
                let inner = Scale::decibel(min_db, max_db, false);
                if raw > 0.0 {
                    inner.invmap(raw) * (1.0 - BIPOLAR_UPPER_START) + BIPOLAR_UPPER_START
                } else if raw < 0.0 {
                    (1.0 - inner.invmap(-raw)) * BIPOLAR_LOWER_END
                } else {
                    BIPOLAR_CENTER
                }
            }
        }
    }

    /// Normalized value for a decibel amount. Only meaningful for the
    /// decibel family; other scales fall back to [`invmap`](Self::invmap).
    pub fn invmap_db(&self, db: f64) -> f64 {
        match *self {
            Scale::Decibel { min_db, max_db, .. } => ((db - min_db) / (max_db - min_db)).clamp(0.0, 1.0),
            Scale::NegativeDecibel {
                min_db,
                max_db,
                min_to_zero,
                ..
            } => 1.0 - Scale::decibel(min_db, max_db, min_to_zero).invmap_db(db),
            Scale::BipolarDecibel { min_db, max_db } => {
                if db < min_db {
                    BIPOLAR_CENTER
                } else {
                    self.invmap(db_to_amp(db.min(max_db)))
                }
            }
            _ => self.invmap(db),
        }
    }

    /// Value shown to the user. Decibel scales display decibels, the rest
    /// display the raw value.
    pub fn to_display(&self, normalized: f64) -> f64 {
        match *self {
            Scale::Decibel {
                min_db,
                max_db,
                min_to_zero,
            } => {
                if min_to_zero && normalized <= 0.0 {
                    f64::NEG_INFINITY
                } else {
                    (normalized * (max_db - min_db) + min_db).clamp(min_db, max_db)
                }
            }
            Scale::NegativeDecibel {
                min_db,
                max_db,
                min_to_zero,
                ..
            } => Scale::decibel(min_db, max_db, min_to_zero).to_display(1.0 - normalized),
            _ => self.map(normalized),
        }
    }

    /// Inverse of [`to_display`](Self::to_display).
    pub fn from_display(&self, display: f64) -> f64 {
        match self {
            Scale::Decibel { .. } | Scale::NegativeDecibel { .. } => self.invmap_db(display),
            _ => self.invmap(display),
        }
    }

    /// Smallest raw value the scale produces.
    pub fn min(&self) -> f64 {
        match *self {
            Scale::UInt { .. } => 0.0,
            Scale::Int { min, .. } => min as f64,
            Scale::Linear { min, .. } | Scale::SPoly { min, .. } | Scale::Log { min, .. } => min,
            Scale::Decibel {
                min_db, min_to_zero, ..
            } => {
                if min_to_zero {
                    0.0
                } else {
                    db_to_amp(min_db)
                }
            }
            Scale::NegativeDecibel {
                min_db,
                max_db,
                offset,
                min_to_zero,
            } => offset - Scale::decibel(min_db, max_db, min_to_zero).max(),
            Scale::BipolarDecibel { max_db, .. } => -db_to_amp(max_db),
        }
    }

    /// Largest raw value the scale produces.
    pub fn max(&self) -> f64 {
        match *self {
            Scale::UInt { max } => max as f64,
            Scale::Int { max, .. } => max as f64,
            Scale::Linear { max, .. } | Scale::SPoly { max, .. } | Scale::Log { max, .. } => max,
            Scale::Decibel { max_db, .. } | Scale::BipolarDecibel { max_db, .. } => db_to_amp(max_db),
            Scale::NegativeDecibel {
                min_db,
                max_db,
                offset,
                min_to_zero,
            } => offset - Scale::decibel(min_db, max_db, min_to_zero).min(),
        }
    }

    /// Clamp a raw value into `[min, max]`.
    pub fn clamp_raw(&self, raw: f64) -> f64 {
        raw.clamp(self.min(), self.max())
    }
}

#[inline]
fn spoly_curve(x: f64, power: f64) -> f64 {
    if x <= 0.5 {
        0.5 * (2.0 * x).powf(power)
    } else {
        1.0 - 0.5 * (2.0 - 2.0 * x).powf(power)
    }
}
