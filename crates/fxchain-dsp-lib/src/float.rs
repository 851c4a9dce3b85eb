// SPDX-License-Identifier: LGPL-3.0-or-later

//! Float helpers for the sample path.

/// Flush denormals, NaN and infinity to zero.
#[inline]
pub fn sanitize(x: f64) -> f64 {
    if x.is_finite() && x.abs() >= f64::MIN_POSITIVE {
        x
    } else {
        0.0
    }
}

/// Linear interpolation `a + t * (b - a)`.
///
/// `t = 0` returns `a` exactly and `t = 1` returns `b` exactly.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t == 1.0 { b } else { a + t * (b - a) }
}

/// Convert decibels to linear amplitude.
#[inline]
pub fn db_to_amp(db: f64) -> f64 {
    10.0f64.powf(db / 20.0)
}

/// Convert linear amplitude to decibels. Non-positive input gives `-inf`.
#[inline]
pub fn amp_to_db(amp: f64) -> f64 {
    if amp <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * amp.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(0.25), 0.25);
        assert_eq!(sanitize(-1.0), -1.0);
        assert_eq!(sanitize(f64::from_bits(1)), 0.0);
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(0.3, 0.7, 0.0), 0.3);
        assert_eq!(lerp(0.3, 0.7, 1.0), 0.7);
        assert_approx_eq!(f64, lerp(-1.0, 1.0, 0.25), -0.5, ulps = 2);
    }

    #[test]
    fn test_decibel_conversion() {
        assert_approx_eq!(f64, db_to_amp(-6.0), 0.501_187_233_627_272_2, epsilon = 1e-12);
        assert_approx_eq!(f64, amp_to_db(db_to_amp(12.5)), 12.5, epsilon = 1e-12);
        assert_eq!(amp_to_db(0.0), f64::NEG_INFINITY);
    }
}
