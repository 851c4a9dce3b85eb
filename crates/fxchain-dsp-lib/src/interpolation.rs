// SPDX-License-Identifier: LGPL-3.0-or-later

//! Polynomial interpolation between samples.

/// Third order Lagrange interpolation through four equally spaced points.
///
/// `t` in `[0, 1]` moves from `y[1]` to `y[2]`. `y[0]` and `y[3]` only
/// shape the curve.
///
/// # Examples
/// ```
/// use fxchain_dsp_lib::interpolation::cubic_interp;
///
/// let y = [0.0, 1.0, 2.0, 3.0];
/// assert!((cubic_interp(&y, 0.5) - 1.5).abs() < 1e-12);
/// ```
#[inline]
pub fn cubic_interp(y: &[f64; 4], t: f64) -> f64 {
    let u = 1.0 + t;
    let d0 = y[0] - y[1];
    let d1 = d0 - (y[1] - y[2]);
    let d2 = d1 - ((y[1] - y[2]) - (y[2] - y[3]));
    y[0] - ((d2 * (2.0 - u) / 3.0 + d1) * (1.0 - u) / 2.0 + d0) * u
}

/// Linear interpolation from `y0` (at `t = 0`) to `y1` (at `t = 1`).
#[inline]
pub fn linear_interp(y0: f64, y1: f64, t: f64) -> f64 {
    y0 + t * (y1 - y0)
}
