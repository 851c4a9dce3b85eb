// SPDX-License-Identifier: LGPL-3.0-or-later

//! # fxchain-dsp-units
//!
//! Signal-chain modules of the fxchain effect family, built on
//! [`fxchain_dsp_lib`]. It includes:
//!
//! - **Modulation**: double and single sideband amplitude modulators, with
//!   and without anti-aliasing
//! - **Dynamics**: peak-hold overdrive family, asymmetric drive and a
//!   lookahead brickwall limiter
//! - **Filters**: cascaded matched high shelf (slope filter) and the
//!   Linkwitz-Riley FIR crossover
//!
//! Every unit processes one `f64` sample per call. Parameter changes go
//! through `reset` (snap) or `push` (glide), and gliding units take the
//! owning core's smoothing coefficient `kp` on each call.

pub mod am;
pub mod dynamics;
pub mod filters;
