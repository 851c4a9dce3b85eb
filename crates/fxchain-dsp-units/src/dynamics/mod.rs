// SPDX-License-Identifier: LGPL-3.0-or-later

//! Dynamics processors: peak-hold overdrive, asymmetric drive and the
//! lookahead limiter that follows them in the overdrive chain.

pub mod asym_drive;
pub mod limiter;
pub mod overdrive;
