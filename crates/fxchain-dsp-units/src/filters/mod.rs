// SPDX-License-Identifier: LGPL-3.0-or-later

//! Filters: shelving cascade for spectral tilt and the linear-phase
//! Linkwitz-Riley crossover.

pub mod crossover;
pub mod slope;
