//! Unit conversion for ring snapshots.
//!
//! The model writes `G*sigma` and `G*m` rather than bare masses, so both
//! conversions divide by a gravitational constant in the source unit system.

use crate::configuration::config::RingConstants;
use crate::ring::snapshot::{RingSnapshot, SnapshotSeries};

/// One multiplicative factor per snapshot field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionFactors {
    pub radius: f64,
    pub gsigma: f64,
    pub nu: f64,
    pub seed_a: f64,
    pub seed_gm: f64,
}

impl ConversionFactors {
    /// Factors that leave every field unchanged
    pub fn identity() -> Self {
        Self {
            radius: 1.0,
            gsigma: 1.0,
            nu: 1.0,
            seed_a: 1.0,
            seed_gm: 1.0,
        }
    }

    /// Simulation units -> planet radii, g/cm^2, cm^2/s and g
    pub fn simulation_to_display(c: &RingConstants) -> Self {
        let gu = c.gu();
        Self {
            radius: 1.0 / c.planet_radius_du,
            gsigma: c.mu2gm / c.du2cm.powi(2) / gu,
            nu: c.du2cm.powi(2) / c.tu2s,
            seed_a: 1.0 / c.planet_radius_du,
            seed_gm: c.mu2gm / gu,
        }
    }

    /// cgs -> planet radii and g; viscosity is already cgs
    pub fn cgs_to_display(c: &RingConstants) -> Self {
        Self {
            radius: 1.0 / c.planet_radius_cm,
            gsigma: 1.0 / c.g_cgs,
            nu: 1.0,
            seed_a: 1.0 / c.planet_radius_cm,
            seed_gm: 1.0 / c.g_cgs,
        }
    }

    /// Factors undoing this conversion
    pub fn reciprocal(&self) -> Self {
        Self {
            radius: self.radius.recip(),
            gsigma: self.gsigma.recip(),
            nu: self.nu.recip(),
            seed_a: self.seed_a.recip(),
            seed_gm: self.seed_gm.recip(),
        }
    }
}

fn scale(values: &mut [f64], factor: f64) {
    values.iter_mut().for_each(|v| *v *= factor);
}

/// Rescale a single snapshot in place. Time is left in source units.
pub fn convert_snapshot(snap: &mut RingSnapshot, f: &ConversionFactors) {
    scale(&mut snap.radius, f.radius);
    scale(&mut snap.gsigma, f.gsigma);
    scale(&mut snap.nu, f.nu);
    scale(&mut snap.seed_a, f.seed_a);
    scale(&mut snap.seed_gm, f.seed_gm);
}

/// Rescale every snapshot of a series in place
pub fn convert_series(series: &mut SnapshotSeries, f: &ConversionFactors) {
    for (_, snap) in series.iter_mut() {
        convert_snapshot(snap, f);
    }
}
