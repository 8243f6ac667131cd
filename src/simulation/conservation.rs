//! Conserved quantities of a system, in `G*m` units.
//!
//! Both values carry an extra factor of G; only their relative drift matters.

use crate::simulation::states::{System3, NVec3};

/// Kinetic plus pairwise potential energy, times G
pub fn total_energy(sys: &System3) -> f64 {
    let kinetic: f64 = sys.bodies.iter().map(|b| 0.5 * b.m * b.v.norm_squared()).sum();

    let mut potential = 0.0;
    for (i, bi) in sys.bodies.iter().enumerate() {
        for bj in &sys.bodies[i + 1..] {
            let r = (bj.x - bi.x).norm();
            if r > 0.0 {
                potential -= bi.m * bj.m / r;
            }
        }
    }
    kinetic + potential
}

/// Orbital angular momentum about the origin, times G
pub fn angular_momentum(sys: &System3) -> NVec3 {
    sys.bodies.iter().map(|b| b.m * b.x.cross(&b.v)).sum()
}

/// |E - E0| / |E0|, or the absolute change when E0 is zero
pub fn relative_drift(e0: f64, e: f64) -> f64 {
    if e0 == 0.0 {
        (e - e0).abs()
    } else {
        ((e - e0) / e0).abs()
    }
}
