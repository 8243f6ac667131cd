//! Acceleration contributors for the collision runs
//!
//! Bodies carry `G*m`, so the gravity term needs no gravitational constant

use crate::simulation::states::{System3, NVec3};

/// Collection of 3D acceleration terms.
/// Each term implements [`Acceleration3`] and their contributions are summed
/// into a single acceleration vector per body
#[derive(Default)]
pub struct AccelSet3 {
    terms: Vec<Box<dyn Acceleration3 + Send + Sync>>,
}

impl AccelSet3 {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an acceleration term
    pub fn with(mut self, term: impl Acceleration3 + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    /// Compute total accelerations at time `t` for all bodies in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&self, t: f64, sys: &System3, out: &mut [NVec3]) {
        for a in out.iter_mut() {
            *a = NVec3::zeros();
        }
        for term in &self.terms {
            term.acceleration(t, sys, out);
        }
    }
}

/// Trait for 3D acceleration sources operating on [`System3`]
/// Implementations add their contribution into `out[i]` for each body
pub trait Acceleration3 {
    fn acceleration(&self, t: f64, sys: &System3, out: &mut [NVec3]);
}

/// Direct-sum point-mass gravity with softening
pub struct NewtonianGravity3 {
    pub eps2: f64, // softening floor
}

impl Acceleration3 for NewtonianGravity3 {
    fn acceleration(&self, _t: f64, sys: &System3, out: &mut [NVec3]) {
        let n = sys.bodies.len();

        // Each unordered pair (i, j) once, applied to both bodies
        for i in 0..n {
            let bi = &sys.bodies[i];

            for j in (i + 1)..n {
                let bj = &sys.bodies[j];

                // r points from i to j: i is pulled along +r, j along -r
                let r = bj.x - bi.x;

                // Close passes are smoothed by the mean squared radius of the
                // pair, plus the global floor
                let soft2 = 0.5 * (bi.radius * bi.radius + bj.radius * bj.radius) + self.eps2;
                let d2 = r.dot(&r) + soft2;

                // 1 / |r_soft|^3
                let inv_r = d2.sqrt().recip();
                let inv_r3 = inv_r * inv_r * inv_r;

                // a_i +=  Gm_j * r / |r_soft|^3
                // a_j += -Gm_i * r / |r_soft|^3
                out[i] += inv_r3 * bj.m * r;
                out[j] -= inv_r3 * bi.m * r;
            }
        }
    }
}
