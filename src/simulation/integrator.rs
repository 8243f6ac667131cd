//! Fixed-step velocity-Verlet integrator for the collision runs
//!
//! Driven by an `AccelSet3` and the step size of `RunParameters`

use super::forces::AccelSet3;
use super::params::RunParameters;
use super::states::{System3, NVec3};

/// Advance the system by one step using velocity-Verlet.
/// Uses two force evaluations per step and updates positions, velocities,
/// and `sys.t` in-place with fixed step `dt = params.dt`.
pub fn verlet_integrator_3d(sys: &mut System3, forces: &AccelSet3, params: &RunParameters) {
    let n = sys.bodies.len();
    if n == 0 {
        return;
    }
    let dt = params.dt;
    let half_dt = 0.5 * dt;

    // a_n from x_n at time t_n
    let mut a_old = vec![NVec3::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a_old);

    // Kick: v_n+1/2 = v_n + (dt/2) * a_n
    for (b, a) in sys.bodies.iter_mut().zip(a_old.iter()) {
        b.v += half_dt * *a;
    }

    // Drift: x_n+1 = x_n + dt * v_n+1/2
    for b in sys.bodies.iter_mut() {
        b.x += dt * b.v;
    }

    sys.t += dt;

    // a_n+1 from x_n+1 at time t_n+1
    let mut a_new = vec![NVec3::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a_new);

    // Second kick: v_n+1 = v_n+1/2 + (dt/2) * a_n+1
    for (b, a) in sys.bodies.iter_mut().zip(a_new.iter()) {
        b.v += half_dt * *a;
    }
}
