//! The simulator seam and its built-in implementation.
//!
//! A [`Simulator`] takes a fully-initialized [`SimulationSetup`] and returns
//! a time-indexed [`SimulationOutput`]. Every frame lists every body of the
//! initial setup in the same order. Bodies that were absorbed in a merger
//! remain as missing rows (all fields NaN), so frames stay aligned.

use std::collections::HashSet;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::simulation::collisions::{resolve_collisions, CollisionRecord};
use crate::simulation::conservation::{angular_momentum, relative_drift, total_energy};
use crate::simulation::forces::{AccelSet3, NewtonianGravity3};
use crate::simulation::integrator::verlet_integrator_3d;
use crate::simulation::params::RunParameters;
use crate::simulation::states::{System3, NVec3};

/// Initial conditions plus run parameters
#[derive(Debug, Clone)]
pub struct SimulationSetup {
    pub system: System3,
    pub params: RunParameters,
}

/// One body in one output frame
#[derive(Debug, Clone, PartialEq)]
pub struct BodyState {
    pub name: String,
    pub gmass: f64,
    pub radius: f64,
    pub rh: NVec3,
    pub vh: NVec3,
}

impl BodyState {
    /// Placeholder for a body that no longer exists
    pub fn missing(name: &str) -> Self {
        let nan = NVec3::from_element(f64::NAN);
        Self {
            name: name.to_string(),
            gmass: f64::NAN,
            radius: f64::NAN,
            rh: nan,
            vh: nan,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.gmass.is_nan() || self.rh.iter().any(|c| c.is_nan())
    }
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub t: f64,
    pub bodies: Vec<BodyState>,
    pub energy: f64,            // G * total energy
    pub angular_momentum: NVec3, // G * total angular momentum
}

impl Frame {
    pub fn body(&self, name: &str) -> Option<&BodyState> {
        self.bodies.iter().find(|b| b.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub frames: Vec<Frame>,
    pub collisions: Vec<CollisionRecord>,
}

impl SimulationOutput {
    /// Relative energy change between the first and last frame
    pub fn energy_drift(&self) -> Option<f64> {
        let first = self.frames.first()?;
        let last = self.frames.last()?;
        Some(relative_drift(first.energy, last.energy))
    }
}

/// Anything that can turn initial conditions into output frames
pub trait Simulator {
    fn run(&mut self, setup: &SimulationSetup) -> Result<SimulationOutput>;
}

/// Direct-sum gravity, velocity-Verlet steps, perfect-merger collisions.
///
/// Fragment generation is not modelled. The fragmentation thresholds in
/// [`RunParameters`] are validated but every contact resolves as a merger.
#[derive(Debug, Default)]
pub struct DirectSimulator;

impl DirectSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl Simulator for DirectSimulator {
    fn run(&mut self, setup: &SimulationSetup) -> Result<SimulationOutput> {
        let params = &setup.params;
        params.validate()?;

        let names: Vec<String> = setup.system.bodies.iter().map(|b| b.name.clone()).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidParameter {
                    name: "bodies",
                    reason: format!("body name '{name}' is used twice"),
                });
            }
        }

        let mut sys = setup.system.clone();
        let forces = AccelSet3::new().with(NewtonianGravity3 { eps2: params.eps2 });
        let steps = params.step_count();

        info!(
            "running {} bodies for {} steps (dt = {:e}, gmtiny = {:e})",
            names.len(),
            steps,
            params.dt,
            params.gmtiny
        );

        let mut frames = vec![record_frame(&sys, &names)];
        let mut collisions = Vec::new();

        for step in 1..=steps {
            let prev_x: Vec<NVec3> = sys.bodies.iter().map(|b| b.x).collect();
            verlet_integrator_3d(&mut sys, &forces, params);

            for rec in resolve_collisions(&mut sys, &prev_x) {
                debug!(
                    "t = {:e}: {} absorbed {} at separation {:e}",
                    rec.t, rec.survivor, rec.absorbed, rec.separation
                );
                collisions.push(rec);
            }

            if step % params.istep_out == 0 {
                frames.push(record_frame(&sys, &names));
            }
        }

        let output = SimulationOutput { frames, collisions };
        if let Some(drift) = output.energy_drift() {
            info!(
                "{} frames, {} collisions, relative energy drift {:.3e}",
                output.frames.len(),
                output.collisions.len(),
                drift
            );
        }
        Ok(output)
    }
}

fn record_frame(sys: &System3, names: &[String]) -> Frame {
    let bodies = names
        .iter()
        .map(|name| match sys.position_of(name) {
            Some(i) => {
                let b = &sys.bodies[i];
                BodyState {
                    name: name.clone(),
                    gmass: b.m,
                    radius: b.radius,
                    rh: b.x,
                    vh: b.v,
                }
            }
            None => BodyState::missing(name),
        })
        .collect();

    Frame {
        t: sys.t,
        bodies,
        energy: total_energy(sys),
        angular_momentum: angular_momentum(sys),
    }
}
