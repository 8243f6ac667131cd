//! Core state types for the collision runs.
//!
//! `Body3` / `System3` hold the live state advanced by the integrator.
//! Masses are stored as `G*m`, so gravity is evaluated with `G = 1`.

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone)]
pub struct Body3 {
    pub name: String,
    pub x: NVec3, // heliocentric position
    pub v: NVec3, // heliocentric velocity
    pub m: f64, // G * mass
    pub radius: f64, // physical radius, also used for softening
    pub rot: NVec3, // spin vector, carried but not integrated
}

impl Body3 {
    pub fn momentum(&self) -> NVec3 {
        self.m * self.v
    }
}

#[derive(Debug, Clone)]
pub struct System3 {
    pub bodies: Vec<Body3>, // bodies still in the run
    pub t: f64, // time
}

impl System3 {
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.name == name)
    }
}
