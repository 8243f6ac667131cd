pub mod states;
pub mod params;
pub mod constants;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod collisions;
pub mod conservation;
pub mod scenario;
