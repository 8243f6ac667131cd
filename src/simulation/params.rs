//! Run parameters handed to a simulator
//!
//! `RunParameters` holds the step size and end time, the output cadence,
//! the softening floor and the fragmentation thresholds of a collision run.

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct RunParameters {
    pub dt: f64, // step size
    pub tstop: f64, // time end
    pub istep_out: usize, // steps between recorded frames
    pub eps2: f64, // softening
    pub fragmentation: bool, // collisions may produce fragments
    pub gmtiny: f64, // bodies below this G*m are merged, never fragmented
    pub min_fragment_gmass: f64, // smallest fragment a collision may produce
}

impl RunParameters {
    /// Number of whole steps needed to reach `tstop`
    pub fn step_count(&self) -> usize {
        (self.tstop / self.dt).round() as usize
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidParameter {
                    name,
                    reason: format!("must be positive and finite, got {value}"),
                })
            }
        };
        positive("dt", self.dt)?;
        positive("tstop", self.tstop)?;
        if self.istep_out == 0 {
            return Err(Error::InvalidParameter {
                name: "istep_out",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.eps2 >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "eps2",
                reason: format!("must be non-negative, got {}", self.eps2),
            });
        }
        if self.fragmentation {
            positive("gmtiny", self.gmtiny)?;
            positive("min_fragment_gmass", self.min_fragment_gmass)?;
        }
        Ok(())
    }
}
