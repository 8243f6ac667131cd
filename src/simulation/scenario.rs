//! Build the collision scenarios and hand them to a simulator
//!
//! Three two-body collisions are defined, each placing a pair of bodies at
//! 1 AU around a solar-mass central body:
//! - `disruption_headon`          – head-on disruption
//! - `supercatastrophic_off_axis` – off-axis supercatastrophic impact
//! - `hitandrun`                  – grazing hit-and-run
//!
//! The initial vectors live in an immutable [`ScenarioTable`] built once at
//! startup. [`Selection`] turns the operator's menu choice into the list of
//! scenarios to run.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use log::{info, warn};

use crate::configuration::config::FragmentationConfig;
use crate::error::{Error, Result};
use crate::simulation::constants::{density_to_sim, AU2M, GU, RSUN};
use crate::simulation::engine::{SimulationOutput, SimulationSetup, Simulator};
use crate::simulation::params::RunParameters;
use crate::simulation::states::{Body3, NVec3, System3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScenarioKind {
    DisruptionHeadon,
    SupercatastrophicOffAxis,
    HitAndRun,
}

impl ScenarioKind {
    /// Menu order
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::DisruptionHeadon,
        ScenarioKind::SupercatastrophicOffAxis,
        ScenarioKind::HitAndRun,
    ];

    /// Identifier used for the run directory and movie file name
    pub fn id(&self) -> &'static str {
        match self {
            ScenarioKind::DisruptionHeadon => "disruption_headon",
            ScenarioKind::SupercatastrophicOffAxis => "supercatastrophic_off_axis",
            ScenarioKind::HitAndRun => "hitandrun",
        }
    }

    /// Movie title
    pub fn title(&self) -> &'static str {
        match self {
            ScenarioKind::DisruptionHeadon => "Head-on Disruption",
            ScenarioKind::SupercatastrophicOffAxis => "Off-axis Supercatastrophic",
            ScenarioKind::HitAndRun => "Hit and Run",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Validated menu choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    One(ScenarioKind),
    All,
}

impl Selection {
    /// Accept exactly `1`, `2`, `3` or `4` (all)
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim() {
            "1" => Ok(Selection::One(ScenarioKind::ALL[0])),
            "2" => Ok(Selection::One(ScenarioKind::ALL[1])),
            "3" => Ok(Selection::One(ScenarioKind::ALL[2])),
            "4" => Ok(Selection::All),
            other => Err(Error::InvalidSelection(other.to_string())),
        }
    }

    /// Old menu behaviour: any integer outside 1..=3 means "all".
    /// Input that is not an integer is still rejected.
    pub fn parse_legacy(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let choice: i64 = trimmed
            .parse()
            .map_err(|_| Error::InvalidSelection(trimmed.to_string()))?;
        match choice {
            1..=3 => Ok(Selection::One(ScenarioKind::ALL[(choice - 1) as usize])),
            4 => Ok(Selection::All),
            _ => {
                warn!("selection {choice} is out of range, generating all scenarios");
                Ok(Selection::All)
            }
        }
    }

    pub fn scenarios(&self) -> Vec<ScenarioKind> {
        match self {
            Selection::One(kind) => vec![*kind],
            Selection::All => ScenarioKind::ALL.to_vec(),
        }
    }
}

impl FromStr for Selection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Selection::parse(s)
    }
}

/// Initial heliocentric vectors and masses of the two colliders
#[derive(Debug, Clone)]
pub struct ScenarioDefinition {
    pub rh: [NVec3; 2],
    pub vh: [NVec3; 2],
    pub rot: [NVec3; 2],
    pub gmass: [f64; 2],
}

impl ScenarioDefinition {
    /// G*m of the smaller collider
    pub fn smaller_gmass(&self) -> f64 {
        self.gmass[0].min(self.gmass[1])
    }
}

/// Immutable lookup of every scenario definition
#[derive(Debug, Clone)]
pub struct ScenarioTable {
    entries: BTreeMap<ScenarioKind, ScenarioDefinition>,
}

impl ScenarioTable {
    /// Initial conditions found by trial and error
    pub fn builtin() -> Self {
        let v = NVec3::new;
        let mut entries = BTreeMap::new();

        entries.insert(
            ScenarioKind::DisruptionHeadon,
            ScenarioDefinition {
                rh: [v(1.0, -2.807993e-05, 0.0), v(1.0, 2.807993e-05, 0.0)],
                vh: [v(-2.562596e-04, 6.280005, 0.0), v(-2.562596e-04, -6.280005, 0.0)],
                rot: [NVec3::zeros(), NVec3::zeros()],
                gmass: [1e-7, 1e-10],
            },
        );
        entries.insert(
            ScenarioKind::SupercatastrophicOffAxis,
            ScenarioDefinition {
                rh: [v(1.0, -4.2e-05, 0.0), v(1.0, 4.2e-05, 0.0)],
                vh: [v(0.0, 6.28, 0.0), v(1.0, -6.28, 0.0)],
                rot: [v(0.0, 0.0, -6.0e4), v(0.0, 0.0, 1.0e5)],
                gmass: [1e-7, 1e-8],
            },
        );
        entries.insert(
            ScenarioKind::HitAndRun,
            ScenarioDefinition {
                rh: [v(1.0, -2.0e-05, 0.0), v(0.999999, 2.0e-05, 0.0)],
                vh: [v(0.0, 6.28, 0.0), v(-0.1, -6.28, 0.0)],
                rot: [v(0.0, 0.0, 6.0e4), v(0.0, 0.0, 1.0e5)],
                gmass: [1e-7, 7e-10],
            },
        );

        Self { entries }
    }

    pub fn get(&self, kind: ScenarioKind) -> Result<&ScenarioDefinition> {
        self.entries.get(&kind).ok_or_else(|| Error::InvalidParameter {
            name: "scenario",
            reason: format!("no definition for {kind}"),
        })
    }
}

/// Radius of a sphere of bulk density `density_kg_m3` holding `gmass`
/// (AU^3 yr^-2): r = (Gm / GU / (4/3 pi rho))^(1/3), in AU
pub fn body_radius(gmass: f64, density_kg_m3: f64) -> f64 {
    let density = density_to_sim(density_kg_m3);
    ((gmass / GU) / (4.0 / 3.0 * PI * density)).cbrt()
}

/// A scenario ready to run: the central body plus two colliders
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub setup: SimulationSetup,
}

impl Scenario {
    pub fn build_scenario(kind: ScenarioKind, def: &ScenarioDefinition, cfg: &FragmentationConfig) -> Self {
        let central = Body3 {
            name: cfg.central_body.clone(),
            x: NVec3::zeros(),
            v: NVec3::zeros(),
            m: GU,
            radius: RSUN / AU2M,
            rot: NVec3::zeros(),
        };

        let colliders = (0..2).map(|i| Body3 {
            name: format!("Body{}", i + 1),
            x: def.rh[i],
            v: def.vh[i],
            m: def.gmass[i],
            radius: body_radius(def.gmass[i], cfg.density_kg_m3),
            rot: def.rot[i],
        });

        let mut bodies = vec![central];
        bodies.extend(colliders);

        // Fragments are floored at a fraction of the smaller collider, and
        // gmtiny sits just below it to stop runaway collisional cascades
        let smaller = def.smaller_gmass();
        let params = RunParameters {
            dt: cfg.dt,
            tstop: cfg.tstop,
            istep_out: cfg.istep_out,
            eps2: cfg.eps2,
            fragmentation: true,
            gmtiny: cfg.gmtiny_fraction * smaller,
            min_fragment_gmass: cfg.min_fragment_fraction * smaller,
        };

        Self {
            kind,
            setup: SimulationSetup {
                system: System3 { bodies, t: 0.0 },
                params,
            },
        }
    }

    pub fn run(&self, simulator: &mut dyn Simulator) -> Result<SimulationOutput> {
        info!("running scenario {}", self.kind);
        simulator.run(&self.setup)
    }
}
