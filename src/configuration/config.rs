//! Configuration types for the ring plot and fragmentation movie pipelines.
//!
//! Both pipelines read a thin, `serde`-deserializable YAML file. Every field
//! has a default, so a partial file (or no file at all) is valid:
//!
//! - [`RingPlotConfig`]      – snapshot sources, unit constants, panel layout
//! - [`RingConstants`]       – planet and unit-system constants of a ring run
//! - [`FragmentationConfig`] – run parameters and movie settings
//!
//! # YAML format
//! An example ring plot configuration:
//!
//! ```yaml
//! simulation:
//!   path: "ring.dat"
//!   output_interval: 1.0e6     # t_print, simulation time units
//! cgs:
//!   path: "ring_cgs.dat"
//!   output_interval: 3.15576e13 # 1 My in seconds
//! constants:
//!   planet_radius_cm: 2.5559e9
//!   planet_radius_du: 1.0
//!   du2cm: 2.5559e9
//!   mu2gm: 8.681e28
//!   tu2s: 3.15576e7
//!   g_cgs: 6.674e-8
//!   year_s: 3.15576e7
//!   t_print: 1.0e6
//! planet: "Uranus"
//! steps: [0, 1, 10, 100, 200, 720]
//! output: "Uranus_ring_satellite_evolution.png"
//! open_viewer: false
//! draw_labels: true
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::Result;

/// Load any of the configuration structs from a YAML file
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let cfg: T = serde_yaml::from_reader(reader)?;
    Ok(cfg)
}

/// One binary snapshot stream and the time between its records
#[derive(Deserialize, Debug, Clone)]
pub struct SnapshotSource {
    pub path: PathBuf,
    pub output_interval: f64, // time between records, in the stream's own time unit
}

/// Physical constants of the ring run. Lengths in cm, masses in g, times in s.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RingConstants {
    pub planet_radius_cm: f64, // planet radius (cgs)
    pub planet_radius_du: f64, // planet radius in distance units
    pub du2cm: f64,            // distance unit -> cm
    pub mu2gm: f64,            // mass unit -> g
    pub tu2s: f64,             // time unit -> s
    pub g_cgs: f64,            // gravitational constant (cgs)
    pub year_s: f64,           // one year in s
    pub t_print: f64,          // output interval, simulation time units
}

impl Default for RingConstants {
    fn default() -> Self {
        // Uranus, with the planet radius as distance unit and the year as time unit
        let r_uranus = 2.5559e9;
        let year = 3.15576e7;
        Self {
            planet_radius_cm: r_uranus,
            planet_radius_du: 1.0,
            du2cm: r_uranus,
            mu2gm: 8.681e28,
            tu2s: year,
            g_cgs: 6.674e-8,
            year_s: year,
            t_print: 1.0e6,
        }
    }
}

impl RingConstants {
    /// Gravitational constant expressed in simulation units
    pub fn gu(&self) -> f64 {
        self.g_cgs * self.mu2gm * self.tu2s.powi(2) / self.du2cm.powi(3)
    }

    /// Elapsed time in My for a simulation-unit output step
    pub fn step_to_myr(&self, step: i64) -> f64 {
        step as f64 * self.t_print * self.tu2s / self.year_s * 1e-6
    }
}

/// Axis bounds shared by all six panels
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AxisBounds {
    pub x: (f64, f64),       // distance to planet, planet radii
    pub sigma: (f64, f64),   // surface density, g/cm^2 (log)
    pub seed_mass: (f64, f64), // satellite mass, g (log)
}

impl Default for AxisBounds {
    fn default() -> Self {
        Self {
            x: (1.0, 5.0),
            sigma: (1.0, 5e4),
            seed_mass: (1e13, 1e26),
        }
    }
}

/// Top-level ring plot configuration loaded from YAML
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RingPlotConfig {
    pub simulation: SnapshotSource, // snapshot stream in simulation units
    pub cgs: SnapshotSource,        // snapshot stream already in cgs
    pub constants: RingConstants,
    pub planet: String,  // axis label only
    pub steps: [i64; 6], // one output step per panel, row-major
    pub axes: AxisBounds,
    pub output: PathBuf,
    pub open_viewer: bool, // hand the PNG to the host image viewer when done
    pub draw_labels: bool, // titles and axis text; needs a system font
}

impl Default for RingPlotConfig {
    fn default() -> Self {
        let constants = RingConstants::default();
        Self {
            simulation: SnapshotSource {
                path: PathBuf::from("ring.dat"),
                output_interval: constants.t_print,
            },
            cgs: SnapshotSource {
                path: PathBuf::from("ring_cgs.dat"),
                output_interval: 1e6 * constants.year_s,
            },
            constants,
            planet: "Uranus".to_string(),
            steps: [0, 1, 10, 100, 200, 720],
            axes: AxisBounds::default(),
            output: PathBuf::from("Uranus_ring_satellite_evolution.png"),
            open_viewer: false,
            draw_labels: true,
        }
    }
}

/// Run and movie settings for the fragmentation scenarios
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FragmentationConfig {
    pub central_body: String,      // name of the body excluded from the movie
    pub density_kg_m3: f64,        // bulk density used to size the colliders
    pub dt: f64,                   // step size, years
    pub tstop: f64,                // end time, years
    pub istep_out: usize,          // record a frame every istep_out steps
    pub min_fragment_fraction: f64, // minimum fragment mass / smaller body mass
    pub gmtiny_fraction: f64,      // gmtiny / smaller body mass
    pub eps2: f64,                 // softening floor
    pub nskip: usize,              // frame stride for the movie
    pub fps: u32,
    pub figure_inches: f64,
    pub dpi: u32,
    pub output_dir: PathBuf,
    pub ffmpeg: PathBuf, // encoder binary
}

impl Default for FragmentationConfig {
    fn default() -> Self {
        Self {
            central_body: "Sun".to_string(),
            density_kg_m3: 3000.0,
            dt: 1e-5,
            tstop: 2.0e-3,
            istep_out: 1,
            min_fragment_fraction: 0.2,
            gmtiny_fraction: 0.99,
            eps2: 0.0,
            nskip: 1,
            fps: 60,
            figure_inches: 4.0,
            dpi: 300,
            output_dir: PathBuf::from("."),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

impl FragmentationConfig {
    /// Square canvas edge in pixels
    pub fn canvas_px(&self) -> u32 {
        (self.figure_inches * self.dpi as f64).round() as u32
    }
}
