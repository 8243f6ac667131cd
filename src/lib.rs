pub mod error;
pub mod configuration;
pub mod ring;
pub mod simulation;
pub mod visualization;

pub use error::{Error, Result};

pub use configuration::config::{load_yaml, AxisBounds, FragmentationConfig, RingConstants, RingPlotConfig, SnapshotSource};

pub use ring::snapshot::{load_snapshots, read_series, save_snapshots, step_index, RingSnapshot, SnapshotReader, SnapshotSeries, SnapshotWriter};
pub use ring::units::{convert_series, convert_snapshot, ConversionFactors};
pub use ring::plot::{log_points, open_in_viewer, render_ring_panels, select_panels, Panel};

pub use simulation::states::{Body3, System3, NVec3};
pub use simulation::params::RunParameters;
pub use simulation::forces::{Acceleration3, AccelSet3, NewtonianGravity3};
pub use simulation::integrator::verlet_integrator_3d;
pub use simulation::collisions::{detect_contacts, merge_bodies, resolve_collisions, CollisionRecord};
pub use simulation::engine::{BodyState, DirectSimulator, Frame, SimulationOutput, SimulationSetup, Simulator};
pub use simulation::scenario::{body_radius, Scenario, ScenarioDefinition, ScenarioKind, ScenarioTable, Selection};

pub use visualization::animate::{center_of_mass, frame_scale, recenter, FrameAnimator};
pub use visualization::encoder::{FfmpegEncoder, FrameSink};
