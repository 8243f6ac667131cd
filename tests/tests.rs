use approx::assert_relative_eq;

use ringfrag::simulation::constants::{density_to_sim, GU};
use ringfrag::visualization::animate::{frame_indices, marker_radius_px};
use ringfrag::{body_radius, center_of_mass, frame_scale, merge_bodies, recenter, resolve_collisions};
use ringfrag::{AccelSet3, Body3, BodyState, NewtonianGravity3, RunParameters, System3, NVec3};
use ringfrag::{DirectSimulator, Error, FragmentationConfig, FrameAnimator, FrameSink, Result};
use ringfrag::{Scenario, ScenarioKind, ScenarioTable, Selection, SimulationSetup, Simulator};

fn body(name: &str, x: [f64; 3], v: [f64; 3], m: f64, radius: f64) -> Body3 {
    Body3 {
        name: name.to_string(),
        x: x.into(),
        v: v.into(),
        m,
        radius,
        rot: NVec3::zeros(),
    }
}

/// Build a simple 2-body System3 separated along x-axis
pub fn two_body_system(dist: f64, m1: f64, m2: f64) -> System3 {
    System3 {
        bodies: vec![
            body("Body1", [-dist / 2.0, 0.0, 0.0], [0.0; 3], m1, 0.0),
            body("Body2", [dist / 2.0, 0.0, 0.0], [0.0; 3], m2, 0.0),
        ],
        t: 0.0,
    }
}

/// Default run parameters for tests
pub fn test_params() -> RunParameters {
    RunParameters {
        dt: 1e-4,
        tstop: 0.02,
        istep_out: 1,
        eps2: 0.0,
        fragmentation: false,
        gmtiny: 0.0,
        min_fragment_gmass: 0.0,
    }
}

fn state(name: &str, x: f64, y: f64, gmass: f64) -> BodyState {
    BodyState {
        name: name.to_string(),
        gmass,
        radius: 1e-3,
        rh: NVec3::new(x, y, 0.0),
        vh: NVec3::zeros(),
    }
}

/// Counts frames instead of encoding them
#[derive(Default)]
struct CountingSink {
    frames: usize,
    bytes: usize,
    finished: bool,
}

impl FrameSink for CountingSink {
    fn write_frame(&mut self, rgb: &[u8]) -> Result<()> {
        self.frames += 1;
        self.bytes = rgb.len();
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let sys = two_body_system(1.0, 2.0, 3.0);
    let forces = AccelSet3::new().with(NewtonianGravity3 { eps2: 0.0 });

    let mut acc = vec![NVec3::zeros(); 2];
    forces.accumulate_accels(sys.t, &sys, &mut acc);

    let net = acc[0] * sys.bodies[0].m + acc[1] * sys.bodies[1].m;
    assert!(net.norm() < 1e-12, "Net momentum not zero: {:?}", net);
}

#[test]
fn gravity_inverse_square_law() {
    let sys_r = two_body_system(1.0, 1.0, 1.0);
    let sys_2r = two_body_system(2.0, 1.0, 1.0);
    let forces = AccelSet3::new().with(NewtonianGravity3 { eps2: 0.0 });

    let mut acc_r = vec![NVec3::zeros(); 2];
    let mut acc_2r = vec![NVec3::zeros(); 2];
    forces.accumulate_accels(sys_r.t, &sys_r, &mut acc_r);
    forces.accumulate_accels(sys_2r.t, &sys_2r, &mut acc_2r);

    let ratio = acc_r[0].norm() / acc_2r[0].norm();
    assert!((ratio - 4.0).abs() < 1e-9, "Expected ~4x, got {}", ratio);
}

// ==================================================================================
// Scenario driver tests
// ==================================================================================

#[test]
fn derived_radius_recovers_mass() {
    let gmass = 1e-7;
    let r = body_radius(gmass, 3000.0);
    let rho = density_to_sim(3000.0);

    let recovered = 4.0 / 3.0 * std::f64::consts::PI * rho * r.powi(3) * GU;
    assert_relative_eq!(recovered, gmass, max_relative = 1e-12);
}

#[test]
fn selection_two_is_off_axis() {
    let sel = Selection::parse("2").unwrap();
    assert_eq!(sel.scenarios(), vec![ScenarioKind::SupercatastrophicOffAxis]);
    assert_eq!(sel.scenarios()[0].id(), "supercatastrophic_off_axis");
}

#[test]
fn selection_four_is_all() {
    let ids: Vec<&str> = Selection::parse("4\n")
        .unwrap()
        .scenarios()
        .iter()
        .map(|k| k.id())
        .collect();
    assert_eq!(ids, ["disruption_headon", "supercatastrophic_off_axis", "hitandrun"]);
}

#[test]
fn strict_selection_rejects_out_of_range() {
    for input in ["0", "5", "9", "-1", "two", ""] {
        assert!(
            matches!(Selection::parse(input), Err(Error::InvalidSelection(_))),
            "accepted {input:?}"
        );
    }
}

#[test]
fn legacy_selection_falls_back_to_all() {
    for input in ["4", "0", "9", "-3"] {
        assert_eq!(Selection::parse_legacy(input).unwrap(), Selection::All);
    }
    assert_eq!(
        Selection::parse_legacy("3").unwrap(),
        Selection::One(ScenarioKind::HitAndRun)
    );
    assert!(matches!(
        Selection::parse_legacy("x"),
        Err(Error::InvalidSelection(_))
    ));
}

#[test]
fn scenario_setup_uses_smaller_body_thresholds() {
    let cfg = FragmentationConfig::default();
    let table = ScenarioTable::builtin();
    let kind = ScenarioKind::DisruptionHeadon;
    let scenario = Scenario::build_scenario(kind, table.get(kind).unwrap(), &cfg);

    let names: Vec<&str> = scenario.setup.system.bodies.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Sun", "Body1", "Body2"]);
    assert_relative_eq!(scenario.setup.system.bodies[0].m, GU);

    let p = &scenario.setup.params;
    assert_relative_eq!(p.gmtiny, 0.99e-10, max_relative = 1e-12);
    assert_relative_eq!(p.min_fragment_gmass, 0.2e-10, max_relative = 1e-12);
    assert_relative_eq!(p.dt, 1e-5);
    assert_relative_eq!(p.tstop, 2e-3);
    assert_eq!(p.step_count(), 200);

    let b1 = &scenario.setup.system.bodies[1];
    assert_relative_eq!(b1.radius, body_radius(1e-7, 3000.0));
}

// ==================================================================================
// Collision tests
// ==================================================================================

#[test]
fn merger_conserves_mass_and_momentum() {
    let a = body("Body1", [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], 3.0, 2.0);
    let b = body("Body2", [1.0, 0.0, 0.0], [0.0, -1.0, 2.0], 1.0, 1.0);
    let merged = merge_bodies(&a, &b);

    assert_eq!(merged.name, "Body1");
    assert_relative_eq!(merged.m, 4.0);
    let p = a.momentum() + b.momentum();
    assert_relative_eq!((merged.momentum() - p).norm(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(merged.radius.powi(3), 9.0, max_relative = 1e-12);
    assert_relative_eq!(merged.x.x, 0.25);
}

#[test]
fn fast_pair_crossing_in_one_step_is_caught() {
    // Both bodies jump past each other within a single step
    let mut sys = System3 {
        bodies: vec![
            body("Body1", [0.1, 0.0, 0.0], [0.0; 3], 2.0, 0.01),
            body("Body2", [-0.1, 0.0, 0.0], [0.0; 3], 1.0, 0.01),
        ],
        t: 1.0,
    };
    let prev = vec![NVec3::new(-0.1, 0.0, 0.0), NVec3::new(0.1, 0.0, 0.0)];

    let records = resolve_collisions(&mut sys, &prev);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].survivor, "Body1");
    assert_eq!(records[0].absorbed, "Body2");
    assert_eq!(sys.bodies.len(), 1);
}

#[test]
fn head_on_run_records_collision_and_missing_rows() {
    let setup = SimulationSetup {
        system: System3 {
            bodies: vec![
                body("Body1", [-0.01, 0.0, 0.0], [1.0, 0.0, 0.0], 2e-10, 1e-3),
                body("Body2", [0.01, 0.0, 0.0], [-1.0, 0.0, 0.0], 1e-10, 1e-3),
            ],
            t: 0.0,
        },
        params: test_params(),
    };

    let output = DirectSimulator::new().run(&setup).unwrap();
    assert_eq!(output.frames.len(), 201);
    assert_eq!(output.collisions.len(), 1);

    let last = output.frames.last().unwrap();
    assert_eq!(last.bodies.len(), 2);
    assert!(last.body("Body2").unwrap().is_missing());
    assert_relative_eq!(last.body("Body1").unwrap().gmass, 3e-10, max_relative = 1e-12);
}

#[test]
fn duplicate_body_names_are_rejected() {
    let mut system = two_body_system(1.0, 1.0, 1.0);
    system.bodies[1].name = "Body1".to_string();
    let setup = SimulationSetup { system, params: test_params() };

    assert!(matches!(
        DirectSimulator::new().run(&setup),
        Err(Error::InvalidParameter { name: "bodies", .. })
    ));
}

// ==================================================================================
// Animation tests
// ==================================================================================

#[test]
fn center_of_mass_of_symmetric_pair_is_origin() {
    let bodies = vec![state("Body1", 1.0, 0.0, 1.0), state("Body2", -1.0, 0.0, 1.0)];
    let com = center_of_mass(&bodies, 0).unwrap();
    assert_eq!(com, NVec3::zeros());

    let centered = recenter(&bodies, com);
    assert_eq!(centered[0].rh, NVec3::new(1.0, 0.0, 0.0));
    assert_eq!(centered[1].rh, NVec3::new(-1.0, 0.0, 0.0));

    let moment: NVec3 = centered.iter().map(|b| b.gmass * b.rh).sum();
    assert_relative_eq!(moment.norm(), 0.0, epsilon = 1e-15);
}

#[test]
fn center_of_mass_skips_missing_rows() {
    let bodies = vec![
        state("Body1", 3.0, 1.0, 1.0),
        state("Body2", 1.0, 1.0, 3.0),
        BodyState::missing("Body3"),
    ];
    let com = center_of_mass(&bodies, 4).unwrap();
    assert_relative_eq!(com.x, 1.5);
    assert_relative_eq!(com.y, 1.0);

    let centered = recenter(&bodies, com);
    assert!(centered[2].is_missing());
}

#[test]
fn center_of_mass_without_valid_bodies_is_an_error() {
    let bodies = vec![BodyState::missing("Body1"), BodyState::missing("Body2")];
    assert!(matches!(
        center_of_mass(&bodies, 7),
        Err(Error::NoValidBodies { frame: 7 })
    ));
    assert!(matches!(center_of_mass(&[], 0), Err(Error::NoValidBodies { frame: 0 })));
}

#[test]
fn marker_size_follows_axis_scale() {
    // 1000 px across 2 units
    assert_eq!(marker_radius_px(0.1, 1.0, 1000), 50);
    assert_eq!(marker_radius_px(1e-9, 1.0, 1000), 1);
    assert_eq!(frame_indices(10, 3).collect::<Vec<_>>(), [0, 3, 6, 9]);
}

#[test]
fn animator_feeds_every_retained_frame_to_the_sink() {
    let mut cfg = FragmentationConfig::default();
    cfg.tstop = 1e-4;
    cfg.nskip = 3;
    cfg.figure_inches = 1.0;
    cfg.dpi = 64;

    let table = ScenarioTable::builtin();
    let kind = ScenarioKind::SupercatastrophicOffAxis;
    let scenario = Scenario::build_scenario(kind, table.get(kind).unwrap(), &cfg);
    let output = scenario.run(&mut DirectSimulator::new()).unwrap();
    assert_eq!(output.frames.len(), 11);
    assert_relative_eq!(frame_scale(&output).unwrap(), 8.4e-5, max_relative = 1e-12);

    let mut animator = FrameAnimator::new(kind.title(), &cfg);
    animator.draw_labels = false;
    let mut sink = CountingSink::default();
    let written = animator.render(&output, &mut sink).unwrap();

    assert_eq!(written, 4);
    assert_eq!(sink.frames, 4);
    assert_eq!(sink.bytes, 64 * 64 * 3);
    assert!(sink.finished);
}
