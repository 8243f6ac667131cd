//! Six-panel ring evolution figure.
//!
//! Each panel overlays the cgs run (blue) and the simulation-unit run (black):
//! surface density as a line on the left log axis, seed masses as a scatter
//! on the right log axis.

use std::path::Path;
use std::process::Command;

use log::{info, warn};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::configuration::config::RingPlotConfig;
use crate::error::{Error, Result};
use crate::ring::snapshot::{RingSnapshot, SnapshotSeries};

/// 8 x 9 inches at 300 dpi
pub const FIGURE_PX: (u32, u32) = (2400, 2700);
const PANEL_GRID: (usize, usize) = (3, 2);
const FONT: &str = "sans-serif";

/// The two snapshots drawn in one panel
#[derive(Debug, Clone, Copy)]
pub struct Panel<'a> {
    pub step: i64,
    pub simulation: &'a RingSnapshot,
    pub cgs: &'a RingSnapshot,
}

/// Resolve every requested step in both series before anything is drawn
pub fn select_panels<'a>(
    steps: &[i64],
    simulation: &'a SnapshotSeries,
    cgs: &'a SnapshotSeries,
) -> Result<Vec<Panel<'a>>> {
    steps
        .iter()
        .map(|&step| {
            let simulation = simulation.get(step).ok_or_else(|| Error::MissingStep {
                step,
                source_name: "simulation".to_string(),
            })?;
            let cgs = cgs.get(step).ok_or_else(|| Error::MissingStep {
                step,
                source_name: "cgs".to_string(),
            })?;
            Ok(Panel {
                step,
                simulation,
                cgs,
            })
        })
        .collect()
}

/// Pair up `x` and `y`, dropping points a log axis cannot show
pub fn log_points(x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
    x.iter()
        .zip(y)
        .filter(|(x, y)| x.is_finite() && y.is_finite() && **y > 0.0)
        .map(|(x, y)| (*x, *y))
        .collect()
}

/// Draw all panels into `cfg.output`
pub fn render_ring_panels(cfg: &RingPlotConfig, panels: &[Panel]) -> Result<()> {
    let expected = PANEL_GRID.0 * PANEL_GRID.1;
    if panels.len() != expected {
        return Err(Error::InvalidParameter {
            name: "steps",
            reason: format!("{} panels requested, figure holds {expected}", panels.len()),
        });
    }

    let root = BitMapBackend::new(&cfg.output, FIGURE_PX).into_drawing_area();
    root.fill(&WHITE).map_err(Error::plot)?;

    for (area, panel) in root.split_evenly(PANEL_GRID).iter().zip(panels) {
        draw_panel(area, panel, cfg)?;
    }

    root.present().map_err(Error::plot)?;
    info!("wrote {}", cfg.output.display());
    Ok(())
}

fn draw_panel(area: &DrawingArea<BitMapBackend<'_>, Shift>, panel: &Panel, cfg: &RingPlotConfig) -> Result<()> {
    let (x0, x1) = cfg.axes.x;
    let (s0, s1) = cfg.axes.sigma;
    let (m0, m1) = cfg.axes.seed_mass;
    let title = format!("{:5.1} My", cfg.constants.step_to_myr(panel.step));

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(120)
        .right_y_label_area_size(120);
    if cfg.draw_labels {
        builder.caption(title, (FONT, 40));
    }
    let mut chart = builder
        .build_cartesian_2d(x0..x1, (s0..s1).log_scale())
        .map_err(Error::plot)?
        .set_secondary_coord(x0..x1, (m0..m1).log_scale());

    if cfg.draw_labels {
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(format!("Distance to {} (planet radii)", cfg.planet))
            .y_desc("Σ (g·cm⁻²)")
            .label_style((FONT, 24))
            .draw()
            .map_err(Error::plot)?;

        chart
            .configure_secondary_axes()
            .y_desc("Mass of satellite (g)")
            .label_style((FONT, 24))
            .draw()
            .map_err(Error::plot)?;
    }

    // cgs run underneath, simulation-unit run on top
    for (snap, color, dot) in [(panel.cgs, BLUE, 4), (panel.simulation, BLACK, 3)] {
        chart
            .draw_series(LineSeries::new(
                log_points(&snap.radius, &snap.gsigma),
                color.stroke_width(3),
            ))
            .map_err(Error::plot)?;
        chart
            .draw_secondary_series(
                log_points(&snap.seed_a, &snap.seed_gm)
                    .into_iter()
                    .map(|p| Circle::new(p, dot, color.filled())),
            )
            .map_err(Error::plot)?;
    }
    Ok(())
}

/// Hand a finished image to the host's default viewer. Failures only warn.
pub fn open_in_viewer(path: &Path) {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    match cmd.arg(path).status() {
        Ok(status) if status.success() => {}
        Ok(status) => warn!("image viewer exited with {status}"),
        Err(e) => warn!("could not launch image viewer: {e}"),
    }
}
