//! Animated scatter plot of a collision run.
//!
//! Each retained frame drops the central body, shifts the remaining bodies
//! so their center of mass sits at the origin, and draws them as discs sized
//! by physical radius. The view is fixed by the initial separation of the
//! two colliders.

use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::configuration::config::FragmentationConfig;
use crate::error::{Error, Result};
use crate::simulation::engine::{BodyState, SimulationOutput};
use crate::simulation::states::NVec3;
use crate::visualization::encoder::FrameSink;

const FONT: &str = "sans-serif";
const COLLIDERS: [&str; 2] = ["Body1", "Body2"];

/// Mass-weighted center of the bodies that are not flagged missing
pub fn center_of_mass(bodies: &[BodyState], frame: usize) -> Result<NVec3> {
    let mut total = 0.0;
    let mut weighted = NVec3::zeros();
    for b in bodies.iter().filter(|b| !b.is_missing()) {
        total += b.gmass;
        weighted += b.gmass * b.rh;
    }
    if total == 0.0 {
        return Err(Error::NoValidBodies { frame });
    }
    Ok(weighted / total)
}

/// Shift every body by `-com`. Missing bodies stay missing.
pub fn recenter(bodies: &[BodyState], com: NVec3) -> Vec<BodyState> {
    bodies
        .iter()
        .map(|b| BodyState {
            rh: b.rh - com,
            ..b.clone()
        })
        .collect()
}

/// Half-width of the view: |y1| + |y2| of the colliders in the first frame
pub fn frame_scale(output: &SimulationOutput) -> Result<f64> {
    let first = output
        .frames
        .first()
        .ok_or_else(|| Error::MissingBody(COLLIDERS[0].to_string()))?;
    let mut scale = 0.0_f64;
    for name in COLLIDERS {
        let body = first
            .body(name)
            .ok_or_else(|| Error::MissingBody(name.to_string()))?;
        scale += body.rh.y.abs();
    }
    if !(scale.is_finite() && scale > 0.0) {
        return Err(Error::InvalidParameter {
            name: "frame scale",
            reason: format!("initial collider separation gives {scale}"),
        });
    }
    Ok(scale)
}

/// Disc radius in pixels for a body of `radius` on an axis of `axis_px`
/// pixels spanning `2 * scale` data units
pub fn marker_radius_px(radius: f64, scale: f64, axis_px: u32) -> u32 {
    let px_per_unit = axis_px as f64 / (2.0 * scale);
    (radius * px_per_unit).round().max(1.0) as u32
}

/// Frame indices visited for `n_frames` frames with stride `nskip`
pub fn frame_indices(n_frames: usize, nskip: usize) -> impl Iterator<Item = usize> {
    (0..n_frames).step_by(nskip.max(1))
}

pub struct FrameAnimator {
    pub title: String,
    pub central_body: String,
    pub canvas_px: u32,
    pub nskip: usize,
    pub draw_labels: bool, // title and axis names; needs a system font
}

impl FrameAnimator {
    pub fn new(title: &str, cfg: &FragmentationConfig) -> Self {
        Self {
            title: title.to_string(),
            central_body: cfg.central_body.clone(),
            canvas_px: cfg.canvas_px(),
            nskip: cfg.nskip,
            draw_labels: true,
        }
    }

    /// Draw every retained frame into `sink`, then finish it.
    /// Returns the number of frames written.
    pub fn render(&self, output: &SimulationOutput, sink: &mut dyn FrameSink) -> Result<usize> {
        if self.nskip == 0 {
            return Err(Error::InvalidParameter {
                name: "nskip",
                reason: "must be at least 1".to_string(),
            });
        }
        let scale = frame_scale(output)?;
        let size = (self.canvas_px, self.canvas_px);
        let mut buf = vec![0u8; (size.0 as usize) * (size.1 as usize) * 3];
        let mut written = 0;

        for idx in frame_indices(output.frames.len(), self.nskip) {
            let bodies: Vec<BodyState> = output.frames[idx]
                .bodies
                .iter()
                .filter(|b| b.name != self.central_body)
                .cloned()
                .collect();
            let com = center_of_mass(&bodies, idx)?;
            let centered = recenter(&bodies, com);

            {
                let root = BitMapBackend::with_buffer(&mut buf, size).into_drawing_area();
                self.draw_frame(&root, &centered, scale)?;
                root.present().map_err(Error::plot)?;
            }
            sink.write_frame(&buf)?;
            written += 1;
        }

        sink.finish()?;
        info!("rendered {written} frames of '{}'", self.title);
        Ok(written)
    }

    fn draw_frame(
        &self,
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        bodies: &[BodyState],
        scale: f64,
    ) -> Result<()> {
        root.fill(&WHITE).map_err(Error::plot)?;

        // Axes cover the middle 80% of the canvas
        let pad = self.canvas_px / 10;
        let mut builder = ChartBuilder::on(root);
        builder
            .margin_top(pad / 2)
            .margin_right(pad)
            .x_label_area_size(pad)
            .y_label_area_size(pad);
        if self.draw_labels {
            builder.caption(&self.title, (FONT, (self.canvas_px / 25).max(8)));
        }
        let mut chart = builder
            .build_cartesian_2d(-scale..scale, -scale..scale)
            .map_err(Error::plot)?;

        if self.draw_labels {
            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(0)
                .y_labels(0)
                .x_desc("x")
                .y_desc("y")
                .axis_desc_style((FONT, (self.canvas_px / 30).max(8)))
                .draw()
                .map_err(Error::plot)?;
        }

        let (axis_px, _) = chart.plotting_area().dim_in_pixel();
        chart
            .draw_series(bodies.iter().filter(|b| !b.is_missing()).map(|b| {
                Circle::new(
                    (b.rh.x, b.rh.y),
                    marker_radius_px(b.radius, scale, axis_px),
                    BLUE.filled(),
                )
            }))
            .map_err(Error::plot)?;
        Ok(())
    }
}
