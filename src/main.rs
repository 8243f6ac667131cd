use ringfrag::{load_snapshots, convert_series, select_panels, render_ring_panels, open_in_viewer};
use ringfrag::{ConversionFactors, FragmentationConfig, RingPlotConfig};
use ringfrag::{DirectSimulator, FfmpegEncoder, FrameAnimator, Scenario, ScenarioTable, Selection};
use ringfrag::load_yaml;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(version, about = "Ring evolution plots and collision movies")]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Six-panel plot of ring surface density and seed masses
    RingPlot {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Open the image in the default viewer when done
        #[arg(long)]
        open: bool,
    },
    /// Run the collision scenarios and render a movie of each
    Fragmentation {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// 1-3 for a single scenario, 4 for all; prompts when omitted
        #[arg(short, long)]
        selection: Option<String>,
        /// Treat any out-of-range number as "all"
        #[arg(long)]
        legacy_selection: bool,
    },
}

// missing config file -> defaults
fn load_config<T: serde::de::DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(p) => load_yaml(p).with_context(|| format!("failed to load {}", p.display())),
        None => Ok(T::default()),
    }
}

fn ring_plot(config: Option<&Path>, open: bool) -> Result<()> {
    let cfg: RingPlotConfig = load_config(config)?;

    let mut simulation = load_snapshots(&cfg.simulation.path, cfg.simulation.output_interval)
        .with_context(|| format!("reading {}", cfg.simulation.path.display()))?;
    let mut cgs = load_snapshots(&cfg.cgs.path, cfg.cgs.output_interval)
        .with_context(|| format!("reading {}", cfg.cgs.path.display()))?;

    convert_series(&mut simulation, &ConversionFactors::simulation_to_display(&cfg.constants));
    convert_series(&mut cgs, &ConversionFactors::cgs_to_display(&cfg.constants));

    let panels = select_panels(&cfg.steps, &simulation, &cgs)?;
    render_ring_panels(&cfg, &panels)?;

    if open || cfg.open_viewer {
        open_in_viewer(&cfg.output);
    }
    Ok(())
}

fn prompt_selection() -> Result<String> {
    println!("Select a fragmentation movie to generate.");
    println!("1. Head-on disruption");
    println!("2. Off-axis supercatastrophic");
    println!("3. Hit and run");
    println!("4. All of the above");
    print!("? ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn fragmentation(config: Option<&Path>, selection: Option<String>, legacy: bool) -> Result<()> {
    let cfg: FragmentationConfig = load_config(config)?;

    let input = match selection {
        Some(s) => s,
        None => prompt_selection()?,
    };
    let selection = if legacy {
        Selection::parse_legacy(&input)?
    } else {
        Selection::parse(&input)?
    };

    let kinds = selection.scenarios();
    info!("generating {} movie(s)", kinds.len());

    let table = ScenarioTable::builtin();
    let mut simulator = DirectSimulator::new();
    fs::create_dir_all(&cfg.output_dir)?;

    for kind in kinds {
        let scenario = Scenario::build_scenario(kind, table.get(kind)?, &cfg);
        let output = scenario.run(&mut simulator)
            .with_context(|| format!("simulating {kind}"))?;

        let movie = cfg.output_dir.join(format!("{}.mp4", kind.id()));
        let animator = FrameAnimator::new(kind.title(), &cfg);
        let mut encoder = FfmpegEncoder::spawn(&cfg.ffmpeg, &movie, (animator.canvas_px, animator.canvas_px), cfg.fps)?;
        animator.render(&output, &mut encoder)
            .with_context(|| format!("rendering {}", movie.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match args.command {
        Cmd::RingPlot { config, open } => ring_plot(config.as_deref(), open),
        Cmd::Fragmentation { config, selection, legacy_selection } => {
            fragmentation(config.as_deref(), selection, legacy_selection)
        }
    }
}
