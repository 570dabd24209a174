//! Area Diagram CLI
//!
//! Usage:
//!   area-diagram [OPTIONS] <MODEL>
//!
//! Options:
//!   -c, --config <FILE>      Diagram configuration (TOML)
//!   -r, --root <ID>          Area to focus (defaults to the model root)
//!   -z, --zoom <FACTOR>      Zoom factor, anchored at the screen origin
//!   -p, --pan <X,Y>          Screen translation
//!   --hit <X,Y>              Report the area under a screen point
//!   --view-state <FILE>      Restore zoom/pan from a TOML record
//!   --save-view-state <FILE> Write the final zoom/pan to a TOML record
//!   -d, --debug              Verbose logging
//!   -h, --help               Print help

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::Level;

use area_diagram::config::{load_view_state, save_view_state};
use area_diagram::model::{AreaId, AreaModel, AreaSource};
use area_diagram::{Diagram, DiagramConfig, DiagramError, Point};

#[derive(Parser)]
#[command(name = "area-diagram")]
#[command(about = "Lay out a nested area model and inspect it in screen space")]
struct Cli {
    /// Area model file (TOML)
    model: PathBuf,

    /// Diagram configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Area id to use as the diagram root
    #[arg(short, long)]
    root: Option<u64>,

    /// Zoom factor, anchored at the screen origin
    #[arg(short, long)]
    zoom: Option<f64>,

    /// Screen translation as X,Y
    #[arg(short, long, value_parser = parse_point, allow_hyphen_values = true)]
    pan: Option<Point>,

    /// Report the area under the screen point X,Y
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    hit: Option<Point>,

    /// Restore zoom and pan from a saved view state
    #[arg(long)]
    view_state: Option<PathBuf>,

    /// Save the resulting zoom and pan
    #[arg(long)]
    save_view_state: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    debug: bool,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x '{}': {}", x, e))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y '{}': {}", y, e))?;
    Ok(Point::new(x, y))
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), DiagramError> {
    let config = match &cli.config {
        Some(path) => DiagramConfig::from_file(path)?,
        None => DiagramConfig::default(),
    };
    let model = AreaModel::from_file(&cli.model)?;
    let mut diagram = Diagram::build(&model, cli.root.map(AreaId), &config)?;

    if let Some(path) = &cli.view_state {
        diagram.restore_view(load_view_state(path)?)?;
    }
    if let Some(zoom) = cli.zoom {
        diagram.transform_mut().set_zoom(zoom, Point::new(0.0, 0.0))?;
    }
    if let Some(pan) = cli.pan {
        diagram.transform_mut().set_translation(pan.x, pan.y)?;
    }

    println!("{}", diagram.outline(&model));
    for warning in diagram.registry().warnings() {
        eprintln!("warning: {}", warning);
    }

    if let Some(point) = cli.hit {
        match diagram.hit_test(point) {
            Some(hit) => {
                let help = if diagram.is_over_help_icon(point) {
                    " (help icon)"
                } else {
                    ""
                };
                println!(
                    "hit {}: {} ({}){}",
                    point,
                    model.name(hit.area),
                    hit.area,
                    help
                );
            }
            None => println!("hit {}: nothing", point),
        }
    }

    if let Some(path) = &cli.save_view_state {
        save_view_state(path, &diagram.transform().state())?;
    }
    Ok(())
}
