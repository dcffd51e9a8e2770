use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use roadalign_alignment::{
    Alignment, InputSystem, PiAlignmentSpec, StationIncrements, StationPoint,
};
use roadalign_core::Point;
use roadalign_geometry::{Geometry, GeometryElement, Side};
use roadalign_parser::Value;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod error;

use error::{CliError, ErrorCode};

#[derive(Parser)]
#[command(name = "roadalign", version, about = "Horizontal road alignment geometry")]
struct Cli {
    /// Log resolved geometry to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarise an alignment and its elements
    Info {
        /// Alignment file (YAML or JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Points along the centreline, or beside it with --offset
    Points {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Station interval
        #[arg(long, allow_negative_numbers = true)]
        step: f64,

        /// Distance from the centreline
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        offset: f64,

        /// Side of the offset: left or right
        #[arg(long, default_value = "left")]
        side: Side,

        /// Print JSON instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// Stations for cross sections
    Stations {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        from: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        to: Option<f64>,

        /// Interval for every element type
        #[arg(long, conflicts_with_all = ["line", "curve", "spiral"])]
        step: Option<f64>,

        #[arg(long)]
        line: Option<f64>,

        #[arg(long)]
        curve: Option<f64>,

        #[arg(long)]
        spiral: Option<f64>,

        /// Leave out element start and end stations
        #[arg(long)]
        no_geometry_points: bool,

        #[arg(long)]
        json: bool,
    },

    /// Station and offset of a point
    Locate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        /// The point is in the global frame rather than the alignment's system
        #[arg(long)]
        global: bool,

        #[arg(long)]
        json: bool,
    },

    /// Build an alignment from points of intersection and print it as JSON
    FromPis {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Override the alignment name
        #[arg(long)]
        name: Option<String>,

        /// Override the start station
        #[arg(long, allow_negative_numbers = true)]
        sta_start: Option<f64>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    // clap exits with 2 on bad usage; usage errors here are 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().context("failed to write usage")?;
            return Ok(if e.use_stderr() {
                ExitCode::from(ErrorCode::Usage as u8)
            } else {
                ExitCode::SUCCESS
            });
        }
    };
    init_logging(cli.verbose);

    Ok(match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.code as u8)
        }
    })
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = Value::from_document_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(path = %path.display(), "document loaded");
    Ok(value)
}

fn load_alignment(path: &Path) -> Result<Alignment, CliError> {
    let doc = read_document(path).map_err(|e| CliError::input(format!("{e:#}")))?;
    Alignment::from_value(&doc)
        .map_err(|e| CliError::input(format!("{}: {e}", path.display())))
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Info { file } => info(&load_alignment(&file)?),
        Command::Points {
            file,
            step,
            offset,
            side,
            json,
        } => {
            let alignment = load_alignment(&file)?;
            let points = if offset == 0.0 {
                alignment.generate_points(step)
            } else {
                alignment.generate_offset_points(offset, step, side)
            }
            .map_err(CliError::from_query)?;
            print_points(&points, json)
        }
        Command::Stations {
            file,
            from,
            to,
            step,
            line,
            curve,
            spiral,
            no_geometry_points,
            json,
        } => {
            let alignment = load_alignment(&file)?;
            let range = match (from, to) {
                (None, None) => None,
                (from, to) => Some((
                    from.unwrap_or(alignment.sta_start()),
                    to.unwrap_or(alignment.sta_end()),
                )),
            };
            let increments = match step {
                Some(step) => StationIncrements::uniform(step),
                None => {
                    let d = StationIncrements::default();
                    StationIncrements {
                        line: line.unwrap_or(d.line),
                        curve: curve.unwrap_or(d.curve),
                        spiral: spiral.unwrap_or(d.spiral),
                    }
                }
            };
            let stations = alignment
                .generate_stations(range, increments, !no_geometry_points)
                .map_err(CliError::from_query)?;
            if json {
                print_json(&stations)
            } else {
                for s in stations {
                    println!("{s:.6}");
                }
                Ok(())
            }
        }
        Command::Locate {
            file,
            x,
            y,
            global,
            json,
        } => {
            let alignment = load_alignment(&file)?;
            let input = if global {
                InputSystem::Global
            } else {
                InputSystem::Current
            };
            let found = alignment.get_station_offset(Point::new(x, y), input);
            match (found, json) {
                (found, true) => print_json(&found),
                (Some(so), false) => {
                    println!("station,offset");
                    println!("{:.6},{:.6}", so.station, so.offset);
                    Ok(())
                }
                (None, false) => {
                    println!("not on alignment");
                    Ok(())
                }
            }
        }
        Command::FromPis {
            file,
            name,
            sta_start,
        } => {
            let doc = read_document(&file).map_err(|e| CliError::input(format!("{e:#}")))?;
            let mut spec = PiAlignmentSpec::from_value(&doc)
                .map_err(|e| CliError::input(format!("{}: {e}", file.display())))?;
            if name.is_some() {
                spec.name = name;
            }
            if let Some(sta) = sta_start {
                spec.sta_start = sta;
            }
            let alignment = Alignment::from_pis(spec)
                .map_err(|e| CliError::input(format!("{}: {e}", file.display())))?;
            let text = alignment
                .to_value()
                .to_json_string_pretty()
                .map_err(|e| CliError::processing(e.to_string()))?;
            println!("{text}");
            Ok(())
        }
    }
}

fn info(alignment: &Alignment) -> Result<(), CliError> {
    println!("name: {}", alignment.name().unwrap_or("-"));
    println!("length: {:.3}", alignment.length());
    println!(
        "stations: {:.3} .. {:.3}",
        alignment.sta_start(),
        alignment.sta_end()
    );
    println!("station equations: {}", alignment.station_equations().len());
    println!("elements: {}", alignment.element_count());
    for (i, element) in alignment.elements().iter().enumerate() {
        println!(
            "  {i:>3} {:<6} sta {:>12.3}  length {:>10.3}  {}",
            element.kind().as_str(),
            element.sta_start().unwrap_or(f64::NAN),
            element.length(),
            element_detail(element)
        );
    }
    Ok(())
}

fn element_detail(element: &GeometryElement) -> String {
    match element {
        GeometryElement::Line(_) => String::new(),
        GeometryElement::Curve(c) => {
            format!("{} {} R {:.3}", c.curve_type(), c.rotation(), c.radius())
        }
        GeometryElement::Spiral(s) => format!(
            "{} {} R {} -> {}",
            s.spiral_type(),
            s.rotation(),
            radius_label(s.radius_start()),
            radius_label(s.radius_end())
        ),
    }
}

fn radius_label(r: f64) -> String {
    if r.is_infinite() {
        "INF".to_string()
    } else {
        format!("{r:.3}")
    }
}

fn print_points(points: &[StationPoint], json: bool) -> Result<(), CliError> {
    if json {
        return print_json(&points);
    }
    println!("station,x,y");
    for p in points {
        println!("{:.6},{:.6},{:.6}", p.station, p.point.x, p.point.y);
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| CliError::processing(e.to_string()))?;
    println!("{text}");
    Ok(())
}
