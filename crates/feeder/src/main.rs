use std::{
    io::{self, Read as _, Write},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::Parser;
use log::LevelFilter;
use penplot_gcode::{lines, ConfigBuilder, Interpreter, DEFAULT_PEN_THRESHOLD};
use penplot_protocol::{Event, Point};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

use crate::simulator::Simulation;

mod preview;
mod simulator;

#[derive(Parser)]
struct Args {
    /// The program to run. Read from stdin if not given.
    path: Option<PathBuf>,

    /// Where the plotter is when the program starts. Absolute coordinates
    /// in the program are measured from here.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    start_x: f32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    start_y: f32,

    /// Start with the pen down.
    #[arg(long)]
    pen_down: bool,

    /// `M300 S<n>` puts the pen down if n is smaller than this.
    #[arg(long, default_value_t = DEFAULT_PEN_THRESHOLD)]
    pen_threshold: f32,

    /// How to write the events to stdout.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write a picture of the drawing here.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Include non-drawing moves in the picture.
    #[arg(long)]
    show_travel: bool,

    /// Type commands at a prompt instead of reading a program.
    #[arg(short, long, conflicts_with = "path")]
    interactive: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    /// One event per line, like `draw 10 5` or `pen up`.
    Text,
    /// One JSON object per line.
    Json,
    /// COBS-framed postcard, as a device would receive them.
    Postcard,
    /// Don't write events at all.
    Quiet,
}

fn write_event(out: &mut impl Write, format: Format, event: &Event) -> anyhow::Result<()> {
    match format {
        Format::Text => match event {
            Event::Move { to, drawing: true } => writeln!(out, "draw {} {}", to.x, to.y)?,
            Event::Move { to, drawing: false } => writeln!(out, "move {} {}", to.x, to.y)?,
            Event::Pen { down: true } => writeln!(out, "pen down")?,
            Event::Pen { down: false } => writeln!(out, "pen up")?,
        },
        Format::Json => {
            serde_json::to_writer(&mut *out, event)?;
            writeln!(out)?;
        }
        Format::Postcard => out.write_all(&postcard::to_allocvec_cobs(event)?)?,
        Format::Quiet => {}
    }
    Ok(())
}

fn flush_events(
    interp: &mut Interpreter<Simulation>,
    out: &mut impl Write,
    format: Format,
) -> anyhow::Result<()> {
    for event in interp.sink_mut().take_events() {
        write_event(out, format, &event)?;
    }
    Ok(())
}

fn read_program(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut program = String::new();
            io::stdin()
                .read_to_string(&mut program)
                .context("failed to read stdin")?;
            Ok(program)
        }
    }
}

fn run_program(
    interp: &mut Interpreter<Simulation>,
    program: &str,
    out: &mut impl Write,
    format: Format,
) -> anyhow::Result<()> {
    for (idx, line) in lines(program).enumerate() {
        log::debug!("{}: {line}", idx + 1);
        interp.sink_mut().line_number = idx + 1;
        interp.process_line(line);
        flush_events(interp, out, format)?;
    }
    Ok(())
}

fn parse_point<'a>(mut args: impl Iterator<Item = &'a str>) -> Option<Point> {
    let x: f32 = args.next()?.parse().ok()?;
    let y: f32 = args.next()?.parse().ok()?;
    args.next().is_none().then(|| Point::new(x, y))
}

fn interactive(
    interp: &mut Interpreter<Simulation>,
    out: &mut impl Write,
    format: Format,
) -> anyhow::Result<()> {
    eprintln!("Enter one line at a time. `reset X Y` moves the origin, `where` shows the state, `quit` exits.");

    let mut reed = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("penplot".to_owned()),
        DefaultPromptSegment::Empty,
    );
    let mut line_number = 0;
    loop {
        let line = match reed.read_line(&prompt)? {
            Signal::Success(s) => s,
            Signal::CtrlC | Signal::CtrlD => break,
        };
        line_number += 1;

        let mut words = line.split_whitespace();
        match words.next() {
            Some("quit") => break,
            Some("where") => {
                let state = interp.state();
                eprintln!(
                    "at ({}, {}), origin ({}, {}), {:?} positioning, pen {}",
                    state.position.x,
                    state.position.y,
                    state.origin.x,
                    state.origin.y,
                    state.positioning,
                    if state.pen_down { "down" } else { "up" },
                );
            }
            Some("reset") => {
                let Some(p) = parse_point(words) else {
                    eprintln!("error: expected `reset X Y`");
                    continue;
                };
                interp.reset(p.x, p.y);
                interp.sink_mut().restart_at(p);
            }
            _ => {
                interp.sink_mut().line_number = line_number;
                interp.process_line(&line);
                flush_events(interp, out, format)?;
                out.flush()?;
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = ConfigBuilder::default()
        .with_start(args.start_x, args.start_y)
        .with_pen_down(args.pen_down)
        .with_pen_threshold(args.pen_threshold)
        .build();
    let mut interp = Interpreter::with_config(&config, Simulation::new(&config));

    let mut out = io::stdout().lock();
    if args.interactive {
        interactive(&mut interp, &mut out, args.format)?;
    } else {
        let program = read_program(args.path.as_deref())?;
        run_program(&mut interp, &program, &mut out, args.format)?;
    }
    out.flush()?;

    let sim = interp.sink();
    log::info!(
        "drew {:.2} units, moved {:.2} units without drawing, {} pen changes, {} warnings",
        sim.draw_distance(),
        sim.travel_distance(),
        sim.pen_changes,
        sim.diagnostics,
    );

    if let Some(path) = &args.svg {
        preview::save(path, &preview::illustrate(sim, args.show_travel))?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}
