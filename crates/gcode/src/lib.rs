//! A small, forgiving G-code interpreter for pen plotters.
//!
//! Program text goes in, and [`Event`]s come out: moves (drawing or not) and
//! pen lifts. Only the handful of commands that make sense for a two-axis pen
//! plotter are understood:
//!
//! - `G0`/`G00`: rapid move, never draws
//! - `G1`/`G01`: linear move, draws if the pen is down
//! - `G90`/`G91`: absolute/relative positioning
//! - `M3`/`M5`: pen down/up
//! - `M300 S<n>`: pen down if `n` is below a threshold, otherwise up
//!
//! The interpreter never fails. Numbers with no digits count as zero, unclosed
//! comments swallow the rest of the line, and anything it doesn't understand
//! is skipped. If you want to know about those things, override
//! [`Sink::on_diagnostic`].
//!
//! Absolute coordinates are measured from the origin the interpreter was
//! started (or [reset](Interpreter::reset)) at, not from the device's own zero.
//! This way a program that starts at `X0 Y0` draws wherever the head happens to
//! be.
//!
//! The crate is `no_std` (with `alloc`) when the default `std` feature is off.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

pub use penplot_protocol::{Event, Point};

mod interpreter;
pub mod line;
pub mod number;
pub mod words;

pub use interpreter::{Interpreter, Positioning, State};
pub use line::{lines, normalize, Lines};

/// `M300 S<n>` puts the pen down when `n` is less than this. Typical servo
/// setups use something like `S30` for down and `S50` for up.
pub const DEFAULT_PEN_THRESHOLD: f32 = 60.0;

/// Where the interpreter's events go.
///
/// Events arrive in program order, and the interpreter's state has already
/// been updated for one command before the next command's events arrive.
pub trait Sink {
    fn on_move(&mut self, to: Point, drawing: bool);
    fn on_pen(&mut self, down: bool);

    /// Called for input that the interpreter tolerated rather than understood.
    /// Whatever this does has no effect on interpretation.
    fn on_diagnostic(&mut self, diagnostic: Diagnostic) {
        let _ = diagnostic;
    }
}

/// Something odd in the input, which the interpreter worked around.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A word had no digits, and was taken to be zero.
    MissingNumber { letter: char },
    /// A `(` comment was never closed; the rest of the line was dropped.
    UnterminatedComment,
    /// A G or M code that isn't supported.
    UnknownCommand { letter: char, code: i32 },
    /// A line started with something other than G or M.
    UnknownWord { letter: char },
    /// A parameter that the command doesn't use.
    IgnoredWord { letter: char },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingNumber { letter } => {
                write!(f, "no number after '{letter}', using 0")
            }
            Diagnostic::UnterminatedComment => write!(f, "unclosed '(' comment"),
            Diagnostic::UnknownCommand { letter, code } => {
                write!(f, "unsupported command {letter}{code}")
            }
            Diagnostic::UnknownWord { letter } => {
                write!(f, "line starts with '{letter}' instead of G or M")
            }
            Diagnostic::IgnoredWord { letter } => write!(f, "ignoring '{letter}' parameter"),
        }
    }
}

/// Collects events into a queue, for callers that would rather pull events
/// than have them pushed.
impl Sink for Vec<Event> {
    fn on_move(&mut self, to: Point, drawing: bool) {
        self.push(Event::Move { to, drawing });
    }

    fn on_pen(&mut self, down: bool) {
        self.push(Event::Pen { down });
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn on_move(&mut self, to: Point, drawing: bool) {
        (**self).on_move(to, drawing);
    }

    fn on_pen(&mut self, down: bool) {
        (**self).on_pen(down);
    }

    fn on_diagnostic(&mut self, diagnostic: Diagnostic) {
        (**self).on_diagnostic(diagnostic);
    }
}

/// A sink made of two closures.
pub struct Callbacks<M, P> {
    pub on_move: M,
    pub on_pen: P,
}

impl<M, P> Callbacks<M, P>
where
    M: FnMut(Point, bool),
    P: FnMut(bool),
{
    pub fn new(on_move: M, on_pen: P) -> Self {
        Callbacks { on_move, on_pen }
    }
}

impl<M, P> Sink for Callbacks<M, P>
where
    M: FnMut(Point, bool),
    P: FnMut(bool),
{
    fn on_move(&mut self, to: Point, drawing: bool) {
        (self.on_move)(to, drawing);
    }

    fn on_pen(&mut self, down: bool) {
        (self.on_pen)(down);
    }
}

pub struct ConfigBuilder {
    start: Point,
    pen_down: bool,
    pen_threshold: f32,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            start: Point::origin(),
            pen_down: false,
            pen_threshold: DEFAULT_PEN_THRESHOLD,
        }
    }
}

impl ConfigBuilder {
    pub fn build(&self) -> Config {
        Config {
            start: self.start,
            pen_down: self.pen_down,
            pen_threshold: self.pen_threshold,
        }
    }

    pub fn with_start(&mut self, x: f32, y: f32) -> &mut Self {
        self.start = Point::new(x, y);
        self
    }

    pub fn with_pen_down(&mut self, pen_down: bool) -> &mut Self {
        self.pen_down = pen_down;
        self
    }

    pub fn with_pen_threshold(&mut self, threshold: f32) -> &mut Self {
        self.pen_threshold = threshold;
        self
    }
}

/// How an interpreter starts out.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// The device position when the program starts. This is both the initial
    /// position and the origin for absolute coordinates.
    pub start: Point,
    pub pen_down: bool,
    /// See [`DEFAULT_PEN_THRESHOLD`].
    pub pen_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::default().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = Config::default();
        assert_eq!(config.start, Point::new(0.0, 0.0));
        assert!(!config.pen_down);
        assert_eq!(config.pen_threshold, 60.0);

        let config = ConfigBuilder::default()
            .with_start(2.0, 3.0)
            .with_pen_down(true)
            .with_pen_threshold(45.0)
            .build();
        assert_eq!(config.start, Point::new(2.0, 3.0));
        assert!(config.pen_down);
        assert_eq!(config.pen_threshold, 45.0);
    }

    #[test]
    fn callbacks_sink() {
        let mut moves = Vec::new();
        let mut pens = Vec::new();
        {
            let mut sink = Callbacks::new(
                |p: Point, d: bool| moves.push((p, d)),
                |d: bool| pens.push(d),
            );
            sink.on_move(Point::new(1.0, 2.0), true);
            sink.on_pen(false);
            // The default diagnostic hook does nothing.
            sink.on_diagnostic(Diagnostic::UnterminatedComment);
        }
        assert_eq!(moves, vec![(Point::new(1.0, 2.0), true)]);
        assert_eq!(pens, vec![false]);
    }

    #[test]
    fn diagnostic_messages() {
        assert_eq!(
            Diagnostic::UnknownCommand {
                letter: 'G',
                code: 2
            }
            .to_string(),
            "unsupported command G2"
        );
        assert_eq!(
            Diagnostic::MissingNumber { letter: 'X' }.to_string(),
            "no number after 'X', using 0"
        );
    }
}
