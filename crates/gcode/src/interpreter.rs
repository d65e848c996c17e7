use serde::{Deserialize, Serialize};

use crate::{
    line::{lines, normalize},
    words::{Word, Words},
    Config, Diagnostic, Point, Sink,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Positioning {
    /// Coordinates are measured from the origin (`G90`).
    #[default]
    Absolute,
    /// Coordinates are offsets from the current position (`G91`).
    Relative,
}

/// Everything the interpreter remembers between lines.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// The target of the last move.
    pub position: Point,
    /// Where absolute coordinates are measured from. This only changes on
    /// [`Interpreter::reset`].
    pub origin: Point,
    pub positioning: Positioning,
    pub pen_down: bool,
}

impl State {
    fn resolve(&self, value: f32, current: f32, origin: f32) -> f32 {
        match self.positioning {
            Positioning::Absolute => origin + value,
            Positioning::Relative => current + value,
        }
    }
}

pub struct Interpreter<S> {
    state: State,
    pen_threshold: f32,
    sink: S,
}

impl<S: Sink> Interpreter<S> {
    /// An interpreter starting at (0, 0) with the pen up.
    pub fn new(sink: S) -> Self {
        Self::with_config(&Config::default(), sink)
    }

    pub fn with_config(config: &Config, sink: S) -> Self {
        Interpreter {
            state: State {
                position: config.start,
                origin: config.start,
                positioning: Positioning::Absolute,
                pen_down: config.pen_down,
            },
            pen_threshold: config.pen_threshold,
            sink,
        }
    }

    /// Runs a whole program, which may contain many lines.
    pub fn process(&mut self, program: &str) {
        for line in lines(program) {
            self.process_line(line);
        }
    }

    /// Runs a single line. Any `;` in it starts a comment, so this is the
    /// entry point for input that arrives a line at a time.
    pub fn process_line(&mut self, line: &str) {
        let normalized = normalize(line);
        if normalized.unterminated_comment {
            self.sink.on_diagnostic(Diagnostic::UnterminatedComment);
        }
        if let Some(line) = normalized.line {
            self.execute(&line);
        }
    }

    fn execute(&mut self, line: &str) {
        let mut words = Words::new(line);
        let Some(cmd) = words.command() else {
            return;
        };
        if !matches!(cmd.letter, 'G' | 'M') {
            self.sink
                .on_diagnostic(Diagnostic::UnknownWord { letter: cmd.letter });
            return;
        }

        let code = cmd.code.unwrap_or_else(|| {
            self.sink
                .on_diagnostic(Diagnostic::MissingNumber { letter: cmd.letter });
            0
        });
        match (cmd.letter, code) {
            ('G', 0) => self.move_to(words, false),
            ('G', 1) => self.move_to(words, self.state.pen_down),
            ('G', 90) => self.state.positioning = Positioning::Absolute,
            ('G', 91) => self.state.positioning = Positioning::Relative,
            ('M', 3) => self.pen(true),
            ('M', 5) => self.pen(false),
            ('M', 300) => self.servo_pen(words),
            (letter, code) => self
                .sink
                .on_diagnostic(Diagnostic::UnknownCommand { letter, code }),
        }
    }

    fn value(&mut self, word: &Word) -> f32 {
        if word.value.is_none() {
            self.sink
                .on_diagnostic(Diagnostic::MissingNumber { letter: word.letter });
        }
        word.value_or_zero()
    }

    fn move_to(&mut self, words: Words<'_>, drawing: bool) {
        let current = self.state.position;
        let origin = self.state.origin;
        let mut target = current;

        // If an axis appears twice, the last one wins.
        for word in words {
            match word.letter {
                'X' => {
                    let v = self.value(&word);
                    target.x = self.state.resolve(v, current.x, origin.x);
                }
                'Y' => {
                    let v = self.value(&word);
                    target.y = self.state.resolve(v, current.y, origin.y);
                }
                letter => self.sink.on_diagnostic(Diagnostic::IgnoredWord { letter }),
            }
        }

        self.sink.on_move(target, drawing);
        self.state.position = target;
    }

    fn pen(&mut self, down: bool) {
        self.state.pen_down = down;
        self.sink.on_pen(down);
    }

    // Servo-based plotters use `M300 S<angle>` to move the pen. We don't know
    // the servo geometry, so a threshold decides between up and down.
    fn servo_pen(&mut self, words: Words<'_>) {
        let mut s = None;
        for word in words {
            if word.letter == 'S' {
                s = Some(self.value(&word));
                break;
            }
            self.sink
                .on_diagnostic(Diagnostic::IgnoredWord { letter: word.letter });
        }

        if let Some(s) = s {
            self.pen(s < self.pen_threshold);
        }
    }

    /// Moves the origin (and the current position) to `(x, y)`, and switches
    /// to absolute positioning. The pen is left alone.
    pub fn reset(&mut self, x: f32, y: f32) {
        let p = Point::new(x, y);
        self.state.position = p;
        self.state.origin = p;
        self.state.positioning = Positioning::Absolute;
    }

    pub fn set_absolute(&mut self, absolute: bool) {
        self.state.positioning = if absolute {
            Positioning::Absolute
        } else {
            Positioning::Relative
        };
    }

    /// Overrides the pen state without emitting an event, for when something
    /// else has moved the pen.
    pub fn set_pen_state(&mut self, down: bool) {
        self.state.pen_down = down;
    }
}

impl<S> Interpreter<S> {
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn position(&self) -> Point {
        self.state.position
    }

    pub fn current_x(&self) -> f32 {
        self.state.position.x
    }

    pub fn current_y(&self) -> f32 {
        self.state.position.y
    }

    pub fn origin(&self) -> Point {
        self.state.origin
    }

    pub fn positioning(&self) -> Positioning {
        self.state.positioning
    }

    pub fn is_pen_down(&self) -> bool {
        self.state.pen_down
    }

    pub fn pen_threshold(&self) -> f32 {
        self.pen_threshold
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
