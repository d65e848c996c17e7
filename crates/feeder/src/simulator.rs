use kurbo::{BezPath, Line, Rect, Shape as _};
use penplot_gcode::{Config, Diagnostic, Sink};
use penplot_protocol::{Event, Point};

fn to_kurbo(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x.into(), p.y.into())
}

#[derive(Clone, Debug)]
pub struct RecordedMove {
    pub line: Line,
    pub drawing: bool,
}

/// A pretend plotter that remembers everything it was asked to do.
///
/// Events are also queued up so that the caller can forward them somewhere
/// after each line.
pub struct Simulation {
    pub start: Point,
    pub position: Point,
    pub pen_down: bool,
    pub moves: Vec<RecordedMove>,
    pub pen_changes: usize,
    pub diagnostics: usize,
    /// Which logical line is being interpreted, for log messages.
    pub line_number: usize,
    pending: Vec<Event>,
}

impl Simulation {
    pub fn new(config: &Config) -> Self {
        Simulation {
            start: config.start,
            position: config.start,
            pen_down: config.pen_down,
            moves: Vec::new(),
            pen_changes: 0,
            diagnostics: 0,
            line_number: 0,
            pending: Vec::new(),
        }
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    /// The interpreter was reset to `to`: the head is now there without having
    /// been driven there, and the picture should mark it as the start.
    pub fn restart_at(&mut self, to: Point) {
        self.start = to;
        self.position = to;
    }

    fn distance(&self, drawing: bool) -> f64 {
        self.moves
            .iter()
            .filter(|m| m.drawing == drawing)
            .map(|m| m.line.p0.distance(m.line.p1))
            .sum()
    }

    pub fn draw_distance(&self) -> f64 {
        self.distance(true)
    }

    pub fn travel_distance(&self) -> f64 {
        self.distance(false)
    }

    /// The smallest rectangle containing all drawing moves (and non-drawing
    /// ones too, if `include_travel` is set). `None` if there weren't any.
    pub fn bounding_box(&self, include_travel: bool) -> Option<Rect> {
        self.moves
            .iter()
            .filter(|m| include_travel || m.drawing)
            .map(|m| m.line.bounding_box())
            .reduce(|a, b| a.union(b))
    }

    /// Everything that was drawn, with each unbroken stroke as a subpath.
    pub fn drawn_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut stroke_end = None;
        for m in &self.moves {
            if !m.drawing {
                stroke_end = None;
                continue;
            }
            if stroke_end != Some(m.line.p0) {
                path.move_to(m.line.p0);
            }
            path.line_to(m.line.p1);
            stroke_end = Some(m.line.p1);
        }
        path
    }
}

impl Sink for Simulation {
    fn on_move(&mut self, to: Point, drawing: bool) {
        self.moves.push(RecordedMove {
            line: Line::new(to_kurbo(self.position), to_kurbo(to)),
            drawing,
        });
        self.position = to;
        self.pending.push(Event::Move { to, drawing });
    }

    fn on_pen(&mut self, down: bool) {
        if down != self.pen_down {
            self.pen_changes += 1;
        }
        self.pen_down = down;
        self.pending.push(Event::Pen { down });
    }

    fn on_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics += 1;
        log::warn!("line {}: {diagnostic}", self.line_number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;
    use penplot_gcode::{ConfigBuilder, Interpreter};

    fn simulate(start: (f32, f32), program: &str) -> Simulation {
        let config = ConfigBuilder::default().with_start(start.0, start.1).build();
        let mut interp = Interpreter::with_config(&config, Simulation::new(&config));
        interp.process(program);
        interp.into_sink()
    }

    #[test]
    fn square() {
        let sim = simulate(
            (0.0, 0.0),
            "G0 X1 Y1\nM3\nG1 X4\nG1 Y5\nG1 X1\nG1 Y1\nM5\nG0 X0 Y0",
        );
        assert_eq!(sim.draw_distance(), 14.0);
        assert_eq!(sim.travel_distance(), 2.0 * 2.0f64.sqrt());
        assert_eq!(sim.pen_changes, 2);
        assert!(!sim.pen_down);
        assert_eq!(sim.bounding_box(false), Some(Rect::new(1.0, 1.0, 4.0, 5.0)));
        assert_eq!(sim.bounding_box(true), Some(Rect::new(0.0, 0.0, 4.0, 5.0)));

        let els = sim.drawn_path().elements().to_vec();
        assert_eq!(
            els,
            vec![
                PathEl::MoveTo((1.0, 1.0).into()),
                PathEl::LineTo((4.0, 1.0).into()),
                PathEl::LineTo((4.0, 5.0).into()),
                PathEl::LineTo((1.0, 5.0).into()),
                PathEl::LineTo((1.0, 1.0).into()),
            ]
        );
    }

    #[test]
    fn strokes_break_on_rapid_moves() {
        let sim = simulate((0.0, 0.0), "M3\nG1 X1\nG0 X2\nG1 X3");
        let els = sim.drawn_path().elements().to_vec();
        assert_eq!(
            els,
            vec![
                PathEl::MoveTo((0.0, 0.0).into()),
                PathEl::LineTo((1.0, 0.0).into()),
                PathEl::MoveTo((2.0, 0.0).into()),
                PathEl::LineTo((3.0, 0.0).into()),
            ]
        );
    }

    #[test]
    fn moves_start_from_the_start_point() {
        let sim = simulate((10.0, 20.0), "G1 X1");
        assert_eq!(sim.moves.len(), 1);
        assert_eq!(
            sim.moves[0].line,
            Line::new((10.0, 20.0), (11.0, 20.0))
        );
        assert_eq!(sim.bounding_box(false), None);
    }

    #[test]
    fn queues_events_and_counts_diagnostics() {
        let mut sim = simulate((0.0, 0.0), "M3\nG7\nM300 S80");
        assert_eq!(
            sim.take_events(),
            vec![Event::pen(true), Event::pen(false)]
        );
        assert!(sim.take_events().is_empty());
        assert_eq!(sim.diagnostics, 1);
    }

    #[test]
    fn restart_moves_start_and_position() {
        let config = ConfigBuilder::default().build();
        let mut interp = Interpreter::with_config(&config, Simulation::new(&config));
        interp.process("G0 X1 Y1");
        interp.reset(5.0, 6.0);
        interp.sink_mut().restart_at(Point::new(5.0, 6.0));
        interp.process("G1 X1");

        let sim = interp.sink();
        assert_eq!(sim.start, Point::new(5.0, 6.0));
        assert_eq!(sim.moves[1].line, Line::new((5.0, 6.0), (6.0, 6.0)));
    }
}
