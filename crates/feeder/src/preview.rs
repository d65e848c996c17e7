use std::path::Path;

use anyhow::Context as _;
use kurbo::{Affine, PathEl};
use svg::{
    node::element::{path::Data, Circle, Path as SvgPath},
    Document,
};

use crate::simulator::Simulation;

fn cvt(p: kurbo::Point) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

/// Draws what the simulated plotter drew. Non-drawing moves are shown dashed
/// if `show_travel` is set, and the starting point is marked with a dot.
pub fn illustrate(sim: &Simulation, show_travel: bool) -> Document {
    // Plotter coordinates have y pointing up; svg has it pointing down.
    let flip = Affine::FLIP_Y;
    let start = flip * kurbo::Point::new(sim.start.x.into(), sim.start.y.into());

    let bbox = sim
        .bounding_box(show_travel)
        .map(|b| flip.transform_rect_bbox(b))
        .unwrap_or_else(|| kurbo::Rect::from_center_size(start, (0.0, 0.0)));
    let bbox = bbox.union_pt(start);
    let size = bbox.width().max(bbox.height()).max(1.0);
    let bbox = bbox.inflate(size / 20.0, size / 20.0);
    let stroke_width = (size / 400.0) as f32;

    let mut document = Document::new().set(
        "viewBox",
        (
            bbox.x0 as f32,
            bbox.y0 as f32,
            bbox.width() as f32,
            bbox.height() as f32,
        ),
    );

    if show_travel {
        for m in sim.moves.iter().filter(|m| !m.drawing) {
            let data = Data::new()
                .move_to(cvt(flip * m.line.p0))
                .line_to(cvt(flip * m.line.p1));
            document = document.add(
                SvgPath::new()
                    .set("fill", "none")
                    .set("stroke", "gray")
                    .set("stroke-width", stroke_width)
                    .set("stroke-dasharray", format!("{0} {0}", stroke_width * 4.0))
                    .set("d", data),
            );
        }
    }

    let mut data = Data::new();
    for el in (flip * sim.drawn_path()).elements() {
        data = match *el {
            PathEl::MoveTo(p) => data.move_to(cvt(p)),
            PathEl::LineTo(p) => data.line_to(cvt(p)),
            // The simulator only records straight lines.
            _ => data,
        };
    }
    document = document.add(
        SvgPath::new()
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", stroke_width)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round")
            .set("d", data),
    );

    let (cx, cy) = cvt(start);
    document.add(
        Circle::new()
            .set("cx", cx)
            .set("cy", cy)
            .set("r", stroke_width * 3.0)
            .set("fill", "blue"),
    )
}

pub fn save(path: &Path, document: &Document) -> anyhow::Result<()> {
    svg::save(path, document).with_context(|| format!("failed to write {}", path.display()))
}
