use lod_mesh::{Mesh, Point};
use svg::node::element::{path::Data, Circle, Path};
use svg::{Document, Node};

/// Render the live triangles of `mesh`, optionally marking the viewer.
///
/// SVG's origin is at the top left, y is flipped so the mesh reads the same
/// way as its coordinates.
pub fn mesh_to_svg(mesh: &Mesh, viewer: Option<Point>) -> Document {
    let corners = mesh.domain().corners();
    let x_min = corners.iter().map(|p| p.x).fold(f64::MAX, f64::min);
    let x_max = corners.iter().map(|p| p.x).fold(f64::MIN, f64::max);
    let y_min = corners.iter().map(|p| p.y).fold(f64::MAX, f64::min);
    let y_max = corners.iter().map(|p| p.y).fold(f64::MIN, f64::max);

    let w = x_max - x_min;
    let h = y_max - y_min;
    let space = w.max(h) * 0.05;
    let flip = |p: Point| (p.x, y_max + y_min - p.y);
    let stroke = w.max(h) / 800.;

    let mut doc = Document::new()
        .set(
            "viewBox",
            (x_min - space, y_min - space, w + 2. * space, h + 2. * space),
        )
        .set("style", "background-color: #F5F5F5");

    for (tid, _) in mesh.triangles().iter() {
        let Some([p0, p1, p2]) = mesh.triangle_points(tid) else {
            continue;
        };
        let data = Data::new()
            .move_to(flip(p0))
            .line_to(flip(p1))
            .line_to(flip(p2))
            .close();

        doc.append(
            Path::new()
                .set("d", data)
                .set("stroke", "white")
                .set("stroke-width", stroke)
                .set("fill", "#29B6F6"),
        );
    }

    if let Some(viewer) = viewer {
        let (cx, cy) = flip(viewer);
        doc.append(
            Circle::new()
                .set("cx", cx)
                .set("cy", cy)
                .set("r", stroke * 6.)
                .set("fill", "#EF5350"),
        );
    }

    doc
}

pub fn draw_svg(mesh: &Mesh, viewer: Option<Point>, path: impl AsRef<std::path::Path>) {
    svg::save(path, &mesh_to_svg(mesh, viewer)).unwrap();
}
