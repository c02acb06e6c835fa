use robust::Coord;

use crate::{domain::OuterTriangle, shape::Circumcircle, Barycentric, MeshError, Point};

/// Relative size of the circumcenter normalization sum below which the
/// triangle counts as degenerate. The sum is 16 * area^2 in squared units.
const DEGENERATE_SUM_RATIO: f64 = 1e-12;

#[derive(Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Clock Wise
    ///
    ///  a     b
    ///             c
    ///
    CW,
    /// Counter Clock Wise
    ///             c
    ///  a     b
    CCW,
    /// Collinear
    ///  a     b    c
    Collinear,
}

impl Orientation {
    pub fn is_cw(&self) -> bool {
        matches!(self, Self::CW)
    }

    pub fn is_ccw(&self) -> bool {
        matches!(self, Self::CCW)
    }

    pub fn is_collinear(&self) -> bool {
        matches!(self, Self::Collinear)
    }
}

fn coord(p: Point) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Exact orientation of `c` relative to the directed line `a -> b`.
pub fn orient_2d(a: Point, b: Point, c: Point) -> Orientation {
    let val = robust::orient2d(coord(a), coord(b), coord(c));

    if val > 0. {
        Orientation::CCW
    } else if val < 0. {
        Orientation::CW
    } else {
        Orientation::Collinear
    }
}

/// Circumcenter and squared circumradius of the triangle `points`.
///
/// The side lengths are measured in Cartesian space. The circumcenter is
/// first expressed in barycentric weights over the triangle itself, then
/// mapped into the outer frame by the same affine combination of the
/// vertices' own outer weights.
pub fn circumcircle(
    domain: &OuterTriangle,
    points: &[Barycentric; 3],
) -> Result<Circumcircle, MeshError> {
    let [va, vb, vc] = *points;

    // squared side lengths, each opposite the named vertex
    let sq_a = domain.squared_distance(vb, vc);
    let sq_b = domain.squared_distance(vc, va);
    let sq_c = domain.squared_distance(va, vb);

    let wa = sq_a * (sq_b + sq_c - sq_a);
    let wb = sq_b * (sq_c + sq_a - sq_b);
    let wc = sq_c * (sq_a + sq_b - sq_c);
    let sum = wa + wb + wc;

    let scale = sq_a + sq_b + sq_c;
    if !sum.is_finite() || sum <= DEGENERATE_SUM_RATIO * scale * scale {
        return Err(MeshError::DegenerateTriangle);
    }

    let local = Barycentric::new(wa / sum, wb / sum, wc / sum);
    let center = local.globalize(points);

    Ok(Circumcircle {
        center,
        radius_sq: domain.squared_distance(center, va),
    })
}

/// Squared distance from `p` to the closed segment `a b`.
pub fn dist2_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len2 = abx * abx + aby * aby;
    if len2 == 0. {
        return p.dist2(a);
    }

    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0., 1.);
    p.dist2(Point::new(a.x + t * abx, a.y + t * aby))
}

/// Whether `p` lies inside or on the boundary of the triangle, either winding.
pub fn in_triangle(p: Point, [a, b, c]: [Point; 3]) -> bool {
    let o1 = orient_2d(a, b, p);
    let o2 = orient_2d(b, c, p);
    let o3 = orient_2d(c, a, p);

    let has_cw = o1.is_cw() || o2.is_cw() || o3.is_cw();
    let has_ccw = o1.is_ccw() || o2.is_ccw() || o3.is_ccw();
    !(has_cw && has_ccw)
}

/// Squared distance from `p` to the triangle region, zero when inside.
pub fn dist2_to_triangle(p: Point, triangle: [Point; 3]) -> f64 {
    if in_triangle(p, triangle) {
        return 0.;
    }

    let [a, b, c] = triangle;
    dist2_to_segment(p, a, b)
        .min(dist2_to_segment(p, b, c))
        .min(dist2_to_segment(p, c, a))
}
