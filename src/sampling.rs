//! Uniform random points inside triangles, used to seed meshes.

use rand::Rng;

use crate::Barycentric;

/// Uniform point over the area of the reference triangle.
///
/// With `u1`, `u2` uniform on [0, 1) and `s = sqrt(u1)`, the weights
/// `(1 - s, s (1 - u2), s u2)` are uniform over the area, no rejection needed.
pub fn uniform_in_triangle<R: Rng + ?Sized>(rng: &mut R) -> Barycentric {
    let s = rng.gen::<f64>().sqrt();
    let u2 = rng.gen::<f64>();
    Barycentric::new(1. - s, s * (1. - u2), s * u2)
}

/// Uniform point inside the triangle `frame`, in the frame's own coordinates.
pub fn uniform_in<R: Rng + ?Sized>(rng: &mut R, frame: &[Barycentric; 3]) -> Barycentric {
    uniform_in_triangle(rng).globalize(frame)
}
