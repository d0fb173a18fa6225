//! Vector and matrix helpers for transform matrices.
//!
//! Matrices are column-major in the GL convention: columns 0..2 hold the
//! right, up and out (+Z) basis vectors and column 3 holds the position.

use nalgebra::{Dim, Matrix, Matrix4, RawStorage, Vector3, Vector4};

/// +X basis vector of the transform.
pub fn right(m: &Matrix4<f32>) -> Vector3<f32> {
    column3(m, 0)
}

/// −X basis vector of the transform.
pub fn left(m: &Matrix4<f32>) -> Vector3<f32> {
    -column3(m, 0)
}

/// +Y basis vector of the transform.
pub fn up(m: &Matrix4<f32>) -> Vector3<f32> {
    column3(m, 1)
}

/// −Y basis vector of the transform.
pub fn down(m: &Matrix4<f32>) -> Vector3<f32> {
    -column3(m, 1)
}

/// +Z basis vector, pointing out of the screen.
pub fn backward(m: &Matrix4<f32>) -> Vector3<f32> {
    column3(m, 2)
}

/// −Z basis vector, pointing into the screen. Models fly along this axis.
pub fn forward(m: &Matrix4<f32>) -> Vector3<f32> {
    -column3(m, 2)
}

/// Position of the object represented by the transform.
pub fn position(m: &Matrix4<f32>) -> Vector3<f32> {
    column3(m, 3)
}

fn column3(m: &Matrix4<f32>, col: usize) -> Vector3<f32> {
    Vector3::new(m[(0, col)], m[(1, col)], m[(2, col)])
}

/// Euclidean distance between two points.
pub fn distance(p1: &Vector3<f32>, p2: &Vector3<f32>) -> f32 {
    (p1 - p2).norm()
}

/// Whether two directions are colinear within `epsilon`.
///
/// Both vectors are normalized and compared component-wise in absolute
/// value, so opposite directions count as colinear. An epsilon of `0.0`
/// demands an exact match; `0.1` works well for orienting towards a target.
/// Zero-length vectors have no direction and are never colinear.
pub fn colinear(v1: &Vector3<f32>, v2: &Vector3<f32>, epsilon: f32) -> bool {
    match (v1.try_normalize(f32::EPSILON), v2.try_normalize(f32::EPSILON)) {
        (Some(a), Some(b)) => (a.abs() - b.abs()).norm() <= epsilon,
        _ => false,
    }
}

/// Unit normal of the triangle `p0, p1, p2`.
///
/// Uses the edges `p1 - p0` and `p1 - p2`, so the normal belongs to `p1`
/// and to the whole flat surface. Returns `None` when the triangle is
/// degenerate (collinear or repeated points).
pub fn unit_normal(p0: &Vector4<f32>, p1: &Vector4<f32>, p2: &Vector4<f32>) -> Option<Vector3<f32>> {
    let v1 = (p1 - p0).xyz();
    let v2 = (p1 - p2).xyz();
    v1.cross(&v2).try_normalize(f32::EPSILON)
}

/// Whether any component of a vector or matrix is NaN.
pub fn has_nan<R, C, S>(m: &Matrix<f32, R, C, S>) -> bool
where
    R: Dim,
    C: Dim,
    S: RawStorage<f32, R, C>,
{
    m.iter().any(|c| c.is_nan())
}

/// `acos` of a dot product, guarded against float drift past ±1.
pub fn acos_dot_product(dot: f32) -> f32 {
    if dot >= 0.999 {
        0.0
    } else if dot <= -0.999 {
        std::f32::consts::PI
    } else {
        dot.acos()
    }
}

pub fn describe_vec3(name: &str, v: &Vector3<f32>) -> String {
    format!("{name}:  [{:8.3}  {:8.3}  {:8.3} ]", v.x, v.y, v.z)
}

pub fn describe_vec4(name: &str, v: &Vector4<f32>) -> String {
    format!("{name}:  [{:8.3}  {:8.3}  {:8.3}  {:8.3} ]", v.x, v.y, v.z, v.w)
}

/// Multi-line table of a transform, one row per axis.
pub fn describe_mat4(label: &str, m: &Matrix4<f32>) -> String {
    let mut out = format!("{label}:\n    Right      Up       At      Pos\n");
    for (row, axis) in ["X", "Y", "Z", "W"].iter().enumerate() {
        out.push_str(&format!(
            "{axis} {:8.3}  {:8.3}  {:8.3}  {:8.3}\n",
            m[(row, 0)],
            m[(row, 1)],
            m[(row, 2)],
            m[(row, 3)]
        ));
    }
    out
}
