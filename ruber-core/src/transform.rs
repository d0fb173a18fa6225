//! Transform builders following OpenGL matrix conventions
use nalgebra::{Matrix4, Rotation3, Unit, Vector3};

/// Transform builder for model matrices
pub struct Transform;

impl Transform {
    /// Post-multiply `m` by a rotation of `angle` radians about `axis`, matching the OpenGL convention.
    ///
    /// A zero-length axis leaves `m` unchanged.
    pub fn rotate(m: &Matrix4<f32>, angle: f32, axis: &Vector3<f32>) -> Matrix4<f32> {
        match Unit::try_new(*axis, f32::EPSILON) {
            Some(axis) => m * Rotation3::from_axis_angle(&axis, angle).to_homogeneous(),
            None => *m,
        }
    }

    /// Create a translation matrix
    pub fn translation(v: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(v)
    }

    /// Create a uniform scale matrix
    pub fn uniform_scale(s: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(s)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vecmath::{forward, position};

    #[test]
    fn test_rotate_post_multiplies() {
        let base = Transform::translation(&Vector3::new(5.0, 0.0, 0.0));
        let turned = Transform::rotate(&base, std::f32::consts::PI, &Vector3::y());
        // Rotation applies in the local frame, the position is untouched.
        assert!((position(&turned) - Vector3::new(5.0, 0.0, 0.0)).norm() < 1e-5);
        assert!((forward(&turned) - Vector3::z()).norm() < 1e-5);
    }

    #[test]
    fn test_rotate_accumulates() {
        let step = std::f32::consts::FRAC_PI_4;
        let once = Transform::rotate(&Matrix4::identity(), 2.0 * step, &Vector3::x());
        let twice = Transform::rotate(
            &Transform::rotate(&Matrix4::identity(), step, &Vector3::x()),
            step,
            &Vector3::x(),
        );
        assert!((once - twice).norm() < 1e-5);
    }

    #[test]
    fn test_rotate_zero_axis_is_identity() {
        let m = Transform::uniform_scale(3.0);
        assert_eq!(Transform::rotate(&m, 1.0, &Vector3::zeros()), m);
    }

    #[test]
    fn test_mvp_order() {
        let model = Transform::translation(&Vector3::new(1.0, 0.0, 0.0));
        let view = Transform::uniform_scale(2.0);
        let proj = Matrix4::identity();
        let mvp = Transform::mvp_matrix(&model, &view, &proj);
        assert!((position(&mvp) - Vector3::new(2.0, 0.0, 0.0)).norm() < 1e-6);
    }
}
