//! Camera, projection and view placement
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::vecmath::{backward, colinear, position, right, up};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Fixed views looking at the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPreset {
    /// Straight down the Y axis, −Z towards the top of the screen.
    Overhead,
    Front,
    Top,
    Bottom,
}

impl ViewPreset {
    /// Eye, target and up vector for a camera `distance` away.
    pub fn pose(self, distance: f32) -> (Point3<f32>, Point3<f32>, Vector3<f32>) {
        let d = distance;
        let (eye, up) = match self {
            ViewPreset::Overhead => (Point3::new(0.0, d, 0.0), -Vector3::z()),
            ViewPreset::Front => (Point3::new(d, 0.0, d), Vector3::y()),
            ViewPreset::Top => (Point3::new(0.0, d, d), Vector3::y()),
            ViewPreset::Bottom => (Point3::new(0.0, -d, d), Vector3::y()),
        };
        (eye, Point3::origin(), up)
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewPreset::Overhead => "overhead view",
            ViewPreset::Front => "front view",
            ViewPreset::Top => "top view",
            ViewPreset::Bottom => "bottom view",
        }
    }
}

/// Axes a follow camera offset is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFrame {
    #[default]
    World,
    /// The followed body's right, up and out axes.
    Body,
}

/// A camera that tracks one body of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct FollowCamera {
    pub name: String,
    pub body: usize,
    pub offset: Vector3<f32>,
    pub frame: CameraFrame,
    pub up: Vector3<f32>,
}

impl FollowCamera {
    /// Eye, target and up vector given the body's current orientation.
    pub fn pose(&self, orientation: &Matrix4<f32>) -> (Point3<f32>, Point3<f32>, Vector3<f32>) {
        let target = position(orientation);
        let (eye, up) = match self.frame {
            CameraFrame::World => (target + self.offset, self.up),
            CameraFrame::Body => {
                // The orientation carries the model scale, strip it from the axes.
                let axis = |v: Vector3<f32>| v.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros);
                let (r, u, b) = (axis(right(orientation)), axis(up(orientation)), axis(backward(orientation)));
                let eye = target + r * self.offset.x + u * self.offset.y + b * self.offset.z;
                (eye, u)
            }
        };
        (Point3::from(eye), Point3::from(target), up)
    }
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 1.0,
            far: 100_000.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Place the camera. An `up` parallel to the view direction is replaced
    /// by the nearest usable world axis.
    pub fn look(&mut self, eye: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) {
        let view_dir = target - eye;
        self.up = if colinear(&view_dir, &up, 0.01) {
            if colinear(&view_dir, &Vector3::y(), 0.01) {
                -Vector3::z()
            } else {
                Vector3::y()
            }
        } else {
            up
        };
        self.position = eye;
        self.target = target;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a model-space point to screen space with a full model-view-projection.
    ///
    /// Returns `(x, y, depth)` with depth in normalized device units, or `None`
    /// when the point lies behind the eye or outside the near/far range.
    /// Points beside the view still project, to columns and rows off the
    /// screen; the rasterizer clips them.
    pub fn project_to_screen(
        mvp: &Matrix4<f32>,
        point: &Vector4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * point;

        // Prevent division by near-zero depth values
        if clip.w < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        // Depth clip only
        if !(-1.0..=1.0).contains(&depth) {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
