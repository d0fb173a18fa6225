//! Geometry primitives for triangle-list models
use nalgebra::{Vector3, Vector4};

use crate::vecmath::unit_normal;

/// Colour given to triangles whose model file names none.
pub const DEFAULT_COLOR: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

/// A model-space vertex with its flat-shading normal and diffuse colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector4<f32>,
    pub normal: Vector3<f32>,
    pub color: [f32; 4],
}

/// Three vertices in winding order
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    /// Build a flat-shaded triangle: every vertex gets the face normal and `color`.
    ///
    /// Degenerate triangles keep a zero normal.
    pub fn flat(p0: Vector4<f32>, p1: Vector4<f32>, p2: Vector4<f32>, color: [f32; 4]) -> Self {
        let normal = unit_normal(&p0, &p1, &p2).unwrap_or_else(Vector3::zeros);
        let vertex = |position| Vertex {
            position,
            normal,
            color,
        };
        Self {
            vertices: [vertex(p0), vertex(p1), vertex(p2)],
        }
    }

    pub fn calculate_normal(&self) -> Option<Vector3<f32>> {
        let [v0, v1, v2] = &self.vertices;
        unit_normal(&v0.position, &v1.position, &v2.position)
    }
}

/// A model made of independent triangles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// Largest distance of any vertex from the model origin.
    pub fn bounding_radius(&self) -> f32 {
        self.triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .map(|v| v.position.xyz().norm())
            .fold(0.0, f32::max)
    }

    /// Axis-aligned cube centred on the origin, two triangles per face
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let p = |x: f32, y: f32, z: f32| Vector4::new(x * h, y * h, z * h, 1.0);
        // Each face as four corners, counter-clockwise seen from outside.
        let faces = [
            [p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.)],
            [p(1., -1., -1.), p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.)],
            [p(-1., 1., 1.), p(1., 1., 1.), p(1., 1., -1.), p(-1., 1., -1.)],
            [p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.)],
            [p(1., -1., 1.), p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.)],
            [p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.), p(-1., 1., -1.)],
        ];

        let mut mesh = Self::with_capacity(12);
        for [a, b, c, d] in faces {
            mesh.add_triangle(Triangle::flat(a, b, c, DEFAULT_COLOR));
            mesh.add_triangle(Triangle::flat(a, c, d, DEFAULT_COLOR));
        }
        mesh
    }
}
