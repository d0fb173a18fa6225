//! Draw-ready vertex buffers.
//!
//! A [`ModelBuffer`] uses the layout of a single GL vertex buffer object:
//! every position first, then every colour, then every normal. Renderers
//! read the sections directly.

use bytemuck::{Pod, Zeroable};
use nalgebra::{Vector3, Vector4};

use crate::geometry::Mesh;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Position(pub [f32; 4]);

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Color(pub [f32; 4]);

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Normal(pub [f32; 3]);

/// One vertex as read back from a [`ModelBuffer`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BufferVertex {
    pub position: Vector4<f32>,
    pub color: [f32; 4],
    pub normal: Vector3<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelBuffer {
    positions: Vec<Position>,
    colors: Vec<Color>,
    normals: Vec<Normal>,
    bounding_radius: f32,
}

impl ModelBuffer {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let count = mesh.vertex_count();
        let mut buffer = Self {
            positions: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
            normals: Vec::with_capacity(count),
            bounding_radius: mesh.bounding_radius(),
        };
        for vertex in mesh.triangles.iter().flat_map(|t| t.vertices.iter()) {
            buffer.positions.push(Position(vertex.position.into()));
            buffer.colors.push(Color(vertex.color));
            buffer.normals.push(Normal(vertex.normal.into()));
        }
        buffer
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Byte offset of the colour section.
    pub fn color_offset(&self) -> usize {
        std::mem::size_of_val(self.positions.as_slice())
    }

    /// Byte offset of the normal section.
    pub fn normal_offset(&self) -> usize {
        self.color_offset() + std::mem::size_of_val(self.colors.as_slice())
    }

    /// The whole buffer as it would be uploaded in one block.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.normal_offset() + std::mem::size_of_val(self.normals.as_slice()));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.positions));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.colors));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.normals));
        bytes
    }

    pub fn vertex(&self, index: usize) -> BufferVertex {
        BufferVertex {
            position: Vector4::from(self.positions[index].0),
            color: self.colors[index].0,
            normal: Vector3::from(self.normals[index].0),
        }
    }

    /// Vertices grouped three at a time, in draw order.
    pub fn triangles(&self) -> impl Iterator<Item = [BufferVertex; 3]> + '_ {
        (0..self.vertex_count() / 3).map(move |t| {
            let base = t * 3;
            [self.vertex(base), self.vertex(base + 1), self.vertex(base + 2)]
        })
    }
}
