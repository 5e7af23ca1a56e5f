use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::math::bounds::BoundingSphere;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3) -> Vertex {
        Vertex { position, normal }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

pub struct Mesh {
    pub name: String,
    pub topology: Topology,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub bounds: BoundingSphere,
}

impl Mesh {
    pub fn new(
        name: impl Into<String>,
        topology: Topology,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) -> Mesh {
        let bounds = BoundingSphere::from_points(vertices.iter().map(|vertex| vertex.position));

        Mesh {
            name: name.into(),
            topology,
            vertices,
            indices,
            bounds,
        }
    }
}

pub fn uv_sphere(name: impl Into<String>, radius: f32, stacks: u32, slices: u32) -> Mesh {
    let stacks = stacks.max(2);
    let slices = slices.max(3);

    let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);

    for stack in 0..=stacks {
        let v = stack as f32 / stacks as f32;
        let phi = v * PI;

        let sin_phi = phi.sin();
        let cos_phi = phi.cos();

        for slice in 0..=slices {
            let u = slice as f32 / slices as f32;
            let theta = u * TAU;

            let normal = Vec3::new(
                sin_phi * theta.cos(),
                cos_phi,
                sin_phi * theta.sin(),
            );

            vertices.push(Vertex::new(normal * radius, normal));
        }
    }

    let ring = slices + 1;
    let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);

    for stack in 0..stacks {
        for slice in 0..slices {
            let i0 = stack * ring + slice;
            let i1 = i0 + 1;
            let i2 = (stack + 1) * ring + slice;
            let i3 = i2 + 1;

            // Two triangles per quad (CCW)
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    Mesh::new(name, Topology::Triangles, vertices, indices)
}

/// Capped cylinder around the Y axis, centered at the origin.
pub fn cylinder(name: impl Into<String>, radius: f32, height: f32, segments: u32) -> Mesh {
    let segments = segments.max(3);
    let half = height * 0.5;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Side
    for segment in 0..=segments {
        let theta = segment as f32 / segments as f32 * TAU;
        let normal = Vec3::new(theta.cos(), 0.0, theta.sin());
        let offset = normal * radius;

        vertices.push(Vertex::new(offset + Vec3::Y * half, normal));
        vertices.push(Vertex::new(offset - Vec3::Y * half, normal));
    }

    for segment in 0..segments {
        let i0 = segment * 2;
        indices.extend_from_slice(&[i0, i0 + 1, i0 + 2, i0 + 2, i0 + 1, i0 + 3]);
    }

    // Caps
    for (center_y, normal) in [(half, Vec3::Y), (-half, Vec3::NEG_Y)] {
        let center_index = vertices.len() as u32;
        vertices.push(Vertex::new(Vec3::Y * center_y, normal));

        for segment in 0..=segments {
            let theta = segment as f32 / segments as f32 * TAU;
            let position = Vec3::new(theta.cos() * radius, center_y, theta.sin() * radius);
            vertices.push(Vertex::new(position, normal));
        }

        for segment in 0..segments {
            let i0 = center_index + 1 + segment;
            indices.extend_from_slice(&[center_index, i0, i0 + 1]);
        }
    }

    Mesh::new(name, Topology::Triangles, vertices, indices)
}

/// Flat rectangle in the XZ plane, facing +Y.
pub fn plane(name: impl Into<String>, width: f32, depth: f32) -> Mesh {
    let half_width = width * 0.5;
    let half_depth = depth * 0.5;

    let vertices = vec![
        Vertex::new(Vec3::new(-half_width, 0.0, -half_depth), Vec3::Y),
        Vertex::new(Vec3::new(half_width, 0.0, -half_depth), Vec3::Y),
        Vertex::new(Vec3::new(half_width, 0.0, half_depth), Vec3::Y),
        Vertex::new(Vec3::new(-half_width, 0.0, half_depth), Vec3::Y),
    ];
    let indices = vec![0, 2, 1, 0, 3, 2];

    Mesh::new(name, Topology::Triangles, vertices, indices)
}

/// Lattice of line segments over the faces of a box: for every slice along
/// each axis, a rectangular ring of four segments. The classic VR room cage.
pub fn box_line_grid(
    name: impl Into<String>,
    width: f32,
    height: f32,
    depth: f32,
    segments: u32,
) -> Mesh {
    let half_width = width * 0.5;
    let half_height = height * 0.5;
    let half_depth = depth * 0.5;

    let mut vertices = Vec::new();

    let mut push_segment = |from: Vec3, to: Vec3| {
        vertices.push(Vertex::new(from, Vec3::Y));
        vertices.push(Vertex::new(to, Vec3::Y));
    };

    for slice in 0..=segments {
        let t = slice as f32 / segments as f32;

        let x = t * width - half_width;
        push_segment(
            Vec3::new(x, -half_height, -half_depth),
            Vec3::new(x, half_height, -half_depth),
        );
        push_segment(
            Vec3::new(x, half_height, -half_depth),
            Vec3::new(x, half_height, half_depth),
        );
        push_segment(
            Vec3::new(x, half_height, half_depth),
            Vec3::new(x, -half_height, half_depth),
        );
        push_segment(
            Vec3::new(x, -half_height, half_depth),
            Vec3::new(x, -half_height, -half_depth),
        );

        let y = t * height - half_height;
        push_segment(
            Vec3::new(-half_width, y, -half_depth),
            Vec3::new(half_width, y, -half_depth),
        );
        push_segment(
            Vec3::new(half_width, y, -half_depth),
            Vec3::new(half_width, y, half_depth),
        );
        push_segment(
            Vec3::new(half_width, y, half_depth),
            Vec3::new(-half_width, y, half_depth),
        );
        push_segment(
            Vec3::new(-half_width, y, half_depth),
            Vec3::new(-half_width, y, -half_depth),
        );

        let z = t * depth - half_depth;
        push_segment(
            Vec3::new(-half_width, -half_height, z),
            Vec3::new(-half_width, half_height, z),
        );
        push_segment(
            Vec3::new(-half_width, half_height, z),
            Vec3::new(half_width, half_height, z),
        );
        push_segment(
            Vec3::new(half_width, half_height, z),
            Vec3::new(half_width, -half_height, z),
        );
        push_segment(
            Vec3::new(half_width, -half_height, z),
            Vec3::new(-half_width, -half_height, z),
        );
    }

    let indices = (0..vertices.len() as u32).collect();

    Mesh::new(name, Topology::Lines, vertices, indices)
}

pub fn line_segment(name: impl Into<String>, from: Vec3, to: Vec3) -> Mesh {
    let vertices = vec![Vertex::new(from, Vec3::Y), Vertex::new(to, Vec3::Y)];

    Mesh::new(name, Topology::Lines, vertices, vec![0, 1])
}
