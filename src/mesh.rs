//! Mesh building blocks shared by terrain tiles and the wave sheet
//!
//! Vertices are laid out with `x = row * spacing`, `z = col * spacing` and
//! height in `y`. Triangles wind so that a flat grid faces +Y.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// One mesh vertex: world position plus texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    #[inline]
    pub fn height(&self) -> f32 {
        self.position[1]
    }
}

/// Triangle index list for a `rows x cols` vertex grid.
///
/// Two triangles per cell, six indices per cell, stride three per triangle.
/// Depends only on the grid shape, never on heights.
pub fn triangulate(rows: usize, cols: usize) -> Vec<u32> {
    if rows < 2 || cols < 2 {
        return Vec::new();
    }
    let mut triangles = Vec::with_capacity((rows - 1) * (cols - 1) * 6);
    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            let lower = (i * cols + j) as u32;
            let upper = lower + cols as u32;

            triangles.push(lower + 1);
            triangles.push(upper);
            triangles.push(lower);

            triangles.push(upper + 1);
            triangles.push(upper);
            triangles.push(lower + 1);
        }
    }
    triangles
}

/// Area-weighted vertex normals. Vertices with no contributing area get +Y.
pub fn compute_normals(vertices: &[Vertex], triangles: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![[0.0f32; 3]; vertices.len()];

    for tri in triangles.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let pa = vertices[a].position;
        let pb = vertices[b].position;
        let pc = vertices[c].position;
        let face = cross(sub(pb, pa), sub(pc, pa));
        for idx in [a, b, c] {
            accum[idx][0] += face[0];
            accum[idx][1] += face[1];
            accum[idx][2] += face[2];
        }
    }

    accum
        .into_iter()
        .map(|n| {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if len > f32::EPSILON {
                [n[0] / len, n[1] / len, n[2] / len]
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for v in vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v.position[axis]);
                max[axis] = max[axis].max(v.position[axis]);
            }
        }
        if vertices.is_empty() {
            min = [0.0; 3];
            max = [0.0; 3];
        }
        Self { min, max }
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }
}

#[inline]
fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
