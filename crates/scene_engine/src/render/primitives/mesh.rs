//! Mesh representation for shape nodes
//!
//! Vertex data is plain `#[repr(C)]` POD so it can be uploaded to the device
//! as bytes. Normals are not authored: every mesh starts with zero normals and
//! [`Mesh::compute_vertex_normals`] derives them from the triangle list.

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::foundation::math::Vec3;
use crate::render::api::{InputElement, InputFormat};

/// Mesh construction and processing errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// An index refers past the end of the vertex array
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index value
        index: u32,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// The index count is not a multiple of three
    #[error("Index count {index_count} does not describe whole triangles")]
    IncompleteTriangle {
        /// Number of indices in the mesh
        index_count: usize,
    },

    /// Too few segments to close a round solid
    #[error("Tessellation {tessellation} is below the minimum of {minimum}")]
    InvalidTessellation {
        /// Requested tessellation
        tessellation: usize,
        /// Smallest accepted value
        minimum: usize,
    },

    /// A size parameter is zero, negative or not finite
    #[error("Invalid {name}: {value}")]
    InvalidDimension {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: f32,
    },

    /// The shape needs more vertices than 32-bit indices can address
    #[error("{vertex_count} vertices exceed the 32-bit index range")]
    TooManyVertices {
        /// Vertices the shape would need, saturated on overflow
        vertex_count: usize,
    },
}

/// Vertex with position, normal, and texture coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Position in object space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Size of one vertex in bytes
    #[allow(clippy::cast_possible_truncation)]
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;

    /// Input layout matching the field order above
    pub const LAYOUT: [InputElement; 3] = [
        InputElement { semantic: "POSITION", format: InputFormat::Float32x3, offset: 0 },
        InputElement { semantic: "NORMAL", format: InputFormat::Float32x3, offset: 12 },
        InputElement { semantic: "TEXCOORD", format: InputFormat::Float32x2, offset: 24 },
    ];

    /// Vertex with a zero normal
    pub fn new(position: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, normal: [0.0; 3], tex_coord }
    }
}

/// Triangle-list mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Index data, three per triangle
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new mesh
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of whole triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check that the indices form whole triangles over existing vertices
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle { index_count: self.indices.len() });
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(MeshError::IndexOutOfRange { index, vertex_count: self.vertices.len() });
        }
        Ok(())
    }

    /// Derive smooth per-vertex normals from the triangles
    ///
    /// Each triangle (A, B, C) contributes `(B - A) × (C - A)` to its three
    /// vertices. The sum at each vertex is divided by the number of
    /// contributing triangles and normalised. Vertices no triangle references
    /// keep a zero normal, as do vertices whose contributions cancel out.
    /// Existing normals are discarded, so calling this twice is harmless.
    pub fn compute_vertex_normals(&mut self) -> Result<(), MeshError> {
        self.validate()?;

        let mut sums = vec![Vec3::zeros(); self.vertices.len()];
        let mut counts = vec![0_u32; self.vertices.len()];

        for triangle in self.indices.chunks_exact(3) {
            let corners = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            let [a, b, c] = corners.map(|i| Vec3::from(self.vertices[i].position));
            let face_normal = (b - a).cross(&(c - a));

            for i in corners {
                sums[i] += face_normal;
                counts[i] += 1;
            }
        }

        for ((vertex, sum), count) in self.vertices.iter_mut().zip(sums).zip(counts) {
            let normal = if count == 0 {
                sum
            } else {
                #[allow(clippy::cast_precision_loss)]
                let average = sum / count as f32;
                average.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
            };
            vertex.normal = normal.into();
        }

        Ok(())
    }

    /// Vertex data as bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as bytes for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Unit cube spanning ±1 on each axis
    ///
    /// Each face has its own four vertices so the derived normals stay flat.
    /// Faces wind counter-clockwise seen from outside. Normals are zero.
    pub fn cube() -> Self {
        let vertices = vec![
            // +Z
            Vertex::new([-1.0, -1.0, 1.0], [0.0, 0.0]),
            Vertex::new([1.0, -1.0, 1.0], [0.0, 1.0]),
            Vertex::new([-1.0, 1.0, 1.0], [1.0, 0.0]),
            Vertex::new([1.0, 1.0, 1.0], [1.0, 1.0]),
            // -Z
            Vertex::new([-1.0, -1.0, -1.0], [0.0, 0.0]),
            Vertex::new([-1.0, 1.0, -1.0], [0.0, 1.0]),
            Vertex::new([1.0, -1.0, -1.0], [1.0, 0.0]),
            Vertex::new([1.0, 1.0, -1.0], [1.0, 1.0]),
            // +Y
            Vertex::new([-1.0, 1.0, -1.0], [0.0, 0.0]),
            Vertex::new([-1.0, 1.0, 1.0], [0.0, 1.0]),
            Vertex::new([1.0, 1.0, -1.0], [1.0, 0.0]),
            Vertex::new([1.0, 1.0, 1.0], [1.0, 1.0]),
            // -Y
            Vertex::new([-1.0, -1.0, -1.0], [0.0, 0.0]),
            Vertex::new([1.0, -1.0, -1.0], [0.0, 1.0]),
            Vertex::new([-1.0, -1.0, 1.0], [1.0, 0.0]),
            Vertex::new([1.0, -1.0, 1.0], [1.0, 1.0]),
            // +X
            Vertex::new([1.0, -1.0, -1.0], [0.0, 0.0]),
            Vertex::new([1.0, 1.0, -1.0], [0.0, 1.0]),
            Vertex::new([1.0, -1.0, 1.0], [1.0, 0.0]),
            Vertex::new([1.0, 1.0, 1.0], [1.0, 1.0]),
            // -X
            Vertex::new([-1.0, -1.0, -1.0], [0.0, 0.0]),
            Vertex::new([-1.0, -1.0, 1.0], [0.0, 1.0]),
            Vertex::new([-1.0, 1.0, -1.0], [1.0, 0.0]),
            Vertex::new([-1.0, 1.0, 1.0], [1.0, 1.0]),
        ];

        let indices = (0..6_u32)
            .flat_map(|face| {
                let base = face * 4;
                [base, base + 1, base + 2, base + 2, base + 1, base + 3]
            })
            .collect();

        Self::new(vertices, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn normal(mesh: &Mesh, index: usize) -> Vec3 {
        Vec3::from(mesh.vertices[index].normal)
    }

    #[test]
    fn test_single_triangle_normal() {
        let a = [0.0, 0.0, 0.0];
        let b = [2.0, 0.0, 0.0];
        let c = [0.0, 3.0, 0.0];
        let mut mesh = Mesh::new(
            vec![Vertex::new(a, [0.0, 0.0]), Vertex::new(b, [0.0, 0.0]), Vertex::new(c, [0.0, 0.0])],
            vec![0, 1, 2],
        );

        mesh.compute_vertex_normals().unwrap();

        let expected = (Vec3::from(b) - Vec3::from(a)).cross(&(Vec3::from(c) - Vec3::from(a))).normalize();
        for i in 0..3 {
            assert_relative_eq!(normal(&mesh, i), expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_shared_vertex_between_coplanar_triangles() {
        // Two triangles of a quad in the z = 1 plane share vertices 1 and 2
        let mut mesh = Mesh::new(
            vec![
                Vertex::new([0.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex::new([1.0, 0.0, 1.0], [0.0, 0.0]),
                Vertex::new([0.0, 1.0, 1.0], [0.0, 0.0]),
                Vertex::new([1.0, 1.0, 1.0], [0.0, 0.0]),
            ],
            vec![0, 1, 2, 2, 1, 3],
        );

        mesh.compute_vertex_normals().unwrap();

        for i in 0..4 {
            assert_relative_eq!(normal(&mesh, i), Vec3::z(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_unreferenced_vertex_keeps_zero_normal() {
        let mut mesh = Mesh::new(
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0]),
                Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0]),
                Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0]),
                Vertex::new([5.0, 5.0, 5.0], [0.0, 0.0]),
            ],
            vec![0, 1, 2],
        );

        mesh.compute_vertex_normals().unwrap();

        let orphan = normal(&mesh, 3);
        assert!(orphan.iter().all(|c| !c.is_nan()));
        assert_eq!(orphan, Vec3::zeros());
    }

    #[test]
    fn test_degenerate_triangle_does_not_produce_nan() {
        let mut mesh = Mesh::new(
            vec![
                Vertex::new([1.0, 1.0, 1.0], [0.0, 0.0]),
                Vertex::new([1.0, 1.0, 1.0], [0.0, 0.0]),
                Vertex::new([1.0, 1.0, 1.0], [0.0, 0.0]),
            ],
            vec![0, 1, 2],
        );

        mesh.compute_vertex_normals().unwrap();

        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0; 3]));
    }

    #[test]
    fn test_recomputing_normals_is_stable() {
        let mut mesh = Mesh::cube();
        mesh.compute_vertex_normals().unwrap();
        let first = mesh.clone();
        mesh.compute_vertex_normals().unwrap();
        assert_eq!(mesh, first);
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let mut mesh = Mesh::cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.triangle_count(), 12);

        mesh.compute_vertex_normals().unwrap();

        for vertex in &mesh.vertices {
            let n = Vec3::from(vertex.normal);
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-6);
            // Flat face normals are axis aligned and face away from the centre
            assert_relative_eq!(n.dot(&Vec3::from(vertex.position)), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_validate_rejects_bad_indices() {
        let vertices = vec![Vertex::default(); 3];

        let out_of_range = Mesh::new(vertices.clone(), vec![0, 1, 3]);
        assert_eq!(
            out_of_range.validate(),
            Err(MeshError::IndexOutOfRange { index: 3, vertex_count: 3 })
        );

        let mut partial = Mesh::new(vertices, vec![0, 1]);
        assert_eq!(
            partial.compute_vertex_normals(),
            Err(MeshError::IncompleteTriangle { index_count: 2 })
        );
    }

    #[test]
    fn test_vertex_layout_matches_stride() {
        assert_eq!(Vertex::STRIDE, 32);
        assert_eq!(Vertex::LAYOUT[2].offset, 24);
        assert_eq!(Mesh::cube().vertex_bytes().len(), 24 * 32);
        assert_eq!(Mesh::cube().index_bytes().len(), 36 * 4);
    }
}
