//! Parametric solids
//!
//! Generates triangle meshes for boxes, spheres, cylinders and cones centred
//! on the origin. Faces wind counter-clockwise seen from outside and every
//! vertex is emitted with a zero normal; shape nodes derive normals with
//! [`Mesh::compute_vertex_normals`].

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use super::mesh::{Mesh, MeshError, Vertex};

/// Smallest tessellation that closes a round solid
pub const MIN_TESSELLATION: usize = 3;

/// A solid described by a few parameters rather than authored vertices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParametricShape {
    /// Axis-aligned box with the given extents
    Box {
        /// Full size along X, Y and Z
        size: Vec3,
    },
    /// UV sphere
    Sphere {
        /// Sphere diameter
        diameter: f32,
        /// Latitude bands; longitude uses twice as many
        tessellation: usize,
    },
    /// Capped cylinder along Y
    Cylinder {
        /// Height along Y
        height: f32,
        /// Diameter of the caps
        diameter: f32,
        /// Segments around the axis
        tessellation: usize,
    },
    /// Cone along Y with its apex at the top
    Cone {
        /// Diameter of the base
        diameter: f32,
        /// Height along Y
        height: f32,
        /// Segments around the axis
        tessellation: usize,
    },
}

impl ParametricShape {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::Cone { .. } => "cone",
        }
    }

    /// Build the mesh for this shape
    pub fn generate(&self) -> Result<Mesh, MeshError> {
        match *self {
            Self::Box { size } => {
                check_dimension("box width", size.x)?;
                check_dimension("box height", size.y)?;
                check_dimension("box depth", size.z)?;
                Ok(box_mesh(size))
            }
            Self::Sphere { diameter, tessellation } => {
                check_dimension("sphere diameter", diameter)?;
                check_tessellation(tessellation)?;
                sphere_mesh(diameter, tessellation)
            }
            Self::Cylinder { height, diameter, tessellation } => {
                check_dimension("cylinder height", height)?;
                check_dimension("cylinder diameter", diameter)?;
                check_tessellation(tessellation)?;
                cylinder_mesh(height, diameter, tessellation)
            }
            Self::Cone { diameter, height, tessellation } => {
                check_dimension("cone diameter", diameter)?;
                check_dimension("cone height", height)?;
                check_tessellation(tessellation)?;
                cone_mesh(diameter, height, tessellation)
            }
        }
    }
}

fn check_dimension(name: &'static str, value: f32) -> Result<(), MeshError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeshError::InvalidDimension { name, value })
    }
}

fn check_tessellation(tessellation: usize) -> Result<(), MeshError> {
    if tessellation < MIN_TESSELLATION {
        return Err(MeshError::InvalidTessellation { tessellation, minimum: MIN_TESSELLATION });
    }
    Ok(())
}

/// Convert a vertex position to a 32-bit index
fn to_index(value: usize) -> Result<u32, MeshError> {
    u32::try_from(value).map_err(|_| MeshError::TooManyVertices { vertex_count: value })
}

/// Reject a vertex count that 32-bit indices cannot address; `None` means
/// the count itself overflowed
fn check_vertex_count(count: Option<usize>) -> Result<u32, MeshError> {
    to_index(count.unwrap_or(usize::MAX))
}

fn next_index(mesh: &Mesh) -> Result<u32, MeshError> {
    to_index(mesh.vertices.len())
}

/// Push the two triangles of a quad whose corners are given lower-left,
/// upper-left, lower-right, upper-right as seen from outside
fn push_quad(indices: &mut Vec<u32>, lower: u32, upper: u32, lower_next: u32, upper_next: u32) {
    indices.extend_from_slice(&[lower, upper, lower_next, lower_next, upper, upper_next]);
}

fn box_mesh(size: Vec3) -> Mesh {
    let half = size * 0.5;
    let mut mesh = Mesh::cube();
    for vertex in &mut mesh.vertices {
        vertex.position = Vec3::from(vertex.position).component_mul(&half).into();
    }
    mesh
}

#[allow(clippy::cast_precision_loss)]
fn sphere_mesh(diameter: f32, tessellation: usize) -> Result<Mesh, MeshError> {
    let radius = diameter * 0.5;
    let vertical_segments = tessellation;
    let horizontal_segments = tessellation.checked_mul(2).unwrap_or(usize::MAX);
    check_vertex_count(
        vertical_segments
            .checked_add(1)
            .zip(horizontal_segments.checked_add(1))
            .and_then(|(rows, columns)| rows.checked_mul(columns)),
    )?;
    let mut mesh = Mesh::default();

    for i in 0..=vertical_segments {
        let v = i as f32 / vertical_segments as f32;
        let latitude = v * PI - PI * 0.5;
        let (dy, dxz) = latitude.sin_cos();
        // Pin the poles so their rings collapse to a single exact point
        let dxz = if i == 0 || i == vertical_segments { 0.0 } else { dxz };

        for j in 0..=horizontal_segments {
            let u = j as f32 / horizontal_segments as f32;
            let (sin_lon, cos_lon) = (u * TAU).sin_cos();
            let position = Vec3::new(dxz * cos_lon, dy, dxz * sin_lon) * radius;
            mesh.vertices.push(Vertex::new(position.into(), [u, 1.0 - v]));
        }
    }

    let stride = to_index(horizontal_segments + 1)?;
    for i in 0..to_index(vertical_segments)? {
        for j in 0..to_index(horizontal_segments)? {
            let lower = i * stride + j;
            let upper = (i + 1) * stride + j;
            push_quad(&mut mesh.indices, lower, upper, lower + 1, upper + 1);
        }
    }

    Ok(mesh)
}

#[allow(clippy::cast_precision_loss)]
fn ring_direction(segment: usize, tessellation: usize) -> (f32, f32) {
    let angle = segment as f32 / tessellation as f32 * TAU;
    let (sin, cos) = angle.sin_cos();
    (cos, sin)
}

/// Flat disc at height `y`; `facing_up` selects the winding
fn push_cap(mesh: &mut Mesh, y: f32, radius: f32, tessellation: usize, facing_up: bool) -> Result<(), MeshError> {
    let centre = next_index(mesh)?;
    mesh.vertices.push(Vertex::new([0.0, y, 0.0], [0.5, 0.5]));

    for i in 0..=tessellation {
        let (x, z) = ring_direction(i, tessellation);
        mesh.vertices.push(Vertex::new([x * radius, y, z * radius], [x * 0.5 + 0.5, z * 0.5 + 0.5]));
    }

    for i in 0..to_index(tessellation)? {
        let current = centre + 1 + i;
        let next = current + 1;
        if facing_up {
            mesh.indices.extend_from_slice(&[centre, next, current]);
        } else {
            mesh.indices.extend_from_slice(&[centre, current, next]);
        }
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn cylinder_mesh(height: f32, diameter: f32, tessellation: usize) -> Result<Mesh, MeshError> {
    let radius = diameter * 0.5;
    let half_height = height * 0.5;
    // Wall pairs plus two caps of centre and ring
    check_vertex_count(tessellation.checked_mul(4).and_then(|n| n.checked_add(6)))?;
    let mut mesh = Mesh::default();

    // Side wall: bottom/top pairs around the axis, seam duplicated
    for i in 0..=tessellation {
        let (x, z) = ring_direction(i, tessellation);
        let u = i as f32 / tessellation as f32;
        mesh.vertices.push(Vertex::new([x * radius, -half_height, z * radius], [u, 1.0]));
        mesh.vertices.push(Vertex::new([x * radius, half_height, z * radius], [u, 0.0]));
    }
    for i in 0..to_index(tessellation)? {
        let lower = i * 2;
        push_quad(&mut mesh.indices, lower, lower + 1, lower + 2, lower + 3);
    }

    push_cap(&mut mesh, half_height, radius, tessellation, true)?;
    push_cap(&mut mesh, -half_height, radius, tessellation, false)?;

    Ok(mesh)
}

#[allow(clippy::cast_precision_loss)]
fn cone_mesh(diameter: f32, height: f32, tessellation: usize) -> Result<Mesh, MeshError> {
    let radius = diameter * 0.5;
    let half_height = height * 0.5;
    // Apexes, base ring and the bottom cap
    check_vertex_count(tessellation.checked_mul(3).and_then(|n| n.checked_add(3)))?;
    let mut mesh = Mesh::default();

    // One apex vertex per segment so the side normals are not averaged into a spike
    for i in 0..tessellation {
        let u = (i as f32 + 0.5) / tessellation as f32;
        mesh.vertices.push(Vertex::new([0.0, half_height, 0.0], [u, 0.0]));
    }
    let base_start = next_index(&mesh)?;
    for i in 0..=tessellation {
        let (x, z) = ring_direction(i, tessellation);
        let u = i as f32 / tessellation as f32;
        mesh.vertices.push(Vertex::new([x * radius, -half_height, z * radius], [u, 1.0]));
    }
    for i in 0..to_index(tessellation)? {
        let lower = base_start + i;
        mesh.indices.extend_from_slice(&[lower, i, lower + 1]);
    }

    push_cap(&mut mesh, -half_height, radius, tessellation, false)?;

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn generate_with_normals(shape: ParametricShape) -> Mesh {
        let mut mesh = shape.generate().unwrap();
        mesh.validate().unwrap();
        mesh.compute_vertex_normals().unwrap();
        mesh
    }

    #[test]
    fn test_box_extents() {
        let mesh = generate_with_normals(ParametricShape::Box { size: Vec3::new(2.0, 4.0, 6.0) });
        let max = mesh.vertices.iter().fold(Vec3::zeros(), |acc, v| acc.sup(&Vec3::from(v.position)));
        assert_relative_eq!(max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn test_sphere_vertices_on_surface_with_outward_normals() {
        let mesh = generate_with_normals(ParametricShape::Sphere { diameter: 4.0, tessellation: 8 });
        assert_eq!(mesh.vertices.len(), 9 * 17);
        assert_eq!(mesh.triangle_count(), 8 * 16 * 2);

        for vertex in &mesh.vertices {
            let p = Vec3::from(vertex.position);
            assert_relative_eq!(p.norm(), 2.0, epsilon = 1e-4);

            let n = Vec3::from(vertex.normal);
            if n != Vec3::zeros() {
                assert!(n.dot(&p) > 0.0, "normal {n:?} points inward at {p:?}");
            }
        }
    }

    #[test]
    fn test_cylinder_caps_face_away() {
        let mesh = generate_with_normals(ParametricShape::Cylinder { height: 2.0, diameter: 1.0, tessellation: 6 });
        // Side: 7 pairs; each cap: centre + 7 ring vertices
        assert_eq!(mesh.vertices.len(), 14 + 8 + 8);
        assert_eq!(mesh.triangle_count(), 12 + 6 + 6);

        let top_centre = &mesh.vertices[14];
        let bottom_centre = &mesh.vertices[22];
        assert_relative_eq!(Vec3::from(top_centre.normal), Vec3::y(), epsilon = 1e-5);
        assert_relative_eq!(Vec3::from(bottom_centre.normal), -Vec3::y(), epsilon = 1e-5);

        // Side wall normals point away from the axis
        for vertex in &mesh.vertices[..14] {
            let p = Vec3::from(vertex.position);
            let n = Vec3::from(vertex.normal);
            assert!(n.dot(&Vec3::new(p.x, 0.0, p.z)) > 0.0);
            assert_relative_eq!(n.y, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_cone_side_normals_lean_outward_and_up() {
        let mesh = generate_with_normals(ParametricShape::Cone { diameter: 2.0, height: 2.0, tessellation: 5 });
        assert_eq!(mesh.triangle_count(), 5 + 5);

        for apex in &mesh.vertices[..5] {
            let n = Vec3::from(apex.normal);
            assert!(n.y > 0.0);
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rejects_low_tessellation() {
        let result = ParametricShape::Sphere { diameter: 1.0, tessellation: 2 }.generate();
        assert_eq!(result, Err(MeshError::InvalidTessellation { tessellation: 2, minimum: 3 }));
    }

    #[test]
    fn test_rejects_non_positive_dimension() {
        let result = ParametricShape::Cone { diameter: 1.0, height: 0.0, tessellation: 8 }.generate();
        assert_eq!(result, Err(MeshError::InvalidDimension { name: "cone height", value: 0.0 }));
    }

    #[test]
    fn test_rejects_tessellation_beyond_index_range() {
        // 100_001 rings of 200_001 vertices cannot be addressed by u32 indices
        let result = ParametricShape::Sphere { diameter: 1.0, tessellation: 100_000 }.generate();
        assert_eq!(result, Err(MeshError::TooManyVertices { vertex_count: 100_001 * 200_001 }));

        let result = ParametricShape::Cylinder { height: 1.0, diameter: 1.0, tessellation: usize::MAX }.generate();
        assert_eq!(result, Err(MeshError::TooManyVertices { vertex_count: usize::MAX }));

        let result = ParametricShape::Cone { diameter: 1.0, height: 1.0, tessellation: 1 << 31 }.generate();
        assert_eq!(result, Err(MeshError::TooManyVertices { vertex_count: 3 * (1 << 31) + 3 }));
    }
}
