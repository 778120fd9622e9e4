//! World mesh reconstruction
//!
//! Level geometry is stored as one shared vertex buffer, one shared 16-bit
//! index buffer, and a list of surfaces. Each surface owns a window of the
//! index buffer; its indices are local to the surface and become global
//! vertex indices only after adding the surface's vertex base. That additive
//! step is what lets 16-bit indices address meshes with more than 65535
//! vertices.

use std::collections::HashMap;
use thiserror::Error;

/// Unit conversion applied to every decoded position (inches to centimetres)
pub const POSITION_SCALE: f32 = 2.54;

/// One decoded world vertex
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

/// A contiguous run of faces bound to one material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    /// Added to every local index to make it global
    pub vertex_base: u32,
    /// First entry of this surface's window in the index buffer
    pub face_index: u32,
    pub vertex_count: u16,
    pub face_count: u16,
    /// Address of the material record
    pub material: usize,
}

impl Surface {
    /// Index-buffer range read by this surface, if it fits in `index_count`
    pub fn index_window(&self, index_count: usize) -> Option<std::ops::Range<usize>> {
        let start = self.face_index as usize;
        let end = start.checked_add(self.face_count as usize * 3)?;
        (end <= index_count).then_some(start..end)
    }
}

/// Kept triangles for one material, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangleGroup {
    pub material: String,
    pub faces: Vec<[u32; 3]>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error(
        "Surface index window {face_index}+{face_count}*3 exceeds index buffer of {index_count}"
    )]
    IndexWindow {
        face_index: u32,
        face_count: u16,
        index_count: usize,
    },

    #[error("Surface {surface} produced vertex index {index} outside {vertex_count} vertices")]
    VertexOutOfRange {
        surface: usize,
        index: u64,
        vertex_count: usize,
    },
}

/// Rebuild the kept faces of one surface
///
/// Degenerate faces (any two corners equal) are dropped. Corners are emitted
/// as (first, third, second) to flip winding into the target handedness.
pub fn surface_faces(
    surface: &Surface,
    surface_number: usize,
    indices: &[u16],
    vertex_count: usize,
) -> Result<Vec<[u32; 3]>, GeometryError> {
    let window = surface
        .index_window(indices.len())
        .ok_or(GeometryError::IndexWindow {
            face_index: surface.face_index,
            face_count: surface.face_count,
            index_count: indices.len(),
        })?;

    let base = surface.vertex_base as u64;
    let mut faces = Vec::with_capacity(surface.face_count as usize);

    for corners in indices[window].chunks_exact(3) {
        let i1 = corners[0] as u64 + base;
        let i2 = corners[1] as u64 + base;
        let i3 = corners[2] as u64 + base;

        if i1 == i2 || i1 == i3 || i2 == i3 {
            continue;
        }

        for index in [i1, i2, i3] {
            if index >= vertex_count as u64 {
                return Err(GeometryError::VertexOutOfRange {
                    surface: surface_number,
                    index,
                    vertex_count,
                });
            }
        }

        faces.push([i1 as u32, i3 as u32, i2 as u32]);
    }

    Ok(faces)
}

/// Accumulates surfaces into per-material triangle groups
pub struct MeshBuilder<'a> {
    indices: &'a [u16],
    vertex_count: usize,
    groups: Vec<TriangleGroup>,
    by_material: HashMap<String, usize>,
    surfaces_seen: usize,
    rejected: usize,
}

impl<'a> MeshBuilder<'a> {
    pub fn new(indices: &'a [u16], vertex_count: usize) -> Self {
        Self {
            indices,
            vertex_count,
            groups: Vec::new(),
            by_material: HashMap::new(),
            surfaces_seen: 0,
            rejected: 0,
        }
    }

    /// Add one surface's kept faces under `material`
    ///
    /// A surface whose index window falls outside the index buffer is
    /// rejected and skipped. A face that survives the degenerate check but
    /// lands outside the vertex buffer is a hard error.
    pub fn add_surface(&mut self, surface: &Surface, material: &str) -> Result<usize, GeometryError> {
        let number = self.surfaces_seen;
        self.surfaces_seen += 1;

        let faces = match surface_faces(surface, number, self.indices, self.vertex_count) {
            Ok(faces) => faces,
            Err(err @ GeometryError::IndexWindow { .. }) => {
                tracing::warn!(surface = number, "{}", err);
                self.rejected += 1;
                return Ok(0);
            }
            Err(err) => return Err(err),
        };

        let kept = faces.len();
        let slot = match self.by_material.get(material) {
            Some(&slot) => slot,
            None => {
                self.groups.push(TriangleGroup {
                    material: material.to_string(),
                    faces: Vec::new(),
                });
                self.by_material
                    .insert(material.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].faces.extend(faces);

        Ok(kept)
    }

    /// Number of surfaces rejected for an out-of-range index window
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn finish(self) -> Vec<TriangleGroup> {
        self.groups
    }
}
