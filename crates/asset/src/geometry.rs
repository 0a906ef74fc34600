//! CPU-side geometry buffers produced by the OBJ loader.

/// Flattened vertex and index buffers ready for GPU upload.
///
/// Positions and normals are packed as `[x, y, z, x, y, z, ...]`.
/// Normals are either absent or have one entry per position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryData {
    pub vertex_positions: Vec<f32>,
    pub vertex_normals: Option<Vec<f32>>,
    pub index_triangles: Vec<u32>,
    /// Undirected triangle edges, each listed once.
    pub index_lines: Vec<u32>,
}

impl GeometryData {
    pub fn new(
        vertex_positions: Vec<f32>,
        vertex_normals: Option<Vec<f32>>,
        index_triangles: Vec<u32>,
        index_lines: Vec<u32>,
    ) -> Self {
        Self {
            vertex_positions,
            vertex_normals,
            index_triangles,
            index_lines,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_positions.len() / 3
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.index_triangles.len() / 3
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.index_lines.len() / 2
    }

    #[inline]
    pub fn has_normals(&self) -> bool {
        self.vertex_normals.is_some()
    }

    /// Returns `true` if there is at least one vertex and one triangle.
    pub fn is_valid(&self) -> bool {
        !self.vertex_positions.is_empty() && !self.index_triangles.is_empty()
    }
}
