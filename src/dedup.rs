//! Per-mesh vertex deduplication.
//!
//! Authoring tools address attributes per face-vertex, while the runtime wants one vertex per
//! distinct attribute combination. [VertexDeduplicator] bridges the two: every original vertex
//! owns a canonical slot in the output buffer (slot `i` for position index `i`), and each further
//! distinct combination seen at that position is appended as a split copy.
//!
//! # Invariants
//!
//! * `candidates.len() == vertex_count`
//! * `candidates[i]` is empty ⟺ position index `i` has not been seen yet
//! * if non-empty, `candidates[i][0] == i`
//! * no two slots in `candidates[i]` hold vertices with equal attributes

use crate::{error::MeshError, AttributeSource, FaceVertex, Rgba, Vertex};

/// Counters describing a single deduplication run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DedupStats {
    /// Number of face-vertices consumed, i.e. the length of the index buffer.
    pub face_vertices: usize,
    /// Number of canonical slots which were referenced at least once.
    pub unique_vertices: usize,
    /// Number of vertices appended because a position carried more than one combination.
    pub split_vertices: usize,
    /// Number of canonical slots never referenced by any face-vertex.
    pub unreferenced_slots: usize,
}

/// The deduplicated buffers of one mesh.
///
/// Indices are local to `vertices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Color per original position index; the first color seen at a position wins for all of its
    /// split copies. Not part of the file format.
    pub colors: Vec<Option<Rgba>>,
    pub stats: DedupStats,
}

impl DedupMesh {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Builds a compact vertex buffer and a triangle index buffer from a face-vertex stream.
#[derive(Debug)]
pub struct VertexDeduplicator {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    colors: Vec<Option<Rgba>>,
    /// Slots holding a combination for each original position index.
    candidates: Vec<Vec<u32>>,
}

impl VertexDeduplicator {
    /// Prepare to deduplicate a mesh with `vertex_count` original vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertices: vec![Vertex::default(); vertex_count],
            indices: Vec::new(),
            colors: vec![None; vertex_count],
            candidates: vec![Vec::new(); vertex_count],
        }
    }

    /// Number of original vertices; the size of the canonical region of the vertex buffer.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.candidates.len()
    }

    /// Consume one face-vertex, returning the slot it was assigned.
    pub fn push(&mut self, fv: &FaceVertex) -> Result<u32, MeshError> {
        let pi = fv.position_index;
        let vertex_count = self.vertex_count();
        let candidates = self
            .candidates
            .get_mut(pi as usize)
            .ok_or(MeshError::PositionIndexOutOfRange {
                index: pi,
                vertex_count,
            })?;

        if let Some(color) = fv.color {
            self.colors[pi as usize].get_or_insert(color);
        }

        let slot = if candidates.is_empty() {
            self.vertices[pi as usize] = Vertex::new(fv.position, fv.normal, fv.uv);
            candidates.push(pi);
            pi
        } else if let Some(&existing) = candidates.iter().find(|&&slot| {
            self.vertices[slot as usize].same_attributes(&fv.position, &fv.normal, &fv.uv)
        }) {
            existing
        } else {
            let split = MeshError::narrow("vertex", self.vertices.len())?;
            self.vertices.push(Vertex::new(fv.position, fv.normal, fv.uv));
            candidates.push(split);
            split
        };

        self.indices.push(slot);
        Ok(slot)
    }

    /// Finish deduplication, yielding the mesh's buffers.
    pub fn finish(self) -> DedupMesh {
        let vertex_count = self.vertex_count();
        let unique_vertices = self.candidates.iter().filter(|c| !c.is_empty()).count();
        let stats = DedupStats {
            face_vertices: self.indices.len(),
            unique_vertices,
            split_vertices: self.vertices.len() - vertex_count,
            unreferenced_slots: vertex_count - unique_vertices,
        };
        DedupMesh {
            vertices: self.vertices,
            indices: self.indices,
            colors: self.colors,
            stats,
        }
    }
}

/// Deduplicate every face-vertex of `mesh`.
#[tracing::instrument(skip(mesh), fields(mesh = mesh.name(), vertex_count = mesh.vertex_count()))]
pub fn dedup_mesh<M: AttributeSource + ?Sized>(mesh: &M) -> Result<DedupMesh, MeshError> {
    let start = std::time::Instant::now();
    let mut dedup = VertexDeduplicator::new(mesh.vertex_count());
    for fv in mesh.face_vertices() {
        dedup.push(&fv)?;
    }
    let res = dedup.finish();

    if res.indices.len() % 3 != 0 {
        tracing::warn!(
            face_vertices = res.indices.len(),
            "face-vertex count is not a multiple of 3; trailing corners do not form a triangle"
        );
    }
    if res.stats.unreferenced_slots > 0 {
        tracing::debug!(
            unreferenced = res.stats.unreferenced_slots,
            "some original vertices are not referenced by any face; their slots are zeroed"
        );
    }
    tracing::debug!(
        face_vertices = res.stats.face_vertices,
        unique = res.stats.unique_vertices,
        split = res.stats.split_vertices,
        elapsed_us = start.elapsed().as_micros() as u64,
        "deduplicated mesh"
    );
    Ok(res)
}
