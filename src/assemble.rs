//! Flattening of per-mesh buffers into one shared vertex/index buffer.

use crate::{
    dedup::{dedup_mesh, DedupMesh},
    error::MeshError,
    AttributeSource, Error, MaterialRegistry, NodeTransform, SceneNode, SceneSource, Vertex,
};

/// A contiguous run of the shared index buffer drawn with one material.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Submesh {
    pub material_index: u32,
    pub index_count: u32,
    /// Number of vertices contributed by all previous submeshes.
    pub vertex_offset: u32,
    /// Number of indices contributed by all previous submeshes.
    pub index_offset: u32,
}

impl Submesh {
    /// Range of this submesh within the shared index buffer.
    #[inline]
    pub fn index_range(&self) -> std::ops::Range<usize> {
        let start = self.index_offset as usize;
        start..start + self.index_count as usize
    }
}

/// Everything stored in a `.vtmesh` file.
///
/// Index values are local to their submesh; add [Submesh::vertex_offset] to address
/// [MeshFile::vertices].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshFile {
    pub submeshes: Vec<Submesh>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshFile {
    /// Local indices of one submesh, or `None` if its range lies outside the index buffer.
    pub fn submesh_indices(&self, submesh: &Submesh) -> Option<&[u32]> {
        self.indices.get(submesh.index_range())
    }

    /// Iterate through the vertices referenced by `submesh`, one per triangle corner.
    ///
    /// Returns `None` if any index of `submesh` addresses a vertex outside the buffer.
    pub fn resolve(&self, submesh: &Submesh) -> Option<impl Iterator<Item = &Vertex> + '_> {
        let indices = self.submesh_indices(submesh)?;
        let vertices = self.vertices.get(submesh.vertex_offset as usize..)?;
        if indices.iter().any(|&i| i as usize >= vertices.len()) {
            return None;
        }
        Some(indices.iter().map(move |&i| &vertices[i as usize]))
    }
}

/// A host node, as captured during export.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub name: String,
    pub transform: NodeTransform,
    /// Index of the submesh produced from this node's mesh, if it produced one.
    pub submesh: Option<usize>,
}

/// The fully assembled result of an export.
#[derive(Debug, Default, Clone)]
pub struct Scene {
    pub file: MeshFile,
    pub materials: MaterialRegistry,
    pub nodes: Vec<NodeRecord>,
}

/// State of a single export run: the material registry, the shared buffers, and the submesh list.
///
/// Meshes are appended strictly in encounter order; offsets are running totals of everything
/// appended before.
#[derive(Debug, Default)]
pub struct ExportContext {
    materials: MaterialRegistry,
    file: MeshFile,
    nodes: Vec<NodeRecord>,
}

impl ExportContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    #[inline]
    pub fn materials_mut(&mut self) -> &mut MaterialRegistry {
        &mut self.materials
    }

    #[inline]
    pub fn submeshes(&self) -> &[Submesh] {
        &self.file.submeshes
    }

    /// Append one deduplicated mesh as a new submesh.
    ///
    /// Returns `None` without touching any buffer if `mesh` has no face-vertices.
    pub fn push_mesh(
        &mut self,
        mesh: DedupMesh,
        material_index: u32,
    ) -> Result<Option<usize>, MeshError> {
        if mesh.is_empty() {
            return Ok(None);
        }

        let submesh = Submesh {
            material_index,
            index_count: MeshError::narrow("index", mesh.indices.len())?,
            vertex_offset: MeshError::narrow("vertex", self.file.vertices.len())?,
            index_offset: MeshError::narrow("index", self.file.indices.len())?,
        };
        // the totals after this mesh must stay addressable as well
        MeshError::narrow("vertex", self.file.vertices.len() + mesh.vertices.len())?;
        MeshError::narrow("index", self.file.indices.len() + mesh.indices.len())?;
        MeshError::narrow("submesh", self.file.submeshes.len() + 1)?;

        self.file.vertices.extend(mesh.vertices);
        self.file.indices.extend(mesh.indices);
        self.file.submeshes.push(submesh);
        Ok(Some(self.file.submeshes.len() - 1))
    }

    /// Deduplicate `mesh`, bind its material, and append it.
    pub fn push_source<M: AttributeSource + ?Sized>(
        &mut self,
        mesh: &M,
    ) -> Result<Option<usize>, MeshError> {
        let dedup = dedup_mesh(mesh)?;
        if dedup.is_empty() {
            tracing::debug!(mesh = mesh.name(), "skipping mesh without faces");
            return Ok(None);
        }
        let material = self.materials.resolve(mesh.material());
        self.push_mesh(dedup, material)
    }

    /// Record a host node, appending its mesh (if any).
    pub fn push_node<M: AttributeSource>(
        &mut self,
        node: &SceneNode<M>,
    ) -> Result<Option<usize>, MeshError> {
        let submesh = match node.mesh {
            Some(ref mesh) => self.push_source(mesh)?,
            None => None,
        };
        tracing::trace!(
            node = %node.name,
            translation = ?node.transform.translation.as_slice(),
            rotation = ?node.transform.rotation.coords.as_slice(),
            scale = ?node.transform.scale.as_slice(),
            submesh = ?submesh,
            "captured node"
        );
        self.nodes.push(NodeRecord {
            name: node.name.clone(),
            transform: node.transform,
            submesh,
        });
        Ok(submesh)
    }

    /// Finish assembly.
    ///
    /// Fails with [Error::EmptyScene] if no submesh was produced.
    pub fn finish(self) -> Result<Scene, Error> {
        if self.file.submeshes.is_empty() {
            return Err(Error::EmptyScene);
        }
        Ok(Scene {
            file: self.file,
            materials: self.materials,
            nodes: self.nodes,
        })
    }
}

/// Collect every node of `source` into a [Scene].
#[tracing::instrument(skip_all)]
pub fn assemble<S: SceneSource + ?Sized>(source: &S) -> Result<Scene, Error> {
    let nodes = source.nodes().map_err(Error::from_source)?;
    if nodes.is_empty() {
        return Err(Error::EmptyScene);
    }

    let mut ctx = ExportContext::new();
    for node in nodes {
        ctx.push_node(node)?;
    }
    let scene = ctx.finish()?;

    tracing::debug!(
        nodes = scene.nodes.len(),
        submeshes = scene.file.submeshes.len(),
        vertices = scene.file.vertices.len(),
        indices = scene.file.indices.len(),
        materials = scene.materials.len(),
        "assembled scene"
    );
    Ok(scene)
}
