//! The seam between a host scene and the export pipeline.
//!
//! A host (an authoring tool plugin, a file importer, a test) describes its scene as a flat list of
//! [SceneNodes](SceneNode), each of which may carry a mesh exposed as an [AttributeSource]. The
//! pipeline never looks behind these traits.

use nalgebra::{UnitQuaternion, Vector3};

use crate::{Normal, Position, Rgba, Texcoord};

/// One corner of one triangle, with its own attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceVertex {
    /// Index of the original (authoring-side) vertex this corner is attached to.
    pub position_index: u32,
    pub position: Position,
    pub normal: Normal,
    pub uv: Texcoord,
    pub color: Option<Rgba>,
}

impl FaceVertex {
    #[inline]
    pub fn new(position_index: u32, position: Position, normal: Normal, uv: Texcoord) -> Self {
        Self {
            position_index,
            position,
            normal,
            uv,
            color: None,
        }
    }

    #[inline]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }
}

/// Per-face-vertex attribute data for a single mesh.
pub trait AttributeSource {
    /// Human-readable name, used for diagnostics only.
    fn name(&self) -> &str;
    /// Number of original vertices; every [FaceVertex::position_index] must be below this.
    fn vertex_count(&self) -> usize;
    /// Name of the material bound to this mesh, or `None` for the default material.
    fn material(&self) -> Option<&str>;
    /// Triangle corners, three per triangle, in draw order.
    fn face_vertices(&self) -> impl Iterator<Item = FaceVertex> + '_;
}

/// Flat translation/rotation/scale of a node, relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }
}

/// A scene node as reported by the host.
#[derive(Debug, Clone)]
pub struct SceneNode<M> {
    pub name: String,
    pub transform: NodeTransform,
    pub mesh: Option<M>,
}

impl<M> SceneNode<M> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: NodeTransform::default(),
            mesh: None,
        }
    }

    pub fn with_mesh(mut self, mesh: M) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }
}

/// A host scene: an ordered list of nodes.
pub trait SceneSource {
    type Mesh: AttributeSource;
    type Error: std::error::Error + Send + Sync + 'static;

    fn nodes(&self) -> Result<&[SceneNode<Self::Mesh>], Self::Error>;
}

impl<M: AttributeSource> SceneSource for Vec<SceneNode<M>> {
    type Mesh = M;
    type Error = std::convert::Infallible;

    fn nodes(&self) -> Result<&[SceneNode<M>], Self::Error> {
        Ok(self.as_slice())
    }
}

/// An in-memory [AttributeSource].
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: String,
    pub vertex_count: usize,
    pub material: Option<String>,
    pub face_vertices: Vec<FaceVertex>,
}

impl MeshData {
    pub fn new(name: impl Into<String>, vertex_count: usize) -> Self {
        Self {
            name: name.into(),
            vertex_count,
            ..Default::default()
        }
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    #[inline]
    pub fn push(&mut self, face_vertex: FaceVertex) {
        self.face_vertices.push(face_vertex);
    }
}

impl Extend<FaceVertex> for MeshData {
    fn extend<T: IntoIterator<Item = FaceVertex>>(&mut self, iter: T) {
        self.face_vertices.extend(iter);
    }
}

impl AttributeSource for MeshData {
    fn name(&self) -> &str {
        &self.name
    }

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    fn face_vertices(&self) -> impl Iterator<Item = FaceVertex> + '_ {
        self.face_vertices.iter().copied()
    }
}
