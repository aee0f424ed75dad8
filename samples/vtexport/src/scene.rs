//! glTF documents as export sources.
//!
//! # Notes
//!
//! * Every node of the default scene (or the first scene, if no default is given) is reported,
//!   flattened depth-first. Transforms are captured as given, relative to each node's parent.
//! * The triangle primitives of a mesh are merged into one face-vertex stream; position indices of
//!   later primitives are rebased past the vertices of earlier ones.
//! * A mesh is bound to the material of its first triangle primitive.
//! * Images are never loaded.

use std::path::Path;

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use vtmesh::{FaceVertex, MeshData, Normal, NodeTransform, Position, Rgba, SceneNode, Texcoord};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Gltf(#[from] gltf::Error),
    #[error("primitive {primitive} of mesh {mesh:?} has no positions")]
    MissingPositions { mesh: String, primitive: usize },
    #[error("mesh {mesh:?}, primitive {primitive}: vertex {index} out of range (0..{count})")]
    IndexOutOfRange {
        mesh: String,
        primitive: usize,
        index: u32,
        count: usize,
    },
    #[error("mesh {0:?} has more vertices than fit in a u32")]
    TooManyVertices(String),
}

/// Read the nodes of the glTF (or GLB) document at `path`.
#[tracing::instrument]
pub fn load_scene(path: &Path) -> Result<Vec<SceneNode<MeshData>>, SceneError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::open(path)?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)?;

    let Some(scene) = document
        .default_scene()
        .or_else(|| document.scenes().next())
    else {
        tracing::warn!("document contains no scenes");
        return Ok(Vec::new());
    };

    let mut res = Vec::new();
    let mut stack: Vec<gltf::Node<'_>> = scene.nodes().collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        stack.extend(node.children().collect::<Vec<_>>().into_iter().rev());
        res.push(load_node(&node, &buffers)?);
    }
    tracing::debug!(nodes = res.len(), "read glTF scene");
    Ok(res)
}

fn load_node(
    node: &gltf::Node<'_>,
    buffers: &[gltf::buffer::Data],
) -> Result<SceneNode<MeshData>, SceneError> {
    let name = match node.name() {
        Some(name) => name.to_owned(),
        None => format!("node{}", node.index()),
    };
    let (t, r, s) = node.transform().decomposed();
    // glTF stores quaternions as [x, y, z, w]
    let transform = NodeTransform {
        translation: Vector3::from(t),
        rotation: UnitQuaternion::from_quaternion(Quaternion::new(r[3], r[0], r[1], r[2])),
        scale: Vector3::from(s),
    };

    let res = SceneNode::new(name).with_transform(transform);
    Ok(match node.mesh() {
        Some(mesh) => res.with_mesh(load_mesh(&mesh, buffers)?),
        None => res,
    })
}

fn material_name(material: &gltf::Material<'_>) -> Option<String> {
    let index = material.index()?;
    Some(match material.name() {
        Some(name) => name.to_owned(),
        None => format!("material{index}"),
    })
}

fn load_mesh(
    mesh: &gltf::Mesh<'_>,
    buffers: &[gltf::buffer::Data],
) -> Result<MeshData, SceneError> {
    let name = match mesh.name() {
        Some(name) => name.to_owned(),
        None => format!("mesh{}", mesh.index()),
    };
    let mut builder = MeshBuilder::new(name);
    for primitive in mesh.primitives() {
        builder.push_primitive(&read_primitive(&primitive, buffers))?;
    }
    Ok(builder.finish())
}

/// Attributes of one glTF primitive, detached from the document.
#[derive(Debug, Clone)]
struct PrimitiveData {
    index: usize,
    mode: gltf::mesh::Mode,
    material: Option<String>,
    /// `None` if the primitive has no positions.
    positions: Option<Vec<[f32; 3]>>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    colors: Vec<[f32; 4]>,
    /// `None` for non-indexed primitives.
    indices: Option<Vec<u32>>,
}

impl PrimitiveData {
    fn new(index: usize, mode: gltf::mesh::Mode) -> Self {
        Self {
            index,
            mode,
            material: None,
            positions: None,
            normals: Vec::new(),
            uvs: Vec::new(),
            colors: Vec::new(),
            indices: None,
        }
    }
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> PrimitiveData {
    let mut res = PrimitiveData::new(primitive.index(), primitive.mode());
    if res.mode != gltf::mesh::Mode::Triangles {
        return res;
    }

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()][..]));
    res.material = material_name(&primitive.material());
    res.positions = reader.read_positions().map(Iterator::collect);
    res.normals = reader
        .read_normals()
        .map(Iterator::collect)
        .unwrap_or_default();
    res.uvs = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect())
        .unwrap_or_default();
    res.colors = reader
        .read_colors(0)
        .map(|c| c.into_rgba_f32().collect())
        .unwrap_or_default();
    res.indices = reader.read_indices().map(|i| i.into_u32().collect());
    res
}

/// Merges the triangle primitives of one mesh into a single face-vertex stream.
#[derive(Debug)]
struct MeshBuilder {
    mesh: MeshData,
    bound_material: bool,
}

impl MeshBuilder {
    fn new(name: String) -> Self {
        Self {
            mesh: MeshData::new(name, 0),
            bound_material: false,
        }
    }

    fn too_many(&self) -> SceneError {
        SceneError::TooManyVertices(self.mesh.name.clone())
    }

    fn push_primitive(&mut self, prim: &PrimitiveData) -> Result<(), SceneError> {
        if prim.mode != gltf::mesh::Mode::Triangles {
            tracing::warn!(
                mesh = %self.mesh.name,
                primitive = prim.index,
                mode = ?prim.mode,
                "skipping non-triangle primitive"
            );
            return Ok(());
        }

        let positions = prim
            .positions
            .as_deref()
            .ok_or_else(|| SceneError::MissingPositions {
                mesh: self.mesh.name.clone(),
                primitive: prim.index,
            })?;

        if !self.bound_material {
            self.mesh.material = prim.material.clone();
            self.bound_material = true;
        } else if prim.material != self.mesh.material {
            tracing::warn!(
                mesh = %self.mesh.name,
                primitive = prim.index,
                "primitive material differs from the mesh's first primitive; ignoring it"
            );
        }

        let base = self.mesh.vertex_count;
        let sequential;
        let indices = match prim.indices {
            Some(ref indices) => indices.as_slice(),
            None => {
                let count = u32::try_from(positions.len()).map_err(|_| self.too_many())?;
                sequential = (0..count).collect::<Vec<_>>();
                sequential.as_slice()
            }
        };

        for &index in indices {
            let i = index as usize;
            let Some(&position) = positions.get(i) else {
                return Err(SceneError::IndexOutOfRange {
                    mesh: self.mesh.name.clone(),
                    primitive: prim.index,
                    index,
                    count: positions.len(),
                });
            };
            let position_index = u32::try_from(base + i).map_err(|_| self.too_many())?;
            let normal = prim.normals.get(i).map_or_else(Normal::zeros, |&n| n.into());
            let uv = prim.uvs.get(i).map_or_else(Texcoord::origin, |&uv| uv.into());
            let mut fv = FaceVertex::new(position_index, Position::from(position), normal, uv);
            if let Some(&color) = prim.colors.get(i) {
                fv = fv.with_color(Rgba::from(color));
            }
            self.mesh.push(fv);
        }
        self.mesh.vertex_count += positions.len();
        Ok(())
    }

    fn finish(self) -> MeshData {
        self.mesh
    }
}
