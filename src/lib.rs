//! Conversion of authoring-side meshes into `.vtmesh` files.
//!
//! The pipeline runs in three steps, each usable on its own:
//!
//! 1. [VertexDeduplicator] turns the face-vertex stream of one mesh into a vertex buffer and a
//!    triangle index buffer, splitting original vertices which carry more than one attribute
//!    combination.
//! 2. [ExportContext] concatenates the per-mesh buffers into one shared buffer, computing the
//!    offsets and material binding of each [Submesh].
//! 3. [MeshFile::write_to] encodes the result in the fixed little-endian layout described in
//!    [codec].
//!
//! [export()] runs all of them against a [SceneSource] and writes the file atomically.
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

mod assemble;
pub mod codec;
pub mod dedup;
pub mod error;
mod export;
mod material;
mod source;
mod vertex;

pub use assemble::*;
pub use dedup::{DedupMesh, DedupStats, VertexDeduplicator};
pub use error::Error;
pub use export::*;
pub use material::*;
pub use source::*;
pub use vertex::*;
