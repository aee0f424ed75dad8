//! Reading and writing the `.vtmesh` binary layout.
//!
//! # Layout
//!
//! All integers are little-endian; all floats are little-endian IEEE-754 single precision. There is
//! no magic number or version field.
//!
//! | field          | type            | notes                                               |
//! |----------------|-----------------|-----------------------------------------------------|
//! | submesh count  | u32             |                                                     |
//! | reserved       | u64             | always zero                                         |
//! | vertex count   | u32             |                                                     |
//! | vertices       | 14×f32 each     | position, normal, tangent, bitangent, uv            |
//! | index count    | u32             |                                                     |
//! | indices        | u32 each        | local to the owning submesh                         |
//! | bounds padding | 4×f32           | always zero                                         |
//! | submeshes      | 4×u32 each      | material index, index count, vertex & index offsets |

use std::io::{self, Read, Write};

use crate::{
    error::{DecodeError, MeshError},
    MeshFile, Submesh, Vertex, VERTEX_COMPONENTS, VERTEX_STRIDE,
};

/// Size of the fixed-width fields preceding the vertex array.
pub const HEADER_SIZE: usize = 4 + 8 + 4;
/// Size of the zeroed padding between the index array and the submesh array.
pub const BOUNDS_PADDING_SIZE: usize = 4 * 4;
/// Size of one encoded [Submesh].
pub const SUBMESH_STRIDE: usize = 4 * 4;

impl MeshFile {
    /// Exact number of bytes [MeshFile::write_to] will produce.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE
            + self.vertices.len() * VERTEX_STRIDE
            + 4
            + self.indices.len() * 4
            + BOUNDS_PADDING_SIZE
            + self.submeshes.len() * SUBMESH_STRIDE
    }

    /// Serialize self.
    ///
    /// Fails only if a count exceeds `u32::MAX` or if `w` fails.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        let count = |what, len| {
            MeshError::narrow(what, len).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
        };

        w.write_all(&count("submesh", self.submeshes.len())?.to_le_bytes())?;
        // material id slot; unused by the runtime
        w.write_all(&0u64.to_le_bytes())?;

        w.write_all(&count("vertex", self.vertices.len())?.to_le_bytes())?;
        for vert in &self.vertices {
            for c in vert.components() {
                w.write_all(&c.to_le_bytes())?;
            }
        }

        w.write_all(&count("index", self.indices.len())?.to_le_bytes())?;
        for index in &self.indices {
            w.write_all(&index.to_le_bytes())?;
        }

        w.write_all(&[0u8; BOUNDS_PADDING_SIZE])?;

        for sm in &self.submeshes {
            w.write_all(&sm.material_index.to_le_bytes())?;
            w.write_all(&sm.index_count.to_le_bytes())?;
            w.write_all(&sm.vertex_offset.to_le_bytes())?;
            w.write_all(&sm.index_offset.to_le_bytes())?;
        }
        Ok(())
    }

    /// Serialize self into a new buffer.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut res = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut res)?;
        Ok(res)
    }

    /// Deserialize a [MeshFile], checking that every submesh only addresses data within the file.
    pub fn read_from<R: Read>(r: R) -> Result<Self, DecodeError> {
        let mut r = Reader(r);

        let submesh_count = r.u32("submesh count")? as usize;
        let _reserved = r.u64("reserved material id")?;

        let vertex_count = r.u32("vertex count")? as usize;
        let mut vertices = Vec::with_capacity(vertex_count.min(1 << 16));
        for _ in 0..vertex_count {
            let mut c = [0f32; VERTEX_COMPONENTS];
            for c in c.iter_mut() {
                *c = r.f32("vertex")?;
            }
            vertices.push(Vertex::from_components(c));
        }

        let index_count = r.u32("index count")? as usize;
        let mut indices = Vec::with_capacity(index_count.min(1 << 16));
        for _ in 0..index_count {
            indices.push(r.u32("index")?);
        }

        for _ in 0..4 {
            r.f32("bounds padding")?;
        }

        let mut submeshes = Vec::with_capacity(submesh_count.min(1 << 12));
        for _ in 0..submesh_count {
            submeshes.push(Submesh {
                material_index: r.u32("submesh")?,
                index_count: r.u32("submesh")?,
                vertex_offset: r.u32("submesh")?,
                index_offset: r.u32("submesh")?,
            });
        }

        let trailing = r.drain()?;
        if trailing > 0 {
            return Err(DecodeError::TrailingData(trailing));
        }

        let res = Self {
            submeshes,
            vertices,
            indices,
        };
        res.validate()?;
        Ok(res)
    }

    /// Deserialize a [MeshFile] from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::read_from(bytes)
    }

    /// Check that every submesh's index range and every resolved index lie within the buffers.
    pub fn validate(&self) -> Result<(), DecodeError> {
        for (i, sm) in self.submeshes.iter().enumerate() {
            let Some(indices) = self.submesh_indices(sm) else {
                let start = sm.index_offset as u64;
                return Err(DecodeError::SubmeshOutOfBounds {
                    submesh: i,
                    start,
                    end: start + sm.index_count as u64,
                    index_count: self.indices.len(),
                });
            };
            for &index in indices {
                let vertex = sm.vertex_offset as u64 + index as u64;
                if vertex >= self.vertices.len() as u64 {
                    return Err(DecodeError::IndexOutOfBounds {
                        submesh: i,
                        vertex,
                        vertex_count: self.vertices.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

struct Reader<R>(R);

impl<R: Read> Reader<R> {
    fn bytes<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        self.0.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::Truncated(what),
            _ => DecodeError::Io(e),
        })?;
        Ok(buf)
    }

    #[inline]
    fn u32(&mut self, what: &'static str) -> Result<u32, DecodeError> {
        self.bytes(what).map(u32::from_le_bytes)
    }

    #[inline]
    fn u64(&mut self, what: &'static str) -> Result<u64, DecodeError> {
        self.bytes(what).map(u64::from_le_bytes)
    }

    #[inline]
    fn f32(&mut self, what: &'static str) -> Result<f32, DecodeError> {
        self.bytes(what).map(f32::from_le_bytes)
    }

    /// Count the bytes left in the stream.
    fn drain(&mut self) -> Result<usize, DecodeError> {
        io::copy(&mut self.0, &mut io::sink())
            .map(|n| n as usize)
            .map_err(DecodeError::Io)
    }
}
