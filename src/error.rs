use std::path::PathBuf;

/// Errors which abort an export.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("scene is empty; no file will be exported")]
    EmptyScene,
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error("scene source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("i/o error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an error produced by a [SceneSource](crate::SceneSource).
    pub fn from_source(
        err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::Source(err.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors related to [ExportSettings](crate::ExportSettings).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no output path specified")]
    MissingOutputPath,
    #[error("output file must have the `.vtmesh` extension: {0:?}")]
    InvalidExtension(PathBuf),
}

/// Errors related to mesh processing.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("position index out of range: (0..{vertex_count}) ∌ {index}")]
    PositionIndexOutOfRange { index: u32, vertex_count: usize },
    #[error("{what} count {count} does not fit in a u32")]
    TooLarge { what: &'static str, count: usize },
}

impl MeshError {
    /// Convert a buffer length to the width used in the file format.
    pub(crate) fn narrow(what: &'static str, count: usize) -> Result<u32, Self> {
        u32::try_from(count).map_err(|_| Self::TooLarge { what, count })
    }
}

/// Errors related to reading `.vtmesh` data.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of data while reading {0}")]
    Truncated(&'static str),
    #[error(transparent)]
    Io(std::io::Error),
    #[error("submesh {submesh} references vertex {vertex} of {vertex_count}")]
    IndexOutOfBounds {
        submesh: usize,
        vertex: u64,
        vertex_count: usize,
    },
    #[error("submesh {submesh} indices {start}..{end} exceed the {index_count} stored")]
    SubmeshOutOfBounds {
        submesh: usize,
        start: u64,
        end: u64,
        index_count: usize,
    },
    #[error("{0} trailing bytes after the last submesh")]
    TrailingData(usize),
}
