//! The export pipeline: validate settings, assemble the scene, and write the file.

use std::{
    ffi::OsStr,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{assemble, error::ConfigError, Error, MeshFile, Scene, SceneSource};

/// Extension required of every output file.
pub const FILE_EXTENSION: &str = "vtmesh";

/// Where and how to write an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSettings {
    pub out_file: PathBuf,
}

impl ExportSettings {
    pub fn new(out_file: impl Into<PathBuf>) -> Self {
        Self {
            out_file: out_file.into(),
        }
    }

    /// Directory the output file will be written to.
    pub fn out_dir(&self) -> &Path {
        self.out_file.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Check that the output path is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.out_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingOutputPath);
        }
        if self.out_file.extension() != Some(OsStr::new(FILE_EXTENSION)) {
            return Err(ConfigError::InvalidExtension(self.out_file.clone()));
        }
        Ok(())
    }
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub submeshes: usize,
    pub vertices: usize,
    pub indices: usize,
    pub materials: usize,
    pub bytes: usize,
}

/// Export every node of `source` to the file named by `settings`.
///
/// Nothing is written unless the whole scene assembles successfully. The file is written to a
/// temporary sibling and renamed into place, so a failed write never leaves a truncated file at
/// the destination.
#[tracing::instrument(skip_all, fields(out_file = ?settings.out_file))]
pub fn export<S: SceneSource + ?Sized>(
    source: &S,
    settings: &ExportSettings,
) -> Result<ExportSummary, Error> {
    let start = std::time::Instant::now();
    settings.validate()?;

    let scene = assemble(source)?;
    let summary = write_scene(&scene, settings)?;

    tracing::info!(
        path = ?summary.path,
        submeshes = summary.submeshes,
        vertices = summary.vertices,
        indices = summary.indices,
        bytes = summary.bytes,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "exported scene"
    );
    Ok(summary)
}

/// Write an already-assembled scene, creating missing directories.
pub fn write_scene(scene: &Scene, settings: &ExportSettings) -> Result<ExportSummary, Error> {
    settings.validate()?;

    let dir = settings.out_dir();
    if !dir.as_os_str().is_empty() && !dir.exists() {
        tracing::debug!(dir = ?dir, "creating output directory");
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }

    let bytes = write_atomic(&scene.file, &settings.out_file)?;
    Ok(ExportSummary {
        path: settings.out_file.clone(),
        submeshes: scene.file.submeshes.len(),
        vertices: scene.file.vertices.len(),
        indices: scene.file.indices.len(),
        materials: scene.materials.len(),
        bytes,
    })
}

/// Path of the temporary file used while writing `path`: `.<name>.<pid>.tmp` in the same directory.
///
/// The file is created exclusively; if something already exists at this path the export fails and
/// leaves it alone.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| OsStr::new(FILE_EXTENSION)));
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

fn write_atomic(file: &MeshFile, path: &Path) -> Result<usize, Error> {
    let tmp = temp_path(path);
    let out = File::options()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .map_err(|e| Error::io(&tmp, e))?;
    match write_file(file, out) {
        Ok(bytes) => {
            fs::rename(&tmp, path).map_err(|e| {
                remove_temp(&tmp);
                Error::io(path, e)
            })?;
            Ok(bytes)
        }
        Err(e) => {
            remove_temp(&tmp);
            Err(Error::io(&tmp, e))
        }
    }
}

fn write_file(file: &MeshFile, out: File) -> std::io::Result<usize> {
    let mut w = BufWriter::new(out);
    file.write_to(&mut w)?;
    w.flush()?;
    w.get_ref().sync_all()?;
    Ok(file.encoded_len())
}

fn remove_temp(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = ?tmp, "couldn't remove temporary file: {e}");
        }
    }
}
