use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use vtmesh::{error::DecodeError, ExportSettings, MeshFile};

mod cli;
mod scene;

use cli::{Cli, Command};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("couldn't read scene: {0}")]
    Scene(#[from] scene::SceneError),
    #[error(transparent)]
    Export(#[from] vtmesh::Error),
    #[error("couldn't open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("couldn't decode {path:?}: {source}")]
    Decode { path: PathBuf, source: DecodeError },
}

fn main() -> ExitCode {
    let args = Cli::parse();
    cli::initialize_tracing(&args.log_filter, args.log_format);

    let res = match args.command {
        Command::Export { input, output } => export(&input, output),
        Command::Inspect { file, verbose } => inspect(&file, verbose),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                tracing::error!("caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn export(input: &Path, output: PathBuf) -> Result<(), AppError> {
    let settings = ExportSettings::new(output);
    // fail on a bad destination before spending time reading the input
    settings.validate().map_err(vtmesh::Error::from)?;

    let nodes = scene::load_scene(input)?;
    let summary = vtmesh::export(&nodes, &settings)?;
    println!(
        "wrote {:?}: {} submeshes, {} vertices, {} indices, {} materials, {} bytes",
        summary.path,
        summary.submeshes,
        summary.vertices,
        summary.indices,
        summary.materials,
        summary.bytes
    );
    Ok(())
}

fn inspect(path: &Path, verbose: bool) -> Result<(), AppError> {
    let file = File::open(path).map_err(|source| AppError::Open {
        path: path.to_owned(),
        source,
    })?;
    let mesh = MeshFile::read_from(BufReader::new(file)).map_err(|source| AppError::Decode {
        path: path.to_owned(),
        source,
    })?;

    println!("{path:?}");
    println!("  vertices: {}", mesh.vertices.len());
    println!("  indices:  {}", mesh.indices.len());
    println!("  submeshes: {}", mesh.submeshes.len());
    for (i, sm) in mesh.submeshes.iter().enumerate() {
        println!(
            "    [{i}] material {} | {} indices from {} | vertex offset {}",
            sm.material_index, sm.index_count, sm.index_offset, sm.vertex_offset
        );
    }

    if verbose {
        for (i, v) in mesh.vertices.iter().enumerate() {
            println!(
                "  v{i}: pos {:?} normal {:?} uv {:?}",
                v.position.coords.as_slice(),
                v.normal.as_slice(),
                v.uv.coords.as_slice()
            );
        }
        for (i, tri) in mesh.indices.chunks(3).enumerate() {
            println!("  t{i}: {tri:?}");
        }
    }
    Ok(())
}
