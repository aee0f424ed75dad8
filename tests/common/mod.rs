//! Mesh builders shared by the integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use quickcheck::{Arbitrary, Gen};
use vtmesh::{FaceVertex, MeshData, Normal, Position, SceneNode, Texcoord};

pub const UP: [f32; 3] = [0.0, 1.0, 0.0];
pub const SIDE: [f32; 3] = [1.0, 0.0, 0.0];
pub const FRONT: [f32; 3] = [0.0, 0.0, 1.0];

const NORMALS: [[f32; 3]; 3] = [UP, SIDE, FRONT];
const UVS: [[f32; 2]; 2] = [[0.0, 0.0], [1.0, 0.5]];

/// A face-vertex whose position is derived from its position index.
pub fn corner(position_index: u32, normal: [f32; 3], uv: [f32; 2]) -> FaceVertex {
    FaceVertex::new(
        position_index,
        Position::new(position_index as f32, 0.0, 1.0),
        Normal::from(normal),
        Texcoord::from(uv),
    )
}

/// A single triangle over position indices 0, 1, 2.
pub fn triangle(name: &str, material: Option<&str>) -> MeshData {
    let mut mesh = MeshData::new(name, 3);
    mesh.material = material.map(str::to_owned);
    mesh.extend([
        corner(0, UP, [0.0, 0.0]),
        corner(1, UP, [1.0, 0.0]),
        corner(2, UP, [0.0, 1.0]),
    ]);
    mesh
}

pub fn node(name: &str, mesh: MeshData) -> SceneNode<MeshData> {
    SceneNode::new(name).with_mesh(mesh)
}

/// A fresh, empty directory for a single test.
pub fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vtmesh-{}-{test}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// A random triangle mesh over a handful of original vertices, drawing normals and uvs from small
/// palettes so that positions frequently carry more than one combination.
#[derive(Debug, Clone)]
pub struct ArbMesh(pub MeshData);

impl Arbitrary for ArbMesh {
    fn arbitrary(g: &mut Gen) -> Self {
        let vertex_count = u32::from(u8::arbitrary(g) % 8) + 1;
        let triangles = usize::from(u8::arbitrary(g) % 12);
        let mut mesh = MeshData::new("arbitrary", vertex_count as usize);
        if bool::arbitrary(g) {
            mesh.material = Some(format!("M{}", u8::arbitrary(g) % 3));
        }
        for _ in 0..triangles * 3 {
            let pi = u32::from(u8::arbitrary(g)) % vertex_count;
            let normal = *g.choose(&NORMALS).unwrap();
            let uv = *g.choose(&UVS).unwrap();
            mesh.push(corner(pi, normal, uv));
        }
        ArbMesh(mesh)
    }
}
