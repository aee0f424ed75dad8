//! Ensure that deduplication reconstructs every face-vertex with as few vertices as possible.

mod common;

use common::{corner, triangle, ArbMesh, FRONT, SIDE, UP};
use quickcheck_macros::quickcheck;
use vtmesh::{
    dedup::dedup_mesh, error::MeshError, AttributeSource, FaceVertex, MeshData, Normal, Rgba,
    VertexDeduplicator,
};

fn same(a: &FaceVertex, b: &FaceVertex) -> bool {
    a.position == b.position && a.normal == b.normal && a.uv == b.uv
}

/// Distinct attribute combinations per position index, in order of first appearance.
fn combinations(mesh: &MeshData) -> Vec<Vec<FaceVertex>> {
    let mut res: Vec<Vec<FaceVertex>> = vec![Vec::new(); mesh.vertex_count];
    for fv in mesh.face_vertices() {
        let seen = &mut res[fv.position_index as usize];
        if !seen.iter().any(|s| same(s, &fv)) {
            seen.push(fv);
        }
    }
    res
}

#[test]
fn unique_corners() {
    let res = dedup_mesh(&triangle("tri", None)).unwrap();
    assert_eq!(res.vertices.len(), 3);
    assert_eq!(res.indices, [0, 1, 2]);
    assert_eq!(res.stats.split_vertices, 0);
    assert_eq!(res.stats.unique_vertices, 3);
}

#[test]
fn hard_edge_splits() {
    let mut mesh = MeshData::new("hard edge", 4);
    mesh.extend([
        corner(0, UP, [0.0, 0.0]),
        corner(1, UP, [1.0, 0.0]),
        corner(2, UP, [0.0, 1.0]),
        corner(0, SIDE, [0.0, 0.0]),
    ]);
    let res = dedup_mesh(&mesh).unwrap();
    assert_eq!(res.vertices.len(), 5);
    assert_eq!(res.indices, [0, 1, 2, 4]);
    assert_eq!(res.vertices[4].normal, Normal::from(SIDE));
    // the first occurrence keeps its canonical slot
    assert_eq!(res.vertices[0].normal, Normal::from(UP));
    assert_eq!(res.stats.split_vertices, 1);
    assert_eq!(res.stats.unreferenced_slots, 1);
}

#[test]
fn quad_with_crease() {
    // two triangles sharing the 0-2 edge, with a different normal on each side
    let mut mesh = MeshData::new("quad", 4);
    mesh.extend([
        corner(0, UP, [0.0, 0.0]),
        corner(1, UP, [1.0, 0.0]),
        corner(2, UP, [1.0, 1.0]),
        corner(0, FRONT, [0.0, 0.0]),
        corner(2, FRONT, [1.0, 1.0]),
        corner(3, FRONT, [0.0, 1.0]),
    ]);
    let res = dedup_mesh(&mesh).unwrap();
    assert_eq!(res.vertices.len(), 6);
    assert_eq!(res.indices, [0, 1, 2, 4, 5, 3]);
}

#[test]
fn split_copies_are_reused() {
    let mut mesh = MeshData::new("fan", 3);
    mesh.extend([
        corner(0, UP, [0.0, 0.0]),
        corner(1, UP, [1.0, 0.0]),
        corner(2, UP, [0.0, 1.0]),
        corner(0, SIDE, [0.0, 0.0]),
        corner(2, UP, [0.0, 1.0]),
        corner(1, UP, [1.0, 0.0]),
        corner(0, SIDE, [0.0, 0.0]),
        corner(1, UP, [1.0, 0.0]),
        corner(0, UP, [0.0, 0.0]),
    ]);
    let res = dedup_mesh(&mesh).unwrap();
    assert_eq!(res.vertices.len(), 4);
    assert_eq!(res.indices, [0, 1, 2, 3, 2, 1, 3, 1, 0]);
}

#[test]
fn uv_seam_splits() {
    let mut mesh = MeshData::new("seam", 3);
    mesh.extend([
        corner(0, UP, [0.0, 0.0]),
        corner(1, UP, [1.0, 0.0]),
        corner(2, UP, [0.0, 1.0]),
        corner(2, UP, [1.0, 1.0]),
        corner(1, UP, [1.0, 0.0]),
        corner(0, UP, [0.0, 0.0]),
    ]);
    let res = dedup_mesh(&mesh).unwrap();
    assert_eq!(res.indices, [0, 1, 2, 3, 1, 0]);
}

#[test]
fn colors_first_seen_wins() {
    let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
    let blue = Rgba::new(0.0, 0.0, 1.0, 1.0);
    let mut dedup = VertexDeduplicator::new(1);
    dedup.push(&corner(0, UP, [0.0, 0.0]).with_color(red)).unwrap();
    dedup.push(&corner(0, SIDE, [0.0, 0.0]).with_color(blue)).unwrap();
    dedup.push(&corner(0, UP, [0.0, 0.0])).unwrap();
    let res = dedup.finish();
    assert_eq!(res.vertices.len(), 2);
    assert_eq!(res.colors, [Some(red)]);
}

#[test]
fn colors_do_not_split() {
    let mut dedup = VertexDeduplicator::new(1);
    dedup
        .push(&corner(0, UP, [0.0, 0.0]).with_color(Rgba::new(1.0, 0.0, 0.0, 1.0)))
        .unwrap();
    let slot = dedup
        .push(&corner(0, UP, [0.0, 0.0]).with_color(Rgba::new(0.0, 1.0, 0.0, 1.0)))
        .unwrap();
    assert_eq!(slot, 0);
    assert_eq!(dedup.finish().vertices.len(), 1);
}

#[test]
fn degenerate_triangles_pass_through() {
    let mut mesh = MeshData::new("degenerate", 1);
    mesh.extend([corner(0, UP, [0.0, 0.0]); 3]);
    let res = dedup_mesh(&mesh).unwrap();
    assert_eq!(res.vertices.len(), 1);
    assert_eq!(res.indices, [0, 0, 0]);
}

#[test]
fn empty_stream() {
    let res = dedup_mesh(&MeshData::new("empty", 4)).unwrap();
    assert!(res.is_empty());
    assert!(res.indices.is_empty());
    assert_eq!(res.stats.unreferenced_slots, 4);
}

#[test]
fn position_index_out_of_range() {
    let mut mesh = triangle("tri", None);
    mesh.push(corner(3, UP, [0.0, 0.0]));
    assert!(matches!(
        dedup_mesh(&mesh),
        Err(MeshError::PositionIndexOutOfRange {
            index: 3,
            vertex_count: 3
        })
    ));
}

#[quickcheck]
fn reconstructs_every_corner(mesh: ArbMesh) -> bool {
    let ArbMesh(mesh) = mesh;
    let res = dedup_mesh(&mesh).unwrap();
    res.indices.len() == mesh.face_vertices.len()
        && mesh.face_vertices().zip(&res.indices).all(|(fv, &i)| {
            res.vertices[i as usize].same_attributes(&fv.position, &fv.normal, &fv.uv)
        })
}

#[quickcheck]
fn indices_in_bounds(mesh: ArbMesh) -> bool {
    let ArbMesh(mesh) = mesh;
    let res = dedup_mesh(&mesh).unwrap();
    res.indices.iter().all(|&i| (i as usize) < res.vertices.len())
}

#[quickcheck]
fn one_vertex_per_combination(mesh: ArbMesh) -> bool {
    let ArbMesh(mesh) = mesh;
    let res = dedup_mesh(&mesh).unwrap();
    let combos = combinations(&mesh);
    let splits: usize = combos.iter().map(|c| c.len().saturating_sub(1)).sum();
    res.vertices.len() == mesh.vertex_count + splits && res.stats.split_vertices == splits
}

#[quickcheck]
fn splits_partition_in_encounter_order(mesh: ArbMesh) -> bool {
    let ArbMesh(mesh) = mesh;
    let res = dedup_mesh(&mesh).unwrap();
    let combos = combinations(&mesh);
    let ok = mesh.face_vertices().zip(&res.indices).all(|(fv, &i)| {
        let pi = fv.position_index as usize;
        let nth = combos[pi].iter().position(|c| same(c, &fv)).unwrap();
        if nth == 0 {
            // the first combination at a position keeps the canonical slot
            i as usize == pi
        } else {
            // later ones live past the canonical region, each in its own slot
            i as usize >= mesh.vertex_count
                && mesh
                    .face_vertices()
                    .zip(&res.indices)
                    .filter(|(other, _)| other.position_index == fv.position_index)
                    .all(|(other, &j)| same(&other, &fv) == (i == j))
        }
    });
    ok
}
