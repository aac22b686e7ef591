//! Normal recomputation and the flip-normals operator (§4.5.10).
//!
//! `recompute_normals` accumulates each face's raw (unnormalized) cross
//! product into its vertices, then normalizes once at the end.

use glam::Vec3;

use crate::query;
use crate::topology::{FaceId, Topology, NULL};

pub fn recompute_normals(topo: &mut Topology) {
    for v in &mut topo.vertices {
        v.normal = Vec3::ZERO;
    }
    for f in 0..topo.faces.len() as FaceId {
        if topo.faces[f as usize].vertex_count == 0 {
            continue;
        }
        let verts = query::face_vertices(topo, f);
        if verts.len() < 3 {
            continue;
        }
        let p0 = topo.vertices[verts[0] as usize].position;
        let p1 = topo.vertices[verts[1] as usize].position;
        let p2 = topo.vertices[verts[2] as usize].position;
        let n = (p1 - p0).cross(p2 - p0);
        for &v in &verts {
            topo.vertices[v as usize].normal += n;
        }
    }
    for v in &mut topo.vertices {
        v.normal = v.normal.normalize_or_zero();
    }
}

fn reverse_face_winding(topo: &mut Topology, face: FaceId) {
    let verts = query::face_vertices(topo, face);
    let mut reversed = verts;
    reversed.reverse();
    // Replace this single face's half-edges in place: tombstone + append is
    // simplest and keeps the rest of the mesh untouched until the caller's
    // rebuild pass.
    topo.faces[face as usize].vertex_count = 0;
    topo.add_face(&reversed);
}

/// Reverse the winding of one or more selected faces.
///
/// With a single selected face, its winding is simply reversed. With
/// multiple, compute the average face-normal direction, count how many
/// align vs. oppose it, and flip whichever side is the minority so the
/// whole group ends up facing the direction opposite the majority.
pub fn flip_selected_normals(topo: &mut Topology, quantum: f32, selected: &[FaceId]) {
    if selected.is_empty() {
        return;
    }
    if selected.len() == 1 {
        reverse_face_winding(topo, selected[0]);
        topo.rebuild_from_faces(quantum);
        recompute_normals(topo);
        return;
    }

    let normals: Vec<(FaceId, Vec3)> = selected
        .iter()
        .map(|&f| (f, query::face_normal(topo, f)))
        .collect();
    let avg: Vec3 = normals.iter().map(|(_, n)| *n).sum::<Vec3>().normalize_or_zero();

    let mut aligned = 0;
    let mut opposed = 0;
    for (_, n) in &normals {
        if n.dot(avg) >= 0.0 {
            aligned += 1;
        } else {
            opposed += 1;
        }
    }
    let majority_aligned = aligned >= opposed;
    let target_dir = if majority_aligned { -avg } else { avg };

    let to_flip: Vec<FaceId> = normals
        .iter()
        .filter(|(_, n)| n.dot(target_dir) < 0.0)
        .map(|(f, _)| *f)
        .collect();

    for f in to_flip {
        if topo.faces[f as usize].vertex_count != 0 {
            reverse_face_winding(topo, f);
        }
    }
    topo.rebuild_from_faces(quantum);
    recompute_normals(topo);

    for f in 0..topo.faces.len() as FaceId {
        topo.faces[f as usize].selected = false;
    }
    // faces kept their relative index order through rebuild_from_faces, so
    // the original indices still name the same faces.
    for &f in selected {
        if (f as usize) < topo.faces.len() {
            topo.faces[f as usize].selected = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use crate::topology::fixtures;

    #[test]
    fn recompute_normals_idempotent() {
        let mut t = fixtures::cube(1.0);
        recompute_normals(&mut t);
        let first: Vec<Vec3> = t.vertices.iter().map(|v| v.normal).collect();
        recompute_normals(&mut t);
        let second: Vec<Vec3> = t.vertices.iter().map(|v| v.normal).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn flip_single_face_reverses_normal() {
        let mut t = fixtures::triangle();
        let before = query::face_normal(&t, 0);
        flip_selected_normals(&mut t, 1e4, &[0]);
        let after = query::face_normal(&t, 0);
        assert!(before.dot(after) < 0.0);
    }

    #[test]
    fn flip_does_not_lose_twin_null() {
        let t = fixtures::triangle();
        assert_eq!(t.half_edges[0].twin, NULL);
    }
}
