//! Delete faces (§4.5.4), merge vertices (§4.5.5), and merge triangles to
//! quads (§4.5.6) — three operators sharing a tombstone-then-rebuild shape.
//!
//! Uses a rebuild-from-survivors shape for delete, position-averaging for
//! merge, and pair-then-rebuild bookkeeping for triangle-to-quad merging.

use std::collections::HashSet;

use glam::{Vec2, Vec3, Vec4};

use crate::query;
use crate::selection;
use crate::topology::{position_key, FaceId, HalfEdgeId, Topology, VertexId, NULL};

pub fn delete_faces(topo: &mut Topology, quantum: f32, faces: &[FaceId]) {
    for &f in faces {
        if (f as usize) < topo.faces.len() {
            topo.faces[f as usize].vertex_count = 0;
        }
    }
    topo.rebuild_from_faces(quantum);
    selection::clear_selection(topo);
}

pub fn merge_vertices(topo: &mut Topology, quantum: f32, vertices: &[VertexId]) {
    if vertices.len() < 2 {
        return;
    }
    let kept = vertices[0];
    let others: HashSet<VertexId> = vertices[1..].iter().copied().collect();

    let n = vertices.len() as f32;
    let mut pos = Vec3::ZERO;
    let mut norm = Vec3::ZERO;
    let mut uv = Vec2::ZERO;
    let mut color = Vec4::ZERO;
    for &v in vertices {
        let vert = topo.vertices[v as usize];
        pos += vert.position;
        norm += vert.normal;
        uv += vert.uv;
        color += vert.color;
    }
    topo.vertices[kept as usize].position = pos / n;
    topo.vertices[kept as usize].normal = (norm / n).normalize_or_zero();
    topo.vertices[kept as usize].uv = uv / n;
    topo.vertices[kept as usize].color = color / n;

    for he in &mut topo.half_edges {
        if others.contains(&he.to_vertex) {
            he.to_vertex = kept;
        }
    }

    let mut degenerate = Vec::new();
    for f in 0..topo.faces.len() as FaceId {
        if topo.faces[f as usize].vertex_count == 0 {
            continue;
        }
        let verts = query::face_vertices(topo, f);
        let unique: HashSet<VertexId> = verts.iter().copied().collect();
        if unique.len() < 3 {
            degenerate.push(f);
        }
    }
    delete_faces(topo, quantum, &degenerate);
    topo.rebuild_edge_map();
}

pub fn merge_triangles_to_quads(topo: &mut Topology, quantum: f32, normal_threshold: f32) {
    let mut merged = vec![false; topo.faces.len()];
    let mut pairs: Vec<(FaceId, FaceId, HalfEdgeId)> = Vec::new();

    for f in 0..topo.faces.len() as FaceId {
        if topo.faces[f as usize].vertex_count != 3 || merged[f as usize] {
            continue;
        }
        for he in query::face_half_edges(topo, f) {
            let twin = topo.half_edges[he as usize].twin;
            if twin == NULL {
                continue;
            }
            let tf = topo.half_edges[twin as usize].face;
            if tf == NULL || tf <= f {
                continue;
            }
            if merged[tf as usize] || topo.faces[tf as usize].vertex_count != 3 {
                continue;
            }
            let na = query::face_normal(topo, f);
            let nb = query::face_normal(topo, tf);
            if na.dot(nb) > normal_threshold {
                pairs.push((f, tf, he));
                merged[f as usize] = true;
                merged[tf as usize] = true;
                break;
            }
        }
    }

    let mut new_quads: Vec<[VertexId; 4]> = Vec::new();
    for (fa, fb, he) in &pairs {
        let verts_a = query::face_vertices(topo, *fa);
        let (s0, s1) = query::edge_vertices(topo, *he);
        let tip_a = *verts_a.iter().find(|&&v| v != s0 && v != s1).unwrap();

        let key0 = position_key(topo.vertices[s0 as usize].position, quantum);
        let key1 = position_key(topo.vertices[s1 as usize].position, quantum);
        let verts_b = query::face_vertices(topo, *fb);
        let tip_b = *verts_b
            .iter()
            .find(|&&v| {
                let pk = position_key(topo.vertices[v as usize].position, quantum);
                pk != key0 && pk != key1
            })
            .unwrap();

        new_quads.push([tip_a, s0, tip_b, s1]);
    }

    for f in 0..topo.faces.len() as FaceId {
        if merged[f as usize] {
            topo.faces[f as usize].vertex_count = 0;
        }
    }
    for quad in new_quads {
        topo.add_face(&quad);
    }

    topo.rebuild_from_faces(quantum);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn delete_faces_drops_tombstones() {
        let mut t = fixtures::cube(1.0);
        delete_faces(&mut t, 1e4, &[0]);
        assert_eq!(t.face_count(), 5);
    }

    #[test]
    fn merge_vertices_averages_position() {
        let mut t = fixtures::two_triangles();
        // vertices 1 and 3 are both at x=1
        merge_vertices(&mut t, 1e4, &[1, 3]);
        let expected = (Vec3::new(1.0, 1.0, 0.0) + Vec3::new(1.0, 0.0, 0.0)) / 2.0;
        assert!((t.vertices[1].position - expected).length() < 1e-5);
    }

    #[test]
    fn merge_triangles_to_quads_joins_coplanar_pair() {
        // two triangles sharing edge (1,2), coplanar in XY -> should merge
        let mut t = fixtures::two_triangles();
        merge_triangles_to_quads(&mut t, 1e4, 0.85);
        assert_eq!(t.face_count(), 1);
        assert_eq!(query::face_vertices(&t, 0).len(), 4);
    }
}
