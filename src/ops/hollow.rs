//! Hollow operator (§4.5.8): gives a shell thickness by duplicating every
//! face as an inward-offset, reverse-wound twin and stitching the open
//! boundary with rim quads.
//!
//! Reuses the accumulated-per-position-normal pattern from `normals.rs`.

use std::collections::HashMap;

use glam::Vec3;

use crate::query;
use crate::topology::{position_key, FaceId, Topology, VertexId, NULL};

pub fn hollow(topo: &mut Topology, quantum: f32, thickness: f32) {
    if thickness <= 0.0 {
        return;
    }

    let mut accum: HashMap<u64, Vec3> = HashMap::new();
    for f in 0..topo.faces.len() as FaceId {
        if topo.faces[f as usize].vertex_count == 0 {
            continue;
        }
        let n = query::face_normal(topo, f);
        for v in query::face_vertices(topo, f) {
            let key = position_key(topo.vertices[v as usize].position, quantum);
            *accum.entry(key).or_insert(Vec3::ZERO) += n;
        }
    }
    let position_normal: HashMap<u64, Vec3> = accum
        .into_iter()
        .map(|(k, n)| (k, n.normalize_or_zero()))
        .collect();

    let all_faces: Vec<Vec<VertexId>> = (0..topo.faces.len() as FaceId)
        .map(|f| {
            if topo.faces[f as usize].vertex_count == 0 {
                Vec::new()
            } else {
                query::face_vertices(topo, f)
            }
        })
        .collect();

    let boundary_edges: Vec<(VertexId, VertexId)> = topo
        .half_edges
        .iter()
        .enumerate()
        .filter(|(_, he)| he.twin == NULL)
        .map(|(i, _)| query::edge_vertices(topo, i as u32))
        .collect();

    let original_vertex_count = topo.vertices.len() as VertexId;
    let mut inner: HashMap<VertexId, VertexId> = HashMap::new();
    for v in 0..original_vertex_count {
        let src = topo.vertices[v as usize];
        let key = position_key(src.position, quantum);
        let n = position_normal.get(&key).copied().unwrap_or(Vec3::ZERO);
        let mut attrs = src;
        attrs.position = src.position - thickness * n;
        attrs.normal = -src.normal;
        let id = topo.add_vertex(attrs);
        inner.insert(v, id);
    }

    for v in &mut topo.vertices {
        v.outgoing_half_edge = NULL;
    }
    topo.faces.clear();
    topo.half_edges.clear();
    topo.selected_edges.clear();

    for verts in &all_faces {
        if verts.is_empty() {
            continue;
        }
        topo.add_face(verts);
        let mut reversed: Vec<VertexId> = verts.iter().map(|v| inner[v]).collect();
        reversed.reverse();
        topo.add_face(&reversed);
    }

    for (v0, v1) in boundary_edges {
        topo.add_face(&[v0, inner[&v0], inner[&v1], v1]);
    }

    topo.link_twins_by_position(quantum);
    topo.rebuild_edge_map();
    crate::ops::normals::recompute_normals(topo);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn hollow_cube_doubles_faces_plus_rim() {
        let mut t = fixtures::cube(1.0);
        let before_verts = t.vertices.len();
        hollow(&mut t, 1e4, 0.1);
        assert_eq!(t.face_count(), 12); // outer + inner, closed cube has no boundary
        assert_eq!(t.vertices.len(), before_verts * 2);
    }

    #[test]
    fn hollow_non_positive_thickness_is_noop() {
        let mut t = fixtures::cube(1.0);
        let before = t.face_count();
        hollow(&mut t, 1e4, 0.0);
        assert_eq!(t.face_count(), before);
    }

    #[test]
    fn hollow_open_mesh_adds_rim_quads() {
        let mut t = fixtures::two_triangles();
        hollow(&mut t, 1e4, 0.1);
        // 2 outer + 2 inner + rim quads for the 4 boundary edges of the
        // open quad formed by the two triangles.
        assert_eq!(t.face_count(), 2 + 2 + 4);
    }
}
