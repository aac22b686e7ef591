//! Extrude operator (§4.5.1): offsets a face selection along its averaged
//! normal, building side walls and — in floating mode, where the
//! selection has no neighbor faces at all — a duplicated bottom cap.
//!
//! Uses an area-weighted average normal, boundary-edge detection via an
//! edge multiset, and a per-vertex duplicate map, generalized from
//! always-connected triangle extrusion to the n-gon connected/floating
//! split required here.

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use crate::ops::normals::recompute_normals;
use crate::query;
use crate::topology::{edge_key, FaceId, Topology, VertexId, NULL};

pub fn extrude_faces(topo: &mut Topology, quantum: f32, faces: &[FaceId], distance: f32) {
    if faces.is_empty() {
        return;
    }
    let face_set: HashSet<FaceId> = faces.iter().copied().collect();

    let mut vertex_set: HashSet<VertexId> = HashSet::new();
    let mut dir_accum: HashMap<VertexId, Vec3> = HashMap::new();
    for &f in faces {
        let n = query::face_normal(topo, f);
        for v in query::face_vertices(topo, f) {
            vertex_set.insert(v);
            *dir_accum.entry(v).or_insert(Vec3::ZERO) += n;
        }
    }
    let dir: HashMap<VertexId, Vec3> = dir_accum
        .into_iter()
        .map(|(v, n)| (v, n.normalize_or_zero()))
        .collect();

    let mut edge_count: HashMap<(u32, u32), u32> = HashMap::new();
    let mut edge_oriented: HashMap<(u32, u32), (VertexId, VertexId)> = HashMap::new();
    for &f in faces {
        let verts = query::face_vertices(topo, f);
        let n = verts.len();
        for i in 0..n {
            let v0 = verts[i];
            let v1 = verts[(i + 1) % n];
            let key = edge_key(v0, v1);
            *edge_count.entry(key).or_insert(0) += 1;
            edge_oriented.entry(key).or_insert((v0, v1));
        }
    }
    let boundary_edges: Vec<(VertexId, VertexId)> = edge_count
        .iter()
        .filter(|&(_, &c)| c == 1)
        .map(|(k, _)| edge_oriented[k])
        .collect();

    let mut connected = false;
    for &f in faces {
        for he in query::face_half_edges(topo, f) {
            let twin = topo.half_edges[he as usize].twin;
            if twin != NULL {
                let tf = topo.half_edges[twin as usize].face;
                if !face_set.contains(&tf) {
                    connected = true;
                }
            }
        }
    }

    let all_faces: Vec<(Vec<VertexId>, bool)> = (0..topo.faces.len() as FaceId)
        .map(|f| {
            if topo.faces[f as usize].vertex_count == 0 {
                (Vec::new(), false)
            } else {
                (query::face_vertices(topo, f), topo.faces[f as usize].selected)
            }
        })
        .collect();

    let mut bottom_v: HashMap<VertexId, VertexId> = HashMap::new();
    let mut top_v: HashMap<VertexId, VertexId> = HashMap::new();
    for &v in &vertex_set {
        let attrs = topo.vertices[v as usize];
        let d = dir.get(&v).copied().unwrap_or(Vec3::ZERO);
        let bottom = topo.add_vertex(attrs);
        bottom_v.insert(v, bottom);
        if connected {
            let mut top_attrs = attrs;
            top_attrs.position += d * distance;
            let top = topo.add_vertex(top_attrs);
            top_v.insert(v, top);
        } else {
            topo.vertices[v as usize].position += d * distance;
            top_v.insert(v, v);
        }
    }

    for v in &mut topo.vertices {
        v.outgoing_half_edge = NULL;
    }
    topo.faces.clear();
    topo.half_edges.clear();
    topo.selected_edges.clear();

    for (i, (verts, selected)) in all_faces.iter().enumerate() {
        if verts.is_empty() {
            continue;
        }
        let fi = i as FaceId;
        let new_verts: Vec<VertexId> = if face_set.contains(&fi) {
            verts.iter().map(|v| top_v[v]).collect()
        } else {
            verts
                .iter()
                .map(|v| {
                    if vertex_set.contains(v) && connected {
                        bottom_v[v]
                    } else {
                        *v
                    }
                })
                .collect()
        };
        let new_fi = topo.add_face(&new_verts);
        if new_fi != NULL {
            topo.faces[new_fi as usize].selected = face_set.contains(&fi) || *selected;
        }
    }

    for (v0, v1) in boundary_edges {
        topo.add_face(&[bottom_v[&v0], bottom_v[&v1], top_v[&v1], top_v[&v0]]);
    }

    if !connected {
        for &f in faces {
            let verts = &all_faces[f as usize].0;
            let mut reversed: Vec<VertexId> = verts.iter().map(|v| bottom_v[v]).collect();
            reversed.reverse();
            topo.add_face(&reversed);
        }
    }

    topo.link_twins_by_position(quantum);
    topo.rebuild_edge_map();
    recompute_normals(topo);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection;
    use crate::topology::fixtures;

    #[test]
    fn cube_extrude_top_face_connected() {
        let mut t = fixtures::cube(1.0);
        selection::select_face(&mut t, 2, false); // +Y per fixture order
        let before_verts = t.vertices.len();
        extrude_faces(&mut t, 1e4, &[2], 1.0);

        assert_eq!(t.face_count(), 10);
        assert_eq!(t.vertices.len(), before_verts + 8);

        // top face was at y=0.5 (half-size of a unit cube), extrude distance
        // 1.0 along the averaged +Y face normal puts it at 1.5.
        let centroid = query::face_center(&t, 2);
        assert!((centroid.y - 1.5).abs() < 1e-4);

        for he in &t.half_edges {
            assert_ne!(he.twin, NULL);
        }
    }
}
