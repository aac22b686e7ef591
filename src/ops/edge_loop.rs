//! Insert edge loop (§4.5.7): walks a ring of quads and threads `count`
//! parallel cut lines through it, splitting every quad it passes through.
//!
//! Generalized from a single midpoint cut to `count` evenly-spaced cuts,
//! using position-keyed edge identity so the walk tolerates hard-normal
//! seam duplicates.

use std::collections::{HashMap, HashSet};

use crate::query;
use crate::topology::{position_key, FaceId, HalfEdgeId, Topology, VertexId, NULL};

fn canonical_edge(topo: &Topology, he: HalfEdgeId) -> HalfEdgeId {
    let twin = topo.half_edges[he as usize].twin;
    if twin != NULL && twin < he {
        twin
    } else {
        he
    }
}

/// One quad the loop passes through: the edge it enters by and the
/// opposite edge (`next_loop_edge`) it exits by.
struct TraversedQuad {
    face: FaceId,
    entry: HalfEdgeId,
    exit: HalfEdgeId,
}

fn walk_quads(topo: &Topology, start: HalfEdgeId) -> Vec<TraversedQuad> {
    let mut visited: HashSet<FaceId> = HashSet::new();
    let mut forward = Vec::new();

    let mut entry = start;
    loop {
        let face = topo.half_edges[entry as usize].face;
        if face == NULL || topo.faces[face as usize].vertex_count != 4 || !visited.insert(face) {
            break;
        }
        let exit = query::next_loop_edge(topo, entry);
        if exit == NULL {
            break;
        }
        forward.push(TraversedQuad { face, entry, exit });
        let twin = topo.half_edges[exit as usize].twin;
        if twin == NULL {
            break;
        }
        entry = twin;
    }

    let mut backward = Vec::new();
    let start_twin = topo.half_edges[start as usize].twin;
    if start_twin != NULL {
        let mut entry = start_twin;
        loop {
            let face = topo.half_edges[entry as usize].face;
            if face == NULL || topo.faces[face as usize].vertex_count != 4 || !visited.insert(face) {
                break;
            }
            let exit = query::next_loop_edge(topo, entry);
            if exit == NULL {
                break;
            }
            backward.push(TraversedQuad { face, entry, exit });
            let twin = topo.half_edges[exit as usize].twin;
            if twin == NULL {
                break;
            }
            entry = twin;
        }
    }
    backward.reverse();
    backward.extend(forward);
    backward
}

fn interpolate_chain(topo: &mut Topology, from: VertexId, to: VertexId, count: u32) -> Vec<VertexId> {
    let a = topo.vertices[from as usize];
    let b = topo.vertices[to as usize];
    (1..=count)
        .map(|i| {
            let t = i as f32 / (count + 1) as f32;
            let mut attrs = a;
            attrs.position = a.position.lerp(b.position, t);
            attrs.normal = a.normal.lerp(b.normal, t);
            attrs.uv = a.uv.lerp(b.uv, t);
            attrs.color = a.color.lerp(b.color, t);
            topo.add_vertex(attrs)
        })
        .collect()
}

/// Ordered list of `count` interior vertices running from `want_from` to
/// `want_to`, reusing the stored chain (keyed by canonical edge) reversed
/// if it was built in the opposite direction.
fn ordered_chain(
    topo: &Topology,
    quantum: f32,
    chains: &HashMap<HalfEdgeId, (Vec<VertexId>, VertexId, VertexId)>,
    canonical: HalfEdgeId,
    want_from: VertexId,
) -> Vec<VertexId> {
    let (chain, stored_from, _stored_to) = &chains[&canonical];
    let want_key = position_key(topo.vertices[want_from as usize].position, quantum);
    let stored_key = position_key(topo.vertices[*stored_from as usize].position, quantum);
    if want_key == stored_key {
        chain.clone()
    } else {
        let mut rev = chain.clone();
        rev.reverse();
        rev
    }
}

pub fn insert_edge_loop(topo: &mut Topology, quantum: f32, h: HalfEdgeId, count: u32) {
    let face = topo.half_edges[h as usize].face;
    if face == NULL || topo.faces[face as usize].vertex_count != 4 || count == 0 {
        return;
    }

    let quads = walk_quads(topo, h);
    if quads.is_empty() {
        return;
    }

    let mut edges: HashSet<HalfEdgeId> = HashSet::new();
    for q in &quads {
        edges.insert(canonical_edge(topo, q.entry));
        edges.insert(canonical_edge(topo, q.exit));
    }

    let mut chains: HashMap<HalfEdgeId, (Vec<VertexId>, VertexId, VertexId)> = HashMap::new();
    for &canon in &edges {
        let (from, to) = query::edge_vertices(topo, canon);
        let chain = interpolate_chain(topo, from, to, count);
        chains.insert(canon, (chain, from, to));
    }

    let mut new_quads: Vec<[VertexId; 4]> = Vec::new();
    for q in &quads {
        let verts = query::face_vertices(topo, q.face);
        let hes = query::face_half_edges(topo, q.face);
        let entry_pos = hes.iter().position(|&he| he == q.entry).unwrap();
        let rot = |i: usize| verts[(entry_pos + i) % verts.len()];
        let v0 = rot(0);
        let v1 = rot(1);
        let v2 = rot(2);
        let v3 = rot(3);

        let entry_canon = canonical_edge(topo, q.entry);
        let exit_canon = canonical_edge(topo, q.exit);
        let entry_chain = ordered_chain(topo, quantum, &chains, entry_canon, v0);
        let exit_chain = ordered_chain(topo, quantum, &chains, exit_canon, v3);

        let mut entry_full = vec![v0];
        entry_full.extend(entry_chain);
        entry_full.push(v1);
        let mut exit_full = vec![v3];
        exit_full.extend(exit_chain);
        exit_full.push(v2);

        for k in 0..entry_full.len() - 1 {
            new_quads.push([entry_full[k], entry_full[k + 1], exit_full[k + 1], exit_full[k]]);
        }
    }

    for q in &quads {
        topo.faces[q.face as usize].vertex_count = 0;
    }
    for quad in new_quads {
        topo.add_face(&quad);
    }

    topo.rebuild_from_faces(quantum);
    crate::ops::normals::recompute_normals(topo);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn insert_single_loop_doubles_a_quad() {
        let mut t = fixtures::cube(1.0);
        let he = t.faces[0].first_half_edge;
        let before_faces = t.face_count();
        insert_edge_loop(&mut t, 1e4, he, 1);
        assert!(t.face_count() > before_faces);
        for he in &t.half_edges {
            assert_ne!(he.twin, NULL);
        }
    }

    #[test]
    fn insert_two_loops_creates_two_new_vertex_rows() {
        let mut t = fixtures::cube(1.0);
        let he = t.faces[0].first_half_edge;
        let before_verts = t.vertices.len();
        insert_edge_loop(&mut t, 1e4, he, 2);
        assert!(t.vertices.len() > before_verts);
    }

    #[test]
    fn insert_loop_on_non_quad_is_noop() {
        let mut t = fixtures::triangle();
        let before = t.face_count();
        insert_edge_loop(&mut t, 1e4, 0, 1);
        assert_eq!(t.face_count(), before);
    }
}
