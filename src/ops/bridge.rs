//! Bridge-edges operator (§4.5.3): connects two boundary edges with a strip
//! of quads, choosing whichever vertex pairing twists the strip least.
//!
//! Uses a `find_best_alignment` distance-sum pairing, generalized to
//! `segments > 1` via linear interpolation.

use crate::query;
use crate::topology::{HalfEdgeId, Topology, VertexId};

pub fn bridge_edges(topo: &mut Topology, quantum: f32, h1: HalfEdgeId, h2: HalfEdgeId, segments: u32) -> bool {
    if h1 == h2 {
        return false;
    }
    let segments = segments.max(1);

    let (a0, a1) = query::edge_vertices(topo, h1);
    let (b0, b1) = query::edge_vertices(topo, h2);
    if a0 == b0 || a0 == b1 || a1 == b0 || a1 == b1 {
        return false;
    }

    let pa0 = topo.vertices[a0 as usize].position;
    let pa1 = topo.vertices[a1 as usize].position;
    let pb0 = topo.vertices[b0 as usize].position;
    let pb1 = topo.vertices[b1 as usize].position;

    let identity_cost = (pa0 - pb0).length() + (pa1 - pb1).length();
    let swapped_cost = (pa0 - pb1).length() + (pa1 - pb0).length();

    // within epsilon, keep the identity pairing (a0-b0, a1-b1).
    let (pair_a, pair_b) = if swapped_cost + 1e-9 < identity_cost {
        ((a0, b1), (a1, b0))
    } else {
        ((a0, b0), (a1, b1))
    };

    let mut rail_a: Vec<VertexId> = vec![pair_a.0];
    let mut rail_b: Vec<VertexId> = vec![pair_a.1];
    for i in 1..segments {
        let t = i as f32 / segments as f32;
        rail_a.push(interpolate_vertex(topo, pair_a.0, pair_b.0, t));
        rail_b.push(interpolate_vertex(topo, pair_a.1, pair_b.1, t));
    }
    rail_a.push(pair_b.0);
    rail_b.push(pair_b.1);

    let mut new_faces = Vec::new();
    for i in 0..segments as usize {
        let curr_a = rail_a[i];
        let next_a = rail_a[i + 1];
        let curr_b = rail_b[i];
        let next_b = rail_b[i + 1];
        new_faces.push(topo.add_face(&[curr_a, next_a, next_b, curr_b]));
    }

    topo.link_twins_by_position(quantum);
    topo.rebuild_edge_map();
    crate::ops::normals::recompute_normals(topo);

    for f in new_faces {
        if f != crate::topology::NULL {
            topo.faces[f as usize].selected = true;
        }
    }
    true
}

fn interpolate_vertex(topo: &mut Topology, from: VertexId, to: VertexId, t: f32) -> VertexId {
    let a = topo.vertices[from as usize];
    let b = topo.vertices[to as usize];
    let mut attrs = a;
    attrs.position = a.position.lerp(b.position, t);
    attrs.uv = a.uv.lerp(b.uv, t);
    attrs.color = a.color.lerp(b.color, t);
    attrs.normal = a.normal.lerp(b.normal, t);
    topo.add_vertex(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{fixtures, Vertex};
    use glam::Vec3;

    fn two_separate_quads() -> Topology {
        let mut t = Topology::new();
        // quad 1 in XY plane at z=0
        t.add_vertex(Vertex::new(Vec3::new(0.0, 0.0, 0.0)));
        t.add_vertex(Vertex::new(Vec3::new(1.0, 0.0, 0.0)));
        t.add_vertex(Vertex::new(Vec3::new(1.0, 1.0, 0.0)));
        t.add_vertex(Vertex::new(Vec3::new(0.0, 1.0, 0.0)));
        t.add_face(&[0, 1, 2, 3]);
        // quad 2 offset along z
        t.add_vertex(Vertex::new(Vec3::new(0.0, 0.0, 2.0)));
        t.add_vertex(Vertex::new(Vec3::new(1.0, 0.0, 2.0)));
        t.add_vertex(Vertex::new(Vec3::new(1.0, 1.0, 2.0)));
        t.add_vertex(Vertex::new(Vec3::new(0.0, 1.0, 2.0)));
        t.add_face(&[4, 5, 6, 7]);
        t.link_twins_by_position(1e4);
        t.rebuild_edge_map();
        t
    }

    #[test]
    fn bridge_rejects_shared_vertex() {
        let mut t = fixtures::two_triangles();
        assert!(!bridge_edges(&mut t, 1e4, 0, 1, 1));
    }

    #[test]
    fn bridge_single_segment_adds_one_quad() {
        let mut t = two_separate_quads();
        let before = t.face_count();
        let he1 = t.edge_map[&(0, 1)];
        let he2 = t.edge_map[&(4, 5)];
        let ok = bridge_edges(&mut t, 1e4, he1, he2, 1);
        assert!(ok);
        assert_eq!(t.face_count(), before + 1);
    }

    #[test]
    fn bridge_multi_segment_adds_interior_vertices() {
        let mut t = two_separate_quads();
        let before_verts = t.vertices.len();
        let he1 = t.edge_map[&(0, 1)];
        let he2 = t.edge_map[&(4, 5)];
        bridge_edges(&mut t, 1e4, he1, he2, 3);
        assert_eq!(t.vertices.len(), before_verts + 4); // 2 new vertex pairs
    }
}
