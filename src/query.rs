//! Read-only topology walks: around a face, around a vertex, and edge
//! loops/rings through quads.

use std::collections::HashSet;

use glam::Vec3;

use crate::topology::{FaceId, HalfEdgeId, Topology, VertexId, NULL};

/// Vertex indices of a face in CCW order, the i-th being the "from" vertex
/// of the i-th half-edge on the cycle.
pub fn face_vertices(topo: &Topology, face: FaceId) -> Vec<VertexId> {
    topo.face_vertex_cycle(face)
}

/// Half-edge indices forming a face's boundary, in cycle order.
pub fn face_half_edges(topo: &Topology, face: FaceId) -> Vec<HalfEdgeId> {
    let start = topo.faces[face as usize].first_half_edge;
    let mut result = Vec::new();
    let mut current = start;
    loop {
        result.push(current);
        current = topo.half_edges[current as usize].next;
        if current == start {
            break;
        }
    }
    result
}

/// Neighboring face indices across each non-boundary edge of `face`.
pub fn face_neighbors(topo: &Topology, face: FaceId) -> Vec<FaceId> {
    face_half_edges(topo, face)
        .into_iter()
        .filter_map(|he| {
            let twin = topo.half_edges[he as usize].twin;
            if twin == NULL {
                None
            } else {
                Some(topo.half_edges[twin as usize].face)
            }
        })
        .collect()
}

/// All outgoing half-edges from `vertex`, rotating via `twin -> next`
/// forward and `prev -> twin` backward; stops at true boundaries.
pub fn vertex_half_edges(topo: &Topology, vertex: VertexId) -> Vec<HalfEdgeId> {
    let start = topo.vertices[vertex as usize].outgoing_half_edge;
    if start == NULL {
        return Vec::new();
    }

    let mut result = vec![start];
    let mut current = start;
    loop {
        let twin = topo.half_edges[current as usize].twin;
        if twin == NULL {
            break;
        }
        let next = topo.half_edges[twin as usize].next;
        if next == start {
            return result; // closed fan
        }
        result.push(next);
        current = next;
    }

    // open fan: also walk the other way from `start`.
    let mut current = start;
    loop {
        let prev = topo.half_edges[current as usize].prev;
        let twin = topo.half_edges[prev as usize].twin;
        if twin == NULL {
            break;
        }
        result.push(twin);
        current = twin;
    }
    result
}

pub fn vertex_faces(topo: &Topology, vertex: VertexId) -> Vec<FaceId> {
    let mut seen = HashSet::new();
    vertex_half_edges(topo, vertex)
        .into_iter()
        .filter_map(|he| {
            let face = topo.half_edges[he as usize].face;
            if face != NULL && seen.insert(face) {
                Some(face)
            } else {
                None
            }
        })
        .collect()
}

/// Canonical edge half-edge indices touching `vertex` (the lower index of
/// each twin pair).
pub fn vertex_edges(topo: &Topology, vertex: VertexId) -> Vec<HalfEdgeId> {
    let mut seen = HashSet::new();
    vertex_half_edges(topo, vertex)
        .into_iter()
        .filter_map(|he| {
            let twin = topo.half_edges[he as usize].twin;
            let canon = if twin != NULL && twin < he { twin } else { he };
            if seen.insert(canon) {
                Some(canon)
            } else {
                None
            }
        })
        .collect()
}

pub fn vertex_neighbors(topo: &Topology, vertex: VertexId) -> Vec<VertexId> {
    let mut seen = HashSet::new();
    vertex_half_edges(topo, vertex)
        .into_iter()
        .filter_map(|he| {
            let to = topo.half_edges[he as usize].to_vertex;
            if seen.insert(to) {
                Some(to)
            } else {
                None
            }
        })
        .collect()
}

/// `(from, to)` vertex pair of a half-edge.
pub fn edge_vertices(topo: &Topology, he: HalfEdgeId) -> (VertexId, VertexId) {
    let prev = topo.half_edges[he as usize].prev;
    (
        topo.half_edges[prev as usize].to_vertex,
        topo.half_edges[he as usize].to_vertex,
    )
}

/// Unit cross of the first two edges; falls back to `(0,1,0)` if degenerate.
pub fn face_normal(topo: &Topology, face: FaceId) -> Vec3 {
    let verts = face_vertices(topo, face);
    if verts.len() < 3 {
        return Vec3::Y;
    }
    let p0 = topo.vertices[verts[0] as usize].position;
    let p1 = topo.vertices[verts[1] as usize].position;
    let p2 = topo.vertices[verts[2] as usize].position;
    let n = (p1 - p0).cross(p2 - p0);
    if n.length_squared() < 1e-12 {
        Vec3::Y
    } else {
        n.normalize()
    }
}

pub fn face_center(topo: &Topology, face: FaceId) -> Vec3 {
    let verts = face_vertices(topo, face);
    if verts.is_empty() {
        return Vec3::ZERO;
    }
    let sum: Vec3 = verts
        .iter()
        .map(|&v| topo.vertices[v as usize].position)
        .sum();
    sum / verts.len() as f32
}

/// Fan-triangulated area about vertex 0.
pub fn face_area(topo: &Topology, face: FaceId) -> f32 {
    let verts = face_vertices(topo, face);
    if verts.len() < 3 {
        return 0.0;
    }
    let p0 = topo.vertices[verts[0] as usize].position;
    let mut area = 0.0;
    for i in 1..verts.len() - 1 {
        let p1 = topo.vertices[verts[i] as usize].position;
        let p2 = topo.vertices[verts[i + 1] as usize].position;
        area += (p1 - p0).cross(p2 - p0).length() * 0.5;
    }
    area
}

/// Defined only when the owning face is a quad: the half-edge two steps
/// forward (`next.next`). Returns `NULL` for any non-quad.
pub fn next_loop_edge(topo: &Topology, he: HalfEdgeId) -> HalfEdgeId {
    let face = topo.half_edges[he as usize].face;
    if face == NULL || topo.faces[face as usize].vertex_count != 4 {
        return NULL;
    }
    let n1 = topo.half_edges[he as usize].next;
    topo.half_edges[n1 as usize].next
}

fn canonical(topo: &Topology, he: HalfEdgeId) -> HalfEdgeId {
    let twin = topo.half_edges[he as usize].twin;
    if twin != NULL && twin < he {
        twin
    } else {
        he
    }
}

fn walk_parallel_quads(
    topo: &Topology,
    start: HalfEdgeId,
    step: impl Fn(&Topology, HalfEdgeId) -> HalfEdgeId,
) -> Vec<HalfEdgeId> {
    let mut visited = HashSet::new();
    let mut result = Vec::new();

    let mut push = |he: HalfEdgeId, result: &mut Vec<HalfEdgeId>| -> bool {
        let c = canonical(topo, he);
        if !visited.insert(c) {
            return false;
        }
        result.push(c);
        true
    };

    if !push(start, &mut result) {
        return result;
    }

    let mut current = start;
    loop {
        let face = topo.half_edges[current as usize].face;
        if face == NULL || topo.faces[face as usize].vertex_count != 4 {
            break;
        }
        let stepped = step(topo, current);
        if stepped == NULL {
            break;
        }
        let twin = topo.half_edges[stepped as usize].twin;
        if twin == NULL {
            break;
        }
        current = twin;
        if !push(current, &mut result) {
            break;
        }
    }

    let start_twin = topo.half_edges[start as usize].twin;
    if start_twin != NULL && push(start_twin, &mut result) {
        let mut current = start_twin;
        loop {
            let face = topo.half_edges[current as usize].face;
            if face == NULL || topo.faces[face as usize].vertex_count != 4 {
                break;
            }
            let stepped = step(topo, current);
            if stepped == NULL {
                break;
            }
            let twin = topo.half_edges[stepped as usize].twin;
            if twin == NULL {
                break;
            }
            current = twin;
            if !push(current, &mut result) {
                break;
            }
        }
    }

    result
}

/// Walk perpendicular to `h` through quads, recording one canonical
/// half-edge per visited undirected edge.
pub fn edge_loop(topo: &Topology, h: HalfEdgeId) -> Vec<HalfEdgeId> {
    walk_parallel_quads(topo, h, next_loop_edge)
}

/// Walk parallel to `h` through quads (`next` instead of `next.next`).
pub fn edge_ring(topo: &Topology, h: HalfEdgeId) -> Vec<HalfEdgeId> {
    walk_parallel_quads(topo, h, |topo, he| topo.half_edges[he as usize].next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn face_vertices_two_triangles() {
        let t = fixtures::two_triangles();
        assert_eq!(face_vertices(&t, 0).len(), 3);
        assert_eq!(face_vertices(&t, 1).len(), 3);
    }

    #[test]
    fn vertex_faces_shared_edge() {
        let t = fixtures::two_triangles();
        // vertex 1 and 2 are on the shared edge, touched by both faces.
        assert_eq!(vertex_faces(&t, 1).len(), 2);
        assert_eq!(vertex_faces(&t, 2).len(), 2);
        assert_eq!(vertex_faces(&t, 0).len(), 1);
    }

    #[test]
    fn cube_vertex_valence() {
        let t = fixtures::cube(1.0);
        // hard-normal seams: each position-duplicate vertex only touches
        // the single quad it was created for.
        for v in 0..t.vertices.len() as VertexId {
            assert_eq!(vertex_faces(&t, v).len(), 1);
        }
    }

    #[test]
    fn next_loop_edge_only_on_quads() {
        let t = fixtures::triangle();
        assert_eq!(next_loop_edge(&t, 0), NULL);
    }

    #[test]
    fn edge_loop_around_cube_quad() {
        let t = fixtures::cube(1.0);
        let he = t.faces[0].first_half_edge;
        let loop_edges = edge_loop(&t, he);
        assert!(!loop_edges.is_empty());
    }
}
