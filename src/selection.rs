//! Per-element selection: vertex bits and face bits live directly on
//! `Vertex`/`Face`; the edge selection is the half-edge set on `Topology`
//! (an edge counts as selected when either of its two half-edges is in the
//! set — operators insert/remove both together).

use std::collections::HashSet;

use crate::query;
use crate::topology::{FaceId, HalfEdgeId, Topology, VertexId, NULL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Vertex,
    Edge,
    Face,
}

pub fn clear_selection(topo: &mut Topology) {
    for v in &mut topo.vertices {
        v.selected = false;
    }
    for f in &mut topo.faces {
        f.selected = false;
    }
    topo.selected_edges.clear();
}

fn edge_pair(topo: &Topology, he: HalfEdgeId) -> (HalfEdgeId, Option<HalfEdgeId>) {
    let twin = topo.half_edges[he as usize].twin;
    (he, if twin == NULL { None } else { Some(twin) })
}

pub fn select_vertex(topo: &mut Topology, v: VertexId, additive: bool) {
    if !additive {
        clear_selection(topo);
    }
    topo.vertices[v as usize].selected = true;
}

pub fn select_face(topo: &mut Topology, f: FaceId, additive: bool) {
    if !additive {
        clear_selection(topo);
    }
    topo.faces[f as usize].selected = true;
}

pub fn select_edge(topo: &mut Topology, he: HalfEdgeId, additive: bool) {
    if !additive {
        clear_selection(topo);
    }
    let (a, b) = edge_pair(topo, he);
    topo.selected_edges.insert(a);
    if let Some(b) = b {
        topo.selected_edges.insert(b);
    }
}

pub fn toggle_vertex(topo: &mut Topology, v: VertexId) {
    topo.vertices[v as usize].selected = !topo.vertices[v as usize].selected;
}

pub fn toggle_face(topo: &mut Topology, f: FaceId) {
    topo.faces[f as usize].selected = !topo.faces[f as usize].selected;
}

pub fn toggle_edge(topo: &mut Topology, he: HalfEdgeId) {
    let (a, b) = edge_pair(topo, he);
    if topo.selected_edges.contains(&a) {
        topo.selected_edges.remove(&a);
        if let Some(b) = b {
            topo.selected_edges.remove(&b);
        }
    } else {
        topo.selected_edges.insert(a);
        if let Some(b) = b {
            topo.selected_edges.insert(b);
        }
    }
}

pub fn invert_selection(topo: &mut Topology, mode: SelectionMode) {
    match mode {
        SelectionMode::Vertex => {
            for v in &mut topo.vertices {
                v.selected = !v.selected;
            }
        }
        SelectionMode::Face => {
            for f in &mut topo.faces {
                f.selected = !f.selected;
            }
        }
        SelectionMode::Edge => {
            let canon_selected: HashSet<HalfEdgeId> = selected_edges(topo).into_iter().collect();
            let mut new_set = HashSet::new();
            for he in 0..topo.half_edges.len() as HalfEdgeId {
                let twin = topo.half_edges[he as usize].twin;
                let canon = if twin != NULL && twin < he { twin } else { he };
                if he != canon {
                    continue; // only inspect each undirected edge once
                }
                if !canon_selected.contains(&canon) {
                    new_set.insert(canon);
                    if twin != NULL {
                        new_set.insert(twin);
                    }
                }
            }
            topo.selected_edges = new_set;
        }
    }
}

pub fn select_edge_loop(topo: &mut Topology, h: HalfEdgeId) {
    for he in query::edge_loop(topo, h) {
        let (a, b) = edge_pair(topo, he);
        topo.selected_edges.insert(a);
        if let Some(b) = b {
            topo.selected_edges.insert(b);
        }
    }
}

pub fn select_edge_ring(topo: &mut Topology, h: HalfEdgeId) {
    for he in query::edge_ring(topo, h) {
        let (a, b) = edge_pair(topo, he);
        topo.selected_edges.insert(a);
        if let Some(b) = b {
            topo.selected_edges.insert(b);
        }
    }
}

pub fn selected_vertices(topo: &Topology) -> Vec<VertexId> {
    (0..topo.vertices.len() as VertexId)
        .filter(|&v| topo.vertices[v as usize].selected)
        .collect()
}

pub fn selected_faces(topo: &Topology) -> Vec<FaceId> {
    (0..topo.faces.len() as FaceId)
        .filter(|&f| topo.faces[f as usize].selected)
        .collect()
}

/// Canonical (lower-index) half-edge per selected undirected edge.
pub fn selected_edges(topo: &Topology) -> Vec<HalfEdgeId> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for &he in &topo.selected_edges {
        let twin = topo.half_edges[he as usize].twin;
        let canon = if twin != NULL && twin < he { twin } else { he };
        if seen.insert(canon) {
            result.push(canon);
        }
    }
    result.sort_unstable();
    result
}

/// Union of selected vertices, endpoints of selected edges, and vertices of
/// selected faces. Drives the transform operators' moving set.
pub fn affected_vertices(topo: &Topology) -> HashSet<VertexId> {
    let mut set: HashSet<VertexId> = selected_vertices(topo).into_iter().collect();
    for he in selected_edges(topo) {
        let (from, to) = query::edge_vertices(topo, he);
        set.insert(from);
        set.insert(to);
    }
    for f in selected_faces(topo) {
        for v in query::face_vertices(topo, f) {
            set.insert(v);
        }
    }
    set
}

/// Grow the face selection by one ring of face-adjacency.
pub fn grow_face_selection(topo: &mut Topology) {
    let current = selected_faces(topo);
    let mut additions = Vec::new();
    for f in &current {
        for n in query::face_neighbors(topo, *f) {
            if !topo.faces[n as usize].selected {
                additions.push(n);
            }
        }
    }
    for f in additions {
        topo.faces[f as usize].selected = true;
    }
}

/// Shrink the face selection by removing any selected face touching an
/// unselected neighbor.
pub fn shrink_face_selection(topo: &mut Topology) {
    let current = selected_faces(topo);
    let mut removals = Vec::new();
    for f in &current {
        for n in query::face_neighbors(topo, *f) {
            if !topo.faces[n as usize].selected {
                removals.push(*f);
                break;
            }
        }
    }
    for f in removals {
        topo.faces[f as usize].selected = false;
    }
}

/// Flood-fill the face selection across all faces connected to the current
/// selection by shared edges.
pub fn select_linked_faces(topo: &mut Topology) {
    let mut stack = selected_faces(topo);
    let mut visited: HashSet<FaceId> = stack.iter().copied().collect();
    while let Some(f) = stack.pop() {
        for n in query::face_neighbors(topo, f) {
            if visited.insert(n) {
                topo.faces[n as usize].selected = true;
                stack.push(n);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn clear_selection_is_idempotent() {
        let mut t = fixtures::cube(1.0);
        select_face(&mut t, 0, false);
        select_face(&mut t, 1, true);
        clear_selection(&mut t);
        clear_selection(&mut t);
        assert!(selected_faces(&t).is_empty());
        assert!(selected_vertices(&t).is_empty());
        assert!(t.selected_edges.is_empty());
    }

    #[test]
    fn select_edge_inserts_both_halves() {
        let mut t = fixtures::two_triangles();
        let he = t.edge_map[&(1, 2)];
        select_edge(&mut t, he, false);
        let twin = t.half_edges[he as usize].twin;
        assert!(t.selected_edges.contains(&he));
        assert!(t.selected_edges.contains(&twin));
        assert_eq!(selected_edges(&t).len(), 1);
    }

    #[test]
    fn affected_vertices_includes_face_verts() {
        let mut t = fixtures::cube(1.0);
        select_face(&mut t, 0, false);
        let verts = affected_vertices(&t);
        assert_eq!(verts.len(), 4);
    }

    #[test]
    fn select_linked_faces_floods_closed_mesh() {
        let mut t = fixtures::cube(1.0);
        select_face(&mut t, 0, false);
        select_linked_faces(&mut t);
        assert_eq!(selected_faces(&t).len(), 6);
    }
}
