//! Ray-based picking: vertex (closest point along ray), edge (closest
//! point on the finite segment), face (fan-triangulated Möller–Trumbore).

use std::collections::HashSet;

use glam::Vec3;

use crate::query;
use crate::selection::SelectionMode;
use crate::topology::{FaceId, HalfEdgeId, Topology, VertexId, NULL};

const FACE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub distance: f32,
    pub position: Vec3,
    pub vertex: VertexId,
    pub edge: HalfEdgeId,
    pub face: FaceId,
}

impl RayHit {
    fn none() -> Self {
        Self {
            distance: f32::INFINITY,
            position: Vec3::ZERO,
            vertex: NULL,
            edge: NULL,
            face: NULL,
        }
    }
}

pub fn raycast_vertex(topo: &Topology, origin: Vec3, dir: Vec3, threshold: f32) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;
    for (i, v) in topo.vertices.iter().enumerate() {
        let t = (v.position - origin).dot(dir);
        if t < 0.0 {
            continue;
        }
        let closest = origin + dir * t;
        let dist = (v.position - closest).length();
        if dist < threshold && best.as_ref().map(|b| t < b.distance).unwrap_or(true) {
            best = Some(RayHit {
                distance: t,
                position: v.position,
                vertex: i as VertexId,
                edge: NULL,
                face: NULL,
            });
        }
    }
    best
}

fn closest_points_ray_segment(
    origin: Vec3,
    dir: Vec3,
    a: Vec3,
    b: Vec3,
) -> Option<(f32, f32, f32)> {
    let seg = b - a;
    let seg_len = seg.length();
    if seg_len < 1e-8 {
        return None;
    }
    let seg_dir = seg / seg_len;
    let r = a - origin;
    let d_dot_d = dir.dot(dir);
    let d_dot_s = dir.dot(seg_dir);
    let s_dot_s = seg_dir.dot(seg_dir);
    let denom = d_dot_d * s_dot_s - d_dot_s * d_dot_s;

    let (t, s) = if denom.abs() < 1e-8 {
        (r.dot(dir), 0.0)
    } else {
        let d_dot_r = dir.dot(r);
        let s_dot_r = seg_dir.dot(r);
        let t = (d_dot_r * s_dot_s - s_dot_r * d_dot_s) / denom;
        let s = (d_dot_r * d_dot_s - s_dot_r * d_dot_d) / denom;
        (t, s)
    };

    let p_ray = origin + dir * t;
    let p_seg = a + seg_dir * s.clamp(0.0, seg_len);
    let dist = (p_ray - p_seg).length();
    Some((t, s, dist))
}

pub fn raycast_edge(topo: &Topology, origin: Vec3, dir: Vec3, threshold: f32) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;
    let mut seen = HashSet::new();
    for (i, he) in topo.half_edges.iter().enumerate() {
        let twin = he.twin;
        let canon = if twin != NULL && twin < i as HalfEdgeId {
            twin
        } else {
            i as HalfEdgeId
        };
        if !seen.insert(canon) {
            continue;
        }
        let (from, to) = query::edge_vertices(topo, canon);
        let a = topo.vertices[from as usize].position;
        let b = topo.vertices[to as usize].position;
        let seg_len = (b - a).length();
        let Some((t, s, dist)) = closest_points_ray_segment(origin, dir, a, b) else {
            continue;
        };
        if t >= 0.0 && s >= 0.0 && s <= seg_len && dist < threshold {
            if best.as_ref().map(|bh| t < bh.distance).unwrap_or(true) {
                best = Some(RayHit {
                    distance: t,
                    position: origin + dir * t,
                    vertex: NULL,
                    edge: canon,
                    face: NULL,
                });
            }
        }
    }
    best
}

/// Möller–Trumbore intersection of a ray against one triangle.
fn ray_triangle(origin: Vec3, dir: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < FACE_EPSILON {
        return None;
    }
    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = f * dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = f * edge2.dot(q);
    if t > FACE_EPSILON {
        Some(t)
    } else {
        None
    }
}

pub fn raycast_face(
    topo: &Topology,
    origin: Vec3,
    dir: Vec3,
    skip_faces: &HashSet<FaceId>,
) -> Option<RayHit> {
    let mut best = RayHit::none();
    let mut hit = false;
    for f in 0..topo.faces.len() as FaceId {
        if topo.faces[f as usize].vertex_count == 0 || skip_faces.contains(&f) {
            continue;
        }
        let verts = query::face_vertices(topo, f);
        if verts.len() < 3 {
            continue;
        }
        let p0 = topo.vertices[verts[0] as usize].position;
        for i in 1..verts.len() - 1 {
            let p1 = topo.vertices[verts[i] as usize].position;
            let p2 = topo.vertices[verts[i + 1] as usize].position;
            if let Some(t) = ray_triangle(origin, dir, p0, p1, p2) {
                if !hit || t < best.distance {
                    best = RayHit {
                        distance: t,
                        position: origin + dir * t,
                        vertex: NULL,
                        edge: NULL,
                        face: f,
                    };
                    hit = true;
                }
            }
        }
    }
    hit.then_some(best)
}

/// Dispatch to the vertex/edge/face raycast matching the active selection
/// mode.
pub fn raycast(
    topo: &Topology,
    origin: Vec3,
    dir: Vec3,
    mode: SelectionMode,
    threshold: f32,
    skip_faces: &HashSet<FaceId>,
) -> Option<RayHit> {
    match mode {
        SelectionMode::Vertex => raycast_vertex(topo, origin, dir, threshold),
        SelectionMode::Edge => raycast_edge(topo, origin, dir, threshold),
        SelectionMode::Face => raycast_face(topo, origin, dir, skip_faces),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn raycast_face_hits_cube_front() {
        let t = fixtures::cube(1.0);
        let hit = raycast_face(&t, Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), &HashSet::new());
        assert!(hit.is_some());
        assert!((hit.unwrap().distance - 4.5).abs() < 1e-4);
    }

    #[test]
    fn raycast_face_skip_set_excludes() {
        let t = fixtures::cube(1.0);
        let mut skip = HashSet::new();
        skip.insert(0u32);
        let hit = raycast_face(&t, Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), &skip);
        assert!(hit.is_none() || hit.unwrap().face != 0);
    }

    #[test]
    fn raycast_vertex_finds_closest() {
        let t = fixtures::triangle();
        let hit = raycast_vertex(&t, Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.2);
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().vertex, 0);
    }
}
