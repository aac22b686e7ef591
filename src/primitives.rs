//! Primitive generators (§4.9): a minimal, representative set reduced from
//! original_source's `build*` family — enough to exercise every core
//! operator and give the crate a usable entry point.

use glam::Vec3;

use crate::topology::{Topology, Vertex, VertexId};

/// Unit-size-parametrized cube, 6 quad faces, hard-normal seams (24
/// vertices: 4 duplicated per face).
pub fn cube(size: f32) -> Topology {
    box_mesh(size, size, size)
}

/// Axis-aligned box with independent extents, hard-normal seams.
pub fn box_mesh(width: f32, height: f32, depth: f32) -> Topology {
    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
    let mut t = Topology::new();
    let corners = [
        Vec3::new(-hx, -hy, -hz),
        Vec3::new(hx, -hy, -hz),
        Vec3::new(hx, hy, -hz),
        Vec3::new(-hx, hy, -hz),
        Vec3::new(-hx, -hy, hz),
        Vec3::new(hx, -hy, hz),
        Vec3::new(hx, hy, hz),
        Vec3::new(-hx, hy, hz),
    ];
    let face_corner_indices: [[usize; 4]; 6] = [
        [4, 5, 6, 7], // +Z
        [1, 0, 3, 2], // -Z
        [7, 6, 2, 3], // +Y
        [0, 1, 5, 4], // -Y
        [5, 1, 2, 6], // +X
        [0, 4, 7, 3], // -X
    ];
    for face in face_corner_indices {
        let verts: Vec<VertexId> = face.iter().map(|&ci| t.add_vertex(Vertex::new(corners[ci]))).collect();
        t.add_face(&verts);
    }
    t.link_twins_by_position(1e4);
    t.rebuild_edge_map();
    crate::ops::normals::recompute_normals(&mut t);
    t
}

/// Quad side faces around the circumference (`segments` × `divisions`)
/// plus optional n-gon caps.
pub fn cylinder(radius: f32, height: f32, segments: u32, divisions: u32, caps: bool) -> Topology {
    let segments = segments.max(3);
    let divisions = divisions.max(1);
    let mut t = Topology::new();
    let half = height * 0.5;

    // ring[d][s] vertex index, d in 0..=divisions, s in 0..segments
    let mut rings: Vec<Vec<VertexId>> = Vec::with_capacity(divisions as usize + 1);
    for d in 0..=divisions {
        let y = -half + height * (d as f32 / divisions as f32);
        let mut ring = Vec::with_capacity(segments as usize);
        for s in 0..segments {
            let angle = 2.0 * std::f32::consts::PI * (s as f32 / segments as f32);
            let p = Vec3::new(radius * angle.cos(), y, radius * angle.sin());
            ring.push(t.add_vertex(Vertex::new(p)));
        }
        rings.push(ring);
    }

    for d in 0..divisions as usize {
        for s in 0..segments as usize {
            let s_next = (s + 1) % segments as usize;
            t.add_face(&[rings[d][s], rings[d][s_next], rings[d + 1][s_next], rings[d + 1][s]]);
        }
    }

    if caps {
        let bottom: Vec<VertexId> = rings[0].iter().rev().copied().collect();
        t.add_face(&bottom);
        let top: Vec<VertexId> = rings[divisions as usize].clone();
        t.add_face(&top);
    }

    t.link_twins_by_position(1e4);
    t.rebuild_edge_map();
    crate::ops::normals::recompute_normals(&mut t);
    t
}

/// Quad body faces with triangular fans at both poles.
pub fn uv_sphere(radius: f32, rings: u32, segments: u32) -> Topology {
    let rings = rings.max(2);
    let segments = segments.max(3);
    let mut t = Topology::new();

    let top_pole = t.add_vertex(Vertex::new(Vec3::new(0.0, radius, 0.0)));
    let bottom_pole = t.add_vertex(Vertex::new(Vec3::new(0.0, -radius, 0.0)));

    // interior rings: ring index 1..rings-1 (0 and rings are poles)
    let mut body: Vec<Vec<VertexId>> = Vec::with_capacity(rings as usize - 1);
    for r in 1..rings {
        let phi = std::f32::consts::PI * (r as f32 / rings as f32); // 0..pi
        let y = radius * phi.cos();
        let ring_radius = radius * phi.sin();
        let mut ring = Vec::with_capacity(segments as usize);
        for s in 0..segments {
            let theta = 2.0 * std::f32::consts::PI * (s as f32 / segments as f32);
            let p = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
            ring.push(t.add_vertex(Vertex::new(p)));
        }
        body.push(ring);
    }

    // top cap: triangles from top_pole to first body ring
    for s in 0..segments as usize {
        let s_next = (s + 1) % segments as usize;
        t.add_face(&[top_pole, body[0][s], body[0][s_next]]);
    }

    // body quads
    for r in 0..body.len() - 1 {
        for s in 0..segments as usize {
            let s_next = (s + 1) % segments as usize;
            t.add_face(&[body[r][s], body[r][s_next], body[r + 1][s_next], body[r + 1][s]]);
        }
    }

    // bottom cap
    let last = body.len() - 1;
    for s in 0..segments as usize {
        let s_next = (s + 1) % segments as usize;
        t.add_face(&[bottom_pole, body[last][s_next], body[last][s]]);
    }

    t.link_twins_by_position(1e4);
    t.rebuild_edge_map();
    crate::ops::normals::recompute_normals(&mut t);
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_quad_faces() {
        let t = cube(2.0);
        assert_eq!(t.face_count(), 6);
        for he in &t.half_edges {
            assert_ne!(he.twin, crate::topology::NULL);
        }
    }

    #[test]
    fn box_mesh_respects_independent_extents() {
        let t = box_mesh(1.0, 2.0, 3.0);
        let max_y = t.vertices.iter().map(|v| v.position.y).fold(f32::MIN, f32::max);
        assert!((max_y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn cylinder_is_fully_twinned_with_caps() {
        let t = cylinder(1.0, 2.0, 8, 2, true);
        assert_eq!(t.face_count() as u32, 8 * 2 + 2);
        for he in &t.half_edges {
            assert_ne!(he.twin, crate::topology::NULL);
        }
    }

    #[test]
    fn cylinder_without_caps_has_open_boundary() {
        let t = cylinder(1.0, 2.0, 6, 1, false);
        let open = t.half_edges.iter().filter(|he| he.twin == crate::topology::NULL).count();
        assert_eq!(open, 12); // top + bottom rings of 6 each
    }

    #[test]
    fn uv_sphere_is_fully_twinned() {
        let t = uv_sphere(1.0, 6, 8);
        for he in &t.half_edges {
            assert_ne!(he.twin, crate::topology::NULL);
        }
    }
}
