//! Seam-aware island unwrapping (§4.8 `smart_project_uvs`).
//!
//! Flood-fills faces into islands by normal continuity, flattens each by
//! its own average-normal tangent basis, then grid-packs them.

use std::collections::HashSet;

use glam::Vec2;
use glam::Vec3;

use crate::query;
use crate::topology::{FaceId, Topology};

fn flood_fill_islands(topo: &Topology, faces: &[FaceId], cos_threshold: f32) -> Vec<Vec<FaceId>> {
    let face_set: HashSet<FaceId> = faces
        .iter()
        .copied()
        .filter(|&f| (f as usize) < topo.faces.len() && topo.faces[f as usize].vertex_count > 0)
        .collect();
    let mut visited = HashSet::new();
    let mut islands = Vec::new();

    for &f in &face_set {
        if visited.contains(&f) {
            continue;
        }
        let mut island = Vec::new();
        let mut stack = vec![f];
        visited.insert(f);
        while let Some(cur) = stack.pop() {
            island.push(cur);
            let n_cur = query::face_normal(topo, cur);
            for n in query::face_neighbors(topo, cur) {
                if !face_set.contains(&n) || visited.contains(&n) {
                    continue;
                }
                if query::face_normal(topo, n).dot(n_cur) >= cos_threshold {
                    visited.insert(n);
                    stack.push(n);
                }
            }
        }
        islands.push(island);
    }
    islands
}

fn orthonormal_basis(n: Vec3) -> (Vec3, Vec3) {
    let helper = if n.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let u = n.cross(helper).normalize_or_zero();
    let v = n.cross(u).normalize_or_zero();
    (u, v)
}

fn pack_islands(topo: &mut Topology, islands: &[Vec<FaceId>], margin: f32) {
    let cols = (islands.len() as f32).sqrt().ceil().max(1.0) as usize;
    let cell = 1.0 / cols.max(1) as f32;

    for (idx, island) in islands.iter().enumerate() {
        if island.is_empty() {
            continue;
        }
        let avg_normal: Vec3 = island
            .iter()
            .map(|&f| query::face_normal(topo, f))
            .sum::<Vec3>()
            .normalize_or_zero();
        let (u, v) = orthonormal_basis(avg_normal);

        let mut island_verts = HashSet::new();
        for &f in island {
            for vtx in query::face_vertices(topo, f) {
                island_verts.insert(vtx);
            }
        }

        let mut raw: std::collections::HashMap<u32, Vec2> = std::collections::HashMap::new();
        for &vtx in &island_verts {
            let p = topo.vertices[vtx as usize].position;
            raw.insert(vtx, Vec2::new(p.dot(u), p.dot(v)));
        }
        let (mut min, mut max) = (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY));
        for uv in raw.values() {
            min = min.min(*uv);
            max = max.max(*uv);
        }
        let span = (max - min).max(Vec2::splat(1e-6));

        let row = idx / cols;
        let col = idx % cols;
        let origin = Vec2::new(col as f32 * cell, row as f32 * cell);
        let usable = cell * (1.0 - margin).max(0.0);

        for (vtx, uv) in raw {
            let normalized = (uv - min) / span;
            topo.vertices[vtx as usize].uv = origin + normalized * usable;
        }
    }
}

pub fn smart_project_uvs(topo: &mut Topology, faces: &[FaceId], angle_threshold_degrees: f32, island_margin: f32) {
    let cos_threshold = angle_threshold_degrees.to_radians().cos();
    let islands = flood_fill_islands(topo, faces, cos_threshold);
    pack_islands(topo, &islands, island_margin);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn smart_project_keeps_uvs_in_unit_square() {
        let mut t = fixtures::cube(1.0);
        smart_project_uvs(&mut t, &[0, 1, 2, 3, 4, 5], 45.0, 0.05);
        for v in &t.vertices {
            assert!(v.uv.x >= -1e-4 && v.uv.x <= 1.0001);
            assert!(v.uv.y >= -1e-4 && v.uv.y <= 1.0001);
        }
    }

    #[test]
    fn smart_project_separates_hard_seam_faces_into_own_islands() {
        // the cube fixture has no shared vertices between faces (hard
        // seams), so each face is its own connected component regardless
        // of normal threshold.
        let t = fixtures::cube(1.0);
        let islands = flood_fill_islands(&t, &[0, 1, 2, 3, 4, 5], 0.99);
        assert_eq!(islands.len(), 6);
    }
}
