//! Planar/box/cylindrical/per-face/uniform-square UV projection.
//!
//! Dominant-axis box projection and per-face packing, generalized to the
//! axis-hint and PCA-fallback variants named here.

use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::ops::transform::expanded_affected_vertices;
use crate::query;
use crate::topology::{FaceId, Topology, VertexId};
use crate::uv::Axis;

/// U coordinate new vertices are parked at when they belong to a face
/// outside the cylindrical projection's own selection (e.g. end caps) — far
/// enough past the unwrap's `[0,1]` band that they can't be mistaken for
/// part of it.
const CAP_PARK_U: f32 = 1.5;

/// Dominant-axis-per-face projection: each face picks whichever axis its
/// normal aligns with best and is planar-projected against it.
pub fn box_project_uvs(topo: &mut Topology, faces: &[FaceId], scale: f32) {
    for &f in faces {
        if (f as usize) >= topo.faces.len() || topo.faces[f as usize].vertex_count == 0 {
            continue;
        }
        let normal = query::face_normal(topo, f);
        let axis = Axis::from_normal(normal);
        project_face_planar(topo, f, axis, scale);
    }
}

fn project_face_planar(topo: &mut Topology, face: FaceId, axis: Axis, scale: f32) {
    let (ia, ib) = axis.other_two();
    for v in query::face_vertices(topo, face) {
        let p = topo.vertices[v as usize].position.to_array();
        topo.vertices[v as usize].uv = Vec2::new(p[ia] * scale, p[ib] * scale);
    }
}

pub fn planar_project_uvs(topo: &mut Topology, faces: &[FaceId], axis: Axis, scale: f32) {
    for &f in faces {
        if (f as usize) >= topo.faces.len() || topo.faces[f as usize].vertex_count == 0 {
            continue;
        }
        project_face_planar(topo, f, axis, scale);
    }
}

/// Groups faces by normal similarity into islands, planar-projects each
/// island against its own average normal, then packs islands into disjoint
/// grid cells.
pub fn planar_project_by_normal(
    topo: &mut Topology,
    faces: &[FaceId],
    normal_tolerance: f32,
    island_margin: f32,
) {
    let islands = group_by_normal(topo, faces, normal_tolerance);
    pack_islands(topo, &islands, island_margin);
}

fn group_by_normal(topo: &Topology, faces: &[FaceId], tolerance: f32) -> Vec<Vec<FaceId>> {
    let mut remaining: Vec<FaceId> = faces.to_vec();
    let mut islands = Vec::new();
    while let Some(seed) = remaining.pop() {
        let seed_normal = query::face_normal(topo, seed);
        let mut island = vec![seed];
        let mut i = 0;
        while i < remaining.len() {
            let n = query::face_normal(topo, remaining[i]);
            if n.dot(seed_normal) >= 1.0 - tolerance {
                island.push(remaining.remove(i));
            } else {
                i += 1;
            }
        }
        islands.push(island);
    }
    islands
}

/// Assign each island an independent planar projection, then translate and
/// scale it into its own non-overlapping square cell in `[0,1]^2`.
fn pack_islands(topo: &mut Topology, islands: &[Vec<FaceId>], margin: f32) {
    let cols = (islands.len() as f32).sqrt().ceil().max(1.0) as usize;
    let cell = 1.0 / cols.max(1) as f32;

    for (idx, island) in islands.iter().enumerate() {
        if island.is_empty() {
            continue;
        }
        let avg_normal: glam::Vec3 = island
            .iter()
            .map(|&f| query::face_normal(topo, f))
            .sum::<glam::Vec3>()
            .normalize_or_zero();
        let axis = Axis::from_normal(avg_normal);
        let (ia, ib) = axis.other_two();

        let mut uvs: HashMap<u32, Vec2> = HashMap::new();
        for &f in island {
            for v in query::face_vertices(topo, f) {
                let p = topo.vertices[v as usize].position.to_array();
                uvs.insert(v, Vec2::new(p[ia], p[ib]));
            }
        }
        let (mut min, mut max) = (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY));
        for uv in uvs.values() {
            min = min.min(*uv);
            max = max.max(*uv);
        }
        let span = (max - min).max(Vec2::splat(1e-6));

        let row = idx / cols;
        let col = idx % cols;
        let origin = Vec2::new(col as f32 * cell, row as f32 * cell);
        let usable = cell * (1.0 - margin).max(0.0);

        for (v, uv) in uvs {
            let normalized = (uv - min) / span;
            topo.vertices[v as usize].uv = origin + normalized * usable;
        }
    }
}

/// `axis_hint` is used directly unless `use_pca` asks for the best-fit axis
/// via the same power-iteration `make_coplanar` uses.
///
/// A plain per-vertex `atan2` wrap puts a single U value on every vertex, so
/// whichever face straddles the angle's branch cut (the seam) has corners
/// jumping from ~1.0 back to ~0.0 instead of continuing past 1.0. Seam faces
/// are detected by that same per-face U spread and have their low-U corners
/// rewired to freshly duplicated vertices pinned at `U = 1.0`. Faces outside
/// `faces` (caps, typically) keep the mesh's other vertices, so any of
/// *their* corners that share a vertex with the projected selection are
/// likewise rewired to duplicates, parked at `CAP_PARK_U` so they don't read
/// as part of the unwrap.
pub fn cylindrical_project_uvs(
    topo: &mut Topology,
    quantum: f32,
    faces: &[FaceId],
    axis_hint: Axis,
    use_pca: bool,
) {
    let face_set: HashSet<FaceId> = faces
        .iter()
        .copied()
        .filter(|&f| (f as usize) < topo.faces.len() && topo.faces[f as usize].vertex_count > 0)
        .collect();
    if face_set.is_empty() {
        return;
    }

    let vertex_set = expanded_affected_face_vertices(topo, faces);
    let vertex_id_set: HashSet<VertexId> = vertex_set.iter().copied().collect();

    let axis = if use_pca {
        best_fit_axis(topo, &vertex_set)
    } else {
        axis_hint
    };
    let axis_idx = axis.index();

    let positions: Vec<glam::Vec3> = vertex_set.iter().map(|&v| topo.vertices[v as usize].position).collect();
    if positions.is_empty() {
        return;
    }
    let min_axis = positions.iter().map(|p| p.to_array()[axis_idx]).fold(f32::INFINITY, f32::min);
    let max_axis = positions.iter().map(|p| p.to_array()[axis_idx]).fold(f32::NEG_INFINITY, f32::max);
    let height = (max_axis - min_axis).max(1e-6);

    let mut raw_u: HashMap<VertexId, f32> = HashMap::new();
    for &v in &vertex_set {
        let p = topo.vertices[v as usize].position.to_array();
        let (sa, sb) = match axis {
            Axis::X => (p[1], p[2]),
            Axis::Y => (p[0], p[2]),
            Axis::Z => (p[0], p[1]),
        };
        let angle = sb.atan2(sa);
        let u = (angle + std::f32::consts::PI) / (2.0 * std::f32::consts::PI);
        raw_u.insert(v, u);
        let v_coord = (p[axis_idx] - min_axis) / height;
        topo.vertices[v as usize].uv = Vec2::new(u, v_coord);
    }

    let mut rebuilt: Vec<(FaceId, Vec<VertexId>, bool)> = Vec::new();

    // seam faces: duplicate the low-U corners so the strip continues past
    // 1.0 instead of wrapping back to 0.0.
    let mut seam_dup: HashMap<VertexId, VertexId> = HashMap::new();
    for &f in &face_set {
        let verts = query::face_vertices(topo, f);
        let us: Vec<f32> = verts.iter().map(|v| raw_u[v]).collect();
        let max_u = us.iter().copied().fold(f32::MIN, f32::max);
        let min_u = us.iter().copied().fold(f32::MAX, f32::min);
        if max_u - min_u <= 0.5 {
            continue;
        }
        let mut new_verts = verts.clone();
        let mut changed = false;
        for (i, &v) in verts.iter().enumerate() {
            if us[i] < 0.5 {
                let dup = *seam_dup.entry(v).or_insert_with(|| {
                    let mut attrs = topo.vertices[v as usize];
                    attrs.uv = Vec2::new(1.0, attrs.uv.y);
                    topo.add_vertex(attrs)
                });
                new_verts[i] = dup;
                changed = true;
            }
        }
        if changed {
            rebuilt.push((f, new_verts, topo.faces[f as usize].selected));
        }
    }

    // faces outside the projection that still reference a projected vertex
    // get their own parked duplicate instead of inheriting the cylindrical U.
    let mut park_dup: HashMap<VertexId, VertexId> = HashMap::new();
    for f in 0..topo.faces.len() as FaceId {
        if face_set.contains(&f) || topo.faces[f as usize].vertex_count == 0 {
            continue;
        }
        let verts = query::face_vertices(topo, f);
        let mut new_verts = verts.clone();
        let mut changed = false;
        for (i, &v) in verts.iter().enumerate() {
            if vertex_id_set.contains(&v) {
                let dup = *park_dup.entry(v).or_insert_with(|| {
                    let mut attrs = topo.vertices[v as usize];
                    attrs.uv = Vec2::new(CAP_PARK_U, attrs.uv.y);
                    topo.add_vertex(attrs)
                });
                new_verts[i] = dup;
                changed = true;
            } else {
                let y = topo.vertices[v as usize].uv.y;
                topo.vertices[v as usize].uv = Vec2::new(CAP_PARK_U, y);
            }
        }
        if changed {
            rebuilt.push((f, new_verts, topo.faces[f as usize].selected));
        }
    }

    if rebuilt.is_empty() {
        return;
    }

    for (f, _, _) in &rebuilt {
        topo.faces[*f as usize].vertex_count = 0;
    }
    for (_, verts, selected) in rebuilt {
        let new_fi = topo.add_face(&verts);
        if new_fi != crate::topology::NULL {
            topo.faces[new_fi as usize].selected = selected;
        }
    }
    topo.rebuild_from_faces(quantum);
}

fn expanded_affected_face_vertices(topo: &Topology, faces: &[FaceId]) -> Vec<crate::topology::VertexId> {
    let mut set = std::collections::HashSet::new();
    for &f in faces {
        if (f as usize) < topo.faces.len() && topo.faces[f as usize].vertex_count > 0 {
            for v in query::face_vertices(topo, f) {
                set.insert(v);
            }
        }
    }
    set.into_iter().collect()
}

fn best_fit_axis(topo: &Topology, verts: &[crate::topology::VertexId]) -> Axis {
    let positions: Vec<glam::Vec3> = verts.iter().map(|&v| topo.vertices[v as usize].position).collect();
    if positions.is_empty() {
        return Axis::Y;
    }
    let centroid: glam::Vec3 = positions.iter().copied().sum::<glam::Vec3>() / positions.len() as f32;
    // the long axis of the point spread is the cylinder axis: biggest
    // diagonal covariance entry wins (avoids a second power-iteration pass).
    let mut variance = [0.0f32; 3];
    for p in &positions {
        let d = (*p - centroid).to_array();
        for i in 0..3 {
            variance[i] += d[i] * d[i];
        }
    }
    let axis = (0..3).max_by(|&a, &b| variance[a].partial_cmp(&variance[b]).unwrap()).unwrap();
    match axis {
        0 => Axis::X,
        1 => Axis::Y,
        _ => Axis::Z,
    }
}

/// Each face becomes its own UV island, grid-packed into `[0,1]^2`.
pub fn per_face_project_uvs(topo: &mut Topology, faces: &[FaceId], margin: f32) {
    let live: Vec<FaceId> = faces
        .iter()
        .copied()
        .filter(|&f| (f as usize) < topo.faces.len() && topo.faces[f as usize].vertex_count > 0)
        .collect();
    let islands: Vec<Vec<FaceId>> = live.into_iter().map(|f| vec![f]).collect();
    pack_islands(topo, &islands, margin);
}

/// Every face gets an identical unit-square UV (tiling/stamp textures).
pub fn uniform_square_uvs(topo: &mut Topology, faces: &[FaceId]) {
    const CORNERS: [Vec2; 4] = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    for &f in faces {
        if (f as usize) >= topo.faces.len() || topo.faces[f as usize].vertex_count == 0 {
            continue;
        }
        let verts = query::face_vertices(topo, f);
        for (i, &v) in verts.iter().enumerate() {
            topo.vertices[v as usize].uv = CORNERS[i % 4];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn box_project_sets_uv_from_position() {
        let mut t = fixtures::cube(1.0);
        box_project_uvs(&mut t, &[0], 1.0);
        for v in query::face_vertices(&t, 0) {
            assert_ne!(t.vertices[v as usize].uv, Vec2::ZERO);
        }
    }

    #[test]
    fn uniform_square_uvs_are_in_unit_range() {
        let mut t = fixtures::cube(1.0);
        uniform_square_uvs(&mut t, &[0, 1, 2]);
        for f in [0, 1, 2] {
            for v in query::face_vertices(&t, f) {
                let uv = t.vertices[v as usize].uv;
                assert!(uv.x >= 0.0 && uv.x <= 1.0 && uv.y >= 0.0 && uv.y <= 1.0);
            }
        }
    }

    #[test]
    fn per_face_project_keeps_uvs_in_unit_square() {
        let mut t = fixtures::cube(1.0);
        per_face_project_uvs(&mut t, &[0, 1, 2, 3, 4, 5], 0.05);
        for v in &t.vertices {
            assert!(v.uv.x >= -1e-4 && v.uv.x <= 1.0001 && v.uv.y >= -1e-4 && v.uv.y <= 1.0001);
        }
    }

    #[test]
    fn cylindrical_project_wraps_u_in_unit_range() {
        let mut t = fixtures::cube(1.0);
        cylindrical_project_uvs(&mut t, 1e4, &[0, 1, 2, 3, 4, 5], Axis::Y, false);
        for v in &t.vertices {
            assert!(v.uv.x >= 0.0 && v.uv.x <= 1.0);
        }
    }

    #[test]
    fn cylindrical_project_duplicates_seam_and_parks_caps() {
        let mut t = crate::primitives::cylinder(0.5, 2.0, 16, 1, true);
        let side_faces: Vec<FaceId> = (0..16).collect();
        cylindrical_project_uvs(&mut t, 1e4, &side_faces, Axis::Y, false);

        let has_seam_dup = t.vertices.iter().any(|v| (v.uv.x - 1.0).abs() < 1e-5);
        assert!(has_seam_dup, "expected a seam duplicate vertex at U=1.0");

        let has_parked_cap = t.vertices.iter().any(|v| v.uv.x >= 1.5);
        assert!(has_parked_cap, "expected cap vertices parked at U>=1.5");
    }
}
