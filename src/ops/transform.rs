//! Transforms over the current selection (§4.5.11): translate, scale,
//! rotate, flatten along an axis, and project onto a best-fit plane.
//!
//! Operates on a per-vertex selection rather than a whole-mesh transform,
//! using the same pivot-relative math; the PCA power-iteration is built
//! directly from the documented procedure.

use std::collections::HashSet;

use glam::{Mat3, Quat, Vec3};

use crate::ops::normals::recompute_normals;
use crate::selection;
use crate::topology::{position_key, Topology, VertexId};

/// `affected_vertices()` expanded by position: every vertex sharing a
/// quantized position with a selected element moves together, so
/// hard-normal seam duplicates stay welded during a transform.
pub fn expanded_affected_vertices(topo: &Topology, quantum: f32) -> HashSet<VertexId> {
    let base = selection::affected_vertices(topo);
    let keys: HashSet<u64> = base
        .iter()
        .map(|&v| position_key(topo.vertices[v as usize].position, quantum))
        .collect();
    (0..topo.vertices.len() as VertexId)
        .filter(|&v| keys.contains(&position_key(topo.vertices[v as usize].position, quantum)))
        .collect()
}

pub fn translate(topo: &mut Topology, quantum: f32, delta: Vec3) {
    for v in expanded_affected_vertices(topo, quantum) {
        topo.vertices[v as usize].position += delta;
    }
}

pub fn scale(topo: &mut Topology, quantum: f32, scale: Vec3, pivot: Vec3) {
    for v in expanded_affected_vertices(topo, quantum) {
        let p = topo.vertices[v as usize].position;
        topo.vertices[v as usize].position = pivot + (p - pivot) * scale;
    }
}

pub fn rotate(topo: &mut Topology, quantum: f32, euler_degrees: Vec3, pivot: Vec3) {
    let q = Quat::from_euler(
        glam::EulerRot::XYZ,
        euler_degrees.x.to_radians(),
        euler_degrees.y.to_radians(),
        euler_degrees.z.to_radians(),
    );
    for v in expanded_affected_vertices(topo, quantum) {
        let p = topo.vertices[v as usize].position;
        topo.vertices[v as usize].position = pivot + q * (p - pivot);
    }
}

fn flatten_axis(topo: &mut Topology, quantum: f32, axis: usize) {
    let verts = expanded_affected_vertices(topo, quantum);
    if verts.is_empty() {
        return;
    }
    let sum: f32 = verts
        .iter()
        .map(|&v| topo.vertices[v as usize].position.to_array()[axis])
        .sum();
    let avg = sum / verts.len() as f32;
    for &v in &verts {
        let mut arr = topo.vertices[v as usize].position.to_array();
        arr[axis] = avg;
        topo.vertices[v as usize].position = Vec3::from_array(arr);
    }
    recompute_normals(topo);
}

pub fn flatten_x(topo: &mut Topology, quantum: f32) {
    flatten_axis(topo, quantum, 0);
}
pub fn flatten_y(topo: &mut Topology, quantum: f32) {
    flatten_axis(topo, quantum, 1);
}
pub fn flatten_z(topo: &mut Topology, quantum: f32) {
    flatten_axis(topo, quantum, 2);
}

fn power_iterate(m: Mat3, iterations: usize) -> (f32, Vec3) {
    let mut v = Vec3::new(1.0, 1.0, 1.0).normalize();
    for _ in 0..iterations {
        let next = m * v;
        if next.length_squared() < 1e-20 {
            break;
        }
        v = next.normalize();
    }
    let eigenvalue = v.dot(m * v);
    (eigenvalue, v)
}

fn best_fit_normal(positions: &[Vec3], centroid: Vec3) -> Vec3 {
    let mut cov = Mat3::ZERO;
    for &p in positions {
        let d = p - centroid;
        cov.x_axis += d * d.x;
        cov.y_axis += d * d.y;
        cov.z_axis += d * d.z;
    }
    let n = positions.len().max(1) as f32;
    cov.x_axis /= n;
    cov.y_axis /= n;
    cov.z_axis /= n;

    let diag = [cov.x_axis.x, cov.y_axis.y, cov.z_axis.z];
    let off_diag_max = cov.x_axis.y.abs().max(cov.x_axis.z.abs()).max(cov.y_axis.z.abs());
    let diag_max = diag.iter().cloned().fold(0.0f32, f32::max);

    if off_diag_max < 1e-5 * diag_max.max(1e-8) {
        let axis = (0..3).min_by(|&a, &b| diag[a].partial_cmp(&diag[b]).unwrap()).unwrap();
        return match axis {
            0 => Vec3::X,
            1 => Vec3::Y,
            _ => Vec3::Z,
        };
    }

    let (lambda1, v1) = power_iterate(cov, 50);
    let outer = Mat3::from_cols(v1 * v1.x, v1 * v1.y, v1 * v1.z);
    let deflated = cov - outer * lambda1;
    let (_, v2) = power_iterate(deflated, 50);

    let normal = v1.cross(v2);
    if normal.length_squared() < 1e-12 {
        Vec3::Z
    } else {
        normal.normalize()
    }
}

pub fn make_coplanar(topo: &mut Topology, quantum: f32) {
    let verts: Vec<VertexId> = expanded_affected_vertices(topo, quantum).into_iter().collect();
    if verts.len() < 3 {
        return;
    }
    let positions: Vec<Vec3> = verts.iter().map(|&v| topo.vertices[v as usize].position).collect();
    let centroid: Vec3 = positions.iter().copied().sum::<Vec3>() / positions.len() as f32;
    let normal = best_fit_normal(&positions, centroid);

    for &v in &verts {
        let p = topo.vertices[v as usize].position;
        let d = (p - centroid).dot(normal);
        topo.vertices[v as usize].position = p - d * normal;
    }
    recompute_normals(topo);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection;
    use crate::topology::fixtures;

    #[test]
    fn translate_moves_selected_face_vertices() {
        let mut t = fixtures::cube(1.0);
        selection::select_face(&mut t, 0, false);
        translate(&mut t, 1e4, Vec3::new(0.0, 0.0, 5.0));
        for v in query_face_vertex_positions(&t, 0) {
            assert!(v.z > 4.0);
        }
    }

    fn query_face_vertex_positions(t: &Topology, f: crate::topology::FaceId) -> Vec<Vec3> {
        crate::query::face_vertices(t, f)
            .into_iter()
            .map(|v| t.vertices[v as usize].position)
            .collect()
    }

    #[test]
    fn flatten_y_snaps_to_average() {
        let mut t = fixtures::two_triangles();
        selection::select_face(&mut t, 0, false);
        selection::select_face(&mut t, 1, true);
        flatten_y(&mut t, 1e4);
        let ys: Vec<f32> = t.vertices.iter().map(|v| v.position.y).collect();
        let first = ys[0];
        for y in ys {
            assert!((y - first).abs() < 1e-5);
        }
    }

    #[test]
    fn make_coplanar_flat_selection_is_noop_on_positions() {
        let mut t = fixtures::two_triangles(); // already planar (z=0)
        selection::select_face(&mut t, 0, false);
        selection::select_face(&mut t, 1, true);
        let before: Vec<Vec3> = t.vertices.iter().map(|v| v.position).collect();
        make_coplanar(&mut t, 1e4);
        for (a, b) in before.iter().zip(t.vertices.iter()) {
            assert!((*a - b.position).length() < 1e-4);
        }
    }
}
