//! OBJ import/export: lossy relative to lime (no selection/color/topology
//! identity survives), but the common interchange format for everything else.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::error::KernelError;
use crate::topology::{Topology, Vertex, NULL};

pub fn save_obj(path: impl AsRef<Path>, topo: &Topology) -> Result<(), KernelError> {
    let mut out = String::new();
    for v in &topo.vertices {
        writeln!(out, "v {} {} {}", v.position.x, v.position.y, v.position.z).unwrap();
    }
    for v in &topo.vertices {
        writeln!(out, "vt {} {}", v.uv.x, v.uv.y).unwrap();
    }
    for v in &topo.vertices {
        writeln!(out, "vn {} {} {}", v.normal.x, v.normal.y, v.normal.z).unwrap();
    }
    for (fi, face) in topo.faces.iter().enumerate() {
        if face.vertex_count == 0 {
            continue;
        }
        let verts = topo.face_vertex_cycle(fi as u32);
        let mut line = String::from("f");
        for v in verts {
            let one_based = v + 1;
            write!(line, " {one_based}/{one_based}/{one_based}").unwrap();
        }
        writeln!(out, "{line}").unwrap();
    }
    fs::write(path, out)?;
    Ok(())
}

pub fn load_obj(path: impl AsRef<Path>) -> Result<Topology, KernelError> {
    let contents = fs::read_to_string(path)?;

    let mut positions: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    // one (position, uv, normal) index triple per face-corner reference
    let mut face_refs: Vec<Vec<(i64, Option<i64>, Option<i64>)>> = Vec::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let nums: Vec<f32> = tokens.filter_map(|t| t.parse::<f32>().ok()).collect();
                if nums.len() >= 3 {
                    positions.push(Vec3::new(nums[0], nums[1], nums[2]));
                }
            }
            Some("vt") => {
                let nums: Vec<f32> = tokens.filter_map(|t| t.parse::<f32>().ok()).collect();
                if nums.len() >= 2 {
                    uvs.push(Vec2::new(nums[0], nums[1]));
                }
            }
            Some("vn") => {
                let nums: Vec<f32> = tokens.filter_map(|t| t.parse::<f32>().ok()).collect();
                if nums.len() >= 3 {
                    normals.push(Vec3::new(nums[0], nums[1], nums[2]));
                }
            }
            Some("f") => {
                let mut refs = Vec::new();
                for tok in tokens {
                    if let Some(r) = parse_face_ref(tok) {
                        refs.push(r);
                    }
                }
                if refs.len() >= 3 {
                    face_refs.push(refs);
                } else {
                    tracing::warn!(line, "malformed obj face line, skipping");
                }
            }
            _ => {}
        }
    }

    let mut topo = Topology::new();
    // one kernel vertex per (position, uv, normal) combination actually
    // referenced, so shared corners stay shared and seams (differing vt/vn)
    // split naturally.
    let mut seen: std::collections::HashMap<(i64, Option<i64>, Option<i64>), u32> = std::collections::HashMap::new();

    let resolve = |idx: i64, len: usize| -> Option<usize> {
        if idx > 0 {
            Some(idx as usize - 1)
        } else if idx < 0 {
            len.checked_sub((-idx) as usize)
        } else {
            None
        }
    };

    for refs in &face_refs {
        let mut corner_ids = Vec::with_capacity(refs.len());
        for &(pi, ti, ni) in refs {
            let key = (pi, ti, ni);
            let id = *seen.entry(key).or_insert_with(|| {
                let Some(p_idx) = resolve(pi, positions.len()) else {
                    return NULL;
                };
                let position = positions.get(p_idx).copied().unwrap_or(Vec3::ZERO);
                let mut vertex = Vertex::new(position);
                if let Some(ti) = ti {
                    if let Some(t_idx) = resolve(ti, uvs.len()) {
                        vertex.uv = uvs.get(t_idx).copied().unwrap_or(Vec2::ZERO);
                    }
                }
                if let Some(ni) = ni {
                    if let Some(n_idx) = resolve(ni, normals.len()) {
                        vertex.normal = normals.get(n_idx).copied().unwrap_or(Vec3::ZERO);
                    }
                }
                topo.add_vertex(vertex)
            });
            if id != NULL {
                corner_ids.push(id);
            }
        }
        if corner_ids.len() >= 3 {
            topo.add_face(&corner_ids);
        }
    }

    topo.link_twins_by_position(1e4);
    topo.rebuild_edge_map();
    if normals.is_empty() {
        crate::ops::normals::recompute_normals(&mut topo);
    }

    Ok(topo)
}

/// `"v"`, `"v/vt"`, `"v//vn"`, `"v/vt/vn"` -> `(v, vt, vn)`, 1-based or
/// negative (relative-to-end) indices preserved unresolved.
fn parse_face_ref(tok: &str) -> Option<(i64, Option<i64>, Option<i64>)> {
    let mut parts = tok.split('/');
    let v = parts.next()?.parse::<i64>().ok()?;
    let t = parts.next().and_then(|s| if s.is_empty() { None } else { s.parse::<i64>().ok() });
    let n = parts.next().and_then(|s| if s.is_empty() { None } else { s.parse::<i64>().ok() });
    Some((v, t, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn round_trips_a_cube_through_save_and_load() {
        let topo = fixtures::cube(1.0);
        let path = std::env::temp_dir().join("obj_roundtrip_cube.obj");
        save_obj(&path, &topo).unwrap();
        let loaded = load_obj(&path).unwrap();
        assert_eq!(loaded.face_count(), topo.face_count());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn negative_indices_reference_from_end_of_file() {
        let contents = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let path = std::env::temp_dir().join("obj_negative_indices.obj");
        fs::write(&path, contents).unwrap();
        let loaded = load_obj(&path).unwrap();
        assert_eq!(loaded.face_count(), 1);
        assert_eq!(loaded.vertices.len(), 3);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_normals_trigger_recompute() {
        let contents = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let path = std::env::temp_dir().join("obj_no_normals.obj");
        fs::write(&path, contents).unwrap();
        let loaded = load_obj(&path).unwrap();
        assert!(loaded.vertices.iter().any(|v| v.normal.length() > 0.5));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn malformed_face_line_is_skipped_not_fatal() {
        let contents = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2\nf 1 2 3\n";
        let path = std::env::temp_dir().join("obj_malformed_face.obj");
        fs::write(&path, contents).unwrap();
        let loaded = load_obj(&path).unwrap();
        assert_eq!(loaded.face_count(), 1);
        let _ = fs::remove_file(&path);
    }
}
