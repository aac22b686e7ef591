//! Lime text format (v1.0/v2.0/v2.1): a line-oriented, whitespace-delimited
//! dump of the three topology arrays plus optional transform/texture blocks.
//!
//! `null` is `u32::MAX` in both the file and in memory, so half-edge/face
//! fields round-trip without translation.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use base64::Engine;
use glam::{Quat, Vec2, Vec3, Vec4};

use crate::error::KernelError;
use crate::topology::{Face, HalfEdge, Topology, Vertex, NULL};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimeTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for LimeTransform {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimeTexture {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct LimeDocument {
    pub topology: Topology,
    pub transform: Option<LimeTransform>,
    pub texture: Option<LimeTexture>,
}

pub fn save_lime(
    path: impl AsRef<Path>,
    topo: &Topology,
    transform: Option<&LimeTransform>,
    texture: Option<&LimeTexture>,
) -> Result<(), KernelError> {
    let mut out = String::new();
    writeln!(out, "# lime v2.1").unwrap();

    for (i, v) in topo.vertices.iter().enumerate() {
        writeln!(
            out,
            "v {}: {} {} {} | {} {} {} | {} {} | {} {} {} {} | {} {}",
            i,
            v.position.x, v.position.y, v.position.z,
            v.normal.x, v.normal.y, v.normal.z,
            v.uv.x, v.uv.y,
            v.color.x, v.color.y, v.color.z, v.color.w,
            v.outgoing_half_edge, v.selected,
        )
        .unwrap();
    }

    for (i, f) in topo.faces.iter().enumerate() {
        if f.vertex_count == 0 {
            continue;
        }
        let verts = topo.face_vertex_cycle(i as u32);
        let verts_str = verts.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
        writeln!(out, "f {}: {} {} {} | {}", i, f.first_half_edge, f.vertex_count, f.selected, verts_str).unwrap();
    }

    for (i, he) in topo.half_edges.iter().enumerate() {
        writeln!(out, "he {}: {} {} {} {} {}", i, he.to_vertex, he.face, he.next, he.prev, he.twin).unwrap();
    }

    if let Some(t) = transform {
        writeln!(out, "transform_pos: {} {} {}", t.position.x, t.position.y, t.position.z).unwrap();
        writeln!(out, "transform_rot: {} {} {} {}", t.rotation.x, t.rotation.y, t.rotation.z, t.rotation.w).unwrap();
        writeln!(out, "transform_scale: {} {} {}", t.scale.x, t.scale.y, t.scale.z).unwrap();
    }

    if let Some(tex) = texture {
        writeln!(out, "tex_size: {} {}", tex.width, tex.height).unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&tex.data);
        writeln!(out, "tex_data: {encoded}").unwrap();
    }

    fs::write(path, out)?;
    Ok(())
}

pub fn load_lime(path: impl AsRef<Path>) -> Result<LimeDocument, KernelError> {
    let contents = fs::read_to_string(path)?;

    let mut vertices: Vec<Option<Vertex>> = Vec::new();
    let mut faces: Vec<Option<Face>> = Vec::new();
    let mut half_edges: Vec<Option<HalfEdge>> = Vec::new();
    let mut transform_pos = None;
    let mut transform_rot = None;
    let mut transform_scale = None;
    let mut tex_size: Option<(u32, u32)> = None;
    let mut tex_data: Option<Vec<u8>> = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("v ") {
            let Some((idx, body)) = parse_indexed(rest) else {
                tracing::warn!(line, "malformed lime vertex line, skipping");
                continue;
            };
            let segments: Vec<&str> = body.split('|').map(str::trim).collect();
            if segments.len() < 4 {
                tracing::warn!(line, "malformed lime vertex line, skipping");
                continue;
            }
            let position = parse_vec3(segments[0]).unwrap_or(Vec3::ZERO);
            let normal = parse_vec3(segments[1]).unwrap_or(Vec3::ZERO);
            let uv = parse_vec2(segments[2]).unwrap_or(Vec2::ZERO);
            let (color, tail) = if segments.len() >= 5 {
                (parse_vec4(segments[3]).unwrap_or(Vec4::ONE), segments[4])
            } else {
                (Vec4::ONE, segments[3])
            };
            let tail_parts: Vec<&str> = tail.split_whitespace().collect();
            let outgoing_half_edge = tail_parts.first().and_then(|s| s.parse::<u32>().ok()).unwrap_or(NULL);
            let selected = tail_parts.get(1).map(|s| *s == "true").unwrap_or(false);

            ensure_len(&mut vertices, idx + 1);
            vertices[idx] = Some(Vertex { position, normal, uv, color, outgoing_half_edge, selected });
        } else if let Some(rest) = line.strip_prefix("f ") {
            let Some((idx, body)) = parse_indexed(rest) else {
                tracing::warn!(line, "malformed lime face line, skipping");
                continue;
            };
            let head = body.split('|').next().unwrap_or("").trim();
            let parts: Vec<&str> = head.split_whitespace().collect();
            if parts.len() < 3 {
                tracing::warn!(line, "malformed lime face line, skipping");
                continue;
            }
            let first_half_edge = parts[0].parse::<u32>().unwrap_or(NULL);
            let vertex_count = parts[1].parse::<u32>().unwrap_or(0);
            let selected = parts[2] == "true";
            ensure_len(&mut faces, idx + 1);
            faces[idx] = Some(Face { first_half_edge, vertex_count, selected });
        } else if let Some(rest) = line.strip_prefix("he ") {
            let Some((idx, body)) = parse_indexed(rest) else {
                tracing::warn!(line, "malformed lime half-edge line, skipping");
                continue;
            };
            let parts: Vec<&str> = body.split_whitespace().collect();
            if parts.len() < 5 {
                tracing::warn!(line, "malformed lime half-edge line, skipping");
                continue;
            }
            let nums: Vec<u32> = parts.iter().take(5).map(|s| s.parse::<u32>().unwrap_or(NULL)).collect();
            ensure_len(&mut half_edges, idx + 1);
            half_edges[idx] = Some(HalfEdge { to_vertex: nums[0], face: nums[1], next: nums[2], prev: nums[3], twin: nums[4] });
        } else if let Some(rest) = line.strip_prefix("transform_pos:") {
            transform_pos = parse_vec3(rest.trim());
        } else if let Some(rest) = line.strip_prefix("transform_rot:") {
            transform_rot = parse_vec4(rest.trim()).map(|v| Quat::from_xyzw(v.x, v.y, v.z, v.w));
        } else if let Some(rest) = line.strip_prefix("transform_scale:") {
            transform_scale = parse_vec3(rest.trim());
        } else if let Some(rest) = line.strip_prefix("tex_size:") {
            let parts: Vec<&str> = rest.trim().split_whitespace().collect();
            if parts.len() == 2 {
                if let (Ok(w), Ok(h)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
                    tex_size = Some((w, h));
                }
            }
        } else if let Some(rest) = line.strip_prefix("tex_data:") {
            tex_data = Some(base64::engine::general_purpose::STANDARD.decode(rest.trim())?);
        } else {
            tracing::debug!(line, "unrecognized lime line, skipping");
        }
    }

    let vertices: Vec<Vertex> = vertices.into_iter().map(|v| v.unwrap_or_else(|| Vertex::new(Vec3::ZERO))).collect();
    let faces: Vec<Face> = faces.into_iter().map(|f| f.unwrap_or(Face { first_half_edge: NULL, vertex_count: 0, selected: false })).collect();
    let half_edges: Vec<HalfEdge> =
        half_edges.into_iter().map(|h| h.unwrap_or(HalfEdge { to_vertex: NULL, face: NULL, next: NULL, prev: NULL, twin: NULL })).collect();

    let mut topology = Topology::new();
    topology.set_mesh_data(vertices, half_edges, faces);

    let transform = match (transform_pos, transform_rot, transform_scale) {
        (Some(position), Some(rotation), Some(scale)) => Some(LimeTransform { position, rotation, scale }),
        _ => None,
    };

    let texture = match (tex_size, tex_data) {
        (Some((width, height)), Some(data)) => {
            let expected = width as usize * height as usize * 4;
            if data.len() != expected {
                return Err(KernelError::InvalidTexture { expected, got: data.len() });
            }
            Some(LimeTexture { width, height, data })
        }
        _ => None,
    };

    Ok(LimeDocument { topology, transform, texture })
}

fn ensure_len<T>(v: &mut Vec<Option<T>>, len: usize) {
    if v.len() < len {
        v.resize_with(len, || None);
    }
}

/// Split `"<idx>: <rest>"` into `(idx, rest)`.
fn parse_indexed(s: &str) -> Option<(usize, &str)> {
    let (idx_str, rest) = s.split_once(':')?;
    let idx = idx_str.trim().parse::<usize>().ok()?;
    Some((idx, rest.trim()))
}

fn parse_vec3(s: &str) -> Option<Vec3> {
    let parts: Vec<f32> = s.split_whitespace().filter_map(|p| p.parse::<f32>().ok()).collect();
    if parts.len() != 3 {
        return None;
    }
    Some(Vec3::new(parts[0], parts[1], parts[2]))
}

fn parse_vec2(s: &str) -> Option<Vec2> {
    let parts: Vec<f32> = s.split_whitespace().filter_map(|p| p.parse::<f32>().ok()).collect();
    if parts.len() != 2 {
        return None;
    }
    Some(Vec2::new(parts[0], parts[1]))
}

fn parse_vec4(s: &str) -> Option<Vec4> {
    let parts: Vec<f32> = s.split_whitespace().filter_map(|p| p.parse::<f32>().ok()).collect();
    if parts.len() != 4 {
        return None;
    }
    Some(Vec4::new(parts[0], parts[1], parts[2], parts[3]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn round_trips_a_cube_through_save_and_load() {
        let topo = fixtures::cube(1.0);
        let path = std::env::temp_dir().join("lime_roundtrip_cube.lime");
        save_lime(&path, &topo, None, None).unwrap();
        let doc = load_lime(&path).unwrap();
        assert_eq!(doc.topology.vertices.len(), topo.vertices.len());
        assert_eq!(doc.topology.half_edges.len(), topo.half_edges.len());
        assert_eq!(doc.topology.face_count(), topo.face_count());
        for (a, b) in doc.topology.half_edges.iter().zip(topo.half_edges.iter()) {
            assert_eq!(a.twin, b.twin);
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn round_trips_transform_block() {
        let topo = fixtures::triangle();
        let transform = LimeTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
            scale: Vec3::new(1.0, 1.0, 2.0),
        };
        let path = std::env::temp_dir().join("lime_roundtrip_transform.lime");
        save_lime(&path, &topo, Some(&transform), None).unwrap();
        let doc = load_lime(&path).unwrap();
        let got = doc.transform.unwrap();
        assert!((got.position - transform.position).length() < 1e-5);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_texture_with_mismatched_byte_count() {
        let topo = fixtures::triangle();
        let tex = LimeTexture { width: 2, height: 2, data: vec![0u8; 3] }; // should be 16
        let path = std::env::temp_dir().join("lime_bad_texture.lime");
        save_lime(&path, &topo, None, Some(&tex)).unwrap();
        let result = load_lime(&path);
        assert!(matches!(result, Err(KernelError::InvalidTexture { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_lime("/nonexistent/path/does-not-exist.lime");
        assert!(matches!(result, Err(KernelError::Io(_))));
    }
}
