//! Inset operator (§4.5.2): shrinks each selected quad face toward its
//! center, leaving a border ring of quads behind.
//!
//! Uses a tombstone-then-rebuild shape, narrowed from triangle-fan inset to
//! the quad-only contract here.

use crate::query;
use crate::topology::{FaceId, Topology, VertexId};

pub fn inset_faces(topo: &mut Topology, quantum: f32, faces: &[FaceId], amount: f32) {
    let amount = amount.clamp(0.01, 0.99);

    let mut new_quads: Vec<[VertexId; 4]> = Vec::new();

    for &f in faces {
        if (f as usize) >= topo.faces.len() || topo.faces[f as usize].vertex_count == 0 {
            continue;
        }
        let verts = query::face_vertices(topo, f);
        if verts.len() != 4 {
            continue; // non-quads are skipped
        }

        let center = query::face_center(topo, f);
        let center_uv = {
            let sum: glam::Vec2 = verts.iter().map(|&v| topo.vertices[v as usize].uv).sum();
            sum / verts.len() as f32
        };

        let inner: Vec<VertexId> = verts
            .iter()
            .map(|&v| {
                let src = topo.vertices[v as usize];
                let mut attrs = src;
                attrs.position = src.position.lerp(center, amount);
                attrs.uv = src.uv.lerp(center_uv, amount);
                topo.add_vertex(attrs)
            })
            .collect();

        topo.faces[f as usize].vertex_count = 0;

        new_quads.push([inner[0], inner[1], inner[2], inner[3]]);
        for i in 0..4 {
            let j = (i + 1) % 4;
            new_quads.push([verts[i], verts[j], inner[j], inner[i]]);
        }
    }

    for quad in new_quads {
        topo.add_face(&quad);
    }

    topo.rebuild_from_faces(quantum);
    crate::ops::normals::recompute_normals(topo);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection;
    use crate::topology::fixtures;

    #[test]
    fn inset_cube_face_adds_five_quads() {
        let mut t = fixtures::cube(1.0);
        selection::select_face(&mut t, 0, false);
        let before_faces = t.face_count();
        inset_faces(&mut t, 1e4, &[0], 0.5);
        // original face tombstoned, +5 new quads (1 inner + 4 border)
        assert_eq!(t.face_count(), before_faces - 1 + 5);
    }

    #[test]
    fn inset_skips_non_quad() {
        let mut t = fixtures::triangle();
        let before = t.face_count();
        inset_faces(&mut t, 1e4, &[0], 0.5);
        assert_eq!(t.face_count(), before);
    }

    #[test]
    fn inset_amount_is_clamped() {
        let mut t = fixtures::cube(1.0);
        inset_faces(&mut t, 1e4, &[0], 5.0); // clamps to 0.99
        assert_eq!(t.face_count(), 10);
    }
}
