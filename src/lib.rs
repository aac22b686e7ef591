//! Half-edge polygon mesh kernel: editable topology, selection, edit
//! operators, UV unwrapping, undo/redo, and lime/OBJ serialization.
//!
//! [`MeshKernel`] is the facade: it owns one [`Topology`], a bounded
//! [`UndoStack`], and a [`KernelConfig`], and checkpoints the topology before
//! every mutating call so undo/redo need no per-operator bookkeeping.

pub mod config;
pub mod error;
pub mod io;
pub mod ops;
pub mod primitives;
pub mod query;
pub mod raycast;
pub mod selection;
pub mod topology;
pub mod undo;
pub mod uv;

use std::path::Path;

use glam::Vec3;

use crate::config::KernelConfig;
use crate::error::KernelError;
use crate::io::lime::{LimeDocument, LimeTexture, LimeTransform};
use crate::selection::SelectionMode;
use crate::topology::{FaceId, HalfEdgeId, Topology, VertexId};
use crate::undo::UndoStack;
use crate::uv::Axis;

pub struct MeshKernel {
    pub topology: Topology,
    pub config: KernelConfig,
    undo: UndoStack,
}

impl MeshKernel {
    pub fn new(config: KernelConfig) -> Self {
        let undo = UndoStack::new(config.undo_cap);
        Self { topology: Topology::new(), config, undo }
    }

    pub fn with_topology(topology: Topology, config: KernelConfig) -> Self {
        let undo = UndoStack::new(config.undo_cap);
        Self { topology, config, undo }
    }

    pub fn clear(&mut self) {
        self.topology.clear();
        self.undo.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Snapshot the current topology onto the undo stack. Every mutating
    /// method below calls this first; exposed publicly for callers building
    /// their own compound edits out of the lower-level `ops::*` functions.
    pub fn checkpoint(&mut self) {
        self.undo.save_state(self.topology.clone());
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.undo(self.topology.clone()) {
            Some(prev) => {
                self.topology = prev;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undo.redo(self.topology.clone()) {
            Some(next) => {
                self.topology = next;
                true
            }
            None => false,
        }
    }

    fn quantum(&self) -> f32 {
        self.config.position_quantum
    }

    // --- edit operators -------------------------------------------------

    pub fn extrude_selected_faces(&mut self, faces: &[FaceId], distance: f32) {
        self.checkpoint();
        let __q = self.quantum();
        ops::extrude::extrude_faces(&mut self.topology, __q, faces, distance);
    }

    pub fn inset_selected_faces(&mut self, faces: &[FaceId], amount: f32) {
        self.checkpoint();
        let __q = self.quantum();
        ops::inset::inset_faces(&mut self.topology, __q, faces, amount);
    }

    pub fn bridge_edges(&mut self, h1: HalfEdgeId, h2: HalfEdgeId, segments: u32) -> bool {
        self.checkpoint();
        let __q = self.quantum();
        let ok = ops::bridge::bridge_edges(&mut self.topology, __q, h1, h2, segments);
        if !ok {
            self.undo.undo(self.topology.clone());
        }
        ok
    }

    pub fn delete_selected_faces(&mut self, faces: &[FaceId]) {
        self.checkpoint();
        let __q = self.quantum();
        ops::delete::delete_faces(&mut self.topology, __q, faces);
    }

    pub fn merge_selected_vertices(&mut self, vertices: &[VertexId]) {
        self.checkpoint();
        let __q = self.quantum();
        ops::delete::merge_vertices(&mut self.topology, __q, vertices);
    }

    pub fn merge_triangles_to_quads(&mut self, normal_threshold: Option<f32>) {
        self.checkpoint();
        let threshold = normal_threshold.unwrap_or(self.config.merge_normal_threshold);
        let __q = self.quantum();
        ops::delete::merge_triangles_to_quads(&mut self.topology, __q, threshold);
    }

    pub fn insert_edge_loop(&mut self, h: HalfEdgeId, count: u32) {
        self.checkpoint();
        let __q = self.quantum();
        ops::edge_loop::insert_edge_loop(&mut self.topology, __q, h, count);
    }

    pub fn hollow(&mut self, thickness: f32) {
        self.checkpoint();
        let __q = self.quantum();
        ops::hollow::hollow(&mut self.topology, __q, thickness);
    }

    pub fn boolean_cut_box(&mut self, cutter_min: Vec3, cutter_max: Vec3) {
        self.checkpoint();
        let __q = self.quantum();
        ops::boolean_cut::boolean_cut_box(&mut self.topology, __q, cutter_min, cutter_max);
    }

    pub fn flip_selected_normals(&mut self, faces: &[FaceId]) {
        self.checkpoint();
        let __q = self.quantum();
        ops::normals::flip_selected_normals(&mut self.topology, __q, faces);
    }

    pub fn recompute_normals(&mut self) {
        ops::normals::recompute_normals(&mut self.topology);
    }

    // --- transforms -------------------------------------------------------

    pub fn translate(&mut self, delta: Vec3) {
        self.checkpoint();
        let __q = self.quantum();
        ops::transform::translate(&mut self.topology, __q, delta);
    }

    pub fn scale(&mut self, scale: Vec3, pivot: Vec3) {
        self.checkpoint();
        let __q = self.quantum();
        ops::transform::scale(&mut self.topology, __q, scale, pivot);
    }

    pub fn rotate(&mut self, euler_degrees: Vec3, pivot: Vec3) {
        self.checkpoint();
        let __q = self.quantum();
        ops::transform::rotate(&mut self.topology, __q, euler_degrees, pivot);
    }

    pub fn flatten_x(&mut self) {
        self.checkpoint();
        let __q = self.quantum();
        ops::transform::flatten_x(&mut self.topology, __q);
    }

    pub fn flatten_y(&mut self) {
        self.checkpoint();
        let __q = self.quantum();
        ops::transform::flatten_y(&mut self.topology, __q);
    }

    pub fn flatten_z(&mut self) {
        self.checkpoint();
        let __q = self.quantum();
        ops::transform::flatten_z(&mut self.topology, __q);
    }

    pub fn make_coplanar(&mut self) {
        self.checkpoint();
        let __q = self.quantum();
        ops::transform::make_coplanar(&mut self.topology, __q);
    }

    // --- selection --------------------------------------------------------

    pub fn clear_selection(&mut self) {
        selection::clear_selection(&mut self.topology);
    }

    pub fn invert_selection(&mut self, mode: SelectionMode) {
        selection::invert_selection(&mut self.topology, mode);
    }

    // --- raycast ------------------------------------------------------------

    pub fn raycast(
        &self,
        origin: Vec3,
        dir: Vec3,
        mode: SelectionMode,
        threshold: f32,
    ) -> Option<raycast::RayHit> {
        raycast::raycast(&self.topology, origin, dir, mode, threshold, &Default::default())
    }

    // --- UV -----------------------------------------------------------------

    pub fn box_project_uvs(&mut self, faces: &[FaceId], scale: f32) {
        uv::project::box_project_uvs(&mut self.topology, faces, scale);
    }

    pub fn planar_project_uvs(&mut self, faces: &[FaceId], axis: Axis, scale: f32) {
        uv::project::planar_project_uvs(&mut self.topology, faces, axis, scale);
    }

    pub fn cylindrical_project_uvs(&mut self, faces: &[FaceId], axis_hint: Axis, use_pca: bool) {
        let __q = self.quantum();
        uv::project::cylindrical_project_uvs(&mut self.topology, __q, faces, axis_hint, use_pca);
    }

    pub fn per_face_project_uvs(&mut self, faces: &[FaceId], margin: f32) {
        uv::project::per_face_project_uvs(&mut self.topology, faces, margin);
    }

    pub fn smart_project_uvs(&mut self, faces: &[FaceId], angle_threshold_degrees: f32, island_margin: f32) {
        uv::unwrap::smart_project_uvs(&mut self.topology, faces, angle_threshold_degrees, island_margin);
    }

    pub fn sew_all_uvs(&mut self, faces: &[FaceId]) -> usize {
        uv::seam::sew_all_uvs(&mut self.topology, faces)
    }

    // --- serialization ------------------------------------------------------

    pub fn save_lime(
        &self,
        path: impl AsRef<Path>,
        transform: Option<&LimeTransform>,
        texture: Option<&LimeTexture>,
    ) -> Result<(), KernelError> {
        io::lime::save_lime(path, &self.topology, transform, texture)
    }

    pub fn load_lime(path: impl AsRef<Path>) -> Result<LimeDocument, KernelError> {
        io::lime::load_lime(path)
    }

    pub fn save_obj(&self, path: impl AsRef<Path>) -> Result<(), KernelError> {
        io::obj::save_obj(path, &self.topology)
    }

    pub fn load_obj(path: impl AsRef<Path>) -> Result<Topology, KernelError> {
        io::obj::load_obj(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_restores_pre_extrude_state() {
        let mut kernel = MeshKernel::with_topology(primitives::cube(1.0), KernelConfig::default());
        let before = kernel.topology.vertices.len();
        kernel.extrude_selected_faces(&[0], 1.0);
        assert!(kernel.topology.vertices.len() > before);
        assert!(kernel.undo());
        assert_eq!(kernel.topology.vertices.len(), before);
        assert!(kernel.redo());
        assert!(kernel.topology.vertices.len() > before);
    }

    #[test]
    fn failed_bridge_does_not_leave_a_checkpoint_behind() {
        let mut kernel = MeshKernel::with_topology(topology::fixtures::triangle(), KernelConfig::default());
        let ok = kernel.bridge_edges(0, 0, 1); // same half-edge, shares vertices -> rejected
        assert!(!ok);
        assert!(!kernel.can_undo());
    }

    #[test]
    fn load_lime_round_trip_through_kernel() {
        let kernel = MeshKernel::with_topology(primitives::cube(1.0), KernelConfig::default());
        let path = std::env::temp_dir().join("kernel_roundtrip.lime");
        kernel.save_lime(&path, None, None).unwrap();
        let doc = MeshKernel::load_lime(&path).unwrap();
        assert_eq!(doc.topology.face_count(), kernel.topology.face_count());
        let _ = std::fs::remove_file(&path);
    }
}
