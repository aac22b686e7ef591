//! Persisted kernel tuning constants.
//!
//! A `Serialize + Deserialize` struct loaded from / saved to a RON file
//! under the platform config directory. Not a global resource: callers
//! hold a `KernelConfig` and pass it to `MeshKernel::new`, keeping the
//! library free of global mutable state.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Tunable constants called out by the design notes as load-bearing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Scale applied before truncating a coordinate into its 20-bit slot
    /// of the position key (§3, position duplicates).
    pub position_quantum: f32,
    /// Vertex raycast hit threshold in world units.
    pub raycast_vertex_threshold: f32,
    /// Edge raycast hit threshold in world units.
    pub raycast_edge_threshold: f32,
    /// Default normal-dot threshold for merging triangle pairs into quads.
    #[serde(default = "default_merge_threshold")]
    pub merge_normal_threshold: f32,
    /// Maximum number of entries kept in the undo and redo stacks.
    #[serde(default = "default_undo_cap")]
    pub undo_cap: usize,
}

fn default_merge_threshold() -> f32 {
    0.85
}

fn default_undo_cap() -> usize {
    50
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            position_quantum: 1e4,
            raycast_vertex_threshold: 0.1,
            raycast_edge_threshold: 0.05,
            merge_normal_threshold: default_merge_threshold(),
            undo_cap: default_undo_cap(),
        }
    }
}

impl KernelConfig {
    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("lime_mesh_kernel");
            p.push("kernel.ron");
            p
        })
    }

    /// Load config from disk, falling back to defaults if absent or malformed.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(content) => ron::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save config to disk. Returns false on any I/O or serialization failure.
    pub fn save(&self) -> bool {
        let Some(path) = Self::file_path() else {
            tracing::warn!("could not determine config directory");
            return false;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!("failed to create config directory: {e}");
                return false;
            }
        }
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(content) => fs::write(&path, content).is_ok(),
            Err(e) => {
                tracing::warn!("failed to serialize kernel config: {e}");
                false
            }
        }
    }
}
