//! Lime text-format and OBJ import/export.

pub mod lime;
pub mod obj;
