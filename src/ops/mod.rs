//! Edit operators. Each function owns one mutation contract: read
//! selection/explicit inputs, mutate buffers (tombstoning where needed),
//! then re-link twins / rebuild the edge map / recompute normals.

pub mod boolean_cut;
pub mod bridge;
pub mod delete;
pub mod edge_loop;
pub mod extrude;
pub mod hollow;
pub mod inset;
pub mod normals;
pub mod transform;
