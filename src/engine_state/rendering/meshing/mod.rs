//! Mesh generation, the last stage of the chunk pipeline.
//!
//! # Architecture
//! - `mesh`: turns the B fields around a chunk into its triangle list
//! - `face`: one visible block side, with per-corner ambient occlusion
//!
//! Faces between two solid blocks are culled. A face on the chunk border
//! looks at the neighbor chunk's blocks, which is why the mesh of a chunk
//! depends on the whole B neighborhood and must be recomputed when a block
//! next to the border changes.

mod face;
mod mesh;

pub use face::Face;
pub use mesh::{generate_chunk_mesh, SolidMask};
