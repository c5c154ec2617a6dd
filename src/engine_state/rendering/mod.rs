//! Renderer-facing side of the pipeline.
//!
//! Drawing is left to the embedding application. This module produces what
//! it consumes: one triangle list of `VertexData` per chunk, generated by the
//! mesh stage on worker threads.

pub mod meshing;
pub mod tasks;
pub mod vertex;

// Re-export commonly used types
pub use vertex::{ChunkMeshData, VertexData};
