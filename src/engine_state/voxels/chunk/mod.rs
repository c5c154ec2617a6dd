//! # Chunk Module
//!
//! Per-chunk data layers. Each stage of the generation pipeline produces one
//! [`ChunkField`] per chunk, and each stage reads a [`ChunkNeighborhood`] of
//! the previous stage's fields.
//!
//! ## Fields
//! - PTG (Plain Terrain Generation): raw signed generation signal
//! - PTT (Plain Terrain Typing): block type ids before placement rules
//! - B: the actual blocks of the chunk

pub mod field;
pub mod neighborhood;

pub use field::{
    BFieldValue, ChunkBField, ChunkField, ChunkPtgField, ChunkPttField, PtgFieldValue,
    PttFieldValue,
};
pub use neighborhood::{ChunkNeighborhood, NEIGHBORHOOD_SIZE};
