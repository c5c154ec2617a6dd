//! # Voxel Engine Core
//!
//! Chunked voxel world data and the staged pipeline that produces it.
//!
//! ## Architecture
//!
//! * **Coords**: chunk and block coordinate spaces, rects and walkers
//! * **Block**: the final value of each voxel, plus the default palette
//! * **Chunk**: per-chunk fields of each stage, and 3x3x3 neighborhoods of them
//! * **Context**: the procedural rules evaluated by the stage functions
//! * **Generation**: the PTG, PTT and B stage functions
//! * **Disk**: saving and loading B fields, one file per chunk
//! * **Grid**: the cache of every committed stage result
//! * **Tasks**: stage functions packaged for the worker pool
//! * **Generation Manager**: the scheduler deciding what runs next
//!
//! ## Data Flow
//!
//! 1. The manager picks a runnable (chunk, step) pair for the zone chunks
//! 2. The step's inputs are copied out of the grid into a task
//! 3. A worker runs the task
//! 4. The manager harvests the result on a later tick and commits it
//!
//! ## Thread Safety
//!
//! The grid is only touched by the driving thread. Workers get owned copies
//! of neighborhoods and an immutable `Arc` snapshot of the world context.

pub mod block;
pub mod chunk;
pub mod context;
pub mod coords;
pub mod disk;
pub mod generation;
pub mod generation_manager;
pub mod grid;
pub mod tasks;
