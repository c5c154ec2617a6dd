//! # Grid Geometry
//!
//! Pure coordinate math for the chunked world: the chunk-level and
//! block-level integer coordinate spaces, the conversions between them, and
//! inclusive rectangles over either space with a restartable walker.
//!
//! Chunk sides are odd, so every chunk has a center block. The chunk at
//! chunk coords `c` is centered on the block `c * side` and spans `side / 2`
//! blocks in every direction around it.

use std::{fmt::Debug, hash::Hash};

use cgmath::Point3;
use log::warn;

use crate::core::{Error, Result};

/// Smallest chunk side that is not flagged as suspicious.
pub const RECOMMENDED_MIN_CHUNK_SIDE: i32 = 15;

/// Shared behavior of the two integer coordinate spaces.
pub trait GridCoords: Copy + Eq + Ord + Hash + Debug {
    fn from_xyz(x: i32, y: i32, z: i32) -> Self;
    fn xyz(self) -> [i32; 3];

    /// Returns these coords moved by the given amount along each axis.
    fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        let [x, y, z] = self.xyz();
        Self::from_xyz(x + dx, y + dy, z + dz)
    }
}

macro_rules! grid_coords {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            pub x: i32,
            pub y: i32,
            pub z: i32,
        }

        impl $name {
            pub const fn new(x: i32, y: i32, z: i32) -> Self {
                Self { x, y, z }
            }
        }

        impl GridCoords for $name {
            fn from_xyz(x: i32, y: i32, z: i32) -> Self {
                Self { x, y, z }
            }

            fn xyz(self) -> [i32; 3] {
                [self.x, self.y, self.z]
            }
        }

        impl From<$name> for Point3<i32> {
            fn from(coords: $name) -> Self {
                Point3::new(coords.x, coords.y, coords.z)
            }
        }

        impl From<Point3<i32>> for $name {
            fn from(point: Point3<i32>) -> Self {
                Self::new(point.x, point.y, point.z)
            }
        }
    };
}

grid_coords!(
    /// Coords of a chunk in chunk space.
    ChunkCoords
);

grid_coords!(
    /// Coords of a block in world space.
    BlockCoords
);

impl BlockCoords {
    pub fn to_point(self) -> Point3<f32> {
        Point3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Axis-aligned inclusive rectangle over one of the coordinate spaces.
///
/// `min` is the most negativeward corner and `max` the most positiveward one.
/// A rect with `min > max` along any axis is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect<C> {
    pub min: C,
    pub max: C,
}

pub type ChunkRect = Rect<ChunkCoords>;
pub type BlockRect = Rect<BlockCoords>;

impl<C: GridCoords> Rect<C> {
    /// Creates the smallest rect containing both corners, in any order.
    pub fn new(a: C, b: C) -> Self {
        let [ax, ay, az] = a.xyz();
        let [bx, by, bz] = b.xyz();
        Self {
            min: C::from_xyz(ax.min(bx), ay.min(by), az.min(bz)),
            max: C::from_xyz(ax.max(bx), ay.max(by), az.max(bz)),
        }
    }

    /// Creates the cube of the given radius centered on `center`.
    pub fn around(center: C, radius: i32) -> Self {
        Self {
            min: center.offset(-radius, -radius, -radius),
            max: center.offset(radius, radius, radius),
        }
    }

    pub fn is_empty(&self) -> bool {
        let min = self.min.xyz();
        let max = self.max.xyz();
        (0..3).any(|axis| min[axis] > max[axis])
    }

    pub fn contains(&self, coords: C) -> bool {
        let min = self.min.xyz();
        let max = self.max.xyz();
        let coords = coords.xyz();
        (0..3).all(|axis| min[axis] <= coords[axis] && coords[axis] <= max[axis])
    }

    pub fn contains_rect(&self, other: &Rect<C>) -> bool {
        other.is_empty() || (self.contains(other.min) && self.contains(other.max))
    }

    /// Number of coords along each axis.
    pub fn size(&self) -> [i32; 3] {
        let min = self.min.xyz();
        let max = self.max.xyz();
        [0, 1, 2].map(|axis| (max[axis] - min[axis] + 1).max(0))
    }

    pub fn volume(&self) -> usize {
        self.size().iter().map(|&len| len as usize).product()
    }

    /// Returns the rect grown by `margin` coords on every face.
    pub fn expanded(&self, margin: i32) -> Self {
        Self {
            min: self.min.offset(-margin, -margin, -margin),
            max: self.max.offset(margin, margin, margin),
        }
    }

    /// First position of the walker, the most negativeward corner.
    pub fn walker_start(&self) -> C {
        self.min
    }

    /// Moves the walker to the next position in scan order (x fastest, then
    /// y, then z).
    ///
    /// Returns `false` once the walker has passed the last position, in which
    /// case the walker is left on the last position. Restarting is done by
    /// calling `walker_start` again.
    pub fn walker_iterate(&self, walker: &mut C) -> bool {
        let min = self.min.xyz();
        let max = self.max.xyz();
        let mut coords = walker.xyz();
        for axis in 0..3 {
            if coords[axis] < max[axis] {
                coords[axis] += 1;
                *walker = C::from_xyz(coords[0], coords[1], coords[2]);
                return true;
            }
            coords[axis] = min[axis];
        }
        false
    }

    /// Iterates over every coords of the rect in walker order.
    pub fn iter(&self) -> RectWalker<C> {
        RectWalker {
            rect: *self,
            next: (!self.is_empty()).then(|| self.walker_start()),
        }
    }
}

impl<C: GridCoords> IntoIterator for Rect<C> {
    type Item = C;
    type IntoIter = RectWalker<C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator form of the rect walker.
#[derive(Clone, Debug)]
pub struct RectWalker<C> {
    rect: Rect<C>,
    next: Option<C>,
}

impl<C: GridCoords> Iterator for RectWalker<C> {
    type Item = C;

    fn next(&mut self) -> Option<C> {
        let current = self.next?;
        let mut walker = current;
        self.next = self.rect.walker_iterate(&mut walker).then_some(walker);
        Some(current)
    }
}

/// Edge length of the chunks of one world, in blocks.
///
/// It is fixed for the lifetime of a grid, since every field is sized after
/// it. All conversions between chunk space and block space go through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkSide(i32);

impl ChunkSide {
    pub fn new(side: i32) -> Result<Self> {
        if side < 3 || side % 2 == 0 {
            return Err(Error::InvalidChunkSide(side));
        }
        if side < RECOMMENDED_MIN_CHUNK_SIDE {
            warn!(
                "Chunk side {} is below the recommended minimum of {}",
                side, RECOMMENDED_MIN_CHUNK_SIDE
            );
        }
        Ok(Self(side))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// Number of blocks between the center of a chunk and its faces.
    pub fn half(self) -> i32 {
        self.0 / 2
    }

    /// Number of blocks in one chunk.
    pub fn volume(self) -> usize {
        let side = self.0 as usize;
        side * side * side
    }

    /// Coords of the block at the center of the given chunk.
    pub fn chunk_center_coords(self, chunk_coords: ChunkCoords) -> BlockCoords {
        BlockCoords::new(
            chunk_coords.x * self.0,
            chunk_coords.y * self.0,
            chunk_coords.z * self.0,
        )
    }

    pub fn chunk_most_negativeward_block_coords(self, chunk_coords: ChunkCoords) -> BlockCoords {
        let half = self.half();
        self.chunk_center_coords(chunk_coords)
            .offset(-half, -half, -half)
    }

    pub fn chunk_most_positiveward_block_coords(self, chunk_coords: ChunkCoords) -> BlockCoords {
        let half = self.half();
        self.chunk_center_coords(chunk_coords).offset(half, half, half)
    }

    /// The block rect that contains exactly the blocks of the given chunk.
    pub fn chunk_block_rect(self, chunk_coords: ChunkCoords) -> BlockRect {
        Rect {
            min: self.chunk_most_negativeward_block_coords(chunk_coords),
            max: self.chunk_most_positiveward_block_coords(chunk_coords),
        }
    }

    /// The block rect that contains exactly the blocks of the given chunks.
    pub fn chunk_rect_block_rect(self, chunk_rect: ChunkRect) -> BlockRect {
        Rect {
            min: self.chunk_most_negativeward_block_coords(chunk_rect.min),
            max: self.chunk_most_positiveward_block_coords(chunk_rect.max),
        }
    }

    /// Coords of the chunk that contains the given block.
    pub fn containing_chunk_coords(self, coords: BlockCoords) -> ChunkCoords {
        let half = self.half();
        ChunkCoords::new(
            (coords.x + half).div_euclid(self.0),
            (coords.y + half).div_euclid(self.0),
            (coords.z + half).div_euclid(self.0),
        )
    }

    /// Coords of the chunk that contains the given point.
    ///
    /// Block `b` occupies the unit cube centered on `b`, so the point is
    /// first rounded to the block it lies in.
    pub fn containing_chunk_coords_of_point(self, point: Point3<f32>) -> ChunkCoords {
        self.containing_chunk_coords(BlockCoords::new(
            point.x.round() as i32,
            point.y.round() as i32,
            point.z.round() as i32,
        ))
    }

    /// The chunk rect of all the chunks that intersect the given block rect.
    pub fn containing_chunk_rect(self, block_rect: BlockRect) -> ChunkRect {
        Rect {
            min: self.containing_chunk_coords(block_rect.min),
            max: self.containing_chunk_coords(block_rect.max),
        }
    }

    /// Offset of a block inside the flat storage of its chunk, or `None` if
    /// the block does not belong to that chunk.
    ///
    /// Values are laid out x fastest, then y, then z.
    pub fn local_index(self, chunk_coords: ChunkCoords, coords: BlockCoords) -> Option<usize> {
        let origin = self.chunk_most_negativeward_block_coords(chunk_coords);
        let local = [
            coords.x - origin.x,
            coords.y - origin.y,
            coords.z - origin.z,
        ];
        if local.iter().any(|&value| value < 0 || value >= self.0) {
            return None;
        }
        let side = self.0 as usize;
        Some(local[0] as usize + side * (local[1] as usize + side * local[2] as usize))
    }
}
