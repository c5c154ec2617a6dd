//! # Block Side Module
//!
//! The six faces of a block. The world is z-up.

use cgmath::Vector3;

/// One of the six faces of a block.
///
/// The discriminants match the texture index order of the atlas table in
/// [`super::block_type`].
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing positive Y
    FRONT = 0,
    /// Facing negative Y
    BACK = 1,
    /// Facing negative Z
    BOTTOM = 2,
    /// Facing positive Z
    TOP = 3,
    /// Facing negative X
    LEFT = 4,
    /// Facing positive X
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Unit offset from a block to the neighbor sharing this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 1, 0),
            BlockSide::BACK => Vector3::new(0, -1, 0),
            BlockSide::BOTTOM => Vector3::new(0, 0, -1),
            BlockSide::TOP => Vector3::new(0, 0, 1),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Two unit axes spanning the face, ordered so that `u x v == normal`.
    ///
    /// Walking the corners `(-u,-v)`, `(+u,-v)`, `(+u,+v)`, `(-u,+v)` is then
    /// counter-clockwise when seen from outside the block.
    pub fn tangents(self) -> (Vector3<i32>, Vector3<i32>) {
        let x = Vector3::new(1, 0, 0);
        let y = Vector3::new(0, 1, 0);
        let z = Vector3::new(0, 0, 1);
        match self {
            BlockSide::RIGHT => (y, z),
            BlockSide::LEFT => (z, y),
            BlockSide::FRONT => (z, x),
            BlockSide::BACK => (x, z),
            BlockSide::TOP => (x, y),
            BlockSide::BOTTOM => (y, x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    #[test]
    fn test_tangents_are_right_handed() {
        for side in BlockSide::all() {
            let (u, v) = side.tangents();
            let u = u.cast::<f32>().unwrap();
            let v = v.cast::<f32>().unwrap();
            assert_eq!(u.cross(v), side.normal().cast::<f32>().unwrap(), "{:?}", side);
        }
    }

    #[test]
    fn test_normals_cancel_out() {
        let sum = BlockSide::all()
            .iter()
            .fold(Vector3::zero(), |acc, side| acc + side.normal());
        assert_eq!(sum, Vector3::new(0, 0, 0));
    }
}
