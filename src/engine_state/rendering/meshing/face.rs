use cgmath::{Point3, Vector3};

use crate::engine_state::{
    rendering::vertex::VertexData,
    voxels::{block::block_side::BlockSide, context::AtlasRect, coords::BlockCoords},
};

/// Corner offsets of a face along its tangents, counter-clockwise.
const CORNERS: [(i32, i32); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];

/// A visible side of one block.
///
/// The block occupies the unit cube centered on its coords, so the face is
/// the unit square half a block away from the center along the side normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Coords of the block the face belongs to
    pub block_coords: BlockCoords,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
    /// Light factor of each corner, in `CORNERS` order
    pub ambient_occlusion: [f32; 4],
}

impl Face {
    /// Light factor of a face corner from the three blocks touching it on the
    /// air side of the face.
    ///
    /// Two solid edge blocks hide the corner block entirely, so the corner is
    /// then fully occluded whatever the corner block is.
    pub fn corner_ambient_occlusion(side1: bool, side2: bool, corner: bool) -> f32 {
        if side1 && side2 {
            return 0.0;
        }
        let occluders = side1 as u8 + side2 as u8 + corner as u8;
        (3 - occluders) as f32 / 3.0
    }

    /// Computes the light factors of a face. `is_solid` must answer for every
    /// block touching the face corners on the air side.
    pub fn new(
        block_coords: BlockCoords,
        block_side: BlockSide,
        is_solid: impl Fn(BlockCoords) -> bool,
    ) -> Self {
        let (u, v) = block_side.tangents();
        let normal = block_side.normal();
        let air = |offset: Vector3<i32>| {
            let target = normal + offset;
            is_solid(BlockCoords::new(
                block_coords.x + target.x,
                block_coords.y + target.y,
                block_coords.z + target.z,
            ))
        };
        let ambient_occlusion = CORNERS.map(|(du, dv)| {
            Self::corner_ambient_occlusion(air(u * du), air(v * dv), air(u * du + v * dv))
        });
        Face {
            block_coords,
            block_side,
            ambient_occlusion,
        }
    }

    /// Splits the face into two triangles.
    ///
    /// The quad is cut along the diagonal joining its brightest corner pair,
    /// which keeps the occlusion gradient symmetric.
    pub fn vertices(&self, atlas_rect: AtlasRect) -> [VertexData; 6] {
        let (u, v) = self.block_side.tangents();
        let (u, v) = (to_f32(u), to_f32(v));
        let normal = to_f32(self.block_side.normal());
        let center = self.center();

        let corner_vertex = |index: usize| {
            let (du, dv) = CORNERS[index];
            let coords = center + u * (du as f32 * 0.5) + v * (dv as f32 * 0.5);
            let atlas_coords = [
                if du < 0 { atlas_rect.min[0] } else { atlas_rect.max[0] },
                if dv < 0 { atlas_rect.max[1] } else { atlas_rect.min[1] },
            ];
            VertexData::new(
                coords,
                normal,
                atlas_coords,
                atlas_rect.min,
                atlas_rect.max,
                self.ambient_occlusion[index],
            )
        };

        let [ao0, ao1, ao2, ao3] = self.ambient_occlusion;
        let order = if ao0 + ao2 < ao1 + ao3 {
            [1, 2, 3, 1, 3, 0]
        } else {
            [0, 1, 2, 0, 2, 3]
        };
        order.map(corner_vertex)
    }

    /// World-space position of the center of the face.
    pub fn center(&self) -> Point3<f32> {
        self.block_coords.to_point() + to_f32(self.block_side.normal()) * 0.5
    }
}

fn to_f32(vector: Vector3<i32>) -> Vector3<f32> {
    Vector3::new(vector.x as f32, vector.y as f32, vector.z as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn atlas() -> AtlasRect {
        AtlasRect {
            min: [0.25, 0.0],
            max: [0.5, 0.25],
        }
    }

    #[test]
    fn test_corner_occlusion_levels() {
        assert_eq!(Face::corner_ambient_occlusion(false, false, false), 1.0);
        assert_eq!(Face::corner_ambient_occlusion(false, false, true), 2.0 / 3.0);
        assert_eq!(Face::corner_ambient_occlusion(true, false, true), 1.0 / 3.0);
        assert_eq!(Face::corner_ambient_occlusion(true, true, false), 0.0);
    }

    #[test]
    fn test_isolated_face_is_fully_lit_and_counter_clockwise() {
        for side in BlockSide::all() {
            let face = Face::new(BlockCoords::new(3, -4, 5), side, |_| false);
            assert_eq!(face.ambient_occlusion, [1.0; 4]);

            let vertices = face.vertices(atlas());
            let normal = to_f32(side.normal());
            for triangle in vertices.chunks(3) {
                let a = Vector3::from(triangle[0].coords);
                let b = Vector3::from(triangle[1].coords);
                let c = Vector3::from(triangle[2].coords);
                let winding = (b - a).cross(c - a).normalize();
                assert!((winding - normal).magnitude() < 1e-5);
            }
            for vertex in vertices {
                let offset = Point3::from(vertex.coords) - face.block_coords.to_point();
                assert!((offset.dot(normal) - 0.5).abs() < 1e-6);
                assert_eq!(vertex.normal, Into::<[f32; 3]>::into(normal));
            }
        }
    }

    #[test]
    fn test_occluded_corner_flips_the_diagonal() {
        let block = BlockCoords::new(0, 0, 0);
        // Block sitting above the top face, next to corner 0.
        let occluder = BlockCoords::new(-1, -1, 1);
        let face = Face::new(block, BlockSide::TOP, |coords| coords == occluder);
        assert_eq!(face.ambient_occlusion, [2.0 / 3.0, 1.0, 1.0, 1.0]);

        let vertices = face.vertices(atlas());
        let darkest = vertices
            .iter()
            .filter(|vertex| vertex.ambient_occlusion < 1.0)
            .count();
        // The darkened corner only belongs to one of the two triangles.
        assert_eq!(darkest, 1);
    }

    #[test]
    fn test_atlas_coords_span_the_tile() {
        let face = Face::new(BlockCoords::new(0, 0, 0), BlockSide::FRONT, |_| false);
        let vertices = face.vertices(atlas());
        for vertex in vertices {
            assert_eq!(vertex.atlas_coords_min, atlas().min);
            assert_eq!(vertex.atlas_coords_max, atlas().max);
            assert!([0.25, 0.5].contains(&vertex.atlas_coords[0]));
            assert!([0.0, 0.25].contains(&vertex.atlas_coords[1]));
        }
        assert_eq!(face.center(), Point3::new(0.0, 0.5, 0.0));
    }
}
