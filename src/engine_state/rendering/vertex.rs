//! Vertex data handed to the renderer.

use cgmath::{Point3, Vector3};

/// A vertex of a chunk mesh.
///
/// Meshes are plain triangle lists: every three vertices form one triangle,
/// wound counter-clockwise when seen from outside the block.
///
/// # Memory Layout
/// - Coords: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Atlas Coordinates: [f32; 2] (8 bytes)
/// - Atlas Tile Min: [f32; 2] (8 bytes)
/// - Atlas Tile Max: [f32; 2] (8 bytes)
/// - Ambient Occlusion: f32 (4 bytes)
///
/// Total size: 52 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexData {
    /// Position in world space, in blocks
    pub coords: [f32; 3],
    /// Unit normal of the face the vertex belongs to
    pub normal: [f32; 3],
    /// Texture coordinates in the atlas
    pub atlas_coords: [f32; 2],
    /// Corner of the atlas tile with the lowest coordinates, for tiling in the shader
    pub atlas_coords_min: [f32; 2],
    /// Corner of the atlas tile with the highest coordinates
    pub atlas_coords_max: [f32; 2],
    /// Light factor, 1.0 is fully lit and 0.0 fully occluded
    pub ambient_occlusion: f32,
}

impl VertexData {
    pub fn new(
        coords: Point3<f32>,
        normal: Vector3<f32>,
        atlas_coords: [f32; 2],
        atlas_coords_min: [f32; 2],
        atlas_coords_max: [f32; 2],
        ambient_occlusion: f32,
    ) -> Self {
        VertexData {
            coords: coords.into(),
            normal: normal.into(),
            atlas_coords,
            atlas_coords_min,
            atlas_coords_max,
            ambient_occlusion,
        }
    }
}

/// Mesh of one chunk, as consumed by the renderer.
pub type ChunkMeshData = Vec<VertexData>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<VertexData>(), 52);
        let vertex = VertexData::new(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 0.0, 1.0),
            [0.25, 0.5],
            [0.0, 0.5],
            [0.25, 0.75],
            1.0,
        );
        let words: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&vertex));
        assert_eq!(words[0..3], [1.0, 2.0, 3.0]);
        assert_eq!(words[12], 1.0);
    }
}
