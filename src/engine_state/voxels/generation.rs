//! # Stage Functions
//!
//! The three field-producing stages of the pipeline. Each one is pure: it
//! reads an owned neighborhood of the previous stage and the world context,
//! and returns a new field for the center chunk. The mesh stage lives in
//! `rendering::meshing`.

use super::{
    chunk::{ChunkBField, ChunkNeighborhood, ChunkPtgField, ChunkPttField, PtgFieldValue, PttFieldValue},
    context::WorldContext,
    coords::{ChunkCoords, ChunkSide},
};

/// Generates the PTG field of a chunk. It has no previous stage to read.
pub fn generate_chunk_ptg_field(
    side: ChunkSide,
    chunk_coords: ChunkCoords,
    context: &dyn WorldContext,
) -> ChunkPtgField {
    ChunkPtgField::from_fn(side, chunk_coords, |coords| context.ptg_value(coords))
}

/// Generates the PTT field of a chunk from the PTG fields around it.
///
/// # Panics
/// Panics if `ptg` is not centered on `chunk_coords`.
pub fn generate_chunk_ptt_field(
    chunk_coords: ChunkCoords,
    ptg: &ChunkNeighborhood<PtgFieldValue>,
    context: &dyn WorldContext,
) -> ChunkPttField {
    assert_eq!(ptg.center(), chunk_coords, "PTG neighborhood off center");
    ChunkPttField::from_fn(ptg.side(), chunk_coords, |coords| {
        context.ptt_value(coords, ptg)
    })
}

/// Generates the B field of a chunk from the PTT fields around it.
///
/// # Panics
/// Panics if `ptt` is not centered on `chunk_coords`.
pub fn generate_chunk_b_field(
    chunk_coords: ChunkCoords,
    ptt: &ChunkNeighborhood<PttFieldValue>,
    context: &dyn WorldContext,
) -> ChunkBField {
    assert_eq!(ptt.center(), chunk_coords, "PTT neighborhood off center");
    ChunkBField::from_fn(ptt.side(), chunk_coords, |coords| context.b_value(coords, ptt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::{block_type::BlockType, AIR},
        context::NoiseWorldContext,
        coords::{BlockCoords, ChunkRect, GridCoords},
    };

    fn side() -> ChunkSide {
        ChunkSide::new(15).unwrap()
    }

    fn ptg_neighborhood(
        center: ChunkCoords,
        context: &dyn WorldContext,
    ) -> ChunkNeighborhood<PtgFieldValue> {
        let fields = ChunkRect::around(center, 1)
            .iter()
            .map(|chunk_coords| generate_chunk_ptg_field(side(), chunk_coords, context));
        ChunkNeighborhood::from_fields(center, side(), fields).unwrap()
    }

    #[test]
    fn test_ptg_field_matches_context() {
        let context = NoiseWorldContext::new(11);
        let chunk_coords = ChunkCoords::new(2, -1, 0);
        let field = generate_chunk_ptg_field(side(), chunk_coords, &context);
        for (coords, value) in field.iter() {
            assert_eq!(*value, context.ptg_value(coords));
        }
    }

    #[test]
    fn test_stages_are_deterministic() {
        let context = NoiseWorldContext::new(5);
        let center = ChunkCoords::new(0, 0, 0);
        let ptg = ptg_neighborhood(center, &context);
        let first = generate_chunk_ptt_field(center, &ptg, &context);
        let second = generate_chunk_ptt_field(center, &ptg.clone(), &context);
        assert_eq!(first, second);
    }

    #[test]
    fn test_b_field_caps_columns_with_primary_type() {
        let context = NoiseWorldContext::new(8);
        let center = ChunkCoords::new(0, 0, 0);
        let ptt_fields = ChunkRect::around(center, 1).iter().map(|chunk_coords| {
            let ptg = ptg_neighborhood(chunk_coords, &context);
            generate_chunk_ptt_field(chunk_coords, &ptg, &context)
        });
        let ptt = ChunkNeighborhood::from_fields(center, side(), ptt_fields).unwrap();
        let b_field = generate_chunk_b_field(center, &ptt, &context);

        for (coords, block) in b_field.iter() {
            let type_id = ptt[coords];
            let above = ptt[coords.offset(0, 0, 1)];
            if type_id == AIR {
                assert!(block.is_air());
            } else if above == AIR {
                assert_eq!(block.type_id, context.primary_block_type());
            } else {
                assert_eq!(block.type_id, type_id);
            }
        }
    }

    #[test]
    fn test_ptt_reads_across_the_chunk_border() {
        let context = NoiseWorldContext::new(1);
        let center = ChunkCoords::new(0, 0, 0);
        let mut ptg = ptg_neighborhood(center, &context);
        // Solid everywhere except the bottom layer of the chunk above.
        let top_of_center = side().chunk_most_positiveward_block_coords(center).z;
        let block_rect = ptg.block_rect();
        for coords in block_rect.iter() {
            ptg[coords] = if coords.z == top_of_center + 1 { 0 } else { 100 };
        }
        let ptt = generate_chunk_ptt_field(center, &ptg, &context);
        let top = BlockCoords::new(0, 0, top_of_center);
        let deep = BlockCoords::new(0, 0, top_of_center - 5);
        assert_eq!(ptt[top], BlockType::DIRT.id());
        assert_eq!(ptt[deep], BlockType::STONE.id());
    }

    #[test]
    #[should_panic(expected = "off center")]
    fn test_mismatched_neighborhood_panics() {
        let context = NoiseWorldContext::new(0);
        let ptg = ptg_neighborhood(ChunkCoords::new(0, 0, 0), &context);
        generate_chunk_ptt_field(ChunkCoords::new(1, 0, 0), &ptg, &context);
    }
}
