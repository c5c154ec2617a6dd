mod common;

use std::sync::Arc;

use common::{flat_config, flat_engine, tick_until_meshed, FlatWorldContext, FACE_VERTICES, SIDE};
use voxel_pipeline::{
    engine_state::voxels::{
        block::{block_type::BlockType, AIR},
        chunk::{ChunkPtgField, ChunkPttField},
        context::WorldContext,
        coords::{ChunkRect, ChunkSide, GridCoords},
        generation_manager::ChunkGenerationManager,
        grid::ChunkGrid,
    },
    BlockCoords, ChunkCoords, ChunkGeneratingStep, EngineState, GenerationConfig,
};

const ORIGIN: ChunkCoords = ChunkCoords { x: 0, y: 0, z: 0 };

/// Top faces of the `SIDE`² blocks just under the surface.
const FLAT_CHUNK_VERTICES: usize = (SIDE * SIDE) as usize * FACE_VERTICES;

#[test]
fn origin_chunk_goes_through_every_stage() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine_state = flat_engine(flat_config(dir.path()));

    // Each tick harvests the previous stage and submits the next one:
    // 7³ PTG fields, 5³ PTT fields, 3³ B fields, then the mesh.
    let submitted: Vec<usize> = (0..5).map(|_| engine_state.tick().submitted).collect();
    assert_eq!(submitted, vec![343, 125, 27, 1, 0]);
    assert!(engine_state.zone_is_meshed());

    let mesh = engine_state.mesh(ORIGIN).unwrap();
    assert_eq!(mesh.len(), FLAT_CHUNK_VERTICES);
    for vertex in mesh {
        assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertex.coords[2], -0.5);
    }

    assert!(engine_state.block_is_air_or_unloaded(BlockCoords::new(0, 0, 0)));
    assert!(!engine_state.block_is_air_or_unloaded(BlockCoords::new(0, 0, -1)));
    // Far away chunks are not generated.
    assert!(engine_state.block_is_air_or_unloaded(BlockCoords::new(0, 0, -100)));
}

#[test]
fn noise_world_origin_chunk_after_an_empty_disk_search() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig {
        chunk_side: 15,
        generation_radius: 3.0,
        load_save_enabled: true,
        ..flat_config(dir.path())
    };
    let mut engine_state = EngineState::new(config).unwrap();
    let center = BlockCoords::new(0, 0, 0);
    assert!(engine_state.block_is_air_or_unloaded(center));

    tick_until_meshed(&mut engine_state, 20);
    assert!(!engine_state.mesh(ORIGIN).unwrap().is_empty());

    let grid = engine_state.grid();
    for chunk_coords in ChunkRect::around(ORIGIN, 1).iter() {
        assert!(!grid.disk_storage(chunk_coords).unwrap().exists);
        assert!(grid.has_b(chunk_coords));
    }
    let center_block = grid.b_field(ORIGIN).unwrap()[center];
    assert_eq!(
        engine_state.block_is_air_or_unloaded(center),
        center_block.is_air()
    );
}

#[test]
fn repeated_ticks_do_not_resubmit_in_flight_work() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine_state = flat_engine(flat_config(dir.path()));

    assert_eq!(engine_state.tick().submitted, 343);
    assert_eq!(engine_state.generation_manager().in_flight_count(), 343);
    // Nothing was harvested yet, so nothing new can be asked for.
    assert_eq!(
        engine_state.generation_manager().required_generation_step(
            engine_state.grid(),
            ORIGIN,
            ChunkGeneratingStep::Mesh
        ),
        None
    );

    let report = engine_state.tick();
    assert_eq!(report.harvested, 343);
    assert_eq!(report.discarded, 0);
    assert_eq!(report.submitted, 125);
    assert_eq!(engine_state.generation_manager().in_flight_count(), 125);
}

#[test]
fn editing_a_border_block_remeshes_both_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig {
        generation_center: [3.0, 0.0, -1.0],
        generation_radius: 0.6,
        ..flat_config(dir.path())
    };
    let mut engine_state = flat_engine(config);
    let east = ChunkCoords::new(1, 0, 0);

    tick_until_meshed(&mut engine_state, 20);
    assert_eq!(engine_state.mesh(ORIGIN).unwrap().len(), FLAT_CHUNK_VERTICES);
    assert_eq!(engine_state.mesh(east).unwrap().len(), FLAT_CHUNK_VERTICES);

    // Last block of the origin chunk along +x, right under the surface.
    let border_block = BlockCoords::new(3, 0, -1);
    let mut affected = engine_state.set_block(border_block, AIR).unwrap();
    affected.sort();
    assert_eq!(affected, vec![ORIGIN, east]);
    assert!(engine_state.block_is_air_or_unloaded(border_block));

    // The outdated meshes stay visible until their replacement lands.
    assert!(!engine_state.grid().has_mesh(ORIGIN));
    assert_eq!(engine_state.mesh(ORIGIN).unwrap().len(), FLAT_CHUNK_VERTICES);

    tick_until_meshed(&mut engine_state, 20);
    // Origin: one top face moves down a block, and the hole exposes one
    // side face on each of its three solid neighbors in the chunk.
    assert_eq!(
        engine_state.mesh(ORIGIN).unwrap().len(),
        FLAT_CHUNK_VERTICES + 3 * FACE_VERTICES
    );
    // East: the hole exposes the side of the block across the border.
    assert_eq!(
        engine_state.mesh(east).unwrap().len(),
        FLAT_CHUNK_VERTICES + FACE_VERTICES
    );

    // Same block, same type: nothing to do.
    assert!(engine_state.set_block(border_block, AIR).unwrap().is_empty());
}

#[test]
fn generation_resumes_from_a_partial_grid() {
    let dir = tempfile::tempdir().unwrap();
    let side = ChunkSide::new(SIDE).unwrap();
    let config = flat_config(dir.path());
    let context: Arc<dyn WorldContext> = Arc::new(FlatWorldContext);
    let mut manager = ChunkGenerationManager::new(&config).unwrap();
    let mut grid = ChunkGrid::new(side);

    // Some PTT fields already committed on the +x half, some PTG fields on
    // the other half, and holes everywhere else.
    for chunk_coords in ChunkRect::around(ORIGIN, 2).iter() {
        if chunk_coords.x > 0 {
            grid.insert_ptt_field(ChunkPttField::from_fn(side, chunk_coords, |coords| {
                if coords.z < 0 {
                    BlockType::STONE.id()
                } else {
                    AIR
                }
            }));
        }
    }
    for chunk_coords in ChunkRect::around(ORIGIN.offset(-1, 0, 0), 2).iter() {
        if chunk_coords.y != 0 {
            grid.insert_ptg_field(ChunkPtgField::from_fn(side, chunk_coords, |coords| {
                context.ptg_value(coords)
            }));
        }
    }

    for _ in 0..20 {
        manager.manage(&mut grid, &context);
        if grid.has_mesh(ORIGIN) {
            break;
        }
    }
    assert!(grid.has_mesh(ORIGIN));
    assert_eq!(grid.mesh(ORIGIN).unwrap().len(), FLAT_CHUNK_VERTICES);
    assert_eq!(manager.in_flight_count(), 0);
}

#[test]
fn worker_threads_produce_the_same_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let mut inline_engine = flat_engine(flat_config(dir.path()));
    tick_until_meshed(&mut inline_engine, 20);

    let mut threaded_engine = flat_engine(GenerationConfig {
        worker_count: 3,
        ..flat_config(dir.path())
    });
    tick_until_meshed(&mut threaded_engine, 10_000);

    assert_eq!(threaded_engine.mesh(ORIGIN), inline_engine.mesh(ORIGIN));
}

#[test]
fn noise_world_blocks_follow_their_types() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig {
        chunk_side: 9,
        seed: 3,
        ..flat_config(dir.path())
    };
    let mut engine_state = EngineState::new(config).unwrap();
    tick_until_meshed(&mut engine_state, 20);

    let grid = engine_state.grid();
    let ptt_field = grid.ptt_field(ORIGIN).unwrap();
    let b_field = grid.b_field(ORIGIN).unwrap();
    for (coords, block) in b_field.iter() {
        assert_eq!(block.is_air(), ptt_field[coords] == AIR);
        assert_eq!(engine_state.block_is_air_or_unloaded(coords), block.is_air());
    }
    assert_eq!(engine_state.mesh(ORIGIN).unwrap().len() % FACE_VERTICES, 0);
}

#[test]
fn edited_chunk_outside_the_zone_is_remeshed_after_a_full_queue() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig {
        generation_center: [3.0, 0.0, -1.0],
        generation_radius: 0.6,
        max_queued_tasks: 1,
        ..flat_config(dir.path())
    };
    let mut engine_state = flat_engine(config);
    let east = ChunkCoords::new(1, 0, 0);
    tick_until_meshed(&mut engine_state, 2000);
    assert!(engine_state.grid().has_mesh(east));

    // Only the origin chunk is left in the zone.
    engine_state
        .set_generation_center(cgmath::Point3::new(0.0, 0.0, -1.0))
        .unwrap();
    let affected = engine_state.set_block(BlockCoords::new(3, 0, -1), AIR).unwrap();
    assert_eq!(affected, vec![ORIGIN, east]);
    assert_eq!(engine_state.generation_manager().pending_remesh_count(), 1);

    for _ in 0..10 {
        engine_state.tick();
    }
    assert!(engine_state.grid().has_mesh(ORIGIN));
    assert!(engine_state.grid().has_mesh(east));
    assert_eq!(
        engine_state.mesh(east).unwrap().len(),
        FLAT_CHUNK_VERTICES + FACE_VERTICES
    );
    assert_eq!(engine_state.generation_manager().pending_remesh_count(), 0);
}

#[test]
fn submissions_stay_within_the_tick_budget_and_the_queue_bound() {
    let dir = tempfile::tempdir().unwrap();
    // (budget, queue bound, submissions per tick)
    for (max_submissions_per_tick, max_queued_tasks, per_tick) in [(5, 64, 5), (64, 3, 3)] {
        let mut engine_state = flat_engine(GenerationConfig {
            max_submissions_per_tick,
            max_queued_tasks,
            ..flat_config(dir.path())
        });

        let report = engine_state.tick();
        assert_eq!(report.submitted, per_tick);
        // The origin chunk, still far from having a mesh.
        assert_eq!(report.deferred, 1);

        let mut ticks = 1;
        while !engine_state.zone_is_meshed() {
            let report = engine_state.tick();
            assert!(report.submitted <= per_tick);
            ticks += 1;
            assert!(ticks < 2000, "zone not meshed after {} ticks", ticks);
        }
        assert_eq!(engine_state.mesh(ORIGIN).unwrap().len(), FLAT_CHUNK_VERTICES);
    }
}
