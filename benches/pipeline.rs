use criterion::{criterion_group, criterion_main, Criterion};

use voxel_pipeline::{
    engine_state::{
        rendering::meshing::generate_chunk_mesh,
        voxels::{
            block::{block_type::BlockType, Block},
            chunk::{ChunkBField, ChunkNeighborhood, ChunkPtgField},
            context::{NoiseWorldContext, WorldContext},
            coords::{ChunkRect, ChunkSide},
            generation::{generate_chunk_ptg_field, generate_chunk_ptt_field},
        },
    },
    ChunkCoords, EngineState, GenerationConfig,
};

const ORIGIN: ChunkCoords = ChunkCoords { x: 0, y: 0, z: 0 };

fn side() -> ChunkSide {
    ChunkSide::new(15).unwrap()
}

fn ptg_stage(c: &mut Criterion) {
    let context = NoiseWorldContext::new(1);
    c.bench_function("ptg field 15³", |b| {
        b.iter(|| generate_chunk_ptg_field(side(), ORIGIN, &context))
    });
}

fn ptt_stage(c: &mut Criterion) {
    let context = NoiseWorldContext::new(1);
    let ptg = ChunkNeighborhood::from_fields(
        ORIGIN,
        side(),
        ChunkRect::around(ORIGIN, 1)
            .iter()
            .map(|chunk_coords| generate_chunk_ptg_field(side(), chunk_coords, &context)),
    )
    .unwrap();
    c.bench_function("ptt field 15³", |b| {
        b.iter(|| generate_chunk_ptt_field(ORIGIN, &ptg, &context))
    });
}

fn mesh_stage(c: &mut Criterion) {
    let context = NoiseWorldContext::new(1);
    let b_field = ChunkNeighborhood::from_fields(
        ORIGIN,
        side(),
        ChunkRect::around(ORIGIN, 1).iter().map(|chunk_coords| {
            let ptg: ChunkPtgField = generate_chunk_ptg_field(side(), chunk_coords, &context);
            ChunkBField::from_fn(side(), chunk_coords, |coords| {
                if ptg[coords] > 0 {
                    Block::new(BlockType::STONE.id())
                } else {
                    Block::AIR
                }
            })
        }),
    )
    .unwrap();
    c.bench_function("mesh 15³", |b| {
        b.iter(|| generate_chunk_mesh(ORIGIN, &b_field, &context as &dyn WorldContext))
    });
}

fn whole_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.sample_size(10);
    group.bench_function("origin chunk from scratch", |b| {
        b.iter(|| {
            let mut engine_state = EngineState::new(GenerationConfig {
                generation_radius: 1.0,
                worker_count: 0,
                load_save_enabled: false,
                max_submissions_per_tick: 1024,
                ..GenerationConfig::default()
            })
            .unwrap();
            while !engine_state.zone_is_meshed() {
                engine_state.tick();
            }
        })
    });
    group.finish();
}

criterion_group!(benches, ptg_stage, ptt_stage, mesh_stage, whole_chunk);
criterion_main!(benches);
