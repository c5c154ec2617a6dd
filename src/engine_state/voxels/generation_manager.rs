//! # Chunk Generation Manager
//!
//! The scheduler of the pipeline. Each tick it harvests the results of the
//! steps that finished on the workers, commits them into the grid, then
//! walks the chunks of the generation zone and submits whatever step brings
//! them closer to having a mesh.
//!
//! ## Steps
//! ```text
//! PTG_FIELD -> PTT_FIELD -> (DISK_SEARCH -> DISK_READ | B_FIELD) -> MESH
//! ```
//! A step of a chunk needs the previous step committed on the chunk and on
//! its 26 neighbors. The disk branch is tried first when saving is enabled;
//! a chunk read from disk skips PTG and PTT, though its neighbors may still
//! need them for their own B field.
//!
//! ## Per step state
//! Not started, then in flight (a record holds the task handle), then
//! committed into the grid. In-flight steps always run to completion, even if
//! their chunk left the zone: the result is cached, never evicted.

use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
    sync::Arc,
};

use cgmath::{MetricSpace, Point3};
use log::{debug, trace, warn};
use web_time::Instant;

use crate::{
    core::{Error, GenerationConfig, Result},
    engine_state::{
        rendering::tasks::ChunkMeshGenerationTask,
        task_management::{task::TaskHandle, BoxedTask, TaskManager},
    },
};

use super::{
    block::BlockTypeId,
    context::WorldContext,
    coords::{BlockCoords, BlockRect, ChunkCoords, ChunkRect},
    disk::{chunk_file_path, ChunkDiskStorage},
    grid::ChunkGrid,
    tasks::{
        ChunkBFieldTask, ChunkPtgFieldTask, ChunkPttFieldTask, DiskReadTask, DiskSearchTask,
        SomeChunkData,
    },
};

/// One step of the generation pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChunkGeneratingStep {
    PtgField,
    PttField,
    DiskSearch,
    DiskRead,
    BField,
    Mesh,
}

/// A step submitted to the workers and not harvested yet.
#[derive(Clone, Copy, Debug)]
struct InFlightRecord {
    chunk_coords: ChunkCoords,
    step: ChunkGeneratingStep,
    handle: TaskHandle,
    /// Mesh epoch of the chunk at submission time.
    mesh_epoch: u64,
}

/// What one call to [`ChunkGenerationManager::manage`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManageReport {
    /// Results taken from the workers.
    pub harvested: usize,
    /// Harvested results dropped because they were outdated or redundant.
    pub discarded: usize,
    /// Steps submitted to the workers.
    pub submitted: usize,
    /// Zone chunks left for the next tick because submissions stopped early.
    pub deferred: usize,
}

/// Outcome of the dependency walk for one (chunk, step) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolution {
    /// Committed, or nothing left to do.
    Satisfied,
    /// Only in-flight work stands in the way.
    Waiting,
    Runnable(ChunkCoords, ChunkGeneratingStep),
}

/// Largest accepted generation radius, in blocks.
pub const MAX_GENERATION_RADIUS: f32 = 4096.0;

/// Largest accepted distance of the generation center from the origin along
/// any axis, in blocks. Keeps every block of the zone inside the `i32` range.
pub const MAX_GENERATION_CENTER: f32 = 1.0e9;

/// Resolutions computed during one tick.
///
/// Only `Satisfied` and `Waiting` are stored. Nothing is harvested in the
/// middle of a tick, and submitting only turns runnable pairs into waiting
/// ones, so both stay true until the next harvest.
#[derive(Default)]
struct ResolutionCache {
    resolutions: HashMap<(ChunkCoords, ChunkGeneratingStep), Resolution>,
    /// Pairs actually resolved, cache misses only.
    evaluations: usize,
}

fn check_generation_zone(generation_center: Point3<f32>, generation_radius: f32) -> Result<()> {
    let center_ok = [generation_center.x, generation_center.y, generation_center.z]
        .iter()
        .all(|coord| coord.is_finite() && coord.abs() <= MAX_GENERATION_CENTER);
    let radius_ok = generation_radius.is_finite()
        && (0.0..=MAX_GENERATION_RADIUS).contains(&generation_radius);
    if center_ok && radius_ok {
        Ok(())
    } else {
        Err(Error::InvalidGenerationZone {
            center: [generation_center.x, generation_center.y, generation_center.z],
            radius: generation_radius,
        })
    }
}

pub struct ChunkGenerationManager {
    generation_center: Point3<f32>,
    generation_radius: f32,
    generation_enabled: bool,
    load_save_enabled: bool,
    save_directory: PathBuf,
    max_submissions_per_tick: usize,
    task_manager: TaskManager<SomeChunkData>,
    /// In-flight records, in submission order.
    generating_data: Vec<InFlightRecord>,
    /// Mesh epoch of the latest submission of each in-flight pair.
    in_flight_index: HashMap<(ChunkCoords, ChunkGeneratingStep), u64>,
    /// Chunks edited by `set_block` whose mesh is not resubmitted yet.
    pending_remeshes: BTreeSet<ChunkCoords>,
}

impl ChunkGenerationManager {
    /// Creates the manager and its worker pool.
    ///
    /// # Errors
    /// Returns `Error::InvalidGenerationZone` if the zone is not finite or too
    /// large, or `Error::Io` if a worker thread cannot be spawned.
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let [x, y, z] = config.generation_center;
        let generation_center = Point3::new(x, y, z);
        check_generation_zone(generation_center, config.generation_radius)?;
        Ok(ChunkGenerationManager {
            generation_center,
            generation_radius: config.generation_radius,
            generation_enabled: config.generation_enabled,
            load_save_enabled: config.load_save_enabled,
            save_directory: config.save_directory.clone(),
            max_submissions_per_tick: config.max_submissions_per_tick,
            task_manager: TaskManager::new(config.worker_count, config.max_queued_tasks)?,
            generating_data: Vec::new(),
            in_flight_index: HashMap::new(),
            pending_remeshes: BTreeSet::new(),
        })
    }

    pub fn generation_center(&self) -> Point3<f32> {
        self.generation_center
    }

    /// # Errors
    /// Returns `Error::InvalidGenerationZone` for a non-finite or far away
    /// center. The previous center is kept.
    pub fn set_generation_center(&mut self, generation_center: Point3<f32>) -> Result<()> {
        check_generation_zone(generation_center, self.generation_radius)?;
        self.generation_center = generation_center;
        Ok(())
    }

    pub fn generation_radius(&self) -> f32 {
        self.generation_radius
    }

    /// # Errors
    /// Returns `Error::InvalidGenerationZone` for a negative, non-finite or
    /// too large radius. The previous radius is kept.
    pub fn set_generation_radius(&mut self, generation_radius: f32) -> Result<()> {
        check_generation_zone(self.generation_center, generation_radius)?;
        self.generation_radius = generation_radius;
        Ok(())
    }

    pub fn set_generation_enabled(&mut self, generation_enabled: bool) {
        self.generation_enabled = generation_enabled;
    }

    pub fn set_load_save_enabled(&mut self, load_save_enabled: bool) {
        self.load_save_enabled = load_save_enabled;
    }

    pub fn save_directory(&self) -> &Path {
        &self.save_directory
    }

    /// Number of edited chunks still waiting for their mesh to be resubmitted.
    pub fn pending_remesh_count(&self) -> usize {
        self.pending_remeshes.len()
    }

    /// Number of submitted steps not harvested yet.
    pub fn in_flight_count(&self) -> usize {
        self.generating_data.len()
    }

    /// Whether an up to date submission of this step is in flight.
    ///
    /// A mesh submitted before the chunk's latest block edit does not count.
    pub fn is_in_flight(
        &self,
        grid: &ChunkGrid,
        chunk_coords: ChunkCoords,
        step: ChunkGeneratingStep,
    ) -> bool {
        match self.in_flight_index.get(&(chunk_coords, step)) {
            None => false,
            Some(&epoch) => {
                step != ChunkGeneratingStep::Mesh || epoch == grid.mesh_epoch(chunk_coords)
            }
        }
    }

    fn is_committed(grid: &ChunkGrid, chunk_coords: ChunkCoords, step: ChunkGeneratingStep) -> bool {
        match step {
            ChunkGeneratingStep::PtgField => grid.has_ptg(chunk_coords),
            ChunkGeneratingStep::PttField => grid.has_ptt(chunk_coords),
            ChunkGeneratingStep::DiskSearch => grid.has_disk_storage(chunk_coords),
            ChunkGeneratingStep::DiskRead | ChunkGeneratingStep::BField => grid.has_b(chunk_coords),
            ChunkGeneratingStep::Mesh => grid.has_mesh(chunk_coords),
        }
    }

    /// Whether the step still has to be submitted for the chunk: it is
    /// neither committed nor in flight.
    pub fn needs_generation_step(
        &self,
        grid: &ChunkGrid,
        chunk_coords: ChunkCoords,
        step: ChunkGeneratingStep,
    ) -> bool {
        !Self::is_committed(grid, chunk_coords, step)
            && !self.is_in_flight(grid, chunk_coords, step)
    }

    /// Finds a step that can be submitted right now and brings `chunk_coords`
    /// closer to having `target_step` committed.
    ///
    /// The dependency chain is walked backwards, neighbors in walker order,
    /// and the first runnable pair is returned. Its prerequisites are all
    /// committed. Returns `None` when the target is committed, or when only
    /// in-flight work stands in the way; the caller retries on a later tick.
    pub fn required_generation_step(
        &self,
        grid: &ChunkGrid,
        chunk_coords: ChunkCoords,
        target_step: ChunkGeneratingStep,
    ) -> Option<(ChunkCoords, ChunkGeneratingStep)> {
        self.find_runnable(grid, chunk_coords, target_step, &mut ResolutionCache::default())
    }

    fn find_runnable(
        &self,
        grid: &ChunkGrid,
        chunk_coords: ChunkCoords,
        target_step: ChunkGeneratingStep,
        cache: &mut ResolutionCache,
    ) -> Option<(ChunkCoords, ChunkGeneratingStep)> {
        match self.resolve(grid, chunk_coords, target_step, cache) {
            Resolution::Runnable(chunk_coords, step) => Some((chunk_coords, step)),
            Resolution::Satisfied | Resolution::Waiting => None,
        }
    }

    fn resolve(
        &self,
        grid: &ChunkGrid,
        chunk_coords: ChunkCoords,
        step: ChunkGeneratingStep,
        cache: &mut ResolutionCache,
    ) -> Resolution {
        let key = (chunk_coords, step);
        if let Some(&resolution) = cache.resolutions.get(&key) {
            return resolution;
        }
        cache.evaluations += 1;
        let resolution = self.resolve_uncached(grid, chunk_coords, step, cache);
        if !matches!(resolution, Resolution::Runnable(..)) {
            cache.resolutions.insert(key, resolution);
        }
        resolution
    }

    fn resolve_uncached(
        &self,
        grid: &ChunkGrid,
        chunk_coords: ChunkCoords,
        step: ChunkGeneratingStep,
        cache: &mut ResolutionCache,
    ) -> Resolution {
        use ChunkGeneratingStep::*;

        if Self::is_committed(grid, chunk_coords, step) {
            return Resolution::Satisfied;
        }
        if self.is_in_flight(grid, chunk_coords, step) {
            return Resolution::Waiting;
        }

        match step {
            PtgField | DiskSearch => Resolution::Runnable(chunk_coords, step),
            PttField => self.resolve_neighborhood(grid, chunk_coords, PtgField, PttField, cache),
            DiskRead => match grid.disk_storage(chunk_coords) {
                None => self.resolve(grid, chunk_coords, DiskSearch, cache),
                Some(storage) if storage.exists => Resolution::Runnable(chunk_coords, DiskRead),
                Some(_) => Resolution::Satisfied,
            },
            BField => {
                let disk_busy = [DiskSearch, DiskRead]
                    .iter()
                    .any(|&disk_step| self.is_in_flight(grid, chunk_coords, disk_step));
                if disk_busy {
                    return Resolution::Waiting;
                }
                if self.load_save_enabled {
                    match grid.disk_storage(chunk_coords) {
                        None => return Resolution::Runnable(chunk_coords, DiskSearch),
                        Some(storage) if storage.exists => {
                            return Resolution::Runnable(chunk_coords, DiskRead)
                        }
                        Some(_) => {}
                    }
                }
                self.resolve_neighborhood(grid, chunk_coords, PttField, BField, cache)
            }
            Mesh => self.resolve_neighborhood(grid, chunk_coords, BField, Mesh, cache),
        }
    }

    /// Resolves `prerequisite` on the 27 chunks around `center`, and `step`
    /// on `center` once they are all satisfied.
    fn resolve_neighborhood(
        &self,
        grid: &ChunkGrid,
        center: ChunkCoords,
        prerequisite: ChunkGeneratingStep,
        step: ChunkGeneratingStep,
        cache: &mut ResolutionCache,
    ) -> Resolution {
        let mut waiting = false;
        for chunk_coords in ChunkRect::around(center, 1).iter() {
            match self.resolve(grid, chunk_coords, prerequisite, cache) {
                Resolution::Satisfied => {}
                Resolution::Waiting => waiting = true,
                runnable => return runnable,
            }
        }
        if waiting {
            Resolution::Waiting
        } else {
            Resolution::Runnable(center, step)
        }
    }

    /// Chunks of the generation zone, nearest first.
    ///
    /// A chunk belongs to the zone if any of its blocks is within the
    /// generation radius of the generation center.
    pub fn generation_zone(&self, grid: &ChunkGrid) -> Vec<ChunkCoords> {
        let side = grid.side();
        let center = self.generation_center;
        let radius = self.generation_radius.max(0.0);
        let block_rect = BlockRect::new(
            BlockCoords::new(
                (center.x - radius).floor() as i32,
                (center.y - radius).floor() as i32,
                (center.z - radius).floor() as i32,
            ),
            BlockCoords::new(
                (center.x + radius).ceil() as i32,
                (center.y + radius).ceil() as i32,
                (center.z + radius).ceil() as i32,
            ),
        );

        let mut zone: Vec<(f32, ChunkCoords)> = side
            .containing_chunk_rect(block_rect)
            .iter()
            .filter_map(|chunk_coords| {
                let chunk_rect = side.chunk_block_rect(chunk_coords);
                // Block b covers the unit cube centered on b.
                let closest = Point3::new(
                    center.x.clamp(chunk_rect.min.x as f32 - 0.5, chunk_rect.max.x as f32 + 0.5),
                    center.y.clamp(chunk_rect.min.y as f32 - 0.5, chunk_rect.max.y as f32 + 0.5),
                    center.z.clamp(chunk_rect.min.z as f32 - 0.5, chunk_rect.max.z as f32 + 0.5),
                );
                (closest.distance(center) <= radius).then(|| {
                    let chunk_center = side.chunk_center_coords(chunk_coords).to_point();
                    (chunk_center.distance(center), chunk_coords)
                })
            })
            .collect();
        zone.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        zone.into_iter().map(|(_, chunk_coords)| chunk_coords).collect()
    }

    /// Builds the task of a step from copies of the grid data it reads, and
    /// publishes it.
    fn submit(
        &mut self,
        grid: &ChunkGrid,
        context: &Arc<dyn WorldContext>,
        chunk_coords: ChunkCoords,
        step: ChunkGeneratingStep,
    ) -> Result<()> {
        let task: BoxedTask<SomeChunkData> = match step {
            ChunkGeneratingStep::PtgField => Box::new(ChunkPtgFieldTask::new(
                grid.side(),
                chunk_coords,
                context.clone(),
            )),
            ChunkGeneratingStep::PttField => Box::new(ChunkPttFieldTask::new(
                grid.get_ptg_neighborhood(chunk_coords),
                context.clone(),
            )),
            ChunkGeneratingStep::DiskSearch => Box::new(DiskSearchTask::new(
                self.save_directory.clone(),
                chunk_coords,
            )),
            ChunkGeneratingStep::DiskRead => {
                let storage = grid
                    .disk_storage(chunk_coords)
                    .cloned()
                    .unwrap_or_else(|| ChunkDiskStorage {
                        chunk_coords,
                        exists: true,
                        path: chunk_file_path(&self.save_directory, chunk_coords),
                    });
                Box::new(DiskReadTask::new(storage, grid.side()))
            }
            ChunkGeneratingStep::BField => Box::new(ChunkBFieldTask::new(
                grid.get_ptt_neighborhood(chunk_coords),
                context.clone(),
            )),
            ChunkGeneratingStep::Mesh => Box::new(ChunkMeshGenerationTask::new(
                grid.get_b_neighborhood(chunk_coords),
                context.clone(),
            )),
        };

        let handle = self.task_manager.publish_task(task)?;
        let mesh_epoch = grid.mesh_epoch(chunk_coords);
        self.generating_data.push(InFlightRecord {
            chunk_coords,
            step,
            handle,
            mesh_epoch,
        });
        self.in_flight_index.insert((chunk_coords, step), mesh_epoch);
        trace!("Submitted {:?} for chunk {:?}", step, chunk_coords);
        Ok(())
    }

    /// Commits a harvested result. Returns `false` if it was dropped.
    fn commit(grid: &mut ChunkGrid, record: &InFlightRecord, data: SomeChunkData) -> bool {
        match data {
            SomeChunkData::PtgField(field) => grid.insert_ptg_field(field),
            SomeChunkData::PttField(field) => grid.insert_ptt_field(field),
            SomeChunkData::BField(field) => grid.insert_b_field(field),
            SomeChunkData::Mesh(mesh) => {
                grid.insert_mesh(record.chunk_coords, mesh, record.mesh_epoch)
            }
            SomeChunkData::DiskStorage(storage) => {
                grid.insert_disk_storage(storage);
                true
            }
            SomeChunkData::DiskReadFailed(storage, error) => {
                warn!(
                    "Chunk {:?} will be generated instead of loaded: {}",
                    record.chunk_coords, error
                );
                grid.insert_disk_storage(ChunkDiskStorage {
                    exists: false,
                    ..storage
                });
                true
            }
        }
    }

    /// Takes every finished result from the workers and commits it.
    fn harvest(&mut self, grid: &mut ChunkGrid, report: &mut ManageReport) {
        self.task_manager.process_completed_tasks();

        let records = std::mem::take(&mut self.generating_data);
        for record in records {
            let Some(data) = self.task_manager.poll(record.handle) else {
                self.generating_data.push(record);
                continue;
            };

            let key = (record.chunk_coords, record.step);
            if self.in_flight_index.get(&key) == Some(&record.mesh_epoch) {
                self.in_flight_index.remove(&key);
            }

            report.harvested += 1;
            if !Self::commit(grid, &record, data) {
                report.discarded += 1;
                debug!(
                    "Discarded outdated {:?} result for chunk {:?}",
                    record.step, record.chunk_coords
                );
            }
        }
    }

    /// Submits the meshes of edited chunks that still wait for it, at most
    /// `budget` of them, nearest coords first.
    ///
    /// Returns the number of submissions and whether they stopped early on
    /// the budget or on a full task queue.
    fn submit_pending_remeshes(
        &mut self,
        grid: &ChunkGrid,
        context: &Arc<dyn WorldContext>,
        budget: usize,
    ) -> (usize, bool) {
        let mut submitted = 0;
        let pending: Vec<ChunkCoords> = self.pending_remeshes.iter().copied().collect();
        for chunk_coords in pending {
            // A chunk without its B neighborhood never had a mesh; the zone
            // scan builds it when needed.
            if grid.has_mesh(chunk_coords)
                || !grid.has_b_neighborhood(chunk_coords)
                || self.is_in_flight(grid, chunk_coords, ChunkGeneratingStep::Mesh)
            {
                self.pending_remeshes.remove(&chunk_coords);
                continue;
            }
            if submitted >= budget {
                return (submitted, true);
            }
            if let Err(error) = self.submit(grid, context, chunk_coords, ChunkGeneratingStep::Mesh)
            {
                debug!(
                    "Mesh of chunk {:?} left for a later tick: {}",
                    chunk_coords, error
                );
                return (submitted, true);
            }
            self.pending_remeshes.remove(&chunk_coords);
            submitted += 1;
        }
        (submitted, false)
    }

    /// Runs one tick of the scheduler.
    ///
    /// 1. Harvests finished steps into the grid.
    /// 2. Resubmits the meshes of chunks edited by `set_block` that the task
    ///    queue could not take yet, inside the zone or not.
    /// 3. If generation is enabled, submits steps for the zone chunks lacking
    ///    an up to date mesh, nearest chunks first. A zone chunk whose walk
    ///    only finds in-flight work is skipped until the next tick.
    /// 4. Feeds queued tasks to idle workers.
    ///
    /// At most `max_submissions_per_tick` steps are submitted, and a full task
    /// queue ends the submissions of the tick. Never blocks on the workers.
    /// With identical grid state and completions, the submissions are
    /// identical.
    pub fn manage(&mut self, grid: &mut ChunkGrid, context: &Arc<dyn WorldContext>) -> ManageReport {
        let start = Instant::now();
        let mut report = ManageReport::default();

        self.harvest(grid, &mut report);

        let (remeshed, mut stopped) =
            self.submit_pending_remeshes(grid, context, self.max_submissions_per_tick);
        report.submitted += remeshed;

        if self.generation_enabled {
            let zone = self.generation_zone(grid);
            let mut cache = ResolutionCache::default();
            'zone: for (index, &chunk_coords) in zone.iter().enumerate() {
                if !stopped {
                    while let Some((coords, step)) = self.find_runnable(
                        grid,
                        chunk_coords,
                        ChunkGeneratingStep::Mesh,
                        &mut cache,
                    ) {
                        if report.submitted >= self.max_submissions_per_tick {
                            stopped = true;
                        } else if let Err(error) = self.submit(grid, context, coords, step) {
                            debug!("Submissions stopped for this tick: {}", error);
                            stopped = true;
                        } else {
                            report.submitted += 1;
                            cache.resolutions.insert((coords, step), Resolution::Waiting);
                            continue;
                        }
                        break;
                    }
                }
                if stopped {
                    report.deferred = zone[index..]
                        .iter()
                        .filter(|&&chunk_coords| !grid.has_mesh(chunk_coords))
                        .count();
                    break 'zone;
                }
            }
        }

        self.task_manager.process_queued_tasks();

        if report != ManageReport::default() {
            debug!(
                "Tick: {:?}, {} in flight, took {:?}",
                report,
                self.generating_data.len(),
                start.elapsed()
            );
        }
        report
    }

    /// Edits a block and resubmits the mesh of every chunk that reads it.
    ///
    /// Meshes the task queue cannot take right away are resubmitted by the
    /// next ticks, whether or not their chunk is in the generation zone.
    /// Affected chunks whose B neighborhood is incomplete get their mesh
    /// later, from the regular zone scan.
    ///
    /// # Errors
    /// Returns `Error::ChunkNotLoaded` if the block's chunk has no B field.
    pub fn set_block(
        &mut self,
        grid: &mut ChunkGrid,
        context: &Arc<dyn WorldContext>,
        coords: BlockCoords,
        type_id: BlockTypeId,
    ) -> Result<Vec<ChunkCoords>> {
        let affected = grid.set_block(coords, type_id)?;
        self.pending_remeshes.extend(affected.iter().copied());
        let (_, stopped) = self.submit_pending_remeshes(grid, context, usize::MAX);
        if stopped {
            warn!(
                "Task queue full, {} meshes will be resubmitted later",
                self.pending_remeshes.len()
            );
        }
        Ok(affected)
    }
}
