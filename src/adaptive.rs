// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The adaptive block scheduler.
//!
//! The canvas is cut into a grid of blocks (32x32 by default).  For each
//! block a worker evaluates the four corners.  If they agree the whole
//! block is painted with that value without looking inside; this is an
//! approximation, since an escape-time boundary can pass through a
//! block and leave its corners untouched.  If they disagree and the
//! block is still larger than the threshold on either side, it is cut
//! into quarters which are scheduled like any other block, and the
//! block only counts as done once all of its quarters are.  Blocks at
//! or under the threshold are evaluated pixel by pixel.
//!
//! All of this runs on a fixed pool of workers sharing one task queue.
//! A subdivided block leaves a join point behind: a counter of
//! outstanding quarters plus a link to its own parent's join point.
//! The worker that completes the last quarter completes the block,
//! and so on up the tree; the coordinator only hears about the
//! initial blocks.  No worker ever sits waiting on its children, so a
//! small pool cannot deadlock on a deep tree.
//!
//! Blocks at the same level never overlap, and a block's corners lie
//! inside it, so no cell ever has two writers.  Corner cells are
//! written when they are sampled; the fill and the per-pixel pass skip
//! anything already written, so every cell is written exactly once.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, info};

use crate::block::{self, Block};
use crate::canvas::Surface;
use crate::error::RenderError;
use crate::escape::PixelSource;
use crate::planes::Pixel;

/// Default block edge, in pixels.
pub const BLOCK_SIZE: usize = 32;

/// Default subdivision threshold, in pixels.
pub const MIN_BLOCK: usize = 4;

/// How a block that was not subdivided got its pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resolution {
    /// The corners agreed; every cell got this value.
    BulkFill(u32),
    /// Every cell was evaluated on its own.
    PerPixel,
}

/// A block that was resolved without further subdivision.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Leaf {
    /// The pixels it covers.
    pub block: Block,
    /// Number of subdivisions between the initial grid and this block.
    pub depth: usize,
    /// How it was painted.
    pub resolution: Resolution,
}

/// What the scheduler did during one render.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockReport {
    /// Blocks in the initial grid.
    pub initial_blocks: usize,
    /// Blocks that were cut into quarters.
    pub subdivisions: usize,
    /// Every leaf block, sorted.
    pub leaves: Vec<Leaf>,
}

impl BlockReport {
    /// Deepest leaf.
    pub fn max_depth(&self) -> usize {
        self.leaves.iter().map(|l| l.depth).max().unwrap_or(0)
    }

    /// Number of leaves painted from their corners.
    pub fn bulk_filled(&self) -> usize {
        self.leaves
            .iter()
            .filter(|l| match l.resolution {
                Resolution::BulkFill(_) => true,
                Resolution::PerPixel => false,
            })
            .count()
    }

    /// Number of leaves evaluated pixel by pixel.
    pub fn per_pixel(&self) -> usize {
        self.leaves.len() - self.bulk_filled()
    }

    /// The leaf that covers `pixel`.
    pub fn leaf_at(&self, pixel: Pixel) -> Option<&Leaf> {
        self.leaves.iter().find(|l| l.block.contains(pixel))
    }
}

/// Settings of the adaptive block scheduler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockScheduler {
    /// Width of the blocks of the initial grid.
    pub block_width: usize,
    /// Height of the blocks of the initial grid.
    pub block_height: usize,
    /// Blocks with both sides at or under this are never subdivided.
    pub threshold: usize,
    /// Size of the worker pool.
    pub workers: usize,
}

impl Default for BlockScheduler {
    fn default() -> Self {
        BlockScheduler {
            block_width: BLOCK_SIZE,
            block_height: BLOCK_SIZE,
            threshold: MIN_BLOCK,
            workers: num_cpus::get(),
        }
    }
}

struct JoinPoint {
    block: Block,
    label: String,
    pending: AtomicUsize,
    parent: Option<Arc<JoinPoint>>,
    started: Instant,
}

struct Task {
    block: Block,
    depth: usize,
    label: String,
    parent: Option<Arc<JoinPoint>>,
}

enum Message {
    Run(Task),
    Stop,
}

enum Outcome {
    Leaf(Leaf),
    Split,
    Finished(Block),
    Aborted,
}

// Tells the coordinator when a worker dies, so it doesn't wait forever
// for blocks that will never finish, and stops the other workers from
// picking up anything new.
struct Sentinel<'a> {
    halted: &'a AtomicBool,
    results: &'a Sender<Outcome>,
}

impl<'a> Drop for Sentinel<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.halted.store(true, Ordering::Release);
            let _ = self.results.send(Outcome::Aborted);
        }
    }
}

struct Pool<'a, S, P> {
    threshold: usize,
    surface: &'a S,
    source: &'a P,
    tasks: Sender<Message>,
    queue: Receiver<Message>,
    results: Sender<Outcome>,
    halted: AtomicBool,
}

impl<'a, S, P> Pool<'a, S, P>
where
    S: Surface,
    P: PixelSource,
{
    fn work(&self, worker: usize) {
        let _sentinel = Sentinel {
            halted: &self.halted,
            results: &self.results,
        };
        for message in self.queue.iter() {
            if self.halted.load(Ordering::Acquire) {
                debug!("worker {} halted", worker);
                break;
            }
            match message {
                Message::Run(task) => self.run(worker, task),
                Message::Stop => break,
            }
        }
    }

    fn run(&self, worker: usize, task: Task) {
        let start = Instant::now();
        debug!("worker {} started  job {} - {}", worker, task.label, task.block);
        let block = task.block;
        let corners = block.corners();
        let values = [
            self.surface.sample(self.source, corners[0]),
            self.surface.sample(self.source, corners[1]),
            self.surface.sample(self.source, corners[2]),
            self.surface.sample(self.source, corners[3]),
        ];
        if values.iter().all(|&v| v == values[0]) {
            for pixel in block.pixels() {
                if self.surface.get(pixel).is_none() {
                    self.surface.set(pixel, values[0]);
                }
            }
            self.finish(worker, task, Resolution::BulkFill(values[0]), start);
        } else if block.exceeds(self.threshold) {
            self.split(worker, task);
        } else {
            for pixel in block.pixels() {
                self.surface.sample(self.source, pixel);
            }
            self.finish(worker, task, Resolution::PerPixel, start);
        }
    }

    fn split(&self, worker: usize, task: Task) {
        let quarters = task.block.quarters();
        debug!(
            "worker {} divides job {} - {} into {}",
            worker,
            task.label,
            task.block,
            quarters.len()
        );
        let join = Arc::new(JoinPoint {
            block: task.block,
            label: task.label,
            pending: AtomicUsize::new(quarters.len()),
            parent: task.parent,
            started: Instant::now(),
        });
        let _ = self.results.send(Outcome::Split);
        for (i, block) in quarters.into_iter().enumerate() {
            let quarter = Task {
                block,
                depth: task.depth + 1,
                label: format!("{}-{}", join.label, i),
                parent: Some(join.clone()),
            };
            // The pool holds the receiving end, so this can't fail.
            let _ = self.tasks.send(Message::Run(quarter));
        }
    }

    fn finish(&self, worker: usize, task: Task, resolution: Resolution, start: Instant) {
        debug!(
            "worker {} finished job {} - {} in {:?}",
            worker,
            task.label,
            task.block,
            start.elapsed()
        );
        let _ = self.results.send(Outcome::Leaf(Leaf {
            block: task.block,
            depth: task.depth,
            resolution,
        }));
        let mut done = task.block;
        let mut parent = task.parent;
        while let Some(join) = parent {
            if join.pending.fetch_sub(1, Ordering::AcqRel) != 1 {
                return;
            }
            debug!(
                "worker {} finished job {} - {} in {:?}",
                worker,
                join.label,
                join.block,
                join.started.elapsed()
            );
            done = join.block;
            parent = join.parent.clone();
        }
        let _ = self.results.send(Outcome::Finished(done));
    }
}

impl BlockScheduler {
    /// Scheduler with the given grid block size, threshold and pool size.
    pub fn new(block_width: usize, block_height: usize, threshold: usize, workers: usize) -> Self {
        BlockScheduler {
            block_width,
            block_height,
            threshold,
            workers,
        }
    }

    /// Paint every cell of `surface` with values from `source`, and
    /// report how each region was resolved.  A panic in any worker
    /// abandons the render.
    pub fn render<S, P>(&self, surface: &S, source: &P) -> Result<BlockReport, RenderError>
    where
        S: Surface,
        P: PixelSource,
    {
        if self.block_width == 0 || self.block_height == 0 || self.threshold == 0 {
            return Err(RenderError::BadConfig(format!(
                "block {}x{} with threshold {}",
                self.block_width, self.block_height, self.threshold
            )));
        }
        let blocks = block::grid(surface.bounds(), self.block_width, self.block_height);
        let workers = self.workers.max(1);
        let (tasks, queue) = channel::unbounded();
        let (results, outcomes) = channel::unbounded();
        for (i, &block) in blocks.iter().enumerate() {
            let _ = tasks.send(Message::Run(Task {
                block,
                depth: 0,
                label: (i + 1).to_string(),
                parent: None,
            }));
        }
        info!(
            "scheduling {} blocks of {}x{} on {} workers",
            blocks.len(),
            self.block_width,
            self.block_height,
            workers
        );

        let pool = Pool {
            threshold: self.threshold,
            surface,
            source,
            tasks,
            queue,
            results,
            halted: AtomicBool::new(false),
        };
        let mut report = BlockReport {
            initial_blocks: blocks.len(),
            ..Default::default()
        };

        let scoped = crossbeam::scope(|spawner| {
            let pool = &pool;
            for worker in 1..=workers {
                spawner.spawn(move |_| pool.work(worker));
            }
            let mut finished = 0;
            let mut aborted = false;
            while finished < blocks.len() {
                match outcomes.recv() {
                    Ok(Outcome::Leaf(leaf)) => report.leaves.push(leaf),
                    Ok(Outcome::Split) => report.subdivisions += 1,
                    Ok(Outcome::Finished(block)) => {
                        finished += 1;
                        debug!("block {} done ({}/{})", block, finished, blocks.len());
                    }
                    Ok(Outcome::Aborted) | Err(_) => {
                        pool.halted.store(true, Ordering::Release);
                        aborted = true;
                        break;
                    }
                }
            }
            for _ in 0..workers {
                let _ = pool.tasks.send(Message::Stop);
            }
            aborted
        });

        match scoped {
            Ok(false) => {}
            _ => return Err(RenderError::WorkerPanicked),
        }
        for outcome in outcomes.try_iter() {
            match outcome {
                Outcome::Leaf(leaf) => report.leaves.push(leaf),
                Outcome::Split => report.subdivisions += 1,
                _ => {}
            }
        }
        report.leaves.sort();
        info!(
            "{} leaves: {} bulk filled, {} per pixel, {} subdivisions",
            report.leaves.len(),
            report.bulk_filled(),
            report.per_pixel(),
            report.subdivisions
        );
        Ok(report)
    }
}
