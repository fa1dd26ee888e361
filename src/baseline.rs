// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fixed-partition schedulers.  None of these guess: every pixel
//! is evaluated, so all three produce the same canvas and serve as the
//! reference the block scheduler is measured against.
//!
//! The concurrent two hand out their units of work (one pixel, or one
//! row) from a shared iterator to a fixed set of scoped threads; the
//! scope's join is the completion barrier.

use std::ops::Range;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use itertools::iproduct;
use log::{debug, trace};

use crate::canvas::Surface;
use crate::error::RenderError;
use crate::escape::PixelSource;
use crate::planes::Pixel;

type PixelQueue = Arc<Mutex<itertools::Product<Range<usize>, Range<usize>>>>;
type RowQueue = Arc<Mutex<Range<usize>>>;

/// Single-threaded row-major scan of the whole surface.
pub fn sequential<S, P>(surface: &S, source: &P)
where
    S: Surface,
    P: PixelSource,
{
    let bounds = surface.bounds();
    for row in 0..bounds.1 {
        for column in 0..bounds.0 {
            surface.fill(source, Pixel(column, row));
        }
    }
}

/// One unit of work per pixel, drained by `threads` workers.
pub fn per_pixel<S, P>(surface: &S, source: &P, threads: usize) -> Result<(), RenderError>
where
    S: Surface,
    P: PixelSource,
{
    let bounds = surface.bounds();
    let pixels: PixelQueue = Arc::new(Mutex::new(iproduct!(0..bounds.0, 0..bounds.1)));
    crossbeam::scope(|spawner| {
        for _ in 0..threads.max(1) {
            let pixels = pixels.clone();
            spawner.spawn(move |_| loop {
                let pixel = { pixels.lock().unwrap().next() };
                match pixel {
                    Some((column, row)) => {
                        let start = Instant::now();
                        trace!("Thread-{}.{} started.", column, row);
                        surface.fill(source, Pixel(column, row));
                        trace!("Thread-{}.{} stopped.", column, row);
                        trace!(
                            "Thread-{}.{} execution time was {:?}",
                            column,
                            row,
                            start.elapsed()
                        );
                    }
                    None => {
                        break;
                    }
                }
            });
        }
    })
    .map_err(|_| RenderError::WorkerPanicked)
}

/// One unit of work per row, drained by `threads` workers.
pub fn per_row<S, P>(surface: &S, source: &P, threads: usize) -> Result<(), RenderError>
where
    S: Surface,
    P: PixelSource,
{
    let bounds = surface.bounds();
    let rows: RowQueue = Arc::new(Mutex::new(0..bounds.1));
    crossbeam::scope(|spawner| {
        for _ in 0..threads.max(1) {
            let rows = rows.clone();
            spawner.spawn(move |_| loop {
                let row = { rows.lock().unwrap().next() };
                match row {
                    Some(row) => {
                        debug!("Thread-{} started.", row);
                        let start = Instant::now();
                        for column in 0..bounds.0 {
                            surface.fill(source, Pixel(column, row));
                        }
                        debug!("Thread-{} stopped.", row);
                        debug!("Thread-{} execution time was {:?}", row, start.elapsed());
                    }
                    None => {
                        break;
                    }
                }
            });
        }
    })
    .map_err(|_| RenderError::WorkerPanicked)
}
