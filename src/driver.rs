// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Picks the scheduler named by the configuration and runs it over a
//! fresh canvas.

use std::time::{Duration, Instant};

use log::{info, LevelFilter};

use crate::adaptive::BlockReport;
use crate::baseline;
use crate::canvas::Canvas;
use crate::config::{Mode, RenderConfig};
use crate::error::RenderError;
use crate::escape::EscapeTime;
use crate::planes::PlaneMapper;

/// A finished render.
#[derive(Debug)]
pub struct Rendering {
    /// The filled canvas.
    pub canvas: Canvas,
    /// What the block scheduler did; only set in `workers` mode.
    pub report: Option<BlockReport>,
    /// Wall time spent filling the canvas.
    pub elapsed: Duration,
}

// Turns logging off for as long as it lives, then puts back whatever
// level was set before.
struct QuietGuard(Option<LevelFilter>);

impl QuietGuard {
    fn engage(quiet: bool) -> QuietGuard {
        if !quiet {
            return QuietGuard(None);
        }
        let previous = log::max_level();
        log::set_max_level(LevelFilter::Off);
        QuietGuard(Some(previous))
    }
}

impl Drop for QuietGuard {
    fn drop(&mut self) {
        if let Some(level) = self.0 {
            log::set_max_level(level);
        }
    }
}

/// Renders the escape-time image described by `config`.
pub fn render(config: &RenderConfig) -> Result<Rendering, RenderError> {
    config.validate()?;
    let plane = PlaneMapper::new(config.width, config.height, config.viewport)?;
    let source = EscapeTime::new(plane, config.max_iterations);
    let canvas = Canvas::new(config.width, config.height);

    let quiet = QuietGuard::engage(config.quiet);
    info!(
        "rendering {}x{} of {} in {} mode with {} tasks",
        config.width, config.height, config.viewport, config.mode, config.tasks
    );
    let start = Instant::now();
    let report = match config.mode {
        Mode::Sequential => {
            baseline::sequential(&canvas, &source);
            None
        }
        Mode::PerPixel => {
            baseline::per_pixel(&canvas, &source, config.tasks)?;
            None
        }
        Mode::PerRow => {
            baseline::per_row(&canvas, &source, config.tasks)?;
            None
        }
        Mode::Workers => Some(config.scheduler().render(&canvas, &source)?),
    };
    let elapsed = start.elapsed();
    info!("{} mode filled the canvas in {:?}", config.mode, elapsed);
    drop(quiet);

    Ok(Rendering {
        canvas,
        report,
        elapsed,
    })
}
