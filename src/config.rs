// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render settings and the parsers for their textual forms.  Parsing is
//! strict: a malformed number is an error, never a zero.

use std::fmt;
use std::str::FromStr;

use crate::adaptive::{BlockScheduler, BLOCK_SIZE, MIN_BLOCK};
use crate::error::RenderError;
use crate::escape::MAX_ITERATIONS;
use crate::planes::Viewport;

/// Longest canvas side accepted, in pixels.
pub const MAX_SIDE: usize = u16::MAX as usize;

/// Which scheduler fills the canvas.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// `seq`: one thread, row by row.
    Sequential,
    /// `px`: one unit of work per pixel.
    PerPixel,
    /// `row`: one unit of work per row.
    PerRow,
    /// `workers`: the adaptive block scheduler.
    Workers,
}

impl Mode {
    /// The names accepted on the command line.
    pub const NAMES: [&'static str; 4] = ["seq", "px", "row", "workers"];

    /// Command-line name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Sequential => "seq",
            Mode::PerPixel => "px",
            Mode::PerRow => "row",
            Mode::Workers => "workers",
        }
    }
}

impl FromStr for Mode {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seq" => Ok(Mode::Sequential),
            "px" => Ok(Mode::PerPixel),
            "row" => Ok(Mode::PerRow),
            "workers" => Ok(Mode::Workers),
            _ => Err(RenderError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything one render needs.  Built once, never changed while the
/// render runs.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Canvas width in pixels.
    pub width: usize,
    /// Canvas height in pixels.
    pub height: usize,
    /// Region of the complex plane to draw.
    pub viewport: Viewport,
    /// Scheduler to use.
    pub mode: Mode,
    /// Degree of parallelism.
    pub tasks: usize,
    /// Width of the initial blocks of the `workers` mode.
    pub block_width: usize,
    /// Height of the initial blocks of the `workers` mode.
    pub block_height: usize,
    /// Subdivision threshold of the `workers` mode.
    pub min_block: usize,
    /// Iteration budget per point.
    pub max_iterations: usize,
    /// Silence logging while rendering.
    pub quiet: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 640,
            height: 480,
            viewport: Viewport::default(),
            mode: Mode::Sequential,
            tasks: num_cpus::get(),
            block_width: BLOCK_SIZE,
            block_height: BLOCK_SIZE,
            min_block: MIN_BLOCK,
            max_iterations: MAX_ITERATIONS,
            quiet: false,
        }
    }
}

impl RenderConfig {
    /// Checks the numeric settings; the viewport checks itself on
    /// construction.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyCanvas(self.width, self.height));
        }
        if self.width > MAX_SIDE
            || self.height > MAX_SIDE
            || self.width.checked_mul(self.height).is_none()
        {
            return Err(RenderError::BadSize(format!("{}x{}", self.width, self.height)));
        }
        if self.block_width == 0 || self.block_height == 0 {
            return Err(RenderError::BadConfig(format!(
                "block size {}x{} must be positive",
                self.block_width, self.block_height
            )));
        }
        if self.min_block == 0 {
            return Err(RenderError::BadConfig("minimum block size must be positive".to_string()));
        }
        if self.tasks == 0 {
            return Err(RenderError::BadConfig("task count must be positive".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(RenderError::BadConfig("iteration count must be positive".to_string()));
        }
        Ok(())
    }

    /// The block scheduler these settings describe.
    pub fn scheduler(&self) -> BlockScheduler {
        BlockScheduler::new(self.block_width, self.block_height, self.min_block, self.tasks)
    }
}

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// Parses `WIDTHxHEIGHT`, both positive and at most `MAX_SIDE`.
pub fn parse_size(s: &str) -> Result<(usize, usize), RenderError> {
    match parse_pair::<u16>(s, 'x') {
        Some((w, h)) if w > 0 && h > 0 => Ok((usize::from(w), usize::from(h))),
        _ => Err(RenderError::BadSize(s.to_string())),
    }
}

/// Parses `xMin:xMax:yMin:yMax`.
pub fn parse_viewport(s: &str) -> Result<Viewport, RenderError> {
    let bounds = s
        .split(':')
        .map(|part| f64::from_str(part.trim()))
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|e| RenderError::BadViewport(format!("'{}': {}", s, e)))?;
    match bounds.as_slice() {
        [x_min, x_max, y_min, y_max] => Viewport::new(*x_min, *x_max, *y_min, *y_max),
        _ => Err(RenderError::BadViewport(format!(
            "'{}' needs four bounds, xMin:xMax:yMin:yMax",
            s
        ))),
    }
}
