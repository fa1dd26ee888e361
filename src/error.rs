// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can stop a render.  None of these are retried:
//! configuration problems are reported before any work starts, and a
//! failure during the render discards the whole canvas.

use std::error::Error;
use std::fmt;

/// The render error type.
#[derive(Debug)]
pub enum RenderError {
    /// A size that is not `WIDTHxHEIGHT` with sides from 1 to 65535.
    BadSize(String),
    /// A viewport string or bound that does not describe a usable region.
    BadViewport(String),
    /// A scheduler name that is not one of `seq`, `px`, `row`, `workers`.
    UnknownMode(String),
    /// Block size, threshold, task count or iteration limit out of range.
    BadConfig(String),
    /// A canvas with no pixels.
    EmptyCanvas(usize, usize),
    /// A worker thread panicked; the render was abandoned.
    WorkerPanicked,
    /// The image could not be encoded or written.
    Image(image::ImageError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RenderError::BadSize(s) => write!(f, "bad image size '{}'", s),
            RenderError::BadViewport(s) => write!(f, "bad viewport: {}", s),
            RenderError::UnknownMode(s) => write!(f, "unknown mode '{}'", s),
            RenderError::BadConfig(s) => write!(f, "bad configuration: {}", s),
            RenderError::EmptyCanvas(w, h) => write!(f, "canvas {}x{} has no pixels", w, h),
            RenderError::WorkerPanicked => write!(f, "a render worker panicked; render aborted"),
            RenderError::Image(e) => write!(f, "could not write image: {}", e),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RenderError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for RenderError {
    fn from(e: image::ImageError) -> Self {
        RenderError::Image(e)
    }
}
