#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fractal renderer
//!
//! Every pixel of the canvas stands for a point on the complex plane.
//! The point is fed to a Mandelbrot-like recurrence, and the number of
//! steps it takes to run away from the origin is painted as a shade of
//! gray.  Each pixel is independent of the others, which leaves the
//! interesting part to the question of who computes which pixel.
//!
//! Four schedulers answer that question.  The sequential scan, the
//! pixel-per-task and the row-per-task schedulers evaluate every pixel
//! and always agree with each other.  The block scheduler works on
//! rectangles instead: it looks at the four corners of a block and, if
//! they agree, paints the block without evaluating its inside.  Blocks
//! whose corners disagree are cut into quarters until they are small
//! enough to be worth evaluating pixel by pixel.  That trades a little
//! accuracy on the fractal boundary for a lot of speed in the large
//! flat regions around it.

extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod adaptive;
pub mod baseline;
pub mod block;
pub mod canvas;
pub mod config;
pub mod driver;
pub mod error;
pub mod escape;
pub mod planes;

pub use adaptive::{BlockReport, BlockScheduler, Leaf, Resolution};
pub use canvas::{Canvas, Surface};
pub use config::{Mode, RenderConfig};
pub use driver::{render, Rendering};
pub use error::RenderError;
pub use escape::{escape_time, shade, EscapeTime, PixelSource};
pub use planes::{Pixel, PlaneMapper, Viewport};
