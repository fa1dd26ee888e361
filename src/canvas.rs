// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The pixel buffer shared by every worker of a render.
//!
//! Cells are atomics so that many workers can hold `&Canvas` at once.
//! The schedulers never let two tasks write the same cell, so relaxed
//! ordering is enough; the joins at the end of a render publish the
//! writes to whoever encodes the image.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::RenderError;
use crate::escape::{shade, PixelSource};
use crate::planes::{IntegralPlane, Pixel};

const UNWRITTEN: u32 = u32::MAX;

/// A grid of escape-time values that schedulers write into.
pub trait Surface: Sync {
    /// Width and height of the surface.
    fn bounds(&self) -> IntegralPlane;

    /// The value stored at `pixel`, if any.
    fn get(&self, pixel: Pixel) -> Option<u32>;

    /// Store `value` at `pixel`.  Callers clip to `bounds()` first.
    fn set(&self, pixel: Pixel, value: u32);

    /// Compute the value of `pixel` and store it, whatever was there.
    fn fill<P: PixelSource + ?Sized>(&self, source: &P, pixel: Pixel) -> u32 {
        let value = source.value_at(pixel);
        self.set(pixel, value);
        value
    }

    /// Read `pixel`, computing and storing it first if the cell is still
    /// empty.  Computing is idempotent, so this is safe to use for
    /// cells that another pass will visit again.
    fn sample<P: PixelSource + ?Sized>(&self, source: &P, pixel: Pixel) -> u32 {
        match self.get(pixel) {
            Some(value) => value,
            None => self.fill(source, pixel),
        }
    }
}

/// The render target: one atomic cell per pixel, row-major.
#[derive(Debug)]
pub struct Canvas {
    plane: IntegralPlane,
    cells: Vec<AtomicU32>,
}

impl Canvas {
    /// An empty canvas of the given size.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            plane: IntegralPlane(width, height),
            cells: (0..width * height).map(|_| AtomicU32::new(UNWRITTEN)).collect(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.plane.0
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.plane.1
    }

    #[inline]
    fn cell(&self, pixel: Pixel) -> &AtomicU32 {
        assert!(
            self.plane.contains(pixel),
            "pixel {:?} outside {}x{} canvas",
            pixel,
            self.plane.0,
            self.plane.1
        );
        &self.cells[self.plane.offset(pixel)]
    }

    /// Number of cells nothing has written yet.
    pub fn unwritten(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.load(Ordering::Relaxed) == UNWRITTEN)
            .count()
    }

    /// True once every cell holds a value.
    pub fn is_complete(&self) -> bool {
        self.unwritten() == 0
    }

    /// All cells in row-major order.
    pub fn values(&self) -> Vec<Option<u32>> {
        self.cells
            .iter()
            .map(|c| match c.load(Ordering::Relaxed) {
                UNWRITTEN => None,
                v => Some(v),
            })
            .collect()
    }

    /// Paints the canvas.  Cells that were never written come out fully
    /// transparent.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            match self.get(Pixel(x as usize, y as usize)) {
                Some(value) => shade(value),
                None => Rgba([0, 0, 0, 0]),
            }
        })
    }

    /// Encodes the painted canvas as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        self.to_image().save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

impl Surface for Canvas {
    fn bounds(&self) -> IntegralPlane {
        self.plane
    }

    fn get(&self, pixel: Pixel) -> Option<u32> {
        match self.cell(pixel).load(Ordering::Relaxed) {
            UNWRITTEN => None,
            v => Some(v),
        }
    }

    fn set(&self, pixel: Pixel, value: u32) {
        debug_assert!(value != UNWRITTEN);
        self.cell(pixel).store(value, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn new_canvas_is_empty() {
        let canvas = Canvas::new(3, 2);
        assert_eq!(canvas.unwritten(), 6);
        assert!(!canvas.is_complete());
        assert_eq!(canvas.get(Pixel(2, 1)), None);
    }

    #[test]
    fn set_then_get() {
        let canvas = Canvas::new(3, 2);
        canvas.set(Pixel(2, 1), 7);
        assert_eq!(canvas.get(Pixel(2, 1)), Some(7));
        assert_eq!(canvas.values()[5], Some(7));
        assert_eq!(canvas.unwritten(), 5);
    }

    #[test]
    #[should_panic]
    fn writes_outside_are_rejected() {
        Canvas::new(3, 2).set(Pixel(3, 0), 1);
    }

    #[test]
    fn sample_computes_only_once() {
        let canvas = Canvas::new(2, 2);
        let calls = AtomicUsize::new(0);
        let source = |p: Pixel| {
            calls.fetch_add(1, Ordering::SeqCst);
            (p.0 * 10 + p.1) as u32
        };
        assert_eq!(canvas.sample(&source, Pixel(1, 1)), 11);
        assert_eq!(canvas.sample(&source, Pixel(1, 1)), 11);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(canvas.fill(&source, Pixel(1, 1)), 11);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn image_is_gray_and_opaque_where_written() {
        let canvas = Canvas::new(2, 1);
        canvas.set(Pixel(0, 0), 1);
        let img = canvas.to_image();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(*img.get_pixel(0, 0), Rgba([240, 240, 240, 255]));
        assert_eq!(*img.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
    }
}
