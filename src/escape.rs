// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time function and the grayscale ramp used to paint it.
//!
//! The recurrence is a Mandelbrot relative: starting from `z = 0`,
//! `z <- z*z + c * E^(-z)`, where `E` is a truncated Euler's number.
//! The value of a point is one less than the step at which `|z|^2`
//! first exceeds 4, or [`NEVER_ESCAPED`] if it stays bounded for the
//! whole iteration budget.

use image::Rgba;
use num::Complex;

use crate::planes::{Pixel, PlaneMapper};

/// Default iteration budget per point.
pub const MAX_ITERATIONS: usize = 1000;

/// The base of the exponential term.  Truncated on purpose; using
/// `std::f64::consts::E` changes the picture.
pub const E: f64 = 2.71828;

/// Value reported for points that never escape.  Deliberately not the
/// iteration budget: existing renders paint the bounded set with 255.
pub const NEVER_ESCAPED: u32 = 255;

/// Each step of escape time darkens the gray ramp by this much.
pub const SHADE_STEP: u32 = 15;

const BAILOUT: f64 = 4.0;

/// `E` raised to a complex power, evaluated in polar form.
#[inline]
fn e_pow(power: Complex<f64>) -> Complex<f64> {
    Complex::from_polar(E.powf(power.re), power.im * E.ln())
}

/// This is our classic iterator function: returns the escape-time value
/// of `c` as described in the module documentation.
pub fn escape_time(c: Complex<f64>, max_iterations: usize) -> u32 {
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    for i in 0..max_iterations {
        if z.norm_sqr() > BAILOUT {
            // z starts at 0, so this can't fire on the first step.
            return (i as u32).saturating_sub(1);
        }
        z = z * z + c * e_pow(-z);
    }
    NEVER_ESCAPED
}

/// Maps a value to an opaque gray: `255 - min(255, value * 15)`.
pub fn shade(value: u32) -> Rgba<u8> {
    let gray = (255 - value.saturating_mul(SHADE_STEP).min(255)) as u8;
    Rgba([gray, gray, gray, 255])
}

/// Anything that can tell the schedulers what value belongs at a pixel.
/// Implementations must be pure: the same pixel always yields the same
/// value, from any thread.
pub trait PixelSource: Sync {
    /// The value of the cell at `pixel`.
    fn value_at(&self, pixel: Pixel) -> u32;
}

impl<F> PixelSource for F
where
    F: Fn(Pixel) -> u32 + Sync,
{
    fn value_at(&self, pixel: Pixel) -> u32 {
        self(pixel)
    }
}

/// The escape-time function evaluated over a mapped viewport.
#[derive(Clone, Debug)]
pub struct EscapeTime {
    plane: PlaneMapper,
    max_iterations: usize,
}

impl EscapeTime {
    /// Evaluate the points of `plane` with the given iteration budget.
    pub fn new(plane: PlaneMapper, max_iterations: usize) -> Self {
        EscapeTime {
            plane,
            max_iterations,
        }
    }
}

impl PixelSource for EscapeTime {
    fn value_at(&self, pixel: Pixel) -> u32 {
        escape_time(self.plane.pixel_to_point(pixel), self.max_iterations)
    }
}
