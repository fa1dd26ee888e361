// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0
//! (the canvas), and a viewport on the complex plane.
use num::Complex;

use crate::error::RenderError;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntegralPlane(pub usize, pub usize);

impl IntegralPlane {
    /// Whether the pixel lies on this plane.
    pub fn contains(&self, pixel: Pixel) -> bool {
        pixel.0 < self.0 && pixel.1 < self.1
    }

    /// Linear, row-major offset of a pixel on this plane.
    pub fn offset(&self, pixel: Pixel) -> usize {
        pixel.1 * self.0 + pixel.0
    }
}

/// Describes the x, y of a pixel on the canvas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel(pub usize, pub usize);

/// The region of the complex plane that is mapped onto the canvas.
/// The real part runs along x, the imaginary part along y.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Left bound of the real axis.
    pub x_min: f64,
    /// Right bound of the real axis.
    pub x_max: f64,
    /// Lower bound of the imaginary axis.
    pub y_min: f64,
    /// Upper bound of the imaginary axis.
    pub y_max: f64,
}

impl Viewport {
    /// Constructor.  Rejects bounds that are not finite or that are
    /// not ordered min < max.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Viewport, RenderError> {
        let viewport = Viewport {
            x_min,
            x_max,
            y_min,
            y_max,
        };
        if ![x_min, x_max, y_min, y_max].iter().all(|v| v.is_finite()) {
            return Err(RenderError::BadViewport(format!(
                "{} has a bound that is not a finite number",
                viewport
            )));
        }
        if x_max <= x_min {
            return Err(RenderError::BadViewport(format!(
                "{}: the left bound is not to the left of the right bound",
                viewport
            )));
        }
        if y_max <= y_min {
            return Err(RenderError::BadViewport(format!(
                "{}: the lower bound is not below the upper bound",
                viewport
            )));
        }
        Ok(viewport)
    }

    /// Horizontal extent used by the mapping.  This is the sum of the
    /// absolute bounds, not `x_max - x_min`; the two only agree when
    /// the viewport straddles the imaginary axis.
    pub fn span_x(&self) -> f64 {
        self.x_min.abs() + self.x_max.abs()
    }

    /// Vertical extent used by the mapping, `|y_min| + |y_max|`.
    pub fn span_y(&self) -> f64 {
        self.y_min.abs() + self.y_max.abs()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            x_min: -2.0,
            x_max: 2.0,
            y_min: -1.0,
            y_max: 1.0,
        }
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}:{}:{}", self.x_min, self.x_max, self.y_min, self.y_max)
    }
}

/// Contains the definitions of two planes: an integral cartesian plane
/// and a viewport on the complex plane.  Maps pixels of the former to
/// points of the latter.
#[derive(Clone, Debug)]
pub struct PlaneMapper {
    /// The size of the canvas.
    pub integral_plane: IntegralPlane,
    /// The region of the complex plane covered by the canvas.
    pub viewport: Viewport,
    // (|x_min| + |x_max|, |y_min| + |y_max|)
    spans: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the canvas size and the viewport; fails if
    /// the canvas has no pixels.
    pub fn new(width: usize, height: usize, viewport: Viewport) -> Result<PlaneMapper, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyCanvas(width, height));
        }
        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            viewport,
            spans: (viewport.span_x(), viewport.span_y()),
        })
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Given a pixel on the integral cartesian plane, return the point
    /// of the viewport it stands for:
    /// `x = i / w * (|x_min| + |x_max|) + x_min`, and likewise for y.
    pub fn pixel_to_point(&self, pixel: Pixel) -> Complex<f64> {
        Complex::new(
            (pixel.0 as f64) / (self.integral_plane.0 as f64) * self.spans.0 + self.viewport.x_min,
            (pixel.1 as f64) / (self.integral_plane.1 as f64) * self.spans.1 + self.viewport.y_min,
        )
    }
}
