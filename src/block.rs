// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rectangular regions of the canvas, the unit of work of the block
//! scheduler.  A block always lies entirely on the canvas; the grid
//! and the quartering both tile their parent exactly.

use std::fmt;

use itertools::iproduct;

use crate::planes::{IntegralPlane, Pixel};

/// A non-empty rectangle of pixels, `width` x `height` from (`x`, `y`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Block {
    /// Left column.
    pub x: usize,
    /// Top row.
    pub y: usize,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl Block {
    /// A block of at most `width` x `height` at (`x`, `y`), cut back to
    /// the edges of `bounds`.  `None` if nothing of it is left.
    pub fn clipped(x: usize, y: usize, width: usize, height: usize, bounds: IntegralPlane) -> Option<Block> {
        if x >= bounds.0 || y >= bounds.1 {
            return None;
        }
        let width = width.min(bounds.0 - x);
        let height = height.min(bounds.1 - y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Block {
            x,
            y,
            width,
            height,
        })
    }

    /// Last column inside the block.
    pub fn right(&self) -> usize {
        self.x + self.width - 1
    }

    /// Last row inside the block.
    pub fn bottom(&self) -> usize {
        self.y + self.height - 1
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Whether `pixel` lies inside.
    pub fn contains(&self, pixel: Pixel) -> bool {
        pixel.0 >= self.x && pixel.0 <= self.right() && pixel.1 >= self.y && pixel.1 <= self.bottom()
    }

    /// True when either side is longer than `threshold`.
    pub fn exceeds(&self, threshold: usize) -> bool {
        self.width > threshold || self.height > threshold
    }

    /// The four corners, in the order they are tested:
    /// top-left, bottom-right, bottom-left, top-right.
    pub fn corners(&self) -> [Pixel; 4] {
        [
            Pixel(self.x, self.y),
            Pixel(self.right(), self.bottom()),
            Pixel(self.x, self.bottom()),
            Pixel(self.right(), self.y),
        ]
    }

    /// Every pixel of the block, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> {
        iproduct!(self.y..self.y + self.height, self.x..self.x + self.width).map(|(y, x)| Pixel(x, y))
    }

    /// Splits the block into four by halving both sides.  The left and
    /// top halves take the odd pixel; quarters that would be empty (a
    /// block one pixel thick) are left out, so the result always tiles
    /// the block exactly.
    pub fn quarters(&self) -> Vec<Block> {
        let left = (self.width + 1) / 2;
        let top = (self.height + 1) / 2;
        let columns = [(self.x, left), (self.x + left, self.width - left)];
        let rows = [(self.y, top), (self.y + top, self.height - top)];
        iproduct!(rows.iter(), columns.iter())
            .filter(|&(&(_, h), &(_, w))| w > 0 && h > 0)
            .map(|(&(y, height), &(x, width))| Block {
                x,
                y,
                width,
                height,
            })
            .collect()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({}, {}) - ({}, {})",
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height
        )
    }
}

/// Cuts the canvas into `width` x `height` blocks, row by row.  Blocks
/// on the right and bottom edges are clipped.
pub fn grid(bounds: IntegralPlane, width: usize, height: usize) -> Vec<Block> {
    if width == 0 || height == 0 {
        return vec![];
    }
    iproduct!((0..bounds.1).step_by(height), (0..bounds.0).step_by(width))
        .filter_map(|(y, x)| Block::clipped(x, y, width, height, bounds))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(bounds: IntegralPlane, blocks: &[Block]) -> Vec<usize> {
        let mut hits = vec![0; bounds.0 * bounds.1];
        for block in blocks {
            for p in block.pixels() {
                hits[bounds.offset(p)] += 1;
            }
        }
        hits
    }

    #[test]
    fn square_canvas_makes_four_blocks() {
        let blocks = grid(IntegralPlane(64, 64), 32, 32);
        assert_eq!(blocks.len(), 4);
        assert!(blocks.iter().all(|b| b.width == 32 && b.height == 32));
    }

    #[test]
    fn ragged_canvas_is_clipped() {
        let bounds = IntegralPlane(70, 33);
        let blocks = grid(bounds, 32, 32);
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[2], Block { x: 64, y: 0, width: 6, height: 32 });
        assert_eq!(blocks[5], Block { x: 64, y: 32, width: 6, height: 1 });
        assert!(coverage(bounds, &blocks).iter().all(|&n| n == 1));
    }

    #[test]
    fn clipping_outside_the_canvas_gives_nothing() {
        let bounds = IntegralPlane(10, 10);
        assert_eq!(Block::clipped(10, 0, 4, 4, bounds), None);
        assert_eq!(Block::clipped(0, 3, 4, 0, bounds), None);
        assert_eq!(
            Block::clipped(8, 8, 4, 4, bounds),
            Some(Block { x: 8, y: 8, width: 2, height: 2 })
        );
    }

    #[test]
    fn corners_stay_inside() {
        let b = Block { x: 4, y: 8, width: 3, height: 5 };
        assert_eq!(
            b.corners(),
            [Pixel(4, 8), Pixel(6, 12), Pixel(4, 12), Pixel(6, 8)]
        );
        assert!(b.corners().iter().all(|&p| b.contains(p)));
        assert!(!b.contains(Pixel(7, 8)));
        let single = Block { x: 1, y: 1, width: 1, height: 1 };
        assert!(single.corners().iter().all(|&p| p == Pixel(1, 1)));
    }

    #[test]
    fn even_block_splits_into_equal_quarters() {
        let b = Block { x: 32, y: 0, width: 32, height: 32 };
        let q = b.quarters();
        assert_eq!(
            q,
            vec![
                Block { x: 32, y: 0, width: 16, height: 16 },
                Block { x: 48, y: 0, width: 16, height: 16 },
                Block { x: 32, y: 16, width: 16, height: 16 },
                Block { x: 48, y: 16, width: 16, height: 16 },
            ]
        );
    }

    #[test]
    fn odd_and_thin_blocks_still_tile() {
        let bounds = IntegralPlane(20, 20);
        for &(w, h) in &[(5, 7), (5, 1), (1, 9), (2, 2), (1, 1), (13, 3)] {
            let b = Block { x: 2, y: 3, width: w, height: h };
            let q = b.quarters();
            assert!(q.len() <= 4);
            assert_eq!(q.iter().map(Block::area).sum::<usize>(), b.area());
            let hits = coverage(bounds, &q);
            for p in b.pixels() {
                assert_eq!(hits[bounds.offset(p)], 1, "{} in {:?}", b, p);
            }
        }
        assert_eq!(Block { x: 0, y: 0, width: 5, height: 1 }.quarters().len(), 2);
    }

    #[test]
    fn pixels_walk_rows() {
        let b = Block { x: 1, y: 2, width: 2, height: 2 };
        let p: Vec<Pixel> = b.pixels().collect();
        assert_eq!(p, vec![Pixel(1, 2), Pixel(2, 2), Pixel(1, 3), Pixel(2, 3)]);
    }

    #[test]
    fn threshold_checks_either_side() {
        assert!(Block { x: 0, y: 0, width: 5, height: 1 }.exceeds(4));
        assert!(Block { x: 0, y: 0, width: 1, height: 5 }.exceeds(4));
        assert!(!Block { x: 0, y: 0, width: 4, height: 4 }.exceeds(4));
    }
}
