// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate image;
extern crate mandelblocks;
extern crate tempfile;

use mandelblocks::config::parse_viewport;
use mandelblocks::escape::shade;
use mandelblocks::{
    escape_time, render, Mode, Pixel, PlaneMapper, RenderConfig, Resolution, Surface, Viewport,
};

fn config(width: usize, height: usize, mode: Mode) -> RenderConfig {
    RenderConfig {
        width,
        height,
        mode,
        tasks: 4,
        ..RenderConfig::default()
    }
}

#[test]
fn exact_modes_agree() {
    let seq = render(&config(48, 40, Mode::Sequential)).unwrap();
    let expected = seq.canvas.values();
    assert!(expected.iter().all(Option::is_some));
    for &mode in &[Mode::PerPixel, Mode::PerRow] {
        let other = render(&config(48, 40, mode)).unwrap();
        assert_eq!(other.canvas.values(), expected, "{} differs from seq", mode);
    }
}

#[test]
fn renders_are_repeatable() {
    for &mode in &[Mode::Sequential, Mode::PerPixel, Mode::PerRow, Mode::Workers] {
        let first = render(&config(40, 30, mode)).unwrap();
        let second = render(&config(40, 30, mode)).unwrap();
        assert_eq!(first.canvas.values(), second.canvas.values(), "{}", mode);
        assert_eq!(first.canvas.to_image().into_raw(), second.canvas.to_image().into_raw());
    }
}

#[test]
fn block_scheduler_ignores_parallelism() {
    let one = render(&RenderConfig {
        tasks: 1,
        ..config(72, 56, Mode::Workers)
    })
    .unwrap();
    for &tasks in &[2, 7] {
        let many = render(&RenderConfig {
            tasks,
            ..config(72, 56, Mode::Workers)
        })
        .unwrap();
        assert_eq!(one.canvas.values(), many.canvas.values());
        assert_eq!(one.report, many.report);
    }
}

#[test]
fn block_scheduler_only_differs_inside_bulk_fills() {
    let (w, h) = (96, 64);
    let exact = render(&config(w, h, Mode::Sequential)).unwrap();
    let blocks = render(&RenderConfig {
        block_width: 16,
        block_height: 16,
        ..config(w, h, Mode::Workers)
    })
    .unwrap();
    let report = blocks.report.expect("workers mode reports its blocks");

    let mut differing = 0;
    for y in 0..h {
        for x in 0..w {
            let p = Pixel(x, y);
            let (want, got) = (exact.canvas.get(p), blocks.canvas.get(p));
            assert!(got.is_some());
            if want != got {
                differing += 1;
                let leaf = report.leaf_at(p).expect("every pixel is in a leaf");
                assert_eq!(leaf.resolution, Resolution::BulkFill(got.unwrap()), "{:?}", p);
            }
        }
    }
    for leaf in &report.leaves {
        // corners are always evaluated, so they always match
        for &corner in leaf.block.corners().iter() {
            assert_eq!(exact.canvas.get(corner), blocks.canvas.get(corner));
        }
        if leaf.resolution == Resolution::PerPixel {
            for p in leaf.block.pixels() {
                assert_eq!(exact.canvas.get(p), blocks.canvas.get(p));
            }
        }
    }
    let bulk_area: usize = report
        .leaves
        .iter()
        .filter(|l| l.resolution != Resolution::PerPixel)
        .map(|l| l.block.area())
        .sum();
    assert!(differing <= bulk_area);
}

#[test]
fn eight_by_eight_sequential() {
    let rendering = render(&RenderConfig {
        viewport: parse_viewport("-2.0:2.0:-1.0:1.0").unwrap(),
        ..config(8, 8, Mode::Sequential)
    })
    .unwrap();
    let plane = PlaneMapper::new(8, 8, Viewport::default()).unwrap();
    let value = escape_time(plane.pixel_to_point(Pixel(0, 0)), 1000);
    assert_eq!(value, 0);
    assert_eq!(rendering.canvas.get(Pixel(0, 0)), Some(value));
    assert_eq!(*rendering.canvas.to_image().get_pixel(0, 0), shade(value));
    assert_eq!(rendering.canvas.unwritten(), 0);
    assert!(rendering
        .canvas
        .to_image()
        .pixels()
        .all(|px| px.0[3] == 255 && px.0[0] == px.0[1] && px.0[1] == px.0[2]));
}

#[test]
fn sixty_four_square_starts_with_four_blocks() {
    let rendering = render(&config(64, 64, Mode::Workers)).unwrap();
    let report = rendering.report.unwrap();
    assert_eq!(report.initial_blocks, 4);
    assert!(report.max_depth() <= 3);
    assert!(report
        .leaves
        .iter()
        .filter(|l| l.depth == 0)
        .all(|l| l.resolution != Resolution::PerPixel));
}

#[test]
fn escaping_region_is_bulk_filled_without_subdividing() {
    let rendering = render(&RenderConfig {
        viewport: Viewport::new(10.0, 20.0, 10.0, 20.0).unwrap(),
        ..config(64, 64, Mode::Workers)
    })
    .unwrap();
    let report = rendering.report.unwrap();
    assert_eq!(report.initial_blocks, 4);
    assert_eq!(report.subdivisions, 0);
    assert_eq!(report.leaves.len(), 4);
    assert!(report
        .leaves
        .iter()
        .all(|l| l.depth == 0 && l.resolution == Resolution::BulkFill(0)));
    assert!(rendering.canvas.values().iter().all(|v| *v == Some(0)));
}

#[test]
fn png_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");
    let rendering = render(&config(20, 10, Mode::PerRow)).unwrap();
    rendering.canvas.save_png(&path).unwrap();
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (20, 10));
    assert_eq!(img.into_raw(), rendering.canvas.to_image().into_raw());
}

#[test]
fn unwritable_output_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.png");
    let rendering = render(&config(4, 4, Mode::Sequential)).unwrap();
    assert!(rendering.canvas.save_png(&path).is_err());
}
