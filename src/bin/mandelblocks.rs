// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate failure;
extern crate log;
extern crate mandelblocks;
extern crate simplelog;

use clap::{App, Arg, ArgMatches};
use failure::ResultExt;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::str::FromStr;
use std::time::Instant;

use mandelblocks::config::{parse_size, parse_viewport};
use mandelblocks::{Mode, RenderConfig};

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "out";
const SIZE: &str = "size";
const TASKS: &str = "tasks";
const MODE: &str = "mode";
const RECT: &str = "rect";
const BLOCK: &str = "block";
const MIN_BLOCK: &str = "min-block";
const ITERATIONS: &str = "iterations";
const QUIET: &str = "quiet";
const VERBOSE: &str = "verbose";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandelblocks")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Escape-time fractal renderer with an adaptive block scheduler")
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("640x480")
                .validator(|s| parse_size(&s).map(|_| ()).map_err(|e| e.to_string()))
                .help("Size of the output image"),
        )
        .arg(
            Arg::with_name(TASKS)
                .long(TASKS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1024,
                        "Could not parse task count",
                        "Task count must be between 1 and 1024",
                    )
                })
                .help("Max number of parallel workers"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("mandelbrot.png")
                .help("Name of the output image file"),
        )
        .arg(
            Arg::with_name(MODE)
                .long(MODE)
                .takes_value(true)
                .default_value("seq")
                .validator(|s| Mode::from_str(&s).map(|_| ()).map_err(|e| e.to_string()))
                .help("Scheduler: seq, px, row, workers"),
        )
        .arg(
            Arg::with_name(RECT)
                .long(RECT)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0:2.0:-1.0:1.0")
                .validator(|s| parse_viewport(&s).map(|_| ()).map_err(|e| e.to_string()))
                .help("Part of the complex plane, xMin:xMax:yMin:yMax"),
        )
        .arg(
            Arg::with_name(BLOCK)
                .long(BLOCK)
                .short("b")
                .takes_value(true)
                .default_value("32x32")
                .validator(|s| parse_size(&s).map(|_| ()).map_err(|e| e.to_string()))
                .help("Size of the initial blocks in workers mode"),
        )
        .arg(
            Arg::with_name(MIN_BLOCK)
                .long(MIN_BLOCK)
                .takes_value(true)
                .default_value("4")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096,
                        "Could not parse minimum block size",
                        "Minimum block size must be between 1 and 4096",
                    )
                })
                .help("Blocks at or under this size are evaluated pixel by pixel"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        200_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 200000",
                    )
                })
                .help("Iterations per point before giving up"),
        )
        .arg(
            Arg::with_name(QUIET)
                .long(QUIET)
                .short("q")
                .help("Log nothing while rendering"),
        )
        .arg(
            Arg::with_name(VERBOSE)
                .long(VERBOSE)
                .short("v")
                .multiple(true)
                .help("More logging; repeat for per-task detail"),
        )
        .get_matches()
}

fn config(matches: &ArgMatches) -> Result<RenderConfig, failure::Error> {
    let (width, height) = parse_size(matches.value_of(SIZE).unwrap_or_default())?;
    let (block_width, block_height) = parse_size(matches.value_of(BLOCK).unwrap_or_default())?;
    Ok(RenderConfig {
        width,
        height,
        viewport: parse_viewport(matches.value_of(RECT).unwrap_or_default())?,
        mode: Mode::from_str(matches.value_of(MODE).unwrap_or_default())?,
        tasks: usize::from_str(matches.value_of(TASKS).unwrap_or_default())
            .context("Could not parse task count")?,
        block_width,
        block_height,
        min_block: usize::from_str(matches.value_of(MIN_BLOCK).unwrap_or_default())
            .context("Could not parse minimum block size")?,
        max_iterations: usize::from_str(matches.value_of(ITERATIONS).unwrap_or_default())
            .context("Could not parse iteration count")?,
        quiet: matches.is_present(QUIET),
    })
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let start = Instant::now();
    let config = config(matches)?;
    let output = matches.value_of(OUTPUT).unwrap_or("mandelbrot.png");

    let rendering = mandelblocks::render(&config)?;
    info!("Rendering took {:?}", rendering.elapsed);
    if let Some(report) = &rendering.report {
        info!(
            "{} initial blocks, {} leaves, deepest at {}",
            report.initial_blocks,
            report.leaves.len(),
            report.max_depth()
        );
    }
    rendering
        .canvas
        .save_png(output)
        .with_context(|_| format!("Could not write {}", output))?;

    info!("Execution took {:?}", start.elapsed());
    Ok(())
}

fn main() {
    let matches = args();
    let level = match matches.occurrences_of(VERBOSE) {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("Could not start logging: {}", e);
    }

    if let Err(e) = run(&matches) {
        let causes: Vec<String> = e.iter_chain().map(|c| c.to_string()).collect();
        error!("Render failure: {}", causes.join(": "));
        std::process::exit(1);
    }
}
