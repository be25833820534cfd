extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate mandel;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use mandel::{Bitmap, Color, Grayscale, RenderRequest};
use num::Complex;
use std::path::Path;
use std::process;
use std::str::FromStr;

/// The color every pixel starts out as.  Rows no band covers, and
/// rows whose worker failed, keep this dark blue in the output.
const BACKGROUND: Color = Color::rgba(0, 0, 255, 0);

const CENTER_X: &str = "center-x";
const CENTER_Y: &str = "center-y";
const SCALE: &str = "scale";
const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const MAX_ITERATIONS: &str = "max-iterations";
const OUTPUT: &str = "output";
const THREADS: &str = "threads";

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

fn validate_positive(
    s: &str,
    isnotanumber_err: &str,
    isnotpositive_err: &str,
) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(value) => {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(isnotpositive_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

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

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .about("Threaded Mandelbrot renderer")
        .arg(
            Arg::with_name(CENTER_X)
                .required(false)
                .long(CENTER_X)
                .short("x")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse center x coordinate"))
                .help("X coordinate of the image center point"),
        )
        .arg(
            Arg::with_name(CENTER_Y)
                .required(false)
                .long(CENTER_Y)
                .short("y")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse center y coordinate"))
                .help("Y coordinate of the image center point"),
        )
        .arg(
            Arg::with_name(SCALE)
                .required(false)
                .long(SCALE)
                .short("s")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("4")
                .validator(|s| {
                    validate_positive(
                        &s,
                        "Could not parse scale",
                        "Scale must be a positive number",
                    )
                })
                .help("Scale of the image in Mandelbrot coordinates"),
        )
        .arg(
            Arg::with_name(WIDTH)
                .required(false)
                .long(WIDTH)
                .short("W")
                .takes_value(true)
                .default_value("500")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        100_000,
                        "Could not parse image width",
                        "Image width must be between 1 and 100000",
                    )
                })
                .help("Width of the image in pixels"),
        )
        .arg(
            Arg::with_name(HEIGHT)
                .required(false)
                .long(HEIGHT)
                .short("H")
                .takes_value(true)
                .default_value("500")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        100_000,
                        "Could not parse image height",
                        "Image height must be between 1 and 100000",
                    )
                })
                .help("Height of the image in pixels"),
        )
        .arg(
            Arg::with_name(MAX_ITERATIONS)
                .required(false)
                .long(MAX_ITERATIONS)
                .short("m")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u32,
                        u32::max_value(),
                        "Could not parse iteration limit",
                        "Iteration limit must be at least 1",
                    )
                })
                .help("The maximum number of iterations per point"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("mandel.png")
                .help("Output file"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("n")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads to use"),
        )
        .get_matches()
}

fn main() {
    env_logger::init();

    let matches = args();
    let request = RenderRequest {
        center: Complex::new(
            f64::from_str(matches.value_of(CENTER_X).unwrap())
                .expect("Could not parse center x coordinate"),
            f64::from_str(matches.value_of(CENTER_Y).unwrap())
                .expect("Could not parse center y coordinate"),
        ),
        scale: f64::from_str(matches.value_of(SCALE).unwrap()).expect("Could not parse scale"),
        width: usize::from_str(matches.value_of(WIDTH).unwrap())
            .expect("Could not parse image width"),
        height: usize::from_str(matches.value_of(HEIGHT).unwrap())
            .expect("Could not parse image height"),
        limit: u32::from_str(matches.value_of(MAX_ITERATIONS).unwrap())
            .expect("Could not parse iteration limit"),
        threads: usize::from_str(matches.value_of(THREADS).unwrap())
            .expect("Could not parse thread count"),
    };
    let outfile = matches.value_of(OUTPUT).unwrap();

    info!(
        "x={} y={} scale={} size={}x{} max={} threads={} outfile={}",
        request.center.re,
        request.center.im,
        request.scale,
        request.width,
        request.height,
        request.limit,
        request.threads,
        outfile
    );

    let mut bitmap = Bitmap::new(request.width, request.height);
    bitmap.reset(BACKGROUND);

    match mandel::render(&request, &Grayscale, &mut bitmap) {
        Err(e) => {
            eprintln!("mandel: {}", e);
            process::exit(1);
        }
        Ok(report) => {
            if !report.is_complete() {
                warn!(
                    "{} of {} bands failed; their rows keep the background color",
                    report.failures().count(),
                    report.bands.len()
                );
            }
        }
    }

    if let Err(e) = bitmap.save(Path::new(outfile)) {
        eprintln!("mandel: couldn't write to {}: {}", outfile, e);
        process::exit(1);
    }
}
