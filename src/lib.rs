#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Threaded Mandelbrot renderer
//!
//! The Mandelbrot set lives on the complex plane: a point `c` belongs
//! to it when the sequence `z = z*z + c`, started at `c`, never
//! leaves the circle of radius 2 around the origin.  Points outside
//! the set escape that circle after some number of iterations, and
//! that number, the escape time, is what this crate turns into a
//! color.
//!
//! The image is computed by a fixed pool of worker threads.  The
//! coordinator divides the rows into one horizontal band per worker
//! and hands each worker a disjoint slice of the shared pixel buffer,
//! so the buffer needs no locking at all; the partition itself is the
//! synchronization.  A worker that fails costs the image exactly its
//! own band of rows and nothing else.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;

pub mod bitmap;
pub mod color;
pub mod escape;
pub mod planes;
pub mod render;

pub use bitmap::Bitmap;
pub use color::{Color, ColorScheme, Grayscale};
pub use escape::escape_time;
pub use planes::{Band, ConfigError, PlaneRect, RenderRequest};
pub use render::{render, BandFailure, BandOutcome, RenderReport};
