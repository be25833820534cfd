// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The worker task and the coordinator.
//!
//! One render spawns one worker thread per band.  The pixel buffer
//! is split into disjoint row-range slices before any worker starts,
//! so the workers share nothing mutable and need no locks.  A worker
//! that fails to launch, or dies mid-band, costs the image exactly
//! that band's rows and nothing else.

extern crate crossbeam;

use bitmap::{Bitmap, PIXEL_BYTES};
use color::ColorScheme;
use escape::escape_time;
use itertools::iproduct;
use planes::{Band, ConfigError, RenderRequest};
use std::any::Any;
use std::io;
use std::ops::Range;

/// Why one band's worker did not finish.
#[derive(Debug, Fail)]
pub enum BandFailure {
    /// The worker thread could not be started.
    #[fail(display = "worker thread failed to launch: {}", _0)]
    Launch(#[fail(cause)] io::Error),
    /// The worker thread panicked before finishing its rows.
    #[fail(display = "worker thread panicked: {}", _0)]
    Panicked(String),
}

/// The outcome of one band, reported by the coordinator.
#[derive(Debug)]
pub struct BandOutcome {
    /// Band number, 1-based.
    pub band: usize,
    /// The rows the band was assigned.  On failure these rows remain
    /// at the buffer's background color.
    pub rows: Range<usize>,
    /// Whether the band's worker ran to completion.
    pub result: Result<(), BandFailure>,
}

/// Per-band outcomes for a whole render.  The render as such has
/// succeeded once this exists; individual bands may still have
/// failed.
#[derive(Debug)]
pub struct RenderReport {
    /// One entry per band, in band order.
    pub bands: Vec<BandOutcome>,
}

impl RenderReport {
    /// True when every band ran to completion.
    pub fn is_complete(&self) -> bool {
        self.bands.iter().all(|band| band.result.is_ok())
    }

    /// The bands that did not run to completion.
    pub fn failures(&self) -> impl Iterator<Item = &BandOutcome> {
        self.bands.iter().filter(|band| band.result.is_err())
    }
}

/// Renders one band into its slice of the pixel buffer.
///
/// `pixels` holds exactly the band's rows.  Every pixel in the band
/// is mapped to a plane point, iterated, colored, and written; an
/// empty band writes nothing and returns at once.
fn render_band<S>(band: &Band, width: usize, limit: u32, scheme: &S, pixels: &mut [u8])
where
    S: ColorScheme,
{
    let row_start = band.rows.start;
    for (row, column) in iproduct!(band.rows.clone(), 0..width) {
        let point = band.point_at(column, row, width);
        let color = scheme.map(escape_time(point, limit), limit);
        let offset = ((row - row_start) * width + column) * PIXEL_BYTES;
        pixels[offset..offset + PIXEL_BYTES].copy_from_slice(&color.channels());
    }
}

/// Renders the requested image into `bitmap`, one worker per band.
///
/// Validation failures abort the render before any thread starts.
/// After that the coordinator always runs to the end: a band whose
/// worker cannot be launched, or whose worker panics, is logged and
/// recorded in the report while the remaining bands keep going.
/// Rows belonging to a failed band, like remainder rows belonging to
/// no band, are left at whatever color the buffer already held.
pub fn render<S>(
    request: &RenderRequest,
    scheme: &S,
    bitmap: &mut Bitmap,
) -> Result<RenderReport, ConfigError>
where
    S: ColorScheme + Sync,
{
    request.validate()?;
    if bitmap.width() != request.width || bitmap.height() != request.height {
        return Err(ConfigError::SizeMismatch {
            buffer_width: bitmap.width(),
            buffer_height: bitmap.height(),
            width: request.width,
            height: request.height,
        });
    }

    let bands = request.bands();
    let width = request.width;
    let limit = request.limit;
    let band_bytes = (request.height / request.threads) * width * PIXEL_BYTES;

    let outcomes = crossbeam::scope(|spawner| {
        let mut rest: &mut [u8] = bitmap.raw_mut();
        let mut handles = Vec::with_capacity(bands.len());
        for band in &bands {
            // Rows past threads * band_rows stay in `rest` and are
            // never handed to any worker.
            let (slice, tail) = rest.split_at_mut(band_bytes);
            rest = tail;
            debug!("creating worker for band {}", band.index);
            let handle = spawner
                .builder()
                .name(format!("band-{}", band.index))
                .spawn(move |_| render_band(band, width, limit, scheme, slice));
            handles.push((band, handle));
        }
        handles
            .into_iter()
            .map(|(band, handle)| {
                let result = match handle {
                    Err(cause) => {
                        error!("couldn't create worker for band {}: {}", band.index, cause);
                        Err(BandFailure::Launch(cause))
                    }
                    Ok(handle) => {
                        debug!("joining worker for band {}", band.index);
                        handle.join().map_err(|payload| {
                            let message = panic_message(payload);
                            error!("worker for band {} panicked: {}", band.index, message);
                            BandFailure::Panicked(message)
                        })
                    }
                };
                BandOutcome {
                    band: band.index,
                    rows: band.rows.clone(),
                    result,
                }
            })
            .collect()
    })
    .unwrap();

    Ok(RenderReport { bands: outcomes })
}

fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown cause".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color::{Color, Grayscale};
    use num::Complex;
    use planes::PlaneRect;

    const BACKGROUND: Color = Color::rgba(0, 0, 255, 0);

    fn request(width: usize, height: usize, threads: usize) -> RenderRequest {
        RenderRequest {
            center: Complex::new(0.0, 0.0),
            scale: 4.0,
            width,
            height,
            limit: 10,
            threads,
        }
    }

    fn background_bitmap(width: usize, height: usize) -> Bitmap {
        let mut bitmap = Bitmap::new(width, height);
        bitmap.reset(BACKGROUND);
        bitmap
    }

    #[test]
    fn a_single_band_covers_every_pixel() {
        let request = request(4, 4, 1);
        let mut bitmap = background_bitmap(4, 4);
        let report = render(&request, &Grayscale, &mut bitmap).unwrap();
        assert!(report.is_complete());
        // Grayscale pixels have equal channels, so none can still be
        // the blue background.
        for y in 0..4 {
            for x in 0..4 {
                assert_ne!(bitmap.get(x, y), BACKGROUND);
            }
        }
    }

    #[test]
    fn remainder_rows_keep_the_background_color() {
        let request = request(6, 10, 3);
        let mut bitmap = background_bitmap(6, 10);
        let report = render(&request, &Grayscale, &mut bitmap).unwrap();
        assert!(report.is_complete());
        for x in 0..6 {
            assert_ne!(bitmap.get(x, 8), BACKGROUND);
            assert_eq!(bitmap.get(x, 9), BACKGROUND);
        }
    }

    #[test]
    fn an_empty_band_writes_nothing_and_completes() {
        let band = Band {
            index: 1,
            rows: 0..0,
            rect: PlaneRect {
                xmin: -1.0,
                xmax: 1.0,
                ymin: -1.0,
                ymax: 1.0,
            },
        };
        let mut pixels: [u8; 0] = [];
        render_band(&band, 4, 10, &Grayscale, &mut pixels);
    }

    #[test]
    fn more_workers_than_rows_leaves_the_image_untouched() {
        let request = request(4, 2, 5);
        let mut bitmap = background_bitmap(4, 2);
        let report = render(&request, &Grayscale, &mut bitmap).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.bands.len(), 5);
        for y in 0..2 {
            for x in 0..4 {
                assert_eq!(bitmap.get(x, y), BACKGROUND);
            }
        }
    }

    #[test]
    fn the_same_request_renders_identically_twice() {
        let request = request(16, 16, 4);
        let mut first = background_bitmap(16, 16);
        let mut second = background_bitmap(16, 16);
        render(&request, &Grayscale, &mut first).unwrap();
        render(&request, &Grayscale, &mut second).unwrap();
        assert_eq!(first.raw(), second.raw());
    }

    #[test]
    fn a_mismatched_buffer_is_refused() {
        let request = request(4, 4, 1);
        let mut bitmap = background_bitmap(3, 4);
        assert!(render(&request, &Grayscale, &mut bitmap).is_err());
    }

    #[test]
    fn an_invalid_request_is_refused() {
        let mut bad = request(4, 4, 1);
        bad.scale = 0.0;
        let mut bitmap = background_bitmap(4, 4);
        assert!(render(&bad, &Grayscale, &mut bitmap).is_err());
    }

    struct Panicky;

    impl ColorScheme for Panicky {
        fn map(&self, _iterations: u32, _limit: u32) -> Color {
            panic!("no colors today");
        }
    }

    #[test]
    fn panicking_workers_are_reported_not_propagated() {
        let request = request(4, 4, 2);
        let mut bitmap = background_bitmap(4, 4);
        let report = render(&request, &Panicky, &mut bitmap).unwrap();
        assert!(!report.is_complete());
        assert_eq!(report.failures().count(), 2);
        for outcome in report.failures() {
            match outcome.result {
                Err(BandFailure::Panicked(ref message)) => {
                    assert!(message.contains("no colors today"));
                }
                _ => panic!("expected a panicked band"),
            }
        }
        // The workers died before writing anything.
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(bitmap.get(x, y), BACKGROUND);
            }
        }
    }
}
