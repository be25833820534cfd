//! The geometry of a render: the rectangle of the complex plane being
//! drawn, the pixel grid it is drawn onto, and the division of that
//! grid into per-worker bands.

use num::Complex;
use std::ops::Range;

/// A rectangle on the complex plane, the region mapped onto an image
/// or onto one band of it.  Edges are finite with `xmin < xmax` and
/// `ymin < ymax`; both are guaranteed by request validation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneRect {
    /// Left edge.
    pub xmin: f64,
    /// Right edge.
    pub xmax: f64,
    /// Lower edge.
    pub ymin: f64,
    /// Upper edge.
    pub ymax: f64,
}

/// Everything needed to describe one render: where on the plane to
/// look, how many pixels to produce, how deep to iterate, and how
/// many workers to use.
#[derive(Copy, Clone, Debug)]
pub struct RenderRequest {
    /// Center of the rendered region on the complex plane.
    pub center: Complex<f64>,
    /// Half-width of the rendered region in plane units.
    pub scale: f64,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Iteration cap per pixel.
    pub limit: u32,
    /// Number of worker threads, one band each.
    pub threads: usize,
}

/// A render that cannot start.  Every variant is caught before any
/// worker thread is launched.
#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    /// Width or height is zero.
    #[fail(display = "image dimensions must be positive, got {}x{}", width, height)]
    BadDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// The scale is zero, negative, or not a number.
    #[fail(display = "scale must be positive and finite, got {}", _0)]
    BadScale(f64),
    /// The center is not a finite point.
    #[fail(display = "center must be finite, got ({}, {})", _0, _1)]
    BadCenter(f64, f64),
    /// The iteration cap is zero.
    #[fail(display = "iteration limit must be positive")]
    ZeroLimit,
    /// The thread count is zero.
    #[fail(display = "at least one thread is required")]
    ZeroThreads,
    /// The pixel buffer does not match the requested dimensions.
    #[fail(
        display = "pixel buffer is {}x{} but the request is for {}x{}",
        buffer_width, buffer_height, width, height
    )]
    SizeMismatch {
        /// Width of the buffer handed in.
        buffer_width: usize,
        /// Height of the buffer handed in.
        buffer_height: usize,
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
}

impl RenderRequest {
    /// Checks the request invariants, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::BadDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::BadScale(self.scale));
        }
        if !self.center.re.is_finite() || !self.center.im.is_finite() {
            return Err(ConfigError::BadCenter(self.center.re, self.center.im));
        }
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }

    /// The full rectangle of the plane covered by the image, `scale`
    /// units out from the center in every direction.
    pub fn plane(&self) -> PlaneRect {
        PlaneRect {
            xmin: self.center.re - self.scale,
            xmax: self.center.re + self.scale,
            ymin: self.center.im - self.scale,
            ymax: self.center.im + self.scale,
        }
    }

    /// Splits the image into one band per thread.
    ///
    /// Band `k` of `n` owns rows `[(k-1) * height/n, k * height/n)`
    /// using integer division, so when the height does not divide
    /// evenly the trailing rows belong to no band and keep whatever
    /// color the buffer was reset to.  Every band is handed the same
    /// plane rectangle: the full width of the image horizontally, and
    /// vertically a strip of `2 * scale / n` hanging from the
    /// center's imaginary part.  Workers interpolate rows against
    /// that shared rectangle using image-global row numbers, which
    /// makes consecutive bands sweep adjacent strips of the plane
    /// (see [`Band::point_at`]).
    pub fn bands(&self) -> Vec<Band> {
        let yscale = self.scale / (self.threads as f64);
        let ycenter = self.center.im - yscale;
        let rect = PlaneRect {
            xmin: self.center.re - self.scale,
            xmax: self.center.re + self.scale,
            ymin: ycenter - yscale,
            ymax: ycenter + yscale,
        };
        let band_rows = self.height / self.threads;
        (1..=self.threads)
            .map(|index| Band {
                index,
                rows: band_rows * (index - 1)..band_rows * index,
                rect,
            })
            .collect()
    }
}

/// One worker's share of the image: a contiguous range of rows and
/// the plane rectangle those rows are interpolated against.
#[derive(Clone, Debug)]
pub struct Band {
    /// Band number, 1-based to match worker thread names.
    pub index: usize,
    /// The image rows this band owns.
    pub rows: Range<usize>,
    /// The plane rectangle this band samples.
    pub rect: PlaneRect,
}

impl Band {
    /// Maps a pixel to its point on the complex plane.
    ///
    /// `row` is the image-global row number and the vertical step is
    /// `(ymax - ymin) / row_count`, so a band whose rows start at
    /// `r` begins sampling `r` steps past `ymin`.  Consecutive bands
    /// therefore cover adjacent vertical strips of the plane even
    /// though they share a single rectangle.
    pub fn point_at(&self, column: usize, row: usize, width: usize) -> Complex<f64> {
        let rows = self.rows.len() as f64;
        Complex::new(
            self.rect.xmin + (column as f64) * (self.rect.xmax - self.rect.xmin) / (width as f64),
            self.rect.ymin + (row as f64) * (self.rect.ymax - self.rect.ymin) / rows,
        )
    }
}
