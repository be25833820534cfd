//! The escape-time recurrence at the heart of the renderer.

use num::Complex;

/// Returns the number of iterations it takes the point `c` to leave
/// the circle of radius 2 centered on the origin, capped at `limit`.
///
/// A point already outside the circle yields 0.  A point that never
/// leaves, a member of the set as far as `limit` iterations can
/// tell, yields exactly `limit`; the cap always bounds the loop.
pub fn escape_time(c: Complex<f64>, limit: u32) -> u32 {
    let mut z = c;
    let mut count = 0;
    while z.norm_sqr() <= 4.0 && count < limit {
        z = z * z + c;
        count += 1;
    }
    count
}
