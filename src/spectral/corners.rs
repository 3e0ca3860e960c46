//! Four-quadrant index mapping between spectral arrays of different sizes.
//!
//! Along each axis a spectral array of (even) length n stores the
//! non-negative frequencies 0..n/2 in indices 0..n/2 and the negative
//! frequencies -n/2..-1 in indices n/2..n. Moving to a larger array of length
//! m keeps the low block at the start and moves the high block to the last
//! n/2 indices, leaving the band n/2..m-n/2 empty. Moving to a smaller array
//! is the inverse and drops that band.

use {
    ndarray::{s, Array2, ArrayView2},
    rustfft::num_complex::Complex64,
    std::ops::Range,
};

/// Index ranges (small, large) of the low and high frequency blocks along one
/// axis when mapping between lengths small <= large.
pub fn blocks(small: usize, large: usize) -> [(Range<usize>, Range<usize>); 2] {
    debug_assert!(small % 2 == 0 && small <= large);
    let half = small / 2;

    [(0..half, 0..half), (half..small, large - half..large)]
}

/// Zero-pads fs(nx,ny) into an (mx,my) array with mx >= nx, my >= ny.
pub fn pad(fs: ArrayView2<Complex64>, mx: usize, my: usize) -> Array2<Complex64> {
    let (nx, ny) = fs.dim();
    let mut out = Array2::<Complex64>::zeros((mx, my));

    for (sx, lx) in blocks(nx, mx).iter().cloned() {
        for (sy, ly) in blocks(ny, my).iter().cloned() {
            out.slice_mut(s![lx.clone(), ly])
                .assign(&fs.slice(s![sx.clone(), sy]));
        }
    }

    out
}

/// Truncates fs(mx,my) to the (nx,ny) array of its lowest frequencies,
/// with nx <= mx, ny <= my.
pub fn truncate(fs: ArrayView2<Complex64>, nx: usize, ny: usize) -> Array2<Complex64> {
    let (mx, my) = fs.dim();
    let mut out = Array2::<Complex64>::zeros((nx, ny));

    for (sx, lx) in blocks(nx, mx).iter().cloned() {
        for (sy, ly) in blocks(ny, my).iter().cloned() {
            out.slice_mut(s![sx.clone(), sy])
                .assign(&fs.slice(s![lx.clone(), ly]));
        }
    }

    out
}
