use {
    ndarray::{Array2, ArrayView2},
    rustfft::num_complex::Complex64,
};

pub fn arr2zero(nx: usize, ny: usize) -> Array2<f64> {
    Array2::<f64>::zeros((nx, ny))
}

pub fn carr2zero(nx: usize, ny: usize) -> Array2<Complex64> {
    Array2::<Complex64>::zeros((nx, ny))
}

/// Copies the first row and column of u into its last row and column
/// (including the corner), so that u[[nx, ny]] == u[[0, 0]].
pub fn pbc(u: &mut Array2<f64>) {
    let (nx, ny) = (u.nrows() - 1, u.ncols() - 1);

    for i in 0..=nx {
        u[[i, ny]] = u[[i, 0]];
    }
    for j in 0..=ny {
        u[[nx, j]] = u[[0, j]];
    }
}

/// Embeds an (nx, ny) periodic field into an (nx+1, ny+1) array with the
/// periodic closure applied.
pub fn with_closure(u: ArrayView2<f64>) -> Array2<f64> {
    let (nx, ny) = u.dim();
    let mut out = arr2zero(nx + 1, ny + 1);
    out.slice_mut(ndarray::s![..nx, ..ny]).assign(&u);
    pbc(&mut out);
    out
}

pub fn is_finite(fs: ArrayView2<Complex64>) -> bool {
    fs.iter().all(|c| c.re.is_finite() && c.im.is_finite())
}

pub fn max_abs(u: ArrayView2<f64>) -> f64 {
    u.iter().fold(0.0, |m, x| m.max(x.abs()))
}

#[cfg(test)]
pub(crate) fn assert_approx_eq_complex(a: ArrayView2<Complex64>, b: ArrayView2<Complex64>, epsilon: f64) {
    assert_eq!(a.dim(), b.dim());
    for ((idx, x), y) in a.indexed_iter().zip(b.iter()) {
        assert!(
            (x - y).norm() <= epsilon,
            "mismatch at {:?}: {} != {}",
            idx,
            x,
            y
        );
    }
}
