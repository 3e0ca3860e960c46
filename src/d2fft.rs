//! Two dimensional complex FFTs on doubly periodic fields.
//!
//! A `D2FFT` holds the forward and reverse plans for a fixed (nx, ny) shape
//! and transforms along both axes of an array indexed `[[ix, iy]]`. The
//! forward (physical -> spectral) transform is unnormalised and the reverse
//! (spectral -> physical) transform divides by nx*ny, so that
//! `spctop(ptospc(u)) == u`.
//!
//! Plans are immutable and shareable between threads; every call allocates
//! its own working copy and scratch space.

use {
    crate::error::{Error, Result},
    ndarray::{Array2, ArrayView2, ArrayViewMut2, Axis, Zip},
    rayon::prelude::*,
    rustfft::{num_complex::Complex64, Fft, FftPlanner},
    std::{fmt, sync::Arc},
};

#[derive(Clone)]
pub struct D2FFT {
    pub nx: usize,
    pub ny: usize,
    xfor: Arc<dyn Fft<f64>>,
    xrev: Arc<dyn Fft<f64>>,
    yfor: Arc<dyn Fft<f64>>,
    yrev: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for D2FFT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("D2FFT")
            .field("nx", &self.nx)
            .field("ny", &self.ny)
            .finish()
    }
}

impl D2FFT {
    pub fn new(nx: usize, ny: usize) -> Self {
        let mut planner = FftPlanner::new();

        Self {
            nx,
            ny,
            xfor: planner.plan_fft_forward(nx),
            xrev: planner.plan_fft_inverse(nx),
            yfor: planner.plan_fft_forward(ny),
            yrev: planner.plan_fft_inverse(ny),
        }
    }

    fn check(&self, what: &'static str, found: (usize, usize)) -> Result<()> {
        if found == (self.nx, self.ny) {
            Ok(())
        } else {
            Err(Error::Shape {
                what,
                expected: (self.nx, self.ny),
                found,
            })
        }
    }

    /// Performs a physical -> spectral transform of the real field rvar(nx,ny)
    /// and returns the result in svar(nx,ny).
    pub fn ptospc(&self, rvar: ArrayView2<f64>, mut svar: ArrayViewMut2<Complex64>) -> Result<()> {
        self.check("physical field", rvar.dim())?;
        self.check("spectral output", svar.dim())?;

        Zip::from(&mut svar)
            .and(&rvar)
            .par_for_each(|s, &r| *s = Complex64::new(r, 0.0));

        self.forward(svar)
    }

    /// Performs a spectral -> physical transform of svar(nx,ny) and returns
    /// the real part in rvar(nx,ny). The imaginary part is discarded.
    pub fn spctop(&self, svar: ArrayView2<Complex64>, mut rvar: ArrayViewMut2<f64>) -> Result<()> {
        self.check("spectral field", svar.dim())?;
        self.check("physical output", rvar.dim())?;

        let mut wks = svar.to_owned();
        self.reverse(wks.view_mut())?;

        Zip::from(&mut rvar).and(&wks).par_for_each(|r, s| *r = s.re);

        Ok(())
    }

    /// In-place forward transform of a complex field.
    pub fn forward(&self, mut var: ArrayViewMut2<Complex64>) -> Result<()> {
        self.check("spectral field", var.dim())?;

        transform_lanes(&*self.yfor, var.view_mut(), Axis(1));
        transform_lanes(&*self.xfor, var.view_mut(), Axis(0));

        Ok(())
    }

    /// In-place normalised reverse transform of a complex field.
    pub fn reverse(&self, mut var: ArrayViewMut2<Complex64>) -> Result<()> {
        self.check("spectral field", var.dim())?;

        transform_lanes(&*self.xrev, var.view_mut(), Axis(0));
        transform_lanes(&*self.yrev, var.view_mut(), Axis(1));

        let norm = 1.0 / (self.nx * self.ny) as f64;
        var.par_mapv_inplace(|x| x * norm);

        Ok(())
    }

    /// Convenience wrapper around `ptospc` allocating the output.
    pub fn to_spectral(&self, rvar: ArrayView2<f64>) -> Result<Array2<Complex64>> {
        let mut svar = Array2::<Complex64>::zeros((self.nx, self.ny));
        self.ptospc(rvar, svar.view_mut())?;
        Ok(svar)
    }

    /// Convenience wrapper around `spctop` allocating the output.
    pub fn to_physical(&self, svar: ArrayView2<Complex64>) -> Result<Array2<f64>> {
        let mut rvar = Array2::<f64>::zeros((self.nx, self.ny));
        self.spctop(svar, rvar.view_mut())?;
        Ok(rvar)
    }
}

/// Applies a 1d FFT to every lane of var along axis, one lane per task with
/// a buffer and scratch space per worker.
fn transform_lanes(fft: &dyn Fft<f64>, mut var: ArrayViewMut2<Complex64>, axis: Axis) {
    let len = var.len_of(axis);
    let across = Axis(1 - axis.index());

    var.axis_iter_mut(across).into_par_iter().for_each_init(
        || {
            (
                vec![Complex64::default(); len],
                vec![Complex64::default(); fft.get_inplace_scratch_len()],
            )
        },
        |(buffer, scratch), mut lane| {
            buffer
                .iter_mut()
                .zip(lane.iter())
                .for_each(|(b, x)| *b = *x);

            fft.process_with_scratch(buffer, scratch);

            lane.iter_mut()
                .zip(buffer.iter())
                .for_each(|(x, b)| *x = *b);
        },
    );
}
