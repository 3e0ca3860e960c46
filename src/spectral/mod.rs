//! Module containing the spectral operators of the vorticity-streamfunction
//! formulation: wavenumbers, inversion, Jacobians and spectra.


pub mod corners;
pub mod filter;

use {
    crate::{
        constants::{DOMAIN_LENGTH, K2_ZERO_MODE},
        d2fft::D2FFT,
        error::{Error, Result},
        utils::{carr2zero, with_closure},
    },
    core::f64::consts::PI,
    log::debug,
    ndarray::{s, Array1, Array2, ArrayView2, Zip},
    rayon::prelude::*,
    rustfft::num_complex::Complex64,
};

/// One shell of the radial energy spectrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shell {
    /// Shell index, covering k-1/2 < |k| < k+1/2
    pub k: usize,
    /// Average spectral energy density of the modes in the shell
    pub energy: f64,
    /// Number of modes in the shell
    pub modes: usize,
}

#[derive(Debug, Clone)]
pub struct Spectral {
    pub nx: usize,
    pub ny: usize,
    pub dx: f64,
    pub dy: f64,

    // Wavenumbers in periodic ordering
    pub kx: Array1<f64>,
    pub ky: Array1<f64>,
    // kx^2 + ky^2, with the (0,0) entry replaced by K2_ZERO_MODE
    pub k2: Array2<f64>,

    pub d2fft: D2FFT,
    // For the de-aliased products on the (2nx, 2ny) grid
    pub d2fft_padded: D2FFT,
}

/// Angular wavenumbers of an n point periodic grid with spacing d. Index
/// i < n/2 holds i*2π/(n*d) and index i >= n/2 holds (i-n)*2π/(n*d).
pub fn wavenumbers(n: usize, d: f64) -> Array1<f64> {
    let sc = 2.0 * PI / (n as f64 * d);

    Array1::from_shape_fn(n, |i| {
        if i < n / 2 {
            sc * i as f64
        } else {
            sc * (i as f64 - n as f64)
        }
    })
}

impl Spectral {
    pub fn new(nx: usize, ny: usize) -> Result<Self> {
        if nx < 2 || ny < 2 || nx % 2 != 0 || ny % 2 != 0 {
            return Err(Error::Resolution { nx, ny });
        }

        let dx = DOMAIN_LENGTH / nx as f64;
        let dy = DOMAIN_LENGTH / ny as f64;

        let kx = wavenumbers(nx, dx);
        let ky = wavenumbers(ny, dy);

        let mut k2 = Array2::from_shape_fn((nx, ny), |(i, j)| kx[i].powi(2) + ky[j].powi(2));
        k2[[0, 0]] = K2_ZERO_MODE;

        Ok(Self {
            nx,
            ny,
            dx,
            dy,
            kx,
            ky,
            k2,
            d2fft: D2FFT::new(nx, ny),
            d2fft_padded: D2FFT::new(2 * nx, 2 * ny),
        })
    }

    /// Largest shell index of the radial spectrum
    pub fn kmax(&self) -> usize {
        let r = (((self.nx * self.nx + self.ny * self.ny) as f64).sqrt() / 2.0).floor() as usize;
        r.saturating_sub(1)
    }

    /// Transforms a physical field to spectral space. Accepts either the
    /// (nx,ny) periodic field or the (nx+1,ny+1) field with periodic closure.
    pub fn to_spectral(&self, w: ArrayView2<f64>) -> Result<Array2<Complex64>> {
        let (nx, ny) = (self.nx, self.ny);

        match w.dim() {
            (mx, my) if (mx, my) == (nx, ny) || (mx, my) == (nx + 1, ny + 1) => {
                self.d2fft.to_spectral(w.slice(s![..nx, ..ny]))
            }
            found => Err(Error::Shape {
                what: "physical field",
                expected: (nx + 1, ny + 1),
                found,
            }),
        }
    }

    /// Rejects a spectral field that is not (nx,ny).
    fn check_spectral(&self, what: &'static str, fs: ArrayView2<Complex64>) -> Result<()> {
        if fs.dim() == (self.nx, self.ny) {
            Ok(())
        } else {
            Err(Error::Shape {
                what,
                expected: (self.nx, self.ny),
                found: fs.dim(),
            })
        }
    }

    /// Transforms a spectral field to physical space and applies the
    /// periodic closure, returning an (nx+1,ny+1) array.
    pub fn to_physical(&self, fs: ArrayView2<Complex64>) -> Result<Array2<f64>> {
        Ok(with_closure(self.d2fft.to_physical(fs)?.view()))
    }

    /// Solves grad^2 u = f with periodic boundaries, given f in spectral space.
    /// The (0,0) mode of f must be zero; it is not checked here.
    /// Returns u in physical space with periodic closure.
    pub fn poisson(&self, fs: ArrayView2<Complex64>) -> Result<Array2<f64>> {
        self.check_spectral("poisson source", fs)?;

        let mut us = carr2zero(self.nx, self.ny);
        Zip::from(&mut us)
            .and(&fs)
            .and(&self.k2)
            .par_for_each(|us, &fs, &k2| *us = fs / (-k2));

        self.to_physical(us.view())
    }

    /// Streamfunction psi (grad^2 psi = -omega) from spectral vorticity wf.
    pub fn streamfunction(&self, wf: ArrayView2<Complex64>) -> Result<Array2<f64>> {
        self.poisson(wf.mapv(|w| -w).view())
    }

    /// Spectral fields of -dpsi/dx, domega/dy, -dpsi/dy and domega/dx, with
    /// psi = omega/k^2.
    fn derivative_fields(&self, wf: ArrayView2<Complex64>) -> Vec<Array2<Complex64>> {
        let (nx, ny) = (self.nx, self.ny);

        let mut j1f = carr2zero(nx, ny);
        let mut j2f = carr2zero(nx, ny);
        let mut j3f = carr2zero(nx, ny);
        let mut j4f = carr2zero(nx, ny);

        Zip::indexed(&mut j1f)
            .and(&mut j2f)
            .and(&mut j3f)
            .and(&mut j4f)
            .and(&wf)
            .par_for_each(|(i, j), j1f, j2f, j3f, j4f, &w| {
                let ikx = Complex64::new(0.0, self.kx[i]);
                let iky = Complex64::new(0.0, self.ky[j]);
                let psi = w / self.k2[[i, j]];

                *j1f = -ikx * psi;
                *j2f = iky * w;
                *j3f = -iky * psi;
                *j4f = ikx * w;
            });

        vec![j1f, j2f, j3f, j4f]
    }

    /// Computes the Jacobian J(psi, omega) = psi_y*omega_x - psi_x*omega_y
    /// of the spectral vorticity wf, returned in spectral space.
    ///
    /// NOTE: the product is formed on the (nx,ny) grid and is therefore
    /// aliased. Use `jacobian_dealiased` for time stepping.
    pub fn jacobian(&self, wf: ArrayView2<Complex64>) -> Result<Array2<Complex64>> {
        self.check_spectral("vorticity", wf)?;

        let physical = self
            .derivative_fields(wf)
            .into_par_iter()
            .map(|fs| self.d2fft.to_physical(fs.view()))
            .collect::<Result<Vec<Array2<f64>>>>()?;

        self.d2fft.to_spectral(product(&physical).view())
    }

    /// Computes the Jacobian J(psi, omega) of the spectral vorticity wf with
    /// the product formed on the zero-padded (2nx,2ny) grid, which removes
    /// the aliasing error of the quadratic term.
    pub fn jacobian_dealiased(&self, wf: ArrayView2<Complex64>) -> Result<Array2<Complex64>> {
        self.check_spectral("vorticity", wf)?;

        let (nx, ny) = (self.nx, self.ny);
        let (nxe, nye) = (2 * nx, 2 * ny);
        let scale = (nxe * nye) as f64 / (nx * ny) as f64;

        // The four inverse transforms are independent:
        let physical = self
            .derivative_fields(wf)
            .into_par_iter()
            .map(|fs| {
                let mut padded = corners::pad(fs.view(), nxe, nye);
                padded.mapv_inplace(|x| x * scale);
                self.d2fft_padded.to_physical(padded.view())
            })
            .collect::<Result<Vec<Array2<f64>>>>()?;

        let jacpf = self.d2fft_padded.to_spectral(product(&physical).view())?;

        let mut jf = corners::truncate(jacpf.view(), nx, ny);
        jf.mapv_inplace(|x| x / scale);
        Ok(jf)
    }

    /// Kinetic energy per unit area of the spectral vorticity wf.
    pub fn energy(&self, wf: ArrayView2<Complex64>) -> f64 {
        let norm = 1.0 / (self.nx * self.ny) as f64;
        let mut sum = 0.0;

        Zip::indexed(&wf).and(&self.k2).for_each(|(i, j), w, &k2| {
            if (i, j) != (0, 0) {
                sum += (w.norm() * norm).powi(2) / k2;
            }
        });

        0.5 * sum
    }

    /// Enstrophy per unit area of the spectral vorticity wf.
    pub fn enstrophy(&self, wf: ArrayView2<Complex64>) -> f64 {
        let norm = 1.0 / (self.nx * self.ny) as f64;
        0.5 * wf.iter().map(|w| (w.norm() * norm).powi(2)).sum::<f64>()
    }

    /// Computes the radial energy spectrum of the physical vorticity w.
    ///
    /// The energy density of each mode, pi*|w_k/(nx*ny)|^2/|k|, is averaged
    /// over the shells k = 1..=kmax. Modes with kx = 0 or ky = 0 are not
    /// binned. A shell without modes has zero energy.
    pub fn spectrum(&self, w: ArrayView2<f64>) -> Result<Vec<Shell>> {
        let wf = self.to_spectral(w)?;
        let kmax = self.kmax();
        let norm = 1.0 / (self.nx * self.ny) as f64;

        let mut sums = vec![0.0; kmax + 1];
        let mut modes = vec![0usize; kmax + 1];

        Zip::indexed(&wf).and(&self.k2).for_each(|(i, j), w, &k2| {
            if i == 0 || j == 0 {
                return;
            }
            let kk = k2.sqrt();
            let k = kk.round() as usize;
            if (1..=kmax).contains(&k) && (kk - k as f64).abs() < 0.5 {
                sums[k] += PI * (w.norm() * norm).powi(2) / kk;
                modes[k] += 1;
            }
        });

        Ok((1..=kmax)
            .map(|k| {
                let energy = if modes[k] == 0 {
                    debug!("Spectrum shell {} contains no modes", k);
                    0.0
                } else {
                    sums[k] / modes[k] as f64
                };

                Shell {
                    k,
                    energy,
                    modes: modes[k],
                }
            })
            .collect())
    }
}

/// Forms j1*j2 - j3*j4 from the four physical derivative fields.
fn product(j: &[Array2<f64>]) -> Array2<f64> {
    let mut jacp = Array2::<f64>::zeros(j[0].dim());

    Zip::from(&mut jacp)
        .and(&j[0])
        .and(&j[1])
        .and(&j[2])
        .and(&j[3])
        .par_for_each(|jacp, &j1, &j2, &j3, &j4| *jacp = j1 * j2 - j3 * j4);

    jacp
}
