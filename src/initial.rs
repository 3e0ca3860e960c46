//! Initial vorticity fields, sampled on the (nx+1, ny+1) node grid
//! x_i = 2πi/nx, y_j = 2πj/ny, and the exact Taylor-Green solution.

use {
    crate::{
        constants::{DHIT_K0, TGV_NQ, VM_SIGMA},
        error::Result,
        parameters::Parameters,
        spectral::Spectral,
        utils::carr2zero,
    },
    core::f64::consts::PI,
    log::info,
    ndarray::Array2,
    rand::{rngs::StdRng, Rng, SeedableRng},
    rustfft::num_complex::Complex64,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialCondition {
    TaylorGreen,
    VortexMerger,
    DecayingTurbulence,
}

impl Default for InitialCondition {
    fn default() -> Self {
        InitialCondition::TaylorGreen
    }
}

/// Generates the initial condition selected in the parameters.
pub fn generate(spectral: &Spectral, parameters: &Parameters) -> Result<Array2<f64>> {
    let condition = parameters.initial.condition;
    info!("Generating {:?} initial condition", condition);

    match condition {
        InitialCondition::TaylorGreen => Ok(taylor_green(spectral)),
        InitialCondition::VortexMerger => Ok(vortex_merger(spectral)),
        InitialCondition::DecayingTurbulence => {
            decaying_turbulence(spectral, parameters.initial.seed)
        }
    }
}

fn nodes<F: Fn(f64, f64) -> f64>(spectral: &Spectral, f: F) -> Array2<f64> {
    Array2::from_shape_fn((spectral.nx + 1, spectral.ny + 1), |(i, j)| {
        f(spectral.dx * i as f64, spectral.dy * j as f64)
    })
}

/// Taylor-Green vortex, w = 2 nq cos(nq x) cos(nq y)
pub fn taylor_green(spectral: &Spectral) -> Array2<f64> {
    exact_taylor_green(spectral, 0.0, 1.0)
}

/// Exact Taylor-Green solution at time t for Reynolds number re
pub fn exact_taylor_green(spectral: &Spectral, t: f64, re: f64) -> Array2<f64> {
    let decay = (-2.0 * TGV_NQ * TGV_NQ * t / re).exp();

    nodes(spectral, |x, y| {
        2.0 * TGV_NQ * (TGV_NQ * x).cos() * (TGV_NQ * y).cos() * decay
    })
}

/// Two co-rotating Gaussian vortices centred at (3π/4, π) and (5π/4, π)
pub fn vortex_merger(spectral: &Spectral) -> Array2<f64> {
    let (xc1, yc1) = (PI - PI / 4.0, PI);
    let (xc2, yc2) = (PI + PI / 4.0, PI);

    nodes(spectral, |x, y| {
        (-VM_SIGMA * ((x - xc1).powi(2) + (y - yc1).powi(2))).exp()
            + (-VM_SIGMA * ((x - xc2).powi(2) + (y - yc2).powi(2))).exp()
    })
}

/// Energy spectrum E(k) = 4/(3 sqrt(π) k0^5) k^4 exp(-(k/k0)^2) of the
/// decaying turbulence initial condition.
pub fn prescribed_spectrum(k: f64) -> f64 {
    let c = 4.0 / (3.0 * PI.sqrt() * DHIT_K0.powi(5));
    c * k.powi(4) * (-(k / DHIT_K0).powi(2)).exp()
}

/// Random-phase vorticity field whose radial spectrum follows
/// `prescribed_spectrum`.
///
/// Two phase arrays ξ and η are drawn uniformly on [0, 2π) and the mode
/// (±kx, ±ky) receives phase ±ξ ± η, which makes the field Hermitian. Modes
/// on the axes and at the Nyquist frequency are left empty.
pub fn decaying_turbulence(spectral: &Spectral, seed: u64) -> Result<Array2<f64>> {
    let (nx, ny) = (spectral.nx, spectral.ny);
    let (hx, hy) = (nx / 2, ny / 2);

    let mut rng = StdRng::seed_from_u64(seed);
    let ksi = Array2::from_shape_fn((hx + 1, hy + 1), |_| 2.0 * PI * rng.gen::<f64>());
    let eta = Array2::from_shape_fn((hx + 1, hy + 1), |_| 2.0 * PI * rng.gen::<f64>());

    let mut wf = carr2zero(nx, ny);
    let norm = (nx * ny) as f64;

    for i in 1..hx {
        for j in 1..hy {
            let (x, e) = (ksi[[i, j]], eta[[i, j]]);

            for &(ii, jj, phase) in &[
                (i, j, x + e),
                (nx - i, j, -x + e),
                (i, ny - j, x - e),
                (nx - i, ny - j, -x - e),
            ] {
                let kk = spectral.k2[[ii, jj]].sqrt();
                let amplitude = (kk * prescribed_spectrum(kk) / PI).sqrt() * norm;
                wf[[ii, jj]] = Complex64::from_polar(amplitude, phase);
            }
        }
    }

    spectral.to_physical(wf.view())
}
