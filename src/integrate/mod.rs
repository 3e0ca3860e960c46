//! Time integration driver and diagnostic snapshots.

pub mod advance;

use {
    crate::{
        error::{Error, Result},
        parameters::{Numerical, Parameters},
        spectral::{filter::subgrid_scale, Shell, Spectral},
        utils::{is_finite, max_abs},
    },
    advance::{advance, ImplicitFactors},
    byteorder::{ByteOrder, LittleEndian},
    log::{debug, info, warn},
    ndarray::{Array2, ArrayView2},
    rustfft::num_complex::Complex64,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Output {
    // Plain text diagnostics
    pub monitor: String,
    pub spectra: String,

    // Fine grid vorticity and streamfunction
    pub d2w: Vec<u8>,
    pub d2s: Vec<u8>,

    // Coarse grid Jacobians and the subgrid-scale term
    pub d2jc: Vec<u8>,
    pub d2jcoarse: Vec<u8>,
    pub d2sgs: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct State {
    pub spectral: Spectral,
    pub coarse: Spectral,
    pub factors: ImplicitFactors,

    // Vorticity (spectral)
    pub wf: Array2<Complex64>,

    pub dt: f64,
    pub t: f64,
    pub step: usize,
}

impl State {
    /// Builds the state at `step` from the physical vorticity w0, which may
    /// include the periodic closure. The mean of w0 is removed.
    pub fn new(w0: ArrayView2<f64>, step: usize, numerical: &Numerical) -> Result<Self> {
        numerical.validate()?;

        let n = numerical.grid_resolution;
        let nc = numerical.coarse_resolution;
        let dt = numerical.time_step;

        let spectral = Spectral::new(n, n)?;
        let coarse = Spectral::new(nc, nc)?;
        let factors = ImplicitFactors::new(spectral.k2.view(), dt, numerical.reynolds_number)?;

        let mut wf = spectral.to_spectral(w0)?;
        if !is_finite(wf.view()) {
            return Err(Error::NonFinite {
                what: "initial vorticity",
            });
        }

        let mean = wf[[0, 0]].re / (n * n) as f64;
        debug!("Removing mean vorticity {:e}", mean);
        wf[[0, 0]] = Complex64::new(0.0, 0.0);

        Ok(Self {
            spectral,
            coarse,
            factors,
            wf,
            dt,
            t: step as f64 * dt,
            step,
        })
    }

    /// Physical vorticity with periodic closure
    pub fn vorticity(&self) -> Result<Array2<f64>> {
        self.spectral.to_physical(self.wf.view())
    }
}

/// Integrates the state up to `numerical.steps`, saving diagnostics every
/// `save_stride` steps into output. The spectrum of the field is recorded
/// before the first and after the last step.
///
/// On error the state holds the last valid field and output holds every
/// snapshot taken so far.
pub fn integrate(state: &mut State, parameters: &Parameters, output: &mut Output) -> Result<()> {
    let steps = parameters.numerical.steps;
    let stride = parameters.numerical.save_stride;

    info!(
        "Integrating from step {} (t = {}) to step {}",
        state.step, state.t, steps
    );

    append_spectrum(state, output);
    if state.step % stride == 0 {
        savegrid(state, output);
    }

    while state.step < steps {
        advance(state)?;
        debug!("step {} t = {:.6}", state.step, state.t);

        if state.step % stride == 0 {
            savegrid(state, output);
        }
    }

    append_spectrum(state, output);

    Ok(())
}

/// Best-effort diagnostic snapshot. A failure is logged and the snapshot
/// skipped, the integration carries on.
fn savegrid(state: &State, output: &mut Output) {
    if let Err(e) = try_savegrid(state, output) {
        warn!("Skipping snapshot at step {}: {}", state.step, e);
    }
}

fn try_savegrid(state: &State, output: &mut Output) -> Result<()> {
    let spectral = &state.spectral;

    // Computed up front so that a failed snapshot appends nothing
    let w = state.vorticity()?;
    let s = spectral.streamfunction(state.wf.view())?;
    let sgs = subgrid_scale(spectral, &state.coarse, state.wf.view())?;

    let energy = spectral.energy(state.wf.view());
    let enstrophy = spectral.enstrophy(state.wf.view());
    let wmax = max_abs(w.view());

    output.monitor += &format!(
        "{:.6} {:.9} {:.9} {:.9}\n",
        state.t, energy, enstrophy, wmax
    );
    info!(
        "t = {:.6}, E = {:.9}, Z = {:.9}, max|w| = {:.6}",
        state.t, energy, enstrophy, wmax
    );

    append_output(&mut output.d2w, state.t, w.view());
    append_output(&mut output.d2s, state.t, s.view());
    append_output(&mut output.d2jc, state.t, sgs.jacobian_coarsened.view());
    append_output(&mut output.d2jcoarse, state.t, sgs.jacobian_coarse.view());
    append_output(&mut output.d2sgs, state.t, sgs.sgs.view());

    Ok(())
}

fn append_spectrum(state: &State, output: &mut Output) {
    match state
        .vorticity()
        .and_then(|w| state.spectral.spectrum(w.view()))
    {
        Ok(shells) => output.spectra += &format_spectrum(state.t, &shells),
        Err(e) => warn!("Skipping spectrum at step {}: {}", state.step, e),
    }
}

/// Header line `t kmax` followed by `k E(k) modes` per shell
pub fn format_spectrum(t: f64, shells: &[Shell]) -> String {
    let mut s = format!("{:.6} {}\n", t, shells.len());
    for shell in shells {
        s += &format!("{} {:.12e} {}\n", shell.k, shell.energy, shell.modes);
    }
    s
}

/// Appends a frame of the time followed by the field in row-major order, as
/// little-endian f32.
fn append_output(field: &mut Vec<u8>, t: f64, data: ArrayView2<f64>) {
    let mut buf = [0u8; 4];
    LittleEndian::write_f32(&mut buf, t as f32);
    field.extend_from_slice(&buf);
    for e in data.iter() {
        LittleEndian::write_f32(&mut buf, *e as f32);
        field.extend_from_slice(&buf);
    }
}
