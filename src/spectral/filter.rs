//! Sharp spectral coarsening and the subgrid-scale term it defines.

use {
    super::{corners, Spectral},
    crate::error::{Error, Result},
    ndarray::{Array2, ArrayView2},
    rustfft::num_complex::Complex64,
};

/// Truncates the fine spectral field fs(nx,ny) to the coarse (nxc,nyc) set of
/// wavenumbers and rescales by (nxc*nyc)/(nx*ny), so that the result is the
/// spectral field of the same physical function on the coarse grid.
pub fn coarsen(fs: ArrayView2<Complex64>, nxc: usize, nyc: usize) -> Result<Array2<Complex64>> {
    let (nx, ny) = fs.dim();

    for &(fine, coarse) in &[(nx, nxc), (ny, nyc)] {
        if coarse == 0 || coarse % 2 != 0 || coarse > fine {
            return Err(Error::CoarseResolution { fine, coarse });
        }
    }

    let scale = (nxc * nyc) as f64 / (nx * ny) as f64;

    let mut fc = corners::truncate(fs, nxc, nyc);
    fc.mapv_inplace(|x| x * scale);

    Ok(fc)
}

/// Physical fields (with periodic closure) on the coarse grid
#[derive(Debug, Clone)]
pub struct SubgridScale {
    /// Coarsened Jacobian of the fine field
    pub jacobian_coarsened: Array2<f64>,
    /// Jacobian of the coarsened field
    pub jacobian_coarse: Array2<f64>,
    /// Their difference
    pub sgs: Array2<f64>,
}

/// Computes the subgrid-scale forcing of the fine spectral vorticity wf with
/// respect to the coarse grid.
pub fn subgrid_scale(
    fine: &Spectral,
    coarse: &Spectral,
    wf: ArrayView2<Complex64>,
) -> Result<SubgridScale> {
    let jf = fine.jacobian_dealiased(wf)?;
    let jfc = coarsen(jf.view(), coarse.nx, coarse.ny)?;
    let jacobian_coarsened = coarse.to_physical(jfc.view())?;

    let wfc = coarsen(wf, coarse.nx, coarse.ny)?;
    let jcoarsef = coarse.jacobian_dealiased(wfc.view())?;
    let jacobian_coarse = coarse.to_physical(jcoarsef.view())?;

    let sgs = &jacobian_coarsened - &jacobian_coarse;

    Ok(SubgridScale {
        jacobian_coarsened,
        jacobian_coarse,
        sgs,
    })
}
