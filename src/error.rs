use {ndarray::Array2, thiserror::Error};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("grid resolution {nx}x{ny} must be even and at least 2 in each direction")]
    Resolution { nx: usize, ny: usize },

    #[error("coarse resolution {coarse} must be even, non-zero and at most the grid resolution {fine}")]
    CoarseResolution { fine: usize, coarse: usize },

    #[error("invalid {name} = {value}: {reason}")]
    Parameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("implicit denominator 1 + d{stage} = {value} is not positive")]
    ImplicitDenominator { stage: usize, value: f64 },

    /// Vorticity became non-finite. The state is left at `last_valid_step`
    /// and `last_valid` holds that field in physical space.
    #[error("non-finite vorticity in stage {stage} of step {step} (last valid step {last_valid_step})")]
    Instability {
        step: usize,
        stage: usize,
        last_valid_step: usize,
        last_valid: Array2<f64>,
    },

    #[error("{what} contains non-finite values")]
    NonFinite { what: &'static str },

    #[error("{what} has shape {found:?}, expected {expected:?}")]
    Shape {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("invalid checkpoint: {reason}")]
    Checkpoint { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}
