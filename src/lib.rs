
pub mod checkpoint;
pub mod initial;
pub mod integrate;

pub mod d2fft;
pub mod spectral;

pub mod constants;
pub mod error;
pub mod parameters;
pub mod utils;
