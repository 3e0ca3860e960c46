use core::f64::consts::PI;

/// Domain length in both x and y
pub const DOMAIN_LENGTH: f64 = 2.0 * PI;

/// Replaces k^2 at the (0,0) mode so that division by k^2 is defined.
/// The mode itself is always zeroed afterwards.
pub const K2_ZERO_MODE: f64 = 1.0E-12;

// Low-storage RK3 / Crank-Nicolson coefficients (Orlandi):
pub const A1: f64 = 8.0 / 15.0;
pub const A2: f64 = 2.0 / 15.0;
pub const A3: f64 = 1.0 / 3.0;

pub const G1: f64 = 8.0 / 15.0;
pub const G2: f64 = 5.0 / 12.0;
pub const G3: f64 = 3.0 / 4.0;

pub const R2: f64 = -17.0 / 60.0;
pub const R3: f64 = -5.0 / 12.0;

/// Wavenumber of the Taylor-Green vortex
pub const TGV_NQ: f64 = 4.0;

/// Spread of the two Gaussian vortices in the merger problem
pub const VM_SIGMA: f64 = PI;

/// Peak wavenumber of the decaying turbulence energy spectrum
pub const DHIT_K0: f64 = 10.0;
