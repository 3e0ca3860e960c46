use {
    crate::{
        error::{Error, Result},
        initial::InitialCondition,
    },
    serde::{Deserialize, Serialize},
    std::path::PathBuf,
};

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parameters {
    pub numerical: Numerical,
    pub initial: Initial,
    pub environment: Environment,
}

impl Parameters {
    pub fn validate(&self) -> Result<()> {
        self.numerical.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Numerical {
    /// Grid resolution in both x and y
    pub grid_resolution: usize,
    /// Resolution of the coarse grid used for the subgrid-scale diagnostics
    pub coarse_resolution: usize,
    /// Reynolds number
    pub reynolds_number: f64,
    /// Simulation time step size
    pub time_step: f64,
    /// Total number of time steps
    pub steps: usize,
    /// Number of time steps between saving grid data
    pub save_stride: usize,
}

impl Default for Numerical {
    fn default() -> Self {
        Numerical {
            grid_resolution: 64,
            coarse_resolution: 32,
            reynolds_number: 1000.0,
            time_step: 0.01,
            steps: 100,
            save_stride: 10,
        }
    }
}

impl Numerical {
    /// Rejects configurations that cannot be integrated, before any stepping.
    pub fn validate(&self) -> Result<()> {
        let n = self.grid_resolution;
        if n < 2 || n % 2 != 0 {
            return Err(Error::Resolution { nx: n, ny: n });
        }

        let nc = self.coarse_resolution;
        if nc == 0 || nc % 2 != 0 || nc > n {
            return Err(Error::CoarseResolution {
                fine: n,
                coarse: nc,
            });
        }

        for &(name, value) in &[
            ("reynolds_number", self.reynolds_number),
            ("time_step", self.time_step),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Parameter {
                    name,
                    value,
                    reason: "must be positive and finite",
                });
            }
        }

        for &(name, value) in &[("steps", self.steps), ("save_stride", self.save_stride)] {
            if value == 0 {
                return Err(Error::Parameter {
                    name,
                    value: value as f64,
                    reason: "must be at least 1",
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initial {
    /// Initial vorticity field
    pub condition: InitialCondition,
    /// Seed of the random phases of the decaying turbulence field
    pub seed: u64,
}

impl Default for Initial {
    fn default() -> Self {
        Initial {
            condition: InitialCondition::TaylorGreen,
            seed: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Directory receiving all output files
    pub output_directory: PathBuf,
    /// Checkpoint to resume from instead of the initial condition
    pub restart: Option<PathBuf>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            output_directory: PathBuf::from("output"),
            restart: None,
        }
    }
}
