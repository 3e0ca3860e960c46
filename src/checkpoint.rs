//! Persisted physical vorticity field, used to restart a run.

use {
    crate::{
        error::{Error, Result},
        integrate::State,
        utils::max_abs,
    },
    log::info,
    ndarray::Array2,
    serde::{Deserialize, Serialize},
    std::{
        fs::File,
        io::{BufReader, BufWriter, Write},
        path::Path,
    },
};

/// Relative tolerance of the periodic closure of a stored field
const WRAP_TOLERANCE: f64 = 1.0E-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub step: usize,
    pub time: f64,
    /// Physical vorticity, (n+1, n+1) with periodic closure
    pub vorticity: Array2<f64>,
}

impl Checkpoint {
    pub fn from_state(state: &State) -> Result<Self> {
        Ok(Self {
            step: state.step,
            time: state.t,
            vorticity: state.vorticity()?,
        })
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;

        info!("Wrote step {} to {}", self.step, path.display());
        Ok(())
    }

    /// Reads a checkpoint and checks it against an n x n grid.
    pub fn read<P: AsRef<Path>>(path: P, n: usize) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let checkpoint: Self = bincode::deserialize_from(reader)?;

        checkpoint.validate(n)?;

        info!(
            "Read step {} (t = {}) from {}",
            checkpoint.step,
            checkpoint.time,
            path.display()
        );
        Ok(checkpoint)
    }

    /// Checks the shape, finiteness and periodic closure of the field.
    pub fn validate(&self, n: usize) -> Result<()> {
        let w = &self.vorticity;

        if w.dim() != (n + 1, n + 1) {
            return Err(Error::Shape {
                what: "checkpoint vorticity",
                expected: (n + 1, n + 1),
                found: w.dim(),
            });
        }

        if !w.iter().all(|x| x.is_finite()) {
            return Err(Error::NonFinite {
                what: "checkpoint vorticity",
            });
        }

        let tolerance = WRAP_TOLERANCE * max_abs(w.view()).max(1.0);
        for k in 0..=n {
            let (row, column) = ((w[[n, k]] - w[[0, k]]).abs(), (w[[k, n]] - w[[k, 0]]).abs());
            if row > tolerance || column > tolerance {
                return Err(Error::Checkpoint {
                    reason: format!(
                        "periodic closure violated at index {} (differences {:e}, {:e})",
                        k, row, column
                    ),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{initial::vortex_merger, parameters::Numerical, spectral::Spectral},
        approx::assert_abs_diff_eq,
        tempdir::TempDir,
    };

    fn state(n: usize) -> State {
        let spectral = Spectral::new(n, n).unwrap();
        let numerical = Numerical {
            grid_resolution: n,
            coarse_resolution: n / 2,
            ..Numerical::default()
        };
        let mut state = State::new(vortex_merger(&spectral).view(), 0, &numerical).unwrap();
        state.step = 7;
        state.t = 0.07;
        state
    }

    #[test]
    fn write_read() {
        let dir = TempDir::new("checkpoint").unwrap();
        let path = dir.path().join("checkpoint.bin");
        let checkpoint = Checkpoint::from_state(&state(16)).unwrap();

        checkpoint.write(&path).unwrap();
        let read = Checkpoint::read(&path, 16).unwrap();

        assert_eq!(read.step, 7);
        assert_abs_diff_eq!(read.time, 0.07);
        assert_eq!(read, checkpoint);
    }

    #[test]
    fn rejects_wrong_grid() {
        let dir = TempDir::new("checkpoint").unwrap();
        let path = dir.path().join("checkpoint.bin");
        Checkpoint::from_state(&state(16)).unwrap().write(&path).unwrap();

        assert!(matches!(
            Checkpoint::read(&path, 32),
            Err(Error::Shape {
                found: (17, 17),
                ..
            })
        ));
    }

    #[test]
    fn rejects_broken_closure() {
        let mut checkpoint = Checkpoint::from_state(&state(8)).unwrap();
        checkpoint.vorticity[[8, 3]] += 1.0E-6;

        assert!(matches!(
            checkpoint.validate(8),
            Err(Error::Checkpoint { .. })
        ));
    }

    #[test]
    fn rejects_non_finite() {
        let mut checkpoint = Checkpoint::from_state(&state(8)).unwrap();
        checkpoint.vorticity[[2, 2]] = f64::INFINITY;

        assert!(matches!(
            checkpoint.validate(8),
            Err(Error::NonFinite { .. })
        ));
    }

    #[test]
    fn missing_file() {
        let dir = TempDir::new("checkpoint").unwrap();

        assert!(matches!(
            Checkpoint::read(dir.path().join("missing.bin"), 8),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn garbage_file() {
        let dir = TempDir::new("checkpoint").unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, b"not a checkpoint").unwrap();

        assert!(matches!(
            Checkpoint::read(&path, 8),
            Err(Error::Bincode(_))
        ));
    }
}
