#[macro_use]
extern crate clap;

use {
    anyhow::{bail, Result},
    log::{error, info},
    simplelog::{Config as LogConfig, LevelFilter, TermLogger, TerminalMode},
    spectral_turbulence::{
        checkpoint::Checkpoint,
        error::Error,
        initial::generate,
        integrate::{format_spectrum, integrate, Output, State},
        parameters::Parameters,
        spectral::Spectral,
    },
    std::{
        fs::{create_dir_all, File},
        io::prelude::*,
        path::{Path, PathBuf},
    },
};

#[quit::main]
fn main() {
    let matches = clap_app!(spectral_turbulence =>
        (version: crate_version!())
        (@arg PARAMETERS: -p --parameters +takes_value +required "Path to file containing simulation parameters.")
        (@subcommand init =>
            (about: "Generates the initial vorticity field and writes it to init.bin.")
        )
        (@subcommand run =>
            (about: "Integrates the two-dimensional Navier-Stokes equations from the initial condition or a restart checkpoint.")
        )
        (@subcommand spectrum =>
            (about: "Computes the radial energy spectrum of a checkpoint.")
            (@arg CHECKPOINT: "Checkpoint file, defaults to checkpoint.bin in the output directory.")
        )
    )
    .get_matches();

    if let Err(e) = TermLogger::init(
        LevelFilter::Debug,
        LogConfig::default(),
        TerminalMode::Mixed,
    ) {
        eprintln!("Failed to initialize logger: {}", e);
        quit::with_code(1);
    }

    let params = {
        // clap returns an error if the argument was not supplied
        let path = matches.value_of("PARAMETERS").unwrap_or_else(|| {
            error!("Path to parameters file not supplied");
            quit::with_code(1);
        });

        let file = File::open(path).unwrap_or_else(|e| {
            error!("Failed to open {}: \"{}\"", path, e);
            quit::with_code(1);
        });

        let params = serde_yaml::from_reader::<_, Parameters>(file).unwrap_or_else(|e| {
            error!("Failed to parse parameters from {}: \"{}\"", path, e);
            quit::with_code(1);
        });

        info!(
            "Successfully loaded simulation parameters from \"{}\": \n{:#?}",
            path, params
        );

        params
    };

    let checkpoint = matches
        .subcommand_matches("spectrum")
        .and_then(|m| m.value_of("CHECKPOINT"))
        .map(PathBuf::from);

    run_subcommand(matches.subcommand_name(), params, checkpoint).unwrap_or_else(|e| {
        error!("Error: \"{}\"", e);
        quit::with_code(1);
    });
}

fn write_file<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let mut f = File::create(path)?;
    f.write_all(data)?;
    Ok(())
}

fn write_output(dir: &Path, output: &Output) -> Result<()> {
    write_file(dir.join("monitor.asc"), output.monitor.as_bytes())?;
    write_file(dir.join("spectra.asc"), output.spectra.as_bytes())?;

    let d2 = dir.join("2d");
    create_dir_all(&d2)?;
    write_file(d2.join("w.r4"), &output.d2w)?;
    write_file(d2.join("s.r4"), &output.d2s)?;
    write_file(d2.join("jc.r4"), &output.d2jc)?;
    write_file(d2.join("jcoarse.r4"), &output.d2jcoarse)?;
    write_file(d2.join("sgs.r4"), &output.d2sgs)?;

    Ok(())
}

fn run_subcommand(
    subcmd: Option<&str>,
    params: Parameters,
    checkpoint: Option<PathBuf>,
) -> Result<()> {
    let subcmd = match subcmd {
        Some(s) => s,
        None => bail!("No subcommand selected"),
    };

    params.validate()?;

    let dir = &params.environment.output_directory;
    let n = params.numerical.grid_resolution;
    create_dir_all(dir)?;

    info!("Starting {}", subcmd);

    match subcmd {
        "init" => {
            let spectral = Spectral::new(n, n)?;

            Checkpoint {
                step: 0,
                time: 0.0,
                vorticity: generate(&spectral, &params)?,
            }
            .write(dir.join("init.bin"))?;
        }
        "run" => {
            let (w0, step) = match &params.environment.restart {
                Some(path) => {
                    let checkpoint = Checkpoint::read(path, n)?;
                    (checkpoint.vorticity, checkpoint.step)
                }
                None => (generate(&Spectral::new(n, n)?, &params)?, 0),
            };

            let mut state = State::new(w0.view(), step, &params.numerical)?;
            let mut output = Output::default();

            let result = integrate(&mut state, &params, &mut output);

            // Snapshots taken before a failure are still written
            write_output(dir, &output)?;

            match result {
                Ok(()) => Checkpoint::from_state(&state)?.write(dir.join("checkpoint.bin"))?,
                Err(Error::Instability {
                    step,
                    stage,
                    last_valid_step,
                    last_valid,
                }) => {
                    Checkpoint {
                        step: last_valid_step,
                        time: last_valid_step as f64 * params.numerical.time_step,
                        vorticity: last_valid,
                    }
                    .write(dir.join("last_valid.bin"))?;

                    bail!(
                        "Non-finite vorticity in stage {} of step {}, step {} written to last_valid.bin",
                        stage,
                        step,
                        last_valid_step
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        "spectrum" => {
            let path = checkpoint.unwrap_or_else(|| dir.join("checkpoint.bin"));
            let checkpoint = Checkpoint::read(&path, n)?;

            let shells = Spectral::new(n, n)?.spectrum(checkpoint.vorticity.view())?;
            for shell in &shells {
                info!("k = {:3}, E = {:e} ({} modes)", shell.k, shell.energy, shell.modes);
            }

            write_file(
                dir.join("spectrum.asc"),
                format_spectrum(checkpoint.time, &shells).as_bytes(),
            )?;
        }
        _ => {
            // Should be unreachable due to clap catching this error
            bail!("Unrecognized subcommand");
        }
    }

    info!("Finished {}", subcmd);

    Ok(())
}
