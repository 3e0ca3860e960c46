use {
    crate::{
        constants::*,
        error::{Error, Result},
        integrate::State,
        utils::{carr2zero, is_finite},
    },
    ndarray::{Array2, ArrayView2, Zip},
    rustfft::num_complex::Complex64,
};

/// Per-mode Crank-Nicolson factors of the three stages. With
/// d = a_i dt k^2 / (2 re), `damping` holds (1-d)/(1+d) and `forcing` holds
/// dt/(1+d).
#[derive(Debug, Clone)]
pub struct ImplicitFactors {
    pub damping: [Array2<f64>; 3],
    pub forcing: [Array2<f64>; 3],
}

impl ImplicitFactors {
    pub fn new(k2: ArrayView2<f64>, dt: f64, re: f64) -> Result<Self> {
        let z = k2.mapv(|k2| 0.5 * dt * k2 / re);

        let factors = |stage: usize, a: f64| -> Result<(Array2<f64>, Array2<f64>)> {
            let denominator = z.mapv(|z| 1.0 + a * z);

            // First non-finite denominator, otherwise the smallest
            let worst = denominator
                .iter()
                .cloned()
                .find(|x| !x.is_finite())
                .unwrap_or_else(|| denominator.iter().cloned().fold(f64::INFINITY, f64::min));
            if !(worst.is_finite() && worst > 0.0) {
                return Err(Error::ImplicitDenominator {
                    stage,
                    value: worst,
                });
            }

            let damping = Zip::from(&z)
                .and(&denominator)
                .map_collect(|&z, &den| (1.0 - a * z) / den);
            let forcing = denominator.mapv(|den| dt / den);

            Ok((damping, forcing))
        };

        let (d1, f1) = factors(1, A1)?;
        let (d2, f2) = factors(2, A2)?;
        let (d3, f3) = factors(3, A3)?;

        Ok(Self {
            damping: [d1, d2, d3],
            forcing: [f1, f2, f3],
        })
    }
}

/// Advances the spectral vorticity from step n to n+1 with the three stage
/// low-storage RK3 / Crank-Nicolson scheme
///
/// w1 = (1-d1)/(1+d1) wn + dt (g1 J(wn)) / (1+d1)
/// w2 = (1-d2)/(1+d2) w1 + dt (r2 J(wn) + g2 J(w1)) / (1+d2)
/// wn+1 = (1-d3)/(1+d3) w2 + dt (r3 J(w1) + g3 J(w2)) / (1+d3)
///
/// with the mean mode zeroed after each stage. The state is only modified
/// when all three stages produce finite fields.
pub fn advance(state: &mut State) -> Result<()> {
    let spectral = &state.spectral;
    let factors = &state.factors;

    // 1st stage
    let jn = spectral.jacobian_dealiased(state.wf.view())?;
    let w1 = stage(factors, 0, state.wf.view(), &[(G1, jn.view())]);
    if !is_finite(w1.view()) {
        return Err(instability(state, 1));
    }

    // 2nd stage
    let j1 = spectral.jacobian_dealiased(w1.view())?;
    let w2 = stage(factors, 1, w1.view(), &[(R2, jn.view()), (G2, j1.view())]);
    if !is_finite(w2.view()) {
        return Err(instability(state, 2));
    }

    // 3rd stage
    let j2 = spectral.jacobian_dealiased(w2.view())?;
    let w3 = stage(factors, 2, w2.view(), &[(R3, j1.view()), (G3, j2.view())]);
    if !is_finite(w3.view()) {
        return Err(instability(state, 3));
    }

    state.wf = w3;
    state.step += 1;
    state.t = state.step as f64 * state.dt;

    Ok(())
}

/// One implicit-explicit update from w with the explicit term built from
/// the weighted Jacobians.
fn stage(
    factors: &ImplicitFactors,
    index: usize,
    w: ArrayView2<Complex64>,
    jacobians: &[(f64, ArrayView2<Complex64>)],
) -> Array2<Complex64> {
    let (nx, ny) = w.dim();

    let mut explicit = carr2zero(nx, ny);
    for (weight, j) in jacobians {
        Zip::from(&mut explicit)
            .and(j)
            .par_for_each(|e, &j| *e += j * *weight);
    }

    let mut out = carr2zero(nx, ny);
    Zip::from(&mut out)
        .and(&w)
        .and(&explicit)
        .and(&factors.damping[index])
        .and(&factors.forcing[index])
        .par_for_each(|out, &w, &e, &damping, &forcing| *out = w * damping + e * forcing);

    out[[0, 0]] = Complex64::new(0.0, 0.0);
    out
}

fn instability(state: &State, stage: usize) -> Error {
    match state.vorticity() {
        Ok(last_valid) => Error::Instability {
            step: state.step + 1,
            stage,
            last_valid_step: state.step,
            last_valid,
        },
        Err(e) => e,
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{initial::taylor_green, parameters::Numerical, spectral::Spectral},
        approx::assert_abs_diff_eq,
    };

    #[test]
    fn factors_of_inviscid_limit() {
        let spectral = Spectral::new(8, 8).unwrap();
        let factors = ImplicitFactors::new(spectral.k2.view(), 0.1, f64::INFINITY).unwrap();

        for i in 0..3 {
            assert_abs_diff_eq!(factors.damping[i], Array2::from_elem((8, 8), 1.0));
            assert_abs_diff_eq!(factors.forcing[i], Array2::from_elem((8, 8), 0.1));
        }
    }

    #[test]
    fn factors_values() {
        let spectral = Spectral::new(8, 8).unwrap();
        let factors = ImplicitFactors::new(spectral.k2.view(), 0.1, 10.0).unwrap();

        // k^2 = 5 at (1,2), z = 0.5 * 0.1 * 5 / 10
        let z = 0.025;
        let d = A2 * z;
        assert_abs_diff_eq!(factors.damping[1][[1, 2]], (1.0 - d) / (1.0 + d), epsilon = 1.0E-15);
        assert_abs_diff_eq!(factors.forcing[1][[1, 2]], 0.1 / (1.0 + d), epsilon = 1.0E-15);
    }

    #[test]
    fn rejects_non_positive_denominator() {
        let spectral = Spectral::new(8, 8).unwrap();

        assert!(matches!(
            ImplicitFactors::new(spectral.k2.view(), -1.0, 1.0),
            Err(Error::ImplicitDenominator { stage: 1, .. })
        ));
        assert!(matches!(
            ImplicitFactors::new(spectral.k2.view(), 0.1, 0.0),
            Err(Error::ImplicitDenominator { .. })
        ));
    }

    fn taylor_green_state(n: usize, re: f64, dt: f64) -> State {
        let spectral = Spectral::new(n, n).unwrap();
        let numerical = Numerical {
            grid_resolution: n,
            coarse_resolution: n / 2,
            reynolds_number: re,
            time_step: dt,
            ..Numerical::default()
        };
        State::new(taylor_green(&spectral).view(), 0, &numerical).unwrap()
    }

    /// The Jacobian vanishes, so each step multiplies the single mode by
    /// the product of the three damping factors.
    #[test]
    fn taylor_green_step_is_pure_damping() {
        let mut state = taylor_green_state(16, 100.0, 0.01);
        let before = state.wf[[4, 4]];

        advance(&mut state).unwrap();

        let k2 = 32.0;
        let z = 0.5 * 0.01 * k2 / 100.0;
        let expected = [A1, A2, A3]
            .iter()
            .map(|a| (1.0 - a * z) / (1.0 + a * z))
            .product::<f64>();

        assert_eq!(state.step, 1);
        assert_abs_diff_eq!(state.t, 0.01);
        assert_abs_diff_eq!((state.wf[[4, 4]] / before).re, expected, epsilon = 1.0E-12);
        assert_abs_diff_eq!(state.wf[[0, 0]].norm(), 0.0);
    }

    #[test]
    fn instability_keeps_state() {
        let mut state = taylor_green_state(16, 100.0, 0.01);
        advance(&mut state).unwrap();
        let valid = state.wf.clone();

        // Finite, but its square overflows in the Jacobian
        state.wf[[3, 1]] = Complex64::new(1.0E300, 0.0);

        match advance(&mut state) {
            Err(Error::Instability {
                step,
                stage,
                last_valid_step,
                last_valid,
            }) => {
                assert_eq!(step, 2);
                assert_eq!(stage, 1);
                assert_eq!(last_valid_step, 1);
                assert_eq!(last_valid.dim(), (17, 17));
                assert!(last_valid.iter().all(|x| x.is_finite()));
            }
            other => panic!("expected instability, got {:?}", other),
        }

        assert_eq!(state.step, 1);
        assert_abs_diff_eq!(state.t, 0.01);
        assert_abs_diff_eq!(state.wf[[4, 4]].re, valid[[4, 4]].re);
        assert_abs_diff_eq!(state.wf[[3, 1]].re, 1.0E300);
    }
}
