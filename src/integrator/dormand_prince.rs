//! # Dormand–Prince 5(4) adaptive stepper
//!
//! Explicit embedded Runge–Kutta pair of order 5 with a 4th order error estimate
//! (Dormand & Prince 1980), applied to a 6-dimensional phase-space state.
//!
//! The local error of a step is measured with the usual mixed norm
//!
//! ```text
//! err = sqrt( mean_i ( e_i / (atol + rtol · max(|y_i|, |y_new_i|)) )² )
//! ```
//!
//! and the step is accepted when `err ≤ 1`. The next step size follows
//! `h ← h · clamp(0.9 · err^(-1/5), 0.2, 5)`.
//!
//! [`DormandPrince::advance_to`] never steps past the requested time, so a caller sampling the
//! orbit at fixed output times gets exact samples without dense-output interpolation.
use nalgebra::Vector6;

pub type State = Vector6<f64>;

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th order weights, also the last stage (FSAL)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// 5th order minus 4th order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Why [`DormandPrince::advance_to`] gave up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepFailure {
    /// The step size shrank below the floating-point resolution of `t`
    StepSizeUnderflow { t: f64, h: f64 },
    /// The state or its derivative stopped being finite
    NonFinite { t: f64 },
    /// The step budget was exhausted before reaching the target
    TooManySteps { t: f64 },
}

#[derive(Debug, Clone)]
pub struct DormandPrince {
    rtol: f64,
    atol: f64,
    max_steps: usize,
    steps_taken: usize,
    rejected: usize,
}

impl DormandPrince {
    pub fn new(rtol: f64, atol: f64, max_steps: usize) -> Self {
        DormandPrince {
            rtol,
            atol,
            max_steps,
            steps_taken: 0,
            rejected: 0,
        }
    }

    /// Number of accepted steps since construction.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Number of rejected trial steps since construction.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Starting step size from the Hairer–Nørsett–Wanner heuristic.
    pub fn initial_step<F>(&self, f: &F, t: f64, y: &State, direction: f64) -> f64
    where
        F: Fn(f64, &State) -> State,
    {
        let f0 = f(t, y);
        let scale = y.map(|v| self.atol + self.rtol * v.abs());
        let d0 = rms(&y.component_div(&scale));
        let d1 = rms(&f0.component_div(&scale));

        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };

        let y1 = y + f0 * (direction * h0);
        let f1 = f(t + direction * h0, &y1);
        let d2 = rms(&(f1 - f0).component_div(&scale)) / h0;

        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / 5.0)
        };

        direction * (100.0 * h0).min(h1)
    }

    /// Integrate `y' = f(t, y)` from `t` to exactly `t_target`.
    ///
    /// Arguments
    /// ---------
    /// * `f`: right-hand side
    /// * `t`, `y`: current time and state
    /// * `t_target`: time to reach, on either side of `t`
    /// * `h`: trial step size, its sign is forced to the direction of `t_target`
    ///
    /// Return
    /// ------
    /// * `(y(t_target), h_next)` where `h_next` is the step size to try next, or the
    ///   [`StepFailure`] that stopped the integration.
    pub fn advance_to<F>(
        &mut self,
        f: &F,
        mut t: f64,
        y: &State,
        t_target: f64,
        h: f64,
    ) -> Result<(State, f64), StepFailure>
    where
        F: Fn(f64, &State) -> State,
    {
        let direction = if t_target >= t { 1.0 } else { -1.0 };
        let mut h = direction * h.abs();
        let mut y = *y;
        let mut h_next = h;

        while (t_target - t) * direction > 0.0 {
            if self.steps_taken + self.rejected >= self.max_steps {
                return Err(StepFailure::TooManySteps { t });
            }

            let remaining = t_target - t;
            let last = h.abs() >= remaining.abs();
            let h_try = if last { remaining } else { h };

            if h_try.abs() <= 16.0 * f64::EPSILON * t.abs().max(1.0) {
                if last {
                    // remaining gap is below the resolution of t
                    break;
                }
                return Err(StepFailure::StepSizeUnderflow { t, h: h_try });
            }

            let (y_new, err) = self.trial_step(f, t, &y, h_try);
            if !y_new.iter().all(|v| v.is_finite()) || !err.is_finite() {
                return Err(StepFailure::NonFinite { t });
            }

            let factor = if err == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * err.powf(-1.0 / 5.0)).clamp(MIN_FACTOR, MAX_FACTOR)
            };

            if err <= 1.0 {
                t = if last { t_target } else { t + h_try };
                y = y_new;
                self.steps_taken += 1;
                // a shortened final step says nothing about the natural step size
                h_next = if last { h } else { h_try * factor };
                h = h_try * factor;
            } else {
                self.rejected += 1;
                h = h_try * factor.min(1.0);
            }
        }

        Ok((y, h_next))
    }

    fn trial_step<F>(&self, f: &F, t: f64, y: &State, h: f64) -> (State, f64)
    where
        F: Fn(f64, &State) -> State,
    {
        let k1 = f(t, y);
        let k2 = f(t + C2 * h, &(y + k1 * (h * A21)));
        let k3 = f(t + C3 * h, &(y + (k1 * A31 + k2 * A32) * h));
        let k4 = f(t + C4 * h, &(y + (k1 * A41 + k2 * A42 + k3 * A43) * h));
        let k5 = f(
            t + C5 * h,
            &(y + (k1 * A51 + k2 * A52 + k3 * A53 + k4 * A54) * h),
        );
        let k6 = f(
            t + h,
            &(y + (k1 * A61 + k2 * A62 + k3 * A63 + k4 * A64 + k5 * A65) * h),
        );

        let y_new = y + (k1 * B1 + k3 * B3 + k4 * B4 + k5 * B5 + k6 * B6) * h;
        let k7 = f(t + h, &y_new);

        let err_vec = (k1 * E1 + k3 * E3 + k4 * E4 + k5 * E5 + k6 * E6 + k7 * E7) * h;
        let scale = y.zip_map(&y_new, |a, b| self.atol + self.rtol * a.abs().max(b.abs()));

        (y_new, rms(&err_vec.component_div(&scale)))
    }
}

fn rms(v: &State) -> f64 {
    (v.norm_squared() / v.len() as f64).sqrt()
}

#[cfg(test)]
mod dormand_prince_test {
    use approx::assert_abs_diff_eq;

    use super::*;

    /// Three uncoupled harmonic oscillators, `x'' = -x`.
    fn oscillator(_t: f64, y: &State) -> State {
        State::new(y[3], y[4], y[5], -y[0], -y[1], -y[2])
    }

    #[test]
    fn test_full_period_returns_to_start() {
        let y0 = State::new(1.0, 0.0, 0.5, 0.0, 1.0, 0.0);
        let mut dp = DormandPrince::new(1e-10, 1e-10, 100_000);
        let h0 = dp.initial_step(&oscillator, 0.0, &y0, 1.0);
        let (y, _) = dp
            .advance_to(&oscillator, 0.0, &y0, std::f64::consts::TAU, h0)
            .unwrap();

        assert_abs_diff_eq!(y, y0, epsilon = 1e-8);
        assert!(dp.steps_taken() > 10);
    }

    #[test]
    fn test_backward_integration() {
        let y0 = State::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let mut dp = DormandPrince::new(1e-10, 1e-10, 100_000);
        let (y, _) = dp
            .advance_to(&oscillator, 0.0, &y0, -std::f64::consts::FRAC_PI_2, 0.1)
            .unwrap();

        // x(t) = cos t, v(t) = -sin t
        assert_abs_diff_eq!(y[0], 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(y[3], 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_samples_land_on_targets() {
        let y0 = State::new(0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        let mut dp = DormandPrince::new(1e-9, 1e-9, 100_000);
        let mut y = y0;
        let mut h = 0.3;
        for k in 1..=10 {
            let t_prev = (k - 1) as f64 * 0.1;
            let t = k as f64 * 0.1;
            (y, h) = dp.advance_to(&oscillator, t_prev, &y, t, h).unwrap();
            assert_abs_diff_eq!(y[0], t.sin(), epsilon = 1e-8);
        }
    }

    #[test]
    fn test_step_budget() {
        let y0 = State::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0);
        let mut dp = DormandPrince::new(1e-12, 1e-12, 5);
        let res = dp.advance_to(&oscillator, 0.0, &y0, 100.0, 1e-3);
        assert!(matches!(res, Err(StepFailure::TooManySteps { .. })));
    }

    #[test]
    fn test_non_finite_derivative() {
        let blow_up = |_t: f64, _y: &State| State::repeat(f64::NAN);
        let mut dp = DormandPrince::new(1e-9, 1e-9, 100);
        let res = dp.advance_to(&blow_up, 0.0, &State::zeros(), 1.0, 0.1);
        assert_eq!(res, Err(StepFailure::NonFinite { t: 0.0 }));
    }
}
