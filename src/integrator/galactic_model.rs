//! # Reference orbit integrator in a Galactic potential
//!
//! [`GalacticModelIntegrator`] turns heliocentric observables into a galactocentric orbit in
//! [`GalacticPotential`] and samples it into the 11-column table.
//!
//! ## Frames
//! -----------------
//! * Heliocentric Galactic cartesian: `x` towards the Galactic centre, `y` towards `l = 90°`,
//!   `z` towards the north Galactic pole.
//! * Galactocentric: origin at the Galactic centre, Sun on the `+X` axis at `X = R0`,
//!   `Y` along the direction of Galactic rotation, `Z` towards the north Galactic pole
//!   (left-handed, so that disc stars have `Vfi > 0` and `C > 0`).
//!
//! ## Initial conditions
//! -----------------
//! ```text
//! r_h = rh · û(l, b)
//! v_h = vr · û + K_PM · rh · (pm_l_cosb · ê_l + pm_b · ê_b)
//! X = R0 - x_h      VX = -(vx_h + U☉)
//! Y = y_h           VY = vy_h + V☉ + Vc(R0)
//! Z = z_h + z0      VZ = vz_h + W☉
//! ```
//!
//! ## Output
//! -----------------
//! `n_samples + 1` rows at equally spaced times between `t_start` and
//! `t_start ± |t_end - t_start|` (minus sign when `reverse` is set). A forward request with
//! `t_end < t_start` is rejected.
//! Columns:
//! `t` (Myr), `R`, `Vr`, `fi` (deg), `Vfi`, `z`, `Vz`, `E = v²/2 + Φ`, `C = Lz`, `xg = X`, `yg = Y`.
//!
//! If the stepper fails part-way (non-finite state, step underflow, step budget) the rows
//! computed so far are returned and a warning is logged.
use nalgebra::Vector3;
use tracing::{debug, warn};

use crate::{
    constants::{KmPerSec, Kpc, KPC_KMS_IN_MYR, K_PM, RADEG},
    gal_orbits_errors::GalOrbitsError,
    integrator::{
        dormand_prince::{DormandPrince, State},
        potential::GalacticPotential,
        IntegrationRequest, OrbitIntegrator,
    },
    ref_system::{tangent_basis, unit_vector},
    trajectories::{TrajectoryRow, TrajectoryTable},
};

/// Position and motion of the Sun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarParameters {
    /// Galactocentric distance
    pub r0: Kpc,
    /// Height above the plane
    pub z0: Kpc,
    /// Peculiar motion towards the Galactic centre
    pub u: KmPerSec,
    /// Peculiar motion along the rotation
    pub v: KmPerSec,
    /// Peculiar motion towards the north Galactic pole
    pub w: KmPerSec,
}

impl Default for SolarParameters {
    fn default() -> Self {
        SolarParameters {
            r0: 8.2,
            z0: 0.025,
            u: 11.1,
            v: 12.24,
            w: 7.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalacticModelIntegrator {
    pub solar: SolarParameters,
    /// Number of output intervals
    pub n_samples: usize,
    /// Step budget (accepted + rejected) for the whole integration
    pub max_steps: usize,
}

impl GalacticModelIntegrator {
    pub fn new(n_samples: usize) -> Self {
        GalacticModelIntegrator {
            solar: SolarParameters::default(),
            n_samples,
            max_steps: 10_000_000,
        }
    }

    pub fn with_solar(mut self, solar: SolarParameters) -> Self {
        self.solar = solar;
        self
    }

    /// Galactocentric phase-space state `(X, Y, Z, VX, VY, VZ)` of the star at `t_start`.
    pub fn initial_state(&self, request: &IntegrationRequest, potential: &GalacticPotential) -> State {
        let rh = request.initial_radius;
        let (l, b) = (request.longitude_deg, request.latitude_deg);

        let dir = unit_vector(l, b);
        let (east, north) = tangent_basis(l, b);

        let pos_h = dir * rh;
        let vel_h = dir * request.radial_velocity
            + (east * request.pm_l_cosb + north * request.pm_b) * (K_PM * rh);

        let vc0 = potential.circular_velocity(self.solar.r0);
        State::new(
            self.solar.r0 - pos_h.x,
            pos_h.y,
            pos_h.z + self.solar.z0,
            -(vel_h.x + self.solar.u),
            vel_h.y + self.solar.v + vc0,
            vel_h.z + self.solar.w,
        )
    }
}

fn sample_row(t: f64, y: &State, potential: &GalacticPotential) -> TrajectoryRow {
    let (x, yy, z) = (y[0], y[1], y[2]);
    let (vx, vy, vz) = (y[3], y[4], y[5]);

    let r = x.hypot(yy);
    let lz = x * vy - yy * vx;
    let (vr, vfi) = if r > 0.0 {
        ((x * vx + yy * vy) / r, lz / r)
    } else {
        (0.0, 0.0)
    };

    let pos = Vector3::new(x, yy, z);
    let energy = 0.5 * (vx * vx + vy * vy + vz * vz) + potential.potential(&pos);

    TrajectoryRow {
        t,
        r,
        vr,
        fi: yy.atan2(x) / RADEG,
        vfi,
        z,
        vz,
        e: energy,
        c: lz,
        xg: x,
        yg: yy,
    }
}

impl OrbitIntegrator for GalacticModelIntegrator {
    fn integrate(&self, request: &IntegrationRequest) -> Result<TrajectoryTable, GalOrbitsError> {
        if !(request.rtol > 0.0 && request.atol > 0.0) {
            return Err(GalOrbitsError::IntegrationFailed(format!(
                "tolerances must be positive (rtol = {}, atol = {})",
                request.rtol, request.atol
            )));
        }
        if self.n_samples == 0 {
            return Err(GalOrbitsError::IntegrationFailed(
                "at least one output interval is required".into(),
            ));
        }
        // every output interval costs at least one accepted step
        if self.n_samples > self.max_steps {
            return Err(GalOrbitsError::IntegrationFailed(format!(
                "{} output intervals exceed the step budget of {}",
                self.n_samples, self.max_steps
            )));
        }
        if !request.reverse && request.t_end < request.t_start {
            return Err(GalOrbitsError::IntegrationFailed(format!(
                "t_end = {} precedes t_start = {} in a forward integration",
                request.t_end, request.t_start
            )));
        }

        let direction = request.direction();
        let span = (request.t_end - request.t_start).abs();
        if span == 0.0 {
            debug!(t = request.t_start, "empty integration interval");
            return Ok(TrajectoryTable::empty(direction));
        }

        let sign = if request.reverse { -1.0 } else { 1.0 };
        let dt = sign * span / self.n_samples as f64;

        let potential = GalacticPotential::new(request.mass_disc, request.mass_sphere);
        let rhs = |_t: f64, y: &State| {
            let a = potential.acceleration(&Vector3::new(y[0], y[1], y[2]));
            State::new(y[3], y[4], y[5], a.x, a.y, a.z)
        };

        let mut stepper = DormandPrince::new(request.rtol, request.atol, self.max_steps);
        let mut y = self.initial_state(request, &potential);
        let mut tau = request.t_start / KPC_KMS_IN_MYR;
        let mut h = stepper.initial_step(&rhs, tau, &y, sign);

        let mut rows = match self.n_samples.checked_add(1) {
            Some(capacity) => Vec::with_capacity(capacity),
            None => Vec::new(),
        };
        rows.push(sample_row(request.t_start, &y, &potential));

        for k in 1..=self.n_samples {
            let t = request.t_start + dt * k as f64;
            let tau_next = t / KPC_KMS_IN_MYR;
            match stepper.advance_to(&rhs, tau, &y, tau_next, h) {
                Ok((y_next, h_next)) => {
                    y = y_next;
                    h = h_next;
                    tau = tau_next;
                    rows.push(sample_row(t, &y, &potential));
                }
                Err(failure) => {
                    warn!(?failure, samples = rows.len(), "orbit integration stopped early");
                    break;
                }
            }
        }

        debug!(
            rows = rows.len(),
            steps = stepper.steps_taken(),
            rejected = stepper.rejected(),
            "orbit integrated"
        );
        TrajectoryTable::new(rows, direction)
    }
}
