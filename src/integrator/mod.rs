//! # Orbit integration contract
//!
//! The orbit integrator is a collaborator of the playback node: given initial conditions and
//! tolerances it returns a finite, time-ordered [`TrajectoryTable`]. This module fixes that
//! contract as the [`OrbitIntegrator`] trait and the [`IntegrationRequest`] record, and ships
//! one implementation.
//!
//! Modules
//! -----------------
//! * [`potential`](crate::integrator::potential) – axisymmetric Galactic potential (disc + sphere + halo).
//! * [`dormand_prince`](crate::integrator::dormand_prince) – adaptive Dormand–Prince 5(4) stepper.
//! * [`galactic_model`](crate::integrator::galactic_model) – [`GalacticModelIntegrator`], heliocentric
//!   observables → galactocentric orbit → 11-column rows.
//!
//! Empty results
//! -----------------
//! An integrator may legitimately return an empty table (for instance when `t_start == t_end`).
//! That is not an error: the caller logs a diagnostic and playback is immediately complete.
pub mod dormand_prince;
pub mod galactic_model;
pub mod potential;

pub use galactic_model::GalacticModelIntegrator;

use crate::{
    constants::{Degree, GigaSolarMass, KmPerSec, Kpc, MasPerYear, Myr},
    gal_orbits_errors::GalOrbitsError,
    trajectories::{TimeDirection, TrajectoryTable},
};

/// Inputs of one orbit integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationRequest {
    /// Heliocentric distance of the star
    pub initial_radius: Kpc,
    pub longitude_deg: Degree,
    pub latitude_deg: Degree,
    pub radial_velocity: KmPerSec,
    pub pm_l_cosb: MasPerYear,
    pub pm_b: MasPerYear,
    pub t_start: Myr,
    pub t_end: Myr,
    pub mass_disc: GigaSolarMass,
    pub mass_sphere: GigaSolarMass,
    pub reverse: bool,
    pub rtol: f64,
    pub atol: f64,
}

impl IntegrationRequest {
    /// Direction of `t` along the produced table.
    pub fn direction(&self) -> TimeDirection {
        TimeDirection::from_reverse(self.reverse)
    }
}

/// Anything able to turn an [`IntegrationRequest`] into a [`TrajectoryTable`].
pub trait OrbitIntegrator {
    /// Integrate the orbit described by `request`.
    ///
    /// Return
    /// ------
    /// * A validated table whose `t` column follows [`IntegrationRequest::direction`], possibly
    ///   empty, or an error when the request cannot be integrated at all.
    fn integrate(&self, request: &IntegrationRequest) -> Result<TrajectoryTable, GalOrbitsError>;
}
