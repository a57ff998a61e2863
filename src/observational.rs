//! # Observational input
//!
//! The immutable startup record gathering the observed sky position, kinematics and the
//! integration parameters of one star. It only lives during startup: once the Galactic proper
//! motion has been derived and the integrator has produced its table, it is dropped.
use crate::{
    constants::{Degree, GigaSolarMass, KmPerSec, Kpc, MasPerYear, Myr},
    gal_orbits_errors::GalOrbitsError,
    integrator::IntegrationRequest,
    ref_system::{check_latitude, check_longitude, equatorial_to_galactic_pm, GalacticProperMotion},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationalInput {
    /// Heliocentric distance
    pub distance_kpc: Kpc,
    pub longitude_deg: Degree,
    pub latitude_deg: Degree,
    pub radial_velocity: KmPerSec,
    /// `pm_ra·cos(dec)`
    pub proper_motion_ra_masyr: MasPerYear,
    pub proper_motion_dec_masyr: MasPerYear,
    pub t0: Myr,
    pub tf: Myr,
    pub mass_disc: GigaSolarMass,
    pub mass_sphere: GigaSolarMass,
    pub reverse: bool,
    pub rtol: f64,
    pub atol: f64,
}

impl ObservationalInput {
    /// Check the invariants of the record.
    ///
    /// Return
    /// ------
    /// * `Ok(())`, or a [`GalOrbitsError::DomainError`] for an out-of-range angle and a
    ///   [`GalOrbitsError::InvalidConfig`] for any other invalid value.
    pub fn validate(&self) -> Result<(), GalOrbitsError> {
        check_longitude("lon", self.longitude_deg)?;
        check_latitude("lat", self.latitude_deg)?;

        let finite = [
            ("rh", self.distance_kpc),
            ("vr", self.radial_velocity),
            ("pmra", self.proper_motion_ra_masyr),
            ("pmde", self.proper_motion_dec_masyr),
            ("t0", self.t0),
            ("tf", self.tf),
            ("M_disc", self.mass_disc),
            ("M_sph", self.mass_sphere),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(GalOrbitsError::InvalidConfig(format!(
                "{name} must be finite, got {value}"
            )));
        }

        if self.distance_kpc < 0.0 {
            return Err(GalOrbitsError::InvalidConfig(format!(
                "rh must be non-negative, got {}",
                self.distance_kpc
            )));
        }
        if !(self.rtol > 0.0 && self.rtol.is_finite()) {
            return Err(GalOrbitsError::InvalidConfig(format!(
                "rtol must be strictly positive, got {}",
                self.rtol
            )));
        }
        if !(self.atol > 0.0 && self.atol.is_finite()) {
            return Err(GalOrbitsError::InvalidConfig(format!(
                "atol must be strictly positive, got {}",
                self.atol
            )));
        }
        if !self.reverse && self.tf < self.t0 {
            return Err(GalOrbitsError::InvalidConfig(format!(
                "tf = {} precedes t0 = {} while reverse is false",
                self.tf, self.t0
            )));
        }
        Ok(())
    }

    /// Proper motion in the Galactic tangent-plane convention expected by the integrator.
    ///
    /// See also
    /// ------------
    /// * [`equatorial_to_galactic_pm`] – the underlying frame conversion.
    pub fn galactic_proper_motion(&self) -> Result<GalacticProperMotion, GalOrbitsError> {
        equatorial_to_galactic_pm(
            self.longitude_deg,
            self.latitude_deg,
            self.proper_motion_ra_masyr,
            self.proper_motion_dec_masyr,
        )
    }

    /// Validate the record, convert the proper motion and assemble the integrator call.
    pub fn integration_request(&self) -> Result<IntegrationRequest, GalOrbitsError> {
        self.validate()?;
        let pm = self.galactic_proper_motion()?;

        Ok(IntegrationRequest {
            initial_radius: self.distance_kpc,
            longitude_deg: self.longitude_deg,
            latitude_deg: self.latitude_deg,
            radial_velocity: self.radial_velocity,
            pm_l_cosb: pm.pm_l_cosb,
            pm_b: pm.pm_b,
            t_start: self.t0,
            t_end: self.tf,
            mass_disc: self.mass_disc,
            mass_sphere: self.mass_sphere,
            reverse: self.reverse,
            rtol: self.rtol,
            atol: self.atol,
        })
    }
}

#[cfg(test)]
mod observational_test {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn input() -> ObservationalInput {
        ObservationalInput {
            distance_kpc: 1.5,
            longitude_deg: 120.0,
            latitude_deg: 15.0,
            radial_velocity: -20.0,
            proper_motion_ra_masyr: 5.0,
            proper_motion_dec_masyr: -3.0,
            t0: 0.0,
            tf: 100.0,
            mass_disc: 100.0,
            mass_sphere: 30.0,
            reverse: false,
            rtol: 1e-9,
            atol: 1e-9,
        }
    }

    #[test]
    fn test_integration_request_carries_converted_pm() {
        let req = input().integration_request().unwrap();
        assert_abs_diff_eq!(req.pm_l_cosb, 4.252_530_268_189_726, epsilon = 1e-9);
        assert_abs_diff_eq!(req.pm_b, -3.989_484_467_713_870, epsilon = 1e-9);
        assert_eq!(req.initial_radius, 1.5);
        assert_eq!(req.t_end, 100.0);
        assert!(!req.reverse);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut bad = input();
        bad.longitude_deg = 361.0;
        assert!(matches!(
            bad.validate(),
            Err(GalOrbitsError::DomainError { what: "lon", .. })
        ));

        let mut bad = input();
        bad.rtol = 0.0;
        assert!(matches!(
            bad.validate(),
            Err(GalOrbitsError::InvalidConfig(_))
        ));

        let mut bad = input();
        bad.t0 = f64::NAN;
        assert_eq!(
            bad.validate(),
            Err(GalOrbitsError::InvalidConfig(
                "t0 must be finite, got NaN".into()
            ))
        );
    }

    #[test]
    fn test_end_before_start_requires_reverse() {
        let mut backward = input();
        backward.tf = -100.0;
        assert_eq!(
            backward.validate(),
            Err(GalOrbitsError::InvalidConfig(
                "tf = -100 precedes t0 = 0 while reverse is false".into()
            ))
        );

        backward.reverse = true;
        let req = backward.integration_request().unwrap();
        assert_eq!(req.t_end, -100.0);
    }

    #[test]
    fn test_pole_is_rejected_at_conversion() {
        let mut polar = input();
        polar.latitude_deg = -90.0;
        assert!(polar.validate().is_ok());
        assert!(polar.integration_request().is_err());
    }
}
