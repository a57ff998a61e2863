//! # Galactic ↔ ICRS frame conversion
//!
//! Positions and proper motions between the equatorial (ICRS) frame and the Galactic frame.
//!
//! ## Overview
//! -----------------
//! Both frames share the same origin and differ by the fixed rotation
//! [`ICRS_TO_GALACTIC`]. A direction on the sky is carried as a unit vector;
//! a proper motion is carried as a tangential vector built from the local
//! east/north unit vectors of the source frame, rotated, then projected back on the
//! east/north unit vectors of the target frame.
//!
//! Because the east unit vector already has unit length, the projection directly
//! yields `pm_l·cos(b)` (resp. `pm_ra·cos(dec)`): the `cos(b)` factor of the tangent-plane
//! convention is built into the basis. [`GalacticProperMotion::pm_l`] removes it again when
//! the true rate of change of `l` is needed.
//!
//! ## Units
//! -----------------
//! * Angles are degrees at the API boundary and radians internally.
//! * Proper motions are milliarcseconds per year and are only re-projected, their modulus
//!   is preserved.
//!
//! ## Domain
//! -----------------
//! * Longitudes must lie in `[0, 360)`, latitudes in `[-90, 90]`, every value must be finite.
//! * Proper-motion conversions reject `|b| = 90°`: at a pole the east direction is undefined.
//!
//! ## See also
//! ------------
//! * [`ObservationalInput::galactic_proper_motion`](crate::observational::ObservationalInput::galactic_proper_motion) – startup entry point.
use nalgebra::Vector3;

use crate::{
    constants::{Degree, MasPerYear, ICRS_TO_GALACTIC, RADEG},
    gal_orbits_errors::GalOrbitsError,
};

/// Proper motion in the Galactic tangent-plane convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalacticProperMotion {
    /// `dl/dt · cos(b)` in mas/yr
    pub pm_l_cosb: MasPerYear,
    /// `db/dt` in mas/yr
    pub pm_b: MasPerYear,
}

impl GalacticProperMotion {
    /// True rate of change of the Galactic longitude at latitude `b`.
    ///
    /// Arguments
    /// ---------
    /// * `b`: Galactic latitude in degrees
    ///
    /// Return
    /// ------
    /// * `pm_l_cosb / cos(b)` in mas/yr, or a [`GalOrbitsError::DomainError`] at the poles.
    pub fn pm_l(&self, b: Degree) -> Result<MasPerYear, GalOrbitsError> {
        check_latitude("b", b)?;
        check_off_pole("b", b)?;
        Ok(self.pm_l_cosb / (b * RADEG).cos())
    }

    /// Modulus of the proper motion in mas/yr.
    pub fn total(&self) -> MasPerYear {
        self.pm_l_cosb.hypot(self.pm_b)
    }
}

/// Proper motion in the equatorial tangent-plane convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialProperMotion {
    /// `dra/dt · cos(dec)` in mas/yr
    pub pm_ra_cosdec: MasPerYear,
    /// `ddec/dt` in mas/yr
    pub pm_dec: MasPerYear,
}

fn check_finite(what: &'static str, value: f64) -> Result<f64, GalOrbitsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GalOrbitsError::DomainError { what, value })
    }
}

pub(crate) fn check_longitude(what: &'static str, value: Degree) -> Result<Degree, GalOrbitsError> {
    check_finite(what, value)?;
    if (0.0..360.0).contains(&value) {
        Ok(value)
    } else {
        Err(GalOrbitsError::DomainError { what, value })
    }
}

pub(crate) fn check_latitude(what: &'static str, value: Degree) -> Result<Degree, GalOrbitsError> {
    check_finite(what, value)?;
    if (-90.0..=90.0).contains(&value) {
        Ok(value)
    } else {
        Err(GalOrbitsError::DomainError { what, value })
    }
}

fn check_off_pole(what: &'static str, value: Degree) -> Result<Degree, GalOrbitsError> {
    if value.abs() == 90.0 {
        Err(GalOrbitsError::DomainError { what, value })
    } else {
        Ok(value)
    }
}

/// Unit vector pointing at `(lon, lat)`, both in degrees.
pub(crate) fn unit_vector(lon: Degree, lat: Degree) -> Vector3<f64> {
    let (sin_lon, cos_lon) = (lon * RADEG).sin_cos();
    let (sin_lat, cos_lat) = (lat * RADEG).sin_cos();
    Vector3::new(cos_lon * cos_lat, sin_lon * cos_lat, sin_lat)
}

/// Spherical angles of a (not necessarily normalized) vector, longitude in `[0, 360)`.
fn spherical_angles(v: &Vector3<f64>) -> (Degree, Degree) {
    let d2 = v.x * v.x + v.y * v.y;
    let lon = if d2 != 0.0 { v.y.atan2(v.x) } else { 0.0 };
    let lat = if d2 != 0.0 || v.z != 0.0 {
        v.z.atan2(d2.sqrt())
    } else {
        0.0
    };

    let lon_deg = (lon / RADEG).rem_euclid(360.0);
    // rem_euclid may round a tiny negative angle up to exactly 360
    let lon_deg = if lon_deg >= 360.0 { 0.0 } else { lon_deg };
    (lon_deg, lat / RADEG)
}

/// Local east and north unit vectors at `(lon, lat)`.
pub(crate) fn tangent_basis(lon: Degree, lat: Degree) -> (Vector3<f64>, Vector3<f64>) {
    let (sin_lon, cos_lon) = (lon * RADEG).sin_cos();
    let (sin_lat, cos_lat) = (lat * RADEG).sin_cos();
    let east = Vector3::new(-sin_lon, cos_lon, 0.0);
    let north = Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);
    (east, north)
}

/// Convert an ICRS position to Galactic coordinates.
///
/// Arguments
/// ---------
/// * `ra`: right ascension in degrees, `[0, 360)`
/// * `dec`: declination in degrees, `[-90, 90]`
///
/// Return
/// ------
/// * `(l, b)` in degrees, `l ∈ [0, 360)`
pub fn equatorial_to_galactic(ra: Degree, dec: Degree) -> Result<(Degree, Degree), GalOrbitsError> {
    check_longitude("ra", ra)?;
    check_latitude("dec", dec)?;

    let gal = *ICRS_TO_GALACTIC * unit_vector(ra, dec);
    Ok(spherical_angles(&gal))
}

/// Convert a Galactic position to ICRS coordinates.
///
/// Arguments
/// ---------
/// * `l`: Galactic longitude in degrees, `[0, 360)`
/// * `b`: Galactic latitude in degrees, `[-90, 90]`
///
/// Return
/// ------
/// * `(ra, dec)` in degrees, `ra ∈ [0, 360)`
pub fn galactic_to_equatorial(l: Degree, b: Degree) -> Result<(Degree, Degree), GalOrbitsError> {
    check_longitude("l", l)?;
    check_latitude("b", b)?;

    let icrs = ICRS_TO_GALACTIC.transpose() * unit_vector(l, b);
    Ok(spherical_angles(&icrs))
}

/// Re-project an equatorial proper motion onto the Galactic tangent plane.
///
/// The sky position is given in Galactic coordinates while the proper motion is given in the
/// equatorial convention, which is how the observables arrive at startup. The position is first
/// moved to ICRS, the tangential motion is built there from `(pmra, pmdec)`, rotated to the
/// Galactic frame and projected on the local `(l, b)` directions.
///
/// Arguments
/// ---------
/// * `l`, `b`: Galactic position in degrees
/// * `pmra`: `pm_ra·cos(dec)` in mas/yr
/// * `pmdec`: `pm_dec` in mas/yr
///
/// Return
/// ------
/// * The [`GalacticProperMotion`] `(pm_l_cosb, pm_b)` in mas/yr
///
/// Errors
/// ------
/// * [`GalOrbitsError::DomainError`] for out-of-range or non-finite input, and for `|b| = 90°`.
pub fn equatorial_to_galactic_pm(
    l: Degree,
    b: Degree,
    pmra: MasPerYear,
    pmdec: MasPerYear,
) -> Result<GalacticProperMotion, GalOrbitsError> {
    check_off_pole("b", check_latitude("b", b)?)?;
    check_finite("pmra", pmra)?;
    check_finite("pmdec", pmdec)?;

    let (ra, dec) = galactic_to_equatorial(l, b)?;
    let (east_eq, north_eq) = tangent_basis(ra, dec);
    let motion_icrs = east_eq * pmra + north_eq * pmdec;

    let motion_gal = *ICRS_TO_GALACTIC * motion_icrs;
    let (east_gal, north_gal) = tangent_basis(l, b);

    Ok(GalacticProperMotion {
        pm_l_cosb: motion_gal.dot(&east_gal),
        pm_b: motion_gal.dot(&north_gal),
    })
}

/// Inverse of [`equatorial_to_galactic_pm`]: re-project a Galactic proper motion onto the
/// equatorial tangent plane at the ICRS position `(ra, dec)`.
pub fn galactic_to_equatorial_pm(
    ra: Degree,
    dec: Degree,
    pm_l_cosb: MasPerYear,
    pm_b: MasPerYear,
) -> Result<EquatorialProperMotion, GalOrbitsError> {
    check_finite("pm_l_cosb", pm_l_cosb)?;
    check_finite("pm_b", pm_b)?;

    let (l, b) = equatorial_to_galactic(ra, dec)?;
    check_off_pole("b", b)?;
    let (east_gal, north_gal) = tangent_basis(l, b);
    let motion_gal = east_gal * pm_l_cosb + north_gal * pm_b;

    let motion_icrs = ICRS_TO_GALACTIC.transpose() * motion_gal;
    let (east_eq, north_eq) = tangent_basis(ra, dec);

    Ok(EquatorialProperMotion {
        pm_ra_cosdec: motion_icrs.dot(&east_eq),
        pm_dec: motion_icrs.dot(&north_eq),
    })
}

#[cfg(test)]
mod ref_system_test {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_galactic_center_direction() {
        let (ra, dec) = galactic_to_equatorial(0.0, 0.0).unwrap();
        assert_abs_diff_eq!(ra, 266.404_994_801, epsilon = 1e-8);
        assert_abs_diff_eq!(dec, -28.936_173_960, epsilon = 1e-8);
    }

    #[test]
    fn test_north_galactic_pole() {
        let (ra, dec) = galactic_to_equatorial(0.0, 90.0).unwrap();
        assert_abs_diff_eq!(ra, 192.859_48, epsilon = 1e-8);
        assert_abs_diff_eq!(dec, 27.128_25, epsilon = 1e-8);
    }

    #[test]
    fn test_position_round_trip() {
        for &(l, b) in &[
            (0.0, 0.0),
            (120.0, 15.0),
            (359.5, -45.0),
            (200.0, 89.9),
            (33.3, -89.9),
            (266.0, 3.0),
        ] {
            let (ra, dec) = galactic_to_equatorial(l, b).unwrap();
            let (l2, b2) = equatorial_to_galactic(ra, dec).unwrap();
            assert_abs_diff_eq!(l2, l, epsilon = 1e-9);
            assert_abs_diff_eq!(b2, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(
            galactic_to_equatorial(360.0, 0.0),
            Err(GalOrbitsError::DomainError {
                what: "l",
                value: 360.0
            })
        );
        assert_eq!(
            galactic_to_equatorial(10.0, -90.5),
            Err(GalOrbitsError::DomainError {
                what: "b",
                value: -90.5
            })
        );
        assert!(galactic_to_equatorial(f64::NAN, 0.0).is_err());
        assert_eq!(
            equatorial_to_galactic_pm(10.0, 90.0, 1.0, 1.0),
            Err(GalOrbitsError::DomainError {
                what: "b",
                value: 90.0
            })
        );
        assert!(equatorial_to_galactic_pm(10.0, 10.0, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_proper_motion_modulus_is_preserved() {
        let pm = equatorial_to_galactic_pm(120.0, 15.0, 5.0, -3.0).unwrap();
        assert_abs_diff_eq!(pm.total(), 34f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_proper_motion_round_trip() {
        let (l, b) = (75.0, -20.0);
        let pm = equatorial_to_galactic_pm(l, b, -2.5, 7.25).unwrap();
        let (ra, dec) = galactic_to_equatorial(l, b).unwrap();
        let back = galactic_to_equatorial_pm(ra, dec, pm.pm_l_cosb, pm.pm_b).unwrap();
        assert_abs_diff_eq!(back.pm_ra_cosdec, -2.5, epsilon = 1e-10);
        assert_abs_diff_eq!(back.pm_dec, 7.25, epsilon = 1e-10);
    }

    #[test]
    fn test_pm_l_removes_cos_b() {
        let pm = GalacticProperMotion {
            pm_l_cosb: 1.0,
            pm_b: 0.0,
        };
        assert_abs_diff_eq!(pm.pm_l(60.0).unwrap(), 2.0, epsilon = 1e-12);
        assert!(pm.pm_l(-90.0).is_err());
    }
}
