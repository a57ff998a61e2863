//! # Constants and type definitions for gal_orbits
//!
//! This module centralizes the **unit conversions**, **astronomical constants** and **type aliases**
//! shared by the frame converter, the reference orbit integrator and the playback node.
//!
//! ## Overview
//!
//! - Angle conversions (degrees ↔ radians)
//! - Proper-motion ↔ tangential-velocity factor
//! - Gravitational constant and time unit in galactic units (kpc, km/s, Myr, 10⁹ M☉)
//! - The fixed ICRS → Galactic rotation
//! - Core type aliases used across the crate

use std::sync::LazyLock;

use nalgebra::Matrix3;

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Tangential velocity in km/s of a body at 1 kpc moving by 1 mas/yr on the sky
pub const K_PM: f64 = 4.740_470_463_533_348;

/// Gravitational constant in kpc·(km/s)² per 10⁹ M☉
pub const G_GAL: f64 = 4.300_917_270e3;

/// One internal time unit (kpc / (km/s)) expressed in Myr
pub const KPC_KMS_IN_MYR: f64 = 977.792_221_673;

/// Number of columns of a trajectory row
pub const N_COLUMNS: usize = 11;

/// Column names of a trajectory row, in wire order
pub const COLUMNS: [&str; N_COLUMNS] = ["t", "R", "Vr", "fi", "Vfi", "z", "Vz", "E", "C", "xg", "yg"];

/// Upper bound on the number of output intervals of one integration
pub const MAX_SAMPLES: usize = 10_000_000;

/// Default publish topic
pub const DEFAULT_TOPIC: &str = "/gal_orbits";

// -------------------------------------------------------------------------------------------------
// Galactic frame
// -------------------------------------------------------------------------------------------------

/// Rotation from ICRS cartesian coordinates to Galactic cartesian coordinates.
///
/// Rows are the Galactic axes (centre, rotation direction, north pole) expressed in ICRS,
/// as given by Liu, Zhu & Zhang (2011) and used by ERFA `eraIcrs2g`.
/// The inverse transform is the transpose.
#[allow(clippy::excessive_precision)]
pub static ICRS_TO_GALACTIC: LazyLock<Matrix3<f64>> = LazyLock::new(|| {
    Matrix3::new(
        -0.054875560416215368492398900454,
        -0.873437090234885048760383168409,
        -0.483835015548713226831774175116,
        0.494109427875583673525222371358,
        -0.444829629960011178146614061616,
        0.746982244497218890527388004556,
        -0.867666149019004701181616534570,
        -0.198076373431201528180486091412,
        0.455983776175066922272100478348,
    )
});

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Proper motion in milliarcseconds per year
pub type MasPerYear = f64;
/// Distance in kiloparsecs
pub type Kpc = f64;
/// Velocity in kilometers per second
pub type KmPerSec = f64;
/// Time in millions of years
pub type Myr = f64;
/// Mass in units of 10⁹ M☉
pub type GigaSolarMass = f64;
