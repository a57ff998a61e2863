//! # Axisymmetric Galactic potential
//!
//! Three components, all in kpc, km/s and 10⁹ M☉:
//!
//! * Miyamoto–Nagai disc: `Φ = -G·M / sqrt(R² + (a + sqrt(z² + b²))²)`
//! * Plummer sphere (bulge): `Φ = -G·M / sqrt(r² + b²)`
//! * NFW halo: `Φ = -G·Mₛ·ln(1 + r/rₛ) / r`
//!
//! Disc and sphere masses come from the configuration (`M_disc`, `M_sph`); shape parameters
//! and the halo have fixed defaults in [`GalacticPotential::new`].
use nalgebra::Vector3;

use crate::constants::{GigaSolarMass, KmPerSec, Kpc, G_GAL};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalacticPotential {
    pub mass_disc: GigaSolarMass,
    pub disc_scale_length: Kpc,
    pub disc_scale_height: Kpc,
    pub mass_sphere: GigaSolarMass,
    pub sphere_scale: Kpc,
    /// NFW characteristic mass `4π·ρ₀·rₛ³`
    pub halo_mass: GigaSolarMass,
    pub halo_scale: Kpc,
}

impl GalacticPotential {
    pub fn new(mass_disc: GigaSolarMass, mass_sphere: GigaSolarMass) -> Self {
        GalacticPotential {
            mass_disc,
            disc_scale_length: 3.0,
            disc_scale_height: 0.28,
            mass_sphere,
            sphere_scale: 0.3,
            halo_mass: 400.0,
            halo_scale: 20.0,
        }
    }

    /// Potential in (km/s)² at galactocentric position `x` (kpc).
    pub fn potential(&self, x: &Vector3<f64>) -> f64 {
        let r_cyl2 = x.x * x.x + x.y * x.y;
        let r = x.norm();

        let s = (x.z * x.z + self.disc_scale_height.powi(2)).sqrt();
        let disc = -G_GAL * self.mass_disc
            / (r_cyl2 + (self.disc_scale_length + s).powi(2)).sqrt();

        let sphere = -G_GAL * self.mass_sphere / (r * r + self.sphere_scale.powi(2)).sqrt();

        let halo = if r > 0.0 {
            -G_GAL * self.halo_mass * (1.0 + r / self.halo_scale).ln() / r
        } else {
            -G_GAL * self.halo_mass / self.halo_scale
        };

        disc + sphere + halo
    }

    /// Acceleration `-∇Φ` in (km/s)² / kpc.
    pub fn acceleration(&self, x: &Vector3<f64>) -> Vector3<f64> {
        let r_cyl2 = x.x * x.x + x.y * x.y;
        let r2 = x.norm_squared();
        let r = r2.sqrt();

        // Miyamoto–Nagai
        let s = (x.z * x.z + self.disc_scale_height.powi(2)).sqrt();
        let a_s = self.disc_scale_length + s;
        let d3 = (r_cyl2 + a_s * a_s).powf(1.5);
        let k_disc = G_GAL * self.mass_disc / d3;
        let disc = Vector3::new(-k_disc * x.x, -k_disc * x.y, -k_disc * x.z * a_s / s);

        // Plummer
        let k_sphere = G_GAL * self.mass_sphere / (r2 + self.sphere_scale.powi(2)).powf(1.5);
        let sphere = -x * k_sphere;

        // NFW, regular at the centre
        let halo = if r > 0.0 {
            let dphi_dr = G_GAL
                * self.halo_mass
                * ((1.0 + r / self.halo_scale).ln() / r2 - 1.0 / (r * (r + self.halo_scale)));
            -x * (dphi_dr / r)
        } else {
            Vector3::zeros()
        };

        disc + sphere + halo
    }

    /// Circular speed in the plane `z = 0` at cylindrical radius `r`.
    pub fn circular_velocity(&self, r: Kpc) -> KmPerSec {
        let a = self.acceleration(&Vector3::new(r, 0.0, 0.0));
        (-a.x * r).max(0.0).sqrt()
    }
}
