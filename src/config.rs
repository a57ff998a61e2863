//! # Configuration
//!
//! Startup parameters of the `gal_orbits` binary, read from YAML.
//!
//! Two layouts are accepted:
//!
//! ```yaml
//! # flat
//! rh: 2.5
//! lon: 120.0
//! lat: 15.0
//! reverse: true
//! ```
//!
//! ```yaml
//! # ROS 2 parameter file
//! gal_orb:
//!   ros__parameters:
//!     rh: 2.5
//!     lon: 120.0
//!     reverse: "True"
//! ```
//!
//! Missing keys take their defaults (see [`GalOrbitsConfig::default`]).
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::{
    constants::{DEFAULT_TOPIC, MAX_SAMPLES},
    gal_orbits_errors::GalOrbitsError,
    observational::ObservationalInput,
};

const ROS_PARAMETERS_KEY: &str = "ros__parameters";

/// The `reverse` switch, as a YAML boolean or as the `"True"`/`"False"` strings of ROS
/// parameter files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReverseFlag {
    Bool(bool),
    Text(String),
}

impl Default for ReverseFlag {
    fn default() -> Self {
        ReverseFlag::Bool(false)
    }
}

impl ReverseFlag {
    pub fn as_bool(&self) -> Result<bool, GalOrbitsError> {
        match self {
            ReverseFlag::Bool(b) => Ok(*b),
            ReverseFlag::Text(s) => match s.as_str() {
                "True" | "true" => Ok(true),
                "False" | "false" => Ok(false),
                other => Err(GalOrbitsError::InvalidConfig(format!(
                    "reverse must be True or False, got {other:?}"
                ))),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalOrbitsConfig {
    /// Heliocentric distance (kpc)
    pub rh: f64,
    /// Galactic longitude (deg)
    pub lon: f64,
    /// Galactic latitude (deg)
    pub lat: f64,
    /// Radial velocity (km/s)
    pub vr: f64,
    /// `pm_ra·cos(dec)` (mas/yr)
    pub pmra: f64,
    /// `pm_dec` (mas/yr)
    pub pmde: f64,
    /// Start time (Myr)
    pub t0: f64,
    /// End time (Myr)
    pub tf: f64,
    #[serde(rename = "M_disc")]
    pub mass_disc: f64,
    #[serde(rename = "M_sph")]
    pub mass_sphere: f64,
    pub reverse: ReverseFlag,
    pub rtol: f64,
    pub atol: f64,
    /// Playback rate (Hz)
    pub publish_freq: f64,
    pub topic: String,
    /// Number of output intervals of the reference integrator
    pub n_samples: usize,
}

impl Default for GalOrbitsConfig {
    fn default() -> Self {
        GalOrbitsConfig {
            rh: 0.0,
            lon: 0.0,
            lat: 0.0,
            vr: 0.0,
            pmra: 0.0,
            pmde: 0.0,
            t0: 0.0,
            tf: 0.0,
            mass_disc: 100.0,
            mass_sphere: 30.0,
            reverse: ReverseFlag::default(),
            rtol: 1e-9,
            atol: 1e-9,
            publish_freq: 10.0,
            topic: DEFAULT_TOPIC.to_string(),
            n_samples: 1000,
        }
    }
}

impl GalOrbitsConfig {
    /// Read and validate a YAML configuration file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, GalOrbitsError> {
        let content = std::fs::read_to_string(path)?;
        debug!(%path, "loading configuration");
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML document in either accepted layout.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GalOrbitsError> {
        let value: Value = serde_yaml::from_str(yaml)?;
        let config: GalOrbitsConfig = match unwrap_ros_parameters(value) {
            Value::Null => GalOrbitsConfig::default(),
            params => serde_yaml::from_value(params)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn reverse(&self) -> Result<bool, GalOrbitsError> {
        self.reverse.as_bool()
    }

    /// Check every startup invariant.
    ///
    /// Errors
    /// ------
    /// * [`GalOrbitsError::InvalidConfig`] naming the first offending parameter.
    pub fn validate(&self) -> Result<(), GalOrbitsError> {
        let values = [
            ("rh", self.rh),
            ("lon", self.lon),
            ("lat", self.lat),
            ("vr", self.vr),
            ("pmra", self.pmra),
            ("pmde", self.pmde),
            ("t0", self.t0),
            ("tf", self.tf),
            ("M_disc", self.mass_disc),
            ("M_sph", self.mass_sphere),
            ("rtol", self.rtol),
            ("atol", self.atol),
            ("publish_freq", self.publish_freq),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite, got {value}")));
        }

        if !(0.0..360.0).contains(&self.lon) {
            return Err(invalid(format!("lon must be in [0, 360), got {}", self.lon)));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(invalid(format!("lat must be in [-90, 90], got {}", self.lat)));
        }
        if self.rh < 0.0 {
            return Err(invalid(format!("rh must be non-negative, got {}", self.rh)));
        }
        for (name, value) in [
            ("rtol", self.rtol),
            ("atol", self.atol),
            ("publish_freq", self.publish_freq),
        ] {
            if value <= 0.0 {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if self.n_samples == 0 {
            return Err(invalid("n_samples must be at least 1".into()));
        }
        if self.n_samples > MAX_SAMPLES {
            return Err(invalid(format!(
                "n_samples must be at most {MAX_SAMPLES}, got {}",
                self.n_samples
            )));
        }
        if self.topic.is_empty() {
            return Err(invalid("topic must not be empty".into()));
        }

        if !self.reverse()? && self.tf < self.t0 {
            return Err(invalid(format!(
                "tf = {} precedes t0 = {} while reverse is false",
                self.tf, self.t0
            )));
        }
        Ok(())
    }

    /// The observational record described by this configuration.
    pub fn to_observational_input(&self) -> Result<ObservationalInput, GalOrbitsError> {
        Ok(ObservationalInput {
            distance_kpc: self.rh,
            longitude_deg: self.lon,
            latitude_deg: self.lat,
            radial_velocity: self.vr,
            proper_motion_ra_masyr: self.pmra,
            proper_motion_dec_masyr: self.pmde,
            t0: self.t0,
            tf: self.tf,
            mass_disc: self.mass_disc,
            mass_sphere: self.mass_sphere,
            reverse: self.reverse()?,
            rtol: self.rtol,
            atol: self.atol,
        })
    }
}

fn invalid(msg: String) -> GalOrbitsError {
    GalOrbitsError::InvalidConfig(msg)
}

/// Strip the `<node>: { ros__parameters: ... }` wrapping if present.
fn unwrap_ros_parameters(value: Value) -> Value {
    let Value::Mapping(map) = &value else {
        return value;
    };
    if map.len() != 1 {
        return value;
    }

    match map.values().next() {
        Some(Value::Mapping(node)) => match node.get(ROS_PARAMETERS_KEY) {
            Some(params) => params.clone(),
            None => value,
        },
        _ => value,
    }
}
