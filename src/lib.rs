pub mod config;
pub mod constants;
pub mod gal_orbits_errors;
pub mod integrator;
pub mod node;
pub mod observational;
pub mod player;
pub mod publisher;
pub mod ref_system;
pub mod trajectories;
