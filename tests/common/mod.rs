#![allow(dead_code)]

use approx::assert_relative_eq;
use gal_orbits::{publisher::Float64MultiArray, trajectories::TrajectoryRow};

pub fn assert_message_matches_row(actual: &Float64MultiArray, expected: &TrajectoryRow, epsilon: f64) {
    assert_eq!(actual.data.len(), 11);
    let expected = expected.to_array();
    for (a, e) in actual.data.iter().zip(expected.iter()) {
        assert_relative_eq!(*a, *e, epsilon = epsilon);
    }
}

pub fn assert_sky_close(actual: (f64, f64), expected: (f64, f64), epsilon: f64) {
    assert_relative_eq!(actual.0, expected.0, epsilon = epsilon);
    assert_relative_eq!(actual.1, expected.1, epsilon = epsilon);
}
