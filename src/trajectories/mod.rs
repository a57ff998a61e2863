//! # Trajectories: rows, tables and their validation
//!
//! The integrator output is held as a [`TrajectoryTable`]: an ordered, finite sequence of
//! [`TrajectoryRow`]s with the fixed 11-column schema
//! `{t, R, Vr, fi, Vfi, z, Vz, E, C, xg, yg}` (see [`COLUMNS`]).
//!
//! Modules
//! -----------------
//! * [`trajectory_file`](crate::trajectories::trajectory_file) – CSV ingestion and export of a table.
//!
//! Invariants
//! -----------------
//! * Every field of every row is finite.
//! * Rows are strictly time-ordered by `t`, increasing for a forward integration and
//!   decreasing when `reverse` was requested ([`TimeDirection`]).
//! * A table is immutable once built; malformed input is rejected at construction with
//!   [`GalOrbitsError::InvalidTable`], never discovered later during playback.
//! * An empty table is valid.
//!
//! Units
//! -----------------
//! * `t` in Myr; `R`, `z`, `xg`, `yg` in kpc; `Vr`, `Vfi`, `Vz` in km/s; `fi` in degrees;
//!   `E` in (km/s)²; `C` in kpc·km/s.
pub mod trajectory_file;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{COLUMNS, N_COLUMNS},
    gal_orbits_errors::GalOrbitsError,
};

/// One integration sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRow {
    pub t: f64,
    #[serde(rename = "R")]
    pub r: f64,
    #[serde(rename = "Vr")]
    pub vr: f64,
    pub fi: f64,
    #[serde(rename = "Vfi")]
    pub vfi: f64,
    pub z: f64,
    #[serde(rename = "Vz")]
    pub vz: f64,
    #[serde(rename = "E")]
    pub e: f64,
    #[serde(rename = "C")]
    pub c: f64,
    pub xg: f64,
    pub yg: f64,
}

impl TrajectoryRow {
    /// Values in wire order, see [`COLUMNS`].
    pub fn to_array(&self) -> [f64; N_COLUMNS] {
        [
            self.t, self.r, self.vr, self.fi, self.vfi, self.z, self.vz, self.e, self.c, self.xg,
            self.yg,
        ]
    }

    fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        COLUMNS
            .iter()
            .zip(self.to_array())
            .find(|(_, v)| !v.is_finite())
            .map(|(name, v)| (*name, v))
    }
}

impl From<[f64; N_COLUMNS]> for TrajectoryRow {
    fn from(v: [f64; N_COLUMNS]) -> Self {
        TrajectoryRow {
            t: v[0],
            r: v[1],
            vr: v[2],
            fi: v[3],
            vfi: v[4],
            z: v[5],
            vz: v[6],
            e: v[7],
            c: v[8],
            xg: v[9],
            yg: v[10],
        }
    }
}

impl TryFrom<&[f64]> for TrajectoryRow {
    type Error = GalOrbitsError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let array: [f64; N_COLUMNS] = values.try_into().map_err(|_| {
            GalOrbitsError::InvalidTable(format!(
                "expected {N_COLUMNS} columns, got {}",
                values.len()
            ))
        })?;
        Ok(array.into())
    }
}

/// Direction of time along a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeDirection {
    #[default]
    Forward,
    Backward,
}

impl TimeDirection {
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            TimeDirection::Backward
        } else {
            TimeDirection::Forward
        }
    }

    fn is_ordered(&self, previous: f64, next: f64) -> bool {
        match self {
            TimeDirection::Forward => next > previous,
            TimeDirection::Backward => next < previous,
        }
    }
}

/// Validated, immutable trajectory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrajectoryTable {
    rows: Vec<TrajectoryRow>,
    direction: TimeDirection,
}

impl TrajectoryTable {
    pub fn empty(direction: TimeDirection) -> Self {
        TrajectoryTable {
            rows: Vec::new(),
            direction,
        }
    }

    /// Build a table from rows, checking finiteness and time ordering.
    ///
    /// Arguments
    /// ---------
    /// * `rows`: samples in emission order
    /// * `direction`: expected direction of `t` along the rows
    ///
    /// Return
    /// ------
    /// * The table, or [`GalOrbitsError::InvalidTable`] naming the first offending row.
    pub fn new(rows: Vec<TrajectoryRow>, direction: TimeDirection) -> Result<Self, GalOrbitsError> {
        if let Some((index, (name, value))) = rows
            .iter()
            .enumerate()
            .find_map(|(i, row)| row.first_non_finite().map(|bad| (i, bad)))
        {
            return Err(GalOrbitsError::InvalidTable(format!(
                "row {index}: column {name} is not finite ({value})"
            )));
        }

        if let Some((index, (prev, next))) = rows
            .iter()
            .map(|row| row.t)
            .tuple_windows()
            .enumerate()
            .find(|(_, (prev, next))| !direction.is_ordered(*prev, *next))
        {
            return Err(GalOrbitsError::InvalidTable(format!(
                "row {}: t = {next} does not follow t = {prev} in {direction:?} order",
                index + 1
            )));
        }

        Ok(TrajectoryTable { rows, direction })
    }

    /// Build a table from raw numeric records, each of exactly 11 values.
    pub fn from_records<R>(records: &[R], direction: TimeDirection) -> Result<Self, GalOrbitsError>
    where
        R: AsRef<[f64]>,
    {
        let rows = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                TrajectoryRow::try_from(record.as_ref()).map_err(|err| match err {
                    GalOrbitsError::InvalidTable(msg) => {
                        GalOrbitsError::InvalidTable(format!("row {i}: {msg}"))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rows, direction)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrajectoryRow> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[TrajectoryRow] {
        &self.rows
    }

    pub fn direction(&self) -> TimeDirection {
        self.direction
    }
}

#[cfg(test)]
mod trajectories_test {
    use super::*;

    fn row(t: f64) -> TrajectoryRow {
        TrajectoryRow::from([t, 8.0, 1.0, 0.0, 220.0, 0.1, 2.0, -1.5e5, 1760.0, 8.0, 0.0])
    }

    #[test]
    fn test_row_wire_order() {
        let r = TrajectoryRow::from([
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0,
        ]);
        assert_eq!(r.r, 2.0);
        assert_eq!(r.c, 9.0);
        assert_eq!(r.yg, 11.0);
        assert_eq!(
            r.to_array(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0]
        );
    }

    #[test]
    fn test_forward_and_backward_order() {
        let forward = vec![row(0.0), row(1.0), row(2.0)];
        assert!(TrajectoryTable::new(forward.clone(), TimeDirection::Forward).is_ok());
        assert_eq!(
            TrajectoryTable::new(forward, TimeDirection::Backward),
            Err(GalOrbitsError::InvalidTable(
                "row 1: t = 1 does not follow t = 0 in Backward order".into()
            ))
        );

        let backward = vec![row(0.0), row(-1.0), row(-2.0)];
        let table = TrajectoryTable::new(backward, TimeDirection::Backward).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.direction(), TimeDirection::Backward);
    }

    #[test]
    fn test_duplicate_time_is_rejected() {
        let rows = vec![row(0.0), row(1.0), row(1.0)];
        assert!(TrajectoryTable::new(rows, TimeDirection::Forward).is_err());
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let mut bad = row(1.0);
        bad.vz = f64::NAN;
        let err = TrajectoryTable::new(vec![row(0.0), bad], TimeDirection::Forward).unwrap_err();
        assert_eq!(
            err,
            GalOrbitsError::InvalidTable("row 1: column Vz is not finite (NaN)".into())
        );
    }

    #[test]
    fn test_wrong_column_count_is_rejected() {
        let records = vec![vec![0.0; 11], vec![1.0; 10]];
        assert_eq!(
            TrajectoryTable::from_records(&records, TimeDirection::Forward),
            Err(GalOrbitsError::InvalidTable(
                "row 1: expected 11 columns, got 10".into()
            ))
        );
    }

    #[test]
    fn test_empty_table_is_valid() {
        let table = TrajectoryTable::new(Vec::new(), TimeDirection::Forward).unwrap();
        assert!(table.is_empty());
        assert_eq!(table, TrajectoryTable::empty(TimeDirection::Forward));
        assert!(table.get(0).is_none());
    }
}
