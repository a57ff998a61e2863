//! # Trajectory tables on disk
//!
//! CSV ingestion and export of a [`TrajectoryTable`], with the header
//! `t,R,Vr,fi,Vfi,z,Vz,E,C,xg,yg` (see [`COLUMNS`](crate::constants::COLUMNS)).
//!
//! A table read from disk goes through the same validation as an integrator output, so
//! a precomputed trajectory can be played back without running the integrator.
use std::io::{Read, Write};

use camino::Utf8Path;

use crate::{
    constants::COLUMNS,
    gal_orbits_errors::GalOrbitsError,
    trajectories::{TimeDirection, TrajectoryRow, TrajectoryTable},
};

/// Construction of a [`TrajectoryTable`] from CSV sources and export back to CSV.
///
/// Note
/// ----
/// * Columns are matched by header name, their order in the file does not matter.
/// * A missing column, a non-numeric cell or a non-finite value is an
///   [`GalOrbitsError::InvalidTable`] or [`GalOrbitsError::CsvError`].
pub trait TrajectoryFile: Sized {
    /// Read a table from any CSV reader.
    ///
    /// Arguments
    /// ---------
    /// * `reader`: CSV text with a header line
    /// * `direction`: expected direction of `t` along the rows
    fn from_csv_reader<R: Read>(reader: R, direction: TimeDirection) -> Result<Self, GalOrbitsError>;

    /// Read a table from a CSV file.
    fn new_from_csv(path: &Utf8Path, direction: TimeDirection) -> Result<Self, GalOrbitsError>;

    /// Write the table as CSV to any writer.
    fn to_csv_writer<W: Write>(&self, writer: W) -> Result<(), GalOrbitsError>;

    /// Write the table to a CSV file, replacing any existing file.
    fn write_csv(&self, path: &Utf8Path) -> Result<(), GalOrbitsError>;
}

impl TrajectoryFile for TrajectoryTable {
    fn from_csv_reader<R: Read>(reader: R, direction: TimeDirection) -> Result<Self, GalOrbitsError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers()?.clone();
        if let Some(missing) = COLUMNS.iter().find(|c| !headers.iter().any(|h| h == **c)) {
            return Err(GalOrbitsError::InvalidTable(format!(
                "missing column {missing} in CSV header"
            )));
        }

        let rows = rdr
            .deserialize::<TrajectoryRow>()
            .collect::<Result<Vec<_>, _>>()?;
        TrajectoryTable::new(rows, direction)
    }

    fn new_from_csv(path: &Utf8Path, direction: TimeDirection) -> Result<Self, GalOrbitsError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file, direction)
    }

    fn to_csv_writer<W: Write>(&self, writer: W) -> Result<(), GalOrbitsError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in self.rows() {
            wtr.serialize(row)?;
        }
        if self.is_empty() {
            wtr.write_record(COLUMNS)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_csv(&self, path: &Utf8Path) -> Result<(), GalOrbitsError> {
        let file = std::fs::File::create(path)?;
        self.to_csv_writer(file)
    }
}
