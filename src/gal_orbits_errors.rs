use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalOrbitsError {
    #[error("Invalid angular input for {what}: {value}")]
    DomainError { what: &'static str, value: f64 },

    #[error("Invalid trajectory table: {0}")]
    InvalidTable(String),

    #[error("Tick out of range: cursor {index} for a table of {len} rows")]
    OutOfRange { index: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to parse the YAML configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Orbit integration failed: {0}")]
    IntegrationFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl PartialEq for GalOrbitsError {
    fn eq(&self, other: &Self) -> bool {
        use GalOrbitsError::*;
        match (self, other) {
            (
                DomainError {
                    what: w1,
                    value: v1,
                },
                DomainError {
                    what: w2,
                    value: v2,
                },
            ) => w1 == w2 && (v1 == v2 || (v1.is_nan() && v2.is_nan())),
            (InvalidTable(a), InvalidTable(b)) => a == b,
            (
                OutOfRange {
                    index: i1,
                    len: l1,
                },
                OutOfRange {
                    index: i2,
                    len: l2,
                },
            ) => i1 == i2 && l1 == l2,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (IntegrationFailed(a), IntegrationFailed(b)) => a == b,
            (Transport(a), Transport(b)) => a == b,

            // wrapped errors are not comparable: same variant is enough
            (ConfigParse(_), ConfigParse(_)) => true,
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (JsonError(_), JsonError(_)) => true,

            _ => false,
        }
    }
}
