//! Error type shared by every module.
/// Custom error type for the loadings crate.
///
/// Every error is fatal: a run either completes or stops before the daily loop begins.
/// Zero flows and empty reservoirs are ordinary numeric branches and never show up here.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// Error type from csv crate.
    #[error("Could not serialize/deserialize csv record: {0}")]
    Csv(#[from] csv::Error),
    /// Error type from std::io.
    #[error("Could not access file: {0}")]
    Io(#[from] std::io::Error),
    /// Error type from serde_yaml crate.
    #[error("Could not parse run settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A required setting or table is missing or malformed.
    #[error("Configuration error: {what}")]
    Config {
        /// What is wrong.
        what: String,
    },
    /// The same key is defined more than once in a table that requires unique keys.
    #[error("Duplicate entry in {table}: {key}")]
    Duplicate {
        /// Table name.
        table: &'static str,
        /// Repeated key.
        key: String,
    },
    /// An entity refers to a key that its parameter table does not define.
    #[error("Missing entry in {table}: {key}")]
    MissingKey {
        /// Table name.
        table: &'static str,
        /// Key that was looked up.
        key: String,
    },
    /// A daily input series does not line up with the simulation calendar.
    #[error("Series error for {unit}: {what}")]
    Series {
        /// Subbasin or land unit.
        unit: String,
        /// What is wrong.
        what: String,
    },
    /// Error from the plotting backend.
    #[error("Could not draw plot: {0}")]
    Plot(String),
}

impl LoadError {
    /// Shorthand for a [`LoadError::Config`] error.
    pub fn config<S: Into<String>>(what: S) -> Self {
        LoadError::Config { what: what.into() }
    }

    /// Shorthand for a [`LoadError::MissingKey`] error.
    pub fn missing<S: Into<String>>(table: &'static str, key: S) -> Self {
        LoadError::MissingKey {
            table,
            key: key.into(),
        }
    }

    /// Shorthand for a [`LoadError::Duplicate`] error.
    pub fn duplicate<S: Into<String>>(table: &'static str, key: S) -> Self {
        LoadError::Duplicate {
            table,
            key: key.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type LoadResult<T> = Result<T, LoadError>;
