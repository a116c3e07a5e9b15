use std::{io, path::PathBuf};

use thiserror::Error;

/// The application index could not be enumerated or queried.
///
/// Fatal to a single refresh. Callers should keep showing the previous
/// snapshot and retry.
#[derive(Error, Debug)]
pub enum IndexUnavailableError {
    /// Listing installed applications failed
    #[error("failed to enumerate applications: {0}")]
    Enumerate(#[source] io::Error),

    /// Reading the metadata of one application failed
    #[error("failed to read application '{id}': {source}")]
    Lookup {
        id: String,
        #[source]
        source: io::Error,
    },

    /// The index returned an id it then didn't know about
    #[error("application '{0}' disappeared from the index")]
    Missing(String),
}

/// The relay inventory contains an identifier twice where it must be unique.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DuplicateIdentifierError {
    #[error("duplicate country code '{0}'")]
    Country(String),

    #[error("duplicate city code '{city_code}' in country '{country_code}'")]
    City {
        country_code: String,
        city_code: String,
    },

    #[error("duplicate relay '{hostname}' in {country_code}-{city_code}")]
    Relay {
        country_code: String,
        city_code: String,
        hostname: String,
    },
}

/// Errors from loading a relay inventory or an application list from disk.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse relay list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from launching an app outside the tunnel.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("'{0}' has no launch command")]
    NoCommand(String),

    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}
