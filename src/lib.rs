//! interval-store: canonical interval-keyed maps
//!
//! This crate provides a container that maps every key of a totally ordered
//! key space to a value while storing only the keys where the value changes.
//! Assigning a value to a half-open range `[begin, end)` rewrites the affected
//! boundaries in place and leaves the map in canonical form, so point lookups
//! stay logarithmic in the number of distinct runs.

#![warn(missing_docs)]

/// Canonical interval map and its boundary backends
pub mod interval;

/// Thread-safe handle for sharing one store
pub mod shared;

/// Byte-buffer and text drivers
pub mod driver;

// Re-exports
pub use config::DriverConfig;
pub use driver::{Assignment, ReplayReport, Replayer};
pub use error::{Error, Result};
pub use interval::{IntervalError, IntervalStore, IntervalStoreStats, SegmentMap, SortedVecMap};
pub use shared::SharedIntervalStore;

/// Error types for interval-store operations
pub mod error {
    use std::error::Error as StdError;
    use std::fmt;
    use std::io;

    use crate::interval::IntervalError;

    /// Error types that can occur around an interval store
    #[derive(Debug)]
    pub enum Error {
        /// An I/O error occurred
        Io(io::Error),
        /// Text input could not be parsed into an assignment
        Parse(String),
        /// An interval operation was rejected
        Interval(IntervalError),
        /// The store lost canonical form after the given input
        NotCanonical {
            /// 1-based index of the offending input
            after: usize,
        },
        /// Configuration error
        Config(String),
    }

    impl fmt::Display for Error {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Error::Io(err) => write!(f, "I/O error: {}", err),
                Error::Parse(msg) => write!(f, "Parse error: {}", msg),
                Error::Interval(err) => write!(f, "Interval error: {}", err),
                Error::NotCanonical { after } => {
                    write!(f, "Store is not canonical after input {}", after)
                }
                Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            }
        }
    }

    impl StdError for Error {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            match self {
                Error::Io(err) => Some(err),
                Error::Interval(err) => Some(err),
                _ => None,
            }
        }
    }

    impl From<io::Error> for Error {
        fn from(err: io::Error) -> Self {
            Error::Io(err)
        }
    }

    impl From<IntervalError> for Error {
        fn from(err: IntervalError) -> Self {
            Error::Interval(err)
        }
    }

    /// Result alias for interval-store operations
    pub type Result<T> = std::result::Result<T, Error>;
}

/// Configuration options for the drivers
pub mod config {
    use crate::error::{Error, Result};

    /// Configuration shared by the interactive and replay drivers
    #[derive(Debug, Clone)]
    pub struct DriverConfig {
        /// Value of every key not explicitly assigned
        pub default_value: u8,
        /// Whether to check canonical form after every replayed input
        pub verify_canonical: bool,
        /// Whether the interactive session prints a prompt
        pub prompt: bool,
    }

    impl DriverConfig {
        /// Set the default value from a single ASCII character
        pub fn with_default_char(mut self, value: char) -> Result<Self> {
            if !value.is_ascii() {
                return Err(Error::Config(format!(
                    "default value must be a single ASCII character, got {:?}",
                    value
                )));
            }
            self.default_value = value as u8;
            Ok(self)
        }
    }

    impl Default for DriverConfig {
        fn default() -> Self {
            Self {
                default_value: b'A',
                verify_canonical: true,
                prompt: true,
            }
        }
    }
}
