//! The eventgen event streams
//!
//! This library synthesizes product analytics event logs for a fictitious
//! population of users. Each user is simulated independently from its own
//! random sub-stream; the resulting records are sorted by user and time and
//! encoded to a flat file for downstream pipelines to chew on.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(unused_extern_crates)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

use std::{io, path::PathBuf};

pub use cohort::Overflow;
pub use event::{EventName, EventRecord};
pub use event_log::{EventLog, Summary};
pub use output::{Encoding, persist};
pub use simulation::{Cohort, UserTimeline};

pub mod cohort;
pub mod common;
pub mod event;
pub mod event_log;
pub mod output;
pub mod simulation;

/// Errors related to event stream generation and persistence
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// IO operation failed
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    /// Csv encoding failed
    #[error("Csv payload could not be encoded: {0}")]
    Csv(#[from] csv::Error),
    /// Json encoding failed
    #[error("Json payload could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
    /// The destination file could not be created
    #[error("Failed to create output file {path:?}: {source}")]
    Create {
        /// Destination path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Generate instances of `Self::Output` from source of randomness.
pub trait Generator<'a> {
    /// The type produced by this generator.
    type Output: 'a;
    /// The error produced when generation fails.
    type Error: 'a;

    /// Generate a new instance of `Self::Output`.
    ///
    /// # Errors
    ///
    /// Implementations fail when their configuration does not admit a valid
    /// output.
    fn generate<R>(&'a self, rng: &mut R) -> Result<Self::Output, Self::Error>
    where
        R: rand::Rng + ?Sized;
}
