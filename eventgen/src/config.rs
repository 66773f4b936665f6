//! This module controls configuration parsing from the end user, providing a
//! convenience mechanism for the rest of the program. Crashes are most likely
//! to originate from this code, intentionally.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use eventgen_stream::{Encoding, cohort};
use serde::Deserialize;

/// Errors produced by [`Config`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Error for a serde [`serde_yaml`].
    #[error("Failed to deserialize yaml: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    /// Error reading config file
    #[error("Failed to read config file {path:?}: {source}")]
    ReadFile {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// The cohort does not admit a simulation
    #[error("Invalid cohort configuration: {0}")]
    Cohort(#[from] eventgen_stream::Error),
    /// The output path does not name a file
    #[error("Output path {0:?} does not name a file")]
    OutputPath(PathBuf),
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/raw_events.csv")
}

/// Where and how the event log is written
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Output {
    /// Destination file. Its directory must exist.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    /// Encoding of the destination file
    #[serde(default)]
    pub encoding: Encoding,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            encoding: Encoding::default(),
        }
    }
}

/// Main configuration struct for this program
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The seed for random operations against this cohort. When absent a
    /// fresh seed is drawn and logged so the run can be repeated.
    pub seed: Option<[u8; 32]>,
    /// The output artifact
    #[serde(default)]
    pub output: Output,
    /// The simulated cohort
    #[serde(default)]
    pub cohort: cohort::Config,
}

impl Config {
    /// Determine whether this configuration can drive a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the cohort is invalid or the output path does not
    /// name a file.
    pub fn validate(&self) -> Result<(), Error> {
        self.cohort.validate()?;
        if self.output.path.file_name().is_none() {
            return Err(Error::OutputPath(self.output.path.clone()));
        }
        Ok(())
    }
}

/// Expand a short numeric seed into a full generator seed.
#[must_use]
pub fn seed_from_u64(seed: u64) -> [u8; 32] {
    let mut bytes = [0_u8; 32];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    bytes
}

/// Parse a configuration document.
///
/// # Errors
///
/// Returns an error if the document is not valid YAML or does not describe a
/// [`Config`].
pub fn parse_config(contents: &str) -> Result<Config, Error> {
    serde_yaml::from_str(contents).map_err(Error::from)
}

/// Load configuration from a file path.
///
/// # Errors
///
/// Returns an error if:
///
/// * Path does not exist or cannot be read
/// * The file contains invalid YAML
pub fn load_config_from_path(path: &Path) -> Result<Config, Error> {
    let contents = fs::read_to_string(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use eventgen_stream::{Overflow, common::config::ConfRange};

    use super::*;

    #[test]
    fn empty_document_is_all_defaults() -> Result<(), Error> {
        let config = parse_config("{}")?;
        assert_eq!(config, Config::default());
        assert_eq!(config.output.path, PathBuf::from("data/raw_events.csv"));
        assert_eq!(config.cohort.users, 5_000);
        config.validate()
    }

    #[test]
    fn config_deserializes() -> Result<(), Error> {
        let contents = r#"
seed: [2,3,5,7,11,13,17,19,23,29,31,37,41,43,47,53,59,61,67,71,73,79,83,89,97,101,103,107,109,113,127,131]
output:
  path: "/tmp/events.jsonl"
  encoding: "json"
cohort:
  users: 250
  retention_probability: 0.5
  epoch_start: "2024-02-29"
  churned_duration_days:
    inclusive:
      min: 7
      max: 30
  sign_up_offset_days:
    constant: 0
  overflow: "clamp"
"#;
        let config = parse_config(contents)?;
        assert_eq!(
            config.seed,
            Some([
                2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73,
                79, 83, 89, 97, 101, 103, 107, 109, 113, 127, 131
            ])
        );
        assert_eq!(
            config.output,
            Output {
                path: PathBuf::from("/tmp/events.jsonl"),
                encoding: Encoding::Json,
            }
        );
        assert_eq!(config.cohort.users, 250);
        assert!((config.cohort.retention_probability - 0.5).abs() < f64::EPSILON);
        assert_eq!(
            config.cohort.churned_duration_days,
            ConfRange::Inclusive { min: 7, max: 30 }
        );
        assert_eq!(config.cohort.sign_up_offset_days, ConfRange::Constant(0));
        assert_eq!(config.cohort.overflow, Overflow::Clamp);
        assert_eq!(config.cohort.activation_window_days, 14);
        config.validate()
    }

    #[test]
    fn unknown_fields_rejected() {
        let result = parse_config("cohort:\n  user_count: 3\n");
        assert!(matches!(result, Err(Error::SerdeYaml(_))));
        let result = parse_config("telemetry: {}\n");
        assert!(matches!(result, Err(Error::SerdeYaml(_))));
    }

    #[test]
    fn invalid_cohort_fails_validation() -> Result<(), Error> {
        let config = parse_config("cohort:\n  retention_probability: 1.3\n")?;
        assert!(matches!(config.validate(), Err(Error::Cohort(_))));
        Ok(())
    }

    #[test]
    fn directory_output_path_rejected() -> Result<(), Error> {
        let config = parse_config("output:\n  path: \"/\"\n")?;
        assert!(matches!(config.validate(), Err(Error::OutputPath(_))));
        Ok(())
    }

    #[test]
    fn short_seed_expands_little_endian() {
        let seed = seed_from_u64(0x0102_0304_0506_0708);
        assert_eq!(&seed[..8], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert!(seed[8..].iter().all(|b| *b == 0));
    }

    #[test]
    fn load_single_file_works() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let config_path = temp_dir.path().join("eventgen.yaml");
        let mut file = fs::File::create(&config_path)?;
        file.write_all(b"cohort:\n  users: 12\n")?;

        let config = load_config_from_path(&config_path)?;
        assert_eq!(config.cohort.users, 12);
        Ok(())
    }

    #[test]
    fn load_missing_file_reports_path() {
        let result = load_config_from_path(Path::new("/nonexistent/eventgen.yaml"));
        match result {
            Err(Error::ReadFile { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/eventgen.yaml"));
            }
            other => panic!("expected ReadFile error, got {other:?}"),
        }
    }
}
