//! Encoding and persisting an [`EventLog`].

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, event_log::EventLog};

/// Encoding of the output artifact
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Comma delimited text with a `user_id,timestamp,event_name` header
    #[default]
    Csv,
    /// One JSON object per line with the same three keys
    Json,
}

impl Encoding {
    /// Write every record of `log` into `writer`.
    ///
    /// # Errors
    ///
    /// Function will error if the underlying writer fails or a record cannot
    /// be encoded.
    pub fn to_bytes<W>(self, log: &EventLog, writer: &mut W) -> Result<(), Error>
    where
        W: Write,
    {
        match self {
            Encoding::Csv => {
                let mut wtr = csv::Writer::from_writer(writer);
                for record in log.records() {
                    wtr.serialize(record)?;
                }
                wtr.flush()?;
            }
            Encoding::Json => {
                for record in log.records() {
                    serde_json::to_writer(&mut *writer, record)?;
                    writer.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }
}

/// Write `log` to `path`, replacing any existing file. The parent directory
/// must already exist.
///
/// # Errors
///
/// Function will error if the file cannot be created or written.
pub fn persist(log: &EventLog, path: &Path, encoding: Encoding) -> Result<(), Error> {
    let file = File::create(path).map_err(|source| Error::Create {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;
    let mut writer = BufWriter::new(file);
    encoding.to_bytes(log, &mut writer)?;
    writer.flush()?;
    debug!(
        path = %path.display(),
        records = log.records().len(),
        ?encoding,
        "event log persisted"
    );
    Ok(())
}
