//! Report publishing.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

use crate::config::Output;
use crate::report::Report;

/// Publish error types.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Serialize `report` and write it to `output`.
pub fn publish(report: &Report, output: &Output) -> Result<(), PublishError> {
    let json = serde_json::to_string(report)?;
    tracing::info!("{}", json);

    match output {
        Output::Stdout => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
            stdout.flush()?;
        }
        Output::File(path) => {
            write_atomic(path, json.as_bytes())?;
            tracing::info!("Successfully written report to {}", path.display());
        }
    }

    Ok(())
}

/// Write to a sibling temporary file, then rename it over `path`.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name")
    })?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
