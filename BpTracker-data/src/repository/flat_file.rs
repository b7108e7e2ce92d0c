use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::blood_pressure::BloodPressureReading;
use super::errors::RepositoryError;
use super::line_format::{format_line, parse_bytes, LoadedReadings};

/// Kind of access wanted on the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

/// Check whether the data file can be used in the given mode.
///
/// Read needs an existing, openable regular file. Write needs either a
/// writable existing file, or no file at all inside a writable directory.
pub fn check_file(path: &Path, mode: AccessMode) -> bool {
    match mode {
        AccessMode::Read => path.is_file() && File::open(path).is_ok(),
        AccessMode::Write => match fs::metadata(path) {
            Ok(meta) => meta.is_file() && !meta.permissions().readonly(),
            Err(_) => {
                let dir = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent,
                    _ => Path::new("."),
                };
                fs::metadata(dir)
                    .map(|meta| meta.is_dir() && !meta.permissions().readonly())
                    .unwrap_or(false)
            }
        },
    }
}

/// Whether a non-empty file lacks a final newline
fn ends_unterminated(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Flat-file storage operations for blood pressure readings
#[derive(Debug, Clone)]
pub struct FlatFileStorage {
    path: PathBuf,
}

impl FlatFileStorage {
    /// Create a storage over the given data file
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the data file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every reading from the file, in file order
    pub fn load(&self) -> Result<LoadedReadings, RepositoryError> {
        if !check_file(&self.path, AccessMode::Read) {
            return Err(RepositoryError::FileNotFound(self.path.clone()));
        }

        debug!("Loading blood pressure readings from {}", self.path.display());
        let content = fs::read(&self.path).map_err(|e| RepositoryError::io(&self.path, e))?;
        let loaded = parse_bytes(&content);

        debug!(
            "Loaded {} readings ({} invalid lines) from {}",
            loaded.readings.len(),
            loaded.invalid.len(),
            self.path.display()
        );
        Ok(loaded)
    }

    /// Append one reading to the end of the file, creating it if needed
    pub fn append(&self, reading: &BloodPressureReading) -> Result<(), RepositoryError> {
        if !check_file(&self.path, AccessMode::Write) {
            return Err(RepositoryError::FileUnwritable(self.path.clone()));
        }

        debug!("Appending blood pressure reading to {}", self.path.display());
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RepositoryError::io(&self.path, e))?;

        let mut line = format_line(reading);
        if ends_unterminated(&mut file).map_err(|e| RepositoryError::io(&self.path, e))? {
            line.insert(0, '\n');
        }

        file.write_all(line.as_bytes())
            .map_err(|e| RepositoryError::io(&self.path, e))?;

        Ok(())
    }
}

/// Load the readings of a data file
pub fn load_readings<P: AsRef<Path>>(path: P) -> Result<LoadedReadings, RepositoryError> {
    FlatFileStorage::new(path).load()
}

/// Append one formatted reading line to a data file
pub fn append_reading<P: AsRef<Path>>(
    path: P,
    systolic: u16,
    diastolic: u16,
    pulse: u16,
    timestamp: &str,
) -> Result<BloodPressureReading, RepositoryError> {
    let reading = BloodPressureReading {
        systolic,
        diastolic,
        pulse,
        timestamp: timestamp.to_string(),
    };
    FlatFileStorage::new(path).append(&reading)?;
    Ok(reading)
}
