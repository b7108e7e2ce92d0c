use std::path::PathBuf;
use std::sync::PoisonError;
use thiserror::Error;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Data file missing or unreadable
    #[error("Unable to find {}", .0.display())]
    FileNotFound(PathBuf),

    /// Data file cannot be written or created
    #[error("Unable to write to {}", .0.display())]
    FileUnwritable(PathBuf),

    /// I/O failure while reading or appending
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),
}

impl RepositoryError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RepositoryError::Io {
            path: path.into(),
            source,
        }
    }
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_file() {
        let err = RepositoryError::FileNotFound(PathBuf::from("bp_numbers.txt"));
        assert_eq!(err.to_string(), "Unable to find bp_numbers.txt");

        let err = RepositoryError::FileUnwritable(PathBuf::from("/ro/bp_numbers.txt"));
        assert_eq!(err.to_string(), "Unable to write to /ro/bp_numbers.txt");
    }

    #[test]
    fn test_poison_error_maps_to_lock() {
        let mutex = std::sync::Mutex::new(0);
        let _ = std::panic::catch_unwind(|| {
            let _guard = mutex.lock().unwrap();
            panic!("poison");
        });
        let err: RepositoryError = mutex.lock().unwrap_err().into();
        assert!(matches!(err, RepositoryError::Lock(_)));
    }
}
