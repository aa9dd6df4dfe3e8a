//! Storage error types.

use thiserror::Error;

/// Errors raised by the storage core.
///
/// Only [`Error::TableFull`] is recoverable; a session can keep going
/// after it. Everything else means the store can no longer guarantee
/// what is on disk and the caller is expected to stop.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Table full.")]
    TableFull,

    #[error("{field} is {len} bytes, max is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Tried to fetch page number out of bounds. {page_num} >= {max}")]
    PageOutOfBounds { page_num: usize, max: usize },

    #[error("Tried to flush page {0} which was never loaded")]
    FlushUncachedPage(usize),

    #[error("Tried to flush {len} bytes from a {max} byte page")]
    FlushTooLarge { len: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error must end the session.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::TableFull)
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_full_is_the_only_recoverable_error() {
        assert!(!Error::TableFull.is_fatal());
        assert!(Error::FlushUncachedPage(3).is_fatal());
        assert!(
            Error::PageOutOfBounds {
                page_num: 100,
                max: 100
            }
            .is_fatal()
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert!(Error::from(io).is_fatal());
    }

    #[test]
    fn messages() {
        assert_eq!(Error::TableFull.to_string(), "Table full.");
        assert_eq!(
            Error::PageOutOfBounds {
                page_num: 101,
                max: 100
            }
            .to_string(),
            "Tried to fetch page number out of bounds. 101 >= 100"
        );
    }
}
