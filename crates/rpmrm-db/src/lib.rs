use std::path::PathBuf;

use rpmrm_core::{PackageRecord, RecordError, RecordOffset};
use thiserror::Error;

mod directory;
mod memory;

pub use directory::DirectoryDatabase;
pub use memory::MemoryDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("no package record at offset {offset}")]
    NotFound { offset: RecordOffset },

    #[error("package record at offset {offset} is corrupt")]
    Corrupt {
        offset: RecordOffset,
        #[source]
        source: RecordError,
    },

    #[error("failed to encode package record at offset {offset}")]
    Encode {
        offset: RecordOffset,
        #[source]
        source: RecordError,
    },

    #[error("database io failed at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathMatch {
    pub offset: RecordOffset,
    pub file_index: usize,
}

pub trait PackageDatabase {
    fn get_record(&self, offset: RecordOffset) -> Result<PackageRecord, DbError>;

    fn delete_record(&mut self, offset: RecordOffset) -> Result<(), DbError>;

    fn find_records_by_path(&self, path: &str) -> Result<Vec<PathMatch>, DbError>;

    fn find_records_by_name(&self, name: &str) -> Result<Vec<RecordOffset>, DbError>;
}

pub(crate) fn path_matches<'a>(
    offset: RecordOffset,
    record: &'a PackageRecord,
    path: &str,
) -> impl Iterator<Item = PathMatch> + 'a {
    let path = path.to_string();
    record
        .files()
        .iter()
        .enumerate()
        .filter(move |(_, file)| file.path == path)
        .map(move |(file_index, _)| PathMatch { offset, file_index })
}
