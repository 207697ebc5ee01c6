mod file;
mod record;

pub use file::{FileEntry, FileFlags, FileMode, FileState};
pub use record::{
    PackageRecord, RecordError, RecordOffset, ScriptPhase, Scripts, StoredFiles, StoredRecord,
};

#[cfg(test)]
mod tests;
