use std::io;
use std::path::PathBuf;

use rpmrm_core::RecordOffset;
use rpmrm_db::DbError;
use thiserror::Error;

use crate::script::ScriptError;

#[derive(Debug, Error)]
pub enum UninstallError {
    #[error("cannot read header at {offset} for uninstall")]
    DatabaseCorruption {
        offset: RecordOffset,
        #[source]
        source: DbError,
    },

    #[error("cannot read packages named {name} for uninstall")]
    NameLookup {
        name: String,
        #[source]
        source: DbError,
    },

    #[error("shared file lookup failed for {path}")]
    Database {
        path: String,
        #[source]
        source: DbError,
    },

    #[error("pre-uninstall script failed for record {offset}")]
    PreScript {
        offset: RecordOffset,
        #[source]
        source: ScriptError,
    },

    #[error("failed to remove database entry at {offset}")]
    Commit {
        offset: RecordOffset,
        #[source]
        source: DbError,
    },
}

#[derive(Debug, Error)]
pub enum UninstallIssue {
    #[error("rename of {} to {} failed", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("removal of {} failed", .path.display())]
    Unlink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot remove {} - directory not empty", .path.display())]
    RmdirNotEmpty { path: PathBuf },

    #[error("rmdir of {} failed", .path.display())]
    Rmdir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read header at {offset} while checking shared files")]
    SharedRecordUnreadable {
        offset: RecordOffset,
        #[source]
        source: DbError,
    },

    #[error("package at {offset} has no entry for shared file #{file_index}")]
    SharedRecordMissingFile {
        offset: RecordOffset,
        file_index: usize,
    },

    #[error("post-uninstall script failed for record {offset}")]
    PostScript {
        offset: RecordOffset,
        #[source]
        source: ScriptError,
    },
}
