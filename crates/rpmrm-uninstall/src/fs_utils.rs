use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::UninstallIssue;
use crate::types::FileOp;

pub const RPMSAVE_SUFFIX: &str = ".rpmsave";

pub fn rpmsave_path(path: &Path) -> PathBuf {
    let mut saved = OsString::from(path.as_os_str());
    saved.push(RPMSAVE_SUFFIX);
    PathBuf::from(saved)
}

pub(crate) fn backup_file(path: &Path) -> Result<FileOp, UninstallIssue> {
    let saved = rpmsave_path(path);
    match fs::rename(path, &saved) {
        Ok(()) => Ok(FileOp::Renamed { to: saved }),
        Err(source) => Err(UninstallIssue::Rename {
            from: path.to_path_buf(),
            to: saved,
            source,
        }),
    }
}

pub(crate) fn remove_dir_if_empty(path: &Path) -> Result<FileOp, UninstallIssue> {
    match fs::remove_dir(path) {
        Ok(()) => Ok(FileOp::RemovedDir),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(FileOp::AlreadyGone),
        Err(err) if err.raw_os_error() == Some(libc::ENOTEMPTY) => {
            Err(UninstallIssue::RmdirNotEmpty {
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(UninstallIssue::Rmdir {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn unlink_file(path: &Path) -> Result<FileOp, UninstallIssue> {
    match fs::remove_file(path) {
        Ok(()) => Ok(FileOp::Unlinked),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(FileOp::AlreadyGone),
        Err(source) => Err(UninstallIssue::Unlink {
            path: path.to_path_buf(),
            source,
        }),
    }
}
