use std::fmt;
use std::path::PathBuf;

use rpmrm_core::RecordOffset;

use crate::error::UninstallIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Remove,
    Backup,
    Keep,
}

impl FileAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Backup => "backup",
            Self::Keep => "keep",
        }
    }
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UninstallFlags {
    pub test_only: bool,
    pub no_scripts: bool,
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub index: usize,
    pub path: String,
    pub action: FileAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    Kept,
    SkippedReplaced,
    Renamed { to: PathBuf },
    Unlinked,
    RemovedDir,
    AlreadyGone,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAction {
    pub path: PathBuf,
    pub action: FileAction,
    pub op: FileOp,
}

#[derive(Debug)]
pub struct UninstallReport {
    pub offset: RecordOffset,
    pub nevr: String,
    pub script_arg: usize,
    pub actions: Vec<PlannedAction>,
    pub applied: Vec<AppliedAction>,
    pub issues: Vec<UninstallIssue>,
    pub record_deleted: bool,
}

impl UninstallReport {
    pub fn action_for(&self, path: &str) -> Option<FileAction> {
        self.actions
            .iter()
            .find(|planned| planned.path == path)
            .map(|planned| planned.action)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
