use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::file::{FileEntry, FileFlags, FileMode, FileState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordOffset(u32);

impl RecordOffset {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RecordOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordOffset {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPhase {
    PreUninstall,
    PostUninstall,
}

impl ScriptPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreUninstall => "%preun",
            Self::PostUninstall => "%postun",
        }
    }
}

impl fmt::Display for ScriptPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scripts {
    pub preun: Option<String>,
    pub postun: Option<String>,
}

impl Scripts {
    pub fn body(&self, phase: ScriptPhase) -> Option<&str> {
        match phase {
            ScriptPhase::PreUninstall => self.preun.as_deref(),
            ScriptPhase::PostUninstall => self.postun.as_deref(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to parse package record")]
    Parse(#[from] toml::de::Error),

    #[error("failed to encode package record")]
    Encode(#[from] toml::ser::Error),

    #[error("package record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("file array '{field}' has {found} entries, expected {expected}")]
    MisalignedFileArrays {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid state '{value}' for file #{index}")]
    InvalidFileState { index: usize, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub release: String,
    /// `None` when the record carries no file list at all.
    pub files: Option<Vec<FileEntry>>,
    pub scripts: Scripts,
    pub install_prefix: Option<String>,
    /// Version of the tool that wrote the record. Records without it predate
    /// the md5 fix and were digested with the broken empty-file variant.
    pub rpm_version: Option<String>,
}

impl PackageRecord {
    pub fn nevr(&self) -> String {
        format!("{}-{}-{}", self.name, self.version, self.release)
    }

    pub fn files(&self) -> &[FileEntry] {
        self.files.as_deref().unwrap_or(&[])
    }

    pub fn has_fixed_digests(&self) -> bool {
        self.rpm_version.is_some()
    }

    pub fn from_toml_str(input: &str) -> Result<Self, RecordError> {
        let stored: StoredRecord = toml::from_str(input)?;
        Self::from_stored(stored)
    }

    pub fn to_toml_string(&self) -> Result<String, RecordError> {
        Ok(toml::to_string(&self.to_stored())?)
    }

    pub fn from_stored(stored: StoredRecord) -> Result<Self, RecordError> {
        if stored.name.trim().is_empty() {
            return Err(RecordError::MissingField("name"));
        }

        let files = stored.files.map(decode_files).transpose()?;
        Ok(Self {
            name: stored.name,
            version: stored.version,
            release: stored.release,
            files,
            scripts: Scripts {
                preun: stored.preun,
                postun: stored.postun,
            },
            install_prefix: stored.install_prefix,
            rpm_version: stored.rpm_version,
        })
    }

    pub fn to_stored(&self) -> StoredRecord {
        StoredRecord {
            name: self.name.clone(),
            version: self.version.clone(),
            release: self.release.clone(),
            rpm_version: self.rpm_version.clone(),
            install_prefix: self.install_prefix.clone(),
            preun: self.scripts.preun.clone(),
            postun: self.scripts.postun.clone(),
            files: self.files.as_deref().map(encode_files),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub name: String,
    pub version: String,
    pub release: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preun: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postun: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<StoredFiles>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFiles {
    pub paths: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub flags: Vec<u32>,
    #[serde(default)]
    pub modes: Vec<u32>,
    #[serde(default)]
    pub md5s: Vec<String>,
}

fn decode_files(stored: StoredFiles) -> Result<Vec<FileEntry>, RecordError> {
    let expected = stored.paths.len();
    for (field, found) in [
        ("states", stored.states.len()),
        ("flags", stored.flags.len()),
        ("modes", stored.modes.len()),
        ("md5s", stored.md5s.len()),
    ] {
        if found != expected {
            return Err(RecordError::MisalignedFileArrays {
                field,
                expected,
                found,
            });
        }
    }

    stored
        .paths
        .into_iter()
        .zip(stored.states)
        .zip(stored.flags)
        .zip(stored.modes)
        .zip(stored.md5s)
        .enumerate()
        .map(|(index, ((((path, state), flags), mode), md5))| {
            let state = FileState::parse(&state)
                .ok_or(RecordError::InvalidFileState { index, value: state })?;
            Ok(FileEntry {
                path,
                state,
                flags: FileFlags::from_bits(flags),
                mode: FileMode::from_bits(mode),
                md5: Some(md5).filter(|value| !value.is_empty()),
            })
        })
        .collect()
}

fn encode_files(files: &[FileEntry]) -> StoredFiles {
    let mut stored = StoredFiles::default();
    for file in files {
        stored.paths.push(file.path.clone());
        stored.states.push(file.state.as_str().to_string());
        stored.flags.push(file.flags.bits());
        stored.modes.push(file.mode.bits());
        stored.md5s.push(file.md5.clone().unwrap_or_default());
    }
    stored
}
