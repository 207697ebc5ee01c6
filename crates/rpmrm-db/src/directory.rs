use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rpmrm_core::{PackageRecord, RecordOffset};
use tracing::{debug, warn};

use crate::{DbError, PackageDatabase, PathMatch};

/// Database kept as one TOML file per record under `<root>/records`, named
/// after the record offset. Path and name lookups go through an index built
/// on first use.
#[derive(Debug, Clone)]
pub struct DirectoryDatabase {
    root: PathBuf,
    index: RefCell<Option<RecordIndex>>,
}

#[derive(Debug, Clone, Default)]
struct RecordIndex {
    by_path: HashMap<String, Vec<PathMatch>>,
    by_name: HashMap<String, Vec<RecordOffset>>,
}

impl RecordIndex {
    fn add(&mut self, offset: RecordOffset, record: &PackageRecord) {
        for (file_index, file) in record.files().iter().enumerate() {
            self.by_path
                .entry(file.path.clone())
                .or_default()
                .push(PathMatch { offset, file_index });
        }
        self.by_name
            .entry(record.name.clone())
            .or_default()
            .push(offset);
    }

    fn remove(&mut self, offset: RecordOffset) {
        self.by_path
            .values_mut()
            .for_each(|matches| matches.retain(|found| found.offset != offset));
        self.by_path.retain(|_, matches| !matches.is_empty());
        self.by_name
            .values_mut()
            .for_each(|offsets| offsets.retain(|found| *found != offset));
        self.by_name.retain(|_, offsets| !offsets.is_empty());
    }
}

impl DirectoryDatabase {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: RefCell::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn records_dir(&self) -> PathBuf {
        self.root.join("records")
    }

    pub fn record_path(&self, offset: RecordOffset) -> PathBuf {
        self.records_dir().join(format!("{offset}.toml"))
    }

    pub fn put_record(
        &self,
        offset: RecordOffset,
        record: &PackageRecord,
    ) -> Result<PathBuf, DbError> {
        let dir = self.records_dir();
        fs::create_dir_all(&dir).map_err(|source| DbError::Io {
            path: dir.clone(),
            source,
        })?;

        let payload = record
            .to_toml_string()
            .map_err(|source| DbError::Encode { offset, source })?;
        let path = self.record_path(offset);
        fs::write(&path, payload.as_bytes()).map_err(|source| DbError::Io {
            path: path.clone(),
            source,
        })?;
        self.index.replace(None);
        Ok(path)
    }

    pub fn offsets(&self) -> Result<Vec<RecordOffset>, DbError> {
        let dir = self.records_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let io_error = |source: io::Error| DbError::Io {
            path: dir.clone(),
            source,
        };
        let mut offsets = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            if !entry.file_type().map_err(io_error)?.is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|v| v.to_str()) != Some("toml") {
                continue;
            }
            let Some(offset) = path
                .file_stem()
                .and_then(|v| v.to_str())
                .and_then(|stem| stem.parse::<RecordOffset>().ok())
            else {
                debug!("skipping unrecognised database entry {}", path.display());
                continue;
            };
            offsets.push(offset);
        }

        offsets.sort();
        Ok(offsets)
    }

    // Unparseable records are left out of the index; only `get_record` on
    // their offset reports the corruption.
    fn build_index(&self) -> Result<RecordIndex, DbError> {
        let mut index = RecordIndex::default();
        for offset in self.offsets()? {
            match self.get_record(offset) {
                Ok(record) => index.add(offset, &record),
                Err(err @ (DbError::Corrupt { .. } | DbError::NotFound { .. })) => {
                    warn!("skipping record {offset} while indexing: {err}");
                }
                Err(err) => return Err(err),
            }
        }
        debug!(
            "indexed {} path(s) and {} name(s) under {}",
            index.by_path.len(),
            index.by_name.len(),
            self.records_dir().display()
        );
        Ok(index)
    }

    fn with_index<T>(&self, lookup: impl FnOnce(&RecordIndex) -> T) -> Result<T, DbError> {
        if let Some(index) = self.index.borrow().as_ref() {
            return Ok(lookup(index));
        }
        let index = self.build_index()?;
        let found = lookup(&index);
        self.index.replace(Some(index));
        Ok(found)
    }
}

impl PackageDatabase for DirectoryDatabase {
    fn get_record(&self, offset: RecordOffset) -> Result<PackageRecord, DbError> {
        let path = self.record_path(offset);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(DbError::NotFound { offset });
            }
            Err(source) => return Err(DbError::Io { path, source }),
        };
        PackageRecord::from_toml_str(&raw).map_err(|source| DbError::Corrupt { offset, source })
    }

    fn delete_record(&mut self, offset: RecordOffset) -> Result<(), DbError> {
        let path = self.record_path(offset);
        match fs::remove_file(&path) {
            Ok(()) => {
                if let Some(index) = self.index.get_mut().as_mut() {
                    index.remove(offset);
                }
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(DbError::NotFound { offset }),
            Err(source) => Err(DbError::Io { path, source }),
        }
    }

    fn find_records_by_path(&self, path: &str) -> Result<Vec<PathMatch>, DbError> {
        self.with_index(|index| index.by_path.get(path).cloned().unwrap_or_default())
    }

    fn find_records_by_name(&self, name: &str) -> Result<Vec<RecordOffset>, DbError> {
        self.with_index(|index| index.by_name.get(name).cloned().unwrap_or_default())
    }
}
