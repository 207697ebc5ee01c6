use std::collections::BTreeMap;

use rpmrm_core::{PackageRecord, RecordOffset};

use crate::{path_matches, DbError, PackageDatabase, PathMatch};

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    records: BTreeMap<RecordOffset, PackageRecord>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, offset: RecordOffset, record: PackageRecord) {
        self.records.insert(offset, record);
    }

    pub fn contains(&self, offset: RecordOffset) -> bool {
        self.records.contains_key(&offset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PackageDatabase for MemoryDatabase {
    fn get_record(&self, offset: RecordOffset) -> Result<PackageRecord, DbError> {
        self.records
            .get(&offset)
            .cloned()
            .ok_or(DbError::NotFound { offset })
    }

    fn delete_record(&mut self, offset: RecordOffset) -> Result<(), DbError> {
        self.records
            .remove(&offset)
            .map(|_| ())
            .ok_or(DbError::NotFound { offset })
    }

    fn find_records_by_path(&self, path: &str) -> Result<Vec<PathMatch>, DbError> {
        Ok(self
            .records
            .iter()
            .flat_map(|(offset, record)| path_matches(*offset, record, path))
            .collect())
    }

    fn find_records_by_name(&self, name: &str) -> Result<Vec<RecordOffset>, DbError> {
        Ok(self
            .records
            .iter()
            .filter(|(_, record)| record.name == name)
            .map(|(offset, _)| *offset)
            .collect())
    }
}
