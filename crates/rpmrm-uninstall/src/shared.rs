use rpmrm_core::RecordOffset;
use rpmrm_db::PackageDatabase;
use tracing::debug;

use crate::error::UninstallError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedFileMatch {
    pub main_file_index: usize,
    pub other_offset: RecordOffset,
    pub other_file_index: usize,
}

pub fn find_shared_files<'a, D, I>(
    db: &D,
    self_offset: RecordOffset,
    paths: I,
) -> Result<Vec<SharedFileMatch>, UninstallError>
where
    D: PackageDatabase + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut shared = Vec::new();
    for (main_file_index, path) in paths.into_iter().enumerate() {
        let matches = db
            .find_records_by_path(path)
            .map_err(|source| UninstallError::Database {
                path: path.to_string(),
                source,
            })?;
        shared.extend(
            matches
                .into_iter()
                .filter(|found| found.offset != self_offset)
                .map(|found| SharedFileMatch {
                    main_file_index,
                    other_offset: found.offset,
                    other_file_index: found.file_index,
                }),
        );
    }

    // Stable, so matches against one record keep their listing order.
    shared.sort_by_key(|found| found.other_offset);
    if !shared.is_empty() {
        debug!("{} shared file match(es) found", shared.len());
    }
    Ok(shared)
}

pub(crate) fn group_by_other_record(
    matches: &[SharedFileMatch],
) -> impl Iterator<Item = &[SharedFileMatch]> {
    let mut rest = matches;
    std::iter::from_fn(move || {
        let first = rest.first()?;
        let len = rest
            .iter()
            .take_while(|found| found.other_offset == first.other_offset)
            .count();
        let (group, tail) = rest.split_at(len);
        rest = tail;
        Some(group)
    })
}
