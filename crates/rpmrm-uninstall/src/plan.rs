use rpmrm_core::{FileEntry, FileState, PackageRecord, RecordOffset};
use rpmrm_db::{DbError, PackageDatabase};
use rpmrm_digest::{DigestVariant, FileDigester};
use tracing::debug;

use crate::error::{UninstallError, UninstallIssue};
use crate::layout::RootLayout;
use crate::shared::{find_shared_files, group_by_other_record, SharedFileMatch};
use crate::types::FileAction;

#[derive(Debug)]
pub struct FilePlan {
    pub actions: Vec<FileAction>,
    pub issues: Vec<UninstallIssue>,
}

pub fn initial_actions(files: &[FileEntry]) -> Vec<FileAction> {
    files
        .iter()
        .map(|file| {
            if file.state.is_untouchable() {
                FileAction::Keep
            } else {
                FileAction::Remove
            }
        })
        .collect()
}

pub fn apply_shared_overrides<F>(
    matches: &[SharedFileMatch],
    self_files: &[FileEntry],
    actions: &mut [FileAction],
    mut fetch_other: F,
) -> Vec<UninstallIssue>
where
    F: FnMut(RecordOffset) -> Result<PackageRecord, DbError>,
{
    let mut issues = Vec::new();
    for group in group_by_other_record(matches) {
        let offset = group[0].other_offset;
        let other = match fetch_other(offset) {
            Ok(other) => other,
            Err(source) => {
                // Ownership is unknown, so nothing in this group is touched.
                for found in group {
                    actions[found.main_file_index] = FileAction::Keep;
                }
                issues.push(UninstallIssue::SharedRecordUnreadable { offset, source });
                continue;
            }
        };
        debug!("package {} contain shared files", other.nevr());

        for found in group {
            let main = &self_files[found.main_file_index];
            debug!("file {} is shared", main.path);

            let Some(other_file) = other.files().get(found.other_file_index) else {
                actions[found.main_file_index] = FileAction::Keep;
                issues.push(UninstallIssue::SharedRecordMissingFile {
                    offset,
                    file_index: found.other_file_index,
                });
                continue;
            };

            match other_file.state {
                FileState::Replaced => debug!("     file has already been replaced"),
                FileState::NotInstalled => debug!("     file was never installed"),
                FileState::NetShared => {
                    debug!("     file is netshared (so don't touch it)");
                    actions[found.main_file_index] = FileAction::Keep;
                }
                FileState::Normal => {
                    if main.md5.is_some() && main.md5 == other_file.md5 {
                        debug!("    file is truly shared - saving");
                    }
                    actions[found.main_file_index] = FileAction::Keep;
                }
            }
        }
    }
    issues
}

pub fn refine_config_actions(
    layout: &RootLayout,
    files: &[FileEntry],
    actions: &mut [FileAction],
    variant: DigestVariant,
    digester: &dyn FileDigester,
) {
    for (file, action) in files.iter().zip(actions.iter_mut()) {
        if file.state != FileState::Normal || !file.is_config() || *action != FileAction::Remove {
            continue;
        }

        let path = layout.resolve(&file.path);
        debug!("finding md5sum of {}", path.display());
        match digester.digest(&path, variant) {
            Err(err) => {
                debug!("    failed ({err}) - assuming file removed");
            }
            Ok(current) if file.md5.as_deref() != Some(current.as_str()) => {
                debug!("    file changed - will save");
                *action = FileAction::Backup;
            }
            Ok(_) => debug!("    file unchanged - will remove"),
        }
    }
}

pub fn plan_file_actions<D>(
    layout: &RootLayout,
    db: &D,
    offset: RecordOffset,
    record: &PackageRecord,
    digester: &dyn FileDigester,
) -> Result<FilePlan, UninstallError>
where
    D: PackageDatabase + ?Sized,
{
    let files = record.files();
    let mut actions = initial_actions(files);

    let shared = find_shared_files(db, offset, files.iter().map(|file| file.path.as_str()))?;
    let issues = apply_shared_overrides(&shared, files, &mut actions, |other| {
        db.get_record(other)
    });

    let variant = if record.has_fixed_digests() {
        DigestVariant::Standard
    } else {
        DigestVariant::BrokenOnEmpty
    };
    refine_config_actions(layout, files, &mut actions, variant, digester);

    Ok(FilePlan { actions, issues })
}
