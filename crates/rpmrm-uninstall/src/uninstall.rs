use rpmrm_core::{FileEntry, FileState, RecordOffset, ScriptPhase};
use rpmrm_db::PackageDatabase;
use rpmrm_digest::{FileDigester, Md5Digester};
use tracing::{debug, error, info, info_span, warn};

use crate::error::{UninstallError, UninstallIssue};
use crate::fs_utils::{backup_file, remove_dir_if_empty, rpmsave_path, unlink_file};
use crate::layout::RootLayout;
use crate::plan::{plan_file_actions, FilePlan};
use crate::script::{ScriptInvocation, ScriptOutcome, ScriptRunner};
use crate::types::{
    AppliedAction, FileAction, FileOp, PlannedAction, UninstallFlags, UninstallReport,
};

pub fn uninstall_package<D>(
    layout: &RootLayout,
    db: &mut D,
    offset: RecordOffset,
    flags: UninstallFlags,
) -> Result<UninstallReport, UninstallError>
where
    D: PackageDatabase + ?Sized,
{
    uninstall_package_with_digester(layout, db, offset, flags, &Md5Digester)
}

pub fn uninstall_package_with_digester<D>(
    layout: &RootLayout,
    db: &mut D,
    offset: RecordOffset,
    flags: UninstallFlags,
    digester: &dyn FileDigester,
) -> Result<UninstallReport, UninstallError>
where
    D: PackageDatabase + ?Sized,
{
    let runner = ScriptRunner::new().with_debug(flags.debug);
    uninstall_package_with_runner(layout, db, offset, flags, digester, &runner)
}

pub fn uninstall_package_with_runner<D>(
    layout: &RootLayout,
    db: &mut D,
    offset: RecordOffset,
    flags: UninstallFlags,
    digester: &dyn FileDigester,
    runner: &ScriptRunner,
) -> Result<UninstallReport, UninstallError>
where
    D: PackageDatabase + ?Sized,
{
    let record = db
        .get_record(offset)
        .map_err(|source| UninstallError::DatabaseCorruption { offset, source })?;
    let nevr = record.nevr();
    let _span = info_span!("uninstall", %offset, package = nevr.as_str()).entered();

    // Scripts learn how many instances remain once this one is gone.
    let instances = db
        .find_records_by_name(&record.name)
        .map_err(|source| UninstallError::NameLookup {
            name: record.name.clone(),
            source,
        })?;
    let script_arg = instances.len().saturating_sub(1);

    let rmmess = if flags.test_only { "would remove" } else { "removing" };
    let skip_scripts = flags.no_scripts || flags.test_only;
    let script = |phase| ScriptInvocation {
        phase,
        body: record.scripts.body(phase),
        arg: script_arg,
        install_prefix: record.install_prefix.as_deref(),
    };

    debug!("running preuninstall script (if any)");
    let pre = match runner.run(layout, &script(ScriptPhase::PreUninstall), skip_scripts) {
        Ok(pre) => pre,
        Err(source) => {
            error!("{source}; leaving {nevr} installed");
            return Err(UninstallError::PreScript { offset, source });
        }
    };
    log_script_outcome(ScriptPhase::PreUninstall, pre, flags);

    let mut report = UninstallReport {
        offset,
        nevr,
        script_arg,
        actions: Vec::new(),
        applied: Vec::new(),
        issues: Vec::new(),
        record_deleted: false,
    };

    debug!("{rmmess} files test = {}", flags.test_only);
    if let Some(files) = record.files.as_deref() {
        let FilePlan { actions, issues } =
            plan_file_actions(layout, &*db, offset, &record, digester)?;
        for issue in &issues {
            warn!("{issue}");
        }
        report.issues.extend(issues);

        report.actions = files
            .iter()
            .zip(&actions)
            .enumerate()
            .map(|(index, (file, action))| PlannedAction {
                index,
                path: file.path.clone(),
                action: *action,
            })
            .collect();

        // Stored listings put directories before their contents, so walking
        // backwards empties a directory before it is removed.
        for (file, action) in files.iter().zip(&actions).rev() {
            let (applied, outcome) =
                apply_file_action(layout, file, *action, flags.test_only, rmmess);
            if let Err(issue) = outcome {
                warn!("{issue}");
                report.issues.push(issue);
            }
            report.applied.push(applied);
        }
    }

    debug!("running postuninstall script (if any)");
    match runner.run(layout, &script(ScriptPhase::PostUninstall), skip_scripts) {
        Ok(post) => log_script_outcome(ScriptPhase::PostUninstall, post, flags),
        Err(source) => {
            let issue = UninstallIssue::PostScript { offset, source };
            warn!("{issue}");
            report.issues.push(issue);
        }
    }

    debug!("{rmmess} database entry");
    if !flags.test_only {
        if let Err(source) = db.delete_record(offset) {
            error!("{source}");
            return Err(UninstallError::Commit { offset, source });
        }
        report.record_deleted = true;
    }

    info!(
        "erased {} ({} file action(s), {} issue(s))",
        report.nevr,
        report.applied.len(),
        report.issues.len()
    );
    Ok(report)
}

fn apply_file_action(
    layout: &RootLayout,
    file: &FileEntry,
    action: FileAction,
    test_only: bool,
    rmmess: &str,
) -> (AppliedAction, Result<(), UninstallIssue>) {
    let path = layout.resolve(&file.path);
    let applied = |op| AppliedAction {
        path: path.clone(),
        action,
        op,
    };

    match file.state {
        FileState::Normal => {}
        FileState::Replaced => {
            debug!("{} has already been replaced", path.display());
            return (applied(FileOp::SkippedReplaced), Ok(()));
        }
        FileState::NotInstalled | FileState::NetShared => {
            return (applied(FileOp::Kept), Ok(()));
        }
    }

    let outcome = match action {
        FileAction::Keep => {
            debug!("keeping {}", path.display());
            Ok(FileOp::Kept)
        }
        FileAction::Backup => {
            let saved = rpmsave_path(&path);
            debug!("saving {} as {}", path.display(), saved.display());
            if test_only {
                Ok(FileOp::Renamed { to: saved })
            } else {
                backup_file(&path)
            }
        }
        FileAction::Remove => {
            debug!("{} - {rmmess}", path.display());
            match (file.is_dir(), test_only) {
                (true, true) => Ok(FileOp::RemovedDir),
                (false, true) => Ok(FileOp::Unlinked),
                (true, false) => remove_dir_if_empty(&path),
                (false, false) => unlink_file(&path),
            }
        }
    };

    match outcome {
        Ok(op) => (applied(op), Ok(())),
        Err(issue) => (applied(FileOp::Failed), Err(issue)),
    }
}

fn log_script_outcome(phase: ScriptPhase, outcome: ScriptOutcome, flags: UninstallFlags) {
    match outcome {
        ScriptOutcome::Skipped if flags.test_only => debug!("would run {phase} script"),
        ScriptOutcome::Skipped => debug!("{phase} script skipped"),
        ScriptOutcome::NoScript => {}
        ScriptOutcome::Succeeded => info!("{phase} script completed"),
    }
}
