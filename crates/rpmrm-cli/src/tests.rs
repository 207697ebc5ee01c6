use super::*;
use crate::dispatch::{format_erase_report, list_records, resolve_erase_targets};
use crate::render::{
    describe_applied, render_section_header, render_status_line, resolve_output_style,
    OutputStyle,
};
use clap::error::ErrorKind;
use rpmrm_core::{FileEntry, FileFlags, FileMode, FileState, PackageRecord, RecordOffset, Scripts};
use rpmrm_db::{DirectoryDatabase, MemoryDatabase};
use rpmrm_uninstall::{
    AppliedAction, FileAction, FileOp, UninstallFlags, UninstallIssue, UninstallReport,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_root() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "rpmrm-cli-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        TEST_ROOT_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&path).expect("must create test root");
    path
}

fn record(name: &str, files: &[&str]) -> PackageRecord {
    PackageRecord {
        name: name.to_string(),
        version: "2.0".to_string(),
        release: "3".to_string(),
        files: Some(
            files
                .iter()
                .map(|path| FileEntry {
                    path: path.to_string(),
                    state: FileState::Normal,
                    flags: FileFlags::default(),
                    mode: FileMode::regular(0o644),
                    md5: None,
                })
                .collect(),
        ),
        scripts: Scripts::default(),
        install_prefix: None,
        rpm_version: Some("2.5".to_string()),
    }
}

fn sample_report(issues: Vec<UninstallIssue>) -> UninstallReport {
    UninstallReport {
        offset: RecordOffset::new(10),
        nevr: "p-2.0-3".to_string(),
        script_arg: 0,
        actions: Vec::new(),
        applied: vec![
            AppliedAction {
                path: PathBuf::from("/etc/p.conf"),
                action: FileAction::Backup,
                op: FileOp::Renamed {
                    to: PathBuf::from("/etc/p.conf.rpmsave"),
                },
            },
            AppliedAction {
                path: PathBuf::from("/usr/share/doc"),
                action: FileAction::Remove,
                op: FileOp::RemovedDir,
            },
        ],
        issues,
        record_deleted: true,
    }
}

#[test]
fn cli_parses_erase_by_name_with_flags() {
    let cli = Cli::try_parse_from(["rpmrm", "erase", "p", "--test", "--noscripts", "-vv"])
        .expect("must parse");
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.root, PathBuf::from("/"));
    assert!(cli.dbpath.is_none());
    match cli.command {
        Commands::Erase {
            name,
            offset,
            test,
            noscripts,
            all_matches,
        } => {
            assert_eq!(name.as_deref(), Some("p"));
            assert_eq!(offset, None);
            assert!(test);
            assert!(noscripts);
            assert!(!all_matches);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn cli_accepts_root_and_dbpath() {
    let cli = Cli::try_parse_from([
        "rpmrm",
        "--root",
        "/mnt/sysimage",
        "--dbpath",
        "/srv/db",
        "erase",
        "--offset",
        "17",
    ])
    .expect("must parse");
    assert_eq!(cli.root, PathBuf::from("/mnt/sysimage"));
    assert_eq!(cli.dbpath, Some(PathBuf::from("/srv/db")));
    assert!(matches!(
        cli.command,
        Commands::Erase {
            name: None,
            offset: Some(17),
            ..
        }
    ));
}

#[test]
fn cli_erase_requires_name_or_offset() {
    let err = Cli::try_parse_from(["rpmrm", "erase"]).expect_err("must reject bare erase");
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn cli_erase_rejects_name_with_offset() {
    let err = Cli::try_parse_from(["rpmrm", "erase", "p", "--offset", "3"])
        .expect_err("must reject conflicting selectors");
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn default_log_level_follows_verbosity() {
    assert_eq!(default_log_level(0, false), "warn");
    assert_eq!(default_log_level(1, false), "info");
    assert_eq!(default_log_level(2, false), "debug");
    assert_eq!(default_log_level(0, true), "debug");
}

#[test]
fn resolve_output_style_requires_tty_without_no_color() {
    assert_eq!(resolve_output_style(true, false), OutputStyle::Rich);
    assert_eq!(resolve_output_style(true, true), OutputStyle::Plain);
    assert_eq!(resolve_output_style(false, false), OutputStyle::Plain);
}

#[test]
fn render_status_line_plain_is_unadorned() {
    assert_eq!(
        render_status_line(OutputStyle::Plain, "ok", "erased p-2.0-3"),
        "erased p-2.0-3"
    );
}

#[test]
fn render_status_line_rich_includes_ascii_badge() {
    assert_eq!(
        render_status_line(OutputStyle::Rich, "ok", "erased p-2.0-3"),
        "[OK] erased p-2.0-3"
    );
    assert_eq!(
        render_status_line(OutputStyle::Rich, "warn", "erased p-2.0-3 with 1 issue(s)"),
        "[WARN] erased p-2.0-3 with 1 issue(s)"
    );
}

#[test]
fn section_header_only_in_rich_output() {
    assert_eq!(render_section_header(OutputStyle::Plain, "Installed packages"), None);
    let header = render_section_header(OutputStyle::Rich, "Installed packages")
        .expect("rich output must render a header");
    assert!(header.contains("== Installed packages =="));
}

#[test]
fn describe_applied_distinguishes_test_mode() {
    let report = sample_report(Vec::new());
    assert_eq!(
        describe_applied(&report.applied[0], false),
        "saved /etc/p.conf as /etc/p.conf.rpmsave"
    );
    assert_eq!(
        describe_applied(&report.applied[1], true),
        "would remove directory /usr/share/doc"
    );
}

#[test]
fn format_erase_report_lists_planned_ops_in_test_mode() {
    let report = sample_report(Vec::new());
    let flags = UninstallFlags {
        test_only: true,
        ..UninstallFlags::default()
    };
    assert_eq!(
        format_erase_report(&report, flags, OutputStyle::Plain),
        vec![
            "would save /etc/p.conf as /etc/p.conf.rpmsave".to_string(),
            "would remove directory /usr/share/doc".to_string(),
            "would erase p-2.0-3".to_string(),
        ]
    );
}

#[test]
fn format_erase_report_counts_issues() {
    let report = sample_report(vec![UninstallIssue::RmdirNotEmpty {
        path: PathBuf::from("/usr/share/doc"),
    }]);
    assert_eq!(
        format_erase_report(&report, UninstallFlags::default(), OutputStyle::Rich),
        vec!["[WARN] erased p-2.0-3 with 1 issue(s)".to_string()]
    );
}

#[test]
fn resolve_erase_targets_by_name() {
    let mut db = MemoryDatabase::new();
    db.insert(RecordOffset::new(9), record("multi", &[]));
    db.insert(RecordOffset::new(4), record("multi", &[]));
    db.insert(RecordOffset::new(5), record("single", &[]));

    assert_eq!(
        resolve_erase_targets(&db, Some("single"), None, false).expect("must resolve"),
        vec![RecordOffset::new(5)]
    );
    assert_eq!(
        resolve_erase_targets(&db, Some("multi"), None, true).expect("must resolve"),
        vec![RecordOffset::new(4), RecordOffset::new(9)]
    );
    assert_eq!(
        resolve_erase_targets(&db, None, Some(42), false).expect("must resolve"),
        vec![RecordOffset::new(42)]
    );

    let err = resolve_erase_targets(&db, Some("multi"), None, false)
        .expect_err("ambiguous name must fail");
    assert!(
        err.to_string().contains("specifies multiple packages (2)"),
        "unexpected error: {err}"
    );
    let err = resolve_erase_targets(&db, Some("absent"), None, false)
        .expect_err("unknown name must fail");
    assert_eq!(err.to_string(), "package absent is not installed");
}

#[test]
fn list_records_prints_offset_nevr_and_file_count() {
    let root = test_root();
    let db = DirectoryDatabase::open(root.join("db"));
    db.put_record(RecordOffset::new(12), &record("b", &["/b1", "/b2"]))
        .expect("must store record");
    db.put_record(RecordOffset::new(3), &record("a", &[]))
        .expect("must store record");

    assert_eq!(
        list_records(&db).expect("must list"),
        vec!["3  a-2.0-3  0".to_string(), "12  b-2.0-3  2".to_string()]
    );

    std::fs::write(db.record_path(RecordOffset::new(7)), b"garbage = [")
        .expect("must write garbage record");
    assert_eq!(list_records(&db).expect("must list around corrupt record").len(), 2);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn run_cli_erases_package_under_alternate_root() {
    let root = test_root();
    let layout = rpmrm_uninstall::RootLayout::new(&root);
    let db = DirectoryDatabase::open(layout.default_db_dir());
    db.put_record(RecordOffset::new(1), &record("tool", &["/opt/tool/bin", "/opt/tool/readme"]))
        .expect("must store record");
    std::fs::create_dir_all(root.join("opt/tool")).expect("must create package dir");
    for file in ["bin", "readme"] {
        std::fs::write(root.join("opt/tool").join(file), file).expect("must write file");
    }

    let root_arg = root.display().to_string();
    let cli = Cli::try_parse_from(["rpmrm", "--root", root_arg.as_str(), "erase", "tool"])
        .expect("must parse");
    run_cli(cli).expect("must erase");

    assert!(!Path::new(&root).join("opt/tool/bin").exists());
    assert!(!Path::new(&root).join("opt/tool/readme").exists());
    assert!(db.offsets().expect("must list offsets").is_empty());

    let _ = std::fs::remove_dir_all(&root);
}
