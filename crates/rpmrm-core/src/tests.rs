use super::*;

const DOC_PACKAGE: &str = r#"
name = "p"
version = "1.0"
release = "3"
rpm_version = "2.5.1"
preun = "echo bye"

[files]
paths = ["/usr/share/doc", "/usr/share/doc/readme.txt", "/etc/p.conf"]
states = ["normal", "normal", "normal"]
flags = [0, 0, 1]
modes = [16877, 33188, 33188]
md5s = ["", "0f343b0931126a20f133d67c2b018a3b", "abc123"]
"#;

#[test]
fn parse_record_with_file_list() {
    let record = PackageRecord::from_toml_str(DOC_PACKAGE).expect("must parse");
    assert_eq!(record.nevr(), "p-1.0-3");
    assert!(record.has_fixed_digests());
    assert_eq!(
        record.scripts.body(ScriptPhase::PreUninstall),
        Some("echo bye")
    );
    assert_eq!(record.scripts.body(ScriptPhase::PostUninstall), None);

    let files = record.files();
    assert_eq!(files.len(), 3);
    assert!(files[0].is_dir());
    assert_eq!(files[0].md5, None);
    assert!(!files[1].is_dir());
    assert!(files[2].is_config());
    assert_eq!(files[2].md5.as_deref(), Some("abc123"));
}

#[test]
fn record_without_files_table_has_no_file_list() {
    let record = PackageRecord::from_toml_str("name = \"meta\"\nversion = \"1\"\nrelease = \"1\"\n")
        .expect("must parse");
    assert!(record.files.is_none());
    assert!(record.files().is_empty());
    assert!(!record.has_fixed_digests());
}

#[test]
fn misaligned_file_arrays_are_rejected_at_load() {
    let raw = r#"
name = "broken"
version = "1"
release = "1"

[files]
paths = ["/a", "/b"]
states = ["normal", "normal"]
flags = [0]
modes = [33188, 33188]
md5s = ["", ""]
"#;
    let err = PackageRecord::from_toml_str(raw).expect_err("must reject misaligned arrays");
    match err {
        RecordError::MisalignedFileArrays {
            field,
            expected,
            found,
        } => {
            assert_eq!(field, "flags");
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_file_state_reports_index() {
    let raw = r#"
name = "odd"
version = "1"
release = "1"

[files]
paths = ["/a", "/b"]
states = ["normal", "vanished"]
flags = [0, 0]
modes = [33188, 33188]
md5s = ["", ""]
"#;
    let err = PackageRecord::from_toml_str(raw).expect_err("must reject unknown state");
    assert!(matches!(
        err,
        RecordError::InvalidFileState { index: 1, ref value } if value == "vanished"
    ));
}

#[test]
fn empty_name_is_a_missing_field() {
    let err = PackageRecord::from_toml_str("name = \" \"\nversion = \"1\"\nrelease = \"1\"\n")
        .expect_err("must reject empty name");
    assert!(matches!(err, RecordError::MissingField("name")));
}

#[test]
fn file_state_accepts_numeric_codes() {
    assert_eq!(FileState::parse("0"), Some(FileState::Normal));
    assert_eq!(FileState::parse("1"), Some(FileState::Replaced));
    assert_eq!(FileState::parse("2"), Some(FileState::NotInstalled));
    assert_eq!(FileState::parse("3"), Some(FileState::NetShared));
    assert_eq!(FileState::parse(" NetShared "), Some(FileState::NetShared));
    assert_eq!(FileState::parse("4"), None);
}

#[test]
fn untouchable_states() {
    assert!(FileState::NotInstalled.is_untouchable());
    assert!(FileState::NetShared.is_untouchable());
    assert!(!FileState::Normal.is_untouchable());
    assert!(!FileState::Replaced.is_untouchable());
}

#[test]
fn file_mode_detects_directories() {
    assert!(FileMode::directory(0o755).is_dir());
    assert!(FileMode::from_bits(0o040_700).is_dir());
    assert!(!FileMode::regular(0o644).is_dir());
    assert!(!FileMode::from_bits(0o120_777).is_dir());
}

#[test]
fn file_flags_combine() {
    let flags = FileFlags::CONFIG | FileFlags::DOC;
    assert!(flags.is_config());
    assert!(flags.contains(FileFlags::DOC));
    assert_eq!(flags.bits(), 3);
    assert!(!FileFlags::DOC.is_config());
}

#[test]
fn stored_form_preserves_file_metadata() {
    let record = PackageRecord::from_toml_str(DOC_PACKAGE).expect("must parse");
    let encoded = record.to_toml_string().expect("must encode");
    let reparsed = PackageRecord::from_toml_str(&encoded).expect("must parse encoded");
    assert_eq!(reparsed, record);
    assert!(encoded.contains("rpm_version = \"2.5.1\""));
    assert!(!encoded.contains("postun"));
}

#[test]
fn record_offsets_order_and_parse() {
    let mut offsets = vec![RecordOffset::new(20), RecordOffset::new(3), RecordOffset::new(10)];
    offsets.sort();
    assert_eq!(
        offsets,
        vec![RecordOffset::new(3), RecordOffset::new(10), RecordOffset::new(20)]
    );
    assert_eq!(" 42 ".parse::<RecordOffset>().expect("must parse"), RecordOffset::new(42));
    assert_eq!(RecordOffset::new(7).to_string(), "7");
}
