//! Options loading and the process-wide defaults used by the facade.

use std::io::Write;

use serial_test::serial;
use standout_inspect::{
    dump_to_string, set_option, set_options, InspectError, OptionValue, Options, OutputMode,
};

#[test]
fn test_load_options_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "maxDepth: 3").unwrap();
    writeln!(file, "maxSequenceElements: 2").unwrap();
    writeln!(file, "includeProtectedFields: false").unwrap();
    writeln!(file, "theme: dark").unwrap();

    let options = Options::from_file(file.path()).unwrap();
    assert_eq!(options.max_depth, 3);
    assert_eq!(options.max_sequence_elements, 2);
    assert_eq!(options.max_string_length, 1000);
    assert!(!options.include_protected_fields);
    assert_eq!(
        options.get_option("theme"),
        Some(OptionValue::Str("dark".into()))
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Options::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, InspectError::Io(_)));
}

#[test]
fn test_bad_yaml_is_config_error() {
    let err = Options::from_yaml("maxDepth: [1, 2]").unwrap_err();
    assert!(matches!(err, InspectError::Config(_)));
}

#[test]
#[serial]
fn test_global_options_drive_facade() {
    set_options(Options::default());
    set_option("maxSequenceElements", 1).unwrap();

    let out = dump_to_string(OutputMode::Text, &[&vec![1, 2, 3]], None);
    assert_eq!(out, "array(3) [\n  0 => int(1)\n  … and 2 more elements\n]\n");

    set_options(Options::default());
}

#[test]
#[serial]
fn test_global_option_type_error_leaves_defaults() {
    set_options(Options::default());
    let err = set_option("maxDepth", "deep").unwrap_err();
    assert!(matches!(err, InspectError::InvalidOption { .. }));
    assert_eq!(standout_inspect::options().max_depth, 10);
}

#[test]
#[serial]
fn test_facade_html_mode() {
    set_options(Options::default());
    let site = standout_inspect::CallSite::new("app.rs", 9).with_scope("app");
    let out = dump_to_string(OutputMode::Html, &[&true], Some(&site));
    assert!(out.contains("app.rs:9"));
    assert!(out.contains("bool(true)"));
}
