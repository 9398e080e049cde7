use super::*;

#[test]
fn test_missing_config_yields_defaults() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let config = load_workspace_config(dir.path()).expect("load config");
    assert_eq!(config, SyncConfig::default());
}

#[test]
fn test_partial_config_keeps_defaults_for_absent_fields() {
    let dir = tempfile::tempdir().expect("create tempdir");
    std::fs::write(
        workspace_config_path(dir.path()),
        r#"{ "input_extension": "txt", "test_list_file": "tests.lst" }"#,
    )
    .expect("write config");

    let config = load_workspace_config(dir.path()).expect("load config");
    assert_eq!(config.input_extension, "txt");
    assert_eq!(config.test_list_file, "tests.lst");
    assert_eq!(config.program_output_extension, "out");
}

#[test]
fn test_malformed_config_is_a_config_error() {
    let dir = tempfile::tempdir().expect("create tempdir");
    std::fs::write(workspace_config_path(dir.path()), "{ not json").expect("write config");
    assert!(matches!(
        load_workspace_config(dir.path()),
        Err(SyncError::Config(_))
    ));
}

#[test]
fn test_ensure_workspace_config_writes_defaults_once() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = ensure_workspace_config(dir.path()).expect("ensure config");
    assert!(path.exists());

    std::fs::write(&path, r#"{ "manual_test_prefix": "my" }"#).expect("edit config");
    ensure_workspace_config(dir.path()).expect("ensure again");
    let config = load_workspace_config(dir.path()).expect("load config");
    assert_eq!(config.manual_test_prefix, "my");
}
