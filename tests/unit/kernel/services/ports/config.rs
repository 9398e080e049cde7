use super::*;

fn problem() -> Problem {
    Problem::new("1234A", "Two Sums", "codeforces", "Round 1")
}

#[test]
fn test_default_problem_directory_is_platform_then_id() {
    let config = SyncConfig::default();
    assert_eq!(
        config.problem_directory(&problem()).expect("resolve"),
        PathBuf::from("codeforces/1234A")
    );
}

#[test]
fn test_problem_directory_substitutes_all_keys() {
    let config = SyncConfig {
        problem_directory: "%contest_name%-%problem_name%".to_string(),
        ..SyncConfig::default()
    };
    assert_eq!(
        config.problem_directory(&problem()).expect("resolve"),
        PathBuf::from("Round 1-Two Sums")
    );
}

#[test]
fn test_problem_directory_rejects_unknown_or_unbalanced_placeholders() {
    let unknown = SyncConfig {
        problem_directory: "%platform_name%/%problem_id%".to_string(),
        ..SyncConfig::default()
    };
    assert!(matches!(
        unknown.problem_directory(&problem()),
        Err(SyncError::Config(_))
    ));

    let unbalanced = SyncConfig {
        problem_directory: "%problem_id".to_string(),
        ..SyncConfig::default()
    };
    assert!(matches!(
        unbalanced.problem_directory(&problem()),
        Err(SyncError::Config(_))
    ));
}

#[test]
fn test_classify_splits_name_and_kind() {
    let config = SyncConfig::default();
    assert_eq!(
        config.classify("sample1.in"),
        Some(("sample1".to_string(), TestFileKind::Input))
    );
    assert_eq!(
        config.classify("my.test.ans"),
        Some(("my.test".to_string(), TestFileKind::ExpectedOutput))
    );
    assert_eq!(
        config.classify("sample1.out"),
        Some(("sample1".to_string(), TestFileKind::ProgramOutput))
    );
    assert_eq!(config.classify("main.cpp"), None);
    assert_eq!(config.classify(".in"), None);
    assert_eq!(config.classify("tests"), None);
    assert_eq!(config.classify("binary.bin"), None);
}

#[test]
fn test_validate_rejects_colliding_names() {
    assert!(SyncConfig::default().validate().is_ok());

    let same_ext = SyncConfig {
        expected_output_extension: "out".to_string(),
        ..SyncConfig::default()
    };
    assert!(same_ext.validate().is_err());

    let list_is_test_file = SyncConfig {
        test_list_file: "list.in".to_string(),
        ..SyncConfig::default()
    };
    assert!(list_is_test_file.validate().is_err());
}
