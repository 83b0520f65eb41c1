use super::*;

fn write_source(
    dir: &tempfile::TempDir,
    text: &str,
) -> PathBuf {
    let path = dir.path().join("LoginTest.java");
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn suppress_command_writes_the_marker() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "class LoginTest {\n\tpublic void test_login() {}\n}\n");

    run(Command::Suppress {
        path: path.clone(),
        name: "test_login".to_string(),
        framework: None,
    })
    .unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "class LoginTest {\n\t@Suppress\n\tpublic void test_login() {}\n}\n"
    );
}

#[test]
fn missing_file_is_a_buffer_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = run(Command::List {
        path: dir.path().join("Missing.java"),
        framework: None,
    })
    .unwrap_err();
    assert!(matches!(error, CliError::Buffer(BufferError::Io(_))), "{error:?}");
}

#[test]
fn unknown_test_is_a_selector_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "class LoginTest {\n\tpublic void test_login() {}\n}\n");

    let error = run(Command::Unsuppress {
        path,
        name: "test_missing".to_string(),
        framework: None,
    })
    .unwrap_err();
    assert!(matches!(error, CliError::Selector(SelectorError::UnknownDeclaration(ref name)) if name == "test_missing"));
    assert_eq!(error.to_string(), "unknown test declaration 'test_missing'");
}

#[test]
fn malformed_settings_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "class LoginTest {}\n");
    std::fs::write(dir.path().join(".test-selector.toml"), "[selector\n").unwrap();

    let error = run(Command::List {
        path,
        framework: None,
    })
    .unwrap_err();
    assert!(matches!(error, CliError::Config(ConfigFileError::Parse { .. })), "{error:?}");
}
