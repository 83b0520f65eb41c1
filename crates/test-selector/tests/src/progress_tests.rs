use super::prefixed_progress_title;

#[test]
fn progress_title_adds_prefix_when_missing() {
    assert_eq!(prefixed_progress_title("Scanning tests"), "test-selector: Scanning tests");
}

#[test]
fn progress_title_preserves_existing_prefix() {
    assert_eq!(prefixed_progress_title("  test-selector: Scanning tests "), "test-selector: Scanning tests");
}
