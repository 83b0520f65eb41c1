use super::*;

#[test]
fn espresso_preset_matches_case_insensitively() {
    let patterns = TestFramework::Espresso.patterns();
    assert_eq!(patterns.declaration_name("public void test_login() {"), Some((12, "test_login")));
    assert_eq!(patterns.declaration_name("public void TEST_Logout() {"), Some((12, "TEST_Logout")));
    assert_eq!(patterns.declaration_name("public void testLogin() {"), None);
    assert_eq!(patterns.declaration_name("helper.test_login ();"), None);
    assert!(patterns.is_suppress_line("\t@suppress"));
    assert!(patterns.is_suppress_line("@Suppress // flaky"));
    assert!(!patterns.is_suppress_line("@SuppressWarnings(\"x\")"));
}

#[test]
fn junit_preset() {
    let patterns = TestFramework::Junit.patterns();
    assert_eq!(patterns.declaration_name("  public void testLogin () {"), Some((14, "testLogin")));
    assert!(patterns.is_suppress_line("  @Ignore"));
    assert_eq!(patterns.marker_text(), "\t@Ignore");
    assert_eq!(patterns.marker_token(), "@Ignore");
}

#[test]
fn presets_are_shared() {
    assert!(Arc::ptr_eq(&TestFramework::Espresso.patterns(), &SelectorPatterns::for_framework(TestFramework::Espresso)));
}

#[test]
fn name_without_capture_group_drops_open_paren() {
    let patterns = SelectorPatterns::new(r"check\w+\(", r"@Skip\b", "@Skip").unwrap();
    assert_eq!(patterns.declaration_name("void checkThing() {"), Some((5, "checkThing")));
}

#[test]
fn invalid_patterns_are_reported() {
    assert!(matches!(SelectorPatterns::new("test_(", "@S", "@S"), Err(PatternError::InvalidDeclaration { .. })));
    assert!(matches!(SelectorPatterns::new("test_", "[", "@S"), Err(PatternError::InvalidSuppress { .. })));
    assert!(matches!(SelectorPatterns::new("test_", "@S", "  "), Err(PatternError::EmptyMarker)));
    assert!(matches!(
        SelectorPatterns::new(r"(test_\w+)\(", r"@Suppress\b", "@Ignore"),
        Err(PatternError::MarkerNotSuppressing { .. })
    ));
}

#[test]
fn skip_blank_lines_is_opt_in() {
    let patterns = SelectorPatterns::new(r"(test_\w+)\(", r"@Suppress\b", "@Suppress").unwrap();
    assert!(!patterns.skip_blank_lines());
    assert!(patterns.with_skip_blank_lines(true).skip_blank_lines());
}

#[test]
fn framework_names_round_trip_through_settings() {
    assert_eq!(TestFramework::from_setting_value(" JUnit3 "), Some(TestFramework::Junit));
    assert!(matches!("espresso".parse::<TestFramework>(), Ok(TestFramework::Espresso)));
    assert!(matches!("mocha".parse::<TestFramework>(), Err(PatternError::UnknownFramework(name)) if name == "mocha"));
    assert_eq!(TestFramework::Junit.to_string(), "junit");
}

#[test]
fn suppress_match_reports_marker_span() {
    let patterns = TestFramework::Espresso.patterns();
    assert_eq!(patterns.suppress_match("    @suppress @LargeTest"), Some(4..13));
    assert_eq!(patterns.suppress_match("    @LargeTest"), None);
}
