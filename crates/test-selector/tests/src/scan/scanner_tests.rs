use super::*;

fn scan(text: &str) -> ScanResult {
    DeclarationScanner::default().scan(text)
}

fn summary(result: &ScanResult) -> Vec<(&str, bool)> {
    result.iter().map(|d| (d.name.as_str(), d.suppressed)).collect()
}

#[test]
fn single_declaration() {
    let result = scan("void test_login() {}\n");
    assert_eq!(result.len(), 1);
    let declaration = &result.as_slice()[0];
    assert_eq!(declaration.name, "test_login");
    assert_eq!(declaration.head_offset, 0);
    assert_eq!(declaration.name_offset, 5);
    assert_eq!(declaration.line, 0);
    assert!(!declaration.suppressed);
}

#[test]
fn marker_on_previous_line_suppresses() {
    let result = scan("@Suppress\nvoid test_login() {}\n");
    assert_eq!(summary(&result), [("test_login", true)]);
    assert_eq!(result.as_slice()[0].head_offset, 10);
    assert_eq!(result.suppressed_count(), 1);
}

#[test]
fn empty_buffer_has_no_declarations() {
    assert!(scan("").is_empty());
    assert!(scan("class Empty {}\n").is_empty());
}

#[test]
fn lookback_is_exactly_one_line() {
    let result = scan("@Suppress\nint x;\nvoid test_a() {}\n");
    assert_eq!(summary(&result), [("test_a", false)]);
}

#[test]
fn stacked_markers_do_not_accumulate() {
    let result = scan("@Suppress\n@Suppress\nvoid test_a() {}\nvoid test_b() {}\n");
    assert_eq!(summary(&result), [("test_a", true), ("test_b", false)]);
}

#[test]
fn blank_line_resets_by_default() {
    let text = "\t@Suppress\n\n\tpublic void test_a() {}\n";
    assert_eq!(summary(&scan(text)), [("test_a", false)]);

    let patterns = SelectorPatterns::new(r"\b(test_\w+)\(", r"@Suppress\b", "\t@Suppress").unwrap().with_skip_blank_lines(true);
    let result = DeclarationScanner::new(Arc::new(patterns)).scan(text);
    assert_eq!(summary(&result), [("test_a", true)]);
}

#[test]
fn line_matching_both_patterns_counts_as_marker() {
    let result = scan("@Suppress void test_a() {}\nvoid test_b() {}\n");
    assert_eq!(summary(&result), [("test_b", true)]);
}

#[test]
fn unterminated_and_crlf_lines_are_scanned() {
    let result = scan("@Suppress\r\nvoid test_a() {}\r\nvoid test_b() {}");
    assert_eq!(summary(&result), [("test_a", true), ("test_b", false)]);
    assert_eq!(result.as_slice()[1].line, 2);
}

#[test]
fn declarations_are_in_increasing_offset_order() {
    let text = "void test_c() {}\n@Suppress\nvoid test_a() {}\n\nvoid test_b() {}\nvoid test_c() {}\n";
    let result = scan(text);
    assert_eq!(result.names().collect::<Vec<_>>(), ["test_c", "test_a", "test_b", "test_c"]);
    assert!(result.as_slice().windows(2).all(|pair| pair[0].head_offset < pair[1].head_offset));
}

#[test]
fn serializes_as_camel_case_array() {
    let json = serde_json::to_value(scan("void test_a() {}\n")).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "name": "test_a", "headOffset": 0, "nameOffset": 5, "line": 0, "suppressed": false }])
    );
}
