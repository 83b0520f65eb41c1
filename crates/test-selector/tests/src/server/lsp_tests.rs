use super::*;
use crate::scan::{DeclarationScanner, TestFramework};

const TEXT: &str = "class LoginTest {\n\t@Suppress\n\tpublic void test_login() {}\n\tpublic void test_ünïcode() {}\n}\n";

fn document(text: &str) -> Document {
    Document::new(Url::parse("file:///project/LoginTest.java").unwrap(), text.to_string(), 1)
}

fn declarations(doc: &Document) -> Vec<TestDeclaration> {
    let scanner = DeclarationScanner::new(TestFramework::Espresso.patterns());
    scanner.scan(doc).iter().cloned().collect()
}

#[test]
fn symbols_cover_line_and_select_name() {
    let doc = document(TEXT);
    let decls = declarations(&doc);

    let login = declaration_symbol(&doc, &decls[0]);
    assert_eq!(login.name, "test_login");
    assert_eq!(login.detail.as_deref(), Some("suppressed"));
    assert_eq!(login.kind, SymbolKind::METHOD);
    assert_eq!(login.range, Range::new(Position::new(2, 0), Position::new(2, 28)));
    assert_eq!(login.selection_range, Range::new(Position::new(2, 13), Position::new(2, 23)));

    let unicode = declaration_symbol(&doc, &decls[1]);
    assert_eq!(unicode.detail.as_deref(), Some("enabled"));
    // UTF-16 columns, not bytes.
    assert_eq!(unicode.selection_range, Range::new(Position::new(3, 13), Position::new(3, 25)));
}

#[test]
fn code_lens_toggles_by_name() {
    let doc = document(TEXT);
    let decls = declarations(&doc);

    let lens = declaration_code_lens(&doc, &decls[0]);
    let command = lens.command.unwrap();
    assert_eq!(command.title, "Suppressed · enable");
    assert_eq!(command.command, TOGGLE_SUPPRESSION);
    assert_eq!(command.arguments, Some(vec![json!(doc.uri), json!("test_login")]));

    let lens = declaration_code_lens(&doc, &decls[1]);
    assert_eq!(lens.command.unwrap().title, "Enabled · suppress");
}

#[test]
fn location_points_at_line_start() {
    let doc = document(TEXT);
    let location = declaration_location(
        &doc,
        DeclarationLocation {
            offset: 29,
            line: 2,
        },
    );
    assert_eq!(location.uri, doc.uri);
    assert_eq!(location.range, Range::new(Position::new(2, 0), Position::new(2, 0)));
}

#[test]
fn minimal_edit_for_insertion() {
    let doc = document(TEXT);
    let mut updated = TEXT.to_string();
    updated.insert_str(58, "\t@Suppress\n");

    let edit = minimal_text_edit(&doc, &updated).unwrap();
    let start = doc.offset_of(edit.range.start).unwrap();
    let end = doc.offset_of(edit.range.end).unwrap();
    let mut applied = TEXT.to_string();
    applied.replace_range(start..end, &edit.new_text);
    assert_eq!(applied, updated);
    assert_eq!(edit.range.start, edit.range.end);
}

#[test]
fn minimal_edit_for_deletion() {
    let doc = document(TEXT);
    let updated = TEXT.replacen("\t@Suppress\n", "", 1);

    let edit = minimal_text_edit(&doc, &updated).unwrap();
    assert!(edit.new_text.is_empty());
    let start = doc.offset_of(edit.range.start).unwrap();
    let end = doc.offset_of(edit.range.end).unwrap();
    assert_eq!(end - start, "\t@Suppress\n".len());
}

#[test]
fn minimal_edit_snaps_to_char_boundaries() {
    let doc = document("ä");
    let edit = minimal_text_edit(&doc, "ö").unwrap();
    assert_eq!(edit.range, Range::new(Position::new(0, 0), Position::new(0, 1)));
    assert_eq!(edit.new_text, "ö");
}

#[test]
fn identical_text_needs_no_edit() {
    let doc = document(TEXT);
    assert_eq!(minimal_text_edit(&doc, TEXT), None);
}
