use super::*;
use crate::scan::DeclarationScanner;

const TEXT: &str = "class A {\n  @Suppress\n  void test_a() {}\n  void test_b() {}\n}\n";

fn index() -> DeclarationIndex {
    DeclarationIndex::build(&DeclarationScanner::default().scan(TEXT))
}

#[test]
fn locates_declaration_line() {
    let location = locate(TEXT, &index(), "test_b").unwrap();
    assert_eq!(location.line, 3);
    assert_eq!(location.offset, TEXT.find("  void test_b").unwrap());
}

#[test]
fn follows_buffer_after_edits() {
    let edited = format!("// new header\n{TEXT}");
    let location = locate(edited.as_str(), &index(), "test_a").unwrap();
    assert_eq!(location.line, 3);
    assert_eq!(location.offset, edited.find("  void test_a").unwrap());
}

#[test]
fn unknown_or_missing_names_fail() {
    assert_eq!(locate(TEXT, &index(), "test_c"), Err(SelectorError::UnknownDeclaration("test_c".to_string())));
    let edited = TEXT.replace("test_a", "test_z");
    assert_eq!(
        locate(edited.as_str(), &index(), "test_a"),
        Err(SelectorError::UnknownDeclaration("test_a".to_string()))
    );
}
