use super::*;

fn test_doc(text: &str) -> Document {
    Document::new(Url::parse("file:///LoginTest.java").unwrap(), text.to_string(), 1)
}

#[test]
fn line_offsets_empty() {
    let doc = test_doc("");
    assert_eq!(doc.line_count(), 1);
    assert_eq!(doc.line_text(0), Some(""));
}

#[test]
fn line_offsets_basic() {
    let doc = test_doc("hello\r\nworld\n");
    assert_eq!(doc.line_count(), 3);
    assert_eq!(doc.line_text(0), Some("hello"));
    assert_eq!(doc.line_text(1), Some("world"));
    assert_eq!(doc.line_text(2), Some(""));
    assert_eq!(doc.line_text(3), None);
}

#[test]
fn offset_roundtrip() {
    let doc = test_doc("@Suppress\nvoid test_a() {}\n");
    let pos = Position {
        line: 1,
        character: 0,
    };
    let off = doc.offset_of(pos).unwrap();
    assert_eq!(off, 10);
    assert_eq!(doc.position_of(off), pos);
    assert_eq!(doc.line_of(off), 1);
    assert_eq!(doc.line_of(off - 1), 0);
}

#[test]
fn positions_count_utf16_units() {
    let doc = test_doc("// 😀 x\n");
    let x = doc.text.find('x').unwrap();
    assert_eq!(doc.position_of(x), Position::new(0, 6));
    assert_eq!(doc.offset_of(Position::new(0, 6)), Some(x));
}

#[test]
fn set_content_updates_lines() {
    let mut doc = test_doc("one\ntwo");
    assert_eq!(doc.line_count(), 2);
    doc.set_content("a\nb\nc".to_string(), 2);
    assert_eq!(doc.line_count(), 3);
    assert_eq!(doc.version, 2);
}

#[test]
fn apply_incremental_change() {
    let mut doc = test_doc("void test_a() {}\n");
    doc.apply_changes(
        vec![TextDocumentContentChangeEvent {
            range: Some(tower_lsp::lsp_types::Range::new(Position::new(0, 0), Position::new(0, 0))),
            range_length: None,
            text: "@Suppress\n".to_string(),
        }],
        2,
    );
    assert_eq!(doc.text, "@Suppress\nvoid test_a() {}\n");
    assert_eq!(doc.line_text(1), Some("void test_a() {}"));
}

#[test]
fn newline_lookup_uses_line_table() {
    let doc = test_doc("ab\ncd\n\nef");
    let text = doc.text.clone();
    for from in 0..=text.len() {
        assert_eq!(doc.find_byte(from, b'\n'), text.as_str().find_byte(from, b'\n'), "from {from}");
        assert_eq!(doc.rfind_byte(from, b'\n'), text.as_str().rfind_byte(from, b'\n'), "before {from}");
    }
    assert_eq!(doc.find_byte(0, b'c'), Some(3));
}

#[test]
fn buffer_edits_keep_line_table_current() {
    let mut doc = test_doc("void test_a() {}\n");
    MutableBuffer::insert(&mut doc, 0, "\t@Suppress\n").unwrap();
    assert_eq!(doc.line_count(), 3);
    assert_eq!(doc.line_text(1), Some("void test_a() {}"));
    MutableBuffer::delete(&mut doc, 0..11).unwrap();
    assert_eq!(doc.line_count(), 2);
    assert_eq!(doc.find_byte(0, b'\n'), Some(16));
}

#[test]
fn character_past_line_end_clamps_before_newline() {
    let doc = test_doc("ab\ncd\n");
    assert_eq!(doc.offset_of(Position::new(0, 40)), Some(2));
    assert_eq!(doc.offset_of(Position::new(1, 1)), Some(4));
    assert_eq!(doc.offset_of(Position::new(3, 0)), None);
}
