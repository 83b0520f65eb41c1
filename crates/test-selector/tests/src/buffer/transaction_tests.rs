use super::*;
use crate::buffer::TextBuffer;

/// String whose commit hook can be told to fail.
struct Flaky {
    text: String,
    fail_commit: bool,
}

impl TextBuffer for Flaky {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn read_range(
        &self,
        range: Range<usize>,
    ) -> Result<std::borrow::Cow<'_, str>, BufferError> {
        self.text.read_range(range)
    }
}

impl MutableBuffer for Flaky {
    fn insert(
        &mut self,
        offset: usize,
        text: &str,
    ) -> Result<(), BufferError> {
        MutableBuffer::insert(&mut self.text, offset, text)
    }

    fn delete(
        &mut self,
        range: Range<usize>,
    ) -> Result<(), BufferError> {
        MutableBuffer::delete(&mut self.text, range)
    }

    fn commit(&mut self) -> Result<(), BufferError> {
        if self.fail_commit {
            return Err(BufferError::Io("disk full".to_string()));
        }
        Ok(())
    }
}

#[test]
fn commit_keeps_edits() {
    let mut text = String::from("void test_a() {}\n");
    let mut transaction = EditTransaction::begin(&mut text);
    transaction.insert(0, "\t@Suppress\n").unwrap();
    assert_eq!(transaction.edit_count(), 1);
    assert_eq!(transaction.commit(), Ok(1));
    assert_eq!(text, "\t@Suppress\nvoid test_a() {}\n");
}

#[test]
fn drop_without_commit_rolls_back_in_reverse() {
    let mut text = String::from("abcdef");
    {
        let mut transaction = EditTransaction::begin(&mut text);
        transaction.insert(3, "XYZ").unwrap();
        assert_eq!(transaction.delete(0..2).unwrap(), "ab");
        transaction.insert(0, "__").unwrap();
        assert_eq!(transaction.buffer(), "__cXYZdef");
    }
    assert_eq!(text, "abcdef");
}

#[test]
fn failed_edit_rolls_back_earlier_edits() {
    let mut text = String::from("abc");
    let result = (|| {
        let mut transaction = EditTransaction::begin(&mut text);
        transaction.insert(0, "1")?;
        transaction.delete(2..99)?;
        transaction.commit()
    })();
    assert!(matches!(result, Err(BufferError::OutOfBounds { .. })));
    assert_eq!(text, "abc");
}

#[test]
fn failed_commit_hook_rolls_back() {
    let mut buffer = Flaky {
        text: "line\n".to_string(),
        fail_commit: true,
    };
    let mut transaction = EditTransaction::begin(&mut buffer);
    transaction.insert(0, "marker\n").unwrap();
    assert_eq!(transaction.commit(), Err(BufferError::Io("disk full".to_string())));
    assert_eq!(buffer.text, "line\n");
}
