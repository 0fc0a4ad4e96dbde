use std::time::Duration;

use similar::{ChangeTag, TextDiff};

/// Past this the diff gives up and reports the rest as one replacement.
pub const DIFF_TIMEOUT: Duration = Duration::from_millis(50);

/// Replace the char range `[start, end)` of the old text with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TextEdit {
    pub fn removed(&self) -> usize {
        self.end - self.start
    }

    pub fn inserted(&self) -> usize {
        self.text.chars().count()
    }
}

/// Char-level edits turning `old` into `new`, adjacent changes merged.
pub fn compute_text_edits(old: &str, new: &str) -> Vec<TextEdit> {
    let diff = TextDiff::configure().timeout(DIFF_TIMEOUT).diff_chars(old, new);
    let mut edits: Vec<TextEdit> = Vec::new();
    let mut pos = 0;

    for change in diff.iter_all_changes() {
        let value = change.value();
        let len = value.chars().count();

        match change.tag() {
            ChangeTag::Equal => pos += len,
            ChangeTag::Delete => {
                match edits.last_mut() {
                    Some(last) if last.end == pos => last.end += len,
                    _ => edits.push(TextEdit { start: pos, end: pos + len, text: String::new() }),
                }
                pos += len;
            }
            ChangeTag::Insert => match edits.last_mut() {
                Some(last) if last.end == pos => last.text.push_str(value),
                _ => edits.push(TextEdit { start: pos, end: pos, text: value.to_string() }),
            },
        }
    }

    edits
}

/// One-line description of what a save changes, for the log.
pub fn describe_change(old: &str, new: &str) -> String {
    let edits = compute_text_edits(old, new);
    if edits.is_empty() {
        return "no changes".to_string();
    }

    let removed: usize = edits.iter().map(TextEdit::removed).sum();
    let inserted: usize = edits.iter().map(TextEdit::inserted).sum();
    format!("{} edit(s), +{} -{} chars", edits.len(), inserted, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_edits_replace_and_insert() {
        let before = "buy milk\nwalk dog";
        let after = "buy eggs\nwalk the dog";

        let edits = compute_text_edits(before, after);
        let mut applied: Vec<char> = before.chars().collect();
        for edit in edits.iter().rev() {
            applied.splice(edit.start..edit.end, edit.text.chars());
        }

        assert_eq!(applied.into_iter().collect::<String>(), after);
    }

    #[test]
    fn test_compute_edits_append() {
        let edits = compute_text_edits("draft", "draft v2");

        assert_eq!(edits, vec![TextEdit { start: 5, end: 5, text: " v2".to_string() }]);
    }

    #[test]
    fn test_compute_edits_unicode_positions_are_chars() {
        let edits = compute_text_edits("заметка one", "заметка two");

        assert_eq!(edits.first().map(|e| e.start), Some(8));
    }

    #[test]
    fn test_describe_change() {
        assert_eq!(describe_change("same", "same"), "no changes");
        assert_eq!(describe_change("", "hello"), "1 edit(s), +5 -0 chars");
        assert_eq!(describe_change("hello", ""), "1 edit(s), +0 -5 chars");
    }

    #[test]
    fn test_large_rewrite_is_bounded() {
        let old: String = (0..40_000).map(|i| char::from(b'a' + (i % 7) as u8)).collect();
        let new: String = (0..40_000).map(|i| char::from(b'h' + (i % 11) as u8)).collect();

        let started = std::time::Instant::now();
        let edits = compute_text_edits(&old, &new);

        assert!(started.elapsed() < Duration::from_secs(5), "took {:?}", started.elapsed());
        let removed: usize = edits.iter().map(TextEdit::removed).sum();
        let inserted: usize = edits.iter().map(TextEdit::inserted).sum();
        assert_eq!(removed, 40_000);
        assert_eq!(inserted, 40_000);
    }
}
