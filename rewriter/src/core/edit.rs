//! Byte-offset text edits computed against an unmodified source.

/// Replace `text[start..end]` with `replacement`. `start == end` is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            replacement: text.into(),
        }
    }

    pub fn replace(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: text.into(),
        }
    }
}

/// Apply edits that were all computed against `text`.
///
/// Edits are ordered by start offset; insertions sharing an offset keep the order
/// they were given in. An edit overlapping an earlier one is dropped.
pub fn apply_edits(text: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by_key(|edit| edit.start);
    let extra: usize = edits.iter().map(|edit| edit.replacement.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut cursor = 0;
    for edit in edits {
        if edit.start < cursor || edit.end < edit.start || edit.end > text.len() {
            continue;
        }
        out.push_str(&text[cursor..edit.start]);
        out.push_str(&edit.replacement);
        cursor = edit.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Offset of the first byte of the line containing `offset`.
pub fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |idx| idx + 1)
}

/// Offset just past the newline that ends the line containing `offset`
/// (or `text.len()` on the last line).
pub fn line_end(text: &str, offset: usize) -> usize {
    text[offset..]
        .find('\n')
        .map_or(text.len(), |idx| offset + idx + 1)
}

/// Offset where the line's content ends, before any `\r\n` or `\n`.
pub fn content_end(text: &str, offset: usize) -> usize {
    let end = line_end(text, offset);
    let line = &text[offset.min(end)..end];
    let trimmed = line.trim_end_matches(['\n', '\r']);
    offset.min(end) + trimmed.len()
}

/// Line ending used by the first line of `text`, defaulting to `\n`.
pub fn detect_newline(text: &str) -> &'static str {
    match text.find('\n') {
        Some(idx) if idx > 0 && text.as_bytes()[idx - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_edits_in_offset_order() {
        let text = "abc def ghi";
        let edits = vec![
            TextEdit::replace(8, 11, "GHI"),
            TextEdit::insert(0, ">"),
            TextEdit::replace(4, 7, "DEF"),
        ];
        assert_eq!(apply_edits(text, edits), ">abc DEF GHI");
    }

    #[test]
    fn insertions_at_same_offset_keep_given_order() {
        let edits = vec![TextEdit::insert(1, "1"), TextEdit::insert(1, "2")];
        assert_eq!(apply_edits("ab", edits), "a12b");
    }

    #[test]
    fn overlapping_edit_is_dropped() {
        let edits = vec![TextEdit::replace(0, 3, "X"), TextEdit::replace(2, 4, "Y")];
        assert_eq!(apply_edits("abcdef", edits), "Xdef");
    }

    #[test]
    fn line_helpers_find_boundaries() {
        let text = "one\r\ntwo\nthree";
        assert_eq!(line_start(text, 6), 5);
        assert_eq!(line_end(text, 0), 5);
        assert_eq!(content_end(text, 0), 3);
        assert_eq!(line_end(text, 10), text.len());
        assert_eq!(detect_newline(text), "\r\n");
        assert_eq!(detect_newline("plain"), "\n");
    }
}
