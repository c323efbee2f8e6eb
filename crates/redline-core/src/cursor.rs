/// Cursor and selection model for the document surface.
use crate::buffer::TextBuffer;
use crate::surface::TextRange;
use anyhow::{Context, Result};

/// Represents a position in the text as line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 0-indexed line number.
    pub line: usize,
    /// 0-indexed column (char offset within the line).
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line.cmp(&other.line).then(self.col.cmp(&other.col))
    }
}

/// The cursor state for a document, tracking position and optional selection.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    /// Current cursor position (the selection head).
    pub position: Position,
    /// Optional selection anchor. When set, selection is from anchor to position.
    pub selection_anchor: Option<Position>,
}

impl Cursor {
    /// Creates a new cursor at position (0, 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the selection as an ordered char range, if any.
    pub fn selection_range(&self, buffer: &TextBuffer) -> Result<Option<TextRange>> {
        match self.selection_anchor {
            Some(anchor) => {
                let anchor_char = pos_to_char(buffer, anchor)?;
                let head_char = pos_to_char(buffer, self.position)?;
                Ok(Some(TextRange::new(
                    anchor_char.min(head_char),
                    anchor_char.max(head_char),
                )))
            }
            None => Ok(None),
        }
    }

    /// Converts the cursor position to a char index.
    pub fn to_char_index(&self, buffer: &TextBuffer) -> Result<usize> {
        pos_to_char(buffer, self.position)
    }

    /// Selects `range`, leaving the cursor at its end.
    pub fn select(&mut self, range: TextRange, buffer: &TextBuffer) {
        self.selection_anchor = Some(char_to_pos(buffer, range.start));
        self.position = char_to_pos(buffer, range.end);
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection_anchor = None;
    }

    /// Moves the cursor to a char index, clearing any selection.
    pub fn move_to_char(&mut self, char_idx: usize, buffer: &TextBuffer) {
        self.position = char_to_pos(buffer, char_idx);
        self.selection_anchor = None;
    }

    /// Pulls the cursor and anchor back inside the buffer after its
    /// content shrank underneath them.
    pub fn clamp(&mut self, buffer: &TextBuffer) {
        self.position = clamp_position(self.position, buffer);
        self.selection_anchor = self.selection_anchor.map(|a| clamp_position(a, buffer));
    }
}

/// Converts a line/column position to a char index.
pub fn pos_to_char(buffer: &TextBuffer, pos: Position) -> Result<usize> {
    let clamped = clamp_position(pos, buffer);
    let line_start = buffer
        .line_to_char(clamped.line)
        .context("converting position to char index")?;
    Ok(line_start + clamped.col)
}

/// Converts a char index to a line/column position, clamped to the buffer.
pub fn char_to_pos(buffer: &TextBuffer, char_idx: usize) -> Position {
    let clamped = char_idx.min(buffer.len_chars());
    let line = buffer.char_to_line(clamped).unwrap_or(0);
    let line_start = buffer.line_to_char(line).unwrap_or(0);
    Position::new(line, clamped - line_start)
}

fn clamp_position(pos: Position, buffer: &TextBuffer) -> Position {
    if buffer.len_lines() == 0 {
        return Position::default();
    }
    let line = pos.line.min(buffer.len_lines() - 1);
    let line_len = buffer.line_len_chars(line).unwrap_or(0);
    let col = pos.col.min(line_len);
    Position::new(line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
    }

    #[test]
    fn test_pos_char_roundtrip_multiline() {
        let buf = TextBuffer::from("abc\ndef\nghi");
        let pos = char_to_pos(&buf, 5);
        assert_eq!(pos, Position::new(1, 1));
        assert_eq!(pos_to_char(&buf, pos).unwrap(), 5);
    }

    #[test]
    fn test_selection_range_is_ordered() {
        let buf = TextBuffer::from("hello world");
        let mut cursor = Cursor::new();
        cursor.selection_anchor = Some(Position::new(0, 11));
        cursor.position = Position::new(0, 6);
        assert_eq!(
            cursor.selection_range(&buf).unwrap(),
            Some(TextRange::new(6, 11))
        );
    }

    #[test]
    fn test_select_and_clear() {
        let buf = TextBuffer::from("line one\nline two");
        let mut cursor = Cursor::new();
        cursor.select(TextRange::new(5, 13), &buf);
        assert_eq!(cursor.position, Position::new(1, 4));
        assert_eq!(
            cursor.selection_range(&buf).unwrap(),
            Some(TextRange::new(5, 13))
        );
        cursor.clear_selection();
        assert_eq!(cursor.selection_range(&buf).unwrap(), None);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut cursor = Cursor::new();
        cursor.position = Position::new(4, 20);
        cursor.selection_anchor = Some(Position::new(3, 0));
        let buf = TextBuffer::from("ab\ncd");
        cursor.clamp(&buf);
        assert_eq!(cursor.position, Position::new(1, 2));
        assert_eq!(cursor.selection_anchor, Some(Position::new(1, 0)));
    }

    #[test]
    fn test_char_to_pos_clamps() {
        let buf = TextBuffer::from("abc");
        assert_eq!(char_to_pos(&buf, 99), Position::new(0, 3));
    }
}
