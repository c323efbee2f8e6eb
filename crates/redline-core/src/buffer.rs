/// Text buffer wrapping `ropey::Rope` for the live document content.
use std::fmt;

use anyhow::Result;
use ropey::Rope;

use crate::surface::TextRange;

/// A text buffer backed by a rope data structure for efficient editing.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl TextBuffer {
    /// Creates an empty text buffer.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Returns the total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of lines in the buffer.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the char index of the start of a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line index is out of bounds.
    pub fn line_to_char(&self, line_idx: usize) -> Result<usize> {
        if line_idx >= self.rope.len_lines() {
            anyhow::bail!(
                "line index {} out of bounds (buffer has {} lines)",
                line_idx,
                self.rope.len_lines()
            );
        }
        Ok(self.rope.line_to_char(line_idx))
    }

    /// Returns the line index for a given char index.
    ///
    /// # Errors
    ///
    /// Returns an error if the char index is out of bounds.
    pub fn char_to_line(&self, char_idx: usize) -> Result<usize> {
        if char_idx > self.rope.len_chars() {
            anyhow::bail!(
                "char index {} out of bounds (buffer has {} chars)",
                char_idx,
                self.rope.len_chars()
            );
        }
        Ok(self.rope.char_to_line(char_idx))
    }

    /// Returns the length of a line in characters, excluding any trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the line index is out of bounds.
    pub fn line_len_chars(&self, line_idx: usize) -> Result<usize> {
        if line_idx >= self.rope.len_lines() {
            anyhow::bail!(
                "line index {} out of bounds (buffer has {} lines)",
                line_idx,
                self.rope.len_lines()
            );
        }
        let line = self.rope.line(line_idx);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            if len > 1 && line.char(len - 2) == '\r' {
                return Ok(len - 2);
            }
            return Ok(len - 1);
        }
        Ok(len)
    }

    /// Validates that `range` is ordered and inside the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error describing the violated bound.
    pub fn check_range(&self, range: TextRange) -> Result<()> {
        if range.start > range.end {
            anyhow::bail!("invalid range: start ({}) > end ({})", range.start, range.end);
        }
        if range.end > self.rope.len_chars() {
            anyhow::bail!(
                "range end {} out of bounds (buffer has {} chars)",
                range.end,
                self.rope.len_chars()
            );
        }
        Ok(())
    }

    /// Returns the text in `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn slice(&self, range: TextRange) -> Result<String> {
        self.check_range(range)?;
        Ok(self.rope.slice(range.start..range.end).to_string())
    }

    /// Replaces the chars in `range` with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds; the buffer is left
    /// unchanged in that case.
    pub fn replace(&mut self, range: TextRange, text: &str) -> Result<()> {
        self.check_range(range)?;
        self.rope.remove(range.start..range.end);
        self.rope.insert(range.start, text);
        Ok(())
    }
}
