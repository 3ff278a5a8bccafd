//! Core editor types: positions, selections and committed editor state.
//!
//! These types carry no reference into the rendering tree and can be freely
//! cloned, compared and serialized.

use std::cmp::Ordering;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A logical location in the text buffer.
///
/// `column` counts chars from the start of `row`, never tree offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Shift the column by `delta` chars, staying on the same row.
    pub fn offset_column(self, delta: usize) -> Self {
        Self {
            row: self.row,
            column: self.column + delta,
        }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Row-major (reading) order.
impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then(self.column.cmp(&other.column))
    }
}

/// Text selection with anchor and focus positions.
///
/// `start` is where the user started selecting, `end` is where the cursor is
/// now. They may be in any order - use `range_start()` and `range_end()` for
/// reading-order bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// Anchor
    pub start: Position,
    /// Focus
    pub end: Position,
}

impl Selection {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a collapsed selection (cursor position).
    pub fn caret(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// The earlier endpoint in reading order.
    pub fn range_start(&self) -> Position {
        self.start.min(self.end)
    }

    /// The later endpoint in reading order.
    pub fn range_end(&self) -> Position {
        self.start.max(self.end)
    }

    /// Reading-order copy of this selection.
    pub fn normalized(&self) -> Self {
        Self {
            start: self.range_start(),
            end: self.range_end(),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Check if the selection is backwards (focus before anchor).
    pub fn is_backward(&self) -> bool {
        self.end < self.start
    }

    /// Check whether the selection crosses at least one row boundary.
    pub fn spans_rows(&self) -> bool {
        self.start.row != self.end.row
    }
}

/// The committed state of an editor.
///
/// Replaced wholesale on every commit, never mutated in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub text_content: String,
    pub selection: Selection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_start_row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewable_rows: Option<usize>,
}

impl EditorState {
    /// Number of rows in the text buffer. An empty buffer still has one row.
    pub fn row_count(&self) -> usize {
        self.text_content.split('\n').count()
    }

    /// Row indices inside the configured view window, clamped to the buffer.
    pub fn view_window(&self) -> Range<usize> {
        let rows = self.row_count();
        let start = self.view_start_row.unwrap_or(0).min(rows);
        let end = match self.viewable_rows {
            Some(count) => start.saturating_add(count).min(rows),
            None => rows,
        };
        start..end
    }

    /// Copy of this state with different text.
    pub fn with_text(&self, text_content: impl Into<String>) -> Self {
        Self {
            text_content: text_content.into(),
            ..self.clone()
        }
    }

    /// Copy of this state with a different selection.
    pub fn with_selection(&self, selection: Selection) -> Self {
        Self {
            selection,
            ..self.clone()
        }
    }
}

/// Construction-time configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub init_text_content: String,
    pub view_start_row: Option<usize>,
    pub viewable_rows: Option<usize>,
}

impl EditorConfig {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            init_text_content: text.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_order_is_row_major() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
        assert_eq!(Position::new(1, 1), Position::new(1, 1));
    }

    #[test]
    fn test_selection_bounds() {
        // Forward selection
        let sel = Selection::new(Position::new(0, 1), Position::new(1, 2));
        assert_eq!(sel.range_start(), Position::new(0, 1));
        assert_eq!(sel.range_end(), Position::new(1, 2));
        assert!(!sel.is_backward());

        // Backward selection
        let sel = Selection::new(Position::new(1, 2), Position::new(0, 1));
        assert_eq!(sel.range_start(), Position::new(0, 1));
        assert_eq!(sel.range_end(), Position::new(1, 2));
        assert!(sel.is_backward());
        assert!(sel.spans_rows());
    }

    #[test]
    fn test_normalized_is_reading_order() {
        let sel = Selection::new(Position::new(3, 0), Position::new(2, 5));
        let norm = sel.normalized();
        assert!(norm.start <= norm.end);
        assert!(!norm.is_backward());
    }

    #[test]
    fn test_caret_is_collapsed() {
        let sel = Selection::caret(Position::new(4, 2));
        assert!(sel.is_collapsed());
        assert!(!sel.is_backward());
        assert!(!sel.spans_rows());
    }

    #[test]
    fn test_view_window() {
        let state = EditorState {
            text_content: "a\nb\nc\nd".to_string(),
            view_start_row: Some(1),
            viewable_rows: Some(2),
            ..Default::default()
        };
        assert_eq!(state.view_window(), 1..3);

        let state = EditorState {
            text_content: "a\nb".to_string(),
            view_start_row: Some(1),
            viewable_rows: Some(10),
            ..Default::default()
        };
        assert_eq!(state.view_window(), 1..2);

        assert_eq!(EditorState::default().view_window(), 0..1);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"initTextContent":"hi","viewableRows":3}"#).unwrap();
        assert_eq!(config.init_text_content, "hi");
        assert_eq!(config.view_start_row, None);
        assert_eq!(config.viewable_rows, Some(3));
    }
}
