//! Text edit operations on the canonical buffer.
//!
//! Pure functions: each takes the current buffer and returns a new one. The
//! controller uses them for the keys hosts handle inconsistently, computing
//! the result directly instead of reading back whatever the host produced.

use ropey::Rope;

use crate::types::{Position, Selection};

/// Which side of the position `remove_at` deletes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, miette::Diagnostic)]
pub enum EditError {
    #[error("position {}:{} is outside the text", .0.row, .0.column)]
    #[diagnostic(code(lighditor::edit::out_of_bounds))]
    OutOfBounds(Position),
}

fn rope_index(rope: &Rope, position: Position) -> Option<usize> {
    if position.row >= rope.len_lines() {
        return None;
    }
    let line = rope.line(position.row);
    let mut row_len = line.len_chars();
    if position.row + 1 < rope.len_lines() {
        // Line includes its trailing '\n'.
        row_len -= 1;
    }
    if position.column > row_len {
        return None;
    }
    Some(rope.line_to_char(position.row) + position.column)
}

/// Char index of `position` in `text`.
///
/// Equal to the lengths of all preceding rows plus one separator each, plus
/// the column. `None` when the row does not exist or the column is past the
/// end of the row.
pub fn char_index(text: &str, position: Position) -> Option<usize> {
    rope_index(&Rope::from_str(text), position)
}

/// Inverse of `char_index`. Indices past the end clamp to the end.
pub fn position_at(text: &str, index: usize) -> Position {
    let rope = Rope::from_str(text);
    let index = index.min(rope.len_chars());
    let row = rope.char_to_line(index);
    Position::new(row, index - rope.line_to_char(row))
}

/// Insert `inserted` at `position`.
pub fn insert_at(text: &str, position: Position, inserted: &str) -> Result<String, EditError> {
    let mut rope = Rope::from_str(text);
    let index = rope_index(&rope, position).ok_or(EditError::OutOfBounds(position))?;
    rope.insert(index, inserted);
    Ok(rope.to_string())
}

/// Remove the char immediately left or right of `position`.
///
/// Removing left of the first char or right of the last is a no-op.
pub fn remove_at(text: &str, position: Position, direction: Direction) -> Result<String, EditError> {
    let mut rope = Rope::from_str(text);
    let index = rope_index(&rope, position).ok_or(EditError::OutOfBounds(position))?;
    let range = match direction {
        Direction::Left if index > 0 => index - 1..index,
        Direction::Right if index < rope.len_chars() => index..index + 1,
        _ => return Ok(text.to_string()),
    };
    rope.remove(range);
    Ok(rope.to_string())
}

/// Remove everything between the selection's endpoints.
pub fn remove_range(text: &str, selection: &Selection) -> Result<String, EditError> {
    let mut rope = Rope::from_str(text);
    let start = selection.range_start();
    let end = selection.range_end();
    let from = rope_index(&rope, start).ok_or(EditError::OutOfBounds(start))?;
    let to = rope_index(&rope, end).ok_or(EditError::OutOfBounds(end))?;
    rope.remove(from..to);
    Ok(rope.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: usize, column: usize) -> Position {
        Position::new(row, column)
    }

    #[test]
    fn test_char_index() {
        let text = "abc\nde\n\nf";
        assert_eq!(char_index(text, pos(0, 0)), Some(0));
        assert_eq!(char_index(text, pos(0, 3)), Some(3));
        assert_eq!(char_index(text, pos(1, 0)), Some(4));
        assert_eq!(char_index(text, pos(1, 2)), Some(6));
        assert_eq!(char_index(text, pos(2, 0)), Some(7));
        assert_eq!(char_index(text, pos(3, 1)), Some(9));
        assert_eq!(char_index(text, pos(0, 4)), None);
        assert_eq!(char_index(text, pos(4, 0)), None);
    }

    #[test]
    fn test_char_index_empty_and_trailing_row() {
        assert_eq!(char_index("", pos(0, 0)), Some(0));
        assert_eq!(char_index("ab\n", pos(1, 0)), Some(3));
        assert_eq!(char_index("ab\n", pos(2, 0)), None);
    }

    #[test]
    fn test_char_index_strictly_increasing() {
        let text = "héllo\n\nwörld\nx";
        let mut positions = Vec::new();
        for (row, line) in text.split('\n').enumerate() {
            for column in 0..=line.chars().count() {
                positions.push(pos(row, column));
            }
        }
        let indices: Vec<usize> = positions
            .iter()
            .map(|p| char_index(text, *p).unwrap())
            .collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*indices.last().unwrap(), text.chars().count());
    }

    #[test]
    fn test_position_at_inverts_char_index() {
        let text = "abc\nde\n\nf";
        for index in 0..=text.chars().count() {
            let p = position_at(text, index);
            assert_eq!(char_index(text, p), Some(index));
        }
        assert_eq!(position_at(text, 100), pos(3, 1));
    }

    #[test]
    fn test_insert_then_remove_is_identity() {
        let text = "abc\nde";
        for p in [pos(0, 0), pos(0, 2), pos(1, 0), pos(1, 2)] {
            let inserted = insert_at(text, p, "x").unwrap();
            assert_eq!(remove_at(&inserted, p, Direction::Right).unwrap(), text);
            let after = p.offset_column(1);
            assert_eq!(remove_at(&inserted, after, Direction::Left).unwrap(), text);
        }
    }

    #[test]
    fn test_insert_newline() {
        assert_eq!(insert_at("ab", pos(0, 2), "\n").unwrap(), "ab\n");
        assert_eq!(insert_at("abcd", pos(0, 2), "\n").unwrap(), "ab\ncd");
        assert_eq!(
            insert_at("ab", pos(1, 0), "x"),
            Err(EditError::OutOfBounds(pos(1, 0)))
        );
    }

    #[test]
    fn test_remove_at_row_boundary_joins_rows() {
        assert_eq!(remove_at("abc\nde", pos(1, 0), Direction::Left).unwrap(), "abcde");
        assert_eq!(remove_at("abc\nde", pos(0, 3), Direction::Right).unwrap(), "abcde");
    }

    #[test]
    fn test_remove_at_edges_is_noop() {
        assert_eq!(remove_at("abc", pos(0, 0), Direction::Left).unwrap(), "abc");
        assert_eq!(remove_at("abc", pos(0, 3), Direction::Right).unwrap(), "abc");
    }

    #[test]
    fn test_remove_range_either_direction() {
        let forward = Selection::new(pos(0, 1), pos(1, 1));
        let backward = Selection::new(pos(1, 1), pos(0, 1));
        assert_eq!(remove_range("abc\nde", &forward).unwrap(), "ae");
        assert_eq!(remove_range("abc\nde", &backward).unwrap(), "ae");
        assert_eq!(
            remove_range("abc\nde", &Selection::caret(pos(0, 1))).unwrap(),
            "abc\nde"
        );
    }
}
