//! Depth-first walk over a rendering tree with row/column bookkeeping.
//!
//! The walker is the single place where row boundaries are decided. The
//! compiler, the row resolver and both directions of the position mapper read
//! rows through it, so they can never disagree about which row a node is on.
//!
//! Row rules:
//! - a row container starts a new row, unless the current row was opened
//!   without any content yet (by a preceding line-break marker, an empty or an
//!   enclosing container), in which case it continues that row;
//! - a line-break marker is reported on the row it ends, then opens the next;
//! - text outside any container joins the current row, except on a row that a
//!   container's trailing marker just opened: there it stays on the marker's
//!   row so the row stays open for the next container.

use crate::platform::RenderTree;

/// What the walker found at a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    RowContainer,
    LineBreak,
    Text { len: usize },
    Other,
}

/// One visited node with the row and column it sits at.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<N> {
    pub node: N,
    pub kind: StepKind,
    pub row: usize,
    pub column: usize,
    /// Whether the node is inside (or is) a row container.
    pub in_row: bool,
}

impl<N> Step<N> {
    /// Chars covered by this step.
    pub fn len(&self) -> usize {
        match self.kind {
            StepKind::Text { len } => len,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, StepKind::Text { .. })
    }
}

/// Pre-order iterator over a subtree.
///
/// Children are pushed in reverse so the first child is processed first.
pub struct Walker<'a, T: RenderTree> {
    tree: &'a T,
    stack: Vec<(T::Node, bool)>,
    first_row: usize,
    row: Option<usize>,
    column: usize,
    /// The current row has been opened but holds no content yet.
    row_open: bool,
    /// Column where an in-container marker ended the previous row, while the
    /// row it opened is still empty.
    marker_end: Option<usize>,
}

impl<'a, T: RenderTree> Walker<'a, T> {
    /// Walk the whole tree from its editing root.
    pub fn new(tree: &'a T) -> Self {
        Self::from_row(tree, tree.root(), 0)
    }

    /// Walk the subtree at `start`, numbering the first row `row`.
    pub fn from_row(tree: &'a T, start: T::Node, row: usize) -> Self {
        let in_row = tree.is_row_container(&start);
        Self {
            tree,
            stack: vec![(start, in_row)],
            first_row: row,
            row: None,
            column: 0,
            row_open: false,
            marker_end: None,
        }
    }

    /// Row the walker is on now, opening the first row if needed.
    fn current_row(&mut self) -> usize {
        match self.row {
            Some(row) => row,
            None => {
                self.row = Some(self.first_row);
                self.row_open = true;
                self.first_row
            }
        }
    }

    fn enter_row_container(&mut self) -> usize {
        let row = match self.row {
            None => self.first_row,
            Some(row) if self.row_open => row,
            Some(row) => row + 1,
        };
        self.row = Some(row);
        self.row_open = true;
        self.marker_end = None;
        self.column = 0;
        row
    }
}

impl<T: RenderTree> Iterator for Walker<'_, T> {
    type Item = Step<T::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, parent_in_row) = self.stack.pop()?;
        let tree = self.tree;

        let is_container = tree.is_row_container(&node);
        let in_row = parent_in_row || is_container;

        let step = if is_container {
            let row = self.enter_row_container();
            Step {
                node: node.clone(),
                kind: StepKind::RowContainer,
                row,
                column: 0,
                in_row,
            }
        } else if tree.is_line_break(&node) {
            let row = self.current_row();
            let step = Step {
                node: node.clone(),
                kind: StepKind::LineBreak,
                row,
                column: self.column,
                in_row,
            };
            self.row = Some(row + 1);
            self.row_open = true;
            self.marker_end = in_row.then_some(self.column);
            self.column = 0;
            step
        } else if let (Some(end), Some(row), false) = (self.marker_end, self.row, in_row)
            && tree.is_text(&node)
        {
            let len = tree.text_len(&node);
            self.marker_end = Some(end + len);
            Step {
                node: node.clone(),
                kind: StepKind::Text { len },
                row: row - 1,
                column: end,
                in_row,
            }
        } else if tree.is_text(&node) {
            let len = tree.text_len(&node);
            let row = self.current_row();
            let step = Step {
                node: node.clone(),
                kind: StepKind::Text { len },
                row,
                column: self.column,
                in_row,
            };
            self.column += len;
            if len > 0 {
                self.row_open = false;
                self.marker_end = None;
            }
            step
        } else {
            Step {
                node: node.clone(),
                kind: StepKind::Other,
                row: self.row.unwrap_or(self.first_row),
                column: self.column,
                in_row,
            }
        };

        for child in tree.children(&node).into_iter().rev() {
            self.stack.push((child, in_row));
        }

        Some(step)
    }
}

/// Visit every node in walk order until `visitor` returns true.
///
/// Returns whether the visitor halted the walk.
pub fn walk<T, F>(tree: &T, mut visitor: F) -> bool
where
    T: RenderTree,
    F: FnMut(&Step<T::Node>) -> bool,
{
    for step in Walker::new(tree) {
        if visitor(&step) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::{MemSurface, MemTreeBuilder};

    fn text_steps(tree: &MemSurface) -> Vec<(String, usize, usize)> {
        Walker::new(tree)
            .filter(|s| s.is_text())
            .map(|s| (tree.text(&s.node).unwrap().to_string(), s.row, s.column))
            .collect()
    }

    #[test]
    fn test_containers_number_rows_in_order() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("ab").text("c"))
            .row(|r| r.text("de"))
            .build();
        assert_eq!(
            text_steps(&tree),
            vec![
                ("ab".to_string(), 0, 0),
                ("c".to_string(), 0, 2),
                ("de".to_string(), 1, 0),
            ]
        );
    }

    #[test]
    fn test_line_break_splits_collapsed_container() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("ab").line_break().text("cd"))
            .row(|r| r.text("ef"))
            .build();
        assert_eq!(
            text_steps(&tree),
            vec![
                ("ab".to_string(), 0, 0),
                ("cd".to_string(), 1, 0),
                ("ef".to_string(), 2, 0),
            ]
        );
    }

    #[test]
    fn test_trailing_marker_does_not_double_count() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("ab").line_break())
            .row(|r| r.line_break())
            .row(|r| r.text("cd"))
            .build();
        let rows: Vec<_> = Walker::new(&tree)
            .filter(|s| s.kind == StepKind::RowContainer)
            .map(|s| s.row)
            .collect();
        assert_eq!(rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_nested_container_after_content_is_new_row() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("ab").row(|n| n.text("cd")))
            .row(|r| r.text("ef"))
            .build();
        assert_eq!(
            text_steps(&tree),
            vec![
                ("ab".to_string(), 0, 0),
                ("cd".to_string(), 1, 0),
                ("ef".to_string(), 2, 0),
            ]
        );
    }

    #[test]
    fn test_wrapping_container_continues_row() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.row(|n| n.text("ab")))
            .row(|r| r.text("cd"))
            .build();
        assert_eq!(
            text_steps(&tree),
            vec![("ab".to_string(), 0, 0), ("cd".to_string(), 1, 0)]
        );
    }

    #[test]
    fn test_bare_text_before_rows_opens_row_zero() {
        let tree = MemTreeBuilder::new()
            .text("xy")
            .row(|r| r.text("cd"))
            .build();
        let steps: Vec<_> = Walker::new(&tree).filter(|s| s.is_text()).collect();
        assert_eq!((steps[0].row, steps[0].in_row), (0, false));
        assert_eq!((steps[1].row, steps[1].in_row), (1, true));
    }

    #[test]
    fn test_stray_text_after_marker_keeps_next_row() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("ab").line_break())
            .text("xy")
            .row(|r| r.text("cd"))
            .build();
        assert_eq!(
            text_steps(&tree),
            vec![
                ("ab".to_string(), 0, 0),
                ("xy".to_string(), 0, 2),
                ("cd".to_string(), 1, 0),
            ]
        );
    }

    #[test]
    fn test_root_level_marker_still_splits_bare_text() {
        let tree = MemTreeBuilder::new()
            .text("ab")
            .line_break()
            .text("cd")
            .build();
        assert_eq!(
            text_steps(&tree),
            vec![("ab".to_string(), 0, 0), ("cd".to_string(), 1, 0)]
        );
    }

    #[test]
    fn test_walk_halts_on_true() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("a"))
            .row(|r| r.text("b"))
            .build();
        let mut visited = 0;
        let halted = walk(&tree, |step| {
            visited += 1;
            step.is_text()
        });
        assert!(halted);
        // root, first row, first text
        assert_eq!(visited, 3);
    }

    #[test]
    fn test_from_row_offsets_numbering() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("a"))
            .row(|r| r.text("b").line_break().text("c"))
            .build();
        let container = tree.children(&tree.root())[1];
        let steps: Vec<_> = Walker::from_row(&tree, container, 1)
            .filter(|s| s.is_text())
            .map(|s| (s.row, s.column))
            .collect();
        assert_eq!(steps, vec![(1, 0), (2, 0)]);
    }
}
