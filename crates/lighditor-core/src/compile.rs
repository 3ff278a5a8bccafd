//! Tree-to-text compilation.
//!
//! Reads the rendering tree after the host has mutated it and produces the
//! canonical text buffer. Host inconsistencies are repaired locally and logged;
//! compilation never fails.

use crate::platform::RenderTree;
use crate::walker::{StepKind, Walker};

#[derive(Default)]
struct RowBuf {
    text: String,
    /// Length of `text` in chars.
    len: usize,
    /// An overlap was seen; the row accepts no more content.
    truncated: bool,
}

fn ensure_row(rows: &mut Vec<RowBuf>, row: usize) {
    if rows.len() <= row {
        rows.resize_with(row + 1, RowBuf::default);
    }
}

/// Compile the rendering tree into the canonical text buffer.
///
/// Rows are joined with `\n`. A row exists once a container, marker or text
/// leaf lands on it, so a marker at the very end of the tree does not produce a
/// trailing empty row.
pub fn compile<T: RenderTree>(tree: &T) -> String {
    let mut rows: Vec<RowBuf> = Vec::new();

    for step in Walker::new(tree) {
        match step.kind {
            StepKind::Other => {}
            StepKind::RowContainer | StepKind::LineBreak => ensure_row(&mut rows, step.row),
            StepKind::Text { .. } => {
                ensure_row(&mut rows, step.row);
                let Some(content) = tree.text(&step.node) else {
                    continue;
                };

                if !step.in_row {
                    tracing::debug!(
                        row = step.row,
                        text = %content.escape_debug(),
                        "compile: text leaf outside any row container, joining current row"
                    );
                }

                let buf = &mut rows[step.row];
                if buf.truncated {
                    continue;
                }

                if buf.len < step.column {
                    let missing = step.column - buf.len;
                    tracing::warn!(
                        row = step.row,
                        column = step.column,
                        missing,
                        "compile: row has unassigned characters, filling with spaces"
                    );
                    buf.text.extend(std::iter::repeat_n(' ', missing));
                    buf.len = step.column;
                } else if buf.len > step.column {
                    tracing::error!(
                        row = step.row,
                        column = step.column,
                        existing = buf.len,
                        "compile: row already has a character at column, truncating row"
                    );
                    buf.truncated = true;
                    continue;
                }

                buf.len += content.chars().count();
                buf.text.push_str(&content);
            }
        }
    }

    let compiled: Vec<String> = rows.into_iter().map(|r| r.text).collect();
    compiled.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::{MemSurface, MemTreeBuilder, NodeId};
    use crate::platform::{EditSurface, render_rows};
    use smol_str::SmolStr;

    /// Wraps a memory tree but lies about one leaf's length, the way a host
    /// that reports stale lengths would.
    struct SkewedTree {
        inner: MemSurface,
        leaf: NodeId,
        reported_len: usize,
    }

    impl RenderTree for SkewedTree {
        type Node = NodeId;

        fn root(&self) -> NodeId {
            self.inner.root()
        }
        fn parent(&self, node: &NodeId) -> Option<NodeId> {
            self.inner.parent(node)
        }
        fn children(&self, node: &NodeId) -> Vec<NodeId> {
            self.inner.children(node)
        }
        fn text(&self, node: &NodeId) -> Option<SmolStr> {
            self.inner.text(node)
        }
        fn is_row_container(&self, node: &NodeId) -> bool {
            self.inner.is_row_container(node)
        }
        fn is_line_break(&self, node: &NodeId) -> bool {
            self.inner.is_line_break(node)
        }
        fn text_len(&self, node: &NodeId) -> usize {
            if *node == self.leaf {
                self.reported_len
            } else {
                self.inner.text_len(node)
            }
        }
    }

    #[test]
    fn test_compile_container_rows() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("ab").span(|s| s.text("c")))
            .row(|r| r.text("de"))
            .build();
        insta::assert_snapshot!(compile(&tree), @r"
        abc
        de
        ");
    }

    #[test]
    fn test_compile_marker_rows() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("ab").line_break().text("cd"))
            .build();
        assert_eq!(compile(&tree), "ab\ncd");
    }

    #[test]
    fn test_trailing_marker_dropped() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("ab").line_break())
            .build();
        assert_eq!(compile(&tree), "ab");
    }

    #[test]
    fn test_empty_rows_survive() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("ab"))
            .row(|r| r.line_break())
            .row(|r| r.text("cd"))
            .build();
        assert_eq!(compile(&tree), "ab\n\ncd");
    }

    #[test]
    fn test_empty_tree_is_empty_text() {
        let tree = MemTreeBuilder::new().build();
        assert_eq!(compile(&tree), "");
    }

    #[test]
    fn test_round_trip() {
        for text in ["", "a", "ab\ncd", "ab\n\ncd", "\nlead", "x\ny\nz", "ab\n", "héllo\nwörld"] {
            let mut surface = MemSurface::new();
            surface.rebuild(&render_rows(text)).unwrap();
            assert_eq!(compile(&surface), text, "round trip of {text:?}");
        }
    }

    #[test]
    fn test_stray_leaf_does_not_corrupt_next_row() {
        let tree = MemTreeBuilder::new()
            .row(|r| r.text("ab"))
            .text("xy")
            .row(|r| r.text("cd"))
            .build();
        let compiled = compile(&tree);
        let rows: Vec<&str> = compiled.split('\n').collect();
        assert_eq!(rows[1], "cd");
    }

    #[test]
    fn test_stray_leaf_after_rendered_marker() {
        let mut surface = MemSurface::new();
        surface.rebuild(&render_rows("ab\ncd")).unwrap();
        let first_row = surface.children(&surface.root())[0];
        surface
            .insert_after(first_row, crate::mem::MemNodeKind::Text("xy".into()))
            .unwrap();
        assert_eq!(compile(&surface), "abxy\ncd");
    }

    #[test]
    fn test_gap_is_backfilled_with_spaces() {
        let inner = MemTreeBuilder::new()
            .row(|r| r.text("ab").text("c"))
            .build();
        let leaf = inner.find_text("ab").unwrap();
        let tree = SkewedTree {
            inner,
            leaf,
            reported_len: 4,
        };
        assert_eq!(compile(&tree), "ab  c");
    }

    #[test]
    fn test_overlap_truncates_row_only() {
        let inner = MemTreeBuilder::new()
            .row(|r| r.text("abc").text("d").text("e"))
            .row(|r| r.text("fg"))
            .build();
        let leaf = inner.find_text("abc").unwrap();
        let tree = SkewedTree {
            inner,
            leaf,
            reported_len: 1,
        };
        assert_eq!(compile(&tree), "abc\nfg");
    }
}
