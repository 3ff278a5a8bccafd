//! Row resolution: from a tree node to the row container holding it.

use crate::platform::RenderTree;
use crate::walker::{StepKind, Walker};

/// The row container enclosing a node, and that container's row index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowInfo<N> {
    pub container: N,
    pub row: usize,
}

/// Find the nearest row container at or above `node`.
///
/// Returns `None` when `node` is the editing root or not inside any row
/// container (bare text under the root, or a node outside the editor).
pub fn enclosing_row_container<T: RenderTree>(tree: &T, node: &T::Node) -> Option<T::Node> {
    let root = tree.root();
    let mut current = node.clone();
    loop {
        if current == root {
            return None;
        }
        if tree.is_row_container(&current) {
            return Some(current);
        }
        current = tree.parent(&current)?;
    }
}

/// Resolve the row container for `node` and its row index.
///
/// The index counts the rows opened before the container in document order,
/// so preceding sibling containers, containers nested inside them and interior
/// line-break markers all shift it.
pub fn row_info<T: RenderTree>(tree: &T, node: &T::Node) -> Option<RowInfo<T::Node>> {
    let container = enclosing_row_container(tree, node)?;
    let row = Walker::new(tree)
        .find(|step| step.kind == StepKind::RowContainer && step.node == container)
        .map(|step| step.row)?;
    Some(RowInfo { container, row })
}

/// Direct indexed lookup of the row container for `row`.
///
/// Only meaningful on a tree in canonical shape (one container per row
/// directly under the root), which is what the engine renders.
pub fn row_container<T: RenderTree>(tree: &T, row: usize) -> Option<T::Node> {
    tree.children(&tree.root())
        .into_iter()
        .nth(row)
        .filter(|node| tree.is_row_container(node))
}
