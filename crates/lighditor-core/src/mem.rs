//! In-memory rendering surface.
//!
//! An arena-backed tree implementing `RenderTree` and `EditSurface` without
//! any platform. Used by the test suites, and usable by headless hosts. The
//! mutation helpers let tests play the part of the host and reshape the tree
//! the way browsers do between events.

use smol_str::SmolStr;

use crate::platform::{
    Boundary, EditSurface, PlatformError, PlatformSelection, RenderRow, RenderTree,
};

/// Handle to a node in a `MemSurface`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemNodeKind {
    Root,
    Row,
    LineBreak,
    Text(SmolStr),
    /// Any other element, e.g. an inline span the host wrapped text in.
    Element,
}

#[derive(Clone, Debug)]
struct MemNode {
    kind: MemNodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena tree plus a platform-style selection.
#[derive(Clone, Debug)]
pub struct MemSurface {
    nodes: Vec<MemNode>,
    selection: Option<(Boundary<NodeId>, Boundary<NodeId>)>,
    rebuilds: usize,
}

impl Default for MemSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemSurface {
    /// An empty surface: a root with no children.
    pub fn new() -> Self {
        Self {
            nodes: vec![MemNode {
                kind: MemNodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
            selection: None,
            rebuilds: 0,
        }
    }

    pub fn kind(&self, node: NodeId) -> &MemNodeKind {
        &self.nodes[node.0].kind
    }

    /// Number of times `rebuild` ran.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Append a new node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, kind: MemNodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(MemNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Insert a new node as a sibling right after `node`.
    pub fn insert_after(&mut self, node: NodeId, kind: MemNodeKind) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let idx = self.nodes[parent.0].children.iter().position(|c| *c == node)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(MemNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.insert(idx + 1, id);
        Some(id)
    }

    /// Detach `node` (and its subtree) from the tree.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    /// Replace the content of a text leaf. No-op for other nodes.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let MemNodeKind::Text(content) = &mut self.nodes[node.0].kind {
            *content = SmolStr::new(text);
        }
    }

    /// Insert `text` into a text leaf at a char offset, like a keystroke would.
    pub fn insert_text(&mut self, node: NodeId, char_offset: usize, text: &str) {
        if let Some(current) = self.text(&node) {
            let byte = char_to_byte(&current, char_offset);
            let mut updated = current.to_string();
            updated.insert_str(byte, text);
            self.set_text(node, &updated);
        }
    }

    /// Delete `count` chars from a text leaf starting at `char_offset`.
    pub fn delete_text(&mut self, node: NodeId, char_offset: usize, count: usize) {
        if let Some(current) = self.text(&node) {
            let updated: String = current
                .chars()
                .enumerate()
                .filter(|(idx, _)| *idx < char_offset || *idx >= char_offset + count)
                .map(|(_, c)| c)
                .collect();
            self.set_text(node, &updated);
        }
    }

    /// First text leaf (in document order) whose content equals `text`.
    pub fn find_text(&self, text: &str) -> Option<NodeId> {
        self.preorder()
            .into_iter()
            .find(|id| matches!(&self.nodes[id.0].kind, MemNodeKind::Text(t) if t == text))
    }

    /// Simulate the user placing the caret.
    pub fn set_caret(&mut self, node: NodeId, offset: usize) {
        let at = Boundary::new(node, offset);
        self.selection = Some((at.clone(), at));
    }

    /// Simulate the user dragging from `anchor` to `focus`.
    pub fn set_selection(&mut self, anchor: Boundary<NodeId>, focus: Boundary<NodeId>) {
        self.selection = Some((anchor, focus));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Current `(anchor, focus)` boundaries.
    pub fn selected(&self) -> Option<(Boundary<NodeId>, Boundary<NodeId>)> {
        self.selection.clone()
    }

    fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId(0)];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    fn document_order(&self, boundary: &Boundary<NodeId>) -> (usize, usize) {
        let index = self
            .preorder()
            .iter()
            .position(|id| *id == boundary.node)
            .unwrap_or(usize::MAX);
        (index, boundary.offset)
    }
}

fn char_to_byte(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

impl RenderTree for MemSurface {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn text(&self, node: &NodeId) -> Option<SmolStr> {
        match &self.nodes.get(node.0)?.kind {
            MemNodeKind::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    fn is_row_container(&self, node: &NodeId) -> bool {
        matches!(self.nodes.get(node.0).map(|n| &n.kind), Some(MemNodeKind::Row))
    }

    fn is_line_break(&self, node: &NodeId) -> bool {
        matches!(
            self.nodes.get(node.0).map(|n| &n.kind),
            Some(MemNodeKind::LineBreak)
        )
    }
}

impl EditSurface for MemSurface {
    fn selection(&self) -> Option<PlatformSelection<NodeId>> {
        let (anchor, focus) = self.selection.as_ref()?;
        let backward = self.document_order(focus) < self.document_order(anchor);
        let (start, end) = if backward {
            (focus, anchor)
        } else {
            (anchor, focus)
        };
        Some(PlatformSelection {
            anchor: anchor.node,
            focus: focus.node,
            start_offset: start.offset,
            end_offset: end.offset,
            backward,
        })
    }

    fn select(
        &mut self,
        start: Boundary<NodeId>,
        end: Boundary<NodeId>,
        backward: bool,
    ) -> Result<(), PlatformError> {
        for boundary in [&start, &end] {
            if boundary.node.0 >= self.nodes.len() {
                return Err(format!("unknown node {:?}", boundary.node).into());
            }
        }
        self.selection = Some(if backward { (end, start) } else { (start, end) });
        Ok(())
    }

    fn rebuild(&mut self, rows: &[RenderRow<'_>]) -> Result<(), PlatformError> {
        let root = self.root();
        for child in self.children(&root) {
            self.remove(child);
        }
        for row in rows {
            let container = self.append(root, MemNodeKind::Row);
            if !row.text.is_empty() {
                self.append(container, MemNodeKind::Text(SmolStr::new(row.text)));
            }
            if row.line_break {
                self.append(container, MemNodeKind::LineBreak);
            }
        }
        self.selection = None;
        self.rebuilds += 1;
        Ok(())
    }
}

/// Builder for hand-shaped trees, including shapes only a host would make.
pub struct MemTreeBuilder {
    surface: MemSurface,
    parent: NodeId,
}

impl Default for MemTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MemTreeBuilder {
    pub fn new() -> Self {
        Self {
            surface: MemSurface::new(),
            parent: NodeId(0),
        }
    }

    fn nested(self, kind: MemNodeKind, f: impl FnOnce(MemTreeBuilder) -> MemTreeBuilder) -> Self {
        let MemTreeBuilder {
            mut surface,
            parent,
        } = self;
        let id = surface.append(parent, kind);
        let inner = f(MemTreeBuilder {
            surface,
            parent: id,
        });
        MemTreeBuilder {
            surface: inner.surface,
            parent,
        }
    }

    /// Add a row container and fill it with `f`.
    pub fn row(self, f: impl FnOnce(MemTreeBuilder) -> MemTreeBuilder) -> Self {
        self.nested(MemNodeKind::Row, f)
    }

    /// Add a plain element and fill it with `f`.
    pub fn span(self, f: impl FnOnce(MemTreeBuilder) -> MemTreeBuilder) -> Self {
        self.nested(MemNodeKind::Element, f)
    }

    pub fn text(mut self, text: &str) -> Self {
        self.surface
            .append(self.parent, MemNodeKind::Text(SmolStr::new(text)));
        self
    }

    pub fn line_break(mut self) -> Self {
        self.surface.append(self.parent, MemNodeKind::LineBreak);
        self
    }

    pub fn build(self) -> MemSurface {
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::render_rows;

    #[test]
    fn test_rebuild_shape() {
        let mut surface = MemSurface::new();
        surface.rebuild(&render_rows("ab\n\ncd")).unwrap();
        let rows = surface.children(&surface.root());
        assert_eq!(rows.len(), 3);
        let kinds: Vec<Vec<MemNodeKind>> = rows
            .iter()
            .map(|r| {
                surface
                    .children(r)
                    .iter()
                    .map(|c| surface.kind(*c).clone())
                    .collect()
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                vec![MemNodeKind::Text("ab".into()), MemNodeKind::LineBreak],
                vec![MemNodeKind::LineBreak],
                vec![MemNodeKind::Text("cd".into())],
            ]
        );
        assert_eq!(surface.rebuild_count(), 1);
    }

    #[test]
    fn test_rebuild_detaches_old_nodes() {
        let mut surface = MemSurface::new();
        surface.rebuild(&render_rows("old")).unwrap();
        let old = surface.find_text("old").unwrap();
        surface.rebuild(&render_rows("new")).unwrap();
        assert_eq!(surface.find_text("old"), None);
        let old_row = surface.parent(&old).unwrap();
        assert_eq!(surface.parent(&old_row), None);
        assert!(surface.find_text("new").is_some());
    }

    #[test]
    fn test_selection_offsets_in_reading_order() {
        let mut surface = MemSurface::new();
        surface.rebuild(&render_rows("ab\ncd")).unwrap();
        let ab = surface.find_text("ab").unwrap();
        let cd = surface.find_text("cd").unwrap();
        surface.set_selection(Boundary::new(cd, 1), Boundary::new(ab, 2));
        let sel = surface.selection().unwrap();
        assert_eq!(sel.anchor, cd);
        assert_eq!(sel.focus, ab);
        assert_eq!((sel.start_offset, sel.end_offset), (2, 1));
        assert!(sel.backward);
    }

    #[test]
    fn test_selection_direction_within_one_leaf() {
        let mut surface = MemSurface::new();
        surface.rebuild(&render_rows("hello")).unwrap();
        let hello = surface.find_text("hello").unwrap();
        surface.set_selection(Boundary::new(hello, 4), Boundary::new(hello, 1));
        let sel = surface.selection().unwrap();
        assert_eq!((sel.start_offset, sel.end_offset), (1, 4));
        assert!(sel.backward);
    }

    #[test]
    fn test_text_edits() {
        let mut surface = MemTreeBuilder::new().row(|r| r.text("héllo")).build();
        let leaf = surface.find_text("héllo").unwrap();
        surface.insert_text(leaf, 2, "XY");
        assert_eq!(surface.text(&leaf).unwrap(), "héXYllo");
        surface.delete_text(leaf, 0, 3);
        assert_eq!(surface.text(&leaf).unwrap(), "Yllo");
    }
}
