//! DOM adapter for the rendering tree.
//!
//! `DomSurface` exposes a `contenteditable` element to the core as a
//! `RenderTree`/`EditSurface`. Row containers are block elements directly or
//! indirectly under the root, line-break markers are `<br>` elements. The DOM
//! measures offsets in UTF-16 code units; everything handed to the core is in
//! chars, so offsets are converted here and nowhere else.

use lighditor_core::{
    Boundary, EditSurface, PlatformError, PlatformSelection, RenderRow, RenderTree,
};
use smol_str::SmolStr;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node};

/// Attribute tagging nodes the engine rendered.
pub const TYPE_ATTR: &str = "data-lighditor-type";
pub const ROW_CLASS: &str = "lighditorRow";

const ROW_TYPE: &str = "row";
/// `<br>` keeping an empty last row tall enough to hold a caret.
const PLACEHOLDER_TYPE: &str = "placeholder";

/// Char offset for a UTF-16 offset into `text`. Clamps to the end.
pub fn utf16_to_char(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in text.chars().enumerate() {
        if units >= utf16_offset {
            return idx;
        }
        units += ch.len_utf16();
    }
    text.chars().count()
}

/// UTF-16 offset for a char offset into `text`. Clamps to the end.
pub fn char_to_utf16(text: &str, char_offset: usize) -> usize {
    text.chars().take(char_offset).map(char::len_utf16).sum()
}

fn js_err(context: &str) -> impl Fn(wasm_bindgen::JsValue) -> PlatformError + '_ {
    move |e| PlatformError(format!("{context} failed: {e:?}"))
}

/// The editing root of a mounted editor.
pub struct DomSurface {
    root: HtmlElement,
    root_node: Node,
    document: Document,
}

impl DomSurface {
    pub fn new(root: HtmlElement) -> Result<Self, PlatformError> {
        let document = root.owner_document().ok_or("root has no owner document")?;
        let root_node: Node = root.clone().unchecked_into();
        Ok(Self {
            root,
            root_node,
            document,
        })
    }

    pub fn root_element(&self) -> &HtmlElement {
        &self.root
    }

    fn element<'n>(&self, node: &'n Node) -> Option<&'n Element> {
        node.dyn_ref::<Element>()
    }

    fn type_attr(&self, node: &Node) -> Option<String> {
        self.element(node)?.get_attribute(TYPE_ATTR)
    }

    fn is_br(&self, node: &Node) -> bool {
        self.element(node)
            .map(|el| el.tag_name().eq_ignore_ascii_case("br"))
            .unwrap_or(false)
    }

    fn child_count(&self, node: &Node) -> usize {
        node.child_nodes().length() as usize
    }

    fn index_in_parent(&self, node: &Node) -> Option<(Node, u32)> {
        let parent = node.parent_node()?;
        let siblings = parent.child_nodes();
        (0..siblings.length())
            .find(|&i| siblings.get(i).as_ref() == Some(node))
            .map(|i| (parent, i))
    }

    /// Resolve a DOM selection endpoint down to a leaf and a char offset.
    ///
    /// Element endpoints count children rather than characters; they are
    /// pushed down to the child they point at, or past the last child.
    fn leaf_boundary(&self, node: Node, offset: u32) -> Boundary<Node> {
        let mut node = node;
        let mut offset = offset as usize;
        loop {
            if let Some(text) = node.node_value().filter(|_| node.node_type() == Node::TEXT_NODE)
            {
                let chars = utf16_to_char(&text, offset);
                return Boundary::new(node, chars);
            }
            let children = self.children(&node);
            let Some(last) = children.last().cloned() else {
                return Boundary::new(node, 0);
            };
            if offset < children.len() {
                node = children[offset].clone();
                offset = 0;
            } else {
                offset = match last.node_value() {
                    Some(text) if last.node_type() == Node::TEXT_NODE => {
                        text.encode_utf16().count()
                    }
                    _ => self.child_count(&last),
                };
                node = last;
            }
        }
    }

    /// DOM endpoint for a char boundary.
    fn dom_boundary(&self, boundary: &Boundary<Node>) -> (Node, u32) {
        let node = &boundary.node;
        if let Some(text) = self.text(node) {
            return (node.clone(), char_to_utf16(&text, boundary.offset) as u32);
        }
        // A caret cannot sit inside a <br>; put it just before.
        if self.is_br(node) {
            if let Some(pos) = self.index_in_parent(node) {
                return pos;
            }
        }
        let offset = boundary.offset.min(self.child_count(node));
        (node.clone(), offset as u32)
    }

    fn create_element(&self, tag: &str) -> Result<Element, PlatformError> {
        self.document
            .create_element(tag)
            .map_err(js_err("create_element"))
    }

    fn render_row(&self, row: &RenderRow<'_>) -> Result<Element, PlatformError> {
        let container = self.create_element("div")?;
        container
            .class_list()
            .add_1(ROW_CLASS)
            .map_err(js_err("class_list.add"))?;
        container
            .set_attribute(TYPE_ATTR, ROW_TYPE)
            .map_err(js_err("set_attribute"))?;

        if !row.text.is_empty() {
            let text = self.document.create_text_node(row.text);
            container
                .append_child(&text)
                .map_err(js_err("append_child"))?;
        }
        if row.line_break {
            let marker = self.create_element("br")?;
            container
                .append_child(&marker)
                .map_err(js_err("append_child"))?;
        } else if row.text.is_empty() {
            let placeholder = self.create_element("br")?;
            placeholder
                .set_attribute(TYPE_ATTR, PLACEHOLDER_TYPE)
                .map_err(js_err("set_attribute"))?;
            container
                .append_child(&placeholder)
                .map_err(js_err("append_child"))?;
        }
        Ok(container)
    }
}

impl RenderTree for DomSurface {
    type Node = Node;

    fn root(&self) -> Node {
        self.root_node.clone()
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        if node == &self.root_node {
            return None;
        }
        node.parent_node()
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.get(i)).collect()
    }

    fn text(&self, node: &Node) -> Option<SmolStr> {
        if node.node_type() != Node::TEXT_NODE {
            return None;
        }
        Some(SmolStr::from(node.node_value().unwrap_or_default()))
    }

    fn is_row_container(&self, node: &Node) -> bool {
        if node == &self.root_node {
            return false;
        }
        let Some(el) = self.element(node) else {
            return false;
        };
        if el.get_attribute(TYPE_ATTR).as_deref() == Some(ROW_TYPE) {
            return true;
        }
        // Hosts split rows into bare blocks of their own.
        let tag = el.tag_name();
        tag.eq_ignore_ascii_case("div") || tag.eq_ignore_ascii_case("p")
    }

    fn is_line_break(&self, node: &Node) -> bool {
        self.is_br(node) && self.type_attr(node).as_deref() != Some(PLACEHOLDER_TYPE)
    }
}

impl EditSurface for DomSurface {
    fn selection(&self) -> Option<PlatformSelection<Node>> {
        let window = self.document.default_view()?;
        let selection = window.get_selection().ok()??;
        if selection.range_count() == 0 {
            return None;
        }
        let anchor_node = selection.anchor_node()?;
        let focus_node = selection.focus_node()?;
        if !self.root_node.contains(Some(&anchor_node))
            || !self.root_node.contains(Some(&focus_node))
        {
            tracing::trace!("selection is outside the editor");
            return None;
        }

        let anchor = self.leaf_boundary(anchor_node, selection.anchor_offset());
        let focus = self.leaf_boundary(focus_node, selection.focus_offset());

        let focus_first = if anchor.node == focus.node {
            focus.offset < anchor.offset
        } else {
            anchor.node.compare_document_position(&focus.node) & Node::DOCUMENT_POSITION_PRECEDING
                != 0
        };
        let (start_offset, end_offset) = if focus_first {
            (focus.offset, anchor.offset)
        } else {
            (anchor.offset, focus.offset)
        };

        Some(PlatformSelection {
            anchor: anchor.node,
            focus: focus.node,
            start_offset,
            end_offset,
            backward: focus_first,
        })
    }

    fn select(
        &mut self,
        start: Boundary<Node>,
        end: Boundary<Node>,
        backward: bool,
    ) -> Result<(), PlatformError> {
        let window = self.document.default_view().ok_or("no window")?;
        let selection = window
            .get_selection()
            .map_err(js_err("get_selection"))?
            .ok_or("no selection object")?;

        let (start_node, start_offset) = self.dom_boundary(&start);
        let (end_node, end_offset) = self.dom_boundary(&end);
        let ((anchor, anchor_offset), (focus, focus_offset)) = if backward {
            ((end_node, end_offset), (start_node, start_offset))
        } else {
            ((start_node, start_offset), (end_node, end_offset))
        };

        tracing::trace!(anchor_offset, focus_offset, backward, "applying dom selection");
        selection
            .set_base_and_extent(&anchor, anchor_offset, &focus, focus_offset)
            .map_err(js_err("set_base_and_extent"))
    }

    fn rebuild(&mut self, rows: &[RenderRow<'_>]) -> Result<(), PlatformError> {
        self.root_node.set_text_content(None);
        for row in rows {
            let container = self.render_row(row)?;
            self.root_node
                .append_child(&container)
                .map_err(js_err("append_child"))?;
        }
        tracing::trace!(rows = rows.len(), "rebuilt editor rows");
        Ok(())
    }
}
