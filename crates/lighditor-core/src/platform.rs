//! Platform abstraction traits for the rendering surface.
//!
//! These traits define the interface between the synchronization engine and
//! whatever actually renders the rows (browser DOM, a native text view, or the
//! in-memory surface used by tests). The engine only ever sees nodes through
//! `RenderTree`, and only mutates the surface through `EditSurface`.

use smol_str::SmolStr;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Read-only view of an externally owned rendering tree.
///
/// Node handles are cheap to clone and compare by identity. Nothing here
/// promises the tree is well formed: hosts nest row containers, drop line-break
/// markers and leave bare text under the root.
pub trait RenderTree {
    type Node: Clone + PartialEq + std::fmt::Debug;

    /// The editing root. Never itself a row container.
    fn root(&self) -> Self::Node;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Children in sibling order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Content of a text leaf, `None` for every other node.
    fn text(&self, node: &Self::Node) -> Option<SmolStr>;

    /// Whether the node represents one logical row.
    fn is_row_container(&self, node: &Self::Node) -> bool;

    /// Whether the node is a zero-width forced line split.
    fn is_line_break(&self, node: &Self::Node) -> bool;

    /// Length of a text leaf in chars. Zero for non-text nodes.
    fn text_len(&self, node: &Self::Node) -> usize {
        self.text(node).map(|t| t.chars().count()).unwrap_or(0)
    }

    fn is_text(&self, node: &Self::Node) -> bool {
        self.text(node).is_some()
    }
}

/// A point in the rendering tree: a node plus a char offset inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Boundary<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> Boundary<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Snapshot of the platform's current selection.
///
/// `anchor`/`focus` are the nodes the user started and ended on. The offsets
/// come from the platform range, so `start_offset` belongs to whichever of the
/// two comes first in reading order. Offsets are in chars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformSelection<N> {
    pub anchor: N,
    pub focus: N,
    pub start_offset: usize,
    pub end_offset: usize,
    /// The focus lies before the anchor. The only source of direction when
    /// both ends share a node.
    pub backward: bool,
}

/// One row of the canonical buffer as handed to `EditSurface::rebuild`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderRow<'a> {
    pub text: &'a str,
    /// Terminate the row with a line-break marker.
    pub line_break: bool,
}

/// Split a text buffer into render rows.
///
/// One row per `\n`-separated line; every row except the last ends with a
/// line-break marker.
pub fn render_rows(text: &str) -> Vec<RenderRow<'_>> {
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    lines
        .into_iter()
        .enumerate()
        .map(|(idx, text)| RenderRow {
            text,
            line_break: idx != last,
        })
        .collect()
}

/// Mutable access to the rendering surface.
///
/// Implementations handle the platform side of selection handling and
/// re-rendering. The browser implementation uses the DOM Selection API and
/// `contenteditable` rows; the memory implementation keeps everything in an
/// arena.
pub trait EditSurface: RenderTree {
    /// Read the platform's current selection, if it has one.
    fn selection(&self) -> Option<PlatformSelection<Self::Node>>;

    /// Make `start..end` the active selection.
    ///
    /// `backward` asks for the anchor at `end` and focus at `start`.
    fn select(
        &mut self,
        start: Boundary<Self::Node>,
        end: Boundary<Self::Node>,
        backward: bool,
    ) -> Result<(), PlatformError>;

    /// Throw away the current tree contents and render `rows` from scratch.
    fn rebuild(&mut self, rows: &[RenderRow<'_>]) -> Result<(), PlatformError>;
}

/// Which selection facilities the host provides.
///
/// Injected at construction so tests can run against surfaces without a
/// selection API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Host can report its current selection.
    pub get_selection: bool,
    /// Host can construct and apply ranges.
    pub create_range: bool,
}

impl Capabilities {
    pub const FULL: Capabilities = Capabilities {
        get_selection: true,
        create_range: true,
    };

    pub const NONE: Capabilities = Capabilities {
        get_selection: false,
        create_range: false,
    };

    /// Capture and restore both need the full pair.
    pub fn supports_selection(&self) -> bool {
        self.get_selection && self.create_range
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}
