//! lighditor-core: keeps a plain-text row/column model in sync with a rendering
//! tree that the host is free to edit natively.
//!
//! This crate provides:
//! - `RenderTree` / `EditSurface` traits for the host's rendering tree
//! - `Walker` - depth-first traversal that assigns every node a row and column
//! - `compile` - tree to canonical text
//! - `capture_selection` / `restore_selection` - tree boundaries to positions and back
//! - `Editor<S>` - the event-driven controller that ties them together
//! - `MemSurface` - an in-memory surface for headless use and tests

pub mod compile;
pub mod controller;
pub mod edit;
pub mod error;
pub mod keys;
pub mod mapper;
pub mod mem;
pub mod platform;
pub mod row;
pub mod types;
pub mod walker;

pub use compile::compile;
pub use controller::{Editor, EditorObserver, SyncState};
pub use edit::{Direction, EditError, char_index, insert_at, position_at, remove_at, remove_range};
pub use error::EditorError;
pub use keys::{Key, KeydownResult};
pub use mapper::{capture_position, capture_selection, restore_selection};
pub use mem::{MemNodeKind, MemSurface, MemTreeBuilder, NodeId};
pub use platform::{
    Boundary, Capabilities, EditSurface, PlatformError, PlatformSelection, RenderRow, RenderTree,
    render_rows,
};
pub use row::{RowInfo, enclosing_row_container, row_container, row_info};
pub use smol_str::SmolStr;
pub use types::{EditorConfig, EditorState, Position, Selection};
pub use walker::{Step, StepKind, Walker, walk};
