//! Position mapping between the rendering tree and row/column positions.
//!
//! Capture reads a platform selection endpoint and turns it into a `Position`.
//! Restore goes the other way and places the platform selection at a
//! `Selection`. Both read rows through the walker so they agree with the
//! compiler.

use crate::platform::{Boundary, EditSurface, PlatformError, PlatformSelection, RenderTree};
use crate::row::{row_container, row_info};
use crate::types::{Position, Selection};
use crate::walker::Walker;

/// Position of the start of `node`, measured from the start of its row.
///
/// The caller adds the in-node offset. Returns `None` if `node` is not inside
/// any row container.
pub fn capture_position<T: RenderTree>(tree: &T, node: &T::Node) -> Option<Position> {
    let info = row_info(tree, node)?;
    Walker::from_row(tree, info.container, info.row)
        .find(|step| &step.node == node)
        .map(|step| Position::new(step.row, step.column))
}

/// Convert a platform selection into a canonical `Selection`.
///
/// The platform reports range offsets in reading order. When the user dragged
/// backwards the anchor comes after the focus, so the end offset belongs to
/// the anchor and the start offset to the focus. Node positions decide the
/// order; when they tie the platform's own direction does.
pub fn capture_selection<T: RenderTree>(
    tree: &T,
    platform: &PlatformSelection<T::Node>,
) -> Option<Selection> {
    let anchor = capture_position(tree, &platform.anchor)?;
    let focus = capture_position(tree, &platform.focus)?;

    let reversed = focus < anchor || (focus == anchor && platform.backward);
    let (anchor_offset, focus_offset) = if reversed {
        (platform.end_offset, platform.start_offset)
    } else {
        (platform.start_offset, platform.end_offset)
    };

    Some(Selection::new(
        anchor.offset_column(anchor_offset),
        focus.offset_column(focus_offset),
    ))
}

/// Place the platform selection at `selection`.
///
/// Returns `Ok(false)` without touching the platform when either row no longer
/// exists in the tree (a stale selection after rows were removed).
pub fn restore_selection<S: EditSurface>(
    surface: &mut S,
    selection: &Selection,
) -> Result<bool, PlatformError> {
    let range_start = selection.range_start();
    let range_end = selection.range_end();

    let start_container = row_container(&*surface, range_start.row);
    let end_container = row_container(&*surface, range_end.row);
    let (Some(start_container), Some(_)) = (start_container, end_container) else {
        tracing::debug!(
            start_row = range_start.row,
            end_row = range_end.row,
            "restore_selection: row container missing, leaving selection alone"
        );
        return Ok(false);
    };

    let mut start = Boundary::new(start_container, 0);
    let mut end: Option<Boundary<S::Node>> = None;
    let mut found_start = false;

    for step in Walker::new(&*surface) {
        if !surface.children(&step.node).is_empty() {
            continue;
        }
        let span = step.column..=step.column + step.len();

        if !found_start && step.row == range_start.row && span.contains(&range_start.column) {
            start = Boundary::new(step.node.clone(), range_start.column - step.column);
            found_start = true;
        }

        if end.is_none() && step.row == range_end.row && span.contains(&range_end.column) {
            end = Some(Boundary::new(step.node.clone(), range_end.column - step.column));
        }

        if found_start && end.is_some() {
            break;
        }
    }

    if !found_start {
        tracing::trace!(?range_start, "restore_selection: no leaf for start, using row start");
    }
    let end = end.unwrap_or_else(|| start.clone());

    surface.select(start, end, selection.is_backward())?;
    Ok(true)
}
