//! The synchronization controller.
//!
//! `Editor` owns the committed `EditorState` and is its only writer. Between
//! events the host may reshape the rendering tree however it likes; every
//! handler therefore starts by reading the tree back (compile and/or capture),
//! commits a new state, and re-renders the tree when the text changed.
//!
//! Within one event the order is always capture, commit, render, restore.
//! Render is skipped for selection-only changes; restore never is.

use crate::compile::compile;
use crate::edit::{Direction, EditError, insert_at, remove_at, remove_range};
use crate::keys::{Key, KeydownResult};
use crate::mapper::{capture_selection, restore_selection};
use crate::platform::{Capabilities, EditSurface, render_rows};
use crate::types::{EditorConfig, EditorState, Position, Selection};

/// Lifecycle hooks, called once per committed change after the tree has been
/// rendered and the selection restored.
pub trait EditorObserver {
    fn on_text_content_change(&mut self, _new: &str, _old: &str) {}

    fn on_selection_change(&mut self, _new: &Selection, _old: &Selection) {}
}

impl EditorObserver for () {}

/// Whether the tree may differ from the committed state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Tree reflects the committed state.
    Idle,
    /// The host has been allowed to edit the tree; text is stale.
    Dirty,
}

pub struct Editor<S, O = ()> {
    surface: S,
    observer: O,
    capabilities: Capabilities,
    config: EditorConfig,
    state: EditorState,
    sync: SyncState,
    destroyed: bool,
}

impl<S: EditSurface> Editor<S> {
    /// Editor with full selection support and no observer.
    pub fn with_surface(surface: S, config: EditorConfig) -> Self {
        Self::new(surface, config, Capabilities::default(), ())
    }
}

impl<S: EditSurface, O: EditorObserver> Editor<S, O> {
    /// Create an editor, render its initial (empty) state into `surface`,
    /// then apply the configured initial text.
    pub fn new(surface: S, config: EditorConfig, capabilities: Capabilities, observer: O) -> Self {
        let state = EditorState {
            view_start_row: config.view_start_row,
            viewable_rows: config.viewable_rows,
            ..EditorState::default()
        };
        let init_text = config.init_text_content.clone();
        let mut editor = Self {
            surface,
            observer,
            capabilities,
            config,
            state,
            sync: SyncState::Idle,
            destroyed: false,
        };
        editor.render();
        if !init_text.is_empty() {
            editor.set_text_content(init_text);
        }
        editor
    }

    // === Accessors ===

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn text_content(&self) -> &str {
        &self.state.text_content
    }

    pub fn selection(&self) -> Selection {
        self.state.selection
    }

    /// The focus end of the selection.
    pub fn cursor_position(&self) -> Position {
        self.state.selection.end
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access for hosts and tests that reshape the tree between events.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Rows inside the configured view window.
    pub fn view_rows(&self) -> Vec<&str> {
        let window = self.state.view_window();
        self.state
            .text_content
            .split('\n')
            .skip(window.start)
            .take(window.len())
            .collect()
    }

    // === Public operations ===

    pub fn set_text_content(&mut self, text: impl Into<String>) {
        let next = self.state.with_text(text);
        self.commit(next);
    }

    pub fn set_selection(&mut self, selection: Selection) {
        let next = self.state.with_selection(selection);
        self.commit(next);
    }

    /// Replace the whole state at once.
    pub fn set_state(&mut self, state: EditorState) {
        self.commit(state);
    }

    /// Discard state and stop reacting to events.
    ///
    /// Returns false if the editor was already destroyed.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.state = EditorState::default();
        self.sync = SyncState::Idle;
        tracing::debug!("editor destroyed");
        true
    }

    // === Input entry points ===

    /// Handle a key press.
    ///
    /// Enter and row-boundary deletions are computed on the text buffer and
    /// committed directly; the caller must prevent the host's native handling
    /// when `Handled` is returned. Every other key is left to the host and read
    /// back on key release.
    pub fn handle_key_down(&mut self, key: &Key) -> KeydownResult {
        if self.destroyed {
            return KeydownResult::PassThrough;
        }
        match key {
            Key::Enter => self.insert_row_break(),
            Key::Backspace => self.delete_structural(Direction::Left),
            Key::Delete => self.delete_structural(Direction::Right),
            _ => self.pass_through(),
        }
    }

    /// Handle a key release: read the tree back and commit.
    pub fn handle_key_up(&mut self, key: &Key) {
        if self.destroyed {
            return;
        }
        if key.is_modifier() && self.sync == SyncState::Idle {
            return;
        }
        let compile_text = self.sync == SyncState::Dirty || !key.is_navigation();
        self.sync_from_surface(compile_text);
    }

    /// Handle a pointer release: only the selection can have changed.
    pub fn handle_pointer_up(&mut self) {
        if self.destroyed {
            return;
        }
        self.sync_from_surface(self.sync == SyncState::Dirty);
    }

    // === Internals ===

    fn pass_through(&mut self) -> KeydownResult {
        self.sync = SyncState::Dirty;
        KeydownResult::PassThrough
    }

    /// Read the platform selection, if the platform lets us.
    fn capture(&self) -> Option<Selection> {
        if !self.capabilities.supports_selection() {
            return None;
        }
        let platform = self.surface.selection()?;
        capture_selection(&self.surface, &platform)
    }

    /// Bring the committed state up to date with the tree.
    fn sync_from_surface(&mut self, compile_text: bool) {
        let text_content = if compile_text {
            compile(&self.surface)
        } else {
            self.state.text_content.clone()
        };
        let selection = match self.capture() {
            Some(selection) => selection,
            None => {
                tracing::debug!("sync: platform selection not capturable, keeping previous");
                self.state.selection
            }
        };
        self.sync = SyncState::Idle;
        self.commit(EditorState {
            text_content,
            selection,
            ..self.state.clone()
        });
    }

    fn insert_row_break(&mut self) -> KeydownResult {
        self.sync_from_surface(self.sync == SyncState::Dirty);
        let selection = self.state.selection;
        let start = selection.range_start();

        let result = self
            .without_selected(&selection)
            .and_then(|text| insert_at(&text, start, "\n"));
        match result {
            Ok(text_content) => {
                let caret = Position::new(start.row + 1, 0);
                self.commit(EditorState {
                    text_content,
                    selection: Selection::caret(caret),
                    ..self.state.clone()
                });
                KeydownResult::Handled
            }
            Err(err) => {
                tracing::warn!(%err, "enter: could not compute new text, leaving it to the host");
                self.pass_through()
            }
        }
    }

    fn delete_structural(&mut self, direction: Direction) -> KeydownResult {
        self.sync_from_surface(self.sync == SyncState::Dirty);
        let selection = self.state.selection;
        let text = &self.state.text_content;

        if !selection.is_collapsed() {
            if !selection.spans_rows() {
                return self.pass_through();
            }
            let caret = selection.range_start();
            return self.commit_edit(remove_range(text, &selection), caret);
        }

        let caret = selection.end;
        match direction {
            Direction::Left if caret.column == 0 => {
                if caret.row == 0 {
                    tracing::trace!("backspace at start of text, nothing to join");
                    return KeydownResult::Handled;
                }
                let joined_at = Position::new(caret.row - 1, row_len(text, caret.row - 1));
                self.commit_edit(remove_at(text, caret, direction), joined_at)
            }
            Direction::Right
                if caret.column == row_len(text, caret.row)
                    && caret.row + 1 < self.state.row_count() =>
            {
                self.commit_edit(remove_at(text, caret, direction), caret)
            }
            _ => self.pass_through(),
        }
    }

    fn commit_edit(&mut self, result: Result<String, EditError>, caret: Position) -> KeydownResult {
        match result {
            Ok(text_content) => {
                self.commit(EditorState {
                    text_content,
                    selection: Selection::caret(caret),
                    ..self.state.clone()
                });
                KeydownResult::Handled
            }
            Err(err) => {
                tracing::warn!(%err, "delete: could not compute new text, leaving it to the host");
                self.pass_through()
            }
        }
    }

    fn without_selected(&self, selection: &Selection) -> Result<String, EditError> {
        if selection.is_collapsed() {
            Ok(self.state.text_content.clone())
        } else {
            remove_range(&self.state.text_content, selection)
        }
    }

    fn commit(&mut self, next: EditorState) {
        if self.destroyed {
            tracing::debug!("commit after destroy ignored");
            return;
        }
        let previous = std::mem::replace(&mut self.state, next);
        let text_changed = previous.text_content != self.state.text_content;
        let selection_changed = previous.selection != self.state.selection;

        tracing::trace!(
            text_changed,
            selection_changed,
            selection = ?self.state.selection,
            "commit"
        );

        if text_changed {
            self.render();
        } else {
            self.restore();
        }

        if text_changed {
            self.observer
                .on_text_content_change(&self.state.text_content, &previous.text_content);
        }
        if selection_changed {
            self.observer
                .on_selection_change(&self.state.selection, &previous.selection);
        }
    }

    /// Rebuild the tree from the committed text, then restore the selection.
    fn render(&mut self) {
        let rows = render_rows(&self.state.text_content);
        if let Err(err) = self.surface.rebuild(&rows) {
            tracing::warn!(%err, "render: rebuilding rows failed");
            return;
        }
        self.restore();
    }

    fn restore(&mut self) {
        if !self.capabilities.supports_selection() {
            return;
        }
        match restore_selection(&mut self.surface, &self.state.selection) {
            Ok(true) => {}
            Ok(false) => tracing::debug!(
                selection = ?self.state.selection,
                "restore: selection does not fit the current rows"
            ),
            Err(err) => tracing::warn!(%err, "restore: platform rejected selection"),
        }
    }
}

fn row_len(text: &str, row: usize) -> usize {
    text.split('\n')
        .nth(row)
        .map(|line| line.chars().count())
        .unwrap_or(0)
}
