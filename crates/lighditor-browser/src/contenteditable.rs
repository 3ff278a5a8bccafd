//! Editor element setup and teardown.
//!
//! Mounting takes over a host element: it is wrapped in a container, hidden,
//! and a `contenteditable` editing root is added next to it. Keyboard and
//! pointer listeners drive the core controller.
//!
//! Lifecycle hooks may call back into the editor. The controller's observer
//! only queues notifications; they are delivered once the controller borrow
//! has been released.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use lighditor_core::{
    Editor, EditorConfig, EditorError, EditorObserver, EditorState, PlatformError, Position,
    Selection,
};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Node};

use crate::dom::DomSurface;
use crate::events::key_from_event;
use crate::platform::capabilities;

pub const CONTAINER_CLASS: &str = "lighditorContainer";
pub const RAW_ELEMENT_CLASS: &str = "lighditorRawElement";
pub const EDITOR_CLASS: &str = "lighditorElement";

type TextHook = Box<dyn FnMut(&str, &str)>;
type SelectionHook = Box<dyn FnMut(&Selection, &Selection)>;

enum Notification {
    TextContent { new: String, old: String },
    Selection { new: Selection, old: Selection },
}

/// Observer that defers every notification to the queue.
struct QueueObserver(Rc<RefCell<VecDeque<Notification>>>);

impl EditorObserver for QueueObserver {
    fn on_text_content_change(&mut self, new: &str, old: &str) {
        self.0.borrow_mut().push_back(Notification::TextContent {
            new: new.to_string(),
            old: old.to_string(),
        });
    }

    fn on_selection_change(&mut self, new: &Selection, old: &Selection) {
        self.0.borrow_mut().push_back(Notification::Selection {
            new: *new,
            old: *old,
        });
    }
}

#[derive(Default)]
struct Hooks {
    text: Option<TextHook>,
    selection: Option<SelectionHook>,
}

struct Shared {
    editor: RefCell<Editor<DomSurface, QueueObserver>>,
    queue: Rc<RefCell<VecDeque<Notification>>>,
    hooks: RefCell<Hooks>,
    flushing: Cell<bool>,
}

impl Shared {
    /// Run `f` against the controller, then deliver queued notifications.
    fn with_editor<R>(
        &self,
        f: impl FnOnce(&mut Editor<DomSurface, QueueObserver>) -> R,
    ) -> Option<R> {
        let out = match self.editor.try_borrow_mut() {
            Ok(mut editor) => Some(f(&mut editor)),
            Err(_) => {
                tracing::warn!("editor re-entered while busy, event dropped");
                None
            }
        };
        self.flush();
        out
    }

    fn flush(&self) {
        // Nested flushes leave delivery to the outermost one.
        if self.flushing.replace(true) {
            return;
        }
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(notification) = next else { break };
            match notification {
                Notification::TextContent { new, old } => {
                    let hook = self.hooks.borrow_mut().text.take();
                    if let Some(mut hook) = hook {
                        hook(&new, &old);
                        self.hooks.borrow_mut().text.get_or_insert(hook);
                    }
                }
                Notification::Selection { new, old } => {
                    let hook = self.hooks.borrow_mut().selection.take();
                    if let Some(mut hook) = hook {
                        hook(&new, &old);
                        self.hooks.borrow_mut().selection.get_or_insert(hook);
                    }
                }
            }
        }
        self.flushing.set(false);
    }
}

fn dom_err(context: &'static str) -> impl Fn(wasm_bindgen::JsValue) -> EditorError {
    move |e| EditorError::Platform(PlatformError(format!("{context} failed: {e:?}")))
}

/// An editor mounted on a DOM element.
pub struct BrowserEditor {
    shared: Rc<Shared>,
    listeners: Vec<EventListener>,
    original: Element,
    original_display: String,
    container: Element,
    root: HtmlElement,
    destroyed: bool,
}

impl BrowserEditor {
    /// Take over `element` and render `config`'s initial text into a fresh
    /// editing root.
    pub fn mount(element: Option<&Element>, config: EditorConfig) -> Result<Self, EditorError> {
        let original = element.ok_or(EditorError::MissingElement)?.clone();
        let tag = original.tag_name();
        if tag.eq_ignore_ascii_case("html") {
            return Err(EditorError::Detached(tag));
        }
        let parent = original
            .parent_node()
            .ok_or_else(|| EditorError::Detached(tag.clone()))?;
        let document = original
            .owner_document()
            .ok_or_else(|| EditorError::Detached(tag.clone()))?;

        let container = document
            .create_element("div")
            .map_err(dom_err("create_element"))?;
        container
            .class_list()
            .add_1(CONTAINER_CLASS)
            .map_err(dom_err("class_list.add"))?;
        let original_display = original
            .dyn_ref::<HtmlElement>()
            .and_then(|html| html.style().get_property_value("display").ok())
            .unwrap_or_default();
        let original_node: &Node = &original;
        parent
            .insert_before(&container, Some(original_node))
            .map_err(dom_err("insert_before"))?;

        // From here on the document has been touched; undo on failure.
        let (root, shared) = match Self::attach(&document, &original, &container, config) {
            Ok(attached) => attached,
            Err(err) => {
                restore_original(&original, &container, &original_display);
                return Err(err);
            }
        };

        let listeners = Self::listen(&shared, &root);
        tracing::debug!(tag = %tag, "editor mounted");

        Ok(Self {
            shared,
            listeners,
            original,
            original_display,
            container,
            root,
            destroyed: false,
        })
    }

    /// Hide the original inside the wrapper and build the editing root next
    /// to it.
    fn attach(
        document: &web_sys::Document,
        original: &Element,
        container: &Element,
        config: EditorConfig,
    ) -> Result<(HtmlElement, Rc<Shared>), EditorError> {
        if let Some(html) = original.dyn_ref::<HtmlElement>() {
            html.style()
                .set_property("display", "none")
                .map_err(dom_err("style.set_property"))?;
        }
        original
            .class_list()
            .add_1(RAW_ELEMENT_CLASS)
            .map_err(dom_err("class_list.add"))?;
        container
            .append_child(original)
            .map_err(dom_err("append_child"))?;

        let root: HtmlElement = document
            .create_element("div")
            .map_err(dom_err("create_element"))?
            .dyn_into()
            .map_err(|_| EditorError::Platform("editor root is not an HtmlElement".into()))?;
        root.class_list()
            .add_1(EDITOR_CLASS)
            .map_err(dom_err("class_list.add"))?;
        root.set_content_editable("true");
        container
            .append_child(&root)
            .map_err(dom_err("append_child"))?;

        let surface = DomSurface::new(root.clone())?;
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        let editor = Editor::new(
            surface,
            config,
            capabilities(),
            QueueObserver(queue.clone()),
        );
        let shared = Rc::new(Shared {
            editor: RefCell::new(editor),
            queue,
            hooks: RefCell::new(Hooks::default()),
            flushing: Cell::new(false),
        });
        // Nothing can be listening yet.
        shared.queue.borrow_mut().clear();
        Ok((root, shared))
    }

    fn listen(shared: &Rc<Shared>, root: &HtmlElement) -> Vec<EventListener> {
        let keydown = {
            let shared = shared.clone();
            EventListener::new_with_options(
                root,
                "keydown",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                        return;
                    };
                    // IME composition owns the tree until it ends.
                    if event.is_composing() {
                        return;
                    }
                    let key = key_from_event(event);
                    let result = shared.with_editor(|editor| editor.handle_key_down(&key));
                    if result.is_some_and(|r| r.prevent_default()) {
                        event.prevent_default();
                    }
                },
            )
        };

        let keyup = {
            let shared = shared.clone();
            EventListener::new(root, "keyup", move |event| {
                let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                    return;
                };
                if event.is_composing() {
                    return;
                }
                let key = key_from_event(event);
                shared.with_editor(|editor| editor.handle_key_up(&key));
            })
        };

        let mouseup = {
            let shared = shared.clone();
            EventListener::new(root, "mouseup", move |_| {
                shared.with_editor(|editor| editor.handle_pointer_up());
            })
        };

        vec![keydown, keyup, mouseup]
    }

    /// The `contenteditable` editing root.
    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    pub fn text_content(&self) -> String {
        self.shared.editor.borrow().text_content().to_string()
    }

    pub fn selection(&self) -> Selection {
        self.shared.editor.borrow().selection()
    }

    pub fn cursor_position(&self) -> Position {
        self.shared.editor.borrow().cursor_position()
    }

    pub fn state(&self) -> EditorState {
        self.shared.editor.borrow().state().clone()
    }

    pub fn view_rows(&self) -> Vec<String> {
        self.shared
            .editor
            .borrow()
            .view_rows()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn set_text_content(&self, text: &str) {
        self.shared
            .with_editor(|editor| editor.set_text_content(text));
    }

    pub fn set_selection(&self, selection: Selection) {
        self.shared
            .with_editor(|editor| editor.set_selection(selection));
    }

    pub fn on_text_content_change(&self, hook: impl FnMut(&str, &str) + 'static) {
        self.shared.hooks.borrow_mut().text = Some(Box::new(hook));
    }

    pub fn on_selection_change(&self, hook: impl FnMut(&Selection, &Selection) + 'static) {
        self.shared.hooks.borrow_mut().selection = Some(Box::new(hook));
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Detach listeners, drop the editing root and put the original element
    /// back where it was.
    ///
    /// Returns false if already destroyed.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.listeners.clear();
        self.shared.with_editor(|editor| editor.destroy());
        *self.shared.hooks.borrow_mut() = Hooks::default();

        restore_original(&self.original, &self.container, &self.original_display);

        self.destroyed = true;
        tracing::debug!("editor unmounted");
        true
    }
}

/// Move `original` back out of `container`, undo the mount-time class and
/// display changes, and drop the wrapper.
fn restore_original(original: &Element, container: &Element, display: &str) {
    if let Some(parent) = container.parent_node() {
        let original_node: &Node = original;
        let container_node: &Node = container;
        if let Err(err) = parent.insert_before(original_node, Some(container_node)) {
            tracing::warn!(?err, "unmount: could not restore original element");
        }
    }
    if let Err(err) = original.class_list().remove_1(RAW_ELEMENT_CLASS) {
        tracing::warn!(?err, "unmount: could not remove raw element class");
    }
    if let Some(html) = original.dyn_ref::<HtmlElement>() {
        let style = html.style();
        let restored = if display.is_empty() {
            style.remove_property("display").map(|_| ())
        } else {
            style.set_property("display", display)
        };
        if let Err(err) = restored {
            tracing::warn!(?err, "unmount: could not restore display style");
        }
    }
    container.remove();
}

impl Drop for BrowserEditor {
    fn drop(&mut self) {
        self.destroy();
    }
}
