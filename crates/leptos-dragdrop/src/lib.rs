//! Leptos DragDrop Utilities
//!
//! Sortable lists for Leptos using mouse events.
//! Uses a movement threshold to distinguish click from drag. Lists that
//! share a [`DndSignals`] form one group: items can be dragged between any
//! of its live lists.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Group-wide drag behaviour
#[derive(Clone, Debug, PartialEq)]
pub struct SortableOptions {
    /// Lists with the same group key exchange items
    pub group: String,
    /// Duration of the settle animation, in milliseconds
    pub animation_ms: u32,
    /// Movement in pixels before a press becomes a drag
    pub threshold_px: i32,
    /// Minimum press duration before a drag may start, in milliseconds
    pub delay_ms: u32,
}

impl Default for SortableOptions {
    fn default() -> Self {
        Self {
            group: "clasificame-items".to_string(),
            animation_ms: 150,
            threshold_px: 3,
            delay_ms: 0,
        }
    }
}

/// The item being dragged and the list it came from
#[derive(Clone, Debug, PartialEq)]
pub struct DragItem {
    pub item: String,
    pub from: String,
}

/// Where the dragged item would land. `index: None` means end of list.
#[derive(Clone, Debug, PartialEq)]
pub struct DropTarget {
    pub list: String,
    pub index: Option<usize>,
}

/// A completed drag
#[derive(Clone, Debug, PartialEq)]
pub struct DropEvent {
    pub item: String,
    pub from: String,
    pub to: String,
    pub index: Option<usize>,
}

/// Lists currently accepting drops
#[derive(Clone, Copy)]
pub struct SortableRegistry {
    lists: RwSignal<Vec<String>>,
}

impl SortableRegistry {
    fn new() -> Self {
        Self {
            lists: RwSignal::new(Vec::new()),
        }
    }

    /// Make a list sortable until the returned handle is destroyed
    pub fn create(&self, list: impl Into<String>) -> SortableHandle {
        let list = list.into();
        self.lists.update(|lists| {
            if !lists.contains(&list) {
                lists.push(list.clone());
            }
        });
        SortableHandle {
            registry: *self,
            list,
            live: true,
        }
    }

    pub fn contains(&self, list: &str) -> bool {
        self.lists.with_untracked(|lists| lists.iter().any(|l| l == list))
    }

    pub fn len(&self) -> usize {
        self.lists.with_untracked(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One live sortable list
pub struct SortableHandle {
    registry: SortableRegistry,
    list: String,
    live: bool,
}

impl SortableHandle {
    pub fn list(&self) -> &str {
        &self.list
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Stop accepting drops. Safe to call more than once.
    pub fn destroy(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        let list = self.list.clone();
        self.registry.lists.update(|lists| lists.retain(|l| l != &list));
    }
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub dragging_read: ReadSignal<Option<DragItem>>,
    pub dragging_write: WriteSignal<Option<DragItem>>,
    pub drop_target_read: ReadSignal<Option<DropTarget>>,
    pub drop_target_write: WriteSignal<Option<DropTarget>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pressed item (mousedown but not yet dragging)
    pub pending_read: ReadSignal<Option<DragItem>>,
    pub pending_write: WriteSignal<Option<DragItem>>,
    /// Start position and time for movement detection
    pub start_x_read: ReadSignal<i32>,
    pub start_x_write: WriteSignal<i32>,
    pub start_y_read: ReadSignal<i32>,
    pub start_y_write: WriteSignal<i32>,
    pub start_time_read: ReadSignal<f64>,
    pub start_time_write: WriteSignal<f64>,
    pub registry: SortableRegistry,
    pub options: StoredValue<SortableOptions>,
}

impl DndSignals {
    pub fn is_dragging(&self) -> bool {
        self.dragging_read.with_untracked(Option::is_some)
    }

    /// Tracked check used by views to style the dragged item
    pub fn is_dragging_item(&self, item: &str) -> bool {
        self.dragging_read.with(|d| d.as_ref().is_some_and(|d| d.item == item))
    }

    /// Tracked check used by views to highlight the hovered list
    pub fn is_target_list(&self, list: &str) -> bool {
        self.drop_target_read.with(|t| t.as_ref().is_some_and(|t| t.list == list))
    }
}

pub fn create_dnd_signals(options: SortableOptions) -> DndSignals {
    let (dragging_read, dragging_write) = signal(None::<DragItem>);
    let (drop_target_read, drop_target_write) = signal(None::<DropTarget>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_read, pending_write) = signal(None::<DragItem>);
    let (start_x_read, start_x_write) = signal(0i32);
    let (start_y_read, start_y_write) = signal(0i32);
    let (start_time_read, start_time_write) = signal(0f64);
    DndSignals {
        dragging_read,
        dragging_write,
        drop_target_read,
        drop_target_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_read,
        pending_write,
        start_x_read,
        start_x_write,
        start_y_read,
        start_y_write,
        start_time_read,
        start_time_write,
        registry: SortableRegistry::new(),
        options: StoredValue::new(options),
    }
}

/// True once the pointer moved further than `threshold` on either axis
pub fn exceeds_threshold(start: (i32, i32), now: (i32, i32), threshold: i32) -> bool {
    (now.0 - start.0).abs() > threshold || (now.1 - start.1).abs() > threshold
}

/// Top-left corner for a dialog dragged by its header, kept inside the viewport
pub fn clamp_dialog_position(pointer: (f64, f64), offset: (f64, f64), size: (f64, f64), viewport: (f64, f64)) -> (f64, f64) {
    let max_x = (viewport.0 - size.0).max(0.0);
    let max_y = (viewport.1 - size.1).max(0.0);
    (
        (pointer.0 - offset.0).clamp(0.0, max_x),
        (pointer.1 - offset.1).clamp(0.0, max_y),
    )
}

fn body_style() -> Option<web_sys::CssStyleDeclaration> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
        .map(|b| b.style())
}

/// End drag operation
pub fn end_drag(dnd: &DndSignals) {
    dnd.dragging_write.set(None);
    dnd.drop_target_write.set(None);
    dnd.pending_write.set(None);
    dnd.drag_just_ended_write.set(true);
    if let Some(style) = body_style() {
        let _ = style.remove_property("cursor");
    }

    // Swallow the click that follows the mouseup of a drag
    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

fn is_control(target: &web_sys::EventTarget) -> bool {
    target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
        || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
        || target.dyn_ref::<web_sys::HtmlSelectElement>().is_some()
        || target.dyn_ref::<web_sys::HtmlTextAreaElement>().is_some()
}

/// Create mousedown handler for draggable items
/// Records pending drag with start position
pub fn make_on_mousedown(dnd: DndSignals, item: String, from: String) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 || !dnd.registry.contains(&from) {
            return;
        }
        if ev.target().is_some_and(|t| is_control(&t)) {
            return;
        }
        dnd.pending_write.set(Some(DragItem {
            item: item.clone(),
            from: from.clone(),
        }));
        dnd.start_x_write.set(ev.client_x());
        dnd.start_y_write.set(ev.client_y());
        dnd.start_time_write.set(js_sys::Date::now());
    }
}

/// Create mouseenter handler for items: the drop lands before the item
pub fn make_on_item_mouseenter(dnd: DndSignals, list: String, index: usize) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.is_dragging() {
            dnd.drop_target_write.set(Some(DropTarget {
                list: list.clone(),
                index: Some(index),
            }));
        }
    }
}

/// Create mouseenter handler for a list body: the drop lands at the end.
/// Also used as the item mouseleave, since the pointer is still over the list.
pub fn make_on_list_mouseenter(dnd: DndSignals, list: String) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.is_dragging() {
            dnd.drop_target_write.set(Some(DropTarget {
                list: list.clone(),
                index: None,
            }));
        }
    }
}

/// Create mouseleave handler for a list body
pub fn make_on_mouseleave(dnd: DndSignals) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.is_dragging() {
            dnd.drop_target_write.set(None);
        }
    }
}

type MouseClosure = Closure<dyn FnMut(web_sys::MouseEvent)>;

/// Document listeners owned by one group; removed by [`GlobalListeners::remove`]
pub struct GlobalListeners {
    mousemove: Option<MouseClosure>,
    mouseup: Option<MouseClosure>,
}

impl GlobalListeners {
    pub fn remove(&mut self) {
        let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        for (event, closure) in [("mousemove", self.mousemove.take()), ("mouseup", self.mouseup.take())] {
            if let Some(closure) = closure {
                let _ = doc.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            }
        }
    }
}

impl Drop for GlobalListeners {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Create mousemove handler for document - starts drag if moved enough
fn global_mousemove(dnd: DndSignals) -> MouseClosure {
    Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        if dnd.is_dragging() {
            return;
        }
        let Some(pending) = dnd.pending_read.get_untracked() else {
            return;
        };
        let (threshold, delay) = dnd.options.with_value(|o| (o.threshold_px, o.delay_ms));
        if js_sys::Date::now() - dnd.start_time_read.get_untracked() < f64::from(delay) {
            return;
        }
        let start = (dnd.start_x_read.get_untracked(), dnd.start_y_read.get_untracked());
        if exceeds_threshold(start, (ev.client_x(), ev.client_y()), threshold) {
            dnd.dragging_write.set(Some(pending));
            if let Some(style) = body_style() {
                let _ = style.set_property("cursor", "grabbing");
            }
        }
    })
}

/// The drop a finished drag produces. Lists destroyed mid-drag, on either
/// end, no longer take drops.
fn accepted_drop(registry: &SortableRegistry, dragging: Option<DragItem>, target: Option<DropTarget>) -> Option<DropEvent> {
    let (dragged, target) = dragging.zip(target)?;
    if !registry.contains(&target.list) || !registry.contains(&dragged.from) {
        return None;
    }
    Some(DropEvent {
        item: dragged.item,
        from: dragged.from,
        to: target.list,
        index: target.index,
    })
}

/// Bind the document listeners of a group. `on_end` runs once per drag
/// that finished over a live list.
pub fn bind_global_mouseup<F>(dnd: DndSignals, on_end: F) -> GlobalListeners
where
    F: Fn(DropEvent) + 'static,
{
    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let dragging = dnd.dragging_read.get_untracked();
        let drop_target = dnd.drop_target_read.get_untracked();

        // Clear pending state first
        dnd.pending_write.set(None);
        if dragging.is_none() {
            // Not dragging: the click event fires naturally on the element
            return;
        }
        end_drag(&dnd);

        if let Some(event) = accepted_drop(&dnd.registry, dragging, drop_target) {
            on_end(event);
        }
    });
    let on_mousemove = global_mousemove(dnd);

    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
        let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
    }
    GlobalListeners {
        mousemove: Some(on_mousemove),
        mouseup: Some(on_mouseup),
    }
}

// ========================
// Dialog header dragging
// ========================

type PointerClosure = Closure<dyn FnMut(web_sys::PointerEvent)>;

thread_local! {
    // Listeners of the last header drag; replaced when the next one starts
    static HEADER_DRAG: RefCell<Option<(PointerClosure, PointerClosure)>> = const { RefCell::new(None) };
}

fn viewport() -> (f64, f64) {
    let Some(win) = web_sys::window() else {
        return (0.0, 0.0);
    };
    let read = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (read(win.inner_width()), read(win.inner_height()))
}

/// Start moving `dialog` with the pointer. Presses on form controls and
/// buttons inside the header are ignored.
pub fn start_header_drag(ev: &web_sys::PointerEvent, dialog: &web_sys::HtmlElement) {
    let on_control = ev
        .target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .and_then(|el| el.closest("button, input, select, textarea").ok().flatten())
        .is_some();
    if on_control {
        return;
    }
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    ev.prevent_default();

    let rect = dialog.get_bounding_client_rect();
    let style = dialog.style();
    let _ = style.set_property("position", "fixed");
    let _ = style.set_property("margin", "0");
    let _ = style.set_property("left", &format!("{}px", rect.left()));
    let _ = style.set_property("top", &format!("{}px", rect.top()));

    let offset = (f64::from(ev.client_x()) - rect.left(), f64::from(ev.client_y()) - rect.top());
    let size = (rect.width(), rect.height());

    let on_move = PointerClosure::new(move |m: web_sys::PointerEvent| {
        let pointer = (f64::from(m.client_x()), f64::from(m.client_y()));
        let (x, y) = clamp_dialog_position(pointer, offset, size, viewport());
        let _ = style.set_property("left", &format!("{}px", x));
        let _ = style.set_property("top", &format!("{}px", y));
    });

    let move_fn: Rc<js_sys::Function> = Rc::new(on_move.as_ref().unchecked_ref::<js_sys::Function>().clone());
    let up_slot: Rc<RefCell<Option<js_sys::Function>>> = Rc::new(RefCell::new(None));
    let on_up = {
        let up_slot = up_slot.clone();
        let doc = doc.clone();
        PointerClosure::new(move |_: web_sys::PointerEvent| {
            let _ = doc.remove_event_listener_with_callback("pointermove", &move_fn);
            if let Some(up) = up_slot.borrow_mut().take() {
                let _ = doc.remove_event_listener_with_callback("pointerup", &up);
            }
        })
    };
    *up_slot.borrow_mut() = Some(on_up.as_ref().unchecked_ref::<js_sys::Function>().clone());

    let _ = doc.add_event_listener_with_callback("pointermove", on_move.as_ref().unchecked_ref());
    let _ = doc.add_event_listener_with_callback("pointerup", on_up.as_ref().unchecked_ref());
    HEADER_DRAG.with(|slot| *slot.borrow_mut() = Some((on_move, on_up)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!exceeds_threshold((10, 10), (13, 7), 3));
        assert!(exceeds_threshold((10, 10), (14, 10), 3));
        assert!(exceeds_threshold((10, 10), (10, 6), 3));
    }

    #[test]
    fn test_dialog_kept_inside_viewport() {
        let size = (400.0, 300.0);
        let viewport = (1000.0, 800.0);
        assert_eq!(clamp_dialog_position((500.0, 400.0), (50.0, 10.0), size, viewport), (450.0, 390.0));
        assert_eq!(clamp_dialog_position((10.0, 5.0), (50.0, 10.0), size, viewport), (0.0, 0.0));
        assert_eq!(clamp_dialog_position((990.0, 790.0), (0.0, 0.0), size, viewport), (600.0, 500.0));
    }

    #[test]
    fn test_oversized_dialog_pins_to_origin() {
        assert_eq!(clamp_dialog_position((300.0, 300.0), (0.0, 0.0), (1200.0, 900.0), (1000.0, 800.0)), (0.0, 0.0));
    }

    #[test]
    fn test_default_group_options() {
        let options = SortableOptions::default();
        assert_eq!(options.group, "clasificame-items");
        assert_eq!(options.animation_ms, 150);
        assert_eq!(options.threshold_px, 3);
    }

    fn drag(item: &str, from: &str) -> Option<DragItem> {
        Some(DragItem {
            item: item.to_string(),
            from: from.to_string(),
        })
    }

    fn over(list: &str, index: Option<usize>) -> Option<DropTarget> {
        Some(DropTarget {
            list: list.to_string(),
            index,
        })
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let owner = Owner::new();
        owner.with(|| {
            let registry = SortableRegistry::new();
            let mut handle = registry.create("a");
            let _other = registry.create("b");
            assert!(registry.contains("a"));
            assert_eq!(registry.len(), 2);

            handle.destroy();
            handle.destroy();
            assert!(!handle.is_live());
            assert!(!registry.contains("a"));
            assert_eq!(registry.len(), 1);
        });
    }

    #[test]
    fn test_drop_needs_both_lists_live() {
        let owner = Owner::new();
        owner.with(|| {
            let registry = SortableRegistry::new();
            let mut a = registry.create("a");
            let mut b = registry.create("b");

            assert_eq!(
                accepted_drop(&registry, drag("p1", "a"), over("b", Some(0))),
                Some(DropEvent {
                    item: "p1".to_string(),
                    from: "a".to_string(),
                    to: "b".to_string(),
                    index: Some(0),
                })
            );
            assert_eq!(accepted_drop(&registry, None, over("b", None)), None);
            assert_eq!(accepted_drop(&registry, drag("p1", "a"), None), None);

            b.destroy();
            assert_eq!(accepted_drop(&registry, drag("p1", "a"), over("b", None)), None);
            a.destroy();
            assert_eq!(accepted_drop(&registry, drag("p1", "a"), over("a", None)), None);
            assert!(registry.is_empty());
        });
    }
}
