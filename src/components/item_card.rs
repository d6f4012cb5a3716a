use classify_core::{ItemId, ToolbarButton};
use leptos::prelude::*;
use leptos_dragdrop::{make_on_item_mouseenter, make_on_list_mouseenter, make_on_mousedown};

use crate::widget::ClassifyWidget;

/// One draggable item with its per-category toolbar
#[component]
pub fn ItemCard(widget: ClassifyWidget, item: ItemId, list: String, index: usize) -> impl IntoView {
    let dnd = widget.dnd;
    let options = widget.options();
    let label = widget.with_untracked(|c| c.item(&item).map(|r| r.display_name.clone()).unwrap_or_default());

    // Memos so a move elsewhere does not touch this card's DOM
    let visible = {
        let item = item.clone();
        Memo::new(move |_| widget.with(|c| c.item(&item).is_some_and(|r| r.visible)))
    };
    let flashing = {
        let item = item.clone();
        Memo::new(move |_| widget.with(|c| c.is_flashing(&item)))
    };
    let dragging = {
        let key = item.to_string();
        move || dnd.is_dragging_item(&key)
    };
    let drop_before = {
        let list = list.clone();
        move || {
            dnd.drop_target_read
                .with(|t| t.as_ref().is_some_and(|t| t.list == list && t.index == Some(index)))
        }
    };

    let toolbar = (options.editable && options.show_item_buttons).then(|| {
        let buttons = {
            let item = item.clone();
            Memo::new(move |_| widget.with(|c| c.toolbar(&item)))
        };
        let item = item.clone();
        view! {
            <div class="oc-item-toolbar">
                <For
                    each=move || buttons.get()
                    key=|b| (b.target.clone(), b.pressed)
                    children=move |button: ToolbarButton| {
                        let item = item.clone();
                        let target = button.target.clone();
                        let on_click = move |ev: web_sys::MouseEvent| {
                            ev.stop_propagation();
                            widget.move_item(&item, &target);
                        };
                        view! {
                            <button class="oc-item-btn" class:pressed=button.pressed type="button" on:click=on_click>
                                {button.label}
                            </button>
                        }
                    }
                />
            </div>
        }
    });

    view! {
        <div
            class="oc-item"
            class:oc-item-readonly=!options.editable
            class:oc-item-flash=flashing
            class:oc-item-dragging=dragging
            class:oc-drop-before=drop_before
            style:display=move || if visible.get() { "" } else { "none" }
            data-item-id=item.to_string()
            on:mousedown=make_on_mousedown(dnd, item.to_string(), list.clone())
            on:mouseenter=make_on_item_mouseenter(dnd, list.clone(), index)
            on:mouseleave=make_on_list_mouseenter(dnd, list)
        >
            <span class="oc-item-label">{label}</span>
            {toolbar}
        </div>
    }
}
