use classify_core::DialogButton;
use leptos::html;
use leptos::prelude::*;
use leptos_dragdrop::start_header_drag;

use crate::components::{CategoryColumn, GroupBar, TemplateBar};
use crate::widget::ClassifyWidget;

/// Native `<dialog>` rendering of one widget. Shown modally while the
/// widget's frame is set; a nested picker renders inside as its own dialog.
#[component]
pub fn ClassifyDialogView(widget: ClassifyWidget) -> impl IntoView {
    let dialog_ref = NodeRef::<html::Dialog>::new();
    let options = widget.options();
    let categories = widget.with_untracked(|c| c.categories().to_vec());

    // Keep the element's modal state in step with the frame
    Effect::new(move |_| {
        let open = widget.is_open();
        let Some(el) = dialog_ref.get() else {
            return;
        };
        if open && !el.open() {
            if let Err(e) = el.show_modal() {
                log::error!("could not show classification dialog: {:?}", e);
            }
        } else if !open && el.open() {
            el.close();
        }
    });

    let title = move || widget.frame().map(|f| f.title).unwrap_or_default();
    let size = move || {
        widget
            .frame()
            .map(|f| format!("width: {}; height: {};", f.width, f.height))
            .unwrap_or_default()
    };
    let buttons = move || widget.frame().map(|f| f.buttons).unwrap_or_default();

    let on_header_down = move |ev: web_sys::PointerEvent| {
        if let Some(el) = dialog_ref.get() {
            start_header_drag(&ev, &el);
        }
    };

    view! {
        <dialog
            node_ref=dialog_ref
            class="oc-dialog"
            class:oc-readonly=!options.editable
            style=size
            on:close=move |_| widget.native_close()
        >
            <div class="oc-dialog-content">
                <div class="oc-dialog-header" on:pointerdown=on_header_down>
                    <h2 class="oc-dialog-title">{title}</h2>
                    <button class="oc-dialog-close" type="button" on:click=move |_| widget.close_dialog(false)>
                        "×"
                    </button>
                </div>
                <div class="oc-dialog-body">
                    <div class="oc-clasificame">
                        {options.groups_enabled.then(|| view! { <GroupBar widget=widget /> })}
                        {options.template_manager_enabled().then(|| view! { <TemplateBar widget=widget /> })}
                        <SearchStats widget=widget />
                        <div class="oc-columns">
                            {categories
                                .into_iter()
                                .map(|category| view! { <CategoryColumn widget=widget category=category /> })
                                .collect_view()}
                        </div>
                    </div>
                </div>
                <div class="oc-dialog-footer">
                    <For
                        each=buttons
                        key=|button| button.label()
                        children=move |button| {
                            let class = match button {
                                DialogButton::Cancel => "oc-btn oc-btn-secondary",
                                DialogButton::Save | DialogButton::Close => "oc-btn oc-btn-primary",
                            };
                            view! {
                                <button class=class type="button" on:click=move |_| widget.press(button)>
                                    {button.label()}
                                </button>
                            }
                        }
                    />
                </div>
            </div>
            {move || widget.nested.get().map(|nested| view! { <ClassifyDialogView widget=nested /> }.into_any())}
        </dialog>
    }
}

#[component]
fn SearchStats(widget: ClassifyWidget) -> impl IntoView {
    let plural = widget.options().item_name_plural;
    let placeholder = format!("🔎 Busca {}", plural);
    let term = Memo::new(move |_| widget.with(|c| c.search_term().to_string()));
    let total = Memo::new(move |_| widget.with(|c| c.counters().visible_total));

    view! {
        <div class="oc-search-stats-row">
            <div class="oc-global-search">
                <input
                    type="text"
                    class="oc-search-input"
                    placeholder=placeholder
                    prop:value=term
                    on:input=move |ev| widget.search(&event_target_value(&ev))
                />
                <button class="oc-search-clear" type="button" on:click=move |_| widget.search("")>
                    "×"
                </button>
            </div>
            <div class="oc-stats">"Total: " <span class="oc-total-count">{total}</span> " " {plural}</div>
        </div>
    }
}
