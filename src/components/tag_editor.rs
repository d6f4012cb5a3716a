//! Tag Editor
//!
//! Chip row of the selected tags plus an editing dialog over the whole
//! catalog: search, add, inline rename, delete and copy to clipboard.
//! Server round trips go through [`TagEditor`]; the catalog signal only
//! changes once the backend agreed.

use std::rc::Rc;

use classify_core::{TagCatalog, TagChange, TagEditor, TagEditorOptions, TagId, TagOption};
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::commands::{api_client, HttpTransport};
use crate::context::AppContext;

type Editor = Rc<TagEditor<HttpTransport>>;

/// How long the copy button shows its confirmation glyph
const COPIED_MS: u32 = 1200;

async fn copy_to_clipboard(text: &str) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let promise = window.navigator().clipboard().write_text(text);
    match wasm_bindgen_futures::JsFuture::from(promise).await {
        Ok(_) => true,
        Err(e) => {
            log::warn!("clipboard write failed: {:?}", e);
            false
        }
    }
}

/// Apply a confirmed change; true when something changed
fn settle(catalog: RwSignal<TagCatalog>, change: Option<TagChange>) -> bool {
    let Some(change) = change else {
        return false;
    };
    catalog.update(|c| c.apply(change));
    true
}

#[component]
fn CopyButton(#[prop(into)] payload: Signal<Option<String>>, title: &'static str) -> impl IntoView {
    let (copied, set_copied) = signal(false);
    let on_click = move |_: web_sys::MouseEvent| {
        let Some(text) = payload.get_untracked() else {
            return;
        };
        spawn_local(async move {
            if copy_to_clipboard(&text).await {
                set_copied.set(true);
                gloo_timers::future::TimeoutFuture::new(COPIED_MS).await;
                let _ = set_copied.try_set(false);
            }
        });
    };
    view! {
        <button
            type="button"
            class="tagit_button--icon tagit_copyBtn"
            title=title
            disabled=move || payload.with(Option::is_none)
            on:click=on_click
        >
            {move || if copied.get() { "✔" } else { "⎘" }}
        </button>
    }
}

#[component]
pub fn TagEditorView(
    options: TagEditorOptions,
    /// Options known before the backend answers
    #[prop(optional)]
    initial: Vec<TagOption>,
    /// Shown as a 🏷️ button per option when `options.classifier` is set
    #[prop(optional)]
    on_classify: Option<Callback<TagOption>>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let notifier = ctx.notifier;
    let read_only = options.read_only;
    let classifier = options.classifier && on_classify.is_some();
    let title = options.dialog_title.clone();

    let catalog = RwSignal::new(TagCatalog::new(initial));
    let editor: StoredValue<Editor, LocalStorage> =
        StoredValue::new_local(Rc::new(TagEditor::new(api_client(&options.api_url), options.clone())));

    let dialog_ref = NodeRef::<html::Dialog>::new();
    let (term, set_term) = signal(String::new());
    let (adding, set_adding) = signal(false);
    let (new_text, set_new_text) = signal(String::new());
    let (edit_text, set_edit_text) = signal(String::new());

    // Catalog first, then the item's own selection on top
    if !options.catalog_id.is_empty() {
        spawn_local(async move {
            let editor = editor.get_value();
            match editor.fetch_catalog().await {
                Ok(change) => {
                    settle(catalog, Some(change));
                }
                Err(e) => log::warn!("could not load tag catalog: {}", e),
            }
            settle(catalog, editor.fetch_item_tags().await);
        });
    }

    let open_dialog = move |_: web_sys::MouseEvent| {
        set_term.set(String::new());
        if let Some(el) = dialog_ref.get() {
            if let Err(e) = el.show_modal() {
                log::error!("could not show tag dialog: {:?}", e);
            }
        }
    };
    let close_dialog = move |_: web_sys::MouseEvent| {
        if let Some(el) = dialog_ref.get() {
            el.close();
        }
    };

    let add = move || {
        let text = new_text.get_untracked();
        spawn_local(async move {
            let editor = editor.get_value();
            let snapshot = catalog.get_untracked();
            if settle(catalog, editor.add(&snapshot, &text, &notifier).await) {
                set_new_text.set(String::new());
                set_adding.set(false);
            }
        });
    };
    let rename = move |value: TagId| {
        let text = edit_text.get_untracked();
        spawn_local(async move {
            let editor = editor.get_value();
            let snapshot = catalog.get_untracked();
            settle(catalog, editor.rename(&snapshot, &value, &text, &notifier).await);
        });
    };
    let delete = move |value: TagId| {
        spawn_local(async move {
            let editor = editor.get_value();
            let snapshot = catalog.get_untracked();
            settle(catalog, editor.delete(&snapshot, &value, &notifier).await);
        });
    };

    let chips = move || {
        catalog.with(|c| {
            c.sorted()
                .into_iter()
                .filter(|o| o.selected)
                .cloned()
                .collect::<Vec<_>>()
        })
    };
    let listed = move || catalog.with(|c| c.filter(&term.get()).into_iter().cloned().collect::<Vec<_>>());
    let selection_payload = Signal::derive(move || catalog.with(TagCatalog::clipboard_payload));
    let listing_payload = Signal::derive(move || catalog.with(|c| c.listing_payload(&term.get())));

    let option_row = move |option: TagOption| {
        let value = option.value.clone();
        let is_editing = {
            let value = value.clone();
            move || catalog.with(|c| c.editing() == Some(&value))
        };
        let toggle = {
            let value = value.clone();
            move |_: web_sys::MouseEvent| {
                if !read_only {
                    catalog.update(|c| c.toggle(&value));
                }
            }
        };
        let start_edit = {
            let value = value.clone();
            let text = option.text.clone();
            move |_: web_sys::MouseEvent| {
                set_edit_text.set(text.clone());
                catalog.update(|c| c.start_edit(&value));
            }
        };
        let save_edit = {
            let value = value.clone();
            move || rename(value.clone())
        };
        let on_delete = {
            let value = value.clone();
            move |_: web_sys::MouseEvent| delete(value.clone())
        };
        let classify = {
            let option = option.clone();
            move |_: web_sys::MouseEvent| {
                if let Some(cb) = on_classify {
                    cb.run(option.clone());
                }
            }
        };

        view! {
            <div class="tagit_optionItem" class:tagit_selected=option.selected data-value=value.to_string()>
                <Show
                    when=is_editing
                    fallback=move || {
                        view! {
                            <div class="tagit_optionDisplay flexRowDyanimic">
                                <div>
                                    <span class="tagit_optionText" on:click=toggle.clone()>
                                        {option.text.clone()}
                                    </span>
                                </div>
                                <div>
                                    {classifier
                                        .then(|| {
                                            view! {
                                                <button
                                                    type="button"
                                                    class="tagit_button--icon tagit_classifyBtn"
                                                    title="Clasificar"
                                                    on:click=classify.clone()
                                                >
                                                    "🏷️"
                                                </button>
                                            }
                                        })}
                                    {(!read_only)
                                        .then(|| {
                                            view! {
                                                <button
                                                    type="button"
                                                    class="tagit_button--icon tagit_editBtn"
                                                    title="Edit"
                                                    on:click=start_edit.clone()
                                                >
                                                    "✏️"
                                                </button>
                                                <button
                                                    type="button"
                                                    class="tagit_button--icon tagit_deleteBtn"
                                                    title="Delete"
                                                    on:click=on_delete.clone()
                                                >
                                                    "🗑️"
                                                </button>
                                            }
                                        })}
                                </div>
                            </div>
                        }
                    }
                >
                    <div class="tagit_optionEdit flexRowDyanimic">
                        <div>
                            <input
                                type="text"
                                class="tagit_inlineInput"
                                prop:value=edit_text
                                on:input=move |ev| set_edit_text.set(event_target_value(&ev))
                                on:keydown={
                                    let save_edit = save_edit.clone();
                                    move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                                        "Enter" => save_edit(),
                                        "Escape" => catalog.update(TagCatalog::cancel_edit),
                                        _ => {}
                                    }
                                }
                            />
                        </div>
                        <div>
                            <button
                                type="button"
                                class="tagit_button--icon tagit_saveBtn"
                                title="Save"
                                on:click={
                                    let save_edit = save_edit.clone();
                                    move |_| save_edit()
                                }
                            >
                                "✓"
                            </button>
                            <button
                                type="button"
                                class="tagit_button--icon tagit_cancelBtn"
                                title="Cancel"
                                on:click=move |_| catalog.update(TagCatalog::cancel_edit)
                            >
                                "✗"
                            </button>
                        </div>
                    </div>
                </Show>
            </div>
        }
    };

    view! {
        <div class="tagit">
            <div class="tagit_chips">
                <For
                    each=chips
                    key=|o| (o.value.clone(), o.text.clone())
                    children=move |o: TagOption| view! { <span class="tagit_chip">{o.text}</span> }
                />
                <button type="button" class="tagit_button--icon tagit_openBtn" title="Edit" on:click=open_dialog>
                    "✏️"
                </button>
                <CopyButton payload=selection_payload title="Copy selected" />
            </div>

            <dialog node_ref=dialog_ref class="ontoy-dlg">
                <header class="ontoy-dlg-header">
                    <h3>{title}</h3>
                    <CopyButton payload=listing_payload title="Copy list" />
                    <button type="button" class="ontoy-dlg-close" aria-label="Cerrar" on:click=close_dialog>
                        "×"
                    </button>
                </header>
                <div class="ontoy-dlg-content">
                    <div class="tagit_dialog flexColumnFlexible">
                        <div class="tagit_searchToolbar flexRowDyanimic">
                            <div>
                                <input
                                    type="text"
                                    placeholder="🔍 Buscar ..."
                                    enterkeyhint="search"
                                    prop:value=term
                                    on:input=move |ev| set_term.set(event_target_value(&ev))
                                />
                            </div>
                            <div>
                                <Show when=move || term.with(|t| !t.is_empty())>
                                    <button
                                        type="button"
                                        class="tagit_button--icon"
                                        on:click=move |_| set_term.set(String::new())
                                    >
                                        "×"
                                    </button>
                                </Show>
                            </div>
                        </div>

                        <div class="tagit_optionsList">
                            <For
                                each=listed
                                key=|o| (o.value.clone(), o.text.clone(), o.selected)
                                children=option_row
                            />
                        </div>

                        {(!read_only)
                            .then(|| {
                                view! {
                                    <Show
                                        when=move || adding.get()
                                        fallback=move || {
                                            view! {
                                                <div class="tagit_toolbar">
                                                    <button
                                                        type="button"
                                                        class="tagit_button--fullWidth"
                                                        on:click=move |_| set_adding.set(true)
                                                    >
                                                        "Nueva Categoría"
                                                    </button>
                                                </div>
                                            }
                                        }
                                    >
                                        <div class="tagit_addForm flexRowDyanimic">
                                            <div>
                                                <input
                                                    type="text"
                                                    placeholder="Categoría..."
                                                    enterkeyhint="done"
                                                    prop:value=new_text
                                                    on:input=move |ev| set_new_text.set(event_target_value(&ev))
                                                    on:keydown=move |ev: web_sys::KeyboardEvent| {
                                                        if ev.key() == "Enter" {
                                                            add();
                                                        }
                                                    }
                                                />
                                            </div>
                                            <div>
                                                <button
                                                    type="button"
                                                    class="tagit_button--icon"
                                                    title="Save"
                                                    on:click=move |_| add()
                                                >
                                                    "✓"
                                                </button>
                                                <button
                                                    type="button"
                                                    class="tagit_button--icon"
                                                    title="Cancel"
                                                    on:click=move |_| {
                                                        set_new_text.set(String::new());
                                                        set_adding.set(false);
                                                    }
                                                >
                                                    "✗"
                                                </button>
                                            </div>
                                        </div>
                                    </Show>
                                }
                            })}
                    </div>
                </div>
                <footer class="ontoy-dlg-footer">
                    <button type="button" class="ontoy-btn ontoy-btn-primary btn-close" on:click=close_dialog>
                        "Cerrar"
                    </button>
                </footer>
            </dialog>
        </div>
    }
}
