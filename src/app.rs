//! ClassifyIt Demo App
//!
//! Host page wiring the classification dialog and the tag editor to the
//! mock backend. Mirrors how a real page would embed the widgets.

use classify_core::{
    Category, ClassifyError, ClassifyOptions, DialogOptions, Item, TagEditorOptions, TagOption, TemplateBook,
};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::{ClassifyDialogView, ModalHost, TagEditorView};
use crate::context::AppContext;
use crate::widget::ClassifyWidget;

const API_URL: &str = "./api/mock";

/// The mock backend seeds the same five products
fn demo_items() -> Vec<Item> {
    vec![
        Item::new("p1", "Laptop Pro", Some("yes")),
        Item::new("p2", "Mouse Wireless", Some("no")),
        Item::new("p3", "Keyboard Mechanical", None),
        Item::new("p4", "Monitor 4K", Some("maybe")),
        Item::new("p5", "USB-C Hub", Some("unknown")),
    ]
}

fn demo_categories() -> Vec<Category> {
    vec![
        Category::new("yes", "Sí").with_title("Aprobados"),
        Category::new("maybe", "Quizá"),
        Category::new("no", "No").with_title("Rechazados"),
    ]
}

/// Categorize the products by one tag
fn tag_widget(tag: &TagOption) -> Result<ClassifyWidget, ClassifyError> {
    let categories = vec![
        Category::new("tagged", format!("Con {}", tag.text)),
        Category::new("untagged", "Sin etiqueta"),
    ];
    let items = demo_items()
        .into_iter()
        .map(|item| Item::new(item.id, item.display_name, Some("untagged")))
        .collect();
    let options = ClassifyOptions {
        title: format!("Clasificar: {}", tag.text),
        item_name_plural: "Productos".to_string(),
        templates_enabled: false,
        ..ClassifyOptions::default()
    };
    ClassifyWidget::new(categories, items, options)
}

/// Open `widget` and print whatever it resolves with
fn run_dialog(widget: ClassifyWidget, dialog: DialogOptions, set_result: WriteSignal<String>) {
    let outcome = match widget.open_dialog(dialog) {
        Ok(outcome) => outcome,
        Err(e) => {
            log::warn!("could not open dialog: {}", e);
            return;
        }
    };
    spawn_local(async move {
        let text = match outcome.await {
            Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|e| e.to_string()),
            Err(e) => format!("({})", e),
        };
        let _ = set_result.try_set(text);
    });
}

#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new(API_URL);
    provide_context(ctx);

    let (result, set_result) = signal(String::from("(nothing yet)"));
    let tag_dialog = RwSignal::new_local(None::<ClassifyWidget>);

    let editable = ClassifyOptions {
        title: "Clasifica productos".to_string(),
        item_name_plural: "Productos".to_string(),
        can_save_templates: true,
        groups_enabled: true,
        groups_editable: true,
        api_url: API_URL.to_string(),
        ..ClassifyOptions::default()
    };
    let read_only = ClassifyOptions {
        editable: false,
        ..editable.clone()
    };

    let widgets = ClassifyWidget::new(demo_categories(), demo_items(), editable)
        .and_then(|main| Ok((main, ClassifyWidget::new(demo_categories(), demo_items(), read_only)?)));
    let (main, viewer) = match widgets {
        Ok(pair) => pair,
        Err(e) => {
            log::error!("demo widgets could not be built: {}", e);
            return view! { <p class="error">{e.to_string()}</p> }.into_any();
        }
    };

    // Groups and templates come from the backend session
    spawn_local(async move {
        let api = ctx.api();
        match api.list_groups().await {
            Ok(groups) => main.groups.set(groups),
            Err(e) => log::warn!("could not load groups: {}", e),
        }
        match api.list_templates().await {
            Ok(templates) => main.templates.set(TemplateBook::new(templates)),
            Err(e) => log::warn!("could not load templates: {}", e),
        }
    });

    on_cleanup(move || {
        main.dispose();
        viewer.dispose();
    });

    let on_classify = Callback::new(move |tag: TagOption| {
        if let Some(previous) = tag_dialog.try_update(Option::take).flatten() {
            previous.dispose();
        }
        match tag_widget(&tag) {
            Ok(widget) => {
                tag_dialog.set(Some(widget));
                run_dialog(widget, DialogOptions::default(), set_result);
            }
            Err(e) => log::error!("could not classify by tag {}: {}", tag.value, e),
        }
    });

    let tag_options = TagEditorOptions {
        api_url: API_URL.to_string(),
        catalog_id: "demo".to_string(),
        item_id: Some("p1".to_string()),
        item_table: Some("products".to_string()),
        classifier: true,
        ..TagEditorOptions::default()
    };

    view! {
        <main class="demo-layout">
            <h1>"ClassifyIt"</h1>

            <section class="demo-section">
                <h2>"Clasificación"</h2>
                <button class="oc-btn oc-btn-primary" on:click=move |_| run_dialog(main, DialogOptions::default(), set_result)>
                    "Clasificar productos"
                </button>
                " "
                <button
                    class="oc-btn"
                    on:click=move |_| run_dialog(viewer, DialogOptions::titled("Productos"), set_result)
                >
                    "Ver clasificación"
                </button>
                <pre class="demo-result">{result}</pre>
            </section>

            <section class="demo-section">
                <h2>"Categorías del producto"</h2>
                <TagEditorView options=tag_options on_classify=on_classify />
            </section>

            <ClassifyDialogView widget=main />
            <ClassifyDialogView widget=viewer />
            {move || tag_dialog.get().map(|widget| view! { <ClassifyDialogView widget=widget /> })}
            <ModalHost />
        </main>
    }
    .into_any()
}
